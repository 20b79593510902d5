use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::{self, AppState};
use crate::middleware::{require_auth, require_council};
use crate::{projects, proposals, reports, users, votes};

/// Full HTTP surface. Three layers: public routes, authenticated routes
/// (access guard), and council routes (access guard + role guard).
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/users", post(users::register))
        .route("/projects", get(projects::list))
        .route("/projects/{id}", get(projects::get_one))
        .route("/projects/author/{author_id}", get(projects::list_by_author))
        .route("/reports", get(reports::list))
        .route("/reports/{id}", get(reports::get_one))
        .route("/reports/author/{author_id}", get(reports::list_by_author))
        .route("/community-proposals", get(proposals::list))
        .route("/community-proposals/{id}", get(proposals::get_one))
        .route(
            "/community-proposals/stats/categories",
            get(proposals::stats_by_category),
        )
        .route("/votes/project/{project_id}", get(votes::list_for_project))
        .with_state(state.clone());

    let authenticated = Router::new()
        .route("/users", get(users::list))
        .route("/users/me", get(users::me))
        .route("/users/cpf/{cpf}", get(users::get_by_cpf))
        .route(
            "/users/{id}",
            get(users::get_by_id)
                .patch(users::update)
                .delete(users::remove),
        )
        .route(
            "/votes/project/{project_id}",
            post(votes::cast).delete(votes::remove),
        )
        .route("/votes/project/{project_id}/my-vote", get(votes::my_vote))
        .route("/votes/my-votes", get(votes::my_votes))
        .route("/reports", post(reports::create))
        .route(
            "/reports/{id}",
            patch(reports::update).delete(reports::remove),
        )
        .route("/community-proposals", post(proposals::create))
        .route(
            "/community-proposals/{id}",
            patch(proposals::update).delete(proposals::remove),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone());

    // Layer order: the access guard (added last, outermost) runs before
    // the role guard.
    let council = Router::new()
        .route("/projects", post(projects::create))
        .route(
            "/projects/{id}",
            patch(projects::update).delete(projects::remove),
        )
        .layer(middleware::from_fn(require_council))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public).merge(authenticated).merge(council)
}
