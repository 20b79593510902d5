use serde::{Deserialize, Serialize};

/// Roles a registered user can hold. Registration always produces a
/// citizen; councilor and admin are assigned administratively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Citizen,
    Councilor,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Citizen => "citizen",
            UserRole::Councilor => "councilor",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "citizen" => Some(UserRole::Citizen),
            "councilor" => Some(UserRole::Councilor),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// Direction of a vote on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDirection::Up => "up",
            VoteDirection::Down => "down",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" => Some(VoteDirection::Up),
            "down" => Some(VoteDirection::Down),
            _ => None,
        }
    }
}

/// Lifecycle status shared by projects, reports and community proposals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    Draft,
    Active,
    Voting,
    Approved,
    Rejected,
    Implemented,
}

impl TargetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetStatus::Draft => "draft",
            TargetStatus::Active => "active",
            TargetStatus::Voting => "voting",
            TargetStatus::Approved => "approved",
            TargetStatus::Rejected => "rejected",
            TargetStatus::Implemented => "implemented",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(TargetStatus::Draft),
            "active" => Some(TargetStatus::Active),
            "voting" => Some(TargetStatus::Voting),
            "approved" => Some(TargetStatus::Approved),
            "rejected" => Some(TargetStatus::Rejected),
            "implemented" => Some(TargetStatus::Implemented),
            _ => None,
        }
    }
}

/// Topic category shared by projects, reports and community proposals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetCategory {
    Infrastructure,
    Education,
    Health,
    Security,
    Environment,
    Culture,
    Sports,
    Transportation,
    Other,
}

impl TargetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetCategory::Infrastructure => "infrastructure",
            TargetCategory::Education => "education",
            TargetCategory::Health => "health",
            TargetCategory::Security => "security",
            TargetCategory::Environment => "environment",
            TargetCategory::Culture => "culture",
            TargetCategory::Sports => "sports",
            TargetCategory::Transportation => "transportation",
            TargetCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "infrastructure" => Some(TargetCategory::Infrastructure),
            "education" => Some(TargetCategory::Education),
            "health" => Some(TargetCategory::Health),
            "security" => Some(TargetCategory::Security),
            "environment" => Some(TargetCategory::Environment),
            "culture" => Some(TargetCategory::Culture),
            "sports" => Some(TargetCategory::Sports),
            "transportation" => Some(TargetCategory::Transportation),
            "other" => Some(TargetCategory::Other),
            _ => None,
        }
    }
}

/// Urgency attached to citizen reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl ReportPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPriority::Low => "low",
            ReportPriority::Medium => "medium",
            ReportPriority::High => "high",
            ReportPriority::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(ReportPriority::Low),
            "medium" => Some(ReportPriority::Medium),
            "high" => Some(ReportPriority::High),
            "urgent" => Some(ReportPriority::Urgent),
            _ => None,
        }
    }
}
