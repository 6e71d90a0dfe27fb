use serde::{Deserialize, Serialize};

use crate::models::MemberId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Offered,
    Accepted,
    DeclinedByAll,
    Completed,
    Expired,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Offered => "offered",
            Self::Accepted => "accepted",
            Self::DeclinedByAll => "declined_by_all",
            Self::Completed => "completed",
            Self::Expired => "expired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "offered" => Some(Self::Offered),
            "accepted" => Some(Self::Accepted),
            "declined_by_all" => Some(Self::DeclinedByAll),
            "completed" => Some(Self::Completed),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    /// Terminal rows are retained for history and point accounting and
    /// accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::DeclinedByAll | Self::Completed | Self::Expired)
    }
}

/// One member's standing on a single-task offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferCandidate {
    pub member_id: MemberId,
    pub declined_at: Option<String>,
}

impl OfferCandidate {
    pub fn has_declined(&self) -> bool {
        self.declined_at.is_some()
    }
}

/// A concrete instance of a template. Recurring rows carry `due_date`;
/// single-task offers carry `deadline` and a candidate list instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub template_id: String,
    pub household_id: String,
    pub due_date: Option<String>,
    pub assignee_id: Option<MemberId>,
    pub status: AssignmentStatus,
    pub deadline: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub accepted_at: Option<String>,
    pub completed_at: Option<String>,
    pub candidates: Vec<OfferCandidate>,
}

impl Assignment {
    pub fn is_offer(&self) -> bool {
        self.due_date.is_none()
    }

    pub fn declined_by(&self) -> Vec<&str> {
        self.candidates
            .iter()
            .filter(|c| c.has_declined())
            .map(|c| c.member_id.as_str())
            .collect()
    }
}
