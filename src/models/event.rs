use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Accepted,
    Completed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "accepted" => Some(Self::Accepted),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Outbound record for the rewards and notification collaborators. They
/// poll the log by sequence number; the engine never calls them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentEvent {
    pub seq: i64,
    pub assignment_id: String,
    pub template_id: String,
    pub household_id: String,
    pub kind: EventKind,
    pub member_id: String,
    pub points: i64,
    pub occurred_at: String,
}
