use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotInitialized,
    HouseholdNotFound,
    TemplateNotFound,
    AssignmentNotFound,
    ValidationError,
    NotCandidate,
    AlreadyDeclined,
    OfferTaken,
    OfferExpired,
    OfferClosed,
    OfferActive,
    RosterUnavailable,
    ConfigError,
    DatabaseError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::HouseholdNotFound => "HOUSEHOLD_NOT_FOUND",
            Self::TemplateNotFound => "TEMPLATE_NOT_FOUND",
            Self::AssignmentNotFound => "ASSIGNMENT_NOT_FOUND",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::NotCandidate => "NOT_CANDIDATE",
            Self::AlreadyDeclined => "ALREADY_DECLINED",
            Self::OfferTaken => "OFFER_TAKEN",
            Self::OfferExpired => "OFFER_EXPIRED",
            Self::OfferClosed => "OFFER_CLOSED",
            Self::OfferActive => "OFFER_ACTIVE",
            Self::RosterUnavailable => "ROSTER_UNAVAILABLE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ChoreError {
    pub code: ErrorCode,
    pub message: String,
}

impl ChoreError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The row was no longer in the state the caller expected. Reported as
    /// "offer no longer available" and never retried automatically.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::OfferTaken
                | ErrorCode::OfferExpired
                | ErrorCode::OfferClosed
                | ErrorCode::OfferActive
                | ErrorCode::AlreadyDeclined
        )
    }

    /// Failures that the next scheduled run is expected to heal.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::DatabaseError | ErrorCode::RosterUnavailable
        )
    }

    pub fn not_initialized(path: &str) -> Self {
        Self::new(
            ErrorCode::NotInitialized,
            format!("choreboard is not initialized at {path}. Run `choreboard init` first."),
        )
    }

    pub fn household_not_found(reference: &str) -> Self {
        Self::new(
            ErrorCode::HouseholdNotFound,
            format!("Household not found: {reference}"),
        )
    }

    pub fn template_not_found(reference: &str) -> Self {
        Self::new(
            ErrorCode::TemplateNotFound,
            format!("Template not found: {reference}"),
        )
    }

    pub fn assignment_not_found(reference: &str) -> Self {
        Self::new(
            ErrorCode::AssignmentNotFound,
            format!("Assignment not found: {reference}"),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn not_candidate(member_id: &str) -> Self {
        Self::new(
            ErrorCode::NotCandidate,
            format!("{member_id} is not a candidate for this offer"),
        )
    }

    pub fn already_declined(member_id: &str) -> Self {
        Self::new(
            ErrorCode::AlreadyDeclined,
            format!("{member_id} has already declined this offer"),
        )
    }

    pub fn offer_taken() -> Self {
        Self::new(ErrorCode::OfferTaken, "Offer no longer available: already taken")
    }

    pub fn offer_expired() -> Self {
        Self::new(ErrorCode::OfferExpired, "Offer no longer available: offer expired")
    }

    pub fn offer_closed(status: &str) -> Self {
        Self::new(
            ErrorCode::OfferClosed,
            format!("Assignment is {status} and accepts no further changes"),
        )
    }

    pub fn offer_active(template_id: &str) -> Self {
        Self::new(
            ErrorCode::OfferActive,
            format!("Template {template_id} already has a live offer"),
        )
    }

    pub fn roster_unavailable(household_id: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::RosterUnavailable,
            format!("Roster unavailable for household {household_id}: {reason}"),
        )
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }
}

impl From<rusqlite::Error> for ChoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::database(e.to_string())
    }
}
