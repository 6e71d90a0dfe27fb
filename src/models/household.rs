use serde::{Deserialize, Serialize};

use crate::models::MemberId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub household_id: String,
    pub member_id: MemberId,
    pub joined_on: String,
    pub left_on: Option<String>,
}
