pub mod assignment_repo;
pub mod connection;
pub mod event_repo;
pub mod household_repo;
pub mod migrations;
pub mod offer_repo;
pub mod template_repo;

pub use connection::*;
