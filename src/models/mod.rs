pub mod assignment;
pub mod event;
pub mod household;
pub mod template;

pub use assignment::*;
pub use event::*;
pub use household::*;
pub use template::*;

/// Household members are identified by opaque ids issued by the
/// authorization layer.
pub type MemberId = String;
