//! Folio common core types.

pub mod id;
pub mod timestamp;

pub use id::{IdParseError, ImageId, ProjectId, TechnologyId, UserId};
pub use timestamp::Timestamp;
