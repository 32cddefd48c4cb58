//! Domain model shared by the gateway, the services and the store adapters.

pub mod identity;
pub mod project;

pub use identity::{Identity, NewIdentity, Role};
pub use project::{
    NewProject, NewProjectImage, Ownership, Project, ProjectChanges, ProjectFilter, ProjectImage,
    Technology,
};
