//! The workspace settings page: gating, forms, the page controller and its
//! HTML rendering.

pub mod confirm;
pub mod forms;
pub mod gate;
pub mod notifications;
pub mod page;
pub mod render;
pub mod view;

pub use page::{Outcome, PageError, WorkspaceSettingsPage};
