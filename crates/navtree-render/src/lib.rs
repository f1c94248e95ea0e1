//! Output boundary for navigation diffs.
//!
//! A UI layer implements [`NavigationRenderer`] and hands it to
//! [`render_diff`], which replays a [`NavDiff`](navtree_diff::NavDiff) in
//! order. [`ViewHierarchy`] is a reference renderer that keeps an in-memory
//! model of the view tree; it is what the CLI uses to check a diff.

pub mod config;
pub mod error;
pub mod renderer;
pub mod view;

pub use config::RenderConfig;
pub use error::{RenderError, RenderResult};
pub use renderer::{render_diff, NavigationRenderer};
pub use view::ViewHierarchy;
