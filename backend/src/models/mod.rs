//! Data models for the Folio blog.
//!
//! These models match the frontend interfaces exactly for seamless interoperability.

mod draft;
mod post;

pub use draft::*;
pub use post::*;
