//! Domain layer for the review pipeline
//!
//! Pure models, port traits and the error vocabulary shared by every stage.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{RagError, RagResult, Stage, StageError, StageExt};
