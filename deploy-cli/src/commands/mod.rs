//! Command handlers (imperative shell)
//!
//! Each handler has a console entry point and a `_with_output` variant
//! that takes its collaborators as arguments.

pub mod deploy;
pub mod plan;
pub mod report;
pub mod status;
