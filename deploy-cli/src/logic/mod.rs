//! Pure functional business logic
//!
//! No I/O, no printing, no process spawning. The command handlers in
//! `commands/` compose these functions with the side effects.

pub mod format;
pub mod mxpy;

pub use format::{report_json, report_lines, status_json, status_lines, OutputFormat};
pub use mxpy::{decode_address_args, render_command, transaction_args, MXPY_BINARY};
