//! Command Line Interface (CLI) layer for imgedit.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for the single-image commands,
//! directory batches and request-script replay. It wires user-provided
//! options to the library exposed via `imgedit::api` and
//! `imgedit::core::processing`.
//!
//! If you are embedding imgedit into another application, prefer using
//! the high-level `imgedit::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
