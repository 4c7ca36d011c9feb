//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project management | `init`, `status` |
//! | Graph | Dependency queries | `levels`, `available`, `blocked`, `check` |
//! | Progress | Objective persistence keys | `keys <task-id>` |
//! | Storyline | Decision graph routes | `path`, `path <node-id>` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! The default can be changed with `default_format` in the global config.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output, including engine events:
//! ```bash
//! questline --verbose levels
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod query;
mod keys;
mod path;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
