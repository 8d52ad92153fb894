//! Terminal UI helpers for pvm.
//!
//! This crate provides consistent output formatting, spinners, progress bars,
//! and error display for the pvm CLI.

pub mod output;
pub mod spinner;
pub mod style;

pub use output::{Output, Verbosity};
pub use spinner::{Progress, Spinner};
pub use style::{ColorChoice, Style};
