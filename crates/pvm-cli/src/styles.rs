//! Colors for clap's help output.

use clap::builder::{Styles, styling::AnsiColor};

/// Green headers and usage, cyan literals and placeholders.
pub const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().bold())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::Cyan.on_default().bold())
    .placeholder(AnsiColor::Cyan.on_default());
