//! Shared CLI output helpers for consistent terminal output.
//!
//! Uses `console` styling, which respects NO_COLOR and non-tty output.

use console::style;
use std::fmt::Display;

/// Print an error message to stderr (red).
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red(), msg);
}

/// Print a bold section header.
pub fn header(title: &str) {
    println!("{}", style(title).bold());
}

/// Print a key-value pair (label dimmed).
pub fn kv(label: &str, value: impl Display) {
    println!("  {:<16} {}", style(label).dim(), value);
}

/// Print a list item.
pub fn item(value: impl Display) {
    println!("  - {value}");
}

/// Print secondary info (dimmed).
pub fn dimmed(msg: &str) {
    println!("{}", style(msg).dim());
}
