//! Styling for messages printed to the operator on stderr.

use console::Style;

/// An error line: red `Error:` prefix.
pub fn error(msg: &str) -> String {
    let style = Style::new().red().bold().for_stderr();
    format!("{} {}", style.apply_to("Error:"), msg)
}

/// A notice line (yellow).
pub fn notice(msg: &str) -> String {
    let style = Style::new().yellow().for_stderr();
    style.apply_to(msg).to_string()
}
