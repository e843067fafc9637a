//! Terminal output: human or JSON formatting, sizes and timestamps,
//! and progress for batch transfers.

mod formatter;
mod progress;

pub use formatter::{Formatter, format_size, format_timestamp};
pub use progress::ProgressBar;

/// Global output flags shared by every command
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// `--json`: machine-readable results on stdout, errors as JSON on stderr
    pub json: bool,
    /// `--no-color`
    pub no_color: bool,
    /// `--no-progress`: hide spinners and batch progress bars
    pub no_progress: bool,
    /// `--quiet`: only errors are printed
    pub quiet: bool,
}
