//! Exit code definitions for the syncer CLI
//!
//! Scripts only need to tell success from failure, so there are two codes.
//! A batch counts as a success as long as one item went through.

use syncer_core::BatchSummary;

/// Exit codes for the syncer CLI application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed, fully or with at least one successful item
    Success = 0,

    /// Validation error, missing configuration, or nothing succeeded
    Failure = 1,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::Failure),
            _ => None,
        }
    }

    /// Exit code for a finished batch
    pub fn from_summary(summary: &BatchSummary) -> Self {
        if summary.is_failure() {
            Self::Failure
        } else {
            Self::Success
        }
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::Failure => "Operation failed",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::Failure.as_i32(), 1);
    }

    #[test]
    fn test_exit_code_from_i32() {
        assert_eq!(ExitCode::from_i32(0), Some(ExitCode::Success));
        assert_eq!(ExitCode::from_i32(1), Some(ExitCode::Failure));
        assert_eq!(ExitCode::from_i32(2), None);
    }

    #[test]
    fn test_exit_code_from_summary() {
        let partial = BatchSummary {
            attempted: 3,
            successful: 1,
            failed: 2,
            already_absent: 0,
        };
        assert_eq!(ExitCode::from_summary(&partial), ExitCode::Success);

        let failed = BatchSummary {
            attempted: 2,
            successful: 0,
            failed: 2,
            already_absent: 0,
        };
        assert_eq!(ExitCode::from_summary(&failed), ExitCode::Failure);
    }

    #[test]
    fn test_exit_code_display() {
        let display = format!("{}", ExitCode::Failure);
        assert!(display.contains("1"));
        assert!(display.contains("failed"));
    }
}
