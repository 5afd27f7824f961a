//! Global error handling for filefacts
//!
//! Expected absence (missing file, type mismatch, no match) is never an
//! error; it is a normal result value. The variants here cover transport
//! failures and output that cannot have come from the fact's own command.

use std::io;
use thiserror::Error;

/// Global error type for filefacts operations
#[derive(Error, Debug)]
pub enum FactError {
    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regular expression errors
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Command output that does not have the shape the fact expects
    #[error("Malformed output: {0}")]
    MalformedOutput(String),

    /// The command ran but exited unsuccessfully
    #[error("Command `{command}` failed with status {status}: {stderr}")]
    CommandFailed {
        /// The shell command that was executed
        command: String,
        /// Exit status, or -1 when the process was killed by a signal
        status: i32,
        /// Captured standard error, joined with newlines
        stderr: String,
    },

    /// The executor could not run the command at all
    #[error("Execution error: {0}")]
    Execution(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Specialized Result type for filefacts operations
pub type Result<T> = std::result::Result<T, FactError>;

/// Creates a FactError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::FactError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for adding context to errors
pub trait ResultExt<T, E> {
    /// Add additional context to an error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E: std::error::Error + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|e| {
            let context = f();
            FactError::Execution(format!("{}: {}", context, e))
        })
    }
}

// Allow converting FactError to io::Error so tests can use `?` on both
impl From<FactError> for io::Error {
    fn from(err: FactError) -> Self {
        io::Error::new(io::ErrorKind::Other, err.to_string())
    }
}
