/*!
 * filefacts - Portable file facts for GNU and BSD hosts
 *
 * Each fact builds a shell command that works with either tool family and
 * parses that command's output into one canonical shape, reporting missing
 * paths as an absent value rather than an error.
 */

pub mod config;
pub mod error;
pub mod escape;
pub mod executor;
pub mod facts;
pub mod permissions;
pub mod report;
pub mod types;


// Re-export main components for easier access
pub use config::{Args, Config, FactCommand};
pub use error::{FactError, Result};
pub use executor::{gather, CommandOutput, Executor, LocalShell, SshShell};
pub use facts::{ChecksumFact, Fact, FileFact, FindFact, FindInFile, FindKind, HashAlgorithm};
pub use report::{FactReport, ReportFormat, Reporter};
pub use types::{FileMetadata, FileType, Lenient, Mode, Timestamp};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
