/*!
 * Fact definitions
 *
 * A fact pairs a shell command with a parser for that command's output.
 * A fact value is built from its arguments (a path, a pattern) and is the
 * only state needed to make sense of the output, so the same value must be
 * used to build the command and to parse what it printed.
 */

mod checksum;
mod find;
mod search;
mod stat;

pub use checksum::{ChecksumFact, HashAlgorithm};
pub use find::{FindFact, FindKind};
pub use search::FindInFile;
pub use stat::FileFact;

use crate::error::Result;

/// A command-builder/output-parser pair describing one unit of host state
pub trait Fact {
    /// Structured result of the fact; `Default` is the "absent" value
    type Output: Default;

    /// The shell command that gathers this fact
    fn command(&self) -> String;

    /// Turn the command's output lines into the structured result
    fn parse<S: AsRef<str>>(&self, output: &[S]) -> Result<Self::Output>;

    /// Whether a failing command means "absent" rather than an error
    fn default_on_error(&self) -> bool {
        false
    }
}
