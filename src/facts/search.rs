/*!
 * Searching file contents with `grep`
 *
 * `grep` prints nothing and fails both when the file lacks the pattern and
 * when the file is missing. To tell the two apart without a second round
 * trip, the failure branch checks that the file exists and, if it does,
 * prints a sentinel built from the path. Seeing exactly the sentinel means
 * "file exists, no match"; seeing nothing means "no such file".
 *
 * The sentinel is printed with `printf '%s\n'`; dash's `echo` would
 * interpret backslashes in the path.
 */

use tracing::debug;

use crate::error::Result;
use crate::escape::{escape_double_quoted, escape_unix_path, quote};
use crate::facts::Fact;

/// Prefix of the line printed when the file exists but nothing matched
const EXISTS_SENTINEL_PREFIX: &str = "__filefacts_exists_";

/// Lines of a file matching a pattern
///
/// Parses to `Some(lines)` when the file exists (empty when nothing
/// matched) and `None` when it does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindInFile {
    path: String,
    pattern: String,
}

impl FindInFile {
    /// Search `path` for lines matching the basic regular expression `pattern`
    pub fn new(path: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            pattern: pattern.into(),
        }
    }

    /// The text printed by the command when the file exists without a match
    pub fn sentinel(&self) -> String {
        format!("{EXISTS_SENTINEL_PREFIX}{}", self.path)
    }

    // A newline in the path splits the sentinel across several output lines
    fn is_sentinel<S: AsRef<str>>(&self, lines: &[S]) -> bool {
        let printed: Vec<&str> = lines.iter().map(|line| line.as_ref()).collect();
        printed.join("\n") == self.sentinel()
    }
}

impl Fact for FindInFile {
    type Output = Option<Vec<String>>;

    fn command(&self) -> String {
        let path = escape_unix_path(&self.path);
        let pattern = quote(&self.pattern);
        // Inside double quotes the path is escaped so that printf gets it verbatim
        let sentinel = format!(
            "{EXISTS_SENTINEL_PREFIX}{}",
            escape_double_quoted(&self.path)
        );

        format!(
            "grep -e {pattern} {path} 2> /dev/null || \
             (find {path} -type f > /dev/null && printf '%s\\n' \"{sentinel}\")"
        )
    }

    fn parse<S: AsRef<str>>(&self, output: &[S]) -> Result<Self::Output> {
        match output {
            [] => {
                debug!("No grep output for {}, file does not exist", self.path);
                Ok(None)
            }
            lines if self.is_sentinel(lines) => {
                debug!("{} exists but has no lines matching {:?}", self.path, self.pattern);
                Ok(Some(Vec::new()))
            }
            lines => Ok(Some(
                lines.iter().map(|line| line.as_ref().to_string()).collect(),
            )),
        }
    }

    fn default_on_error(&self) -> bool {
        true
    }
}
