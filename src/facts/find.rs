/*!
 * Recursive path listings with `find`
 */

use strum::{Display, EnumIter, EnumString};

use crate::error::Result;
use crate::escape::escape_unix_path;
use crate::facts::Fact;

/// Which kind of entry to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum FindKind {
    /// Regular files
    Files,
    /// Symbolic links
    Links,
    /// Directories
    Directories,
}

impl FindKind {
    /// The argument to `find -type`
    pub fn type_flag(&self) -> char {
        match self {
            Self::Files => 'f',
            Self::Links => 'l',
            Self::Directories => 'd',
        }
    }
}

/// Paths below a starting point, in the order `find` reports them
///
/// There is no absent value: an empty list is a valid result, and a missing
/// starting point shows up as a failed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindFact {
    path: String,
    kind: FindKind,
}

impl FindFact {
    /// List entries of `kind` below `path`
    pub fn new(path: impl Into<String>, kind: FindKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Files below `path`
    pub fn files(path: impl Into<String>) -> Self {
        Self::new(path, FindKind::Files)
    }

    /// Symbolic links below `path`
    pub fn links(path: impl Into<String>) -> Self {
        Self::new(path, FindKind::Links)
    }

    /// Directories below `path`, including `path` itself
    pub fn directories(path: impl Into<String>) -> Self {
        Self::new(path, FindKind::Directories)
    }

    /// The kind of entry this fact lists
    pub fn kind(&self) -> FindKind {
        self.kind
    }
}

impl Fact for FindFact {
    type Output = Vec<String>;

    fn command(&self) -> String {
        format!(
            "find {} -type {}",
            escape_unix_path(&self.path),
            self.kind.type_flag()
        )
    }

    fn parse<S: AsRef<str>>(&self, output: &[S]) -> Result<Self::Output> {
        Ok(output.iter().map(|line| line.as_ref().to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands() {
        assert_eq!(FindFact::files("/etc").command(), "find /etc -type f");
        assert_eq!(FindFact::links("/usr/lib").command(), "find /usr/lib -type l");
        assert_eq!(
            FindFact::directories("/srv/my app").command(),
            r"find /srv/my\ app -type d"
        );
    }

    #[test]
    fn test_output_passes_through_unchanged() {
        let output = ["/etc/b", "/etc/a", "/etc/b"];
        assert_eq!(
            FindFact::files("/etc").parse(&output).unwrap(),
            vec!["/etc/b", "/etc/a", "/etc/b"]
        );

        let empty: [&str; 0] = [];
        assert!(FindFact::links("/etc").parse(&empty).unwrap().is_empty());
        assert!(!FindFact::files("/etc").default_on_error());
    }
}
