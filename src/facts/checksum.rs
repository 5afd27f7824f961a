/*!
 * File checksums via whichever hashing tool the host provides
 */

use regex::Regex;
use strum::{Display, EnumIter, EnumProperty, EnumString};
use tracing::debug;

use crate::error::Result;
use crate::escape::escape_unix_path;
use crate::facts::Fact;

/// Supported checksum algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, EnumProperty)]
#[strum(serialize_all = "lowercase")]
pub enum HashAlgorithm {
    #[strum(props(tag = "SHA1"))]
    Sha1,

    #[strum(props(tag = "SHA256"))]
    Sha256,

    #[strum(props(tag = "MD5"))]
    Md5,
}

impl HashAlgorithm {
    /// Length of the hex digest
    pub fn digest_len(&self) -> usize {
        match self {
            Self::Sha1 => 40,
            Self::Sha256 => 64,
            Self::Md5 => 32,
        }
    }

    /// Algorithm name as printed by BSD tools, e.g. `SHA256 (file) = ...`
    pub fn tag(&self) -> &'static str {
        self.get_str("tag").unwrap_or("")
    }

    /// Tool invocations to try, GNU first, BSD last
    pub fn tools(&self) -> &'static [&'static str] {
        match self {
            Self::Sha1 => &["sha1sum", "shasum", "sha1"],
            Self::Sha256 => &["sha256sum", "shasum -a 256", "sha256"],
            Self::Md5 => &["md5sum", "md5"],
        }
    }
}

/// Checksum of a file, or absent when it cannot be computed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumFact {
    path: String,
    algorithm: HashAlgorithm,
}

impl ChecksumFact {
    /// Create a checksum fact for `path`
    pub fn new(path: impl Into<String>, algorithm: HashAlgorithm) -> Self {
        Self {
            path: path.into(),
            algorithm,
        }
    }

    /// SHA1 checksum
    pub fn sha1(path: impl Into<String>) -> Self {
        Self::new(path, HashAlgorithm::Sha1)
    }

    /// SHA256 checksum
    pub fn sha256(path: impl Into<String>) -> Self {
        Self::new(path, HashAlgorithm::Sha256)
    }

    /// MD5 checksum
    pub fn md5(path: impl Into<String>) -> Self {
        Self::new(path, HashAlgorithm::Md5)
    }

    /// The algorithm this fact uses
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Output patterns, GNU style first, each capturing the digest
    ///
    /// The requested path is part of each pattern so that a digest reported
    /// against any other file is rejected.
    fn patterns(&self) -> Result<[Regex; 2]> {
        let path = path_pattern(&self.path);
        let len = self.algorithm.digest_len();
        Ok([
            Regex::new(&format!(r"^([a-fA-F0-9]{{{len}}})\s+\*?{path}$"))?,
            Regex::new(&format!(
                r"^{}\s+\({path}\)\s+=\s+([a-fA-F0-9]{{{len}}})$",
                self.algorithm.tag()
            ))?,
        ])
    }
}

/// Regex matching `path` as a hashing tool reports it
///
/// The shell expands a leading `~` or `~user` before the tool sees the path,
/// so that prefix also matches whatever home directory it expanded to.
fn path_pattern(path: &str) -> String {
    let Some(rest) = path.strip_prefix('~') else {
        return regex::escape(path);
    };

    let (user, tail) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
    format!("(?:~{}|.*){}", regex::escape(user), regex::escape(tail))
}

impl Fact for ChecksumFact {
    type Output = Option<String>;

    fn command(&self) -> String {
        let path = escape_unix_path(&self.path);
        let tools = self.algorithm.tools();
        let last = tools.len() - 1;

        tools
            .iter()
            .enumerate()
            .map(|(i, tool)| {
                if i == last {
                    format!("{tool} {path}")
                } else {
                    format!("{tool} {path} 2> /dev/null")
                }
            })
            .collect::<Vec<_>>()
            .join(" || ")
    }

    fn parse<S: AsRef<str>>(&self, output: &[S]) -> Result<Self::Output> {
        let Some(line) = output.first().map(|line| line.as_ref()) else {
            return Ok(None);
        };

        for pattern in self.patterns()? {
            if let Some(digest) = pattern.captures(line).and_then(|c| c.get(1)) {
                return Ok(Some(digest.as_str().to_string()));
            }
        }

        debug!(
            "No {} digest for {} in output {:?}",
            self.algorithm, self.path, line
        );
        Ok(None)
    }

    fn default_on_error(&self) -> bool {
        true
    }
}
