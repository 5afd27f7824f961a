/*!
 * Core types and data structures for filefacts
 */

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use strum::{Display, EnumIter, EnumString};

/// Represents different types of filesystem entries, as reported by `stat`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link
    Link,
    /// Unix domain socket
    Socket,
    /// Named pipe
    Fifo,
    /// Character device
    Character,
    /// Block device
    Block,
}

impl FileType {
    /// Map the leading character of an `ls`-style mode string to a type
    pub fn from_flag(flag: char) -> Option<Self> {
        match flag {
            'b' => Some(Self::Block),
            'c' => Some(Self::Character),
            'd' => Some(Self::Directory),
            'l' => Some(Self::Link),
            's' => Some(Self::Socket),
            'p' => Some(Self::Fifo),
            '-' => Some(Self::File),
            _ => None,
        }
    }

    /// The `ls`-style flag character for this type
    pub fn flag(&self) -> char {
        match self {
            Self::Block => 'b',
            Self::Character => 'c',
            Self::Directory => 'd',
            Self::Link => 'l',
            Self::Socket => 's',
            Self::Fifo => 'p',
            Self::File => '-',
        }
    }
}

/// Permission bits of a filesystem entry, always within `0o000..=0o777`
///
/// Displays as three octal digits, e.g. `754`, and serializes as the
/// integer those digits spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mode(u16);

impl Mode {
    /// Build a mode from raw permission bits; bits above `0o777` are dropped
    pub fn from_bits(bits: u16) -> Self {
        Self(bits & 0o777)
    }

    /// Build a mode from three octal digits (owner, group, other)
    ///
    /// Digits above 7 are treated as 0.
    pub fn from_digits(owner: u8, group: u8, other: u8) -> Self {
        let digit = |d: u8| if d > 7 { 0 } else { u16::from(d) };
        Self((digit(owner) << 6) | (digit(group) << 3) | digit(other))
    }

    /// Raw permission bits
    pub fn bits(&self) -> u16 {
        self.0
    }

    /// The owner, group and other digits
    pub fn digits(&self) -> [u8; 3] {
        [
            ((self.0 >> 6) & 0o7) as u8,
            ((self.0 >> 3) & 0o7) as u8,
            (self.0 & 0o7) as u8,
        ]
    }

    /// The octal digits read as a decimal integer, e.g. `754` for `0o754`
    pub fn as_decimal(&self) -> u16 {
        self.digits()
            .iter()
            .fold(0, |acc, digit| acc * 10 + u16::from(*digit))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03o}", self.0)
    }
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.as_decimal())
    }
}

/// A field that is parsed when possible and kept verbatim when not
///
/// Remote tools occasionally print something unexpected for a single field
/// (`?` for an unknown size, a formatted date instead of epoch seconds).
/// Rather than discarding the whole record the raw text is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    /// Successfully parsed value
    Value(T),
    /// Text that could not be parsed
    Raw(String),
}

impl<T> Lenient<T> {
    /// The parsed value, if there is one
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    /// Whether the field fell back to its raw text
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

impl<T: FromStr> Lenient<T> {
    /// Parse `raw`, keeping it verbatim if it is not a valid `T`
    pub fn parse(raw: &str) -> Self {
        raw.parse()
            .map(Self::Value)
            .unwrap_or_else(|_| Self::Raw(raw.to_string()))
    }
}

impl Lenient<DateTime<Utc>> {
    /// Parse epoch seconds into a UTC timestamp
    pub fn from_epoch(raw: &str) -> Self {
        raw.parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(Self::Value)
            .unwrap_or_else(|| Self::Raw(raw.to_string()))
    }
}

impl<T: fmt::Display> fmt::Display for Lenient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{}", value),
            Self::Raw(raw) => write!(f, "{}", raw),
        }
    }
}

/// A timestamp field, kept raw when the tool did not print epoch seconds
pub type Timestamp = Lenient<DateTime<Utc>>;

/// Metadata about a filesystem entry on the target host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    /// Owning user name
    pub owner: String,
    /// Owning group name
    pub group: String,
    /// Permission bits
    pub mode: Mode,
    /// Entry type
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// Last access time
    pub accessed: Timestamp,
    /// Last modification time
    pub modified: Timestamp,
    /// Last status change time
    pub changed: Timestamp,
    /// Size in bytes
    pub size: Lenient<u64>,
    /// Target of the symlink; present iff `file_type` is `Link`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_target: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_file_type_flags_roundtrip() {
        for file_type in FileType::iter() {
            assert_eq!(FileType::from_flag(file_type.flag()), Some(file_type));
        }
        assert_eq!(FileType::from_flag('x'), None);
    }

    #[test]
    fn test_file_type_names() {
        assert_eq!(FileType::Directory.to_string(), "directory");
        assert_eq!(FileType::from_str("fifo").unwrap(), FileType::Fifo);
        assert!(FileType::from_str("symlink").is_err());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::from_bits(0o754).to_string(), "754");
        assert_eq!(Mode::from_bits(0o754).as_decimal(), 754);
        assert_eq!(Mode::from_bits(0o007).as_decimal(), 7);
        assert_eq!(Mode::from_bits(0o7).to_string(), "007");
        assert_eq!(Mode::from_bits(0o4755).bits(), 0o755);
        assert_eq!(Mode::from_digits(6, 4, 4), Mode::from_bits(0o644));
        assert_eq!(Mode::from_digits(9, 4, 4), Mode::from_bits(0o044));
        assert_eq!(Mode::from_bits(0o750).digits(), [7, 5, 0]);
    }

    #[test]
    fn test_lenient_parsing() {
        assert_eq!(Lenient::<u64>::parse("1024"), Lenient::Value(1024));
        assert_eq!(Lenient::<u64>::parse("?"), Lenient::Raw("?".to_string()));
        assert!(Lenient::<u64>::parse("-1").is_raw());

        let ts = Timestamp::from_epoch("86400");
        assert_eq!(
            ts.value().map(|t| t.to_rfc3339()),
            Some("1970-01-02T00:00:00+00:00".to_string())
        );
        assert!(Timestamp::from_epoch("Jan 1 1970").is_raw());
    }

    #[test]
    fn test_metadata_serialization() {
        let metadata = FileMetadata {
            owner: "root".to_string(),
            group: "wheel".to_string(),
            mode: Mode::from_bits(0o644),
            file_type: FileType::File,
            accessed: Timestamp::from_epoch("0"),
            modified: Timestamp::from_epoch("0"),
            changed: Lenient::Raw("bogus".to_string()),
            size: Lenient::Value(12),
            link_target: None,
        };

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["mode"], 644);
        assert_eq!(json["type"], "file");
        assert_eq!(json["size"], 12);
        assert_eq!(json["changed"], "bogus");
        assert_eq!(json["accessed"], "1970-01-01T00:00:00Z");
        assert!(json.get("link_target").is_none());
    }
}
