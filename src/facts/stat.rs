/*!
 * File metadata via `stat`, portable across GNU and BSD hosts
 */

use tracing::{debug, trace};

use crate::error::{FactError, Result};
use crate::escape::escape_unix_path;
use crate::facts::Fact;
use crate::permissions::parse_mode;
use crate::types::{FileMetadata, FileType, Lenient, Mode, Timestamp};

/// GNU coreutils `stat` format
const LINUX_STAT_COMMAND: &str =
    "stat -c 'user=%U group=%G mode=%A atime=%X mtime=%Y ctime=%Z size=%s %N'";

/// BSD/macOS `stat` format, producing the same keys as the GNU one
const BSD_STAT_COMMAND: &str =
    "stat -f 'user=%Su group=%Sg mode=%Sp atime=%a mtime=%m ctime=%c size=%z %N%SY'";

/// Seven `key=value` fields followed by the file name
const STAT_FIELDS: usize = 8;

/// Separator between a link name and its target in `%N` output
const LINK_SEPARATOR: &str = " -> ";

/// Quote characters GNU `stat` may wrap link names and targets in
const NAME_QUOTES: &[char] = &['\'', '"', '`', '\u{2018}', '\u{2019}'];

/// Metadata of a path, filtered by the entry type the caller expects
///
/// The same command serves every type; a result whose type differs from
/// `expected` is reported as absent, exactly like a missing path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFact {
    path: String,
    expected: FileType,
}

impl FileFact {
    /// Create a fact for `path` that only accepts entries of type `expected`
    pub fn new(path: impl Into<String>, expected: FileType) -> Self {
        Self {
            path: path.into(),
            expected,
        }
    }

    /// Regular file metadata
    pub fn file(path: impl Into<String>) -> Self {
        Self::new(path, FileType::File)
    }

    /// Symbolic link metadata, including the link target
    pub fn link(path: impl Into<String>) -> Self {
        Self::new(path, FileType::Link)
    }

    /// Directory metadata
    pub fn directory(path: impl Into<String>) -> Self {
        Self::new(path, FileType::Directory)
    }

    /// Socket metadata
    pub fn socket(path: impl Into<String>) -> Self {
        Self::new(path, FileType::Socket)
    }

    /// The path this fact describes
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The entry type this fact accepts
    pub fn expected(&self) -> FileType {
        self.expected
    }
}

impl Fact for FileFact {
    type Output = Option<FileMetadata>;

    fn command(&self) -> String {
        let path = escape_unix_path(&self.path);
        // The bare stat probe keeps a missing path from ever running the
        // formatted stat, and `|| true` keeps the exit status successful.
        format!(
            "stat {path} 1> /dev/null 2> /dev/null && \
             ({LINUX_STAT_COMMAND} {path} 2> /dev/null || {BSD_STAT_COMMAND} {path}) \
             || true"
        )
    }

    fn parse<S: AsRef<str>>(&self, output: &[S]) -> Result<Self::Output> {
        let line = match output.first().map(|line| line.as_ref()) {
            Some(line) if !line.trim().is_empty() => line,
            _ => {
                debug!("No stat output for {}, path does not exist", self.path);
                return Ok(None);
            }
        };

        let tokens = split_fields(line, STAT_FIELDS);
        let Some((filename, bits)) = tokens.split_last() else {
            return Ok(None);
        };

        let mut fields = StatFields::default();
        for bit in bits {
            let (key, value) = bit.split_once('=').ok_or_else(|| {
                FactError::MalformedOutput(format!("expected key=value in stat output, got {bit:?}"))
            })?;

            match key {
                "user" => fields.owner = Some(value.to_string()),
                "group" => fields.group = Some(value.to_string()),
                "mode" => {
                    let mut chars = value.chars();
                    let flag = chars.next().unwrap_or(' ');
                    let file_type = FileType::from_flag(flag).ok_or_else(|| {
                        FactError::MalformedOutput(format!("unknown file type flag in mode {value:?}"))
                    })?;
                    fields.file_type = Some(file_type);
                    fields.mode = Some(parse_mode(chars.as_str()));
                }
                "size" => fields.size = Some(Lenient::parse(value)),
                "atime" => fields.accessed = Some(Timestamp::from_epoch(value)),
                "mtime" => fields.modified = Some(Timestamp::from_epoch(value)),
                "ctime" => fields.changed = Some(Timestamp::from_epoch(value)),
                _ => trace!("Ignoring unknown stat field {}", key),
            }
        }

        let file_type = required(fields.file_type, "mode")?;
        if file_type != self.expected {
            debug!(
                "{} is a {}, not a {}; treating as absent",
                self.path, file_type, self.expected
            );
            return Ok(None);
        }

        let link_target = if file_type == FileType::Link {
            let (_, target) = filename.split_once(LINK_SEPARATOR).ok_or_else(|| {
                FactError::MalformedOutput(format!("link without target: {filename:?}"))
            })?;
            Some(target.trim_matches(NAME_QUOTES).to_string())
        } else {
            None
        };

        Ok(Some(FileMetadata {
            owner: required(fields.owner, "user")?,
            group: required(fields.group, "group")?,
            mode: required(fields.mode, "mode")?,
            file_type,
            accessed: required(fields.accessed, "atime")?,
            modified: required(fields.modified, "mtime")?,
            changed: required(fields.changed, "ctime")?,
            size: required(fields.size, "size")?,
            link_target,
        }))
    }
}

/// Fields collected from one stat line before validation
#[derive(Default)]
struct StatFields {
    owner: Option<String>,
    group: Option<String>,
    mode: Option<Mode>,
    file_type: Option<FileType>,
    accessed: Option<Timestamp>,
    modified: Option<Timestamp>,
    changed: Option<Timestamp>,
    size: Option<Lenient<u64>>,
}

fn required<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| FactError::MalformedOutput(format!("stat output is missing {key}")))
}

/// Split on runs of whitespace into at most `max` fields
///
/// The last field keeps the remainder of the line verbatim, so file names
/// containing spaces survive intact.
fn split_fields(line: &str, max: usize) -> Vec<&str> {
    let mut fields = Vec::with_capacity(max);
    let mut rest = line.trim_start();

    while !rest.is_empty() {
        if fields.len() + 1 == max {
            fields.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                fields.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                fields.push(rest);
                break;
            }
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const GNU_FILE: &str = "user=deploy group=staff mode=-rw-r--r-- atime=1700000000 \
                            mtime=1700000100 ctime=1700000200 size=2048 '/srv/app/config.toml'";
    const BSD_FILE: &str = "user=deploy group=staff mode=-rw-r--r-- atime=1700000000 \
                            mtime=1700000100 ctime=1700000200 size=2048 /srv/app/config.toml";

    #[test]
    fn test_command_shape() {
        let fact = FileFact::file("/srv/my app");
        let command = fact.command();

        assert!(command.starts_with(r"stat /srv/my\ app 1> /dev/null 2> /dev/null && ("));
        assert!(command.contains(&format!(r"{LINUX_STAT_COMMAND} /srv/my\ app 2> /dev/null ||")));
        assert!(command.contains(&format!(r"{BSD_STAT_COMMAND} /srv/my\ app)")));
        assert!(command.ends_with("|| true"));
        assert_eq!(command, fact.command());
    }

    #[test]
    fn test_same_command_for_every_type() {
        let path = "/var/run/app.sock";
        assert_eq!(FileFact::file(path).command(), FileFact::socket(path).command());
        assert_eq!(FileFact::link(path).command(), FileFact::directory(path).command());
    }

    #[test]
    fn test_parse_regular_file() {
        let metadata = FileFact::file("/srv/app/config.toml")
            .parse(&[GNU_FILE])
            .unwrap()
            .expect("file should be present");

        assert_eq!(metadata.owner, "deploy");
        assert_eq!(metadata.group, "staff");
        assert_eq!(metadata.mode, Mode::from_bits(0o644));
        assert_eq!(metadata.file_type, FileType::File);
        assert_eq!(metadata.size, Lenient::Value(2048));
        assert_eq!(
            metadata.modified.value().map(|t| t.timestamp()),
            Some(1_700_000_100)
        );
        assert_eq!(metadata.link_target, None);
    }

    #[test]
    fn test_gnu_and_bsd_lines_agree() {
        let fact = FileFact::file("/srv/app/config.toml");
        let gnu = fact.parse(&[GNU_FILE]).unwrap();
        let bsd = fact.parse(&[BSD_FILE]).unwrap();

        assert!(gnu.is_some());
        assert_eq!(gnu, bsd);
    }

    #[test]
    fn test_parse_link_strips_quotes() {
        let bsd = "user=root group=wheel mode=lrwxr-xr-x atime=1 mtime=2 ctime=3 size=2 /a -> /b'";
        let metadata = FileFact::link("/a").parse(&[bsd]).unwrap().unwrap();
        assert_eq!(metadata.file_type, FileType::Link);
        assert_eq!(metadata.link_target.as_deref(), Some("/b"));

        let gnu = "user=root group=root mode=lrwxrwxrwx atime=1 mtime=2 ctime=3 size=11 \
                   '/etc/localtime' -> '/usr/share/zoneinfo/UTC'";
        let metadata = FileFact::link("/etc/localtime").parse(&[gnu]).unwrap().unwrap();
        assert_eq!(metadata.mode, Mode::from_bits(0o777));
        assert_eq!(
            metadata.link_target.as_deref(),
            Some("/usr/share/zoneinfo/UTC")
        );
    }

    #[test]
    fn test_link_target_with_spaces() {
        let line = "user=root group=root mode=lrwxrwxrwx atime=1 mtime=2 ctime=3 size=9 \
                    '/tmp/my link' -> '/tmp/my target'";
        let metadata = FileFact::link("/tmp/my link").parse(&[line]).unwrap().unwrap();
        assert_eq!(metadata.link_target.as_deref(), Some("/tmp/my target"));
    }

    #[test]
    fn test_type_mismatch_is_absent() {
        assert_eq!(FileFact::directory("/srv/app/config.toml").parse(&[GNU_FILE]).unwrap(), None);
        assert_eq!(FileFact::link("/srv/app/config.toml").parse(&[BSD_FILE]).unwrap(), None);

        let dir = "user=root group=root mode=drwxr-xr-x atime=1 mtime=2 ctime=3 size=4096 '/srv'";
        assert_eq!(FileFact::file("/srv").parse(&[dir]).unwrap(), None);
        assert!(FileFact::directory("/srv").parse(&[dir]).unwrap().is_some());
    }

    #[test]
    fn test_socket_fact() {
        let line = "user=app group=app mode=srwxrwx--- atime=1 mtime=2 ctime=3 size=0 /run/app.sock";
        let metadata = FileFact::socket("/run/app.sock").parse(&[line]).unwrap().unwrap();
        assert_eq!(metadata.file_type, FileType::Socket);
        assert_eq!(metadata.mode, Mode::from_bits(0o770));
    }

    #[test]
    fn test_no_output_is_absent() {
        let empty: [&str; 0] = [];
        assert_eq!(FileFact::file("/nope").parse(&empty).unwrap(), None);
        assert_eq!(FileFact::file("/nope").parse(&[""]).unwrap(), None);
    }

    #[test]
    fn test_lenient_fields() {
        let line = "user=root group=root mode=-rwsr-xr-x atime=? mtime=2 ctime=3 size=big /bin/su";
        let metadata = FileFact::file("/bin/su").parse(&[line]).unwrap().unwrap();

        assert_eq!(metadata.mode, Mode::from_bits(0o055));
        assert_eq!(metadata.accessed, Lenient::Raw("?".to_string()));
        assert_eq!(metadata.size, Lenient::Raw("big".to_string()));
        assert!(metadata.modified.value().is_some());
    }

    #[test]
    fn test_malformed_output() {
        let fact = FileFact::file("/x");

        let err = fact.parse(&["stat: illegal option -- c /x"]).unwrap_err();
        assert!(matches!(err, FactError::MalformedOutput(_)));

        let err = fact
            .parse(&["user=a group=b mode=?rw-r--r-- atime=1 mtime=2 ctime=3 size=4 /x"])
            .unwrap_err();
        assert!(matches!(err, FactError::MalformedOutput(_)));

        let err = fact.parse(&["user=a group=b mode=-rw-r--r-- /x"]).unwrap_err();
        assert!(err.to_string().contains("atime"));

        let err = FileFact::link("/x")
            .parse(&["user=a group=b mode=lrwxrwxrwx atime=1 mtime=2 ctime=3 size=4 /x"])
            .unwrap_err();
        assert!(matches!(err, FactError::MalformedOutput(_)));
    }

    #[test]
    fn test_split_fields() {
        assert_eq!(split_fields("  a  b c", 8), vec!["a", "b", "c"]);
        assert_eq!(split_fields("a b c d", 3), vec!["a", "b", "c d"]);
        assert_eq!(split_fields("a b  c   d", 3), vec!["a", "b", "c   d"]);
        assert!(split_fields("   ", 8).is_empty());
    }
}
