/*!
 * Shell escaping for paths and patterns embedded in fact commands
 */

use once_cell::sync::Lazy;
use regex::Regex;

// Words made only of these characters need no quoting at all
static SAFE_WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w@%+=:,./-]+$").unwrap());

/// Characters that are backslash-escaped in an unquoted path
const UNIX_PATH_SPECIAL_CHARACTERS: &[char] = &[
    ' ', '\t', '\\', '\'', '"', '$', '`', ';', '&', '|', '(', ')', '<', '>', '*', '?', '[', ']',
    '{', '}', '!', '#',
];

/// Escape a path so that it forms a single shell word
///
/// A leading `~` is left alone so home directory expansion still works.
/// Paths holding control characters are single-quoted instead, since a
/// backslash before a newline is a line continuation rather than an escape.
pub fn escape_unix_path(path: &str) -> String {
    if path.chars().any(char::is_control) {
        return quote(path);
    }

    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if UNIX_PATH_SPECIAL_CHARACTERS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escape text for use inside a double-quoted shell string
///
/// Inside double quotes only `\`, `"`, `$` and `` ` `` are special.
pub fn escape_double_quoted(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Quote an arbitrary string as a single POSIX shell word
///
/// # Examples
/// ```
/// use filefacts::escape::quote;
///
/// assert_eq!(quote("plain"), "plain");
/// assert_eq!(quote("two words"), "'two words'");
/// assert_eq!(quote("it's"), r#"'it'"'"'s'"#);
/// ```
pub fn quote(text: &str) -> String {
    if text.is_empty() {
        return "''".to_string();
    }
    if SAFE_WORD_REGEX.is_match(text) {
        return text.to_string();
    }
    format!("'{}'", text.replace('\'', r#"'"'"'"#))
}
