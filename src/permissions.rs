/*!
 * Symbolic permission decoding
 *
 * Converts the permission part of an `ls`-style mode string (`rwxr-xr--`)
 * into octal permission bits. Parsing is lenient: a group that is not one of
 * the canonical `r`/`w`/`x`/`-` combinations contributes a `0` digit instead
 * of failing, so setuid, setgid and sticky markers (`rws`, `r-T`, ...) read
 * as `0` for their group.
 */

use crate::types::Mode;

/// Convert a single three character group into its octal digit
fn group_digit(group: &str) -> u8 {
    match group {
        "rwx" => 7,
        "rw-" => 6,
        "r-x" => 5,
        "r--" => 4,
        "-wx" => 3,
        "-w-" => 2,
        "--x" => 1,
        _ => 0,
    }
}

/// Convert a 9 character symbolic permission string into a [`Mode`]
///
/// Characters past the ninth are ignored; missing groups read as `0`.
///
/// # Examples
/// ```
/// use filefacts::permissions::parse_mode;
///
/// assert_eq!(parse_mode("rwxr-xr--").to_string(), "754");
/// assert_eq!(parse_mode("rwsr-xr-x").to_string(), "055");
/// ```
pub fn parse_mode(symbolic: &str) -> Mode {
    let group = |start: usize| symbolic.get(start..start + 3).map_or(0, group_digit);
    Mode::from_digits(group(0), group(3), group(6))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_groups() {
        let cases = [
            ("rwx", 7),
            ("rw-", 6),
            ("r-x", 5),
            ("r--", 4),
            ("-wx", 3),
            ("-w-", 2),
            ("--x", 1),
            ("---", 0),
        ];

        for (group, digit) in cases {
            let symbolic = format!("{group}{group}{group}");
            assert_eq!(parse_mode(&symbolic).digits(), [digit; 3], "{symbolic}");
        }
    }

    #[test]
    fn test_documented_examples() {
        assert_eq!(parse_mode("rwxr-xr--"), Mode::from_bits(0o754));
        assert_eq!(parse_mode("rw-r--r--"), Mode::from_bits(0o644));
        assert_eq!(parse_mode("rwx------"), Mode::from_bits(0o700));
    }

    #[test]
    fn test_non_canonical_groups_are_zero() {
        assert_eq!(parse_mode("rwsr-xr-x"), Mode::from_bits(0o055));
        assert_eq!(parse_mode("rwxr-xr-t"), Mode::from_bits(0o750));
        assert_eq!(parse_mode("xwrxwrxwr"), Mode::from_bits(0));
    }

    #[test]
    fn test_short_input() {
        assert_eq!(parse_mode("rwxr"), Mode::from_bits(0o700));
        assert_eq!(parse_mode(""), Mode::from_bits(0));
        // Trailing ACL or extended attribute markers are ignored
        assert_eq!(parse_mode("rw-r--r--@"), Mode::from_bits(0o644));
    }
}
