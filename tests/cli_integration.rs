/*!
 * Integration tests for the filefacts binary
 */

use std::fs::File;
use std::io::Write;
use std::process::{Command, Output};

use tempfile::tempdir;

fn filefacts(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_filefacts"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_print_command() {
    let output = filefacts(&["find-files", "/srv/my app", "--print-command"]);

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        r"find /srv/my\ app -type f"
    );
}

#[test]
fn test_checksum_json() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("hello.txt");
    File::create(&path).unwrap().write_all(b"hello\n").unwrap();

    let output = filefacts(&["sha1", &path.to_string_lossy(), "--format", "json"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, "f572d396fae9206628714fb2ce00f72e94f2258f");
}

#[test]
fn test_missing_file_is_null_in_json() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("missing");

    let output = filefacts(&["file", &path.to_string_lossy(), "--format", "json"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim_end(), "null");
}

#[test]
fn test_directory_table() {
    let temp_dir = tempdir().unwrap();

    let output = filefacts(&["directory", &temp_dir.path().to_string_lossy()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("directory"));
    assert!(stdout.contains("Mode"));
}

#[test]
fn test_failing_command_exits_nonzero() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("missing");

    let output = filefacts(&["find-directories", &path.to_string_lossy()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_invalid_options() {
    let output = filefacts(&["md5", "/etc/hosts", "--user", "deploy"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--port and --user require --host"));
}
