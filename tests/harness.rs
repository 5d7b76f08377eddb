//! Test harness for canopy integration tests

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

pub use canopy::test_utils::TestRepo;

/// A command for the built binary with a predictable environment:
/// ASCII line drawing, no colors, no log output.
pub fn canopy_command(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_canopy"));
    cmd.current_dir(dir)
        .env("LC_ALL", "C")
        .env_remove("LANG")
        .env_remove("LC_CTYPE")
        .env_remove("TREE_CHARSET")
        .env_remove("FORCE_COLOR")
        .env_remove("GIT_DIR")
        .env_remove("CANOPY_LOG");
    cmd
}

fn split(output: Output) -> (String, String, i32) {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

/// Run canopy in `dir`; returns stdout, stderr and the exit code.
pub fn run_canopy(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = canopy_command(dir)
        .args(args)
        .output()
        .expect("Failed to run canopy");
    split(output)
}

/// Like [`run_canopy`] with `input` fed on stdin.
pub fn run_canopy_stdin(dir: &Path, args: &[&str], input: &str) -> (String, String, i32) {
    use std::io::Write;
    use std::process::Stdio;

    let mut child = canopy_command(dir)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run canopy");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    split(child.wait_with_output().expect("Failed to wait for canopy"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_creates_temp_dir() {
        let repo = TestRepo::new();
        assert!(repo.path().exists());
    }

    #[test]
    fn test_harness_git_init() {
        let repo = TestRepo::with_git();
        assert!(repo.path().join(".git").exists());
    }

    #[test]
    fn test_harness_runs_binary() {
        let repo = TestRepo::sample();
        let (_stdout, _stderr, code) = run_canopy(repo.path(), &[]);
        assert_eq!(code, 0);
    }
}
