//! Integration tests for canopy

mod harness;

use assert_cmd::Command;
use harness::{TestRepo, run_canopy, run_canopy_stdin};
use predicates::prelude::*;

fn canopy(repo: &TestRepo) -> Command {
    let mut cmd = Command::cargo_bin("canopy").expect("binary is built");
    cmd.current_dir(repo.path())
        .env("LC_ALL", "C")
        .env_remove("LANG")
        .env_remove("TREE_CHARSET")
        .env_remove("FORCE_COLOR")
        .env_remove("GIT_DIR")
        .env_remove("CANOPY_LOG");
    cmd
}

#[test]
fn test_basic_tree_output() {
    let repo = TestRepo::sample();

    let (stdout, _stderr, code) = run_canopy(repo.path(), &[]);
    assert_eq!(code, 0);
    let expected = ".\n\
                    |-- a.txt\n\
                    `-- sub\n\
                    \x20   `-- b.txt\n\
                    \n\
                    1 directory, 2 files\n";
    assert_eq!(stdout, expected);
}

#[test]
fn test_utf8_charset_lines() {
    let repo = TestRepo::sample();

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["--charset", "utf-8"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\u{251c}\u{2500}\u{2500} a.txt"), "{}", stdout);
    assert!(stdout.contains("\u{2514}\u{2500}\u{2500} sub"), "{}", stdout);
}

#[test]
fn test_du_report() {
    let repo = TestRepo::sample();

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["--du"]);
    assert_eq!(code, 0);
    assert!(
        stdout.contains("30 bytes used in 1 directory, 2 files"),
        "du should total file sizes: {}",
        stdout
    );
}

#[test]
fn test_du_with_depth_limit_skips_unread_directories() {
    let repo = TestRepo::sample();

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["--du", "-L", "1"]);
    assert_eq!(code, 0);
    assert!(
        stdout.contains("10 bytes used in 1 directory, 1 file"),
        "a directory below the limit adds nothing: {}",
        stdout
    );
}

#[test]
fn test_noreport() {
    let repo = TestRepo::sample();

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["--noreport"]);
    assert_eq!(code, 0);
    assert!(!stdout.contains("directory"), "{}", stdout);
    assert!(stdout.ends_with("b.txt\n"), "{}", stdout);
}

#[test]
fn test_hidden_files() {
    let repo = TestRepo::sample();
    repo.add_file(".hidden", "x");

    let (stdout, _stderr, _code) = run_canopy(repo.path(), &[]);
    assert!(!stdout.contains(".hidden"), "dotfiles hidden by default: {}", stdout);

    let (stdout, _stderr, _code) = run_canopy(repo.path(), &["-a"]);
    assert!(stdout.contains(".hidden"), "-a shows dotfiles: {}", stdout);
    assert!(stdout.contains("1 directory, 3 files"), "{}", stdout);
}

#[test]
fn test_depth_limit() {
    let repo = TestRepo::new();
    repo.add_file("top.rs", "");
    repo.add_file("level1/mid.rs", "");
    repo.add_file("level1/level2/deep.rs", "");

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["-L", "1"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("top.rs"));
    assert!(stdout.contains("level1"));
    assert!(!stdout.contains("mid.rs"), "should not descend: {}", stdout);
    assert!(stdout.contains("1 directory, 1 file\n"), "{}", stdout);
}

#[test]
fn test_zero_level_rejected() {
    let repo = TestRepo::sample();
    canopy(&repo).args(["-L", "0"]).assert().code(1);
}

#[test]
fn test_dirs_only() {
    let repo = TestRepo::new();
    repo.add_file("file.rs", "");
    repo.add_file("subdir/nested.rs", "");

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["-d"]);
    assert_eq!(code, 0);
    assert!(!stdout.contains("file.rs"), "{}", stdout);
    assert!(stdout.contains("subdir"));
    assert!(stdout.ends_with("\n1 directory\n"), "{}", stdout);
}

#[test]
fn test_include_pattern() {
    let repo = TestRepo::new();
    repo.add_file("keep.rs", "");
    repo.add_file("drop.txt", "");
    repo.add_file("src/lib.rs", "");
    repo.add_file("src/notes.md", "");

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["-P", "*.rs"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("keep.rs"));
    assert!(stdout.contains("lib.rs"));
    assert!(stdout.contains("src"), "directories are kept: {}", stdout);
    assert!(!stdout.contains("drop.txt"));
    assert!(!stdout.contains("notes.md"));
}

#[test]
fn test_exclude_pattern_alternation() {
    let repo = TestRepo::new();
    repo.add_file("keep.rs", "");
    repo.add_file("target/debug.o", "");
    repo.add_file("node_modules/x.js", "");

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["-I", "target|node_modules"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("keep.rs"));
    assert!(!stdout.contains("target"), "{}", stdout);
    assert!(!stdout.contains("node_modules"), "{}", stdout);
}

#[test]
fn test_invalid_pattern_is_fatal() {
    let repo = TestRepo::sample();
    canopy(&repo)
        .args(["-P", "a|"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::starts_with("canopy: invalid pattern 'a|'"));
}

#[test]
fn test_invalid_time_format_is_fatal() {
    let repo = TestRepo::sample();
    canopy(&repo)
        .args(["--timefmt", "%Q"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid time format"));
}

#[test]
fn test_missing_root_exit_code() {
    let repo = TestRepo::sample();
    canopy(&repo)
        .arg("does-not-exist")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("does-not-exist  [error opening dir]"));
}

#[test]
fn test_multiple_roots_share_report() {
    let repo = TestRepo::sample();
    repo.add_file("other/c.txt", "");

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["sub", "other"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("sub\n`-- b.txt\nother\n`-- c.txt\n"), "{}", stdout);
    assert!(stdout.contains("0 directories, 2 files"), "{}", stdout);
}

#[test]
fn test_gitignore_rules() {
    let repo = TestRepo::with_git();
    repo.add_file("main.rs", "");
    repo.add_file("debug.log", "");
    repo.add_file("build/out.bin", "");
    repo.add_file(".gitignore", "*.log\nbuild/\n");

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["--gitignore"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("main.rs"));
    assert!(!stdout.contains("debug.log"), "{}", stdout);
    assert!(!stdout.contains("build"), "{}", stdout);

    let (stdout, _stderr, _code) = run_canopy(repo.path(), &[]);
    assert!(stdout.contains("debug.log"), "rules only apply with --gitignore");
}

#[test]
fn test_gitignore_negation_and_exclude_file() {
    let repo = TestRepo::with_git();
    repo.add_file("a.log", "");
    repo.add_file("keep.log", "");
    repo.add_file("scratch.tmp", "");
    repo.add_file(".gitignore", "*.log\n!keep.log\n");
    repo.set_exclude("*.tmp\n");

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["--gitignore"]);
    assert_eq!(code, 0);
    assert!(!stdout.contains("a.log"), "{}", stdout);
    assert!(stdout.contains("keep.log"), "negated rule re-includes: {}", stdout);
    assert!(!stdout.contains("scratch.tmp"), "info/exclude applies: {}", stdout);
}

#[test]
fn test_info_annotations() {
    let repo = TestRepo::sample();
    repo.add_file(".info", "a.txt\n\tThe first file\n");

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["--info"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("The first file"), "{}", stdout);

    let (stdout, _stderr, _code) = run_canopy(repo.path(), &[]);
    assert!(!stdout.contains("The first file"));
}

#[test]
fn test_symlink_cycle_terminates() {
    let repo = TestRepo::new();
    repo.add_file("dir/file.txt", "");
    repo.symlink("..", "dir/up");

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["-l"]);
    assert_eq!(code, 2);
    assert_eq!(
        stdout.matches("recursive, not followed").count(),
        1,
        "{}",
        stdout
    );
    assert!(stdout.contains("up -> .."), "{}", stdout);
}

#[test]
fn test_symlinks_not_followed_by_default() {
    let repo = TestRepo::new();
    repo.add_file("real/inside.txt", "");
    repo.symlink("real", "alias");

    let (stdout, _stderr, code) = run_canopy(repo.path(), &[]);
    assert_eq!(code, 0);
    assert!(stdout.contains("alias -> real\n"), "{}", stdout);
    assert_eq!(stdout.matches("inside.txt").count(), 1);

    let (stdout, _stderr, _code) = run_canopy(repo.path(), &["-l"]);
    assert_eq!(stdout.matches("inside.txt").count(), 2, "{}", stdout);
}

#[test]
fn test_sort_reverse_keeps_partition() {
    let repo = TestRepo::new();
    repo.add_file("b.txt", "");
    repo.add_file("a.txt", "");
    repo.add_dir("zdir");
    repo.add_dir("adir");

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["--dirsfirst", "-r", "--noreport"]);
    assert_eq!(code, 0);
    let names: Vec<&str> = stdout
        .lines()
        .skip(1)
        .map(|line| line.rsplit(' ').next().unwrap_or(""))
        .collect();
    assert_eq!(names, ["zdir", "adir", "b.txt", "a.txt"]);
}

#[test]
fn test_version_sort() {
    let repo = TestRepo::new();
    for name in ["file10", "file2", "file1"] {
        repo.add_file(name, "");
    }

    let (stdout, _stderr, _code) = run_canopy(repo.path(), &["-v", "--noreport"]);
    let names: Vec<&str> = stdout.lines().skip(1).map(|l| &l[4..]).collect();
    assert_eq!(names, ["file1", "file2", "file10"]);

    let (stdout, _stderr, _code) = run_canopy(repo.path(), &["--noreport"]);
    let names: Vec<&str> = stdout.lines().skip(1).map(|l| &l[4..]).collect();
    assert_eq!(names, ["file1", "file10", "file2"]);
}

#[test]
fn test_json_output_parses() {
    let repo = TestRepo::sample();
    repo.add_file("we\"ird\\na\tme", "");

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["-J"]);
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("output should be valid JSON");
    let items = json.as_array().expect("top level is an array");
    assert_eq!(items.len(), 2);

    let root = &items[0];
    assert_eq!(root["type"], "directory");
    assert_eq!(root["name"], ".");
    let contents = root["contents"].as_array().unwrap();
    assert!(contents.iter().any(|c| c["name"] == "we\"ird\\na\tme"));
    let sub = contents.iter().find(|c| c["name"] == "sub").unwrap();
    assert_eq!(sub["contents"][0]["name"], "b.txt");

    assert_eq!(items[1]["type"], "report");
    assert_eq!(items[1]["directories"], 1);
    assert_eq!(items[1]["files"], 3);
}

#[test]
fn test_json_du_sizes() {
    let repo = TestRepo::sample();

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["-J", "--du", "-i"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.lines().count(), 1, "-i puts the document on one line");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json[1]["size"], 30);
    let sub = json[0]["contents"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "sub")
        .cloned()
        .unwrap();
    assert_eq!(sub["size"], 20);
}

#[test]
fn test_xml_output() {
    let repo = TestRepo::sample();

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["-X"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("<?xml version=\"1.0\"?>\n<tree>\n"), "{}", stdout);
    assert!(stdout.contains("  <directory name=\".\">\n"));
    assert!(stdout.contains("<file name=\"a.txt\"></file>"));
    assert!(stdout.contains("<directories>1</directories>"));
    assert!(stdout.ends_with("</tree>\n"));
}

#[test]
fn test_html_output() {
    let repo = TestRepo::sample();
    repo.add_file("00Tree.html", "");

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["-H", "http://example.com", "-T", "My <Files>"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("<title>My &lt;Files&gt;</title>"), "{}", stdout);
    assert!(stdout.contains("href=\"http://example.com/sub/\""), "{}", stdout);
    assert!(!stdout.contains("00Tree.html\">"), "page never lists itself");
    assert!(stdout.contains("</html>"));

    let (stdout, _stderr, _code) = run_canopy(repo.path(), &["-H", "http://example.com", "--nolinks"]);
    assert!(!stdout.contains("href="), "{}", stdout);
}

#[test]
fn test_output_file() {
    let repo = TestRepo::sample();
    let out = repo.path().join("listing.txt");

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["-o", out.to_str().unwrap(), "sub"]);
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written, "sub\n`-- b.txt\n\n0 directories, 1 file\n");
}

#[test]
fn test_unwritable_output_file() {
    let repo = TestRepo::sample();
    canopy(&repo)
        .args(["-o", "missing-dir/out.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing-dir/out.txt"));
}

#[test]
fn test_fromfile_stdin() {
    let repo = TestRepo::new();
    let list = "src/main.rs\nsrc/lib.rs\nREADME.md\n";

    let (stdout, _stderr, code) = run_canopy_stdin(repo.path(), &["--fromfile"], list);
    assert_eq!(code, 0);
    let expected = ".\n\
                    |-- README.md\n\
                    `-- src\n\
                    \x20   |-- lib.rs\n\
                    \x20   `-- main.rs\n\
                    \n\
                    1 directory, 3 files\n";
    assert_eq!(stdout, expected);
}

#[test]
fn test_prune_drops_empty_dirs() {
    let repo = TestRepo::sample();
    repo.add_dir("empty/nested");

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["--prune"]);
    assert_eq!(code, 0);
    assert!(!stdout.contains("empty"), "{}", stdout);
    assert!(stdout.contains("1 directory, 2 files"), "{}", stdout);
}

#[test]
fn test_full_path_and_classify() {
    let repo = TestRepo::sample();

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["-f", "-F", "--noreport"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("./sub/\n"), "{}", stdout);
    assert!(stdout.contains("./sub/b.txt\n"), "{}", stdout);
}

#[test]
fn test_size_column() {
    let repo = TestRepo::sample();

    let (stdout, _stderr, code) = run_canopy(repo.path(), &["-s", "--noreport"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("[         10]  a.txt"), "{}", stdout);
}

#[test]
fn test_color_forced() {
    let repo = TestRepo::sample();

    let (stdout, _stderr, _code) = run_canopy(repo.path(), &["-C"]);
    assert!(stdout.contains("\x1b["), "-C forces escape codes: {}", stdout);

    let (stdout, _stderr, _code) = run_canopy(repo.path(), &["-C", "-n"]);
    assert!(stdout.is_empty(), "-C and -n conflict");
}

#[test]
fn test_help_and_version() {
    let repo = TestRepo::sample();
    canopy(&repo)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--gitignore"));
    canopy(&repo)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("canopy "));
}
