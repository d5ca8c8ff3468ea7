//! Integration tests for the `clay` binary.
//!
//! These run the real executable with an isolated home directory so no
//! user configuration leaks in. Nothing here touches the network: inputs
//! either fail before any request is made or need no site at all.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `clay` command with config lookups confined to `home`.
fn clay(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("clay").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("xdg"))
        .env_remove("CLAY_CONFIG")
        .env_remove("CLAY_DEFAULT_URL")
        .env_remove("CLAY_DEFAULT_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    clay(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("lint-schema"));
}

#[test]
fn version_flag_works() {
    let home = TempDir::new().unwrap();
    clay(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("clay "));
}

mod lint_schema {
    use super::*;

    #[test]
    fn valid_schema_exits_zero() {
        let home = TempDir::new().unwrap();
        let schema = write_file(&home, "schema.yml", "_description: A thing\ntitle: {}\n");

        clay(&home)
            .arg("lint-schema")
            .arg(&schema)
            .assert()
            .success()
            .stdout("✔ Schema is valid\n");
    }

    #[test]
    fn invalid_schema_exits_one() {
        let home = TempDir::new().unwrap();
        let schema = write_file(&home, "schema.yml", "foo-bar: 1\n");

        clay(&home)
            .arg("lint-schema")
            .arg(&schema)
            .assert()
            .code(1)
            .stdout(predicate::str::contains("✖ Schema has no _description"))
            .stdout(predicate::str::contains("✖ Properties must be camelCased\n    foo-bar"));
    }

    #[test]
    fn reads_stdin() {
        let home = TempDir::new().unwrap();
        clay(&home)
            .arg("lint-schema")
            .write_stdin("_description: x\n")
            .assert()
            .success();
    }

    #[test]
    fn json_output() {
        let home = TempDir::new().unwrap();
        clay(&home)
            .args(["lint-schema", "--json"])
            .write_stdin("title: 1\n")
            .assert()
            .code(1)
            .stdout("{\"type\":\"error\",\"message\":\"Schema has no _description\"}\n");
    }

    #[test]
    fn quiet_hides_success() {
        let home = TempDir::new().unwrap();
        clay(&home)
            .args(["lint-schema", "-q"])
            .write_stdin("_description: x\n")
            .assert()
            .success()
            .stdout("");
    }

    #[test]
    fn missing_file_is_command_failure() {
        let home = TempDir::new().unwrap();
        clay(&home)
            .args(["lint-schema", "does-not-exist.yml"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Failed to read"));
    }
}

mod import {
    use super::*;

    #[test]
    fn no_site_configured() {
        let home = TempDir::new().unwrap();
        clay(&home)
            .arg("import")
            .assert()
            .code(1)
            .stdout(predicate::str::contains(
                "URL is not defined! Please specify a site prefix to import to",
            ));
    }

    #[test]
    fn bad_json_fails_before_writing() {
        let home = TempDir::new().unwrap();
        clay(&home)
            .args(["import", "http://127.0.0.1:1"])
            .write_stdin("]{\"a\":}")
            .assert()
            .code(1)
            .stdout(predicate::str::contains(
                "JSON syntax error: Unexpected token ] in JSON at position 0",
            ));
    }

    #[test]
    fn yaml_needs_flag() {
        let home = TempDir::new().unwrap();
        let file = write_file(&home, "bootstrap.yml", "_components:\n  a:\n    b: c\n");
        clay(&home)
            .args(["import", "http://127.0.0.1:1", "--file"])
            .arg(&file)
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Cannot import dispatch from yaml"))
            .stdout(predicate::str::contains("--yaml"));
    }

    #[test]
    fn unreachable_site_reports_each_entry() {
        let home = TempDir::new().unwrap();
        clay(&home)
            .args(["import", "http://127.0.0.1:1", "--json"])
            .write_stdin("{\"/_components/a\":{},\"/_components/b\":{}}")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("http://127.0.0.1:1/_components/a"))
            .stdout(predicate::str::contains("http://127.0.0.1:1/_components/b"));
    }
}

mod lint {
    use super::*;

    #[test]
    fn no_url_configured() {
        let home = TempDir::new().unwrap();
        clay(&home)
            .arg("lint")
            .assert()
            .code(1)
            .stdout(predicate::str::contains(
                "URL is not defined! Please specify a url to lint",
            ));
    }

    #[test]
    fn unreachable_component() {
        let home = TempDir::new().unwrap();
        clay(&home)
            .args(["lint", "http://127.0.0.1:1/_components/a", "-c", "2"])
            .assert()
            .code(1)
            .stdout("✖ http://127.0.0.1:1/_components/a\n");
    }
}

mod config {
    use super::*;

    #[test]
    fn set_then_get() {
        let home = TempDir::new().unwrap();
        clay(&home)
            .args(["config", "set", "url.local", "localhost.example.com"])
            .assert()
            .success()
            .stdout("Set url.local = localhost.example.com\n");

        clay(&home)
            .args(["config", "get", "url.local"])
            .assert()
            .success()
            .stdout("localhost.example.com\n");

        let written = fs::read_to_string(home.path().join(".clay/config.toml")).unwrap();
        assert!(written.contains("local = \"localhost.example.com\""));
    }

    #[test]
    fn quiet_set_prints_nothing() {
        let home = TempDir::new().unwrap();
        clay(&home)
            .args(["config", "set", "concurrency", "4", "-q"])
            .assert()
            .success()
            .stdout("");
    }

    #[test]
    fn list_masks_keys() {
        let home = TempDir::new().unwrap();
        clay(&home)
            .args(["config", "set", "key.local", "secret"])
            .assert()
            .success();

        clay(&home)
            .args(["config", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("key.local = ********"))
            .stdout(predicate::str::contains("secret").not());
    }

    #[test]
    fn zero_concurrency_rejected() {
        let home = TempDir::new().unwrap();
        clay(&home)
            .args(["config", "set", "concurrency", "0"])
            .assert()
            .code(2);
    }

    #[test]
    fn huge_concurrency_rejected() {
        let home = TempDir::new().unwrap();
        clay(&home)
            .args(["config", "set", "concurrency", "18446744073709551615"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("concurrency must be at most 1024"));
    }

    #[test]
    fn unknown_key_rejected() {
        let home = TempDir::new().unwrap();
        clay(&home)
            .args(["config", "get", "trunk.branch"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Unknown configuration key"));
    }

    #[test]
    fn alias_used_for_import() {
        let home = TempDir::new().unwrap();
        fs::create_dir_all(home.path().join(".clay")).unwrap();
        fs::write(
            home.path().join(".clay/config.toml"),
            "[urls]\nlocal = \"127.0.0.1:1\"\n",
        )
        .unwrap();

        clay(&home)
            .args(["import", "local"])
            .write_stdin("{\"/_components/a\":{}}")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("✖ http://127.0.0.1:1/_components/a"));
    }
}

#[test]
fn completion_bash() {
    let home = TempDir::new().unwrap();
    clay(&home)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("clay"));
}
