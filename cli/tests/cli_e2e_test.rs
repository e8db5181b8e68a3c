use assert_cmd::{Command, cargo_bin_cmd};
use testing::PayloadFile;

fn hotconf() -> Command {
    let mut cmd = cargo_bin_cmd!("hotconf");
    for key in [
        "HOTCONF_FILE",
        "HOTCONF_SETTINGS",
        "HOTCONF_S3_BUCKET",
        "HOTCONF_S3_KEY",
        "HOTCONF_REFRESH_INTERVAL_MS"
    ] {
        cmd.env_remove(key);
    }
    cmd.env("NO_COLOR", "1");
    cmd
}

const PAYLOAD: &str = r#"[
  {"alias": "a.b.c", "defaultValue": true},
  {"alias": "some.value", "defaultValue": "x", "description": "A value"},
  {"alias": "limits", "defaultValue": {"max": 10}}
]"#;

mod help_and_version {
    use super::*;
    use predicates::prelude::predicate;

    #[test]
    fn test_help_flag() {
        hotconf()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage:"))
            .stdout(predicate::str::contains("validate"))
            .stdout(predicate::str::contains("watch"));
    }

    #[test]
    fn test_version_flag() {
        hotconf()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("hotconf"));
    }

    #[test]
    fn test_no_args_shows_help() {
        hotconf()
            .assert()
            .failure()
            .stderr(predicate::str::contains("Usage:"));
    }
}

mod validate {
    use super::*;
    use predicates::prelude::predicate;

    #[test]
    fn test_valid_payload() {
        let file = PayloadFile::json(PAYLOAD);
        hotconf()
            .arg("validate")
            .arg(file.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("3 entries"));
    }

    #[test]
    fn test_valid_yaml_payload_as_json_report() {
        let file = PayloadFile::yaml("- alias: a\n  defaultValue: 1\n");
        hotconf()
            .arg("validate")
            .arg(file.path())
            .arg("--json")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"entries\": 1"))
            .stdout(predicate::str::contains("\"format\": \"yaml\""));
    }

    #[test]
    fn test_malformed_payload_fails() {
        let file = PayloadFile::json(r#"[{"alias": "a"}]"#);
        hotconf()
            .arg("validate")
            .arg(file.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid payload"));
    }

    #[test]
    fn test_strict_rejects_unknown_fields() {
        let file = PayloadFile::json(r#"[{"alias": "a", "defaultValue": 1, "extra": 2}]"#);
        hotconf().arg("validate").arg(file.path()).assert().success();
        hotconf()
            .arg("validate")
            .arg(file.path())
            .arg("--strict")
            .assert()
            .failure();
    }
}

mod get {
    use super::*;
    use predicates::prelude::predicate;

    #[test]
    fn test_get_value_from_file() {
        let file = PayloadFile::json(PAYLOAD);
        hotconf()
            .args(["get", "limits", "--file"])
            .arg(file.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("\"max\": 10"));
    }

    #[test]
    fn test_get_value_from_yaml_file() {
        let file = PayloadFile::yaml("- alias: retries\n  defaultValue: 3\n");
        hotconf()
            .args(["get", "retries", "--file"])
            .arg(file.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("3"));
    }

    #[test]
    fn test_get_value_from_env() {
        let file = PayloadFile::json(PAYLOAD);
        hotconf()
            .args(["get", "some.value"])
            .env("HOTCONF_FILE", file.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("\"x\""));
    }

    #[test]
    fn test_get_missing_alias_fails() {
        let file = PayloadFile::json(PAYLOAD);
        hotconf()
            .args(["get", "missing.alias", "--file"])
            .arg(file.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("missing.alias"));
    }

    #[test]
    fn test_get_without_source_fails() {
        hotconf()
            .args(["get", "a.b.c"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("HOTCONF_FILE"));
    }
}

mod dump {
    use super::*;
    use predicates::prelude::predicate;

    #[test]
    fn test_dump_text() {
        let file = PayloadFile::json(PAYLOAD);
        hotconf()
            .args(["dump", "--file"])
            .arg(file.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("a.b.c = true"))
            .stdout(predicate::str::contains("# A value"))
            .stdout(predicate::str::contains("Entries: 3"));
    }

    #[test]
    fn test_dump_json_is_a_payload() {
        let file = PayloadFile::json(PAYLOAD);
        let output = hotconf()
            .args(["dump", "--json", "--file"])
            .arg(file.path())
            .output()
            .unwrap();
        assert!(output.status.success());

        let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let aliases: Vec<_> = entries
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["alias"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(aliases, vec!["a.b.c", "limits", "some.value"]);
        assert_eq!(entries[2]["defaultValue"], "x");
    }
}
