//! Repositories assembled from settings files, as a service would at startup.

use accessor::{ConfigAccessor, config_interface};
use config::{RepositoryFactory, load_settings_from_file};
use std::time::Duration;
use testing::PayloadFile;

config_interface! {
    struct Limits in "limits" {
        fn max_connections() -> u32 = 16;
        fn burst() -> Option<u32>;
    }
}

#[tokio::test]
async fn test_toml_settings_to_accessor() {
    let payload = PayloadFile::json(r#"[{"alias":"limits.max.connections","defaultValue":64}]"#);
    let settings_file = PayloadFile::new(
        "hotconf.toml",
        &format!(
            "refresh_interval_ms = 60000\n\n[source]\ntype = \"file\"\npath = {:?}\n",
            payload.path().display().to_string()
        )
    );

    let settings = load_settings_from_file(settings_file.path()).unwrap();
    assert_eq!(settings.refresh_interval(), Duration::from_secs(60));

    let repo = RepositoryFactory::build(&settings).await.unwrap();
    let accessor = ConfigAccessor::new(repo);
    let limits = Limits::new(&accessor);

    assert_eq!(limits.max_connections().unwrap(), 64);
    assert_eq!(limits.burst().unwrap(), None);
    assert_eq!(accessor.verify().unwrap(), 1);
}

#[tokio::test]
async fn test_yaml_settings_with_yaml_payload() {
    let payload = PayloadFile::new("app.yml", "- alias: limits.burst\n  defaultValue: 5\n");
    let settings_file = PayloadFile::new(
        "hotconf.yaml",
        &format!(
            "source:\n  type: file\n  path: {:?}\nparser:\n  format: yaml\n  fail_on_unknown_fields: true\n",
            payload.path().display().to_string()
        )
    );

    let settings = load_settings_from_file(settings_file.path()).unwrap();
    let repo = RepositoryFactory::build(&settings).await.unwrap();
    let limits = Limits::new(&ConfigAccessor::new(repo));

    assert_eq!(limits.burst().unwrap(), Some(Some(5)));
    assert_eq!(limits.max_connections().unwrap(), 16);
}

#[tokio::test]
async fn test_settings_without_format_detect_yaml_payload() {
    let payload = PayloadFile::new("app.yaml", "- alias: limits.burst\n  defaultValue: 7\n");
    let settings_file = PayloadFile::new(
        "hotconf.toml",
        &format!(
            "refresh_interval_ms = 0\n\n[source]\ntype = \"file\"\npath = {:?}\n",
            payload.path().display().to_string()
        )
    );

    let settings = load_settings_from_file(settings_file.path()).unwrap();
    assert_eq!(settings.parser.format, None);

    let repo = RepositoryFactory::build(&settings).await.unwrap();
    let limits = Limits::new(&ConfigAccessor::new(repo));
    assert_eq!(limits.burst().unwrap(), Some(Some(7)));
}
