use accessor::{ConfigAccessor, ConfigError, config_interface};
use config::{ConfigurationParser, RefreshingRepository, ReloadOutcome};
use hc_core::ConfigurationRepository;
use std::sync::Arc;
use std::time::Duration;
use testing::ScriptedLoader;

config_interface! {
    struct Service in "" {
        fn some_value() -> String;
        fn port() -> u16 = 8080;
    }
}

async fn start(loader: &ScriptedLoader) -> Arc<RefreshingRepository> {
    let repo = RefreshingRepository::start(
        "Test",
        Arc::new(loader.clone()),
        ConfigurationParser::default(),
        Duration::ZERO
    )
    .await
    .unwrap();
    Arc::new(repo)
}

#[tokio::test]
async fn test_accessor_observes_each_published_snapshot() {
    let loader = ScriptedLoader::new("[]");
    let repo = start(&loader).await;
    let service = Service::new(&ConfigAccessor::new(repo.clone()));

    assert_eq!(service.some_value().unwrap(), None);
    assert_eq!(service.port().unwrap(), 8080);

    loader.set_payload(r#"[{"alias":"some.value","defaultValue":"x"},{"alias":"port","defaultValue":9090}]"#);
    assert!(matches!(repo.reload().await.unwrap(), ReloadOutcome::Published(_)));
    assert_eq!(service.some_value().unwrap(), Some("x".to_string()));
    assert_eq!(service.port().unwrap(), 9090);

    loader.set_payload("not a payload");
    assert!(repo.reload().await.is_err());
    assert_eq!(service.some_value().unwrap(), Some("x".to_string()));
}

#[tokio::test]
async fn test_mismatch_appears_after_refresh() {
    let loader = ScriptedLoader::new(r#"[{"alias":"port","defaultValue":8443}]"#);
    let repo = start(&loader).await;
    let accessor = ConfigAccessor::new(repo.clone());
    let service = Service::new(&accessor);
    assert_eq!(accessor.verify().unwrap(), 1);

    loader.set_payload(r#"[{"alias":"port","defaultValue":"https"}]"#);
    repo.reload().await.unwrap();

    assert!(matches!(service.port(), Err(ConfigError::TypeMismatch { .. })));
    assert_eq!(accessor.verify().unwrap_err().len(), 1);
}

#[tokio::test]
async fn test_put_through_read_only_repository_is_rejected() {
    let loader = ScriptedLoader::new("[]");
    let repo = start(&loader).await;
    let accessor = ConfigAccessor::new(repo.clone());

    let result = accessor.repository().put("port", serde_json::json!(1));
    assert!(matches!(result, Err(ConfigError::UnsupportedMutation { .. })));
}
