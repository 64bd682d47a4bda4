use std::{fs, path::PathBuf};

use healthsweep::{
    Config, ConfigKey, ConfigValue, EffectivePolicy, SweepError, DEFAULT_RETRIES,
    DEFAULT_RETRY_WAIT_MS, DEFAULT_TIMEOUT_MS,
};

const SAMPLE: &str = r#"
global:
  timeout: 1000
  retries: 5
  retry_wait: 200
  provider:
    token: "global-token"
    account_id: "acct-1"
    zone_id: "zone-global"
entities:
  - name: web
    servers:
      - example.com
      - https://example.org/health
    retries: 3
  - name: batch
    servers: ["10.0.0.5:9000"]
    timeout: 250
    retries: 0
    retry_wait: 50
    provider:
      zone_id: "zone-batch"
"#;

fn temp_config_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("healthsweep-{}-{name}.yaml", std::process::id()))
}

#[test]
fn resolves_entities_against_global_defaults() {
    let config = Config::from_yaml_str(SAMPLE)
        .expect("sample config must parse")
        .resolve();

    let web = &config.entities()[0];
    assert_eq!(web.name, "web");
    assert_eq!(
        web.servers,
        vec!["example.com".to_owned(), "https://example.org/health".to_owned()]
    );
    assert_eq!(
        web.policy,
        EffectivePolicy {
            timeout_ms: 1_000,
            retries: 3,
            retry_wait_ms: 200,
        }
    );

    let batch = &config.entities()[1];
    assert_eq!(
        batch.policy,
        EffectivePolicy {
            timeout_ms: 250,
            retries: 0,
            retry_wait_ms: 50,
        }
    );
    assert_eq!(config.target_count(), 3);
}

#[test]
fn missing_global_block_uses_built_in_defaults() {
    let config = Config::from_yaml_str("entities:\n  - name: solo\n    servers: [a]\n")
        .expect("config must parse")
        .resolve();

    assert_eq!(
        config.entities()[0].policy,
        EffectivePolicy {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retries: DEFAULT_RETRIES,
            retry_wait_ms: DEFAULT_RETRY_WAIT_MS,
        }
    );
}

#[test]
fn lookup_by_name_prefers_entity_then_global() {
    let config = Config::from_yaml_str(SAMPLE).expect("sample config must parse");

    assert_eq!(
        config.lookup("batch", ConfigKey::ProviderZoneId),
        ConfigValue::Text("zone-batch".to_owned())
    );
    assert_eq!(
        config.lookup("batch", ConfigKey::ProviderToken),
        ConfigValue::Text("global-token".to_owned())
    );
    assert_eq!(
        config.lookup("web", ConfigKey::RetryWait),
        ConfigValue::Number(200)
    );
    assert_eq!(
        config.lookup("batch", ConfigKey::Retries),
        ConfigValue::Number(0)
    );

    for name in ["", "unknown"] {
        for key in ConfigKey::ALL {
            let global = config.lookup("", key);
            assert_eq!(config.lookup(name, key), global, "key {key}");
        }
    }
    assert_eq!(
        config.lookup("", ConfigKey::ProviderAccountId),
        ConfigValue::Text("acct-1".to_owned())
    );
}

#[test]
fn load_reads_file_from_disk() {
    let path = temp_config_path("load");
    fs::write(&path, SAMPLE).expect("must write temp config");

    let loaded = Config::load(&path);
    fs::remove_file(&path).ok();

    let config = loaded.expect("config must load");
    assert_eq!(config.entities.len(), 2);
    assert_eq!(config.global.timeout_ms, 1_000);
}

#[test]
fn load_missing_file_is_read_error() {
    let err = Config::load(temp_config_path("missing")).expect_err("load must fail");
    assert!(matches!(err, SweepError::ConfigRead { .. }));
}

#[test]
fn malformed_yaml_is_parse_error() {
    let err = Config::from_yaml_str("entities: [name: ").expect_err("parse must fail");
    assert!(matches!(err, SweepError::ConfigParse(_)));

    let err = Config::from_yaml_str("global:\n  retries: many\n").expect_err("parse must fail");
    assert!(matches!(err, SweepError::ConfigParse(_)));
}

#[test]
fn duplicate_entity_names_are_rejected() {
    let err = Config::from_yaml_str(
        "entities:\n  - name: web\n    servers: [a]\n  - name: web\n    servers: [b]\n",
    )
    .expect_err("validation must fail");
    assert!(matches!(err, SweepError::InvalidConfig(_)));
}

#[test]
fn zero_entity_timeout_falls_back_to_global() {
    let config = Config::from_yaml_str(
        "global:\n  timeout: 1000\nentities:\n  - name: web\n    timeout: 0\n    retries: 2\n    servers: [a]\n",
    )
    .expect("config must parse")
    .resolve();

    assert_eq!(config.entities()[0].policy.timeout_ms, 1_000);
    assert_eq!(config.entities()[0].policy.retries, 2);
}

#[test]
fn zero_global_timeout_is_rejected() {
    let err = Config::from_yaml_str("global:\n  timeout: 0\n").expect_err("validation must fail");
    assert!(matches!(err, SweepError::InvalidConfig(_)));
}
