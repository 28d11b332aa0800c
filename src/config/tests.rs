use std::io::Write;

use serial_test::serial;

use super::*;

#[test]
fn defaults_cache_every_kind() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.cache.enabled_kinds, ResourceKind::ALL.to_vec());
    assert!(!settings.cache.diagnostics);
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(
        settings.database.max_connections.get(),
        DEFAULT_DB_MAX_CONNECTIONS
    );
    assert!(settings.database.url.is_none());
}

#[test]
fn overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("info".to_string());
    raw.cache.enabled_kinds = Some(vec!["view".to_string()]);

    let overrides = SettingsOverrides {
        log_level: Some("debug".to_string()),
        cache_enabled_kinds: Some(vec!["fields".to_string(), "table".to_string()]),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(
        settings.cache.enabled_kinds,
        vec![ResourceKind::Field, ResourceKind::Table]
    );
}

#[test]
fn empty_kind_list_disables_caching() {
    let mut raw = RawSettings::default();
    raw.cache.enabled_kinds = Some(Vec::new());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.cache.enabled_kinds.is_empty());
}

#[test]
fn unknown_kind_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.enabled_kinds = Some(vec!["records".to_string()]);

    let err = Settings::from_raw(raw).expect_err("unknown kind");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.enabled_kinds",
            ..
        }
    ));
}

#[test]
fn zero_connections_is_rejected() {
    let mut raw = RawSettings::default();
    raw.database.max_connections = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero connections");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "database.max_connections",
            ..
        }
    ));
}

#[test]
fn blank_database_url_is_treated_as_unset() {
    let overrides = SettingsOverrides {
        database_url: Some("   ".to_string()),
        ..Default::default()
    };
    let mut raw = RawSettings::default();
    raw.apply_overrides(&overrides);

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.database.url.is_none());
}

#[test]
#[serial]
fn explicit_file_is_loaded() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp config file");
    writeln!(
        file,
        "[logging]\njson = true\n\n[cache]\nenabled_kinds = [\"field\"]\ndiagnostics = true"
    )
    .expect("write config");

    let settings =
        load(Some(file.path()), &SettingsOverrides::default()).expect("settings should load");

    assert!(matches!(settings.logging.format, LogFormat::Json));
    assert_eq!(settings.cache.enabled_kinds, vec![ResourceKind::Field]);
    assert!(settings.cache.diagnostics);
}

#[test]
#[serial]
fn missing_explicit_file_is_an_error() {
    let err = load(
        Some(Path::new("/nonexistent/loadscope-config.toml")),
        &SettingsOverrides::default(),
    )
    .expect_err("missing file");
    assert!(matches!(err, LoadError::Build(_)));
}
