use log_monitor::config::FileConfig;
use log_monitor::error::MonitorError;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn loads_complete_toml_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
system_name = "checkout"
monitored_url = "https://checkout.example.com"
search_token = "abc123"
metrics_store_url = "http://influx.internal:8086"
port = 9100
timeout_on_search_secs = 1800
time_to_failure_secs = 30
watch_interval_ms = 10000
metrics_addr = "127.0.0.1:9464"
"#
    )
    .unwrap();

    let cfg = FileConfig::load(file.path())
        .unwrap()
        .merge_env(no_env)
        .unwrap()
        .finish()
        .unwrap();

    assert_eq!(cfg.system_name, "checkout");
    assert_eq!(cfg.port, 9100);
    assert_eq!(cfg.timeout_on_search_secs, 1800);
    assert_eq!(cfg.time_to_failure_secs, 30);
    assert_eq!(cfg.watch_interval, Duration::from_secs(10));
    assert_eq!(cfg.app_log_interval, Duration::from_secs(1));
    assert_eq!(cfg.metrics_addr, Some("127.0.0.1:9464".parse().unwrap()));
}

#[test]
fn unknown_keys_are_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "sytem_name = \"typo\"").unwrap();

    let err = FileConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, MonitorError::Toml(_)));
}

#[test]
fn missing_file_is_a_config_error() {
    let err = FileConfig::load(std::path::Path::new("/definitely/not/here.toml")).unwrap_err();
    assert!(matches!(err, MonitorError::Config(_)));
}

#[test]
fn invalid_metrics_addr_is_rejected() {
    let cfg = FileConfig::from_toml_str(
        r#"
system_name = "a"
monitored_url = "http://a"
search_token = "t"
dry_run = true
metrics_addr = "not an address"
"#,
    )
    .unwrap()
    .finish();

    assert!(matches!(cfg, Err(MonitorError::Config(_))));
}
