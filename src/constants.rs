/// Names and defaults shared by configuration, emitters and the recorder.

// Environment variables
pub const ENV_SYSTEM_NAME: &str = "ALAMO_APPLICATION";
pub const ENV_MONITORED_URL: &str = "URL";
pub const ENV_SEARCH_TOKEN: &str = "PAPERTRAIL_TOKEN";
pub const ENV_SEARCH_URL: &str = "PAPERTRAIL_URL";
pub const ENV_METRICS_STORE_URL: &str = "INFLUXDB";
pub const ENV_PORT: &str = "PORT";
pub const ENV_TIMEOUT_ON_SEARCH: &str = "TIMEOUT_ON_SEARCH";
pub const ENV_TIME_TO_FAILURE: &str = "TIME_TO_FAILURE";
pub const ENV_DRY_RUN: &str = "TEST_MODE";
pub const ENV_APP_LOG_INTERVAL_MS: &str = "APP_LOG_INTERVAL_MS";
pub const ENV_HTTP_LOG_INTERVAL_MS: &str = "HTTP_LOG_INTERVAL_MS";
pub const ENV_WATCH_INTERVAL_MS: &str = "WATCH_INTERVAL_MS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
pub const ENV_METRICS_ADDR: &str = "METRICS_ADDR";

// Defaults
pub const DEFAULT_PORT: u16 = 9000;
pub const DEFAULT_TIMEOUT_ON_SEARCH_SECS: u64 = 3600;
pub const DEFAULT_TIME_TO_FAILURE_SECS: u64 = 60;
pub const DEFAULT_SEARCH_URL: &str = "https://papertrailapp.com";
pub const DEFAULT_APP_LOG_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_HTTP_LOG_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_WATCH_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DRAIN_PORT: u16 = 8080;

// Metric labels, one per log channel
pub const APP_LOGS_LABEL: &str = "app_logs";
pub const HTTP_LOGS_LABEL: &str = "http_logs";

// Markers
pub const MARKER_ID_MAX: u32 = 100_000_000;
pub const SAMPLES_PATH: &str = "/samples";

// Log search API
pub const SEARCH_PATH: &str = "/api/v1/events/search.json";
pub const SEARCH_TOKEN_HEADER: &str = "X-Papertrail-Token";

// Time-series store
pub const METRIC_STORE_DB: &str = "logmonitor";
pub const METRIC_MEASUREMENT: &str = "logs";
pub const METRIC_WRITE_THROTTLE_MS: u64 = 100;
