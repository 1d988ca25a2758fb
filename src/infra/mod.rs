pub mod app_log;
pub mod http_client;
pub mod log_search;
pub mod metric_store;
