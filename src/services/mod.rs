pub mod allocator;
pub mod dashboard_config;
pub mod feed_client;
pub mod fetch_cache;
pub mod forecast_oracle;
pub mod history_generator;
pub mod linear_trend;
pub mod refresh_pipeline;
pub mod snapshot_table;
