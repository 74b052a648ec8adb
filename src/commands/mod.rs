pub mod base_commands;
pub mod forecast_cmd;
pub mod report_format;
pub mod runtime;
pub mod snapshot_cmd;
pub mod watch_cmd;
