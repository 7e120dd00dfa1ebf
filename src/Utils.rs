/// settings of the sorter stored as JSON
pub mod config;
/// terminal and file logging
pub mod logger;
