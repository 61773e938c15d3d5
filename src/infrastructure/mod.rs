// Infrastructure module - Configuration files, logging and the stdio line server
pub mod config;
pub mod logging;
pub mod stdio;
