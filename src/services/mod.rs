pub mod cli_runner;
pub mod loader;
pub mod refresh;
pub mod source;
pub mod trace;
