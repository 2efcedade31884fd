mod cli;

pub use cli::{Cli, LOG_ENV};
