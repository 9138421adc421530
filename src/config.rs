use std::path::PathBuf;

const DEFAULT_DB_FILE: &str = "tasks.db";

/// Where the task database lives. Relative paths resolve against the
/// working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub path: PathBuf,
}

impl Config {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_DB_FILE)
    }
}
