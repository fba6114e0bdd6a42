#![forbid(unsafe_code)]

use std::path::PathBuf;

pub const DEFAULT_API_KEY: &str = "SECRET_API_KEY";

const DEFAULT_STORAGE_DIR: &str = ".orgdir";

/// Explicit configuration threaded into the service at construction;
/// no process-wide state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub storage_dir: PathBuf,
    pub api_key: String,
}

impl ServiceConfig {
    /// CLI flags win over environment variables, which win over defaults.
    pub fn from_args() -> Self {
        Self {
            storage_dir: parse_storage_dir(),
            api_key: parse_api_key(),
        }
    }
}

fn parse_storage_dir() -> PathBuf {
    let mut args = std::env::args().skip(1);
    let mut storage_dir: Option<PathBuf> = None;
    while let Some(arg) = args.next() {
        if arg.as_str() == "--storage-dir"
            && let Some(value) = args.next()
        {
            storage_dir = Some(PathBuf::from(value));
        }
    }
    if let Some(dir) = storage_dir {
        return dir;
    }
    if let Ok(value) = std::env::var("ORGDIR_STORAGE_DIR")
        && !value.trim().is_empty()
    {
        return PathBuf::from(value);
    }
    PathBuf::from(DEFAULT_STORAGE_DIR)
}

fn parse_api_key() -> String {
    let mut args = std::env::args().skip(1);
    let mut api_key: Option<String> = None;
    while let Some(arg) = args.next() {
        if arg.as_str() == "--api-key"
            && let Some(value) = args.next()
        {
            api_key = Some(value);
        }
    }
    if let Some(key) = api_key {
        return key;
    }
    if let Ok(value) = std::env::var("ORGDIR_API_KEY")
        && !value.trim().is_empty()
    {
        return value;
    }
    DEFAULT_API_KEY.to_string()
}
