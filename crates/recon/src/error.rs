use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// JSON / TOML parse or deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad tolerance, empty canonical label, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// One normalized alias claimed by two different canonical tenants.
    #[error("bridge alias '{alias}'{} maps to both '{first}' and '{second}'", scope_suffix(.asset))]
    ConflictingAlias {
        alias: String,
        first: String,
        second: String,
        asset: Option<String>,
    },
    /// IO error (config file read, etc.).
    #[error("IO error: {0}")]
    Io(String),
    /// CSV rendering of diff lines failed.
    #[error("export error: {0}")]
    Export(String),
}

fn scope_suffix(asset: &Option<String>) -> String {
    match asset {
        Some(a) => format!(" (asset {a})"),
        None => String::new(),
    }
}
