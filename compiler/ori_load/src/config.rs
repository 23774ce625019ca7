//! Loader configuration read from the environment.

/// Set to `1`/`true`/`yes`/`on` to log the result register after each top-level call.
pub const REPORT_RESULT_VAR: &str = "ORI_LOAD_REPORT";

/// Loader settings taken from the process environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadConfig {
    pub report_result: bool,
}

impl LoadConfig {
    /// Read settings from the environment; unset variables mean off.
    pub fn from_env() -> Self {
        LoadConfig {
            report_result: std::env::var(REPORT_RESULT_VAR).is_ok_and(|v| is_enabled(&v)),
        }
    }
}

fn is_enabled(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
