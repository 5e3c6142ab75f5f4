use std::env;

/// Client-update metadata served by the `check_update` action. Pure
/// configuration; the server never inspects the values.
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    pub version: String,
    pub url: String,
    pub force: bool,
}

impl UpdateConfig {
    pub fn from_env() -> Self {
        UpdateConfig {
            version: env::var("UPDATE_VERSION").unwrap_or_else(|_| "1.0.0".to_string()),
            url: env::var("UPDATE_URL").unwrap_or_default(),
            force: env_flag_enabled("UPDATE_FORCE"),
        }
    }
}

fn env_flag_enabled(key: &str) -> bool {
    env::var(key)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(false)
}
