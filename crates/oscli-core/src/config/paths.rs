use std::path::PathBuf;

/// Environment variable overriding the default configuration location.
pub const CONFIG_ENV: &str = "OSCLI_CONFIG";

const CONFIG_DIR: &str = ".oscli";
const CONFIG_FILE: &str = "config";

/// Default configuration path: `$OSCLI_CONFIG` when set, otherwise
/// `~/.oscli/config`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path_str) = std::env::var(CONFIG_ENV)
        && !path_str.is_empty()
    {
        return PathBuf::from(path_str);
    }

    match dirs::home_dir() {
        Some(home) => home.join(CONFIG_DIR).join(CONFIG_FILE),
        None => {
            tracing::error!(
                event = "core.config.home_dir_not_found",
                fallback = ".",
                "Could not determine home directory - using current directory as fallback"
            );
            PathBuf::from(".").join(CONFIG_DIR).join(CONFIG_FILE)
        }
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
