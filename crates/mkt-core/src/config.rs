use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{domain::UserId, errors::Error, Result};

/// Typed process configuration, loaded from the environment (with `.env`
/// support). Distinct from the persisted [`crate::settings::BotSettings`]
/// document, which admins mutate at runtime.
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub discord_bot_token: String,
    pub owner_id: UserId,

    // Remote document store (optional; local files are used when absent)
    pub jsonbin_api_key: Option<String>,
    pub listings_bin_id: Option<String>,
    pub config_bin_id: Option<String>,

    // Local fallback files live here (`listings.json`, `config.json`)
    pub data_dir: PathBuf,

    // Negotiation-channel timing
    pub reminder_interval: Duration,
    pub close_grace: Duration,
    pub decline_grace: Duration,
}

/// Platform UI limit: at most this many entries are offered for removal.
pub const REMOVAL_VIEW_LIMIT: usize = 25;

/// Buttons per action row in removal panels.
pub const BUTTONS_PER_ROW: usize = 5;

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let discord_bot_token = env_str("DISCORD_BOT_TOKEN").unwrap_or_default();
        if discord_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "DISCORD_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let owner_id = env_str("BOT_OWNER_ID")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("BOT_OWNER_ID environment variable is required".to_string())
            })?;

        let jsonbin_api_key = env_str("JSONBIN_API_KEY").and_then(non_empty);
        let listings_bin_id = env_str("JSONBIN_BIN_ID").and_then(non_empty);
        let config_bin_id = env_str("CONFIG_BIN_ID").and_then(non_empty);

        let data_dir = env_path("DATA_DIR").unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&data_dir)?;

        let reminder_interval =
            Duration::from_secs(env_u64("REMINDER_INTERVAL_SECS").unwrap_or(24 * 60 * 60));
        let close_grace = Duration::from_secs(env_u64("CLOSE_GRACE_SECS").unwrap_or(5));
        let decline_grace = Duration::from_secs(env_u64("DECLINE_GRACE_SECS").unwrap_or(10));

        Ok(Self {
            discord_bot_token,
            owner_id: UserId::new(owner_id.trim()),
            jsonbin_api_key,
            listings_bin_id,
            config_bin_id,
            data_dir,
            reminder_interval,
            close_grace,
            decline_grace,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };
    for line in contents.lines() {
        let Some((key, value)) = parse_dotenv_line(line) else {
            continue;
        };
        // The real environment always wins over the file.
        if env::var_os(key).is_none() {
            env::set_var(key, value);
        }
    }
}

/// One `.env` line: `KEY=value`, with an optional `export ` prefix, `#`
/// comments, and surrounding single or double quotes on the value. Anything
/// else is skipped, never an error.
fn parse_dotenv_line(raw: &str) -> Option<(&str, &str)> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);

    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    let value = value.trim();
    let unquoted = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);
    Some((key, unquoted))
}
