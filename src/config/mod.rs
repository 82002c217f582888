use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub vakhtangov: VakhtangovConfig,
    #[serde(default)]
    pub ballet: BalletConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

/// HTTP client configuration shared by every source
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Primary source: show pages + availability feed
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VakhtangovConfig {
    #[serde(default)]
    pub urls: Vec<String>,

    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

/// Secondary source: heuristically parsed ballet pages
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BalletConfig {
    #[serde(default)]
    pub urls: Vec<String>,

    /// Budget per page; the fan-out deadline is this times the URL count.
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub allowed_users: Vec<String>,

    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    #[serde(default = "default_message_limit")]
    pub message_limit: usize,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> usize {
    2
}
fn default_retry_base_ms() -> u64 {
    500
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}
fn default_feed_url() -> String {
    "https://vakhtangov.ru/ticketland_afisha/data.json".to_string()
}
fn default_deadline_secs() -> u64 {
    5
}
fn default_page_timeout_secs() -> u64 {
    10
}
fn default_poll_timeout_secs() -> u64 {
    30
}
fn default_message_limit() -> usize {
    3800
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_ms: default_retry_base_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for VakhtangovConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            feed_url: default_feed_url(),
            deadline_secs: default_deadline_secs(),
        }
    }
}

impl Default for BalletConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            page_timeout_secs: default_page_timeout_secs(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            allowed_users: Vec::new(),
            poll_timeout_secs: default_poll_timeout_secs(),
            message_limit: default_message_limit(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("AFISHA").separator("__"))
            .build()?;

        let mut app_cfg: AppConfig = cfg
            .try_deserialize()
            .context("Invalid configuration")?;
        app_cfg.bot.apply_legacy_env(
            std::env::var("TELEGRAM_BOT_TOKEN").ok(),
            std::env::var("ALLOWED_USERS").ok(),
        );
        Ok(app_cfg)
    }
}

impl BotConfig {
    /// `TELEGRAM_BOT_TOKEN` / `ALLOWED_USERS` take precedence over the files.
    fn apply_legacy_env(&mut self, token: Option<String>, users: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.token = Some(token.trim().to_string());
        }
        if let Some(users) = users.filter(|u| !u.trim().is_empty()) {
            self.allowed_users = users.split(',').map(str::to_string).collect();
        }
        self.allowed_users = self
            .allowed_users
            .iter()
            .map(|u| u.trim().trim_start_matches('@').to_lowercase())
            .filter(|u| !u.is_empty())
            .collect();
    }

    pub fn is_allowed(&self, username: Option<&str>) -> bool {
        if self.allowed_users.is_empty() {
            return true;
        }
        let Some(name) = username else { return false };
        let name = name.to_lowercase();
        self.allowed_users.iter().any(|u| *u == name)
    }
}
