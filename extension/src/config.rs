use anyhow::{Context, Result};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::OnceLock;

const EMBEDDED_CONFIG: &str = include_str!("../spindle.toml");

static CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub pages: PagesConfig,
    pub content_script: ContentScriptConfig,
    pub sites: SitesConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl LoggingConfig {
    pub fn level(&self) -> log::Level {
        log::Level::from_str(&self.level).unwrap_or(log::Level::Info)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PagesConfig {
    /// Page opened when the toolbar icon is clicked
    pub main: String,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            main: "popup.html".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ContentScriptConfig {
    pub files: Vec<String>,
}

impl Default for ContentScriptConfig {
    fn default() -> Self {
        Self {
            files: vec!["content.js".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Domain appears anywhere in the URL text
    #[default]
    Substring,
    /// Parsed host equals the domain or is a subdomain of it
    Suffix,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SitesConfig {
    pub match_mode: MatchMode,
    pub domains: Vec<String>,
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::Substring,
            domains: [
                "amazon.com",
                "amazon.co.uk",
                "amazon.in",
                "flipkart.com",
                "walmart.com",
                "ebay.com",
                "etsy.com",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScheduleConfig {
    pub weekly_period_minutes: u32,
    pub monthly_period_minutes: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            weekly_period_minutes: 7 * 24 * 60,
            monthly_period_minutes: 30 * 24 * 60,
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse spindle.toml")
    }

    /// Settings compiled into the wasm binary
    pub fn embedded() -> Result<Self> {
        Self::from_toml(EMBEDDED_CONFIG)
    }
}

/// Process-wide settings, parsed on first use.
///
/// Falls back to defaults when the embedded file does not parse; the error
/// is returned once so the caller can log it after the logger is up.
pub fn init() -> (&'static Config, Option<anyhow::Error>) {
    let mut failure = None;
    let config = CONFIG.get_or_init(|| match Config::embedded() {
        Ok(config) => config,
        Err(e) => {
            failure = Some(e);
            Config::default()
        }
    });
    (config, failure)
}

pub fn current() -> &'static Config {
    init().0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_matches_defaults() {
        let config = Config::embedded().unwrap();
        let defaults = Config::default();

        assert_eq!(config.logging.level(), log::Level::Info);
        assert_eq!(config.pages.main, defaults.pages.main);
        assert_eq!(config.content_script.files, defaults.content_script.files);
        assert_eq!(config.sites.match_mode, MatchMode::Substring);
        assert_eq!(config.sites.domains, defaults.sites.domains);
        assert_eq!(config.schedule.weekly_period_minutes, 10080);
        assert_eq!(config.schedule.monthly_period_minutes, 43200);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.pages.main, "popup.html");
        assert_eq!(config.sites.domains.len(), 7);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
[logging]
level = "debug"

[sites]
match_mode = "suffix"
"#,
        )
        .unwrap();

        assert_eq!(config.logging.level(), log::Level::Debug);
        assert_eq!(config.sites.match_mode, MatchMode::Suffix);
        // Domains fall back to the built-in list
        assert!(config.sites.domains.iter().any(|d| d == "etsy.com"));
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let config = Config::from_toml("[logging]\nlevel = \"loud\"").unwrap();
        assert_eq!(config.logging.level(), log::Level::Info);
    }

    #[test]
    fn test_invalid_match_mode_is_rejected() {
        assert!(Config::from_toml("[sites]\nmatch_mode = \"regex\"").is_err());
    }
}
