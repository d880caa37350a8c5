use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::bankroll::StakePolicy;
use crate::session::DEFAULT_WINDOW;
use crate::strategy::StrategyConfig;

pub const DEFAULT_CONFIG_FILE: &str = "sixline.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Nombre de derniers tours utilisés comme requête.
    pub window: usize,
    pub strategy: StrategyConfig,
    pub stake: StakePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            strategy: StrategyConfig::default(),
            stake: StakePolicy::default(),
        }
    }
}

pub fn config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)
        .with_context(|| format!("Impossible d'écrire {:?}", path))?;
    Ok(())
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let config: AppConfig = serde_json::from_str(&json)
        .with_context(|| format!("Configuration invalide dans {:?}", path))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BetType;
    use crate::strategy::BonusKind;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.window, 12);
        assert_eq!(config.strategy.search_cap, 5);
        assert_eq!(config.strategy.max_bets, 2);
        assert_eq!(config.strategy.bet_type, BetType::SixLine);
        assert_eq!(config.strategy.bonus, BonusKind::None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "window": 50, "strategy": { "bet_type": "corner", "bonus": { "kind": "gravity", "divisor": 2.0, "cap": 5.0 } } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.window, 50);
        assert_eq!(config.strategy.bet_type, BetType::Corner);
        assert_eq!(config.strategy.bonus, BonusKind::gravity());
        assert_eq!(config.strategy.search_cap, 5);
        assert_eq!(config.stake, StakePolicy::default());
    }

    #[test]
    fn test_config_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("sixline-test-{}.json", std::process::id()));
        let config = AppConfig {
            window: 20,
            ..AppConfig::default()
        };
        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_config(Path::new("/nonexistent/sixline.json")).is_err());
    }
}
