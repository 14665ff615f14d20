//! Configuration loader

use ::config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::error::SignalError;

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with FLOWBOT__, e.g. FLOWBOT__DECISION__POLICY)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, SignalError> {
    dotenvy::dotenv().ok();

    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        } else {
            tracing::warn!("Config file {} not found, using defaults", path);
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("FLOWBOT")
            .prefix_separator("__")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("aggregator.product_ids")
            .try_parsing(true),
    );

    let config: AppConfig = builder
        .build()
        .map_err(|e| SignalError::Config(e.to_string()))?
        .try_deserialize()
        .map_err(|e| SignalError::Config(e.to_string()))?;

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::PolicyKind;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.aggregator.window_secs, 60);
        assert_eq!(config.aggregator.tick_secs, 30);
        assert_eq!(config.decision.volume_threshold, 1_400_000.0);
        assert_eq!(config.decision.min_streak, 3);
        assert_eq!(config.decision.policy, PolicyKind::TrailingRun);
        assert_eq!(config.ratio_log.max_lines, 1000);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[decision]
policy = "sign_flip"
volume_threshold = 900000.0

[aggregator]
window_secs = 120
product_ids = ["BTC-USD"]
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.decision.policy, PolicyKind::SignFlip);
        assert_eq!(config.decision.volume_threshold, 900000.0);
        assert_eq!(config.aggregator.window_secs, 120);
        assert_eq!(config.aggregator.product_ids, vec!["BTC-USD".to_string()]);
        // Untouched sections keep their defaults
        assert_eq!(config.aggregator.tick_secs, 30);
        assert_eq!(config.decision.flip_cap, 20.0);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config(Some("/nonexistent/flowbot.toml")).unwrap();
        assert_eq!(config.feed.cycle_secs, 3000);
    }

    #[test]
    fn test_validate_rejects_zero_tick() {
        let mut config = AppConfig::default();
        config.aggregator.tick_secs = 0;
        assert!(matches!(config.validate(), Err(SignalError::Config(_))));

        let mut config = AppConfig::default();
        config.decision.min_streak = 0;
        assert!(config.validate().is_err());
    }
}
