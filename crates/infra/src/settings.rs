use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use brickledger_inventory::SetStatus;
use brickledger_reconcile::TypoAssist;
use brickledger_sanity::SanityChecker;

/// Runtime configuration.
///
/// Sources, later ones winning: built-in defaults, an optional
/// `brickledger.toml`, then `BRICKLEDGER__*` environment variables
/// (`BRICKLEDGER__SUGGEST__THRESHOLD=0.8`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub suggest: SuggestConfig,
    #[serde(default)]
    pub sanity: SanityConfig,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("data/brickledger.json")
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestConfig {
    /// Minimum normalized similarity for a typo suggestion.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

fn default_threshold() -> f64 {
    0.75
}

fn default_max_candidates() -> usize {
    3
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            max_candidates: default_max_candidates(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanityConfig {
    /// Set statuses whose copies must hold their whole template.
    #[serde(default = "default_template_statuses")]
    pub template_statuses: Vec<SetStatus>,
}

fn default_template_statuses() -> Vec<SetStatus> {
    vec![SetStatus::Built, SetStatus::InBox]
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            template_statuses: default_template_statuses(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            log_filter: default_log_filter(),
            suggest: SuggestConfig::default(),
            sanity: SanityConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `brickledger.toml` (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Like [`AppConfig::load`], reading `path` instead of the default file.
    /// An explicit path must exist.
    pub fn load_from(path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name("brickledger.toml").required(false),
        };
        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("BRICKLEDGER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.suggest.threshold) {
            return Err(ConfigError::Message(format!(
                "suggest.threshold must be within 0..=1, got {}",
                self.suggest.threshold
            )));
        }
        Ok(())
    }

    pub fn typo_assist(&self) -> TypoAssist {
        TypoAssist::new(self.suggest.threshold, self.suggest.max_candidates)
    }

    pub fn sanity_checker(&self) -> SanityChecker {
        SanityChecker::new().with_template_statuses(self.sanity.template_statuses.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::default();
        assert_eq!(config.snapshot_path, PathBuf::from("data/brickledger.json"));
        assert_eq!(config.suggest.max_candidates, 3);
        assert_eq!(config.sanity.template_statuses, vec![SetStatus::Built, SetStatus::InBox]);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "log_filter = \"debug\"\n[suggest]\nthreshold = 0.9\n[sanity]\ntemplate_statuses = [\"built\", \"wip\"]"
        )
        .unwrap();

        let config = AppConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.log_filter, "debug");
        assert!((config.suggest.threshold - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.suggest.max_candidates, 3);
        assert_eq!(
            config.sanity.template_statuses,
            vec![SetStatus::Built, SetStatus::WorkInProgress]
        );
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[suggest]\nthreshold = 1.5").unwrap();
        assert!(AppConfig::load_from(Some(file.path())).is_err());
    }
}
