//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use se_core::statsbomb::StatsBombConfig;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Dirichlet smoothing for event-type priors.
    pub alpha: f64,
    /// StatsBomb pitch length in source units.
    pub pitch_length: f64,
    /// StatsBomb pitch width in source units.
    pub pitch_width: f64,
    /// Seed for demo matches and sampling when `--seed` is not given.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let pitch = StatsBombConfig::default();
        Self {
            alpha: 0.5,
            pitch_length: pitch.pitch_length,
            pitch_width: pitch.pitch_width,
            seed: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // SE_ALPHA, SE_SEED, ...
        figment = figment.merge(Env::prefixed("SE_"));

        figment.extract()
    }

    pub fn statsbomb(&self) -> StatsBombConfig {
        StatsBombConfig {
            pitch_length: self.pitch_length,
            pitch_width: self.pitch_width,
        }
    }
}

/// Returns the platform-specific config directory for se.
///
/// On Linux: `~/.config/se`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("se"))
}
