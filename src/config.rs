use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{BloomError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub observations_file: String,
    pub actors_file: String,
    pub startup_alerts_file: String,
    pub case_studies_file: String,
    pub beaches_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            observations_file: "bloom_observations.json".to_string(),
            actors_file: "actors.json".to_string(),
            startup_alerts_file: "startupAlerts.json".to_string(),
            case_studies_file: "caseStudies.json".to_string(),
            beaches_file: "finnish_beaches.json".to_string(),
        }
    }
}

impl DataConfig {
    pub fn observations_path(&self) -> PathBuf {
        self.dir.join(&self.observations_file)
    }

    pub fn actors_path(&self) -> PathBuf {
        self.dir.join(&self.actors_file)
    }

    pub fn startup_alerts_path(&self) -> PathBuf {
        self.dir.join(&self.startup_alerts_file)
    }

    pub fn case_studies_path(&self) -> PathBuf {
        self.dir.join(&self.case_studies_file)
    }

    pub fn beaches_path(&self) -> PathBuf {
        self.dir.join(&self.beaches_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Week-over-week change (in percent) beyond which an area trends up or down.
    pub trend_threshold_percent: f64,
    pub max_hotspots: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            trend_threshold_percent: 20.0,
            max_hotspots: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub min_gap_score: u32,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self { min_gap_score: 15 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestorConfig {
    pub deal_flow_limit: usize,
}

impl Default for InvestorConfig {
    fn default() -> Self {
        Self { deal_flow_limit: 8 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    pub data: DataConfig,
    pub summary: SummaryConfig,
    pub radar: RadarConfig,
    pub investor: InvestorConfig,
    pub server: ServerConfig,
}

impl BloomConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>)> {
        let config_path = path.or_else(default_config_path);
        let mut config = match config_path.as_ref() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| BloomError::Config(format!("failed to read config: {}", err)))?;
                toml::from_str(&contents)
                    .map_err(|err| BloomError::Config(format!("failed to parse config: {}", err)))?
            }
            _ => BloomConfig::default(),
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| {
                    BloomError::Config(format!("failed to create config dir: {}", err))
                })?;
            }
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| BloomError::Config(format!("failed to serialize config: {}", err)))?;
        std::fs::write(path, payload)
            .map_err(|err| BloomError::Config(format!("failed to write config: {}", err)))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var("BLOOM_DATA_DIR") {
            if !dir.trim().is_empty() {
                self.data.dir = PathBuf::from(dir);
            }
        }
        if let Ok(host) = env::var("BLOOM_HOST") {
            if !host.trim().is_empty() {
                self.server.host = host;
            }
        }
        if let Ok(port) = env::var("BLOOM_PORT") {
            if let Ok(value) = port.parse::<u16>() {
                self.server.port = value;
            }
        }
        if let Ok(max_hotspots) = env::var("BLOOM_MAX_HOTSPOTS") {
            if let Ok(value) = max_hotspots.parse::<usize>() {
                self.summary.max_hotspots = value;
            }
        }
        if let Ok(min_gap) = env::var("BLOOM_MIN_GAP_SCORE") {
            if let Ok(value) = min_gap.parse::<u32>() {
                self.radar.min_gap_score = value;
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("BLOOM_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/bluebloom.toml")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_thresholds() {
        let config = BloomConfig::default();
        assert_eq!(config.summary.max_hotspots, 5);
        assert!((config.summary.trend_threshold_percent - 20.0).abs() < 1e-9);
        assert_eq!(config.radar.min_gap_score, 15);
        assert_eq!(config.investor.deal_flow_limit, 8);
        assert_eq!(config.data.observations_path(), PathBuf::from("data/bloom_observations.json"));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: BloomConfig = toml::from_str("[radar]\nmin_gap_score = 30\n").unwrap();
        assert_eq!(config.radar.min_gap_score, 30);
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.summary.max_hotspots, 5);
    }
}
