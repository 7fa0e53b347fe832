use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::alerts::{StartupAlertRule, SummarySource};
use crate::beaches::{beach_statuses, matches_query, Beach, BeachStatus};
use crate::config::{BloomConfig, DataConfig};
use crate::error::{BloomError, Result};
use crate::narrative::case_study::StartupCaseStudy;
use crate::summary::{available_regions, available_weeks, build_bloom_summary};
use crate::{Actor, BloomObservation, BloomSummary};

/// Static reference data, loaded once and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub observations: Vec<BloomObservation>,
    pub actors: Vec<Actor>,
    pub startup_alerts: HashMap<String, Vec<StartupAlertRule>>,
    pub case_studies: Vec<StartupCaseStudy>,
    pub beaches: Vec<Beach>,
    pub config: BloomConfig,
}

impl Dataset {
    pub fn load(config: &BloomConfig) -> Result<Self> {
        let data = &config.data;
        let observations: Vec<BloomObservation> = read_required(&data.observations_path())?;
        let actors: Vec<Actor> = read_required(&data.actors_path())?;
        let startup_alerts: HashMap<String, Vec<StartupAlertRule>> =
            read_optional(&data.startup_alerts_path())?.unwrap_or_default();
        let case_studies: Vec<StartupCaseStudy> =
            read_optional(&data.case_studies_path())?.unwrap_or_default();
        let beaches: Vec<Beach> = read_optional(&data.beaches_path())?.unwrap_or_default();

        info!(
            "Loaded dataset - dir={}, observations={}, actors={}, alert_sets={}, case_studies={}, beaches={}",
            data.dir.display(),
            observations.len(),
            actors.len(),
            startup_alerts.len(),
            case_studies.len(),
            beaches.len()
        );

        Ok(Self {
            observations,
            actors,
            startup_alerts,
            case_studies,
            beaches,
            config: config.clone(),
        })
    }

    pub fn from_parts(observations: Vec<BloomObservation>, actors: Vec<Actor>) -> Self {
        Self {
            observations,
            actors,
            ..Self::default()
        }
    }

    pub fn with_alerts(mut self, startup_id: &str, rules: Vec<StartupAlertRule>) -> Self {
        self.startup_alerts.insert(startup_id.to_string(), rules);
        self
    }

    pub fn data_config(&self) -> &DataConfig {
        &self.config.data
    }

    pub fn summary(&self, region: &str, week: u32) -> BloomSummary {
        build_bloom_summary(&self.observations, region, week, &self.config.summary)
    }

    pub fn actor(&self, id: &str) -> Result<&Actor> {
        self.actors
            .iter()
            .find(|actor| actor.id == id)
            .ok_or_else(|| BloomError::not_found("actor", id))
    }

    pub fn startup(&self, id: &str) -> Result<&Actor> {
        self.actors
            .iter()
            .find(|actor| actor.id == id && actor.is_startup())
            .ok_or_else(|| BloomError::not_found("startup", id))
    }

    pub fn investor(&self, id: &str) -> Result<&Actor> {
        self.actors
            .iter()
            .find(|actor| actor.id == id && actor.is_investor())
            .ok_or_else(|| BloomError::not_found("investor", id))
    }

    pub fn startups(&self) -> Vec<Actor> {
        self.actors.iter().filter(|actor| actor.is_startup()).cloned().collect()
    }

    pub fn investors(&self) -> Vec<Actor> {
        self.actors.iter().filter(|actor| actor.is_investor()).cloned().collect()
    }

    pub fn alert_rules(&self, startup_id: &str) -> &[StartupAlertRule] {
        self.startup_alerts
            .get(startup_id)
            .map(|rules| rules.as_slice())
            .unwrap_or(&[])
    }

    pub fn case_studies_for(&self, startup_id: &str) -> Vec<StartupCaseStudy> {
        self.case_studies
            .iter()
            .filter(|study| study.startup_id == startup_id)
            .cloned()
            .collect()
    }

    /// Beach statuses, narrowed to name/region matches when `query` is non-blank.
    pub fn beach_statuses(&self, query: Option<&str>) -> Vec<BeachStatus> {
        let beaches: Vec<Beach> = match query.map(str::trim).filter(|query| !query.is_empty()) {
            Some(query) => self
                .beaches
                .iter()
                .filter(|beach| matches_query(beach, query))
                .cloned()
                .collect(),
            None => self.beaches.clone(),
        };
        beach_statuses(&beaches, &self.observations)
    }

    pub fn regions(&self) -> Vec<String> {
        available_regions(&self.observations)
    }

    pub fn weeks(&self, region: Option<&str>) -> Vec<u32> {
        available_weeks(&self.observations, region)
    }
}

impl SummarySource for Dataset {
    fn bloom_summary(&self, region: &str, week: u32) -> Result<BloomSummary> {
        Ok(self.summary(region, week))
    }
}

fn read_required<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .map_err(|err| BloomError::Io(format!("failed to read {}: {}", path.display(), err)))?;
    parse_json(path, &contents)
}

fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        debug!("Optional data file missing - path={}", path.display());
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|err| BloomError::Io(format!("failed to read {}: {}", path.display(), err)))?;
    if contents.trim().is_empty() {
        return Ok(None);
    }
    parse_json(path, &contents).map(Some)
}

fn parse_json<T: DeserializeOwned>(path: &Path, contents: &str) -> Result<T> {
    serde_json::from_str(contents)
        .map_err(|err| BloomError::Data(format!("failed to parse {}: {}", path.display(), err)))
}
