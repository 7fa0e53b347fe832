use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{BloomObservation, Severity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beach {
    pub name: String,
    pub region: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeachSafety {
    Clear,
    Suspected,
    Detected,
    Unknown,
}

impl BeachSafety {
    pub fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::High => BeachSafety::Detected,
            Severity::Medium => BeachSafety::Suspected,
            Severity::Low | Severity::None => BeachSafety::Clear,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BeachSafety::Clear => "clear",
            BeachSafety::Suspected => "suspected",
            BeachSafety::Detected => "detected",
            BeachSafety::Unknown => "unknown",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            BeachSafety::Clear => "Safe to swim",
            BeachSafety::Suspected => "Caution: suspected bloom",
            BeachSafety::Detected => "Unsafe: bloom detected",
            BeachSafety::Unknown => "Data not available",
        }
    }
}

impl std::fmt::Display for BeachSafety {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeachStatus {
    #[serde(flatten)]
    pub beach: Beach,
    pub status: BeachSafety,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Status from the most recent observation whose area is the beach.
/// Undated observations rank below dated ones; ties keep the first seen.
pub fn beach_status(beach: &Beach, observations: &[BloomObservation]) -> BeachStatus {
    let mut latest: Option<(Option<NaiveDate>, &BloomObservation)> = None;
    for obs in observations.iter().filter(|obs| obs.area_name == beach.name) {
        let date = NaiveDate::parse_from_str(obs.date.trim(), "%Y-%m-%d").ok();
        let newer = match &latest {
            Some((best, _)) => date > *best,
            None => true,
        };
        if newer {
            latest = Some((date, obs));
        }
    }

    match latest {
        Some((_, obs)) => BeachStatus {
            beach: beach.clone(),
            status: BeachSafety::from_severity(obs.severity),
            severity: Some(obs.severity),
            last_updated: Some(obs.date.clone()),
            description: Some(format!("Week {} observation", obs.week)),
        },
        None => BeachStatus {
            beach: beach.clone(),
            status: BeachSafety::Unknown,
            severity: None,
            last_updated: None,
            description: None,
        },
    }
}

pub fn beach_statuses(beaches: &[Beach], observations: &[BloomObservation]) -> Vec<BeachStatus> {
    beaches
        .iter()
        .map(|beach| beach_status(beach, observations))
        .collect()
}

/// Case-insensitive substring match on beach name or region. A blank query
/// matches nothing.
pub fn matches_query(beach: &Beach, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return false;
    }
    beach.name.to_lowercase().contains(&query) || beach.region.to_lowercase().contains(&query)
}
