use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::config::SummaryConfig;
use crate::{BloomObservation, BloomSummary, Hotspot, Severity, Trend};

struct AreaStats {
    area_name: String,
    severity: Severity,
    count: u32,
}

/// Aggregates raw observations into the regional summary for one week.
///
/// The previous week (`week - 1`) only feeds trend classification. An empty
/// selection is a valid summary with zero observations and `none` risk.
pub fn build_bloom_summary(
    observations: &[BloomObservation],
    region: &str,
    week: u32,
    config: &SummaryConfig,
) -> BloomSummary {
    let current: Vec<&BloomObservation> = observations
        .iter()
        .filter(|obs| obs.region == region && obs.week == week)
        .collect();

    let mut previous_counts: HashMap<&str, u32> = HashMap::new();
    if let Some(previous_week) = week.checked_sub(1) {
        for obs in observations
            .iter()
            .filter(|obs| obs.region == region && obs.week == previous_week)
        {
            *previous_counts.entry(obs.area_name.as_str()).or_insert(0) += 1;
        }
    }

    let areas = group_by_area(&current);

    let mut hotspots: Vec<Hotspot> = areas
        .iter()
        .filter(|area| area.severity != Severity::None)
        .map(|area| Hotspot {
            area_name: area.area_name.clone(),
            severity: area.severity,
            observation_count: area.count,
            trend: classify_trend(
                area.count,
                previous_counts.get(area.area_name.as_str()).copied().unwrap_or(0),
                config.trend_threshold_percent,
            ),
        })
        .collect();
    hotspots.sort_by(|a, b| b.severity.cmp(&a.severity));

    let safe_areas: Vec<String> = areas
        .iter()
        .filter(|area| matches!(area.severity, Severity::None | Severity::Low))
        .map(|area| area.area_name.clone())
        .collect();

    let overall_risk_level = max_severity(current.iter().map(|obs| obs.severity));
    let key_messages = generate_key_messages(&hotspots, &safe_areas, overall_risk_level);

    debug!(
        "Built summary - region={}, week={}, observations={}, hotspots={}, risk={}",
        region,
        week,
        current.len(),
        hotspots.len(),
        overall_risk_level
    );

    hotspots.truncate(config.max_hotspots);

    BloomSummary {
        region: region.to_string(),
        week,
        total_observations: current.len() as u32,
        hotspots,
        safe_areas,
        overall_risk_level,
        key_messages,
    }
}

fn group_by_area(observations: &[&BloomObservation]) -> Vec<AreaStats> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut areas: Vec<AreaStats> = Vec::new();

    for obs in observations {
        match index.get(obs.area_name.as_str()) {
            Some(&position) => {
                let area = &mut areas[position];
                area.count += 1;
                area.severity = area.severity.max(obs.severity);
            }
            None => {
                index.insert(obs.area_name.as_str(), areas.len());
                areas.push(AreaStats {
                    area_name: obs.area_name.clone(),
                    severity: obs.severity,
                    count: 1,
                });
            }
        }
    }

    areas
}

/// Highest severity by `none < low < medium < high`, `none` when empty.
pub fn max_severity(severities: impl IntoIterator<Item = Severity>) -> Severity {
    severities.into_iter().max().unwrap_or(Severity::None)
}

pub fn classify_trend(current: u32, previous: u32, threshold_percent: f64) -> Trend {
    if previous == 0 {
        return Trend::Unknown;
    }
    let change = (current as f64 - previous as f64) * 100.0 / previous as f64;
    if change > threshold_percent {
        Trend::Increasing
    } else if change < -threshold_percent {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn generate_key_messages(hotspots: &[Hotspot], safe_areas: &[String], overall: Severity) -> Vec<String> {
    let mut messages = Vec::new();

    messages.push(
        match overall {
            Severity::High => "⚠️ High cyanobacteria risk detected in the region",
            Severity::Medium => "⚡ Moderate cyanobacteria levels present",
            Severity::Low => "✓ Low cyanobacteria levels overall",
            Severity::None => "✓ No significant cyanobacteria detected",
        }
        .to_string(),
    );

    if !hotspots.is_empty() {
        messages.push(format!(
            "{} hotspot area{} require attention",
            hotspots.len(),
            if hotspots.len() > 1 { "s" } else { "" }
        ));
    }

    if !safe_areas.is_empty() {
        messages.push(format!(
            "{} area{} safe for activities",
            safe_areas.len(),
            if safe_areas.len() > 1 { "s are" } else { " is" }
        ));
    }

    let increasing = hotspots
        .iter()
        .filter(|hotspot| hotspot.trend == Trend::Increasing)
        .count();
    if increasing > 0 {
        messages.push(format!(
            "{} area{} increasing trends",
            increasing,
            if increasing > 1 { "s show" } else { " shows" }
        ));
    }

    messages
}

pub fn available_regions(observations: &[BloomObservation]) -> Vec<String> {
    observations
        .iter()
        .map(|obs| obs.region.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct weeks, newest first.
pub fn available_weeks(observations: &[BloomObservation], region: Option<&str>) -> Vec<u32> {
    observations
        .iter()
        .filter(|obs| region.map_or(true, |region| obs.region == region))
        .map(|obs| obs.week)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect()
}
