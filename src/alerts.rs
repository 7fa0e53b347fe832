use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BloomError, Result};
use crate::{BloomSummary, Severity, Trend};

pub const FIRST_WEEK: u32 = 1;
pub const LAST_WEEK: u32 = 53;

/// Early-May to late-July window used by the multi-region overview.
pub const SEASON_WEEKS: (u32, u32) = (17, 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AlertUseCase {
    Pilot,
    Sales,
    Investor,
}

impl AlertUseCase {
    pub const ALL: [AlertUseCase; 3] = [AlertUseCase::Pilot, AlertUseCase::Sales, AlertUseCase::Investor];

    /// Comma-separated list such as `pilot,sales`. Blank means every use case.
    pub fn parse_list(value: &str) -> Result<Vec<Self>> {
        let mut use_cases = Vec::new();
        for part in value.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            let use_case = Self::from_str(part)
                .ok_or_else(|| BloomError::validation(format!("unknown use case: {}", part)))?;
            if !use_cases.contains(&use_case) {
                use_cases.push(use_case);
            }
        }
        if use_cases.is_empty() {
            return Ok(Self::ALL.to_vec());
        }
        Ok(use_cases)
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pilot" => Some(AlertUseCase::Pilot),
            "sales" => Some(AlertUseCase::Sales),
            "investor" => Some(AlertUseCase::Investor),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AlertUseCase::Pilot => "pilot",
            AlertUseCase::Sales => "sales",
            AlertUseCase::Investor => "investor",
        }
    }
}

/// Conjunction of optional predicates. Unset fields never reject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertConditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_overall_risk: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_overall_risk: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_high_severity_hotspots: Option<u32>,
    pub require_increasing_trend: bool,
    pub require_tourist_areas_hint: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupAlertRule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub use_case: AlertUseCase,
    #[serde(default)]
    pub conditions: AlertConditions,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleMatch {
    pub matches: bool,
    pub reason: Option<String>,
}

impl RuleMatch {
    fn rejected() -> Self {
        Self {
            matches: false,
            reason: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfectWeekMatch {
    pub region: String,
    pub week: u32,
    pub rule_id: String,
    pub rule_name: String,
    pub use_case: AlertUseCase,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfectWeekOverview {
    pub startup_id: String,
    pub region: String,
    pub matches: Vec<PerfectWeekMatch>,
}

impl PerfectWeekOverview {
    pub fn retain_use_cases(&mut self, use_cases: &[AlertUseCase]) {
        self.matches.retain(|found| use_cases.contains(&found.use_case));
    }

    /// Distinct weeks with at least one match, ascending.
    pub fn perfect_weeks(&self) -> Vec<u32> {
        let mut weeks: Vec<u32> = self.matches.iter().map(|found| found.week).collect();
        weeks.sort_unstable();
        weeks.dedup();
        weeks
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionPerfectWeeks {
    pub region: String,
    pub perfect_weeks: Vec<u32>,
    pub perfect_week_count: usize,
    pub matches: Vec<PerfectWeekMatch>,
}

/// Region by week overview for one startup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfectWeekGrid {
    pub startup_id: String,
    pub weeks: Vec<u32>,
    pub use_cases: Vec<AlertUseCase>,
    pub regions: Vec<RegionPerfectWeeks>,
    pub total_perfect_weeks: usize,
}

/// Anything that can produce a summary for a (region, week) pair.
pub trait SummarySource {
    fn bloom_summary(&self, region: &str, week: u32) -> Result<BloomSummary>;
}

/// Evaluates conditions in a fixed order and stops at the first failure.
pub fn does_summary_match_rule(summary: &BloomSummary, rule: &StartupAlertRule) -> RuleMatch {
    let conditions = &rule.conditions;
    let risk = summary.overall_risk_level;
    let mut reasons: Vec<String> = Vec::new();

    if let Some(min_risk) = conditions.min_overall_risk {
        if risk < min_risk {
            return RuleMatch::rejected();
        }
        reasons.push(format!("{} overall risk", risk));
    }

    if let Some(max_risk) = conditions.max_overall_risk {
        if risk > max_risk {
            return RuleMatch::rejected();
        }
    }

    if let Some(min_high) = conditions.min_high_severity_hotspots {
        let high = summary.high_severity_count();
        if (high as u32) < min_high {
            return RuleMatch::rejected();
        }
        reasons.push(format!(
            "{} high-severity hotspot{}",
            high,
            if high > 1 { "s" } else { "" }
        ));
    }

    if conditions.require_increasing_trend {
        if !summary.hotspots.iter().any(|hotspot| hotspot.trend == Trend::Increasing) {
            return RuleMatch::rejected();
        }
        reasons.push("risk trending upwards".to_string());
    }

    if conditions.require_tourist_areas_hint {
        if summary.tourist_hotspots().is_empty() {
            return RuleMatch::rejected();
        }
        reasons.push("affecting tourist areas".to_string());
    }

    let reason = if reasons.is_empty() {
        "Matches alert conditions.".to_string()
    } else {
        format!("{}.", reasons.join(", "))
    };

    RuleMatch {
        matches: true,
        reason: Some(reason),
    }
}

/// Every (summary, active rule) match, in summary order then rule order.
pub fn find_perfect_weeks_in(
    summaries: &[BloomSummary],
    rules: &[StartupAlertRule],
    startup_id: &str,
    region: &str,
) -> PerfectWeekOverview {
    let mut matches = Vec::new();

    for summary in summaries {
        for rule in rules.iter().filter(|rule| rule.is_active) {
            let result = does_summary_match_rule(summary, rule);
            if !result.matches {
                continue;
            }
            matches.push(PerfectWeekMatch {
                region: summary.region.clone(),
                week: summary.week,
                rule_id: rule.id.clone(),
                rule_name: rule.name.clone(),
                use_case: rule.use_case,
                reason: result
                    .reason
                    .unwrap_or_else(|| "Matches alert conditions".to_string()),
            });
        }
    }

    PerfectWeekOverview {
        startup_id: startup_id.to_string(),
        region: region.to_string(),
        matches,
    }
}

/// Scans `weeks` for `region`, skipping weeks whose summary cannot be built.
pub fn find_perfect_weeks<S: SummarySource + ?Sized>(
    source: &S,
    rules: &[StartupAlertRule],
    startup_id: &str,
    region: &str,
    weeks: &[u32],
) -> PerfectWeekOverview {
    let mut summaries = Vec::with_capacity(weeks.len());
    for &week in weeks {
        match source.bloom_summary(region, week) {
            Ok(summary) => summaries.push(summary),
            Err(err) => warn!("Skipping week in scan - region={}, week={}, error={}", region, week, err),
        }
    }

    let overview = find_perfect_weeks_in(&summaries, rules, startup_id, region);
    debug!(
        "Scanned perfect weeks - startup={}, region={}, weeks={}, matches={}",
        startup_id,
        region,
        summaries.len(),
        overview.matches.len()
    );
    overview
}

/// Scans every region over the same weeks, keeping only matches whose rule
/// serves one of `use_cases`.
pub fn find_perfect_weeks_grid<S: SummarySource + ?Sized>(
    source: &S,
    rules: &[StartupAlertRule],
    startup_id: &str,
    regions: &[String],
    weeks: &[u32],
    use_cases: &[AlertUseCase],
) -> PerfectWeekGrid {
    let regions: Vec<RegionPerfectWeeks> = regions
        .iter()
        .map(|region| {
            let mut overview = find_perfect_weeks(source, rules, startup_id, region, weeks);
            overview.retain_use_cases(use_cases);
            let perfect_weeks = overview.perfect_weeks();
            RegionPerfectWeeks {
                region: region.clone(),
                perfect_week_count: perfect_weeks.len(),
                perfect_weeks,
                matches: overview.matches,
            }
        })
        .collect();

    let total_perfect_weeks = regions.iter().map(|row| row.perfect_week_count).sum();
    PerfectWeekGrid {
        startup_id: startup_id.to_string(),
        weeks: weeks.to_vec(),
        use_cases: use_cases.to_vec(),
        regions,
        total_perfect_weeks,
    }
}

/// Inclusive week list. Both ends must be calendar weeks (1..=53).
pub fn week_range(start: u32, end: u32) -> Result<Vec<u32>> {
    for week in [start, end] {
        if !(FIRST_WEEK..=LAST_WEEK).contains(&week) {
            return Err(BloomError::validation(format!(
                "week {} is outside {}..={}",
                week, FIRST_WEEK, LAST_WEEK
            )));
        }
    }
    if start > end {
        return Err(BloomError::validation(format!(
            "week range start {} is after end {}",
            start, end
        )));
    }
    Ok((start..=end).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Hotspot;

    fn rule(conditions: AlertConditions) -> StartupAlertRule {
        StartupAlertRule {
            id: "r1".to_string(),
            name: "Pilot window".to_string(),
            description: String::new(),
            use_case: AlertUseCase::Pilot,
            conditions,
            is_active: true,
        }
    }

    fn summary(risk: Severity, area: &str, trend: Trend) -> BloomSummary {
        BloomSummary {
            region: "Turku archipelago".to_string(),
            week: 28,
            total_observations: 5,
            hotspots: vec![Hotspot {
                area_name: area.to_string(),
                severity: risk,
                observation_count: 5,
                trend,
            }],
            safe_areas: Vec::new(),
            overall_risk_level: risk,
            key_messages: Vec::new(),
        }
    }

    #[test]
    fn empty_conditions_match_with_fallback_reason() {
        let result = does_summary_match_rule(&summary(Severity::Low, "Open Sea", Trend::Stable), &rule(AlertConditions::default()));
        assert!(result.matches);
        assert_eq!(result.reason.as_deref(), Some("Matches alert conditions."));
    }

    #[test]
    fn max_risk_rejects_but_never_adds_reason() {
        let conditions = AlertConditions {
            max_overall_risk: Some(Severity::Medium),
            require_tourist_areas_hint: true,
            ..AlertConditions::default()
        };
        let calm = does_summary_match_rule(&summary(Severity::Low, "Ruissalo Marina", Trend::Stable), &rule(conditions.clone()));
        assert_eq!(calm.reason.as_deref(), Some("affecting tourist areas."));

        let rough = does_summary_match_rule(&summary(Severity::High, "Ruissalo Marina", Trend::Stable), &rule(conditions));
        assert_eq!(rough, RuleMatch { matches: false, reason: None });
    }

    #[test]
    fn inactive_rules_are_ignored() {
        let mut inactive = rule(AlertConditions::default());
        inactive.is_active = false;
        let overview = find_perfect_weeks_in(
            &[summary(Severity::High, "Bay", Trend::Increasing)],
            &[inactive],
            "s1",
            "Turku archipelago",
        );
        assert!(overview.matches.is_empty());
    }

    #[test]
    fn conditions_deserialize_from_partial_json() {
        let parsed: StartupAlertRule = serde_json::from_str(
            r#"{"id":"a","name":"High season","useCase":"sales","conditions":{"minOverallRisk":"medium"}}"#,
        )
        .unwrap();
        assert!(parsed.is_active);
        assert_eq!(parsed.conditions.min_overall_risk, Some(Severity::Medium));
        assert!(!parsed.conditions.require_increasing_trend);
    }

    #[test]
    fn inverted_week_range_is_rejected() {
        assert_eq!(week_range(26, 28).unwrap(), vec![26, 27, 28]);
        assert!(matches!(week_range(30, 28), Err(BloomError::Validation(_))));
    }

    #[test]
    fn week_range_is_bounded_to_calendar_weeks() {
        assert_eq!(week_range(1, 53).unwrap().len(), 53);
        assert!(matches!(week_range(0, 4), Err(BloomError::Validation(_))));
        assert!(matches!(week_range(1, 54), Err(BloomError::Validation(_))));
        assert!(matches!(week_range(0, u32::MAX), Err(BloomError::Validation(_))));
    }

    #[test]
    fn use_case_list_parses_and_defaults_to_all() {
        assert_eq!(
            AlertUseCase::parse_list("sales, pilot,sales").unwrap(),
            vec![AlertUseCase::Sales, AlertUseCase::Pilot]
        );
        assert_eq!(AlertUseCase::parse_list("").unwrap(), AlertUseCase::ALL.to_vec());
        assert!(matches!(AlertUseCase::parse_list("pilot,press"), Err(BloomError::Validation(_))));
    }
}
