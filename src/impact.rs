use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BloomError, Result};
use crate::scoring::has_tag_fragment;
use crate::{capitalize, plural, Actor, BloomSummary, Severity, Trend};

const SIGNIFICANT_WEEK_DELTA: u32 = 15;
const PEAK_BASELINE: f64 = 60.0;
const PEAK_REDUCTION_BONUS: f64 = 0.1;
const REMEDIATION_BONUS: f64 = 0.05;
pub const MAX_DURATION_WEEKS: u32 = 52;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentIntensity {
    Low,
    Medium,
    High,
}

impl DeploymentIntensity {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" => Some(DeploymentIntensity::Low),
            "medium" => Some(DeploymentIntensity::Medium),
            "high" => Some(DeploymentIntensity::High),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeploymentIntensity::Low => "low",
            DeploymentIntensity::Medium => "medium",
            DeploymentIntensity::High => "high",
        }
    }

    fn max_reduction(self) -> f64 {
        match self {
            DeploymentIntensity::Low => 0.1,
            DeploymentIntensity::Medium => 0.25,
            DeploymentIntensity::High => 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactSimulationInput {
    pub region: String,
    pub start_week: u32,
    pub duration_weeks: u32,
    pub deployment_intensity: DeploymentIntensity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskPoint {
    pub week_offset: u32,
    pub baseline_risk: u32,
    pub with_solution_risk: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactSimulationResult {
    pub region: String,
    pub start_week: u32,
    pub duration_weeks: u32,
    pub actor_id: String,
    pub points: Vec<RiskPoint>,
    pub headline: String,
    pub notes: Vec<String>,
}

impl ImpactSimulationResult {
    pub fn reduction_percent(&self) -> i64 {
        average_reduction_percent(&self.points)
    }
}

fn baseline_for(severity: Severity) -> f64 {
    match severity {
        Severity::None => 10.0,
        Severity::Low => 30.0,
        Severity::Medium => 60.0,
        Severity::High => 80.0,
    }
}

/// Toy risk curve over `duration_weeks`: baseline drift from the current
/// situation against a ramped reduction from deploying the actor.
pub fn simulate_impact(
    summary: &BloomSummary,
    actor: &Actor,
    input: &ImpactSimulationInput,
) -> Result<ImpactSimulationResult> {
    let duration = input.duration_weeks;
    if duration == 0 {
        return Err(BloomError::validation("durationWeeks must be at least 1"));
    }
    if duration > MAX_DURATION_WEEKS {
        return Err(BloomError::validation(format!(
            "durationWeeks must be at most {}",
            MAX_DURATION_WEEKS
        )));
    }

    let base = baseline_for(summary.overall_risk_level);
    let increasing = summary
        .hotspots
        .iter()
        .filter(|hotspot| hotspot.trend == Trend::Increasing)
        .count() as f64
        > summary.hotspots.len() as f64 / 2.0;

    let has_remediation = has_tag_fragment(&actor.tags, &["remediation", "nutrient"]);
    let has_monitoring = has_tag_fragment(&actor.tags, &["monitoring", "sensor"]);

    let mut max_reduction = input.deployment_intensity.max_reduction();
    if has_remediation {
        max_reduction += REMEDIATION_BONUS;
    }

    let points: Vec<RiskPoint> = (0..duration)
        .map(|offset| {
            let step = offset as f64;
            let mut baseline = base;
            if increasing && step < duration as f64 / 2.0 {
                baseline += step * 3.0;
            } else if !increasing {
                baseline += step.sin() * 5.0;
            }
            let baseline = baseline.clamp(0.0, 100.0);

            let ramp = if duration > 1 {
                max_reduction * step / (duration - 1) as f64
            } else {
                max_reduction
            };
            let peak_bonus = if has_monitoring && baseline > PEAK_BASELINE {
                PEAK_REDUCTION_BONUS
            } else {
                0.0
            };
            let with_solution = (baseline * (1.0 - ramp - peak_bonus)).clamp(0.0, 100.0);

            RiskPoint {
                week_offset: offset,
                baseline_risk: baseline.round() as u32,
                with_solution_risk: with_solution.round() as u32,
            }
        })
        .collect();

    let reduction = average_reduction_percent(&points);
    let significant_weeks = points
        .iter()
        .filter(|point| point.baseline_risk.saturating_sub(point.with_solution_risk) >= SIGNIFICANT_WEEK_DELTA)
        .count();

    let headline = if reduction >= 25 {
        format!("~{}% lower average risk over {} weeks", reduction, duration)
    } else if significant_weeks > 0 {
        format!(
            "{}-intensity deployment avoids {} high-risk {} in this scenario",
            capitalize(input.deployment_intensity.label()),
            significant_weeks,
            plural(significant_weeks, "week", "weeks")
        )
    } else {
        format!("Modest ~{}% risk reduction over {} weeks", reduction, duration)
    };

    let mut notes = vec![
        "Toy model based on current risk level and startup focus (monitoring/remediation).".to_string(),
        "Assumes gradual effect over the chosen duration.".to_string(),
        "Designed for comparative storytelling, not scientific forecasting.".to_string(),
    ];
    if has_remediation {
        notes.push("Remediation solutions show stronger long-term cumulative effects.".to_string());
    }
    if has_monitoring {
        notes.push("Monitoring solutions are especially effective at reducing peak risk periods.".to_string());
    }

    debug!(
        "Simulated impact - actor={}, region={}, weeks={}, reduction={}%",
        actor.id, input.region, duration, reduction
    );

    Ok(ImpactSimulationResult {
        region: input.region.clone(),
        start_week: input.start_week,
        duration_weeks: duration,
        actor_id: actor.id.clone(),
        points,
        headline,
        notes,
    })
}

/// Relative drop of the average with-solution risk against the average baseline.
pub fn average_reduction_percent(points: &[RiskPoint]) -> i64 {
    if points.is_empty() {
        return 0;
    }
    let count = points.len() as f64;
    let baseline = points.iter().map(|point| point.baseline_risk as f64).sum::<f64>() / count;
    let with_solution = points.iter().map(|point| point.with_solution_risk as f64).sum::<f64>() / count;
    if baseline <= 0.0 {
        return 0;
    }
    ((baseline - with_solution) / baseline * 100.0).round() as i64
}
