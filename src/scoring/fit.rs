use serde::{Deserialize, Serialize};

use crate::scoring::{has_any_tag, COMMUNICATION_TAGS, MONITORING_TAGS, REMEDIATION_TAGS};
use crate::{clamp_score, Actor, BloomSummary, FitLabel, Severity};

const MAX_DRIVERS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemFitScore {
    pub score: u32,
    pub label: FitLabel,
    pub explanation: String,
    pub drivers: Vec<String>,
}

/// Additive point system: risk base, capability bonuses, environment,
/// customer and maturity bonuses, clamped to 0..=100. Drivers keep the
/// order they were earned in.
pub fn compute_problem_fit_score(summary: &BloomSummary, actor: &Actor) -> ProblemFitScore {
    let tags = actor.lowercase_tags();
    let details = actor.startup_details.as_ref();
    let risk = summary.overall_risk_level;
    let hotspot_count = summary.hotspots.len();

    let mut score = risk.base_score();
    let mut drivers: Vec<String> = Vec::new();

    drivers.push(
        match risk {
            Severity::High => "High overall risk level requiring urgent action",
            Severity::Medium => "Moderate risk level with need for monitoring and intervention",
            Severity::Low => "Low risk level, preventive measures beneficial",
            Severity::None => "Minimal current risk, monitoring still valuable",
        }
        .to_string(),
    );

    let high_severity = summary.high_severity_count();
    let increasing = summary.increasing_count();

    let has_monitoring = has_any_tag(&tags, &MONITORING_TAGS);
    if has_monitoring && high_severity > 0 {
        score += 15;
        drivers.push("Real-time monitoring crucial for tracking high-severity hotspots".to_string());
    } else if has_monitoring && hotspot_count > 2 {
        score += 10;
        drivers.push("Multiple hotspots benefit from systematic monitoring".to_string());
    }

    let has_remediation = has_any_tag(&tags, &REMEDIATION_TAGS);
    if has_remediation && increasing > 0 {
        score += 10;
        drivers.push("Increasing trends indicate need for active remediation".to_string());
    } else if has_remediation && risk == Severity::High {
        score += 8;
        drivers.push("High risk level justifies remediation investments".to_string());
    }

    let has_communication = has_any_tag(&tags, &COMMUNICATION_TAGS);
    if has_communication && !summary.safe_areas.is_empty() && hotspot_count > 0 {
        score += 10;
        drivers.push("Mixed safe/unsafe areas require clear public communication".to_string());
    } else if has_communication && risk.is_elevated() {
        score += 8;
        drivers.push("Elevated risk demands effective citizen information systems".to_string());
    }

    let coastal_region = is_coastal_region(&summary.region);
    if let Some(details) = details {
        let environments = &details.target_environments;
        if coastal_region && environments.iter().any(|env| env == "coastal") {
            score += 10;
            drivers.push("Startup specializes in coastal environments matching this region".to_string());
        } else if !coastal_region && environments.iter().any(|env| env == "lakes") {
            score += 10;
            drivers.push("Startup specializes in lake environments matching this region".to_string());
        }

        let customer = details.typical_customer.to_lowercase();
        if ["coastal", "municipal", "beach", "port"]
            .iter()
            .any(|keyword| customer.contains(keyword))
        {
            score += 10;
            drivers.push(format!(
                "Target customers ({}) align with stakeholders affected by blooms",
                details.typical_customer
            ));
        }

        if let Some(trl) = details.trl_level.filter(|trl| *trl >= 7) {
            score += 5;
            drivers.push(format!("Mature technology (TRL {}) ready for immediate deployment", trl));
        }
    }

    if tags.iter().any(|tag| tag == "data visualization") && hotspot_count > 3 {
        score += 5;
        drivers.push("Data visualization crucial for managing multiple hotspots".to_string());
    }
    if tags.iter().any(|tag| tag == "iot") && hotspot_count > 4 {
        score += 5;
        drivers.push("IoT sensor networks ideal for distributed monitoring needs".to_string());
    }
    if tags.iter().any(|tag| tag == "satellite") && hotspot_count > 5 {
        score += 8;
        drivers.push("Satellite coverage essential for large-scale regional monitoring".to_string());
    }

    let score = clamp_score(score);
    let label = FitLabel::from_score(score);
    let explanation = generate_explanation(summary, actor, label, &tags);
    drivers.truncate(MAX_DRIVERS);

    ProblemFitScore {
        score,
        label,
        explanation,
        drivers,
    }
}

pub(crate) fn is_coastal_region(region: &str) -> bool {
    let region = region.to_lowercase();
    ["archipelago", "coast", "sea"]
        .iter()
        .any(|keyword| region.contains(keyword))
}

/// Short noun phrase for the actor's leading capability, used in generated prose.
pub fn main_capability(tags: &[String]) -> &'static str {
    if has_any_tag(tags, &["monitoring", "sensors"]) {
        "real-time monitoring"
    } else if has_any_tag(tags, &["remediation", "nutrient reduction"]) {
        "remediation and nutrient management"
    } else if has_any_tag(tags, &["communication", "apps"]) {
        "citizen communication and alerts"
    } else if has_any_tag(tags, &["data visualization"]) {
        "data visualization and analytics"
    } else if has_any_tag(tags, &["early warning"]) {
        "early warning systems"
    } else if has_any_tag(tags, &["decision support"]) {
        "decision support"
    } else {
        "environmental technology"
    }
}

fn generate_explanation(summary: &BloomSummary, actor: &Actor, label: FitLabel, tags: &[String]) -> String {
    let region = &summary.region;
    let week = summary.week;
    let risk = summary.overall_risk_level;
    let capability = main_capability(tags);
    let high_severity = summary.high_severity_count();

    match label {
        FitLabel::High if risk == Severity::High && high_severity > 0 => format!(
            "Strong fit for {} in week {}. High cyanobacteria risk with {} severe hotspot{} near popular areas. {}'s {} solution addresses critical needs for this situation.",
            region,
            week,
            high_severity,
            if high_severity > 1 { "s" } else { "" },
            actor.name,
            capability
        ),
        FitLabel::High if risk == Severity::High => format!(
            "Excellent match for {} in week {}. High bloom risk across the region creates urgent demand for {} capabilities that {} provides.",
            region, week, capability, actor.name
        ),
        FitLabel::High => format!(
            "Very good fit for {} in week {}. Multiple bloom indicators and {}'s specialized {} approach align well with current management priorities.",
            region, week, actor.name, capability
        ),
        FitLabel::Medium if matches!(risk, Severity::Medium | Severity::Low) => format!(
            "Moderate fit for {} in week {}. While current risk is {}, {}'s {} capabilities could strengthen preparedness and response capacity.",
            region, week, risk, actor.name, capability
        ),
        FitLabel::Medium if risk == Severity::High => format!(
            "Reasonable fit for {} in week {}. High bloom risk present, though {}'s {} approach may be most effective combined with complementary solutions.",
            region, week, actor.name, capability
        ),
        FitLabel::Medium => format!(
            "Moderate alignment for {} in week {}. {}'s solution offers relevant capabilities, particularly for {}.",
            region, week, actor.name, capability
        ),
        FitLabel::Low if matches!(risk, Severity::None | Severity::Low) => format!(
            "Limited immediate need in {} for week {}. With {} risk levels, {}'s {} solution may be more valuable for future prevention or different contexts.",
            region, week, risk, actor.name, capability
        ),
        FitLabel::Low => format!(
            "Some mismatch for {} in week {}. While {} risk exists, {}'s {} focus may not directly address the most pressing needs right now.",
            region, week, risk, actor.name, capability
        ),
    }
}
