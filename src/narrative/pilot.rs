use serde::Serialize;
use std::fmt::Write;

use crate::scoring::{has_any_tag, COMMUNICATION_TAGS, MONITORING_TAGS, REMEDIATION_TAGS};
use crate::{plural, Actor, BloomSummary, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PilotFocus {
    Monitoring,
    Remediation,
    Communication,
    General,
}

impl PilotFocus {
    fn for_actor(actor: &Actor) -> Self {
        let tags = actor.lowercase_tags();
        if has_any_tag(&tags, &MONITORING_TAGS) {
            PilotFocus::Monitoring
        } else if has_any_tag(&tags, &REMEDIATION_TAGS) {
            PilotFocus::Remediation
        } else if has_any_tag(&tags, &COMMUNICATION_TAGS) {
            PilotFocus::Communication
        } else {
            PilotFocus::General
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PilotOpportunity {
    pub pilot_title: String,
    pub objective: String,
    pub why_now: String,
    pub key_steps: Vec<String>,
    pub success_metrics: Vec<String>,
}

/// Pilot sketch for one actor in the current week, worst hotspots first.
pub fn build_pilot_opportunity(summary: &BloomSummary, actor: &Actor) -> PilotOpportunity {
    let region = &summary.region;
    let focus = PilotFocus::for_actor(actor);
    let targets: Vec<&str> = summary
        .hotspots
        .iter()
        .take(3)
        .map(|hotspot| hotspot.area_name.as_str())
        .collect();
    let target_text = if targets.is_empty() {
        format!("key bathing and harbour sites in {}", region)
    } else {
        targets.join(", ")
    };

    let pilot_title = match focus {
        PilotFocus::Monitoring => format!("{} early-warning pilot in {}", actor.name, region),
        PilotFocus::Remediation => format!("{} hotspot remediation pilot in {}", actor.name, region),
        PilotFocus::Communication => format!("{} public bloom information pilot in {}", actor.name, region),
        PilotFocus::General => format!("{} water quality pilot in {}", actor.name, region),
    };

    let objective = match focus {
        PilotFocus::Monitoring => format!(
            "Deploy {}'s monitoring at {} to detect bloom onset early and give authorities and the public advance warning.",
            actor.name, target_text
        ),
        PilotFocus::Remediation => format!(
            "Test {}'s remediation approach at {} and measure whether bloom intensity and duration drop against untreated sites.",
            actor.name, target_text
        ),
        PilotFocus::Communication => format!(
            "Give residents and visitors around {} clear, current bloom status through {}'s tools so they can choose safe places to swim.",
            target_text, actor.name
        ),
        PilotFocus::General => format!(
            "Validate {}'s solution at {} under real bloom conditions and collect evidence for a wider rollout.",
            actor.name, target_text
        ),
    };

    let why_now = why_now(summary);

    let mut key_steps = vec![format!(
        "Agree pilot sites and baseline measurements with local authorities ({})",
        target_text
    )];
    key_steps.extend(
        match focus {
            PilotFocus::Monitoring => [
                "Install sensors or connect data feeds at the selected sites",
                "Calibrate alert thresholds against laboratory samples",
                "Share weekly risk updates with the municipality and beach operators",
            ],
            PilotFocus::Remediation => [
                "Select treatment and control sites with comparable conditions",
                "Apply the treatment during the peak bloom window",
                "Sample water quality before, during and after treatment",
            ],
            PilotFocus::Communication => [
                "Connect observation data to the public-facing channel",
                "Publish site-level status with plain-language guidance",
                "Collect feedback from visitors and beach staff",
            ],
            PilotFocus::General => [
                "Deploy the solution at the selected sites",
                "Track bloom indicators throughout the pilot",
                "Compare outcomes against previous seasons",
            ],
        }
        .iter()
        .map(|step| step.to_string()),
    );
    key_steps.push("Review results and decide on scaling to the rest of the region".to_string());

    let success_metrics = match focus {
        PilotFocus::Monitoring => vec![
            "Blooms detected before visible surface scum".to_string(),
            "Lead time of alerts to authorities and the public".to_string(),
            "Share of sites covered by continuous monitoring".to_string(),
        ],
        PilotFocus::Remediation => vec![
            "Reduction in bloom intensity at treated sites".to_string(),
            "Fewer high-severity weeks than control sites".to_string(),
            "Nutrient concentrations before and after treatment".to_string(),
        ],
        PilotFocus::Communication => vec![
            "Residents and visitors reached with bloom status".to_string(),
            "Fewer calls to municipal information lines".to_string(),
            "Visitors reporting they chose a safe area".to_string(),
        ],
        PilotFocus::General => vec![
            "Change in bloom severity at pilot sites".to_string(),
            "Stakeholder satisfaction with pilot results".to_string(),
            "Cost per site compared to current practice".to_string(),
        ],
    };

    PilotOpportunity {
        pilot_title,
        objective,
        why_now,
        key_steps,
        success_metrics,
    }
}

fn why_now(summary: &BloomSummary) -> String {
    let hotspots = summary.hotspots.len();
    let high_severity = summary.high_severity_count();
    let increasing = summary.increasing_count();

    let mut text = match summary.overall_risk_level {
        Severity::High => format!(
            "Week {} shows high cyanobacteria risk with {} {}",
            summary.week,
            hotspots,
            plural(hotspots, "hotspot", "hotspots")
        ),
        Severity::Medium => format!(
            "Week {} shows moderate cyanobacteria levels across {} {}",
            summary.week,
            hotspots,
            plural(hotspots, "area", "areas")
        ),
        Severity::Low | Severity::None => format!(
            "Week {} is relatively calm, which leaves time to prepare before the peak season",
            summary.week
        ),
    };

    if high_severity > 0 {
        let _ = write!(text, ", {} of them at high severity", high_severity);
    }
    text.push('.');

    if increasing > 0 {
        let _ = write!(
            text,
            " {} {} trending upwards, so the window for early action is now.",
            increasing,
            plural(increasing, "area is", "areas are")
        );
    }
    if !summary.safe_areas.is_empty() && hotspots > 0 {
        let _ = write!(
            text,
            " Nearby safe areas such as {} can serve as comparison sites.",
            summary.safe_areas.iter().take(2).cloned().collect::<Vec<_>>().join(", ")
        );
    }

    text
}

/// Plain-text sketch for pasting into email or a document.
pub fn format_pilot_as_text(opportunity: &PilotOpportunity, region: &str, week: u32, actor_name: &str) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "{}\n", opportunity.pilot_title);
    let _ = writeln!(text, "OBJECTIVE\n{}\n", opportunity.objective);
    let _ = writeln!(text, "WHY NOW IN {} (WEEK {})\n{}\n", region.to_uppercase(), week, opportunity.why_now);

    text.push_str("KEY STEPS\n");
    for (idx, step) in opportunity.key_steps.iter().enumerate() {
        let _ = writeln!(text, "{}. {}", idx + 1, step);
    }

    text.push_str("\nSUCCESS METRICS\n");
    for metric in &opportunity.success_metrics {
        let _ = writeln!(text, "• {}", metric);
    }

    let _ = write!(
        text,
        "\n---\nThis is a draft pilot sketch generated from the current cyanobacteria situation and {}'s profile.",
        actor_name
    );
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActorKind, Hotspot, Trend};

    fn summary() -> BloomSummary {
        BloomSummary {
            region: "Turku archipelago".to_string(),
            week: 29,
            total_observations: 8,
            hotspots: vec![
                Hotspot {
                    area_name: "Ruissalo Beach".to_string(),
                    severity: Severity::High,
                    observation_count: 5,
                    trend: Trend::Increasing,
                },
                Hotspot {
                    area_name: "Naantali Harbour".to_string(),
                    severity: Severity::Medium,
                    observation_count: 3,
                    trend: Trend::Stable,
                },
            ],
            safe_areas: vec!["Quiet Cove".to_string()],
            overall_risk_level: Severity::High,
            key_messages: Vec::new(),
        }
    }

    fn actor(tags: &[&str]) -> Actor {
        Actor {
            id: "s1".to_string(),
            name: "AlgaeWatch".to_string(),
            kind: ActorKind::Startup,
            country: "Finland".to_string(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            description: String::new(),
            url: String::new(),
            startup_details: None,
            investor_details: None,
        }
    }

    #[test]
    fn focus_follows_leading_capability() {
        let monitoring = build_pilot_opportunity(&summary(), &actor(&["Sensors", "apps"]));
        assert_eq!(monitoring.pilot_title, "AlgaeWatch early-warning pilot in Turku archipelago");
        let outreach = build_pilot_opportunity(&summary(), &actor(&["apps"]));
        assert_eq!(outreach.pilot_title, "AlgaeWatch public bloom information pilot in Turku archipelago");
        assert_eq!(outreach.key_steps.len(), 5);
        assert_eq!(outreach.success_metrics.len(), 3);
    }

    #[test]
    fn why_now_names_severity_and_trend() {
        let opportunity = build_pilot_opportunity(&summary(), &actor(&[]));
        assert_eq!(
            opportunity.why_now,
            "Week 29 shows high cyanobacteria risk with 2 hotspots, 1 of them at high severity. 1 area is trending upwards, so the window for early action is now. Nearby safe areas such as Quiet Cove can serve as comparison sites."
        );
    }

    #[test]
    fn text_sketch_layout() {
        let opportunity = build_pilot_opportunity(&summary(), &actor(&["remediation"]));
        let text = format_pilot_as_text(&opportunity, "Turku archipelago", 29, "AlgaeWatch");
        assert!(text.starts_with("AlgaeWatch hotspot remediation pilot in Turku archipelago\n\nOBJECTIVE\n"));
        assert!(text.contains("\nWHY NOW IN TURKU ARCHIPELAGO (WEEK 29)\n"));
        assert!(text.contains("KEY STEPS\n1. Agree pilot sites"));
        assert!(text.contains("\nSUCCESS METRICS\n• Reduction in bloom intensity"));
        assert!(text.ends_with("situation and AlgaeWatch's profile."));
    }
}
