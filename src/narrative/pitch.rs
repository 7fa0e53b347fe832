use serde::Serialize;
use std::fmt::Write;

use crate::scoring::{has_any_tag, MONITORING_TAGS, OUTREACH_TAGS, REMEDIATION_TAGS};
use crate::{Actor, BloomSummary, Severity};

const MAX_BULLETS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slide {
    pub title: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchSnippet {
    pub problem_slide: Slide,
    pub solution_slide: Slide,
}

/// Two slides: the bloom problem this week, and how the actor answers it.
pub fn build_pitch_snippet(summary: &BloomSummary, actor: &Actor) -> PitchSnippet {
    PitchSnippet {
        problem_slide: problem_slide(summary),
        solution_slide: solution_slide(summary, actor),
    }
}

fn problem_slide(summary: &BloomSummary) -> Slide {
    let risk = summary.overall_risk_level;
    let observations = summary.total_observations;
    let hotspots = summary.hotspots.len();
    let high_severity = summary.high_severity_count();
    let increasing = summary.increasing_count();
    let mut bullets = Vec::new();

    bullets.push(match risk {
        Severity::High => format!(
            "High cyanobacteria risk detected with {} observations across the region",
            observations
        ),
        Severity::Medium => format!("Moderate cyanobacteria levels present with {} observations", observations),
        Severity::Low => format!(
            "Low but present cyanobacteria levels detected ({} observations)",
            observations
        ),
        Severity::None => format!(
            "Minimal current risk, but monitoring shows {} observations requiring vigilance",
            observations
        ),
    });

    if high_severity > 0 {
        bullets.push(format!(
            "{} high-severity hotspot{} near popular swimming areas requiring immediate attention",
            high_severity,
            if high_severity > 1 { "s" } else { "" }
        ));
    } else if hotspots > 0 {
        bullets.push(format!(
            "{} active hotspot{} detected across the region",
            hotspots,
            if hotspots > 1 { "s" } else { "" }
        ));
    }

    if increasing > 0 {
        bullets.push(format!(
            "Incidents increasing in {} location{}, indicating worsening conditions",
            increasing,
            if increasing > 1 { "s" } else { "" }
        ));
    } else if hotspots > 2 && risk != Severity::None {
        bullets.push(
            "Geographic spread across multiple areas complicates management and public communication".to_string(),
        );
    }

    if risk == Severity::High || high_severity > 0 {
        bullets.push(
            "Beach closures and health advisories create uncertainty for swimmers, families, and tourism operators"
                .to_string(),
        );
    } else if !summary.safe_areas.is_empty() && hotspots > 0 {
        bullets.push(format!(
            "Mixed conditions ({} safe areas vs {} hotspots) require clear public information to guide decisions",
            summary.safe_areas.len(),
            hotspots
        ));
    } else if risk != Severity::None {
        bullets.push(
            "Uncertain water conditions affect public confidence in coastal activities and require proactive monitoring"
                .to_string(),
        );
    }

    bullets.push(
        if risk == Severity::High || increasing > 2 {
            "Urgent need for early warning systems and rapid response capabilities to protect public health"
        } else if risk == Severity::Medium || hotspots > 2 {
            "Municipalities need better tools for monitoring, forecasting, and communicating bloom risks"
        } else {
            "Proactive monitoring and communication can prevent escalation and maintain public trust"
        }
        .to_string(),
    );

    bullets.truncate(MAX_BULLETS);
    Slide {
        title: format!("Cyanobacteria Risk in {}, Week {}", summary.region, summary.week),
        bullets,
    }
}

fn find_benefit<'a>(benefits: &'a [String], fragments: &[&str]) -> &'a String {
    benefits
        .iter()
        .find(|benefit| {
            let benefit = benefit.to_lowercase();
            fragments.iter().any(|fragment| benefit.contains(fragment))
        })
        .unwrap_or(&benefits[0])
}

fn solution_slide(summary: &BloomSummary, actor: &Actor) -> Slide {
    let tags = actor.lowercase_tags();
    let risk = summary.overall_risk_level;
    let hotspots = summary.hotspots.len();
    let increasing = summary.increasing_count();

    let has_monitoring = has_any_tag(&tags, &MONITORING_TAGS);
    let has_remediation = has_any_tag(&tags, &REMEDIATION_TAGS);
    let has_communication = has_any_tag(&tags, &OUTREACH_TAGS);

    let mut bullets = Vec::new();

    bullets.push(if has_monitoring {
        format!("Real-time monitoring and early detection: {}", actor.description)
    } else if has_remediation {
        format!("Active remediation and nutrient reduction: {}", actor.description)
    } else if has_communication {
        format!("Public communication and decision support: {}", actor.description)
    } else {
        actor.description.clone()
    });

    let details = actor.startup_details.as_ref();
    match details {
        Some(details) => bullets.push(format!(
            "Designed for {} operating in {} environments",
            details.typical_customer,
            details
                .target_environments
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        )),
        None => bullets.push(
            "Serving coastal municipalities, environmental agencies, and water management authorities".to_string(),
        ),
    }

    match details.filter(|details| !details.key_benefits.is_empty()) {
        Some(details) => {
            let benefits = &details.key_benefits;
            let leading = if has_monitoring && (risk == Severity::High || increasing > 0) {
                find_benefit(benefits, &["early", "detect", "alert"])
            } else if has_remediation && (risk == Severity::High || hotspots > 2) {
                find_benefit(benefits, &["reduc", "treat", "remediat"])
            } else if has_communication && (!summary.safe_areas.is_empty() || hotspots > 0) {
                find_benefit(benefits, &["alert", "inform", "public"])
            } else {
                &benefits[0]
            };
            bullets.push(leading.clone());
            if let Some(second) = benefits.get(1) {
                bullets.push(second.clone());
            }
        }
        None => {
            if has_monitoring {
                bullets.push("Enables 24-48 hour early warnings to reduce public exposure to toxic blooms".to_string());
            } else if has_remediation {
                bullets.push("Reduces bloom intensity and duration through targeted interventions".to_string());
            } else if has_communication {
                bullets.push(
                    "Empowers citizens with transparent, real-time information for safer water activities".to_string(),
                );
            }
        }
    }

    if let Some(details) = details {
        bullets.push(match details.trl_level.filter(|trl| *trl > 0) {
            Some(trl) if trl >= 7 => format!(
                "Proven technology (TRL {}) ready for deployment at {}",
                trl, details.deployment_scale
            ),
            Some(trl) => format!(
                "Innovative solution (TRL {}) available for pilot deployment at {}",
                trl, details.deployment_scale
            ),
            None => format!("Ready for deployment at {}", details.deployment_scale),
        });
    }

    bullets.truncate(MAX_BULLETS);
    Slide {
        title: format!("How {} Addresses the Bloom Challenge", actor.name),
        bullets,
    }
}

pub fn format_pitch_as_text(pitch: &PitchSnippet) -> String {
    let mut text = format!("Problem Slide: {}\n", pitch.problem_slide.title);
    for bullet in &pitch.problem_slide.bullets {
        let _ = writeln!(text, "• {}", bullet);
    }
    let _ = writeln!(text, "\nSolution Slide: {}", pitch.solution_slide.title);
    for bullet in &pitch.solution_slide.bullets {
        let _ = writeln!(text, "• {}", bullet);
    }
    text
}

pub fn format_pitch_as_markdown(pitch: &PitchSnippet) -> String {
    let mut markdown = format!("## {}\n\n", pitch.problem_slide.title);
    for bullet in &pitch.problem_slide.bullets {
        let _ = writeln!(markdown, "- {}", bullet);
    }
    let _ = write!(markdown, "\n## {}\n\n", pitch.solution_slide.title);
    for bullet in &pitch.solution_slide.bullets {
        let _ = writeln!(markdown, "- {}", bullet);
    }
    markdown
}
