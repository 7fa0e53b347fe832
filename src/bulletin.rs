use serde::Serialize;
use std::fmt::Write;

use crate::{BloomSummary, Severity, Trend};

const MAX_AVOID_AREAS: usize = 3;
const MAX_SAFE_AREAS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bulletin {
    pub citizen_bulletin: String,
    pub expert_note: String,
}

pub fn generate_bulletin(summary: &BloomSummary) -> Bulletin {
    Bulletin {
        citizen_bulletin: citizen_bulletin(summary),
        expert_note: expert_note(summary),
    }
}

fn severity_marker(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "🔴",
        Severity::Medium => "🟡",
        _ => "🟢",
    }
}

fn trend_marker(trend: Trend) -> &'static str {
    match trend {
        Trend::Increasing => "📈",
        Trend::Decreasing => "📉",
        _ => "➡️",
    }
}

/// Markdown-flavoured notice for the public.
pub fn citizen_bulletin(summary: &BloomSummary) -> String {
    let mut text = format!(
        "**Cyanobacteria Situation for {} - Week {}**\n\n",
        summary.region, summary.week
    );

    text.push_str(match summary.overall_risk_level {
        Severity::High => "🚨 **High Alert**: Significant cyanobacteria blooms have been detected in several areas. We recommend avoiding swimming and water sports in affected zones. Please check specific area conditions before visiting coastal areas.\n\n",
        Severity::Medium => "⚠️ **Moderate Caution**: Cyanobacteria levels are elevated in some areas. While many spots remain safe, we advise checking local conditions and being cautious, especially with children and pets.\n\n",
        Severity::Low => "✅ **Generally Safe**: Cyanobacteria levels are low across the region. Most areas are suitable for swimming and water activities, though it's always wise to observe local water conditions.\n\n",
        Severity::None => "🌊 **All Clear**: No significant cyanobacteria detected this week. The waters are inviting! Enjoy your coastal activities safely.\n\n",
    });

    if !summary.hotspots.is_empty() {
        text.push_str("**Areas to Avoid**:\n");
        for hotspot in summary.hotspots.iter().take(MAX_AVOID_AREAS) {
            let _ = writeln!(
                text,
                "{} {} - {} severity {}",
                severity_marker(hotspot.severity),
                hotspot.area_name,
                hotspot.severity,
                trend_marker(hotspot.trend)
            );
        }
        text.push('\n');
    }

    if !summary.safe_areas.is_empty() {
        text.push_str("**Safe Areas for Activities**:\n");
        for area in summary.safe_areas.iter().take(MAX_SAFE_AREAS) {
            let _ = writeln!(text, "✓ {}", area);
        }
        text.push('\n');
    }

    text.push_str("*Remember: Conditions can change quickly. Always observe water color and avoid areas with visible green scum. If in doubt, stay out!*");
    text
}

/// Technical summary for authorities.
pub fn expert_note(summary: &BloomSummary) -> String {
    let mut note = String::from("**Technical Summary**\n\n");
    let _ = writeln!(note, "Total observations recorded: {}", summary.total_observations);
    let _ = writeln!(
        note,
        "Overall risk classification: {}",
        summary.overall_risk_level.label().to_uppercase()
    );
    let _ = writeln!(note, "Active hotspots: {}\n", summary.hotspots.len());

    if !summary.hotspots.is_empty() {
        note.push_str("**Hotspot Analysis**:\n");
        for hotspot in &summary.hotspots {
            let _ = writeln!(
                note,
                "• {}: {} observations, {} severity, trend {}",
                hotspot.area_name, hotspot.observation_count, hotspot.severity, hotspot.trend
            );
        }
        note.push('\n');
    }

    note.push_str("**Recommended Actions**:\n");
    if summary.overall_risk_level.is_elevated() {
        note.push_str("• Increase monitoring frequency in hotspot areas\n");
        note.push_str("• Issue public advisories and update signage\n");
        note.push_str("• Consider water sampling for toxin analysis\n");
        note.push_str("• Coordinate with health authorities if persistent\n");
    } else {
        note.push_str("• Maintain regular monitoring schedule\n");
        note.push_str("• Continue public awareness programs\n");
    }

    note
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Hotspot;

    fn summary(risk: Severity, hotspots: usize, safe: usize) -> BloomSummary {
        BloomSummary {
            region: "Turku archipelago".to_string(),
            week: 28,
            total_observations: 9,
            hotspots: (0..hotspots)
                .map(|idx| Hotspot {
                    area_name: format!("Hotspot {}", idx),
                    severity: risk,
                    observation_count: 2,
                    trend: Trend::Increasing,
                })
                .collect(),
            safe_areas: (0..safe).map(|idx| format!("Safe {}", idx)).collect(),
            overall_risk_level: risk,
            key_messages: Vec::new(),
        }
    }

    #[test]
    fn citizen_bulletin_lists_at_most_three_hotspots() {
        let text = citizen_bulletin(&summary(Severity::High, 5, 7));
        assert!(text.starts_with("**Cyanobacteria Situation for Turku archipelago - Week 28**"));
        assert!(text.contains("🔴 Hotspot 2 - high severity 📈"));
        assert!(!text.contains("Hotspot 3"));
        assert!(text.contains("✓ Safe 4\n"));
        assert!(!text.contains("Safe 5"));
    }

    #[test]
    fn quiet_weeks_get_two_routine_actions() {
        let note = expert_note(&summary(Severity::Low, 0, 1));
        assert!(note.contains("Overall risk classification: LOW\n"));
        assert!(!note.contains("Hotspot Analysis"));
        assert_eq!(note.matches("• ").count(), 2);
    }
}
