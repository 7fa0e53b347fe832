use serde::Serialize;
use tracing::debug;

use crate::config::RadarConfig;
use crate::{tags_match_loosely, Actor, BloomSummary, Severity};

const MAX_DRIVERS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemThemeId {
    EarlyWarning,
    CitizenCommunication,
    TourismSafety,
    NutrientReduction,
    InSituRemediation,
    FarmerTools,
    GovernancePlanning,
    DataIntegration,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemTheme {
    pub id: ProblemThemeId,
    pub title: &'static str,
    pub description: &'static str,
    pub coverage_tags: &'static [&'static str],
}

const THEMES: [ProblemTheme; 8] = [
    ProblemTheme {
        id: ProblemThemeId::EarlyWarning,
        title: "Early Warning & Monitoring",
        description: "Real-time detection and forecasting systems for cyanobacteria blooms",
        coverage_tags: &["monitoring", "sensors", "forecasting", "early warning"],
    },
    ProblemTheme {
        id: ProblemThemeId::CitizenCommunication,
        title: "Citizen Communication & Alerts",
        description: "Public-facing apps and platforms for bloom status and safety information",
        coverage_tags: &["communication", "apps", "alerts", "dashboard", "mobile"],
    },
    ProblemTheme {
        id: ProblemThemeId::TourismSafety,
        title: "Tourism & Beach Safety",
        description: "Solutions focused on protecting tourists and recreational water users",
        coverage_tags: &["tourism", "safety", "communication", "beach"],
    },
    ProblemTheme {
        id: ProblemThemeId::NutrientReduction,
        title: "Nutrient Reduction at Source",
        description: "Technologies to reduce phosphorus and nitrogen runoff before it reaches water bodies",
        coverage_tags: &["nutrient", "runoff", "remediation", "prevention"],
    },
    ProblemTheme {
        id: ProblemThemeId::InSituRemediation,
        title: "In-Situ Bloom Treatment",
        description: "Active technologies to treat blooms directly in affected water bodies",
        coverage_tags: &["remediation", "treatment", "cleanup", "filtration"],
    },
    ProblemTheme {
        id: ProblemThemeId::FarmerTools,
        title: "Farmer Decision Support",
        description: "Tools helping farmers optimize nutrient management to prevent runoff",
        coverage_tags: &["agriculture", "farms", "nutrient", "decision-support", "precision farming"],
    },
    ProblemTheme {
        id: ProblemThemeId::GovernancePlanning,
        title: "Governance & Planning Tools",
        description: "Systems for policy-makers to coordinate regional bloom management",
        coverage_tags: &["planning", "policy", "governance", "coordination"],
    },
    ProblemTheme {
        id: ProblemThemeId::DataIntegration,
        title: "Data Integration & Platform",
        description: "Platforms aggregating bloom data from multiple sources for unified access",
        coverage_tags: &["platform", "data", "integration", "api", "aggregation"],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionGap {
    pub theme: ProblemTheme,
    pub severity_score: u32,
    pub coverage_score: u32,
    pub gap_score: u32,
    pub summary: String,
    pub drivers: Vec<String>,
}

pub fn problem_themes() -> &'static [ProblemTheme] {
    &THEMES
}

fn severity_points(severity: Severity) -> f64 {
    match severity {
        Severity::None => 0.0,
        Severity::Low => 25.0,
        Severity::Medium => 50.0,
        Severity::High => 100.0,
    }
}

/// Need for a theme in the current situation, 0..=100.
pub fn compute_theme_severity(theme: &ProblemTheme, summary: &BloomSummary) -> u32 {
    let risk = severity_points(summary.overall_risk_level);
    let hotspots = summary.hotspots.len() as f64;
    let high_severity = summary.high_severity_count() as f64;
    let increasing = summary.increasing_count() as f64;
    let tourist = summary.tourist_hotspots().len() as f64;
    let observations = summary.total_observations as f64;

    let score = match theme.id {
        ProblemThemeId::EarlyWarning => {
            let mut score = risk * 0.6 + hotspots * 5.0;
            if increasing > 0.0 {
                score += 20.0;
            }
            score
        }
        ProblemThemeId::CitizenCommunication => {
            let mut score = hotspots * 8.0 + risk * 0.4;
            if tourist > 0.0 {
                score += 25.0;
            }
            score
        }
        ProblemThemeId::TourismSafety => {
            let mut score = tourist * 20.0 + risk * 0.3;
            if summary.overall_risk_level == Severity::High {
                score += 20.0;
            }
            score
        }
        ProblemThemeId::NutrientReduction => {
            let mut score = increasing * 15.0 + risk * 0.5;
            if high_severity >= 3.0 {
                score += 25.0;
            }
            score
        }
        ProblemThemeId::InSituRemediation => high_severity * 20.0 + risk * 0.4,
        ProblemThemeId::FarmerTools => {
            let mut score = increasing * 12.0 + risk * 0.3;
            if observations > 15.0 {
                score += 20.0;
            }
            score
        }
        ProblemThemeId::GovernancePlanning => {
            let mut score = hotspots * 10.0 + observations * 2.0;
            if hotspots > 4.0 {
                score += 20.0;
            }
            score
        }
        ProblemThemeId::DataIntegration => observations * 3.0 + hotspots * 8.0,
    };

    score.round().clamp(0.0, 100.0) as u32
}

/// Startup supply for a theme, 0..=100. Roughly three strong startups saturate it.
pub fn compute_theme_coverage(theme: &ProblemTheme, actors: &[Actor]) -> u32 {
    let mut coverage = 0u32;

    for startup in actors.iter().filter(|actor| actor.is_startup()) {
        let matching = startup
            .tags
            .iter()
            .filter(|tag| {
                theme
                    .coverage_tags
                    .iter()
                    .any(|coverage_tag| tags_match_loosely(tag, coverage_tag))
            })
            .count() as u32;

        if matching > 0 {
            coverage += matching * 10;
            if let Some(trl) = startup.trl_level() {
                coverage += trl as u32 * 2;
            }
        }
    }

    coverage.min(100)
}

pub fn gap_score(severity_score: u32, coverage_score: u32) -> u32 {
    (severity_score as f64 * (1.0 - coverage_score as f64 / 100.0)).round() as u32
}

pub fn build_solution_gap(theme: &ProblemTheme, summary: &BloomSummary, actors: &[Actor]) -> SolutionGap {
    let severity_score = compute_theme_severity(theme, summary);
    let coverage_score = compute_theme_coverage(theme, actors);
    let gap = gap_score(severity_score, coverage_score);
    let title = theme.title.to_lowercase();

    let mut summary_text = if gap > 70 {
        format!(
            "Critical gap: {} is urgently needed in {}, but startup coverage is minimal ({}%). ",
            title, summary.region, coverage_score
        )
    } else if gap > 40 {
        format!(
            "Significant opportunity: {} shows strong need for {}, with limited current solutions ({}% coverage). ",
            summary.region, title, coverage_score
        )
    } else {
        format!(
            "Moderate gap: {} could strengthen the ecosystem in {}. ",
            title, summary.region
        )
    };
    summary_text.push_str(&format!(
        "Current bloom severity is {} with {} affected areas.",
        summary.overall_risk_level,
        summary.hotspots.len()
    ));

    let mut drivers = Vec::new();

    if severity_score > 70 {
        drivers.push(format!(
            "High need indicated: severity score {}/100 based on current bloom situation",
            severity_score
        ));
    } else if severity_score > 40 {
        drivers.push(format!("Moderate need: severity score {}/100 from bloom analysis", severity_score));
    }

    if coverage_score < 30 {
        // One-directional containment here: the startup tag must carry the theme tag.
        let matching_startups = actors
            .iter()
            .filter(|actor| actor.is_startup())
            .filter(|actor| {
                actor.tags.iter().any(|tag| {
                    let tag = tag.to_lowercase();
                    theme
                        .coverage_tags
                        .iter()
                        .any(|coverage_tag| tag.contains(&coverage_tag.to_lowercase()))
                })
            })
            .count();
        if matching_startups == 0 {
            drivers.push("No startups currently addressing this theme".to_string());
        } else {
            drivers.push(format!(
                "Only {} startup{} with relevant capabilities",
                matching_startups,
                if matching_startups > 1 { "s" } else { "" }
            ));
        }
    } else if coverage_score < 60 {
        drivers.push(format!(
            "Limited startup coverage ({}%) - room for additional solutions",
            coverage_score
        ));
    }

    let high_hotspots: Vec<&str> = summary
        .hotspots
        .iter()
        .filter(|hotspot| hotspot.severity == Severity::High)
        .map(|hotspot| hotspot.area_name.as_str())
        .collect();
    if high_hotspots.len() >= 2 {
        drivers.push(format!(
            "{} high-severity hotspots require attention: {}",
            high_hotspots.len(),
            high_hotspots[..2].join(", ")
        ));
    }

    let increasing = summary.increasing_count();
    if increasing > 0 {
        drivers.push(format!(
            "{} area{} increasing bloom trends",
            increasing,
            if increasing > 1 { "s show" } else { " shows" }
        ));
    }

    let tourist: Vec<&str> = summary
        .tourist_hotspots()
        .into_iter()
        .map(|hotspot| hotspot.area_name.as_str())
        .take(2)
        .collect();
    if matches!(
        theme.id,
        ProblemThemeId::TourismSafety | ProblemThemeId::CitizenCommunication
    ) && !tourist.is_empty()
    {
        drivers.push(format!(
            "Tourist and recreational areas affected: {}",
            tourist.join(", ")
        ));
    }

    drivers.truncate(MAX_DRIVERS);

    SolutionGap {
        theme: *theme,
        severity_score,
        coverage_score,
        gap_score: gap,
        summary: summary_text,
        drivers,
    }
}

/// Gaps at or above the configured floor, largest first.
pub fn build_gap_radar(summary: &BloomSummary, actors: &[Actor], config: &RadarConfig) -> Vec<SolutionGap> {
    let mut gaps: Vec<SolutionGap> = problem_themes()
        .iter()
        .map(|theme| build_solution_gap(theme, summary, actors))
        .filter(|gap| gap.gap_score >= config.min_gap_score)
        .collect();

    gaps.sort_by(|a, b| b.gap_score.cmp(&a.gap_score));

    debug!(
        "Built gap radar - region={}, week={}, gaps={}",
        summary.region,
        summary.week,
        gaps.len()
    );

    gaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActorKind, Hotspot, StartupDetails, Trend};

    fn startup(tags: &[&str], trl: Option<u8>) -> Actor {
        Actor {
            id: tags.join("-"),
            name: "Startup".to_string(),
            kind: ActorKind::Startup,
            country: "Finland".to_string(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            description: String::new(),
            url: String::new(),
            startup_details: trl.map(|trl| StartupDetails {
                trl_level: Some(trl),
                target_environments: Vec::new(),
                typical_customer: String::new(),
                deployment_scale: String::new(),
                price_range: String::new(),
                key_benefits: Vec::new(),
                example_use_case: String::new(),
            }),
            investor_details: None,
        }
    }

    fn high_summary() -> BloomSummary {
        BloomSummary {
            region: "Turku archipelago".to_string(),
            week: 28,
            total_observations: 12,
            hotspots: vec![
                Hotspot {
                    area_name: "Ruissalo Beach".to_string(),
                    severity: Severity::High,
                    observation_count: 5,
                    trend: Trend::Increasing,
                },
                Hotspot {
                    area_name: "Naantali Harbour".to_string(),
                    severity: Severity::High,
                    observation_count: 4,
                    trend: Trend::Stable,
                },
                Hotspot {
                    area_name: "Open Sea".to_string(),
                    severity: Severity::Medium,
                    observation_count: 3,
                    trend: Trend::Unknown,
                },
            ],
            safe_areas: Vec::new(),
            overall_risk_level: Severity::High,
            key_messages: Vec::new(),
        }
    }

    #[test]
    fn theme_formulas_follow_situation() {
        let summary = high_summary();
        let themes = problem_themes();
        // 100*0.6 + 3*5 + 20
        assert_eq!(compute_theme_severity(&themes[0], &summary), 95);
        // 2 tourist*20 + 30 + 20 -> capped
        assert_eq!(compute_theme_severity(&themes[2], &summary), 90);
        // 2 high*20 + 40
        assert_eq!(compute_theme_severity(&themes[4], &summary), 80);
        // 12*3 + 3*8
        assert_eq!(compute_theme_severity(&themes[7], &summary), 60);
    }

    #[test]
    fn coverage_counts_loose_matches_and_trl() {
        let actors = vec![
            startup(&["Monitoring", "sensor networks"], Some(7)),
            startup(&["apps"], None),
        ];
        let early_warning = &problem_themes()[0];
        // "sensor networks" and "sensors" contain neither each other
        assert_eq!(compute_theme_coverage(early_warning, &actors), 10 + 14);
    }

    #[test]
    fn investors_never_count_as_coverage() {
        let mut investor = startup(&["monitoring"], Some(9));
        investor.kind = ActorKind::Investor;
        assert_eq!(compute_theme_coverage(&problem_themes()[0], &[investor]), 0);
    }

    #[test]
    fn radar_filters_and_sorts() {
        let summary = high_summary();
        let gaps = build_gap_radar(&summary, &[], &RadarConfig::default());
        assert!(gaps.iter().all(|gap| gap.gap_score >= 15));
        assert!(gaps.windows(2).all(|pair| pair[0].gap_score >= pair[1].gap_score));
        assert!(gaps
            .iter()
            .all(|gap| gap.drivers.len() <= 5 && gap.gap_score == gap_score(gap.severity_score, gap.coverage_score)));
        let tourism = gaps
            .iter()
            .find(|gap| gap.theme.id == ProblemThemeId::TourismSafety)
            .unwrap();
        assert!(tourism
            .drivers
            .iter()
            .any(|driver| driver == "Tourist and recreational areas affected: Ruissalo Beach, Naantali Harbour"));
    }
}
