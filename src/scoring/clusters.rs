use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::scoring::fit::compute_problem_fit_score;
use crate::{plural, Actor, BloomSummary, Severity, Trend};

const MAX_MEMBERS: usize = 4;
const MIN_MEMBERS: usize = 2;
const MIN_CANDIDATE_SCORE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterThemeId {
    EarlyWarningPack,
    TourismSafetyPack,
    NutrientManagementPack,
    CitizenCommsPack,
    PlanningAndPolicyPack,
}

impl ClusterThemeId {
    pub fn key(self) -> &'static str {
        match self {
            ClusterThemeId::EarlyWarningPack => "early_warning_pack",
            ClusterThemeId::TourismSafetyPack => "tourism_safety_pack",
            ClusterThemeId::NutrientManagementPack => "nutrient_management_pack",
            ClusterThemeId::CitizenCommsPack => "citizen_comms_pack",
            ClusterThemeId::PlanningAndPolicyPack => "planning_and_policy_pack",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterTheme {
    pub id: ClusterThemeId,
    pub title: &'static str,
    pub description: &'static str,
    pub desired_tags: &'static [&'static str],
}

const CLUSTER_THEMES: [ClusterTheme; 5] = [
    ClusterTheme {
        id: ClusterThemeId::EarlyWarningPack,
        title: "Early Warning & Monitoring Pack",
        description: "Comprehensive bloom detection and tracking system",
        desired_tags: &["monitoring", "sensors", "forecasting", "alerts", "early warning", "iot", "satellite"],
    },
    ClusterTheme {
        id: ClusterThemeId::TourismSafetyPack,
        title: "Tourism Safety Pack",
        description: "Protect tourists and beachgoers with timely information",
        desired_tags: &["communication", "apps", "tourism", "alerts", "safety", "dashboard", "citizen science"],
    },
    ClusterTheme {
        id: ClusterThemeId::NutrientManagementPack,
        title: "Nutrient Management Pack",
        description: "Reduce nutrient loads and prevent blooms at source",
        desired_tags: &["nutrient", "remediation", "agriculture", "farms", "biotech", "nutrient reduction"],
    },
    ClusterTheme {
        id: ClusterThemeId::CitizenCommsPack,
        title: "Citizen Communication Pack",
        description: "Keep communities informed and engaged",
        desired_tags: &[
            "communication",
            "apps",
            "dashboard",
            "alerts",
            "decision support",
            "data visualization",
            "citizen science",
        ],
    },
    ClusterTheme {
        id: ClusterThemeId::PlanningAndPolicyPack,
        title: "Planning & Policy Pack",
        description: "Data-driven governance and strategic planning",
        desired_tags: &["planning", "governance", "data", "integration", "decision support", "platform", "api"],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationCluster {
    pub id: String,
    pub theme: ClusterTheme,
    pub startups: Vec<Actor>,
    pub summary: String,
    pub benefits: Vec<String>,
    pub suitability_note: String,
}

impl CollaborationCluster {
    pub fn member_names(&self) -> Vec<&str> {
        self.startups.iter().map(|startup| startup.name.as_str()).collect()
    }
}

pub fn cluster_themes() -> &'static [ClusterTheme] {
    &CLUSTER_THEMES
}

struct Candidate<'a> {
    startup: &'a Actor,
    total_score: f64,
    signature: String,
}

fn score_candidates<'a>(theme: &ClusterTheme, summary: &BloomSummary, startups: &[&'a Actor]) -> Vec<Candidate<'a>> {
    let mut candidates: Vec<Candidate<'a>> = startups
        .iter()
        .map(|startup| {
            let mut tags = startup.lowercase_tags();
            let matching = tags
                .iter()
                .filter(|tag| {
                    theme
                        .desired_tags
                        .iter()
                        .any(|desired| tag.contains(desired) || desired.contains(tag.as_str()))
                })
                .count();
            let fit = compute_problem_fit_score(summary, startup);
            tags.sort();

            Candidate {
                startup,
                total_score: matching as f64 * 10.0 + fit.score as f64 * 0.5,
                signature: tags.join(","),
            }
        })
        .collect();

    candidates.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));
    candidates
}

/// Greedy pick of 2..=4 members. A candidate repeating an already chosen
/// tag signature is skipped once two members are in.
fn select_members<'a>(candidates: &[Candidate<'a>]) -> Vec<&'a Actor> {
    let mut selected: Vec<&'a Actor> = Vec::new();
    let mut signatures: HashSet<&str> = HashSet::new();

    for candidate in candidates {
        if selected.len() >= MAX_MEMBERS || candidate.total_score < MIN_CANDIDATE_SCORE {
            break;
        }
        if selected.len() >= MIN_MEMBERS && signatures.contains(candidate.signature.as_str()) {
            continue;
        }
        selected.push(candidate.startup);
        signatures.insert(candidate.signature.as_str());
    }

    selected
}

pub fn build_clusters_for_situation(summary: &BloomSummary, actors: &[Actor]) -> Vec<CollaborationCluster> {
    let startups: Vec<&Actor> = actors.iter().filter(|actor| actor.is_startup()).collect();
    let mut ranked: Vec<(f64, CollaborationCluster)> = Vec::new();

    for theme in cluster_themes() {
        let candidates = score_candidates(theme, summary, &startups);
        let members = select_members(&candidates);
        if members.len() < MIN_MEMBERS {
            debug!("Skipping cluster theme - theme={}, members={}", theme.id.key(), members.len());
            continue;
        }

        let average_fit = members
            .iter()
            .map(|member| compute_problem_fit_score(summary, member).score as f64)
            .sum::<f64>()
            / members.len() as f64;
        let members: Vec<Actor> = members.into_iter().cloned().collect();
        ranked.push((average_fit, build_cluster(theme, members, summary)));
    }

    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    debug!(
        "Built clusters - region={}, week={}, clusters={}",
        summary.region,
        summary.week,
        ranked.len()
    );

    ranked.into_iter().map(|(_, cluster)| cluster).collect()
}

pub fn cluster_id(theme: ClusterThemeId, region: &str, week: u32) -> String {
    let region = region
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("{}_{}_w{}", theme.key(), region, week)
}

fn build_cluster(theme: &ClusterTheme, startups: Vec<Actor>, summary: &BloomSummary) -> CollaborationCluster {
    let region = &summary.region;
    let week = summary.week;
    let risk = summary.overall_risk_level;
    let hotspot_count = summary.hotspots.len();
    let high_severity = summary.high_severity_count();
    let size = startups.len();

    let (text, benefits, suitability_note) = match theme.id {
        ClusterThemeId::EarlyWarningPack => (
            format!(
                "This {}-startup pack combines real-time monitoring, data analytics, and alert systems to provide comprehensive early warning for {}. Together, these solutions create a multi-layered detection network that tracks blooms from emergence to resolution.",
                size, region
            ),
            [
                "Comprehensive coverage: sensors, satellite, and citizen reports",
                "Real-time alerts to authorities and citizens",
                "Historical data analysis for trend prediction",
                "Scalable infrastructure from pilot to region-wide deployment",
            ],
            if risk == Severity::High || high_severity > 0 {
                format!(
                    "Strong match for week {} with {} risk and {} severe {}",
                    week,
                    risk,
                    high_severity,
                    plural(high_severity, "hotspot", "hotspots")
                )
            } else {
                format!("Ideal for establishing proactive monitoring before risks escalate in {}", region)
            },
        ),
        ClusterThemeId::TourismSafetyPack => (
            format!(
                "Protect tourism and beach safety in {} with this integrated pack. Combining real-time bloom data, user-friendly communication tools, and safety guidance systems, this bundle ensures tourists and locals can make informed decisions about water activities.",
                region
            ),
            [
                "Tourist-friendly apps with real-time beach conditions",
                "Multi-language alerts and safety recommendations",
                "Integration with local tourism boards and beach management",
                "Reduces liability while maintaining recreational access",
            ],
            if hotspot_count > 0 && !summary.safe_areas.is_empty() {
                format!(
                    "Perfect for mixed conditions: {} hotspots but {} safe areas requiring clear communication",
                    hotspot_count,
                    summary.safe_areas.len()
                )
            } else {
                format!(
                    "Essential for maintaining tourism revenue while protecting public health in {}",
                    region
                )
            },
        ),
        ClusterThemeId::NutrientManagementPack => {
            let increasing = summary
                .hotspots
                .iter()
                .filter(|hotspot| hotspot.trend == Trend::Increasing)
                .count();
            (
                format!(
                    "Address the root cause of blooms in {} with this nutrient management consortium. By combining upstream source reduction, biotech remediation, and farmer decision support, this pack tackles nutrient pollution from multiple angles.",
                    region
                ),
                [
                    "Upstream nutrient reduction at agricultural sources",
                    "In-situ remediation for acute hotspots",
                    "Farmer tools for precision nutrient application",
                    "Long-term prevention strategy beyond reactive measures",
                ],
                if increasing > 0 {
                    format!(
                        "Urgent need: {} {} showing increasing trends requiring root-cause intervention",
                        increasing,
                        plural(increasing, "area", "areas")
                    )
                } else {
                    format!(
                        "Strategic fit for preventing future blooms in {} through systematic nutrient management",
                        region
                    )
                },
            )
        }
        ClusterThemeId::CitizenCommsPack => (
            format!(
                "Empower citizens in {} with transparent, accessible bloom information. This pack combines data visualization, mobile apps, and community engagement tools to keep everyone informed and build public trust in water management.",
                region
            ),
            [
                "User-friendly dashboards for non-technical audiences",
                "Mobile apps for on-the-go water quality checks",
                "Community reporting and citizen science integration",
                "Reduces information hotline burden on authorities",
            ],
            format!(
                "Essential for week {} with {} affected {} requiring clear public communication",
                week,
                hotspot_count,
                plural(hotspot_count, "area", "areas")
            ),
        ),
        ClusterThemeId::PlanningAndPolicyPack => (
            format!(
                "Support strategic planning and policy-making in {} with integrated data platforms and decision support tools. This pack helps authorities make evidence-based decisions and track progress toward bloom reduction goals.",
                region
            ),
            [
                "Centralized data integration from multiple sources",
                "Decision support tools for policy evaluation",
                "Long-term trend analysis and scenario planning",
                "Compliance tracking and reporting capabilities",
            ],
            if hotspot_count > 3 {
                format!(
                    "Highly relevant: {} hotspots requiring coordinated governance and data-driven planning",
                    hotspot_count
                )
            } else {
                format!(
                    "Valuable for strategic planning and long-term bloom management in {}",
                    region
                )
            },
        ),
    };

    let mut benefits: Vec<String> = benefits.iter().map(|benefit| benefit.to_string()).collect();
    benefits.push(format!("Ready to pilot in {} starting week {}", region, week));
    benefits.push(format!("{} proven startups working as consortium", size));

    CollaborationCluster {
        id: cluster_id(theme.id, region, week),
        theme: *theme,
        startups,
        summary: text,
        benefits,
        suitability_note,
    }
}
