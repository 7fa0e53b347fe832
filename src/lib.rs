pub mod alerts;
pub mod beaches;
pub mod bulletin;
pub mod config;
pub mod data;
pub mod error;
pub mod impact;
pub mod narrative;
pub mod recommend;
pub mod scoring;
pub mod summary;

use serde::{Deserialize, Serialize};

pub use error::{BloomError, Result};
pub use summary::build_bloom_summary;

const TOURIST_KEYWORDS: [&str; 7] = ["beach", "harbour", "harbor", "marina", "camping", "resort", "bay"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "none" => Some(Severity::None),
            "low" => Some(Severity::Low),
            "medium" | "moderate" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            Severity::None => 0,
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Starting point of the additive fit and relevance scores.
    pub fn base_score(self) -> i32 {
        match self {
            Severity::High => 70,
            Severity::Medium => 55,
            Severity::Low => 40,
            Severity::None => 20,
        }
    }

    pub fn is_elevated(self) -> bool {
        matches!(self, Severity::Medium | Severity::High)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    Unknown,
}

impl Trend {
    pub fn label(self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
            Trend::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloomObservation {
    pub id: String,
    pub region: String,
    pub area_name: String,
    pub lat: f64,
    pub lon: f64,
    pub date: String,
    pub week: u32,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub area_name: String,
    pub severity: Severity,
    pub observation_count: u32,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloomSummary {
    pub region: String,
    pub week: u32,
    pub total_observations: u32,
    pub hotspots: Vec<Hotspot>,
    pub safe_areas: Vec<String>,
    pub overall_risk_level: Severity,
    pub key_messages: Vec<String>,
}

impl BloomSummary {
    pub fn high_severity_count(&self) -> usize {
        self.hotspots
            .iter()
            .filter(|hotspot| hotspot.severity == Severity::High)
            .count()
    }

    pub fn increasing_count(&self) -> usize {
        self.hotspots
            .iter()
            .filter(|hotspot| hotspot.trend == Trend::Increasing)
            .count()
    }

    pub fn tourist_hotspots(&self) -> Vec<&Hotspot> {
        self.hotspots
            .iter()
            .filter(|hotspot| is_tourist_area(&hotspot.area_name))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    Startup,
    Investor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupDetails {
    #[serde(default)]
    pub trl_level: Option<u8>,
    #[serde(default)]
    pub target_environments: Vec<String>,
    #[serde(default)]
    pub typical_customer: String,
    #[serde(default)]
    pub deployment_scale: String,
    #[serde(default)]
    pub price_range: String,
    #[serde(default)]
    pub key_benefits: Vec<String>,
    #[serde(default)]
    pub example_use_case: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorDetails {
    #[serde(default)]
    pub stage_focus: Vec<String>,
    #[serde(default)]
    pub geography_focus: Vec<String>,
    #[serde(default)]
    pub focus_tags: Vec<String>,
    #[serde(default)]
    pub portfolio_tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ActorKind,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup_details: Option<StartupDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investor_details: Option<InvestorDetails>,
}

impl Actor {
    pub fn is_startup(&self) -> bool {
        self.kind == ActorKind::Startup
    }

    pub fn is_investor(&self) -> bool {
        self.kind == ActorKind::Investor
    }

    pub fn lowercase_tags(&self) -> Vec<String> {
        self.tags.iter().map(|tag| tag.to_lowercase()).collect()
    }

    pub fn trl_level(&self) -> Option<u8> {
        self.startup_details.as_ref().and_then(|details| details.trl_level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitLabel {
    Low,
    Medium,
    High,
}

impl FitLabel {
    pub fn from_score(score: u32) -> Self {
        if score >= 75 {
            FitLabel::High
        } else if score >= 45 {
            FitLabel::Medium
        } else {
            FitLabel::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FitLabel::Low => "Low",
            FitLabel::Medium => "Medium",
            FitLabel::High => "High",
        }
    }
}

impl std::fmt::Display for FitLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub fn is_tourist_area(area_name: &str) -> bool {
    let lowercase = area_name.to_lowercase();
    TOURIST_KEYWORDS
        .iter()
        .any(|keyword| lowercase.contains(keyword))
}

/// Case-insensitive containment in either direction. Loose on purpose:
/// "app" matches "apps" and "mobile apps".
pub fn tags_match_loosely(tag: &str, other: &str) -> bool {
    let tag = tag.to_lowercase();
    let other = other.to_lowercase();
    tag.contains(&other) || other.contains(&tag)
}

pub(crate) fn clamp_score(value: i32) -> u32 {
    value.clamp(0, 100) as u32
}

pub(crate) fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        singular.to_string()
    } else {
        plural.to_string()
    }
}

pub(crate) fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn format_score(score: u32, label: FitLabel) -> String {
    format!("{}/100 ({})", score, label.label())
}
