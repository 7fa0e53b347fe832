use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::config::InvestorConfig;
use crate::scoring::fit::compute_problem_fit_score;
use crate::{clamp_score, tags_match_loosely, Actor, BloomSummary, FitLabel, Severity};

const MAX_REASONS: usize = 3;
const MAX_INSIGHTS: usize = 3;
const MAX_THEMES: usize = 3;
const WATER_TECH_FOCUS: [&str; 4] = ["blue-economy", "water-tech", "climate", "ocean-tech"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorSituationRelevance {
    pub score: u32,
    pub label: FitLabel,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealFlowItem {
    pub startup: Actor,
    pub fit_score: u32,
    pub fit_label: FitLabel,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioFitInsight {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnderServedTheme {
    pub theme: String,
    pub description: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorViewSummary {
    pub situation_relevance: InvestorSituationRelevance,
    pub top_deal_flow: Vec<DealFlowItem>,
    pub portfolio_insights: Vec<PortfolioFitInsight>,
    pub under_served_themes: Vec<UnderServedTheme>,
}

/// How interesting the current bloom situation is for this investor's thesis.
pub fn compute_situation_relevance(summary: &BloomSummary, investor: &Actor) -> InvestorSituationRelevance {
    let mut score = summary.overall_risk_level.base_score();

    if let Some(details) = &investor.investor_details {
        if details
            .focus_tags
            .iter()
            .any(|tag| WATER_TECH_FOCUS.contains(&tag.to_lowercase().as_str()))
        {
            score += 15;
        }

        let region = summary.region.to_lowercase();
        let nordic_region = ["turku", "finland", "nordic"]
            .iter()
            .any(|keyword| region.contains(keyword));
        let geography = |wanted: &str| details.geography_focus.iter().any(|focus| focus == wanted);

        if nordic_region && geography("nordics") {
            score += 10;
        } else if geography("europe") {
            score += 5;
        }
    }

    if summary.overall_risk_level == Severity::High && summary.hotspots.len() > 3 {
        score += 10;
    }

    let score = clamp_score(score);
    let label = FitLabel::from_score(score);

    let mut explanation = format!(
        "{} (week {}) shows {} cyanobacteria risk",
        summary.region, summary.week, summary.overall_risk_level
    );
    match label {
        FitLabel::High => explanation.push_str(&format!(
            ", representing a significant opportunity for blue economy investments. With {} active hotspots, this situation aligns strongly with water-tech and climate solutions.",
            summary.hotspots.len()
        )),
        FitLabel::Medium => explanation.push_str(
            ", presenting moderate investment opportunities in water quality monitoring and management solutions.",
        ),
        FitLabel::Low => explanation.push_str(
            ", indicating limited immediate investment urgency, though preventative solutions may still be relevant.",
        ),
    }

    InvestorSituationRelevance {
        score,
        label,
        explanation,
    }
}

/// Startups ranked by problem fit plus thesis overlap, best `limit` kept.
pub fn build_deal_flow(summary: &BloomSummary, investor: &Actor, actors: &[Actor], limit: usize) -> Vec<DealFlowItem> {
    let details = investor.investor_details.as_ref();

    let mut items: Vec<DealFlowItem> = actors
        .iter()
        .filter(|actor| actor.is_startup())
        .map(|startup| {
            let fit = compute_problem_fit_score(summary, startup);
            let mut adjusted = fit.score as i32;
            let mut reasons: Vec<String> = Vec::new();

            if fit.label == FitLabel::High {
                reasons.push("Strong match for current bloom situation".to_string());
            }

            if let Some(details) = details {
                let overlap = startup
                    .tags
                    .iter()
                    .filter(|tag| details.focus_tags.iter().any(|focus| tags_match_loosely(tag, focus)))
                    .count();
                adjusted += overlap as i32 * 5;

                let shares_thesis = startup.tags.iter().any(|tag| {
                    let tag = tag.to_lowercase();
                    details
                        .focus_tags
                        .iter()
                        .any(|focus| tag.contains(&focus.to_lowercase()))
                });
                if shares_thesis {
                    reasons.push("Aligned with your investment thesis".to_string());
                }

                if startup.tags.iter().any(|tag| !details.portfolio_tags.contains(tag)) {
                    reasons.push("Expands portfolio coverage into new areas".to_string());
                }
            }

            if let Some(startup_details) = &startup.startup_details {
                if startup_details.trl_level.is_some_and(|trl| trl >= 6) {
                    reasons.push("Advanced technology readiness (TRL 6+)".to_string());
                }
                if startup_details.target_environments.iter().any(|env| env == "coastal")
                    && summary.region.to_lowercase().contains("coast")
                {
                    reasons.push("Perfect environmental fit for this region".to_string());
                }
            }

            if reasons.is_empty() {
                reasons.push("Relevant solution for water quality challenges".to_string());
            }
            reasons.truncate(MAX_REASONS);

            let fit_score = clamp_score(adjusted);
            DealFlowItem {
                startup: startup.clone(),
                fit_score,
                fit_label: FitLabel::from_score(fit_score),
                reasons,
            }
        })
        .collect();

    items.sort_by(|a, b| b.fit_score.cmp(&a.fit_score));
    items.truncate(limit);
    items
}

pub fn derive_portfolio_insights(investor: &Actor, deal_flow: &[DealFlowItem]) -> Vec<PortfolioFitInsight> {
    let details = match &investor.investor_details {
        Some(details) if !deal_flow.is_empty() => details,
        _ => return Vec::new(),
    };

    let portfolio = &details.portfolio_tags;
    let mut seen = HashSet::new();
    let deal_flow_tags: Vec<&str> = deal_flow
        .iter()
        .flat_map(|item| item.startup.tags.iter())
        .filter(|tag| seen.insert(tag.as_str()))
        .map(|tag| tag.as_str())
        .collect();

    let mut insights = Vec::new();

    let new_tags: Vec<&str> = deal_flow_tags
        .iter()
        .copied()
        .filter(|tag| !portfolio.iter().any(|owned| owned == tag))
        .collect();
    if !new_tags.is_empty() {
        let examples = new_tags.iter().take(2).copied().collect::<Vec<_>>().join(" and ");
        insights.push(format!(
            "Extends your portfolio into {}, currently under-represented in your holdings.",
            examples
        ));
    }

    let portfolio_monitors = portfolio.iter().any(|tag| {
        let tag = tag.to_lowercase();
        tag.contains("monitor") || tag.contains("sensor")
    });
    let brings_communication = deal_flow_tags
        .iter()
        .any(|tag| *tag == "communication" || tag.contains("app"));
    if portfolio_monitors && brings_communication {
        insights.push(
            "Complements your existing monitoring/sensor focus with citizen communication and alert capabilities."
                .to_string(),
        );
    }

    let brings_remediation = deal_flow_tags.iter().any(|tag| {
        let tag = tag.to_lowercase();
        tag.contains("remediation") || tag.contains("nutrient")
    });
    let portfolio_remediates = portfolio
        .iter()
        .any(|tag| tag.to_lowercase().contains("remediation"));
    if brings_remediation && !portfolio_remediates {
        insights.push(
            "Adds long-term remediation and nutrient management solutions, moving beyond monitoring into active intervention."
                .to_string(),
        );
    }

    if insights.is_empty() {
        insights.push(
            "These startups provide good diversification across monitoring, communication, and remediation themes."
                .to_string(),
        );
    }

    insights
        .into_iter()
        .take(MAX_INSIGHTS)
        .map(|text| PortfolioFitInsight { text })
        .collect()
}

/// Counts are over startup tags, not startups.
pub fn find_under_served_themes(summary: &BloomSummary, actors: &[Actor]) -> Vec<UnderServedTheme> {
    let tags: Vec<String> = actors
        .iter()
        .filter(|actor| actor.is_startup())
        .flat_map(|actor| actor.lowercase_tags())
        .collect();
    let count_containing = |fragments: &[&str]| {
        tags.iter()
            .filter(|tag| fragments.iter().any(|fragment| tag.contains(fragment)))
            .count()
    };

    let mut themes = Vec::new();

    let remediation = count_containing(&["remediation", "nutrient"][..]);
    if summary.overall_risk_level == Severity::High && remediation < 3 {
        themes.push(UnderServedTheme {
            theme: "Remediation & Nutrient Reduction".to_string(),
            description: "Long-term solutions to reduce nutrient loads and prevent future blooms".to_string(),
            reason: format!(
                "High bloom risk detected, but only {} startup(s) focused on active remediation",
                remediation
            ),
        });
    }

    let communication = count_containing(&["communication", "app", "alert"][..]);
    let crowded_high_hotspot = summary
        .hotspots
        .iter()
        .any(|hotspot| hotspot.severity == Severity::High && hotspot.observation_count > 2);
    if crowded_high_hotspot && communication < 2 {
        themes.push(UnderServedTheme {
            theme: "Citizen Communication & Tourism Safety".to_string(),
            description: "Real-time alerts and information systems for beach-goers and tourism operators".to_string(),
            reason: format!(
                "Multiple coastal hotspots affecting public areas, but only {} startup(s) in citizen communication",
                communication
            ),
        });
    }

    if count_containing(&["ai", "predict", "forecast"][..]) == 0 {
        themes.push(UnderServedTheme {
            theme: "AI-Powered Bloom Prediction".to_string(),
            description: "Machine learning models for early warning and risk forecasting".to_string(),
            reason: "No startups currently applying AI/ML to bloom prediction in this dataset".to_string(),
        });
    }

    themes.truncate(MAX_THEMES);
    themes
}

pub fn build_investor_view(
    summary: &BloomSummary,
    investor: &Actor,
    actors: &[Actor],
    config: &InvestorConfig,
) -> InvestorViewSummary {
    let situation_relevance = compute_situation_relevance(summary, investor);
    let top_deal_flow = build_deal_flow(summary, investor, actors, config.deal_flow_limit);
    let portfolio_insights = derive_portfolio_insights(investor, &top_deal_flow);
    let under_served_themes = find_under_served_themes(summary, actors);

    debug!(
        "Built investor view - investor={}, relevance={}, deals={}, themes={}",
        investor.id,
        situation_relevance.score,
        top_deal_flow.len(),
        under_served_themes.len()
    );

    InvestorViewSummary {
        situation_relevance,
        top_deal_flow,
        portfolio_insights,
        under_served_themes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActorKind, Hotspot, InvestorDetails, Trend};

    fn investor(focus: &[&str], geography: &[&str], portfolio: &[&str]) -> Actor {
        let owned = |values: &[&str]| values.iter().map(|value| value.to_string()).collect::<Vec<_>>();
        Actor {
            id: "fund".to_string(),
            name: "Baltic Fund".to_string(),
            kind: ActorKind::Investor,
            country: "Finland".to_string(),
            tags: Vec::new(),
            description: String::new(),
            url: String::new(),
            startup_details: None,
            investor_details: Some(InvestorDetails {
                stage_focus: vec!["seed".to_string()],
                geography_focus: owned(geography),
                focus_tags: owned(focus),
                portfolio_tags: owned(portfolio),
            }),
        }
    }

    fn startup(id: &str, tags: &[&str]) -> Actor {
        Actor {
            id: id.to_string(),
            name: id.to_string(),
            kind: ActorKind::Startup,
            country: "Finland".to_string(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            description: String::new(),
            url: String::new(),
            startup_details: None,
            investor_details: None,
        }
    }

    fn summary(risk: Severity, hotspots: usize) -> BloomSummary {
        BloomSummary {
            region: "Turku archipelago".to_string(),
            week: 28,
            total_observations: hotspots as u32 * 3,
            hotspots: (0..hotspots)
                .map(|idx| Hotspot {
                    area_name: format!("Area {}", idx),
                    severity: risk,
                    observation_count: 3,
                    trend: Trend::Stable,
                })
                .collect(),
            safe_areas: Vec::new(),
            overall_risk_level: risk,
            key_messages: Vec::new(),
        }
    }

    #[test]
    fn relevance_stacks_focus_geography_and_severity() {
        let fund = investor(&["Blue-Economy"], &["nordics"], &[]);
        let relevance = compute_situation_relevance(&summary(Severity::High, 4), &fund);
        // 70 + 15 + 10 + 10, clamped
        assert_eq!(relevance.score, 100);
        assert_eq!(relevance.label, FitLabel::High);
        assert!(relevance
            .explanation
            .starts_with("Turku archipelago (week 28) shows high cyanobacteria risk, representing"));
    }

    #[test]
    fn europe_focus_applies_outside_nordic_regions() {
        let fund = investor(&[], &["nordics", "europe"], &[]);
        let mut lake = summary(Severity::Low, 0);
        lake.region = "Lake Constance".to_string();
        assert_eq!(compute_situation_relevance(&lake, &fund).score, 45);
    }

    #[test]
    fn deal_flow_adds_overlap_bonus_and_defaults_reason() {
        let fund = investor(&["sensors"], &[], &["monitoring"]);
        let actors = vec![
            startup("plain", &["monitoring"]),
            startup("aligned", &["sensors", "monitoring"]),
            fund.clone(),
        ];
        let flow = build_deal_flow(&summary(Severity::None, 0), &fund, &actors, 8);
        assert_eq!(flow.len(), 2);
        assert_eq!(flow[0].startup.id, "aligned");
        assert_eq!(flow[0].fit_score, 25);
        assert_eq!(
            flow[0].reasons,
            vec!["Aligned with your investment thesis", "Expands portfolio coverage into new areas"]
        );
        assert_eq!(flow[1].reasons, vec!["Relevant solution for water quality challenges"]);
    }

    #[test]
    fn insights_need_details_and_deals() {
        let mut anonymous = investor(&[], &[], &[]);
        anonymous.investor_details = None;
        let deal = DealFlowItem {
            startup: startup("s", &["apps"]),
            fit_score: 50,
            fit_label: FitLabel::Medium,
            reasons: Vec::new(),
        };
        assert!(derive_portfolio_insights(&anonymous, &[deal.clone()]).is_empty());
        assert!(derive_portfolio_insights(&investor(&[], &[], &[]), &[]).is_empty());

        let monitoring_fund = investor(&[], &[], &["Monitoring"]);
        let insights = derive_portfolio_insights(&monitoring_fund, &[deal]);
        assert_eq!(insights.len(), 2);
        assert_eq!(
            insights[0].text,
            "Extends your portfolio into apps, currently under-represented in your holdings."
        );
    }

    #[test]
    fn prediction_theme_triggers_regardless_of_situation() {
        let themes = find_under_served_themes(&summary(Severity::None, 0), &[startup("s", &["sensors"])]);
        assert_eq!(themes.len(), 1);
        assert_eq!(themes[0].theme, "AI-Powered Bloom Prediction");

        let themes = find_under_served_themes(&summary(Severity::High, 2), &[startup("s", &["forecasting"])]);
        let names: Vec<&str> = themes.iter().map(|theme| theme.theme.as_str()).collect();
        assert_eq!(
            names,
            vec!["Remediation & Nutrient Reduction", "Citizen Communication & Tourism Safety"]
        );
    }
}
