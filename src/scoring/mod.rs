pub mod clusters;
pub mod fit;
pub mod gaps;
pub mod investor;

pub use clusters::{build_clusters_for_situation, cluster_themes, ClusterTheme, ClusterThemeId, CollaborationCluster};
pub use fit::{compute_problem_fit_score, main_capability, ProblemFitScore};
pub use gaps::{build_gap_radar, build_solution_gap, problem_themes, ProblemTheme, ProblemThemeId, SolutionGap};
pub use investor::{
    build_deal_flow, build_investor_view, compute_situation_relevance, derive_portfolio_insights,
    find_under_served_themes, DealFlowItem, InvestorSituationRelevance, InvestorViewSummary,
    PortfolioFitInsight, UnderServedTheme,
};

pub(crate) const MONITORING_TAGS: [&str; 3] = ["monitoring", "sensors", "early warning"];
pub(crate) const REMEDIATION_TAGS: [&str; 3] = ["remediation", "nutrient reduction", "biotech"];
pub(crate) const COMMUNICATION_TAGS: [&str; 5] = [
    "communication",
    "citizen science",
    "decision support",
    "data visualization",
    "apps",
];

/// Communication capabilities without plain "apps".
pub(crate) const OUTREACH_TAGS: [&str; 4] = ["communication", "citizen science", "decision support", "data visualization"];

/// Exact membership of any lowercase tag in `wanted`.
pub(crate) fn has_any_tag(tags: &[String], wanted: &[&str]) -> bool {
    tags.iter().any(|tag| wanted.contains(&tag.as_str()))
}

/// Any tag containing one of the fragments, case-insensitive.
pub(crate) fn has_tag_fragment(tags: &[String], fragments: &[&str]) -> bool {
    tags.iter().any(|tag| {
        let tag = tag.to_lowercase();
        fragments.iter().any(|fragment| tag.contains(fragment))
    })
}
