use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::scoring::{has_any_tag, MONITORING_TAGS, OUTREACH_TAGS, REMEDIATION_TAGS};
use crate::{Actor, BloomSummary, Severity};

const ACTORS_PER_THEME: usize = 5;
const STARTUP_SHARE: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub theme: String,
    pub explanation: String,
    pub actors: Vec<Actor>,
}

/// Rule-triggered themes, each with a mixed startup/investor shortlist.
/// The same seed always yields the same shortlists.
pub fn recommend_actors(summary: &BloomSummary, actors: &[Actor], seed: u64) -> Vec<Recommendation> {
    let mut rng = StdRng::seed_from_u64(seed);
    let risk = summary.overall_risk_level;
    let hotspots = summary.hotspots.len();
    let mut recommendations = Vec::new();

    if hotspots > 2 && risk.is_elevated() {
        recommendations.push(Recommendation {
            theme: "Early Warning & Monitoring".to_string(),
            explanation: "Multiple hotspots detected with elevated severity levels. Enhanced monitoring infrastructure and early warning systems can help track bloom development and alert communities proactively.".to_string(),
            actors: select_diverse_actors(tagged(actors, &MONITORING_TAGS), ACTORS_PER_THEME, &mut rng),
        });
    }

    if risk == Severity::High || (risk == Severity::Medium && hotspots > 3) {
        recommendations.push(Recommendation {
            theme: "Nutrient Reduction & Remediation".to_string(),
            explanation: "Persistent high-severity blooms indicate need for active intervention. Solutions focused on nutrient management and biological remediation can help reduce bloom intensity over time.".to_string(),
            actors: select_diverse_actors(tagged(actors, &REMEDIATION_TAGS), ACTORS_PER_THEME, &mut rng),
        });
    }

    if summary.total_observations > 10 || hotspots > 0 {
        recommendations.push(Recommendation {
            theme: "Citizen Communication & Decision Support".to_string(),
            explanation: "Keeping the public informed and engaged is crucial. Tools for clear communication, data transparency, and decision support help communities make informed choices about water activities.".to_string(),
            actors: select_diverse_actors(tagged(actors, &OUTREACH_TAGS), ACTORS_PER_THEME, &mut rng),
        });
    }

    debug!(
        "Recommended actors - region={}, week={}, themes={}, seed={}",
        summary.region,
        summary.week,
        recommendations.len(),
        seed
    );

    recommendations
}

// Exact, case-sensitive tag membership.
fn tagged<'a>(actors: &'a [Actor], wanted: &[&str]) -> Vec<&'a Actor> {
    actors.iter().filter(|actor| has_any_tag(&actor.tags, wanted)).collect()
}

fn select_diverse_actors(pool: Vec<&Actor>, count: usize, rng: &mut StdRng) -> Vec<Actor> {
    let startups_needed = (count as f64 * STARTUP_SHARE).floor() as usize;
    let investors_needed = count - startups_needed;

    let (mut startups, mut investors): (Vec<&Actor>, Vec<&Actor>) =
        pool.into_iter().partition(|actor| actor.is_startup());
    startups.shuffle(rng);
    investors.shuffle(rng);

    startups
        .into_iter()
        .take(startups_needed)
        .chain(investors.into_iter().take(investors_needed))
        .cloned()
        .collect()
}
