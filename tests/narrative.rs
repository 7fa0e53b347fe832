mod common;

use bluebloom::bulletin::generate_bulletin;
use bluebloom::narrative::{
    build_case_study_at, build_pilot_opportunity, build_pitch_snippet, case_study_to_markdown, case_study_to_text,
    format_pitch_as_markdown, CaseMetric, CaseStudyInput,
};
use bluebloom::recommend::recommend_actors;
use bluebloom::BloomError;
use chrono::{TimeZone, Utc};
use common::{actors, harbour_beach_summary, quiet_summary, REGION};

fn case_input() -> CaseStudyInput {
    CaseStudyInput {
        startup_id: "s-sense".to_string(),
        customer_name: "  City of Turku ".to_string(),
        region: REGION.to_string(),
        time_period: "Summer 2024".to_string(),
        summary_of_pilot: "Six buoys streamed chlorophyll readings from the main beaches.".to_string(),
        key_actions: vec!["Installed six buoys".to_string(), "   ".to_string()],
        observed_results: vec!["Two closures announced a day earlier".to_string()],
        metrics: vec![CaseMetric {
            label: "Alert lead time".to_string(),
            value: " +36 h ".to_string(),
        }],
    }
}

#[test]
fn case_study_uses_situation_and_trims_input() {
    let pool = actors();
    let created_at = Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap();
    let study = build_case_study_at(&case_input(), &pool[0], Some(&harbour_beach_summary()), created_at).unwrap();

    assert_eq!(study.title, "AlgaeSense deployment with City of Turku in Turku archipelago");
    assert!(study.id.starts_with("case_"));
    assert_eq!(study.id.len(), "case_".len() + 16);
    assert!(study
        .hero_summary
        .starts_with("City of Turku in Turku archipelago was facing high risk levels with 1 affected areas."));
    assert!(study.problem.body.contains("Critical hotspots included Harbour Beach"));
    assert!(study.solution.body.contains("With a TRL level of 7"));
    assert_eq!(study.solution.bullets, vec!["Installed six buoys"]);
    assert_eq!(study.metrics[0].value, "+36 h");

    let again = build_case_study_at(&case_input(), &pool[0], Some(&harbour_beach_summary()), created_at).unwrap();
    assert_eq!(study.id, again.id);
}

#[test]
fn case_study_requires_customer() {
    let mut input = case_input();
    input.customer_name = "   ".to_string();
    let err = build_case_study_at(&input, &actors()[0], None, Utc::now()).unwrap_err();
    assert_eq!(err, BloomError::Validation("customer name is required".to_string()));
}

#[test]
fn case_study_renders_text_and_markdown() {
    let pool = actors();
    let study = build_case_study_at(&case_input(), &pool[0], None, Utc::now()).unwrap();

    let text = case_study_to_text(&study);
    assert!(text.contains("Key Actions:\n• Installed six buoys\n"));
    assert!(text.contains("Metrics:\n• Alert lead time: +36 h\n"));

    let markdown = case_study_to_markdown(&study);
    assert!(markdown.starts_with("# AlgaeSense deployment with City of Turku in Turku archipelago\n\n"));
    assert!(markdown.contains("## Problem\n\n"));
}

#[test]
fn pitch_and_pilot_follow_actor_focus() {
    let pool = actors();
    let summary = harbour_beach_summary();

    let pitch = build_pitch_snippet(&summary, &pool[2]);
    assert_eq!(pitch.solution_slide.title, "How ClearLake Bio Addresses the Bloom Challenge");
    assert!(pitch.solution_slide.bullets[0].starts_with("Active remediation and nutrient reduction: "));
    assert!(pitch.problem_slide.bullets.len() <= 5);
    assert!(format_pitch_as_markdown(&pitch).starts_with("## Cyanobacteria Risk in Turku archipelago, Week 28\n\n- "));

    let pilot = build_pilot_opportunity(&summary, &pool[0]);
    assert_eq!(pilot.pilot_title, "AlgaeSense early-warning pilot in Turku archipelago");
    assert!(pilot.objective.contains("Harbour Beach"));
}

#[test]
fn bulletin_has_both_audiences() {
    let bulletin = generate_bulletin(&harbour_beach_summary());
    assert!(bulletin.citizen_bulletin.contains("Harbour Beach"));
    assert!(bulletin.expert_note.contains("Harbour Beach"));
}

#[test]
fn recommendations_depend_on_situation() {
    let pool = actors();
    let busy = recommend_actors(&harbour_beach_summary(), &pool, 3);
    let themes: Vec<&str> = busy.iter().map(|rec| rec.theme.as_str()).collect();
    assert_eq!(
        themes,
        vec![
            "Nutrient Reduction & Remediation",
            "Citizen Communication & Decision Support"
        ]
    );
    assert!(recommend_actors(&quiet_summary(), &pool, 3).is_empty());
}
