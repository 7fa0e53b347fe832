#![allow(dead_code)]

use bluebloom::{
    Actor, ActorKind, BloomObservation, BloomSummary, Hotspot, InvestorDetails, Severity, StartupDetails, Trend,
};

pub const REGION: &str = "Turku archipelago";

pub fn observation(id: &str, area: &str, week: u32, severity: Severity) -> BloomObservation {
    BloomObservation {
        id: id.to_string(),
        region: REGION.to_string(),
        area_name: area.to_string(),
        lat: 60.43,
        lon: 22.1,
        date: format!("2024-W{}", week),
        week,
        severity,
    }
}

/// Two weeks around Ruissalo: week 27 quiet, week 28 escalating at the beaches.
pub fn observations() -> Vec<BloomObservation> {
    let mut observations = vec![
        observation("o1", "Ruissalo Beach", 27, Severity::Medium),
        observation("o2", "Naantali Harbour", 27, Severity::Low),
        observation("o3", "Naantali Harbour", 27, Severity::Low),
        observation("o4", "Quiet Cove", 27, Severity::None),
    ];
    for idx in 0..3 {
        observations.push(observation(&format!("r{}", idx), "Ruissalo Beach", 28, Severity::High));
    }
    observations.push(observation("n1", "Naantali Harbour", 28, Severity::Medium));
    observations.push(observation("n2", "Naantali Harbour", 28, Severity::Low));
    observations.push(observation("q1", "Quiet Cove", 28, Severity::None));
    observations.push(observation("k1", "Kuusisto Reeds", 28, Severity::Low));
    observations
}

pub fn startup(id: &str, name: &str, tags: &[&str], details: Option<StartupDetails>) -> Actor {
    Actor {
        id: id.to_string(),
        name: name.to_string(),
        kind: ActorKind::Startup,
        country: "Finland".to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        description: format!("{} solution for bloom-affected waters", name),
        url: String::new(),
        startup_details: details,
        investor_details: None,
    }
}

pub fn details(trl: u8, environments: &[&str], customer: &str) -> StartupDetails {
    StartupDetails {
        trl_level: Some(trl),
        target_environments: environments.iter().map(|env| env.to_string()).collect(),
        typical_customer: customer.to_string(),
        deployment_scale: "municipal scale".to_string(),
        price_range: "10-50k EUR".to_string(),
        key_benefits: vec![
            "Early detection of bloom onset".to_string(),
            "Lower sampling costs".to_string(),
        ],
        example_use_case: String::new(),
    }
}

pub fn investor(id: &str, focus: &[&str], geography: &[&str], portfolio: &[&str]) -> Actor {
    Actor {
        id: id.to_string(),
        name: format!("{} Ventures", id),
        kind: ActorKind::Investor,
        country: "Finland".to_string(),
        tags: vec!["sensors".to_string()],
        description: "Early-stage water-tech fund".to_string(),
        url: String::new(),
        startup_details: None,
        investor_details: Some(InvestorDetails {
            stage_focus: vec!["seed".to_string()],
            geography_focus: geography.iter().map(|value| value.to_string()).collect(),
            focus_tags: focus.iter().map(|value| value.to_string()).collect(),
            portfolio_tags: portfolio.iter().map(|value| value.to_string()).collect(),
        }),
    }
}

pub fn actors() -> Vec<Actor> {
    vec![
        startup(
            "s-sense",
            "AlgaeSense",
            &["monitoring", "sensors", "iot"],
            Some(details(7, &["coastal", "lakes"], "Coastal municipalities")),
        ),
        startup(
            "s-sat",
            "OrbitBloom",
            &["monitoring", "satellite", "data visualization"],
            Some(details(6, &["coastal"], "Environmental agencies")),
        ),
        startup(
            "s-clean",
            "ClearLake Bio",
            &["remediation", "biotech"],
            Some(details(5, &["lakes"], "Lake associations")),
        ),
        startup(
            "s-app",
            "SwimSafe",
            &["communication", "apps", "citizen science"],
            Some(details(8, &["coastal"], "Beach operators")),
        ),
        startup("s-farm", "FieldGuard", &["agriculture", "nutrient"], None),
        investor("i-blue", &["water-tech", "monitoring"], &["nordics"], &["monitoring"]),
        investor("i-eu", &["climate"], &["europe"], &[]),
    ]
}

/// High-risk week with a single increasing beach hotspot.
pub fn harbour_beach_summary() -> BloomSummary {
    BloomSummary {
        region: REGION.to_string(),
        week: 28,
        total_observations: 5,
        hotspots: vec![Hotspot {
            area_name: "Harbour Beach".to_string(),
            severity: Severity::High,
            observation_count: 5,
            trend: Trend::Increasing,
        }],
        safe_areas: vec!["North Cove".to_string()],
        overall_risk_level: Severity::High,
        key_messages: Vec::new(),
    }
}

pub fn quiet_summary() -> BloomSummary {
    BloomSummary {
        region: REGION.to_string(),
        week: 20,
        total_observations: 0,
        hotspots: Vec::new(),
        safe_areas: Vec::new(),
        overall_risk_level: Severity::None,
        key_messages: Vec::new(),
    }
}
