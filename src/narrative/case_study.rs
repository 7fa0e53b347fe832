use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::info;

use crate::error::{BloomError, Result};
use crate::{Actor, BloomSummary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseMetric {
    pub label: String,
    pub value: String,
}

/// User-entered material for a case study. Free text, validated on build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudyInput {
    pub startup_id: String,
    pub customer_name: String,
    pub region: String,
    pub time_period: String,
    pub summary_of_pilot: String,
    #[serde(default)]
    pub key_actions: Vec<String>,
    #[serde(default)]
    pub observed_results: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<CaseMetric>,
}

impl CaseStudyInput {
    /// Trims every field and drops blank list entries. Errors name the
    /// first required field left blank.
    pub fn normalized(&self) -> Result<Self> {
        let required = [
            ("customer name", &self.customer_name),
            ("region", &self.region),
            ("time period", &self.time_period),
            ("pilot summary", &self.summary_of_pilot),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(BloomError::validation(format!("{} is required", field)));
        }

        let trimmed_list = |values: &[String]| -> Vec<String> {
            values
                .iter()
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .collect()
        };

        Ok(Self {
            startup_id: self.startup_id.trim().to_string(),
            customer_name: self.customer_name.trim().to_string(),
            region: self.region.trim().to_string(),
            time_period: self.time_period.trim().to_string(),
            summary_of_pilot: self.summary_of_pilot.trim().to_string(),
            key_actions: trimmed_list(&self.key_actions),
            observed_results: trimmed_list(&self.observed_results),
            metrics: self
                .metrics
                .iter()
                .filter(|metric| !metric.label.trim().is_empty() && !metric.value.trim().is_empty())
                .map(|metric| CaseMetric {
                    label: metric.label.trim().to_string(),
                    value: metric.value.trim().to_string(),
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSection {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bullets: Vec<String>,
}

impl CaseSection {
    fn new(title: &str, body: String, bullets: Vec<String>) -> Self {
        Self {
            title: title.to_string(),
            body,
            bullets,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupCaseStudy {
    pub id: String,
    pub startup_id: String,
    pub region: String,
    pub time_period: String,
    pub customer_name: String,
    pub title: String,
    pub hero_summary: String,
    pub problem: CaseSection,
    pub solution: CaseSection,
    pub results: CaseSection,
    pub next_steps: CaseSection,
    #[serde(default)]
    pub metrics: Vec<CaseMetric>,
    pub created_at: DateTime<Utc>,
}

pub fn build_case_study(
    input: &CaseStudyInput,
    startup: &Actor,
    summary: Option<&BloomSummary>,
) -> Result<StartupCaseStudy> {
    build_case_study_at(input, startup, summary, Utc::now())
}

/// Same as [`build_case_study`] with a fixed creation time.
pub fn build_case_study_at(
    input: &CaseStudyInput,
    startup: &Actor,
    summary: Option<&BloomSummary>,
    created_at: DateTime<Utc>,
) -> Result<StartupCaseStudy> {
    let input = input.normalized()?;
    let customer = &input.customer_name;
    let region = &input.region;
    let period = &input.time_period;

    let risk_context = match summary {
        Some(summary) => format!(
            "facing {} risk levels with {} affected areas",
            summary.overall_risk_level,
            summary.hotspots.len()
        ),
        None => "managing bloom monitoring challenges".to_string(),
    };
    let lead_tag = startup.tags.first().map(String::as_str).unwrap_or("solution");
    let hero_summary = format!(
        "{} in {} was {}. During {}, {} deployed their {} technology to address these challenges. {}",
        customer, region, risk_context, period, startup.name, lead_tag, input.summary_of_pilot
    );

    let problem = match summary {
        Some(summary) => {
            let mut body = format!(
                "In {}, {} was dealing with {} severity cyanobacteria blooms during {}. ",
                region, customer, summary.overall_risk_level, period
            );
            if !summary.hotspots.is_empty() {
                let names: Vec<&str> = summary
                    .hotspots
                    .iter()
                    .take(3)
                    .map(|hotspot| hotspot.area_name.as_str())
                    .collect();
                let _ = write!(
                    body,
                    "Critical hotspots included {}, with {} areas reaching high severity levels. ",
                    names.join(", "),
                    summary.high_severity_count()
                );
            }
            if summary.increasing_count() > 0 {
                body.push_str("Increasing trends in several locations indicated the situation required immediate attention. ");
            }
            body.push_str("The unpredictability of bloom conditions made planning difficult for water management, tourism operations, and public safety communications.");
            body
        }
        None => format!(
            "{} in {} was facing challenges with cyanobacteria bloom management during {}. Traditional monitoring approaches were insufficient for the scale and complexity of the situation, requiring a more advanced solution.",
            customer, region, period
        ),
    };

    let mut solution = format!(
        "{} deployed their {} The solution leveraged {} technology to provide {} with real-time insights and actionable data.",
        startup.name,
        startup.description,
        startup.tags.iter().take(3).cloned().collect::<Vec<_>>().join(", "),
        customer
    );
    if let Some(details) = &startup.startup_details {
        let environments = details.target_environments.join(", ");
        match details.trl_level {
            Some(trl) => {
                let _ = write!(
                    solution,
                    " With a TRL level of {} and proven deployments in {} environments, the technology was well-suited for this deployment.",
                    trl, environments
                );
            }
            None => {
                let _ = write!(
                    solution,
                    " With proven deployments in {} environments, the technology was well-suited for this deployment.",
                    environments
                );
            }
        }
    }

    let mut results = format!(
        "The deployment in {} during {} demonstrated measurable improvements for {}. ",
        region, period, customer
    );
    if !input.metrics.is_empty() {
        let metrics: Vec<String> = input
            .metrics
            .iter()
            .map(|metric| format!("{} {}", metric.label, metric.value))
            .collect();
        let _ = write!(results, "Key metrics showed significant progress: {}. ", metrics.join(", "));
    }
    results.push_str("The solution enabled better decision-making, reduced uncertainty, and improved operational efficiency for water management.");

    let next_steps = format!(
        "Following the successful pilot in {}, {} is exploring expansion opportunities. Potential next steps include scaling the deployment to additional water bodies in the region, extending the monitoring period to cover full seasonal cycles, and integrating the system with existing municipal water management infrastructure. {} is ready to support these expansions and customize the solution for {}'s long-term needs.",
        region, customer, startup.name, customer
    );

    let id = case_study_id(&input.startup_id, customer, region, period, &created_at);
    info!("Built case study - id={}, startup={}, customer={}", id, input.startup_id, customer);

    Ok(StartupCaseStudy {
        id,
        startup_id: input.startup_id.clone(),
        region: region.clone(),
        time_period: period.clone(),
        customer_name: customer.clone(),
        title: format!("{} deployment with {} in {}", startup.name, customer, region),
        hero_summary,
        problem: CaseSection::new("Problem", problem, Vec::new()),
        solution: CaseSection::new("Solution", solution, input.key_actions.clone()),
        results: CaseSection::new("Results & Impact", results, input.observed_results.clone()),
        next_steps: CaseSection::new("Next Steps", next_steps, Vec::new()),
        metrics: input.metrics.clone(),
        created_at,
    })
}

fn case_study_id(startup_id: &str, customer: &str, region: &str, period: &str, created_at: &DateTime<Utc>) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    for part in [startup_id, customer, region, period] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hasher.update(created_at.to_rfc3339_opts(SecondsFormat::Millis, true).as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    format!("case_{:016x}", u64::from_be_bytes(bytes))
}

fn underline(text: &str, marker: char) -> String {
    std::iter::repeat(marker).take(text.chars().count()).collect()
}

fn text_section(out: &mut String, section: &CaseSection) {
    let _ = writeln!(out, "{}", section.title);
    let _ = writeln!(out, "{}", underline(&section.title, '-'));
    let _ = writeln!(out, "{}\n", section.body);
}

pub fn case_study_to_text(study: &StartupCaseStudy) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "{}", study.title);
    let _ = writeln!(text, "{}\n", underline(&study.title, '='));
    let _ = writeln!(text, "Customer: {}", study.customer_name);
    let _ = writeln!(text, "Region: {}", study.region);
    let _ = writeln!(text, "Period: {}\n", study.time_period);
    let _ = writeln!(text, "{}\n", study.hero_summary);

    text_section(&mut text, &study.problem);

    text_section(&mut text, &study.solution);
    if !study.solution.bullets.is_empty() {
        text.push_str("Key Actions:\n");
        for bullet in &study.solution.bullets {
            let _ = writeln!(text, "• {}", bullet);
        }
        text.push('\n');
    }

    text_section(&mut text, &study.results);
    if !study.results.bullets.is_empty() {
        text.push_str("Observed Results:\n");
        for bullet in &study.results.bullets {
            let _ = writeln!(text, "• {}", bullet);
        }
        text.push('\n');
    }
    if !study.metrics.is_empty() {
        text.push_str("Metrics:\n");
        for metric in &study.metrics {
            let _ = writeln!(text, "• {}: {}", metric.label, metric.value);
        }
        text.push('\n');
    }

    let _ = writeln!(text, "{}", study.next_steps.title);
    let _ = writeln!(text, "{}", underline(&study.next_steps.title, '-'));
    let _ = writeln!(text, "{}", study.next_steps.body);
    text
}

pub fn case_study_to_markdown(study: &StartupCaseStudy) -> String {
    let mut md = format!("# {}\n\n", study.title);
    let _ = writeln!(md, "**Customer:** {}  ", study.customer_name);
    let _ = writeln!(md, "**Region:** {}  ", study.region);
    let _ = writeln!(md, "**Period:** {}\n", study.time_period);
    let _ = writeln!(md, "{}\n", study.hero_summary);

    let _ = writeln!(md, "## {}\n\n{}\n", study.problem.title, study.problem.body);

    let _ = writeln!(md, "## {}\n\n{}\n", study.solution.title, study.solution.body);
    if !study.solution.bullets.is_empty() {
        md.push_str("**Key Actions:**\n\n");
        for bullet in &study.solution.bullets {
            let _ = writeln!(md, "- {}", bullet);
        }
        md.push('\n');
    }

    let _ = writeln!(md, "## {}\n\n{}\n", study.results.title, study.results.body);
    if !study.results.bullets.is_empty() {
        md.push_str("**Observed Results:**\n\n");
        for bullet in &study.results.bullets {
            let _ = writeln!(md, "- {}", bullet);
        }
        md.push('\n');
    }
    if !study.metrics.is_empty() {
        md.push_str("**Metrics:**\n\n");
        for metric in &study.metrics {
            let _ = writeln!(md, "- **{}:** {}", metric.label, metric.value);
        }
        md.push('\n');
    }

    let _ = writeln!(md, "## {}\n\n{}", study.next_steps.title, study.next_steps.body);
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActorKind;
    use chrono::TimeZone;

    fn startup() -> Actor {
        Actor {
            id: "s1".to_string(),
            name: "AlgaeWatch".to_string(),
            kind: ActorKind::Startup,
            country: "Finland".to_string(),
            tags: vec!["monitoring".to_string(), "sensors".to_string()],
            description: "buoy network for chlorophyll sensing.".to_string(),
            url: String::new(),
            startup_details: None,
            investor_details: None,
        }
    }

    fn input() -> CaseStudyInput {
        CaseStudyInput {
            startup_id: "s1".to_string(),
            customer_name: "  City of Turku ".to_string(),
            region: "Turku archipelago".to_string(),
            time_period: "Summer 2024".to_string(),
            summary_of_pilot: "Twelve buoys watched the bathing beaches.".to_string(),
            key_actions: vec!["Installed buoys".to_string(), "   ".to_string()],
            observed_results: Vec::new(),
            metrics: vec![
                CaseMetric {
                    label: "Closures".to_string(),
                    value: "-30%".to_string(),
                },
                CaseMetric {
                    label: "Empty".to_string(),
                    value: " ".to_string(),
                },
            ],
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn blank_required_field_is_named() {
        let mut missing = input();
        missing.time_period = "  ".to_string();
        let err = build_case_study(&missing, &startup(), None).unwrap_err();
        assert_eq!(err, BloomError::Validation("time period is required".to_string()));
    }

    #[test]
    fn inputs_are_trimmed_and_blank_entries_dropped() {
        let study = build_case_study_at(&input(), &startup(), None, fixed_time()).unwrap();
        assert_eq!(study.customer_name, "City of Turku");
        assert_eq!(study.title, "AlgaeWatch deployment with City of Turku in Turku archipelago");
        assert_eq!(study.solution.bullets, vec!["Installed buoys".to_string()]);
        assert_eq!(study.metrics.len(), 1);
        assert!(study.results.body.contains("Key metrics showed significant progress: Closures -30%. "));
        assert!(study.hero_summary.contains("was managing bloom monitoring challenges"));
    }

    #[test]
    fn id_is_stable_for_same_inputs_and_time() {
        let first = build_case_study_at(&input(), &startup(), None, fixed_time()).unwrap();
        let second = build_case_study_at(&input(), &startup(), None, fixed_time()).unwrap();
        assert_eq!(first.id, second.id);
        assert!(first.id.starts_with("case_"));
        assert_eq!(first.id.len(), "case_".len() + 16);
    }

    #[test]
    fn text_export_underlines_title() {
        let study = build_case_study_at(&input(), &startup(), None, fixed_time()).unwrap();
        let text = case_study_to_text(&study);
        let mut lines = text.lines();
        let title = lines.next().unwrap();
        assert_eq!(lines.next().unwrap(), "=".repeat(title.chars().count()));
        assert!(text.contains("Key Actions:\n• Installed buoys\n"));
        assert!(!text.contains("Observed Results:"));
        let markdown = case_study_to_markdown(&study);
        assert!(markdown.contains("- **Closures:** -30%\n"));
    }
}
