use bluebloom::alerts::AlertUseCase;
use bluebloom::impact::{DeploymentIntensity, ImpactSimulationInput};
use bluebloom::narrative::CaseStudyInput;
use bluebloom::scoring::ProblemFitScore;
use bluebloom::{Actor, BloomSummary};
use serde::{Deserialize, Serialize};

pub const DEFAULT_REGION: &str = "Turku archipelago";
pub const DEFAULT_WEEK: u32 = 28;

/// Shared query string for every summary-based endpoint. Each handler reads
/// only the parameters it needs.
#[derive(Debug, Default, Deserialize)]
pub struct SituationQuery {
    pub region: Option<String>,
    pub week: Option<u32>,
    pub actor: Option<String>,
    pub investor: Option<String>,
    pub startup: Option<String>,
    pub seed: Option<u64>,
    pub from: Option<u32>,
    pub to: Option<u32>,
    #[serde(alias = "useCase")]
    pub use_case: Option<String>,
    pub q: Option<String>,
}

impl SituationQuery {
    pub fn region(&self) -> String {
        self.region
            .as_deref()
            .map(str::trim)
            .filter(|region| !region.is_empty())
            .unwrap_or(DEFAULT_REGION)
            .to_string()
    }

    pub fn week(&self) -> u32 {
        self.week.unwrap_or(DEFAULT_WEEK)
    }

    pub fn use_cases(&self) -> Result<Vec<AlertUseCase>, String> {
        AlertUseCase::parse_list(self.use_case.as_deref().unwrap_or_default()).map_err(|err| err.to_string())
    }
}

pub fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| format!("{} is required", name))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRequest {
    pub actor_id: Option<String>,
    pub region: Option<String>,
    pub start_week: Option<u32>,
    pub duration_weeks: Option<u32>,
    pub deployment_intensity: Option<String>,
}

impl ImpactRequest {
    pub fn into_input(self) -> Result<(String, ImpactSimulationInput), String> {
        let actor_id = required(&self.actor_id, "actorId")?.to_string();
        let region = self
            .region
            .map(|region| region.trim().to_string())
            .filter(|region| !region.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let deployment_intensity = match self.deployment_intensity.as_deref() {
            Some(value) => DeploymentIntensity::from_str(value)
                .ok_or_else(|| format!("invalid deployment intensity: {}", value))?,
            None => DeploymentIntensity::Medium,
        };

        let input = ImpactSimulationInput {
            region,
            start_week: self.start_week.unwrap_or(DEFAULT_WEEK),
            duration_weeks: self.duration_weeks.unwrap_or(4),
            deployment_intensity,
        };
        Ok((actor_id, input))
    }
}

/// Case-study body: the input fields plus an optional week for bloom context.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudyRequest {
    #[serde(flatten)]
    pub input: CaseStudyInput,
    pub week: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeksResponse {
    pub region: Option<String>,
    pub weeks: Vec<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitResponse {
    pub actor_id: String,
    pub actor_name: String,
    pub region: String,
    pub week: u32,
    pub fit: ProblemFitScore,
}

impl FitResponse {
    pub fn from_score(actor: &Actor, summary: &BloomSummary, fit: ProblemFitScore) -> Self {
        Self {
            actor_id: actor.id.clone(),
            actor_name: actor.name.clone(),
            region: summary.region.clone(),
            week: summary.week,
            fit,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchResponse<T: Serialize> {
    pub actor_id: String,
    #[serde(flatten)]
    pub body: T,
    pub text: String,
}
