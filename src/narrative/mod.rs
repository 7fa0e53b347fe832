//! Generated prose: pitch slides, pilot sketches and customer case studies.

pub mod case_study;
pub mod pilot;
pub mod pitch;

pub use case_study::{
    build_case_study, build_case_study_at, case_study_to_markdown, case_study_to_text, CaseMetric, CaseSection,
    CaseStudyInput, StartupCaseStudy,
};
pub use pilot::{build_pilot_opportunity, format_pilot_as_text, PilotOpportunity};
pub use pitch::{build_pitch_snippet, format_pitch_as_markdown, format_pitch_as_text, PitchSnippet, Slide};
