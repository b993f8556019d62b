//! Research agent types - the per-run context and its typed field results

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where the control loop currently is within one research run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentPhase {
    Idle,
    Thinking,
    Executing,
    Observing,
    Complete,
    Failed,
}

impl Default for AgentPhase {
    fn default() -> Self {
        AgentPhase::Idle
    }
}

impl std::fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentPhase::Idle => write!(f, "idle"),
            AgentPhase::Thinking => write!(f, "thinking"),
            AgentPhase::Executing => write!(f, "executing"),
            AgentPhase::Observing => write!(f, "observing"),
            AgentPhase::Complete => write!(f, "complete"),
            AgentPhase::Failed => write!(f, "failed"),
        }
    }
}

impl AgentPhase {
    /// Terminal phases stop the loop regardless of remaining budget.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentPhase::Complete | AgentPhase::Failed)
    }
}

/// What a scrape of the company site produced. An unreachable site yields an
/// empty summary with `error` set; the run carries on either way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteSummary {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text_excerpt: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SiteSummary {
    pub fn unreachable(reason: impl Into<String>) -> Self {
        SiteSummary {
            error: Some(reason.into()),
            ..Default::default()
        }
    }
}

/// A candidate contact at the target company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionMaker {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub seniority: String,
    #[serde(default)]
    pub search_url: Option<String>,
    /// Ranking certainty in [0, 1].
    pub relevance_score: f64,
}

/// One detected technology with a fixed per-signature confidence in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechSignal {
    pub technology: String,
    pub category: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftEmail {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub personalization_notes: Vec<String>,
    #[serde(default)]
    pub call_to_action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadScore {
    /// Probability of a reply in [0, 1].
    #[serde(default)]
    pub reply_probability: f64,
    /// Overall quality in [0, 100].
    #[serde(default)]
    pub quality_score: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub factors: BTreeMap<String, f64>,
}

/// The mutable record one research run accumulates. Owned exclusively by its
/// loop invocation; never shared across concurrent runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchContext {
    pub company_name: String,
    pub company_domain: String,
    pub persona: String,

    pub site_summary: Option<SiteSummary>,
    pub decision_makers: Vec<DecisionMaker>,
    pub tech_signals: Vec<TechSignal>,
    pub pain_hypothesis: String,
    pub draft_email: Option<DraftEmail>,
    pub lead_score: Option<LeadScore>,

    /// One reasoning note per completed Thinking phase. Append-only.
    pub reasoning_trace: Vec<String>,

    pub step_count: u32,
    pub step_budget: u32,
    pub phase: AgentPhase,
}

impl ResearchContext {
    pub fn new(
        company_name: impl Into<String>,
        company_domain: impl Into<String>,
        persona: impl Into<String>,
        step_budget: u32,
    ) -> Self {
        ResearchContext {
            company_name: company_name.into(),
            company_domain: company_domain.into(),
            persona: persona.into(),
            site_summary: None,
            decision_makers: Vec::new(),
            tech_signals: Vec::new(),
            pain_hypothesis: String::new(),
            draft_email: None,
            lead_score: None,
            reasoning_trace: Vec::new(),
            step_count: 0,
            step_budget,
            phase: AgentPhase::Idle,
        }
    }

    /// One-line shape summary for the thinking prompt: which fields are
    /// populated and which are still missing.
    pub fn shape_summary(&self) -> String {
        format!(
            "scraped={}, decision_makers={}, tech_signals={}, pain={}, email={}, score={}",
            self.site_summary.is_some(),
            self.decision_makers.len(),
            self.tech_signals.len(),
            !self.pain_hypothesis.is_empty(),
            self.draft_email.is_some(),
            self.lead_score.is_some(),
        )
    }
}

/// A capability's output, folded into the matching context field. Each
/// variant maps onto exactly one field; folding a variant whose field is
/// already populated is a no-op (fields are write-once).
#[derive(Debug, Clone)]
pub enum Observation {
    Site(SiteSummary),
    Contacts(Vec<DecisionMaker>),
    Tech(Vec<TechSignal>),
    Pain(String),
    Email(DraftEmail),
    Score(LeadScore),
}

impl Observation {
    /// Fold this observation into the context. Never fails: a malformed or
    /// error-shaped observation has already been absorbed into a default by
    /// the provider that produced it.
    pub fn fold_into(self, ctx: &mut ResearchContext) {
        match self {
            Observation::Site(summary) => {
                if ctx.site_summary.is_none() {
                    ctx.site_summary = Some(summary);
                }
            }
            Observation::Contacts(contacts) => {
                if ctx.decision_makers.is_empty() {
                    ctx.decision_makers = contacts;
                }
            }
            Observation::Tech(signals) => {
                if ctx.tech_signals.is_empty() {
                    ctx.tech_signals = signals;
                }
            }
            Observation::Pain(hypothesis) => {
                if ctx.pain_hypothesis.is_empty() {
                    ctx.pain_hypothesis = hypothesis;
                }
            }
            Observation::Email(email) => {
                if ctx.draft_email.is_none() {
                    ctx.draft_email = Some(email);
                }
            }
            Observation::Score(score) => {
                if ctx.lead_score.is_none() {
                    ctx.lead_score = Some(score);
                }
            }
        }
    }
}

/// How a finished run is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every field was populated and the selector signalled completion.
    Complete,
    /// The step budget ran out with partial data. Not an error.
    Incomplete,
    /// Terminal failure: missing identity input or cancellation.
    Error,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Complete => write!(f, "complete"),
            RunStatus::Incomplete => write!(f, "incomplete"),
            RunStatus::Error => write!(f, "error"),
        }
    }
}

/// The flattened result the loop hands back to its caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    pub status: RunStatus,
    pub company_name: String,
    pub company_domain: String,
    pub persona: String,
    pub reasoning_trace: Vec<String>,
    pub steps_executed: u32,
    pub data: ResearchData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchData {
    pub site_summary: Option<SiteSummary>,
    pub decision_makers: Vec<DecisionMaker>,
    pub tech_signals: Vec<TechSignal>,
    pub pain_hypothesis: String,
    pub draft_email: Option<DraftEmail>,
    pub lead_score: Option<LeadScore>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_populates_empty_fields() {
        let mut ctx = ResearchContext::new("Acme", "acme.com", "VP Sales", 10);

        Observation::Site(SiteSummary {
            title: "Acme".to_string(),
            ..Default::default()
        })
        .fold_into(&mut ctx);

        assert_eq!(ctx.site_summary.as_ref().unwrap().title, "Acme");
    }

    #[test]
    fn fold_never_overwrites_a_populated_field() {
        let mut ctx = ResearchContext::new("Acme", "acme.com", "VP Sales", 10);
        ctx.pain_hypothesis = "original".to_string();

        Observation::Pain("replacement".to_string()).fold_into(&mut ctx);

        assert_eq!(ctx.pain_hypothesis, "original");
    }

    #[test]
    fn terminal_phases() {
        assert!(AgentPhase::Complete.is_terminal());
        assert!(AgentPhase::Failed.is_terminal());
        assert!(!AgentPhase::Observing.is_terminal());
    }
}
