//! Lead models - request schema, stored record, and the public response shape
//!
//! Shaping a record into a response is defaulting and coercion only; all the
//! business logic lives in the agent.

use crate::agent::{
    DecisionMaker, DraftEmail, LeadScore, ResearchReport, RunStatus, SiteSummary, TechSignal,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/leads/research`. At least one of name/domain must be
/// present; the handler rejects the request otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct ResearchRequest {
    pub company_name: Option<String>,
    pub company_domain: Option<String>,
    pub persona: String,
}

/// A finished research run as stored in the leads table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: Option<i64>,
    pub company_name: String,
    pub company_domain: String,
    pub persona: String,
    pub site_summary: Option<SiteSummary>,
    pub decision_makers: Vec<DecisionMaker>,
    pub tech_signals: Vec<TechSignal>,
    pub pain_hypothesis: String,
    pub draft_email: Option<DraftEmail>,
    pub lead_score: Option<LeadScore>,
    pub reasoning_trace: Vec<String>,
    pub steps_executed: u32,
    /// How the run ended: complete or incomplete.
    pub run_status: RunStatus,
    /// Workflow tag for the sales pipeline; new records start as "new".
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl LeadRecord {
    /// Capture a finished report for storage, stamped with the current time.
    pub fn from_report(report: ResearchReport) -> Self {
        let now = Utc::now().to_rfc3339();
        LeadRecord {
            id: None,
            company_name: report.company_name,
            company_domain: report.company_domain,
            persona: report.persona,
            site_summary: report.data.site_summary,
            decision_makers: report.data.decision_makers,
            tech_signals: report.data.tech_signals,
            pain_hypothesis: report.data.pain_hypothesis,
            draft_email: report.data.draft_email,
            lead_score: report.data.lead_score,
            reasoning_trace: report.reasoning_trace,
            steps_executed: report.steps_executed,
            run_status: report.status,
            status: "new".to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Narrative summary block in the public response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadAnalysis {
    pub company_summary: String,
    pub key_insights: Vec<String>,
    pub pain_points: Vec<String>,
    pub opportunities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadResponse {
    pub id: String,
    pub company_name: String,
    pub company_domain: String,
    pub persona: String,
    pub analysis: LeadAnalysis,
    pub decision_makers: Vec<DecisionMaker>,
    pub tech_stack: Vec<TechSignal>,
    pub pain_hypothesis: String,
    pub generated_email: DraftEmail,
    pub score: LeadScore,
    pub reasoning_trace: Vec<String>,
    pub steps_executed: u32,
    pub run_status: RunStatus,
    pub status: String,
    pub created_at: String,
}

impl LeadResponse {
    pub fn from_record(record: LeadRecord) -> Self {
        let summary = record.site_summary.clone().unwrap_or_default();

        let company_summary = if !summary.description.is_empty() {
            summary.description.clone()
        } else {
            summary.title.clone()
        };

        let mut key_insights = Vec::new();
        if !summary.title.is_empty() {
            key_insights.push(format!("Site title: {}", summary.title));
        }
        if let Some(ref url) = summary.source_url {
            key_insights.push(format!("Source: {}", url));
        }

        let pain_points = if record.pain_hypothesis.is_empty() {
            Vec::new()
        } else {
            vec![record.pain_hypothesis.clone()]
        };

        LeadResponse {
            id: record.id.map(|id| id.to_string()).unwrap_or_default(),
            company_name: record.company_name,
            company_domain: record.company_domain,
            persona: record.persona,
            analysis: LeadAnalysis {
                company_summary,
                key_insights,
                pain_points,
                opportunities: Vec::new(),
            },
            decision_makers: record.decision_makers,
            tech_stack: record.tech_signals,
            pain_hypothesis: record.pain_hypothesis,
            generated_email: record.draft_email.unwrap_or_default(),
            score: record.lead_score.unwrap_or_default(),
            reasoning_trace: record.reasoning_trace,
            steps_executed: record.steps_executed,
            run_status: record.run_status,
            status: record.status,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadListResponse {
    pub leads: Vec<LeadResponse>,
    pub total: i64,
}
