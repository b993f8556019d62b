//! Capability providers - the five external tasks the research loop drives
//!
//! Every provider absorbs its own failures: whatever goes wrong underneath
//! (network, model, parse), the caller gets the documented fallback value,
//! never an error.

pub mod contact_finder;
pub mod email_writer;
pub mod fetch;
pub mod lead_scorer;
pub mod site_scraper;
pub mod tech_detector;

pub use fetch::{FetchedPage, HttpFetcher, PageFetcher};

use crate::agent::types::{DecisionMaker, DraftEmail, LeadScore, SiteSummary, TechSignal};
use crate::ai::CompletionBackend;
use async_trait::async_trait;
use std::sync::Arc;

/// The capability surface the orchestration loop invokes. One trait so the
/// whole loop can run against instrumented stand-ins in tests.
#[async_trait]
pub trait ResearchProviders: Send + Sync {
    async fn scrape_site(&self, domain: &str) -> SiteSummary;

    async fn find_decision_makers(&self, company: &str, persona: &str) -> Vec<DecisionMaker>;

    async fn detect_tech(&self, domain: &str) -> Vec<TechSignal>;

    async fn draft_email(
        &self,
        company: &str,
        description: &str,
        recipient: &DecisionMaker,
        tech_signals: &[TechSignal],
        pain_hypothesis: &str,
    ) -> DraftEmail;

    async fn score_lead(
        &self,
        company: &str,
        persona: &str,
        tech_signals: &[TechSignal],
        email: &DraftEmail,
    ) -> LeadScore;
}

/// Production wiring: completion model plus live page fetching.
pub struct LiveProviders {
    completion: Arc<dyn CompletionBackend>,
    fetcher: Arc<dyn PageFetcher>,
}

impl LiveProviders {
    pub fn new(completion: Arc<dyn CompletionBackend>, fetcher: Arc<dyn PageFetcher>) -> Self {
        LiveProviders {
            completion,
            fetcher,
        }
    }
}

#[async_trait]
impl ResearchProviders for LiveProviders {
    async fn scrape_site(&self, domain: &str) -> SiteSummary {
        site_scraper::scrape(self.fetcher.as_ref(), domain).await
    }

    async fn find_decision_makers(&self, company: &str, persona: &str) -> Vec<DecisionMaker> {
        contact_finder::find(self.completion.as_ref(), company, persona).await
    }

    async fn detect_tech(&self, domain: &str) -> Vec<TechSignal> {
        tech_detector::detect(self.fetcher.as_ref(), domain).await
    }

    async fn draft_email(
        &self,
        company: &str,
        description: &str,
        recipient: &DecisionMaker,
        tech_signals: &[TechSignal],
        pain_hypothesis: &str,
    ) -> DraftEmail {
        email_writer::draft(
            self.completion.as_ref(),
            company,
            description,
            recipient,
            tech_signals,
            pain_hypothesis,
        )
        .await
    }

    async fn score_lead(
        &self,
        company: &str,
        persona: &str,
        tech_signals: &[TechSignal],
        email: &DraftEmail,
    ) -> LeadScore {
        lead_scorer::score(self.completion.as_ref(), company, persona, tech_signals, email).await
    }
}
