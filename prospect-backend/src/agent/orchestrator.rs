//! Research orchestrator - the bounded control loop behind one lead-research run
//!
//! Each iteration advances a reasoning note, asks the selector for the next
//! capability, invokes it, and folds the observation into the context. The
//! loop always halts: providers absorb their own failures, folding never
//! raises, and the step budget caps the iteration count. Worst case it runs
//! out of budget with partial data and reports the run as incomplete.

use crate::agent::providers::ResearchProviders;
use crate::agent::selector::{select_next, NextAction};
use crate::agent::types::{
    AgentPhase, Observation, ResearchContext, ResearchData, ResearchReport, RunStatus,
};
use crate::ai::{CompletionBackend, CompletionRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const THINK_MAX_TOKENS: u32 = 150;
const PAIN_MAX_TOKENS: u32 = 100;

/// Loop parameters. The delay is a rate-limit policy knob for outbound
/// calls, not a correctness requirement; tests set it to zero.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub step_budget: u32,
    pub step_delay: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            step_budget: 10,
            step_delay: Duration::from_millis(500),
        }
    }
}

pub struct LeadResearchAgent {
    providers: Arc<dyn ResearchProviders>,
    completion: Arc<dyn CompletionBackend>,
    config: AgentConfig,
}

impl LeadResearchAgent {
    pub fn new(
        providers: Arc<dyn ResearchProviders>,
        completion: Arc<dyn CompletionBackend>,
        config: AgentConfig,
    ) -> Self {
        Self {
            providers,
            completion,
            config,
        }
    }

    /// Run one research loop to completion, budget exhaustion, or failure.
    pub async fn run(
        &self,
        company_name: Option<&str>,
        company_domain: Option<&str>,
        persona: &str,
    ) -> ResearchReport {
        self.run_cancellable(company_name, company_domain, persona, &CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), but aborts at the next suspension point once
    /// the token is cancelled, reporting the run as failed rather than
    /// leaving it in an ambiguous half-finished state.
    pub async fn run_cancellable(
        &self,
        company_name: Option<&str>,
        company_domain: Option<&str>,
        persona: &str,
        cancel: &CancellationToken,
    ) -> ResearchReport {
        let (name, domain) = match resolve_identity(company_name, company_domain) {
            Some(identity) => identity,
            None => {
                return ResearchReport {
                    status: RunStatus::Error,
                    company_name: String::new(),
                    company_domain: String::new(),
                    persona: persona.to_string(),
                    reasoning_trace: Vec::new(),
                    steps_executed: 0,
                    data: ResearchData::default(),
                    error: Some("company_name or company_domain is required".to_string()),
                };
            }
        };

        let run_id = Uuid::new_v4();
        log::info!(
            "[AGENT] Starting research run {} for {} ({}), persona '{}'",
            run_id,
            name,
            domain,
            persona
        );

        let mut ctx = ResearchContext::new(name, domain, persona, self.config.step_budget);

        while ctx.step_count < ctx.step_budget && !ctx.phase.is_terminal() {
            if cancel.is_cancelled() {
                return self.cancelled(ctx);
            }

            ctx.phase = AgentPhase::Thinking;
            ctx.step_count += 1;
            let note = tokio::select! {
                _ = cancel.cancelled() => None,
                note = self.think(&ctx) => Some(note),
            };
            let note = match note {
                Some(note) => note,
                None => return self.cancelled(ctx),
            };
            ctx.reasoning_trace.push(note);

            ctx.phase = AgentPhase::Executing;
            let action = select_next(&ctx);
            log::debug!(
                "[AGENT] Run {} step {}/{}: {}",
                run_id,
                ctx.step_count,
                ctx.step_budget,
                action.label()
            );

            if matches!(action, NextAction::Finish) {
                ctx.phase = AgentPhase::Complete;
                break;
            }

            let step = tokio::select! {
                _ = cancel.cancelled() => None,
                obs = self.execute(action, &ctx) => Some(obs),
            };
            let observation = match step {
                Some(observation) => observation,
                None => return self.cancelled(ctx),
            };

            ctx.phase = AgentPhase::Observing;
            if let Some(observation) = observation {
                observation.fold_into(&mut ctx);
            }

            if !self.config.step_delay.is_zero() {
                let interrupted = tokio::select! {
                    _ = cancel.cancelled() => true,
                    _ = tokio::time::sleep(self.config.step_delay) => false,
                };
                if interrupted {
                    return self.cancelled(ctx);
                }
            }
        }

        log::info!(
            "[AGENT] Run {} finished: phase {}, {} of {} steps",
            run_id,
            ctx.phase,
            ctx.step_count,
            ctx.step_budget
        );
        compile_report(ctx, None)
    }

    /// Advisory reasoning note for the audit trail. Never affects control
    /// flow; a dead model degrades to a deterministic local note.
    async fn think(&self, ctx: &ResearchContext) -> String {
        let shape = ctx.shape_summary();
        let prompt = format!(
            "Step {}: researching {} ({}). Data so far: {}.\nIn one or two sentences, what should the research loop do next?",
            ctx.step_count, ctx.company_name, ctx.company_domain, shape
        );

        match self
            .completion
            .complete(CompletionRequest::text(prompt, THINK_MAX_TOKENS))
            .await
        {
            Ok(note) if !note.trim().is_empty() => note.trim().to_string(),
            Ok(_) | Err(_) => format!(
                "Step {}: continuing research for {} ({}). Data: {}",
                ctx.step_count, ctx.company_name, ctx.company_domain, shape
            ),
        }
    }

    /// Pain hypothesis, derived in the loop rather than by a provider. A
    /// failed completion degrades to a templated statement.
    async fn generate_pain(&self, ctx: &ResearchContext) -> String {
        let tech = ctx
            .tech_signals
            .iter()
            .take(3)
            .map(|t| t.technology.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let prompt = format!(
            "Write a 2-sentence pain hypothesis for {} (tech: {}, target persona: {}). Focus on scaling challenges.",
            ctx.company_name, tech, ctx.persona
        );

        match self
            .completion
            .complete(CompletionRequest::text(prompt, PAIN_MAX_TOKENS))
            .await
        {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) | Err(_) => format!(
                "{} is likely facing scaling challenges that matter to a {}.",
                ctx.company_name, ctx.persona
            ),
        }
    }

    /// Invoke the selected capability. Returns None only for `Finish`, which
    /// the loop handles before getting here.
    async fn execute(&self, action: NextAction, ctx: &ResearchContext) -> Option<Observation> {
        match action {
            NextAction::ScrapeSite { domain } => {
                Some(Observation::Site(self.providers.scrape_site(&domain).await))
            }
            NextAction::FindDecisionMakers { company, persona } => Some(Observation::Contacts(
                self.providers.find_decision_makers(&company, &persona).await,
            )),
            NextAction::DetectTech { domain } => {
                Some(Observation::Tech(self.providers.detect_tech(&domain).await))
            }
            NextAction::InferPain => Some(Observation::Pain(self.generate_pain(ctx).await)),
            NextAction::DraftEmail { recipient } => {
                let description = ctx
                    .site_summary
                    .as_ref()
                    .map(|s| s.description.as_str())
                    .unwrap_or("");
                Some(Observation::Email(
                    self.providers
                        .draft_email(
                            &ctx.company_name,
                            description,
                            &recipient,
                            &ctx.tech_signals,
                            &ctx.pain_hypothesis,
                        )
                        .await,
                ))
            }
            NextAction::ScoreLead => {
                let email = ctx.draft_email.clone().unwrap_or_default();
                Some(Observation::Score(
                    self.providers
                        .score_lead(&ctx.company_name, &ctx.persona, &ctx.tech_signals, &email)
                        .await,
                ))
            }
            NextAction::Finish => None,
        }
    }

    fn cancelled(&self, mut ctx: ResearchContext) -> ResearchReport {
        log::info!(
            "[AGENT] Research run for {} cancelled after {} steps",
            ctx.company_name,
            ctx.step_count
        );
        ctx.phase = AgentPhase::Failed;
        compile_report(ctx, Some("research run cancelled".to_string()))
    }
}

/// Resolve caller-supplied identity into (company_name, company_domain).
/// Both absent is a terminal input error; an absent domain is inferred from
/// the name as a best-effort heuristic.
fn resolve_identity(
    company_name: Option<&str>,
    company_domain: Option<&str>,
) -> Option<(String, String)> {
    let name = company_name.map(str::trim).filter(|s| !s.is_empty());
    let domain = company_domain.map(str::trim).filter(|s| !s.is_empty());

    match (name, domain) {
        (None, None) => None,
        (name, domain) => {
            let resolved_domain = domain
                .map(|d| d.to_string())
                .or_else(|| name.map(infer_domain))
                .unwrap_or_default();
            let resolved_name = name.or(domain).unwrap_or_default().to_string();
            Some((resolved_name, resolved_domain))
        }
    }
}

/// Heuristic domain from a company name: names that already look like a host
/// are used as-is minus protocol and `www.` prefixes; anything else is
/// lowercased, squeezed, and given a `.com`. May well not resolve; the
/// scraper tolerates that.
pub fn infer_domain(company_name: &str) -> String {
    let cleaned = company_name.trim().to_lowercase();
    if cleaned.contains('.') {
        return cleaned
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_start_matches("www.")
            .trim_end_matches('/')
            .to_string();
    }
    format!("{}.com", cleaned.replace([' ', '.'], ""))
}

/// Flatten the final context into the caller-facing report.
fn compile_report(ctx: ResearchContext, error: Option<String>) -> ResearchReport {
    let status = match ctx.phase {
        AgentPhase::Complete => RunStatus::Complete,
        AgentPhase::Failed => RunStatus::Error,
        _ => RunStatus::Incomplete,
    };

    ResearchReport {
        status,
        company_name: ctx.company_name,
        company_domain: ctx.company_domain,
        persona: ctx.persona,
        reasoning_trace: ctx.reasoning_trace,
        steps_executed: ctx.step_count,
        data: ResearchData {
            site_summary: ctx.site_summary,
            decision_makers: ctx.decision_makers,
            tech_signals: ctx.tech_signals,
            pain_hypothesis: ctx.pain_hypothesis,
            draft_email: ctx.draft_email,
            lead_score: ctx.lead_score,
        },
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::{DecisionMaker, DraftEmail, LeadScore, SiteSummary, TechSignal};
    use crate::ai::ProviderError;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    struct FixedCompletion(Result<String, ProviderError>);

    #[async_trait]
    impl CompletionBackend for FixedCompletion {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, ProviderError> {
            self.0.clone()
        }
    }

    fn failing_completion() -> Arc<dyn CompletionBackend> {
        Arc::new(FixedCompletion(Err(ProviderError::Network(
            "unreachable".to_string(),
        ))))
    }

    fn contact(name: &str, relevance: f64) -> DecisionMaker {
        DecisionMaker {
            name: name.to_string(),
            title: "CTO".to_string(),
            company: "Acme".to_string(),
            seniority: "c-suite".to_string(),
            search_url: None,
            relevance_score: relevance,
        }
    }

    /// Happy-path providers that record invocation order.
    struct RecordingProviders {
        calls: Mutex<Vec<&'static str>>,
        contacts: Vec<DecisionMaker>,
    }

    impl RecordingProviders {
        fn new() -> Self {
            RecordingProviders {
                calls: Mutex::new(Vec::new()),
                contacts: vec![contact("Sam", 0.9), contact("Alex", 0.75)],
            }
        }
    }

    #[async_trait]
    impl ResearchProviders for RecordingProviders {
        async fn scrape_site(&self, _domain: &str) -> SiteSummary {
            self.calls.lock().unwrap().push("scrape");
            SiteSummary {
                description: "Widgets at scale".to_string(),
                title: "Acme".to_string(),
                text_excerpt: "We ship widgets.".to_string(),
                source_url: Some("https://acme.com".to_string()),
                error: None,
            }
        }

        async fn find_decision_makers(&self, _company: &str, _persona: &str) -> Vec<DecisionMaker> {
            self.calls.lock().unwrap().push("contacts");
            self.contacts.clone()
        }

        async fn detect_tech(&self, _domain: &str) -> Vec<TechSignal> {
            self.calls.lock().unwrap().push("tech");
            vec![TechSignal {
                technology: "React".to_string(),
                category: "Frontend".to_string(),
                confidence: 0.85,
            }]
        }

        async fn draft_email(
            &self,
            _company: &str,
            _description: &str,
            recipient: &DecisionMaker,
            _tech_signals: &[TechSignal],
            _pain_hypothesis: &str,
        ) -> DraftEmail {
            self.calls.lock().unwrap().push("email");
            DraftEmail {
                subject: format!("To {}", recipient.name),
                body: "Hi".to_string(),
                personalization_notes: vec![],
                call_to_action: "Call?".to_string(),
            }
        }

        async fn score_lead(
            &self,
            _company: &str,
            _persona: &str,
            _tech_signals: &[TechSignal],
            _email: &DraftEmail,
        ) -> LeadScore {
            self.calls.lock().unwrap().push("score");
            LeadScore {
                reply_probability: 0.6,
                quality_score: 70.0,
                reasoning: "Decent fit".to_string(),
                factors: BTreeMap::new(),
            }
        }
    }

    /// Providers that violate their fallback contracts and return nothing,
    /// forever. Only reachable from tests; exercises budget exhaustion.
    struct EmptyProviders;

    #[async_trait]
    impl ResearchProviders for EmptyProviders {
        async fn scrape_site(&self, _domain: &str) -> SiteSummary {
            SiteSummary::unreachable("stubbed out")
        }

        async fn find_decision_makers(&self, _company: &str, _persona: &str) -> Vec<DecisionMaker> {
            Vec::new()
        }

        async fn detect_tech(&self, _domain: &str) -> Vec<TechSignal> {
            Vec::new()
        }

        async fn draft_email(
            &self,
            _company: &str,
            _description: &str,
            _recipient: &DecisionMaker,
            _tech_signals: &[TechSignal],
            _pain_hypothesis: &str,
        ) -> DraftEmail {
            DraftEmail::default()
        }

        async fn score_lead(
            &self,
            _company: &str,
            _persona: &str,
            _tech_signals: &[TechSignal],
            _email: &DraftEmail,
        ) -> LeadScore {
            LeadScore::default()
        }
    }

    fn agent(providers: Arc<dyn ResearchProviders>) -> LeadResearchAgent {
        LeadResearchAgent::new(
            providers,
            failing_completion(),
            AgentConfig {
                step_budget: 10,
                step_delay: Duration::ZERO,
            },
        )
    }

    #[tokio::test]
    async fn complete_run_invokes_capabilities_in_dependency_order() {
        let providers = Arc::new(RecordingProviders::new());
        let report = agent(providers.clone())
            .run(Some("Acme"), Some("acme.com"), "VP Sales")
            .await;

        assert_eq!(report.status, RunStatus::Complete);
        // scrape, contacts, tech, pain (loop-local), email, score, finish
        assert_eq!(report.steps_executed, 7);
        assert_eq!(
            providers.calls.lock().unwrap().as_slice(),
            ["scrape", "contacts", "tech", "email", "score"]
        );
        assert!(report.data.site_summary.is_some());
        assert!(!report.data.pain_hypothesis.is_empty());
        assert!(report.data.draft_email.is_some());
        assert!(report.data.lead_score.is_some());
    }

    #[tokio::test]
    async fn email_goes_to_the_highest_relevance_contact() {
        let report = agent(Arc::new(RecordingProviders::new()))
            .run(Some("Acme"), None, "VP Sales")
            .await;

        let email = report.data.draft_email.unwrap();
        assert_eq!(email.subject, "To Sam");
    }

    #[tokio::test]
    async fn trace_grows_by_one_note_per_thinking_phase() {
        let report = agent(Arc::new(RecordingProviders::new()))
            .run(Some("Acme"), Some("acme.com"), "VP Sales")
            .await;

        assert_eq!(report.reasoning_trace.len() as u32, report.steps_executed);
        // Dead completion backend: every note is the deterministic fallback.
        assert!(report.reasoning_trace[0].starts_with("Step 1:"));
    }

    #[tokio::test]
    async fn empty_providers_exhaust_the_budget_exactly() {
        let report = agent(Arc::new(EmptyProviders))
            .run(Some("Acme"), Some("acme.com"), "VP Sales")
            .await;

        assert_eq!(report.status, RunStatus::Incomplete);
        assert_eq!(report.steps_executed, 10);
        assert_eq!(report.reasoning_trace.len(), 10);
        assert!(report.data.decision_makers.is_empty());
        assert!(report.data.draft_email.is_none());
    }

    #[tokio::test]
    async fn missing_identity_is_a_terminal_error_with_zero_steps() {
        let report = agent(Arc::new(RecordingProviders::new()))
            .run(None, None, "VP Sales")
            .await;

        assert_eq!(report.status, RunStatus::Error);
        assert_eq!(report.steps_executed, 0);
        assert!(report.reasoning_trace.is_empty());
        assert!(report.error.unwrap().contains("required"));
    }

    #[tokio::test]
    async fn blank_identity_strings_count_as_absent() {
        let report = agent(Arc::new(RecordingProviders::new()))
            .run(Some("   "), Some(""), "VP Sales")
            .await;

        assert_eq!(report.status, RunStatus::Error);
    }

    #[tokio::test]
    async fn domain_is_inferred_when_absent() {
        let report = agent(Arc::new(RecordingProviders::new()))
            .run(Some("Acme Corp"), None, "VP Sales")
            .await;

        assert_eq!(report.company_domain, "acmecorp.com");
        assert_eq!(report.company_name, "Acme Corp");
    }

    #[tokio::test]
    async fn name_falls_back_to_the_domain_when_absent() {
        let report = agent(Arc::new(RecordingProviders::new()))
            .run(None, Some("acme.com"), "VP Sales")
            .await;

        assert_eq!(report.company_name, "acme.com");
        assert_eq!(report.company_domain, "acme.com");
    }

    #[tokio::test]
    async fn identical_inputs_and_stubs_give_identical_data() {
        let first = agent(Arc::new(RecordingProviders::new()))
            .run(Some("Acme"), Some("acme.com"), "VP Sales")
            .await;
        let second = agent(Arc::new(RecordingProviders::new()))
            .run(Some("Acme"), Some("acme.com"), "VP Sales")
            .await;

        assert_eq!(
            serde_json::to_value(&first.data).unwrap(),
            serde_json::to_value(&second.data).unwrap()
        );
    }

    #[tokio::test]
    async fn cancellation_before_the_first_step_fails_cleanly() {
        let token = CancellationToken::new();
        token.cancel();

        let report = agent(Arc::new(RecordingProviders::new()))
            .run_cancellable(Some("Acme"), Some("acme.com"), "VP Sales", &token)
            .await;

        assert_eq!(report.status, RunStatus::Error);
        assert_eq!(report.steps_executed, 0);
        assert!(report.error.unwrap().contains("cancelled"));
    }

    #[tokio::test]
    async fn dead_model_and_dead_network_still_complete_via_fallbacks() {
        use crate::agent::providers::{FetchedPage, LiveProviders, PageFetcher};

        struct DeadFetcher;

        #[async_trait]
        impl PageFetcher for DeadFetcher {
            async fn fetch(&self, _url: &str) -> Result<FetchedPage, ProviderError> {
                Err(ProviderError::Network("no route to host".to_string()))
            }
        }

        let providers = Arc::new(LiveProviders::new(failing_completion(), Arc::new(DeadFetcher)));
        let report = agent(providers)
            .run(Some("Acme"), Some("acme.com"), "VP Sales")
            .await;

        // Every provider absorbed its failure: error-tagged scrape, fallback
        // CTO contact, Unknown tech entry, templated pain/email, neutral score.
        assert_eq!(report.status, RunStatus::Complete);
        assert_eq!(report.steps_executed, 7);
        assert_eq!(report.data.decision_makers.len(), 1);
        assert_eq!(report.data.decision_makers[0].name, "CTO");
        assert!(report.data.site_summary.unwrap().error.is_some());
        assert_eq!(report.data.tech_signals[0].technology, "Unknown");
        assert_eq!(report.data.lead_score.unwrap().quality_score, 50.0);
    }

    #[test]
    fn infer_domain_squeezes_plain_names() {
        assert_eq!(infer_domain("Acme Corp"), "acmecorp.com");
        assert_eq!(infer_domain("  Initech  "), "initech.com");
    }

    #[test]
    fn infer_domain_strips_protocol_and_www() {
        assert_eq!(infer_domain("https://foo.io"), "foo.io");
        assert_eq!(infer_domain("http://www.foo.io/"), "foo.io");
        assert_eq!(infer_domain("www.foo.io"), "foo.io");
        assert_eq!(infer_domain("foo.io"), "foo.io");
    }
}
