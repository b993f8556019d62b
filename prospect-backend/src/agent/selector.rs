//! Action selection - maps the current research context to the next step
//!
//! The selector is a pure function of the context. It encodes the dependency
//! order between fields: site content before decision makers, decision makers
//! before the email, the email before the score.

use crate::agent::types::{DecisionMaker, ResearchContext};

/// The next step the loop should take. Closed set: the five capabilities,
/// one local compute step, and completion.
#[derive(Debug, Clone, PartialEq)]
pub enum NextAction {
    ScrapeSite {
        domain: String,
    },
    FindDecisionMakers {
        company: String,
        persona: String,
    },
    DetectTech {
        domain: String,
    },
    /// Derive the pain hypothesis from what has been gathered so far. Runs
    /// inside the loop rather than calling out to a capability provider.
    InferPain,
    DraftEmail {
        /// The single highest-relevance contact found so far.
        recipient: DecisionMaker,
    },
    ScoreLead,
    /// Every field is populated; the run is complete.
    Finish,
}

impl NextAction {
    /// Short label for the reasoning trace and logs.
    pub fn label(&self) -> &'static str {
        match self {
            NextAction::ScrapeSite { .. } => "scrape_site",
            NextAction::FindDecisionMakers { .. } => "find_decision_makers",
            NextAction::DetectTech { .. } => "detect_tech",
            NextAction::InferPain => "infer_pain",
            NextAction::DraftEmail { .. } => "draft_email",
            NextAction::ScoreLead => "score_lead",
            NextAction::Finish => "finish",
        }
    }
}

/// Pick the next action for the given context. Conditions are checked in
/// fixed order; the first unmet one wins, so no capability is invoked twice
/// in a normally completing run.
///
/// If the decision-maker list is somehow still empty when everything up
/// through the pain hypothesis is populated, the email step stays blocked
/// and the selector keeps asking for decision makers until the loop's
/// budget runs out.
pub fn select_next(ctx: &ResearchContext) -> NextAction {
    if ctx.site_summary.is_none() {
        return NextAction::ScrapeSite {
            domain: ctx.company_domain.clone(),
        };
    }
    if ctx.decision_makers.is_empty() {
        return NextAction::FindDecisionMakers {
            company: ctx.company_name.clone(),
            persona: ctx.persona.clone(),
        };
    }
    if ctx.tech_signals.is_empty() {
        return NextAction::DetectTech {
            domain: ctx.company_domain.clone(),
        };
    }
    if ctx.pain_hypothesis.is_empty() {
        return NextAction::InferPain;
    }
    if ctx.draft_email.is_none() {
        let recipient = ctx
            .decision_makers
            .iter()
            .max_by(|a, b| {
                a.relevance_score
                    .partial_cmp(&b.relevance_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .cloned();
        if let Some(recipient) = recipient {
            return NextAction::DraftEmail { recipient };
        }
    }
    if ctx.lead_score.is_none() {
        return NextAction::ScoreLead;
    }
    NextAction::Finish
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::{DraftEmail, LeadScore, SiteSummary, TechSignal};

    fn contact(name: &str, relevance: f64) -> DecisionMaker {
        DecisionMaker {
            name: name.to_string(),
            title: "VP Engineering".to_string(),
            company: "Acme".to_string(),
            seniority: "vp".to_string(),
            search_url: None,
            relevance_score: relevance,
        }
    }

    fn base_ctx() -> ResearchContext {
        ResearchContext::new("Acme", "acme.com", "VP Sales", 10)
    }

    #[test]
    fn follows_the_dependency_order() {
        let mut ctx = base_ctx();

        assert!(matches!(select_next(&ctx), NextAction::ScrapeSite { .. }));

        ctx.site_summary = Some(SiteSummary::default());
        assert!(matches!(
            select_next(&ctx),
            NextAction::FindDecisionMakers { .. }
        ));

        ctx.decision_makers = vec![contact("A", 0.9)];
        assert!(matches!(select_next(&ctx), NextAction::DetectTech { .. }));

        ctx.tech_signals = vec![TechSignal {
            technology: "Nginx".to_string(),
            category: "Web Server".to_string(),
            confidence: 0.9,
        }];
        assert_eq!(select_next(&ctx), NextAction::InferPain);

        ctx.pain_hypothesis = "scaling pains".to_string();
        assert!(matches!(select_next(&ctx), NextAction::DraftEmail { .. }));

        ctx.draft_email = Some(DraftEmail::default());
        assert_eq!(select_next(&ctx), NextAction::ScoreLead);

        ctx.lead_score = Some(LeadScore::default());
        assert_eq!(select_next(&ctx), NextAction::Finish);
    }

    #[test]
    fn an_error_tagged_scrape_still_counts_as_populated() {
        let mut ctx = base_ctx();
        ctx.site_summary = Some(SiteSummary::unreachable("connect refused"));

        assert!(matches!(
            select_next(&ctx),
            NextAction::FindDecisionMakers { .. }
        ));
    }

    #[test]
    fn email_addresses_the_highest_relevance_contact() {
        let mut ctx = base_ctx();
        ctx.site_summary = Some(SiteSummary::default());
        ctx.decision_makers = vec![contact("Low", 0.4), contact("High", 0.95), contact("Mid", 0.7)];
        ctx.tech_signals = vec![TechSignal {
            technology: "React".to_string(),
            category: "Frontend".to_string(),
            confidence: 0.85,
        }];
        ctx.pain_hypothesis = "pain".to_string();

        match select_next(&ctx) {
            NextAction::DraftEmail { recipient } => assert_eq!(recipient.name, "High"),
            other => panic!("expected DraftEmail, got {:?}", other),
        }
    }

    #[test]
    fn email_stays_blocked_without_decision_makers() {
        // Can only happen if a provider violates its fallback contract; the
        // selector then keeps retrying the contact search until the budget
        // runs out instead of drafting an email to nobody.
        let mut ctx = base_ctx();
        ctx.site_summary = Some(SiteSummary::default());
        ctx.tech_signals = vec![TechSignal {
            technology: "Vue.js".to_string(),
            category: "Frontend".to_string(),
            confidence: 0.8,
        }];
        ctx.pain_hypothesis = "pain".to_string();

        assert!(matches!(
            select_next(&ctx),
            NextAction::FindDecisionMakers { .. }
        ));
    }
}
