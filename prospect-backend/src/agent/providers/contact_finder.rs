//! Decision-maker finder - ask the model for search targets, build candidates
//!
//! The completion proposes job-title/seniority pairs for the persona; each
//! becomes a candidate contact with a deterministically decreasing relevance
//! score and a constructed people-search link. Any failure collapses to a
//! single generic C-level contact.

use crate::agent::types::DecisionMaker;
use crate::ai::{CompletionBackend, CompletionRequest};

const MAX_SEARCHES: usize = 3;
const BASE_RELEVANCE: f64 = 0.9;
const RELEVANCE_STEP: f64 = 0.15;

pub async fn find(
    completion: &dyn CompletionBackend,
    company: &str,
    persona: &str,
) -> Vec<DecisionMaker> {
    let prompt = format!(
        "Given company '{}' and target buyer persona '{}', propose up to {} people searches \
         for likely decision makers. Respond with JSON: \
         {{\"searches\": [{{\"title\": \"...\", \"seniority\": \"...\"}}]}}",
        company, persona, MAX_SEARCHES
    );

    match completion.complete(CompletionRequest::json(prompt, 512)).await {
        Ok(raw) => match parse_searches(&raw) {
            Some(searches) if !searches.is_empty() => searches
                .into_iter()
                .take(MAX_SEARCHES)
                .enumerate()
                .map(|(i, (title, seniority))| candidate(company, i, title, seniority))
                .collect(),
            _ => {
                log::warn!("[CONTACTS] Unusable search proposal for {}, using fallback", company);
                vec![fallback_contact(company)]
            }
        },
        Err(e) => {
            log::warn!("[CONTACTS] Completion failed for {}: {}", company, e);
            vec![fallback_contact(company)]
        }
    }
}

fn candidate(company: &str, index: usize, title: String, seniority: String) -> DecisionMaker {
    let keywords = urlencoding::encode(&format!("{} {}", company, title)).into_owned();
    DecisionMaker {
        name: format!("Contact {}", index + 1),
        title,
        company: company.to_string(),
        seniority,
        search_url: Some(format!(
            "https://www.linkedin.com/search/results/people/?keywords={}",
            keywords
        )),
        relevance_score: BASE_RELEVANCE - (index as f64) * RELEVANCE_STEP,
    }
}

fn fallback_contact(company: &str) -> DecisionMaker {
    DecisionMaker {
        name: "CTO".to_string(),
        title: "Chief Technology Officer".to_string(),
        company: company.to_string(),
        seniority: "c-suite".to_string(),
        search_url: None,
        relevance_score: 0.95,
    }
}

/// Lenient parse of the expected `{"searches": [...]}` shape. Entries missing
/// a title get a generic one; anything structurally off returns None.
fn parse_searches(raw: &str) -> Option<Vec<(String, String)>> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let searches = value.get("searches")?.as_array()?;
    Some(
        searches
            .iter()
            .map(|s| {
                let title = s
                    .get("title")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Executive")
                    .to_string();
                let seniority = s
                    .get("seniority")
                    .and_then(|v| v.as_str())
                    .unwrap_or("senior")
                    .to_string();
                (title, seniority)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ProviderError;
    use async_trait::async_trait;

    struct FixedCompletion(Result<String, ProviderError>);

    #[async_trait]
    impl CompletionBackend for FixedCompletion {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, ProviderError> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn builds_candidates_with_decreasing_relevance() {
        let backend = FixedCompletion(Ok(r#"{"searches": [
            {"title": "VP of Sales", "seniority": "vp"},
            {"title": "Head of Revenue", "seniority": "director"},
            {"title": "CRO", "seniority": "c-suite"}
        ]}"#
            .to_string()));

        let contacts = find(&backend, "Acme", "VP Sales").await;

        assert_eq!(contacts.len(), 3);
        assert_eq!(contacts[0].title, "VP of Sales");
        assert!((contacts[0].relevance_score - 0.9).abs() < 1e-9);
        assert!((contacts[1].relevance_score - 0.75).abs() < 1e-9);
        assert!((contacts[2].relevance_score - 0.6).abs() < 1e-9);
        let url = contacts[0].search_url.as_deref().unwrap();
        assert!(url.contains("Acme%20VP%20of%20Sales"));
    }

    #[tokio::test]
    async fn completion_failure_yields_the_generic_fallback() {
        let backend = FixedCompletion(Err(ProviderError::Network("timeout".to_string())));

        let contacts = find(&backend, "Acme", "VP Sales").await;

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].name, "CTO");
        assert_eq!(contacts[0].seniority, "c-suite");
        assert!((contacts[0].relevance_score - 0.95).abs() < 1e-9);
    }

    #[tokio::test]
    async fn malformed_json_yields_the_generic_fallback() {
        let backend = FixedCompletion(Ok("sure! here are some searches:".to_string()));

        let contacts = find(&backend, "Acme", "VP Sales").await;

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].title, "Chief Technology Officer");
    }

    #[tokio::test]
    async fn missing_titles_get_generic_defaults() {
        let backend = FixedCompletion(Ok(r#"{"searches": [{}]}"#.to_string()));

        let contacts = find(&backend, "Acme", "VP Sales").await;

        assert_eq!(contacts[0].title, "Executive");
        assert_eq!(contacts[0].seniority, "senior");
    }
}
