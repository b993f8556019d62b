//! Lead scorer - turn the accumulated context into a reply-probability score
//!
//! Failure of the scoring call is absorbed into neutral defaults so a dead
//! model never blocks the run from finishing.

use crate::agent::types::{DraftEmail, LeadScore, TechSignal};
use crate::ai::{CompletionBackend, CompletionRequest};
use std::collections::BTreeMap;

pub async fn score(
    completion: &dyn CompletionBackend,
    company: &str,
    persona: &str,
    tech_signals: &[TechSignal],
    email: &DraftEmail,
) -> LeadScore {
    let tech_list = tech_signals
        .iter()
        .map(|t| t.technology.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let prompt = format!(
        "Score this outbound lead. Company: {}. Target persona: {}. Observed tech: {}. \
         Draft email subject: {}. Respond with JSON: \
         {{\"reply_probability\": 0.0-1.0, \"quality_score\": 0-100, \
         \"reasoning\": \"...\", \"factors\": {{\"name\": 0.0-1.0}}}}",
        company, persona, tech_list, email.subject
    );

    match completion
        .complete(CompletionRequest::json(prompt, 512).with_temperature(0.3))
        .await
    {
        Ok(raw) => match parse_score(&raw) {
            Some(score) => score,
            None => {
                log::warn!("[SCORER] Unparseable score for {}, using neutral defaults", company);
                neutral()
            }
        },
        Err(e) => {
            log::warn!("[SCORER] Completion failed for {}: {}", company, e);
            neutral()
        }
    }
}

fn neutral() -> LeadScore {
    LeadScore {
        reply_probability: 0.5,
        quality_score: 50.0,
        reasoning: "Default".to_string(),
        factors: BTreeMap::new(),
    }
}

fn parse_score(raw: &str) -> Option<LeadScore> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let reply_probability = value.get("reply_probability")?.as_f64()?.clamp(0.0, 1.0);
    let quality_score = value.get("quality_score")?.as_f64()?.clamp(0.0, 100.0);
    let reasoning = value
        .get("reasoning")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let factors = value
        .get("factors")
        .and_then(|v| v.as_object())
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_f64().map(|f| (k.clone(), f.clamp(0.0, 1.0))))
                .collect()
        })
        .unwrap_or_default();

    Some(LeadScore {
        reply_probability,
        quality_score,
        reasoning,
        factors,
    })
}
