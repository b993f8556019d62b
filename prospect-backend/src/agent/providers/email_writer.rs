//! Email writer - draft the outreach email for the chosen contact
//!
//! Asks the model for a structured draft; if the call or the parse fails the
//! provider synthesizes a minimal templated email from its inputs directly.

use crate::agent::types::{DecisionMaker, DraftEmail, TechSignal};
use crate::ai::{CompletionBackend, CompletionRequest};

pub async fn draft(
    completion: &dyn CompletionBackend,
    company: &str,
    description: &str,
    recipient: &DecisionMaker,
    tech_signals: &[TechSignal],
    pain_hypothesis: &str,
) -> DraftEmail {
    let tech_list = tech_signals
        .iter()
        .take(5)
        .map(|t| t.technology.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let prompt = format!(
        "Draft a short cold outreach email to {} ({}) at {}. \
         Company description: {}. Observed tech: {}. Pain hypothesis: {}. \
         Respond with JSON: {{\"subject\": \"...\", \"body\": \"...\", \
         \"personalization_notes\": [\"...\"], \"call_to_action\": \"...\"}}",
        recipient.name, recipient.title, company, description, tech_list, pain_hypothesis
    );

    match completion
        .complete(CompletionRequest::json(prompt, 768).with_temperature(0.7))
        .await
    {
        Ok(raw) => match parse_email(&raw) {
            Some(email) => email,
            None => {
                log::warn!("[EMAIL] Unparseable draft for {}, using template", company);
                template(company, recipient, pain_hypothesis)
            }
        },
        Err(e) => {
            log::warn!("[EMAIL] Completion failed for {}: {}", company, e);
            template(company, recipient, pain_hypothesis)
        }
    }
}

fn template(company: &str, recipient: &DecisionMaker, pain_hypothesis: &str) -> DraftEmail {
    let name = if recipient.name.is_empty() {
        "there"
    } else {
        recipient.name.as_str()
    };
    DraftEmail {
        subject: format!("Quick question about {}", company),
        body: format!("Hi {},\n\n{}\n\nWorth a chat?\n\nBest,", name, pain_hypothesis),
        personalization_notes: vec!["Growth observation".to_string()],
        call_to_action: "15-min call?".to_string(),
    }
}

fn parse_email(raw: &str) -> Option<DraftEmail> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let subject = value.get("subject")?.as_str()?.to_string();
    let body = value.get("body")?.as_str()?.to_string();

    // Models return the notes as a list, a single string, or an object;
    // coerce all three instead of discarding the draft.
    let personalization_notes = match value.get("personalization_notes") {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect(),
        Some(serde_json::Value::String(s)) => vec![s.clone()],
        Some(serde_json::Value::Object(map)) => map
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v.as_str().unwrap_or_default()))
            .collect(),
        _ => Vec::new(),
    };

    let call_to_action = value
        .get("call_to_action")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    Some(DraftEmail {
        subject,
        body,
        personalization_notes,
        call_to_action,
    })
}
