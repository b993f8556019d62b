//! Research Test Fixture
//!
//! A minimal harness for running one live research loop without booting the
//! full server.
//!
//! Usage:
//!   TEST_COMPANY="Acme Corp" \
//!   TEST_PERSONA="VP of Sales at a B2B SaaS company" \
//!   OPENAI_API_KEY="your-api-key" \
//!   cargo run --bin research_test

use std::env;
use std::sync::Arc;
use std::time::Duration;

use prospect_backend::agent::{
    AgentConfig, HttpFetcher, LeadResearchAgent, LiveProviders, PageFetcher,
};
use prospect_backend::ai::{CompletionBackend, OpenAIClient};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    println!("🔎 Research Test Fixture");
    println!("========================\n");

    let company = env::var("TEST_COMPANY").ok();
    let domain = env::var("TEST_DOMAIN").ok();
    let persona = env::var("TEST_PERSONA").unwrap_or_else(|_| {
        eprintln!("⚠️  TEST_PERSONA not set. Using default.");
        "VP of Sales at a B2B SaaS company".to_string()
    });

    if company.is_none() && domain.is_none() {
        eprintln!("❌ Set TEST_COMPANY and/or TEST_DOMAIN");
        std::process::exit(1);
    }

    let api_key = env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
        eprintln!("❌ OPENAI_API_KEY not set!");
        std::process::exit(1);
    });
    let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

    println!("📝 Configuration:");
    println!("   Company: {:?}", company);
    println!("   Domain:  {:?}", domain);
    println!("   Persona: {}", persona);
    println!("   Model:   {}\n", model);

    let completion: Arc<dyn CompletionBackend> = Arc::new(
        OpenAIClient::new(&api_key, &model).expect("Failed to create OpenAI client"),
    );
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new());
    let providers = Arc::new(LiveProviders::new(completion.clone(), fetcher));

    let agent = LeadResearchAgent::new(
        providers,
        completion,
        AgentConfig {
            step_budget: 10,
            step_delay: Duration::from_millis(500),
        },
    );

    let report = agent
        .run(company.as_deref(), domain.as_deref(), &persona)
        .await;

    println!("\n==========================================================");
    println!("Run finished: {} ({} steps)", report.status, report.steps_executed);
    println!("==========================================================\n");

    println!("Reasoning trace:");
    for (i, note) in report.reasoning_trace.iter().enumerate() {
        println!("  {}. {}", i + 1, note);
    }

    match serde_json::to_string_pretty(&report.data) {
        Ok(pretty) => println!("\nData:\n{}", pretty),
        Err(e) => println!("\nFailed to render data: {}", e),
    }

    if let Some(error) = report.error {
        println!("\n❌ Error: {}", error);
        std::process::exit(1);
    }
}
