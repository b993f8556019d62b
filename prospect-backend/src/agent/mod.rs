pub mod orchestrator;
pub mod providers;
pub mod selector;
pub mod types;

pub use orchestrator::{infer_domain, AgentConfig, LeadResearchAgent};
pub use providers::{HttpFetcher, LiveProviders, PageFetcher, ResearchProviders};
pub use types::{
    AgentPhase, DecisionMaker, DraftEmail, LeadScore, ResearchContext, ResearchData,
    ResearchReport, RunStatus, SiteSummary, TechSignal,
};
