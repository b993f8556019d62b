pub mod lead;

pub use lead::{LeadAnalysis, LeadListResponse, LeadRecord, LeadResponse, ResearchRequest};
