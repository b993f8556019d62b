//! Lead endpoints - run research, list stored leads, fetch one
//!
//! The research handler always answers with a well-formed body: a missing
//! identity is a 400 with a structured error, an exhausted step budget is a
//! normal 200 with run_status "incomplete" (it is partial data, not a
//! failure).

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::agent::{LeadResearchAgent, LiveProviders, RunStatus};
use crate::models::{LeadListResponse, LeadRecord, LeadResponse, ResearchRequest};
use crate::AppState;

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    50
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/leads/research").route(web::post().to(research_lead)));
    cfg.service(web::resource("/api/leads").route(web::get().to(list_leads)));
    cfg.service(web::resource("/api/leads/{id}").route(web::get().to(get_lead)));
}

async fn research_lead(
    state: web::Data<AppState>,
    input: web::Json<ResearchRequest>,
) -> impl Responder {
    let input = input.into_inner();

    let providers = Arc::new(LiveProviders::new(
        state.completion.clone(),
        state.fetcher.clone(),
    ));
    let agent = LeadResearchAgent::new(providers, state.completion.clone(), state.config.agent());

    let report = agent
        .run(
            input.company_name.as_deref(),
            input.company_domain.as_deref(),
            &input.persona,
        )
        .await;

    if report.status == RunStatus::Error {
        let error = report
            .error
            .unwrap_or_else(|| "research run failed".to_string());
        return HttpResponse::BadRequest().json(ErrorResponse { error });
    }

    let mut record = LeadRecord::from_report(report);
    match state.db.insert_lead(&record) {
        Ok(id) => {
            record.id = Some(id);
            HttpResponse::Ok().json(LeadResponse::from_record(record))
        }
        Err(e) => {
            log::error!("Failed to persist lead: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to persist research result".to_string(),
            })
        }
    }
}

async fn list_leads(state: web::Data<AppState>, query: web::Query<ListQuery>) -> impl Responder {
    let skip = query.skip.max(0);
    let limit = query.limit.clamp(1, 200);

    let records = match state.db.list_leads(skip, limit) {
        Ok(records) => records,
        Err(e) => {
            log::error!("Failed to list leads: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Internal server error".to_string(),
            });
        }
    };
    let total = state.db.count_leads().unwrap_or(records.len() as i64);

    HttpResponse::Ok().json(LeadListResponse {
        leads: records.into_iter().map(LeadResponse::from_record).collect(),
        total,
    })
}

async fn get_lead(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id: i64 = match path.into_inner().parse() {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid lead id".to_string(),
            });
        }
    };

    match state.db.get_lead(id) {
        Ok(Some(record)) => HttpResponse::Ok().json(LeadResponse::from_record(record)),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Not found".to_string(),
        }),
        Err(e) => {
            log::error!("Failed to load lead {}: {}", id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Internal server error".to_string(),
            })
        }
    }
}
