//! Leads table - persistence for finished research runs

use crate::agent::RunStatus;
use crate::db::Database;
use crate::models::LeadRecord;
use rusqlite::{params, Result as SqliteResult, Row};

impl Database {
    /// Insert a finished run and return its row id.
    pub fn insert_lead(&self, record: &LeadRecord) -> SqliteResult<i64> {
        let conn = self.conn.lock().unwrap();

        let site_summary = record
            .site_summary
            .as_ref()
            .and_then(|s| serde_json::to_string(s).ok());
        let decision_makers = serde_json::to_string(&record.decision_makers)
            .unwrap_or_else(|_| "[]".to_string());
        let tech_signals =
            serde_json::to_string(&record.tech_signals).unwrap_or_else(|_| "[]".to_string());
        let draft_email = record
            .draft_email
            .as_ref()
            .and_then(|e| serde_json::to_string(e).ok());
        let lead_score = record
            .lead_score
            .as_ref()
            .and_then(|s| serde_json::to_string(s).ok());
        let reasoning_trace =
            serde_json::to_string(&record.reasoning_trace).unwrap_or_else(|_| "[]".to_string());

        conn.execute(
            "INSERT INTO leads (
                company_name, company_domain, persona, site_summary,
                decision_makers, tech_signals, pain_hypothesis, draft_email,
                lead_score, reasoning_trace, steps_executed, run_status,
                status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                record.company_name,
                record.company_domain,
                record.persona,
                site_summary,
                decision_makers,
                tech_signals,
                record.pain_hypothesis,
                draft_email,
                lead_score,
                reasoning_trace,
                record.steps_executed,
                record.run_status.to_string(),
                record.status,
                record.created_at,
                record.updated_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Fetch a single lead by row id.
    pub fn get_lead(&self, id: i64) -> SqliteResult<Option<LeadRecord>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, company_name, company_domain, persona, site_summary,
                    decision_makers, tech_signals, pain_hypothesis, draft_email,
                    lead_score, reasoning_trace, steps_executed, run_status,
                    status, created_at, updated_at
             FROM leads WHERE id = ?",
        )?;

        let result = stmt.query_row(params![id], row_to_record);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// List stored leads, newest first.
    pub fn list_leads(&self, skip: i64, limit: i64) -> SqliteResult<Vec<LeadRecord>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, company_name, company_domain, persona, site_summary,
                    decision_makers, tech_signals, pain_hypothesis, draft_email,
                    lead_score, reasoning_trace, steps_executed, run_status,
                    status, created_at, updated_at
             FROM leads ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
        )?;

        let rows = stmt.query_map(params![limit, skip], row_to_record)?;
        rows.collect()
    }

    pub fn count_leads(&self) -> SqliteResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM leads", [], |row| row.get(0))
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<LeadRecord> {
    let site_summary: Option<String> = row.get(4)?;
    let decision_makers: String = row.get(5)?;
    let tech_signals: String = row.get(6)?;
    let draft_email: Option<String> = row.get(8)?;
    let lead_score: Option<String> = row.get(9)?;
    let reasoning_trace: String = row.get(10)?;
    let run_status: String = row.get(12)?;

    Ok(LeadRecord {
        id: Some(row.get(0)?),
        company_name: row.get(1)?,
        company_domain: row.get(2)?,
        persona: row.get(3)?,
        site_summary: site_summary.and_then(|s| serde_json::from_str(&s).ok()),
        decision_makers: serde_json::from_str(&decision_makers).unwrap_or_default(),
        tech_signals: serde_json::from_str(&tech_signals).unwrap_or_default(),
        pain_hypothesis: row.get(7)?,
        draft_email: draft_email.and_then(|s| serde_json::from_str(&s).ok()),
        lead_score: lead_score.and_then(|s| serde_json::from_str(&s).ok()),
        reasoning_trace: serde_json::from_str(&reasoning_trace).unwrap_or_default(),
        steps_executed: row.get(11)?,
        run_status: match run_status.as_str() {
            "complete" => RunStatus::Complete,
            "error" => RunStatus::Error,
            _ => RunStatus::Incomplete,
        },
        status: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}
