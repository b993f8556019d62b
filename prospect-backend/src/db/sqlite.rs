//! SQLite database - schema definition and connection management
//!
//! Table operations live in the tables/ subdirectory.

use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use std::sync::Mutex;

/// Main database wrapper with connection pooling via Mutex
pub struct Database {
    pub(crate) conn: Mutex<Connection>,
}

impl Database {
    /// Create a new database connection and initialize schema
    pub fn new(database_url: &str) -> SqliteResult<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }

        let conn = Connection::open(database_url)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init()?;
        Ok(db)
    }

    /// Initialize database tables
    fn init(&self) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();

        // Finished research runs. Context fields are stored as JSON columns;
        // run_status records how the loop ended, status is the sales
        // workflow tag.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS leads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company_name TEXT NOT NULL,
                company_domain TEXT NOT NULL,
                persona TEXT NOT NULL,
                site_summary TEXT,
                decision_makers TEXT NOT NULL DEFAULT '[]',
                tech_signals TEXT NOT NULL DEFAULT '[]',
                pain_hypothesis TEXT NOT NULL DEFAULT '',
                draft_email TEXT,
                lead_score TEXT,
                reasoning_trace TEXT NOT NULL DEFAULT '[]',
                steps_executed INTEGER NOT NULL DEFAULT 0,
                run_status TEXT NOT NULL DEFAULT 'incomplete',
                status TEXT NOT NULL DEFAULT 'new',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_leads_created ON leads(created_at DESC)",
            [],
        )?;

        Ok(())
    }
}
