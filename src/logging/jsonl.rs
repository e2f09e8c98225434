//! JSONL writer for detector transitions.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// Session event types for JSONL logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum SessionEvent {
    #[serde(rename = "session_start")]
    SessionStart {
        timestamp: DateTime<Utc>,
        version: String,
    },
    #[serde(rename = "session_end")]
    SessionEnd {
        timestamp: DateTime<Utc>,
        interactions: u64,
    },
    #[serde(rename = "went_idle")]
    WentIdle {
        timestamp: DateTime<Utc>,
        since: DateTime<Utc>,
        timeout_ms: u64,
    },
    #[serde(rename = "became_active")]
    BecameActive {
        timestamp: DateTime<Utc>,
        /// Seconds since the idle transition this activity ends, if any.
        idle_duration_seconds: Option<u64>,
    },
}

/// Daily-rotated JSONL logger for transitions.
pub struct JsonlLogger {
    logs_dir: PathBuf,
    current_file: Option<BufWriter<File>>,
    current_date: Option<String>,
    idle_start_time: Option<DateTime<Utc>>,
}

impl JsonlLogger {
    /// Create a new JSONL logger.
    pub fn new(logs_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&logs_dir)
            .with_context(|| format!("Failed to create logs directory: {:?}", logs_dir))?;

        Ok(Self {
            logs_dir,
            current_file: None,
            current_date: None,
            idle_start_time: None,
        })
    }

    /// Get or create the log file for today.
    fn get_writer(&mut self) -> Result<&mut BufWriter<File>> {
        let today = Local::now().format("%Y-%m-%d").to_string();

        // Check if we need to rotate to a new file
        if self.current_date.as_ref() != Some(&today) {
            let log_path = self.logs_dir.join(format!("{}.jsonl", today));

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .with_context(|| format!("Failed to open log file: {:?}", log_path))?;

            self.current_file = Some(BufWriter::new(file));
            self.current_date = Some(today);

            debug!("Opened log file: {:?}", log_path);
        }

        self.current_file
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("No log file available"))
    }

    /// Write a line to the JSONL log.
    fn write_line<T: Serialize>(&mut self, entry: &T) -> Result<()> {
        let line = serde_json::to_string(entry)?;
        let writer = self.get_writer()?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }

    /// Log session start event.
    pub fn log_session_start(&mut self, version: &str) -> Result<()> {
        let event = SessionEvent::SessionStart {
            timestamp: Utc::now(),
            version: version.to_string(),
        };
        info!("Session started");
        self.write_line(&event)
    }

    /// Log session end event.
    pub fn log_session_end(&mut self, interactions: u64) -> Result<()> {
        let event = SessionEvent::SessionEnd {
            timestamp: Utc::now(),
            interactions,
        };
        info!("Session ended, {} interactions observed", interactions);
        self.write_line(&event)
    }

    /// Log an idle transition.
    ///
    /// Repeated idle firings keep the first idle start.
    pub fn log_went_idle(&mut self, since: DateTime<Utc>, timeout_ms: u64) -> Result<()> {
        let now = Utc::now();
        self.idle_start_time.get_or_insert(now);
        let event = SessionEvent::WentIdle {
            timestamp: now,
            since,
            timeout_ms,
        };
        self.write_line(&event)
    }

    /// Log an activity transition, closing any open idle span.
    pub fn log_became_active(&mut self) -> Result<()> {
        let idle_duration_seconds = self
            .idle_start_time
            .take()
            .map(|start| (Utc::now() - start).num_seconds().max(0) as u64);

        let event = SessionEvent::BecameActive {
            timestamp: Utc::now(),
            idle_duration_seconds,
        };
        self.write_line(&event)
    }
}

impl Drop for JsonlLogger {
    fn drop(&mut self) {
        // Flush any remaining data
        if let Some(ref mut writer) = self.current_file {
            let _ = writer.flush();
        }
    }
}
