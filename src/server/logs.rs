use crate::logging::LogEntry;
use crate::server::{AppError, AppState};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_LOG_LIMIT: usize = 100;

/// Filter over the recent-log buffer; every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    pub level: Option<String>,
    pub search_term: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl LogQuery {
    fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(level) = &self.level {
            if !entry.level.eq_ignore_ascii_case(level) {
                return false;
            }
        }
        if let Some(term) = &self.search_term {
            if !entry.message.contains(term.as_str()) && !entry.target.contains(term.as_str()) {
                return false;
            }
        }
        self.start_time.map_or(true, |start| entry.timestamp >= start)
            && self.end_time.map_or(true, |end| entry.timestamp <= end)
    }
}

#[derive(Debug, Serialize)]
pub struct LogQueryResponse {
    pub logs: Vec<LogEntry>,
}

/// Most recent matching entries first
pub async fn query_logs(
    State(state): State<Arc<AppState>>,
    Json(query): Json<LogQuery>,
) -> Result<Json<LogQueryResponse>, AppError> {
    let buffer = state.log_state.log_buffer.read().map_err(|_| {
        AppError::InternalError("log buffer lock poisoned".to_string())
    })?;

    let logs = buffer
        .iter()
        .rev()
        .filter(|entry| query.matches(entry))
        .take(query.limit.unwrap_or(DEFAULT_LOG_LIMIT))
        .cloned()
        .collect();

    Ok(Json(LogQueryResponse { logs }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: &str, target: &str, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level: level.to_string(),
            target: target.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(LogQuery::default().matches(&entry("INFO", "pcm", "hello")));
    }

    #[test]
    fn test_level_is_case_insensitive() {
        let query = LogQuery {
            level: Some("warn".to_string()),
            ..Default::default()
        };

        assert!(query.matches(&entry("WARN", "pcm", "x")));
        assert!(!query.matches(&entry("INFO", "pcm", "x")));
    }

    #[test]
    fn test_search_term_checks_message_and_target() {
        let query = LogQuery {
            search_term: Some("merge".to_string()),
            ..Default::default()
        };

        assert!(query.matches(&entry("INFO", "pcm::merge", "done")));
        assert!(query.matches(&entry("INFO", "pcm", "merged config")));
        assert!(!query.matches(&entry("INFO", "pcm", "started")));
    }

    #[test]
    fn test_time_range() {
        let e = entry("INFO", "pcm", "x");
        let later = LogQuery {
            start_time: Some(e.timestamp + chrono::Duration::seconds(1)),
            ..Default::default()
        };
        let earlier = LogQuery {
            end_time: Some(e.timestamp - chrono::Duration::seconds(1)),
            ..Default::default()
        };

        assert!(!later.matches(&e));
        assert!(!earlier.matches(&e));
    }
}
