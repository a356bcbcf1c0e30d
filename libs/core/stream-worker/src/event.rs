//! A job together with its stream entry metadata

use crate::registry::StreamJob;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct StreamEvent<J: StreamJob> {
    /// Entry ID, e.g. "1700000000000-0"
    pub stream_id: String,

    pub job: J,

    /// Append time, taken from the millisecond part of the entry ID
    pub timestamp: DateTime<Utc>,
}

impl<J: StreamJob> StreamEvent<J> {
    pub fn new(stream_id: String, job: J) -> Self {
        let timestamp = parse_timestamp(&stream_id);
        Self {
            stream_id,
            job,
            timestamp,
        }
    }

    /// Milliseconds between append and now.
    pub fn age_ms(&self) -> i64 {
        (Utc::now() - self.timestamp).num_milliseconds()
    }
}

fn parse_timestamp(stream_id: &str) -> DateTime<Utc> {
    stream_id
        .split('-')
        .next()
        .and_then(|ts| ts.parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_else(Utc::now)
}
