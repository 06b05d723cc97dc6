//! Request Context: per-request identity carried through the pipeline
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub trace_id: String,
    /// RPC operation name (ex: "GenerateBlueprint")
    pub method: String,
    pub received_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            method: method.into(),
            received_at: Utc::now(),
        }
    }

    /// Milliseconds since the request was received, never negative
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.received_at).num_milliseconds().max(0)
    }
}
