//! Extraction over JSON listing APIs.
//!
//! The payload is expected to be a list of publication records, either at the
//! top level or wrapped in an object (`{"data": [...]}` and similar). Wrapped
//! payloads may carry other lists next to the records, so every array field
//! of the object is searched. A record
//! matches when its date field starts with the ISO date, so both
//! `"2025-10-07"` and `"2025-10-07T10:00:00Z"` match 2025-10-07.

use super::ExtractionStrategy;
use super::dates::DateStyle;
use super::html::resolve_link;
use crate::errors::ParseError;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

#[derive(Debug, Clone)]
pub struct JsonRecordsStrategy {
    label: String,
    endpoint: Url,
    base: Url,
    date_field: String,
    link_field: String,
}

impl JsonRecordsStrategy {
    /// `base` is the URL relative download links are joined to; it is usually
    /// the portal root rather than the API endpoint.
    pub fn new(label: &str, endpoint: Url, base: Url, date_field: &str, link_field: &str) -> Self {
        Self {
            label: label.to_string(),
            endpoint,
            base,
            date_field: date_field.to_string(),
            link_field: link_field.to_string(),
        }
    }

    fn record_link(&self, record: &Value, prefix: &str) -> Option<Url> {
        let published = record.get(&self.date_field)?.as_str()?;
        if !published.trim_start().starts_with(prefix) {
            return None;
        }
        let link = record.get(&self.link_field)?.as_str()?;
        resolve_link(&self.base, link)
    }
}

impl ExtractionStrategy for JsonRecordsStrategy {
    fn label(&self) -> &str {
        &self.label
    }

    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[instrument(level = "debug", skip_all, fields(strategy = %self.label, %date))]
    fn extract(&self, body: &str, date: NaiveDate) -> Result<Option<Url>, ParseError> {
        let payload: Value = serde_json::from_str(body)?;
        let records = records(&payload);
        if records.is_empty() {
            debug!("Payload holds no records");
            return Ok(None);
        }

        let prefix = DateStyle::Iso.render(date);
        let found = records.iter().find_map(|r| self.record_link(r, &prefix));
        if found.is_none() {
            debug!(records = records.len(), %prefix, "No record matched");
        }
        Ok(found)
    }
}

fn records(payload: &Value) -> Vec<&Value> {
    match payload {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map
            .values()
            .filter_map(Value::as_array)
            .flatten()
            .collect(),
        _ => Vec::new(),
    }
}
