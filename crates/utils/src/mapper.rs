//! Flattening of a receipt notification into the downstream event shape.
//!
//! The mapping is a pure function, every output field is derived
//! independently from the [`InboundEvent`] and the first failing field
//! aborts the whole mapping.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{local_part, InboundEvent, TransformError, TransformResult, Verdict};

/// Processing time (in milliseconds) above which a delivery is delayed.
pub const DELAY_THRESHOLD_MILLIS: i64 = 1000;

/// The flattened representation handed to downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEvent {
    /// Spam verdict passed.
    pub spam: bool,

    /// Virus verdict passed.
    pub virus: bool,

    /// SPF, DKIM and DMARC verdicts all passed.
    pub dns: bool,

    /// English month name of the mail timestamp.
    pub mes: String,

    /// Processing took longer than [`DELAY_THRESHOLD_MILLIS`].
    pub retrasado: bool,

    /// Local part of the sender address.
    pub emisor: String,

    /// Local parts of the destination addresses, in order.
    pub receptor: Vec<String>,
}

/// Maps an [`InboundEvent`] into its [`OutboundEvent`] form.
pub fn map(event: &InboundEvent) -> TransformResult<OutboundEvent> {
    let spam_status = event.verdict_status(Verdict::Spam)?;
    let virus_status = event.verdict_status(Verdict::Virus)?;
    let spam = spam_status.is_pass();
    let virus = virus_status.is_pass();

    // every DNS verdict is read (and validated) before combining
    let dns_checks = Verdict::DNS
        .iter()
        .map(|verdict| event.verdict_status(*verdict).map(|status| status.is_pass()))
        .collect::<TransformResult<Vec<bool>>>()?;
    let dns = dns_checks.iter().all(|passed| *passed);

    let mes = month_name(event.timestamp()?)?;
    let retrasado = event.processing_time_millis()? > DELAY_THRESHOLD_MILLIS;
    let emisor = local_part(event.source()?)?.to_string();
    let receptor = event
        .destination()?
        .into_iter()
        .map(|address| local_part(address).map(str::to_string))
        .collect::<TransformResult<Vec<String>>>()?;

    debug!(
        event_source = %event.event_source,
        spam = %spam_status,
        virus = %virus_status,
        emisor = %emisor,
        recipients = receptor.len(),
        "Mapped receipt notification"
    );

    Ok(OutboundEvent {
        spam,
        virus,
        dns,
        mes,
        retrasado,
        emisor,
        receptor,
    })
}

/// Parses and maps a single raw record in one step.
pub fn transform_record(raw: &Value) -> TransformResult<OutboundEvent> {
    map(&InboundEvent::parse(raw)?)
}

/// Returns the full English month name of a timestamp, taken in UTC.
///
/// RFC 3339 is the format used by the mail service. ISO 8601 date-times
/// without an offset and plain dates are read as UTC, RFC 2822 is accepted
/// as a last fallback.
pub fn month_name(timestamp: &str) -> TransformResult<String> {
    let parsed = parse_timestamp(timestamp)
        .ok_or_else(|| TransformError::InvalidTimestamp(timestamp.to_string()))?;
    Ok(parsed.format("%B").to_string())
}

fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(timestamp, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|parsed| parsed.and_utc());
    }
    DateTime::parse_from_rfc2822(timestamp)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}
