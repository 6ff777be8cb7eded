//! Typed view over a raw receipt notification record.
//!
//! A notification body carries a `Records` array, each record nesting the
//! `receipt` and `mail` objects under an `ses` key. [`InboundEvent`]
//! flattens that one level and offers path-aware accessors so that a
//! missing or mistyped key surfaces as a [`TransformError`] naming the
//! exact location, never as a silent default.

use serde_json::{Map, Value};
use tracing::warn;

use crate::{TransformError, TransformResult, Verdict, VerdictStatus};

const RECEIPT_PATH: &str = "ses.receipt";
const MAIL_PATH: &str = "ses.mail";

/// A single receipt notification record.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub event_version: String,
    pub event_source: String,

    /// Receipt object, holding the verdicts and processing time.
    pub receipt: Map<String, Value>,

    /// Mail object, holding the timestamp, source and destination.
    pub mail: Map<String, Value>,
}

impl InboundEvent {
    /// Builds an [`InboundEvent`] from a raw record.
    ///
    /// Only the top-level keys and the `ses.receipt`/`ses.mail` objects are
    /// checked here, the content of those objects is validated lazily by
    /// the accessors used during mapping.
    pub fn parse(raw: &Value) -> TransformResult<Self> {
        let record = raw
            .as_object()
            .ok_or_else(|| TransformError::invalid("record", "object"))?;
        let event_version = string_field(record, "", "eventVersion")?.to_string();
        let event_source = string_field(record, "", "eventSource")?.to_string();
        let ses = object_field(record, "", "ses")?;
        let receipt = object_field(ses, "ses", "receipt")?.clone();
        let mail = object_field(ses, "ses", "mail")?.clone();
        Ok(Self {
            event_version,
            event_source,
            receipt,
            mail,
        })
    }

    /// Returns the status of the given verdict from the receipt.
    pub fn verdict_status(&self, verdict: Verdict) -> TransformResult<VerdictStatus> {
        let object = object_field(&self.receipt, RECEIPT_PATH, verdict.key())?;
        let path = join(RECEIPT_PATH, verdict.key());
        let status = string_field(object, &path, "status")?;
        Ok(VerdictStatus::from(status))
    }

    pub fn processing_time_millis(&self) -> TransformResult<i64> {
        field(&self.receipt, RECEIPT_PATH, "processingTimeMillis")?
            .as_i64()
            .ok_or_else(|| {
                TransformError::invalid(join(RECEIPT_PATH, "processingTimeMillis"), "integer")
            })
    }

    pub fn timestamp(&self) -> TransformResult<&str> {
        string_field(&self.mail, MAIL_PATH, "timestamp")
    }

    pub fn source(&self) -> TransformResult<&str> {
        string_field(&self.mail, MAIL_PATH, "source")
    }

    /// Returns the destination addresses in their original order.
    pub fn destination(&self) -> TransformResult<Vec<&str>> {
        let path = join(MAIL_PATH, "destination");
        field(&self.mail, MAIL_PATH, "destination")?
            .as_array()
            .ok_or_else(|| TransformError::invalid(path.as_str(), "array"))?
            .iter()
            .enumerate()
            .map(|(index, value)| {
                value
                    .as_str()
                    .ok_or_else(|| TransformError::invalid(format!("{path}[{index}]"), "string"))
            })
            .collect()
    }
}

impl TryFrom<&Value> for InboundEvent {
    type Error = TransformError;

    fn try_from(raw: &Value) -> TransformResult<Self> {
        Self::parse(raw)
    }
}

/// Returns the first record of a notification body (`Records[0]`).
///
/// Additional records are not transformed, their presence is logged.
pub fn first_record(body: &Value) -> TransformResult<&Value> {
    let records = body
        .get("Records")
        .ok_or_else(|| TransformError::MissingField("Records".to_string()))?
        .as_array()
        .ok_or_else(|| TransformError::invalid("Records", "array"))?;
    let (first, rest) = records
        .split_first()
        .ok_or(TransformError::EmptyRecords)?;
    if !rest.is_empty() {
        warn!(
            ignored = rest.len(),
            "Notification carries more than one record, only the first is transformed"
        );
    }
    Ok(first)
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn field<'a>(
    map: &'a Map<String, Value>,
    parent: &str,
    key: &str,
) -> TransformResult<&'a Value> {
    map.get(key)
        .ok_or_else(|| TransformError::MissingField(join(parent, key)))
}

fn object_field<'a>(
    map: &'a Map<String, Value>,
    parent: &str,
    key: &str,
) -> TransformResult<&'a Map<String, Value>> {
    field(map, parent, key)?
        .as_object()
        .ok_or_else(|| TransformError::invalid(join(parent, key), "object"))
}

fn string_field<'a>(
    map: &'a Map<String, Value>,
    parent: &str,
    key: &str,
) -> TransformResult<&'a str> {
    field(map, parent, key)?
        .as_str()
        .ok_or_else(|| TransformError::invalid(join(parent, key), "string"))
}

/// Sample receipt record shaped like the ones delivered by the mail service.
#[cfg(test)]
pub(crate) fn sample_record() -> Value {
    serde_json::json!({
        "eventVersion": "1.0",
        "eventSource": "aws:ses",
        "ses": {
            "receipt": {
                "timestamp": "2024-03-15T10:00:00.000Z",
                "processingTimeMillis": 574,
                "recipients": ["a@x.com", "b@y.com"],
                "spamVerdict": { "status": "PASS" },
                "virusVerdict": { "status": "PASS" },
                "spfVerdict": { "status": "PASS" },
                "dkimVerdict": { "status": "PASS" },
                "dmarcVerdict": { "status": "PASS" },
                "action": { "type": "Lambda", "invocationType": "Event" }
            },
            "mail": {
                "timestamp": "2024-03-15T10:00:00.000Z",
                "source": "john.doe@example.com",
                "messageId": "o3vrnil0e2ic28tr",
                "destination": ["a@x.com", "b@y.com"],
                "headersTruncated": false
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_flattens_ses() {
        let event = InboundEvent::parse(&sample_record()).unwrap();
        assert_eq!(event.event_version, "1.0");
        assert_eq!(event.event_source, "aws:ses");
        assert_eq!(event.receipt["processingTimeMillis"], json!(574));
        assert_eq!(event.mail["source"], json!("john.doe@example.com"));
    }

    #[test]
    fn test_try_from() {
        let record = sample_record();
        let event = InboundEvent::try_from(&record).unwrap();
        assert_eq!(event, InboundEvent::parse(&record).unwrap());
    }

    #[test]
    fn test_parse_missing_top_level() {
        for key in ["eventVersion", "eventSource", "ses"] {
            let mut record = sample_record();
            record.as_object_mut().unwrap().remove(key);
            assert_eq!(
                InboundEvent::parse(&record),
                Err(TransformError::MissingField(key.to_string()))
            );
        }
    }

    #[test]
    fn test_parse_missing_ses_nested() {
        for key in ["receipt", "mail"] {
            let mut record = sample_record();
            record["ses"].as_object_mut().unwrap().remove(key);
            assert_eq!(
                InboundEvent::parse(&record),
                Err(TransformError::MissingField(format!("ses.{key}")))
            );
        }
    }

    #[test]
    fn test_parse_defers_verdict_validation() {
        let mut record = sample_record();
        record["ses"]["receipt"]
            .as_object_mut()
            .unwrap()
            .remove("spamVerdict");
        let event = InboundEvent::parse(&record).unwrap();
        assert_eq!(
            event.verdict_status(Verdict::Spam),
            Err(TransformError::MissingField(
                "ses.receipt.spamVerdict".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_not_an_object() {
        assert_eq!(
            InboundEvent::parse(&json!([1, 2, 3])),
            Err(TransformError::invalid("record", "object"))
        );
        let mut record = sample_record();
        record["ses"] = json!("nope");
        assert_eq!(
            InboundEvent::parse(&record),
            Err(TransformError::invalid("ses", "object"))
        );
    }

    #[test]
    fn test_verdict_status() {
        let mut record = sample_record();
        record["ses"]["receipt"]["virusVerdict"]["status"] = json!("FAIL");
        let event = InboundEvent::parse(&record).unwrap();
        assert_eq!(event.verdict_status(Verdict::Spam), Ok(VerdictStatus::Pass));
        assert_eq!(event.verdict_status(Verdict::Virus), Ok(VerdictStatus::Fail));
    }

    #[test]
    fn test_verdict_missing_status() {
        let mut record = sample_record();
        record["ses"]["receipt"]["dkimVerdict"] = json!({});
        let event = InboundEvent::parse(&record).unwrap();
        assert_eq!(
            event.verdict_status(Verdict::Dkim),
            Err(TransformError::MissingField(
                "ses.receipt.dkimVerdict.status".to_string()
            ))
        );
    }

    #[test]
    fn test_verdict_status_wrong_type() {
        let mut record = sample_record();
        record["ses"]["receipt"]["spfVerdict"]["status"] = json!(1);
        let event = InboundEvent::parse(&record).unwrap();
        assert_eq!(
            event.verdict_status(Verdict::Spf),
            Err(TransformError::invalid(
                "ses.receipt.spfVerdict.status",
                "string"
            ))
        );
    }

    #[test]
    fn test_processing_time_millis() {
        let event = InboundEvent::parse(&sample_record()).unwrap();
        assert_eq!(event.processing_time_millis(), Ok(574));

        let mut record = sample_record();
        record["ses"]["receipt"]["processingTimeMillis"] = json!("574");
        let event = InboundEvent::parse(&record).unwrap();
        assert_eq!(
            event.processing_time_millis(),
            Err(TransformError::invalid(
                "ses.receipt.processingTimeMillis",
                "integer"
            ))
        );
    }

    #[test]
    fn test_destination() {
        let event = InboundEvent::parse(&sample_record()).unwrap();
        assert_eq!(event.destination().unwrap(), vec!["a@x.com", "b@y.com"]);
    }

    #[test]
    fn test_destination_wrong_types() {
        let mut record = sample_record();
        record["ses"]["mail"]["destination"] = json!("a@x.com");
        let event = InboundEvent::parse(&record).unwrap();
        assert_eq!(
            event.destination(),
            Err(TransformError::invalid("ses.mail.destination", "array"))
        );

        let mut record = sample_record();
        record["ses"]["mail"]["destination"] = json!(["a@x.com", 7]);
        let event = InboundEvent::parse(&record).unwrap();
        assert_eq!(
            event.destination(),
            Err(TransformError::invalid("ses.mail.destination[1]", "string"))
        );
    }

    #[test]
    fn test_mail_missing_fields() {
        let mut record = sample_record();
        let mail = record["ses"]["mail"].as_object_mut().unwrap();
        mail.remove("timestamp");
        mail.remove("source");
        let event = InboundEvent::parse(&record).unwrap();
        assert_eq!(
            event.timestamp(),
            Err(TransformError::MissingField("ses.mail.timestamp".to_string()))
        );
        assert_eq!(
            event.source(),
            Err(TransformError::MissingField("ses.mail.source".to_string()))
        );
    }

    #[test]
    fn test_first_record() {
        let record = sample_record();
        let body = json!({ "Records": [record.clone()] });
        assert_eq!(first_record(&body), Ok(&record));
    }

    #[test]
    fn test_first_record_ignores_rest() {
        let body = json!({ "Records": [{ "n": 1 }, { "n": 2 }, { "n": 3 }] });
        assert_eq!(first_record(&body), Ok(&json!({ "n": 1 })));
    }

    #[test]
    fn test_first_record_errors() {
        assert_eq!(
            first_record(&json!({ "Records": [] })),
            Err(TransformError::EmptyRecords)
        );
        assert_eq!(
            first_record(&json!({})),
            Err(TransformError::MissingField("Records".to_string()))
        );
        assert_eq!(
            first_record(&json!({ "Records": {} })),
            Err(TransformError::invalid("Records", "array"))
        );
        assert_eq!(
            first_record(&json!("Records")),
            Err(TransformError::MissingField("Records".to_string()))
        );
    }
}
