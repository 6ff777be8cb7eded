//! Spam, virus and sender authentication verdicts attached to a receipt.
//!
//! The receiving service stores each verdict as an object with a `status`
//! string under the receipt. Status tokens are matched case-sensitively,
//! only the exact `PASS` token counts as a pass.

use std::fmt::Display;

/// The verdicts carried by a receipt notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Spam,
    Virus,
    Spf,
    Dkim,
    Dmarc,
}

impl Verdict {
    /// The sender authentication verdicts that make up the DNS check.
    pub const DNS: [Verdict; 3] = [Verdict::Spf, Verdict::Dkim, Verdict::Dmarc];

    /// Returns the receipt key under which this verdict is stored.
    pub fn key(&self) -> &'static str {
        match self {
            Verdict::Spam => "spamVerdict",
            Verdict::Virus => "virusVerdict",
            Verdict::Spf => "spfVerdict",
            Verdict::Dkim => "dkimVerdict",
            Verdict::Dmarc => "dmarcVerdict",
        }
    }
}

/// Status of a single verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerdictStatus {
    Pass,
    Fail,
    Gray,
    ProcessingFailed,
    Disabled,
    /// Any token outside the known set, kept verbatim.
    Other(String),
}

impl VerdictStatus {
    pub fn is_pass(&self) -> bool {
        matches!(self, VerdictStatus::Pass)
    }

    pub fn as_str(&self) -> &str {
        match self {
            VerdictStatus::Pass => "PASS",
            VerdictStatus::Fail => "FAIL",
            VerdictStatus::Gray => "GRAY",
            VerdictStatus::ProcessingFailed => "PROCESSING_FAILED",
            VerdictStatus::Disabled => "DISABLED",
            VerdictStatus::Other(value) => value,
        }
    }
}

impl From<&str> for VerdictStatus {
    fn from(value: &str) -> Self {
        match value {
            "PASS" => VerdictStatus::Pass,
            "FAIL" => VerdictStatus::Fail,
            "GRAY" => VerdictStatus::Gray,
            "PROCESSING_FAILED" => VerdictStatus::ProcessingFailed,
            "DISABLED" => VerdictStatus::Disabled,
            other => VerdictStatus::Other(other.to_string()),
        }
    }
}

impl Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
