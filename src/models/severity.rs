//! Severity classification for incoming alerts.
//!
//! The classifier is a pure mapping from a raw severity label to an ordinal
//! rank and the display metadata used by the renderer. Lower ranks are more
//! urgent.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The urgency of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Immediate operator attention required.
    Critical,
    /// Degraded service, act soon.
    High,
    /// Noticeable but not urgent.
    Medium,
    /// Threshold crossed, worth a look.
    #[default]
    Warning,
    /// Informational only.
    Info,
}

/// Display metadata for a severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeverityInfo {
    /// Ordinal rank, `0` being the most urgent.
    pub rank: u8,
    /// Upper-case label used in subjects and headings.
    pub label: &'static str,
    /// Hex colour used by the HTML body.
    pub color: &'static str,
    /// Short marker prefixed to plain-text section headings.
    pub marker: &'static str,
}

impl Severity {
    /// All severities in rank order.
    pub const ALL: [Severity; 5] =
        [Severity::Critical, Severity::High, Severity::Medium, Severity::Warning, Severity::Info];

    /// Parses a raw label, case-insensitively. Returns `None` for labels that
    /// are not one of the known severities.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "warning" => Some(Severity::Warning),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }

    /// Classifies an optional raw label, falling back to `Warning` when the
    /// label is absent or unrecognized.
    pub fn classify(label: Option<&str>) -> Self {
        label.and_then(Self::parse).unwrap_or_default()
    }

    /// The ordinal rank of this severity.
    pub fn rank(self) -> u8 {
        self.info().rank
    }

    /// Display metadata for this severity.
    pub fn info(self) -> SeverityInfo {
        match self {
            Severity::Critical =>
                SeverityInfo { rank: 0, label: "CRITICAL", color: "#d32f2f", marker: "[!!!]" },
            Severity::High =>
                SeverityInfo { rank: 1, label: "HIGH", color: "#f57c00", marker: "[!!]" },
            Severity::Medium =>
                SeverityInfo { rank: 2, label: "MEDIUM", color: "#fbc02d", marker: "[!]" },
            Severity::Warning =>
                SeverityInfo { rank: 3, label: "WARNING", color: "#ffa000", marker: "[~]" },
            Severity::Info =>
                SeverityInfo { rank: 4, label: "INFO", color: "#1976d2", marker: "[i]" },
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().label)
    }
}
