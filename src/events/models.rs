use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One decoded line of the odds feed. Every field is still a raw code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOddsRecord {
    pub event_id: String,
    pub sport_code: String,
    pub competition_code: String,
    /// Epoch milliseconds, as sent by the feed
    pub start_time_ms: String,
    pub home_code: String,
    pub away_code: String,
    pub status_code: String,
    pub score_periods: Vec<RawScorePeriod>,
}

/// A `period@home:away` entry of the score block. Scores are opaque text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawScorePeriod {
    pub period_code: String,
    pub home_score: String,
    pub away_score: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    Pre,
    Live,
    Removed,
}

impl EventStatus {
    /// Parse a resolved status label ("PRE" | "LIVE" | "REMOVED").
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "PRE" => Some(EventStatus::Pre),
            "LIVE" => Some(EventStatus::Live),
            "REMOVED" => Some(EventStatus::Removed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pre => "PRE",
            EventStatus::Live => "LIVE",
            EventStatus::Removed => "REMOVED",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompetitorRole {
    Home,
    Away,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Competitor {
    #[serde(rename = "type")]
    pub role: CompetitorRole,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Competitors {
    #[serde(rename = "HOME")]
    pub home: Competitor,
    #[serde(rename = "AWAY")]
    pub away: Competitor,
}

/// Score for one resolved period, e.g. `CURRENT` or `PERIOD_1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Score {
    #[serde(rename = "type")]
    pub period: String,
    pub home: String,
    pub away: String,
}

/// Resolved period label → score. Ordered so the wire output is stable.
pub type Scores = BTreeMap<String, Score>;

/// A label-resolved sporting event as held by the state store.
///
/// Invariant: `scores` is empty while `status` is `PRE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEvent {
    pub id: String,
    pub status: EventStatus,
    pub scores: Scores,
    #[serde(serialize_with = "serialize_millis")]
    pub start_time: DateTime<Utc>,
    pub sport: String,
    pub competitors: Competitors,
    pub competition: String,
}

fn serialize_millis<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}
