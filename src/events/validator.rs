use thiserror::Error;

use super::models::{RawOddsRecord, RawScorePeriod};

/// Raw status code the feed uses for in-play events.
pub const LIVE_STATUS_CODE: &str = "LIVE";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("live event has no score periods")]
    LiveWithoutScores,

    #[error("score period {0} is incomplete")]
    IncompleteScore(usize),
}

/// Check a raw record before label resolution.
pub fn validate(record: &RawOddsRecord) -> Result<(), ValidationError> {
    let required = [
        ("eventId", &record.event_id),
        ("sportCode", &record.sport_code),
        ("competitionCode", &record.competition_code),
        ("startTime", &record.start_time_ms),
        ("homeCode", &record.home_code),
        ("awayCode", &record.away_code),
        ("statusCode", &record.status_code),
    ];
    if let Some((name, _)) = required.iter().find(|(_, value)| is_blank(value)) {
        return Err(ValidationError::MissingField(*name));
    }

    if record.status_code == LIVE_STATUS_CODE && record.score_periods.is_empty() {
        return Err(ValidationError::LiveWithoutScores);
    }

    if let Some(index) = record
        .score_periods
        .iter()
        .position(|p| !is_complete_period(p))
    {
        return Err(ValidationError::IncompleteScore(index));
    }

    Ok(())
}

pub fn is_valid(record: &RawOddsRecord) -> bool {
    validate(record).is_ok()
}

fn is_complete_period(period: &RawScorePeriod) -> bool {
    !is_blank(&period.period_code) && !is_blank(&period.home_score) && !is_blank(&period.away_score)
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
