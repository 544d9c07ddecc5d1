use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use super::models::{
    CanonicalEvent, Competitor, CompetitorRole, Competitors, EventStatus, RawOddsRecord, Score,
    Scores,
};
use super::validator::validate;
use crate::feed::mappings::LabelMap;

/// Why a valid raw record could not be turned into a canonical event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("Mapping not found for {field} with key: {code}")]
    MissingMapping { field: &'static str, code: String },

    #[error("unknown status label '{0}'")]
    UnknownStatus(String),

    #[error("invalid start time '{0}'")]
    InvalidStartTime(String),
}

/// Build canonical events from decoded records. Invalid or unmappable
/// records are logged and skipped; output keeps input order.
pub fn transform(records: &[RawOddsRecord], labels: &LabelMap) -> Vec<CanonicalEvent> {
    records
        .iter()
        .filter_map(|record| {
            if let Err(reason) = validate(record) {
                warn!("Skipping invalid event {}: {}", record.event_id, reason);
                return None;
            }
            match transform_record(record, labels) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!("Skipping unmapped event {}: {}", record.event_id, e);
                    None
                }
            }
        })
        .collect()
}

/// Resolve one already-validated record.
pub fn transform_record(
    record: &RawOddsRecord,
    labels: &LabelMap,
) -> Result<CanonicalEvent, TransformError> {
    let status_label = resolve(labels, &record.status_code, "status")?;
    let status = EventStatus::from_label(status_label)
        .ok_or_else(|| TransformError::UnknownStatus(status_label.to_string()))?;
    let sport = resolve(labels, &record.sport_code, "sport")?;
    let competition = resolve(labels, &record.competition_code, "competition")?;
    let home = resolve(labels, &record.home_code, "homeCompetitor")?;
    let away = resolve(labels, &record.away_code, "awayCompetitor")?;

    let mut scores = Scores::new();
    if status != EventStatus::Pre {
        for period in &record.score_periods {
            let label = resolve(labels, &period.period_code, "period")?;
            scores.insert(
                label.to_string(),
                Score {
                    period: label.to_string(),
                    home: period.home_score.clone(),
                    away: period.away_score.clone(),
                },
            );
        }
    }

    Ok(CanonicalEvent {
        id: record.event_id.clone(),
        status,
        scores,
        start_time: parse_start_time(&record.start_time_ms)?,
        sport: sport.to_string(),
        competitors: Competitors {
            home: Competitor {
                role: CompetitorRole::Home,
                name: home.to_string(),
            },
            away: Competitor {
                role: CompetitorRole::Away,
                name: away.to_string(),
            },
        },
        competition: competition.to_string(),
    })
}

fn resolve<'a>(
    labels: &'a LabelMap,
    code: &str,
    field: &'static str,
) -> Result<&'a str, TransformError> {
    labels.get(code).ok_or_else(|| TransformError::MissingMapping {
        field,
        code: code.to_string(),
    })
}

fn parse_start_time(raw: &str) -> Result<DateTime<Utc>, TransformError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .ok_or_else(|| TransformError::InvalidStartTime(raw.to_string()))
}
