//! Decoder for the positional odds feed.
//!
//! The payload is newline-delimited; each line is one event:
//!
//! ```text
//! eventId,sportCode,competitionCode,startTimeMs,homeCode,awayCode,statusCode[,scores]
//! scores       := period-entry ("|" period-entry)*
//! period-entry := period "@" home ":" away
//! ```
//!
//! Rejections are per line: a bad line is logged and dropped and the rest of
//! the payload keeps decoding.

use thiserror::Error;
use tracing::{debug, warn};

use crate::events::models::{RawOddsRecord, RawScorePeriod};

/// Minimum number of non-empty fields on an event line.
pub const REQUIRED_FIELDS: usize = 7;

const SCORE_FIELD: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineRejection {
    #[error("empty line")]
    Empty,

    #[error("expected at least 7 fields, found {0}")]
    TooFewFields(usize),

    #[error("malformed score entry {index} '{entry}'")]
    MalformedScoreEntry { index: usize, entry: String },
}

/// Decode a whole feed payload, dropping rejected lines.
pub fn decode_feed(payload: &str) -> Vec<RawOddsRecord> {
    let mut records = Vec::new();
    let mut rejected = 0usize;

    for (line_no, line) in payload.split('\n').enumerate() {
        match decode_line(line) {
            Ok(record) => records.push(record),
            Err(LineRejection::Empty) => {
                warn!("Skipping empty odds line {}", line_no + 1);
            }
            Err(reason) => {
                rejected += 1;
                warn!("Rejected odds line {} '{}': {}", line_no + 1, line, reason);
            }
        }
    }

    debug!("Decoded {} odds records ({} rejected)", records.len(), rejected);
    records
}

/// Decode a single event line.
pub fn decode_line(line: &str) -> Result<RawOddsRecord, LineRejection> {
    if line.trim().is_empty() {
        return Err(LineRejection::Empty);
    }

    let fields = split_fields(line);
    if fields.len() < REQUIRED_FIELDS {
        return Err(LineRejection::TooFewFields(fields.len()));
    }

    let score_periods = match fields.get(SCORE_FIELD) {
        Some(block) => decode_score_block(block)?,
        None => Vec::new(),
    };

    Ok(RawOddsRecord {
        event_id: fields[0].to_string(),
        sport_code: fields[1].to_string(),
        competition_code: fields[2].to_string(),
        start_time_ms: fields[3].to_string(),
        home_code: fields[4].to_string(),
        away_code: fields[5].to_string(),
        status_code: fields[6].to_string(),
        score_periods,
    })
}

/// Comma-split, trim, and drop empty fields.
fn split_fields(line: &str) -> Vec<&str> {
    line.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect()
}

fn decode_score_block(block: &str) -> Result<Vec<RawScorePeriod>, LineRejection> {
    block
        .split('|')
        .enumerate()
        .map(|(index, entry)| {
            decode_period_entry(entry).ok_or_else(|| LineRejection::MalformedScoreEntry {
                index,
                entry: entry.to_string(),
            })
        })
        .collect()
}

/// `period@home:away`. Empty home/away text is kept; the validator rejects it.
fn decode_period_entry(entry: &str) -> Option<RawScorePeriod> {
    let (period, score) = entry.split_once('@')?;
    let (home, away) = score.split_once(':')?;
    if period.trim().is_empty() || score.contains('@') || away.contains(':') {
        return None;
    }

    Some(RawScorePeriod {
        period_code: period.trim().to_string(),
        home_score: home.trim().to_string(),
        away_score: away.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(code: &str, home: &str, away: &str) -> RawScorePeriod {
        RawScorePeriod {
            period_code: code.into(),
            home_score: home.into(),
            away_score: away.into(),
        }
    }

    #[test]
    fn test_decode_two_lines() {
        let records = decode_feed("1,2,3,4,5,6,7,8@1:2\n9,10,11,12,13,14,15");
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].event_id, "1");
        assert_eq!(records[0].status_code, "7");
        assert_eq!(records[0].score_periods, vec![period("8", "1", "2")]);

        assert_eq!(records[1].event_id, "9");
        assert_eq!(records[1].sport_code, "10");
        assert_eq!(records[1].competition_code, "11");
        assert_eq!(records[1].start_time_ms, "12");
        assert_eq!(records[1].home_code, "13");
        assert_eq!(records[1].away_code, "14");
        assert_eq!(records[1].status_code, "15");
        assert!(records[1].score_periods.is_empty());
    }

    #[test]
    fn test_fields_are_trimmed_and_empties_dropped() {
        let record = decode_line(" a , b,,c , 1709900432183 ,h, , a2 ,LIVE ").unwrap();
        assert_eq!(record.event_id, "a");
        assert_eq!(record.sport_code, "b");
        assert_eq!(record.competition_code, "c");
        assert_eq!(record.start_time_ms, "1709900432183");
        assert_eq!(record.home_code, "h");
        assert_eq!(record.away_code, "a2");
        assert_eq!(record.status_code, "LIVE");
    }

    #[test]
    fn test_short_line_dropped_rest_decodes() {
        let records = decode_feed("1,2,3,4,5,6\n9,10,11,12,13,14,15\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event_id, "9");
        assert_eq!(decode_line("1,2,3,4,5,6"), Err(LineRejection::TooFewFields(6)));
    }

    #[test]
    fn test_empty_payload_lines() {
        assert!(decode_feed("\n").is_empty());
        assert!(decode_feed("").is_empty());
        assert_eq!(decode_line("   "), Err(LineRejection::Empty));
    }

    #[test]
    fn test_multiple_score_periods() {
        let record = decode_line("e,s,c,1,h,a,st,p1@1:0|p2@2:3").unwrap();
        assert_eq!(
            record.score_periods,
            vec![period("p1", "1", "0"), period("p2", "2", "3")]
        );
    }

    #[test]
    fn test_malformed_score_block_rejects_only_that_line() {
        let records = decode_feed("1,2,3,4,5,6,7,8-1:2\n9,10,11,12,13,14,15");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event_id, "9");
    }

    #[test]
    fn test_malformed_score_entries() {
        for line in [
            "1,2,3,4,5,6,7,8@12",
            "1,2,3,4,5,6,7,8@1:2|",
            "1,2,3,4,5,6,7,@1:2",
            "1,2,3,4,5,6,7,8@1@2:3",
            "1,2,3,4,5,6,7,8@1:2:3",
        ] {
            assert!(
                matches!(decode_line(line), Err(LineRejection::MalformedScoreEntry { .. })),
                "expected rejection for {line}"
            );
        }
    }

    #[test]
    fn test_empty_score_side_is_kept_for_validator() {
        let record = decode_line("1,2,3,4,5,6,7,8@1:").unwrap();
        assert_eq!(record.score_periods, vec![period("8", "1", "")]);
    }

    #[test]
    fn test_fields_after_score_block_ignored() {
        let record = decode_line("1,2,3,4,5,6,7,8@1:2,extra").unwrap();
        assert_eq!(record.score_periods.len(), 1);
    }
}
