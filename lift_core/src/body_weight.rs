//! Body-weight log.
//!
//! Independent from the workout state machine. Entries are append-only; when
//! several entries fall on the same calendar day the latest one wins.

use crate::report::window_start;
use crate::{BodyWeightEntry, Error, Result, TrackerState};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Summary over every body-weight entry
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct BodyWeightStats {
    pub first_weight: f64,
    pub latest_weight: f64,
    pub lowest_weight: f64,
    pub highest_weight: f64,
    pub total_entries: usize,
    /// `latest_weight - first_weight`
    pub change: f64,
}

/// Calendar day of a timestamp in the user's local time zone
pub fn local_day(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// Append a measurement
pub fn log_body_weight(
    state: &mut TrackerState,
    weight: f64,
    now: DateTime<Utc>,
) -> Result<BodyWeightEntry> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(Error::validation(format!(
            "body weight must be a positive number, got {}",
            weight
        )));
    }

    let entry = BodyWeightEntry {
        id: Uuid::new_v4(),
        recorded_at: now,
        weight,
    };
    state.body_weights.push(entry.clone());
    tracing::info!("Logged body weight {}", weight);
    Ok(entry)
}

/// Latest entry recorded on the same local day as `now`
pub fn today_weight(state: &TrackerState, now: DateTime<Utc>) -> Option<&BodyWeightEntry> {
    let today = local_day(now);
    state
        .body_weights
        .iter()
        .filter(|e| local_day(e.recorded_at) == today)
        .max_by_key(|e| e.recorded_at)
}

/// Entries from the trailing `days`, newest first
pub fn recent_body_weights(
    state: &TrackerState,
    days: i64,
    now: DateTime<Utc>,
) -> Result<Vec<&BodyWeightEntry>> {
    let cutoff = window_start(now, days)?;
    let mut entries: Vec<_> = state
        .body_weights
        .iter()
        .filter(|e| e.recorded_at >= cutoff)
        .collect();
    entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    Ok(entries)
}

pub fn latest_body_weight(state: &TrackerState) -> Option<&BodyWeightEntry> {
    state.body_weights.iter().max_by_key(|e| e.recorded_at)
}

/// Single ascending scan over all entries; `None` when there are none
pub fn body_weight_stats(entries: &[BodyWeightEntry]) -> Option<BodyWeightStats> {
    let mut ordered: Vec<&BodyWeightEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.recorded_at);

    let (first, rest) = ordered.split_first()?;
    let mut stats = BodyWeightStats {
        first_weight: first.weight,
        latest_weight: first.weight,
        lowest_weight: first.weight,
        highest_weight: first.weight,
        total_entries: 1,
        change: 0.0,
    };

    for entry in rest {
        stats.latest_weight = entry.weight;
        stats.lowest_weight = stats.lowest_weight.min(entry.weight);
        stats.highest_weight = stats.highest_weight.max(entry.weight);
        stats.total_entries += 1;
    }
    stats.change = stats.latest_weight - stats.first_weight;

    Some(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    /// Midday local time, so small offsets stay on the same calendar day
    fn local_noon() -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(2024, 3, 14, 12, 0, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn entry(weight: f64, at: DateTime<Utc>) -> BodyWeightEntry {
        BodyWeightEntry {
            id: Uuid::new_v4(),
            recorded_at: at,
            weight,
        }
    }

    #[test]
    fn test_stats_over_chronological_entries() {
        let start = Utc::now() - Duration::days(10);
        let entries: Vec<_> = [150.0, 148.0, 152.0, 146.0]
            .iter()
            .enumerate()
            .map(|(i, w)| entry(*w, start + Duration::days(i as i64)))
            .collect();

        let stats = body_weight_stats(&entries).unwrap();
        assert_eq!(stats.first_weight, 150.0);
        assert_eq!(stats.latest_weight, 146.0);
        assert_eq!(stats.lowest_weight, 146.0);
        assert_eq!(stats.highest_weight, 152.0);
        assert_eq!(stats.change, -4.0);
        assert_eq!(stats.total_entries, 4);
    }

    #[test]
    fn test_stats_order_by_date_not_insertion() {
        let now = Utc::now();
        let entries = vec![entry(160.0, now), entry(170.0, now - Duration::days(3))];

        let stats = body_weight_stats(&entries).unwrap();
        assert_eq!(stats.first_weight, 170.0);
        assert_eq!(stats.latest_weight, 160.0);
        assert_eq!(stats.change, -10.0);
    }

    #[test]
    fn test_stats_empty() {
        assert!(body_weight_stats(&[]).is_none());
    }

    #[test]
    fn test_log_rejects_non_positive() {
        let mut state = TrackerState::default();
        for bad in [0.0, -150.0, f64::INFINITY] {
            let result = log_body_weight(&mut state, bad, Utc::now());
            assert!(matches!(result, Err(Error::Validation(_))));
        }
        assert!(state.body_weights.is_empty());
    }

    #[test]
    fn test_today_weight_takes_latest_entry_of_the_day() {
        let mut state = TrackerState::default();
        let now = local_noon();
        state.body_weights.push(entry(180.0, now - Duration::days(2)));
        log_body_weight(&mut state, 179.0, now - Duration::seconds(5)).unwrap();
        log_body_weight(&mut state, 178.5, now).unwrap();

        assert_eq!(today_weight(&state, now).unwrap().weight, 178.5);
    }

    #[test]
    fn test_today_weight_ignores_other_days() {
        let mut state = TrackerState::default();
        let now = local_noon();
        state.body_weights.push(entry(180.0, now - Duration::days(2)));

        assert!(today_weight(&state, now).is_none());
        assert_eq!(latest_body_weight(&state).unwrap().weight, 180.0);
    }

    #[test]
    fn test_recent_body_weights_window_newest_first() {
        let mut state = TrackerState::default();
        let now = Utc::now();
        state.body_weights.push(entry(185.0, now - Duration::days(40)));
        state.body_weights.push(entry(182.0, now - Duration::days(10)));
        state.body_weights.push(entry(181.0, now - Duration::days(1)));

        let recent = recent_body_weights(&state, 30, now).unwrap();
        let weights: Vec<_> = recent.iter().map(|e| e.weight).collect();
        assert_eq!(weights, vec![181.0, 182.0]);
    }

    #[test]
    fn test_recent_body_weights_rejects_bad_windows() {
        let mut state = TrackerState::default();
        let now = Utc::now();
        state.body_weights.push(entry(181.0, now));

        for days in [0, -7, 100_000_000, i64::MAX] {
            let result = recent_body_weights(&state, days, now);
            assert!(
                matches!(result, Err(Error::Validation(_))),
                "expected validation error for {} days",
                days
            );
        }
        assert_eq!(recent_body_weights(&state, 36_500, now).unwrap().len(), 1);
    }
}
