use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::commitment::ClassCommitment;
use crate::models::interval::Interval;
use crate::services::wall_clock::{self, CalendarDate};

/// Sort occupied intervals by start and coalesce overlapping or adjacent
/// ones into a minimal disjoint set.
pub fn merge_intervals(occupied: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = occupied.to_vec();
    sorted.sort_by_key(|interval| (interval.start, interval.end));

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                if interval.end > last.end {
                    last.end = interval.end;
                }
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Compute candidate free slots of exactly `min_duration`, anchored at the
/// start of every gap between occupied intervals inside the window.
///
/// Output is sorted by start time and deterministic for identical inputs.
/// A gap wider than `min_duration` still yields a single slot at its start;
/// the remainder stays available for later queries. `min_duration` larger
/// than the window is an empty result, not an error.
pub fn find_free_slots(
    occupied: &[Interval],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    min_duration: Duration,
) -> Vec<Interval> {
    if window_end <= window_start || min_duration <= Duration::zero() {
        return Vec::new();
    }

    let merged = merge_intervals(occupied);
    let mut slots = Vec::new();
    let mut cursor = window_start;

    for interval in &merged {
        if interval.end <= cursor {
            continue;
        }
        let gap_end = interval.start.min(window_end);
        if gap_end - cursor >= min_duration {
            slots.push(Interval {
                start: cursor,
                end: cursor + min_duration,
            });
        }
        cursor = cursor.max(interval.end);
        if cursor >= window_end {
            break;
        }
    }

    if cursor < window_end && window_end - cursor >= min_duration {
        slots.push(Interval {
            start: cursor,
            end: cursor + min_duration,
        });
    }

    debug!(
        target: "engine::slots",
        occupied = occupied.len(),
        slots = slots.len(),
        "free slot scan complete"
    );

    slots
}

/// Project weekly class meetings onto concrete intervals for one calendar
/// date. Meetings on other weekdays are skipped; a meeting whose `HH:mm`
/// strings are malformed or inverted fails the projection, since commitment
/// data comes from the caller's store, not the assistant.
pub fn project_commitments(
    commitments: &[ClassCommitment],
    date: CalendarDate,
    tz: Tz,
) -> EngineResult<Vec<Interval>> {
    let weekday = date.weekday()?;
    let mut intervals = Vec::new();

    for commitment in commitments {
        for meeting in &commitment.meeting_times {
            if meeting.weekday != weekday {
                continue;
            }

            let start_time = parse_wall_hhmm(&commitment.course_name, &meeting.start_wall)?;
            let end_time = parse_wall_hhmm(&commitment.course_name, &meeting.end_wall)?;

            let start = wall_clock::to_instant(
                &date.at(start_time.0, start_time.1, 0),
                tz,
            )?;
            let end = wall_clock::to_instant(&date.at(end_time.0, end_time.1, 0), tz)?;

            let interval = Interval::new(start, end).ok_or_else(|| {
                EngineError::validation(format!(
                    "class '{}' meeting ends at or before it starts ({} - {})",
                    commitment.course_name, meeting.start_wall, meeting.end_wall
                ))
            })?;
            intervals.push(interval);
        }
    }

    Ok(intervals)
}

fn parse_wall_hhmm(course: &str, raw: &str) -> EngineResult<(u32, u32)> {
    let time = NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| {
        EngineError::validation(format!(
            "class '{course}' has an unparseable meeting time {raw:?}"
        ))
    })?;
    use chrono::Timelike;
    Ok((time.hour(), time.minute()))
}
