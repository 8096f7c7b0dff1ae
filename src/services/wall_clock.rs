use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// A calendar date with no time or offset attached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn to_naive(self) -> EngineResult<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            EngineError::invalid_wall_clock(format!(
                "no such date: {:04}-{:02}-{:02}",
                self.year, self.month, self.day
            ))
        })
    }

    pub fn weekday(self) -> EngineResult<Weekday> {
        Ok(self.to_naive()?.weekday())
    }

    /// Attach a wall-clock time of day to this date.
    pub fn at(self, hour: u32, minute: u32, second: u32) -> WallClockTime {
        WallClockTime {
            year: self.year,
            month: self.month,
            day: self.day,
            hour,
            minute,
            second,
        }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// What a user reads on a clock in some place: year through second, with no
/// embedded offset. Components are validated when the value is resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WallClockTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl WallClockTime {
    pub fn date(&self) -> CalendarDate {
        CalendarDate {
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }

    pub fn to_naive(&self) -> EngineResult<NaiveDateTime> {
        let date = self.date().to_naive()?;
        date.and_hms_opt(self.hour, self.minute, self.second)
            .ok_or_else(|| {
                EngineError::invalid_wall_clock(format!(
                    "no such time of day: {:02}:{:02}:{:02}",
                    self.hour, self.minute, self.second
                ))
            })
    }

    pub fn from_naive(naive: NaiveDateTime) -> Self {
        Self {
            year: naive.year(),
            month: naive.month(),
            day: naive.day(),
            hour: naive.hour(),
            minute: naive.minute(),
            second: naive.second(),
        }
    }
}

impl fmt::Display for WallClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Outcome of resolving a local wall time to an absolute instant. `exact`
/// is false when the wall time sits inside a DST "spring forward" gap and
/// the nearest valid instant was substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalResolution {
    pub instant: DateTime<Utc>,
    pub exact: bool,
}

/// Resolve an IANA timezone name against the bundled database.
pub fn lookup_timezone(name: &str) -> EngineResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| EngineError::unknown_timezone(name))
}

/// Project an absolute instant onto a timezone's wall clock. Total: every
/// instant has exactly one local reading.
pub fn to_wall_clock(instant: DateTime<Utc>, tz: Tz) -> WallClockTime {
    WallClockTime::from_naive(instant.with_timezone(&tz).naive_local())
}

// Candidate scan bounds. Real zones use :00, :30 and :45 offsets within
// UTC-12..UTC+14, so a 15-minute step over ±14h reaches every one of them
// in a fixed 113-candidate pass.
const SCAN_STEP_MINUTES: i64 = 15;
const SCAN_RANGE_MINUTES: i64 = 14 * 60;

/// Resolve a local wall-clock reading to an absolute instant.
///
/// The hard direction: near a "fall back" transition two instants share the
/// same local reading, and inside a "spring forward" gap none does. The
/// implementation treats the wall tuple as if it were UTC and scans a fixed
/// window of candidate offsets, projecting each candidate back through
/// [`to_wall_clock`] until the reading matches. The scan walks later
/// instants first, so an ambiguous reading resolves to the later instant;
/// a gapped reading resolves to the closest valid instant, ties again
/// preferring the later one.
pub fn resolve_local(wall: &WallClockTime, tz: Tz) -> EngineResult<LocalResolution> {
    let target = wall.to_naive()?;
    let base = target.and_utc();

    let mut nearest: Option<(DateTime<Utc>, i64)> = None;

    let mut offset = -SCAN_RANGE_MINUTES;
    while offset <= SCAN_RANGE_MINUTES {
        // Negative offsets yield candidates after `base`, so the scan moves
        // from the latest candidate toward the earliest.
        let candidate = base - Duration::minutes(offset);
        let projected = candidate.with_timezone(&tz).naive_local();

        if projected == target {
            return Ok(LocalResolution {
                instant: candidate,
                exact: true,
            });
        }

        let distance = (projected - target).num_seconds().abs();
        if nearest.map_or(true, |(_, best)| distance < best) {
            nearest = Some((candidate, distance));
        }

        offset += SCAN_STEP_MINUTES;
    }

    // No exact projection exists: the reading sits inside a transition gap.
    let (instant, distance) = nearest.ok_or_else(|| {
        EngineError::invalid_wall_clock(format!("unresolvable wall-clock time {wall}"))
    })?;

    debug!(
        target: "engine::tz",
        wall = %wall,
        timezone = %tz,
        adjusted_to = %instant,
        off_by_seconds = distance,
        "wall time falls in a DST gap, substituting nearest instant"
    );

    Ok(LocalResolution {
        instant,
        exact: false,
    })
}

/// Convenience wrapper over [`resolve_local`] when the caller does not care
/// whether a gap substitution happened.
pub fn to_instant(wall: &WallClockTime, tz: Tz) -> EngineResult<DateTime<Utc>> {
    resolve_local(wall, tz).map(|resolution| resolution.instant)
}

/// Absolute bounds of a local day window (default 06:00–22:00) on the given
/// date, built from the same resolution primitive as everything else.
pub fn day_bounds(
    date: CalendarDate,
    tz: Tz,
    start_hour: u32,
    end_hour: u32,
) -> EngineResult<(DateTime<Utc>, DateTime<Utc>)> {
    if start_hour >= end_hour || end_hour > 23 {
        return Err(EngineError::invalid_wall_clock(format!(
            "invalid day window {start_hour:02}:00-{end_hour:02}:00"
        )));
    }

    let start = to_instant(&date.at(start_hour, 0, 0), tz)?;
    let end = to_instant(&date.at(end_hour, 0, 0), tz)?;
    Ok((start, end))
}

/// Parse an assistant-emitted local timestamp, `YYYY-MM-DDTHH:mm` with
/// optional seconds and no timezone suffix.
pub fn parse_wall(value: &str) -> EngineResult<WallClockTime> {
    let trimmed = value.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(WallClockTime::from_naive(naive));
        }
    }
    Err(EngineError::invalid_wall_clock(format!(
        "unparseable local timestamp: {value:?}"
    )))
}
