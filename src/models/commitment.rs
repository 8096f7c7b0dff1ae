use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// One weekly meeting of a class: a weekday plus local `HH:mm` wall times.
/// The engine projects meetings onto interval instances for a single target
/// date; it never expands the full recurrence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MeetingTime {
    #[serde(with = "weekday_code")]
    pub weekday: Weekday,
    pub start_wall: String,
    pub end_wall: String,
}

/// A recurring class commitment loaded from the caller's store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassCommitment {
    pub course_name: String,
    #[serde(default)]
    pub meeting_times: Vec<MeetingTime>,
}

/// Serde adapter using two-letter weekday codes (MO, TU, ...), matching the
/// wire form the surrounding application stores for class schedules.
mod weekday_code {
    use chrono::Weekday;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(weekday: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(to_code(*weekday))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let code = String::deserialize(deserializer)?;
        from_code(&code).ok_or_else(|| de::Error::custom(format!("invalid weekday: {code}")))
    }

    pub(super) fn to_code(weekday: Weekday) -> &'static str {
        match weekday {
            Weekday::Sun => "SU",
            Weekday::Mon => "MO",
            Weekday::Tue => "TU",
            Weekday::Wed => "WE",
            Weekday::Thu => "TH",
            Weekday::Fri => "FR",
            Weekday::Sat => "SA",
        }
    }

    pub(super) fn from_code(code: &str) -> Option<Weekday> {
        match code {
            "SU" => Some(Weekday::Sun),
            "MO" => Some(Weekday::Mon),
            "TU" => Some(Weekday::Tue),
            "WE" => Some(Weekday::Wed),
            "TH" => Some(Weekday::Thu),
            "FR" => Some(Weekday::Fri),
            "SA" => Some(Weekday::Sat),
            _ => None,
        }
    }
}

pub fn weekday_label(weekday: Weekday) -> &'static str {
    weekday_code::to_code(weekday)
}
