//! Turns raw Date/Time slot values into one absolute instant.
//!
//! The host platform delivers dates as free text (usually already
//! normalized to ISO form) and times either as `HH:MM` or as day-part
//! codes (`MO`/`AF`/`EV`/`NI`). Both are combined into a single epoch
//! timestamp interpreted in the server's local clock; the weather fetch
//! applies the location-timezone correction downstream.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use tracing::warn;

use crate::context::SlotName;
use crate::error::ValidationError;

/// The Date slot value the validator writes when the user gave no date.
pub const DATE_NOW: &str = "now";

pub(crate) const INVALID_DATE_MESSAGE: &str =
    "I did not understand date. Could you please enter it again?";

/// One absolute point in time, derived once per turn and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedInstant {
    /// Epoch seconds.
    pub timestamp: i64,
    /// No Date slot was given; the instant is "now".
    pub implicit_now: bool,
    /// A Time slot was given.
    pub explicit_time_of_day: bool,
}

/// Resolve Date/Time slots against the given current instant.
///
/// Known ambiguity, kept on purpose: with no Date but an explicit
/// time-of-day, the instant anchors to the *server's* current date, which
/// may not match the caller's calendar across midnight in far time zones.
pub fn resolve(
    date_slot: Option<&str>,
    time_slot: Option<&str>,
    now: DateTime<Local>,
) -> Result<ResolvedInstant, ValidationError> {
    let implicit_now = match date_slot {
        None => true,
        Some(date) => date.is_empty() || date == DATE_NOW,
    };
    let explicit_time_of_day = time_slot.is_some();

    if implicit_now && time_slot.is_none() {
        return Ok(ResolvedInstant {
            timestamp: now.timestamp(),
            implicit_now: true,
            explicit_time_of_day: false,
        });
    }

    let date = if implicit_now {
        now.date_naive()
    } else {
        // `implicit_now` is false, so the slot is present and non-empty.
        parse_date(date_slot.unwrap_or_default(), now.date_naive())?
    };

    let time = match time_slot {
        Some(raw) => time_of_day(raw).unwrap_or_else(|| {
            warn!("unrecognized time slot {raw:?}, defaulting to noon");
            noon()
        }),
        // No time-of-day given: anchor day-level queries to noon so the
        // encompassing day's aggregate is well-defined.
        None => noon(),
    };

    Ok(ResolvedInstant {
        timestamp: local_timestamp(NaiveDateTime::new(date, time)),
        implicit_now,
        explicit_time_of_day,
    })
}

/// Whether the Date slot value would resolve. Used by the dialogue
/// validator before fulfillment is attempted.
pub fn is_valid_date(date: &str, today: NaiveDate) -> bool {
    parse_date(date, today).is_ok()
}

fn parse_date(date: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    match date.trim() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Ok(parsed);
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S") {
        return Ok(parsed.date());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Ok(parsed.date_naive());
    }

    Err(ValidationError::new(SlotName::Date, INVALID_DATE_MESSAGE))
}

/// Map a raw Time slot value to a time of day.
///
/// The upstream slot-filling engine sometimes prefixes day-part codes with
/// a stray `"HIS "` token ("HIS EV" for "this evening"). The cause is
/// external and unfixable here, so exactly one such prefix is stripped
/// before matching.
fn time_of_day(raw: &str) -> Option<NaiveTime> {
    let code = raw.strip_prefix("HIS ").unwrap_or(raw);

    let canonical = match code {
        "MO" => Some((9, 0)),
        "AF" => Some((14, 0)),
        "EV" => Some((19, 0)),
        "NI" => Some((23, 0)),
        _ => None,
    };
    if let Some((hour, minute)) = canonical {
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    NaiveTime::parse_from_str(code, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(code, "%H:%M:%S"))
        .ok()
}

fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()
}

fn local_timestamp(naive: NaiveDateTime) -> i64 {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
        // DST gap: fall back to treating the wall time as UTC.
        .unwrap_or_else(|| naive.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2017, 6, 10, 15, 30, 0)
            .earliest()
            .expect("fixed test instant exists")
    }

    fn expected(date: (i32, u32, u32), time: (u32, u32)) -> i64 {
        Local
            .with_ymd_and_hms(date.0, date.1, date.2, time.0, time.1, 0)
            .earliest()
            .expect("fixed test instant exists")
            .timestamp()
    }

    #[test]
    fn no_slots_means_the_current_instant() {
        let instant = resolve(None, None, now()).expect("resolves");

        assert_eq!(instant.timestamp, now().timestamp());
        assert!(instant.implicit_now);
        assert!(!instant.explicit_time_of_day);
    }

    #[test]
    fn now_token_means_the_current_instant() {
        let instant = resolve(Some("now"), None, now()).expect("resolves");

        assert_eq!(instant.timestamp, now().timestamp());
        assert!(instant.implicit_now);
    }

    #[test]
    fn explicit_date_defaults_to_noon() {
        let instant = resolve(Some("2017-06-11"), None, now()).expect("resolves");

        assert_eq!(instant.timestamp, expected((2017, 6, 11), (12, 0)));
        assert!(!instant.implicit_now);
        assert!(!instant.explicit_time_of_day);
    }

    #[test]
    fn evening_code_maps_to_seven_pm() {
        let instant = resolve(Some("2017-06-11"), Some("EV"), now()).expect("resolves");

        assert_eq!(instant.timestamp, expected((2017, 6, 11), (19, 0)));
        assert!(instant.explicit_time_of_day);
    }

    #[test]
    fn day_part_codes_map_to_canonical_times() {
        for (code, hour) in [("MO", 9), ("AF", 14), ("NI", 23)] {
            let instant = resolve(Some("2017-06-11"), Some(code), now()).expect("resolves");
            assert_eq!(instant.timestamp, expected((2017, 6, 11), (hour, 0)), "code {code}");
        }
    }

    #[test]
    fn buggy_his_prefix_is_tolerated() {
        let buggy = resolve(None, Some("HIS EV"), now()).expect("resolves");
        let clean = resolve(None, Some("EV"), now()).expect("resolves");

        // Both anchor to the current server date at 19:00.
        assert_eq!(buggy, clean);
        assert_eq!(buggy.timestamp, expected((2017, 6, 10), (19, 0)));
        assert!(buggy.implicit_now);
        assert!(buggy.explicit_time_of_day);
    }

    #[test]
    fn clock_time_slot_is_used_verbatim() {
        let instant = resolve(Some("2017-06-11"), Some("08:45"), now()).expect("resolves");

        assert_eq!(instant.timestamp, expected((2017, 6, 11), (8, 45)));
    }

    #[test]
    fn unrecognized_time_degrades_to_noon() {
        let instant = resolve(Some("2017-06-11"), Some("soonish"), now()).expect("resolves");

        assert_eq!(instant.timestamp, expected((2017, 6, 11), (12, 0)));
        assert!(instant.explicit_time_of_day);
    }

    #[test]
    fn relative_words_resolve_against_today() {
        let tomorrow = resolve(Some("tomorrow"), None, now()).expect("resolves");
        assert_eq!(tomorrow.timestamp, expected((2017, 6, 11), (12, 0)));

        let yesterday = resolve(Some("yesterday"), None, now()).expect("resolves");
        assert_eq!(yesterday.timestamp, expected((2017, 6, 9), (12, 0)));
    }

    #[test]
    fn garbage_date_fails_with_a_date_slot_error() {
        let err = resolve(Some("not a date"), None, now()).unwrap_err();

        assert_eq!(err.slot, SlotName::Date);
        assert!(err.message.contains("did not understand date"));
    }

    #[test]
    fn valid_date_check_matches_resolution() {
        let today = now().date_naive();
        assert!(is_valid_date("2017-06-11", today));
        assert!(is_valid_date("tomorrow", today));
        assert!(!is_valid_date("not a date", today));
    }
}
