// src/data/datetime.rs

//! Functions to decode timestamp substrings into datetimes
//! ([`DateTimeL`] instances).
//!
//! A template's format-spec declares one of two decoding modes:
//!
//! * the literal keyword `UNIXTIME` (case-insensitive); the raw substring is
//!   base-10 seconds since the Unix epoch ([`TimeFormat::Epoch`]).
//! * a chrono [strftime] pattern, e.g. `%H:%M:%S` or `%Y/%m/%d %H:%M:%S`
//!   ([`TimeFormat::Pattern`]).
//!
//! Patterns without a timezone specifier are resolved in a caller-passed
//! fallback [`FixedOffset`].
//!
//! [strftime]: https://docs.rs/chrono/latest/chrono/format/strftime/

#[doc(hidden)]
pub use ::chrono::{
    DateTime,
    Datelike,
    Duration,
    FixedOffset,
    LocalResult,
    NaiveDate,
    NaiveDateTime,
    NaiveTime,
    TimeZone,
    Timelike,
};
use ::rand::Rng;
use ::si_trace_print::{
    defn,
    defo,
    defx,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DateTime typing, aliases, and helper constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// the universal `DateTime` type used in this crate
pub type DateTimeL = DateTime<FixedOffset>;
pub type DateTimeLOpt = Option<DateTimeL>;

/// a chrono [strftime] format pattern
///
/// [strftime]: https://docs.rs/chrono/latest/chrono/format/strftime/
#[allow(non_camel_case_types)]
pub type DateTimePattern_str = str;

/// format-spec keyword declaring raw epoch seconds, compared
/// case-insensitively
pub const TIME_FORMAT_UNIXTIME: &str = "UNIXTIME";

/// Upper bound (exclusive) of the pseudo-random sub-second jitter attached
/// to epoch-decoded datetimes, in nanoseconds.
/// The jitter gives records sharing one whole second a secondary order; it
/// never changes the whole-second value used for offset encoding.
pub const EPOCH_JITTER_NS: u32 = 60;

/// The fallback timezone offset `+09:00` (the reference timezone of the
/// comment export services this tool was written for).
pub fn tz_offset_default() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TimeFormat, TimeError
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Declared time format of a template, from the `__TIME[<format-spec>]__`
/// placeholder.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TimeFormat {
    /// format-spec was keyword [`TIME_FORMAT_UNIXTIME`]
    Epoch,
    /// format-spec is a chrono strftime pattern
    Pattern(String),
}

impl TimeFormat {
    /// Interpret a template format-spec.
    pub fn from_spec(spec: &str) -> TimeFormat {
        if spec.eq_ignore_ascii_case(TIME_FORMAT_UNIXTIME) {
            return TimeFormat::Epoch;
        }

        TimeFormat::Pattern(String::from(spec))
    }
}

/// Failure to decode one timestamp substring.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TimeError {
    /// the raw substring was not base-10 epoch seconds, or the value was
    /// out of the representable datetime range
    InvalidEpoch(String),
    /// the raw substring did not match the declared strftime pattern
    InvalidTimestamp(String),
}

impl std::fmt::Display for TimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeError::InvalidEpoch(raw) => {
                write!(f, "invalid epoch seconds {:?}", raw)
            }
            TimeError::InvalidTimestamp(raw) => {
                write!(f, "invalid timestamp {:?}", raw)
            }
        }
    }
}

impl std::error::Error for TimeError {}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// decoding functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Does the strftime `pattern` carry a timezone specifier?
///
/// Checks for `%z`, `%:z` (and the `%::z`, `%:::z` forms), `%#z`, `%Z`.
/// `%%` escapes are honored.
pub fn pattern_has_tz(pattern: &DateTimePattern_str) -> bool {
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            continue;
        }
        match chars.next() {
            Some('z') | Some('Z') => return true,
            Some(':') => {
                while let Some(':') = chars.peek() {
                    chars.next();
                }
                if let Some('z') = chars.next() {
                    return true;
                }
            }
            Some('#') => {
                if let Some('z') = chars.next() {
                    return true;
                }
            }
            // `%%` and every other specifier
            Some(_) => {}
            None => break,
        }
    }

    false
}

/// Convert a `&str` to a chrono [`Option<DateTime<FixedOffset>>`] instance.
///
/// Compensate for a missing timezone: when `has_tz` is `false` the parsed
/// `NaiveDateTime` is resolved in `tz_offset`.
///
/// A time-only `pattern` (e.g. `%H:%M:%S`) cannot form a `NaiveDateTime` by
/// itself so the parsed `NaiveTime` is resolved against a dummy date; only
/// deltas between decoded datetimes are meaningful downstream. A date-only
/// `pattern` resolves to midnight.
///
/// [`Option<DateTime<FixedOffset>>`]: https://docs.rs/chrono/latest/chrono/struct.DateTime.html#impl-DateTime%3CFixedOffset%3E
pub fn datetime_parse_from_str(
    data: &str,
    pattern: &DateTimePattern_str,
    has_tz: bool,
    tz_offset: &FixedOffset,
) -> DateTimeLOpt {
    defn!("(data {:?}, pattern {:?}, has_tz {:?}, tz_offset {:?})", data, pattern, has_tz, tz_offset);

    if has_tz {
        match DateTime::parse_from_str(data, pattern) {
            Ok(val) => {
                defx!("return Some({:?})", val);

                return Some(val);
            }
            Err(_err) => {
                defx!("DateTime::parse_from_str({:?}, {:?}) failed ParseError: {}", data, pattern, _err);

                return None;
            }
        }
    }

    // !has_tz
    // first parse to a `NaiveDateTime` instance
    let dt_naive: NaiveDateTime = match NaiveDateTime::parse_from_str(data, pattern) {
        Ok(val) => val,
        Err(_err) => {
            defo!("NaiveDateTime::parse_from_str({:?}, {:?}) failed ParseError: {}", data, pattern, _err);
            match NaiveTime::parse_from_str(data, pattern) {
                Ok(time_) => NaiveDate::from_ymd_opt(1970, 1, 1)
                    .unwrap()
                    .and_time(time_),
                Err(_err) => match NaiveDate::parse_from_str(data, pattern) {
                    Ok(date_) => date_.and_hms_opt(0, 0, 0).unwrap(),
                    Err(_err) => {
                        defx!("NaiveDate::parse_from_str({:?}, {:?}) failed ParseError: {}", data, pattern, _err);

                        return None;
                    }
                },
            }
        }
    };
    // second convert the `NaiveDateTime` instance to a `DateTime<FixedOffset>`
    // instance in the fallback timezone
    match tz_offset
        .from_local_datetime(&dt_naive)
        .earliest()
    {
        Some(val) => {
            defx!("return Some({:?})", val);

            Some(val)
        }
        None => {
            defx!("tz_offset.from_local_datetime({:?}) returned None", dt_naive);

            None
        }
    }
}

/// Decode `raw` as base-10 signed seconds since the Unix epoch.
///
/// Attaches a pseudo-random sub-second jitter in `[0, EPOCH_JITTER_NS)`
/// nanoseconds drawn from `rng`.
pub fn datetime_parse_from_epoch<R: Rng>(
    raw: &str,
    tz_offset: &FixedOffset,
    rng: &mut R,
) -> Result<DateTimeL, TimeError> {
    defn!("(raw {:?})", raw);

    let sec: i64 = match raw.parse::<i64>() {
        Ok(val) => val,
        Err(_err) => {
            defx!("parse::<i64>({:?}) failed {}", raw, _err);

            return Err(TimeError::InvalidEpoch(String::from(raw)));
        }
    };
    let nsec: u32 = rng.random_range(0..EPOCH_JITTER_NS);
    match tz_offset.timestamp_opt(sec, nsec) {
        LocalResult::Single(dt) => {
            defx!("return {:?}", dt);

            Ok(dt)
        }
        _ => {
            defx!("timestamp_opt({}, {}) out of range", sec, nsec);

            Err(TimeError::InvalidEpoch(String::from(raw)))
        }
    }
}

/// Decode one raw timestamp substring according to the declared
/// [`TimeFormat`].
pub fn decode_timestamp<R: Rng>(
    format: &TimeFormat,
    raw: &str,
    tz_offset: &FixedOffset,
    rng: &mut R,
) -> Result<DateTimeL, TimeError> {
    match format {
        TimeFormat::Epoch => datetime_parse_from_epoch(raw, tz_offset, rng),
        TimeFormat::Pattern(pattern) => {
            let has_tz: bool = pattern_has_tz(pattern);
            match datetime_parse_from_str(raw, pattern, has_tz, tz_offset) {
                Some(dt) => Ok(dt),
                None => Err(TimeError::InvalidTimestamp(String::from(raw))),
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// miscellaneous helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Create a [`DateTimeL`] instance from y/m/d h:m:s in `fixedoffset`.
pub fn ymdhms(
    fixedoffset: &FixedOffset,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
) -> DateTimeL {
    fixedoffset
        .with_ymd_and_hms(year, month, day, hour, min, sec)
        .unwrap()
}

/// Create a [`DateTimeL`] instance from y/m/d h:m:s + nanoseconds in
/// `fixedoffset`.
#[allow(clippy::too_many_arguments)]
pub fn ymdhmsn(
    fixedoffset: &FixedOffset,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
    nsec: u32,
) -> DateTimeL {
    ymdhms(fixedoffset, year, month, day, hour, min, sec)
        .with_nanosecond(nsec)
        .unwrap()
}
