//! Ordered timestamp layouts tried by the type guesser.
//!
//! The table mirrors the classic reference layouts (ANSIC, RFC822, RFC3339,
//! Kitchen, ...) expressed as `chrono` strftime patterns. Order matters: the
//! first layout that parses a value names the value's format.
//!
//! Layout notes:
//!
//! - Each space in a layout matches one or more spaces in the value; no other
//!   whitespace is accepted.
//! - Every layout with seconds accepts an optional `.digits` fraction right
//!   after them, so the fixed-fraction Stamp variants and RFC3339Nano are
//!   shadowed by the layouts listed before them.
//! - Layouts without a zone are interpreted as UTC.
//! - Layouts carrying a zone abbreviation (`MST`) accept any well-formed
//!   abbreviation and interpret it as offset zero.
//! - Numeric offsets are `-0700`, or `Z`/`-07:00` for RFC3339.
//! - Layouts without a calendar date (Kitchen, Stamp*) resolve to year 0.
//!   Kitchen additionally resolves to January 1 and needs an upper-case
//!   `AM`/`PM`.

use std::borrow::Cow;

use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{DateTime, FixedOffset};

/// Where a layout gets its UTC offset from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// No zone in the input; read as UTC.
    Utc,
    /// A zone abbreviation such as `MST`; read as offset zero.
    Abbreviation,
    /// A numeric offset such as `-0700`.
    Offset,
    /// `Z` or a numeric offset with a colon such as `+07:00`.
    OffsetOrZulu,
}

/// Which calendar fields a layout leaves out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calendar {
    Full,
    NoYear,
    TimeOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct TimestampFormat {
    pub name: &'static str,
    pub pattern: &'static str,
    pub zone: Zone,
    pub calendar: Calendar,
}

const fn layout(
    name: &'static str,
    pattern: &'static str,
    zone: Zone,
    calendar: Calendar,
) -> TimestampFormat {
    TimestampFormat {
        name,
        pattern,
        zone,
        calendar,
    }
}

const RFC3339: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

pub const TIMESTAMP_FORMATS: &[TimestampFormat] = &[
    layout("ANSIC", "%a %b %e %H:%M:%S%.f %Y", Zone::Utc, Calendar::Full),
    layout("UnixDate", "%a %b %e %H:%M:%S%.f %Z %Y", Zone::Abbreviation, Calendar::Full),
    layout("RubyDate", "%a %b %d %H:%M:%S%.f %z %Y", Zone::Offset, Calendar::Full),
    layout("RFC822", "%d %b %y %H:%M %Z", Zone::Abbreviation, Calendar::Full),
    layout("RFC822Z", "%d %b %y %H:%M %z", Zone::Offset, Calendar::Full),
    layout("RFC850", "%A, %d-%b-%y %H:%M:%S%.f %Z", Zone::Abbreviation, Calendar::Full),
    layout("RFC1123", "%a, %d %b %Y %H:%M:%S%.f %Z", Zone::Abbreviation, Calendar::Full),
    layout("RFC1123Z", "%a, %d %b %Y %H:%M:%S%.f %z", Zone::Offset, Calendar::Full),
    layout("RFC3339", RFC3339, Zone::OffsetOrZulu, Calendar::Full),
    layout("RFC3339Nano", RFC3339, Zone::OffsetOrZulu, Calendar::Full),
    layout("Kitchen", "%I:%M%p", Zone::Utc, Calendar::TimeOnly),
    layout("Stamp", "%b %e %H:%M:%S%.f", Zone::Utc, Calendar::NoYear),
    layout("StampMilli", "%b %e %H:%M:%S.%3f", Zone::Utc, Calendar::NoYear),
    layout("StampMicro", "%b %e %H:%M:%S.%6f", Zone::Utc, Calendar::NoYear),
    layout("StampNano", "%b %e %H:%M:%S.%9f", Zone::Utc, Calendar::NoYear),
    layout("DateTimeMicro", "%Y-%m-%d %H:%M:%S.%6f", Zone::Utc, Calendar::Full),
];

impl TimestampFormat {
    /// Parses `value` with this layout, returning `None` when it does not match.
    pub fn parse(&self, value: &str) -> Option<DateTime<FixedOffset>> {
        let normalized = self.normalize_spaces(value)?;
        if self.pattern.contains("%p")
            && !(normalized.ends_with("AM") || normalized.ends_with("PM"))
        {
            return None;
        }

        let input = match self.zone {
            Zone::Utc => Cow::Borrowed(normalized.as_str()),
            Zone::Abbreviation => {
                self.zone_field(&normalized, "%Z", is_zone_abbreviation)?;
                Cow::Borrowed(normalized.as_str())
            }
            Zone::Offset => {
                self.zone_field(&normalized, "%z", is_numeric_offset)?;
                Cow::Borrowed(normalized.as_str())
            }
            Zone::OffsetOrZulu => rfc3339_zone(&normalized)?,
        };

        let mut parsed = Parsed::new();
        format::parse(&mut parsed, &input, StrftimeItems::new(self.pattern)).ok()?;
        match self.calendar {
            Calendar::Full => {}
            Calendar::NoYear => parsed.set_year(0).ok()?,
            Calendar::TimeOnly => {
                parsed.set_year(0).ok()?;
                parsed.set_month(1).ok()?;
                parsed.set_day(1).ok()?;
            }
        }

        match self.zone {
            Zone::Offset | Zone::OffsetOrZulu => parsed.to_datetime().ok(),
            Zone::Utc | Zone::Abbreviation => parsed
                .to_naive_datetime_with_offset(0)
                .ok()
                .map(|naive| naive.and_utc().fixed_offset()),
        }
    }

    /// Collapses runs of spaces to one, provided the value has exactly as
    /// many space-separated fields as the layout and no other whitespace.
    fn normalize_spaces(&self, value: &str) -> Option<String> {
        if value.starts_with(' ')
            || value.ends_with(' ')
            || value.chars().any(|c| c.is_whitespace() && c != ' ')
        {
            return None;
        }
        let fields = value
            .split(' ')
            .filter(|field| !field.is_empty())
            .collect::<Vec<_>>();
        (fields.len() == self.pattern.split(' ').count()).then(|| fields.join(" "))
    }

    fn zone_field(&self, input: &str, specifier: &str, accepts: fn(&str) -> bool) -> Option<()> {
        let position = self.pattern.split(' ').position(|field| field == specifier)?;
        input.split(' ').nth(position).filter(|field| accepts(field))?;
        Some(())
    }
}

/// Rewrites a trailing `Z` to `+00:00`; otherwise requires a `+hh:mm` suffix.
fn rfc3339_zone(input: &str) -> Option<Cow<'_, str>> {
    if let Some(rest) = input.strip_suffix('Z') {
        return Some(Cow::Owned(format!("{rest}+00:00")));
    }
    let zone = input.get(input.len().checked_sub(6)?..)?;
    let bytes = zone.as_bytes();
    let well_formed = matches!(bytes[0], b'+' | b'-')
        && bytes[3] == b':'
        && [1, 2, 4, 5].iter().all(|&idx| bytes[idx].is_ascii_digit());
    well_formed.then_some(Cow::Borrowed(input))
}

/// `+hhmm` or `-hhmm`.
pub fn is_numeric_offset(token: &str) -> bool {
    token.len() == 5
        && token.starts_with(['+', '-'])
        && token[1..].bytes().all(|b| b.is_ascii_digit())
}

/// Returns the first layout that parses `value`, with the parsed instant.
pub fn parse_timestamp(value: &str) -> Option<(DateTime<FixedOffset>, &'static TimestampFormat)> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| format.parse(value).map(|instant| (instant, format)))
}

/// Accepts the zone abbreviation shapes a timestamp layout's `MST` slot allows:
/// three upper-case letters, four or five ending in `T`, `WITA`, `ChST`,
/// `MeST`, `GMT` with an optional hour offset, or a bare `+hh`/`-hh`.
pub fn is_zone_abbreviation(token: &str) -> bool {
    if matches!(token, "ChST" | "MeST" | "WITA") {
        return true;
    }
    if let Some(rest) = token.strip_prefix("GMT") {
        return rest.is_empty() || is_hour_offset(rest);
    }
    if token.starts_with(['+', '-']) {
        return is_hour_offset(token);
    }
    if !token.bytes().all(|b| b.is_ascii_uppercase()) {
        return false;
    }
    match token.len() {
        3 => true,
        4 | 5 => token.ends_with('T'),
        _ => false,
    }
}

fn is_hour_offset(value: &str) -> bool {
    let Some(digits) = value.strip_prefix(['+', '-']) else {
        return false;
    };
    (1..=2).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit())
        && digits.parse::<u8>().is_ok_and(|hours| hours <= 23)
}
