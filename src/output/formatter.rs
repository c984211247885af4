use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

/// How aggregate values are rendered in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Plain integers: milliseconds for durations, bare counts.
    #[default]
    Raw,
    /// Phrases such as "2 days, 3 hours" and "12 lines".
    Human,
}

impl RenderMode {
    pub fn from_human_flag(human: bool) -> Self {
        if human {
            RenderMode::Human
        } else {
            RenderMode::Raw
        }
    }

    /// Render a duration given in milliseconds.
    pub fn duration(self, millis: i64) -> String {
        match self {
            RenderMode::Raw => millis.to_string(),
            RenderMode::Human => humanize_duration(millis),
        }
    }

    /// Render a count with its unit, e.g. `count(3, "issues")` is "3 issues" in
    /// human mode and "3" otherwise.
    pub fn count(self, value: i64, unit: &str) -> String {
        match self {
            RenderMode::Raw => value.to_string(),
            RenderMode::Human => format!("{} {}", value, unit),
        }
    }
}

const SECOND_MS: u64 = 1_000;
const MINUTE_MS: u64 = 60 * SECOND_MS;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;
const WEEK_MS: u64 = 7 * DAY_MS;
// Calendar averages: 365.25 days a year, a twelfth of that a month.
const YEAR_MS: u64 = 31_557_600_000;
const MONTH_MS: u64 = 2_629_800_000;

const UNITS: &[(u64, &str, &str)] = &[
    (YEAR_MS, "year", "years"),
    (MONTH_MS, "month", "months"),
    (WEEK_MS, "week", "weeks"),
    (DAY_MS, "day", "days"),
    (HOUR_MS, "hour", "hours"),
    (MINUTE_MS, "minute", "minutes"),
    (SECOND_MS, "second", "seconds"),
    (1, "millisecond", "milliseconds"),
];

/// Format a duration in milliseconds as comma separated units, largest first,
/// omitting zero units: "1 day, 2 hours, 5 seconds". Zero is "0 seconds".
/// The sign is ignored.
pub fn humanize_duration(millis: i64) -> String {
    let mut remaining = millis.unsigned_abs();
    if remaining == 0 {
        return "0 seconds".to_string();
    }

    let mut parts = Vec::new();
    for &(size, singular, plural) in UNITS {
        let amount = remaining / size;
        if amount == 0 {
            continue;
        }
        remaining %= size;
        let unit = if amount == 1 { singular } else { plural };
        parts.push(format!("{} {}", amount, unit));
    }
    parts.join(", ")
}

/// Write `value` as pretty JSON to stdout, followed by a newline.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value).context("Failed to serialize report")?;
    writeln!(out).context("Failed to write report")?;
    Ok(())
}
