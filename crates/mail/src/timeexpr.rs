//! Natural-language time expressions for email search ("3 days ago",
//! "last thursday", "this month", bare dates).

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

/// Outcome of parsing a time expression. `fallback` is set when the
/// expression was not understood and the default window was applied,
/// so callers can tell a real 7-day request apart from a shrug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTime {
    pub at: DateTime<Utc>,
    pub fallback: bool,
}

impl ResolvedTime {
    fn exact(at: DateTime<Utc>) -> Self {
        Self {
            at,
            fallback: false,
        }
    }
}

/// Resolve `expr` relative to `now`. Unrecognized input falls back to
/// seven days before `now` and flags the result.
pub fn resolve(expr: &str, now: DateTime<Utc>) -> ResolvedTime {
    let expression = expr.to_lowercase();
    let expression = expression.trim();

    if let Some(at) = relative_ago(expression, now) {
        return ResolvedTime::exact(at);
    }

    if expression.contains("last thursday") {
        // Thursday of the previous calendar week (weeks start Sunday).
        let since_sunday = now.weekday().num_days_from_sunday() as i64;
        return ResolvedTime::exact(now - Duration::days(since_sunday + 3));
    }

    if expression.contains("yesterday") {
        return ResolvedTime::exact(now - Duration::days(1));
    }

    if expression.contains("last week") {
        return ResolvedTime::exact(now - Duration::weeks(1));
    }

    if expression.contains("today") {
        return ResolvedTime::exact(start_of_day(now));
    }

    if expression.contains("this week") {
        let since_sunday = now.weekday().num_days_from_sunday() as i64;
        return ResolvedTime::exact(start_of_day(now - Duration::days(since_sunday)));
    }

    if expression.contains("this month") {
        let first = now
            .date_naive()
            .with_day(1)
            .unwrap_or_else(|| now.date_naive());
        return ResolvedTime::exact(midnight(first));
    }

    if let Some(at) = embedded_date(expression) {
        return ResolvedTime::exact(at);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(expression) {
        return ResolvedTime::exact(parsed.with_timezone(&Utc));
    }

    tracing::warn!(expr, "unparseable time expression, defaulting to 7 days ago");
    ResolvedTime {
        at: now - Duration::days(7),
        fallback: true,
    }
}

fn relative_ago(expression: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let re = regex::Regex::new(r"(\d+)\s+(day|week|hour)s?\s+ago").ok()?;
    let caps = re.captures(expression)?;
    let count: i64 = caps.get(1)?.as_str().parse().ok()?;
    let delta = match caps.get(2)?.as_str() {
        "day" => Duration::days(count),
        "week" => Duration::weeks(count),
        "hour" => Duration::hours(count),
        _ => return None,
    };
    Some(now - delta)
}

fn embedded_date(expression: &str) -> Option<DateTime<Utc>> {
    let re = regex::Regex::new(r"(\d{4}-\d{2}-\d{2})").ok()?;
    let caps = re.captures(expression)?;
    let date = NaiveDate::parse_from_str(caps.get(1)?.as_str(), "%Y-%m-%d").ok()?;
    Some(midnight(date))
}

fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    midnight(at.date_naive())
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
}
