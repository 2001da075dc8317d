use chrono::{DateTime, Utc};

const MS_PER_MINUTE: u64 = 60 * 1000;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub struct DateDiffFormatter {
    clock: Box<dyn Clock>,
}

impl DateDiffFormatter {
    pub fn new(clock: impl Clock + 'static) -> Self {
        DateDiffFormatter {
            clock: Box::new(clock),
        }
    }

    pub fn format(&self, timestamp: DateTime<Utc>, is_past: bool) -> String {
        format_date_diff(timestamp, self.clock.now(), is_past)
    }
}

/// Renders the distance between `timestamp` and `now` as e.g.
/// "2 days 3h 0m ago". Zero days and zero hours are left out; minutes are
/// always printed unless everything is zero, which reads "Just now".
pub fn format_date_diff(timestamp: DateTime<Utc>, now: DateTime<Utc>, is_past: bool) -> String {
    let elapsed_ms = (now - timestamp).num_milliseconds().unsigned_abs();

    let total_minutes = elapsed_ms / MS_PER_MINUTE;
    let total_hours = elapsed_ms / MS_PER_HOUR;
    let days = elapsed_ms / MS_PER_DAY;

    let hours = total_hours - days * 24;
    let minutes = total_minutes - total_hours * 60;

    if days == 0 && hours == 0 && minutes == 0 {
        return "Just now".to_string();
    }

    let mut formatted = String::new();
    if days > 1 {
        formatted.push_str(&format!("{} days ", days));
    } else if days > 0 {
        formatted.push_str(&format!("{} day ", days));
    }

    if hours > 0 {
        formatted.push_str(&format!("{}h ", hours));
    }

    let suffix = if is_past { "ago" } else { "from now" };
    formatted.push_str(&format!("{}m {}", minutes, suffix));

    formatted
}
