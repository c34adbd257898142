use chrono::{NaiveTime, Timelike};

/// Derive worked hours from start/finish times and a break. Returns an
/// empty string when either time is absent or unparsable; otherwise hours
/// with exactly two decimals. A finish earlier than start is a shift
/// crossing midnight, never an error, and a break longer than the shift
/// clamps to zero.
pub fn compute_hours(start: &str, finish: &str, break_minutes: u32) -> String {
    let (Some(start), Some(finish)) = (parse_minutes(start), parse_minutes(finish)) else {
        return String::new();
    };

    let mut minutes = finish - start;
    if minutes < 0 {
        minutes += 24 * 60;
    }
    minutes -= break_minutes as i64;
    if minutes < 0 {
        minutes = 0;
    }
    format!("{:.2}", minutes as f64 / 60.0)
}

fn parse_minutes(time: &str) -> Option<i64> {
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M").ok()?;
    Some(time.hour() as i64 * 60 + time.minute() as i64)
}
