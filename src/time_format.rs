use chrono::{DateTime, SubsecRound, TimeZone};
use std::fmt::Display;

/// Describes how far `to` lies after `from`
///
/// Examples:
/// - same moment or earlier: "now"
/// - 30 seconds later: "in 30 seconds"
/// - 1 hour later: "in 1 hour"
/// - 1 day later: "tomorrow"
/// - 6 days later: "in 6 days"
/// - 40 days later: "on 2025-12-10"
///
/// Both instants are compared at millisecond precision, the resolution
/// review dates are stored with.
pub fn format_time_difference<Tz: TimeZone>(from: DateTime<Tz>, to: DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    let duration = to
        .clone()
        .trunc_subsecs(3)
        .signed_duration_since(from.trunc_subsecs(3));

    if duration.num_seconds() <= 0 {
        "now".to_string()
    } else if duration.num_seconds() < 60 {
        plural("second", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        plural("minute", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        plural("hour", duration.num_hours())
    } else if duration.num_days() == 1 {
        "tomorrow".to_string()
    } else if duration.num_days() < 30 {
        plural("day", duration.num_days())
    } else {
        format!("on {}", to.format("%Y-%m-%d"))
    }
}

fn plural(unit: &str, count: i64) -> String {
    format!("in {} {}{}", count, unit, if count == 1 { "" } else { "s" })
}
