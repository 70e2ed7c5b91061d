use time::{Duration, OffsetDateTime};

use crate::models::membership::{count_editors, Membership};

pub fn members_summary(members: &[Membership]) -> String {
    format!(
        "{} member(s), {} editor(s)",
        members.len(),
        count_editors(members)
    )
}

pub fn invites_summary(count: usize) -> String {
    format!("{} pending invite(s)", count)
}

/// Relative phrase such as "3 days ago" or "in 2 hours".
pub fn time_ago(then: OffsetDateTime, now: OffsetDateTime) -> String {
    let delta = now - then;
    let future = delta.is_negative();
    let delta = delta.abs();

    if delta < Duration::seconds(45) {
        return "just now".to_string();
    }

    let (value, unit) = if delta < Duration::minutes(45) {
        (delta.whole_minutes().max(1), "minute")
    } else if delta < Duration::hours(22) {
        (delta.whole_hours().max(1), "hour")
    } else if delta < Duration::days(7) {
        (delta.whole_days().max(1), "day")
    } else if delta < Duration::days(30) {
        (delta.whole_weeks(), "week")
    } else if delta < Duration::days(365) {
        (delta.whole_days() / 30, "month")
    } else {
        (delta.whole_days() / 365, "year")
    };

    let plural = if value == 1 { "" } else { "s" };
    if future {
        format!("in {} {}{}", value, unit, plural)
    } else {
        format!("{} {}{} ago", value, unit, plural)
    }
}

/// `YYYY-MM-DD HH:MM` in UTC.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let at = at.to_offset(time::UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02} UTC",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute()
    )
}
