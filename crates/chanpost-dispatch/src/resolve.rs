//! Time resolution - wall-clock time-of-day to the next future instant.

use chrono::{DateTime, Duration, LocalResult, TimeZone, Utc};

use chanpost_protocols::{TimeOfDay, Zone};

/// Resolve the next instant at which `time` occurs in `zone`, strictly
/// after `now`.
///
/// A time-of-day that has already passed today (or equals `now` exactly)
/// defers to tomorrow, so a freshly loaded schedule never burst-fires at
/// startup.
pub fn resolve_next_fire(time: TimeOfDay, zone: Zone, now: DateTime<Utc>) -> DateTime<Utc> {
    let offset = zone.fixed_offset();
    let local_now = now.with_timezone(&offset);
    let naive = local_now.date_naive().and_time(time.to_naive_time());

    let mut candidate = match offset.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        // Fixed offsets have no gaps or folds.
        _ => local_now,
    };

    if candidate <= local_now {
        candidate += Duration::days(1);
    }

    candidate.with_timezone(&Utc)
}

/// Delay from `now` until the next fire, for arming a one-shot timer.
pub fn delay_until_next_fire(
    time: TimeOfDay,
    zone: Zone,
    now: DateTime<Utc>,
) -> std::time::Duration {
    let fire_at = resolve_next_fire(time, zone, now);
    // Resolution is strictly future, so the difference is positive.
    (fire_at - now).to_std().unwrap_or(std::time::Duration::ZERO)
}
