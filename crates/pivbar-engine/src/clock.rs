//! Live date/time shown in the host header.

use std::{sync::Arc, time::Duration};

use chrono::{Datelike, Local, NaiveDateTime};
use pivbar_dom::{Dom, NodeId};
use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Marker class of the clock element.
pub const CLOCK_CLASS: &str = "piv-live-date";

/// Refresh period.
pub const TICK: Duration = Duration::from_secs(1);

/// French weekday names, Monday first.
const WEEKDAYS: [&str; 7] = [
    "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
];

/// French month names, January first.
const MONTHS: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Source of the current local time.
pub type Now = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// The system's local clock.
pub fn system_clock() -> Now {
    Arc::new(|| Local::now().naive_local())
}

/// `"Vendredi 17 octobre - 03:04:05 PM"`: French long weekday, two-digit day,
/// and long month with the first letter capitalized, then a 12-hour time.
pub fn format_french_datetime(dt: NaiveDateTime) -> String {
    let weekday = WEEKDAYS[dt.weekday().num_days_from_monday() as usize];
    let month = MONTHS[dt.month0() as usize];
    let date = format!("{} {:02} {}", weekday, dt.day(), month);
    let mut chars = date.chars();
    let date: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => date,
    };
    format!("{} - {}", date, dt.format("%I:%M:%S %p"))
}

/// Refresh `node` with the current time every [`TICK`] until `cancel` fires
/// or the node leaves the document.
pub fn spawn_ticker(
    dom: Arc<dyn Dom>,
    node: NodeId,
    now: Now,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    trace!("clock_cancelled");
                    return;
                }
                _ = ticker.tick() => {
                    if !dom.contains(node) {
                        trace!("clock_detached");
                        return;
                    }
                    dom.set_text(node, &format_french_datetime(now()));
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn formats_french_date_with_english_time() {
        assert_eq!(
            format_french_datetime(at(2025, 10, 17, 15, 4, 5)),
            "Vendredi 17 octobre - 03:04:05 PM"
        );
        assert_eq!(
            format_french_datetime(at(2025, 8, 4, 0, 30, 0)),
            "Lundi 04 août - 12:30:00 AM"
        );
        assert_eq!(
            format_french_datetime(at(2024, 12, 1, 12, 0, 59)),
            "Dimanche 01 décembre - 12:00:59 PM"
        );
    }
}
