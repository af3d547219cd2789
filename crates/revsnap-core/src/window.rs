//! Monday-anchored week windows.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// A 7-day aggregation window running Monday through Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    /// `true` when `date` falls inside the window (both ends inclusive).
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// ISO week label of the window start, e.g. `2025-W09`.
    #[must_use]
    pub fn iso_week(&self) -> String {
        let iso = self.start.iso_week();
        format!("{}-W{:02}", iso.year(), iso.week())
    }

    #[must_use]
    pub fn next(&self) -> WeekWindow {
        window_for(
            self.start
                .checked_add_days(Days::new(7))
                .unwrap_or(NaiveDate::MAX),
        )
    }

    #[must_use]
    pub fn previous(&self) -> WeekWindow {
        window_for(
            self.start
                .checked_sub_days(Days::new(7))
                .unwrap_or(NaiveDate::MIN),
        )
    }
}

/// The window containing `date`.
///
/// Windows at the ends of the calendar are clamped to
/// [`NaiveDate::MIN`] and [`NaiveDate::MAX`].
#[must_use]
pub fn window_for(date: NaiveDate) -> WeekWindow {
    let offset = u64::from(date.weekday().num_days_from_monday());
    let start = date
        .checked_sub_days(Days::new(offset))
        .unwrap_or(NaiveDate::MIN);
    WeekWindow {
        start,
        end: start
            .checked_add_days(Days::new(6))
            .unwrap_or(NaiveDate::MAX),
    }
}

/// Consecutive windows from the week of `first` through the week of `last`.
///
/// Empty when `first > last`. The iterator is `Clone`, so a sequence can be
/// replayed from the beginning.
#[must_use]
pub fn windows_covering(first: NaiveDate, last: NaiveDate) -> WeekWindows {
    if first > last {
        return WeekWindows {
            next: None,
            last: window_for(last),
        };
    }
    WeekWindows {
        next: Some(window_for(first)),
        last: window_for(last),
    }
}

/// Lazy sequence returned by [`windows_covering`].
#[derive(Debug, Clone)]
pub struct WeekWindows {
    next: Option<WeekWindow>,
    last: WeekWindow,
}

impl Iterator for WeekWindows {
    type Item = WeekWindow;

    fn next(&mut self) -> Option<WeekWindow> {
        let current = self.next?;
        self.next = (current.start < self.last.start).then(|| current.next());
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.next.map_or(0, |w| {
            let weeks = (self.last.start - w.start).num_days() / 7 + 1;
            usize::try_from(weeks).unwrap_or(0)
        });
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for WeekWindows {}
