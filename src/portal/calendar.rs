//! Month grid for the calendar page.
//!
//! The grid always covers whole weeks: the tail of the previous month fills
//! the first row up to day 1 and the head of the next month pads the last
//! row. Assignments show up as markers on their due day.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::models::{Assignment, AssignmentKind};

pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Years the view may show. Both neighbouring months of any month in this
/// range are still representable dates.
fn year_range() -> RangeInclusive<i32> {
    NaiveDate::MIN.year() + 1..=NaiveDate::MAX.year() - 1
}

/// The 1st of the month, clamped to the representable dates.
fn first_of(year: i32, month: u32) -> NaiveDate {
    let year = year.clamp(NaiveDate::MIN.year(), NaiveDate::MAX.year());
    NaiveDate::from_ymd_opt(year, month.clamp(1, 12), 1).unwrap_or(NaiveDate::MIN)
}

fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// Weekday of the 1st, 0 = Sunday.
pub fn first_weekday(year: i32, month: u32) -> u32 {
    first_of(year, month).weekday().num_days_from_sunday()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = shift_month(year, month, 1);
    let days = first_of(next_year, next_month)
        .signed_duration_since(first_of(year, month))
        .num_days();
    days as u32
}

// ─── Grid ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub assignment_id: u32,
    pub title: String,
    pub kind: Option<AssignmentKind>,
    pub past_due: bool,
}

impl Marker {
    pub fn classes(&self) -> String {
        let mut classes = String::from("event");
        if let Some(kind) = self.kind {
            classes.push(' ');
            classes.push_str(&kind.event_class());
        }
        if self.past_due {
            classes.push_str(" past-due");
        }
        classes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    /// False for the leading and trailing days borrowed from adjacent months.
    pub in_month: bool,
    pub current: bool,
    pub markers: Vec<Marker>,
}

impl DayCell {
    fn other_month(day: u32) -> Self {
        Self {
            day,
            in_month: false,
            current: false,
            markers: Vec::new(),
        }
    }

    pub fn classes(&self) -> &'static str {
        match (self.in_month, self.current) {
            (false, _) => "day other-month",
            (true, true) => "day current-day",
            (true, false) => "day",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    pub title: String,
    pub year: i32,
    pub month: u32,
    pub cells: Vec<DayCell>,
}

impl CalendarGrid {
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(7)
    }
}

// ─── Controller ──────────────────────────────────────────────────────────────

/// The displayed month plus the reference date used for "today" and
/// past-due highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarView {
    year: i32,
    month: u32,
    today: NaiveDate,
}

impl CalendarView {
    /// Start on the month containing `today`.
    pub fn new(today: NaiveDate) -> Self {
        let range = year_range();
        Self {
            year: today.year().clamp(*range.start(), *range.end()),
            month: today.month(),
            today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn prev(&mut self) {
        self.step(-1);
    }

    pub fn next(&mut self) {
        self.step(1);
    }

    /// Navigation stops at the edges of the representable calendar.
    fn step(&mut self, delta: i32) {
        let (year, month) = shift_month(self.year, self.month, delta);
        if !year_range().contains(&year) {
            debug!(year = self.year, month = self.month, "calendar at its last month");
            return;
        }
        (self.year, self.month) = (year, month);
    }

    pub fn title(&self) -> String {
        first_of(self.year, self.month).format("%B %Y").to_string()
    }

    pub fn render(&self, assignments: &[Assignment]) -> CalendarGrid {
        let (year, month) = (self.year, self.month);
        let leading = first_weekday(year, month);
        let days = days_in_month(year, month);
        let (prev_year, prev_month) = shift_month(year, month, -1);
        let days_in_prev = days_in_month(prev_year, prev_month);

        let mut cells = Vec::with_capacity(42);

        for i in 0..leading {
            cells.push(DayCell::other_month(days_in_prev - leading + 1 + i));
        }

        for (date, day) in first_of(year, month).iter_days().zip(1..=days) {
            let markers = assignments
                .iter()
                .filter(|a| a.due_date == date)
                .map(|a| Marker {
                    assignment_id: a.id,
                    title: a.title.clone(),
                    kind: a.kind,
                    past_due: a.due_date < self.today,
                })
                .collect();
            cells.push(DayCell {
                day,
                in_month: true,
                current: date == self.today,
                markers,
            });
        }

        let trailing = (7 - (leading + days) % 7) % 7;
        for day in 1..=trailing {
            cells.push(DayCell::other_month(day));
        }

        debug!(year, month, cells = cells.len(), "calendar rendered");

        CalendarGrid {
            title: self.title(),
            year,
            month,
            cells,
        }
    }
}
