//! Month grid arithmetic behind the date picker.

use time::{Date, Month, macros::format_description};

pub const WEEKDAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Parse a `YYYY-MM-DD` picker value.
pub fn parse_calendar_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).ok()
}

pub fn format_calendar_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthView {
    pub year: i32,
    pub month: Month,
}

impl MonthView {
    pub fn new(year: i32, month: Month) -> Self {
        MonthView { year, month }
    }

    pub fn containing(date: Date) -> Self {
        MonthView::new(date.year(), date.month())
    }

    fn ordinal(&self) -> (i32, u8) {
        (self.year, u8::from(self.month))
    }

    pub fn days_in_month(&self) -> u8 {
        self.month.length(self.year)
    }

    /// Weekday of the 1st, Sunday = 0.
    pub fn first_weekday(&self) -> u8 {
        Date::from_calendar_date(self.year, self.month, 1)
            .map(|date| date.weekday().number_days_from_sunday())
            .unwrap_or(0)
    }

    /// Weeks of seven cells; `None` pads before the 1st and after the last day.
    pub fn rows(&self) -> Vec<[Option<u8>; 7]> {
        let mut cells: Vec<Option<u8>> = vec![None; self.first_weekday() as usize];
        cells.extend((1..=self.days_in_month()).map(Some));
        cells
            .chunks(7)
            .map(|chunk| {
                let mut row = [None; 7];
                row[..chunk.len()].copy_from_slice(chunk);
                row
            })
            .collect()
    }

    pub fn prev(&self) -> Self {
        match self.month {
            Month::January => MonthView::new(self.year - 1, Month::December),
            month => MonthView::new(self.year, month.previous()),
        }
    }

    pub fn next(&self) -> Self {
        match self.month {
            Month::December => MonthView::new(self.year + 1, Month::January),
            month => MonthView::new(self.year, month.next()),
        }
    }

    pub fn date(&self, day: u8) -> Option<Date> {
        Date::from_calendar_date(self.year, self.month, day).ok()
    }

    pub fn title(&self) -> String {
        format!("{} {}", self.month, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePicker {
    pub view: MonthView,
    pub selected: Option<Date>,
    pub min: Option<Date>,
}

impl DatePicker {
    /// Opens on the selected date's month, else on `today`'s.
    pub fn new(selected: Option<Date>, min: Option<Date>, today: Date) -> Self {
        DatePicker {
            view: MonthView::containing(selected.unwrap_or(today)),
            selected,
            min,
        }
    }

    pub fn is_disabled(&self, day: u8) -> bool {
        match (self.view.date(day), self.min) {
            (None, _) => true,
            (Some(date), Some(min)) => date < min,
            (Some(_), None) => false,
        }
    }

    pub fn is_selected(&self, day: u8) -> bool {
        self.selected.is_some() && self.view.date(day) == self.selected
    }

    pub fn can_go_prev(&self) -> bool {
        match self.min {
            Some(min) => self.view.ordinal() > MonthView::containing(min).ordinal(),
            None => true,
        }
    }

    pub fn go_prev(&mut self) {
        if self.can_go_prev() {
            self.view = self.view.prev();
        }
    }

    pub fn go_next(&mut self) {
        self.view = self.view.next();
    }

    /// Select `day` of the viewed month, returning its ISO date unless disabled.
    pub fn select(&mut self, day: u8) -> Option<String> {
        if self.is_disabled(day) {
            return None;
        }
        let date = self.view.date(day)?;
        self.selected = Some(date);
        Some(format_calendar_date(date))
    }
}
