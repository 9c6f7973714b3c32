use chrono::{Datelike, Months, NaiveDate};

use super::entity::TimelineEntity;

/// The month-aligned date window shared by every bar in one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRange {
    /// First day of the month holding the earliest start.
    pub min_date: NaiveDate,
    /// Last day of the month holding the latest end.
    pub max_date: NaiveDate,
    /// Month starts from `min_date` through `max_date`, in order.
    pub months: Vec<NaiveDate>,
}

impl TimelineRange {
    /// Compute the range over every entity that has both dates.
    ///
    /// Returns `None` when nothing is dated; the caller shows an empty state
    /// instead of laying anything out.
    pub fn from_entities<'a, I>(entities: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a TimelineEntity>,
    {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for (start, end) in entities.into_iter().filter_map(TimelineEntity::dates) {
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(start), hi.max(end)),
                None => (start, end),
            });
        }
        let (earliest, latest) = bounds?;
        Some(Self::spanning(earliest, latest))
    }

    /// Range covering `earliest..=latest`, rounded outward to whole months.
    pub fn spanning(earliest: NaiveDate, latest: NaiveDate) -> Self {
        let min_date = first_of_month(earliest.min(latest));
        let max_date = last_of_month(latest.max(earliest));

        let mut months = Vec::new();
        let mut cursor = min_date;
        while cursor <= max_date {
            months.push(cursor);
            match cursor.checked_add_months(Months::new(1)) {
                Some(next) => cursor = next,
                None => break,
            }
        }

        Self {
            min_date,
            max_date,
            months,
        }
    }

    /// Denominator for every percentage computed against this range.
    pub fn total_days(&self) -> i64 {
        (self.max_date - self.min_date).num_days()
    }

    /// Percentage offset of a date from `min_date`.
    pub fn date_to_percent(&self, date: NaiveDate) -> f64 {
        let total = self.total_days();
        if total <= 0 {
            return 0.0;
        }
        (date - self.min_date).num_days() as f64 / total as f64 * 100.0
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min_date <= date && date <= self.max_date
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Horizontal zoom of the chart. Percentages become pixels through
/// `chart_width`.
#[derive(Debug, Clone)]
pub struct TimelineViewport {
    /// Pixels per day (controls zoom level).
    pub pixels_per_day: f32,
}

pub const DEFAULT_PIXELS_PER_DAY: f32 = 12.0;

impl Default for TimelineViewport {
    fn default() -> Self {
        Self {
            pixels_per_day: DEFAULT_PIXELS_PER_DAY,
        }
    }
}

impl TimelineViewport {
    /// Width of the chart canvas for a range, never narrower than `min_width`.
    pub fn chart_width(&self, range: &TimelineRange, min_width: f32) -> f32 {
        (range.total_days() as f32 * self.pixels_per_day).max(min_width)
    }

    /// Zoom in (increase pixels per day).
    pub fn zoom_in(&mut self) {
        self.pixels_per_day = (self.pixels_per_day * 1.2).min(80.0);
    }

    /// Zoom out (decrease pixels per day).
    pub fn zoom_out(&mut self) {
        self.pixels_per_day = (self.pixels_per_day / 1.2).max(1.0);
    }

    pub fn zoom_percent(&self) -> f32 {
        self.pixels_per_day / DEFAULT_PIXELS_PER_DAY * 100.0
    }
}
