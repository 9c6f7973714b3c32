use super::entity::TimelineEntity;
use super::timeline::TimelineRange;

/// Minimum width, in percent, of a task bar so short tasks stay clickable.
pub const MIN_TASK_WIDTH_PERCENT: f64 = 2.0;

/// Which kind of row a bar belongs to. Only tasks get the minimum width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Project,
    Task,
}

/// Horizontal placement of a bar, in percent of the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarPosition {
    pub left: f64,
    pub width: f64,
}

impl BarPosition {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Pixel x offset and width on a chart `chart_width` pixels wide.
    pub fn to_pixels(&self, chart_width: f32) -> (f32, f32) {
        let scale = chart_width as f64 / 100.0;
        ((self.left * scale) as f32, (self.width * scale) as f32)
    }
}

/// Place `entity` on `range`. Returns `None` for entities missing a date;
/// those rows get no bar at all.
///
/// Milestones are placed like any other task: the renderer draws a diamond
/// at `left` and ignores `width`.
pub fn position(entity: &TimelineEntity, range: &TimelineRange, tier: Tier) -> Option<BarPosition> {
    let (start, end) = entity.dates()?;
    let total_days = range.total_days();
    if total_days <= 0 {
        return Some(BarPosition {
            left: 0.0,
            width: 0.0,
        });
    }
    let total = total_days as f64;

    let start_days = (start - range.min_date).num_days() as f64;
    let duration = (end - start).num_days().max(0) as f64;

    let left = start_days / total * 100.0;
    let mut width = duration / total * 100.0;

    if tier == Tier::Task {
        width = width
            .max(MIN_TASK_WIDTH_PERCENT)
            .min((100.0 - left).max(0.0));
    }

    Some(BarPosition { left, width })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january() -> TimelineRange {
        TimelineRange::spanning(date(2024, 1, 10), date(2024, 1, 20))
    }

    #[test]
    fn january_example_lands_at_thirty_percent() {
        let e = TimelineEntity::new("a", "a", Some(date(2024, 1, 10)), Some(date(2024, 1, 20)));
        let range = TimelineRange::from_entities([&e]).unwrap();
        let pos = position(&e, &range, Tier::Project).unwrap();
        assert!((pos.left - 30.0).abs() < 1e-9);
        assert!((pos.width - 33.333).abs() < 0.01);
    }

    #[test]
    fn missing_dates_give_no_position() {
        let range = january();
        let no_start = TimelineEntity::new("a", "a", None, Some(date(2024, 1, 5)));
        let no_end = TimelineEntity::new("b", "b", Some(date(2024, 1, 5)), None);
        assert_eq!(position(&no_start, &range, Tier::Task), None);
        assert_eq!(position(&no_end, &range, Tier::Project), None);
    }

    #[test]
    fn short_tasks_get_minimum_width_but_projects_do_not() {
        let range = january();
        let one_day = TimelineEntity::new("a", "a", Some(date(2024, 1, 3)), Some(date(2024, 1, 3)));
        let task = position(&one_day, &range, Tier::Task).unwrap();
        let project = position(&one_day, &range, Tier::Project).unwrap();
        assert_eq!(task.width, MIN_TASK_WIDTH_PERCENT);
        assert_eq!(project.width, 0.0);
        assert_eq!(task.left, project.left);
    }

    #[test]
    fn minimum_width_never_overflows_right_edge() {
        let range = january();
        let last_day = TimelineEntity::new_milestone("m", "Ship", date(2024, 1, 31));
        let pos = position(&last_day, &range, Tier::Task).unwrap();
        assert!((pos.left - 100.0).abs() < 1e-9);
        assert!(pos.right() <= 100.0 + 0.1);
    }

    #[test]
    fn milestone_gets_a_computed_width() {
        let range = january();
        let m = TimelineEntity::new_milestone("m", "Review", date(2024, 1, 16));
        let pos = position(&m, &range, Tier::Task).unwrap();
        assert!((pos.left - 50.0).abs() < 1e-9);
        assert_eq!(pos.width, MIN_TASK_WIDTH_PERCENT);
    }

    #[test]
    fn positions_stay_inside_the_range() {
        let entities = vec![
            TimelineEntity::new("a", "a", Some(date(2024, 2, 1)), Some(date(2024, 3, 15))),
            TimelineEntity::new("b", "b", Some(date(2024, 3, 20)), Some(date(2024, 6, 30))),
            TimelineEntity::new("c", "c", Some(date(2024, 6, 29)), Some(date(2024, 6, 30))),
        ];
        let range = TimelineRange::from_entities(&entities).unwrap();
        for e in &entities {
            for tier in [Tier::Project, Tier::Task] {
                let pos = position(e, &range, tier).unwrap();
                assert!((0.0..=100.0).contains(&pos.left));
                assert!(pos.width >= 0.0);
                assert!(pos.right() <= 100.1, "{} overflows: {:?}", e.id, pos);
            }
        }
    }

    #[test]
    fn position_is_pure() {
        let range = january();
        let e = TimelineEntity::new("a", "a", Some(date(2024, 1, 4)), Some(date(2024, 1, 9)));
        assert_eq!(position(&e, &range, Tier::Task), position(&e, &range, Tier::Task));
    }

    #[test]
    fn reversed_dates_never_produce_negative_width() {
        let range = january();
        let mut e = TimelineEntity::new("a", "a", Some(date(2024, 1, 4)), Some(date(2024, 1, 9)));
        // Bypass the constructor's normalization.
        e.end = Some(date(2024, 1, 2));
        let pos = position(&e, &range, Tier::Project).unwrap();
        assert_eq!(pos.width, 0.0);
    }

    #[test]
    fn pixels_scale_linearly() {
        let pos = BarPosition {
            left: 25.0,
            width: 10.0,
        };
        assert_eq!(pos.to_pixels(800.0), (200.0, 80.0));
    }
}
