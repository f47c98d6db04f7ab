//! Ideal-burndown projection.
//!
//! The reference line runs from `word_goal` at the start date straight down
//! to zero at the goal date. It is evaluated on whole elapsed days, so a
//! sample taken any time on day five sits on the same ideal value.

use chrono::{DateTime, NaiveDate, Utc};

/// Whole days between the start and goal dates.
pub fn total_days(start_date: NaiveDate, goal_date: NaiveDate) -> i64 {
    (goal_date - start_date).num_days()
}

/// Words that should remain at instant `t` if progress were perfectly linear.
///
/// Callers must have validated `goal_date > start_date` (project creation
/// enforces it). The line is not clamped: past the goal date it goes
/// negative, which is what the chart wants for a reference line.
pub fn ideal_remaining(
    start_date: NaiveDate,
    goal_date: NaiveDate,
    word_goal: i64,
    t: DateTime<Utc>,
) -> f64 {
    let total = total_days(start_date, goal_date);
    debug_assert!(total > 0, "goal_date must be after start_date");
    let elapsed = (t.date_naive() - start_date).num_days();
    word_goal as f64 - (word_goal as f64 / total as f64) * elapsed as f64
}

/// True when `words_remaining` is at or below the ideal line at instant `t`.
pub fn on_schedule(
    start_date: NaiveDate,
    goal_date: NaiveDate,
    word_goal: i64,
    words_remaining: i64,
    t: DateTime<Utc>,
) -> bool {
    words_remaining as f64 <= ideal_remaining(start_date, goal_date, word_goal, t)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::{ideal_remaining, on_schedule, total_days};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn ideal_line_hits_word_goal_at_start_and_zero_at_goal() {
        let start = date(2024, 1, 1);
        let goal = date(2024, 1, 11);
        let at_start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let at_goal = Utc.with_ymd_and_hms(2024, 1, 11, 9, 0, 0).unwrap();

        assert_eq!(ideal_remaining(start, goal, 10_000, at_start), 10_000.0);
        assert_eq!(ideal_remaining(start, goal, 10_000, at_goal), 0.0);
    }

    #[test]
    fn ideal_line_is_linear_between_endpoints() {
        let start = date(2024, 1, 1);
        let goal = date(2024, 1, 11);
        let midway = Utc.with_ymd_and_hms(2024, 1, 6, 12, 30, 0).unwrap();

        assert_eq!(ideal_remaining(start, goal, 10_000, midway), 5_000.0);
    }

    #[test]
    fn ideal_line_goes_negative_past_the_goal_date() {
        let start = date(2024, 1, 1);
        let goal = date(2024, 1, 11);
        let late = Utc.with_ymd_and_hms(2024, 1, 21, 0, 0, 0).unwrap();

        assert_eq!(ideal_remaining(start, goal, 10_000, late), -10_000.0);
    }

    #[test]
    fn actual_above_the_line_means_behind_schedule() {
        let start = date(2024, 1, 1);
        let goal = date(2024, 1, 11);
        let midway = Utc.with_ymd_and_hms(2024, 1, 6, 0, 0, 0).unwrap();

        assert!(!on_schedule(start, goal, 10_000, 6_000, midway));
        assert!(on_schedule(start, goal, 10_000, 5_000, midway));
        assert!(on_schedule(start, goal, 10_000, 4_200, midway));
    }

    #[test]
    fn total_days_counts_whole_days() {
        assert_eq!(total_days(date(2024, 1, 1), date(2024, 1, 11)), 10);
        assert_eq!(total_days(date(2024, 1, 11), date(2024, 1, 1)), -10);
    }
}
