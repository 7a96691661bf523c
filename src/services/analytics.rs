//! Streak, weekly-mood and calendar aggregation.
//!
//! Pure functions over an in-memory snapshot of one user's entries. Handlers
//! fetch the rows; nothing here touches the database or shared state, so the
//! functions can run concurrently for different users without coordination.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::models::entry::Mood;

/// One entry reduced to the fields analytics cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodSample {
    pub date: NaiveDate,
    pub mood: Mood,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StreakResult {
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MoodCount {
    pub mood: Mood,
    pub count: u32,
}

#[derive(Debug, Serialize)]
pub struct WeeklyMoodPoint {
    pub date: NaiveDate,
    pub moods: Vec<MoodCount>,
}

#[derive(Debug, Serialize, Default)]
pub struct CalendarDay {
    pub count: u32,
    pub moods: Vec<Mood>,
}

/// Convert fetched `(entry_date, mood label)` rows into samples, dropping
/// rows whose label is outside the closed mood set. The enum column makes
/// that impossible under normal operation, but a defective upstream record
/// must be skipped rather than crash the computation.
pub fn snapshot_from_rows(rows: Vec<(NaiveDate, String)>) -> Vec<MoodSample> {
    rows.into_iter()
        .filter_map(|(date, label)| match Mood::from_label(&label) {
            Some(mood) => Some(MoodSample { date, mood }),
            None => {
                tracing::warn!(%date, label = %label, "Skipping entry with unrecognized mood label");
                None
            }
        })
        .collect()
}

/// Current and longest consecutive-day streaks over a user's entry dates.
///
/// Policy for the current streak: it counts consecutive days ending at the
/// most recent day that has an entry, provided that day is `today` or
/// yesterday. A run that ended yesterday is still "current" (the user has
/// until midnight to extend it); anything older means the streak is 0.
pub fn compute_streak<I>(dates: I, today: NaiveDate) -> StreakResult
where
    I: IntoIterator<Item = NaiveDate>,
{
    let dates: BTreeSet<NaiveDate> = dates.into_iter().collect();
    if dates.is_empty() {
        return StreakResult {
            current_streak: 0,
            longest_streak: 0,
        };
    }

    let yesterday = today - Duration::days(1);
    let anchor = if dates.contains(&today) {
        Some(today)
    } else if dates.contains(&yesterday) {
        Some(yesterday)
    } else {
        None
    };

    let mut current_streak = 0u32;
    if let Some(mut day) = anchor {
        while dates.contains(&day) {
            current_streak += 1;
            day -= Duration::days(1);
        }
    }

    // Longest: walk distinct dates ascending; a one-day step extends the
    // run, anything else starts a new run of 1.
    let mut longest_streak = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for &date in &dates {
        run = match prev {
            Some(p) if date == p + Duration::days(1) => run + 1,
            _ => 1,
        };
        longest_streak = longest_streak.max(run);
        prev = Some(date);
    }

    StreakResult {
        current_streak,
        longest_streak,
    }
}

/// Mood counts per day for the inclusive window `[reference-6, reference]`.
///
/// Always returns exactly 7 points in ascending date order; days without
/// entries carry an empty `moods` list. Within a day, moods appear in
/// first-seen order of the input slice.
pub fn compute_weekly_mood(samples: &[MoodSample], reference: NaiveDate) -> Vec<WeeklyMoodPoint> {
    let start = reference - Duration::days(6);

    let mut by_day: BTreeMap<NaiveDate, Vec<MoodCount>> = BTreeMap::new();
    for sample in samples {
        if sample.date < start || sample.date > reference {
            continue;
        }
        let day = by_day.entry(sample.date).or_default();
        match day.iter_mut().find(|mc| mc.mood == sample.mood) {
            Some(mc) => mc.count += 1,
            None => day.push(MoodCount {
                mood: sample.mood,
                count: 1,
            }),
        }
    }

    (0..7)
        .map(|offset| {
            let date = start + Duration::days(offset);
            WeeklyMoodPoint {
                date,
                moods: by_day.remove(&date).unwrap_or_default(),
            }
        })
        .collect()
}

/// First and last calendar day of a month, or `None` for an invalid
/// year/month combination. Callers validate input with this before asking
/// for a calendar.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, next_month - Duration::days(1)))
}

/// Sparse per-day aggregation for one month: `YYYY-MM-DD` -> entry count and
/// the moods recorded that day (duplicates preserved, insertion order).
/// Days without entries have no key, unlike the dense weekly output.
pub fn compute_calendar(
    samples: &[MoodSample],
    year: i32,
    month: u32,
) -> BTreeMap<String, CalendarDay> {
    let Some((start, end)) = month_bounds(year, month) else {
        return BTreeMap::new();
    };

    let mut calendar: BTreeMap<String, CalendarDay> = BTreeMap::new();
    for sample in samples {
        if sample.date < start || sample.date > end {
            continue;
        }
        let day = calendar
            .entry(sample.date.format("%Y-%m-%d").to_string())
            .or_default();
        day.count += 1;
        day.moods.push(sample.mood);
    }
    calendar
}

/// Most frequent mood in a day's list. Ties go to the mood encountered
/// first, so the result is stable for a given insertion order.
pub fn dominant_mood(moods: &[Mood]) -> Option<Mood> {
    let mut counts: Vec<(Mood, u32)> = Vec::new();
    for &mood in moods {
        match counts.iter_mut().find(|(m, _)| *m == mood) {
            Some((_, n)) => *n += 1,
            None => counts.push((mood, 1)),
        }
    }

    let mut best: Option<(Mood, u32)> = None;
    for (mood, n) in counts {
        if best.map_or(true, |(_, bn)| n > bn) {
            best = Some((mood, n));
        }
    }
    best.map(|(mood, _)| mood)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample(y: i32, m: u32, day: u32, mood: Mood) -> MoodSample {
        MoodSample {
            date: d(y, m, day),
            mood,
        }
    }

    #[test]
    fn streak_empty_input_is_zero() {
        let result = compute_streak(std::iter::empty(), d(2024, 5, 5));
        assert_eq!(
            result,
            StreakResult {
                current_streak: 0,
                longest_streak: 0
            }
        );
    }

    #[test]
    fn streak_consecutive_days_ending_today() {
        let today = d(2024, 5, 10);
        let dates = (6..=10).map(|day| d(2024, 5, day));
        let result = compute_streak(dates, today);
        assert_eq!(result.current_streak, 5);
        assert_eq!(result.longest_streak, 5);
    }

    #[test]
    fn streak_gap_splits_runs() {
        // 01-03 run of 3, gap at 04, single entry on 05 (= today)
        let dates = vec![d(2024, 5, 1), d(2024, 5, 2), d(2024, 5, 3), d(2024, 5, 5)];
        let result = compute_streak(dates, d(2024, 5, 5));
        assert_eq!(result.current_streak, 1);
        assert_eq!(result.longest_streak, 3);
    }

    #[test]
    fn streak_longest_is_max_of_two_runs() {
        // run of 2, gap, run of 4
        let dates = vec![
            d(2024, 3, 1),
            d(2024, 3, 2),
            d(2024, 3, 10),
            d(2024, 3, 11),
            d(2024, 3, 12),
            d(2024, 3, 13),
        ];
        let result = compute_streak(dates, d(2024, 3, 20));
        assert_eq!(result.longest_streak, 4);
        assert_eq!(result.current_streak, 0);
    }

    #[test]
    fn streak_ending_yesterday_still_counts() {
        let today = d(2024, 5, 10);
        let dates = vec![d(2024, 5, 7), d(2024, 5, 8), d(2024, 5, 9)];
        let result = compute_streak(dates, today);
        assert_eq!(result.current_streak, 3);
    }

    #[test]
    fn streak_ending_before_yesterday_is_not_current() {
        let today = d(2024, 5, 10);
        let dates = vec![d(2024, 5, 6), d(2024, 5, 7), d(2024, 5, 8)];
        let result = compute_streak(dates, today);
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 3);
    }

    #[test]
    fn streak_duplicate_dates_count_once() {
        let dates = vec![d(2024, 5, 4), d(2024, 5, 5), d(2024, 5, 5), d(2024, 5, 5)];
        let result = compute_streak(dates, d(2024, 5, 5));
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.longest_streak, 2);
    }

    #[test]
    fn streak_single_entry_today() {
        let result = compute_streak(vec![d(2024, 5, 5)], d(2024, 5, 5));
        assert_eq!(result.current_streak, 1);
        assert_eq!(result.longest_streak, 1);
    }

    #[test]
    fn weekly_always_seven_ascending_points() {
        let points = compute_weekly_mood(&[], d(2024, 5, 7));
        assert_eq!(points.len(), 7);
        assert_eq!(points[0].date, d(2024, 5, 1));
        assert_eq!(points[6].date, d(2024, 5, 7));
        for pair in points.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
        assert!(points.iter().all(|p| p.moods.is_empty()));
    }

    #[test]
    fn weekly_concrete_scenario() {
        // Reference 2024-05-07: happy x2 on 05-05, sad on 05-07.
        let samples = vec![
            sample(2024, 5, 5, Mood::Happy),
            sample(2024, 5, 5, Mood::Happy),
            sample(2024, 5, 7, Mood::Sad),
        ];
        let points = compute_weekly_mood(&samples, d(2024, 5, 7));
        assert_eq!(points.len(), 7);

        let day5 = &points[4];
        assert_eq!(day5.date, d(2024, 5, 5));
        assert_eq!(
            day5.moods,
            vec![MoodCount {
                mood: Mood::Happy,
                count: 2
            }]
        );

        let day6 = &points[5];
        assert_eq!(day6.date, d(2024, 5, 6));
        assert!(day6.moods.is_empty());

        let day7 = &points[6];
        assert_eq!(day7.date, d(2024, 5, 7));
        assert_eq!(
            day7.moods,
            vec![MoodCount {
                mood: Mood::Sad,
                count: 1
            }]
        );
    }

    #[test]
    fn weekly_ignores_samples_outside_window() {
        let samples = vec![
            sample(2024, 4, 30, Mood::Calm), // day before window
            sample(2024, 5, 8, Mood::Calm),  // day after window
            sample(2024, 5, 3, Mood::Calm),
        ];
        let points = compute_weekly_mood(&samples, d(2024, 5, 7));
        let total: u32 = points
            .iter()
            .flat_map(|p| p.moods.iter())
            .map(|mc| mc.count)
            .sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn weekly_multiple_moods_keep_first_seen_order() {
        let samples = vec![
            sample(2024, 5, 7, Mood::Anxious),
            sample(2024, 5, 7, Mood::Happy),
            sample(2024, 5, 7, Mood::Anxious),
        ];
        let points = compute_weekly_mood(&samples, d(2024, 5, 7));
        assert_eq!(
            points[6].moods,
            vec![
                MoodCount {
                    mood: Mood::Anxious,
                    count: 2
                },
                MoodCount {
                    mood: Mood::Happy,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn month_bounds_regular_and_leap() {
        assert_eq!(
            month_bounds(2024, 2),
            Some((d(2024, 2, 1), d(2024, 2, 29)))
        );
        assert_eq!(
            month_bounds(2023, 2),
            Some((d(2023, 2, 1), d(2023, 2, 28)))
        );
        assert_eq!(
            month_bounds(2024, 12),
            Some((d(2024, 12, 1), d(2024, 12, 31)))
        );
        assert_eq!(month_bounds(2024, 13), None);
        assert_eq!(month_bounds(2024, 0), None);
    }

    #[test]
    fn calendar_is_sparse_and_counts_match() {
        let samples = vec![
            sample(2024, 5, 1, Mood::Happy),
            sample(2024, 5, 1, Mood::Sad),
            sample(2024, 5, 15, Mood::Calm),
            sample(2024, 6, 1, Mood::Happy), // outside requested month
        ];
        let calendar = compute_calendar(&samples, 2024, 5);
        assert_eq!(calendar.len(), 2);
        assert!(!calendar.contains_key("2024-05-02"));

        let first = &calendar["2024-05-01"];
        assert_eq!(first.count, 2);
        assert_eq!(first.count as usize, first.moods.len());
        assert_eq!(first.moods, vec![Mood::Happy, Mood::Sad]);

        let mid = &calendar["2024-05-15"];
        assert_eq!(mid.count, 1);
        assert_eq!(mid.moods, vec![Mood::Calm]);
    }

    #[test]
    fn calendar_empty_input_is_empty_map() {
        assert!(compute_calendar(&[], 2024, 5).is_empty());
    }

    #[test]
    fn calendar_includes_leap_day() {
        let samples = vec![sample(2024, 2, 29, Mood::Grateful)];
        let calendar = compute_calendar(&samples, 2024, 2);
        assert_eq!(calendar["2024-02-29"].count, 1);
    }

    #[test]
    fn dominant_mood_prefers_most_frequent() {
        let moods = vec![Mood::Sad, Mood::Happy, Mood::Happy];
        assert_eq!(dominant_mood(&moods), Some(Mood::Happy));
    }

    #[test]
    fn dominant_mood_tie_breaks_on_first_encountered() {
        let moods = vec![Mood::Sad, Mood::Happy, Mood::Happy, Mood::Sad];
        assert_eq!(dominant_mood(&moods), Some(Mood::Sad));
        assert_eq!(dominant_mood(&[]), None);
    }

    #[test]
    fn snapshot_skips_malformed_mood_labels() {
        let rows = vec![
            (d(2024, 5, 1), "happy".to_string()),
            (d(2024, 5, 2), "over the moon".to_string()),
            (d(2024, 5, 3), "calm".to_string()),
        ];
        let samples = snapshot_from_rows(rows);
        assert_eq!(
            samples,
            vec![sample(2024, 5, 1, Mood::Happy), sample(2024, 5, 3, Mood::Calm)]
        );
    }
}
