//! Current-streak computation from check-in history.
//!
//! A streak is the count of consecutive calendar days, ending today or
//! yesterday, with an unbroken check-in each day. "Calendar day" means a
//! `NaiveDate` in UTC everywhere -- the ledger, this module, and the
//! progression engine all agree on the zone, so the contiguity test is
//! immune to daylight-saving shifts.

use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Compute the current consecutive-day streak.
///
/// Duplicates in `dates` are tolerated even though the ledger's
/// `(email, date)` uniqueness should make them impossible. A streak is
/// only alive if the most recent check-in was today or yesterday; a
/// missed day resets it to zero outright.
pub fn streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let unique: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    let newest = match unique.iter().next_back() {
        Some(&d) => d,
        None => return 0,
    };

    let yesterday = match today.pred_opt() {
        Some(d) => d,
        None => return 0,
    };
    if newest != today && newest != yesterday {
        return 0;
    }

    let mut count = 0;
    let mut expected = newest;
    for &date in unique.iter().rev() {
        if date != expected {
            break;
        }
        count += 1;
        expected = match expected.pred_opt() {
            Some(d) => d,
            None => break,
        };
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn empty_history_has_no_streak() {
        assert_eq!(streak(&[], d(2024, 3, 10)), 0);
    }

    #[test]
    fn single_checkin_today() {
        assert_eq!(streak(&[d(2024, 3, 10)], d(2024, 3, 10)), 1);
    }

    #[test]
    fn single_checkin_yesterday_keeps_streak_alive() {
        assert_eq!(streak(&[d(2024, 3, 9)], d(2024, 3, 10)), 1);
    }

    #[test]
    fn stale_history_resets_to_zero() {
        // Newest check-in two days ago: broken, not merely paused.
        assert_eq!(streak(&[d(2024, 3, 7), d(2024, 3, 8)], d(2024, 3, 10)), 0);
    }

    #[test]
    fn contiguous_run_counts_back_from_newest() {
        let dates = [d(2024, 3, 8), d(2024, 3, 9), d(2024, 3, 10)];
        assert_eq!(streak(&dates, d(2024, 3, 10)), 3);
    }

    #[test]
    fn gap_stops_the_count() {
        // 13th is contiguous with nothing: the 11th is missing.
        let dates = [d(2024, 3, 9), d(2024, 3, 10), d(2024, 3, 12), d(2024, 3, 13)];
        assert_eq!(streak(&dates, d(2024, 3, 13)), 2);
    }

    #[test]
    fn skip_day_scenario_from_scratch() {
        let mut dates = vec![];
        assert_eq!(streak(&dates, d(2024, 3, 10)), 0);
        dates.push(d(2024, 3, 10));
        assert_eq!(streak(&dates, d(2024, 3, 10)), 1);
        dates.push(d(2024, 3, 11));
        assert_eq!(streak(&dates, d(2024, 3, 11)), 2);
        // Skip the 12th entirely.
        dates.push(d(2024, 3, 13));
        assert_eq!(streak(&dates, d(2024, 3, 13)), 1);
    }

    #[test]
    fn duplicates_collapse_to_one_day() {
        let dates = [d(2024, 3, 10), d(2024, 3, 10), d(2024, 3, 10)];
        assert_eq!(streak(&dates, d(2024, 3, 10)), 1);
    }

    #[test]
    fn run_across_month_boundary() {
        // Calendar-day arithmetic, not 24h offsets: Feb 29 -> Mar 1 in a
        // leap year is contiguous.
        let dates = [d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1)];
        assert_eq!(streak(&dates, d(2024, 3, 1)), 3);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_date() -> impl Strategy<Value = NaiveDate> {
            (0i64..4000).prop_map(|offset| {
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Duration::days(offset)
            })
        }

        proptest! {
            #[test]
            fn never_exceeds_distinct_date_count(
                dates in proptest::collection::vec(arb_date(), 0..50),
                today in arb_date(),
            ) {
                let distinct: std::collections::HashSet<_> = dates.iter().collect();
                prop_assert!(streak(&dates, today) as usize <= distinct.len());
            }

            #[test]
            fn zero_when_newest_is_older_than_yesterday(
                dates in proptest::collection::vec(arb_date(), 1..50),
                gap in 2i64..365,
            ) {
                let newest = *dates.iter().max().unwrap();
                let today = newest + chrono::Duration::days(gap);
                prop_assert_eq!(streak(&dates, today), 0);
            }

            #[test]
            fn full_run_counts_its_length(
                start in arb_date(),
                len in 1u32..60,
            ) {
                let dates: Vec<_> = (0..len)
                    .map(|i| start + chrono::Duration::days(i as i64))
                    .collect();
                let today = *dates.last().unwrap();
                prop_assert_eq!(streak(&dates, today), len);
            }
        }
    }
}
