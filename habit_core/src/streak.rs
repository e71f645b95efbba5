//! Streak calculation over a habit's completion set.
//!
//! Nothing here is cached: every query recomputes from the completion set,
//! so adding, back-filling or removing a day can never leave a stale count.
//!
//! ## Rules
//!
//! 1. **Anchor**: the most recent completion on or before the evaluation day.
//!    No anchor means streak 0.
//! 2. **Pending day**: an uncompleted evaluation day has simply not been
//!    extended yet; it is never counted as missed.
//! 3. **Missed days**: every day strictly between the anchor and the
//!    evaluation day, and every gap day inside the run, draws on one budget
//!    of `max_missed_days` (zero when missed days are not allowed).
//! 4. The run ends at the first gap the remaining budget cannot absorb. The
//!    streak is the number of *completed* days in the run.

use crate::{CalendarDay, CompletionSet, StreakPolicy};

/// Current streak and broken verdict for one evaluation day
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreakReport {
    pub current: u32,
    pub broken: bool,
}

/// Count completed days in the run that is live on `today`
pub fn current_streak(
    completions: &CompletionSet,
    policy: StreakPolicy,
    today: CalendarDay,
) -> u32 {
    let Some(anchor) = completions.latest_on_or_before(today) else {
        return 0;
    };

    let budget = u64::from(policy.missed_day_budget());
    let leading_gap = gap_between(anchor, today);
    if leading_gap > budget {
        return 0;
    }

    let mut remaining = budget - leading_gap;
    let mut streak: u32 = 1;
    let mut newest = anchor;

    for earlier in completions.iter_through(anchor).rev().skip(1) {
        let gap = gap_between(earlier, newest);
        if gap > remaining {
            break;
        }
        remaining -= gap;
        streak = streak.saturating_add(1);
        newest = earlier;
    }

    streak
}

/// True when the habit has no completions, or when letting one more day pass
/// without a completion would reset the streak to zero
pub fn is_streak_broken(
    completions: &CompletionSet,
    policy: StreakPolicy,
    today: CalendarDay,
) -> bool {
    let Some(anchor) = completions.latest_on_or_before(today) else {
        return true;
    };

    // Days between the anchor and tomorrow: today becomes a missed day.
    let gap_through_today = u64::try_from(anchor.days_until(today)).unwrap_or(0);
    gap_through_today > u64::from(policy.missed_day_budget())
}

/// Both queries for one evaluation day
pub fn evaluate(
    completions: &CompletionSet,
    policy: StreakPolicy,
    today: CalendarDay,
) -> StreakReport {
    StreakReport {
        current: current_streak(completions, policy, today),
        broken: is_streak_broken(completions, policy, today),
    }
}

/// Number of days strictly between `earlier` and `later`
fn gap_between(earlier: CalendarDay, later: CalendarDay) -> u64 {
    u64::try_from(earlier.days_until(later) - 1).unwrap_or(0)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn base() -> CalendarDay {
        CalendarDay::from_ymd(2023, 12, 1).unwrap()
    }

    fn offset(n: u32) -> CalendarDay {
        CalendarDay::from(base().date() + chrono::Duration::days(i64::from(n)))
    }

    fn policy_strategy() -> impl Strategy<Value = StreakPolicy> {
        (any::<bool>(), 0u32..5).prop_map(|(allow_missed_days, max_missed_days)| StreakPolicy {
            allow_missed_days,
            max_missed_days,
        })
    }

    proptest! {
        /// Property: a gap-free run ending on the evaluation day counts every day
        #[test]
        fn test_gap_free_run_counts_all_days(start in 0u32..200, len in 1u32..60) {
            let completions: CompletionSet = (start..start + len).map(offset).collect();
            let today = offset(start + len - 1);
            prop_assert_eq!(current_streak(&completions, StreakPolicy::STRICT, today), len);
        }

        /// Property: adding an already present day changes nothing
        #[test]
        fn test_add_is_idempotent(
            days in prop::collection::btree_set(0u32..90, 1..40),
            pick in any::<prop::sample::Index>(),
            today in 0u32..100,
            policy in policy_strategy(),
        ) {
            let mut completions: CompletionSet = days.iter().copied().map(offset).collect();
            let before = completions.clone();
            let streak_before = current_streak(&completions, policy, offset(today));

            let existing = *pick.get(&days.iter().copied().collect::<Vec<_>>());
            prop_assert!(!completions.insert(offset(existing)));
            prop_assert_eq!(&completions, &before);
            prop_assert_eq!(current_streak(&completions, policy, offset(today)), streak_before);
        }

        /// Property: remove followed by add of the same day restores the streak
        #[test]
        fn test_remove_then_add_restores(
            days in prop::collection::btree_set(0u32..90, 0..40),
            target in 0u32..90,
            today in 0u32..100,
            policy in policy_strategy(),
        ) {
            let mut completions: CompletionSet = days.iter().copied().map(offset).collect();
            completions.insert(offset(target));
            let streak_before = current_streak(&completions, policy, offset(today));

            completions.remove(offset(target));
            completions.insert(offset(target));
            prop_assert_eq!(current_streak(&completions, policy, offset(today)), streak_before);
        }

        /// Property: streak never exceeds the number of completions up to today
        #[test]
        fn test_streak_bounded_by_history(
            days in prop::collection::btree_set(0u32..90, 0..40),
            today in 0u32..100,
            policy in policy_strategy(),
        ) {
            let completions: CompletionSet = days.iter().copied().map(offset).collect();
            let upto = completions.iter_through(offset(today)).count();
            let streak = current_streak(&completions, policy, offset(today));
            prop_assert!((streak as usize) <= upto);
        }
    }
}
