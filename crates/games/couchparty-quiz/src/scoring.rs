pub const BASE_POINTS: i32 = 100;
pub const MAX_SPEED_BONUS: i32 = 50;
/// Bonus lost for every player who answered before.
pub const SPEED_BONUS_STEP: i32 = 10;

/// Points for a correct answer given how many players had already answered
/// the current question.
pub fn answer_points(prior_answers: usize) -> i32 {
    let prior = i32::try_from(prior_answers).unwrap_or(i32::MAX);
    BASE_POINTS + (MAX_SPEED_BONUS.saturating_sub(SPEED_BONUS_STEP.saturating_mul(prior))).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bonus_shrinks_to_floor() {
        let points: Vec<i32> = (0..8).map(answer_points).collect();
        assert_eq!(points, vec![150, 140, 130, 120, 110, 100, 100, 100]);
    }

    proptest! {
        #[test]
        fn points_bounded_and_non_increasing(prior in 0usize..10_000) {
            let p = answer_points(prior);
            prop_assert!((BASE_POINTS..=BASE_POINTS + MAX_SPEED_BONUS).contains(&p));
            prop_assert!(answer_points(prior + 1) <= p);
        }
    }
}
