//! Property tests for problem generation and grading.

use mastery_core::generator::{RandomSampler, generate, generate_aggregation_grid};
use mastery_core::model::{AnswerMap, DigitRange, GridCoordinate, Operation};
use mastery_core::scorer::{ExpectedValues, full_recheck};
use proptest::prelude::*;

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        Just(Operation::Addition),
        Just(Operation::Subtraction),
        Just(Operation::Multiplication),
        Just(Operation::Division),
    ]
}

proptest! {
    #[test]
    fn operands_stay_inside_the_digit_range(
        op in operation(),
        digits in 1u32..=4,
        operands in 2usize..=4,
        seed in any::<u64>(),
    ) {
        let range = DigitRange::new(digits).unwrap();
        let problems = generate(op, digits, operands, 8, &mut RandomSampler::seeded(seed)).unwrap();
        prop_assert_eq!(problems.len(), 8);
        for problem in &problems {
            prop_assert_eq!(problem.operands().len(), operands);
            for &n in problem.operands() {
                prop_assert!(range.contains(n));
            }
        }
    }

    #[test]
    fn addition_answer_is_the_exact_sum(
        digits in 1u32..=6,
        operands in 2usize..=6,
        seed in any::<u64>(),
    ) {
        let problems =
            generate(Operation::Addition, digits, operands, 5, &mut RandomSampler::seeded(seed)).unwrap();
        for problem in problems {
            prop_assert_eq!(problem.answer(), problem.operands().iter().sum::<u64>());
        }
    }

    #[test]
    fn subtraction_answer_is_non_negative_and_matches_policy(
        digits in 1u32..=5,
        operands in 2usize..=5,
        seed in any::<u64>(),
    ) {
        let problems =
            generate(Operation::Subtraction, digits, operands, 5, &mut RandomSampler::seeded(seed)).unwrap();
        for problem in problems {
            let ops = problem.operands();
            prop_assert!(ops.windows(2).all(|w| w[0] >= w[1]));
            let first = i128::from(ops[0]);
            let rest: i128 = ops[1..].iter().map(|&n| i128::from(n)).sum();
            prop_assert_eq!(i128::from(problem.answer()), (first - rest).abs());
        }
    }

    #[test]
    fn division_is_sequential_floor_division(
        digits in 1u32..=4,
        operands in 2usize..=4,
        seed in any::<u64>(),
    ) {
        let problems =
            generate(Operation::Division, digits, operands, 5, &mut RandomSampler::seeded(seed)).unwrap();
        for problem in problems {
            let ops = problem.operands();
            let mut expected = ops[0];
            for &d in &ops[1..] {
                expected = if d == 0 { 0 } else { expected / d };
            }
            prop_assert_eq!(problem.answer(), expected);
        }
    }

    #[test]
    fn recheck_is_idempotent_and_accuracy_bounded(
        seed in any::<u64>(),
        dimension in 1usize..=6,
        entries in proptest::collection::vec((0usize..13, 0i128..700), 0..12),
    ) {
        let grid = generate_aggregation_grid(dimension, 2, &mut RandomSampler::seeded(seed)).unwrap();
        let keys = grid.coordinates();
        let mut answers = AnswerMap::new();
        for (idx, value) in entries {
            let coord: GridCoordinate = keys[idx % keys.len()];
            answers.set(coord, Some(value));
        }

        let first = full_recheck(&grid, &answers).unwrap();
        let second = full_recheck(&grid, &answers).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert!(first.accuracy() <= 100);
        prop_assert_eq!(first.checked_count(), answers.len());
        if first.checked_count() == 0 {
            prop_assert_eq!(first.accuracy(), 0);
        }
    }
}
