use proptest::prelude::*;

use lazytrace::diagnostics::{run_length, CycleDetector, Frame, FunctionDescriptor};
use lazytrace::iter::{
    accumulate, cycle_n, drop, filter, nth, partition, product, reverse, take, Iterate,
};

fn frames_from(names: &[u8]) -> Vec<Frame> {
    names
        .iter()
        .map(|n| Frame::new(FunctionDescriptor::new(&format!("f{}", n), ["Int64"]), "p.jl", 1))
        .collect()
}

proptest! {
    #[test]
    fn take_and_drop_split_the_source(
        values in proptest::collection::vec(any::<i32>(), 0..40),
        n in 0isize..50,
    ) {
        let head = take(values.clone(), n).expect("non-negative count");
        let tail = drop(values.clone(), n).expect("non-negative count");
        let mut joined: Vec<i32> = head.walk().collect();
        joined.extend(tail.walk());
        prop_assert_eq!(&joined, &values);
        prop_assert_eq!(head.length(), Ok(values.len().min(n as usize)));
        prop_assert_eq!(tail.length(), Ok(values.len().saturating_sub(n as usize)));
    }

    #[test]
    fn filter_matches_std(values in proptest::collection::vec(-100i64..100, 0..60)) {
        let ours: Vec<i64> = filter(|x: &i64| x % 3 == 0, values.clone()).walk().collect();
        let expected: Vec<i64> = values.into_iter().filter(|x| x % 3 == 0).collect();
        prop_assert_eq!(ours, expected);
    }

    #[test]
    fn reverse_twice_is_identity(values in proptest::collection::vec(any::<u8>(), 0..40)) {
        let once = reverse(values.clone()).expect("vectors are reversible");
        let expected: Vec<u8> = values.iter().rev().copied().collect();
        prop_assert_eq!(once.walk().collect::<Vec<_>>(), expected);
        let twice = reverse(once).expect("reverse is reversible");
        prop_assert_eq!(twice.walk().collect::<Vec<_>>(), values);
    }

    #[test]
    fn partition_chunks_concatenate_back(
        values in proptest::collection::vec(any::<i16>(), 0..50),
        width in 1isize..8,
    ) {
        let chunks = partition(values.clone(), width).expect("positive width");
        let collected: Vec<Vec<i16>> = chunks.walk().collect();
        prop_assert_eq!(chunks.length(), Ok(collected.len()));
        prop_assert!(collected.iter().all(|c| !c.is_empty() && c.len() <= width as usize));
        prop_assert_eq!(collected.concat(), values);
    }

    #[test]
    fn cycle_n_nth_is_modular(
        values in proptest::collection::vec(any::<i32>(), 1..10),
        times in 1isize..20,
        pick in 0usize..1000,
    ) {
        let repeated = cycle_n(values.clone(), times).expect("non-negative count");
        let total = values.len() * times as usize;
        let n = pick % total + 1;
        prop_assert_eq!(nth(&repeated, n), Ok(values[(n - 1) % values.len()]));
        prop_assert_eq!(repeated.walk().count(), total);
    }

    #[test]
    fn product_length_matches_enumeration(
        a in proptest::collection::vec(any::<u8>(), 0..6),
        b in proptest::collection::vec(any::<u8>(), 0..6),
        c in proptest::collection::vec(any::<u8>(), 0..6),
    ) {
        let p = product((a.clone(), b.clone(), c.clone()));
        let expected = a.len() * b.len() * c.len();
        prop_assert_eq!(p.length(), Ok(expected));
        prop_assert_eq!(p.walk().count(), expected);
    }

    #[test]
    fn accumulate_ends_at_the_total(values in proptest::collection::vec(-1000i64..1000, 1..40)) {
        let sums = accumulate(|a: i64, b: i64| a + b, values.clone());
        let total: i64 = values.iter().sum();
        prop_assert_eq!(sums.last_value(), Ok(Some(total)));
    }

    #[test]
    fn run_length_preserves_frame_count(names in proptest::collection::vec(0u8..3, 0..60)) {
        let frames = frames_from(&names);
        let runs = run_length(&frames);
        prop_assert_eq!(runs.iter().map(|r| r.count).sum::<usize>(), frames.len());
        prop_assert!(runs.windows(2).all(|w| w[0].frame != w[1].frame));
    }

    #[test]
    fn displayed_frames_are_a_subsequence(names in proptest::collection::vec(0u8..4, 0..120)) {
        let runs = run_length(&frames_from(&names));
        let report = CycleDetector::new(0).detect(&runs);
        prop_assert_eq!(report.total_runs, runs.len());
        prop_assert!(report.displayed.windows(2).all(|w| w[0].position < w[1].position));
        for shown in &report.displayed {
            prop_assert_eq!(&shown.run, &runs[shown.position]);
        }
        for cycle in &report.cycles {
            prop_assert!(cycle.repetitions >= 2);
            prop_assert!(cycle.end() <= report.displayed.len());
        }
    }
}
