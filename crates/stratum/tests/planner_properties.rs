//! Property tests: random reserve/release interleavings against the planner.
//!
//! After every step, live reservations must be pairwise disjoint, the
//! free-block index must be sorted and fully coalesced, `used` plus free
//! bytes must cover the extent exactly, and `peak` must equal the largest
//! `used` seen so far.

use proptest::prelude::*;
use stratum::arena::align::padded_size;
use stratum::prelude::*;

#[derive(Clone, Debug)]
enum Action {
    Reserve(usize),
    /// Release the live reservation at this index (mod live count).
    Release(usize),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => (1usize..512).prop_map(Action::Reserve),
        2 => any::<usize>().prop_map(Action::Release),
    ]
}

fn check_disjoint(live: &[(Offset, usize)], alignment: usize) -> Result<(), TestCaseError> {
    let mut spans: Vec<(usize, usize)> = live
        .iter()
        .map(|&(o, s)| (o.get(), o.get() + padded_size(s, alignment).unwrap()))
        .collect();
    spans.sort_unstable();
    for w in spans.windows(2) {
        prop_assert!(w[0].1 <= w[1].0, "{:?} overlaps {:?}", w[0], w[1]);
    }
    Ok(())
}

proptest! {
    #[test]
    fn interleavings_preserve_layout_invariants(
        alignment in prop::sample::select(vec![1usize, 8, 16, 64, 256]),
        verify in any::<bool>(),
        actions in prop::collection::vec(action(), 1..200),
    ) {
        let config = ArenaConfig::new()
            .with_alignment(alignment)
            .with_verify_releases(verify);
        let mut planner = Planner::new(config).unwrap();
        let mut live: Vec<(Offset, usize)> = Vec::new();
        let mut max_used = 0;
        let mut last_peak = 0;

        for a in actions {
            match a {
                Action::Reserve(size) => {
                    let o = planner.reserve(size).unwrap();
                    prop_assert_eq!(o.get() % alignment, 0);
                    live.push((o, size));
                }
                Action::Release(i) if !live.is_empty() => {
                    let (o, size) = live.swap_remove(i % live.len());
                    planner.release(o, size).unwrap();
                }
                Action::Release(_) => {}
            }

            max_used = max_used.max(planner.used());
            prop_assert!(planner.peak() >= last_peak);
            prop_assert_eq!(planner.peak(), max_used);
            last_peak = planner.peak();

            prop_assert!(planner.free_list().invariants_hold());
            prop_assert_eq!(
                planner.used() + planner.free_list().free_bytes(),
                planner.extent()
            );
            check_disjoint(&live, alignment)?;
        }

        // Releasing everything leaves one block spanning the extent.
        for (o, size) in live.drain(..) {
            planner.release(o, size).unwrap();
        }
        prop_assert_eq!(planner.used(), 0);
        let blocks: Vec<_> = planner.free_blocks().collect();
        if planner.extent() > 0 {
            prop_assert_eq!(blocks, vec![(Offset(0), planner.extent())]);
        } else {
            prop_assert!(blocks.is_empty());
        }
    }
}
