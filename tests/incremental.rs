use group_rounds::action::{Position, Swap};
use group_rounds::cache::{SearchState, Statistics};
use group_rounds::init;
use group_rounds::model::condition::{PenaltyWeights, Relations};
use group_rounds::Person;
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn roster(n: usize, absent_every: usize) -> Vec<Person> {
    (0..n)
        .map(|i| {
            let person = Person::new(format!("p{i}"), format!("s{}", i % 3), format!("20{:02}-0{}-15", 10 + i % 12, 1 + i % 9))
                .with_projects([format!("proj{}", i % 4)]);
            if absent_every > 0 && i % absent_every == 0 { person.with_absence([1 + i % 3]) } else { person }
        })
        .collect()
}

/// Maps raw draws onto a valid swap, or nothing when the drawn round cannot host one.
fn pick(state: &SearchState, raw: (usize, usize, usize, usize, usize)) -> Option<Swap> {
    let table = state.table();
    let round = raw.0 % table.n_rounds();
    let g0 = raw.1 % table.n_groups();
    let g1 = (g0 + 1 + raw.2 % (table.n_groups() - 1)) % table.n_groups();
    let (len0, len1) = (table.group(round, g0).len(), table.group(round, g1).len());
    if len0 == 0 || len1 == 0 {
        return None;
    }
    Some(Swap::new(
        round,
        Position { group_index: g0, member_index: raw.3 % len0 },
        Position { group_index: g1, member_index: raw.4 % len1 },
    ))
}

fn raw_swap() -> impl Strategy<Value = (usize, usize, usize, usize, usize)> {
    (any::<usize>(), any::<usize>(), any::<usize>(), any::<usize>(), any::<usize>())
}

proptest! {
    #[test]
    fn incremental_statistics_match_recount(
        seed in any::<u64>(),
        n in 4usize..24,
        groups in 2usize..5,
        rounds in 3usize..6,
        absent_every in 0usize..5,
        swaps in prop::collection::vec(raw_swap(), 1..60),
    ) {
        let roster = roster(n, absent_every);
        let mut rng = SmallRng::seed_from_u64(seed);
        let (mut state, _) = init::build(&roster, groups, rounds, &mut rng).unwrap();
        for raw in swaps {
            if let Some(swap) = pick(&state, raw) {
                state.act(&swap).unwrap();
            }
        }
        prop_assert_eq!(state.stats(), &Statistics::from_table(state.table(), n));
    }

    #[test]
    fn probe_restores_state_exactly(
        seed in any::<u64>(),
        n in 4usize..24,
        groups in 2usize..5,
        rounds in 3usize..6,
        raw in raw_swap(),
    ) {
        let roster = roster(n, 4);
        let relations = Relations::from_roster(&roster).unwrap();
        let weights = PenaltyWeights::default();
        let mut rng = SmallRng::seed_from_u64(seed);
        let (mut state, _) = init::build(&roster, groups, rounds, &mut rng).unwrap();
        let before = state.clone();
        if let Some(swap) = pick(&state, raw) {
            let delta = state.simulate(&swap, &relations, &weights).unwrap();
            prop_assert!(delta.is_finite());
            prop_assert_eq!(&state, &before);
            state.act(&swap).unwrap();
            state.act(&swap).unwrap();
            prop_assert_eq!(&state, &before);
        }
    }

    #[test]
    fn every_round_covers_the_roster_once(
        seed in any::<u64>(),
        n in 1usize..30,
        groups in 1usize..6,
        rounds in 3usize..5,
        absent_every in 0usize..4,
    ) {
        let roster = roster(n, absent_every);
        let mut rng = SmallRng::seed_from_u64(seed);
        let (state, absences) = init::build(&roster, groups, rounds, &mut rng).unwrap();
        for round in 0..rounds {
            let mut seen = state.table().rounds[round].iter().flatten().copied()
                .chain(absences.round(round).iter().copied())
                .collect::<Vec<_>>();
            seen.sort();
            prop_assert_eq!(seen, (0..n).collect::<Vec<_>>());
            let sizes = state.table().rounds[round].iter().map(Vec::len).collect::<Vec<_>>();
            prop_assert!(sizes.iter().max().unwrap() - sizes.iter().min().unwrap() <= 1);
        }
    }
}
