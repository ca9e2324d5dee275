//! Per-cell cost of one group in one round.
//!
//! Each term is computed unweighted by [`PenaltyBreakdown::of_cell`] and
//! combined with [`PenaltyWeights`] by [`PenaltyBreakdown::weighted`].

use itertools::Itertools;

use crate::cache::Statistics;
use crate::model::condition::{PairMatrix, PenaltyWeights, Relations, Score};
use crate::model::entity::Id;
use crate::model::group::Table;

const BOTH_WEIGHT: Score = 30.0;
const PROJECT_WEIGHT: Score = 3.0;
const SECTION_WEIGHT: Score = 1.0;

/// Pairs inside one group sharing a section, a project, or both.
///
/// A pair counts in exactly one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictCounts {
    pub both: u32,
    pub section: u32,
    pub project: u32,
}

impl ConflictCounts {
    pub fn count(members: &[Id], relations: &Relations) -> ConflictCounts {
        let mut counts = ConflictCounts::default();
        for (&a, &b) in members.iter().tuple_combinations() {
            match (relations.same_section.get(a, b), relations.same_project.get(a, b)) {
                (true, true) => counts.both += 1,
                (true, false) => counts.section += 1,
                (false, true) => counts.project += 1,
                (false, false) => {}
            }
        }
        counts
    }

    /// Squared counts, so conflicts piled into one group cost more than spread ones.
    pub fn penalty(&self) -> Score {
        let square = |n: u32| Score::from(n * n);
        BOTH_WEIGHT * square(self.both) + PROJECT_WEIGHT * square(self.project) + SECTION_WEIGHT * square(self.section)
    }
}

/// Population standard deviation of seniority offsets; 0 for empty groups.
pub fn seniority_spread(members: &[Id], seniority: &[i64]) -> Score {
    if members.is_empty() {
        return 0.0;
    }
    let n = members.len() as Score;
    let (sum, sum_sq) = members.iter().fold((0.0, 0.0), |(sum, sum_sq), &id| {
        let offset = seniority[id] as Score;
        (sum + offset, sum_sq + offset * offset)
    });
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0).sqrt()
}

/// Carry-over between the same slot in two adjacent rounds.
///
/// One person carried over is ideal; none costs 1, and `k > 1` costs `k - 1`.
pub fn continuity(adjacent: &[Id], members: &[Id]) -> u32 {
    let stay_num = adjacent.iter().filter(|id| members.contains(id)).count() as u32;
    match stay_num {
        0 => 1,
        n => n - 1,
    }
}

/// Sum of stay counts above 1 among `members`.
pub fn repeat_stay(members: &[Id], stay_count: &[u32]) -> u32 {
    members.iter().map(|&id| stay_count[id]).filter(|&count| count > 1).sum()
}

/// Sum, over members, of shared-group counts above 1 with anyone else.
pub fn repeat_pairing(members: &[Id], same_group: &PairMatrix<u32>) -> u32 {
    members.iter()
        .map(|&id| {
            same_group.row(id).iter().enumerate()
                .filter(|&(other, &count)| other != id && count > 1)
                .map(|(_, &count)| count)
                .sum::<u32>()
        })
        .sum()
}

/// Unweighted terms of one `(round, group)` cell.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PenaltyBreakdown {
    pub conflicts: ConflictCounts,
    pub seniority_spread: Score,
    pub continuity: u32,
    pub repeat_stay: u32,
    pub repeat_pairing: u32,
}

impl PenaltyBreakdown {
    pub fn of_cell(table: &Table, stats: &Statistics, relations: &Relations, round: usize, group: usize) -> PenaltyBreakdown {
        let members = table.group(round, group);
        let previous = round.checked_sub(1).map(|r| table.group(r, group));
        let next = (round + 1 < table.n_rounds()).then(|| table.group(round + 1, group));
        PenaltyBreakdown {
            conflicts: ConflictCounts::count(members, relations),
            seniority_spread: seniority_spread(members, &relations.seniority),
            continuity: [previous, next].into_iter().flatten().map(|adjacent| continuity(adjacent, members)).sum(),
            repeat_stay: repeat_stay(members, &stats.stay_count),
            repeat_pairing: repeat_pairing(members, &stats.same_group),
        }
    }

    pub fn weighted(&self, weights: &PenaltyWeights) -> Score {
        self.conflicts.penalty() * weights.conflict
            + self.seniority_spread * weights.seniority_spread
            + Score::from(self.continuity) * weights.continuity
            + Score::from(self.repeat_stay) * weights.repeat_stay
            + Score::from(self.repeat_pairing) * weights.repeat_pairing
    }
}

pub fn cell_cost(
    table: &Table,
    stats: &Statistics,
    relations: &Relations,
    weights: &PenaltyWeights,
    round: usize,
    group: usize,
) -> Score {
    PenaltyBreakdown::of_cell(table, stats, relations, round, group).weighted(weights)
}

/// Sum over every cell. Progress reporting only; the search works on deltas.
pub fn total_cost(table: &Table, stats: &Statistics, relations: &Relations, weights: &PenaltyWeights) -> Score {
    (0..table.n_rounds())
        .cartesian_product(0..table.n_groups())
        .map(|(round, group)| cell_cost(table, stats, relations, weights, round, group))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::Person;

    fn relations(roster: &[Person]) -> Relations {
        Relations::from_roster(roster).unwrap()
    }

    #[test]
    fn double_conflict_costs_thirty() {
        let roster = vec![
            Person::new("a", "sales", "2020-01-01").with_projects(["x", "y"]),
            Person::new("b", "sales", "2020-01-01").with_projects(["y"]),
        ];
        let counts = ConflictCounts::count(&[0, 1], &relations(&roster));
        assert_eq!(counts, ConflictCounts { both: 1, section: 0, project: 0 });
        assert_eq!(counts.penalty(), 30.0);
    }

    #[test]
    fn conflict_penalty_is_quadratic() {
        let roster = vec![
            Person::new("a", "s", "2020-01-01"),
            Person::new("b", "s", "2020-01-01"),
            Person::new("c", "s", "2020-01-01"),
            Person::new("d", "t", "2020-01-01").with_projects(["p"]),
            Person::new("e", "u", "2020-01-01").with_projects(["p"]),
        ];
        let counts = ConflictCounts::count(&[0, 1, 2, 3, 4], &relations(&roster));
        assert_eq!(counts, ConflictCounts { both: 0, section: 3, project: 1 });
        assert_eq!(counts.penalty(), 9.0 + 3.0);
    }

    #[test]
    fn spread_is_population_deviation() {
        assert_eq!(seniority_spread(&[0, 1], &[0, 10]), 5.0);
        assert_eq!(seniority_spread(&[1], &[0, 10]), 0.0);
        assert_eq!(seniority_spread(&[], &[0, 10]), 0.0);
        assert_eq!(seniority_spread(&[0, 1], &[7, 7]), 0.0);
    }

    #[test]
    fn continuity_prefers_a_single_anchor() {
        assert_eq!(continuity(&[0, 1, 2], &[3, 4, 5]), 1);
        assert_eq!(continuity(&[0, 1, 2], &[0, 4, 5]), 0);
        assert_eq!(continuity(&[0, 1, 2], &[0, 1, 5]), 1);
        assert_eq!(continuity(&[0, 1, 2], &[2, 1, 0]), 2);
    }

    #[test]
    fn repeat_terms_ignore_single_occurrences() {
        assert_eq!(repeat_stay(&[0, 1, 2], &[1, 2, 3]), 5);

        let mut same_group = PairMatrix::new(3);
        same_group.add_group(&[0, 1, 2]);
        assert_eq!(repeat_pairing(&[0, 1], &same_group), 0);
        same_group.add_group(&[0, 1]);
        assert_eq!(repeat_pairing(&[0, 1], &same_group), 4);
        assert_eq!(repeat_pairing(&[2], &same_group), 0);
    }

    #[test]
    fn breakdown_uses_both_neighbours() {
        let roster = (0..4).map(|i| Person::new(i.to_string(), i.to_string(), "2021-07-01")).collect::<Vec<_>>();
        let table = Table {
            rounds: vec![
                vec![vec![0, 1], vec![2, 3]],
                vec![vec![0, 1], vec![2, 3]],
                vec![vec![2, 3], vec![0, 1]],
            ],
        };
        let stats = Statistics::from_table(&table, 4);
        let middle = PenaltyBreakdown::of_cell(&table, &stats, &relations(&roster), 1, 0);
        // unchanged from round 0 (2 - 1), nobody carried into round 2 (1)
        assert_eq!(middle.continuity, 2);
        assert_eq!(middle.repeat_stay, 0);
        assert_eq!(middle.repeat_pairing, 6);
        assert_eq!(middle.weighted(&PenaltyWeights::default()), 2.0 * 500.0 + 6.0 * 10.0);
    }
}
