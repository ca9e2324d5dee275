use crate::action::{ActionError, Swap};
use crate::model::condition::{PairMatrix, PenaltyWeights, Relations, Score};
use crate::model::entity::Id;
use crate::model::group::Table;
use crate::penalty;

/// Derived counters kept in step with the assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistics {
    /// Adjacent round pairs in which each person keeps the same group slot.
    pub stay_count: Vec<u32>,
    /// Rounds in which each pair of people share a group.
    pub same_group: PairMatrix<u32>,
}

impl Statistics {
    /// Full recount over every round; only used at initialization and for verification.
    pub fn from_table(table: &Table, n_people: usize) -> Statistics {
        let mut stay_count = vec![0; n_people];
        let mut same_group = PairMatrix::new(n_people);
        for (round, groups) in table.rounds.iter().enumerate() {
            for members in groups {
                same_group.add_group(members);
            }
            let Some(next) = table.rounds.get(round + 1) else { continue };
            for (current, following) in groups.iter().zip(next) {
                for person in current {
                    if following.contains(person) {
                        stay_count[*person] += 1;
                    }
                }
            }
        }
        Statistics { stay_count, same_group }
    }
}

/// The assignment and its statistics; every change goes through [`SearchState::act`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    table: Table,
    stats: Statistics,
}

impl SearchState {
    pub fn new(table: Table, n_people: usize) -> SearchState {
        let stats = Statistics::from_table(&table, n_people);
        SearchState { table, stats }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Applies `swap` after checking its positions.
    pub fn act(&mut self, swap: &Swap) -> Result<(), ActionError> {
        swap.check(&self.table)?;
        self.act_unchecked(swap);
        Ok(())
    }

    /// Cost delta of `swap` on the two touched cells, leaving the state as it was.
    pub fn simulate(&mut self, swap: &Swap, relations: &Relations, weights: &PenaltyWeights) -> Result<Score, ActionError> {
        swap.check(&self.table)?;
        Ok(self.simulate_unchecked(swap, relations, weights))
    }

    pub(crate) fn simulate_unchecked(&mut self, swap: &Swap, relations: &Relations, weights: &PenaltyWeights) -> Score {
        let (round, g0, g1) = (swap.round, swap.first.group_index, swap.second.group_index);
        let before = self.cell_cost(round, g0, relations, weights) + self.cell_cost(round, g1, relations, weights);
        self.act_unchecked(swap);
        let after = self.cell_cost(round, g0, relations, weights) + self.cell_cost(round, g1, relations, weights);
        self.act_unchecked(swap);
        after - before
    }

    pub fn cell_cost(&self, round: usize, group: usize, relations: &Relations, weights: &PenaltyWeights) -> Score {
        penalty::cell_cost(&self.table, &self.stats, relations, weights, round, group)
    }

    pub fn total_cost(&self, relations: &Relations, weights: &PenaltyWeights) -> Score {
        penalty::total_cost(&self.table, &self.stats, relations, weights)
    }

    pub(crate) fn act_unchecked(&mut self, swap: &Swap) {
        let round = swap.round;
        let (g0, g1) = (swap.first.group_index, swap.second.group_index);
        let member0 = self.table.rounds[round][g0][swap.first.member_index];
        let member1 = self.table.rounds[round][g1][swap.second.member_index];

        let stay0 = (self.adjacent_stays(round, g0, member0), self.adjacent_stays(round, g1, member0));
        let stay1 = (self.adjacent_stays(round, g1, member1), self.adjacent_stays(round, g0, member1));

        self.stats.same_group.remove_group(&self.table.rounds[round][g0]);
        self.stats.same_group.remove_group(&self.table.rounds[round][g1]);
        self.table.rounds[round][g0][swap.first.member_index] = member1;
        self.table.rounds[round][g1][swap.second.member_index] = member0;
        self.stats.same_group.add_group(&self.table.rounds[round][g0]);
        self.stats.same_group.add_group(&self.table.rounds[round][g1]);

        let stay_count = &mut self.stats.stay_count;
        stay_count[member0] = stay_count[member0] - stay0.0 + stay0.1;
        stay_count[member1] = stay_count[member1] - stay1.0 + stay1.1;
    }

    /// Neighbouring rounds in which `person` sits in slot `group`.
    fn adjacent_stays(&self, round: usize, group: usize, person: Id) -> u32 {
        let previous = round.checked_sub(1).map(|r| &self.table.rounds[r]);
        let next = self.table.rounds.get(round + 1);
        [previous, next].into_iter()
            .flatten()
            .filter(|groups| groups[group].contains(&person))
            .count() as u32
    }
}
