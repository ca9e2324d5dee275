use crate::model::entity::{Id, Person};
use crate::model::group::{Absences, GroupResult, GroupSlot, RoundResult, Table};

/// Maps the final table back onto roster records with 1-based round and group numbers.
pub fn materialize(roster: &[Person], table: &Table, absences: &Absences) -> GroupResult {
    let people = |ids: &[Id]| ids.iter().map(|&id| roster[id].clone()).collect::<Vec<_>>();
    table.rounds.iter().enumerate()
        .map(|(round, groups)| RoundResult {
            round: round + 1,
            groups: groups.iter().enumerate()
                .map(|(slot, members)| GroupSlot { group_number: slot + 1, members: people(members) })
                .collect(),
            absence: people(absences.round(round)),
        })
        .collect()
}
