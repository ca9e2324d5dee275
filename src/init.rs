use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cache::SearchState;
use crate::error::{Result, ShuffleError};
use crate::model::entity::{Id, Person};
use crate::model::group::{Absences, Table};

pub fn validate(roster: &[Person], group_count: usize, round_count: usize) -> Result<()> {
    if group_count < 1 {
        return Err(ShuffleError::InvalidConfiguration("group count must be at least 1".into()));
    }
    if round_count < 1 {
        return Err(ShuffleError::InvalidConfiguration("round count must be at least 1".into()));
    }
    for person in roster {
        if let Some(round) = person.absence.iter().find(|&&r| r < 1 || r > round_count) {
            return Err(ShuffleError::InvalidConfiguration(format!(
                "{} is absent in round {round}, outside 1..={round_count}",
                person.name
            )));
        }
    }
    Ok(())
}

/// Shuffles each round's attendees and deals them round-robin into `group_count` slots.
///
/// Group sizes within a round differ by at most one. Statistics are counted
/// once from the finished table.
pub fn build<R: Rng>(
    roster: &[Person],
    group_count: usize,
    round_count: usize,
    rng: &mut R,
) -> Result<(SearchState, Absences)> {
    validate(roster, group_count, round_count)?;

    let mut rounds = Vec::with_capacity(round_count);
    let mut absences = Vec::with_capacity(round_count);
    for round in 0..round_count {
        let (mut attendees, absent): (Vec<Id>, Vec<Id>) =
            (0..roster.len()).partition(|&id| !roster[id].is_absent(round));
        attendees.shuffle(rng);

        let mut groups = vec![Vec::new(); group_count];
        for (k, id) in attendees.into_iter().enumerate() {
            groups[k % group_count].push(id);
        }
        debug!("round {}: {} absent", round + 1, absent.len());
        rounds.push(groups);
        absences.push(absent);
    }

    let state = SearchState::new(Table { rounds }, roster.len());
    Ok((state, Absences(absences)))
}
