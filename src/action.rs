use thiserror::Error;
use crate::model::group::Table;

pub type Index = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub group_index: Index,
    pub member_index: Index,
}

/// Exchange of two members between two different groups of the same round.
///
/// Applying the same swap twice restores the original assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swap {
    pub round: Index,
    pub first: Position,
    pub second: Position,
}

impl Swap {
    pub fn new(round: Index, first: Position, second: Position) -> Swap {
        Swap { round, first, second }
    }

    pub fn check(&self, table: &Table) -> Result<(), ActionError> {
        let groups = table.rounds.get(self.round).ok_or(ActionError::InvalidPosition)?;
        if self.first.group_index == self.second.group_index {
            return Err(ActionError::SameGroup);
        }
        for position in [self.first, self.second] {
            let members = groups.get(position.group_index).ok_or(ActionError::InvalidPosition)?;
            if position.member_index >= members.len() {
                return Err(ActionError::InvalidPosition);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActionError {
    #[error("Invalid position")]
    InvalidPosition,
    #[error("Swap within a single group")]
    SameGroup,
}
