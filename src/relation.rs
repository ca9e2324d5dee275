use chrono::{Datelike, NaiveDate};
use itertools::Itertools;

use crate::error::{Result, ShuffleError};
use crate::model::condition::{PairMatrix, Relations};
use crate::model::entity::Person;

/// 2021-07-01, in days from the common era. Every run measures seniority from here.
const SENIORITY_EPOCH_DAYS: i64 = 737_972;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

pub fn parse_date(person: &Person) -> Result<NaiveDate> {
    let raw = person.date.trim();
    DATE_FORMATS.iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .ok_or_else(|| ShuffleError::Parse { name: person.name.clone(), date: person.date.clone() })
}

pub fn seniority_offset(person: &Person) -> Result<i64> {
    let date = parse_date(person)?;
    Ok(i64::from(date.num_days_from_ce()) - SENIORITY_EPOCH_DAYS)
}

impl Relations {
    /// Builds the pairwise relation matrices and seniority offsets for `roster`.
    ///
    /// Fails on the first person whose date does not parse.
    pub fn from_roster(roster: &[Person]) -> Result<Relations> {
        let seniority = roster.iter().map(seniority_offset).collect::<Result<Vec<_>>>()?;
        let projects = roster.iter().map(Person::project_set).collect_vec();

        let n = roster.len();
        let mut same_section = PairMatrix::new(n);
        let mut same_project = PairMatrix::new(n);
        for (a, b) in (0..n).tuple_combinations() {
            same_section.set_pair(a, b, roster[a].section == roster[b].section);
            same_project.set_pair(a, b, !projects[a].is_disjoint(&projects[b]));
        }
        Ok(Relations { same_section, same_project, seniority })
    }
}
