pub mod entity {
    use std::collections::HashSet;
    use serde::{Deserialize, Serialize};

    /// Position of a person in the roster; stable for the whole run.
    pub type Id = usize;
    pub type Tag = String;

    /// One roster entry as supplied by the caller.
    ///
    /// `absence` holds 1-based round numbers.
    #[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
    pub struct Person {
        pub name: String,
        pub section: String,
        pub date: String,
        #[serde(default)]
        pub proj: Vec<Tag>,
        #[serde(default)]
        pub absence: Vec<usize>,
    }

    impl Person {
        pub fn new(name: impl Into<String>, section: impl Into<String>, date: impl Into<String>) -> Person {
            Person {
                name: name.into(),
                section: section.into(),
                date: date.into(),
                proj: Vec::new(),
                absence: Vec::new(),
            }
        }

        pub fn with_projects(mut self, tags: impl IntoIterator<Item = impl Into<Tag>>) -> Person {
            self.proj.extend(tags.into_iter().map(Into::into));
            self
        }

        pub fn with_absence(mut self, rounds: impl IntoIterator<Item = usize>) -> Person {
            self.absence.extend(rounds);
            self
        }

        pub fn project_set(&self) -> HashSet<&str> {
            self.proj.iter().map(String::as_str).collect()
        }

        /// `round` is 0-based.
        pub fn is_absent(&self, round: usize) -> bool {
            self.absence.contains(&(round + 1))
        }
    }
}


pub mod group {
    use serde::{Deserialize, Serialize};
    use super::entity::{Id, Person};

    /// Members of one group slot in one round.
    pub type Group = Vec<Id>;

    /// The mutable assignment: `rounds[round][group]` lists person ids.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Table {
        pub rounds: Vec<Vec<Group>>,
    }

    impl Table {
        pub fn n_rounds(&self) -> usize {
            self.rounds.len()
        }

        pub fn n_groups(&self) -> usize {
            self.rounds.first().map_or(0, Vec::len)
        }

        pub fn group(&self, round: usize, group: usize) -> &[Id] {
            &self.rounds[round][group]
        }
    }

    /// Per round, the people excluded from that round. Never changed by the search.
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct Absences(pub Vec<Vec<Id>>);

    impl Absences {
        pub fn round(&self, round: usize) -> &[Id] {
            &self.0[round]
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GroupSlot {
        pub group_number: usize,
        pub members: Vec<Person>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
    pub struct RoundResult {
        pub round: usize,
        pub groups: Vec<GroupSlot>,
        pub absence: Vec<Person>,
    }

    /// Output schema, one entry per round in order.
    pub type GroupResult = Vec<RoundResult>;
}

pub mod condition {
    use super::entity::Id;

    pub type Score = f64;

    /// Dense symmetric `n x n` storage indexed by person id.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PairMatrix<T> {
        size: usize,
        cells: Vec<T>,
    }

    impl<T: Copy + Default> PairMatrix<T> {
        pub fn new(size: usize) -> PairMatrix<T> {
            PairMatrix { size, cells: vec![T::default(); size * size] }
        }

        pub fn get(&self, a: Id, b: Id) -> T {
            self.cells[a * self.size + b]
        }

        /// Writes both `(a, b)` and `(b, a)`.
        pub fn set_pair(&mut self, a: Id, b: Id, value: T) {
            self.cells[a * self.size + b] = value;
            self.cells[b * self.size + a] = value;
        }

        pub fn row(&self, a: Id) -> &[T] {
            &self.cells[a * self.size..(a + 1) * self.size]
        }
    }

    impl PairMatrix<u32> {
        pub fn add_group(&mut self, members: &[Id]) {
            for (i, &a) in members.iter().enumerate() {
                for &b in &members[i + 1..] {
                    self.cells[a * self.size + b] += 1;
                    self.cells[b * self.size + a] += 1;
                }
            }
        }

        pub fn remove_group(&mut self, members: &[Id]) {
            for (i, &a) in members.iter().enumerate() {
                for &b in &members[i + 1..] {
                    self.cells[a * self.size + b] -= 1;
                    self.cells[b * self.size + a] -= 1;
                }
            }
        }
    }

    /// Static pairwise relations and seniority, computed once per run.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Relations {
        pub same_section: PairMatrix<bool>,
        pub same_project: PairMatrix<bool>,
        /// Days between each person's date and the seniority epoch.
        pub seniority: Vec<i64>,
    }

    impl Relations {
        pub fn is_double_conflict(&self, a: Id, b: Id) -> bool {
            self.same_section.get(a, b) && self.same_project.get(a, b)
        }
    }

    /// Outer weights of the five per-cell penalty terms.
    ///
    /// `seniority_spread` is negative: a wider spread lowers the cost.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct PenaltyWeights {
        pub conflict: Score,
        pub seniority_spread: Score,
        pub continuity: Score,
        pub repeat_stay: Score,
        pub repeat_pairing: Score,
    }

    impl Default for PenaltyWeights {
        fn default() -> Self {
            PenaltyWeights {
                conflict: 1.0,
                seniority_spread: -0.05,
                continuity: 500.0,
                repeat_stay: 500.0,
                repeat_pairing: 10.0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::condition::PairMatrix;
    use super::entity::Person;
    use super::group::Table;

    #[test]
    fn pair_matrix_group_counts_are_symmetric() {
        let mut counts = PairMatrix::<u32>::new(4);
        counts.add_group(&[0, 2, 3]);
        counts.add_group(&[2, 3]);
        assert_eq!(counts.get(2, 3), 2);
        assert_eq!(counts.get(3, 2), 2);
        assert_eq!(counts.get(0, 3), 1);
        assert_eq!(counts.get(1, 0), 0);
        counts.remove_group(&[2, 3]);
        assert_eq!(counts.get(3, 2), 1);
    }

    #[test]
    fn absence_rounds_are_one_based() {
        let person = Person::new("a", "s", "2020-01-01").with_absence([2]);
        assert!(!person.is_absent(0));
        assert!(person.is_absent(1));
    }

    #[test]
    fn table_dimensions() {
        let table = Table { rounds: vec![vec![vec![0, 1], vec![2]]] };
        assert_eq!(table.n_rounds(), 1);
        assert_eq!(table.n_groups(), 2);
        assert_eq!(table.group(0, 1), &[2]);
        assert_eq!(Table { rounds: vec![] }.n_groups(), 0);
    }
}
