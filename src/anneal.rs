//! Simulated annealing over group assignments.
//!
//! Each iteration draws one [`Swap`] inside a random round, probes its cost
//! delta on the two touched cells and keeps it under the Metropolis rule.
//! Temperature follows a shifted geometric interpolation between
//! `initial_temperature` and `end_temperature`, so cooling slows near the end.

use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use itertools::Itertools;
use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::action::{Index, Position, Swap};
use crate::cache::SearchState;
use crate::error::{Result, ShuffleError};
use crate::init;
use crate::model::condition::{PenaltyWeights, Relations, Score};
use crate::model::entity::{Id, Person};
use crate::model::group::{GroupResult, Table};
use crate::result::materialize;

#[derive(Debug, Clone, PartialEq)]
pub struct AnnealConfig {
    pub initial_temperature: f64,
    pub end_temperature: f64,
    /// Shift applied before the geometric interpolation. Must stay below both temperatures.
    pub temperature_offset: f64,
    pub max_iterations: usize,
    /// Iterations between temperature updates.
    pub cooling_interval: usize,
    /// Number of progress reports over the whole budget.
    pub report_divisions: usize,
    pub seed: Option<u64>,
    pub weights: PenaltyWeights,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        AnnealConfig {
            initial_temperature: 100.0,
            end_temperature: 1.0,
            temperature_offset: -15.0,
            max_iterations: 3_000_000,
            cooling_interval: 1_000,
            report_divisions: 200,
            seed: None,
            weights: PenaltyWeights::default(),
        }
    }
}

impl AnnealConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_end_temperature(mut self, t: f64) -> Self {
        self.end_temperature = t;
        self
    }

    pub fn with_temperature_offset(mut self, k: f64) -> Self {
        self.temperature_offset = k;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_cooling_interval(mut self, n: usize) -> Self {
        self.cooling_interval = n;
        self
    }

    pub fn with_report_divisions(mut self, n: usize) -> Self {
        self.report_divisions = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_weights(mut self, weights: PenaltyWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| -> Result<()> { Err(ShuffleError::InvalidConfiguration(message)) };
        let temperatures = [self.initial_temperature, self.end_temperature, self.temperature_offset];
        if temperatures.iter().any(|t| !t.is_finite()) {
            return invalid("temperatures and offset must be finite".into());
        }
        if self.initial_temperature <= 0.0 || self.end_temperature <= 0.0 {
            return invalid("temperatures must be positive".into());
        }
        if self.temperature_offset >= self.initial_temperature || self.temperature_offset >= self.end_temperature {
            return invalid(format!(
                "temperature offset {} must be below both temperatures ({}, {})",
                self.temperature_offset, self.initial_temperature, self.end_temperature
            ));
        }
        if self.max_iterations == 0 {
            return invalid("max_iterations must be positive".into());
        }
        if self.cooling_interval == 0 || self.report_divisions == 0 {
            return invalid("cooling_interval and report_divisions must be positive".into());
        }
        Ok(())
    }

    /// `(T0 - K)^(1 - p) * (Tend - K)^p + K` for progress `p` in `[0, 1]`.
    pub fn temperature_at(&self, progress: f64) -> f64 {
        let k = self.temperature_offset;
        (self.initial_temperature - k).powf(1.0 - progress) * (self.end_temperature - k).powf(progress) + k
    }

    fn report_interval(&self) -> usize {
        (self.max_iterations / self.report_divisions).max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Share of the iteration budget spent, in `[0, 1]`.
    pub fraction: f64,
    /// Whole-assignment cost at this point.
    pub cost: Score,
    pub iteration: usize,
    pub temperature: f64,
}

/// Receives periodic progress reports.
///
/// Errors are logged and otherwise ignored; they never stop the search.
/// This is also the point where a host may yield to its own scheduler.
pub trait ProgressObserver {
    fn on_progress(&mut self, progress: &Progress) -> std::result::Result<(), Box<dyn Error + Send + Sync>>;
}

impl<F: FnMut(&Progress)> ProgressObserver for F {
    fn on_progress(&mut self, progress: &Progress) -> std::result::Result<(), Box<dyn Error + Send + Sync>> {
        self(progress);
        Ok(())
    }
}

/// Observer that discards every report.
pub struct Silent;

impl ProgressObserver for Silent {
    fn on_progress(&mut self, _: &Progress) -> std::result::Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShuffleOutcome {
    pub groups: GroupResult,
    pub cost: Score,
    pub iterations: usize,
    pub accepted_moves: usize,
    pub cancelled: bool,
}

/// Draws candidate swaps, biased toward breaking up same-section same-project pairs.
pub struct SwapGenerator<'a> {
    relations: &'a Relations,
}

impl<'a> SwapGenerator<'a> {
    pub fn new(relations: &'a Relations) -> SwapGenerator<'a> {
        SwapGenerator { relations }
    }

    /// `None` when either drawn group is empty or only one group exists.
    ///
    /// Only the first group is searched for a conflict; the second side stays uniform.
    pub fn next<R: Rng>(&self, table: &Table, rng: &mut R) -> Option<Swap> {
        let n_groups = table.n_groups();
        if n_groups < 2 {
            return None;
        }
        let round = rng.gen_range(0..table.n_rounds());
        let group0 = rng.gen_range(0..n_groups);
        let group1 = loop {
            let g = rng.gen_range(0..n_groups);
            if g != group0 {
                break g;
            }
        };

        let members0 = table.group(round, group0);
        let members1 = table.group(round, group1);
        if members0.is_empty() || members1.is_empty() {
            return None;
        }
        let index0 = match self.conflicting_pair(members0) {
            Some((i, j)) => if rng.gen_bool(0.5) { i } else { j },
            None => rng.gen_range(0..members0.len()),
        };
        let index1 = rng.gen_range(0..members1.len());
        Some(Swap::new(
            round,
            Position { group_index: group0, member_index: index0 },
            Position { group_index: group1, member_index: index1 },
        ))
    }

    fn conflicting_pair(&self, members: &[Id]) -> Option<(Index, Index)> {
        (0..members.len())
            .tuple_combinations()
            .find(|&(i, j)| self.relations.is_double_conflict(members[i], members[j]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub iterations: usize,
    pub accepted_moves: usize,
    pub cancelled: bool,
}

struct State {
    search: SearchState,
    n_iterations: usize,
    accepted_moves: usize,
    temperature: f64,
}

/// Runs the search loop on an already built state.
pub struct Annealer<'a> {
    relations: &'a Relations,
    config: &'a AnnealConfig,
}

impl<'a> Annealer<'a> {
    pub fn new(relations: &'a Relations, config: &'a AnnealConfig) -> Annealer<'a> {
        Annealer { relations, config }
    }

    /// Spends the whole iteration budget unless `cancel` is raised.
    pub fn run<R: Rng, O: ProgressObserver + ?Sized>(
        &self,
        search: SearchState,
        rng: &mut R,
        observer: &mut O,
        cancel: Option<&AtomicBool>,
    ) -> (SearchState, RunSummary) {
        let config = self.config;
        let weights = &config.weights;
        let generator = SwapGenerator::new(self.relations);
        let report_interval = config.report_interval();
        let mut state = State {
            search,
            n_iterations: 0,
            accepted_moves: 0,
            temperature: config.initial_temperature,
        };

        if state.search.table().n_groups() < 2 {
            warn!("fewer than two groups, nothing to swap");
            return (state.search, RunSummary { iterations: 0, accepted_moves: 0, cancelled: false });
        }

        let mut cancelled = false;
        for iteration in 1..=config.max_iterations {
            state.n_iterations = iteration;
            if let Some(swap) = generator.next(state.search.table(), rng) {
                let delta = state.search.simulate_unchecked(&swap, self.relations, weights);
                if delta <= 0.0 || rng.gen::<f64>() < (-delta / state.temperature).exp() {
                    state.search.act_unchecked(&swap);
                    state.accepted_moves += 1;
                }
            }

            let progress = iteration as f64 / config.max_iterations as f64;
            if iteration % config.cooling_interval == 0 {
                state.temperature = config.temperature_at(progress);
            }
            if iteration % report_interval == 0 {
                let report = Progress {
                    fraction: progress,
                    cost: state.search.total_cost(self.relations, weights),
                    iteration,
                    temperature: state.temperature,
                };
                debug!(
                    "iteration {iteration}: cost {:.2}, temperature {:.3}, accepted {}",
                    report.cost, report.temperature, state.accepted_moves
                );
                if let Err(err) = observer.on_progress(&report) {
                    warn!("progress observer failed: {err}");
                }
                if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                    cancelled = true;
                    break;
                }
            }
        }
        let summary = RunSummary {
            iterations: state.n_iterations,
            accepted_moves: state.accepted_moves,
            cancelled,
        };
        (state.search, summary)
    }
}

/// Assigns `roster` to `group_count` groups over `round_count` rounds.
pub fn assign<O: ProgressObserver + ?Sized>(
    roster: &[Person],
    group_count: usize,
    round_count: usize,
    config: &AnnealConfig,
    observer: &mut O,
) -> Result<ShuffleOutcome> {
    assign_with_cancel(roster, group_count, round_count, config, observer, None)
}

/// As [`assign`], stopping early once `cancel` is set. The check runs at every progress report.
pub fn assign_with_cancel<O: ProgressObserver + ?Sized>(
    roster: &[Person],
    group_count: usize,
    round_count: usize,
    config: &AnnealConfig,
    observer: &mut O,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<ShuffleOutcome> {
    config.validate()?;
    let mut rng = SmallRng::seed_from_u64(config.seed.unwrap_or_else(|| rand::random()));

    let relations = Relations::from_roster(roster)?;
    let (search, absences) = init::build(roster, group_count, round_count, &mut rng)?;
    let initial_cost = search.total_cost(&relations, &config.weights);
    info!(
        "{} people, {group_count} groups, {round_count} rounds, initial cost {initial_cost:.2}",
        roster.len()
    );

    debug!("searching");
    let annealer = Annealer::new(&relations, config);
    let (search, summary) = annealer.run(search, &mut rng, observer, cancel.as_deref());

    let cost = search.total_cost(&relations, &config.weights);
    if summary.cancelled {
        warn!("cancelled after {} iterations", summary.iterations);
    }
    info!(
        "final cost {cost:.2} after {} iterations, {} moves accepted",
        summary.iterations, summary.accepted_moves
    );
    Ok(ShuffleOutcome {
        groups: materialize(roster, search.table(), &absences),
        cost,
        iterations: summary.iterations,
        accepted_moves: summary.accepted_moves,
        cancelled: summary.cancelled,
    })
}
