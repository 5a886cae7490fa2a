use crate::sandwich::cut::Cut;
use crate::sandwich::instance::SandwichInstance;
use crate::sandwich::interval::VertexInterval;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

pub const DEFAULT_MAX_WIDTH: usize = 3;
pub const DEFAULT_MAX_ITERATIONS: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Bound on the active region; a cut may never hold this many active vertices
    pub max_width: usize,
    /// Maximum number of cuts taken from the queue before giving up
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Result of a sandwich search. Failing to find a layout is an outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SolveOutcome<V> {
    /// One interval per vertex, in placement order
    Realized {
        intervals: Vec<VertexInterval<V>>,
        explored_cuts: usize,
    },
    /// The queue ran dry: no realization exists under the configured width
    NoRealization { explored_cuts: usize },
    /// The iteration budget ran out before the search was decided
    BudgetExhausted { explored_cuts: usize },
    /// The deadline passed before the search was decided
    TimedOut { explored_cuts: usize },
}

impl<V> SolveOutcome<V> {
    pub fn is_realized(&self) -> bool {
        matches!(self, SolveOutcome::Realized { .. })
    }

    pub fn intervals(&self) -> Option<&[VertexInterval<V>]> {
        match self {
            SolveOutcome::Realized { intervals, .. } => Some(intervals),
            _ => None,
        }
    }

    pub fn explored_cuts(&self) -> usize {
        match self {
            SolveOutcome::Realized { explored_cuts, .. }
            | SolveOutcome::NoRealization { explored_cuts }
            | SolveOutcome::BudgetExhausted { explored_cuts }
            | SolveOutcome::TimedOut { explored_cuts } => *explored_cuts,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            SolveOutcome::Realized { .. } => "realized",
            SolveOutcome::NoRealization { .. } => "no_realization",
            SolveOutcome::BudgetExhausted { .. } => "budget_exhausted",
            SolveOutcome::TimedOut { .. } => "timed_out",
        }
    }
}

/// Breadth-first search over cuts for an interval realization of a sandwich instance
pub struct ProblemSolver<'a, V> {
    instance: &'a SandwichInstance<V>,
    config: SolverConfig,
    deadline: Option<Instant>,
}

impl<'a, V: Copy + Eq + Hash + Ord + Debug> ProblemSolver<'a, V> {
    pub fn new(instance: &'a SandwichInstance<V>, config: SolverConfig) -> Self {
        Self {
            instance,
            config,
            deadline: None,
        }
    }

    /// Stop searching once `deadline` has passed; checked before each cut is expanded
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[instrument(skip(self), fields(vertices = self.instance.len(), width = self.config.max_width))]
    pub fn solve(&self) -> SolveOutcome<V> {
        let vertices = self.instance.vertices();

        match vertices {
            [] => {
                return SolveOutcome::Realized {
                    intervals: Vec::new(),
                    explored_cuts: 0,
                }
            }
            [only] => {
                let cut = Cut::singleton(self.instance, *only, self.config.max_width);
                return SolveOutcome::Realized {
                    intervals: cut.intervals(),
                    explored_cuts: 0,
                };
            }
            _ => {}
        }

        let mut queue = VecDeque::new();
        let mut seen: HashSet<Vec<V>> = HashSet::new();

        for &vertex in vertices {
            let cut = Cut::singleton(self.instance, vertex, self.config.max_width);
            seen.insert(cut.signature());
            queue.push_back(cut);
        }

        let mut explored_cuts = 0;

        while let Some(cut) = queue.pop_front() {
            if explored_cuts >= self.config.max_iterations {
                warn!(
                    "Search budget of {} cuts exhausted with {} cuts queued",
                    self.config.max_iterations,
                    queue.len() + 1
                );
                return SolveOutcome::BudgetExhausted { explored_cuts };
            }
            if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                warn!("Search deadline passed after {} cuts", explored_cuts);
                return SolveOutcome::TimedOut { explored_cuts };
            }
            explored_cuts += 1;

            for &vertex in vertices {
                if cut.contains(vertex) {
                    continue;
                }

                match cut.try_extend(vertex) {
                    Ok(extended) => {
                        if extended.is_complete() {
                            info!("Realization found after exploring {} cuts", explored_cuts);
                            return SolveOutcome::Realized {
                                intervals: extended.intervals(),
                                explored_cuts,
                            };
                        }

                        if seen.insert(extended.signature()) {
                            queue.push_back(extended);
                        }
                    }
                    Err(reason) => {
                        trace!("Extension of {:?} by {:?} rejected: {}", cut.domain(), vertex, reason);
                    }
                }
            }
        }

        debug!("Cut queue exhausted after {} cuts, {} distinct cuts seen", explored_cuts, seen.len());
        SolveOutcome::NoRealization { explored_cuts }
    }
}
