use crate::config::Config;
use crate::graph::PedigreeGraph;
use crate::pedigree::PedigreeFamily;
use crate::reports::PedigreeReport;
use crate::sandwich::{ProblemSolver, SolverConfig};
use anyhow::{Context, Result};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub solver: SolverConfig,
    pub timeout_seconds: u64,
    pub parallel_execution: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            timeout_seconds: 60,
            parallel_execution: true,
        }
    }
}

impl From<&Config> for OrchestratorConfig {
    fn from(config: &Config) -> Self {
        Self {
            solver: config.solver.solver_config(),
            timeout_seconds: config.solver.timeout_seconds,
            parallel_execution: config.solver.parallel_execution,
        }
    }
}

/// Runs the graph engine and the sandwich search over every family of an input
pub struct PedigreeOrchestrator {
    config: OrchestratorConfig,
}

impl PedigreeOrchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// Solve all families, in parallel or one after the other depending on the configuration.
    ///
    /// Reports come back in the order of `families`.
    pub async fn solve_families(&self, families: Vec<PedigreeFamily>) -> Result<Vec<PedigreeReport>> {
        info!(
            "Solving {} pedigrees ({})",
            families.len(),
            if self.config.parallel_execution { "parallel" } else { "sequential" }
        );

        let families: Vec<Arc<PedigreeFamily>> = families.into_iter().map(Arc::new).collect();

        if self.config.parallel_execution {
            let results = join_all(
                families
                    .into_iter()
                    .map(|family| self.solve_with_deadline(family)),
            )
            .await;
            results.into_iter().collect()
        } else {
            let mut reports = Vec::with_capacity(families.len());
            for family in families {
                reports.push(self.solve_with_deadline(family).await?);
            }
            Ok(reports)
        }
    }

    #[instrument(skip(self, family), fields(pedigree = family.pedigree_id()))]
    async fn solve_with_deadline(&self, family: Arc<PedigreeFamily>) -> Result<PedigreeReport> {
        let deadline = Instant::now() + Duration::from_secs(self.config.timeout_seconds);
        let solver = self.config.solver;

        let task = {
            let family = Arc::clone(&family);
            tokio::task::spawn_blocking(move || solve_family(&family, solver, Some(deadline)))
        };

        task.await
            .with_context(|| format!("Solver task for pedigree {} failed", family.pedigree_id()))
    }
}

/// Build the graphs of one family, search for its layout and summarize the result.
///
/// The search gives up with a timed out report once `deadline` has passed.
pub fn solve_family(family: &PedigreeFamily, solver: SolverConfig, deadline: Option<Instant>) -> PedigreeReport {
    let started = Instant::now();

    let graph = PedigreeGraph::build(family);
    let instance = graph.instance();
    let mut problem = ProblemSolver::new(&instance, solver);
    if let Some(deadline) = deadline {
        problem = problem.with_deadline(deadline);
    }
    let outcome = problem.solve();

    if !outcome.is_realized() {
        error!(
            "No layout for pedigree {} within width {}: {}",
            family.pedigree_id(),
            solver.max_width,
            outcome.status()
        );
    }

    PedigreeReport::new(family, &graph, &outcome, started.elapsed())
}
