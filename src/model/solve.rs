use super::model_capacity::CapacityModel;
use crate::config::{Backend, SolverConfig};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc::{RecvTimeoutError, channel};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Terminal status reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unbounded,
    TimedOut,
    Error,
}

impl SolveStatus {
    /// Only optimal and feasible solutions are read back.
    pub fn is_usable(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    /// Indices into [`CapacityModel::slots`] whose variable is 1.
    pub selected: Vec<usize>,
}

impl SolveOutcome {
    pub fn new(status: SolveStatus, selected: Vec<usize>) -> Self {
        Self { status, selected }
    }

    pub fn status_only(status: SolveStatus) -> Self {
        Self::new(status, Vec::new())
    }

    /// Selected slots, or nothing when the status is not usable.
    pub fn selection(&self) -> &[usize] {
        if self.status.is_usable() {
            &self.selected
        } else {
            &[]
        }
    }
}

/// Solve a capacity model with the configured backend.
///
/// A model without variables is solved trivially. Whatever the backend reports, the
/// returned selection satisfies every constraint of the model or is empty.
pub fn solve(model: &CapacityModel, config: &SolverConfig) -> SolveOutcome {
    if model.is_empty() {
        return SolveOutcome::status_only(SolveStatus::Optimal);
    }

    debug!(
        backend = ?config.backend,
        vars = model.num_vars(),
        tags = model.tags.len(),
        "Solving capacity model"
    );
    let outcome = match config.backend {
        Backend::MicroLp => run_bounded(
            model.clone(),
            config.time_limit(),
            super::backend_microlp::solve,
        ),
        Backend::CpSat => solve_cp_sat(model, config),
    };

    if outcome.status.is_usable() && !model.is_feasible(&outcome.selected) {
        warn!(status = ?outcome.status, "Backend returned an assignment that breaks the model; discarding it");
        return SolveOutcome::status_only(SolveStatus::Error);
    }
    outcome
}

#[cfg(feature = "cp-sat")]
fn solve_cp_sat(model: &CapacityModel, config: &SolverConfig) -> SolveOutcome {
    guarded(|| super::backend_cp_sat::solve(model, config))
}

#[cfg(not(feature = "cp-sat"))]
fn solve_cp_sat(_model: &CapacityModel, _config: &SolverConfig) -> SolveOutcome {
    warn!("cp-sat backend requested but not compiled in");
    SolveOutcome::status_only(SolveStatus::Error)
}

/// Run `job` on its own thread when a time limit is set, giving up once it passes.
///
/// A job that misses the deadline is not cancelled: its thread keeps running, and keeps a CPU
/// core busy, until the solve finishes on its own. Its answer is then dropped. Panics are turned
/// into [`SolveStatus::Error`] only where unwinding is enabled; release builds abort on panic.
pub(super) fn run_bounded<F>(model: CapacityModel, limit: Option<Duration>, job: F) -> SolveOutcome
where
    F: FnOnce(&CapacityModel) -> SolveOutcome + Send + 'static,
{
    let Some(limit) = limit else {
        return guarded(|| job(&model));
    };

    let (tx, rx) = channel();
    let spawned = thread::Builder::new()
        .name("capacity-solver".into())
        .spawn(move || {
            let _ = tx.send(guarded(|| job(&model)));
        });
    if let Err(err) = spawned {
        warn!("Failed to spawn solver thread: {err}");
        return SolveOutcome::status_only(SolveStatus::Error);
    }

    match rx.recv_timeout(limit) {
        Ok(outcome) => outcome,
        Err(RecvTimeoutError::Timeout) => {
            warn!(?limit, "Capacity solve timed out");
            SolveOutcome::status_only(SolveStatus::TimedOut)
        }
        Err(RecvTimeoutError::Disconnected) => SolveOutcome::status_only(SolveStatus::Error),
    }
}

fn guarded(job: impl FnOnce() -> SolveOutcome) -> SolveOutcome {
    catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|_| {
        warn!("Capacity solver panicked");
        SolveOutcome::status_only(SolveStatus::Error)
    })
}
