//! OR-Tools CP-SAT backend.
use super::model_capacity::CapacityModel;
use super::solve::{SolveOutcome, SolveStatus};
use crate::catalog::Credits;
use crate::config::SolverConfig;
use cp_sat::builder::{BoolVar, CpModelBuilder, LinearExpr};
use cp_sat::proto::{CpSolverStatus, SatParameters};

/// Integer coefficient in hundredths of a credit.
fn scaled(credits: Credits) -> i64 {
    i64::try_from(credits.hundredths()).unwrap_or(i64::MAX)
}

pub(super) fn solve(model: &CapacityModel, config: &SolverConfig) -> SolveOutcome {
    let mut params = SatParameters::default();
    params.max_time_in_seconds = config.time_limit_secs;
    params.num_search_workers = Some(config.num_workers as i32);
    params.random_seed = Some(config.random_seed);
    params.log_search_progress = Some(false);

    let mut builder = CpModelBuilder::default();
    let xs: Vec<BoolVar> = (0..model.num_vars())
        .map(|_| builder.new_bool_var())
        .collect();

    let weighted = |slots: &[usize]| -> LinearExpr {
        slots
            .iter()
            .map(|&s| (scaled(model.weight(s)), xs[s].clone()))
            .collect()
    };

    for (t, slots) in model.slots_by_tag.iter().enumerate() {
        if slots.is_empty() {
            continue;
        }
        builder.add_le(weighted(slots.as_slice()), LinearExpr::from(scaled(model.caps[t])));
    }

    for slots in &model.slots_by_course {
        if slots.len() <= 1 {
            continue;
        }
        let uses: LinearExpr = slots.iter().map(|&s| (1, xs[s].clone())).collect();
        builder.add_le(uses, LinearExpr::from(1));
    }

    let all: Vec<usize> = (0..model.num_vars()).collect();
    builder.maximize(weighted(&all[..]));

    let response = builder.solve_with_parameters(&params);
    let status = match response.status() {
        CpSolverStatus::Optimal => SolveStatus::Optimal,
        CpSolverStatus::Feasible => SolveStatus::Feasible,
        CpSolverStatus::Infeasible => SolveStatus::Infeasible,
        // Unknown means the search stopped before finding anything
        CpSolverStatus::Unknown if config.time_limit_secs.is_some() => SolveStatus::TimedOut,
        _ => SolveStatus::Error,
    };
    if !status.is_usable() {
        return SolveOutcome::status_only(status);
    }

    let selected = xs
        .iter()
        .enumerate()
        .filter(|(_, x)| x.solution_value(&response))
        .map(|(s, _)| s)
        .collect();
    SolveOutcome::new(status, selected)
}
