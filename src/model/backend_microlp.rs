//! Pure-Rust backend: `good_lp` with the `microlp` branch and bound solver.
use super::model_capacity::CapacityModel;
use super::solve::{SolveOutcome, SolveStatus};
use good_lp::{
    Expression, ResolutionError, Solution, SolverModel, Variable, default_solver, variable,
    variables,
};
use tracing::warn;

pub(super) fn solve(model: &CapacityModel) -> SolveOutcome {
    let mut vars = variables!();
    let xs: Vec<Variable> = (0..model.num_vars())
        .map(|_| vars.add(variable().binary()))
        .collect();

    // Helper: credit-weighted sum over a set of slots, in hundredths so coefficients stay integral
    let weighted = |slots: &[usize]| {
        slots.iter().fold(Expression::from(0.0), |acc, &s| {
            acc + model.weight(s).hundredths() as f64 * xs[s]
        })
    };

    let all: Vec<usize> = (0..model.num_vars()).collect();
    let mut problem = vars.maximise(weighted(&all[..])).using(default_solver);

    // Tag caps
    for (t, slots) in model.slots_by_tag.iter().enumerate() {
        if slots.is_empty() {
            continue;
        }
        problem.add_constraint(weighted(slots.as_slice()).leq(model.caps[t].hundredths() as f64));
    }

    // One tag per course
    for slots in &model.slots_by_course {
        if slots.len() <= 1 {
            continue;
        }
        let uses = slots
            .iter()
            .fold(Expression::from(0.0), |acc, &s| acc + xs[s]);
        problem.add_constraint(uses.leq(1.0));
    }

    match problem.solve() {
        Ok(solution) => {
            let selected = xs
                .iter()
                .enumerate()
                .filter(|(_, x)| solution.value(**x) >= 0.5)
                .map(|(s, _)| s)
                .collect();
            SolveOutcome::new(SolveStatus::Optimal, selected)
        }
        Err(ResolutionError::Infeasible) => SolveOutcome::status_only(SolveStatus::Infeasible),
        Err(ResolutionError::Unbounded) => SolveOutcome::status_only(SolveStatus::Unbounded),
        Err(err) => {
            warn!("microlp failed: {err}");
            SolveOutcome::status_only(SolveStatus::Error)
        }
    }
}
