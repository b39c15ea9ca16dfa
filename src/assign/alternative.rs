//! Alternative ("OR") requisites: pick the best-valued bundle for each one, in order.
use super::PhaseOutcome;
use crate::catalog::{AssignedCourse, CoursePool, Credits};
use crate::requirements::AlternativeRequisite;
use std::collections::HashSet;
use tracing::debug;

/// Credit a bundle is worth against `pool`, with the courses that realize it.
///
/// Codes missing from the pool add nothing; a code listed twice counts once.
fn realize<'a>(option: &'a [String], pool: &CoursePool) -> (Credits, Vec<&'a str>) {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut credits = Credits::ZERO;
    let mut codes = Vec::new();
    for code in option {
        let Some(course) = pool.get(code) else {
            continue;
        };
        if seen.insert(code.as_str()) {
            credits += course.credits;
            codes.push(code.as_str());
        }
    }
    (credits, codes)
}

/// Resolve alternative requisites greedily against `pool`.
///
/// Each requisite takes its option with the strictly highest realizable credit (the first
/// such option on ties; never one worth 0) and removes those courses before the next
/// requisite is considered.
pub fn resolve(requisites: &[AlternativeRequisite], pool: &CoursePool) -> PhaseOutcome {
    let mut outcome = PhaseOutcome::untouched(pool.clone());

    for requisite in requisites {
        if outcome.remaining.is_empty() {
            break;
        }

        let mut best: Option<Vec<&str>> = None;
        let mut best_credits = Credits::ZERO;
        for option in &requisite.options {
            let (credits, codes) = realize(option, &outcome.remaining);
            if credits > best_credits {
                best_credits = credits;
                best = Some(codes);
            }
        }

        let Some(codes) = best else {
            debug!(requisite = %requisite.name, "No option yields credit");
            continue;
        };

        let chosen: Vec<AssignedCourse> = codes
            .iter()
            .filter_map(|code| outcome.remaining.get(code))
            .map(AssignedCourse::from)
            .collect();
        let used: HashSet<&str> = codes.into_iter().collect();
        debug!(requisite = %requisite.name, credits = %best_credits, courses = ?used, "Alternative resolved");

        outcome.remaining = outcome.remaining.without(&used);
        outcome.credits += best_credits;
        outcome.map.insert(requisite.name.clone(), chosen);
    }

    outcome
}
