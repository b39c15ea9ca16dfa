//! Capacity-bounded tags (the "bags" and "must" phases).
use super::PhaseOutcome;
use crate::catalog::{AssignedCourse, CoursePool};
use crate::config::SolverConfig;
use crate::model::{self, CapacityModel};
use crate::requirements::TagCap;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Fill capped tags from `pool`, maximizing assigned credit.
///
/// Every tag shows up in the outcome map, possibly with no courses. An unusable solver
/// status leaves the whole phase empty.
pub fn optimize(caps: &[TagCap], pool: &CoursePool, solver: &SolverConfig) -> PhaseOutcome {
    let mut outcome = PhaseOutcome::untouched(pool.clone());
    for tag_cap in caps {
        outcome.map.entry(tag_cap.tag.clone()).or_default();
    }
    if caps.is_empty() || pool.is_empty() {
        return outcome;
    }

    let model = CapacityModel::build(caps, pool);
    let solved = model::solve(&model, solver);
    if !solved.status.is_usable() {
        warn!(status = ?solved.status, tags = model.tags.len(), "Capacity phase left empty");
        return outcome;
    }

    let courses = pool.courses();
    let mut used: HashSet<&str> = HashSet::new();
    for &s in solved.selection() {
        let slot = model.slots[s];
        let course = &courses[slot.course];
        if !used.insert(course.code.as_str()) {
            continue;
        }
        outcome
            .map
            .entry(model.tags[slot.tag].clone())
            .or_default()
            .push(AssignedCourse::from(course));
        outcome.credits += course.credits;
    }
    debug!(
        status = ?solved.status,
        credits = %outcome.credits,
        courses = used.len(),
        "Capacity phase solved"
    );

    outcome.remaining = pool.without(&used);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Course, Credits};

    fn caps(entries: &[(&str, u32)]) -> Vec<TagCap> {
        entries
            .iter()
            .map(|&(tag, cap)| TagCap {
                tag: tag.into(),
                cap: Credits::whole(cap),
            })
            .collect()
    }

    fn load(outcome: &PhaseOutcome, tag: &str) -> Credits {
        outcome.map[tag].iter().map(|c| c.credits).sum()
    }

    #[test]
    fn test_caps_are_respected() {
        let pool = CoursePool::new(vec![
            Course::new("E1", ["elective"], 3),
            Course::new("E2", ["elective"], 4),
            Course::new("E3", ["elective"], 2),
        ])
        .unwrap();
        let outcome = optimize(&caps(&[("elective", 6)]), &pool, &SolverConfig::default());

        assert_eq!(outcome.credits, Credits::whole(6));
        assert_eq!(load(&outcome, "elective"), Credits::whole(6));
        assert_eq!(outcome.remaining.len(), 1);
        assert!(outcome.remaining.contains("E1"));
    }

    #[test]
    fn test_shared_course_used_once() {
        let pool = CoursePool::new(vec![
            Course::new("S", ["math", "science"], 4),
            Course::new("M", ["math"], 3),
        ])
        .unwrap();
        let outcome = optimize(
            &caps(&[("math", 4), ("science", 4)]),
            &pool,
            &SolverConfig::default(),
        );

        // S goes to science so M can fill math
        assert_eq!(outcome.credits, Credits::whole(7));
        assert_eq!(outcome.map["science"][0].code, "S");
        assert_eq!(outcome.map["math"][0].code, "M");
        assert!(outcome.remaining.is_empty());
    }

    #[test]
    fn test_zero_cap_gets_nothing() {
        let pool = CoursePool::new(vec![
            Course::new("A", ["closed"], 3),
            Course::new("B", ["open"], 3),
        ])
        .unwrap();
        let outcome = optimize(
            &caps(&[("closed", 0), ("open", 3)]),
            &pool,
            &SolverConfig::default(),
        );

        assert!(outcome.map["closed"].is_empty());
        assert_eq!(load(&outcome, "open"), Credits::whole(3));
        assert_eq!(outcome.credits, Credits::whole(3));
        assert!(outcome.remaining.contains("A"));
    }

    #[test]
    fn test_tags_without_candidates_are_listed_empty() {
        let pool = CoursePool::new(vec![Course::new("A", ["art"], 3)]).unwrap();
        let outcome = optimize(&caps(&[("lab", 2)]), &pool, &SolverConfig::default());

        assert_eq!(outcome.credits, Credits::ZERO);
        assert!(outcome.map["lab"].is_empty());
        assert_eq!(outcome.remaining, pool);
    }

    #[test]
    fn test_fractional_credits_under_fractional_cap() {
        let pool = CoursePool::new(vec![
            Course::new("LAB1", ["lab"], Credits::from_hundredths(150)),
            Course::new("LAB2", ["lab"], Credits::whole(2)),
            Course::new("LAB3", ["lab"], Credits::from_hundredths(125)),
        ])
        .unwrap();
        let cap = TagCap {
            tag: "lab".into(),
            cap: Credits::from_hundredths(350),
        };
        let outcome = optimize(&[cap], &pool, &SolverConfig::default());

        // 1.5 + 2 fills 3.5 exactly; any pair with 1.25 falls short
        assert_eq!(outcome.credits, Credits::from_hundredths(350));
        assert_eq!(load(&outcome, "lab"), Credits::from_hundredths(350));
        assert!(outcome.remaining.contains("LAB3"));
    }

    #[test]
    fn test_no_caps_leaves_pool_alone() {
        let pool = CoursePool::new(vec![Course::new("A", ["art"], 3)]).unwrap();
        let outcome = optimize(&[], &pool, &SolverConfig::default());

        assert!(outcome.map.is_empty());
        assert_eq!(outcome.remaining, pool);
    }
}
