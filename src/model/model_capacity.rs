//! Building the 0/1 assignment model for capacity tags.
use crate::catalog::{CoursePool, Credits};
use crate::requirements::TagCap;
use std::collections::HashMap;

/// A decision variable: course `course` (pool index) counted toward tag `tag`
/// (index into [`CapacityModel::tags`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub course: usize,
    pub tag: usize,
}

/// Backend-agnostic description of a capacity phase.
///
/// maximize   Σ credits(c) · x[c,t]
/// subject to Σ_c credits(c) · x[c,t] ≤ cap(t)   for every tag t
///            Σ_t x[c,t] ≤ 1                     for every course c
///            x ∈ {0, 1}
///
/// Variables only exist for tags that carry a non-zero cap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapacityModel {
    pub tags: Vec<String>,
    pub caps: Vec<Credits>,
    /// Credits of every pool course, by pool index.
    pub credits: Vec<Credits>,
    pub slots: Vec<Slot>,
    pub slots_by_tag: Vec<Vec<usize>>,
    pub slots_by_course: Vec<Vec<usize>>,
}

impl CapacityModel {
    pub fn build(caps: &[TagCap], pool: &CoursePool) -> Self {
        let mut model = CapacityModel::default();

        // Helper: tag name -> index; the first cap given for a tag wins
        let mut tag_idx: HashMap<&str, usize> = HashMap::new();
        for tag_cap in caps {
            if tag_idx.contains_key(tag_cap.tag.as_str()) {
                continue;
            }
            tag_idx.insert(tag_cap.tag.as_str(), model.tags.len());
            model.tags.push(tag_cap.tag.clone());
            model.caps.push(tag_cap.cap);
        }
        model.slots_by_tag = vec![Vec::new(); model.tags.len()];

        for (c, course) in pool.iter().enumerate() {
            model.credits.push(course.credits);
            let mut course_slots = Vec::new();
            for attribute in &course.attributes {
                let Some(&t) = tag_idx.get(attribute.as_str()) else {
                    continue;
                };
                // Nothing fits under a zero cap
                if model.caps[t].is_zero() {
                    continue;
                }
                // Repeated attributes on one course map to the same slot
                if course_slots
                    .iter()
                    .any(|&s: &usize| model.slots[s].tag == t)
                {
                    continue;
                }
                let s = model.slots.len();
                model.slots.push(Slot { course: c, tag: t });
                model.slots_by_tag[t].push(s);
                course_slots.push(s);
            }
            model.slots_by_course.push(course_slots);
        }

        model
    }

    pub fn num_vars(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Objective (and tag-load) coefficient of a variable.
    pub fn weight(&self, slot: usize) -> Credits {
        self.credits[self.slots[slot].course]
    }

    /// Check a set of chosen variables against every constraint of the model.
    pub fn is_feasible(&self, selected: &[usize]) -> bool {
        let mut load = vec![Credits::ZERO; self.tags.len()];
        let mut used = vec![false; self.credits.len()];
        for &s in selected {
            let Some(slot) = self.slots.get(s) else {
                return false;
            };
            if std::mem::replace(&mut used[slot.course], true) {
                return false;
            }
            load[slot.tag] += self.weight(s);
        }
        load.iter().zip(&self.caps).all(|(&l, &cap)| l <= cap)
    }

    pub fn objective_value(&self, selected: &[usize]) -> Credits {
        selected.iter().map(|&s| self.weight(s)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Course;

    fn caps(entries: &[(&str, u32)]) -> Vec<TagCap> {
        entries
            .iter()
            .map(|&(tag, cap)| TagCap {
                tag: tag.into(),
                cap: Credits::whole(cap),
            })
            .collect()
    }

    #[test]
    fn test_variables_only_for_capped_tags() {
        let pool = CoursePool::new(vec![
            Course::new("C1", ["math", "science"], 3),
            Course::new("C2", ["art"], 2),
            Course::new("C3", ["science", "science"], 4),
        ])
        .unwrap();
        let model = CapacityModel::build(&caps(&[("science", 6), ("math", 3)]), &pool);

        assert_eq!(model.tags, ["science", "math"]);
        assert_eq!(
            model.slots,
            vec![
                Slot { course: 0, tag: 1 },
                Slot { course: 0, tag: 0 },
                Slot { course: 2, tag: 0 },
            ]
        );
        assert_eq!(model.slots_by_tag, vec![vec![1, 2], vec![0]]);
        assert_eq!(model.slots_by_course, vec![vec![0, 1], vec![], vec![2]]);
        assert_eq!(model.weight(2), Credits::whole(4));
    }

    #[test]
    fn test_codes_with_separators_stay_distinct() {
        let pool = CoursePool::new(vec![
            Course::new("MAT_101", ["lab_a"], 3),
            Course::new("MAT", ["101_lab_a"], 2),
        ])
        .unwrap();
        let model = CapacityModel::build(&caps(&[("lab_a", 9), ("101_lab_a", 9)]), &pool);

        assert_eq!(model.num_vars(), 2);
        assert_eq!(model.slots[0], Slot { course: 0, tag: 0 });
        assert_eq!(model.slots[1], Slot { course: 1, tag: 1 });
    }

    #[test]
    fn test_feasibility_check() {
        let pool = CoursePool::new(vec![
            Course::new("C1", ["a", "b"], 3),
            Course::new("C2", ["a"], 4),
        ])
        .unwrap();
        let model = CapacityModel::build(&caps(&[("a", 4), ("b", 3)]), &pool);
        // slots: 0 = C1/a, 1 = C1/b, 2 = C2/a
        assert!(model.is_feasible(&[1, 2]));
        assert_eq!(model.objective_value(&[1, 2]), Credits::whole(7));
        assert!(!model.is_feasible(&[0, 1]), "course used twice");
        assert!(!model.is_feasible(&[0, 2]), "cap of a exceeded");
        assert!(!model.is_feasible(&[9]));
    }

    #[test]
    fn test_zero_cap_tag_has_no_variables() {
        let pool = CoursePool::new(vec![
            Course::new("Z", ["free"], 0),
            Course::new("C1", ["free", "math"], 3),
        ])
        .unwrap();
        let model = CapacityModel::build(&caps(&[("free", 0), ("math", 3)]), &pool);

        assert_eq!(model.tags, ["free", "math"]);
        assert_eq!(model.slots, vec![Slot { course: 1, tag: 1 }]);
        assert!(model.slots_by_tag[0].is_empty());
    }

    #[test]
    fn test_fractional_cap_is_exact() {
        let pool = CoursePool::new(vec![
            Course::new("L1", ["lab"], Credits::from_hundredths(150)),
            Course::new("L2", ["lab"], Credits::whole(2)),
        ])
        .unwrap();
        let caps = vec![TagCap {
            tag: "lab".into(),
            cap: Credits::from_hundredths(350),
        }];
        let model = CapacityModel::build(&caps, &pool);

        assert!(model.is_feasible(&[0, 1]));
        assert_eq!(model.objective_value(&[0, 1]), Credits::from_hundredths(350));
    }

    #[test]
    fn test_empty_caps_give_empty_model() {
        let pool = CoursePool::new(vec![Course::new("C1", ["math"], 3)]).unwrap();
        let model = CapacityModel::build(&[], &pool);
        assert!(model.is_empty());
        assert!(model.tags.is_empty());
    }
}
