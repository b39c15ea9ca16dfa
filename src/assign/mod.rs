//! Assignment orchestration: alternative → capacity → mandatory.
//!
//! Each phase takes a pool and returns what it assigned plus the pool it left behind;
//! the next phase only ever sees the leftovers.

mod alternative;
mod capacity;

pub use alternative::resolve as resolve_alternatives;
pub use capacity::optimize as optimize_capacity;

use crate::catalog::{AssignedCourse, Course, CoursePool, Credits};
use crate::config::EngineConfig;
use crate::error::{InvalidInput, Result};
use crate::requirements::{RequirementSection, Requirements};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Courses recorded per requirement tag.
pub type Mapping = BTreeMap<String, Vec<AssignedCourse>>;

/// What one phase assigned, and the pool it hands on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOutcome {
    pub credits: Credits,
    pub map: Mapping,
    pub remaining: CoursePool,
}

impl PhaseOutcome {
    pub(crate) fn untouched(pool: CoursePool) -> Self {
        Self {
            credits: Credits::ZERO,
            map: Mapping::new(),
            remaining: pool,
        }
    }
}

/// Final result of an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Total credit over every course in `mapping`.
    pub credits: Credits,
    pub mapping: Mapping,
    /// Catalog courses not assigned anywhere, in catalog order.
    pub unused: Vec<Course>,
}

/// Runs the assignment phases with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Assigner {
    config: EngineConfig,
}

impl Assigner {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Assign catalog courses to the requirements described by `sections`.
    pub fn assign(&self, sections: &[RequirementSection], catalog: &[Course]) -> Result<Assignment> {
        let requirements = Requirements::from_sections(sections);
        self.assign_requirements(&requirements, catalog)
    }

    /// Like [`Assigner::assign`], for loosely-typed JSON.
    ///
    /// Both arguments must be JSON arrays. Sections that carry no `requisites` list are
    /// skipped; catalog entries must all be valid courses.
    pub fn assign_values(&self, sections: &Value, catalog: &Value) -> Result<Assignment> {
        let Some(sections) = sections.as_array() else {
            return Err(InvalidInput::NotASequence {
                argument: "requirement sections",
            }
            .into());
        };
        let Some(catalog) = catalog.as_array() else {
            return Err(InvalidInput::NotASequence {
                argument: "course catalog",
            }
            .into());
        };

        let courses = catalog
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                Course::deserialize(entry).map_err(|err| InvalidInput::MalformedCourse {
                    index,
                    reason: err.to_string(),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let requirements = Requirements::from_values(sections);
        self.assign_requirements(&requirements, &courses)
    }

    /// Run the three phases over already-normalized requirements.
    pub fn assign_requirements(
        &self,
        requirements: &Requirements,
        catalog: &[Course],
    ) -> Result<Assignment> {
        let pool = CoursePool::new(catalog.to_vec())?;
        if self.config.reject_tag_collisions {
            if let Some(tag) = requirements.tag_collisions().into_iter().next() {
                return Err(InvalidInput::TagCollision(tag).into());
            }
        }

        let alternative = resolve_alternatives(&requirements.alternative, &pool);
        debug!(credits = %alternative.credits, requisites = alternative.map.len(), "Alternative phase done");

        let bags = optimize_capacity(
            &requirements.capacity,
            &alternative.remaining,
            &self.config.solver,
        );
        debug!(credits = %bags.credits, "Capacity phase done");

        let must = optimize_capacity(
            &requirements.mandatory,
            &bags.remaining,
            &self.config.solver,
        );
        debug!(credits = %must.credits, "Mandatory phase done");

        let credits = alternative.credits + bags.credits + must.credits;
        // A tag listed by more than one phase keeps every course assigned to it
        let mut mapping = alternative.map;
        for (tag, courses) in bags.map.into_iter().chain(must.map) {
            mapping.entry(tag).or_default().extend(courses);
        }
        let unused = must.remaining.into_courses();

        info!(
            %credits,
            assigned = catalog.len() - unused.len(),
            unused = unused.len(),
            "Assignment complete"
        );
        Ok(Assignment {
            credits,
            mapping,
            unused,
        })
    }
}

/// Assign with the default configuration.
pub fn assign(sections: &[RequirementSection], catalog: &[Course]) -> Result<Assignment> {
    Assigner::default().assign(sections, catalog)
}

/// Assign loosely-typed JSON input with the default configuration.
pub fn assign_values(sections: &Value, catalog: &Value) -> Result<Assignment> {
    Assigner::default().assign_values(sections, catalog)
}
