//! Graduation requirement assignment engine.
//!
//! Courses from a catalog are matched against a program's requirement sections in three
//! phases:
//! - **alternative** requisites pick the best-valued bundle of courses, greedily;
//! - **capacity** tags are filled by a 0/1 integer program bounded by per-tag credit caps;
//! - **mandatory** tags are filled the same way from whatever courses remain.
//!
//! Every phase consumes a [`CoursePool`] and hands its leftovers to the next one, so a
//! course is never credited twice.

pub mod assign;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod requirements;

pub use assign::{Assigner, Assignment, PhaseOutcome, assign, assign_values};
pub use catalog::{AssignedCourse, Course, CourseCode, CoursePool, Credits};
pub use config::{Backend, EngineConfig, SolverConfig};
pub use error::{AssignError, ConfigError, InvalidInput, Result};
pub use model::{CapacityModel, SolveOutcome, SolveStatus};
pub use requirements::{
    AlternativeRequisite, RequirementSection, Requirements, Requisite, Rule, TagCap,
};
