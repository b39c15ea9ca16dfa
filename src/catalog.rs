//! Course records and the pools that assignment phases draw from.

use crate::error::InvalidInput;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

pub type CourseCode = String;

/// A non-negative credit amount, held as a whole number of hundredths.
///
/// Fractional credits such as `1.5` are exact; anything finer is rounded to the nearest
/// hundredth. Sums saturate instead of wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Credits(u64);

impl Credits {
    pub const ZERO: Credits = Credits(0);
    /// Hundredths per credit.
    pub const SCALE: u64 = 100;
    /// Largest amount accepted from input, in credits.
    pub const MAX_INPUT: f64 = 1e12;

    pub const fn whole(credits: u32) -> Self {
        Credits(credits as u64 * Self::SCALE)
    }

    pub const fn from_hundredths(hundredths: u64) -> Self {
        Credits(hundredths)
    }

    /// Convert a JSON-style number, rejecting negative, non-finite and absurdly large values.
    pub fn from_f64(credits: f64) -> Option<Self> {
        if !credits.is_finite() || credits < 0.0 || credits > Self::MAX_INPUT {
            return None;
        }
        Some(Credits((credits * Self::SCALE as f64).round() as u64))
    }

    pub const fn hundredths(self) -> u64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Credits {
    fn from(credits: u32) -> Self {
        Credits::whole(credits)
    }
}

impl Add for Credits {
    type Output = Credits;

    fn add(self, rhs: Credits) -> Credits {
        Credits(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Credits {
    fn add_assign(&mut self, rhs: Credits) {
        *self = *self + rhs;
    }
}

impl Sum for Credits {
    fn sum<I: Iterator<Item = Credits>>(iter: I) -> Credits {
        iter.fold(Credits::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Credits> for Credits {
    fn sum<I: Iterator<Item = &'a Credits>>(iter: I) -> Credits {
        iter.copied().sum()
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % Self::SCALE == 0 {
            write!(f, "{}", self.0 / Self::SCALE)
        } else {
            write!(f, "{}", self.as_f64())
        }
    }
}

// Whole amounts serialize as integers so `3` stays `3`, not `3.0`.
impl Serialize for Credits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % Self::SCALE == 0 {
            serializer.serialize_u64(self.0 / Self::SCALE)
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Credits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Credits::from_f64(raw).ok_or_else(|| {
            D::Error::custom(format!("credits must be a non-negative number, got {raw}"))
        })
    }
}

/// A catalog course. Never mutated once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    #[serde(alias = "codigo")]
    pub code: CourseCode,
    /// Requirement tags this course can count toward.
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(alias = "creditos")]
    pub credits: Credits,
}

impl Course {
    pub fn new<I, S>(
        code: impl Into<CourseCode>,
        attributes: I,
        credits: impl Into<Credits>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            code: code.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
            credits: credits.into(),
        }
    }

    pub fn has_attribute(&self, tag: &str) -> bool {
        self.attributes.iter().any(|a| a == tag)
    }
}

/// A course as recorded under a requirement in an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedCourse {
    #[serde(alias = "codigo")]
    pub code: CourseCode,
    #[serde(alias = "creditos")]
    pub credits: Credits,
}

impl From<&Course> for AssignedCourse {
    fn from(course: &Course) -> Self {
        Self {
            code: course.code.clone(),
            credits: course.credits,
        }
    }
}

/// An ordered set of courses keyed by code.
///
/// Phases never shrink a pool in place; [`CoursePool::without`] derives a new one, keeping
/// catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoursePool {
    courses: Vec<Course>,
    index: HashMap<CourseCode, usize>,
}

impl CoursePool {
    /// Build a pool, rejecting duplicate course codes.
    pub fn new(courses: Vec<Course>) -> Result<Self, InvalidInput> {
        let mut index = HashMap::with_capacity(courses.len());
        for (i, course) in courses.iter().enumerate() {
            if index.insert(course.code.clone(), i).is_some() {
                return Err(InvalidInput::DuplicateCourse(course.code.clone()));
            }
        }
        Ok(Self { courses, index })
    }

    pub fn get(&self, code: &str) -> Option<&Course> {
        self.index.get(code).map(|&i| &self.courses[i])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Course> {
        self.courses.iter()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// A new pool holding every course whose code is not in `used`.
    pub fn without(&self, used: &HashSet<&str>) -> CoursePool {
        let courses: Vec<Course> = self
            .courses
            .iter()
            .filter(|c| !used.contains(c.code.as_str()))
            .cloned()
            .collect();
        let index = courses
            .iter()
            .enumerate()
            .map(|(i, c)| (c.code.clone(), i))
            .collect();
        CoursePool { courses, index }
    }

    pub fn into_courses(self) -> Vec<Course> {
        self.courses
    }
}

impl<'a> IntoIterator for &'a CoursePool {
    type Item = &'a Course;
    type IntoIter = std::slice::Iter<'a, Course>;

    fn into_iter(self) -> Self::IntoIter {
        self.courses.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> CoursePool {
        CoursePool::new(vec![
            Course::new("C1", ["math"], 3),
            Course::new("C2", ["math", "elective"], 4),
            Course::new("C3", ["elective"], 3),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let err = CoursePool::new(vec![
            Course::new("C1", ["math"], 3),
            Course::new("C1", ["elective"], 2),
        ])
        .unwrap_err();
        assert_eq!(err, InvalidInput::DuplicateCourse("C1".into()));
    }

    #[test]
    fn test_without_keeps_order_and_source() {
        let pool = pool();
        let used: HashSet<&str> = ["C2"].into_iter().collect();
        let rest = pool.without(&used);

        let codes: Vec<_> = rest.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, ["C1", "C3"]);
        assert!(rest.get("C2").is_none());
        assert_eq!(rest.get("C3").map(|c| c.credits), Some(Credits::whole(3)));
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_course_field_aliases() {
        let course: Course =
            serde_json::from_str(r#"{"codigo":"MAT101","attributes":["math"],"creditos":4}"#)
                .unwrap();
        assert_eq!(course, Course::new("MAT101", ["math"], 4));

        let bare: Course = serde_json::from_str(r#"{"code":"X","credits":0}"#).unwrap();
        assert!(bare.attributes.is_empty());
    }

    #[test]
    fn test_fractional_credits_round_trip() {
        let course: Course =
            serde_json::from_str(r#"{"code":"LAB","attributes":["lab"],"credits":1.5}"#).unwrap();
        assert_eq!(course.credits, Credits::from_hundredths(150));
        assert_eq!(course.credits.to_string(), "1.5");

        let json = serde_json::to_value(&course).unwrap();
        assert_eq!(json["credits"], serde_json::json!(1.5));
        let whole = serde_json::to_value(Credits::whole(4)).unwrap();
        assert_eq!(whole, serde_json::json!(4));
    }

    #[test]
    fn test_invalid_credit_amounts_rejected() {
        for raw in ["-1", "1e300", "\"3\""] {
            let json = format!(r#"{{"code":"X","credits":{raw}}}"#);
            assert!(serde_json::from_str::<Course>(&json).is_err(), "{raw} accepted");
        }
        assert_eq!(Credits::from_f64(f64::NAN), None);
        assert_eq!(Credits::from_f64(0.004), Some(Credits::ZERO));
    }

    #[test]
    fn test_large_sums_saturate() {
        let big = Credits::whole(u32::MAX);
        assert_eq!((big + Credits::whole(1)).hundredths(), (u64::from(u32::MAX) + 1) * 100);
        let max = Credits::from_hundredths(u64::MAX);
        assert_eq!(max + big, max);
        let total: Credits = [big, big, Credits::whole(2)].iter().sum();
        assert_eq!(total, Credits::whole(u32::MAX) + Credits::whole(u32::MAX) + Credits::whole(2));
    }
}
