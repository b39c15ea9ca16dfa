//! Requirement sections and their normalization into rule buckets.
//!
//! A program stores its requirements as a list of sections, each carrying requisites of
//! the form `{rule, data}`. Sections may contribute to the same rule, so their `data`
//! mappings are merged per rule: list values are concatenated, anything else is
//! overwritten by the later section.

use crate::catalog::{CourseCode, Credits};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Kind of a requisite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rule {
    /// One of several course bundles; the best-valued one is taken.
    #[serde(alias = "or")]
    Alternative,
    /// Any courses carrying a tag, up to a credit cap.
    #[serde(alias = "bags")]
    Capacity,
    /// Same shape as [`Rule::Capacity`], filled last.
    #[serde(alias = "must")]
    Mandatory,
}

impl Rule {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "alternative" | "or" => Some(Self::Alternative),
            "capacity" | "bags" => Some(Self::Capacity),
            "mandatory" | "must" => Some(Self::Mandatory),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alternative => "alternative",
            Self::Capacity => "capacity",
            Self::Mandatory => "mandatory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requisite {
    pub rule: Rule,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementSection {
    #[serde(default)]
    pub requisites: Vec<Requisite>,
}

impl RequirementSection {
    /// Read a section from loosely-typed JSON.
    ///
    /// Returns `None` when the value has no `requisites` list. Requisites with an unknown
    /// rule or a non-object `data` are dropped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let requisites = value.get("requisites")?.as_array()?;
        let requisites = requisites
            .iter()
            .filter_map(|req| {
                let Some(rule_name) = req.get("rule").and_then(Value::as_str) else {
                    warn!("Skipping requisite without a rule name: {req}");
                    return None;
                };
                let Some(rule) = Rule::parse(rule_name) else {
                    warn!(rule = rule_name, "Skipping requisite with unknown rule");
                    return None;
                };
                let Some(data) = req.get("data").and_then(Value::as_object) else {
                    warn!(rule = rule_name, "Skipping requisite whose data is not a mapping");
                    return None;
                };
                Some(Requisite {
                    rule,
                    data: data.clone(),
                })
            })
            .collect();
        Some(Self { requisites })
    }

    /// Read every section of a list, skipping entries that are not sections.
    pub fn from_values(values: &[Value]) -> Vec<Self> {
        values.iter().filter_map(Self::from_value).collect()
    }
}

/// One alternative requisite: the bundles of courses that can satisfy it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeRequisite {
    pub name: String,
    pub options: Vec<Vec<CourseCode>>,
}

/// A credit cap on a requirement tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCap {
    pub tag: String,
    pub cap: Credits,
}

/// Requirements sorted into the three rule buckets.
///
/// Entries keep the order in which their keys were first seen across sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    pub alternative: Vec<AlternativeRequisite>,
    pub capacity: Vec<TagCap>,
    pub mandatory: Vec<TagCap>,
}

/// Merge the `data` of every requisite into one mapping per rule.
pub fn merge_sections(sections: &[RequirementSection]) -> BTreeMap<Rule, Map<String, Value>> {
    let mut buckets: BTreeMap<Rule, Map<String, Value>> = BTreeMap::new();
    for requisite in sections.iter().flat_map(|s| &s.requisites) {
        let bucket = buckets.entry(requisite.rule).or_default();
        for (key, incoming) in &requisite.data {
            if let (Some(Value::Array(existing)), Value::Array(more)) =
                (bucket.get_mut(key), incoming)
            {
                existing.extend(more.iter().cloned());
                continue;
            }
            bucket.insert(key.clone(), incoming.clone());
        }
    }
    buckets
}

impl Requirements {
    /// Normalize typed sections.
    pub fn from_sections(sections: &[RequirementSection]) -> Self {
        let mut buckets = merge_sections(sections);
        let mut take = |rule: Rule| buckets.remove(&rule).unwrap_or_default();
        Self {
            alternative: alternatives_from(take(Rule::Alternative)),
            capacity: caps_from(Rule::Capacity, take(Rule::Capacity)),
            mandatory: caps_from(Rule::Mandatory, take(Rule::Mandatory)),
        }
    }

    /// Normalize sections given as loosely-typed JSON.
    pub fn from_values(values: &[Value]) -> Self {
        Self::from_sections(&RequirementSection::from_values(values))
    }

    pub fn is_empty(&self) -> bool {
        self.alternative.is_empty() && self.capacity.is_empty() && self.mandatory.is_empty()
    }

    /// Tags that appear in more than one bucket, in first-seen order.
    pub fn tag_collisions(&self) -> Vec<String> {
        let mut seen: BTreeMap<&str, Rule> = BTreeMap::new();
        let mut collisions: Vec<String> = Vec::new();

        let tags = self
            .alternative
            .iter()
            .map(|a| (a.name.as_str(), Rule::Alternative))
            .chain(self.capacity.iter().map(|c| (c.tag.as_str(), Rule::Capacity)))
            .chain(self.mandatory.iter().map(|c| (c.tag.as_str(), Rule::Mandatory)));

        for (tag, rule) in tags {
            match seen.get(tag) {
                Some(&first) if first != rule => {
                    if !collisions.iter().any(|c| c == tag) {
                        collisions.push(tag.to_string());
                    }
                }
                Some(_) => {}
                None => {
                    seen.insert(tag, rule);
                }
            }
        }
        collisions
    }
}

fn alternatives_from(bucket: Map<String, Value>) -> Vec<AlternativeRequisite> {
    bucket
        .into_iter()
        .filter_map(|(name, value)| {
            let Value::Array(raw_options) = value else {
                warn!(requisite = %name, "Skipping alternative requisite whose options are not a list");
                return None;
            };
            let options = raw_options
                .into_iter()
                .filter_map(|option| match option {
                    Value::Array(codes) => Some(
                        codes
                            .into_iter()
                            .filter_map(|code| match code {
                                Value::String(code) => Some(code),
                                other => {
                                    warn!(requisite = %name, "Ignoring non-string course code {other}");
                                    None
                                }
                            })
                            .collect::<Vec<_>>(),
                    ),
                    other => {
                        warn!(requisite = %name, "Ignoring option that is not a list: {other}");
                        None
                    }
                })
                .collect();
            Some(AlternativeRequisite { name, options })
        })
        .collect()
}

fn caps_from(rule: Rule, bucket: Map<String, Value>) -> Vec<TagCap> {
    bucket
        .into_iter()
        .filter_map(|(tag, value)| match value.as_f64().and_then(Credits::from_f64) {
            Some(cap) => Some(TagCap { tag, cap }),
            None => {
                warn!(rule = rule.as_str(), tag = %tag, "Skipping cap that is not a non-negative number: {value}");
                None
            }
        })
        .collect()
}
