//! Criterion selection: which columns take part in the ranking and in
//! which direction each one is desirable.

use crate::{RankerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Whether higher or lower raw values are desirable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Benefit criterion: higher is better
    #[default]
    #[serde(alias = "max", alias = "极大化")]
    Maximize,
    /// Cost criterion: lower is better
    #[serde(alias = "min", alias = "极小化")]
    Minimize,
}

impl FromStr for Direction {
    type Err = RankerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" | "maximize" | "maximise" | "+" | "1" | "+1" | "极大化" => Ok(Self::Maximize),
            "min" | "minimize" | "minimise" | "-" | "-1" | "极小化" => Ok(Self::Minimize),
            other => Err(RankerError::InvalidDirection(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Maximize => f.write_str("maximize"),
            Self::Minimize => f.write_str("minimize"),
        }
    }
}

/// A selected criterion column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    #[serde(default)]
    pub direction: Direction,
}

impl Criterion {
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
        }
    }

    pub fn maximize(name: impl Into<String>) -> Self {
        Self::new(name, Direction::Maximize)
    }

    pub fn minimize(name: impl Into<String>) -> Self {
        Self::new(name, Direction::Minimize)
    }
}

/// Parses `name` or `name:direction`. A bare name maximizes; so does a name
/// whose text after the last `:` is not a direction (`ratio:a` is a column).
impl FromStr for Criterion {
    type Err = RankerError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (name, direction) = match s.rsplit_once(':') {
            Some((name, dir)) => match dir.parse::<Direction>() {
                Ok(direction) => (name.trim(), direction),
                Err(_) => (s, Direction::Maximize),
            },
            None => (s, Direction::Maximize),
        };
        if name.is_empty() {
            return Err(RankerError::MissingColumn(s.to_string()));
        }
        Ok(Self::new(name, direction))
    }
}

/// Ordered, non-empty, duplicate-free list of criteria.
///
/// The order here is the column order of every matrix the pipeline builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriterionSpec {
    criteria: Vec<Criterion>,
}

impl CriterionSpec {
    pub fn new(criteria: Vec<Criterion>) -> Result<Self> {
        if criteria.is_empty() {
            return Err(RankerError::NoCriteria);
        }

        let mut seen = HashSet::new();
        for c in &criteria {
            if !seen.insert(c.name.as_str()) {
                return Err(RankerError::DuplicateCriterion(c.name.clone()));
            }
        }

        Ok(Self { criteria })
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Criterion> {
        self.criteria.get(index)
    }

    /// Criterion name at `index`, or a placeholder when out of range
    pub fn name(&self, index: usize) -> &str {
        self.criteria
            .get(index)
            .map(|c| c.name.as_str())
            .unwrap_or("?")
    }
}

impl<'a> IntoIterator for &'a CriterionSpec {
    type Item = &'a Criterion;
    type IntoIter = std::slice::Iter<'a, Criterion>;

    fn into_iter(self) -> Self::IntoIter {
        self.criteria.iter()
    }
}
