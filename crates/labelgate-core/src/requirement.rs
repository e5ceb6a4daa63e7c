//! Label requirements and their textual configuration format.
//!
//! One requirement per line, `label=owner1,owner2`. An owner containing a
//! `/` is a team reference.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::owner::{Owner, TeamRef};

/// A label and the owners, any one of whom can satisfy it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRequirement {
    pub label: String,
    pub owners: Vec<Owner>,
}

impl LabelRequirement {
    pub fn new(label: impl Into<String>, owners: Vec<Owner>) -> Self {
        Self {
            label: label.into(),
            owners,
        }
    }

    /// Teams referenced by this requirement, in owner order.
    pub fn teams(&self) -> impl Iterator<Item = &TeamRef> {
        self.owners.iter().filter_map(Owner::as_team)
    }
}

impl fmt::Display for LabelRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owners: Vec<String> = self.owners.iter().map(ToString::to_string).collect();
        write!(f, "{} = {}", self.label, owners.join(" or "))
    }
}

/// Parse the multi-line `label-requirements` input.
pub fn parse_label_requirements(input: &str) -> Result<Vec<LabelRequirement>, ConfigError> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Result<LabelRequirement, ConfigError> {
    let (label, owners) = line
        .split_once('=')
        .ok_or_else(|| ConfigError::MalformedRequirement {
            line: line.to_string(),
        })?;

    let owners = owners
        .split(',')
        .map(str::trim)
        .filter(|owner| !owner.is_empty())
        .map(str::parse::<Owner>)
        .collect::<Result<Vec<Owner>, _>>()?;

    Ok(LabelRequirement::new(label.trim(), owners))
}

/// Requirements whose label is attached to the pull request, in input order.
pub fn active_requirements<'a>(
    requirements: &'a [LabelRequirement],
    labels: &BTreeSet<String>,
) -> Vec<&'a LabelRequirement> {
    requirements
        .iter()
        .filter(|r| labels.contains(&r.label))
        .collect()
}
