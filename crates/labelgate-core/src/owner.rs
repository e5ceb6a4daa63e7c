//! Requirement owners: individual logins or `org/team` references.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A GitHub team, addressed by organisation and slug.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamRef {
    pub org: String,
    pub slug: String,
}

impl TeamRef {
    pub fn new(org: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            slug: slug.into(),
        }
    }
}

impl fmt::Display for TeamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.slug)
    }
}

/// Someone who can satisfy a label requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Owner {
    Individual { login: String },
    Team(TeamRef),
}

impl Owner {
    pub fn individual(login: impl Into<String>) -> Self {
        Owner::Individual {
            login: login.into(),
        }
    }

    pub fn team(org: impl Into<String>, slug: impl Into<String>) -> Self {
        Owner::Team(TeamRef::new(org, slug))
    }

    pub fn as_team(&self) -> Option<&TeamRef> {
        match self {
            Owner::Team(team) => Some(team),
            Owner::Individual { .. } => None,
        }
    }
}

impl FromStr for Owner {
    type Err = ConfigError;

    /// Anything containing a `/` is a team reference, split at the first `/`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            None => Ok(Owner::individual(s)),
            Some((org, slug)) if !org.is_empty() && !slug.is_empty() => Ok(Owner::team(org, slug)),
            Some(_) => Err(ConfigError::InvalidTeamReference {
                owner: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Individual { login } => f.write_str(login),
            Owner::Team(team) => team.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_login_is_individual() {
        let owner: Owner = "justnero".parse().unwrap();
        assert_eq!(owner, Owner::individual("justnero"));
        assert!(owner.as_team().is_none());
    }

    #[test]
    fn test_slash_makes_team() {
        let owner: Owner = "org/backend".parse().unwrap();
        assert_eq!(owner, Owner::team("org", "backend"));
        assert_eq!(owner.to_string(), "org/backend");
    }

    #[test]
    fn test_empty_team_parts_rejected() {
        assert!(matches!(
            "/backend".parse::<Owner>(),
            Err(ConfigError::InvalidTeamReference { .. })
        ));
        assert!("org/".parse::<Owner>().is_err());
    }
}
