//! Repository name parsing

use crate::GlueError;
use std::fmt;
use std::str::FromStr;

/// A GitHub repository in `owner/repo` form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoName {
    owner: String,
    name: String,
}

impl RepoName {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// GitHub treats owner and repository names case-insensitively
    pub fn matches(&self, other: &RepoName) -> bool {
        self.owner.eq_ignore_ascii_case(&other.owner) && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl FromStr for RepoName {
    type Err = GlueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut parts = s.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if is_segment(owner) && is_segment(name) => {
                Ok(Self::new(owner, name))
            }
            _ => Err(GlueError::Parse(format!(
                "Invalid repository '{}': expected owner/repo",
                s
            ))),
        }
    }
}

fn is_segment(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let repo: RepoName = "org/repo".parse().unwrap();
        assert_eq!(repo.owner(), "org");
        assert_eq!(repo.name(), "repo");
        assert_eq!(repo.to_string(), "org/repo");

        let dotted: RepoName = " my-org/my_repo.rs ".parse().unwrap();
        assert_eq!(dotted.name(), "my_repo.rs");
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["", "org", "org/", "/repo", "org/repo/extra", "org/re po"] {
            let err = bad.parse::<RepoName>().unwrap_err();
            assert!(matches!(err, GlueError::Parse(_)), "{bad} should not parse");
        }
    }

    #[test]
    fn test_matches_ignores_case() {
        let a = RepoName::new("Org", "Repo");
        let b = RepoName::new("org", "repo");
        assert!(a.matches(&b));
        assert!(!a.matches(&RepoName::new("org", "other")));
    }
}
