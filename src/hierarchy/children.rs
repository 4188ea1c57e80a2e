//! Child issue references in a feature description
//!
//! A feature issue lists its children under a `## Issues` heading as full
//! issue URLs. Only URLs on the configured GitHub domain are recognised.

use crate::model::{ChildReference, RepoName};
use regex::Regex;
use tracing::trace;

/// Heading that opens the child list
pub const ISSUES_HEADING: &str = "## Issues";

/// Text between `## Issues` and the next level-2 heading (or end of text)
pub fn issues_section(description: &str) -> Option<&str> {
    let start = description.find(ISSUES_HEADING)? + ISSUES_HEADING.len();
    let rest = &description[start..];

    // The heading line itself may continue; the section ends at the next "## " line
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if offset > 0 && line.starts_with("## ") {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    Some(rest)
}

/// Issue-URL matcher for one GitHub domain
///
/// The pattern is compiled once in [`ChildLinkExtractor::new`]; a sync pass
/// builds one extractor and reuses it for every feature.
#[derive(Debug, Clone)]
pub struct ChildLinkExtractor {
    pattern: Regex,
}

impl ChildLinkExtractor {
    pub fn new(domain: &str) -> Self {
        let pattern = format!(
            r"https://{}/([\w.\-]+)/([\w.\-]+)/issues/(\w+)",
            regex::escape(domain)
        );
        // Escaped input cannot make the pattern invalid
        let pattern = Regex::new(&pattern).expect("escaped domain yields a valid pattern");
        Self { pattern }
    }

    /// Child references listed in the `## Issues` section, in textual order
    ///
    /// Duplicates are kept. Matches with a non-numeric issue number are dropped.
    pub fn find(&self, description: &str) -> Vec<ChildReference> {
        let Some(section) = issues_section(description) else {
            return Vec::new();
        };

        self.pattern
            .captures_iter(section)
            .filter_map(|caps| {
                let number = match caps[3].parse::<u64>() {
                    Ok(n) => n,
                    Err(_) => {
                        trace!(url = &caps[0], "Skipping issue URL with non-numeric number");
                        return None;
                    }
                };
                Some(ChildReference::new(RepoName::new(&caps[1], &caps[2]), number))
            })
            .collect()
    }
}

/// One-off form of [`ChildLinkExtractor::find`]
pub fn find_child_references(description: &str, domain: &str) -> Vec<ChildReference> {
    ChildLinkExtractor::new(domain).find(description)
}
