//! Statutory citation extraction
//!
//! Recognizes explicit U.S. Code references embedded in free-form bill text,
//! independent of any index. Three surface forms are matched:
//!
//! 1. Standard: `5 U.S.C. 8401`
//! 2. Bill-style: `Section 8401 of Title 5, United States Code`
//! 3. Parenthetical: `(42 U.S.C. 1320e` (the closing paren need not appear)
//!
//! Title and section tokens are numeric-only. Hyphenated section suffixes
//! (`1320e-1`) are not captured - a known extraction gap. The extractor is
//! recall-biased: false positives are filtered downstream by failed corpus
//! lookups, and no semantic validation happens here.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// An extracted `(title, section)` reference, both raw numeric strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Citation {
    pub title_number: String,
    pub section_number: String,
}

impl Citation {
    pub fn new(title_number: impl Into<String>, section_number: impl Into<String>) -> Self {
        Self {
            title_number: title_number.into(),
            section_number: section_number.into(),
        }
    }
}

fn standard_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{1,3})\s+U\.S\.C\.\s+(\d{1,5})\b").unwrap())
}

fn bill_style_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[Ss]ection\s+(\d{1,5})\s+of\s+[Tt]itle\s+(\d{1,3}),?\s+United\s+States\s+Code\b")
            .unwrap()
    })
}

fn parenthetical_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(\s*(\d{1,3})\s+U\.S\.C\.\s+(\d{1,5})").unwrap())
}

/// Extract U.S. Code citations from bill text.
///
/// Returns citations deduplicated by `(title, section)` pair, insertion order
/// preserved: all standard-form matches first, then bill-style, then
/// parenthetical.
pub fn extract_citations(text: &str) -> Vec<Citation> {
    let mut citations = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    let mut push = |title: &str, section: &str| {
        let key = (title.to_string(), section.to_string());
        if seen.insert(key) {
            citations.push(Citation::new(title, section));
        }
    };

    for caps in standard_pattern().captures_iter(text) {
        push(&caps[1], &caps[2]);
    }
    // Bill-style citations name the section first
    for caps in bill_style_pattern().captures_iter(text) {
        push(&caps[2], &caps[1]);
    }
    for caps in parenthetical_pattern().captures_iter(text) {
        push(&caps[1], &caps[2]);
    }

    citations
}

/// Strip a section number down to its leading run of digits.
///
/// Reconciles citation formats across sources before key comparison:
/// `"101c"` -> `"101"`, `"102(a)(1)"` -> `"102"`. Input that does not start
/// with a digit is returned unchanged.
pub fn clean_section_number(raw: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^(\d+)").unwrap());

    match re.captures(raw) {
        Some(caps) => caps[1].to_string(),
        None => raw.to_string(),
    }
}
