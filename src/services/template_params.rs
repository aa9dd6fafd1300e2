//! Placeholder extraction for message template bodies.
//!
//! A placeholder is `${name}` where `name` is one or more word characters.
//! Reads use [`extract_parameters`], which never fails. Bodies submitted by a
//! user go through [`parse_body`], which additionally rejects `${` openers
//! that do not start a well-formed placeholder.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{(\w+)\}").expect("placeholder pattern is valid"));

const OPENER: &str = "${";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid placeholder in string: line {line}, col {column}")]
pub struct TemplateSyntaxError {
    pub line: usize,
    pub column: usize,
}

/// Distinct placeholder names in `body`, sorted lexicographically.
pub fn extract_parameters(body: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Like [`extract_parameters`], but fails on the first `${` that is not the
/// start of a `${name}` placeholder.
pub fn parse_body(body: &str) -> Result<Vec<String>, TemplateSyntaxError> {
    for (offset, _) in body.match_indices(OPENER) {
        let well_formed = PLACEHOLDER
            .find_at(body, offset)
            .is_some_and(|m| m.start() == offset);
        if !well_formed {
            return Err(locate(body, offset));
        }
    }
    Ok(extract_parameters(body))
}

// Position of the character following `$`, 1-based.
fn locate(body: &str, offset: usize) -> TemplateSyntaxError {
    let before = &body[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map(|current| current.chars().count())
        .unwrap_or(0)
        + 1;
    TemplateSyntaxError { line, column }
}
