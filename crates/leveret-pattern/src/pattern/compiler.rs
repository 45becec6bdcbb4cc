/// Route template compilation
///
/// Turns a template such as `/users/:(int)id/posts/:slug` into an anchored
/// regular expression plus the ordered placeholder metadata needed to bind
/// captured groups back to names and positions.

use std::fmt;

use regex::Regex;

use super::{classify_segment, PatternError, Placeholder, Segment};
use crate::params::Params;
use crate::path::{normalize_path, normalize_pattern};

/// Internal state accumulator for fold-based compilation
///
/// All mutations are local to the fold accumulator; each step returns Self.
#[derive(Default)]
struct CompileState {
    source: String,
    placeholders: Vec<Placeholder>,
}

impl CompileState {
    /// Appends a literal segment, escaped so it only matches itself
    fn with_literal(mut self, literal: &str) -> Self {
        self.source.push_str(r"\/");
        self.source.push_str(&regex::escape(literal));
        self
    }

    /// Appends a typed capture group and records the placeholder
    fn with_wildcard(mut self, position: usize, name: String, ty: super::ParamType) -> Self {
        self.source.push_str(r"\/");
        self.source.push_str(ty.fragment());
        self.placeholders.push(Placeholder { position, name, ty });
        self
    }

    fn anchored(self) -> (String, Vec<Placeholder>) {
        (format!("^{}$", self.source), self.placeholders)
    }
}

fn process_segment(state: CompileState, (position, segment): (usize, &str)) -> CompileState {
    match classify_segment(segment) {
        Segment::Wildcard { name, ty } => state.with_wildcard(position, name, ty),
        Segment::Literal(literal) => state.with_literal(&literal),
    }
}

/// A compiled, immutable route template
///
/// Invariant: the regex has exactly one capture group per placeholder, in
/// placeholder order.
#[derive(Clone)]
pub struct RoutePattern {
    raw: String,
    source: String,
    regex: Regex,
    placeholders: Vec<Placeholder>,
}

impl RoutePattern {
    /// Compiles a route template
    ///
    /// The template loses its trailing slashes (root `/` is kept), leading and
    /// trailing `/` are stripped, and the remainder is split on `/`. An empty
    /// template or `/` compiles to the root matcher `^\/$` with no placeholders.
    ///
    /// # Examples
    ///
    /// ```
    /// use leveret_pattern::RoutePattern;
    ///
    /// let pattern = RoutePattern::compile("/item/:(int)id/").unwrap();
    /// assert_eq!(pattern.raw(), "/item/:(int)id");
    /// assert_eq!(pattern.as_regex_str(), r"^\/item\/([-+]?[0-9]*)$");
    /// assert_eq!(pattern.placeholders()[0].position, 1);
    /// ```
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let raw = normalize_pattern(pattern).to_string();

        let (source, placeholders) = raw
            .trim_matches('/')
            .split('/')
            .enumerate()
            .fold(CompileState::default(), process_segment)
            .anchored();

        let regex = Regex::new(&source).map_err(|source| PatternError::InvalidRegex {
            pattern: raw.clone(),
            source,
        })?;

        Ok(Self {
            raw,
            source,
            regex,
            placeholders,
        })
    }

    /// Template with trailing slashes removed
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Anchored regular expression source
    pub fn as_regex_str(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Placeholders in source order
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    pub fn has_placeholders(&self) -> bool {
        !self.placeholders.is_empty()
    }

    /// Matches a request path and returns the raw captured groups in order
    ///
    /// The path is normalized first (trailing slashes removed, root kept).
    pub fn captures(&self, path: &str) -> Option<Vec<String>> {
        let path = normalize_path(path);
        let captures = self.regex.captures(&path)?;

        Some(
            captures
                .iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }

    /// Checks whether a request path matches this template
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(&normalize_path(path))
    }

    /// Binds raw captured values to placeholder positions
    ///
    /// Placeholders without a corresponding raw value bind to an empty string.
    pub fn bind<S: AsRef<str>>(&self, raw_matches: &[S]) -> Params {
        Params::bind(&self.placeholders, raw_matches)
    }

    /// Matches a path and binds its captures in one step
    pub fn resolve(&self, path: &str) -> Option<Params> {
        self.captures(path).map(|raw| self.bind(&raw))
    }
}

impl fmt::Debug for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutePattern")
            .field("raw", &self.raw)
            .field("regex", &self.source)
            .field("placeholders", &self.placeholders)
            .finish()
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
            && self.source == other.source
            && self.placeholders == other.placeholders
    }
}

impl Eq for RoutePattern {}
