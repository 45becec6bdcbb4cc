/// Parameter values bound from a matched path
///
/// Values are keyed by the placeholder's segment position and kept in
/// placeholder (source) order.

use std::collections::HashMap;

use crate::pattern::Placeholder;

/// A single bound placeholder value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundParam {
    pub position: usize,
    pub name: String,
    pub value: String,
}

/// Placeholder values bound from one request path
///
/// **Limitation**: when a template repeats a placeholder name, name-based
/// lookups only see the first (leftmost) occurrence.
///
/// # Examples
///
/// ```
/// use leveret_pattern::RoutePattern;
///
/// let pattern = RoutePattern::compile("/:(word)kind/item/:(int)id").unwrap();
/// let params = pattern.resolve("/book/item/7").unwrap();
///
/// assert_eq!(params.values(), vec!["book", "7"]);
/// assert_eq!(params.by_position(2), Some("7"));
/// assert_eq!(params.by_name("kind"), Some("book"));
/// assert_eq!(params.by_name("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    bound: Vec<BoundParam>,
}

impl Params {
    /// Binds raw matches (in placeholder order) to their placeholders
    ///
    /// Missing raw values bind to an empty string; extra raw values are ignored.
    pub fn bind<S: AsRef<str>>(placeholders: &[Placeholder], raw_matches: &[S]) -> Self {
        let bound = placeholders
            .iter()
            .enumerate()
            .map(|(index, placeholder)| BoundParam {
                position: placeholder.position,
                name: placeholder.name.clone(),
                value: raw_matches
                    .get(index)
                    .map(|raw| raw.as_ref().to_string())
                    .unwrap_or_default(),
            })
            .collect();

        Self { bound }
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundParam> {
        self.bound.iter()
    }

    /// Values in placeholder order, as passed to actions
    pub fn values(&self) -> Vec<&str> {
        self.bound.iter().map(|p| p.value.as_str()).collect()
    }

    /// Owned values in placeholder order
    pub fn to_vec(&self) -> Vec<String> {
        self.bound.iter().map(|p| p.value.clone()).collect()
    }

    /// Value of the placeholder at the given path segment index
    pub fn by_position(&self, position: usize) -> Option<&str> {
        self.bound
            .iter()
            .find(|p| p.position == position)
            .map(|p| p.value.as_str())
    }

    /// Value of the first placeholder with the given name
    pub fn by_name(&self, name: &str) -> Option<&str> {
        self.bound
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Name → value map; repeated names keep their first value
    pub fn named(&self) -> HashMap<String, String> {
        self.bound.iter().fold(HashMap::new(), |mut named, p| {
            named
                .entry(p.name.clone())
                .or_insert_with(|| p.value.clone());
            named
        })
    }

    /// Position → value pairs in placeholder order
    pub fn positional(&self) -> Vec<(usize, &str)> {
        self.bound
            .iter()
            .map(|p| (p.position, p.value.as_str()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a BoundParam;
    type IntoIter = std::slice::Iter<'a, BoundParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.bound.iter()
    }
}
