/// Segment classification for route templates
///
/// Pure functional parsing of template segments into typed placeholders.

pub mod compiler;

use thiserror::Error;

/// Errors raised while compiling a route template
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("route pattern \"{pattern}\" produced an invalid matcher: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Type annotation of a placeholder segment
///
/// # Examples
///
/// ```
/// use leveret_pattern::ParamType;
///
/// assert_eq!(ParamType::from_name("int"), ParamType::Int);
/// assert_eq!(ParamType::from_name("number"), ParamType::Float);
/// assert_eq!(ParamType::from_name("bool"), ParamType::String); // unknown → string
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParamType {
    /// `int` / `integer`
    Int,
    /// `float` / `number`
    Float,
    /// `word`
    Word,
    /// `string`, and every unknown type name
    #[default]
    String,
}

impl ParamType {
    /// Maps a type name to its variant; unknown names become `String`
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "int" | "integer" => ParamType::Int,
            "float" | "number" => ParamType::Float,
            "word" => ParamType::Word,
            _ => ParamType::String,
        }
    }

    /// Capturing regex fragment for this type
    pub fn fragment(self) -> &'static str {
        match self {
            ParamType::Int => r"([-+]?[0-9]*)",
            ParamType::Float => r"([-+]?[0-9]*[.]?[0-9]+)",
            ParamType::Word => r"([\w]*)",
            ParamType::String => r"([^/\n]*)",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Word => "word",
            ParamType::String => "string",
        }
    }
}

/// A typed placeholder found in a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// 0-based segment index in the template
    pub position: usize,
    pub name: String,
    pub ty: ParamType,
}

/// A classified template segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text matched verbatim
    Literal(String),
    /// `:name` or `:(type)name`
    Wildcard { name: String, ty: ParamType },
}

/// Classifies a single template segment (pure function)
///
/// A segment is a wildcard iff it is `:` followed by an optional
/// `(type)` made of lowercase ASCII letters and a non-empty name made of
/// ASCII letters, digits and underscores. Anything else is literal.
///
/// # Examples
///
/// ```
/// use leveret_pattern::{classify_segment, ParamType, Segment};
///
/// assert_eq!(
///     classify_segment(":(int)id"),
///     Segment::Wildcard { name: "id".into(), ty: ParamType::Int }
/// );
/// assert_eq!(
///     classify_segment(":name"),
///     Segment::Wildcard { name: "name".into(), ty: ParamType::String }
/// );
/// assert_eq!(classify_segment("users"), Segment::Literal("users".into()));
/// assert_eq!(classify_segment(":(INT)id"), Segment::Literal(":(INT)id".into()));
/// ```
pub fn classify_segment(segment: &str) -> Segment {
    parse_wildcard(segment)
        .map(|(ty, name)| Segment::Wildcard {
            name: name.to_string(),
            ty,
        })
        .unwrap_or_else(|| Segment::Literal(segment.to_string()))
}

fn parse_wildcard(segment: &str) -> Option<(ParamType, &str)> {
    let rest = segment.strip_prefix(':')?;

    let (ty, name) = match rest.strip_prefix('(') {
        Some(typed) => {
            let (type_name, name) = typed.split_once(')')?;
            if type_name.is_empty() || !type_name.bytes().all(|b| b.is_ascii_lowercase()) {
                return None;
            }
            (ParamType::from_name(type_name), name)
        }
        None => (ParamType::String, rest),
    };

    let valid_name = !name.is_empty()
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');

    valid_name.then_some((ty, name))
}
