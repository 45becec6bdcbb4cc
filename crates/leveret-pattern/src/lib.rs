//! # Leveret Pattern
//!
//! Compiles route templates with typed placeholders into anchored regular
//! expressions, and binds the captured groups back to placeholder positions.
//!
//! ## Pattern syntax
//!
//! Segments are separated by `/`. A segment is a placeholder when it has the
//! form `:name` or `:(type)name`:
//!
//! - `:(int)id` / `:(integer)id` → optional sign followed by digits
//! - `:(float)price` / `:(number)price` → signed decimal
//! - `:(word)slug` → word characters only
//! - `:(string)name` / `:name` → anything except `/` and newlines
//!
//! Unknown type names fall back to `string`. Every other segment is literal.
//!
//! ## Path normalization
//!
//! Both patterns and request paths lose their trailing slashes before use,
//! except the root path `/` which is kept as-is.
//!
//! ## Example
//!
//! ```
//! use leveret_pattern::RoutePattern;
//!
//! let pattern = RoutePattern::compile("/hello/:(string)name").unwrap();
//! let params = pattern.resolve("/hello/maria/").unwrap();
//! assert_eq!(params.by_name("name"), Some("maria"));
//! ```

pub mod params;
pub mod path;
pub mod pattern;

pub use params::Params;
pub use path::{is_normalized, normalize_path, normalize_pattern};
pub use pattern::compiler::RoutePattern;
pub use pattern::{classify_segment, ParamType, PatternError, Placeholder, Segment};
