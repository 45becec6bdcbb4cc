//! Integration tests for leveret-pattern
//!
//! Tests are organized by feature area and cover:
//! - Literal templates
//! - Typed placeholders and segment boundaries
//! - Parameter binding
//! - Compilation determinism

use leveret_pattern::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

// ============================================================================
// Literal templates
// ============================================================================

#[rstest]
#[case("/about")]
#[case("/users/list")]
#[case("/a/b/c/d")]
#[case("/v1.0/status")]
#[case("/search+results")]
fn test_literal_template_matches_only_itself(#[case] template: &str) {
    let pattern = RoutePattern::compile(template).unwrap();

    assert!(pattern.is_match(template));
    assert!(pattern.is_match(&format!("{}/", template)));
    assert!(!pattern.is_match(&format!("{}x", template)));
    assert!(!pattern.is_match(&format!("{}/x", template)));
    assert!(!pattern.is_match(&format!("/x{}", template)));
    assert!(!pattern.has_placeholders());
}

#[test]
fn test_root_template_matches_root_only() {
    let pattern = RoutePattern::compile("/").unwrap();
    assert_eq!(pattern.raw(), "/");
    assert!(pattern.is_match("/"));
    assert!(!pattern.is_match("/index"));
}

// ============================================================================
// Typed placeholders
// ============================================================================

#[rstest]
#[case("int", "42")]
#[case("int", "-7")]
#[case("integer", "+13")]
#[case("float", "3.14")]
#[case("number", "-0.5")]
#[case("float", "10")]
#[case("word", "hello_world")]
#[case("string", "maria")]
#[case("string", "John Doe.jr@x")]
fn test_typed_values_match(#[case] ty: &str, #[case] value: &str) {
    let pattern = RoutePattern::compile(&format!("/value/:({})v/end", ty)).unwrap();
    let params = pattern
        .resolve(&format!("/value/{}/end", value))
        .unwrap_or_else(|| panic!("{} should accept {:?}", ty, value));
    assert_eq!(params.by_name("v"), Some(value));
}

#[rstest]
#[case("int", "abc")]
#[case("int", "4.2")]
#[case("float", "1.2.3")]
#[case("word", "hello-world")]
fn test_mistyped_values_do_not_match(#[case] ty: &str, #[case] value: &str) {
    let pattern = RoutePattern::compile(&format!("/value/:({})v", ty)).unwrap();
    assert!(!pattern.is_match(&format!("/value/{}", value)));
}

#[rstest]
#[case("int")]
#[case("float")]
#[case("word")]
#[case("string")]
fn test_placeholders_never_cross_segment_boundaries(#[case] ty: &str) {
    let pattern = RoutePattern::compile(&format!("/value/:({})v/end", ty)).unwrap();
    assert!(!pattern.is_match("/value/1/2/end"));
    assert!(!pattern.is_match("/value/a/b/end"));
}

#[test]
fn test_string_placeholder_rejects_newlines() {
    let pattern = RoutePattern::compile("/hello/:name").unwrap();
    assert!(!pattern.is_match("/hello/ma\nria"));
}

#[test]
fn test_capture_groups_equal_placeholders() {
    for template in ["/", "/a", "/:x", "/a/:(int)b/c/:(word)d/:e"] {
        let pattern = RoutePattern::compile(template).unwrap();
        assert_eq!(
            pattern.regex().captures_len() - 1,
            pattern.placeholders().len(),
            "template {}",
            template
        );
    }
}

// ============================================================================
// Binding
// ============================================================================

#[test]
fn test_hello_name_binding() {
    let pattern = RoutePattern::compile("/hello/:(string)name").unwrap();
    let params = pattern.resolve("/hello/maria").unwrap();

    assert_eq!(params.values(), vec!["maria"]);
    assert_eq!(params.by_name("name"), Some("maria"));
    assert_eq!(params.by_position(1), Some("maria"));
}

#[test]
fn test_binding_keeps_placeholder_order() {
    let pattern = RoutePattern::compile("/shop/:(word)category/:(int)item/reviews/:page").unwrap();
    let params = pattern.resolve("/shop/books/12/reviews/last").unwrap();

    assert_eq!(
        params.positional(),
        vec![(1, "books"), (2, "12"), (4, "last")]
    );
}

#[test]
fn test_bind_with_fewer_matches() {
    let pattern = RoutePattern::compile("/:a/:b").unwrap();
    let params = pattern.bind(&["only"]);
    assert_eq!(params.values(), vec!["only", ""]);
}

#[test]
fn test_empty_int_capture() {
    // `int` accepts an empty run of digits within a segment
    let pattern = RoutePattern::compile("/item/:(int)id/edit").unwrap();
    let params = pattern.resolve("/item//edit").unwrap();
    assert_eq!(params.by_name("id"), Some(""));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_compile_is_idempotent() {
    let template = "/test/route/:(string)var1/:(int)var2/:(bool)var3";
    let first = RoutePattern::compile(template).unwrap();
    let second = RoutePattern::compile(template).unwrap();

    assert_eq!(first.as_regex_str(), second.as_regex_str());
    assert_eq!(first.placeholders(), second.placeholders());
    assert_eq!(first, second);
}
