use mea_core::errors::{ErrorInfo, MeaError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("central", "[0, 2]")
        .with_context("sub_index", "[0, 1]")
}

#[test]
fn shape_error_surface() {
    let err = MeaError::Shape(sample_info("stoichiometry-rows", "row mismatch"));
    assert_eq!(err.info().code, "stoichiometry-rows");
    assert!(err.info().context.contains_key("central"));
}

#[test]
fn configuration_error_surface() {
    let err = MeaError::Configuration(sample_info("missing-raw-moment", "absent"));
    assert_eq!(err.info().code, "missing-raw-moment");
    assert_eq!(err.info().context["sub_index"], "[0, 1]");
}

#[test]
fn degenerate_error_surface() {
    let err = MeaError::DegenerateMoment(sample_info("first-order-central", "order one"));
    assert_eq!(err.info().code, "first-order-central");
}

#[test]
fn context_can_be_appended_after_the_fact() {
    let err = MeaError::Symbolic(ErrorInfo::new("unbound-symbol", "no value for c_9"))
        .with_context("central", "[1, 1]")
        .with_context("column", "3");
    assert!(matches!(err, MeaError::Symbolic(_)));
    assert_eq!(err.info().context.len(), 2);
    let rendered = err.to_string();
    assert!(rendered.starts_with("symbolic error: no value for c_9"));
    assert!(rendered.contains("central=[1, 1]"));
    assert!(rendered.contains("column=3"));
}

#[test]
fn hint_is_rendered() {
    let err = MeaError::Parse(ErrorInfo::new("unexpected-token", "bad input").with_hint("check **"));
    assert!(err.to_string().ends_with("| hint: check **"));
}
