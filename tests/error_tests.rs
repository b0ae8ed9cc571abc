use pagediff_rs::{DiffError, OutputError, PagediffError, ParseError, PathError};

#[test]
fn test_parse_error_display() {
    let err = ParseError::file_not_found("old.json");
    assert_eq!(err.to_string(), "File not found: old.json");
}

#[test]
fn test_markup_error_display() {
    let err = ParseError::markup_error("page.html", "unexpected end of input");
    assert!(err.to_string().contains("page.html"));
    assert!(err.to_string().contains("unexpected end of input"));
}

#[test]
fn test_output_error_display() {
    let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = OutputError::JsonSerializationError { source };
    assert!(err.to_string().starts_with("Failed to serialize to JSON"));
}

#[test]
fn test_diff_error_is_unavailable() {
    let err = DiffError::from(PathError::malformed("a..b", "empty key"));
    assert!(err.to_string().starts_with("Diff unavailable"));

    let err = DiffError::TooDeep { limit: 512 };
    assert!(err.to_string().starts_with("Diff unavailable"));
}

#[test]
fn test_pagediff_error_from_diff_error() {
    let err: PagediffError = DiffError::TooDeep { limit: 1 }.into();
    assert!(matches!(err, PagediffError::Diff(_)));
    assert_eq!(
        err.to_string(),
        "Diff unavailable: document nests deeper than 1 levels"
    );
}

#[test]
fn test_config_error() {
    let err = PagediffError::ConfigError {
        message: "unknown field `colour`".to_string(),
    };
    assert!(err.to_string().contains("Invalid configuration"));
}
