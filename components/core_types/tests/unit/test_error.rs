//! Unit tests for the Error taxonomy

use core_types::{Error, ScriptError};

#[test]
fn test_state_error_names_operation() {
    let err = Error::state("Context::leave", "lock must be released after leaving context");
    assert!(err.is_state());
    assert!(err.to_string().starts_with("Context::leave"));
}

#[test]
fn test_attribute_error_message() {
    let err = Error::Attribute("missing".to_string());
    assert_eq!(err.to_string(), "attribute not found: missing");
}

#[test]
fn test_extension_errors_name_the_extension() {
    let dup = Error::DuplicateExtension("hello/javascript".to_string());
    assert!(dup.to_string().contains("hello/javascript"));

    let missing = Error::MissingDependency {
        extension: "child".to_string(),
        dependency: "parent".to_string(),
    };
    assert!(missing.to_string().contains("child"));
    assert!(missing.to_string().contains("parent"));
}

#[test]
fn test_script_error_wraps_without_loss() {
    let script = ScriptError::new("ReferenceError", "hello is not defined")
        .with_stack_trace("ReferenceError: hello is not defined\n    at <anonymous>:1:1");
    let err = Error::from(script.clone());

    match err {
        Error::Script(inner) => {
            assert_eq!(*inner, script);
            assert_eq!(inner.stack_trace(), script.stack_trace());
        }
        other => panic!("expected script error, got {:?}", other),
    }
}
