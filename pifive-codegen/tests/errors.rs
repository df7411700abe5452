//! Programs the generator must reject

mod common;

use common::compile_err;
use pifive_common::CompilerError;

#[test]
fn undefined_variable_reports_its_line() {
    let err = compile_err("def main():\n    x = 1\n    print(y)\n");
    match err {
        CompilerError::UndefinedName { kind, name, location } => {
            assert_eq!(kind, "variable");
            assert_eq!(name, "y");
            assert_eq!(location.line, 3);
            assert_eq!(location.filename, "test.py");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn undefined_function() {
    let err = compile_err("def main():\n    missing(1)\n");
    assert!(matches!(err, CompilerError::UndefinedName { kind: "function", .. }));
}

#[test]
fn call_before_definition_is_undefined() {
    let err = compile_err("def main():\n    later()\n\ndef later():\n    pass\n");
    assert!(matches!(err, CompilerError::UndefinedName { kind: "function", .. }));
}

#[test]
fn arity_mismatch() {
    let err = compile_err("def f(a):\n    return a\n\ndef main():\n    f(1, 2)\n");
    assert_eq!(
        err.to_string(),
        "Function 'f' takes 1 argument(s) but 2 were given at test.py:5:5"
    );
}

#[test]
fn print_requires_exactly_one_argument() {
    let err = compile_err("def main():\n    print()\n");
    assert!(matches!(err, CompilerError::ArityMismatch { expected: 1, found: 0, .. }));
}

#[test]
fn duplicate_function_in_same_scope() {
    let err = compile_err("def f():\n    pass\n\ndef f():\n    pass\n");
    match err {
        CompilerError::DuplicateFunction { name, location } => {
            assert_eq!(name, "f");
            assert_eq!(location.line, 4);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn multiple_assignment_targets() {
    let err = compile_err("def main():\n    a = b = 1\n");
    assert!(matches!(err, CompilerError::MalformedStatement { .. }));
}

#[test]
fn return_outside_function() {
    let err = compile_err("return 1\n");
    assert!(matches!(err, CompilerError::MalformedStatement { .. }));
}

#[test]
fn duplicate_parameter() {
    let err = compile_err("def f(a, a):\n    return a\n");
    assert!(matches!(err, CompilerError::MalformedStatement { .. }));
}

#[test]
fn chained_comparison() {
    let err = compile_err("def main():\n    print(1 < 2 < 3)\n");
    assert!(matches!(err, CompilerError::MalformedStatement { .. }));
}

#[test]
fn string_literal_is_unsupported() {
    let err = compile_err("def main():\n    x = \"hi\"\n");
    assert!(matches!(err, CompilerError::UnsupportedConstruct { .. }));
}

#[test]
fn too_many_parameters() {
    let err = compile_err("def f(a, b, c, d, e, g, h, i):\n    return a\n");
    match err {
        CompilerError::UnsupportedConstruct { construct, .. } => {
            assert!(construct.contains("'f'"), "{construct}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn seven_parameters_are_accepted() {
    common::compile("def f(a, b, c, d, e, g, h):\n    return a + h\n");
}

#[test]
fn variable_of_enclosing_function_is_unsupported() {
    let source = "\
def outer():
    x = 1
    def inner():
        return x
    return inner()
";
    match compile_err(source) {
        CompilerError::UnsupportedConstruct { construct, location } => {
            assert_eq!(construct, "variable 'x' belongs to the frame of 'outer'");
            assert_eq!(location.line, 4);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn parse_errors_pass_through() {
    let err = compile_err("def main()\n    pass\n");
    assert!(matches!(err, CompilerError::ParseError { .. }));
}
