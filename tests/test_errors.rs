use pegrat::{Grammar, ParseFailure};
use pegrat::LineCol;

fn failure(grammar: &Grammar, input: &str) -> ParseFailure<LineCol> {
    match grammar.parse(input).unwrap().into_result() {
        Ok(value) => panic!("expected failure, matched with {:?}", value),
        Err(failure) => failure,
    }
}

#[test]
fn test_errors() {
    let grammar = pegrat::compile(r"Parse <- ('a' / '\n')*").unwrap();
    let err = failure(
        &grammar,
        r#"
aaaa
aaaaaa
aaaabaaaa
"#,
    );

    assert_eq!(err.location.line, 4);
    assert_eq!(err.location.column, 5);
    assert_eq!(err.location.offset, 17);
    assert_eq!(format!("{}", err.expected), r#"one of "\n", "a", EOF"#);
}

#[test]
fn test_error_after_whitespace() {
    let grammar = pegrat::compile(
        r"
List <- '[' Item (',' Item)* ']'
Item <- [0-9]+
%whitespace <- [ ]*
",
    )
    .unwrap();

    let err = failure(&grammar, "[1, 2,]");
    assert_eq!(err.location.offset, 6);
    assert_eq!(err.to_string(), "error at 1:7: expected [0-9]");

    let err = failure(&grammar, "[1, 2");
    assert_eq!(err.location.offset, 5);
    assert_eq!(err.expected.tokens().collect::<Vec<_>>(), [r#"",""#, r#""]""#]);
}

#[test]
fn test_expected_alternatives() {
    let grammar = pegrat::compile(
        r"
Statement <- Keyword Name
Keyword   <- 'let' / 'const' / [A-Z]
Name      <- [a-z]+
%whitespace <- ' '*
",
    )
    .unwrap();

    let err = failure(&grammar, "var x");
    assert_eq!(err.location.offset, 0);
    assert_eq!(err.expected.to_string(), r#"one of "const", "let", [A-Z]"#);

    let err = failure(&grammar, "let 9");
    assert_eq!((err.location.line, err.location.column), (1, 5));
    assert!(err.expected.contains("[a-z]"));
    assert_eq!(err.expected.len(), 1);
}

#[test]
fn test_whitespace_failures_not_reported() {
    let grammar = pegrat::compile(
        r"
Start <- 'a' B
B     <- 'b'
%whitespace <- (' ' / '#' [^\n]* '\n')*
",
    )
    .unwrap();

    let err = failure(&grammar, "a # note\nc");
    assert_eq!((err.location.line, err.location.column), (2, 1));
    assert_eq!(err.expected.tokens().collect::<Vec<_>>(), [r#""b""#]);
}

#[test]
fn test_failure_position_on_later_line() {
    let grammar = pegrat::compile("Lines <- ([a-z]+ '\\n')+").unwrap();
    let err = failure(&grammar, "abc\ndef\ngh1\n");
    assert_eq!(err.location.offset, 10);
    assert_eq!(err.location.to_string(), "3:3");
}

#[test]
fn test_empty_input() {
    let grammar = pegrat::compile("Word <- [a-z]+").unwrap();
    let err = failure(&grammar, "");
    assert_eq!(err.to_string(), "error at 1:1: expected [a-z]");
}
