use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pegrat::Parser;

const GRAMMAR: &str = r"
S <- A 'x' / A 'y'
A <- 'a'+
";

fn counting_parser(calls: &Arc<AtomicUsize>) -> Parser<String> {
    let mut parser = Parser::from_source(GRAMMAR).unwrap();
    let calls = Arc::clone(calls);
    parser
        .set_action("A", move |sv| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(sv.text().to_owned())
        })
        .unwrap();
    parser
}

#[test]
fn test_action_runs_once_per_position() {
    let calls = Arc::new(AtomicUsize::new(0));
    let parser = counting_parser(&calls);

    assert_eq!(parser.parse("aaay").unwrap().into_value().as_deref(), Some("aaa"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_action_reruns_without_packrat() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut parser = counting_parser(&calls);
    parser.enable_packrat(false);

    assert_eq!(parser.parse("aaay").unwrap().into_value().as_deref(), Some("aaa"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_memo_is_per_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let parser = counting_parser(&calls);

    assert!(parser.parse("ax").unwrap().is_matched());
    assert!(parser.parse("ay").unwrap().is_matched());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_failed_parse_reruns_actions_for_error_report() {
    let calls = Arc::new(AtomicUsize::new(0));
    let parser = counting_parser(&calls);

    let result = parser.parse("aaz").unwrap();
    let failure = result.failure().unwrap();
    assert_eq!(failure.location.offset, 2);
    assert_eq!(failure.expected.to_string(), r#"one of "a", "x", "y""#);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_memoized_failure() {
    let mut parser = Parser::<()>::from_source(
        r"
Start <- Num '+' Num / Num '-' Num / Num
Num   <- [0-9]+
",
    )
    .unwrap();

    for packrat in [true, false] {
        parser.enable_packrat(packrat);
        assert!(parser.parse("1-2").unwrap().is_matched());
        assert!(parser.parse("12").unwrap().is_matched());
        assert!(!parser.parse("1*2").unwrap().is_matched());
    }
}
