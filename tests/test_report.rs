use pegrat::{compile_with_report, CompileError, Report};

#[test]
fn test_syntax_error_report() {
    let (result, report) = compile_with_report("broken.peg", "Start <- 'a'\nNext <- ( 'b'\n");
    assert!(matches!(result, Err(CompileError::Syntax(_))));
    assert!(report.has_error());
    assert_eq!(report.len(), 1);

    let text = report.render();
    assert!(text.contains("error parsing grammar"), "{}", text);
    assert!(text.contains("broken.peg:3:1"), "{}", text);
}

#[test]
fn test_undefined_rules_report_each_name() {
    let (result, report) = compile_with_report("undefined.peg", "Start <- Missing Other\n");
    assert!(matches!(result, Err(CompileError::Undefined(_))));
    assert_eq!(report.len(), 2);

    let text = report.render();
    assert!(text.contains("undefined rule `Missing`"), "{}", text);
    assert!(text.contains("undefined rule `Other`"), "{}", text);
}

#[test]
fn test_warnings_report() {
    let (result, report) = compile_with_report("warn.peg", "Start <- 'a'\nUnused <- 'b'\n");
    let grammar = result.unwrap();
    assert_eq!(grammar.warnings().len(), 1);
    assert!(!report.has_error());

    let text = report.render();
    assert!(text.contains("rule `Unused` is never used"), "{}", text);
    assert!(text.contains("warn.peg:2:1"), "{}", text);
}

#[test]
fn test_clean_grammar_has_empty_report() {
    let (result, report) = compile_with_report("ok.peg", "Start <- 'a'");
    assert!(result.is_ok());
    assert!(report.is_empty());
    assert_eq!(report.render(), "");
}

#[test]
fn test_manual_report() {
    let source = "A <- 'a'\nA <- 'b'";
    let mut report = Report::new("dup.peg", source);
    let err = pegrat::compile(source).unwrap_err();
    report.add_error(&err);

    let text = report.render();
    assert!(text.contains("duplicate rule `A`"), "{}", text);
}
