//! Property-based tests for the parsing engine
//!
//! These check behaviour that must hold for every input rather than for a
//! handful of examples:
//! - parsing is deterministic
//! - whitespace between tokens never changes the outcome
//! - packrat memoization never changes the outcome

use pegrat::{Expr, Grammar, GrammarBuilder};
use proptest::prelude::*;

fn catgirl() -> Grammar {
    pegrat::compile(
        r"
Start <- 'Catgirl' End
End   <- !.
%whitespace <- [ \t\r\n]*
",
    )
    .unwrap()
}

fn list() -> Grammar {
    pegrat::compile(
        r"
List <- Item (',' Item)*
Item <- [a-z]+ / [0-9]+
%whitespace <- [ \t\r\n]*
",
    )
    .unwrap()
}

fn arithmetic() -> Grammar {
    pegrat::compile(
        r"
Expr   <- Term (('+' / '-') Term)*
Term   <- Factor (('*' / '/') Factor)*
Factor <- '(' Expr ')' / '-' Factor / Number
Number <- [0-9]+
",
    )
    .unwrap()
}

/// Generate whitespace runs
fn whitespace_strategy() -> impl Strategy<Value = String> {
    "[ \t\r\n]{0,4}"
}

/// Generate list items
fn item_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["[a-z]{1,5}", "[0-9]{1,5}",]
}

proptest! {
    #[test]
    fn parsing_is_deterministic(input in "[a-z0-9, ]{0,20}") {
        let grammar = list();
        let first = grammar.parse(&input).unwrap();
        let second = grammar.parse(&input).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn whitespace_around_start_is_ignored(before in whitespace_strategy(), after in whitespace_strategy()) {
        let input = format!("{}Catgirl{}", before, after);
        let result = catgirl().parse(&input).unwrap();
        prop_assert_eq!(result.consumed(), Some(input.len()));
    }

    #[test]
    fn whitespace_between_tokens_is_ignored(
        items in prop::collection::vec(item_strategy(), 1..6),
        gaps in prop::collection::vec((whitespace_strategy(), whitespace_strategy()), 6),
    ) {
        let compact = items.join(",");
        let spaced = items
            .iter()
            .zip(&gaps)
            .map(|(item, (before, after))| format!("{}{}{}", before, item, after))
            .collect::<Vec<_>>()
            .join(",");

        let grammar = list();
        prop_assert!(grammar.parse(&compact).unwrap().is_matched());
        prop_assert!(grammar.parse(&spaced).unwrap().is_matched(), "{:?}", spaced);
    }

    #[test]
    fn packrat_does_not_change_results(input in "[0-9()+*/-]{0,16}") {
        let mut grammar = arithmetic();
        let with_memo = grammar.parse(&input).unwrap();
        grammar.enable_packrat(false);
        let without_memo = grammar.parse(&input).unwrap();
        prop_assert_eq!(with_memo, without_memo);
    }

    #[test]
    fn literal_matches_prefix(literal in "[ab]{0,4}", input in "[ab]{0,6}") {
        let mut grammar = GrammarBuilder::new()
            .rule("Lit", Expr::literal(literal.clone()))
            .build()
            .unwrap();
        grammar.enable_eoi_check(false);

        let expected = if input.starts_with(literal.as_str()) { Some(literal.len()) } else { None };
        prop_assert_eq!(grammar.parse(&input).unwrap().consumed(), expected);
    }

    #[test]
    fn negated_class_is_complement(c in any::<char>()) {
        let grammar = pegrat::compile("Start <- [a-f0-9]\nOther <- [^a-f0-9]").unwrap();
        let input = c.to_string();
        let in_class = grammar.parse(&input).unwrap().is_matched();
        let in_complement = grammar.parse_rule("Other", &input).unwrap().is_matched();
        prop_assert_ne!(in_class, in_complement);
    }
}
