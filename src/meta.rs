//! The grammar of grammar definitions, run by the same engine it feeds.

use once_cell::sync::Lazy;
use pegrat_runtime::str::LineCol;

use crate::action::{BoxError, SemanticValues};
use crate::ast::{CharClass, ClassRange, Expr, Literal};
use crate::error::CompileError;
use crate::grammar::{Definition, Grammar, GrammarBuilder};
use crate::parser::Parser;

/// Values built while parsing grammar text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Syntax {
    Name(String, LineCol),
    Char(char),
    Range(char, char),
    Op(char),
    Expr(Expr),
    Definition(Definition),
    Grammar(Vec<Definition>),
}

pub(crate) static META: Lazy<Result<Parser<Syntax>, CompileError>> = Lazy::new(meta_parser);

fn meta_grammar() -> Result<Grammar, CompileError> {
    let r = Expr::rule_ref;
    let lit = Expr::literal;

    GrammarBuilder::new()
        .rule("Grammar", Expr::seq([Expr::one_or_more(r("Definition")), r("EOF")]))
        .rule("Definition", Expr::seq([r("IDENTIFIER"), lit("<-"), r("Expression")]))
        .rule(
            "Expression",
            Expr::seq([r("Sequence"), Expr::zero_or_more(Expr::seq([lit("/"), r("Sequence")]))]),
        )
        .rule("Sequence", Expr::one_or_more(r("Prefix")))
        .rule("Prefix", Expr::seq([Expr::optional(r("PREFIX")), r("Suffix")]))
        .rule("Suffix", Expr::seq([r("Primary"), Expr::optional(r("SUFFIX"))]))
        .rule(
            "Primary",
            Expr::choice([
                Expr::seq([r("IDENTIFIER"), Expr::not(lit("<-"))]),
                Expr::seq([lit("("), r("Expression"), lit(")")]),
                r("LITERAL"),
                r("CLASS"),
                lit("."),
            ]),
        )
        .rule(
            "IDENTIFIER",
            Expr::seq([
                Expr::class(&[('a', 'z'), ('A', 'Z'), ('_', '_'), ('%', '%')]),
                Expr::zero_or_more(Expr::class(&[('a', 'z'), ('A', 'Z'), ('0', '9'), ('_', '_')])),
            ]),
        )
        .rule("LITERAL", Expr::choice([quoted('\''), quoted('"')]))
        .rule(
            "CLASS",
            Expr::seq([
                lit("["),
                Expr::optional(lit("^")),
                Expr::zero_or_more(Expr::seq([Expr::not(lit("]")), r("RANGE")])),
                lit("]"),
            ]),
        )
        .rule(
            "RANGE",
            Expr::choice([
                Expr::seq([r("CHAR"), lit("-"), Expr::not(lit("]")), r("CHAR")]),
                r("CHAR"),
            ]),
        )
        .rule(
            "CHAR",
            Expr::choice([
                Expr::seq([lit("\\"), Expr::one_of("nrt0'\"[]\\^-")]),
                Expr::seq([lit("\\x"), r("HEX"), r("HEX")]),
                Expr::seq([lit("\\u{"), Expr::one_or_more(r("HEX")), lit("}")]),
                Expr::seq([Expr::not(lit("\\")), Expr::any()]),
            ]),
        )
        .rule("HEX", Expr::class(&[('0', '9'), ('a', 'f'), ('A', 'F')]))
        .rule("PREFIX", Expr::one_of("&!"))
        .rule("SUFFIX", Expr::one_of("?*+"))
        .rule("EOF", Expr::eoi())
        .whitespace(Expr::zero_or_more(Expr::choice([
            Expr::one_of(" \t\r\n"),
            Expr::seq([
                lit("#"),
                Expr::zero_or_more(Expr::seq([Expr::not(Expr::one_of("\r\n")), Expr::any()])),
            ]),
        ])))
        .build()
}

/// `'...'` or `"..."`, optionally followed by `i`.
fn quoted(quote: char) -> Expr {
    let q = Expr::class(&[(quote, quote)]);
    Expr::seq([
        q.clone(),
        Expr::zero_or_more(Expr::seq([Expr::not(q.clone()), Expr::rule_ref("CHAR")])),
        q,
        Expr::optional(Expr::literal("i")),
    ])
}

fn meta_parser() -> Result<Parser<Syntax>, CompileError> {
    let mut parser = Parser::new(meta_grammar()?);
    parser
        .set_action("Grammar", grammar)?
        .set_action("Definition", definition)?
        .set_action("Expression", expression)?
        .set_action("Sequence", sequence)?
        .set_action("Prefix", prefix)?
        .set_action("Suffix", suffix)?
        .set_action("Primary", primary)?
        .set_action("IDENTIFIER", identifier)?
        .set_action("LITERAL", literal)?
        .set_action("CLASS", class)?
        .set_action("RANGE", range)?
        .set_action("CHAR", character)?
        .set_action("PREFIX", operator)?
        .set_action("SUFFIX", operator)?;
    Ok(parser)
}

fn unexpected(value: &Syntax) -> BoxError {
    format!("unexpected {:?} in grammar syntax tree", value).into()
}

fn into_expr(value: Syntax) -> Result<Expr, BoxError> {
    match value {
        Syntax::Expr(expr) => Ok(expr),
        other => Err(unexpected(&other)),
    }
}

fn into_char(value: &Syntax) -> Result<char, BoxError> {
    match value {
        Syntax::Char(c) => Ok(*c),
        other => Err(unexpected(other)),
    }
}

fn collapse(mut exprs: Vec<Expr>, wrap: fn(Vec<Expr>) -> Expr) -> Expr {
    if exprs.len() == 1 {
        exprs.remove(0)
    } else {
        wrap(exprs)
    }
}

fn grammar(sv: SemanticValues<'_, Syntax>) -> Result<Syntax, BoxError> {
    let defs = sv
        .into_iter()
        .map(|v| match v {
            Syntax::Definition(def) => Ok(def),
            other => Err(unexpected(&other)),
        })
        .collect::<Result<_, _>>()?;
    Ok(Syntax::Grammar(defs))
}

fn definition(sv: SemanticValues<'_, Syntax>) -> Result<Syntax, BoxError> {
    let mut values = sv.into_iter();
    match (values.next(), values.next()) {
        (Some(Syntax::Name(name, location)), Some(Syntax::Expr(expr))) => Ok(Syntax::Definition(Definition {
            name,
            expr,
            location: Some(location),
        })),
        (first, _) => Err(format!("malformed definition {:?}", first).into()),
    }
}

fn expression(sv: SemanticValues<'_, Syntax>) -> Result<Syntax, BoxError> {
    let alternatives = sv.into_iter().map(into_expr).collect::<Result<_, _>>()?;
    Ok(Syntax::Expr(collapse(alternatives, Expr::Choice)))
}

fn sequence(sv: SemanticValues<'_, Syntax>) -> Result<Syntax, BoxError> {
    let elems = sv.into_iter().map(into_expr).collect::<Result<_, _>>()?;
    Ok(Syntax::Expr(collapse(elems, Expr::Sequence)))
}

fn prefix(sv: SemanticValues<'_, Syntax>) -> Result<Syntax, BoxError> {
    let mut values = sv.into_values();
    let operand = match values.pop() {
        Some(value) => into_expr(value)?,
        None => return Err("missing operand".into()),
    };
    let expr = match values.pop() {
        None => operand,
        Some(Syntax::Op('&')) => Expr::and(operand),
        Some(Syntax::Op('!')) if operand == Expr::AnyChar => Expr::EndOfInput,
        Some(Syntax::Op('!')) => Expr::not(operand),
        Some(other) => return Err(unexpected(&other)),
    };
    Ok(Syntax::Expr(expr))
}

fn suffix(sv: SemanticValues<'_, Syntax>) -> Result<Syntax, BoxError> {
    let mut values = sv.into_iter();
    let operand = match values.next() {
        Some(value) => into_expr(value)?,
        None => return Err("missing operand".into()),
    };
    let expr = match values.next() {
        None => operand,
        Some(Syntax::Op('?')) => Expr::optional(operand),
        Some(Syntax::Op('*')) => Expr::zero_or_more(operand),
        Some(Syntax::Op('+')) => Expr::one_or_more(operand),
        Some(other) => return Err(unexpected(&other)),
    };
    Ok(Syntax::Expr(expr))
}

fn primary(sv: SemanticValues<'_, Syntax>) -> Result<Syntax, BoxError> {
    let expr = match sv.into_iter().next() {
        Some(Syntax::Name(name, _)) => Expr::rule_ref(name),
        Some(Syntax::Expr(expr)) => expr,
        Some(other) => return Err(unexpected(&other)),
        None => Expr::AnyChar,
    };
    Ok(Syntax::Expr(expr))
}

fn identifier(sv: SemanticValues<'_, Syntax>) -> Result<Syntax, BoxError> {
    Ok(Syntax::Name(sv.text().to_owned(), sv.line_info()))
}

fn literal(sv: SemanticValues<'_, Syntax>) -> Result<Syntax, BoxError> {
    let ignore_case = sv.text().ends_with('i');
    let text = sv.values().iter().map(into_char).collect::<Result<_, _>>()?;
    Ok(Syntax::Expr(Expr::Literal(Literal { text, ignore_case })))
}

fn class(sv: SemanticValues<'_, Syntax>) -> Result<Syntax, BoxError> {
    let negated = sv.text().starts_with("[^");
    let ranges = sv
        .values()
        .iter()
        .map(|v| match v {
            Syntax::Range(start, end) => Ok(ClassRange { start: *start, end: *end }),
            other => Err(unexpected(other)),
        })
        .collect::<Result<_, _>>()?;
    Ok(Syntax::Expr(Expr::Class(CharClass { negated, ranges })))
}

fn range(sv: SemanticValues<'_, Syntax>) -> Result<Syntax, BoxError> {
    let start = match sv.get(0) {
        Some(v) => into_char(v)?,
        None => return Err("empty range".into()),
    };
    let end = match sv.get(1) {
        Some(v) => into_char(v)?,
        None => start,
    };
    if end < start {
        return Err(format!("invalid range `{}`: end is before start", sv.text()).into());
    }
    Ok(Syntax::Range(start, end))
}

fn character(sv: SemanticValues<'_, Syntax>) -> Result<Syntax, BoxError> {
    unescape(sv.text()).map(Syntax::Char)
}

fn operator(sv: SemanticValues<'_, Syntax>) -> Result<Syntax, BoxError> {
    match sv.text().chars().next() {
        Some(c) => Ok(Syntax::Op(c)),
        None => Err("missing operator".into()),
    }
}

/// Decode one character as written inside a literal or class.
fn unescape(text: &str) -> Result<char, BoxError> {
    let escaped = match text.strip_prefix('\\') {
        Some(rest) => rest,
        None => return text.chars().next().ok_or_else(|| "missing character".into()),
    };

    let hex = escaped
        .strip_prefix('x')
        .or_else(|| escaped.strip_prefix("u{").and_then(|s| s.strip_suffix('}')));

    match (escaped, hex) {
        ("n", _) => Ok('\n'),
        ("r", _) => Ok('\r'),
        ("t", _) => Ok('\t'),
        ("0", _) => Ok('\0'),
        (_, Some(hex)) => u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| format!("invalid character escape `{}`", text).into()),
        (_, None) => escaped.chars().next().ok_or_else(|| "missing escaped character".into()),
    }
}
