use crate::error::{CompileError, GrammarSyntaxError, ParseError};
use crate::grammar::{Grammar, GrammarBuilder};
use crate::meta::{Syntax, META};
use crate::parser::ParseResult;

/// Compile grammar text into a [`Grammar`].
///
/// Each line of the form `Name <- expression` defines a rule; the first rule
/// other than `%whitespace` is the start rule. Warnings about the grammar are
/// logged and kept on the result, see [`Grammar::warnings`].
pub fn compile(source: &str) -> Result<Grammar, CompileError> {
    let meta = match &*META {
        Ok(meta) => meta,
        Err(e) => return Err(e.clone()),
    };

    let definitions = match meta.parse(source) {
        Ok(ParseResult::Matched {
            value: Some(Syntax::Grammar(definitions)),
            ..
        }) => definitions,
        Ok(ParseResult::Matched { .. }) => return Err(CompileError::NoRules),
        Ok(ParseResult::Failed(failure)) => return Err(GrammarSyntaxError::from(failure).into()),
        Err(ParseError::Action(e)) => return Err(GrammarSyntaxError::at(e.location, e.source.to_string()).into()),
        Err(ParseError::StackOverflow(e)) => {
            return Err(GrammarSyntaxError::at(e.location, "expressions nested too deeply").into())
        }
        Err(ParseError::UnknownRule(e)) => return Err(e.into()),
    };

    let grammar = definitions
        .into_iter()
        .fold(GrammarBuilder::new(), GrammarBuilder::define)
        .build()?;

    for warning in grammar.warnings() {
        match warning.location {
            Some(location) => log::warn!("{} (at {})", warning, location),
            None => log::warn!("{}", warning),
        }
    }

    log::debug!("compiled grammar with {} rules", grammar.rules().len());
    Ok(grammar)
}
