use std::fmt::{self, Display, Write};

/// Index of a rule within its grammar, assigned in definition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(pub(crate) usize);

impl RuleId {
    /// Placeholder carried by references until the grammar is built.
    pub(crate) const UNRESOLVED: RuleId = RuleId(usize::MAX);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub text: String,
    pub ignore_case: bool,
}

/// An inclusive range of code points. A single character is `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassRange {
    pub start: char,
    pub end: char,
}

impl ClassRange {
    pub fn contains(&self, c: char) -> bool {
        self.start <= c && c <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharClass {
    pub negated: bool,
    pub ranges: Vec<ClassRange>,
}

impl CharClass {
    pub fn matches(&self, c: char) -> bool {
        self.ranges.iter().any(|r| r.contains(c)) != self.negated
    }
}

/// A reference to another rule by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRef {
    pub(crate) name: String,
    pub(crate) id: RuleId,
}

impl RuleRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The referenced rule. Only meaningful on expressions taken from a built `Grammar`.
    pub fn id(&self) -> RuleId {
        self.id
    }
}

/// A parsing expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(Literal),
    Class(CharClass),
    AnyChar,
    Sequence(Vec<Expr>),
    Choice(Vec<Expr>),
    ZeroOrMore(Box<Expr>),
    OneOrMore(Box<Expr>),
    Optional(Box<Expr>),
    And(Box<Expr>),
    Not(Box<Expr>),
    RuleRef(RuleRef),
    EndOfInput,
}

impl Expr {
    pub fn literal(text: impl Into<String>) -> Expr {
        Expr::Literal(Literal {
            text: text.into(),
            ignore_case: false,
        })
    }

    pub fn literal_ignore_case(text: impl Into<String>) -> Expr {
        Expr::Literal(Literal {
            text: text.into(),
            ignore_case: true,
        })
    }

    /// Character class from `(start, end)` pairs.
    pub fn class(ranges: &[(char, char)]) -> Expr {
        Expr::Class(CharClass {
            negated: false,
            ranges: ranges.iter().map(|&(start, end)| ClassRange { start, end }).collect(),
        })
    }

    pub fn negated_class(ranges: &[(char, char)]) -> Expr {
        match Expr::class(ranges) {
            Expr::Class(class) => Expr::Class(CharClass { negated: true, ..class }),
            other => other,
        }
    }

    /// Class matching exactly the characters in `chars`.
    pub fn one_of(chars: &str) -> Expr {
        let ranges: Vec<(char, char)> = chars.chars().map(|c| (c, c)).collect();
        Expr::class(&ranges)
    }

    pub fn any() -> Expr {
        Expr::AnyChar
    }

    pub fn eoi() -> Expr {
        Expr::EndOfInput
    }

    pub fn rule_ref(name: impl Into<String>) -> Expr {
        Expr::RuleRef(RuleRef {
            name: name.into(),
            id: RuleId::UNRESOLVED,
        })
    }

    pub fn seq(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Sequence(exprs.into_iter().collect())
    }

    pub fn choice(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Choice(exprs.into_iter().collect())
    }

    pub fn zero_or_more(inner: Expr) -> Expr {
        Expr::ZeroOrMore(Box::new(inner))
    }

    pub fn one_or_more(inner: Expr) -> Expr {
        Expr::OneOrMore(Box::new(inner))
    }

    pub fn optional(inner: Expr) -> Expr {
        Expr::Optional(Box::new(inner))
    }

    pub fn and(inner: Expr) -> Expr {
        Expr::And(Box::new(inner))
    }

    pub fn not(inner: Expr) -> Expr {
        Expr::Not(Box::new(inner))
    }

    /// Direct subexpressions, in evaluation order.
    pub fn children(&self) -> &[Expr] {
        match self {
            Expr::Sequence(exprs) | Expr::Choice(exprs) => exprs,
            Expr::ZeroOrMore(inner)
            | Expr::OneOrMore(inner)
            | Expr::Optional(inner)
            | Expr::And(inner)
            | Expr::Not(inner) => std::slice::from_ref(&**inner),
            Expr::Literal(_) | Expr::Class(_) | Expr::AnyChar | Expr::RuleRef(_) | Expr::EndOfInput => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Expr] {
        match self {
            Expr::Sequence(exprs) | Expr::Choice(exprs) => exprs,
            Expr::ZeroOrMore(inner)
            | Expr::OneOrMore(inner)
            | Expr::Optional(inner)
            | Expr::And(inner)
            | Expr::Not(inner) => std::slice::from_mut(&mut **inner),
            Expr::Literal(_) | Expr::Class(_) | Expr::AnyChar | Expr::RuleRef(_) | Expr::EndOfInput => &mut [],
        }
    }

    /// Calls `f` on every rule reference in this expression, left to right.
    pub fn visit_refs<'a>(&'a self, f: &mut impl FnMut(&'a RuleRef)) {
        match self {
            Expr::RuleRef(r) => f(r),
            _ => {
                for child in self.children() {
                    child.visit_refs(f);
                }
            }
        }
    }

    pub fn has_rule_refs(&self) -> bool {
        let mut found = false;
        self.visit_refs(&mut |_| found = true);
        found
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Choice(exprs) if exprs.len() > 1 => 0,
            Expr::Sequence(exprs) if exprs.len() != 1 => 1,
            Expr::And(_) | Expr::Not(_) | Expr::EndOfInput => 2,
            Expr::ZeroOrMore(_) | Expr::OneOrMore(_) | Expr::Optional(_) => 3,
            _ => 4,
        }
    }

    fn fmt_operand(&self, fmt: &mut fmt::Formatter, min_prec: u8) -> fmt::Result {
        if self.precedence() < min_prec {
            write!(fmt, "({})", self)
        } else {
            write!(fmt, "{}", self)
        }
    }
}

fn write_class_char(out: &mut impl Write, c: char) -> fmt::Result {
    match c {
        '\n' => out.write_str("\\n"),
        '\r' => out.write_str("\\r"),
        '\t' => out.write_str("\\t"),
        '\0' => out.write_str("\\0"),
        '\\' | ']' | '[' | '^' | '-' => write!(out, "\\{}", c),
        c if c.is_control() => write!(out, "\\u{{{:x}}}", c as u32),
        c => out.write_char(c),
    }
}

impl Display for Literal {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{:?}", self.text)?;
        if self.ignore_case {
            fmt.write_char('i')?;
        }
        Ok(())
    }
}

impl Display for CharClass {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_char('[')?;
        if self.negated {
            fmt.write_char('^')?;
        }
        for range in &self.ranges {
            write_class_char(fmt, range.start)?;
            if range.end != range.start {
                fmt.write_char('-')?;
                write_class_char(fmt, range.end)?;
            }
        }
        fmt.write_char(']')
    }
}

/// Formats the expression in grammar notation.
impl Display for Expr {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(fmt, "{}", lit),
            Expr::Class(class) => write!(fmt, "{}", class),
            Expr::AnyChar => fmt.write_char('.'),
            Expr::EndOfInput => fmt.write_str("!."),
            Expr::RuleRef(r) => fmt.write_str(&r.name),
            Expr::Sequence(exprs) if exprs.is_empty() => fmt.write_str("''"),
            Expr::Sequence(exprs) => {
                for (i, e) in exprs.iter().enumerate() {
                    if i > 0 {
                        fmt.write_char(' ')?;
                    }
                    e.fmt_operand(fmt, 2)?;
                }
                Ok(())
            }
            Expr::Choice(exprs) => {
                for (i, e) in exprs.iter().enumerate() {
                    if i > 0 {
                        fmt.write_str(" / ")?;
                    }
                    e.fmt_operand(fmt, 1)?;
                }
                Ok(())
            }
            Expr::ZeroOrMore(inner) => {
                inner.fmt_operand(fmt, 4)?;
                fmt.write_char('*')
            }
            Expr::OneOrMore(inner) => {
                inner.fmt_operand(fmt, 4)?;
                fmt.write_char('+')
            }
            Expr::Optional(inner) => {
                inner.fmt_operand(fmt, 4)?;
                fmt.write_char('?')
            }
            Expr::And(inner) => {
                fmt.write_char('&')?;
                inner.fmt_operand(fmt, 3)
            }
            Expr::Not(inner) => {
                fmt.write_char('!')?;
                inner.fmt_operand(fmt, 3)
            }
        }
    }
}
