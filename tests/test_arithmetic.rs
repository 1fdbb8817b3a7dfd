use pegrat::{ParseError, Parser, SemanticValues};

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Num(i64),
    Op(char),
}

const GRAMMAR: &str = r"
Expression <- Sum
Sum        <- Product (SumOp Product)*
Product    <- Atom (ProductOp Atom)*
Atom       <- Number / '(' Sum ')'
SumOp      <- [+-]
ProductOp  <- [*/]
Number     <- [0-9]+
%whitespace <- [ \t]*
";

fn fold(sv: SemanticValues<'_, Value>) -> Result<Value, pegrat::BoxError> {
    let mut values = sv.into_iter();
    let mut acc = match values.next() {
        Some(Value::Num(n)) => n,
        other => return Err(format!("expected number, got {:?}", other).into()),
    };
    while let (Some(Value::Op(op)), Some(Value::Num(rhs))) = (values.next(), values.next()) {
        acc = match op {
            '+' => acc + rhs,
            '-' => acc - rhs,
            '*' => acc * rhs,
            '/' if rhs == 0 => return Err("division by zero".into()),
            '/' => acc / rhs,
            _ => return Err(format!("unknown operator {}", op).into()),
        };
    }
    Ok(Value::Num(acc))
}

fn parser() -> Parser<Value> {
    let mut parser = Parser::from_source(GRAMMAR).unwrap();
    parser
        .set_action("Sum", fold)
        .unwrap()
        .set_action("Product", fold)
        .unwrap()
        .set_action("SumOp", |sv| Ok(Value::Op(sv.text().chars().next().unwrap_or('?'))))
        .unwrap()
        .set_action("ProductOp", |sv| Ok(Value::Op(sv.text().chars().next().unwrap_or('?'))))
        .unwrap()
        .set_action("Number", |sv| Ok(Value::Num(sv.text().parse()?)))
        .unwrap();
    parser
}

fn expression(input: &str) -> Result<i64, String> {
    match parser().parse(input).map_err(|e| e.to_string())?.into_result() {
        Ok(Some(Value::Num(n))) => Ok(n),
        Ok(other) => Err(format!("unexpected value {:?}", other)),
        Err(failure) => Err(failure.to_string()),
    }
}

#[test]
fn main() {
    assert_eq!(expression("1+1"), Ok(2));
    assert_eq!(expression("5*5"), Ok(25));
    assert_eq!(expression("222+3333"), Ok(3555));
    assert_eq!(expression("2+3*4"), Ok(14));
    assert_eq!(expression("(2+2)*3"), Ok(12));
    assert!(expression("(22+)+1").is_err());
    assert!(expression("1++1").is_err());
    assert!(expression("3)+1").is_err());
}

#[test]
fn left_to_right() {
    assert_eq!(expression("8-2-1"), Ok(5));
    assert_eq!(expression("2*3-4/2"), Ok(4));
    assert_eq!(expression("100/10/5"), Ok(2));
}

#[test]
fn whitespace() {
    assert_eq!(expression(" 2 * ( 3 + 4 ) "), Ok(14));
    assert_eq!(expression("\t1 +\t2"), Ok(3));
    assert_eq!(expression("1 2"), Err("error at 1:3: expected one of EOF, [*/], [+-]".to_owned()));
    // numbers are tokens
    assert!(expression("1 0 + 1").is_err());
}

#[test]
fn action_error() {
    match parser().parse("7 + 1/0") {
        Err(ParseError::Action(e)) => {
            assert_eq!(e.rule, "Product");
            assert_eq!(e.location.column, 5);
            assert_eq!(e.source.to_string(), "division by zero");
        }
        other => panic!("expected action error, got {:?}", other),
    }
}

#[test]
fn overflowing_number() {
    match parser().parse("99999999999999999999") {
        Err(ParseError::Action(e)) => assert_eq!(e.rule, "Number"),
        other => panic!("expected action error, got {:?}", other),
    }
}
