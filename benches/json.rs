#![feature(test)]
extern crate test;

use test::Bencher;

// JSON grammar (RFC 4627). Note that this only checks for valid JSON and does not build a syntax
// tree.
const GRAMMAR: &str = r#"
json <- object / array

value <- 'false' / 'true' / 'null' / object / array / number / string
object <- '{' (member (',' member)*)? '}'
member <- string ':' value
array <- '[' (value (',' value)*)? ']'

number <- '-'? int frac? exp?
int <- '0' / [1-9] [0-9]*
exp <- [eE] [-+]? [0-9]+
frac <- '.' [0-9]+

# note: escaped chars not handled
string <- '"' (!'"' .)* '"'

%whitespace <- [ \t\r\n]*
"#;

const INPUT: &str = r#"
{
	"X": 0.6e2,
	"Y": 5,
	"Z": -5.312344,
	"Bool": false,
	"Bool": true,
	"Null": null,
	"Attr": {
		"Name": "bla",
		"Siblings": [6, 1, 2, {}, {}, {}]
	},
	"Nested Array": [[[[[[[[[]]]]]]]]],
	"Obj": {
		"Child": {
			"A": [],
			"Child": {
				"Child": {}
			}
		}
	}
}
"#;

#[bench]
fn json(b: &mut Bencher) {
	let grammar = pegrat::compile(GRAMMAR).unwrap();

	b.bytes = INPUT.len() as u64;
	b.iter(|| {
		assert!(grammar.parse(INPUT).unwrap().is_matched());
	});
}

#[bench]
fn json_no_packrat(b: &mut Bencher) {
	let mut grammar = pegrat::compile(GRAMMAR).unwrap();
	grammar.enable_packrat(false);

	b.bytes = INPUT.len() as u64;
	b.iter(|| {
		assert!(grammar.parse(INPUT).unwrap().is_matched());
	});
}

#[bench]
fn compile_json_grammar(b: &mut Bencher) {
	b.bytes = GRAMMAR.len() as u64;
	b.iter(|| {
		pegrat::compile(GRAMMAR).unwrap();
	});
}
