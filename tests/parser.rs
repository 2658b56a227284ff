use marmoset::{
    ast::{Expression, InfixOperator, Statement},
    lexer::Lexer,
    parse_program,
    parser::Parser,
};

fn render(source: &str) -> String {
    let (program, errors) = parse_program(source);
    assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
    program.to_string()
}

fn error_messages(source: &str) -> Vec<String> {
    let (_, errors) = parse_program(source);
    errors.into_iter().map(|diag| diag.message).collect()
}

#[test]
fn operator_precedence() {
    let cases = [
        ("-a * b", "((-a) * b)"),
        ("!-a", "(!(-a))"),
        ("a + b + c", "((a + b) + c)"),
        ("a + b - c", "((a + b) - c)"),
        ("a * b * c", "((a * b) * c)"),
        ("a + b / c", "(a + (b / c))"),
        ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
        ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
        ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
        ("2 * (5 + 10)", "(2 * (5 + 10))"),
        ("-(5 + 5)", "(-(5 + 5))"),
        ("a * b % c", "(a * (b % c))"),
        ("a < b && c", "(a < (b && c))"),
        ("1 + 2..3 * 4", "((1 + 2)..(3 * 4))"),
        ("x == 1..3", "(x == (1..3))"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
        (
            "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
            "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
        ),
        (
            "a * [1, 2, 3, 4][b * c] * d",
            "((a * ([1, 2, 3, 4][(b * c)])) * d)",
        ),
        ("add(a * b[2], b[1])", "add((a * (b[2])), (b[1]))"),
    ];
    for (source, expected) in cases {
        assert_eq!(render(source), expected, "rendering {source:?}");
    }
}

#[test]
fn let_and_return_statements() {
    let (program, errors) = parse_program("let x = 5; return x; return;");
    assert!(errors.is_empty());
    assert_eq!(program.statements.len(), 3);
    match &program.statements[0] {
        Statement::Let { name, value } => {
            assert_eq!(name.name, "x");
            assert_eq!(value, &Expression::Integer(5));
        }
        other => panic!("expected let, found {other:?}"),
    }
    assert!(matches!(&program.statements[1], Statement::Return(Some(_))));
    assert!(matches!(&program.statements[2], Statement::Return(None)));
}

#[test]
fn semicolons_are_optional() {
    let (program, errors) = parse_program("let a = 1\nlet b = 2\na + b");
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(program.statements.len(), 3);
}

#[test]
fn if_else_and_while() {
    assert_eq!(
        render("if (x < y) { x } else { y }"),
        "if (x < y) { x } else { y }"
    );
    assert_eq!(
        render("while (i < 3) { let i = i + 1; }"),
        "while (i < 3) { let i = (i + 1); }"
    );
}

#[test]
fn function_literal_parameters() {
    for (source, expected) in [
        ("fn() {}", Vec::<&str>::new()),
        ("fn(x) {}", vec!["x"]),
        ("fn(x, y, z) {}", vec!["x", "y", "z"]),
    ] {
        let (program, errors) = parse_program(source);
        assert!(errors.is_empty(), "{errors:?}");
        match &program.statements[0] {
            Statement::Expression(Expression::Function(literal)) => {
                let names: Vec<&str> = literal
                    .parameters
                    .iter()
                    .map(|param| param.name.as_str())
                    .collect();
                assert_eq!(names, expected);
            }
            other => panic!("expected function literal, found {other:?}"),
        }
    }
}

#[test]
fn hash_literal_keeps_source_order() {
    let (program, errors) = parse_program(r#"{"one": 1, "two": 1 + 1, 3: true}"#);
    assert!(errors.is_empty(), "{errors:?}");
    match &program.statements[0] {
        Statement::Expression(Expression::Hash(pairs)) => {
            assert_eq!(pairs.len(), 3);
            assert_eq!(pairs[0].0, Expression::String("one".into()));
            assert!(matches!(
                &pairs[1].1,
                Expression::Infix {
                    operator: InfixOperator::Add,
                    ..
                }
            ));
            assert_eq!(pairs[2].0, Expression::Integer(3));
        }
        other => panic!("expected hash literal, found {other:?}"),
    }
    assert_eq!(render("{}"), "{}");
}

#[test]
fn literals() {
    assert_eq!(render("2.5"), "2.5");
    assert_eq!(render(r#""hello world""#), "\"hello world\"");
    assert_eq!(render("true == !false"), "(true == (!false))");
}

#[test]
fn reports_missing_tokens() {
    assert_eq!(
        error_messages("let = 5;"),
        vec![
            "expected next token to be IDENT, got = instead".to_string(),
            "no prefix parse function for = found".to_string(),
        ]
    );
    assert_eq!(
        error_messages("let x 5;"),
        vec!["expected next token to be =, got INT instead".to_string()]
    );
}

#[test]
fn reports_missing_prefix_parser() {
    let messages = error_messages("let x = ;");
    assert_eq!(messages, vec!["no prefix parse function for ; found".to_string()]);
}

#[test]
fn reports_integer_overflow_in_literal() {
    let messages = error_messages("99999999999999999999");
    assert_eq!(
        messages,
        vec!["could not parse 99999999999999999999 as integer".to_string()]
    );
}

#[test]
fn unclosed_constructs_terminate() {
    for source in ["fn(x { x", "if (x", "[1, 2", "{\"a\": 1", "add(1,", "(1 + 2"] {
        assert!(!error_messages(source).is_empty(), "{source:?} should fail");
    }
    // An unterminated block simply ends at EOF.
    assert!(error_messages("while (true) {").is_empty());
}

#[test]
fn error_lists_are_reproducible() {
    let source = "let = ; if (x { ) ]";
    let first = error_messages(source);
    let second = error_messages(source);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn diagnostics_point_at_the_offending_token() {
    let (_, errors) = parse_program("let x 5;");
    let span = errors[0].span.expect("span recorded");
    assert_eq!((span.start, span.end), (6, 7));
    assert_eq!(
        errors[0].to_string(),
        "expected next token to be =, got INT instead (6..7)"
    );
}

#[test]
fn parser_exposes_errors_after_a_run() {
    let mut parser = Parser::new(Lexer::new("let x = 1; let y 2; x"));
    let program = parser.parse_program();
    assert_eq!(program.statements.len(), 3);
    assert_eq!(parser.errors().len(), 1);
    assert_eq!(
        parser.errors()[0].message,
        "expected next token to be =, got INT instead"
    );
}
