use marmoset::{
    lexer::Lexer,
    token::{Token, TokenKind},
};

fn kinds_and_literals(source: &str) -> Vec<(TokenKind, String)> {
    Lexer::new(source)
        .tokenize()
        .into_iter()
        .map(|Token { kind, literal, .. }| (kind, literal))
        .collect()
}

fn expect_tokens(source: &str, expected: &[(TokenKind, &str)]) {
    let actual = kinds_and_literals(source);
    let expected: Vec<(TokenKind, String)> = expected
        .iter()
        .map(|(kind, literal)| (*kind, literal.to_string()))
        .collect();
    assert_eq!(actual, expected, "token stream for {source:?}");
}

#[test]
fn scans_a_small_program() {
    use TokenKind::*;
    expect_tokens(
        r#"let five = 5;
let add = fn(x, y) { x + y; };
let result = add(five, 10);
!-/*%5;
5 < 10 > 5;
if (5 <= 10) { return true; } else { return false; }
10 == 10; 10 != 9; 3 >= 2;
"foo bar"
[1, 2];
{"foo": "bar"}
while (a && b || c) { }
"#,
        &[
            (Let, "let"),
            (Ident, "five"),
            (Assign, "="),
            (Int, "5"),
            (Semicolon, ";"),
            (Let, "let"),
            (Ident, "add"),
            (Assign, "="),
            (Function, "fn"),
            (LParen, "("),
            (Ident, "x"),
            (Comma, ","),
            (Ident, "y"),
            (RParen, ")"),
            (LBrace, "{"),
            (Ident, "x"),
            (Plus, "+"),
            (Ident, "y"),
            (Semicolon, ";"),
            (RBrace, "}"),
            (Semicolon, ";"),
            (Let, "let"),
            (Ident, "result"),
            (Assign, "="),
            (Ident, "add"),
            (LParen, "("),
            (Ident, "five"),
            (Comma, ","),
            (Int, "10"),
            (RParen, ")"),
            (Semicolon, ";"),
            (Bang, "!"),
            (Minus, "-"),
            (Slash, "/"),
            (Asterisk, "*"),
            (Percent, "%"),
            (Int, "5"),
            (Semicolon, ";"),
            (Int, "5"),
            (Less, "<"),
            (Int, "10"),
            (Greater, ">"),
            (Int, "5"),
            (Semicolon, ";"),
            (If, "if"),
            (LParen, "("),
            (Int, "5"),
            (LessEqual, "<="),
            (Int, "10"),
            (RParen, ")"),
            (LBrace, "{"),
            (Return, "return"),
            (True, "true"),
            (Semicolon, ";"),
            (RBrace, "}"),
            (Else, "else"),
            (LBrace, "{"),
            (Return, "return"),
            (False, "false"),
            (Semicolon, ";"),
            (RBrace, "}"),
            (Int, "10"),
            (Equal, "=="),
            (Int, "10"),
            (Semicolon, ";"),
            (Int, "10"),
            (NotEqual, "!="),
            (Int, "9"),
            (Semicolon, ";"),
            (Int, "3"),
            (GreaterEqual, ">="),
            (Int, "2"),
            (Semicolon, ";"),
            (String, "foo bar"),
            (LBracket, "["),
            (Int, "1"),
            (Comma, ","),
            (Int, "2"),
            (RBracket, "]"),
            (Semicolon, ";"),
            (LBrace, "{"),
            (String, "foo"),
            (Colon, ":"),
            (String, "bar"),
            (RBrace, "}"),
            (While, "while"),
            (LParen, "("),
            (Ident, "a"),
            (And, "&&"),
            (Ident, "b"),
            (Or, "||"),
            (Ident, "c"),
            (RParen, ")"),
            (LBrace, "{"),
            (RBrace, "}"),
            (Eof, ""),
        ],
    );
}

#[test]
fn keeps_returning_eof_past_the_end() {
    let mut lexer = Lexer::new("x");
    assert_eq!(lexer.next_token().kind, TokenKind::Ident);
    for _ in 0..3 {
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Eof);
        assert_eq!(token.literal, "");
    }
}

#[test]
fn tokenize_ends_with_exactly_one_eof() {
    let tokens = Lexer::new("1 + 2   \n\t").tokenize();
    let eof_count = tokens
        .iter()
        .filter(|token| token.kind == TokenKind::Eof)
        .count();
    assert_eq!(eof_count, 1);
    assert_eq!(tokens.last().map(|token| token.kind), Some(TokenKind::Eof));
}

#[test]
fn separates_doubles_from_ranges() {
    use TokenKind::*;
    expect_tokens("3.25", &[(Double, "3.25"), (Eof, "")]);
    expect_tokens("1..10", &[(Int, "1"), (DotDot, ".."), (Int, "10"), (Eof, "")]);
    expect_tokens(
        "1.5..2",
        &[(Double, "1.5"), (DotDot, ".."), (Int, "2"), (Eof, "")],
    );
    expect_tokens("7.", &[(Int, "7"), (Illegal, "."), (Eof, "")]);
}

#[test]
fn resolves_string_escapes() {
    let tokens = Lexer::new(r#""a\"b\\c\td\ne\rf""#).tokenize();
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].literal, "a\"b\\c\td\ne\rf");
}

#[test]
fn unterminated_string_runs_to_end_of_input() {
    use TokenKind::*;
    expect_tokens("\"open", &[(String, "open"), (Eof, "")]);
}

#[test]
fn single_ampersand_and_pipe_are_illegal() {
    use TokenKind::*;
    expect_tokens(
        "a & b | c @",
        &[
            (Ident, "a"),
            (Illegal, "&"),
            (Ident, "b"),
            (Illegal, "|"),
            (Ident, "c"),
            (Illegal, "@"),
            (Eof, ""),
        ],
    );
}

#[test]
fn identifiers_are_letter_runs() {
    use TokenKind::*;
    expect_tokens(
        "snake_case x1",
        &[
            (Ident, "snake_case"),
            (Ident, "x"),
            (Int, "1"),
            (Eof, ""),
        ],
    );
}

#[test]
fn tokens_carry_byte_spans() {
    let tokens = Lexer::new("let  ab").tokenize();
    assert_eq!((tokens[0].span.start, tokens[0].span.end), (0, 3));
    assert_eq!((tokens[1].span.start, tokens[1].span.end), (5, 7));
}
