use marmoset::{
    repl::{is_balanced, Repl},
    ReplConfig,
};

#[test]
fn balance_counts_every_bracket_kind() {
    assert!(is_balanced(""));
    assert!(is_balanced("let a = [1, {\"k\": (2)}];"));
    assert!(!is_balanced("let f = fn(x) {"));
    assert!(!is_balanced("[1, 2"));
    assert!(!is_balanced("puts(("));
    assert!(is_balanced("1 }"));
    // Brackets inside string literals count too.
    assert!(!is_balanced("puts(\"(\")"));
}

#[test]
fn single_lines_evaluate_immediately() {
    let mut repl = Repl::new();
    assert_eq!(repl.feed_line("1 + 2").as_deref(), Some("3"));
    assert_eq!(repl.feed_line("\"a\" * 2").as_deref(), Some("aa"));
    assert_eq!(repl.feed_line("if (false) { 1 }").as_deref(), Some("null"));
}

#[test]
fn bindings_survive_between_lines() {
    let mut repl = Repl::new();
    assert_eq!(repl.feed_line("let x = 20;").as_deref(), Some("20"));
    assert_eq!(repl.feed_line("x * 2 + 2").as_deref(), Some("42"));
}

#[test]
fn unbalanced_input_waits_for_more_lines() {
    let mut repl = Repl::with_config(ReplConfig::default());
    assert_eq!(repl.feed_line("let add = fn(a, b) {"), None);
    assert_eq!(repl.feed_line("  a + b"), None);
    assert_eq!(
        repl.feed_line("};").as_deref(),
        Some("fn(a, b) {\n(a + b)\n}")
    );
    assert_eq!(repl.feed_line("add(1, 2)").as_deref(), Some("3"));
}

#[test]
fn errors_are_reported_and_the_session_continues() {
    let mut repl = Repl::new();
    assert_eq!(
        repl.feed_line("missing").as_deref(),
        Some("ERROR: identifier not found: missing")
    );
    assert_eq!(
        repl.feed_line("let = 5").as_deref(),
        Some("parser errors:\n\texpected next token to be IDENT, got = instead\n\tno prefix parse function for = found")
    );
    assert_eq!(repl.feed_line("5").as_deref(), Some("5"));
}

#[test]
fn surplus_closers_reach_the_parser() {
    let mut repl = Repl::new();
    let output = repl.feed_line(")").expect("balanced enough to evaluate");
    assert_eq!(
        output,
        "parser errors:\n\tno prefix parse function for ) found"
    );
}

#[test]
fn default_prompts() {
    let config = ReplConfig::default();
    assert_eq!(config.prompt, ">> ");
    assert_eq!(config.continuation, "... ");
}
