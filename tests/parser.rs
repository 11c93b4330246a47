use rox::ast::{Expr, ExprIds, Stmt};
use rox::ast_printer::AstPrinter;
use rox::parser::Parser;
use rox::scanner::Scanner;

fn parse(source: &str) -> Result<Vec<Stmt>, Vec<String>> {
    let (tokens, lex_errors) = Scanner::new(source).scan_all();
    assert!(lex_errors.is_empty(), "lex errors: {:?}", lex_errors);

    let mut ids = ExprIds::new();

    Parser::new(tokens, &mut ids)
        .parse()
        .map_err(|errors| errors.iter().map(|e| e.to_string()).collect())
}

fn printed(source: &str) -> Vec<String> {
    let statements = parse(source).unwrap_or_else(|e| panic!("parse failed: {:?}", e));

    statements.iter().map(AstPrinter::print_stmt).collect()
}

#[test]
fn precedence_and_grouping() {
    assert_eq!(
        printed("print 1 + 2 * 3; print (1 + 2) * 3; print -1 - -2;"),
        vec![
            "(print (+ 1.0 (* 2.0 3.0)))",
            "(print (* (group (+ 1.0 2.0)) 3.0))",
            "(print (- (- 1.0) (- 2.0)))",
        ]
    );
}

#[test]
fn comparison_binds_tighter_than_logic() {
    assert_eq!(
        printed("a < b or c == d and !e;"),
        vec!["(; (or (< a b) (and (== c d) (! e))))"]
    );
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(printed("a = b = 3;"), vec!["(; (= a (= b 3.0)))"]);
}

#[test]
fn property_get_set_and_calls() {
    assert_eq!(
        printed("obj.field = f(1, \"two\").next;"),
        vec!["(; (= (. obj field) (. (call f 1.0 two) next)))"]
    );
}

#[test]
fn for_loop_desugars_into_while() {
    assert_eq!(
        printed("for (var i = 0; i < 3; i = i + 1) print i;"),
        vec!["(block (var i = 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"]
    );

    // No clauses at all loops on `true`.
    assert_eq!(printed("for (;;) print 1;"), vec!["(while true (print 1.0))"]);
}

#[test]
fn functions_and_returns() {
    assert_eq!(
        printed("fun add(a, b) { return a + b; } fun nothing() { return; }"),
        vec![
            "(fun add(a b) (return (+ a b)))",
            "(fun nothing() (return))",
        ]
    );
}

#[test]
fn class_with_superclass_and_super_call() {
    assert_eq!(
        printed("class B < A { m() { return super.m(); } init(x) { this.x = x; } }"),
        vec![
            "(class B < A (method m() (return (call (super m)))) (method init(x) (; (= (. this x) x))))"
        ]
    );
}

#[test]
fn if_else_and_blocks() {
    assert_eq!(
        printed("if (a) { print 1; } else print 2; while (false) {}"),
        vec![
            "(if-else a (block (print 1.0)) (print 2.0))",
            "(while false (block))",
        ]
    );
}

#[test]
fn every_reference_gets_a_distinct_id() {
    let statements = parse("a = a; this; super.x;").unwrap();

    let mut ids = Vec::new();

    for stmt in &statements {
        let Stmt::Expression(expr) = stmt else {
            panic!("expected expression statement, got {:?}", stmt);
        };

        match expr {
            Expr::Assign { id, value, .. } => {
                ids.push(*id);
                if let Expr::Variable { id, .. } = value.as_ref() {
                    ids.push(*id);
                }
            }
            Expr::This { id, .. } | Expr::Super { id, .. } => ids.push(*id),
            other => panic!("unexpected expression {:?}", other),
        }
    }

    assert_eq!(ids.len(), 4);

    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 4);
}

#[test]
fn ids_stay_unique_across_parses_sharing_an_allocator() {
    let mut ids = ExprIds::new();

    let first = {
        let (tokens, _) = Scanner::new("x;").scan_all();
        Parser::new(tokens, &mut ids).parse().unwrap()
    };
    let second = {
        let (tokens, _) = Scanner::new("x;").scan_all();
        Parser::new(tokens, &mut ids).parse().unwrap()
    };

    fn id_of(statements: &[Stmt]) -> rox::ast::ExprId {
        match &statements[0] {
            Stmt::Expression(Expr::Variable { id, .. }) => *id,
            other => panic!("unexpected statement {:?}", other),
        }
    }

    assert_ne!(id_of(&first), id_of(&second));
}

#[test]
fn errors_are_collected_after_synchronising() {
    let errors = parse("var = 1;\nprint 2\nvar b = 3;").unwrap_err();

    assert_eq!(
        errors,
        vec![
            "line 1: Error at '=': Expect variable name.",
            "line 3: Error at 'var': Expect ';' after value.",
        ]
    );
}

#[test]
fn invalid_assignment_target() {
    assert_eq!(
        parse("a + b = 3;").unwrap_err(),
        vec!["line 1: Error at '=': Invalid assignment target."]
    );
}

#[test]
fn missing_semicolon_at_end() {
    assert_eq!(
        parse("print 1").unwrap_err(),
        vec!["line 1: Error at end: Expect ';' after value."]
    );
}

#[test]
fn too_many_arguments() {
    let arguments = vec!["0"; 256].join(", ");
    let source = format!("f({});", arguments);

    let errors = parse(&source).unwrap_err();

    assert_eq!(errors.len(), 1);
    assert!(
        errors[0].ends_with("Can't have more than 255 arguments."),
        "got {:?}",
        errors
    );
}

#[test]
fn single_expression_entry_point() {
    let (tokens, _) = Scanner::new("(1 + 2) * x").scan_all();
    let mut ids = ExprIds::new();

    let expr = Parser::new(tokens, &mut ids).parse_expression().unwrap();

    assert_eq!(AstPrinter::print(&expr), "(* (group (+ 1.0 2.0)) x)");

    let (tokens, _) = Scanner::new("1 2").scan_all();
    let error = Parser::new(tokens, &mut ids).parse_expression().unwrap_err();

    assert_eq!(
        error.to_string(),
        "line 1: Error at '2': Expect end of expression."
    );
}

#[test]
fn ast_serialises_to_json() {
    let statements = parse("var a = 1;").unwrap();

    let json = serde_json::to_value(&statements).unwrap();

    assert_eq!(json[0]["Var"]["name"]["lexeme"], "a");
    assert_eq!(json[0]["Var"]["initializer"]["Literal"]["Number"], 1.0);
}
