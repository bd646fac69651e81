use super::*;
use crate::lexer;

fn tokens_of(input: &str) -> Vec<Token> {
    let mut diag = Diagnostics::new("test.c");
    let tokens = lexer::lex(input, &mut diag);
    assert!(!diag.has_errors());
    tokens
}

fn parse_ok(input: &str) -> Program {
    let mut diag = Diagnostics::new("test.c");
    let tokens = lexer::lex(input, &mut diag);
    let program = parse(&tokens, &mut diag);
    assert!(!diag.has_errors(), "unexpected errors: {:?}", diag.entries());
    program
}

fn parse_expression(input: &str) -> Expr {
    let tokens = tokens_of(input);
    let mut cursor = Cursor::new(&tokens);
    let exp = parse_exp(&mut cursor, 0).expect("expression should parse");
    assert!(cursor.at_end(), "expression not fully consumed");
    exp
}

fn binary_parts(exp: &Expr) -> (&Expr, TokenKind, &Expr) {
    match exp {
        Expr::Binary(b) => (&b.left, b.op.kind, &b.right),
        other => panic!("expected binary expression, got {other:?}"),
    }
}

fn literal_lexeme(exp: &Expr) -> &str {
    match exp {
        Expr::Literal(t) => &t.lexeme,
        other => panic!("expected literal, got {other:?}"),
    }
}

#[test]
fn test_expression_precedence() {
    // 1 * 2 - 3 * (4 + 5)  =>  (1 * 2) - (3 * (4 + 5))
    let exp = parse_expression("1 * 2 - 3 * (4 + 5)");
    let (left, op, right) = binary_parts(&exp);
    assert_eq!(op, TokenKind::Minus);

    let (l1, lop, l2) = binary_parts(left);
    assert_eq!(lop, TokenKind::Star);
    assert_eq!(literal_lexeme(l1), "1");
    assert_eq!(literal_lexeme(l2), "2");

    let (r1, rop, r2) = binary_parts(right);
    assert_eq!(rop, TokenKind::Star);
    assert_eq!(literal_lexeme(r1), "3");
    let (s1, sop, s2) = binary_parts(r2);
    assert_eq!(sop, TokenKind::Plus);
    assert_eq!(literal_lexeme(s1), "4");
    assert_eq!(literal_lexeme(s2), "5");
}

#[test]
fn test_shift_binds_looser_than_additive() {
    let exp = parse_expression("1 << 2 + 3");
    let (_, op, right) = binary_parts(&exp);
    assert_eq!(op, TokenKind::Shl);
    let (_, rop, _) = binary_parts(right);
    assert_eq!(rop, TokenKind::Plus);
}

#[test]
fn test_assignment_is_right_associative() {
    let exp = parse_expression("a = b = 1");
    let (left, op, right) = binary_parts(&exp);
    assert_eq!(op, TokenKind::Assign);
    assert!(left.is_variable());
    let (rl, rop, _) = binary_parts(right);
    assert_eq!(rop, TokenKind::Assign);
    assert!(rl.is_variable());
}

#[test]
fn test_compound_assign_keeps_own_node() {
    let exp = parse_expression("a += 2 * b");
    let Expr::CompoundAssign(c) = exp else {
        panic!("expected compound assignment");
    };
    assert_eq!(c.op.kind, TokenKind::PlusAssign);
    assert!(c.target.is_variable());
    let (_, op, _) = binary_parts(&c.value);
    assert_eq!(op, TokenKind::Star);
}

#[test]
fn test_conditional_is_right_associative() {
    let exp = parse_expression("a ? 1 : b ? 2 : 3");
    let Expr::Conditional(outer) = exp else {
        panic!("expected conditional");
    };
    assert!(matches!(*outer.els, Expr::Conditional(_)));
}

#[test]
fn test_prefix_and_postfix_increment() {
    let pre = parse_expression("++a");
    let Expr::Unary(u) = pre else { panic!() };
    assert!(u.is_prefix);
    assert_eq!(u.op.kind, TokenKind::PlusPlus);

    let post = parse_expression("a++");
    let Expr::Unary(u) = post else { panic!() };
    assert!(!u.is_prefix);
    assert_eq!(u.op.kind, TokenKind::PlusPlus);
}

#[test]
fn test_unary_binds_tighter_than_binary() {
    let exp = parse_expression("-a + b");
    let (left, op, _) = binary_parts(&exp);
    assert_eq!(op, TokenKind::Plus);
    assert!(matches!(left, Expr::Unary(_)));
}

#[test]
fn test_postfix_chain() {
    // a[1](2).m  =>  member access on a call on a subscript
    let exp = parse_expression("a[1](2).m");
    let Expr::MemberAccess(m) = exp else { panic!() };
    assert_eq!(m.member.lexeme, "m");
    let Expr::Call(c) = m.object.as_ref() else {
        panic!()
    };
    assert_eq!(c.args.len(), 1);
    assert!(matches!(c.callee.as_ref(), Expr::ArrayAccess(_)));
}

#[test]
fn test_arrow_member_access() {
    let exp = parse_expression("p->next");
    let Expr::MemberAccess(m) = exp else { panic!() };
    assert_eq!(m.op.kind, TokenKind::Arrow);
    assert_eq!(m.member.lexeme, "next");
}

#[test]
fn test_call_arguments() {
    let exp = parse_expression("f(1, a + 2, g())");
    let Expr::Call(c) = exp else { panic!() };
    assert_eq!(c.args.len(), 3);
    assert!(matches!(c.args[2], Expr::Call(_)));
}

#[test]
fn test_declaration_disambiguation() {
    let program = parse_ok("int x; int f(); int g(int a) { return a; }");
    assert_eq!(program.declarations.len(), 3);
    assert!(matches!(program.declarations[0], Declaration::Var(_)));
    let Declaration::Fun(f) = &program.declarations[1] else {
        panic!()
    };
    assert!(f.body.is_none());
    let Declaration::Fun(g) = &program.declarations[2] else {
        panic!()
    };
    assert!(g.body.is_some());
    assert_eq!(g.params.len(), 1);
}

#[test]
fn test_pointer_declaration() {
    let program = parse_ok("const int** p;");
    let Declaration::Var(v) = &program.declarations[0] else {
        panic!()
    };
    assert!(v.ty.is_const);
    assert_eq!(v.ty.pointer_level, 2);
    assert_eq!(v.ty.name.kind, TokenKind::KwInt);
}

#[test]
fn test_void_parameter_list_is_empty() {
    let program = parse_ok("int f(void);");
    let Declaration::Fun(f) = &program.declarations[0] else {
        panic!()
    };
    assert!(f.params.is_empty());
}

#[test]
fn test_unnamed_parameters() {
    let program = parse_ok("int f(int, char*);");
    let Declaration::Fun(f) = &program.declarations[0] else {
        panic!()
    };
    assert_eq!(f.params.len(), 2);
    assert!(f.params.iter().all(|p| p.name.is_none()));
}

#[test]
fn test_for_statement_forms() {
    let program = parse_ok(
        "int f() { for (int i = 0; i < 3; i = i + 1) g(); for (;;) break; }",
    );
    let Declaration::Fun(f) = &program.declarations[0] else {
        panic!()
    };
    let body = f.body.as_ref().unwrap();

    let Stmt::For(full) = &body[0] else { panic!() };
    assert!(matches!(full.init.as_deref(), Some(Stmt::VarDec(_))));
    assert!(full.condition.is_some());
    assert!(full.increment.is_some());

    let Stmt::For(bare) = &body[1] else { panic!() };
    assert!(bare.init.is_none());
    assert!(bare.condition.is_none());
    assert!(bare.increment.is_none());
    assert!(matches!(bare.body.as_ref(), Stmt::Break(_)));
}

#[test]
fn test_dangling_else_binds_to_nearest_if() {
    let program = parse_ok("int f() { if (a) if (b) x = 1; else x = 2; }");
    let Declaration::Fun(f) = &program.declarations[0] else {
        panic!()
    };
    let Stmt::If(outer) = &f.body.as_ref().unwrap()[0] else {
        panic!()
    };
    assert!(outer.els.is_none());
    let Stmt::If(inner) = outer.then.as_ref() else {
        panic!()
    };
    assert!(inner.els.is_some());
}

#[test]
fn test_do_while() {
    let program = parse_ok("int f() { do x = x - 1; while (x); }");
    let Declaration::Fun(f) = &program.declarations[0] else {
        panic!()
    };
    assert!(matches!(f.body.as_ref().unwrap()[0], Stmt::DoWhile(_)));
}

#[test]
fn test_missing_semicolon_reports_expected_kind() {
    let mut diag = Diagnostics::new("test.c");
    let tokens = lexer::lex("int f() { return 0 }", &mut diag);
    let _ = parse(&tokens, &mut diag);
    assert!(diag.has_errors());
    assert!(diag.entries()[0].message.contains("';'"));
}

#[test]
fn test_synchronize_recovers_inside_block() {
    let mut diag = Diagnostics::new("test.c");
    let tokens = lexer::lex(
        "int f() { int a = ; a = 1; } int g() { return 0; }",
        &mut diag,
    );
    let program = parse(&tokens, &mut diag);
    assert!(diag.has_errors());
    // both declarations survive; the broken statement is the only loss
    assert_eq!(program.declarations.len(), 2);
    let Declaration::Fun(f) = &program.declarations[0] else {
        panic!()
    };
    assert_eq!(f.body.as_ref().unwrap().len(), 1);
}

#[test]
fn test_synchronize_recovers_at_top_level() {
    let mut diag = Diagnostics::new("test.c");
    let tokens = lexer::lex("42; int ok() { return 0; }", &mut diag);
    let program = parse(&tokens, &mut diag);
    assert!(diag.has_errors());
    assert_eq!(program.declarations.len(), 1);
}

#[test]
fn test_parser_never_panics_on_garbage() {
    for input in ["", ";;;", "int", "int f(", "((((", "} } }", "int f() {"] {
        let mut diag = Diagnostics::new("test.c");
        let tokens = lexer::lex(input, &mut diag);
        let _ = parse(&tokens, &mut diag);
        if !input.is_empty() {
            assert!(diag.has_errors(), "expected errors for {input:?}");
        }
    }
}
