use super::*;
use crate::lexer;
use crate::parser;

fn analyze_source(input: &str) -> Diagnostics {
    let mut diag = Diagnostics::new("test.c");
    let tokens = lexer::lex(input, &mut diag);
    let program = parser::parse(&tokens, &mut diag);
    assert!(!diag.has_errors(), "input must parse: {:?}", diag.entries());
    analyze(&program, &mut diag);
    diag
}

fn assert_clean(input: &str) {
    let diag = analyze_source(input);
    assert!(!diag.has_errors(), "unexpected errors: {:?}", diag.entries());
}

fn first_error(diag: &Diagnostics) -> &crate::diag::Diagnostic {
    diag.entries()
        .iter()
        .find(|e| e.level == crate::diag::Level::Error)
        .expect("expected at least one error")
}

#[test]
fn test_well_typed_program() {
    assert_clean(
        "int add(int a, int b) { return a + b; }\n\
         int main() { int x = add(1, 2); return x; }",
    );
}

#[test]
fn test_undefined_variable() {
    let diag = analyze_source("int main() { return x; }");
    assert_eq!(diag.error_count(), 1);
    let err = first_error(&diag);
    assert_eq!(err.message, "Undefined variable 'x'");
    assert_eq!(err.line, 1);
}

#[test]
fn test_redeclaration_in_same_scope() {
    let diag = analyze_source("int main() { int a; int a; return 0; }");
    assert!(diag.has_errors());
    assert!(first_error(&diag)
        .message
        .contains("'a' already declared in this scope"));
}

#[test]
fn test_shadowing_is_allowed() {
    assert_clean("int main() { int a = 1; { int a = 2; a = 3; } return a; }");
}

#[test]
fn test_inner_binding_wins() {
    // the inner `char` binding must be the one the assignment checks against
    let diag = analyze_source("int main() { int* a; { char a; a = 'x'; } return 0; }");
    assert!(!diag.has_errors());
}

#[test]
fn test_pointer_init_from_float_rejected() {
    let diag = analyze_source("int main() { int* p = 3.14; return 0; }");
    assert!(diag.has_errors());
    let err = first_error(&diag);
    assert!(err.message.contains("Cannot initialize variable of type 'int*'"));
    assert!(err.message.contains("'float'"));
}

#[test]
fn test_no_null_pointer_constant_carveout() {
    // strict rejection: integer constants never convert to pointers
    let diag = analyze_source("int main() { int* p = 0; return 0; }");
    assert!(diag.has_errors());
}

#[test]
fn test_widening_initializers_accepted() {
    assert_clean("int main() { double d = 1; int i = 'c'; double e = 1.5f; return 0; }");
}

#[test]
fn test_narrowing_initializer_rejected() {
    let diag = analyze_source("int main() { int i = 2.5; return 0; }");
    assert!(diag.has_errors());
}

#[test]
fn test_binary_op_result_types() {
    // each expression statement must type-check under the operator table
    assert_clean(
        "int main() {\n\
           int i = 1; double d = 2.0; float f = 3.0f; char c = 'a';\n\
           double r1 = i + d;\n\
           float r2 = f * i;\n\
           int r3 = i % c;\n\
           int r4 = i < d;\n\
           int r5 = i & c;\n\
           int r6 = d && i;\n\
           return 0;\n\
         }",
    );
}

#[test]
fn test_modulo_requires_integers() {
    let diag = analyze_source("int main() { double d = 1.0; int x = 2 % d; return 0; }");
    assert!(diag.has_errors());
    assert!(first_error(&diag).message.contains("binary %"));
}

#[test]
fn test_bitwise_requires_integers() {
    let diag = analyze_source("int main() { int x = 1 & 2.0; return 0; }");
    assert!(diag.has_errors());
    assert!(first_error(&diag)
        .message
        .contains("Bitwise operators require integer operands"));
}

#[test]
fn test_pointer_arithmetic() {
    assert_clean(
        "int main(int argc, char** argv) {\n\
           char** p = argv + 1;\n\
           int d = p - argv;\n\
           return d;\n\
         }",
    );
}

#[test]
fn test_dereference_non_pointer() {
    let diag = analyze_source("int main() { int a = 1; return *a; }");
    assert!(diag.has_errors());
    assert!(first_error(&diag)
        .message
        .contains("Cannot dereference non-pointer type"));
}

#[test]
fn test_address_of_and_deref_round_trip() {
    assert_clean("int main() { int a = 1; int* p = &a; return *p; }");
}

#[test]
fn test_call_arity_mismatch() {
    let diag = analyze_source("int add(int a, int b); int main() { return add(1); }");
    assert!(diag.has_errors());
    assert!(first_error(&diag)
        .message
        .contains("expected 2, got 1"));
}

#[test]
fn test_call_argument_type_mismatch() {
    let diag = analyze_source("int take(int* p); int main() { return take(1.5); }");
    assert!(diag.has_errors());
    assert!(first_error(&diag)
        .message
        .contains("Argument type mismatch"));
}

#[test]
fn test_calling_a_variable() {
    let diag = analyze_source("int main() { int f = 1; return f(); }");
    assert!(diag.has_errors());
    assert!(first_error(&diag)
        .message
        .contains("Called object is not a function"));
}

#[test]
fn test_missing_return_in_non_void_function() {
    let diag = analyze_source("int f() { int a = 1; }");
    assert!(diag.has_errors());
    assert!(first_error(&diag)
        .message
        .contains("Function 'f' may not return a value"));
}

#[test]
fn test_void_function_needs_no_return() {
    assert_clean("void f() { int a = 1; } int main() { return 0; }");
}

#[test]
fn test_return_without_value_in_non_void() {
    let diag = analyze_source("int f() { return; }");
    assert!(diag.has_errors());
    assert!(first_error(&diag)
        .message
        .contains("Non-void function should return a value"));
}

#[test]
fn test_return_type_mismatch() {
    let diag = analyze_source("int* f() { return 2.5; }");
    assert!(diag.has_errors());
    assert!(first_error(&diag).message.contains("Cannot return value"));
}

#[test]
fn test_break_outside_loop() {
    let diag = analyze_source("int main() { break; return 0; }");
    assert!(diag.has_errors());
    assert_eq!(
        first_error(&diag).message,
        "break statement outside of loop"
    );
}

#[test]
fn test_continue_outside_loop() {
    let diag = analyze_source("int main() { continue; return 0; }");
    assert!(diag.has_errors());
    assert_eq!(
        first_error(&diag).message,
        "continue statement outside of loop"
    );
}

#[test]
fn test_break_inside_nested_loop_ok() {
    assert_clean(
        "int main() { while (1) { for (;;) { break; } continue; } return 0; }",
    );
}

#[test]
fn test_for_header_scope() {
    // the header declaration is visible in cond/increment/body but gone after
    let diag = analyze_source(
        "int main() { for (int i = 0; i < 3; i = i + 1) { int x = i; } return i; }",
    );
    assert!(diag.has_errors());
    assert!(first_error(&diag).message.contains("Undefined variable 'i'"));
}

#[test]
fn test_condition_must_be_scalar() {
    let diag = analyze_source("void v(); int main() { if (v()) return 1; return 0; }");
    assert!(diag.has_errors());
    assert!(first_error(&diag)
        .message
        .contains("If condition must be a scalar type"));
}

#[test]
fn test_conditional_expression_types() {
    assert_clean("int main() { int a = 1; double d = a ? 1 : 2.5; return 0; }");
    let diag = analyze_source("int p(int* q); int main() { int* r; int x = 1 ? r : 2.5; return 0; }");
    assert!(diag.has_errors());
}

#[test]
fn test_string_literal_types_as_char_array() {
    // char* s = "hi" decays; int s = "hi" does not
    assert_clean("int main() { char* s = \"hi\"; return 0; }");
    let diag = analyze_source("int main() { int s = \"hi\"; return 0; }");
    assert!(diag.has_errors());
}

#[test]
fn test_member_access_operators() {
    let diag = analyze_source("int main() { int a = 1; return a.field; }");
    assert!(diag.has_errors());
    assert!(first_error(&diag)
        .message
        .contains("Left operand of '.' must be a struct"));

    let diag = analyze_source("int main() { int* p; return p->field; }");
    assert!(diag.has_errors());
    assert!(first_error(&diag)
        .message
        .contains("Left operand of '->' must be a pointer to a struct"));
}

#[test]
fn test_subscript_checks() {
    assert_clean("int sum(int* xs) { return xs[0] + xs[1]; }");

    let diag = analyze_source("int main() { int a = 1; return a[0]; }");
    assert!(diag.has_errors());
    assert!(first_error(&diag)
        .message
        .contains("Subscripted value is not an array or pointer"));

    let diag = analyze_source("int f(int* xs) { return xs[1.5]; }");
    assert!(diag.has_errors());
    assert!(first_error(&diag)
        .message
        .contains("Array index must be an integer"));
}

#[test]
fn test_compound_assign_types() {
    assert_clean("int main() { int a = 1; a += 2; a <<= 1; a %= 3; return a; }");

    let diag = analyze_source("int main() { int a = 1; a %= 2.5; return a; }");
    assert!(diag.has_errors());
}

#[test]
fn test_function_redeclaration_rejected() {
    let diag = analyze_source("int f(); int f();");
    assert!(diag.has_errors());
    assert!(first_error(&diag)
        .message
        .contains("Function 'f' already declared in this scope"));
}

#[test]
fn test_unknown_base_type() {
    let diag = analyze_source("int main() { long x = 1; return 0; }");
    assert!(diag.has_errors());
    assert!(first_error(&diag).message.contains("Unknown type: long"));
}

#[test]
fn test_symbol_table_empty_after_analysis() {
    let mut diag = Diagnostics::new("test.c");
    let tokens = lexer::lex("int f(int a) { int b = a; return b; }", &mut diag);
    let program = parser::parse(&tokens, &mut diag);
    let mut analyzer = Analyzer::new(&mut diag);
    analyzer.visit_program(&program);
    // only the global frame remains, holding just the function
    assert_eq!(analyzer.table.current_level(), 0);
    assert!(analyzer.table.lookup("f").is_some());
    assert!(analyzer.table.lookup("a").is_none());
    assert!(analyzer.table.lookup("b").is_none());
}
