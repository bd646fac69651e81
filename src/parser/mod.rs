//! Recursive-descent parser with precedence climbing.
//!
//! Statements and declarations are parsed top-down; expressions climb the
//! operator table in [`binding_power`]. On a syntax error the enclosing
//! declaration or block loop records a diagnostic and [`synchronize`]s to the
//! next `;` or statement/declaration start, then resumes.

mod cursor;
mod parse_error;
#[cfg(test)]
mod parser_tests;

use crate::ast::*;
use crate::diag::Diagnostics;
use crate::lexer::{Token, TokenKind};
use cursor::Cursor;
pub use parse_error::{InnerParseError, ParseError, Result};

/// Left binding power of an infix operator, 0 for tokens that cannot
/// continue an expression. Assignment and `?:` re-enter at the same power
/// (right-associative); everything else re-enters one higher.
#[allow(clippy::match_same_arms)]
fn binding_power(kind: TokenKind) -> u64 {
    match kind {
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 50,
        TokenKind::Plus | TokenKind::Minus => 45,
        TokenKind::Shl | TokenKind::Shr => 40,
        TokenKind::Less
        | TokenKind::LessEqual
        | TokenKind::Greater
        | TokenKind::GreaterEqual => 35,
        TokenKind::EqualEqual | TokenKind::BangEqual => 30,
        TokenKind::Amp => 25,
        TokenKind::Caret => 20,
        TokenKind::Pipe => 15,
        TokenKind::AmpAmp => 10,
        TokenKind::PipePipe => 5,
        TokenKind::Question => 3,
        TokenKind::Assign => 1,
        k if k.is_compound_assign() => 1,
        _ => 0,
    }
}

fn parse_exp_assign(cursor: &mut Cursor, prec: u64, left: Expr) -> Result<Expr> {
    let op = cursor.expect(TokenKind::Assign)?.clone();
    let right = parse_exp(cursor, prec)?;
    Ok(Expr::binary(left, op, right))
}

fn parse_exp_compassign(cursor: &mut Cursor, prec: u64, left: Expr) -> Result<Expr> {
    let op = cursor.bump().clone();
    let value = parse_exp(cursor, prec)?;
    Ok(Expr::compound_assign(left, op, value))
}

fn parse_exp_conditional(cursor: &mut Cursor, prec: u64, left: Expr) -> Result<Expr> {
    cursor.expect(TokenKind::Question)?;
    let then = parse_exp(cursor, 0)?;
    cursor.expect(TokenKind::Colon)?;
    let els = parse_exp(cursor, prec)?;
    Ok(Expr::conditional(left, then, els))
}

fn parse_exp_binary(cursor: &mut Cursor, prec: u64, left: Expr) -> Result<Expr> {
    let op = cursor.bump().clone();
    let right = parse_exp(cursor, prec + 1)?;
    Ok(Expr::binary(left, op, right))
}

fn parse_exp(cursor: &mut Cursor, min_prec: u64) -> Result<Expr> {
    let mut left = parse_factor(cursor)?;

    loop {
        let kind = cursor.peek().kind;
        let prec = binding_power(kind);
        if prec == 0 || prec < min_prec {
            break;
        }
        left = match kind {
            TokenKind::Assign => parse_exp_assign(cursor, prec, left)?,
            TokenKind::Question => parse_exp_conditional(cursor, prec, left)?,
            k if k.is_compound_assign() => parse_exp_compassign(cursor, prec, left)?,
            _ => parse_exp_binary(cursor, prec, left)?,
        };
    }

    Ok(left)
}

fn parse_unary_operation(cursor: &mut Cursor) -> Result<Expr> {
    let op = cursor.bump().clone();
    let operand = parse_factor(cursor)?;
    Ok(Expr::unary(op, operand, true))
}

fn parse_arguments(cursor: &mut Cursor) -> Result<Vec<Expr>> {
    let mut args = Vec::new();

    if !cursor.check(TokenKind::CloseParen) {
        loop {
            args.push(parse_exp(cursor, 0)?);
            if !cursor.bump_if(TokenKind::Comma) {
                break;
            }
        }
    }

    Ok(args)
}

/// Postfix chain: subscripts, calls, member access and `++`/`--`, applied
/// left to right on whatever primary came before.
fn parse_postfix(cursor: &mut Cursor, mut exp: Expr) -> Result<Expr> {
    loop {
        match cursor.peek().kind {
            TokenKind::OpenBracket => {
                cursor.bump();
                let index = parse_exp(cursor, 0)?;
                cursor.expect(TokenKind::CloseBracket)?;
                exp = Expr::array_access(exp, index);
            }
            TokenKind::OpenParen => {
                cursor.bump();
                let args = parse_arguments(cursor)?;
                cursor.expect(TokenKind::CloseParen)?;
                exp = Expr::call(exp, args);
            }
            TokenKind::Dot | TokenKind::Arrow => {
                let op = cursor.bump().clone();
                let member = cursor.expect_identifier()?.clone();
                exp = Expr::member_access(exp, op, member);
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = cursor.bump().clone();
                exp = Expr::unary(op, exp, false);
            }
            _ => return Ok(exp),
        }
    }
}

fn parse_factor(cursor: &mut Cursor) -> Result<Expr> {
    let peek = cursor.peek();
    let exp = match peek.kind {
        k if k.is_prefix_op() => return parse_unary_operation(cursor),
        TokenKind::IntLiteral
        | TokenKind::FloatLiteral
        | TokenKind::CharLiteral
        | TokenKind::StrLiteral => Expr::Literal(cursor.bump().clone()),
        TokenKind::Identifier => Expr::Variable(cursor.bump().clone()),
        TokenKind::OpenParen => {
            cursor.bump();
            let exp = parse_exp(cursor, 0)?;
            cursor.expect(TokenKind::CloseParen)?;
            exp
        }
        _ => {
            return Err(InnerParseError::ExpectedExpression {
                got: peek.to_string(),
            }
            .at(peek))
        }
    };

    parse_postfix(cursor, exp)
}

/// Type specifier: any run of qualifiers, exactly one base type keyword,
/// then any run of `*`.
fn parse_type(cursor: &mut Cursor) -> Result<TypeNode> {
    let mut is_const = false;
    let mut is_volatile = false;
    loop {
        if cursor.bump_if(TokenKind::KwConst) {
            is_const = true;
        } else if cursor.bump_if(TokenKind::KwVolatile) {
            is_volatile = true;
        } else {
            break;
        }
    }

    let peek = cursor.peek();
    if !peek.kind.is_type_specifier() {
        return Err(InnerParseError::ExpectedTypeSpecifier {
            got: peek.to_string(),
        }
        .at(peek));
    }
    let name = cursor.bump().clone();

    let mut pointer_level = 0;
    while cursor.bump_if(TokenKind::Star) {
        pointer_level += 1;
    }

    Ok(TypeNode {
        name,
        is_const,
        is_volatile,
        pointer_level,
    })
}

fn parse_params(cursor: &mut Cursor) -> Result<Vec<Param>> {
    let mut params = Vec::new();

    // `(void)` is an empty parameter list, not a void-typed parameter
    if cursor.check(TokenKind::KwVoid) && cursor.peek_nth(1).kind == TokenKind::CloseParen {
        cursor.bump();
        return Ok(params);
    }

    if !cursor.check(TokenKind::CloseParen) {
        loop {
            let ty = parse_type(cursor)?;
            let name = cursor
                .check(TokenKind::Identifier)
                .then(|| cursor.bump().clone());
            params.push(Param { ty, name });
            if !cursor.bump_if(TokenKind::Comma) {
                break;
            }
        }
    }

    Ok(params)
}

fn parse_function(cursor: &mut Cursor, diag: &mut Diagnostics) -> Result<FunDec> {
    let return_type = parse_type(cursor)?;
    let name = cursor.expect_identifier()?.clone();
    cursor.expect(TokenKind::OpenParen)?;
    let params = parse_params(cursor)?;
    cursor.expect(TokenKind::CloseParen)?;

    let body = if cursor.bump_if(TokenKind::Semicolon) {
        None
    } else {
        Some(parse_block(cursor, diag)?)
    };

    Ok(FunDec {
        return_type,
        name,
        params,
        body,
    })
}

fn parse_var_dec(cursor: &mut Cursor) -> Result<VarDec> {
    let ty = parse_type(cursor)?;
    let name = cursor.expect_identifier()?.clone();
    let init = cursor
        .bump_if(TokenKind::Assign)
        .then(|| parse_exp(cursor, 0))
        .transpose()?;
    cursor.expect(TokenKind::Semicolon)?;

    Ok(VarDec { ty, name, init })
}

fn parse_if(cursor: &mut Cursor, diag: &mut Diagnostics) -> Result<Stmt> {
    cursor.expect(TokenKind::KwIf)?;
    cursor.expect(TokenKind::OpenParen)?;
    let condition = parse_exp(cursor, 0)?;
    cursor.expect(TokenKind::CloseParen)?;
    let then = parse_statement(cursor, diag).map(Box::new)?;
    let els = cursor
        .bump_if(TokenKind::KwElse)
        .then(|| parse_statement(cursor, diag))
        .transpose()?
        .map(Box::new);

    Ok(Stmt::If(If {
        condition,
        then,
        els,
    }))
}

fn parse_while(cursor: &mut Cursor, diag: &mut Diagnostics) -> Result<Stmt> {
    cursor.expect(TokenKind::KwWhile)?;
    cursor.expect(TokenKind::OpenParen)?;
    let condition = parse_exp(cursor, 0)?;
    cursor.expect(TokenKind::CloseParen)?;
    let body = parse_statement(cursor, diag).map(Box::new)?;

    Ok(Stmt::While(While { condition, body }))
}

fn parse_dowhile(cursor: &mut Cursor, diag: &mut Diagnostics) -> Result<Stmt> {
    cursor.expect(TokenKind::KwDo)?;
    let body = parse_statement(cursor, diag).map(Box::new)?;
    cursor.expect(TokenKind::KwWhile)?;
    cursor.expect(TokenKind::OpenParen)?;
    let condition = parse_exp(cursor, 0)?;
    cursor.expect(TokenKind::CloseParen)?;
    cursor.expect(TokenKind::Semicolon)?;

    Ok(Stmt::DoWhile(DoWhile { body, condition }))
}

fn parse_for(cursor: &mut Cursor, diag: &mut Diagnostics) -> Result<Stmt> {
    cursor.expect(TokenKind::KwFor)?;
    cursor.expect(TokenKind::OpenParen)?;

    let init = if cursor.bump_if(TokenKind::Semicolon) {
        None
    } else if cursor.peek().kind.starts_type() {
        Some(Box::new(Stmt::VarDec(parse_var_dec(cursor)?)))
    } else {
        let exp = parse_exp(cursor, 0)?;
        cursor.expect(TokenKind::Semicolon)?;
        Some(Box::new(Stmt::Exp(exp)))
    };

    let condition = if cursor.check(TokenKind::Semicolon) {
        None
    } else {
        Some(parse_exp(cursor, 0)?)
    };
    cursor.expect(TokenKind::Semicolon)?;

    let increment = if cursor.check(TokenKind::CloseParen) {
        None
    } else {
        Some(parse_exp(cursor, 0)?)
    };
    cursor.expect(TokenKind::CloseParen)?;

    let body = parse_statement(cursor, diag).map(Box::new)?;

    Ok(Stmt::For(For {
        init,
        condition,
        increment,
        body,
    }))
}

fn parse_return(cursor: &mut Cursor) -> Result<Stmt> {
    let keyword = cursor.expect(TokenKind::KwReturn)?.clone();
    let value = if cursor.check(TokenKind::Semicolon) {
        None
    } else {
        Some(parse_exp(cursor, 0)?)
    };
    cursor.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Return(Return { keyword, value }))
}

fn parse_statement(cursor: &mut Cursor, diag: &mut Diagnostics) -> Result<Stmt> {
    match cursor.peek().kind {
        TokenKind::OpenBrace => parse_block(cursor, diag).map(Stmt::Block),
        TokenKind::KwIf => parse_if(cursor, diag),
        TokenKind::KwWhile => parse_while(cursor, diag),
        TokenKind::KwDo => parse_dowhile(cursor, diag),
        TokenKind::KwFor => parse_for(cursor, diag),
        TokenKind::KwReturn => parse_return(cursor),
        TokenKind::KwBreak => {
            let keyword = cursor.bump().clone();
            cursor.expect(TokenKind::Semicolon)?;
            Ok(Stmt::Break(keyword))
        }
        TokenKind::KwContinue => {
            let keyword = cursor.bump().clone();
            cursor.expect(TokenKind::Semicolon)?;
            Ok(Stmt::Continue(keyword))
        }
        k if k.starts_type() => parse_var_dec(cursor).map(Stmt::VarDec),
        _ => {
            let exp = parse_exp(cursor, 0)?;
            cursor.expect(TokenKind::Semicolon)?;
            Ok(Stmt::Exp(exp))
        }
    }
}

fn parse_block(cursor: &mut Cursor, diag: &mut Diagnostics) -> Result<Vec<Stmt>> {
    cursor.expect(TokenKind::OpenBrace)?;

    let mut statements = Vec::new();
    while !cursor.check(TokenKind::CloseBrace) && !cursor.at_end() {
        match parse_statement(cursor, diag) {
            Ok(stmt) => statements.push(stmt),
            Err(err) => {
                report(diag, &err);
                synchronize(cursor);
            }
        }
    }

    cursor.expect(TokenKind::CloseBrace)?;
    Ok(statements)
}

/// A declaration is a function when the type specifier is followed by
/// `identifier (`. The type is parsed once for the lookahead, the cursor
/// rewound, and the winning production parses it again.
fn parse_declaration(cursor: &mut Cursor, diag: &mut Diagnostics) -> Result<Declaration> {
    let peek = cursor.peek();
    if !peek.kind.starts_type() {
        return Err(InnerParseError::UnsupportedDeclaration {
            got: peek.to_string(),
        }
        .at(peek));
    }

    let start = cursor.pos();
    let _ = parse_type(cursor)?;
    let is_function =
        cursor.check(TokenKind::Identifier) && cursor.peek_nth(1).kind == TokenKind::OpenParen;
    cursor.rewind(start);

    if is_function {
        parse_function(cursor, diag).map(Declaration::Fun)
    } else {
        parse_var_dec(cursor).map(Declaration::Var)
    }
}

fn report(diag: &mut Diagnostics, err: &ParseError) {
    diag.error(err.line, err.column, err.to_string());
}

/// Discard tokens until a `;` has been consumed or the next token can begin
/// a statement or declaration. Always consumes at least one token so the
/// enclosing loop makes progress.
fn synchronize(cursor: &mut Cursor) {
    if cursor.bump().kind == TokenKind::Semicolon {
        return;
    }

    while !cursor.at_end() {
        match cursor.peek().kind {
            TokenKind::Semicolon => {
                cursor.bump();
                return;
            }
            TokenKind::KwIf
            | TokenKind::KwWhile
            | TokenKind::KwFor
            | TokenKind::KwDo
            | TokenKind::KwReturn
            | TokenKind::KwBreak
            | TokenKind::KwContinue => return,
            k if k.starts_type() => return,
            _ => {
                cursor.bump();
            }
        }
    }
}

/// Parse a whole translation unit. Syntax errors are reported through the
/// sink; the returned program holds every declaration that survived
/// recovery, so callers must gate on [`Diagnostics::has_errors`].
pub fn parse(tokens: &[Token], diag: &mut Diagnostics) -> Program {
    let mut cursor = Cursor::new(tokens);
    let mut declarations = Vec::new();

    while !cursor.at_end() {
        match parse_declaration(&mut cursor, diag) {
            Ok(dec) => declarations.push(dec),
            Err(err) => {
                report(diag, &err);
                synchronize(&mut cursor);
            }
        }
    }

    Program { declarations }
}
