//! Type and scope checking.
//!
//! Walks the tree without mutating it, keeping a scoped symbol table and a
//! per-function return context. Every check reports through the diagnostics
//! sink and the walk continues, so one bad declaration does not hide later
//! ones.

#[cfg(test)]
mod semantic_tests;
mod symbol_table;
pub mod types;

use crate::ast::*;
use crate::diag::Diagnostics;
use crate::lexer::{Token, TokenKind};
pub use symbol_table::{Symbol, SymbolKind, SymbolTable};
use types::{common_type, compatible, TypeInfo, TypeKind};

/// Validate a whole program. Results are diagnostics only; the tree itself is
/// left untouched.
pub fn analyze(program: &Program, diag: &mut Diagnostics) {
    let mut analyzer = Analyzer::new(diag);
    analyzer.visit_program(program);
}

struct Analyzer<'d> {
    table: SymbolTable,
    diag: &'d mut Diagnostics,
    current_return: Option<TypeInfo>,
    has_return: bool,
    loop_depth: u32,
}

impl<'d> Analyzer<'d> {
    fn new(diag: &'d mut Diagnostics) -> Self {
        Self {
            table: SymbolTable::new(),
            diag,
            current_return: None,
            has_return: false,
            loop_depth: 0,
        }
    }

    fn error_at(&mut self, token: &Token, message: impl Into<String>) {
        self.diag.error(token.line, token.column, message.into());
    }

    fn visit_program(&mut self, program: &Program) {
        for declaration in &program.declarations {
            match declaration {
                Declaration::Fun(fun) => self.visit_fun_dec(fun),
                Declaration::Var(var) => self.visit_var_dec(var),
            }
        }
    }

    /// Surface type to semantic type. Base types outside the core set are
    /// errors and poison the declaration's type.
    fn type_from_node(&mut self, node: &TypeNode) -> TypeInfo {
        let kind = match node.name.kind {
            TokenKind::KwVoid => TypeKind::Void,
            TokenKind::KwChar => TypeKind::Char,
            TokenKind::KwInt => TypeKind::Int,
            TokenKind::KwFloat => TypeKind::Float,
            TokenKind::KwDouble => TypeKind::Double,
            _ => {
                self.error_at(
                    &node.name,
                    format!("Unknown type: {}", node.name.lexeme),
                );
                TypeKind::Error
            }
        };

        let mut result = TypeInfo::qualified(kind, node.is_const, node.is_volatile);
        for _ in 0..node.pointer_level {
            result = TypeInfo::pointer(result);
        }
        result
    }

    fn visit_fun_dec(&mut self, fun: &FunDec) {
        let return_type = self.type_from_node(&fun.return_type);
        let param_types: Vec<TypeInfo> = fun
            .params
            .iter()
            .map(|p| self.type_from_node(&p.ty))
            .collect();
        let fun_type = TypeInfo::function(return_type.clone(), param_types);

        let name = &fun.name.lexeme;
        if self.table.exists_in_current_scope(name) {
            self.error_at(
                &fun.name,
                format!("Function '{name}' already declared in this scope"),
            );
            return;
        }
        self.table.add_function(name, fun_type);

        let Some(body) = &fun.body else { return };

        self.table.enter_scope();
        self.current_return = Some(return_type.clone());
        self.has_return = return_type.is_void();

        for param in &fun.params {
            self.visit_param(param);
        }
        self.visit_block(body);

        if !self.has_return && !return_type.is_void() {
            self.error_at(
                &fun.name,
                format!("Function '{name}' may not return a value"),
            );
        }

        self.current_return = None;
        self.table.leave_scope();
    }

    fn visit_param(&mut self, param: &Param) {
        let ty = self.type_from_node(&param.ty);
        let Some(name) = &param.name else { return };

        if self.table.exists_in_current_scope(&name.lexeme) {
            self.error_at(
                name,
                format!("Parameter '{}' already declared", name.lexeme),
            );
            return;
        }
        self.table.add_parameter(&name.lexeme, ty);
    }

    fn visit_var_dec(&mut self, var: &VarDec) {
        let ty = self.type_from_node(&var.ty);

        let name = &var.name.lexeme;
        if self.table.exists_in_current_scope(name) {
            self.error_at(
                &var.name,
                format!("Variable '{name}' already declared in this scope"),
            );
            return;
        }

        if let Some(init) = &var.init {
            let init_type = self.visit_expr(init);
            if !compatible(&init_type, &ty) {
                self.error_at(
                    &var.name,
                    format!(
                        "Cannot initialize variable of type '{ty}' with expression of type '{init_type}'"
                    ),
                );
            }
        }

        self.table.add_variable(name, ty);
    }

    fn visit_block(&mut self, statements: &[Stmt]) {
        self.table.enter_scope();
        for statement in statements {
            self.visit_statement(statement);
        }
        self.table.leave_scope();
    }

    /// Bodies of `if`/loops that are not blocks still get an implicit scope,
    /// so a declaration there cannot leak into the surrounding one.
    fn visit_scoped_statement(&mut self, statement: &Stmt) {
        if let Stmt::Block(items) = statement {
            self.visit_block(items);
        } else {
            self.table.enter_scope();
            self.visit_statement(statement);
            self.table.leave_scope();
        }
    }

    fn visit_loop_body(&mut self, body: &Stmt) {
        self.loop_depth += 1;
        self.visit_scoped_statement(body);
        self.loop_depth -= 1;
    }

    fn check_scalar_condition(&mut self, condition: &Expr, what: &str) {
        let cond_type = self.visit_expr(condition);
        if !cond_type.is_scalar() && !cond_type.is_error() {
            let position = condition.position().clone();
            self.error_at(&position, format!("{what} condition must be a scalar type"));
        }
    }

    fn visit_statement(&mut self, statement: &Stmt) {
        match statement {
            Stmt::Exp(exp) => {
                self.visit_expr(exp);
            }
            Stmt::Block(items) => self.visit_block(items),
            Stmt::VarDec(var) => self.visit_var_dec(var),
            Stmt::If(if_st) => {
                self.check_scalar_condition(&if_st.condition, "If");
                self.visit_scoped_statement(&if_st.then);
                if let Some(els) = &if_st.els {
                    self.visit_scoped_statement(els);
                }
            }
            Stmt::While(while_st) => {
                self.check_scalar_condition(&while_st.condition, "While");
                self.visit_loop_body(&while_st.body);
            }
            Stmt::DoWhile(dowhile) => {
                self.visit_loop_body(&dowhile.body);
                self.check_scalar_condition(&dowhile.condition, "Do-while");
            }
            Stmt::For(for_st) => {
                self.table.enter_scope();
                if let Some(init) = &for_st.init {
                    self.visit_statement(init);
                }
                if let Some(condition) = &for_st.condition {
                    self.check_scalar_condition(condition, "For");
                }
                if let Some(increment) = &for_st.increment {
                    self.visit_expr(increment);
                }
                self.visit_loop_body(&for_st.body);
                self.table.leave_scope();
            }
            Stmt::Return(ret) => self.visit_return(ret),
            Stmt::Break(token) => {
                if self.loop_depth == 0 {
                    self.error_at(token, "break statement outside of loop");
                }
            }
            Stmt::Continue(token) => {
                if self.loop_depth == 0 {
                    self.error_at(token, "continue statement outside of loop");
                }
            }
        }
    }

    fn visit_return(&mut self, ret: &Return) {
        let Some(expected) = self.current_return.clone() else {
            self.error_at(&ret.keyword, "Return statement outside of function");
            return;
        };

        self.has_return = true;

        if let Some(value) = &ret.value {
            let value_type = self.visit_expr(value);
            if !compatible(&value_type, &expected) {
                self.error_at(
                    &ret.keyword,
                    format!(
                        "Cannot return value of type '{value_type}' from function returning '{expected}'"
                    ),
                );
            }
        } else if !expected.is_void() {
            self.error_at(&ret.keyword, "Non-void function should return a value");
        }
    }

    fn visit_expr(&mut self, exp: &Expr) -> TypeInfo {
        match exp {
            Expr::Literal(token) => self.visit_literal(token),
            Expr::Variable(token) => self.visit_variable(token),
            Expr::Unary(unary) => self.visit_unary(unary),
            Expr::Binary(binary) => self.visit_binary(binary),
            Expr::CompoundAssign(compound) => self.visit_compound_assign(compound),
            Expr::Call(call) => self.visit_call(call),
            Expr::ArrayAccess(access) => self.visit_array_access(access),
            Expr::MemberAccess(access) => self.visit_member_access(access),
            Expr::Conditional(conditional) => self.visit_conditional(conditional),
        }
    }

    fn visit_literal(&mut self, token: &Token) -> TypeInfo {
        match token.kind {
            TokenKind::IntLiteral => TypeInfo::int(),
            TokenKind::FloatLiteral => TypeInfo::float(),
            TokenKind::CharLiteral => TypeInfo::char_type(),
            // quotes excluded, terminating null included
            TokenKind::StrLiteral => {
                TypeInfo::array(TypeInfo::char_type(), token.lexeme.len() - 2 + 1)
            }
            _ => {
                self.error_at(token, "Unknown literal type");
                TypeInfo::error()
            }
        }
    }

    fn visit_variable(&mut self, token: &Token) -> TypeInfo {
        match self.table.lookup(&token.lexeme) {
            Some(symbol) => symbol.ty.clone(),
            None => {
                let message = format!("Undefined variable '{}'", token.lexeme);
                self.error_at(token, message);
                TypeInfo::error()
            }
        }
    }

    fn visit_unary(&mut self, unary: &UnaryExp) -> TypeInfo {
        let operand = self.visit_expr(&unary.operand);
        let op = &unary.op;
        if operand.is_error() {
            return operand;
        }

        match op.kind {
            TokenKind::Minus | TokenKind::Plus => {
                if !operand.is_numeric() {
                    let message =
                        format!("Unary operator {} requires numeric operand", op.lexeme);
                    self.error_at(op, message);
                    return TypeInfo::error();
                }
                operand
            }
            TokenKind::Bang => {
                if !operand.is_scalar() {
                    self.error_at(op, "Unary operator ! requires scalar operand");
                    return TypeInfo::error();
                }
                TypeInfo::int()
            }
            TokenKind::Tilde => {
                if !operand.is_integer() {
                    self.error_at(op, "Unary operator ~ requires integer operand");
                    return TypeInfo::error();
                }
                operand
            }
            TokenKind::Star => match operand.kind {
                TypeKind::Pointer(pointee) => *pointee,
                _ => {
                    self.error_at(op, "Cannot dereference non-pointer type");
                    TypeInfo::error()
                }
            },
            TokenKind::Amp => TypeInfo::pointer(operand),
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                if !operand.is_numeric() && !operand.is_pointer() {
                    let message = format!(
                        "Unary operator {} requires numeric or pointer operand",
                        op.lexeme
                    );
                    self.error_at(op, message);
                    return TypeInfo::error();
                }
                operand
            }
            _ => {
                let message = format!("Unknown unary operator: {}", op.lexeme);
                self.error_at(op, message);
                TypeInfo::error()
            }
        }
    }

    /// Result type of `left op right` per the binary operator table. Shared
    /// by plain binary expressions and compound assignment. An already
    /// poisoned operand short-circuits without another report.
    fn binary_result(&mut self, op: &Token, left: &TypeInfo, right: &TypeInfo) -> TypeInfo {
        if left.is_error() || right.is_error() {
            return TypeInfo::error();
        }
        match op.kind {
            TokenKind::Plus => {
                if left.is_pointer() && right.is_integer() {
                    return left.clone();
                }
                if left.is_integer() && right.is_pointer() {
                    return right.clone();
                }
                if left.is_numeric() && right.is_numeric() {
                    return common_type(left, right);
                }
                self.error_at(op, "Invalid operands to binary +");
                TypeInfo::error()
            }
            TokenKind::Minus => {
                if left.is_pointer() && right.is_integer() {
                    return left.clone();
                }
                if left.is_pointer() && right.is_pointer() {
                    return TypeInfo::int();
                }
                if left.is_numeric() && right.is_numeric() {
                    return common_type(left, right);
                }
                self.error_at(op, "Invalid operands to binary -");
                TypeInfo::error()
            }
            TokenKind::Star | TokenKind::Slash => {
                if left.is_numeric() && right.is_numeric() {
                    return common_type(left, right);
                }
                let message = format!("Invalid operands to binary {}", op.lexeme);
                self.error_at(op, message);
                TypeInfo::error()
            }
            TokenKind::Percent => {
                if left.is_integer() && right.is_integer() {
                    return common_type(left, right);
                }
                self.error_at(op, "Invalid operands to binary %");
                TypeInfo::error()
            }
            TokenKind::Less
            | TokenKind::LessEqual
            | TokenKind::Greater
            | TokenKind::GreaterEqual
            | TokenKind::EqualEqual
            | TokenKind::BangEqual => {
                if !compatible(left, right) && !compatible(right, left) {
                    self.error_at(op, "Incompatible types for comparison");
                    return TypeInfo::error();
                }
                TypeInfo::int()
            }
            TokenKind::Amp
            | TokenKind::Pipe
            | TokenKind::Caret
            | TokenKind::Shl
            | TokenKind::Shr => {
                if !left.is_integer() || !right.is_integer() {
                    self.error_at(op, "Bitwise operators require integer operands");
                    return TypeInfo::error();
                }
                common_type(left, right)
            }
            TokenKind::AmpAmp | TokenKind::PipePipe => {
                if !left.is_scalar() || !right.is_scalar() {
                    self.error_at(op, "Logical operators require scalar operands");
                    return TypeInfo::error();
                }
                TypeInfo::int()
            }
            TokenKind::Assign => {
                if !compatible(right, left) {
                    self.error_at(op, "Cannot assign incompatible type");
                    return TypeInfo::error();
                }
                left.clone()
            }
            _ => {
                let message = format!("Unknown binary operator: {}", op.lexeme);
                self.error_at(op, message);
                TypeInfo::error()
            }
        }
    }

    fn visit_binary(&mut self, binary: &BinaryExp) -> TypeInfo {
        let left = self.visit_expr(&binary.left);
        let right = self.visit_expr(&binary.right);
        self.binary_result(&binary.op, &left, &right)
    }

    /// `a op= b` types like `a = a op b`, without the tree duplication.
    fn visit_compound_assign(&mut self, compound: &CompoundAssignExp) -> TypeInfo {
        let target = self.visit_expr(&compound.target);
        let value = self.visit_expr(&compound.value);

        let mut binary_op = compound.op.clone();
        binary_op.kind = compound.op.kind.compound_to_binary();
        let result = self.binary_result(&binary_op, &target, &value);

        if !compatible(&result, &target) {
            self.error_at(&compound.op, "Cannot assign incompatible type");
            return TypeInfo::error();
        }
        target
    }

    fn visit_call(&mut self, call: &CallExp) -> TypeInfo {
        let callee_type = self.visit_expr(&call.callee);
        let position = call.callee.position().clone();

        if callee_type.is_error() {
            for arg in &call.args {
                self.visit_expr(arg);
            }
            return TypeInfo::error();
        }

        let TypeKind::Function { ret, params } = callee_type.kind else {
            self.error_at(&position, "Called object is not a function");
            return TypeInfo::error();
        };

        if call.args.len() != params.len() {
            let message = format!(
                "Wrong number of arguments to function call: expected {}, got {}",
                params.len(),
                call.args.len()
            );
            self.error_at(&position, message);
            return TypeInfo::error();
        }

        for (arg, param) in call.args.iter().zip(&params) {
            let arg_type = self.visit_expr(arg);
            if !compatible(&arg_type, param) {
                let arg_position = arg.position().clone();
                self.error_at(&arg_position, "Argument type mismatch in function call");
            }
        }

        *ret
    }

    fn visit_array_access(&mut self, access: &ArrayAccessExp) -> TypeInfo {
        let array_type = self.visit_expr(&access.array);
        let index_type = self.visit_expr(&access.index);
        let position = access.array.position().clone();

        let element = match array_type.kind {
            TypeKind::Array(element, _) | TypeKind::Pointer(element) => *element,
            TypeKind::Error => return TypeInfo::error(),
            _ => {
                self.error_at(&position, "Subscripted value is not an array or pointer");
                return TypeInfo::error();
            }
        };

        if !index_type.is_integer() {
            if index_type.is_error() {
                return TypeInfo::error();
            }
            self.error_at(&position, "Array index must be an integer");
            return TypeInfo::error();
        }

        element
    }

    fn visit_member_access(&mut self, access: &MemberAccessExp) -> TypeInfo {
        let object_type = self.visit_expr(&access.object);
        let op = &access.op;
        if object_type.is_error() {
            return object_type;
        }

        if op.kind == TokenKind::Dot {
            if !matches!(object_type.kind, TypeKind::Struct) {
                self.error_at(op, "Left operand of '.' must be a struct");
                return TypeInfo::error();
            }
        } else {
            let points_at_struct = matches!(
                &object_type.kind,
                TypeKind::Pointer(pointee) if matches!(pointee.kind, TypeKind::Struct)
            );
            if !points_at_struct {
                self.error_at(op, "Left operand of '->' must be a pointer to a struct");
                return TypeInfo::error();
            }
        }

        // field tables are not recorded yet, so every member reads as int
        self.diag.warning(
            op.line,
            op.column,
            "Struct member access not fully implemented",
        );
        TypeInfo::int()
    }

    fn visit_conditional(&mut self, conditional: &ConditionalExp) -> TypeInfo {
        let cond_type = self.visit_expr(&conditional.condition);
        let position = conditional.condition.position().clone();
        if !cond_type.is_scalar() && !cond_type.is_error() {
            self.error_at(&position, "Conditional operator requires scalar condition");
            return TypeInfo::error();
        }

        let then_type = self.visit_expr(&conditional.then);
        let els_type = self.visit_expr(&conditional.els);

        if compatible(&then_type, &els_type) {
            els_type
        } else if compatible(&els_type, &then_type) {
            then_type
        } else {
            self.error_at(&position, "Incompatible types in conditional expression");
            TypeInfo::error()
        }
    }
}
