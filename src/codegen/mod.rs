//! Lowering from the validated AST to COIL instructions.
//!
//! The generator keeps a flat name-to-variable map with a scope stack for
//! unbinding, a monotonically increasing virtual-variable counter, a label
//! counter, and a stack of `(break, continue)` targets for the enclosing
//! loops. Every non-trivial expression lands in a fresh variable; a variable
//! reference yields its binding directly.


use crate::ast::*;
use crate::coil::{
    sec_flags, sym_flags, ty, CoilObject, Instruction, Opcode, Operand, Section, Symbol, CPU,
};
use crate::diag::Diagnostics;
use crate::lexer::{decode_escape, Token, TokenKind};
use std::collections::HashMap;

/// Lower a validated program into a COIL object. The optimization level is
/// accepted for the driver's sake; no transformations hang off it yet.
pub fn generate(program: &Program, _opt_level: u8, diag: &mut Diagnostics) -> CoilObject {
    let mut codegen = CodeGen::new(diag);
    codegen.generate_program(program);
    codegen.object
}

#[derive(Debug, Clone, Copy)]
struct VarBinding {
    id: u16,
    #[allow(dead_code)]
    ir_type: u16,
}

struct LoopLabels {
    break_label: String,
    continue_label: String,
}

struct CodeGen<'d> {
    object: CoilObject,
    diag: &'d mut Diagnostics,
    text_section: u16,
    data_section: u16,
    bss_section: u16,
    variables: HashMap<String, VarBinding>,
    next_var_id: u16,
    scope_stack: Vec<Vec<String>>,
    label_counter: u32,
    loop_stack: Vec<LoopLabels>,
    current_function: String,
}

impl<'d> CodeGen<'d> {
    fn new(diag: &'d mut Diagnostics) -> Self {
        let mut codegen = Self {
            object: CoilObject::new(),
            diag,
            text_section: 0,
            data_section: 0,
            bss_section: 0,
            variables: HashMap::new(),
            next_var_id: 1,
            scope_stack: Vec::new(),
            label_counter: 0,
            loop_stack: Vec::new(),
            current_function: String::new(),
        };
        codegen.initialize();
        codegen
    }

    /// Canonical section layout: `.text`, `.data`, `.bss`, each named by its
    /// own symbol, then the processor directive opening the code stream.
    fn initialize(&mut self) {
        self.text_section =
            self.add_named_section(".text", sec_flags::EXECUTABLE | sec_flags::READABLE);
        self.data_section = self.add_named_section(
            ".data",
            sec_flags::WRITABLE | sec_flags::READABLE | sec_flags::INITIALIZED,
        );
        self.bss_section = self.add_named_section(
            ".bss",
            sec_flags::WRITABLE | sec_flags::READABLE | sec_flags::UNINITIALIZED,
        );

        self.emit(Opcode::Proc, vec![Operand::Imm8(CPU)]);
    }

    fn add_named_section(&mut self, name: &str, attributes: u32) -> u16 {
        let name_index = self.object.add_symbol(Symbol {
            name: name.to_owned(),
            attributes: sym_flags::GLOBAL,
            value: 0,
            section_index: 0,
            processor_type: CPU,
        });
        self.object.add_section(Section::new(name_index, attributes, 16))
    }

    /// Find-or-create a symbol by name. The first registration wins, so a
    /// label referenced by a forward jump resolves to one index everywhere.
    fn add_symbol(&mut self, name: &str, attributes: u32, section_index: u16) -> u16 {
        if let Some(existing) = self.object.find_symbol(name) {
            return existing;
        }
        self.object.add_symbol(Symbol {
            name: name.to_owned(),
            attributes,
            value: 0,
            section_index,
            processor_type: CPU,
        })
    }

    fn emit(&mut self, opcode: Opcode, operands: Vec<Operand>) {
        self.object
            .add_instruction(self.text_section, Instruction::new(opcode, operands));
    }

    fn emit_label(&mut self, label: &str) {
        let index = self.add_symbol(label, 0, self.text_section);
        self.emit(Opcode::Sym, vec![Operand::Sym(index)]);
    }

    fn emit_jump(&mut self, label: &str) {
        let index = self.add_symbol(label, 0, 0);
        self.emit(Opcode::Br, vec![Operand::Sym(index)]);
    }

    fn emit_cmp_zero(&mut self, var_id: u16) {
        self.emit(
            Opcode::Cmp,
            vec![Operand::Var(var_id), Operand::Imm32(0)],
        );
    }

    fn emit_var(&mut self, var_id: u16, ir_type: u16, initializer: Option<u16>) {
        let mut operands = vec![Operand::Var(var_id), Operand::Imm16(ir_type)];
        if let Some(init) = initializer {
            operands.push(Operand::Var(init));
        }
        self.emit(Opcode::Var, operands);
    }

    fn fresh_var(&mut self) -> u16 {
        let id = self.next_var_id;
        self.next_var_id += 1;
        id
    }

    /// Declare a fresh temporary of the given IR type.
    fn temp_var(&mut self, ir_type: u16) -> u16 {
        let id = self.fresh_var();
        self.emit_var(id, ir_type, None);
        id
    }

    fn fresh_label(&mut self, prefix: &str) -> String {
        let n = self.label_counter;
        self.label_counter += 1;
        format!("{prefix}_{n}")
    }

    fn enter_scope(&mut self) {
        self.scope_stack.push(Vec::new());
    }

    fn leave_scope(&mut self) {
        if let Some(names) = self.scope_stack.pop() {
            for name in names {
                self.variables.remove(&name);
            }
        }
    }

    fn bind_variable(&mut self, name: &str, id: u16, ir_type: u16) {
        self.variables
            .insert(name.to_owned(), VarBinding { id, ir_type });
        if let Some(scope) = self.scope_stack.last_mut() {
            scope.push(name.to_owned());
        }
    }

    /// Surface type to IR type tag. Pointers collapse to `PTR` no matter the
    /// pointee; unknown base types warn and fall back to `INT32`.
    fn translate_type(&mut self, node: &TypeNode) -> u16 {
        if node.is_pointer() {
            return ty::PTR;
        }
        match node.name.kind {
            TokenKind::KwInt => ty::INT32,
            TokenKind::KwChar => ty::INT8,
            TokenKind::KwFloat => ty::FP32,
            TokenKind::KwDouble => ty::FP64,
            TokenKind::KwVoid => ty::VOID,
            _ => {
                self.diag.warning(
                    node.name.line,
                    node.name.column,
                    format!("Unknown type '{}', defaulting to int", node.name.lexeme),
                );
                ty::INT32
            }
        }
    }

    fn generate_program(&mut self, program: &Program) {
        for declaration in &program.declarations {
            match declaration {
                Declaration::Fun(fun) => self.generate_function(fun),
                Declaration::Var(var) => self.generate_global(var),
            }
        }
    }

    fn generate_function(&mut self, fun: &FunDec) {
        self.current_function = fun.name.lexeme.clone();

        let fun_symbol = self.add_symbol(
            &fun.name.lexeme,
            sym_flags::GLOBAL | sym_flags::FUNCTION,
            self.text_section,
        );
        self.emit(Opcode::Sym, vec![Operand::Sym(fun_symbol)]);

        if let Some(body) = &fun.body {
            self.enter_scope();

            for (slot, param) in fun.params.iter().enumerate() {
                let Some(name) = &param.name else { continue };
                let ir_type = self.translate_type(&param.ty);
                let id = self.fresh_var();
                self.bind_variable(&name.lexeme, id, ir_type);
                self.emit_var(id, ir_type, None);
                self.emit(
                    Opcode::Mov,
                    vec![
                        Operand::Var(id),
                        Operand::param_abi(),
                        Operand::Imm16(slot as u16),
                    ],
                );
            }

            self.generate_block(body);

            if self.current_function == "main" {
                self.emit(
                    Opcode::Ret,
                    vec![Operand::ret_abi(), Operand::Imm32(0)],
                );
            } else {
                self.emit(Opcode::Ret, vec![]);
            }

            self.leave_scope();
        }

        self.current_function.clear();
    }

    /// Globals live in `.data` when initialized, `.bss` otherwise; the
    /// linker lays them out, so only the symbol is recorded here.
    fn generate_global(&mut self, var: &VarDec) {
        let section = if var.init.is_some() {
            self.data_section
        } else {
            self.bss_section
        };
        self.add_symbol(
            &var.name.lexeme,
            sym_flags::GLOBAL | sym_flags::DATA,
            section,
        );
    }

    fn generate_local(&mut self, var: &VarDec) {
        let ir_type = self.translate_type(&var.ty);
        let id = self.fresh_var();
        self.bind_variable(&var.name.lexeme, id, ir_type);

        let init = var.init.as_ref().map(|init| self.generate_expr(init));
        self.emit_var(id, ir_type, init);
    }

    fn generate_block(&mut self, statements: &[Stmt]) {
        self.emit(Opcode::ScopeEnter, vec![]);
        self.enter_scope();
        for statement in statements {
            self.generate_statement(statement);
        }
        self.leave_scope();
        self.emit(Opcode::ScopeLeave, vec![]);
    }

    fn generate_statement(&mut self, statement: &Stmt) {
        match statement {
            Stmt::Block(items) => self.generate_block(items),
            Stmt::Exp(exp) => {
                // result discarded
                self.generate_expr(exp);
            }
            Stmt::VarDec(var) => self.generate_local(var),
            Stmt::If(if_st) => self.generate_if(if_st),
            Stmt::While(while_st) => self.generate_while(while_st),
            Stmt::DoWhile(dowhile) => self.generate_dowhile(dowhile),
            Stmt::For(for_st) => self.generate_for(for_st),
            Stmt::Return(ret) => self.generate_return(ret),
            Stmt::Break(token) => self.generate_break(token),
            Stmt::Continue(token) => self.generate_continue(token),
        }
    }

    fn generate_if(&mut self, if_st: &If) {
        let else_label = self.fresh_label("else");
        let end_label = self.fresh_label("endif");

        let condition = self.generate_expr(&if_st.condition);
        self.emit_cmp_zero(condition);
        self.emit_jump(&else_label);

        self.generate_statement(&if_st.then);
        self.emit_jump(&end_label);

        self.emit_label(&else_label);
        if let Some(els) = &if_st.els {
            self.generate_statement(els);
        }
        self.emit_label(&end_label);
    }

    fn generate_while(&mut self, while_st: &While) {
        let start_label = self.fresh_label("while_start");
        let end_label = self.fresh_label("while_end");

        self.emit_label(&start_label);
        let condition = self.generate_expr(&while_st.condition);
        self.emit_cmp_zero(condition);
        self.emit_jump(&end_label);

        self.loop_stack.push(LoopLabels {
            break_label: end_label.clone(),
            continue_label: start_label.clone(),
        });
        self.generate_statement(&while_st.body);
        self.loop_stack.pop();

        self.emit_jump(&start_label);
        self.emit_label(&end_label);
    }

    fn generate_dowhile(&mut self, dowhile: &DoWhile) {
        let start_label = self.fresh_label("dowhile_start");
        let condition_label = self.fresh_label("dowhile_condition");
        let end_label = self.fresh_label("dowhile_end");

        self.emit_label(&start_label);

        self.loop_stack.push(LoopLabels {
            break_label: end_label.clone(),
            continue_label: condition_label.clone(),
        });
        self.generate_statement(&dowhile.body);
        self.loop_stack.pop();

        self.emit_label(&condition_label);
        let condition = self.generate_expr(&dowhile.condition);
        self.emit_cmp_zero(condition);
        self.emit_jump(&end_label);
        self.emit_jump(&start_label);

        self.emit_label(&end_label);
    }

    fn generate_for(&mut self, for_st: &For) {
        let start_label = self.fresh_label("for_start");
        let increment_label = self.fresh_label("for_increment");
        let end_label = self.fresh_label("for_end");

        // header scope so an init declaration dies with the loop
        self.emit(Opcode::ScopeEnter, vec![]);
        self.enter_scope();

        if let Some(init) = &for_st.init {
            self.generate_statement(init);
        }

        self.emit_label(&start_label);
        if let Some(condition) = &for_st.condition {
            let condition = self.generate_expr(condition);
            self.emit_cmp_zero(condition);
            self.emit_jump(&end_label);
        }

        self.loop_stack.push(LoopLabels {
            break_label: end_label.clone(),
            continue_label: increment_label.clone(),
        });
        self.generate_statement(&for_st.body);
        self.loop_stack.pop();

        self.emit_label(&increment_label);
        if let Some(increment) = &for_st.increment {
            self.generate_expr(increment);
        }
        self.emit_jump(&start_label);
        self.emit_label(&end_label);

        self.leave_scope();
        self.emit(Opcode::ScopeLeave, vec![]);
    }

    fn generate_return(&mut self, ret: &Return) {
        match &ret.value {
            Some(value) => {
                let value = self.generate_expr(value);
                self.emit(
                    Opcode::Ret,
                    vec![Operand::ret_abi(), Operand::Var(value)],
                );
            }
            None => self.emit(Opcode::Ret, vec![Operand::ret_abi()]),
        }
    }

    fn generate_break(&mut self, token: &Token) {
        match self.loop_stack.last() {
            Some(labels) => {
                let target = labels.break_label.clone();
                self.emit_jump(&target);
            }
            None => self
                .diag
                .error(token.line, token.column, "break statement outside of loop"),
        }
    }

    fn generate_continue(&mut self, token: &Token) {
        match self.loop_stack.last() {
            Some(labels) => {
                let target = labels.continue_label.clone();
                self.emit_jump(&target);
            }
            None => self.diag.error(
                token.line,
                token.column,
                "continue statement outside of loop",
            ),
        }
    }

    fn generate_expr(&mut self, exp: &Expr) -> u16 {
        match exp {
            Expr::Literal(token) => self.generate_literal(token),
            Expr::Variable(token) => self.generate_variable(token),
            Expr::Unary(unary) => self.generate_unary(unary),
            Expr::Binary(binary) => self.generate_binary(binary),
            Expr::CompoundAssign(compound) => self.generate_compound_assign(compound),
            Expr::Call(call) => self.generate_call(call),
            Expr::ArrayAccess(access) => self.generate_array_access(access),
            Expr::MemberAccess(access) => self.generate_member_access(access),
            Expr::Conditional(conditional) => self.generate_conditional(conditional),
        }
    }

    fn generate_literal(&mut self, token: &Token) -> u16 {
        match token.kind {
            TokenKind::IntLiteral => {
                let value = parse_int_literal(&token.lexeme).unwrap_or_else(|| {
                    self.diag.error(
                        token.line,
                        token.column,
                        format!("Invalid integer literal '{}'", token.lexeme),
                    );
                    0
                });
                let result = self.temp_var(ty::INT32);
                self.emit(
                    Opcode::Mov,
                    vec![Operand::Var(result), Operand::Imm32(value)],
                );
                result
            }
            TokenKind::FloatLiteral => {
                let value = parse_float_literal(&token.lexeme).unwrap_or_else(|| {
                    self.diag.error(
                        token.line,
                        token.column,
                        format!("Invalid float literal '{}'", token.lexeme),
                    );
                    0.0
                });
                let result = self.temp_var(ty::FP32);
                self.emit(
                    Opcode::Mov,
                    vec![Operand::Var(result), Operand::ImmF32(value)],
                );
                result
            }
            TokenKind::CharLiteral => {
                let value = char_literal_value(&token.lexeme);
                let result = self.temp_var(ty::INT8);
                self.emit(
                    Opcode::Mov,
                    vec![Operand::Var(result), Operand::Imm8(value)],
                );
                result
            }
            TokenKind::StrLiteral => {
                // interning into .data is still missing; a null pointer
                // placeholder keeps the stream well formed
                self.diag.warning(
                    token.line,
                    token.column,
                    "String literals not fully implemented",
                );
                let result = self.temp_var(ty::PTR);
                self.emit(Opcode::Mov, vec![Operand::Var(result), Operand::Imm32(0)]);
                result
            }
            _ => {
                self.diag
                    .error(token.line, token.column, "Unknown literal type");
                0
            }
        }
    }

    fn generate_variable(&mut self, token: &Token) -> u16 {
        match self.variables.get(&token.lexeme) {
            Some(binding) => binding.id,
            None => {
                self.diag.error(
                    token.line,
                    token.column,
                    format!("Undefined variable: {}", token.lexeme),
                );
                0
            }
        }
    }

    fn generate_unary(&mut self, unary: &UnaryExp) -> u16 {
        let op = &unary.op;

        if matches!(op.kind, TokenKind::PlusPlus | TokenKind::MinusMinus) {
            return self.generate_incdec(unary);
        }

        let operand = self.generate_expr(&unary.operand);
        match op.kind {
            TokenKind::Minus => {
                let result = self.temp_var(ty::INT32);
                self.emit(
                    Opcode::Neg,
                    vec![Operand::Var(result), Operand::Var(operand)],
                );
                result
            }
            TokenKind::Plus => {
                let result = self.temp_var(ty::INT32);
                self.emit(
                    Opcode::Mov,
                    vec![Operand::Var(result), Operand::Var(operand)],
                );
                result
            }
            TokenKind::Tilde => {
                let result = self.temp_var(ty::INT32);
                self.emit(
                    Opcode::Not,
                    vec![Operand::Var(result), Operand::Var(operand)],
                );
                result
            }
            TokenKind::Bang => self.generate_logical_not(operand),
            TokenKind::Star => {
                self.diag.warning(
                    op.line,
                    op.column,
                    "Dereference operator not fully implemented",
                );
                operand
            }
            TokenKind::Amp => {
                self.diag.warning(
                    op.line,
                    op.column,
                    "Address-of operator not fully implemented",
                );
                operand
            }
            _ => {
                self.diag.error(
                    op.line,
                    op.column,
                    format!("Unknown unary operator: {}", op.lexeme),
                );
                0
            }
        }
    }

    /// `!x` materializes 1 when the operand compares equal to zero and 0
    /// otherwise, through a label pair.
    fn generate_logical_not(&mut self, operand: u16) -> u16 {
        let zero_label = self.fresh_label("not_zero");
        let end_label = self.fresh_label("not_end");
        let result = self.temp_var(ty::INT32);

        self.emit_cmp_zero(operand);
        self.emit_jump(&zero_label);
        self.emit(Opcode::Mov, vec![Operand::Var(result), Operand::Imm32(0)]);
        self.emit_jump(&end_label);
        self.emit_label(&zero_label);
        self.emit(Opcode::Mov, vec![Operand::Var(result), Operand::Imm32(1)]);
        self.emit_label(&end_label);

        result
    }

    /// Prefix forms update in place and yield the operand's variable;
    /// postfix forms copy the original out first.
    fn generate_incdec(&mut self, unary: &UnaryExp) -> u16 {
        let operand = self.generate_expr(&unary.operand);
        let opcode = if unary.op.kind == TokenKind::PlusPlus {
            Opcode::Inc
        } else {
            Opcode::Dec
        };

        if unary.is_prefix {
            self.emit(opcode, vec![Operand::Var(operand)]);
            operand
        } else {
            let result = self.temp_var(ty::INT32);
            self.emit(
                Opcode::Mov,
                vec![Operand::Var(result), Operand::Var(operand)],
            );
            self.emit(opcode, vec![Operand::Var(operand)]);
            result
        }
    }

    fn arithmetic_opcode(kind: TokenKind) -> Option<Opcode> {
        match kind {
            TokenKind::Plus => Some(Opcode::Add),
            TokenKind::Minus => Some(Opcode::Sub),
            TokenKind::Star => Some(Opcode::Mul),
            TokenKind::Slash => Some(Opcode::Div),
            TokenKind::Percent => Some(Opcode::Mod),
            _ => None,
        }
    }

    fn generate_binary(&mut self, binary: &BinaryExp) -> u16 {
        let op = &binary.op;

        // short-circuit forms control their own evaluation order
        if matches!(op.kind, TokenKind::AmpAmp | TokenKind::PipePipe) {
            return self.generate_logical(binary);
        }

        if op.kind == TokenKind::Assign {
            let left = self.generate_expr(&binary.left);
            let right = self.generate_expr(&binary.right);
            self.emit(Opcode::Mov, vec![Operand::Var(left), Operand::Var(right)]);
            return left;
        }

        let left = self.generate_expr(&binary.left);
        let right = self.generate_expr(&binary.right);

        if let Some(opcode) = Self::arithmetic_opcode(op.kind) {
            let result = self.temp_var(ty::INT32);
            self.emit(
                opcode,
                vec![
                    Operand::Var(result),
                    Operand::Var(left),
                    Operand::Var(right),
                ],
            );
            return result;
        }

        if matches!(
            op.kind,
            TokenKind::Less
                | TokenKind::LessEqual
                | TokenKind::Greater
                | TokenKind::GreaterEqual
                | TokenKind::EqualEqual
                | TokenKind::BangEqual
        ) {
            return self.generate_comparison(left, right);
        }

        self.diag.error(
            op.line,
            op.column,
            format!("Binary operator not implemented: {}", op.lexeme),
        );
        0
    }

    /// Comparisons materialize 0/1 the same way `!` does: compare, branch,
    /// move a constant on each path.
    fn generate_comparison(&mut self, left: u16, right: u16) -> u16 {
        let true_label = self.fresh_label("cmp_true");
        let end_label = self.fresh_label("cmp_end");
        let result = self.temp_var(ty::INT32);

        self.emit(
            Opcode::Cmp,
            vec![Operand::Var(left), Operand::Var(right)],
        );
        self.emit_jump(&true_label);
        self.emit(Opcode::Mov, vec![Operand::Var(result), Operand::Imm32(0)]);
        self.emit_jump(&end_label);
        self.emit_label(&true_label);
        self.emit(Opcode::Mov, vec![Operand::Var(result), Operand::Imm32(1)]);
        self.emit_label(&end_label);

        result
    }

    /// `&&`/`||` short-circuit: the right operand only evaluates when the
    /// left one did not decide the answer.
    fn generate_logical(&mut self, binary: &BinaryExp) -> u16 {
        let is_and = binary.op.kind == TokenKind::AmpAmp;
        let decided_label = if is_and {
            self.fresh_label("and_false")
        } else {
            self.fresh_label("or_true")
        };
        let end_label = if is_and {
            self.fresh_label("and_end")
        } else {
            self.fresh_label("or_end")
        };
        let result = self.temp_var(ty::INT32);
        let (decided, undecided) = if is_and { (0, 1) } else { (1, 0) };

        let left = self.generate_expr(&binary.left);
        self.emit_cmp_zero(left);
        if is_and {
            // left == 0 decides &&
            self.emit_jump(&decided_label);
        } else {
            // left == 0 keeps || undecided, so fall through on zero only
            let check_right = self.fresh_label("or_next");
            self.emit_jump(&check_right);
            self.emit_jump(&decided_label);
            self.emit_label(&check_right);
        }

        let right = self.generate_expr(&binary.right);
        self.emit_cmp_zero(right);
        if is_and {
            self.emit_jump(&decided_label);
        } else {
            let done_right = self.fresh_label("or_next");
            self.emit_jump(&done_right);
            self.emit_jump(&decided_label);
            self.emit_label(&done_right);
        }

        self.emit(
            Opcode::Mov,
            vec![Operand::Var(result), Operand::Imm32(undecided)],
        );
        self.emit_jump(&end_label);
        self.emit_label(&decided_label);
        self.emit(
            Opcode::Mov,
            vec![Operand::Var(result), Operand::Imm32(decided)],
        );
        self.emit_label(&end_label);

        result
    }

    /// `a op= b` reuses the target's variable as both destination and left
    /// operand, so the lvalue is evaluated exactly once.
    fn generate_compound_assign(&mut self, compound: &CompoundAssignExp) -> u16 {
        let binary_kind = compound.op.kind.compound_to_binary();
        let Some(opcode) = Self::arithmetic_opcode(binary_kind) else {
            self.diag.error(
                compound.op.line,
                compound.op.column,
                format!("Binary operator not implemented: {}", compound.op.lexeme),
            );
            return 0;
        };

        let target = self.generate_expr(&compound.target);
        let value = self.generate_expr(&compound.value);
        self.emit(
            opcode,
            vec![
                Operand::Var(target),
                Operand::Var(target),
                Operand::Var(value),
            ],
        );
        target
    }

    fn generate_call(&mut self, call: &CallExp) -> u16 {
        let Expr::Variable(name) = call.callee.as_ref() else {
            let position = call.callee.position();
            self.diag.error(
                position.line,
                position.column,
                "Only simple function calls supported",
            );
            return 0;
        };

        let args: Vec<u16> = call.args.iter().map(|arg| self.generate_expr(arg)).collect();

        let result = self.temp_var(ty::INT32);

        let fun_symbol = self.add_symbol(&name.lexeme, 0, 0);
        let mut operands = vec![Operand::Sym(fun_symbol), Operand::param_abi()];
        operands.extend(args.into_iter().map(Operand::Var));
        self.emit(Opcode::Call, operands);

        self.emit(
            Opcode::Mov,
            vec![Operand::Var(result), Operand::ret_abi()],
        );

        result
    }

    fn generate_array_access(&mut self, access: &ArrayAccessExp) -> u16 {
        let array = self.generate_expr(&access.array);
        let index = self.generate_expr(&access.index);

        let result = self.temp_var(ty::INT32);
        self.emit(
            Opcode::Index,
            vec![
                Operand::Var(result),
                Operand::Var(array),
                Operand::Var(index),
            ],
        );
        result
    }

    fn generate_member_access(&mut self, access: &MemberAccessExp) -> u16 {
        self.diag.warning(
            access.op.line,
            access.op.column,
            "Member access not implemented",
        );
        let result = self.temp_var(ty::INT32);
        self.emit(Opcode::Mov, vec![Operand::Var(result), Operand::Imm32(0)]);
        result
    }

    fn generate_conditional(&mut self, conditional: &ConditionalExp) -> u16 {
        let condition = self.generate_expr(&conditional.condition);

        let false_label = self.fresh_label("cond_false");
        let end_label = self.fresh_label("cond_end");
        let result = self.temp_var(ty::INT32);

        self.emit_cmp_zero(condition);
        self.emit_jump(&false_label);

        let then = self.generate_expr(&conditional.then);
        self.emit(Opcode::Mov, vec![Operand::Var(result), Operand::Var(then)]);
        self.emit_jump(&end_label);

        self.emit_label(&false_label);
        let els = self.generate_expr(&conditional.els);
        self.emit(Opcode::Mov, vec![Operand::Var(result), Operand::Var(els)]);
        self.emit_label(&end_label);

        result
    }
}

/// Integer literal text to value, suffixes stripped.
fn parse_int_literal(lexeme: &str) -> Option<i32> {
    let digits = lexeme.trim_end_matches(['u', 'U', 'l', 'L']);
    digits.parse().ok()
}

/// Float literal text to value, suffixes stripped.
fn parse_float_literal(lexeme: &str) -> Option<f32> {
    let digits = lexeme.trim_end_matches(['f', 'F', 'l', 'L']);
    digits.parse().ok()
}

/// Value of a character literal, escapes decoded. Unknown escapes fall back
/// to the escaped character itself; the lexer already reported them.
fn char_literal_value(lexeme: &str) -> u8 {
    let inner: Vec<char> = lexeme
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or("")
        .chars()
        .collect();
    let value = match inner.as_slice() {
        ['\\', escape, ..] => decode_escape(*escape).unwrap_or(*escape),
        [c, ..] => *c,
        [] => '\0',
    };
    value as u8
}
