//! Recursive-descent parser for the smpl language
//!
//! Each nonterminal method receives the current emission block and appends
//! SSA values while it consumes tokens. Structured control flow builds the
//! hierarchical block graph and runs φ-insertion as soon as its arms are
//! complete.

use crate::{ParseTrace, TraceGuard};
use hashbrown::HashMap;
use log::debug;
use smallvec::SmallVec;
use smpl_common::{Diagnostics, IdentId, SmplError, SmplResult, SourceFile, Span};
use smpl_lexer::{Lexer, NameTable, Token, TokenType};
use smpl_ssa::{
    insert_branch_phis, insert_loop_phis, Block, BlockId, FuncId, Ir, Opcode, Operand, PhiOutcome,
    VarType,
};

/// Result of a successful compilation
#[derive(Debug)]
pub struct Compilation {
    pub ir: Ir,
    pub names: NameTable,
    pub source: SourceFile,
    pub diagnostics: Diagnostics,
    pub main: FuncId,
}

/// Built-in I/O functions; their names are reserved
#[derive(Debug, Clone, Copy)]
struct Predefined {
    op: Opcode,
    params: usize,
    returns_value: bool,
}

/// Parser and SSA emission driver
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    names: NameTable,
    source: SourceFile,
    ir: Ir,
    main: FuncId,
    cur_func: FuncId,
    funcs_by_ident: HashMap<IdentId, FuncId>,
    predefined: HashMap<IdentId, Predefined>,
    diagnostics: Diagnostics,
    trace: Option<ParseTrace>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, mut names: NameTable, source: SourceFile) -> Self {
        let mut ir = Ir::new();
        let main = ir.new_function("main", true, "computation block", "main function");

        // reserve the predefined function names
        let mut predefined = HashMap::new();
        let builtins: [(&str, Opcode, usize, bool); 3] = [
            ("InputNum", Opcode::Read, 0, true),
            ("OutputNum", Opcode::Write, 1, false),
            ("OutputNewLine", Opcode::Writenl, 0, false),
        ];
        for (name, op, params, returns_value) in builtins {
            predefined.insert(names.add_name(name), Predefined { op, params, returns_value });
        }

        Self {
            tokens,
            pos: 0,
            names,
            source,
            ir,
            main,
            cur_func: main,
            funcs_by_ident: HashMap::new(),
            predefined,
            diagnostics: Diagnostics::new(),
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: ParseTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Parse the whole computation and hand back the finished IR
    pub fn compile(mut self) -> SmplResult<Compilation> {
        self.computation()?;
        Ok(Compilation {
            ir: self.ir,
            names: self.names,
            source: self.source,
            diagnostics: self.diagnostics,
            main: self.main,
        })
    }

    // ---- token plumbing ----

    fn current(&self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn peek(&self) -> TokenType {
        self.current().ty
    }

    fn span(&self) -> Span {
        self.current().span
    }

    fn advance(&mut self) {
        if let Some(trace) = &self.trace {
            trace.token(self.describe(self.peek()));
        }
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn describe(&self, tt: TokenType) -> String {
        match tt {
            TokenType::Ident(id) => format!("\"{}\"", self.names.name(id)),
            other => format!("\"{}\"", other),
        }
    }

    fn located(&self, span: Span, msg: &str) -> String {
        format!("{}\n{}", self.source.locate(span), msg)
    }

    fn parse_err(&self, msg: String) -> SmplError {
        SmplError::parse(self.located(self.span(), &msg))
    }

    fn expect(&mut self, tt: TokenType, what: &str) -> SmplResult<()> {
        if self.peek() == tt {
            self.advance();
            Ok(())
        } else {
            Err(self.parse_err(format!("Expecting {}, found {}", what, self.describe(self.peek()))))
        }
    }

    fn expect_ident(&mut self, what: &str) -> SmplResult<(IdentId, Span)> {
        match self.peek() {
            TokenType::Ident(id) => {
                let span = self.span();
                self.advance();
                Ok((id, span))
            }
            other => {
                Err(self.parse_err(format!("Expecting {}, found {}", what, self.describe(other))))
            }
        }
    }

    fn expect_number(&mut self, what: &str) -> SmplResult<(i32, Span)> {
        match self.peek() {
            TokenType::Number(n) => {
                let span = self.span();
                self.advance();
                Ok((n, span))
            }
            other => {
                Err(self.parse_err(format!("Expecting {}, found {}", what, self.describe(other))))
            }
        }
    }

    fn trace_enter(&self, name: &str) -> Option<TraceGuard> {
        self.trace.as_ref().map(|t| t.enter(name))
    }

    fn warn(&mut self, span: Span, msg: String) {
        self.diagnostics.warning(msg, span);
    }

    fn report_uninitialized(&mut self, outcome: &PhiOutcome, span: Span) {
        for &ident in &outcome.uninitialized {
            let msg = format!("Using uninitialized variable \"{}\" in phi", self.names.name(ident));
            self.warn(span, msg);
        }
    }

    // ---- expressions ----

    /// designator = ident { "[" expression "]" }
    ///
    /// For a scalar read, the value from the dominating value table (or a
    /// warned `Const(0)` that is then bound). For an array access, the
    /// emitted byte-offset expression; the caller adds ADDA and LOAD/STORE.
    fn designator(
        &mut self,
        ctx: BlockId,
        write: bool,
    ) -> SmplResult<(Option<Operand>, IdentId, bool)> {
        let _t = self.trace_enter("designator");

        let (ident, sym_span) = self.expect_ident("identifier at the beginning of designator")?;

        let var_type = match self.ir.func(self.cur_func).var_type(ident) {
            Some(t) => t.clone(),
            None => {
                let name = self.names.name(ident);
                if self.funcs_by_ident.contains_key(&ident) || self.predefined.contains_key(&ident)
                {
                    return Err(SmplError::type_mismatch(self.located(
                        sym_span,
                        &format!("Function \"{}\" used as a variable", name),
                    )));
                }
                return Err(SmplError::undefined_ident(self.located(
                    sym_span,
                    &format!("Use of undeclared variable \"{}\"", name),
                )));
            }
        };

        let mut indices: SmallVec<[Operand; 2]> = SmallVec::new();
        while self.peek() == TokenType::LeftBracket {
            self.advance();
            let index = self.expression(ctx)?;
            indices.push(index);
            self.expect(TokenType::RightBracket, "\"]\" after array index")?;
        }

        if !indices.is_empty() {
            let VarType::Array(dims) = &var_type else {
                return Err(SmplError::type_mismatch(self.located(
                    sym_span,
                    &format!("Indexing scalar variable \"{}\"", self.names.name(ident)),
                )));
            };
            let dims = dims.clone();
            if indices.len() != dims.len() {
                return Err(SmplError::type_mismatch(self.located(
                    sym_span,
                    &format!(
                        "Array \"{}\" has {} dimensions but {} indices were given",
                        self.names.name(ident),
                        dims.len(),
                        indices.len()
                    ),
                )));
            }

            // linearize: ((i1 * d2 + i2) * d3 + i3) ... then scale by 4
            self.check_const_bound(indices[0], dims[0], sym_span)?;
            let mut offset = indices[0];
            for i in 1..indices.len() {
                self.check_const_bound(indices[i], dims[i], sym_span)?;
                let limit = Operand::new(self.ir.add_const(self.cur_func, dims[i]));
                let mul = self.ir.add_inst(ctx, Opcode::Mul, Some(offset), Some(limit), None);
                let add =
                    self.ir.add_inst(ctx, Opcode::Add, Some(Operand::new(mul)), Some(indices[i]), None);
                offset = Operand::new(add);
            }
            let four = Operand::new(self.ir.add_const(self.cur_func, 4));
            let scaled = self.ir.add_inst(ctx, Opcode::Mul, Some(offset), Some(four), None);
            return Ok((Some(Operand::new(scaled)), ident, true));
        }

        if var_type.is_array() {
            return Err(SmplError::type_mismatch(self.located(
                sym_span,
                &format!("Array \"{}\" used without indices", self.names.name(ident)),
            )));
        }

        if write {
            return Ok((None, ident, false));
        }

        match self.ir.lookup_value_table(ctx, ident) {
            Some(value) => Ok((Some(value), ident, false)),
            None => {
                let msg =
                    format!("Using uninitialized variable \"{}\"", self.names.name(ident));
                self.warn(sym_span, msg);
                let zero = self.ir.add_const(self.cur_func, 0);
                self.ir.basic_mut(ctx).value_table.set(ident, Operand::new(zero));
                Ok((Some(Operand::with_ident(zero, ident)), ident, false))
            }
        }
    }

    fn check_const_bound(&self, index: Operand, dim: i32, span: Span) -> SmplResult<()> {
        if let Some(n) = self.ir.value(index.value).as_const() {
            if n >= dim {
                return Err(SmplError::const_out_of_bound_index(self.located(
                    span,
                    &format!("Constant index {} exceeds dimension {}", n, dim),
                )));
            }
        }
        Ok(())
    }

    /// factor = designator | number | "(" expression ")" | funcCall
    fn factor(&mut self, ctx: BlockId) -> SmplResult<Operand> {
        let _t = self.trace_enter("factor");

        match self.peek() {
            TokenType::Ident(_) => {
                let (value, ident, is_array) = self.designator(ctx, false)?;
                let Some(value) = value else {
                    unreachable!("designator read returned no value");
                };
                if is_array {
                    // element address from the array's base, then load
                    let Some(base) = self.ir.lookup_value_table(ctx, ident) else {
                        unreachable!("declared array has no base address binding");
                    };
                    let address =
                        self.ir.add_inst(ctx, Opcode::Adda, Some(base), Some(value), None);
                    let load = self.ir.add_inst(
                        ctx,
                        Opcode::Load,
                        Some(Operand::new(address)),
                        None,
                        Some(ident),
                    );
                    Ok(Operand::with_ident(load, ident))
                } else {
                    Ok(value)
                }
            }
            TokenType::Number(n) => {
                self.advance();
                Ok(Operand::new(self.ir.add_const(self.cur_func, n)))
            }
            TokenType::LeftParen => {
                self.advance();
                let value = self.expression(ctx)?;
                self.expect(TokenType::RightParen, "\")\" to close parenthesized expression")?;
                Ok(value)
            }
            TokenType::KeywordCall => {
                let call_span = self.span();
                match self.func_call(ctx)? {
                    Some(value) => Ok(value),
                    None => Err(SmplError::type_mismatch(
                        self.located(call_span, "Void function used in an expression"),
                    )),
                }
            }
            other => Err(self.parse_err(format!(
                "Factor starts with unexpected token {}",
                self.describe(other)
            ))),
        }
    }

    /// term = factor { ("*" | "/") factor }
    fn term(&mut self, ctx: BlockId) -> SmplResult<Operand> {
        let _t = self.trace_enter("term");

        let mut value = self.factor(ctx)?;
        loop {
            let op = match self.peek() {
                TokenType::Times => Opcode::Mul,
                TokenType::Divide => Opcode::Div,
                _ => return Ok(value),
            };
            self.advance();
            let operand = self.factor(ctx)?;
            let inst = self.ir.add_inst(ctx, op, Some(value), Some(operand), None);
            value = Operand::new(inst);
        }
    }

    /// expression = term { ("+" | "-") term }
    fn expression(&mut self, ctx: BlockId) -> SmplResult<Operand> {
        let _t = self.trace_enter("expression");

        let mut value = self.term(ctx)?;
        loop {
            let op = match self.peek() {
                TokenType::Plus => Opcode::Add,
                TokenType::Minus => Opcode::Sub,
                _ => return Ok(value),
            };
            self.advance();
            let operand = self.term(ctx)?;
            let inst = self.ir.add_inst(ctx, op, Some(value), Some(operand), None);
            value = Operand::new(inst);
        }
    }

    /// relation = expression relOp expression
    fn relation(&mut self, ctx: BlockId) -> SmplResult<(Operand, smpl_common::RelOp)> {
        let _t = self.trace_enter("relation");

        let left = self.expression(ctx)?;
        let Some(relop) = self.peek().relop() else {
            return Err(self.parse_err(format!(
                "Expecting relation operator, found {}",
                self.describe(self.peek())
            )));
        };
        self.advance();
        let right = self.expression(ctx)?;

        let cmp = self.ir.add_inst(ctx, Opcode::Cmp, Some(left), Some(right), None);
        Ok((Operand::new(cmp), relop))
    }

    // ---- statements ----

    /// assignment = "let" designator "<-" expression
    fn assignment(&mut self, ctx: BlockId) -> SmplResult<()> {
        let _t = self.trace_enter("assignment");

        self.expect(TokenType::KeywordLet, "keyword \"let\"")?;
        let (target, ident, is_array) = self.designator(ctx, true)?;
        self.expect(TokenType::Becomes, "\"<-\" after variable name")?;
        let src = self.expression(ctx)?;

        if is_array {
            let Some(offset) = target else {
                unreachable!("array designator returned no offset");
            };
            let Some(base) = self.ir.lookup_value_table(ctx, ident) else {
                unreachable!("declared array has no base address binding");
            };
            let address = self.ir.add_inst(ctx, Opcode::Adda, Some(base), Some(offset), None);
            self.ir.add_inst(
                ctx,
                Opcode::Store,
                Some(src),
                Some(Operand::new(address)),
                Some(ident),
            );
        } else {
            self.ir.basic_mut(ctx).value_table.set(ident, src);
        }
        Ok(())
    }

    /// funcCall = "call" ident [ "(" [expression { "," expression }] ")" ]
    ///
    /// Returns the call's value, or `None` for void functions.
    fn func_call(&mut self, ctx: BlockId) -> SmplResult<Option<Operand>> {
        let _t = self.trace_enter("funcCall");

        self.expect(TokenType::KeywordCall, "keyword \"call\"")?;
        let (ident, sym_span) = self.expect_ident("function name")?;

        let mut args: SmallVec<[Operand; 4]> = SmallVec::new();
        if self.peek() == TokenType::LeftParen {
            self.advance();
            while self.peek() != TokenType::RightParen {
                args.push(self.expression(ctx)?);
                if self.peek() == TokenType::Comma {
                    self.advance();
                    if self.peek() == TokenType::RightParen {
                        return Err(self.parse_err("Expecting expression after \",\"".to_owned()));
                    }
                } else {
                    break;
                }
            }
            self.expect(TokenType::RightParen, "\")\" after call arguments")?;
        }

        if let Some(&builtin) = self.predefined.get(&ident) {
            if args.len() != builtin.params {
                return Err(SmplError::arity_mismatch(self.located(
                    sym_span,
                    &format!("Expecting {} parameters, getting {}", builtin.params, args.len()),
                )));
            }
            let x = args.first().copied();
            let inst = self.ir.add_inst(ctx, builtin.op, x, None, None);
            return Ok(builtin.returns_value.then(|| Operand::new(inst)));
        }

        if let Some(&func) = self.funcs_by_ident.get(&ident) {
            let (param_count, is_void, name) = {
                let f = self.ir.func(func);
                (f.params.len(), f.is_void, f.name.clone())
            };
            if args.len() != param_count {
                return Err(SmplError::arity_mismatch(self.located(
                    sym_span,
                    &format!("Expecting {} parameters, getting {}", param_count, args.len()),
                )));
            }
            let call = self.ir.add_call(ctx, name, args.into_vec());
            return Ok((!is_void).then(|| Operand::new(call)));
        }

        let name = self.names.name(ident);
        if self.ir.func(self.cur_func).var_type(ident).is_some() {
            return Err(SmplError::type_mismatch(
                self.located(sym_span, &format!("Variable \"{}\" called as a function", name)),
            ));
        }
        Err(SmplError::undefined_ident(
            self.located(sym_span, &format!("Calling undefined function \"{}\"", name)),
        ))
    }

    /// ifStatement = "if" relation "then" statSequence ["else" statSequence] "fi"
    fn if_statement(&mut self, last: BlockId, sb: BlockId) -> SmplResult<()> {
        let _t = self.trace_enter("ifStatement");

        let rel_block = self.ir.new_branch_block();
        let join = self.ir.new_join_block();
        self.ir.set_prev(rel_block, last);
        self.ir.set_super_head(sb, rel_block);
        self.ir.set_super_tail(sb, join);
        // CSE from the join continues at the relation block, not in the arms
        self.ir.set_last_cs_block(join, rel_block);

        self.expect(TokenType::KeywordIf, "\"if\" at the beginning of ifStatement")?;
        let (rel, relop) = self.relation(rel_block)?;
        self.expect(TokenType::KeywordThen, "\"then\" in ifStatement")?;

        let then_block = self.ir.new_super_block("if body");
        self.ir.set_next(rel_block, then_block);
        self.ir.set_prev(join, then_block);
        self.stat_sequence(rel_block, then_block)?;
        self.ir.set_next(then_block, join);
        let then_stores = self.ir.collect_stores(then_block);
        self.ir.add_kill_stores(join, &then_stores);

        // branch into the then arm when the relation holds
        let then_target = self.ir.meta_first_of(then_block);
        self.ir.add_inst(
            rel_block,
            Opcode::from_relop(relop),
            Some(rel),
            Some(Operand::new(then_target)),
            None,
        );

        let mut arms: SmallVec<[BlockId; 2]> = SmallVec::new();
        arms.push(then_block);

        if self.peek() == TokenType::KeywordElse {
            self.advance();
            let else_block = self.ir.new_super_block("else body");
            self.ir.set_branch_block(rel_block, else_block);
            self.ir.set_joining_block(join, else_block);

            // fall through from the relation block into the else arm
            let else_target = self.ir.meta_first_of(else_block);
            self.ir.add_inst(rel_block, Opcode::Bra, Some(Operand::new(else_target)), None, None);

            self.stat_sequence(rel_block, else_block)?;
            self.ir.set_next(else_block, join);
            let else_stores = self.ir.collect_stores(else_block);
            self.ir.add_kill_stores(join, &else_stores);

            // the then arm jumps over the else arm into the join
            let join_target = self.ir.meta_first_of(join);
            let Some(then_last) = self.ir.last_basic(then_block) else {
                unreachable!("statement sequence built an empty arm");
            };
            self.ir.add_inst(then_last, Opcode::Bra, Some(Operand::new(join_target)), None, None);

            arms.push(else_block);
        } else {
            self.ir.set_branch_block(rel_block, join);
            self.ir.set_joining_block(join, rel_block);

            // fall through to the join
            let join_target = self.ir.meta_first_of(join);
            self.ir.add_inst(rel_block, Opcode::Bra, Some(Operand::new(join_target)), None, None);
        }

        let fi_span = self.span();
        let outcome = insert_branch_phis(&mut self.ir, self.cur_func, join, &arms);
        self.report_uninitialized(&outcome, fi_span);

        self.expect(TokenType::KeywordFi, "\"fi\" at the end of ifStatement")?;
        Ok(())
    }

    /// whileStatement = "while" relation "do" statSequence "od"
    fn while_statement(&mut self, last: BlockId, sb: BlockId) -> SmplResult<()> {
        let _t = self.trace_enter("whileStatement");

        let join = self.ir.new_join_block();
        let rel_block = self.ir.new_branch_block();
        let body = self.ir.new_super_block("while body");
        self.ir.set_joining_block(join, body);
        self.ir.set_next(join, rel_block);
        self.ir.set_prev(join, last);
        self.ir.set_branch_block(rel_block, body);
        self.ir.set_prev(rel_block, join);
        self.ir.set_super_head(sb, join);
        self.ir.set_super_tail(sb, rel_block);

        self.expect(TokenType::KeywordWhile, "\"while\" at the beginning of whileStatement")?;
        let (rel, relop) = self.relation(rel_block)?;
        self.expect(TokenType::KeywordDo, "\"do\" in whileStatement")?;

        self.stat_sequence(rel_block, body)?;
        self.ir.set_next(body, join);
        let body_stores = self.ir.collect_stores(body);
        self.ir.add_kill_stores(join, &body_stores);

        let od_span = self.span();
        self.expect(TokenType::KeywordOd, "\"od\" at the end of whileStatement")?;

        // into the body while the relation holds
        let body_target = self.ir.meta_first_of(body);
        self.ir.add_inst(
            rel_block,
            Opcode::from_relop(relop),
            Some(rel),
            Some(Operand::new(body_target)),
            None,
        );
        // exit: whatever structurally follows the loop
        let exit_target = self.ir.meta_first_of_next(rel_block);
        self.ir.add_inst(rel_block, Opcode::Bra, Some(Operand::new(exit_target)), None, None);
        // back edge from the body to the join
        let join_target = self.ir.meta_first_of(join);
        let Some(body_last) = self.ir.last_basic(body) else {
            unreachable!("statement sequence built an empty loop body");
        };
        self.ir.add_inst(body_last, Opcode::Bra, Some(Operand::new(join_target)), None, None);

        let outcome = insert_loop_phis(&mut self.ir, self.cur_func, join, rel_block, body);
        self.report_uninitialized(&outcome, od_span);
        Ok(())
    }

    /// returnStatement = "return" [ expression ]
    fn return_statement(&mut self, ctx: BlockId) -> SmplResult<()> {
        let _t = self.trace_enter("returnStatement");

        self.expect(TokenType::KeywordReturn, "keyword \"return\"")?;
        if self.peek().starts_expression() {
            let value = self.expression(ctx)?;
            self.ir.add_inst(ctx, Opcode::Ret, Some(value), None, None);
        } else {
            self.ir.add_inst(ctx, Opcode::Ret, None, None, None);
        }
        Ok(())
    }

    /// Emission block for a simple statement: keep appending to the previous
    /// plain block when allowed, else open a fresh one
    fn stmt_context(&mut self, last: BlockId, can_merge: bool) -> BlockId {
        if can_merge {
            if let Block::Basic(bb) = self.ir.block(last) {
                if bb.is_plain() {
                    return last;
                }
            }
        }
        let ctx = self.ir.new_plain_block();
        self.ir.set_prev(ctx, last);
        ctx
    }

    /// statement = assignment | funcCall | ifStatement | whileStatement | returnStatement
    fn statement(&mut self, last: BlockId, can_merge: bool) -> SmplResult<BlockId> {
        let _t = self.trace_enter("statement");

        match self.peek() {
            TokenType::KeywordLet => {
                let ctx = self.stmt_context(last, can_merge);
                self.assignment(ctx)?;
                Ok(ctx)
            }
            TokenType::KeywordCall => {
                let ctx = self.stmt_context(last, can_merge);
                self.func_call(ctx)?;
                Ok(ctx)
            }
            TokenType::KeywordIf => {
                let sb = self.ir.new_super_block("if statement");
                self.ir.set_prev(sb, last);
                self.if_statement(last, sb)?;
                Ok(sb)
            }
            TokenType::KeywordWhile => {
                let sb = self.ir.new_super_block("while statement");
                self.ir.set_prev(sb, last);
                self.while_statement(last, sb)?;
                Ok(sb)
            }
            TokenType::KeywordReturn => {
                let ctx = self.stmt_context(last, can_merge);
                self.return_statement(ctx)?;
                Ok(ctx)
            }
            other => {
                Err(self.parse_err(format!("Expecting statement, found {}", self.describe(other))))
            }
        }
    }

    /// statSequence = statement { ";" statement } [ ";" ]
    fn stat_sequence(&mut self, last: BlockId, sb: BlockId) -> SmplResult<()> {
        let _t = self.trace_enter("statSequence");

        self.ir.set_prev(sb, last);

        if !self.peek().starts_statement() {
            return Err(
                self.parse_err(format!("Expecting statement, found {}", self.describe(self.peek())))
            );
        }

        loop {
            match self.ir.super_block(sb).tail {
                None => {
                    // first block in the super block
                    let block = self.statement(last, false)?;
                    self.ir.set_prev(block, last);
                    self.ir.set_super_head(sb, block);
                    self.ir.set_super_tail(sb, block);
                }
                Some(tail) => {
                    let block = self.statement(tail, true)?;
                    if block != tail {
                        self.ir.set_next(tail, block);
                        self.ir.set_prev(block, tail);
                        self.ir.set_super_tail(sb, block);
                    }
                }
            }

            if self.peek() == TokenType::Semicolon {
                self.advance();
                if !self.peek().starts_statement() {
                    break;
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    // ---- declarations ----

    /// typeDecl = "var" | "array" "[" number "]" { "[" number "]" }
    fn type_decl(&mut self) -> SmplResult<VarType> {
        let _t = self.trace_enter("typeDecl");

        match self.peek() {
            TokenType::KeywordVar => {
                self.advance();
                Ok(VarType::Scalar)
            }
            TokenType::KeywordArray => {
                self.advance();
                if self.peek() != TokenType::LeftBracket {
                    return Err(self.parse_err(format!(
                        "Expecting \"[\" after \"array\", found {}",
                        self.describe(self.peek())
                    )));
                }
                let mut dims = Vec::new();
                while self.peek() == TokenType::LeftBracket {
                    self.advance();
                    let (dim, _) = self.expect_number("array dimension")?;
                    dims.push(dim);
                    self.expect(TokenType::RightBracket, "\"]\" after array dimension")?;
                }
                Ok(VarType::Array(dims))
            }
            other => Err(self.parse_err(format!(
                "Expecting \"var\" or \"array\" at the beginning of typeDecl, found {}",
                self.describe(other)
            ))),
        }
    }

    /// varDecl = typeDecl ident { "," ident } ";"
    fn var_decl(&mut self, ctx: BlockId) -> SmplResult<()> {
        let _t = self.trace_enter("varDecl");

        let var_type = self.type_decl()?;
        loop {
            let (ident, span) = self.expect_ident("identifier in variable declaration")?;
            self.declare_variable(ident, span, var_type.clone(), ctx)?;

            match self.peek() {
                TokenType::Comma => self.advance(),
                TokenType::Semicolon => {
                    self.advance();
                    return Ok(());
                }
                other => {
                    return Err(self.parse_err(format!(
                        "Expecting \",\" or \";\" in varDecl, found {}",
                        self.describe(other)
                    )))
                }
            }
        }
    }

    fn declare_variable(
        &mut self,
        ident: IdentId,
        span: Span,
        var_type: VarType,
        ctx: BlockId,
    ) -> SmplResult<()> {
        if self.ir.func(self.cur_func).var_types.contains_key(&ident)
            || self.funcs_by_ident.contains_key(&ident)
            || self.predefined.contains_key(&ident)
        {
            return Err(SmplError::redefined_ident(self.located(
                span,
                &format!("Redefinition of \"{}\"", self.names.name(ident)),
            )));
        }

        if var_type.is_array() {
            // reserve the stack slot: base address is FP plus the current offset
            let offset = self.ir.frame_offset(self.cur_func);
            let offset_const = self.ir.add_const(self.cur_func, offset);
            let fp = self.ir.func(self.cur_func).frame_pointer;
            let base = self.ir.add_inst(
                ctx,
                Opcode::Add,
                Some(Operand::new(fp)),
                Some(Operand::new(offset_const)),
                None,
            );
            self.ir.basic_mut(ctx).value_table.set(ident, Operand::new(base));
            self.ir.advance_frame(self.cur_func, var_type.size());
        }

        self.ir.func_mut(self.cur_func).var_types.insert(ident, var_type);
        Ok(())
    }

    /// formalParam = "(" [ident { "," ident }] ")"
    fn formal_param(&mut self) -> SmplResult<Vec<(IdentId, Span)>> {
        let _t = self.trace_enter("formalParam");

        self.expect(TokenType::LeftParen, "\"(\" at the beginning of formalParam")?;
        let mut params = Vec::new();
        if matches!(self.peek(), TokenType::Ident(_)) {
            loop {
                let (ident, span) = self.expect_ident("parameter name")?;
                params.push((ident, span));
                if self.peek() == TokenType::Comma {
                    self.advance();
                    if !matches!(self.peek(), TokenType::Ident(_)) {
                        return Err(self.parse_err(format!(
                            "Expecting identifier after comma, found {}",
                            self.describe(self.peek())
                        )));
                    }
                } else {
                    break;
                }
            }
        }
        self.expect(TokenType::RightParen, "\")\" at the end of formalParam")?;
        Ok(params)
    }

    /// funcDecl = ["void"] "function" ident formalParam ";" funcBody ";"
    fn func_decl(&mut self) -> SmplResult<()> {
        let _t = self.trace_enter("funcDecl");

        let is_void = if self.peek() == TokenType::KeywordVoid {
            self.advance();
            true
        } else {
            false
        };
        self.expect(TokenType::KeywordFunction, "keyword \"function\"")?;
        let (ident, span) = self.expect_ident("identifier after keyword \"function\"")?;

        if self.funcs_by_ident.contains_key(&ident)
            || self.predefined.contains_key(&ident)
            || self.ir.func(self.main).var_types.contains_key(&ident)
        {
            return Err(SmplError::redefined_ident(self.located(
                span,
                &format!("Redefinition of \"{}\"", self.names.name(ident)),
            )));
        }

        let name = self.names.name(ident).to_owned();
        let params = self.formal_param()?;
        self.expect(TokenType::Semicolon, "\";\" after formalParam")?;

        let label = if is_void { format!("void {}()", name) } else { format!("{}()", name) };
        let func = self.ir.new_function(&name, is_void, label, "function body");
        self.funcs_by_ident.insert(ident, func);
        debug!("declared function {} with {} parameters", name, params.len());

        // one ARG per formal parameter, bound in the constant block
        let const_block = self.ir.func(func).const_block;
        for (i, &(param, pspan)) in params.iter().enumerate() {
            if self.ir.func(func).var_types.contains_key(&param)
                || self.predefined.contains_key(&param)
                || self.funcs_by_ident.contains_key(&param)
            {
                return Err(SmplError::redefined_ident(self.located(
                    pspan,
                    &format!("Redefinition of \"{}\"", self.names.name(param)),
                )));
            }
            let index = self.ir.add_const(func, i as i32);
            let arg =
                self.ir.add_inst(const_block, Opcode::Arg, Some(Operand::new(index)), None, None);
            self.ir.basic_mut(const_block).value_table.set(param, Operand::new(arg));
            self.ir.func_mut(func).var_types.insert(param, VarType::Scalar);
            self.ir.func_mut(func).params.push(param);
        }

        let saved = self.cur_func;
        self.cur_func = func;
        let body_result = self.func_body();
        self.cur_func = saved;
        body_result?;

        self.expect(TokenType::Semicolon, "\";\" after funcBody")?;
        Ok(())
    }

    /// funcBody = { varDecl } "{" [ statSequence ] "}"
    fn func_body(&mut self) -> SmplResult<()> {
        let _t = self.trace_enter("funcBody");

        while matches!(self.peek(), TokenType::KeywordVar | TokenType::KeywordArray) {
            let const_block = self.ir.func(self.cur_func).const_block;
            self.var_decl(const_block)?;
        }

        self.expect(TokenType::LeftBrace, "\"{\" at the beginning of funcBody")?;
        if self.peek() != TokenType::RightBrace {
            let (const_block, body, end) = {
                let f = self.ir.func(self.cur_func);
                (f.const_block, f.body_block, f.end_block)
            };
            self.stat_sequence(const_block, body)?;
            self.ir.set_next(body, end);
        }
        self.expect(TokenType::RightBrace, "\"}\" at the end of funcBody")?;
        Ok(())
    }

    /// computation = "main" { varDecl } { funcDecl } "{" statSequence "}" "."
    pub fn computation(&mut self) -> SmplResult<()> {
        let _t = self.trace_enter("computation");
        debug!("compiling {}", self.source.name());

        self.expect(TokenType::KeywordMain, "keyword \"main\" at the start of computation")?;

        let const_block = self.ir.func(self.main).const_block;
        while matches!(self.peek(), TokenType::KeywordVar | TokenType::KeywordArray) {
            self.var_decl(const_block)?;
        }
        while matches!(self.peek(), TokenType::KeywordVoid | TokenType::KeywordFunction) {
            self.func_decl()?;
        }

        self.expect(TokenType::LeftBrace, "\"{\"")?;
        let (body, end) = {
            let f = self.ir.func(self.main);
            (f.body_block, f.end_block)
        };
        self.stat_sequence(const_block, body)?;
        self.ir.set_next(body, end);
        self.ir.add_inst(end, Opcode::End, None, None, None);

        self.expect(TokenType::RightBrace, "\"}\"")?;
        self.expect(TokenType::Period, "\".\" at the end of computation")?;

        self.ir.finalize();
        Ok(())
    }
}

/// Tokenize and compile one source text
pub fn compile_source(text: &str, file_name: &str) -> SmplResult<Compilation> {
    compile_source_traced(text, file_name, None)
}

/// Tokenize and compile one source text, recording a parse trace if given
pub fn compile_source_traced(
    text: &str,
    file_name: &str,
    trace: Option<ParseTrace>,
) -> SmplResult<Compilation> {
    let source = SourceFile::new(file_name, text);
    let mut lexer = Lexer::new(text, &source);
    let tokens = lexer.tokenize()?;
    let names = lexer.into_names();
    let mut parser = Parser::new(tokens, names, source);
    if let Some(trace) = trace {
        parser = parser.with_trace(trace);
    }
    parser.compile()
}
