//! Token stream → AST, by hand-written recursive descent.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use plc_lex::{decode_escapes, Lexer, Token, TokenKind};
use plc_util::{NodeIdGen, Offset, ParseError, Symbol, SymbolInterner};

use crate::ast::{BinOp, Expr, Field, Literal, Method, Param, Source, Stmt};

/// The parsed AST plus the interner that owns every [`Symbol`] inside
/// it. Later passes borrow the interner to resolve names back to text
/// (diagnostics, emission); they never intern new symbols themselves.
pub struct ParsedProgram {
    pub source: Source,
    pub interner: SymbolInterner,
}

/// Lexes and parses `source` in one call.
pub fn parse(source: &str) -> Result<ParsedProgram, ParseError> {
    let tokens = Lexer::tokenize(source)?;
    let mut parser = Parser::new(tokens, source.len());
    let ast = parser.parse_source()?;
    Ok(ParsedProgram { source: ast, interner: parser.interner })
}

/// A hand-written recursive-descent parser with one-token lookahead.
///
/// Each grammar rule is a method here, named after the rule (`logical`,
/// `comparison`, `additive`, `multiplicative`, `secondary`, `primary`)
/// rather than folded into a generic precedence-climbing table — the
/// grammar is already fully disambiguated, so naming each level keeps
/// the parser a direct transcription of the grammar.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    eof_offset: Offset,
    interner: SymbolInterner,
    node_ids: NodeIdGen,
    /// Suppresses the trailing `;` that `exprOrAssign` normally
    /// requires, while parsing a `for(...)`'s init/increment clauses.
    in_for_header: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, source_len: usize) -> Self {
        Self {
            tokens,
            position: 0,
            eof_offset: source_len,
            interner: SymbolInterner::new(),
            node_ids: NodeIdGen::new(),
            in_for_header: false,
        }
    }

    // ------------------------------------------------------------------
    // Token stream primitives
    // ------------------------------------------------------------------

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn current_offset(&self) -> Offset {
        self.current().map(|t| t.start).unwrap_or(self.eof_offset)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Checks (without consuming) whether the next token is exactly
    /// `literal`.
    fn peek_literal(&self, literal: &str) -> bool {
        self.current().map(|t| t.literal == literal).unwrap_or(false)
    }

    /// Checks (without consuming) whether the next token has `kind`.
    fn peek_kind(&self, kind: TokenKind) -> bool {
        self.current().map(|t| t.kind == kind).unwrap_or(false)
    }

    /// Consumes the next token if it is exactly `literal`.
    fn match_literal(&mut self, literal: &str) -> bool {
        if self.peek_literal(literal) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_literal(&mut self, literal: &str) -> Result<Token, ParseError> {
        if self.peek_literal(literal) {
            Ok(self.advance().unwrap())
        } else {
            Err(self.error(format!("expected '{literal}'")))
        }
    }

    fn expect_kind(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.peek_kind(kind) {
            Ok(self.advance().unwrap())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.current_offset())
    }

    fn intern(&mut self, text: &str) -> Symbol {
        self.interner.intern(text)
    }

    // ------------------------------------------------------------------
    // source := (field | method)*
    // ------------------------------------------------------------------

    pub fn parse_source(&mut self) -> Result<Source, ParseError> {
        let mut fields = Vec::new();
        let mut methods = Vec::new();

        while !self.is_at_end() {
            if self.peek_literal("DEF") {
                methods.push(self.parse_method()?);
            } else if self.peek_literal("LET") {
                fields.push(self.parse_field()?);
            } else {
                return Err(self.error("expected a field (LET) or method (DEF) declaration"));
            }
        }

        log::debug!("parsed {} fields, {} methods", fields.len(), methods.len());
        Ok(Source { fields, methods })
    }

    /// `field := "LET" ["CONST"] IDENT ":" IDENT ["=" expr] ";"`
    fn parse_field(&mut self) -> Result<Field, ParseError> {
        let id = self.node_ids.next_id();
        self.expect_literal("LET")?;
        let constant = self.match_literal("CONST");
        let name_tok = self.expect_kind(TokenKind::Identifier, "a field name")?;
        let name = self.intern(&name_tok.literal);
        self.expect_literal(":")?;
        let type_tok = self.expect_kind(TokenKind::Identifier, "a type name")?;
        let type_name = self.intern(&type_tok.literal);
        let initializer = if self.match_literal("=") { Some(self.expr()?) } else { None };
        self.expect_literal(";")?;
        Ok(Field { name, type_name, constant, initializer, id })
    }

    /// `method := "DEF" IDENT "(" [IDENT ":" IDENT ("," IDENT ":" IDENT)*] ")"
    ///            [":" IDENT] "DO" statement* "END"`
    fn parse_method(&mut self) -> Result<Method, ParseError> {
        let id = self.node_ids.next_id();
        self.expect_literal("DEF")?;
        let name_tok = self.expect_kind(TokenKind::Identifier, "a method name")?;
        let name = self.intern(&name_tok.literal);

        self.expect_literal("(")?;
        let mut params = Vec::new();
        if !self.peek_literal(")") {
            loop {
                let param_name = self.expect_kind(TokenKind::Identifier, "a parameter name")?;
                let param_name = self.intern(&param_name.literal);
                self.expect_literal(":")?;
                let param_type = self.expect_kind(TokenKind::Identifier, "a parameter type")?;
                let param_type = self.intern(&param_type.literal);
                params.push(Param { name: param_name, type_name: param_type });
                if !self.match_literal(",") {
                    break;
                }
            }
        }
        self.expect_literal(")")?;

        let return_type = if self.match_literal(":") {
            let tok = self.expect_kind(TokenKind::Identifier, "a return type name")?;
            Some(self.intern(&tok.literal))
        } else {
            None
        };

        self.expect_literal("DO")?;
        let body = self.statements_until(&["END"])?;
        self.expect_literal("END")?;

        log::debug!("parsed method with {} parameters", params.len());
        Ok(Method { name, params, return_type, body, id })
    }

    /// Parses statements until the next token is one of `terminators`
    /// (not consumed).
    fn statements_until(&mut self, terminators: &[&str]) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        while !self.is_at_end() && !terminators.iter().any(|t| self.peek_literal(t)) {
            stmts.push(self.statement()?);
        }
        Ok(stmts)
    }

    // ------------------------------------------------------------------
    // statement := decl | if | for | while | return | exprOrAssign
    // ------------------------------------------------------------------

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.peek_literal("LET") {
            self.decl_stmt()
        } else if self.peek_literal("IF") {
            self.if_stmt()
        } else if self.peek_literal("FOR") {
            self.for_stmt()
        } else if self.peek_literal("WHILE") {
            self.while_stmt()
        } else if self.peek_literal("RETURN") {
            self.return_stmt()
        } else {
            self.expr_or_assign_stmt(true)
        }
    }

    /// `decl := "LET" IDENT [":" IDENT] ["=" expr] ";"`
    fn decl_stmt(&mut self) -> Result<Stmt, ParseError> {
        let id = self.node_ids.next_id();
        self.expect_literal("LET")?;
        let name_tok = self.expect_kind(TokenKind::Identifier, "a variable name")?;
        let name = self.intern(&name_tok.literal);
        let type_name = if self.match_literal(":") {
            let tok = self.expect_kind(TokenKind::Identifier, "a type name")?;
            Some(self.intern(&tok.literal))
        } else {
            None
        };
        let value = if self.match_literal("=") { Some(self.expr()?) } else { None };
        self.expect_literal(";")?;
        Ok(Stmt::Decl { name, type_name, value, id })
    }

    /// `if := "IF" expr "DO" statement* ["ELSE" statement*] "END"`
    fn if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let id = self.node_ids.next_id();
        self.expect_literal("IF")?;
        let cond = self.expr()?;
        self.expect_literal("DO")?;
        let then_branch = self.statements_until(&["ELSE", "END"])?;
        let else_branch = if self.match_literal("ELSE") {
            self.statements_until(&["END"])?
        } else {
            Vec::new()
        };
        self.expect_literal("END")?;
        Ok(Stmt::If { cond, then_branch, else_branch, id })
    }

    /// `for := "FOR" "(" [exprOrAssign] ";" [expr] ";" [exprOrAssign] ")"
    ///         "DO" statement* "END"`
    fn for_stmt(&mut self) -> Result<Stmt, ParseError> {
        let id = self.node_ids.next_id();
        self.expect_literal("FOR")?;
        self.expect_literal("(")?;

        self.in_for_header = true;
        let init = if self.peek_literal(";") {
            None
        } else {
            Some(Box::new(self.expr_or_assign_stmt(false)?))
        };
        self.expect_literal(";")?;

        let cond = if self.peek_literal(";") { None } else { Some(self.expr()?) };
        self.expect_literal(";")?;

        let increment = if self.peek_literal(")") {
            None
        } else {
            Some(Box::new(self.expr_or_assign_stmt(false)?))
        };
        self.in_for_header = false;
        self.expect_literal(")")?;

        self.expect_literal("DO")?;
        let body = self.statements_until(&["END"])?;
        self.expect_literal("END")?;

        Ok(Stmt::For { init, cond, increment, body, id })
    }

    /// `while := "WHILE" expr "DO" statement* "END"`
    fn while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let id = self.node_ids.next_id();
        self.expect_literal("WHILE")?;
        let cond = self.expr()?;
        self.expect_literal("DO")?;
        let body = self.statements_until(&["END"])?;
        self.expect_literal("END")?;
        Ok(Stmt::While { cond, body, id })
    }

    /// `return := "RETURN" expr ";"`
    fn return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let id = self.node_ids.next_id();
        self.expect_literal("RETURN")?;
        let value = self.expr()?;
        self.expect_literal(";")?;
        Ok(Stmt::Return { value, id })
    }

    /// `exprOrAssign := expr ["=" expr] ";"`
    ///
    /// When `require_semicolon` is false (parsing a `for(...)` header
    /// clause) the trailing `;` is left for the caller to consume as
    /// part of the `for` grammar's own separators.
    fn expr_or_assign_stmt(&mut self, require_semicolon: bool) -> Result<Stmt, ParseError> {
        let id = self.node_ids.next_id();
        let expr = self.expr()?;
        let stmt = if self.match_literal("=") {
            let value = self.expr()?;
            Stmt::Assign { receiver: expr, value, id }
        } else {
            Stmt::Expr(expr)
        };
        if require_semicolon {
            self.expect_literal(";")?;
        }
        Ok(stmt)
    }

    // ------------------------------------------------------------------
    // Expressions, precedence lowest to highest.
    // ------------------------------------------------------------------

    fn expr(&mut self) -> Result<Expr, ParseError> {
        self.logical()
    }

    /// `logical := comparison (("&&"|"||") comparison)*`
    fn logical(&mut self) -> Result<Expr, ParseError> {
        self.left_fold(&["&&", "||"], Self::comparison)
    }

    /// `comparison := additive (("<"|"<="|">"|">="|"=="|"!=") additive)*`
    fn comparison(&mut self) -> Result<Expr, ParseError> {
        self.left_fold(&["<", "<=", ">", ">=", "==", "!="], Self::additive)
    }

    /// `additive := multiplicative (("+"|"-") multiplicative)*`
    fn additive(&mut self) -> Result<Expr, ParseError> {
        self.left_fold(&["+", "-"], Self::multiplicative)
    }

    /// `multiplicative := secondary (("*"|"/") secondary)*`
    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.left_fold(&["*", "/"], Self::secondary)
    }

    /// Shared left-associative binary-operator loop: all four binary
    /// levels are this same iterative shape, kept as one helper so the
    /// recursion depth of a long operator chain is O(1) rather than
    /// O(n).
    fn left_fold(
        &mut self,
        operators: &[&str],
        mut operand: impl FnMut(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let mut left = operand(self)?;
        loop {
            let matched = operators.iter().find(|op| self.peek_literal(op));
            let Some(op_literal) = matched else { break };
            let op = BinOp::from_literal(op_literal).expect("operator table is exhaustive");
            self.advance();
            let right = operand(self)?;
            let id = self.node_ids.next_id();
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right), id };
        }
        Ok(left)
    }

    /// `secondary := primary ("." IDENT ["(" [expr ("," expr)*] ")"])*`
    fn secondary(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        while self.match_literal(".") {
            let name_tok = self.expect_kind(TokenKind::Identifier, "a member name")?;
            let name = self.intern(&name_tok.literal);
            let id = self.node_ids.next_id();
            if self.match_literal("(") {
                let args = self.argument_list()?;
                self.expect_literal(")")?;
                expr = Expr::Call { receiver: Some(Box::new(expr)), name, args, id };
            } else {
                expr = Expr::Access { receiver: Some(Box::new(expr)), name, id };
            }
        }
        Ok(expr)
    }

    /// `[expr ("," expr)*]` — no trailing comma permitted: after a
    /// comma, another expression is mandatory.
    fn argument_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.peek_literal(")") {
            return Ok(args);
        }
        args.push(self.expr()?);
        while self.match_literal(",") {
            args.push(self.expr()?);
        }
        Ok(args)
    }

    /// `primary := "NIL" | "TRUE" | "FALSE" | INTEGER | DECIMAL
    ///           | CHARACTER | STRING | "(" expr ")" | IDENT ["(" [args] ")"]`
    fn primary(&mut self) -> Result<Expr, ParseError> {
        let id = self.node_ids.next_id();

        if self.match_literal("NIL") {
            return Ok(Expr::Literal { value: Literal::Nil, id });
        }
        if self.match_literal("TRUE") {
            return Ok(Expr::Literal { value: Literal::Bool(true), id });
        }
        if self.match_literal("FALSE") {
            return Ok(Expr::Literal { value: Literal::Bool(false), id });
        }
        if self.peek_kind(TokenKind::Integer) {
            let tok = self.advance().unwrap();
            let value = parse_bigint(&tok.literal).map_err(|e| ParseError::new(e, tok.start))?;
            return Ok(Expr::Literal { value: Literal::Int(value), id });
        }
        if self.peek_kind(TokenKind::Decimal) {
            let tok = self.advance().unwrap();
            let value = parse_bigdecimal(&tok.literal).map_err(|e| ParseError::new(e, tok.start))?;
            return Ok(Expr::Literal { value: Literal::Decimal(value), id });
        }
        if self.peek_kind(TokenKind::Character) {
            let tok = self.advance().unwrap();
            let body = &tok.literal[1..tok.literal.len() - 1];
            let decoded = decode_escapes(body);
            let c = decoded.chars().next().expect("lexer guarantees exactly one character");
            return Ok(Expr::Literal { value: Literal::Char(c), id });
        }
        if self.peek_kind(TokenKind::String) {
            let tok = self.advance().unwrap();
            let body = &tok.literal[1..tok.literal.len() - 1];
            return Ok(Expr::Literal { value: Literal::Str(decode_escapes(body)), id });
        }
        if self.match_literal("(") {
            let inner = self.expr()?;
            self.expect_literal(")")?;
            return Ok(Expr::Group { inner: Box::new(inner), id });
        }
        if self.peek_kind(TokenKind::Identifier) {
            let tok = self.advance().unwrap();
            let name = self.intern(&tok.literal);
            if self.match_literal("(") {
                let args = self.argument_list()?;
                self.expect_literal(")")?;
                return Ok(Expr::Call { receiver: None, name, args, id });
            }
            return Ok(Expr::Access { receiver: None, name, id });
        }

        Err(self.error("expected an expression"))
    }
}

fn parse_bigint(literal: &str) -> Result<BigInt, String> {
    let normalized = literal.strip_prefix('+').unwrap_or(literal);
    BigInt::from_str(normalized).map_err(|e| format!("invalid integer literal '{literal}': {e}"))
}

fn parse_bigdecimal(literal: &str) -> Result<BigDecimal, String> {
    let normalized = literal.strip_prefix('+').unwrap_or(literal);
    BigDecimal::from_str(normalized).map_err(|e| format!("invalid decimal literal '{literal}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> ParsedProgram {
        parse(source).unwrap_or_else(|e| panic!("expected {source:?} to parse, got {e}"))
    }

    #[test]
    fn field_with_initializer() {
        let program = parse_ok("LET x: Integer = 5;");
        assert_eq!(program.source.fields.len(), 1);
        assert_eq!(program.interner.resolve(program.source.fields[0].name), "x");
    }

    #[test]
    fn const_field_sets_the_flag() {
        let program = parse_ok("LET CONST x: Integer = 1;");
        assert!(program.source.fields[0].constant);
    }

    #[test]
    fn const_outside_a_field_is_not_a_reserved_word() {
        // CONST is only meaningful directly after LET in a field;
        // elsewhere it is an ordinary identifier.
        let program = parse_ok("DEF main(): Integer DO LET const: Integer = 1; RETURN const; END");
        assert_eq!(program.source.methods.len(), 1);
    }

    #[test]
    fn method_precedence_respects_grammar() {
        let program = parse_ok("DEF main(): Integer DO RETURN 1 + 2 * 3; END");
        assert_eq!(program.source.methods.len(), 1);
        match &program.source.methods[0].body[0] {
            Stmt::Return { value, .. } => match value {
                Expr::Binary { op: BinOp::Add, right, .. } => {
                    assert!(matches!(**right, Expr::Binary { op: BinOp::Mul, .. }));
                }
                other => panic!("expected a Binary Add at the top, got {other:?}"),
            },
            other => panic!("expected Return, got {other:?}"),
        }
    }

    #[test]
    fn for_header_does_not_require_its_own_semicolons() {
        parse_ok("DEF main(): Integer DO LET i = 0; FOR (i = 0; i < 3; i = i + 1) DO END RETURN 0; END");
    }

    #[test]
    fn missing_semicolon_fails() {
        assert!(parse("LET x: Integer = 5").is_err());
    }

    #[test]
    fn missing_end_fails() {
        assert!(parse("DEF main(): Integer DO RETURN 0; ").is_err());
    }

    #[test]
    fn trailing_comma_in_arguments_fails() {
        assert!(parse("DEF main(): Integer DO RETURN f(1, 2,); END").is_err());
    }

    #[test]
    fn empty_parenthesized_expression_fails() {
        assert!(parse("DEF main(): Integer DO RETURN (); END").is_err());
    }

    #[test]
    fn member_call_chains_parse_left_associatively() {
        let program = parse_ok("DEF main(): Integer DO RETURN a.b.c(); END");
        match &program.source.methods[0].body[0] {
            Stmt::Return { value: Expr::Call { receiver, .. }, .. } => {
                assert!(matches!(receiver.as_ref().unwrap().as_ref(), Expr::Access { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
