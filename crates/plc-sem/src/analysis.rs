//! The Analyzer: name resolution, type attachment, and semantic rule
//! enforcement over a parsed [`Source`].

use rustc_hash::FxHashMap;

use plc_par::{BinOp, Expr, Field, Literal, Method, ParsedProgram, Stmt};
use plc_util::{DefId, NodeId, SemanticError, Symbol, SymbolInterner};

use crate::def::{Function, Variable};
use crate::scope::{RibKind, ScopeTree};
use crate::symbol_table::SymbolTable;
use crate::types::{is_assignable, lookup_type_name, Type};

/// Everything the Analyzer produced: the symbol table every [`DefId`]
/// indexes into, the resolved type of every expression node, and the
/// resolved definition of every name-bearing node.
pub struct Analyzed {
    pub symbols: SymbolTable,
    pub types: FxHashMap<NodeId, Type>,
    pub refs: FxHashMap<NodeId, DefId>,
}

impl Analyzed {
    pub fn type_of(&self, id: NodeId) -> Type {
        *self.types.get(&id).expect("expression node has no resolved type after analysis")
    }

    pub fn ref_of(&self, id: NodeId) -> DefId {
        *self.refs.get(&id).expect("node has no resolved reference after analysis")
    }
}

/// Runs the Analyzer over a parsed program, producing [`Analyzed`] or
/// the first semantic error encountered.
pub fn analyze(program: &ParsedProgram) -> Result<Analyzed, SemanticError> {
    let mut analyzer = Analyzer::new(&program.interner);
    analyzer.run(program)
}

struct Analyzer<'a> {
    interner: &'a SymbolInterner,
    scope: ScopeTree,
    symbols: SymbolTable,
    types: FxHashMap<NodeId, Type>,
    refs: FxHashMap<NodeId, DefId>,
    /// The declared return type of the method currently being analyzed.
    /// `None` outside any method body, which is when a `RETURN`
    /// statement is illegal.
    current_return: Option<Type>,
}

impl<'a> Analyzer<'a> {
    fn new(interner: &'a SymbolInterner) -> Self {
        Self {
            interner,
            scope: ScopeTree::new(),
            symbols: SymbolTable::new(),
            types: FxHashMap::default(),
            refs: FxHashMap::default(),
            current_return: None,
        }
    }

    fn name(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    fn resolve_type_name(&self, sym: Symbol) -> Result<Type, SemanticError> {
        lookup_type_name(self.name(sym))
            .ok_or_else(|| SemanticError::new(format!("unknown type `{}`", self.name(sym))))
    }

    fn run(&mut self, program: &ParsedProgram) -> Result<Analyzed, SemanticError> {
        self.register_print_builtin();

        for method in &program.source.methods {
            self.register_method_signature(method)?;
        }
        self.check_main_exists()?;

        for field in &program.source.fields {
            self.analyze_field(field)?;
        }
        for method in &program.source.methods {
            self.analyze_method_body(method)?;
        }

        Ok(Analyzed {
            symbols: std::mem::take(&mut self.symbols),
            types: std::mem::take(&mut self.types),
            refs: std::mem::take(&mut self.refs),
        })
    }

    fn register_print_builtin(&mut self) {
        let def_id = self.symbols.push_function(Function {
            name: Symbol::PRINT,
            target_name: "print".to_string(),
            param_types: vec![Type::Any],
            return_type: Type::Nil,
            builtin: true,
        });
        self.scope.define_function(Symbol::PRINT, 1, def_id);
    }

    fn register_method_signature(&mut self, method: &Method) -> Result<(), SemanticError> {
        let mut param_types = Vec::with_capacity(method.params.len());
        for param in &method.params {
            param_types.push(self.resolve_type_name(param.type_name)?);
        }
        let return_type = match method.return_type {
            Some(sym) => self.resolve_type_name(sym)?,
            None => Type::Nil,
        };
        let def_id = self.symbols.push_function(Function {
            name: method.name,
            target_name: self.name(method.name).to_string(),
            param_types,
            return_type,
            builtin: false,
        });
        self.scope.define_function(method.name, method.params.len(), def_id);
        self.refs.insert(method.id, def_id);
        Ok(())
    }

    fn check_main_exists(&self) -> Result<(), SemanticError> {
        let main_id = self
            .scope
            .resolve_function(Symbol::MAIN, 0)
            .ok_or_else(|| SemanticError::new("program must define a method `main` of arity 0"))?;
        let main = self.symbols.function(main_id);
        if main.return_type != Type::Integer {
            return Err(SemanticError::new("`main` must declare return type Integer"));
        }
        Ok(())
    }

    fn analyze_field(&mut self, field: &Field) -> Result<(), SemanticError> {
        let declared = self.resolve_type_name(field.type_name)?;
        let ty = match &field.initializer {
            Some(expr) => {
                let initializer_ty = self.analyze_expr(expr)?;
                if !is_assignable(declared, initializer_ty) {
                    return Err(SemanticError::new(format!(
                        "field `{}` declared {:?} cannot be initialized from {:?}",
                        self.name(field.name),
                        declared,
                        initializer_ty
                    )));
                }
                declared
            }
            None => declared,
        };
        let def_id = self.symbols.push_variable(Variable {
            name: field.name,
            target_name: self.name(field.name).to_string(),
            ty,
            constant: field.constant,
        });
        self.scope.define_variable(field.name, def_id);
        self.refs.insert(field.id, def_id);
        Ok(())
    }

    fn analyze_method_body(&mut self, method: &Method) -> Result<(), SemanticError> {
        let def_id = self.refs[&method.id];
        let signature = self.symbols.function(def_id).clone();

        self.scope.enter(RibKind::Method);
        for (param, ty) in method.params.iter().zip(signature.param_types.iter().copied()) {
            let param_def = self.symbols.push_variable(Variable {
                name: param.name,
                target_name: self.name(param.name).to_string(),
                ty,
                constant: false,
            });
            self.scope.define_variable(param.name, param_def);
        }

        self.current_return = Some(signature.return_type);
        let result = self.analyze_block(&method.body);
        self.current_return = None;
        self.scope.exit();
        result
    }

    fn analyze_block(&mut self, stmts: &[Stmt]) -> Result<(), SemanticError> {
        for stmt in stmts {
            self.analyze_stmt(stmt)?;
        }
        Ok(())
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::Expr(expr) => {
                if !matches!(expr, Expr::Call { .. }) {
                    return Err(SemanticError::new(
                        "an expression used as a statement must be a function call",
                    ));
                }
                self.analyze_expr(expr)?;
                Ok(())
            }
            Stmt::Decl { name, type_name, value, id } => {
                if type_name.is_none() && value.is_none() {
                    return Err(SemanticError::new(format!(
                        "declaration of `{}` needs a type annotation, an initializer, or both",
                        self.name(*name)
                    )));
                }
                let declared = type_name.map(|sym| self.resolve_type_name(sym)).transpose()?;
                let value_ty = value.as_ref().map(|expr| self.analyze_expr(expr)).transpose()?;
                let ty = match (declared, value_ty) {
                    (Some(declared), Some(value_ty)) => {
                        if !is_assignable(declared, value_ty) {
                            return Err(SemanticError::new(format!(
                                "`{}` declared {:?} cannot be initialized from {:?}",
                                self.name(*name),
                                declared,
                                value_ty
                            )));
                        }
                        declared
                    }
                    (Some(declared), None) => declared,
                    (None, Some(value_ty)) => value_ty,
                    (None, None) => unreachable!("checked above"),
                };
                let def_id = self.symbols.push_variable(Variable {
                    name: *name,
                    target_name: self.name(*name).to_string(),
                    ty,
                    constant: false,
                });
                self.scope.define_variable(*name, def_id);
                self.refs.insert(*id, def_id);
                Ok(())
            }
            Stmt::Assign { receiver, value, .. } => {
                let Expr::Access { .. } = receiver else {
                    return Err(SemanticError::new("assignment target must be a variable or field access"));
                };
                let receiver_ty = self.analyze_expr(receiver)?;
                if let Some(def_id) = self.refs.get(&receiver.id()).copied() {
                    if let Some(var) = self.symbols.get(def_id).as_variable() {
                        if var.constant {
                            return Err(SemanticError::new(format!(
                                "cannot assign to constant `{}`",
                                self.name(var.name)
                            )));
                        }
                    }
                }
                let value_ty = self.analyze_expr(value)?;
                if !is_assignable(receiver_ty, value_ty) {
                    return Err(SemanticError::new(format!(
                        "cannot assign {:?} to a target of type {:?}",
                        value_ty, receiver_ty
                    )));
                }
                Ok(())
            }
            Stmt::If { cond, then_branch, else_branch, .. } => {
                self.require_boolean(cond)?;
                if then_branch.is_empty() {
                    return Err(SemanticError::new("`IF` body must not be empty"));
                }
                self.scope.enter(RibKind::Block);
                let result = self.analyze_block(then_branch);
                self.scope.exit();
                result?;

                if !else_branch.is_empty() {
                    self.scope.enter(RibKind::Block);
                    let result = self.analyze_block(else_branch);
                    self.scope.exit();
                    result?;
                }
                Ok(())
            }
            Stmt::While { cond, body, .. } => {
                self.require_boolean(cond)?;
                if body.is_empty() {
                    return Err(SemanticError::new("`WHILE` body must not be empty"));
                }
                self.scope.enter(RibKind::Block);
                let result = self.analyze_block(body);
                self.scope.exit();
                result
            }
            Stmt::For { init, cond, increment, body, .. } => {
                if let Some(init) = init {
                    self.analyze_stmt(init)?;
                }
                if let Some(cond) = cond {
                    self.require_boolean(cond)?;
                }
                if body.is_empty() {
                    return Err(SemanticError::new("`FOR` body must not be empty"));
                }
                self.scope.enter(RibKind::Block);
                let result = self.analyze_block(body).and_then(|()| {
                    if let Some(increment) = increment {
                        self.analyze_stmt(increment)
                    } else {
                        Ok(())
                    }
                });
                self.scope.exit();
                result
            }
            Stmt::Return { value, .. } => {
                let Some(expected) = self.current_return else {
                    return Err(SemanticError::new("`RETURN` is only valid inside a method body"));
                };
                let value_ty = self.analyze_expr(value)?;
                if !is_assignable(expected, value_ty) {
                    return Err(SemanticError::new(format!(
                        "method returns {:?} but declared return type is {:?}",
                        value_ty, expected
                    )));
                }
                Ok(())
            }
        }
    }

    fn require_boolean(&mut self, expr: &Expr) -> Result<(), SemanticError> {
        let ty = self.analyze_expr(expr)?;
        if ty != Type::Boolean {
            return Err(SemanticError::new(format!("condition must be Boolean, found {ty:?}")));
        }
        Ok(())
    }

    fn analyze_expr(&mut self, expr: &Expr) -> Result<Type, SemanticError> {
        let ty = match expr {
            Expr::Literal { value, .. } => self.analyze_literal(value)?,
            Expr::Group { inner, .. } => {
                if !matches!(inner.as_ref(), Expr::Binary { .. }) {
                    return Err(SemanticError::new("a parenthesized expression must wrap a binary expression"));
                }
                self.analyze_expr(inner)?
            }
            Expr::Binary { op, left, right, .. } => self.analyze_binary(*op, left, right)?,
            Expr::Access { receiver, name, .. } => self.analyze_access(receiver.as_deref(), *name, expr.id())?,
            Expr::Call { receiver, name, args, .. } => {
                self.analyze_call(receiver.as_deref(), *name, args, expr.id())?
            }
        };
        self.types.insert(expr.id(), ty);
        Ok(ty)
    }

    fn analyze_literal(&self, literal: &Literal) -> Result<Type, SemanticError> {
        use num_traits::ToPrimitive;
        Ok(match literal {
            Literal::Nil => Type::Nil,
            Literal::Bool(_) => Type::Boolean,
            Literal::Char(_) => Type::Character,
            Literal::Str(_) => Type::String,
            Literal::Int(value) => {
                if value.to_i32().is_none() {
                    return Err(SemanticError::new(format!(
                        "integer literal {value} is outside the signed 32-bit range"
                    )));
                }
                Type::Integer
            }
            Literal::Decimal(value) => {
                match value.to_f64() {
                    Some(f) if f.is_finite() => Type::Decimal,
                    _ => return Err(SemanticError::new(format!("decimal literal {value} is not representable"))),
                }
            }
        })
    }

    fn analyze_binary(&mut self, op: BinOp, left: &Expr, right: &Expr) -> Result<Type, SemanticError> {
        let left_ty = self.analyze_expr(left)?;
        let right_ty = self.analyze_expr(right)?;
        match op {
            BinOp::And | BinOp::Or => {
                if left_ty != Type::Boolean || right_ty != Type::Boolean {
                    return Err(SemanticError::new(format!(
                        "`{}` requires Boolean operands, found {left_ty:?} and {right_ty:?}",
                        op.as_str()
                    )));
                }
                Ok(Type::Boolean)
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge | BinOp::Eq | BinOp::Ne => {
                if left_ty != right_ty || !left_ty.is_comparable_member() {
                    return Err(SemanticError::new(format!(
                        "`{}` requires two operands of the same comparable type, found {left_ty:?} and {right_ty:?}",
                        op.as_str()
                    )));
                }
                Ok(Type::Boolean)
            }
            BinOp::Add => {
                if left_ty == Type::String || right_ty == Type::String {
                    Ok(Type::String)
                } else if left_ty == Type::Integer && right_ty == Type::Integer {
                    Ok(Type::Integer)
                } else if left_ty == Type::Decimal && right_ty == Type::Decimal {
                    Ok(Type::Decimal)
                } else {
                    Err(SemanticError::new(format!("`+` cannot combine {left_ty:?} and {right_ty:?}")))
                }
            }
            BinOp::Sub | BinOp::Mul | BinOp::Div => {
                if left_ty == Type::Integer && right_ty == Type::Integer {
                    Ok(Type::Integer)
                } else if left_ty == Type::Decimal && right_ty == Type::Decimal {
                    Ok(Type::Decimal)
                } else {
                    Err(SemanticError::new(format!(
                        "`{}` requires two Integer or two Decimal operands, found {left_ty:?} and {right_ty:?}",
                        op.as_str()
                    )))
                }
            }
        }
    }

    fn analyze_access(&mut self, receiver: Option<&Expr>, name: Symbol, id: NodeId) -> Result<Type, SemanticError> {
        match receiver {
            Some(receiver_expr) => {
                let receiver_ty = self.analyze_expr(receiver_expr)?;
                Err(SemanticError::new(format!(
                    "type {receiver_ty:?} has no field `{}`",
                    self.name(name)
                )))
            }
            None => {
                let def_id = self
                    .scope
                    .resolve_variable(name)
                    .ok_or_else(|| SemanticError::new(format!("undefined variable `{}`", self.name(name))))?;
                self.refs.insert(id, def_id);
                Ok(self.symbols.variable(def_id).ty)
            }
        }
    }

    fn analyze_call(
        &mut self,
        receiver: Option<&Expr>,
        name: Symbol,
        args: &[Expr],
        id: NodeId,
    ) -> Result<Type, SemanticError> {
        let mut arg_types = Vec::with_capacity(args.len());
        for arg in args {
            arg_types.push(self.analyze_expr(arg)?);
        }

        if let Some(receiver_expr) = receiver {
            let receiver_ty = self.analyze_expr(receiver_expr)?;
            return Err(SemanticError::new(format!(
                "type {receiver_ty:?} has no method `{}`/{}",
                self.name(name),
                args.len()
            )));
        }

        let def_id = self.scope.resolve_function(name, args.len()).ok_or_else(|| {
            SemanticError::new(format!("undefined function `{}`/{}", self.name(name), args.len()))
        })?;
        let function = self.symbols.function(def_id).clone();
        for (index, (arg_ty, param_ty)) in arg_types.iter().zip(function.param_types.iter()).enumerate() {
            if !is_assignable(*param_ty, *arg_ty) {
                return Err(SemanticError::new(format!(
                    "argument {} to `{}` expects {:?}, found {:?}",
                    index + 1,
                    self.name(name),
                    param_ty,
                    arg_ty
                )));
            }
        }
        self.refs.insert(id, def_id);
        Ok(function.return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze_source(source: &str) -> Result<Analyzed, SemanticError> {
        let program = plc_par::parse(source).expect("source must parse");
        analyze(&program)
    }

    #[test]
    fn missing_main_fails() {
        let err = analyze_source("DEF helper(): Integer DO RETURN 1; END").unwrap_err();
        assert!(err.message.contains("main"));
    }

    #[test]
    fn main_returning_non_integer_fails() {
        let err = analyze_source("DEF main() DO RETURN 1; END").unwrap_err();
        assert!(err.message.contains("Integer"));
    }

    #[test]
    fn scenario_arithmetic_precedence() {
        let analyzed = analyze_source("DEF main(): Integer DO RETURN 1 + 2 * 3; END").unwrap();
        assert_eq!(analyzed.symbols.iter().count(), 2); // print + main
    }

    #[test]
    fn print_call_resolves_the_builtin() {
        analyze_source(r#"DEF main(): Integer DO print("Hello, World!"); RETURN 0; END"#).unwrap();
    }

    #[test]
    fn if_with_empty_body_fails() {
        let err = analyze_source("DEF main(): Integer DO IF TRUE DO END RETURN 0; END").unwrap_err();
        assert!(err.message.contains("IF"));
    }

    #[test]
    fn assignment_to_constant_field_fails() {
        let source = "LET CONST x: Integer = 1; DEF main(): Integer DO x = 2; RETURN x; END";
        let err = analyze_source(source).unwrap_err();
        assert!(err.message.contains("constant"));
    }

    #[test]
    fn integer_literal_outside_i32_range_fails() {
        let err = analyze_source("DEF main(): Integer DO RETURN 99999999999999999999; END").unwrap_err();
        assert!(err.message.contains("32-bit"));
    }

    #[test]
    fn mixing_integer_and_decimal_fails() {
        let err = analyze_source("DEF main(): Integer DO RETURN 1 + 1.0; END").unwrap_err();
        assert!(err.message.contains('+'));
    }

    #[test]
    fn for_loop_scenario_type_checks() {
        let source =
            "DEF main(): Integer DO LET i = 0; FOR (; i < 3; i = i + 1) DO print(i); END RETURN i; END";
        analyze_source(source).unwrap();
    }

    #[test]
    fn return_value_must_be_assignable_to_the_declared_return_type() {
        let err = analyze_source(r#"DEF main(): Integer DO RETURN "nope"; END"#).unwrap_err();
        assert!(err.message.contains("Integer"));
    }

    #[test]
    fn comparable_widening_allows_mixed_comparable_member_checks_only_when_equal() {
        let err = analyze_source("DEF main(): Integer DO RETURN 1 < 1.0; END").unwrap_err();
        assert!(err.message.contains('<'));
    }
}
