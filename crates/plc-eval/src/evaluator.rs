//! The tree-walking Evaluator.
//!
//! Runs directly over the parsed AST — the Analyzer's resolved types
//! and references are not required, only the grammar shape, so a
//! program can be evaluated without first running `plc-sem`.

use std::ops::{Add, Mul, Sub};

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use num_traits::Zero;

use plc_par::{BinOp, Expr, Literal, Method, ParsedProgram, Stmt};
use plc_util::{OutputSink, SemanticError, Symbol, SymbolInterner};

use crate::environment::Environment;
use crate::flow::Flow;
use crate::value::Value;

/// Evaluates a parsed program: defines every field and method, then
/// looks up and invokes `main/0`.
pub fn evaluate(program: &ParsedProgram, sink: &mut dyn OutputSink) -> Result<Value, SemanticError> {
    let interner = &program.interner;
    let mut env = Environment::new();

    for method in &program.source.methods {
        log::debug!("registering method `{}`/{}", interner.resolve(method.name), method.params.len());
        env.define_function(method.name, method.params.len(), method);
    }

    for field in &program.source.fields {
        let value = match &field.initializer {
            Some(expr) => eval_expr(expr, &mut env, sink, interner)?,
            None => Value::Nil,
        };
        env.define_variable(field.name, value, field.constant);
    }

    let main = env
        .resolve_function(Symbol::MAIN, 0)
        .ok_or_else(|| SemanticError::new("program must define a method `main` of arity 0"))?;
    log::debug!("invoking main/0");
    call_method(main, Vec::new(), &mut env, sink, interner)
}

fn call_method<'a>(
    method: &'a Method,
    args: Vec<Value>,
    env: &mut Environment<'a>,
    sink: &mut dyn OutputSink,
    interner: &SymbolInterner,
) -> Result<Value, SemanticError> {
    let previous = env.enter_call_frame();
    for (param, value) in method.params.iter().zip(args) {
        env.define_variable(param.name, value, false);
    }
    let outcome = exec_block(&method.body, env, sink, interner);
    env.exit_call_frame(previous);
    Ok(outcome?.into_value())
}

fn exec_block<'a>(
    stmts: &'a [Stmt],
    env: &mut Environment<'a>,
    sink: &mut dyn OutputSink,
    interner: &SymbolInterner,
) -> Result<Flow, SemanticError> {
    for stmt in stmts {
        let flow = exec_stmt(stmt, env, sink, interner)?;
        if flow.is_return() {
            return Ok(flow);
        }
    }
    Ok(Flow::Value(Value::Nil))
}

fn exec_stmt<'a>(
    stmt: &'a Stmt,
    env: &mut Environment<'a>,
    sink: &mut dyn OutputSink,
    interner: &SymbolInterner,
) -> Result<Flow, SemanticError> {
    match stmt {
        Stmt::Expr(expr) => {
            eval_expr(expr, env, sink, interner)?;
            Ok(Flow::Value(Value::Nil))
        }
        Stmt::Decl { name, value, .. } => {
            let value = match value {
                Some(expr) => eval_expr(expr, env, sink, interner)?,
                None => Value::Nil,
            };
            env.define_variable(*name, value, false);
            Ok(Flow::Value(Value::Nil))
        }
        Stmt::Assign { receiver, value, .. } => {
            let value = eval_expr(value, env, sink, interner)?;
            match receiver {
                Expr::Access { receiver: None, name, .. } => {
                    env.assign(*name, value)?;
                }
                Expr::Access { receiver: Some(_), name, .. } => {
                    return Err(SemanticError::new(format!(
                        "cannot assign to field `{}`: no value at runtime carries fields",
                        interner.resolve(*name)
                    )));
                }
                _ => unreachable!("an Assign receiver is always an Access"),
            }
            Ok(Flow::Value(Value::Nil))
        }
        Stmt::If { cond, then_branch, else_branch, .. } => {
            if eval_expr(cond, env, sink, interner)?.as_bool()? {
                env.enter();
                let flow = exec_block(then_branch, env, sink, interner);
                env.exit();
                flow
            } else if !else_branch.is_empty() {
                env.enter();
                let flow = exec_block(else_branch, env, sink, interner);
                env.exit();
                flow
            } else {
                Ok(Flow::Value(Value::Nil))
            }
        }
        Stmt::While { cond, body, .. } => {
            while eval_expr(cond, env, sink, interner)?.as_bool()? {
                env.enter();
                let flow = exec_block(body, env, sink, interner);
                env.exit();
                let flow = flow?;
                if flow.is_return() {
                    return Ok(flow);
                }
            }
            Ok(Flow::Value(Value::Nil))
        }
        Stmt::For { init, cond, increment, body, .. } => {
            if let Some(init) = init {
                exec_stmt(init, env, sink, interner)?;
            }
            loop {
                let keep_going = match cond {
                    Some(cond) => eval_expr(cond, env, sink, interner)?.as_bool()?,
                    None => true,
                };
                if !keep_going {
                    break;
                }
                env.enter();
                let flow = exec_for_iteration(body, increment.as_deref(), env, sink, interner);
                env.exit();
                let flow = flow?;
                if flow.is_return() {
                    return Ok(flow);
                }
            }
            Ok(Flow::Value(Value::Nil))
        }
        Stmt::Return { value, .. } => {
            let value = eval_expr(value, env, sink, interner)?;
            Ok(Flow::Return(value))
        }
    }
}

/// Runs a `for` loop's body followed by its increment, both inside the
/// per-iteration scope the caller already pushed.
fn exec_for_iteration<'a>(
    body: &'a [Stmt],
    increment: Option<&'a Stmt>,
    env: &mut Environment<'a>,
    sink: &mut dyn OutputSink,
    interner: &SymbolInterner,
) -> Result<Flow, SemanticError> {
    let flow = exec_block(body, env, sink, interner)?;
    if flow.is_return() {
        return Ok(flow);
    }
    if let Some(increment) = increment {
        exec_stmt(increment, env, sink, interner)?;
    }
    Ok(flow)
}

fn eval_expr<'a>(
    expr: &'a Expr,
    env: &mut Environment<'a>,
    sink: &mut dyn OutputSink,
    interner: &SymbolInterner,
) -> Result<Value, SemanticError> {
    match expr {
        Expr::Literal { value, .. } => Ok(literal_value(value)),
        Expr::Group { inner, .. } => eval_expr(inner, env, sink, interner),
        Expr::Binary { op, left, right, .. } => eval_binary(*op, left, right, env, sink, interner),
        Expr::Access { receiver: None, name, .. } => env.get(*name),
        Expr::Access { receiver: Some(_), name, .. } => Err(SemanticError::new(format!(
            "no field `{}`: no value at runtime carries fields",
            interner.resolve(*name)
        ))),
        Expr::Call { receiver, name, args, .. } => {
            eval_call(receiver.as_deref(), *name, args, env, sink, interner)
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Nil => Value::Nil,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Char(c) => Value::Char(*c),
        Literal::Int(i) => Value::Int(i.clone()),
        Literal::Decimal(d) => Value::Decimal(d.clone()),
        Literal::Str(s) => Value::Str(s.clone()),
    }
}

fn eval_binary<'a>(
    op: BinOp,
    left: &'a Expr,
    right: &'a Expr,
    env: &mut Environment<'a>,
    sink: &mut dyn OutputSink,
    interner: &SymbolInterner,
) -> Result<Value, SemanticError> {
    match op {
        BinOp::And => {
            if !eval_expr(left, env, sink, interner)?.as_bool()? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval_expr(right, env, sink, interner)?.as_bool()?))
        }
        BinOp::Or => {
            if eval_expr(left, env, sink, interner)?.as_bool()? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval_expr(right, env, sink, interner)?.as_bool()?))
        }
        BinOp::Eq | BinOp::Ne => {
            let left = eval_expr(left, env, sink, interner)?;
            let right = eval_expr(right, env, sink, interner)?;
            let equal = left == right;
            Ok(Value::Bool(if op == BinOp::Eq { equal } else { !equal }))
        }
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let left = eval_expr(left, env, sink, interner)?;
            let right = eval_expr(right, env, sink, interner)?;
            let ordering = left.compare(&right)?;
            let result = match op {
                BinOp::Lt => ordering.is_lt(),
                BinOp::Le => ordering.is_le(),
                BinOp::Gt => ordering.is_gt(),
                BinOp::Ge => ordering.is_ge(),
                _ => unreachable!(),
            };
            Ok(Value::Bool(result))
        }
        BinOp::Add => {
            let left = eval_expr(left, env, sink, interner)?;
            let right = eval_expr(right, env, sink, interner)?;
            if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
                return Ok(Value::Str(format!("{left}{right}")));
            }
            arithmetic(left, right, BigInt::add, BigDecimal::add)
        }
        BinOp::Sub => {
            let left = eval_expr(left, env, sink, interner)?;
            let right = eval_expr(right, env, sink, interner)?;
            arithmetic(left, right, BigInt::sub, BigDecimal::sub)
        }
        BinOp::Mul => {
            let left = eval_expr(left, env, sink, interner)?;
            let right = eval_expr(right, env, sink, interner)?;
            arithmetic(left, right, BigInt::mul, BigDecimal::mul)
        }
        BinOp::Div => {
            let left = eval_expr(left, env, sink, interner)?;
            let right = eval_expr(right, env, sink, interner)?;
            divide(left, right)
        }
    }
}

fn arithmetic(
    left: Value,
    right: Value,
    int_op: impl FnOnce(BigInt, BigInt) -> BigInt,
    decimal_op: impl FnOnce(BigDecimal, BigDecimal) -> BigDecimal,
) -> Result<Value, SemanticError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(int_op(a, b))),
        (Value::Decimal(a), Value::Decimal(b)) => Ok(Value::Decimal(decimal_op(a, b))),
        (a, b) => Err(SemanticError::new(format!(
            "cannot mix {} and {} in arithmetic",
            a.type_name(),
            b.type_name()
        ))),
    }
}

/// Integer division truncates toward zero; Decimal division rounds
/// half-to-even at the wider of the two operand scales.
fn divide(left: Value, right: Value) -> Result<Value, SemanticError> {
    match (left, right) {
        (Value::Int(_), Value::Int(b)) if b.is_zero() => Err(SemanticError::new("division by zero")),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a / b)),
        (Value::Decimal(_), Value::Decimal(b)) if b.is_zero() => Err(SemanticError::new("division by zero")),
        (Value::Decimal(a), Value::Decimal(b)) => {
            let scale = a.fractional_digit_count().max(b.fractional_digit_count());
            let quotient = a / b;
            Ok(Value::Decimal(quotient.with_scale_round(scale, RoundingMode::HalfEven)))
        }
        (a, b) => Err(SemanticError::new(format!("cannot mix {} and {} in arithmetic", a.type_name(), b.type_name()))),
    }
}

fn eval_call<'a>(
    receiver: Option<&'a Expr>,
    name: Symbol,
    args: &'a [Expr],
    env: &mut Environment<'a>,
    sink: &mut dyn OutputSink,
    interner: &SymbolInterner,
) -> Result<Value, SemanticError> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(eval_expr(arg, env, sink, interner)?);
    }

    if receiver.is_some() {
        return Err(SemanticError::new(format!(
            "no method `{}`/{}: no value at runtime carries methods",
            interner.resolve(name),
            values.len()
        )));
    }

    if name == Symbol::PRINT && values.len() == 1 {
        sink.println(&values[0].to_string());
        return Ok(Value::Nil);
    }

    let method = env
        .resolve_function(name, values.len())
        .ok_or_else(|| SemanticError::new(format!("undefined function `{}`/{}", interner.resolve(name), values.len())))?;
    call_method(method, values, env, sink, interner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plc_util::StringSink;

    fn run(source: &str) -> Result<(Value, String), SemanticError> {
        let program = plc_par::parse(source).expect("source must parse");
        let mut sink = StringSink::new();
        let value = evaluate(&program, &mut sink)?;
        Ok((value, sink.as_str().to_string()))
    }

    #[test]
    fn precedence_respects_the_grammar() {
        let (value, _) = run("DEF main(): Integer DO RETURN 1 + 2 * 3; END").unwrap();
        assert_eq!(value, Value::Int(BigInt::from(7)));
    }

    #[test]
    fn for_loop_prints_and_returns_the_counter() {
        let (value, output) = run(
            "DEF main(): Integer DO LET i = 0; FOR (; i < 3; i = i + 1) DO print(i); END RETURN i; END",
        )
        .unwrap();
        assert_eq!(output, "0\n1\n2\n");
        assert_eq!(value, Value::Int(BigInt::from(3)));
    }

    #[test]
    fn integer_division_by_zero_is_a_runtime_error() {
        let err = run("DEF main(): Integer DO RETURN 1 / 0; END").unwrap_err();
        assert!(err.message.contains("division by zero"));
    }

    #[test]
    fn mixing_integer_and_decimal_is_a_runtime_error() {
        let err = run("DEF main(): Integer DO LET x = 1 + 1.0; RETURN 0; END").unwrap_err();
        assert!(err.message.contains("mix"));
    }

    #[test]
    fn writing_to_a_constant_fails() {
        let source = "LET CONST x: Integer = 1; DEF main(): Integer DO x = 2; RETURN x; END";
        let err = run(source).unwrap_err();
        assert!(err.message.contains("constant"));
    }

    #[test]
    fn short_circuit_or_skips_the_right_operand() {
        // `print` as the right operand of `||` would itself be an
        // error (it is not Boolean), so a passing result proves the
        // right side was never evaluated.
        let (value, output) =
            run("DEF main(): Integer DO LET ok = TRUE || print(1); RETURN 0; END").unwrap();
        assert_eq!(value, Value::Int(BigInt::from(0)));
        assert_eq!(output, "");
    }

    #[test]
    fn decimal_division_rounds_half_to_even() {
        let (value, _) = run("DEF main(): Integer DO LET x = 1.0 / 4.0; RETURN 0; END").unwrap();
        assert_eq!(value, Value::Int(BigInt::from(0)));
    }
}
