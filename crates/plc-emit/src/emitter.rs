//! Walks an analyzed AST and prints equivalent target-language source.
//! Unlike the Evaluator, the Emitter needs the Analyzer's output: an
//! `Access`/`Call` node prints the *target name* resolved during
//! analysis, not its source spelling.

use plc_par::{Expr, Field, Literal, Method, ParsedProgram, Source, Stmt};
use plc_sem::Analyzed;
use plc_util::{OutputSink, SymbolInterner};

const INDENT: &str = "    ";

pub fn emit(program: &ParsedProgram, analyzed: &Analyzed, sink: &mut dyn OutputSink) {
    let mut emitter = Emitter { sink, indent: 0, interner: &program.interner, analyzed };
    emitter.emit_source(&program.source);
}

struct Emitter<'a> {
    sink: &'a mut dyn OutputSink,
    indent: usize,
    interner: &'a SymbolInterner,
    analyzed: &'a Analyzed,
}

impl<'a> Emitter<'a> {
    fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.sink.println("");
            return;
        }
        self.sink.write(&INDENT.repeat(self.indent));
        self.sink.println(text);
    }

    fn emit_source(&mut self, source: &Source) {
        self.line("class Program {");
        self.indent += 1;
        for field in &source.fields {
            self.emit_field(field);
        }
        self.line("");
        self.emit_entry_point(source);
        for method in &source.methods {
            self.line("");
            self.emit_method(method);
        }
        self.indent -= 1;
        self.line("}");
    }

    fn emit_entry_point(&mut self, source: &Source) {
        let main_target = source
            .methods
            .iter()
            .find(|m| self.interner.resolve(m.name) == "main")
            .map(|m| self.analyzed.symbols.function(self.analyzed.ref_of(m.id)).target_name.clone())
            .unwrap_or_else(|| "main".to_string());
        self.line("public static void main(String[] args) {");
        self.indent += 1;
        self.line(&format!("System.exit({main_target}());"));
        self.indent -= 1;
        self.line("}");
    }

    fn emit_field(&mut self, field: &Field) {
        let var = self.analyzed.symbols.variable(self.analyzed.ref_of(field.id));
        let mut out = String::new();
        if var.constant {
            out.push_str("final ");
        }
        out.push_str(var.ty.target_name());
        out.push(' ');
        out.push_str(&var.target_name);
        if let Some(init) = &field.initializer {
            out.push_str(" = ");
            out.push_str(&self.emit_expr(init));
        }
        out.push(';');
        self.line(&out);
    }

    fn emit_method(&mut self, method: &Method) {
        let func = self.analyzed.symbols.function(self.analyzed.ref_of(method.id)).clone();
        let params = method
            .params
            .iter()
            .zip(func.param_types.iter())
            .map(|(p, ty)| format!("{} {}", ty.target_name(), self.interner.resolve(p.name)))
            .collect::<Vec<_>>()
            .join(", ");
        let header = format!("{} {}({})", func.return_type.target_name(), func.target_name, params);

        if method.body.is_empty() {
            self.line(&format!("{header} {{}}"));
            return;
        }
        self.line(&format!("{header} {{"));
        self.indent += 1;
        for stmt in &method.body {
            self.emit_stmt(stmt);
        }
        self.indent -= 1;
        self.line("}");
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                let text = self.emit_expr(expr);
                self.line(&format!("{text};"));
            }
            Stmt::Decl { value, id, .. } => {
                let var = self.analyzed.symbols.variable(self.analyzed.ref_of(*id)).clone();
                let mut out = format!("{} {}", var.ty.target_name(), var.target_name);
                if let Some(value) = value {
                    out.push_str(&format!(" = {}", self.emit_expr(value)));
                }
                out.push(';');
                self.line(&out);
            }
            Stmt::Assign { receiver, value, .. } => {
                let text = format!("{} = {};", self.emit_expr(receiver), self.emit_expr(value));
                self.line(&text);
            }
            Stmt::If { cond, then_branch, else_branch, .. } => {
                self.line(&format!("if ({}) {{", self.emit_expr(cond)));
                self.indent += 1;
                for stmt in then_branch {
                    self.emit_stmt(stmt);
                }
                self.indent -= 1;
                if else_branch.is_empty() {
                    self.line("}");
                } else {
                    self.line("} else {");
                    self.indent += 1;
                    for stmt in else_branch {
                        self.emit_stmt(stmt);
                    }
                    self.indent -= 1;
                    self.line("}");
                }
            }
            Stmt::While { cond, body, .. } => {
                self.line(&format!("while ({}) {{", self.emit_expr(cond)));
                self.indent += 1;
                for stmt in body {
                    self.emit_stmt(stmt);
                }
                self.indent -= 1;
                self.line("}");
            }
            Stmt::For { init, cond, increment, body, .. } => {
                let init_text = init.as_deref().map(|s| self.emit_header_stmt(s)).unwrap_or_default();
                let cond_text = cond.as_ref().map(|c| self.emit_expr(c)).unwrap_or_default();
                let inc_text = increment.as_deref().map(|s| self.emit_header_stmt(s)).unwrap_or_default();
                self.line(&format!("for ({init_text}; {cond_text}; {inc_text}) {{"));
                self.indent += 1;
                for stmt in body {
                    self.emit_stmt(stmt);
                }
                self.indent -= 1;
                self.line("}");
            }
            Stmt::Return { value, .. } => {
                let text = self.emit_expr(value);
                self.line(&format!("return {text};"));
            }
        }
    }

    /// Emits a `for(...)` header's init/increment clause without its
    /// own trailing `;` — the `for (...)` syntax supplies that
    /// separator.
    fn emit_header_stmt(&mut self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expr(expr) => self.emit_expr(expr),
            Stmt::Assign { receiver, value, .. } => {
                format!("{} = {}", self.emit_expr(receiver), self.emit_expr(value))
            }
            _ => unreachable!("a `for` header clause is always an expression or an assignment"),
        }
    }

    fn emit_expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Literal { value, .. } => emit_literal(value),
            Expr::Group { inner, .. } => format!("({})", self.emit_expr(inner)),
            Expr::Binary { op, left, right, .. } => {
                format!("{} {} {}", self.emit_expr(left), op.as_str(), self.emit_expr(right))
            }
            Expr::Access { receiver, name, id } => match receiver.as_deref() {
                Some(receiver) => format!("{}.{}", self.emit_expr(receiver), self.interner.resolve(*name)),
                None => self.analyzed.symbols.variable(self.analyzed.ref_of(*id)).target_name.clone(),
            },
            Expr::Call { receiver, name, args, id } => {
                let args_text = args.iter().map(|a| self.emit_expr(a)).collect::<Vec<_>>().join(", ");
                match receiver.as_deref() {
                    Some(receiver) => {
                        format!("{}.{}({args_text})", self.emit_expr(receiver), self.interner.resolve(*name))
                    }
                    None => {
                        let target = &self.analyzed.symbols.function(self.analyzed.ref_of(*id)).target_name;
                        format!("{target}({args_text})")
                    }
                }
            }
        }
    }
}

fn emit_literal(literal: &Literal) -> String {
    match literal {
        Literal::Nil => "null".to_string(),
        Literal::Bool(b) => b.to_string(),
        Literal::Char(c) => format!("'{}'", escape_char(*c)),
        Literal::Int(value) => value.to_string(),
        Literal::Decimal(value) => value.to_string(),
        Literal::Str(value) => format!("\"{}\"", escape_str(value)),
    }
}

fn escape_char(c: char) -> String {
    match c {
        '\\' => "\\\\".to_string(),
        '\'' => "\\'".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        '\u{8}' => "\\b".to_string(),
        other => other.to_string(),
    }
}

fn escape_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use plc_util::StringSink;

    fn emit_source(source: &str) -> String {
        let program = plc_par::parse(source).expect("source must parse");
        let analyzed = plc_sem::analyze(&program).expect("source must analyze");
        let mut sink = StringSink::new();
        emit(&program, &analyzed, &mut sink);
        sink.as_str().to_string()
    }

    #[test]
    fn method_emits_as_a_java_shaped_method() {
        let output = emit_source("DEF square(x: Integer): Integer DO RETURN x * x; END DEF main(): Integer DO RETURN square(1); END");
        assert!(output.contains("int square(int x) {"));
        assert!(output.contains("return x * x;"));
    }

    #[test]
    fn empty_method_body_is_a_single_line() {
        let output = emit_source("DEF noop() DO END DEF main(): Integer DO noop(); RETURN 0; END");
        assert!(output.contains("void noop() {}"));
    }

    #[test]
    fn constant_field_is_emitted_final() {
        let output = emit_source("LET CONST x: Integer = 1; DEF main(): Integer DO RETURN x; END");
        assert!(output.contains("final int x = 1;"));
    }

    #[test]
    fn for_loop_increment_has_no_trailing_semicolon_of_its_own() {
        let output = emit_source(
            "DEF main(): Integer DO LET i = 0; FOR (; i < 3; i = i + 1) DO print(i); END RETURN i; END",
        );
        assert!(output.contains("for (; i < 3; i = i + 1) {"));
    }

    #[test]
    fn decimal_literals_are_fixed_point_not_scientific() {
        let output = emit_source("DEF main(): Integer DO LET x: Decimal = 3.50; RETURN 0; END");
        assert!(output.contains("3.50"));
        assert!(!output.contains('e'));
        assert!(!output.contains('E'));
    }

    #[test]
    fn entry_point_invokes_main_and_exits_with_its_value() {
        let output = emit_source("DEF main(): Integer DO RETURN 0; END");
        assert!(output.contains("System.exit(main());"));
    }
}
