//! plc-driver — pipeline wiring, a collaborator rather than one of the
//! four core pipeline stages.
//!
//! This crate is not one of the four pipeline stages. It exists so
//! integration tests and a small demonstration binary can run the
//! Lexer → Parser → Analyzer → { Evaluator | Emitter } chain without
//! duplicating the wiring, and stays a thin `match` over [`Mode`] with
//! no argument-parsing framework — a real CLI surface is out of scope.

use plc_par::{parse, Source};
use plc_sem::analyze;
use plc_util::{OutputSink, ParseError, SemanticError, StringSink};

/// Which stage to stop at, or which of the two final stages to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Lex,
    Parse,
    Analyze,
    Run,
    Emit,
}

/// What running the pipeline up to (and including) a [`Mode`] produced.
#[derive(Debug)]
pub enum Outcome {
    Tokens(Vec<plc_lex::Token>),
    Ast(Source),
    /// Analysis succeeded. The resolved symbol table and type/reference
    /// maps are discarded here — a caller that needs them should call
    /// `plc_sem::analyze` directly rather than go through the driver.
    Analyzed,
    Evaluated(plc_eval::Value),
    Emitted(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

/// Runs the pipeline against `source` up to `mode`, writing any
/// Evaluator output to `sink` along the way. The Emitter writes to its
/// own in-memory sink and returns the resulting text, since emission
/// is not a side effect a caller already has a sink open for.
pub fn run_pipeline(source: &str, mode: Mode, sink: &mut dyn OutputSink) -> Result<Outcome, PipelineError> {
    log::debug!("running pipeline in {mode:?} mode");

    if mode == Mode::Lex {
        let tokens = plc_lex::Lexer::tokenize(source)?;
        return Ok(Outcome::Tokens(tokens));
    }

    let program = parse(source)?;
    if mode == Mode::Parse {
        return Ok(Outcome::Ast(program.source));
    }

    let analyzed = analyze(&program)?;
    if mode == Mode::Analyze {
        return Ok(Outcome::Analyzed);
    }

    match mode {
        Mode::Run => {
            let value = plc_eval::evaluate(&program, sink)?;
            Ok(Outcome::Evaluated(value))
        }
        Mode::Emit => {
            let mut buffer = StringSink::new();
            plc_emit::emit(&program, &analyzed, &mut buffer);
            Ok(Outcome::Emitted(buffer.as_str().to_string()))
        }
        Mode::Lex | Mode::Parse | Mode::Analyze => unreachable!("handled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_mode_stops_after_tokenizing() {
        let mut sink = StringSink::new();
        let outcome = run_pipeline("DEF main(): Integer DO RETURN 0; END", Mode::Lex, &mut sink).unwrap();
        assert!(matches!(outcome, Outcome::Tokens(_)));
    }

    #[test]
    fn parse_mode_stops_after_building_the_ast() {
        let mut sink = StringSink::new();
        let outcome = run_pipeline("DEF main(): Integer DO RETURN 0; END", Mode::Parse, &mut sink).unwrap();
        assert!(matches!(outcome, Outcome::Ast(_)));
    }

    #[test]
    fn analyze_mode_rejects_a_program_missing_main() {
        let mut sink = StringSink::new();
        let err = run_pipeline("LET x: Integer = 1;", Mode::Analyze, &mut sink).unwrap_err();
        assert!(matches!(err, PipelineError::Semantic(_)));
    }

    #[test]
    fn run_mode_evaluates_and_returns_mains_value() {
        let mut sink = StringSink::new();
        let outcome = run_pipeline("DEF main(): Integer DO RETURN 42; END", Mode::Run, &mut sink).unwrap();
        assert_eq!(outcome_value(outcome), plc_eval::Value::Int(42.into()));
    }

    #[test]
    fn run_mode_captures_print_output_on_the_caller_sink() {
        let mut sink = StringSink::new();
        run_pipeline(
            "DEF main(): Integer DO print(\"hi\"); RETURN 0; END",
            Mode::Run,
            &mut sink,
        )
        .unwrap();
        assert_eq!(sink.as_str(), "hi\n");
    }

    #[test]
    fn emit_mode_produces_target_source_text() {
        let mut sink = StringSink::new();
        let outcome = run_pipeline("DEF main(): Integer DO RETURN 0; END", Mode::Emit, &mut sink).unwrap();
        match outcome {
            Outcome::Emitted(text) => assert!(text.contains("class Program")),
            other => panic!("expected Outcome::Emitted, got {other:?}"),
        }
    }

    fn outcome_value(outcome: Outcome) -> plc_eval::Value {
        match outcome {
            Outcome::Evaluated(value) => value,
            other => panic!("expected Outcome::Evaluated, got {other:?}"),
        }
    }
}
