//! End-to-end integration tests for the full Lexer → Parser → Analyzer
//! → { Evaluator | Emitter } pipeline.

use plc_driver::{run_pipeline, Mode, Outcome};
use plc_util::StringSink;

const COUNTING_LOOP: &str = r#"
DEF main(): Integer DO
    LET i = 1;
    FOR (i = 1; i <= 3; i = i + 1) DO
        print(i);
    END
    RETURN 0;
END
"#;

#[test]
fn run_mode_executes_main_and_captures_print_output() {
    let mut sink = StringSink::new();
    let outcome = run_pipeline(
        "DEF main(): Integer DO print(\"hello\"); RETURN 0; END",
        Mode::Run,
        &mut sink,
    )
    .expect("well-formed programs evaluate successfully");

    assert_eq!(sink.as_str(), "hello\n");
    match outcome {
        Outcome::Evaluated(value) => assert_eq!(value, plc_eval::Value::Int(0.into())),
        other => panic!("expected Outcome::Evaluated, got {other:?}"),
    }
}

#[test]
fn emit_mode_produces_a_compilable_looking_class() {
    let mut sink = StringSink::new();
    let outcome = run_pipeline(
        "DEF add(a: Integer, b: Integer): Integer DO RETURN a + b; END DEF main(): Integer DO RETURN add(1, 2); END",
        Mode::Emit,
        &mut sink,
    )
    .expect("well-formed programs emit successfully");

    let text = match outcome {
        Outcome::Emitted(text) => text,
        other => panic!("expected Outcome::Emitted, got {other:?}"),
    };
    assert!(text.contains("class Program"));
    assert!(text.contains("int add(int a, int b)"));
    assert!(text.contains("public static void main"));
}

#[test]
fn a_program_missing_main_fails_at_the_analyze_stage_not_earlier() {
    let mut sink = StringSink::new();
    let source = "LET x: Integer = 1;";

    assert!(run_pipeline(source, Mode::Parse, &mut sink).is_ok());
    assert!(run_pipeline(source, Mode::Analyze, &mut sink).is_err());
}

#[test]
fn a_syntax_error_fails_even_at_the_lex_and_parse_stages_appropriately() {
    let mut sink = StringSink::new();
    // Unterminated string literal: a lexer-level failure.
    let source = "DEF main(): Integer DO print(\"oops; RETURN 0; END";
    assert!(run_pipeline(source, Mode::Lex, &mut sink).is_err());
}

#[test]
fn a_loop_driven_program_runs_to_completion() {
    let mut sink = StringSink::new();
    let outcome = run_pipeline(COUNTING_LOOP, Mode::Run, &mut sink).expect("the counting loop runs");
    assert_eq!(sink.as_str(), "1\n2\n3\n");
    match outcome {
        Outcome::Evaluated(value) => assert_eq!(value, plc_eval::Value::Int(0.into())),
        other => panic!("expected Outcome::Evaluated, got {other:?}"),
    }
}
