//! A minimal demonstration binary wiring the pipeline to stdout.
//!
//! Not a real CLI surface — just enough argument handling to run a
//! file through one mode.
//!
//! Usage: `plc <mode> <file>`, where mode is one of
//! `lex|parse|analyze|run|emit`.

use std::io::Write;
use std::process::ExitCode;

use plc_driver::{run_pipeline, Mode, Outcome};
use plc_util::OutputSink;

struct Stdout;

impl OutputSink for Stdout {
    fn write(&mut self, text: &str) {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (mode_arg, path) = match (args.next(), args.next()) {
        (Some(mode), Some(path)) => (mode, path),
        _ => {
            eprintln!("usage: plc <lex|parse|analyze|run|emit> <file>");
            return ExitCode::from(2);
        }
    };

    let mode = match mode_arg.as_str() {
        "lex" => Mode::Lex,
        "parse" => Mode::Parse,
        "analyze" => Mode::Analyze,
        "run" => Mode::Run,
        "emit" => Mode::Emit,
        other => {
            eprintln!("unknown mode `{other}`");
            return ExitCode::from(2);
        }
    };

    if let Err(err) = run(&path, mode) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(path: &str, mode: Mode) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(path)?;
    let mut sink = Stdout;
    let outcome = run_pipeline(&source, mode, &mut sink)?;

    match outcome {
        Outcome::Tokens(tokens) => println!("{tokens:#?}"),
        Outcome::Ast(source) => println!("{source:#?}"),
        Outcome::Analyzed => println!("analysis ok"),
        Outcome::Evaluated(value) => println!("{value}"),
        Outcome::Emitted(text) => print!("{text}"),
    }

    Ok(())
}
