//! Interpreter tests over parsed scripts and in-memory collaborators.
//!
//! - `statements`: assignment, loops, conditionals, assertions, SQL, scripts
//! - `expressions`: literals, dot operations, comparisons, connections
//! - `siard`: archive metadata, commands and archive output


use std::collections::BTreeMap;

use dbspec_ir::SyntaxTree;
use dbspec_parse::{parse, ParseOutput};

use super::{Interpreter, InterpreterBuilder};
use crate::environment::Context;
use crate::errors::{EvalError, EvalResult};
use crate::print_handler::buffer_handler;
use crate::status::StatusCode;
use crate::testing::TestHost;

const WORK_DIR: &str = "/work";

fn parse_ok(source: &str) -> SyntaxTree {
    let ParseOutput { tree, errors } = parse(source);
    assert!(errors.is_empty(), "unexpected syntax errors: {errors:?}");
    tree
}

/// Result and `Log` output of running `source`.
struct Outcome {
    result: EvalResult<()>,
    output: String,
}

impl Outcome {
    fn unwrap_err(self) -> EvalError {
        match self.result {
            Ok(()) => panic!("expected the run to fail; output was {:?}", self.output),
            Err(error) => error,
        }
    }

    fn assert_ok(&self) {
        assert!(self.result.is_ok(), "run failed: {:?}", self.result);
    }
}

/// Build an interpreter over `tree` with buffered output and hand it to `f`.
fn with_interpreter<R>(
    host: &TestHost,
    tree: &SyntaxTree,
    parameters: &[(&str, &str)],
    f: impl FnOnce(&mut Interpreter<'_>) -> R,
) -> R {
    let parameters: BTreeMap<String, String> = parameters
        .iter()
        .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
        .collect();
    let mut interpreter = InterpreterBuilder::new(tree, host.host())
        .parameters(parameters)
        .directory(WORK_DIR)
        .print_handler(buffer_handler())
        .build();
    f(&mut interpreter)
}

fn run_with(host: &TestHost, source: &str, parameters: &[(&str, &str)]) -> Outcome {
    let tree = parse_ok(source);
    with_interpreter(host, &tree, parameters, |interpreter| {
        let result = interpreter.run();
        Outcome {
            result,
            output: interpreter.print_handler().get_output(),
        }
    })
}

fn run(source: &str) -> Outcome {
    run_with(&TestHost::new(), source, &[])
}

/// Run `source` in a scope that `check` can inspect afterwards.
fn run_in_scope(host: &TestHost, source: &str, check: impl FnOnce(EvalResult<()>, &Context<'_>)) {
    let tree = parse_ok(source);
    with_interpreter(host, &tree, &[], |interpreter| {
        let mut ctx = Context::root();
        let result = interpreter.run_in(&mut ctx);
        check(result, &ctx);
    });
}

/// The source text an error points at.
fn error_text<'s>(source: &'s str, error: &EvalError) -> &'s str {
    let Some(span) = error.span else {
        panic!("error has no span: {error:?}");
    };
    span.slice(source)
}

#[test]
fn empty_script_succeeds() {
    let outcome = run("");
    outcome.assert_ok();
    assert!(outcome.output.is_empty());
}

#[test]
fn errors_map_to_statuses() {
    assert_eq!(
        run("Assert 1 == 2\n").unwrap_err().status(),
        StatusCode::AssertionFailure
    );
    assert_eq!(run("Log missing\n").unwrap_err().status(), StatusCode::SemanticError);
}
