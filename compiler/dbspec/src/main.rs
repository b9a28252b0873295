//! Dbspec CLI
//!
//! Runs a dbspec script and exits with its status code.

use std::process::ExitCode;

use dbspec::{init_tracing, parse_args, run, usage, StatusCode};

fn main() -> ExitCode {
    let program = std::env::args().next().unwrap_or_else(|| "dbspec".to_owned());
    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("Error: {error}");
            eprintln!();
            eprintln!("{}", usage(&program));
            return error.status().into();
        }
    };
    if options.help {
        println!("{}", usage(&program));
        return StatusCode::Ok.into();
    }

    init_tracing(options.verbosity);
    run(&options).into()
}
