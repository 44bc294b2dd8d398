mod exec;
mod cli_parser;
mod files;
mod errors;

use std::borrow::Cow;
use std::io;

use clap::Parser;
use cli_parser::CliParser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tinypvmlib::{ExitCodes, EXAMPLE_PROGRAM};


fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}


fn main() {

    let args = CliParser::parse();

    init_logging(args.verbose);

    if args.stack_capacity == Some(0) {
        errors::invalid_stack_capacity(0);
    }

    let bytecode: Cow<[u8]> = match &args.input_file {
        Some(path) => Cow::Owned(
            files::load_bytecode(path).unwrap_or_else(|err| errors::load_error(err))
        ),
        None => {
            debug!("no input file, running the built-in example program");
            Cow::Borrowed(&EXAMPLE_PROGRAM[..])
        },
    };

    let mut vm = exec::VM::new(args.stack_capacity);

    let stdout = io::stdout();
    let summary = vm.run(&bytecode, &mut stdout.lock())
        .unwrap_or_else(|fault| errors::fault(fault));

    if !vm.stack().is_empty() {
        debug!(leftover = ?vm.stack().as_slice(), "values left on the stack");
    }

    debug!(
        reason = ?summary.reason,
        instructions = summary.instructions,
        cursor = summary.cursor,
        state = ?vm.state(),
        "process exited with code {}", ExitCodes::Success
    );
}
