use std::path::PathBuf;

use clap::Parser;


#[derive(Parser)]
#[clap(author, about, version)]
pub struct CliParser {

    /// The input bytecode file to execute. The built-in example program runs when omitted.
    #[clap()]
    pub input_file: Option<PathBuf>,

    /// Set the operand stack capacity, in values.
    #[clap(long)]
    pub stack_capacity: Option<usize>,

    /// Execute in verbose mode.
    #[clap(short='v', long)]
    pub verbose: bool,

}
