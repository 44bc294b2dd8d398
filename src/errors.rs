use colored::Colorize;

use tinypvmlib::ExitCodes;

use crate::exec::Fault;
use crate::files::LoadError;


pub fn load_error(err: LoadError) -> ! {
    eprintln!("{}: {}", "Load error".bright_red().bold(), err);
    std::process::exit(ExitCodes::LoadError.into());
}


pub fn invalid_stack_capacity(capacity: usize) -> ! {
    eprintln!("{}: stack capacity must be at least 1, got {}", "Configuration error".bright_red().bold(), capacity);
    std::process::exit(ExitCodes::LoadError.into());
}


pub fn fault(fault: Fault) -> ! {
    eprintln!("{}: {}", "Fault".bright_red().bold(), fault);
    std::process::exit(ExitCodes::Fault.into());
}
