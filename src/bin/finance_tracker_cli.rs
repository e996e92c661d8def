use colored::Colorize;
use finance_tracker_core::cli::{self, CliError};

fn main() {
    finance_tracker_core::init();
    if let Err(err) = cli::run_cli() {
        eprintln!("{} {err}", "error:".red().bold());
        if matches!(err, CliError::Usage(_)) {
            cli::print_usage();
        }
        std::process::exit(1);
    }
}
