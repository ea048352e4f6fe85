mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::loan::LoanArgs;
use commands::portfolio::PortfolioArgs;

/// Loan amortization and multi-loan repayment smoothing
#[derive(Parser)]
#[command(
    name = "csim",
    version,
    about = "Loan amortization and multi-loan repayment smoothing",
    long_about = "A CLI for simulating credit repayment with decimal precision. \
                  Builds amortization schedules with borrower's insurance, \
                  consolidates portfolios of loans on a common calendar and \
                  smooths the primary loan around the secondary ones."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Decimal places for money amounts in the output
    #[arg(long, default_value_t = 2, global = true, conflicts_with = "exact")]
    round: u32,

    /// Print full-precision amounts without rounding
    #[arg(long, global = true)]
    exact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the amortization schedule of a single loan
    Schedule(LoanArgs),
    /// Insured capital per period of a single loan
    InsuredCapital(LoanArgs),
    /// Consolidate and smooth a portfolio of loans
    Portfolio(PortfolioArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let round = (!cli.exact).then_some(cli.round);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::loan::run_schedule(args, round),
        Commands::InsuredCapital(args) => commands::loan::run_insured_capital(args, round),
        Commands::Portfolio(args) => commands::portfolio::run_portfolio(args, round),
        Commands::Version => {
            println!("csim {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {:?}", e);
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
