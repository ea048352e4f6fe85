use clap::{Args, ValueEnum};
use serde_json::Value;

use credit_sim_core::amortization::rounding::Round;
use credit_sim_core::amortization::{analyze_portfolio, Bucket, PortfolioInput};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BucketArg {
    Period,
    Year,
}

impl From<BucketArg> for Bucket {
    fn from(arg: BucketArg) -> Self {
        match arg {
            BucketArg::Period => Bucket::Period,
            BucketArg::Year => Bucket::Year,
        }
    }
}

/// Arguments for portfolio analysis
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to JSON portfolio file
    #[arg(long)]
    pub input: Option<String>,

    /// Consolidation granularity (overrides the file's `bucket`)
    #[arg(long)]
    pub bucket: Option<BucketArg>,
}

pub fn run_portfolio(
    args: PortfolioArgs,
    round: Option<u32>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut portfolio_input: PortfolioInput = input::read_input(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for portfolio analysis")?;
    if let Some(bucket) = args.bucket {
        portfolio_input.bucket = bucket.into();
    }

    let result = analyze_portfolio(&portfolio_input)?;
    match round {
        Some(dp) => Ok(serde_json::to_value(result.rounded(dp))?),
        None => Ok(serde_json::to_value(result)?),
    }
}
