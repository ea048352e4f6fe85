use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use credit_sim_core::amortization::rounding::Round;
use credit_sim_core::amortization::{
    analyze_loan, generate_schedule, insured_capital, AmortizationKind, InsuranceConvention, Loan,
};
use credit_sim_core::Money;

use crate::input;

/// Loan parameters, from flags or a JSON file
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON loan file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Borrowed capital
    #[arg(long)]
    pub capital: Option<Decimal>,

    /// Annual nominal rate in percent (3.5 = 3.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Annual borrower's-insurance rate in percent
    #[arg(long, default_value = "0")]
    pub insurance_rate: Decimal,

    /// Duration in months
    #[arg(long)]
    pub months: Option<u32>,

    /// Interest-only (in fine) repayment
    #[arg(long)]
    pub interest_only: bool,

    /// Charge insurance on the outstanding balance instead of the initial capital
    #[arg(long)]
    pub insurance_on_balance: bool,

    /// Payment excluding insurance; back-solves the capital
    #[arg(long, alias = "pmt")]
    pub payment: Option<Decimal>,
}

impl LoanArgs {
    fn into_loan(self) -> Result<Loan, Box<dyn std::error::Error>> {
        if let Some(loan) = input::read_input::<Loan>(self.input.as_deref())? {
            return Ok(loan);
        }
        Ok(Loan {
            label: None,
            capital: self
                .capital
                .ok_or("--capital is required (or provide --input)")?,
            annual_rate_pct: self.rate.ok_or("--rate is required (or provide --input)")?,
            insurance_rate_pct: self.insurance_rate,
            duration_months: self
                .months
                .ok_or("--months is required (or provide --input)")?,
            kind: if self.interest_only {
                AmortizationKind::InterestOnly
            } else {
                AmortizationKind::Amortizing
            },
            insurance: if self.insurance_on_balance {
                InsuranceConvention::OnOutstandingBalance
            } else {
                InsuranceConvention::OnInitialCapital
            },
            start_offset: 0,
            start_date: None,
            payment_override: self.payment,
        })
    }
}

#[derive(Serialize)]
struct InsuredCapitalRow {
    period: u32,
    insured_capital: Money,
}

pub fn run_schedule(args: LoanArgs, round: Option<u32>) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = args.into_loan()?;
    let result = analyze_loan(&loan)?;
    match round {
        Some(dp) => Ok(serde_json::to_value(result.rounded(dp))?),
        None => Ok(serde_json::to_value(result)?),
    }
}

pub fn run_insured_capital(
    args: LoanArgs,
    round: Option<u32>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = args.into_loan()?;
    let schedule = generate_schedule(&loan);
    let rows: Vec<InsuredCapitalRow> = schedule
        .iter()
        .zip(insured_capital(&schedule, &loan))
        .map(|(row, capital)| InsuredCapitalRow {
            period: row.period,
            insured_capital: round.map_or(capital, |dp| capital.rounded(dp)),
        })
        .collect();
    Ok(serde_json::to_value(rows)?)
}
