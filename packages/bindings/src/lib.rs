use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use credit_sim_core::amortization::alignment::AlignedSchedule;
use credit_sim_core::amortization::rounding::{Round, CENTS};
use credit_sim_core::amortization::{Bucket, Loan, Portfolio, PortfolioInput};
use credit_sim_core::CreditSimError;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: DeserializeOwned>(input_json: &str) -> NapiResult<T> {
    serde_json::from_str(input_json)
        .map_err(CreditSimError::from)
        .map_err(to_napi_error)
}

/// Round to cents and serialise.
fn to_json<T: Round + Serialize>(output: &T) -> NapiResult<String> {
    serde_json::to_string(&output.rounded(CENTS)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Single loan
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let loan: Loan = parse(&input_json)?;
    let schedule = credit_sim_core::amortization::generate_schedule(&loan);
    to_json(&schedule)
}

#[napi]
pub fn analyze_loan(input_json: String) -> NapiResult<String> {
    let loan: Loan = parse(&input_json)?;
    let output = credit_sim_core::amortization::analyze_loan(&loan).map_err(to_napi_error)?;
    to_json(&output)
}

/// Input: a Loan. Output: insured capital per period, in schedule order.
#[napi]
pub fn insured_capital(input_json: String) -> NapiResult<String> {
    let loan: Loan = parse(&input_json)?;
    let schedule = credit_sim_core::amortization::generate_schedule(&loan);
    let capitals: Vec<Decimal> = credit_sim_core::amortization::insured_capital(&schedule, &loan);
    to_json(&capitals)
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_portfolio_schedules(input_json: String) -> NapiResult<String> {
    let portfolio: Portfolio = parse(&input_json)?;
    let schedules = credit_sim_core::amortization::generate_portfolio_schedules(&portfolio);
    to_json(&schedules)
}

#[napi]
pub fn analyze_portfolio(input_json: String) -> NapiResult<String> {
    let input: PortfolioInput = parse(&input_json)?;
    let output =
        credit_sim_core::amortization::analyze_portfolio(&input).map_err(to_napi_error)?;
    to_json(&output)
}

#[derive(Deserialize)]
struct AggregateRequest {
    schedules: Vec<AlignedSchedule>,
    #[serde(default)]
    bucket: Bucket,
    reference_date: NaiveDate,
}

/// Consolidate schedules already placed on a common axis, e.g. the `aligned`
/// field returned by `generate_portfolio_schedules`.
#[napi]
pub fn aggregate_schedules(input_json: String) -> NapiResult<String> {
    let request: AggregateRequest = parse(&input_json)?;
    let rows = credit_sim_core::amortization::aggregate(
        &request.schedules,
        request.bucket,
        request.reference_date,
    );
    to_json(&rows)
}
