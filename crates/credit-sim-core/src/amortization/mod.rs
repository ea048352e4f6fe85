//! Loan amortization, borrower's insurance and multi-loan smoothing.

pub mod advisories;
pub mod analysis;
pub mod insurance;
pub mod loan;
pub mod rounding;
pub mod schedule;
pub mod summary;

#[cfg(feature = "portfolio")]
pub mod aggregation;
#[cfg(feature = "portfolio")]
pub mod alignment;
#[cfg(feature = "portfolio")]
pub mod portfolio;
#[cfg(feature = "portfolio")]
pub mod smoothing;

pub use analysis::{analyze_loan, LoanAnalysis};
pub use insurance::insured_capital;
pub use loan::{AmortizationKind, InsuranceConvention, Loan};
pub use schedule::{generate_schedule, Schedule, ScheduleRow};

#[cfg(feature = "portfolio")]
pub use aggregation::{aggregate, Bucket, ConsolidatedRow};
#[cfg(feature = "portfolio")]
pub use portfolio::{
    analyze_portfolio, generate_portfolio_schedules, Portfolio, PortfolioInput,
    PortfolioSchedules,
};
#[cfg(feature = "portfolio")]
pub use smoothing::{SmoothingConfig, SmoothingOutcome, SmoothingStatus};
