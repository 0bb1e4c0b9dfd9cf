use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    MinPaymentAndInvest,
    PayoffThenInvest,
}

/// Validated inputs for one comparison. Rates are monthly decimal fractions.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    pub loan_balance: f64,
    pub monthly_loan_rate: f64,
    pub min_monthly_payment: f64,
    pub monthly_budget: f64,
    pub num_months: u32,
    pub monthly_return_rate: f64,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct SimulationState {
    pub(super) loan_balance: f64,
    pub(super) investment_balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum Recommendation {
    #[serde(rename_all = "camelCase")]
    MinPayment {
        result_min_pay: f64,
        result_payoff_first: f64,
    },
    #[serde(rename_all = "camelCase")]
    PayoffFirst {
        result_min_pay: f64,
        result_payoff_first: f64,
        monthly_budget: f64,
    },
}

impl Recommendation {
    pub fn strategy(&self) -> Strategy {
        match self {
            Recommendation::MinPayment { .. } => Strategy::MinPaymentAndInvest,
            Recommendation::PayoffFirst { .. } => Strategy::PayoffThenInvest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyOutcome {
    pub strategy: Strategy,
    pub final_balance: f64,
    /// 1-based month the loan reached zero; `Some(0)` if there was no loan.
    pub payoff_month: Option<u32>,
    pub residual_debt: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSnapshot {
    pub year: u32,
    pub month: u32,
    pub loan_balance: f64,
    pub investment_balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub parameters: SimulationParameters,
    pub min_payment: StrategyOutcome,
    pub payoff_first: StrategyOutcome,
    pub recommendation: Recommendation,
}
