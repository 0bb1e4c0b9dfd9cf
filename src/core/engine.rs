use tracing::debug;

use super::types::{
    Comparison, Recommendation, SimulationParameters, SimulationState, Strategy, StrategyOutcome,
    YearSnapshot,
};

const MONTHS_PER_YEAR: u32 = 12;

pub fn simulate_min_payment(
    loan_balance: f64,
    monthly_loan_rate: f64,
    min_monthly_payment: f64,
    monthly_budget: f64,
    num_months: u32,
    monthly_return_rate: f64,
) -> f64 {
    let params = SimulationParameters {
        loan_balance,
        monthly_loan_rate,
        min_monthly_payment,
        monthly_budget,
        num_months,
        monthly_return_rate,
    };
    run_strategy(Strategy::MinPaymentAndInvest, &params).final_balance
}

pub fn simulate_payoff_first(
    loan_balance: f64,
    monthly_loan_rate: f64,
    monthly_budget: f64,
    num_months: u32,
    monthly_return_rate: f64,
) -> f64 {
    // The minimum payment plays no part in this strategy.
    let params = SimulationParameters {
        loan_balance,
        monthly_loan_rate,
        min_monthly_payment: 0.0,
        monthly_budget,
        num_months,
        monthly_return_rate,
    };
    run_strategy(Strategy::PayoffThenInvest, &params).final_balance
}

pub fn run_strategy(strategy: Strategy, params: &SimulationParameters) -> StrategyOutcome {
    simulate_strategy(strategy, params, |_, _| {})
}

/// Balances at the end of every simulated year, plus the final month when the
/// horizon is not a whole number of years. Investment balances are reported
/// before any residual debt is netted off.
pub fn run_yearly_trace(strategy: Strategy, params: &SimulationParameters) -> Vec<YearSnapshot> {
    let mut trace = Vec::new();
    simulate_strategy(strategy, params, |month, state| {
        if month % MONTHS_PER_YEAR == 0 || month == params.num_months {
            trace.push(YearSnapshot {
                year: month.div_ceil(MONTHS_PER_YEAR),
                month,
                loan_balance: state.loan_balance,
                investment_balance: state.investment_balance,
            });
        }
    });
    trace
}

/// Ties favour paying the minimum and investing the rest.
pub fn select_strategy(
    result_min_pay: f64,
    result_payoff_first: f64,
    monthly_budget: f64,
) -> Recommendation {
    if result_min_pay >= result_payoff_first {
        Recommendation::MinPayment {
            result_min_pay,
            result_payoff_first,
        }
    } else {
        Recommendation::PayoffFirst {
            result_min_pay,
            result_payoff_first,
            monthly_budget,
        }
    }
}

pub fn compare_strategies(params: &SimulationParameters) -> Comparison {
    let min_payment = run_strategy(Strategy::MinPaymentAndInvest, params);
    let payoff_first = run_strategy(Strategy::PayoffThenInvest, params);
    let recommendation = select_strategy(
        min_payment.final_balance,
        payoff_first.final_balance,
        params.monthly_budget,
    );
    debug!(
        num_months = params.num_months,
        min_payment = min_payment.final_balance,
        payoff_first = payoff_first.final_balance,
        recommended = ?recommendation.strategy(),
        "compared strategies"
    );
    Comparison {
        parameters: *params,
        min_payment,
        payoff_first,
        recommendation,
    }
}

fn simulate_strategy<F>(
    strategy: Strategy,
    params: &SimulationParameters,
    mut observe: F,
) -> StrategyOutcome
where
    F: FnMut(u32, &SimulationState),
{
    let mut state = SimulationState {
        loan_balance: params.loan_balance,
        investment_balance: 0.0,
    };
    let mut payoff_month = (state.loan_balance <= 0.0).then_some(0);

    // No horizon, nothing simulated: the residual penalty only applies to a
    // horizon that actually elapsed.
    if params.num_months == 0 {
        return StrategyOutcome {
            strategy,
            final_balance: 0.0,
            payoff_month,
            residual_debt: 0.0,
        };
    }

    for month in 1..=params.num_months {
        match strategy {
            Strategy::MinPaymentAndInvest => step_min_payment(&mut state, params),
            Strategy::PayoffThenInvest => step_payoff_first(&mut state, params),
        }
        if payoff_month.is_none() && state.loan_balance <= 0.0 {
            payoff_month = Some(month);
        }
        observe(month, &state);
    }

    let residual_debt = if state.loan_balance > 0.0 {
        state.loan_balance
    } else {
        0.0
    };
    StrategyOutcome {
        strategy,
        final_balance: state.investment_balance - residual_debt,
        payoff_month,
        residual_debt,
    }
}

fn step_min_payment(state: &mut SimulationState, params: &SimulationParameters) {
    let monthly_investment = params.monthly_budget - params.min_monthly_payment;

    state.investment_balance *= 1.0 + params.monthly_return_rate;
    if state.loan_balance <= 0.0 {
        state.investment_balance += params.monthly_budget;
        return;
    }

    state.loan_balance *= 1.0 + params.monthly_loan_rate;
    if params.min_monthly_payment > state.loan_balance {
        let excess = params.min_monthly_payment - state.loan_balance;
        state.investment_balance += monthly_investment + excess;
        state.loan_balance = 0.0;
    } else {
        state.loan_balance -= params.min_monthly_payment;
        state.investment_balance += monthly_investment;
    }
}

// Growth is only applied once money can sit in the account: never while the
// whole budget is still going to the loan.
fn step_payoff_first(state: &mut SimulationState, params: &SimulationParameters) {
    if state.loan_balance <= 0.0 {
        state.investment_balance *= 1.0 + params.monthly_return_rate;
        state.investment_balance += params.monthly_budget;
        return;
    }

    state.loan_balance *= 1.0 + params.monthly_loan_rate;
    if params.monthly_budget > state.loan_balance {
        let excess = params.monthly_budget - state.loan_balance;
        state.investment_balance *= 1.0 + params.monthly_return_rate;
        state.investment_balance += excess;
        state.loan_balance = 0.0;
    } else {
        state.loan_balance -= params.monthly_budget;
    }
}
