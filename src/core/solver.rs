use serde::Serialize;

use super::{SimulationParameters, Strategy, run_strategy};

const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Copy)]
pub struct BreakevenConfig {
    /// Annual return rate bounds, decimal.
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for BreakevenConfig {
    fn default() -> Self {
        Self {
            search_min: 0.0,
            search_max: 0.5,
            tolerance: 1e-6,
            max_iterations: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakevenIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_rate: f64,
    /// Min-payment result minus payoff-first result at the candidate rate.
    pub difference: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakevenResult {
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    /// Smallest annual return at which paying the minimum wins.
    pub annual_return_rate: Option<f64>,
    pub iterations: Vec<BreakevenIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

pub fn solve_breakeven_return(
    params: &SimulationParameters,
    config: BreakevenConfig,
) -> Result<BreakevenResult, String> {
    validate_config(config)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let mut solved = None;
    let mut converged = false;
    let feasible;
    let message;

    if min_payment_advantage(params, config.search_min) >= 0.0 {
        solved = Some(config.search_min);
        converged = true;
        feasible = true;
        message = "Paying the minimum already wins at the lower return bound.".to_string();
    } else if min_payment_advantage(params, config.search_max) < 0.0 {
        feasible = false;
        message = "Paying off the loan first wins across the whole search range.".to_string();
    } else {
        let mut lo = config.search_min;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let difference = min_payment_advantage(params, mid);
            iterations.push(BreakevenIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_rate: mid,
                difference,
            });

            if difference >= 0.0 {
                hi = mid;
            } else {
                lo = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                break;
            }
        }
        solved = Some(hi);
        feasible = true;
        message = if converged {
            "Solved break-even annual return.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate."
                .to_string()
        };
    }

    Ok(BreakevenResult {
        search_min: config.search_min,
        search_max: config.search_max,
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
        annual_return_rate: solved,
        iterations,
        converged,
        feasible,
        message,
    })
}

fn min_payment_advantage(params: &SimulationParameters, annual_return_rate: f64) -> f64 {
    let candidate = SimulationParameters {
        monthly_return_rate: annual_return_rate / MONTHS_PER_YEAR,
        ..*params
    };
    let min_payment = run_strategy(Strategy::MinPaymentAndInvest, &candidate);
    let payoff_first = run_strategy(Strategy::PayoffThenInvest, &candidate);
    min_payment.final_balance - payoff_first.final_balance
}

fn validate_config(config: BreakevenConfig) -> Result<(), String> {
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err("search bounds must be finite".to_string());
    }
    if config.search_min < 0.0 {
        return Err("search_min must be >= 0".to_string());
    }
    if config.search_max <= config.search_min {
        return Err("search_max must be greater than search_min".to_string());
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err("tolerance must be > 0".to_string());
    }
    if config.max_iterations == 0 {
        return Err("max_iterations must be > 0".to_string());
    }
    Ok(())
}
