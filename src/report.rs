use crate::core::{BreakevenResult, Recommendation};

pub fn render(recommendation: &Recommendation) -> String {
    match *recommendation {
        Recommendation::MinPayment {
            result_min_pay,
            result_payoff_first,
        } => format!(
            "You should only make the minimum payments on your loan and apply the rest towards retirement.\n\
             If you do you will have ${result_min_pay:.2} when you retire as opposed to \
             ${result_payoff_first:.2} if you paid off your loan before investing.\n"
        ),
        Recommendation::PayoffFirst {
            result_min_pay,
            result_payoff_first,
            monthly_budget,
        } => format!(
            "You should apply all ${monthly_budget:.2} towards your loan before making any investments.\n\
             If you do you will have ${result_payoff_first:.2} when you retire as opposed to \
             ${result_min_pay:.2} if you only made minimum payments.\n"
        ),
    }
}

pub fn render_breakeven(result: &BreakevenResult) -> String {
    match result.annual_return_rate {
        Some(rate) if result.feasible => format!(
            "Paying the minimum wins once your annual return reaches {:.2}%.\n",
            rate * 100.0
        ),
        _ => format!("{}\n", result.message),
    }
}
