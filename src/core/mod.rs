mod engine;
mod solver;
mod types;

pub use engine::{
    compare_strategies, run_strategy, run_yearly_trace, select_strategy, simulate_min_payment,
    simulate_payoff_first,
};
pub use solver::{BreakevenConfig, BreakevenIteration, BreakevenResult, solve_breakeven_return};
pub use types::{
    Comparison, Recommendation, SimulationParameters, Strategy, StrategyOutcome, YearSnapshot,
};
