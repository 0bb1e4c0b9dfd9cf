//! Parsing and validation of user-entered values.
//!
//! Everything here is pure: the interactive prompt loop and the CLI/HTTP
//! layers call into these functions and decide how to report failures.

use thiserror::Error;

use crate::core::SimulationParameters;

const MONTHS_PER_YEAR: u32 = 12;

/// Upper bound on either age; keeps the simulated horizon to at most
/// 1800 months.
pub const MAX_AGE: u32 = 150;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field} must be a number, got {text:?}")]
    InvalidNumber { field: &'static str, text: String },
    #[error("{field} must be >= 0")]
    Negative { field: &'static str },
    #[error("{field} must be finite")]
    NotFinite { field: &'static str },
    #[error("monthly budget must be >= minimum monthly payment")]
    BudgetBelowMinimum,
    #[error("retirement age must be >= current age")]
    RetireBeforeCurrent,
    #[error("{field} must be <= {}", MAX_AGE)]
    TooLarge { field: &'static str },
}

impl InputError {
    /// The user-facing name of the value that was rejected.
    pub fn field(&self) -> &'static str {
        match self {
            InputError::InvalidNumber { field, .. }
            | InputError::Negative { field }
            | InputError::NotFinite { field }
            | InputError::TooLarge { field } => field,
            InputError::BudgetBelowMinimum => "monthly budget",
            InputError::RetireBeforeCurrent => "retirement age",
        }
    }
}

/// A non-negative monetary amount.
pub fn parse_amount(field: &'static str, text: &str) -> Result<f64, InputError> {
    let value = parse_number(field, text.trim())?;
    check_non_negative(field, value)
}

/// A rate entered either as a decimal (`0.05`) or a percentage (`5%`).
pub fn parse_rate(field: &'static str, text: &str) -> Result<f64, InputError> {
    let text = text.trim();
    let value = match text.strip_suffix('%') {
        Some(percent) => parse_number(field, percent.trim_end())? / 100.0,
        None => parse_number(field, text)?,
    };
    check_non_negative(field, value)
}

pub fn parse_age(field: &'static str, text: &str) -> Result<u32, InputError> {
    let text = text.trim();
    if text.starts_with('-') && text[1..].parse::<u64>().is_ok() {
        return Err(InputError::Negative { field });
    }
    let age = text.parse::<u32>().map_err(|_| InputError::InvalidNumber {
        field,
        text: text.to_string(),
    })?;
    check_age(field, age)
}

pub fn check_age(field: &'static str, age: u32) -> Result<u32, InputError> {
    if age > MAX_AGE {
        return Err(InputError::TooLarge { field });
    }
    Ok(age)
}

fn parse_number(field: &'static str, text: &str) -> Result<f64, InputError> {
    text.parse::<f64>().map_err(|_| InputError::InvalidNumber {
        field,
        text: text.to_string(),
    })
}

fn check_non_negative(field: &'static str, value: f64) -> Result<f64, InputError> {
    if !value.is_finite() {
        return Err(InputError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(InputError::Negative { field });
    }
    Ok(value)
}

/// User-level inputs: yearly rates as decimals, ages in years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawInputs {
    pub loan_balance: f64,
    pub annual_loan_rate: f64,
    pub min_monthly_payment: f64,
    pub monthly_budget: f64,
    pub current_age: u32,
    pub retire_age: u32,
    pub annual_return_rate: f64,
}

impl RawInputs {
    pub fn validate(&self) -> Result<(), InputError> {
        check_non_negative("loan balance", self.loan_balance)?;
        check_non_negative("annual loan rate", self.annual_loan_rate)?;
        check_non_negative("minimum monthly payment", self.min_monthly_payment)?;
        check_non_negative("monthly budget", self.monthly_budget)?;
        check_non_negative("annual return rate", self.annual_return_rate)?;
        check_budget(self.min_monthly_payment, self.monthly_budget)?;
        check_age("current age", self.current_age)?;
        check_age("retirement age", self.retire_age)?;
        check_retire_age(self.current_age, self.retire_age)?;
        horizon_months(self.current_age, self.retire_age)?;
        Ok(())
    }

    pub fn into_parameters(self) -> Result<SimulationParameters, InputError> {
        self.validate()?;
        Ok(SimulationParameters {
            loan_balance: self.loan_balance,
            monthly_loan_rate: self.annual_loan_rate / MONTHS_PER_YEAR as f64,
            min_monthly_payment: self.min_monthly_payment,
            monthly_budget: self.monthly_budget,
            num_months: horizon_months(self.current_age, self.retire_age)?,
            monthly_return_rate: self.annual_return_rate / MONTHS_PER_YEAR as f64,
        })
    }
}

pub fn check_budget(min_monthly_payment: f64, monthly_budget: f64) -> Result<(), InputError> {
    if monthly_budget < min_monthly_payment {
        return Err(InputError::BudgetBelowMinimum);
    }
    Ok(())
}

pub fn check_retire_age(current_age: u32, retire_age: u32) -> Result<(), InputError> {
    if retire_age < current_age {
        return Err(InputError::RetireBeforeCurrent);
    }
    Ok(())
}

fn horizon_months(current_age: u32, retire_age: u32) -> Result<u32, InputError> {
    retire_age
        .checked_sub(current_age)
        .ok_or(InputError::RetireBeforeCurrent)?
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or(InputError::TooLarge {
            field: "retirement age",
        })
}
