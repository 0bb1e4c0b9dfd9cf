use std::io::{self, BufRead, Write};

use crate::input::{
    InputError, RawInputs, check_budget, check_retire_age, parse_age, parse_amount, parse_rate,
};

/// Asks `question` until `parse` accepts the answer. Parse errors are echoed
/// back to `writer`; running out of input is an `UnexpectedEof` error.
pub fn ask<R, W, T, F>(
    reader: &mut R,
    writer: &mut W,
    question: &str,
    mut parse: F,
) -> io::Result<T>
where
    R: BufRead,
    W: Write,
    F: FnMut(&str) -> Result<T, InputError>,
{
    loop {
        write!(writer, "{question}")?;
        writer.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input ended before a valid value was entered",
            ));
        }

        match parse(&line) {
            Ok(value) => return Ok(value),
            Err(err) => writeln!(writer, "{err}")?,
        }
    }
}

pub fn collect_inputs<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
) -> io::Result<RawInputs> {
    let loan_balance = ask(reader, writer, "Enter how much you owe in loans: ", |s| {
        parse_amount("loan balance", s)
    })?;
    let annual_loan_rate = ask(
        reader,
        writer,
        "Enter the annual interest rate of the loans: ",
        |s| parse_rate("annual loan rate", s),
    )?;
    let min_monthly_payment = ask(
        reader,
        writer,
        "Enter your minimum monthly loan payment: ",
        |s| parse_amount("minimum monthly payment", s),
    )?;
    let monthly_budget = ask(
        reader,
        writer,
        "Enter how much money you will be putting towards loans/retirement each month: ",
        |s| {
            let budget = parse_amount("monthly budget", s)?;
            check_budget(min_monthly_payment, budget)?;
            Ok(budget)
        },
    )?;
    let current_age = ask(reader, writer, "Enter your current age: ", |s| {
        parse_age("current age", s)
    })?;
    let retire_age = ask(reader, writer, "Enter the age you plan to retire at: ", |s| {
        let age = parse_age("retirement age", s)?;
        check_retire_age(current_age, age)?;
        Ok(age)
    })?;
    let annual_return_rate = ask(
        reader,
        writer,
        "Enter your predicted annual rate of return: ",
        |s| parse_rate("annual return rate", s),
    )?;

    Ok(RawInputs {
        loan_balance,
        annual_loan_rate,
        min_monthly_payment,
        monthly_budget,
        current_age,
        retire_age,
        annual_return_rate,
    })
}
