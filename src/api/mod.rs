use axum::{
    Router,
    extract::{Json, Query},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, error::ErrorKind};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    BreakevenConfig, BreakevenResult, Recommendation, SimulationParameters, Strategy,
    StrategyOutcome, YearSnapshot, compare_strategies, run_yearly_trace, solve_breakeven_return,
};
use crate::input::{InputError, RawInputs, parse_rate};
use crate::prompt::collect_inputs;
use crate::report::{render, render_breakeven};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "payoff",
    about = "Compare paying a loan off first against paying the minimum and investing the rest"
)]
struct Cli {
    #[arg(long, help = "Amount currently owed on the loan")]
    loan_balance: f64,
    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Annual loan interest rate as a decimal (0.05) or percent (5%)"
    )]
    loan_rate: String,
    #[arg(long, help = "Contractual minimum monthly loan payment")]
    min_payment: f64,
    #[arg(long, help = "Money available each month for the loan and investing")]
    monthly_budget: f64,
    #[arg(long)]
    current_age: u32,
    #[arg(long)]
    retire_age: u32,
    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Expected annual investment return as a decimal (0.07) or percent (7%)"
    )]
    return_rate: String,
    #[arg(long, help = "Print the full comparison as JSON")]
    json: bool,
    #[arg(long, help = "Also solve for the return at which paying the minimum wins")]
    breakeven: bool,
    #[arg(long, help = "Include yearly balance traces in JSON output")]
    trace: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RateValue {
    Number(f64),
    Text(String),
}

impl From<RateValue> for String {
    fn from(value: RateValue) -> Self {
        match value {
            RateValue::Number(v) => v.to_string(),
            RateValue::Text(v) => v,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    loan_balance: Option<f64>,
    loan_rate: Option<RateValue>,
    min_payment: Option<f64>,
    monthly_budget: Option<f64>,
    current_age: Option<u32>,
    retire_age: Option<u32>,
    return_rate: Option<RateValue>,
    include_trace: Option<bool>,
    include_breakeven: Option<bool>,
}

#[derive(Copy, Clone, Debug, Default)]
struct ResponseOptions {
    include_trace: bool,
    include_breakeven: bool,
}

#[derive(Debug)]
struct ApiRequest {
    params: SimulationParameters,
    options: ResponseOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    recommendation: Recommendation,
    min_payment: StrategyOutcome,
    payoff_first: StrategyOutcome,
    num_months: u32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_payment_trace: Option<Vec<YearSnapshot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payoff_first_trace: Option<Vec<YearSnapshot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakeven: Option<BreakevenResult>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: &Cli) -> Result<RawInputs, String> {
    let annual_loan_rate =
        parse_rate("annual loan rate", &cli.loan_rate).map_err(flag_error)?;
    let annual_return_rate =
        parse_rate("annual return rate", &cli.return_rate).map_err(flag_error)?;

    let inputs = RawInputs {
        loan_balance: cli.loan_balance,
        annual_loan_rate,
        min_monthly_payment: cli.min_payment,
        monthly_budget: cli.monthly_budget,
        current_age: cli.current_age,
        retire_age: cli.retire_age,
        annual_return_rate,
    };
    inputs.validate().map_err(flag_error)?;
    Ok(inputs)
}

/// Same wording as the interactive prompt, tagged with the flag (or payload
/// key's CLI equivalent) that carried the bad value.
fn flag_error(err: InputError) -> String {
    let flag = match err.field() {
        "loan balance" => "--loan-balance",
        "annual loan rate" => "--loan-rate",
        "minimum monthly payment" => "--min-payment",
        "monthly budget" => "--monthly-budget",
        "current age" => "--current-age",
        "retirement age" => "--retire-age",
        "annual return rate" => "--return-rate",
        other => other,
    };
    format!("{err} ({flag})")
}

fn build_parameters(cli: &Cli) -> Result<SimulationParameters, String> {
    build_inputs(cli)?.into_parameters().map_err(flag_error)
}

fn build_compare_response(
    params: &SimulationParameters,
    options: ResponseOptions,
) -> Result<CompareResponse, String> {
    let comparison = compare_strategies(params);
    let breakeven = if options.include_breakeven {
        Some(solve_breakeven_return(params, BreakevenConfig::default())?)
    } else {
        None
    };
    let (min_payment_trace, payoff_first_trace) = if options.include_trace {
        (
            Some(run_yearly_trace(Strategy::MinPaymentAndInvest, params)),
            Some(run_yearly_trace(Strategy::PayoffThenInvest, params)),
        )
    } else {
        (None, None)
    };

    Ok(CompareResponse {
        recommendation: comparison.recommendation,
        min_payment: comparison.min_payment,
        payoff_first: comparison.payoff_first,
        num_months: params.num_months,
        message: render(&comparison.recommendation),
        min_payment_trace,
        payoff_first_trace,
        breakeven,
    })
}

/// Non-interactive mode: parses flags from `args` and returns the text to print.
pub fn run_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(e.to_string());
        }
        Err(e) => return Err(e.to_string()),
    };
    execute_cli(&cli)
}

fn execute_cli(cli: &Cli) -> Result<String, String> {
    let params = build_parameters(cli)?;
    let options = ResponseOptions {
        include_trace: cli.trace,
        include_breakeven: cli.breakeven,
    };
    let response = build_compare_response(&params, options)?;

    if cli.json {
        return serde_json::to_string_pretty(&response)
            .map(|json| format!("{json}\n"))
            .map_err(|e| format!("Failed to serialize comparison: {e}"));
    }

    let mut text = response.message;
    if let Some(breakeven) = &response.breakeven {
        text.push_str(&render_breakeven(breakeven));
    }
    Ok(text)
}

/// Interactive mode: asks each question on stdin until it gets a valid answer.
pub fn run_interactive() -> io::Result<()> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut stdout = io::stdout();

    let inputs = collect_inputs(&mut reader, &mut stdout)?;
    let params = inputs
        .into_parameters()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let comparison = compare_strategies(&params);
    write!(stdout, "{}", render(&comparison.recommendation))?;
    stdout.flush()
}

pub async fn run_http_server(port: u16) -> io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "payoff HTTP API listening");
    info!("Local access: http://127.0.0.1:{port}/api/compare");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn compare_get_handler(Query(payload): Query<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_post_handler(Json(payload): Json<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_handler_impl(payload: ComparePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!(error = %msg, "rejected compare request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    match build_compare_response(&request.params, request.options) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<ComparePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ComparePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();
    let mut options = ResponseOptions::default();

    if let Some(v) = payload.loan_balance {
        cli.loan_balance = v;
    }
    if let Some(v) = payload.loan_rate {
        cli.loan_rate = v.into();
    }
    if let Some(v) = payload.min_payment {
        cli.min_payment = v;
    }
    if let Some(v) = payload.monthly_budget {
        cli.monthly_budget = v;
    }
    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if let Some(v) = payload.retire_age {
        cli.retire_age = v;
    }
    if let Some(v) = payload.return_rate {
        cli.return_rate = v.into();
    }
    if let Some(v) = payload.include_trace {
        options.include_trace = v;
    }
    if let Some(v) = payload.include_breakeven {
        options.include_breakeven = v;
    }

    let params = build_parameters(&cli)?;
    Ok(ApiRequest { params, options })
}

fn default_cli_for_api() -> Cli {
    Cli {
        loan_balance: 12_000.0,
        loan_rate: "6%".to_string(),
        min_payment: 200.0,
        monthly_budget: 500.0,
        current_age: 30,
        retire_age: 65,
        return_rate: "7%".to_string(),
        json: false,
        breakeven: false,
        trace: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    #[test]
    fn build_parameters_converts_percent_rates_to_monthly() {
        let params = build_parameters(&sample_cli()).expect("valid inputs");
        assert_approx(params.monthly_loan_rate, 0.005);
        assert_approx(params.monthly_return_rate, 0.07 / 12.0);
        assert_eq!(params.num_months, 35 * 12);
    }

    #[test]
    fn build_inputs_rejects_budget_below_minimum() {
        let mut cli = sample_cli();
        cli.monthly_budget = 100.0;
        let err = build_inputs(&cli).expect_err("must reject budget");
        assert!(err.contains("--monthly-budget"));
    }

    #[test]
    fn build_inputs_rejects_negative_rate() {
        let mut cli = sample_cli();
        cli.loan_rate = "-3%".to_string();
        let err = build_inputs(&cli).expect_err("must reject negative rate");
        assert!(err.contains("--loan-rate"));
    }

    #[test]
    fn build_inputs_rejects_retirement_before_current_age() {
        let mut cli = sample_cli();
        cli.retire_age = 20;
        let err = build_inputs(&cli).expect_err("must reject ages");
        assert!(err.contains("--retire-age"));
    }

    #[test]
    fn build_inputs_reports_same_message_as_prompt() {
        let mut cli = sample_cli();
        cli.loan_balance = f64::NAN;
        let err = build_inputs(&cli).expect_err("must reject NaN balance");
        assert_eq!(err, "loan balance must be finite (--loan-balance)");

        let mut cli = sample_cli();
        cli.min_payment = -1.0;
        let err = build_inputs(&cli).expect_err("must reject negative minimum");
        assert_eq!(err, "minimum monthly payment must be >= 0 (--min-payment)");
    }

    #[test]
    fn huge_retirement_age_is_rejected_before_simulating() {
        let err = api_request_from_json(
            r#"{"currentAge": 0, "retireAge": 357913941, "includeTrace": true}"#,
        )
        .expect_err("horizon must be bounded");
        assert_eq!(err, "retirement age must be <= 150 (--retire-age)");
    }

    #[test]
    fn oldest_allowed_retirement_builds_a_full_trace() {
        let request = api_request_from_json(
            r#"{"currentAge": 0, "retireAge": 150, "includeTrace": true}"#,
        )
        .expect("150 is allowed");
        assert_eq!(request.params.num_months, 1800);
        let response =
            build_compare_response(&request.params, request.options).expect("response builds");
        let trace = response.min_payment_trace.expect("trace requested");
        assert_eq!(trace.len(), 150);
    }

    #[test]
    fn api_request_from_json_parses_web_keys() {
        let json = r#"{
          "loanBalance": 12000,
          "loanRate": "6%",
          "minPayment": 200,
          "monthlyBudget": 500,
          "currentAge": 63,
          "retireAge": 65,
          "returnRate": 0.06,
          "includeTrace": true
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        let params = request.params;
        assert_approx(params.loan_balance, 12_000.0);
        assert_approx(params.monthly_loan_rate, 0.005);
        assert_approx(params.monthly_return_rate, 0.005);
        assert_eq!(params.num_months, 24);
        assert!(request.options.include_trace);
        assert!(!request.options.include_breakeven);
    }

    #[test]
    fn api_request_from_json_falls_back_to_defaults() {
        let request = api_request_from_json("{}").expect("json should parse");
        let expected = build_parameters(&default_cli_for_api()).expect("valid defaults");
        assert_eq!(request.params, expected);
    }

    #[test]
    fn compare_response_serialization_contains_expected_fields() {
        let request = api_request_from_json(
            r#"{"currentAge": 63, "retireAge": 65, "includeTrace": true, "includeBreakeven": true}"#,
        )
        .expect("json should parse");
        let response =
            build_compare_response(&request.params, request.options).expect("response builds");
        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"recommendation\":{\"strategy\":"));
        assert!(json.contains("\"minPayment\""));
        assert!(json.contains("\"payoffFirst\""));
        assert!(json.contains("\"payoffMonth\""));
        assert!(json.contains("\"minPaymentTrace\""));
        assert!(json.contains("\"breakeven\""));
        assert!(json.contains("\"numMonths\":24"));
    }

    #[test]
    fn compare_response_omits_optional_sections_by_default() {
        let params = build_parameters(&sample_cli()).expect("valid inputs");
        let response =
            build_compare_response(&params, ResponseOptions::default()).expect("response builds");
        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(!json.contains("Trace"));
        assert!(!json.contains("breakeven"));
    }

    #[test]
    fn run_cli_prints_reference_scenario() {
        let text = run_cli([
            "payoff",
            "--loan-balance",
            "12000",
            "--loan-rate",
            "6%",
            "--min-payment",
            "200",
            "--monthly-budget",
            "500",
            "--current-age",
            "63",
            "--retire-age",
            "65",
            "--return-rate",
            "0.06",
        ])
        .expect("cli should run");
        assert!(text.starts_with("You should apply all $500.00 towards your loan"));
    }

    #[test]
    fn run_cli_json_output_parses() {
        let text = run_cli([
            "payoff",
            "--loan-balance",
            "0",
            "--loan-rate",
            "0",
            "--min-payment",
            "0",
            "--monthly-budget",
            "1000",
            "--current-age",
            "64",
            "--retire-age",
            "65",
            "--return-rate",
            "12%",
            "--json",
        ])
        .expect("cli should run");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["recommendation"]["strategy"], "min-payment");
        assert_eq!(value["numMonths"], 12);
    }

    #[test]
    fn run_cli_returns_help_text() {
        let text = run_cli(["payoff", "--help"]).expect("help is not an error");
        assert!(text.contains("--monthly-budget"));
    }

    #[test]
    fn run_cli_reports_missing_flags() {
        let err = run_cli(["payoff", "--loan-balance", "100"]).expect_err("flags missing");
        assert!(err.contains("--loan-rate"));
    }

    #[tokio::test]
    async fn compare_handler_rejects_invalid_payload() {
        let payload = ComparePayload {
            min_payment: Some(900.0),
            monthly_budget: Some(100.0),
            ..ComparePayload::default()
        };
        let response = compare_handler_impl(payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("valid json");
        assert_eq!(
            value["error"],
            "monthly budget must be >= minimum monthly payment (--monthly-budget)"
        );
    }

    #[tokio::test]
    async fn unknown_routes_get_json_404_with_no_store() {
        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("valid json");
        assert_eq!(value["error"], "Not found");
    }

    #[tokio::test]
    async fn compare_handler_accepts_defaults() {
        let response = compare_handler_impl(ComparePayload::default()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
