use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let raw_args: Vec<String> = env::args().collect();
    match raw_args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let port = raw_args
                .get(2)
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(8080);
            if let Err(e) = payoff::api::run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        None => {
            if let Err(e) = payoff::api::run_interactive() {
                eprintln!("Input error: {e}");
                std::process::exit(1);
            }
        }
        Some(_) => match payoff::api::run_cli(raw_args) {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("{e}");
                eprintln!("Usage: payoff [serve [port] | --loan-balance ... ]");
                std::process::exit(1);
            }
        },
    }
}
