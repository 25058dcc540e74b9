//! chartwatch - Helm release inventory across Rancher-managed clusters

use clap::Parser;
use clap::builder::FalseyValueParser;

mod check;
mod display;
mod error;
mod exit_codes;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "chartwatch")]
#[command(author = "Chartwatch Contributors")]
#[command(version)]
#[command(
    about = "Report Helm releases with newer chart versions across Rancher-managed clusters",
    long_about = None
)]
pub struct Cli {
    /// Rancher management API URL, e.g. https://rancher.example.com/v3
    #[arg(long, env = "RANCHER_URL")]
    pub url: Option<String>,

    /// Rancher API bearer token
    #[arg(long, env = "RANCHER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Enable debug output
    #[arg(short, long, env = "VERBOSE", value_parser = FalseyValueParser::new())]
    pub verbose: bool,

    /// Verify the Rancher server certificate
    #[arg(long, env = "RANCHER_VERIFY_TLS", value_parser = FalseyValueParser::new())]
    pub verify_tls: bool,

    /// Number of clusters scanned at once
    #[arg(long, env = "CHARTWATCH_CONCURRENCY", default_value_t = 1)]
    pub concurrency: usize,

    /// Chart index request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[tokio::main]
async fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    let code = match check::run(&cli).await {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };

    std::process::exit(code);
}
