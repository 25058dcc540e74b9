//! Check command - scan the fleet and report available chart updates

use std::time::Duration;

use chartwatch_rancher::{FleetScanner, RancherConfig, RancherSource};

use crate::Cli;
use crate::display;
use crate::error::Result;

/// Settings for one run, taken from flags and their environment fallbacks
pub fn rancher_config(cli: &Cli) -> RancherConfig {
    RancherConfig::new(
        cli.url.clone().unwrap_or_default(),
        cli.token.clone().unwrap_or_default(),
    )
    .with_verify_tls(cli.verify_tls)
    .with_index_timeout(Duration::from_secs(cli.timeout))
    .with_concurrency(cli.concurrency)
}

/// Run the check
pub async fn run(cli: &Cli) -> Result<()> {
    let config = rancher_config(cli);
    config.validate()?;

    let concurrency = config.concurrency;
    let source = RancherSource::new(config)?;
    let scanner = FleetScanner::new(source).with_concurrency(concurrency);

    let apps = scanner.scan().await?;
    tracing::info!("found {} Helm applications", apps.len());

    display::print_results(&apps, cli.json)
}
