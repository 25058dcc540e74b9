//! Logging initialization

use tracing_subscriber::EnvFilter;

/// Crates whose debug output `--verbose` turns on
const OWN_CRATES: &[&str] = &["chartwatch", "chartwatch_core", "chartwatch_rancher"];

/// Filter used when `RUST_LOG` is not set
fn default_filter(verbose: bool) -> String {
    if verbose {
        let mut directives = vec!["warn".to_string()];
        directives.extend(OWN_CRATES.iter().map(|name| format!("{}=debug", name)));
        directives.join(",")
    } else {
        "warn".to_string()
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays
/// reserved for the report.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(console::colors_enabled_stderr())
        .with_target(verbose)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "warn");
        assert_eq!(
            default_filter(true),
            "warn,chartwatch=debug,chartwatch_core=debug,chartwatch_rancher=debug"
        );
    }
}
