// Main CLI entry point for verbscan
// Uses clap for argument parsing

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use std::sync::Arc;
use verbscan::campaign::Campaign;
use verbscan::config::{build_cli, ScanConfig};
use verbscan::engine::HttpProber;
use verbscan::logging::initialize_logging;
use verbscan::models::MethodResult;
use verbscan::reporting::{render, write_report};
use verbscan::scanner::{ScanObserver, SilentObserver, UrlScanner};
use verbscan::verdict::Classifier;

const BANNER: &str = r#"
                 _
 __   _____ _ __| |__  ___  ___ __ _ _ __
 \ \ / / _ \ '__| '_ \/ __|/ __/ _` | '_ \
  \ V /  __/ |  | |_) \__ \ (_| (_| | | | |
   \_/ \___|_|  |_.__/|___/\___\__,_|_| |_|
"#;

/// Prints each URL and each finished probe as the scan runs
struct ConsoleObserver;

fn colored_status(status_code: u16, text: &str) -> ColoredString {
    match status_code {
        200..=299 => text.green(),
        300..=399 => text.blue(),
        400..=u16::MAX => text.red(),
        _ => text.white(),
    }
}

impl ScanObserver for ConsoleObserver {
    fn url_started(&self, url: &str) {
        println!("Testing URL: {}", url.green().bold());
    }

    fn probe_finished(&self, url: &str, result: &MethodResult) {
        println!(
            "{} {} - {} {}",
            result.method.yellow(),
            url,
            colored_status(result.status_code, &result.status_code.to_string()),
            colored_status(result.status_code, &result.status_text)
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let config = match ScanConfig::from_matches(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red().bold());
            std::process::exit(1);
        }
    };

    if config.no_color {
        colored::control::set_override(false);
    }
    initialize_logging(config.verbose, !config.no_color);

    if config.show_banner() {
        println!("{}", BANNER.cyan().bold());
        println!();
    }

    let prober = HttpProber::new(&config.profile).context("Failed to build HTTP client")?;
    let scanner = UrlScanner::new(Arc::new(prober), Arc::new(Classifier::default()))
        .with_concurrency(config.concurrency)
        .with_view(config.view)
        .with_order(config.order);
    let campaign = Campaign::new(scanner, config.profile.clone());

    let observer: Arc<dyn ScanObserver> = if config.show_progress() {
        Arc::new(ConsoleObserver)
    } else {
        Arc::new(SilentObserver)
    };

    let report = campaign.run(&config.urls, &config.methods, observer).await;

    if !config.format.allows_color() {
        colored::control::set_override(false);
    }

    let output = match render(&report, config.format) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            return Ok(());
        }
    };

    if let Some(path) = &config.output_file {
        match write_report(path, &output) {
            Ok(()) if !config.quiet => {
                println!("{}", format!("Results written to {}", path.display()).green());
            }
            Ok(()) => {}
            Err(e) => eprintln!("{}", e.to_string().red()),
        }
    }

    if !config.quiet {
        println!("{}", output);
    }

    Ok(())
}
