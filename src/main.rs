mod batch;
mod cli;
mod collector;
mod config;
mod error;
mod inventory;
mod models;
mod parsers;
mod report;
mod search;
mod session;
#[cfg(test)]
mod testing;
mod utils;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use batch::{run_batch, ProxySettings};
use cli::Args;
use collector::Collector;
use config::Config;
use parsers::TemplateStore;
use report::RunReport;
use session::SshConnector;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize tracing
    let default_filter = if args.debug {
        "vlan_mac_search=debug"
    } else {
        "vlan_mac_search=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let cfg = Config::load();
    tracing::info!("Starting VLAN MAC search");
    tracing::info!("Inventory: {}", args.inventory);
    tracing::info!("Output Dir: {}", cfg.output_dir);

    // The target set is fixed before any device is contacted
    let targets = utils::expand_number_range(&args.vlans)
        .with_context(|| format!("Invalid VLAN range '{}'", args.vlans))?;
    if targets.is_empty() {
        tracing::info!("No VLANs given, nothing to search");
        return Ok(());
    }
    tracing::info!("Searching {} VLANs: {}", targets.len(), args.vlans.trim());

    let devices = inventory::load_inventory(&args.inventory).await?;
    if devices.is_empty() {
        tracing::info!("Inventory is empty, nothing to search");
        return Ok(());
    }
    tracing::info!("Loaded {} devices", devices.len());

    let templates_dir = Some(cfg.templates_dir.as_str()).filter(|d| !d.is_empty());
    let templates = TemplateStore::load(templates_dir)?;
    tracing::info!("Loaded {} extraction templates", templates.len());

    let started = chrono::Local::now();
    let (report_path, failure_path) = report::output_paths(&cfg.output_dir, &started);
    let mut run_report = RunReport::create(&report_path, &failure_path, args.vlans.trim()).await?;

    let connector = SshConnector::new(cfg.ssh_port, cfg.ssh_timeout_secs);
    let collector = Collector::new(&templates, &targets, cfg.mac_retry_threshold);
    let proxy = ProxySettings {
        use_proxy: cfg.use_proxy,
        default_proxy: cfg.proxy_session.clone(),
    };
    let run_span = tracing::info_span!("run", vlans = %args.vlans.trim());

    let summary = run_batch(&devices, &connector, &collector, &proxy, &mut run_report, &run_span).await?;
    run_report.finish().await?;

    tracing::info!(
        devices = summary.devices,
        with_matches = summary.with_matches,
        empty = summary.empty,
        failed = summary.failed,
        matched = summary.matched_entries,
        "Search complete"
    );
    tracing::info!("Report: {}", report_path.display());
    if summary.failed > 0 {
        tracing::warn!("{} devices failed, see {}", summary.failed, failure_path.display());
    }

    Ok(())
}
