use chrono::Local;
use tokio::io::AsyncWrite;
use tracing::{Instrument, Span};

use crate::collector::Collector;
use crate::error::CollectError;
use crate::models::{DeviceOutcome, DeviceRecord, DeviceStatus, RunSummary};
use crate::report::RunReport;
use crate::session::Connector;

/// Proxy settings applied to every device of a run
#[derive(Debug, Clone, Default)]
pub struct ProxySettings {
    pub use_proxy: bool,
    pub default_proxy: String,
}

/// Run the search over every inventory device in order.
///
/// Each device ends in exactly one outcome which is written to the report
/// or failure log before the next device is contacted. A failing device
/// never stops the batch; only a write error on the outputs does.
pub async fn run_batch<W>(
    devices: &[DeviceRecord],
    connector: &dyn Connector,
    collector: &Collector<'_>,
    proxy: &ProxySettings,
    report: &mut RunReport<W>,
    run_span: &Span,
) -> anyhow::Result<RunSummary>
where
    W: AsyncWrite + Unpin,
{
    let mut summary = RunSummary::default();

    for device in devices {
        let device_span = tracing::info_span!(parent: run_span, "device", hostname = %device.hostname);
        let outcome = process_device(device, connector, collector, proxy)
            .instrument(device_span.clone())
            .await;

        device_span.in_scope(|| log_outcome(&outcome));
        report.record(&outcome, &Local::now()).await?;
        summary.record(&outcome);
    }

    Ok(summary)
}

/// Connect, collect, disconnect. Never fails; failures become the outcome.
async fn process_device(
    device: &DeviceRecord,
    connector: &dyn Connector,
    collector: &Collector<'_>,
    proxy: &ProxySettings,
) -> DeviceOutcome {
    let proxy = device.resolve_proxy(proxy.use_proxy, &proxy.default_proxy);
    if let Some(p) = &proxy {
        tracing::debug!("Connecting through proxy {}", p);
    }

    let mut session = match connector.connect(device, proxy.as_deref()).await {
        Ok(session) => session,
        Err(e) => {
            return DeviceOutcome {
                hostname: device.hostname.clone(),
                status: DeviceStatus::ConnectFailed(e.to_string()),
            }
        }
    };

    let collected = collector.collect(session.as_mut(), &device.enable).await;

    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close session: {}", e);
    }

    match collected {
        Ok((hostname, matches)) => DeviceOutcome::success(&hostname, matches),
        Err(e) => {
            let reason = e.to_string();
            let status = match e {
                CollectError::UnsupportedOs(_) => DeviceStatus::UnsupportedOs(reason),
                CollectError::Session(_) | CollectError::Template(_) => DeviceStatus::SessionFailed(reason),
            };
            DeviceOutcome {
                hostname: device.hostname.clone(),
                status,
            }
        }
    }
}

fn log_outcome(outcome: &DeviceOutcome) {
    match &outcome.status {
        DeviceStatus::Success(matches) if matches.is_empty() => {
            tracing::info!("No matching MAC addresses");
        }
        DeviceStatus::Success(matches) => {
            tracing::info!("Found {} matching MAC addresses", matches.len());
        }
        _ => {
            if let Some((tag, reason)) = outcome.failure() {
                tracing::warn!("{}: {}", tag, reason);
            }
        }
    }
}
