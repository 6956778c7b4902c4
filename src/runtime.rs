//! Wires the mapping table, an output backend and the MIDI inputs together

use crate::config::Config;
use crate::dry_run::LoggingDevice;
use crate::midi::MidiListener;
use anyhow::{Context, Result};
use midi2joy_core::{
    event_channel, run_router, ConfigError, EventRouter, MappingTable, OutputDevice, RouterStats,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Flags that change what [`run`] does
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    pub check: bool,
}

/// Build the table from the config file rules plus command-line rules
pub fn build_table(config: &Config, extra_rules: &[String]) -> Result<MappingTable, ConfigError> {
    let rules = config.mapping_rules(extra_rules)?;
    MappingTable::from_rules(&rules)
}

/// One line per mapped key, sorted by channel then identifier
pub fn describe_table(table: &MappingTable) -> Vec<String> {
    table
        .iter()
        .map(|(key, target)| format!("{key} -> {target}"))
        .collect()
}

pub async fn run(config: Config, extra_rules: &[String], options: RunOptions) -> Result<()> {
    let table = build_table(&config, extra_rules).context("Invalid mapping")?;

    if options.check {
        for line in describe_table(&table) {
            println!("{line}");
        }
        println!(
            "{} mappings on {} joystick(s)",
            table.len(),
            table.device_ids().len()
        );
        return Ok(());
    }

    let table = Arc::new(table);
    let stats = if options.dry_run {
        info!("Dry run: joystick commands are only logged");
        drive(table, LoggingDevice::new(), &config.ports).await?
    } else {
        run_uinput(table, &config).await?
    };

    info!(
        "Processed {} events: {} routed, {} unmapped, {} rejected, {} failed",
        stats.total(),
        stats.routed,
        stats.ignored,
        stats.rejected,
        stats.failed
    );
    Ok(())
}

#[cfg(target_os = "linux")]
async fn run_uinput(table: Arc<MappingTable>, config: &Config) -> Result<RouterStats> {
    let device = crate::joystick::UinputJoysticks::new(config.device_name.clone());
    drive(table, device, &config.ports).await
}

#[cfg(not(target_os = "linux"))]
async fn run_uinput(_table: Arc<MappingTable>, _config: &Config) -> Result<RouterStats> {
    anyhow::bail!("Virtual joysticks are only supported on Linux; use --dry-run")
}

/// Start the router on `device`, feed it from the MIDI inputs until Ctrl+C
/// or until every input closes, then release the joysticks.
async fn drive<D: OutputDevice>(
    table: Arc<MappingTable>,
    device: D,
    ports: &[String],
) -> Result<RouterStats> {
    let mut router = EventRouter::new(table, device);
    router.start().context("Failed to start joysticks")?;

    let (tx, mut rx) = event_channel();
    let listener = match MidiListener::open(ports, tx) {
        Ok(listener) => listener,
        Err(e) => {
            release_all(router);
            return Err(e).context("Failed to open MIDI input");
        }
    };
    info!(
        "Listening on {} MIDI input(s), press Ctrl+C to stop",
        listener.port_count()
    );

    let stats = run_router(&mut router, &mut rx, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await;

    drop(listener);
    release_all(router);
    Ok(stats)
}

fn release_all<D: OutputDevice>(router: EventRouter<D>) {
    let device_ids: Vec<u32> = router.table().device_ids().iter().copied().collect();
    let mut device = router.into_device();
    for device_id in device_ids {
        device.release(device_id);
    }
}
