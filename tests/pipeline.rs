//! Config file to router, driven through the event queue with the dry-run backend

use midi2joy::config::Config;
use midi2joy::dry_run::LoggingDevice;
use midi2joy::midi::decode_message;
use midi2joy::runtime::build_table;
use midi2joy_core::{event_channel, run_router, DeviceStatus, EventRouter, OutputDevice};
use std::sync::Arc;

const CONFIG: &str = r#"
rules = ["0,23-31,1,-22"]

[[buttons]]
channel = 0
first = 33
last = 41
device = 1
offset = -22

[[axes]]
channel = 0
identifier = 14
device = 1
axis = "x"

[[axes]]
channel = 1
identifier = 7
device = 2
axis = "sl1"
"#;

fn router() -> EventRouter<LoggingDevice> {
    let config: Config = toml::from_str(CONFIG).unwrap();
    let table = build_table(&config, &[]).unwrap();
    EventRouter::new(Arc::new(table), LoggingDevice::new())
}

#[test]
fn test_startup_acquires_every_mapped_joystick() {
    let mut router = router();
    router.start().unwrap();
    assert_eq!(router.device().status(1), DeviceStatus::Owned);
    assert_eq!(router.device().status(2), DeviceStatus::Owned);
    assert_eq!(router.device().status(3), DeviceStatus::Free);
}

#[tokio::test]
async fn test_midi_bytes_reach_the_router() {
    let mut router = router();
    router.start().unwrap();

    let (tx, mut rx) = event_channel();
    let messages: [&[u8]; 6] = [
        &[0x90, 23, 100], // note on, button 1
        &[0x80, 23, 64],  // note off, button 1
        &[0xB0, 14, 127], // axis X
        &[0xB1, 7, 64],   // axis SL1 on joystick 2
        &[0x90, 60, 100], // unmapped
        &[0xF8],          // clock, dropped by the decoder
    ];
    for message in messages {
        if let Some(event) = decode_message(message) {
            tx.send(event).unwrap();
        }
    }
    drop(tx);

    let stats = run_router(&mut router, &mut rx, std::future::pending::<()>()).await;
    assert_eq!(stats.routed, 4);
    assert_eq!(stats.ignored, 1);
    assert_eq!(stats.rejected, 0);
    assert_eq!(stats.failed, 0);
}

#[test]
fn test_table_button_range_matches_text_rule() {
    let router = router();
    let table = router.table();
    assert_eq!(
        table.resolve(0, 33).map(|target| target.to_string()),
        Some("joystick 1 button 11".to_string())
    );
    assert_eq!(
        table.resolve(0, 31).map(|target| target.to_string()),
        Some("joystick 1 button 9".to_string())
    );
    assert_eq!(table.resolve(0, 32), None);
}
