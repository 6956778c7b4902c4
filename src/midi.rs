//! MIDI input ports
//!
//! Every matching input port gets its own midir connection. Each connection
//! calls back on its own thread and pushes decoded channel messages into the
//! shared router queue.

use midi2joy_core::{EventSender, InputEvent};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiInputPort};
use thiserror::Error;
use tracing::{debug, info, warn};

const CLIENT_NAME: &str = "midi2joy";

#[derive(Debug, Error)]
pub enum MidiError {
    #[error("failed to initialize MIDI input: {0}")]
    Init(#[from] midir::InitError),

    #[error("failed to connect to MIDI input \"{port}\": {reason}")]
    Connect { port: String, reason: String },

    #[error("no MIDI input ports found")]
    NoPorts,

    #[error("no MIDI input port matches {0:?}")]
    NoMatchingPorts(Vec<String>),
}

/// Decode a channel voice message into `(channel, data1, data2)`.
///
/// Note Off always yields value 0 so it releases buttons regardless of its
/// release velocity. One-data-byte messages (program change, channel
/// pressure) get value 0. System messages are dropped.
pub fn decode_message(message: &[u8]) -> Option<InputEvent> {
    let (&status, data) = message.split_first()?;
    if !(0x80..0xF0).contains(&status) {
        return None;
    }

    let channel = (status & 0x0F) as i32;
    let identifier = *data.first()? as i32;
    let value = match status & 0xF0 {
        0x80 => 0,
        _ => data.get(1).copied().unwrap_or(0) as i32,
    };
    Some(InputEvent::new(channel, identifier, value))
}

/// Whether a port name passes the configured filters (case-insensitive substring)
pub fn port_matches(name: &str, filters: &[String]) -> bool {
    if filters.is_empty() {
        return true;
    }
    let name = name.to_lowercase();
    filters
        .iter()
        .any(|filter| name.contains(&filter.to_lowercase()))
}

/// Names of all MIDI input ports
pub fn list_ports() -> Result<Vec<String>, MidiError> {
    let input = MidiInput::new(CLIENT_NAME)?;
    Ok(input
        .ports()
        .iter()
        .map(|port| {
            input
                .port_name(port)
                .unwrap_or_else(|_| "<unknown>".to_string())
        })
        .collect())
}

/// Look up a listed port again on a fresh client. Ports may have been added
/// or removed since the listing, so the name must still match.
fn find_port(input: &MidiInput, index: usize, name: &str) -> Option<MidiInputPort> {
    let ports = input.ports();
    let has_name = |port: &MidiInputPort| input.port_name(port).is_ok_and(|n| n == name);
    match ports.get(index) {
        Some(port) if has_name(port) => Some(port.clone()),
        _ => ports.into_iter().find(|port| has_name(port)),
    }
}

/// Open MIDI connections. Dropping it closes every port.
pub struct MidiListener {
    connections: Vec<MidiInputConnection<()>>,
}

impl MidiListener {
    /// Connect to every port matching `filters` and forward its events.
    pub fn open(filters: &[String], events: EventSender) -> Result<Self, MidiError> {
        let names = list_ports()?;
        if names.is_empty() {
            return Err(MidiError::NoPorts);
        }

        let mut connections = Vec::new();

        for (index, name) in names.iter().enumerate() {
            if !port_matches(name, filters) {
                debug!("Skipping MIDI device: {}", name);
                continue;
            }

            // midir consumes the client on connect, so each port gets its own
            let mut input = MidiInput::new(CLIENT_NAME)?;
            input.ignore(Ignore::All);

            let Some(port) = find_port(&input, index, name) else {
                warn!("MIDI device {} disappeared", name);
                continue;
            };

            let tx = events.clone();
            let connection = input
                .connect(
                    &port,
                    "midi2joy-input",
                    move |_timestamp, message, _| {
                        if let Some(event) = decode_message(message) {
                            // Closed queue means shutdown is in progress
                            let _ = tx.send(event);
                        }
                    },
                    (),
                )
                .map_err(|e| MidiError::Connect {
                    port: name.clone(),
                    reason: e.to_string(),
                })?;

            info!("Using MIDI device: {}", name);
            connections.push(connection);
        }

        if connections.is_empty() {
            return Err(MidiError::NoMatchingPorts(filters.to_vec()));
        }

        Ok(Self { connections })
    }

    /// Number of open ports
    pub fn port_count(&self) -> usize {
        self.connections.len()
    }
}
