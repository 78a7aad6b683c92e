//! Monitor real-time receiver events.
//!
//! Demonstrates subscribing to the event stream and printing all events as
//! they arrive. Turn the volume knob or switch inputs on the front panel to
//! generate unsolicited status lines; the driver dispatches them into the
//! mirror and announces each change here.
//!
//! # Requirements
//!
//! - A receiver connected via RS-232C or a USB-serial adapter
//! - Serial port path adjusted for your system
//!
//! # Usage
//!
//! ```sh
//! cargo run -p avrctl --example monitor_events
//! ```

use std::time::Duration;

use avrctl::{AvrEvent, DenonBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let serial_port = "/dev/ttyUSB0";

    println!("Connecting to receiver on {}...", serial_port);

    let avr = DenonBuilder::new().serial_port(serial_port).build().await?;

    // Bring the mirror in sync before watching for changes.
    avr.refresh().await?;
    println!(
        "Initial state: power {:?}, volume {:?} (max {:?}), input {:?}\n",
        avr.power(),
        avr.volume(),
        avr.volume_max(),
        avr.input_source()
    );

    let mut events = avr.subscribe();
    println!("Monitoring for 60 seconds...");
    println!("(Turn the volume knob or switch inputs to generate events)\n");

    let deadline = tokio::time::Instant::now() + Duration::from_secs(60);

    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            break;
        }

        match tokio::time::timeout(remaining, events.recv()).await {
            Ok(Ok(event)) => match event {
                AvrEvent::PowerChanged { on } => {
                    println!("PowerChanged      -> {}", if on { "ON" } else { "STANDBY" });
                }
                AvrEvent::VolumeChanged { level } => {
                    println!("VolumeChanged     -> {level}");
                }
                AvrEvent::VolumeMaxChanged { level } => {
                    println!("VolumeMaxChanged  -> {level}");
                }
                AvrEvent::MuteChanged { on } => {
                    println!("MuteChanged       -> {}", if on { "ON" } else { "OFF" });
                }
                AvrEvent::MainZoneChanged { on } => {
                    println!("MainZoneChanged   -> {}", if on { "ON" } else { "OFF" });
                }
                AvrEvent::InputChanged { source } => {
                    println!("InputChanged      -> {source}");
                }
                AvrEvent::SourceTypeChanged { source } => {
                    println!("SourceTypeChanged -> {source}");
                }
                AvrEvent::ProtocolFault { line, detail } => {
                    println!("ProtocolFault     {line:?}: {detail}");
                }
                AvrEvent::Disconnected => {
                    println!("Disconnected");
                    break;
                }
            },
            Ok(Err(tokio::sync::broadcast::error::RecvError::Lagged(n))) => {
                println!("(missed {} events due to lag)", n);
            }
            Ok(Err(tokio::sync::broadcast::error::RecvError::Closed)) => {
                println!("Event channel closed.");
                break;
            }
            Err(_) => {
                // Timeout -- monitoring period elapsed.
                break;
            }
        }
    }

    println!("\nMonitoring complete.");
    avr.close().await?;
    Ok(())
}
