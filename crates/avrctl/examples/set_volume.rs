//! Set the master volume and wait for the receiver's confirmation.
//!
//! Setters are fire-and-forget: the mirror only changes once the receiver
//! confirms. This example shows the subscribe-then-set pattern for callers
//! that want to observe the confirmation.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p avrctl --example set_volume -- 20
//! ```

use std::time::Duration;

use avrctl::{AvrEvent, DenonBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let level: u8 = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "20".to_string())
        .parse()?;

    let avr = DenonBuilder::new().serial_port("/dev/ttyUSB0").build().await?;

    // Learn the current level and ceiling first; the setter enforces the
    // ceiling once it is known.
    avr.refresh().await?;
    println!(
        "volume {:?} (max {:?}), requesting {level}",
        avr.volume(),
        avr.volume_max()
    );

    let mut events = avr.subscribe();
    avr.set_volume(level).await?;

    // Wait for the confirmation line to come back.
    let deadline = Duration::from_secs(2);
    loop {
        match tokio::time::timeout(deadline, events.recv()).await? {
            Ok(AvrEvent::VolumeChanged { level: confirmed }) => {
                println!("receiver confirmed volume {confirmed}");
                break;
            }
            Ok(_) => continue,
            Err(e) => anyhow::bail!("event stream ended: {e}"),
        }
    }

    avr.close().await?;
    Ok(())
}
