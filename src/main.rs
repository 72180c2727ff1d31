//! # Glove Link
//!
//! VR glove controller core: tracks fingers, buttons and gestures, streams
//! them to the host driver as ASCII frames, and decodes force-feedback and
//! haptic commands coming back.

use anyhow::Result;
use std::path::Path;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};
use tracing_subscriber;

use glove_link::config::Config;
use glove_link::glove::{Glove, PinLayout};
use glove_link::journal::{FrameJournal, TickRecord};
use glove_link::transport::SerialTransport;

/// Number of ticks between status log messages
const LOG_INTERVAL_TICKS: u64 = 1000;

/// Main entry point for the glove link
///
/// Initializes the application and runs the tick loop that continuously
/// exchanges frames with the host driver.
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (first CLI argument, or `config/default.toml`)
///    - Open the serial link to the host
///    - Build the glove topology and the tick interval
///
/// 2. **Main Loop**
///    - Run one glove tick per interval: read sensors, send the frame,
///      process any inbound command frame
///    - Journal ticks when enabled
///    - Log status every 1000 ticks (~4 seconds at the default rate)
///    - Handle Ctrl+C for graceful shutdown
///
/// # Current Behavior
///
/// The bench board stands in for real sensor wiring: every analog channel
/// reads the resting midpoint and every button line idles high. This keeps
/// a continuous, valid frame stream on the wire for host-side bring-up
/// without glove hardware attached.
///
/// # Errors
///
/// Returns error if:
/// - Configuration fails validation
/// - The serial link cannot be opened (no device found)
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("Glove link v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/default.toml".to_string());
    let config = if Path::new(&config_path).exists() {
        Config::load(&config_path)?
    } else {
        info!("No config file at {}, using defaults", config_path);
        Config::default()
    };

    let read_timeout = Duration::from_millis(config.serial.read_timeout_ms);
    let mut transport = if config.serial.port.is_empty() {
        SerialTransport::open(config.serial.baud_rate, read_timeout)?
    } else {
        SerialTransport::open_with_paths(
            &[config.serial.port.as_str()],
            config.serial.baud_rate,
            read_timeout,
        )?
    };
    info!("Host link opened at: {}", transport.device_path());

    let mut glove = Glove::from_config(&config, &PinLayout::default());
    let mut bank = bench::bank(&config);

    let mut journal = if config.journal.enabled {
        Some(FrameJournal::new(
            &config.journal.log_dir,
            config.journal.max_records_per_file,
            config.journal.max_files_to_keep,
        )?)
    } else {
        None
    };

    let mut tick_interval = interval(Duration::from_millis(config.glove.tick_interval_ms));

    info!(
        "Starting glove tick loop, one tick every {}ms",
        config.glove.tick_interval_ms
    );
    info!("Press Ctrl+C to exit");

    let mut tick_count: u64 = 0;
    let mut last_log_count: u64 = 0;

    // Main tick loop
    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                let outcome = match glove.tick(&mut bank, &mut transport).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        debug!("Tick failed: {}", e);
                        continue;
                    }
                };

                if let Some(journal) = &mut journal {
                    let record = TickRecord::now(
                        &outcome.frame,
                        outcome.inbound.as_deref(),
                        outcome.calibrating,
                        outcome.actuations.len(),
                    );
                    if let Err(e) = journal.write(&record) {
                        warn!("Failed to journal tick: {}", e);
                    }
                }

                tick_count += 1;

                // Log status every LOG_INTERVAL_TICKS (~4 seconds at 250Hz)
                if tick_count - last_log_count >= LOG_INTERVAL_TICKS {
                    info!(
                        "Sent {} frames ({} bytes last, calibrating: {})",
                        tick_count,
                        outcome.frame.len(),
                        outcome.calibrating
                    );
                    last_log_count = tick_count;
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total frames sent: {}", tick_count);
                break;
            }
        }
    }

    Ok(())
}

/// Bench board: stands in for real sensor wiring during host bring-up.
mod bench {
    use glove_link::channel::{
        AnalogSource, ChannelBank, DigitalSource, Multiplexer, SelectBus,
    };
    use glove_link::config::Config;

    /// Shared ADC pin the bench multiplexer pretends to sample.
    const MUX_SHARED_PIN: u8 = 15;

    /// ADC whose every channel rests at the midpoint.
    pub struct CenteredAdc {
        midpoint: i32,
    }

    impl AnalogSource for CenteredAdc {
        fn sample(&mut self, _pin: u8) -> i32 {
            self.midpoint
        }
    }

    /// Button lines idling high (pull-up wiring, nothing pressed).
    pub struct ReleasedGpio;

    impl DigitalSource for ReleasedGpio {
        fn read(&mut self, _pin: u8) -> bool {
            true
        }
    }

    /// Select bus with nothing attached.
    pub struct NoopSelect;

    impl SelectBus for NoopSelect {
        fn drive(&mut self, _levels: &[bool]) {}
    }

    pub type BenchBank = ChannelBank<CenteredAdc, ReleasedGpio, NoopSelect>;

    /// Wires up a bench bank matching the configured topology.
    pub fn bank(config: &Config) -> BenchBank {
        let adc = CenteredAdc {
            midpoint: config.glove.analog_max() / 2,
        };
        let mux = if config.multiplexer.enabled {
            Some(Multiplexer::new(
                NoopSelect,
                MUX_SHARED_PIN,
                config.multiplexer.select_lines as usize,
            ))
        } else {
            None
        };
        ChannelBank::new(adc, ReleasedGpio, mux)
    }
}
