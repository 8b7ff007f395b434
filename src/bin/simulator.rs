use moteflow::config::MoteflowConfig;
use moteflow::feed::{FeedGenerator, FeedMode, FeedVariant, Trajectory};
use moteflow::frame::RadioFrame;
use moteflow::gateway::Gateway;
use moteflow::socket::{EndpointRef, InboundFrame, TelemetrySocket};
use std::time::Duration;
use tokio::time;
use tracing::{error, info, warn};

const SENSOR_DEVICE: &str = "humid-temp";
const NANOS_PER_MILLI: u64 = 1_000_000;

/// One thermostat node: its feed, its radio header and the trajectory it is
/// currently playing back.
struct SimulatedMote {
    endpoint: EndpointRef,
    generator: FeedGenerator,
    radio: RadioFrame,
    trajectory: Option<Trajectory>,
    trajectory_start_ms: u64,
}

impl SimulatedMote {
    fn new(endpoint: EndpointRef, generator: FeedGenerator) -> Self {
        Self {
            endpoint,
            radio: RadioFrame::new(endpoint.short_addr()),
            generator,
            trajectory: None,
            trajectory_start_ms: 0,
        }
    }

    /// Interpolated reading at `now_ms`, asking the feed for more data once
    /// the current trajectory has been played out.
    fn sample(&mut self, mode: FeedMode, now_ms: u64) -> Option<moteflow::TelemetryReading> {
        let played_out = match &self.trajectory {
            None => true,
            Some(t) => {
                now_ms.saturating_sub(self.trajectory_start_ms) > u64::from(t.end_ms().unwrap_or(0))
            }
        };
        if played_out {
            let next = self
                .generator
                .request(mode, self.endpoint, SENSOR_DEVICE, now_ms * NANOS_PER_MILLI);
            self.trajectory = Some(next);
            self.trajectory_start_ms = now_ms;
        }

        let offset = now_ms.saturating_sub(self.trajectory_start_ms);
        let offset = u32::try_from(offset).unwrap_or(u32::MAX);
        self.trajectory.as_ref().and_then(|t| t.value_at(offset))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => MoteflowConfig::from_path(&path)?,
        None => MoteflowConfig::default(),
    };

    println!("📡 Mote Telemetry Simulator");
    println!("===========================");

    let seed = config.feed.seed;
    let make_generator = |variant: FeedVariant, offset: u64| match seed {
        Some(seed) => FeedGenerator::with_seed(variant, seed.wrapping_add(offset)),
        None => FeedGenerator::new(variant),
    };

    let mut motes = vec![
        SimulatedMote::new(
            EndpointRef::new(0x0200_0000_0000_0001),
            make_generator(config.feed.variant, 0),
        ),
        SimulatedMote::new(
            EndpointRef::new(0x0200_0000_0000_0002),
            make_generator(paired_variant(config.feed.variant), 1),
        ),
    ];

    let mut gateway =
        Gateway::with_thresholds(config.gateway.low_threshold, config.gateway.high_threshold);

    // Attach a socket to the first mote's telemetry service
    let mut socket = TelemetrySocket::with_name(&config.socket.name)?;
    let attach = socket.send(config.socket.port, motes[0].endpoint, &["attach"])?;
    info!(
        "Attach message for {}: {}",
        motes[0].endpoint,
        moteflow::codec::to_hex(&attach)
    );

    let mut interval = time::interval(Duration::from_millis(config.feed.tick_ms));
    let mut sim_time_ms: u64 = 0;
    let mut ticks: u64 = 0;

    loop {
        if config.feed.tick_budget_spent(ticks) {
            info!("Tick budget of {} reached", ticks);
            break;
        }

        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }

        for mote in &mut motes {
            let Some(reading) = mote.sample(config.feed.mode, sim_time_ms) else {
                warn!("No reading for mote {}", mote.endpoint);
                continue;
            };

            let frame = mote.radio.encode_reading(reading);
            if let Err(e) = gateway.ingest(&frame) {
                error!("Gateway rejected frame from {}: {}", mote.endpoint, e);
            }

            if socket.is_attached() && socket.destination_endpoint() == Some(mote.endpoint) {
                let inbound =
                    InboundFrame::new(mote.endpoint, config.socket.port, reading.encode().to_vec());
                info!("{}", socket.on_data(&inbound));
            }
        }

        info!(
            "Gateway average {} ({:?}) over {} thermostats",
            gateway.average(),
            gateway.indicator(),
            gateway.thermostats().len()
        );

        sim_time_ms += config.feed.tick_ms;
        ticks += 1;
    }

    socket.on_close(0);
    println!("🛑 Mote Telemetry Simulator stopped");

    Ok(())
}

fn paired_variant(variant: FeedVariant) -> FeedVariant {
    match variant {
        FeedVariant::One => FeedVariant::Two,
        FeedVariant::Two => FeedVariant::One,
    }
}
