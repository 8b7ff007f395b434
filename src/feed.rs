use crate::codec::TelemetryReading;
use crate::socket::EndpointRef;
use heapless::Vec;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use tracing::{debug, info};

pub const MAX_KEYFRAMES: usize = 8;

/// Timestamp of the last keyframe of every reference trajectory.
pub const TRAJECTORY_END_MS: u32 = 6000;

/// Timestamp used for the single keyframe of a random sample.
pub const SAMPLE_TIMESTAMP_MS: u32 = 1000;

// Exclusive upper bounds for random samples
pub const RANDOM_TEMPERATURE_LIMIT: u16 = 45;
pub const RANDOM_HUMIDITY_LIMIT: u16 = 100;

const TABLE_LEN: usize = 6;

const_assert!(TABLE_LEN <= MAX_KEYFRAMES);

type KeyframeTable = [(u32, u16, u16); TABLE_LEN];

const UP_ONE: KeyframeTable = [
    (1000, 10, 0),
    (2000, 15, 20),
    (3000, 20, 40),
    (4000, 25, 60),
    (5000, 30, 80),
    (6000, 35, 100),
];

const UP_TWO: KeyframeTable = [
    (1000, 5, 0),
    (2000, 10, 10),
    (3000, 15, 30),
    (4000, 20, 50),
    (5000, 25, 70),
    (6000, 30, 90),
];

const DOWN_ONE: KeyframeTable = [
    (1000, 35, 100),
    (2000, 30, 80),
    (3000, 25, 60),
    (4000, 20, 40),
    (5000, 15, 20),
    (6000, 10, 0),
];

const DOWN_TWO: KeyframeTable = [
    (1000, 30, 90),
    (2000, 25, 70),
    (3000, 20, 50),
    (4000, 15, 30),
    (5000, 10, 10),
    (6000, 5, 0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyframe {
    pub timestamp_ms: u32,
    pub reading: TelemetryReading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrajectoryKind {
    Rising,
    Falling,
    Sample,
}

/// Keyframes handed to the simulation clock, which interpolates between
/// consecutive entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trajectory {
    pub kind: TrajectoryKind,
    pub keyframes: Vec<Keyframe, MAX_KEYFRAMES>,
}

impl Trajectory {
    fn from_table(kind: TrajectoryKind, table: &KeyframeTable) -> Self {
        let frames = table.map(|(timestamp_ms, temperature, humidity)| Keyframe {
            timestamp_ms,
            reading: TelemetryReading::new(temperature, humidity),
        });
        Self::from_keyframes(kind, &frames)
    }

    fn from_keyframes(kind: TrajectoryKind, frames: &[Keyframe]) -> Self {
        // Every caller passes at most TABLE_LEN frames
        let keyframes = Vec::from_slice(frames).expect("keyframe table exceeds MAX_KEYFRAMES");
        Self { kind, keyframes }
    }

    pub fn up_one() -> Self {
        Self::from_table(TrajectoryKind::Rising, &UP_ONE)
    }

    pub fn up_two() -> Self {
        Self::from_table(TrajectoryKind::Rising, &UP_TWO)
    }

    pub fn down_one() -> Self {
        Self::from_table(TrajectoryKind::Falling, &DOWN_ONE)
    }

    pub fn down_two() -> Self {
        Self::from_table(TrajectoryKind::Falling, &DOWN_TWO)
    }

    pub fn sample(reading: TelemetryReading) -> Self {
        let frame = Keyframe {
            timestamp_ms: SAMPLE_TIMESTAMP_MS,
            reading,
        };
        Self::from_keyframes(TrajectoryKind::Sample, &[frame])
    }

    pub fn last(&self) -> Option<&Keyframe> {
        self.keyframes.last()
    }

    pub fn end_ms(&self) -> Option<u32> {
        self.last().map(|k| k.timestamp_ms)
    }

    /// Linearly interpolated reading at `at_ms`. Clamps to the first and
    /// last keyframe outside the covered span.
    pub fn value_at(&self, at_ms: u32) -> Option<TelemetryReading> {
        let first = self.keyframes.first()?;
        if at_ms <= first.timestamp_ms {
            return Some(first.reading);
        }

        for pair in self.keyframes.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if at_ms <= b.timestamp_ms {
                let span = f64::from(b.timestamp_ms - a.timestamp_ms);
                let ratio = f64::from(at_ms - a.timestamp_ms) / span;
                return Some(TelemetryReading::new(
                    lerp(a.reading.temperature, b.reading.temperature, ratio),
                    lerp(a.reading.humidity, b.reading.humidity, ratio),
                ));
            }
        }

        self.last().map(|k| k.reading)
    }
}

fn lerp(from: u16, to: u16, ratio: f64) -> u16 {
    let value = f64::from(from) + (f64::from(to) - f64::from(from)) * ratio;
    value.round().clamp(0.0, f64::from(u16::MAX)) as u16
}

/// Which pair of reference trajectories a generator alternates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedVariant {
    One,
    Two,
}

impl FeedVariant {
    pub fn rising(self) -> Trajectory {
        match self {
            FeedVariant::One => Trajectory::up_one(),
            FeedVariant::Two => Trajectory::up_two(),
        }
    }

    pub fn falling(self) -> Trajectory {
        match self {
            FeedVariant::One => Trajectory::down_one(),
            FeedVariant::Two => Trajectory::down_two(),
        }
    }
}

impl core::str::FromStr for FeedVariant {
    type Err = alloc::string::String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one" | "1" => Ok(FeedVariant::One),
            "two" | "2" => Ok(FeedVariant::Two),
            other => Err(format!("unknown feed variant '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeedMode {
    #[default]
    Alternating,
    RandomSample,
}

/// Supplies sensor data to one simulated temperature/humidity device.
///
/// Keeps the trajectory it handed out last; use one generator per
/// simulated sensor stream.
#[derive(Debug)]
pub struct FeedGenerator {
    variant: FeedVariant,
    history: Option<Trajectory>,
    rng: StdRng,
}

impl FeedGenerator {
    pub fn new(variant: FeedVariant) -> Self {
        Self {
            variant,
            history: None,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(variant: FeedVariant, seed: u64) -> Self {
        Self {
            variant,
            history: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn variant(&self) -> FeedVariant {
        self.variant
    }

    pub fn last_returned(&self) -> Option<&Trajectory> {
        self.history.as_ref()
    }

    /// Dispatch to [`Self::next_trajectory`] or [`Self::next_random_sample`].
    pub fn request(
        &mut self,
        mode: FeedMode,
        node: EndpointRef,
        device: &str,
        sim_time_nanos: u64,
    ) -> Trajectory {
        match mode {
            FeedMode::Alternating => self.next_trajectory(node, device, sim_time_nanos),
            FeedMode::RandomSample => self.next_random_sample(node, device, sim_time_nanos),
        }
    }

    /// Next keyframe table for the device.
    ///
    /// The first call yields the variant's rising table. After that only the
    /// final keyframe timestamp of the previous table is consulted: a table
    /// that ran to [`TRAJECTORY_END_MS`] flips direction, anything else
    /// restarts on the rising table.
    pub fn next_trajectory(
        &mut self,
        node: EndpointRef,
        device: &str,
        sim_time_nanos: u64,
    ) -> Trajectory {
        info!("Feeder: mote {}, time {}", node, format_sim_time(sim_time_nanos));

        let next = match &self.history {
            None => self.variant.rising(),
            Some(previous)
                if previous.end_ms() == Some(TRAJECTORY_END_MS)
                    && previous.kind == TrajectoryKind::Rising =>
            {
                self.variant.falling()
            }
            Some(_) => self.variant.rising(),
        };
        debug!("Feeder: {} -> {:?} trajectory", device, next.kind);

        self.history = Some(next.clone());
        next
    }

    /// A single fresh random keyframe for the device.
    pub fn next_random_sample(
        &mut self,
        node: EndpointRef,
        device: &str,
        sim_time_nanos: u64,
    ) -> Trajectory {
        info!("Feeder: mote {}, time {}", node, format_sim_time(sim_time_nanos));

        let reading = TelemetryReading::new(
            self.rng.gen_range(0..RANDOM_TEMPERATURE_LIMIT),
            self.rng.gen_range(0..RANDOM_HUMIDITY_LIMIT),
        );
        debug!("Feeder: {} -> sample {}", device, reading);

        let sample = Trajectory::sample(reading);
        self.history = Some(sample.clone());
        sample
    }
}

/// Render simulated time as `HH:MM:SS.mmm`.
pub fn format_sim_time(nanos: u64) -> alloc::string::String {
    let total_ms = nanos / 1_000_000;
    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        total_s / 3600,
        (total_s / 60) % 60,
        total_s % 60,
        ms
    )
}
