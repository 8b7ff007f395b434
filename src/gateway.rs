use crate::frame::{FrameError, RadioFrame};
use heapless::Vec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const MAX_THERMOSTATS: usize = 8;
pub const DEFAULT_LOW_THRESHOLD: u16 = 10;
pub const DEFAULT_HIGH_THRESHOLD: u16 = 25;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("thermostat registry full ({max} entries), dropping 0x{0:04x}", max = MAX_THERMOSTATS)]
    RegistryFull(u16),
    #[error("undecodable frame: {0}")]
    Frame(#[from] FrameError),
    #[error("frame from 0x{src_addr:04x} carries {len} payload bytes, expected a reading")]
    MissingReading { src_addr: u16, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThermostatRecord {
    pub short_addr: u16,
    pub current_temp: u16,
}

/// Which band the average temperature currently falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureIndicator {
    Low,
    Normal,
    High,
}

/// Gateway-side view of every thermostat heard on the PAN.
#[derive(Debug)]
pub struct Gateway {
    thermostats: Vec<ThermostatRecord, MAX_THERMOSTATS>,
    low_threshold: u16,
    high_threshold: u16,
    average: u16,
}

impl Gateway {
    pub fn new() -> Self {
        Self::with_thresholds(DEFAULT_LOW_THRESHOLD, DEFAULT_HIGH_THRESHOLD)
    }

    pub fn with_thresholds(low_threshold: u16, high_threshold: u16) -> Self {
        Self {
            thermostats: Vec::new(),
            low_threshold,
            high_threshold,
            average: 0,
        }
    }

    /// Store the latest temperature for `short_addr`, registering the
    /// thermostat on first contact.
    pub fn record(&mut self, short_addr: u16, temperature: u16) -> Result<(), GatewayError> {
        if let Some(existing) = self
            .thermostats
            .iter_mut()
            .find(|t| t.short_addr == short_addr)
        {
            existing.current_temp = temperature;
            info!(
                "Found thermostat with shortAddr 0x{:04x}, temperature {}",
                short_addr, temperature
            );
        } else {
            self.thermostats
                .push(ThermostatRecord {
                    short_addr,
                    current_temp: temperature,
                })
                .map_err(|_| GatewayError::RegistryFull(short_addr))?;
            info!("Created a new thermostat 0x{:04x}", short_addr);
        }

        self.average = self.calculate_average();
        info!("Average temperature: {}", self.average);
        Ok(())
    }

    /// Decode a radio frame and record the reading it carries.
    pub fn ingest(&mut self, bytes: &[u8]) -> Result<ThermostatRecord, GatewayError> {
        let frame = RadioFrame::decode(bytes)?;
        let Some(reading) = frame.reading() else {
            warn!("Frame from 0x{:04x} without a reading", frame.src_addr);
            return Err(GatewayError::MissingReading {
                src_addr: frame.src_addr,
                len: frame.payload.len(),
            });
        };

        self.record(frame.src_addr, reading.temperature)?;
        Ok(ThermostatRecord {
            short_addr: frame.src_addr,
            current_temp: reading.temperature,
        })
    }

    fn calculate_average(&self) -> u16 {
        if self.thermostats.is_empty() {
            return 0;
        }
        let sum: u32 = self
            .thermostats
            .iter()
            .map(|t| u32::from(t.current_temp))
            .sum();
        (sum / self.thermostats.len() as u32) as u16
    }

    pub fn average(&self) -> u16 {
        self.average
    }

    pub fn indicator(&self) -> TemperatureIndicator {
        if self.average < self.low_threshold {
            TemperatureIndicator::Low
        } else if self.average > self.high_threshold {
            TemperatureIndicator::High
        } else {
            TemperatureIndicator::Normal
        }
    }

    pub fn thermostats(&self) -> &[ThermostatRecord] {
        &self.thermostats
    }

    pub fn get(&self, short_addr: u16) -> Option<&ThermostatRecord> {
        self.thermostats.iter().find(|t| t.short_addr == short_addr)
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}
