use crate::codec::{self, TelemetryReading};
use arrayvec::ArrayString;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_SOCKET_NAME: &str = "SOCK1";
pub const MAX_SOCKET_NAME_LEN: usize = 16;
pub const ATTACH_MESSAGE_LEN: usize = 4;

// Payload the telemetry service treats as "start streaming to me"
const ATTACH_SENTINEL: u32 = 0;

const_assert_eq!(ATTACH_MESSAGE_LEN, core::mem::size_of::<u32>());

pub type SocketName = ArrayString<MAX_SOCKET_NAME_LEN>;
/// Bytes handed to the transport for delivery to the destination mote.
pub type OutboundMessage = [u8; ATTACH_MESSAGE_LEN];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SocketError {
    #[error("wrong parameter count: expected 1, got {count}")]
    InvalidArguments { count: usize },
    #[error("only attach is supported, got '{0}'")]
    UnsupportedCommand(alloc::string::String),
    #[error("socket is already attached")]
    AlreadyAttached,
    #[error("socket is closed")]
    SocketClosed,
    #[error("socket name must be 1..={max} characters", max = MAX_SOCKET_NAME_LEN)]
    InvalidName,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid endpoint reference '{0}': expected 8 dash-separated hex octets")]
pub struct EndpointParseError(alloc::string::String);

/// User-level socket commands. `attach` is the only verb the telemetry
/// service understands today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocketCommand {
    Attach,
}

impl SocketCommand {
    /// Parse the argument list a user typed after the destination port.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, SocketError> {
        match args {
            [token] => token.as_ref().parse(),
            _ => Err(SocketError::InvalidArguments { count: args.len() }),
        }
    }
}

impl core::str::FromStr for SocketCommand {
    type Err = SocketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attach" => Ok(SocketCommand::Attach),
            other => Err(SocketError::UnsupportedCommand(other.into())),
        }
    }
}

/// Reference to a remote mote, identified by its EUI-64 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EndpointRef(u64);

impl EndpointRef {
    pub const fn new(eui64: u64) -> Self {
        Self(eui64)
    }

    pub const fn eui64(&self) -> u64 {
        self.0
    }

    /// 16-bit short address derived from the low two bytes of the EUI-64.
    pub const fn short_addr(&self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

impl core::fmt::Display for EndpointRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let octets = self.0.to_be_bytes();
        for (i, octet) in octets.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{octet:02X}")?;
        }
        Ok(())
    }
}

impl core::str::FromStr for EndpointRef {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EndpointParseError(s.into());
        let mut octets = [0u8; 8];
        let mut count = 0;
        for part in s.trim().split('-') {
            if count == octets.len() || part.len() != 2 {
                return Err(invalid());
            }
            octets[count] = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
            count += 1;
        }
        if count != octets.len() {
            return Err(invalid());
        }
        Ok(Self(u64::from_be_bytes(octets)))
    }
}

impl From<EndpointRef> for String {
    fn from(endpoint: EndpointRef) -> Self {
        endpoint.to_string()
    }
}

impl TryFrom<String> for EndpointRef {
    type Error = EndpointParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A data frame handed to the socket by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundFrame {
    pub source: EndpointRef,
    pub source_port: u16,
    #[serde(with = "serde_bytes")]
    pub payload: alloc::vec::Vec<u8>,
}

impl InboundFrame {
    pub fn new(source: EndpointRef, source_port: u16, payload: alloc::vec::Vec<u8>) -> Self {
        Self {
            source,
            source_port,
            payload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocketState {
    Unattached,
    Attached,
    Closed,
}

/// One logical socket bound to the telemetry service of a remote mote.
///
/// The socket never transmits or prints anything itself: outbound messages
/// are returned to the transport and inbound frames are rendered to lines
/// the caller surfaces.
#[derive(Debug)]
pub struct TelemetrySocket {
    name: SocketName,
    state: SocketState,
    dst_port: Option<u16>,
    dst_endpoint: Option<EndpointRef>,
}

impl TelemetrySocket {
    pub fn new() -> Self {
        let mut name = SocketName::new();
        name.push_str(DEFAULT_SOCKET_NAME);
        Self::named(name)
    }

    /// Create a socket whose log lines are prefixed with `name`.
    pub fn with_name(name: &str) -> Result<Self, SocketError> {
        if name.is_empty() {
            return Err(SocketError::InvalidName);
        }
        let name = SocketName::from(name).map_err(|_| SocketError::InvalidName)?;
        Ok(Self::named(name))
    }

    fn named(name: SocketName) -> Self {
        Self {
            name,
            state: SocketState::Unattached,
            dst_port: None,
            dst_endpoint: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SocketState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.state == SocketState::Attached
    }

    pub fn destination_port(&self) -> Option<u16> {
        self.dst_port
    }

    pub fn destination_endpoint(&self) -> Option<EndpointRef> {
        self.dst_endpoint
    }

    /// Evaluate a user `socket-send` command.
    ///
    /// Returns the message the transport should deliver to `dst_endpoint`.
    /// Arguments are validated before the socket state is looked at, so a
    /// malformed command reports the same error in every state.
    pub fn send<S: AsRef<str>>(
        &mut self,
        dst_port: u16,
        dst_endpoint: EndpointRef,
        args: &[S],
    ) -> Result<OutboundMessage, SocketError> {
        let command = SocketCommand::from_args(args).map_err(|e| {
            warn!("{}: rejected send to {}:{}: {}", self.name, dst_endpoint, dst_port, e);
            e
        })?;

        match self.state {
            SocketState::Unattached => {}
            SocketState::Attached => return Err(SocketError::AlreadyAttached),
            SocketState::Closed => return Err(SocketError::SocketClosed),
        }

        match command {
            SocketCommand::Attach => {
                let mut message = [0u8; ATTACH_MESSAGE_LEN];
                message.copy_from_slice(&codec::pack_u32(&[ATTACH_SENTINEL]));

                self.dst_port = Some(dst_port);
                self.dst_endpoint = Some(dst_endpoint);
                self.state = SocketState::Attached;
                info!("{}: attaching to {}:{}", self.name, dst_endpoint, dst_port);

                Ok(message)
            }
        }
    }

    /// Evaluate a user `socket-broadcast` command.
    ///
    /// Broadcast has no wire behavior for this service; the call is logged
    /// and nothing is handed to the transport.
    pub fn broadcast<S: AsRef<str>>(
        &self,
        dst_endpoint: EndpointRef,
        dst_port: u16,
        args: &[S],
    ) -> Option<OutboundMessage> {
        info!(
            "{}-broadcast: called via {} port {} ({} args)",
            self.name,
            dst_endpoint,
            dst_port,
            args.len()
        );
        None
    }

    /// Render an inbound data frame as a log line.
    pub fn on_data(&self, frame: &InboundFrame) -> alloc::string::String {
        if self.state != SocketState::Attached {
            debug!("{}: data from {} while {:?}", self.name, frame.source, self.state);
        }

        match TelemetryReading::decode(&frame.payload) {
            Some(reading) => format!(
                "{} received temperature/humidity: {}: {} {}",
                self.name,
                frame.source,
                codec::to_hex(&frame.payload),
                reading
            ),
            None => {
                warn!(
                    "{}: discarding {}-byte payload from {}",
                    self.name,
                    frame.payload.len(),
                    frame.source
                );
                format!(
                    "{} invalid data: {}, {}, {}",
                    self.name,
                    frame.source,
                    frame.source_port,
                    codec::to_hex(&frame.payload)
                )
            }
        }
    }

    /// Called by the transport once the socket is closed. Closing twice is
    /// a no-op.
    pub fn on_close(&mut self, status: i32) {
        if self.state == SocketState::Closed {
            debug!("{}-onClose: already closed (status {})", self.name, status);
            return;
        }
        info!("{}-onClose: called (status {})", self.name, status);
        self.state = SocketState::Closed;
    }
}

impl Default for TelemetrySocket {
    fn default() -> Self {
        Self::new()
    }
}
