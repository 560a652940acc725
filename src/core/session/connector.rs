use crate::core::session::clock::{Clock, SystemClock};
use crate::core::session::session::DeviceSession;
use crate::domain::config::{FlipperConfig, ProtocolConfig};
use crate::domain::error::FlipperResult;
use crate::infrastructure::serial::{
    Endpoint, LinkSettings, NativeOpener, PortOpener, PortReclaimer, PortResolver, ProcessReclaimer,
};
use tracing::debug;

/// Session type produced by a connector
pub type SessionOf<O, C> = DeviceSession<<O as PortOpener>::Link, C>;

/// Resolves the endpoint and opens sessions on it.
///
/// The endpoint is resolved again for every session since the device node may
/// change between plug-ins.
pub struct Connector<O, R, C = SystemClock> {
    resolver: PortResolver,
    explicit_port: Option<String>,
    settings: LinkSettings,
    protocol: ProtocolConfig,
    opener: O,
    reclaimer: R,
    clock: C,
}

impl Connector<NativeOpener, ProcessReclaimer, SystemClock> {
    /// Real serial ports and process-based port recovery
    pub fn from_config(config: &FlipperConfig) -> Self {
        Self::new(
            config,
            NativeOpener,
            ProcessReclaimer::from_config(&config.device),
            SystemClock,
        )
    }
}

impl<O, R, C> Connector<O, R, C>
where
    O: PortOpener,
    R: PortReclaimer,
    C: Clock + Clone,
{
    pub fn new(config: &FlipperConfig, opener: O, reclaimer: R, clock: C) -> Self {
        Self {
            resolver: PortResolver::from_config(&config.device),
            explicit_port: config.device.port.clone(),
            settings: LinkSettings::from(&config.device),
            protocol: config.protocol.clone(),
            opener,
            reclaimer,
            clock,
        }
    }

    /// Override the configured endpoint
    pub fn with_port(mut self, port: Option<String>) -> Self {
        if port.is_some() {
            self.explicit_port = port;
        }
        self
    }

    pub fn endpoint(&self) -> FlipperResult<Endpoint> {
        self.resolver.resolve(self.explicit_port.as_deref())
    }

    pub fn connect(&self) -> FlipperResult<SessionOf<O, C>> {
        let endpoint = self.endpoint()?;
        DeviceSession::open(
            endpoint,
            self.settings.clone(),
            &self.opener,
            &self.reclaimer,
            &self.protocol,
            self.clock.clone(),
        )
    }

    /// Run `f` on a fresh session; the session is closed however `f` returns.
    pub fn with_session<T, F>(&self, f: F) -> FlipperResult<T>
    where
        F: FnOnce(&mut SessionOf<O, C>) -> FlipperResult<T>,
    {
        let mut session = self.connect()?;
        let result = f(&mut session);
        if let Err(e) = &result {
            debug!(session = %session.id(), "Session body failed: {}", e);
        }
        session.close();
        result
    }

    /// Reclaim the endpoint from other processes
    pub fn free(&self) -> FlipperResult<Endpoint> {
        let endpoint = self.endpoint()?;
        self.reclaimer.reclaim(&endpoint);
        Ok(endpoint)
    }
}
