use crate::core::communication::{CollectionWindow, Command, NoiseFilter, Response};
use crate::core::session::clock::{Clock, SystemClock};
use crate::core::session::state::{SessionState, SessionSummary};
use crate::domain::config::{ProtocolConfig, SUCCESS_MARKER};
use crate::domain::error::{FlipperError, FlipperResult};
use crate::infrastructure::serial::{Endpoint, LinkSettings, PortOpener, PortReclaimer, SerialLink};
use std::io;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

const READ_CHUNK: usize = 1024;

/// One exclusive connection to the device and its command/response protocol.
///
/// Exchanges take `&mut self`: one command is in flight at a time. The handle
/// is released by [`DeviceSession::close`] or, failing that, on drop.
pub struct DeviceSession<L: SerialLink, C: Clock = SystemClock> {
    id: String,
    endpoint: Endpoint,
    settings: LinkSettings,
    link: Option<L>,
    clock: C,
    filter: NoiseFilter,
    window: Duration,
    transmit_window: Duration,
    poll_interval: Duration,
    exchanges: u64,
}

impl<L: SerialLink, C: Clock> DeviceSession<L, C> {
    /// Open `endpoint` exclusively.
    ///
    /// A failed open triggers one reclaim of the port and one retry; a second
    /// failure is [`FlipperError::Connection`].
    pub fn open<O, R>(
        endpoint: Endpoint,
        settings: LinkSettings,
        opener: &O,
        reclaimer: &R,
        protocol: &ProtocolConfig,
        clock: C,
    ) -> FlipperResult<Self>
    where
        O: PortOpener<Link = L>,
        R: PortReclaimer + ?Sized,
    {
        let link = match opener.open(&endpoint, &settings) {
            Ok(link) => link,
            Err(first) => {
                warn!("Opening {} failed: {}", endpoint, first);
                reclaimer.reclaim(&endpoint);
                opener
                    .open(&endpoint, &settings)
                    .map_err(|source| FlipperError::Connection {
                        endpoint: endpoint.to_string(),
                        source,
                    })?
            }
        };

        let id = uuid::Uuid::new_v4().simple().to_string();
        info!(session = %id, "Session opened on {} at {} baud", endpoint, settings.baud_rate);

        Ok(Self {
            id,
            endpoint,
            settings,
            link: Some(link),
            clock,
            filter: NoiseFilter::from_config(protocol),
            window: protocol.window(),
            transmit_window: protocol.transmit_window(),
            poll_interval: protocol.poll_interval(),
            exchanges: 0,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn state(&self) -> SessionState {
        if self.link.is_some() {
            SessionState::Open
        } else {
            SessionState::Closed
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id.clone(),
            endpoint: self.endpoint.to_string(),
            baud_rate: self.settings.baud_rate,
            state: self.state(),
            exchanges: self.exchanges,
        }
    }

    /// Send one command and collect its filtered response.
    ///
    /// Silence for the whole window is an empty response, not an error.
    pub fn exchange(&mut self, command: &Command) -> FlipperResult<Response> {
        let transmit_error = |source: io::Error| FlipperError::Transmit {
            command: command.text.clone(),
            source,
        };

        let link = self.link.as_mut().ok_or_else(|| {
            transmit_error(io::Error::new(io::ErrorKind::NotConnected, "session is closed"))
        })?;

        let window = match command.window {
            CollectionWindow::Standard => self.window,
            CollectionWindow::Transmit => self.transmit_window,
            CollectionWindow::Fixed(window) => window,
        };

        debug!(session = %self.id, "> {} ({:?} window)", command.text, window);
        let received = collect(link, &self.clock, command, window, self.poll_interval).map_err(transmit_error)?;
        self.exchanges += 1;

        trace!(session = %self.id, "Received {} bytes: {}", received.len(), hex::encode(&received));
        let response = self.filter.apply_bytes(&received);
        debug!(session = %self.id, "< {} line(s)", response.lines.len());
        Ok(response)
    }

    /// Exchange `command` and shape the reply by its [`ResponseMode`]
    ///
    /// [`ResponseMode`]: crate::core::communication::ResponseMode
    pub fn send(&mut self, command: &Command) -> FlipperResult<Vec<String>> {
        Ok(self.exchange(command)?.render(command.mode))
    }

    /// Last meaningful line of the reply, or `""`
    pub fn command(&mut self, text: &str, window: Option<Duration>) -> FlipperResult<String> {
        let command = with_optional_window(Command::new(text), window);
        Ok(self.send(&command)?.pop().unwrap_or_default())
    }

    /// Every meaningful line of the reply
    pub fn command_all(&mut self, text: &str, window: Option<Duration>) -> FlipperResult<Vec<String>> {
        let command = with_optional_window(Command::new(text), window).all_lines();
        self.send(&command)
    }

    /// Transmit a signal file stored on the device.
    ///
    /// The device usually acknowledges a good transmission with no text, so an
    /// empty reply yields [`SUCCESS_MARKER`].
    pub fn transmit_stored_signal(&mut self, path: &str, repeat: u32, device: u32) -> FlipperResult<String> {
        let command = Command::transmit_from_file(path, repeat, device);
        let line = self.send(&command)?.pop().unwrap_or_default();

        if line.is_empty() {
            Ok(SUCCESS_MARKER.to_string())
        } else {
            Ok(line)
        }
    }

    /// Release the handle. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(link) = self.link.take() {
            drop(link);
            info!(session = %self.id, "Session on {} closed after {} exchange(s)", self.endpoint, self.exchanges);
        }
    }
}

impl<L: SerialLink, C: Clock> Drop for DeviceSession<L, C> {
    fn drop(&mut self) {
        self.close();
    }
}

fn with_optional_window(command: Command, window: Option<Duration>) -> Command {
    match window {
        Some(window) => command.with_window(window),
        None => command,
    }
}

/// Clear, write, flush, then poll until the window closes.
fn collect<L, C>(
    link: &mut L,
    clock: &C,
    command: &Command,
    window: Duration,
    poll_interval: Duration,
) -> io::Result<Vec<u8>>
where
    L: SerialLink,
    C: Clock,
{
    link.clear_input()?;
    link.write_all(&command.to_wire())?;
    link.flush()?;

    let deadline = clock.now() + window;
    let mut received = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];

    while clock.now() < deadline {
        let available = link.bytes_available()?;
        if available == 0 {
            clock.sleep(poll_interval);
            continue;
        }

        let n = link.read(&mut chunk[..available.min(READ_CHUNK)])?;
        if n == 0 {
            clock.sleep(poll_interval);
        } else {
            received.extend_from_slice(&chunk[..n]);
        }
    }

    Ok(received)
}
