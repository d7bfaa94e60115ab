use async_trait::async_trait;
use parking_lot::Mutex;
use std::error::Error;
use std::sync::Arc;

use crate::component::ServiceComponent;
use crate::config::{ConfigError, LogTarget, ServiceIdentity, TransportScheme};
use crate::payload::normalize;
use crate::record::LogRecord;
use crate::transport::{Channel, ChannelState, TransportError};

/// Log-shipping component: normalizes records and forwards each one as a
/// single datagram to the configured collector.
///
/// Owns the active [`Channel`] and a pending buffer for records emitted
/// before any channel exists. The lifecycle is driven externally:
/// [`LogSender::start_async`] on init, steady-state [`LogSender::emit`],
/// then [`LogSender::close`] + [`LogSender::stop_and_fallback_to_sync`]
/// on cleanup so late records still reach the network after the event
/// loop stops servicing sends.
///
/// `emit`/`submit` are safe to call concurrently from any thread or
/// task; one mutex guards the buffer and channel state, and it is never
/// held across a blocking network send.
///
/// Known limitation: if the host cancels `start_async` mid-await, no
/// channel was installed and the sender stays `Unestablished` with its
/// pending records intact; no rollback is attempted.
pub struct LogSender {
    target: LogTarget,
    identity: ServiceIdentity,
    inner: Mutex<SenderInner>,
}

struct SenderInner {
    channel: Channel,
    pending: Vec<Vec<u8>>,
}

impl SenderInner {
    /// Push every pending payload through the current channel, in FIFO
    /// order, and clear the buffer. Each payload is attempted exactly
    /// once; the first error is reported after the loop, and the buffer
    /// is cleared regardless so no record is ever sent twice.
    fn drain_pending(&mut self) -> Result<(), TransportError> {
        let pending = std::mem::take(&mut self.pending);
        let mut first_err = None;
        for payload in pending {
            if let Err(err) = self.channel.send(&payload) {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}

impl LogSender {
    /// Construct a sender for the given destination URL.
    ///
    /// **Parameters**
    /// - `log_url`: `scheme://host:port`; `udp` or `tcp`, lowercase.
    /// - `identity`: service identity injected into every payload.
    ///
    /// **Returns**
    /// - `Err(ConfigError)` for an unrecognized scheme or a malformed
    ///   URL, before any lifecycle call. A `tcp` URL parses here and
    ///   fails later, at the first lifecycle call.
    pub fn new(log_url: &str, identity: ServiceIdentity) -> Result<Self, ConfigError> {
        let target = LogTarget::parse(log_url)?;
        Ok(Self {
            target,
            identity,
            inner: Mutex::new(SenderInner {
                channel: Channel::Unestablished,
                pending: Vec::new(),
            }),
        })
    }

    /// Normalize a record and submit the resulting payload.
    pub fn emit(&self, record: &LogRecord) -> Result<(), TransportError> {
        self.submit(normalize(record, &self.identity))
    }

    /// Submit one serialized payload.
    ///
    /// With a channel active the payload is sent immediately (one call,
    /// one datagram); while `Unestablished` it is appended to the
    /// pending buffer instead. Send failures are propagated, not
    /// retried and not re-buffered.
    pub fn submit(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        match &inner.channel {
            Channel::Unestablished => {
                inner.pending.push(payload);
                Ok(())
            }
            Channel::Asynchronous(_) => inner.channel.send(&payload),
            Channel::Synchronous(socket) => {
                // Blocking send; run it outside the lock so concurrent
                // emitters are not stalled behind it.
                let socket = Arc::clone(socket);
                drop(inner);
                socket.send(&payload)?;
                Ok(())
            }
        }
    }

    /// Open the asynchronous channel and become the active sender.
    ///
    /// Fails with [`TransportError::Unsupported`] for a TCP target
    /// before touching channel state. The lock is not held across the
    /// socket await, so records emitted during that window land in the
    /// pending buffer; the buffer is then drained in FIFO order and
    /// cleared under the same lock that guards appends, so nothing is
    /// lost, duplicated, or reordered relative to the pre-drain
    /// sequence.
    pub async fn start_async(&self) -> Result<(), TransportError> {
        let channel = Channel::open_async(&self.target).await?;
        let mut inner = self.inner.lock();
        inner.channel = channel;
        inner.drain_pending()
    }

    /// Close the active channel and fall back to a blocking socket.
    ///
    /// This is the designed shutdown path: records emitted after the
    /// event loop stops servicing sends would otherwise silently
    /// vanish. Closing an absent channel is a no-op. Records buffered
    /// between the close and the fallback are drained through the new
    /// socket. Fails with [`TransportError::Unsupported`] for a TCP
    /// target before touching channel state.
    pub fn stop_and_fallback_to_sync(&self) -> Result<(), TransportError> {
        let channel = Channel::open_sync(&self.target)?;
        let mut inner = self.inner.lock();
        // Installing the new channel drops (closes) whichever one was
        // active, including none at all.
        inner.channel = channel;
        inner.drain_pending()
    }

    /// Close the active channel, if any, and return to `Unestablished`.
    /// Idempotent; closing with no channel active does nothing.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.channel = Channel::Unestablished;
    }

    pub fn state(&self) -> ChannelState {
        self.inner.lock().channel.state()
    }

    /// Number of payloads waiting for a channel.
    pub fn pending_len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn scheme(&self) -> TransportScheme {
        self.target.scheme
    }

    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }
}

#[async_trait]
impl ServiceComponent for LogSender {
    async fn on_async_init(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.start_async().await?;
        Ok(())
    }

    async fn on_async_cleanup(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.close();
        self.stop_and_fallback_to_sync()?;
        Ok(())
    }
}
