use std::io;
use std::sync::Arc;

use crate::config::{LogTarget, TransportScheme};

/// Error type returned by channel construction and sends.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// TCP appears in the configuration surface but neither send path
    /// implements it. Must not be approximated by falling back to UDP.
    #[error("TCP endpoint is currently not implemented yet")]
    Unsupported,

    #[error("log transport I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Tag describing which channel variant is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Unestablished,
    Asynchronous,
    Synchronous,
}

/// The live network resource used to transmit serialized records.
///
/// Exactly one variant is active at any time; transitions between them
/// are driven by [`crate::sender::LogSender`] lifecycle calls, never by
/// emits.
#[derive(Debug)]
pub enum Channel {
    /// No channel yet; records go to the pending buffer.
    Unestablished,
    /// Connected tokio socket; sends are non-blocking, unsent backlog is
    /// bounded by the kernel's own socket send buffer.
    Asynchronous(tokio::net::UdpSocket),
    /// Connected blocking socket for the shutdown path. Shared so a send
    /// can run outside the state lock.
    Synchronous(Arc<std::net::UdpSocket>),
}

impl Channel {
    /// Open the asynchronous datagram channel. Awaits socket
    /// construction; the caller installs the result once it resolves.
    pub async fn open_async(target: &LogTarget) -> Result<Channel, TransportError> {
        match target.scheme {
            TransportScheme::Udp => {
                let socket = tokio::net::UdpSocket::bind("0.0.0.0:0").await?;
                socket.connect(target.addr()).await?;
                // try_send reports WouldBlock until the reactor has seen
                // the socket's first write-readiness event; wait for it
                // here so the drain that follows installation can send.
                socket.writable().await?;
                Ok(Channel::Asynchronous(socket))
            }
            TransportScheme::Tcp => Err(TransportError::Unsupported),
        }
    }

    /// Open the synchronous (blocking) fallback socket.
    pub fn open_sync(target: &LogTarget) -> Result<Channel, TransportError> {
        match target.scheme {
            TransportScheme::Udp => {
                let socket = std::net::UdpSocket::bind("0.0.0.0:0")?;
                socket.connect(target.addr())?;
                Ok(Channel::Synchronous(Arc::new(socket)))
            }
            TransportScheme::Tcp => Err(TransportError::Unsupported),
        }
    }

    pub fn state(&self) -> ChannelState {
        match self {
            Channel::Unestablished => ChannelState::Unestablished,
            Channel::Asynchronous(_) => ChannelState::Asynchronous,
            Channel::Synchronous(_) => ChannelState::Synchronous,
        }
    }

    /// Send one datagram through the active variant: non-blocking on the
    /// asynchronous socket, blocking on the synchronous one. One call is
    /// exactly one network send; failures are not retried here.
    pub fn send(&self, payload: &[u8]) -> Result<(), TransportError> {
        match self {
            Channel::Unestablished => Err(TransportError::Io(io::Error::new(
                io::ErrorKind::NotConnected,
                "no log channel established",
            ))),
            Channel::Asynchronous(socket) => {
                socket.try_send(payload)?;
                Ok(())
            }
            Channel::Synchronous(socket) => {
                socket.send(payload)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn udp_target(port: u16) -> LogTarget {
        LogTarget {
            scheme: TransportScheme::Udp,
            host: "127.0.0.1".to_string(),
            port,
        }
    }

    fn tcp_target() -> LogTarget {
        LogTarget {
            scheme: TransportScheme::Tcp,
            host: "127.0.0.1".to_string(),
            port: 514,
        }
    }

    #[test]
    fn unestablished_send_is_an_io_error() {
        let err = Channel::Unestablished.send(b"x").unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }

    #[test]
    fn sync_channel_delivers_datagrams() {
        let listener = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        listener
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let port = listener.local_addr().unwrap().port();

        let channel = Channel::open_sync(&udp_target(port)).unwrap();
        assert_eq!(channel.state(), ChannelState::Synchronous);
        channel.send(b"hello").unwrap();

        let mut buf = [0u8; 64];
        let n = listener.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");
    }

    #[test]
    fn sync_tcp_is_unsupported() {
        let err = Channel::open_sync(&tcp_target()).unwrap_err();
        assert!(matches!(err, TransportError::Unsupported));
    }

    #[tokio::test]
    async fn async_tcp_is_unsupported() {
        let err = Channel::open_async(&tcp_target()).await.unwrap_err();
        assert!(matches!(err, TransportError::Unsupported));
    }

    #[tokio::test]
    async fn async_channel_delivers_datagrams() {
        let listener = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        listener
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let port = listener.local_addr().unwrap().port();

        let channel = Channel::open_async(&udp_target(port)).await.unwrap();
        assert_eq!(channel.state(), ChannelState::Asynchronous);
        channel.send(b"hello").unwrap();

        let mut buf = [0u8; 64];
        let n = listener.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");
    }
}
