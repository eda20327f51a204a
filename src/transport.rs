//! Request/reply exchange with a lamp.

use std::future::Future;
use std::time::Duration;

use log::debug;

use crate::config::DeviceAddress;
use crate::errors::Error;
use crate::runtime::{self, AsyncUdpSocket, UdpSocket};

type Result<T> = std::result::Result<T, Error>;

/// Sends one datagram and waits for one reply.
///
/// Implementations do not retry; the caller decides what a failure means.
pub trait Transport: Send {
    fn send(
        &mut self,
        address: &DeviceAddress,
        payload: &[u8],
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// UDP transport backed by a single socket for the lifetime of a lamp.
///
/// The socket is not connected, so the target address can change between
/// calls without rebinding. Replies are not matched to requests: a late
/// reply to an earlier command is taken as the answer to the current one.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    timeout: Duration,
}

impl UdpTransport {
    pub const TIMEOUT_MS: u64 = 5000;
    const BUFFER_SIZE: usize = 1024;

    /// Bind an ephemeral local socket.
    pub async fn bind() -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| Error::socket("bind", e))?;

        Ok(UdpTransport {
            socket,
            timeout: Duration::from_millis(Self::TIMEOUT_MS),
        })
    }

    pub fn socket(&self) -> &UdpSocket {
        &self.socket
    }

    #[cfg(test)]
    pub(crate) fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

impl Transport for UdpTransport {
    async fn send(&mut self, address: &DeviceAddress, payload: &[u8]) -> Result<Vec<u8>> {
        let target = address.to_string();

        self.socket
            .send_to(payload, &target)
            .await
            .map_err(|e| Error::socket("send", e))?;

        let mut buffer = [0u8; Self::BUFFER_SIZE];
        let (bytes, source) = runtime::timeout(self.timeout, self.socket.recv_from(&mut buffer))
            .await
            .map_err(|_| Error::timeout(&target, self.timeout.as_millis() as u64))?
            .map_err(|e| Error::socket("receive", e))?;

        debug!("{} | {} bytes from {}", address.host(), bytes, source);
        Ok(buffer[..bytes].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind() {
        let transport = UdpTransport::bind().await.unwrap();
        assert_ne!(transport.socket().local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_exchange() {
        // Stand-in lamp on the firmware port; skip if something already owns it.
        let Ok(lamp) = tokio::net::UdpSocket::bind(("127.0.0.1", DeviceAddress::PORT)).await else {
            return;
        };
        let address = DeviceAddress::new("127.0.0.1");

        let responder = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (n, peer) = lamp.recv_from(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"GET");
            lamp.send_to(b"GYVER 1 2 3 4 1", peer).await.unwrap();
        });

        let mut transport = UdpTransport::bind().await.unwrap();
        let reply = transport.send(&address, b"GET").await.unwrap();
        assert_eq!(reply, b"GYVER 1 2 3 4 1");

        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_timeout() {
        // Loopback, but not the address the exchange test listens on.
        let address = DeviceAddress::new("127.0.0.2");
        let mut transport = UdpTransport::bind().await.unwrap();
        transport.set_timeout(Duration::from_millis(200));

        let err = transport.send(&address, b"P_ON").await.unwrap_err();
        assert_eq!(
            err,
            Error::Timeout {
                address: String::from("127.0.0.2:8888"),
                timeout_ms: 200,
            }
        );
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_unresolvable_host() {
        let address = DeviceAddress::new("gyverlamp.invalid");
        let mut transport = UdpTransport::bind().await.unwrap();

        let err = transport.send(&address, b"GET").await.unwrap_err();
        assert!(
            matches!(&err, Error::Socket { action, .. } if action == "send"),
            "{err:?}"
        );
        assert!(err.is_transport());
    }
}
