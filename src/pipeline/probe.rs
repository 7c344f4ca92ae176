//! Connectivity probe: decides the online/offline route per request.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;

#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Whether the online provider is likely reachable. Never errors; any
    /// failure reads as offline. Callers must re-probe on every request —
    /// connectivity flaps independently of request lifecycles.
    async fn is_online(&self) -> bool;
}

/// A short-timeout TCP connect against a well-known endpoint
/// (by default a public DNS resolver).
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(addr: String, timeout: Duration) -> Self {
        Self { addr, timeout }
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn is_online(&self) -> bool {
        matches!(
            tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await,
            Ok(Ok(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_target_reads_as_offline() {
        // Reserved TEST-NET-1 address; nothing listens there.
        let probe = TcpProbe::new("192.0.2.1:53".to_string(), Duration::from_millis(200));
        assert!(!probe.is_online().await);
    }

    #[tokio::test]
    async fn unparsable_target_reads_as_offline() {
        let probe = TcpProbe::new("not an address".to_string(), Duration::from_millis(200));
        assert!(!probe.is_online().await);
    }
}
