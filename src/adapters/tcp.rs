//! TCP transport to the collector.
//!
//! ESP-IDF exposes lwIP through the BSD socket API, so `std::net` works
//! unchanged on the device and on the host.  Connect and the response wait
//! are each bounded by the transport timeout.

use core::time::Duration;
use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

use log::debug;

use crate::app::ports::{Connection, Connector};
use crate::config::ApiEndpoint;
use crate::error::TransportError;

pub struct TcpConnector {
    addr: SocketAddr,
    timeout: Duration,
}

impl TcpConnector {
    pub fn new(endpoint: &ApiEndpoint, timeout: Duration) -> Self {
        Self {
            addr: endpoint.socket_addr(),
            timeout,
        }
    }
}

impl Connector for TcpConnector {
    type Conn = TcpConnection;

    fn connect(&mut self) -> Result<TcpConnection, TransportError> {
        let stream = TcpStream::connect_timeout(&self.addr, self.timeout)
            .map_err(|e| TransportError::from_connect(&e))?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        stream.set_nodelay(true)?;
        debug!("tcp: connected to {}", self.addr);
        Ok(TcpConnection { stream })
    }
}

pub struct TcpConnection {
    stream: TcpStream,
}

impl Connection for TcpConnection {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.stream.write_all(data)?;
        self.stream.flush()?;
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        Ok(self.stream.read(buf)?)
    }

    fn close(self) {
        // Already-closed peers make shutdown fail; nothing left to do then.
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
