/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use rustls::{ClientConnection, StreamOwned};
use socket2::{Domain, Protocol, SockAddr, Socket, TcpKeepalive, Type};

use super::{
    DialCancelToken, IcapDriverError, IcapServiceConfig, IcapTlsClientConfig, TcpKeepAliveConfig,
};

#[cfg(unix)]
const CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(20);

pub enum IcapStream {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl IcapStream {
    fn tcp(&self) -> &TcpStream {
        match self {
            IcapStream::Plain(s) => s,
            IcapStream::Tls(s) => s.get_ref(),
        }
    }

    pub(super) fn shutdown(&mut self) -> io::Result<()> {
        if let IcapStream::Tls(s) = self {
            s.conn.send_close_notify();
            s.flush()?;
        }
        match self.tcp().shutdown(Shutdown::Both) {
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            r => r,
        }
    }
}

impl Read for IcapStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            IcapStream::Plain(s) => s.read(buf),
            IcapStream::Tls(s) => s.read(buf),
        }
    }
}

impl Write for IcapStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            IcapStream::Plain(s) => s.write(buf),
            IcapStream::Tls(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            IcapStream::Plain(s) => s.flush(),
            IcapStream::Tls(s) => s.flush(),
        }
    }
}

pub type IcapClientReader = BufReader<IcapStream>;

/// The single live socket of a driver. Writes go straight to the stream
/// under the reader buffer.
pub(super) struct IcapClientConnection {
    pub(super) reader: IcapClientReader,
}

impl IcapClientConnection {
    fn new(stream: IcapStream) -> Self {
        IcapClientConnection {
            reader: BufReader::new(stream),
        }
    }

    #[inline]
    pub(super) fn writer(&mut self) -> &mut IcapStream {
        self.reader.get_mut()
    }
}

pub(super) struct IcapConnector<'a> {
    host: &'a str,
    port: u16,
    config: &'a IcapServiceConfig,
}

impl<'a> IcapConnector<'a> {
    pub(super) fn new(host: &'a str, port: u16, config: &'a IcapServiceConfig) -> Self {
        IcapConnector { host, port, config }
    }

    fn resolve(&self) -> Result<Vec<SocketAddr>, IcapDriverError> {
        let addrs: Vec<SocketAddr> = (self.host, self.port)
            .to_socket_addrs()
            .map_err(|e| IcapDriverError::ResolveFailed(self.host.to_string(), e))?
            .collect();
        if addrs.is_empty() {
            return Err(IcapDriverError::NoResolvedAddress(self.host.to_string()));
        }
        Ok(addrs)
    }

    pub(super) fn create(
        &self,
        cancel: Option<&DialCancelToken>,
    ) -> Result<IcapClientConnection, IcapDriverError> {
        let peers = self.resolve()?;
        let dial_timeout = self.config.dial_timeout();
        let tcp = match cancel {
            Some(token) => {
                dial_cancellable(&peers, dial_timeout, &self.config.tcp_keepalive, token)?
            }
            None => dial(&peers, dial_timeout, &self.config.tcp_keepalive)?,
        };

        let stream = match &self.config.tls_client {
            Some(tls) => self.tls_handshake(tls, tcp)?,
            None => IcapStream::Plain(tcp),
        };
        let tcp = stream.tcp();
        tcp.set_read_timeout(Some(self.config.read_timeout()))
            .map_err(IcapDriverError::SocketSetupFailed)?;
        tcp.set_write_timeout(Some(self.config.write_timeout()))
            .map_err(IcapDriverError::SocketSetupFailed)?;
        Ok(IcapClientConnection::new(stream))
    }

    fn tls_handshake(
        &self,
        tls: &IcapTlsClientConfig,
        mut tcp: TcpStream,
    ) -> Result<IcapStream, IcapDriverError> {
        let client_config = tls.build().map_err(IcapDriverError::TlsSetupFailed)?;
        let server_name = tls
            .server_name(self.host)
            .map_err(IcapDriverError::TlsSetupFailed)?;
        let mut conn = ClientConnection::new(client_config, server_name)
            .map_err(|e| IcapDriverError::TlsSetupFailed(e.into()))?;

        tcp.set_read_timeout(Some(tls.handshake_timeout))
            .map_err(IcapDriverError::SocketSetupFailed)?;
        tcp.set_write_timeout(Some(tls.handshake_timeout))
            .map_err(IcapDriverError::SocketSetupFailed)?;
        while conn.is_handshaking() {
            conn.complete_io(&mut tcp).map_err(|e| match e.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
                    IcapDriverError::TlsHandshakeTimeout
                }
                _ => IcapDriverError::TlsHandshakeFailed(e),
            })?;
        }
        Ok(IcapStream::Tls(Box::new(StreamOwned::new(conn, tcp))))
    }
}

fn new_socket(peer: SocketAddr, keepalive: &TcpKeepAliveConfig) -> io::Result<Socket> {
    let socket = Socket::new(Domain::for_address(peer), Type::STREAM, Some(Protocol::TCP))?;
    if keepalive.is_enabled() {
        let mut setting = TcpKeepalive::new().with_time(keepalive.idle_time());
        if let Some(interval) = keepalive.probe_interval() {
            setting = setting.with_interval(interval);
        }
        socket.set_tcp_keepalive(&setting)?;
    }
    Ok(socket)
}

fn into_stream(socket: Socket) -> io::Result<TcpStream> {
    let stream = TcpStream::from(socket);
    stream.set_nodelay(true)?;
    Ok(stream)
}

fn connect_to(
    peer: SocketAddr,
    timeout: Duration,
    keepalive: &TcpKeepAliveConfig,
) -> io::Result<TcpStream> {
    let socket = new_socket(peer, keepalive)?;
    socket.connect_timeout(&SockAddr::from(peer), timeout)?;
    into_stream(socket)
}

fn dial(
    peers: &[SocketAddr],
    timeout: Duration,
    keepalive: &TcpKeepAliveConfig,
) -> Result<TcpStream, IcapDriverError> {
    let deadline = Instant::now() + timeout;
    let mut last_err: Option<io::Error> = None;
    for peer in peers {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(IcapDriverError::DialTimeout);
        }
        match connect_to(*peer, left, keepalive) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    match last_err {
        Some(e) if e.kind() == io::ErrorKind::TimedOut => Err(IcapDriverError::DialTimeout),
        Some(e) => Err(IcapDriverError::DialFailed(e)),
        None => Err(IcapDriverError::DialTimeout),
    }
}

/// Dial on the calling thread, checking the token between short waits for
/// the nonblocking connect to finish.
#[cfg(unix)]
fn dial_cancellable(
    peers: &[SocketAddr],
    timeout: Duration,
    keepalive: &TcpKeepAliveConfig,
    token: &DialCancelToken,
) -> Result<TcpStream, IcapDriverError> {
    let deadline = Instant::now() + timeout;
    let mut last_err: Option<io::Error> = None;
    for peer in peers {
        if token.is_cancelled() {
            return Err(IcapDriverError::DialCancelled);
        }
        if Instant::now() >= deadline {
            return Err(IcapDriverError::DialTimeout);
        }
        match connect_cancellable(*peer, deadline, keepalive, token) {
            Ok(stream) => return Ok(stream),
            Err(IcapDriverError::DialFailed(e)) => last_err = Some(e),
            Err(e) => return Err(e),
        }
    }
    match last_err {
        Some(e) => Err(IcapDriverError::DialFailed(e)),
        None => Err(IcapDriverError::DialTimeout),
    }
}

#[cfg(unix)]
fn connect_cancellable(
    peer: SocketAddr,
    deadline: Instant,
    keepalive: &TcpKeepAliveConfig,
    token: &DialCancelToken,
) -> Result<TcpStream, IcapDriverError> {
    use rustix::io::Errno;

    let socket = new_socket(peer, keepalive).map_err(IcapDriverError::DialFailed)?;
    socket
        .set_nonblocking(true)
        .map_err(IcapDriverError::SocketSetupFailed)?;
    match socket.connect(&SockAddr::from(peer)) {
        Ok(()) => {}
        Err(e)
            if e.kind() == io::ErrorKind::WouldBlock
                || e.raw_os_error() == Some(Errno::INPROGRESS.raw_os_error()) =>
        {
            wait_connected(&socket, deadline, token)?;
        }
        Err(e) => return Err(IcapDriverError::DialFailed(e)),
    }
    socket
        .set_nonblocking(false)
        .map_err(IcapDriverError::SocketSetupFailed)?;
    into_stream(socket).map_err(IcapDriverError::SocketSetupFailed)
}

#[cfg(unix)]
fn wait_connected(
    socket: &Socket,
    deadline: Instant,
    token: &DialCancelToken,
) -> Result<(), IcapDriverError> {
    use rustix::event::{PollFd, PollFlags, Timespec, poll};
    use rustix::io::Errno;

    loop {
        if token.is_cancelled() {
            return Err(IcapDriverError::DialCancelled);
        }
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(IcapDriverError::DialTimeout);
        }
        // always below one second
        let wait = left.min(CANCEL_CHECK_INTERVAL);
        let wait = Timespec {
            tv_sec: 0,
            tv_nsec: wait.subsec_nanos() as _,
        };
        let mut fds = [PollFd::new(socket, PollFlags::OUT)];
        match poll(&mut fds, Some(&wait)) {
            Ok(0) | Err(Errno::INTR) => {}
            Ok(_) => break,
            Err(e) => return Err(IcapDriverError::DialFailed(e.into())),
        }
    }

    match socket.take_error() {
        Ok(None) => Ok(()),
        Ok(Some(e)) | Err(e) => Err(IcapDriverError::DialFailed(e)),
    }
}

#[cfg(not(unix))]
fn dial_cancellable(
    peers: &[SocketAddr],
    timeout: Duration,
    keepalive: &TcpKeepAliveConfig,
    token: &DialCancelToken,
) -> Result<TcpStream, IcapDriverError> {
    if token.is_cancelled() {
        return Err(IcapDriverError::DialCancelled);
    }
    dial(peers, timeout, keepalive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn dial_local() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let stream = dial(
            &[addr],
            Duration::from_secs(2),
            &TcpKeepAliveConfig::default_enabled(),
        )
        .unwrap();
        assert_eq!(stream.peer_addr().unwrap(), addr);
    }

    #[test]
    fn dial_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let r = dial(&[addr], Duration::from_secs(2), &TcpKeepAliveConfig::default());
        assert!(matches!(r, Err(IcapDriverError::DialFailed(_))));
    }

    #[test]
    fn cancelled_before_dial() {
        let token = DialCancelToken::new();
        token.cancel();
        let r = dial_cancellable(
            &["127.0.0.1:1344".parse().unwrap()],
            Duration::from_secs(2),
            &TcpKeepAliveConfig::default(),
            &token,
        );
        assert!(matches!(r, Err(IcapDriverError::DialCancelled)));
    }

    #[test]
    fn cancellable_dial_completes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let token = DialCancelToken::new();
        let stream = dial_cancellable(
            &[addr],
            Duration::from_secs(2),
            &TcpKeepAliveConfig::default(),
            &token,
        )
        .unwrap();
        assert_eq!(stream.peer_addr().unwrap(), addr);
    }

    #[test]
    fn cancellable_dial_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let token = DialCancelToken::new();
        let r = dial_cancellable(
            &[addr],
            Duration::from_secs(2),
            &TcpKeepAliveConfig::default(),
            &token,
        );
        assert!(matches!(r, Err(IcapDriverError::DialFailed(_))));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn cancel_while_connecting() {
        // a listener whose accept queue is full drops further SYNs
        let listener = Socket::new(Domain::IPV4, Type::STREAM, None).unwrap();
        let bind_addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        listener.bind(&SockAddr::from(bind_addr)).unwrap();
        listener.listen(0).unwrap();
        let addr = listener.local_addr().unwrap().as_socket().unwrap();

        let mut held = Vec::new();
        let mut queue_full = false;
        for _ in 0..16 {
            match TcpStream::connect_timeout(&addr, Duration::from_millis(200)) {
                Ok(s) => held.push(s),
                Err(_) => {
                    queue_full = true;
                    break;
                }
            }
        }
        if !queue_full {
            return;
        }

        let token = DialCancelToken::new();
        let canceller = {
            let token = token.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(100));
                token.cancel();
            })
        };
        let started = Instant::now();
        let r = dial_cancellable(
            &[addr],
            Duration::from_secs(10),
            &TcpKeepAliveConfig::default(),
            &token,
        );
        let elapsed = started.elapsed();
        canceller.join().unwrap();
        assert!(matches!(r, Err(IcapDriverError::DialCancelled)));
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_secs(5));
        drop(held);
    }
}
