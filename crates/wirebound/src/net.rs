use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
#[cfg(unix)]
use std::os::unix::net::{UnixListener, UnixStream};
#[cfg(unix)]
use std::path::PathBuf;

use tracing::{debug, info};

/// A named endpoint the CLI can dial or listen on.
#[derive(Clone, Debug)]
pub enum Endpoint {
    Tcp(String),
    #[cfg(unix)]
    Unix(PathBuf),
}

impl Endpoint {
    /// Interpret `addr` as a Unix socket path when `unix` is set,
    /// otherwise as a TCP `host:port`.
    #[cfg(unix)]
    pub fn from_addr(addr: &str, unix: bool) -> Self {
        if unix {
            Endpoint::Unix(PathBuf::from(addr))
        } else {
            Endpoint::Tcp(addr.to_string())
        }
    }

    #[cfg(not(unix))]
    pub fn from_addr(addr: &str, _unix: bool) -> Self {
        Endpoint::Tcp(addr.to_string())
    }

    pub fn connect(&self) -> std::io::Result<Conduit> {
        match self {
            Endpoint::Tcp(addr) => {
                let stream = TcpStream::connect(addr)?;
                debug!(%addr, "connected over tcp");
                Ok(Conduit::Tcp(stream))
            }
            #[cfg(unix)]
            Endpoint::Unix(path) => {
                let stream = UnixStream::connect(path)?;
                debug!(?path, "connected over unix socket");
                Ok(Conduit::Unix(stream))
            }
        }
    }

    pub fn bind(&self) -> std::io::Result<Acceptor> {
        match self {
            Endpoint::Tcp(addr) => {
                let listener = TcpListener::bind(addr)?;
                info!(%addr, "listening on tcp");
                Ok(Acceptor::Tcp(listener))
            }
            #[cfg(unix)]
            Endpoint::Unix(path) => {
                if path.exists() {
                    std::fs::remove_file(path)?;
                }
                let listener = UnixListener::bind(path)?;
                info!(?path, "listening on unix socket");
                Ok(Acceptor::Unix(listener))
            }
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Tcp(addr) => write!(f, "tcp:{addr}"),
            #[cfg(unix)]
            Endpoint::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

/// A connected stream endpoint.
pub enum Conduit {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Conduit {
    /// Clone the underlying descriptor so one connection can be split
    /// into a read half and a write half.
    pub fn try_clone(&self) -> std::io::Result<Conduit> {
        match self {
            Conduit::Tcp(stream) => stream.try_clone().map(Conduit::Tcp),
            #[cfg(unix)]
            Conduit::Unix(stream) => stream.try_clone().map(Conduit::Unix),
        }
    }

    pub fn peer_name(&self) -> String {
        match self {
            Conduit::Tcp(stream) => stream
                .peer_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "tcp-peer".to_string()),
            #[cfg(unix)]
            Conduit::Unix(_) => "unix-peer".to_string(),
        }
    }
}

impl Read for Conduit {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Conduit::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Conduit::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for Conduit {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Conduit::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Conduit::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Conduit::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Conduit::Unix(stream) => stream.flush(),
        }
    }
}

/// A bound listener for either endpoint kind.
pub enum Acceptor {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl Acceptor {
    pub fn accept(&self) -> std::io::Result<Conduit> {
        match self {
            Acceptor::Tcp(listener) => {
                let (stream, addr) = listener.accept()?;
                debug!(%addr, "accepted tcp connection");
                Ok(Conduit::Tcp(stream))
            }
            #[cfg(unix)]
            Acceptor::Unix(listener) => {
                let (stream, _addr) = listener.accept()?;
                debug!("accepted unix connection");
                Ok(Conduit::Unix(stream))
            }
        }
    }
}
