use may::coroutine::JoinHandle;
use may_minihttp::HttpService;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

/// Typed wrapper around `may_minihttp`'s HTTP server.
pub struct HttpServer<T>(pub T);

/// Handle to a running HTTP server.
///
/// Lets callers wait until the listener accepts connections, stop the
/// server, or block on it indefinitely.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// The address the server is bound to.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server to be ready to accept connections.
    ///
    /// Polls the bound address with TCP connects. Useful in tests to avoid
    /// racing the listener.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if the server is not reachable within ~250ms
    /// (50 attempts x 5ms).
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop the server and wait for its coroutine to finish.
    pub fn stop(self) {
        // SAFETY: cancel() is marked unsafe by the may runtime. The handle
        // is valid (we own it) and cancellation is the intended shutdown
        // path for the accept loop.
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
    }

    /// Block until the server coroutine exits.
    ///
    /// The server runs indefinitely unless stopped externally.
    ///
    /// # Errors
    ///
    /// Returns an error if the server coroutine panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Start the HTTP server on the given address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the port cannot be
    /// bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let handle = may_minihttp::HttpServer(self.0).start(addr)?;
        Ok(ServerHandle { addr, handle })
    }
}
