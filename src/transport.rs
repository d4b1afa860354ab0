//! The datagram seam between the correlation engine and the network.
//!
//! [`Transport`] opens one [`DatagramSocket`] per request. The production
//! implementation, [`UdpTransport`], binds an ephemeral UDP port on the
//! selected async runtime. Tests swap in an in-memory double.

use std::fmt;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use crate::runtime::{self, AsyncUdpSocket, BoxFuture};

/// A bound datagram socket, owned by a single request.
pub trait DatagramSocket: Send + Sync {
    fn send_to<'a>(&'a self, buf: &'a [u8], addr: SocketAddr)
    -> BoxFuture<'a, io::Result<usize>>;

    fn recv_from<'a>(&'a self, buf: &'a mut [u8])
    -> BoxFuture<'a, io::Result<(usize, SocketAddr)>>;

    fn set_broadcast(&self, broadcast: bool) -> io::Result<()>;
}

/// Factory for per-request sockets.
pub trait Transport: Send + Sync + fmt::Debug {
    fn open(&self) -> BoxFuture<'_, io::Result<Box<dyn DatagramSocket>>>;
}

/// UDP on the active async runtime.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    bind_address: SocketAddr,
}

impl UdpTransport {
    /// Binds each request to `bind_address`. Port 0 picks an ephemeral port.
    pub fn new(bind_address: SocketAddr) -> Self {
        UdpTransport { bind_address }
    }
}

impl Default for UdpTransport {
    fn default() -> Self {
        Self::new(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)))
    }
}

impl Transport for UdpTransport {
    fn open(&self) -> BoxFuture<'_, io::Result<Box<dyn DatagramSocket>>> {
        Box::pin(async move {
            let socket = runtime::UdpSocket::bind(self.bind_address).await?;
            Ok(Box::new(RuntimeSocket(socket)) as Box<dyn DatagramSocket>)
        })
    }
}

struct RuntimeSocket(runtime::UdpSocket);

impl DatagramSocket for RuntimeSocket {
    fn send_to<'a>(
        &'a self,
        buf: &'a [u8],
        addr: SocketAddr,
    ) -> BoxFuture<'a, io::Result<usize>> {
        Box::pin(self.0.send_to(buf, addr))
    }

    fn recv_from<'a>(
        &'a self,
        buf: &'a mut [u8],
    ) -> BoxFuture<'a, io::Result<(usize, SocketAddr)>> {
        Box::pin(self.0.recv_from(buf))
    }

    fn set_broadcast(&self, broadcast: bool) -> io::Result<()> {
        self.0.set_broadcast(broadcast)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory transport that records outbound datagrams and plays back
    //! scripted replies.

    use std::collections::VecDeque;
    use std::future;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::client::Client;
    use crate::config::ClientConfig;
    use crate::frame::Frame;
    use crate::messages::Payload;
    use crate::types::MacAddress;

    /// Produces the replies for one outbound datagram.
    ///
    /// Called with the parsed frame, its destination and the zero-based index
    /// of the send across the whole test.
    pub(crate) type Responder =
        dyn Fn(&Frame, SocketAddr, usize) -> Vec<(Vec<u8>, SocketAddr)> + Send + Sync;

    #[derive(Default)]
    struct State {
        sent: Vec<(Vec<u8>, SocketAddr)>,
        inbox: VecDeque<(Vec<u8>, SocketAddr)>,
        opened: usize,
        broadcast_enabled: bool,
    }

    /// Test double for [`Transport`].
    ///
    /// Every socket it opens shares one inbox. Sends are recorded, then the
    /// responder's replies are queued. Receiving from an empty inbox never
    /// completes, so the engine's timeout decides when an attempt ends.
    #[derive(Clone)]
    pub(crate) struct MockTransport {
        state: Arc<Mutex<State>>,
        responder: Arc<Responder>,
        fail_open: bool,
        fail_send: bool,
    }

    impl fmt::Debug for MockTransport {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("MockTransport").finish_non_exhaustive()
        }
    }

    impl MockTransport {
        /// A network where nobody answers.
        pub(crate) fn silent() -> Self {
            Self::new(|_, _, _| Vec::new())
        }

        pub(crate) fn new<F>(responder: F) -> Self
        where
            F: Fn(&Frame, SocketAddr, usize) -> Vec<(Vec<u8>, SocketAddr)> + Send + Sync + 'static,
        {
            MockTransport {
                state: Arc::new(Mutex::new(State::default())),
                responder: Arc::new(responder),
                fail_open: false,
                fail_send: false,
            }
        }

        /// A single device at `addr` that answers each request with the
        /// payloads `handler` returns, echoing the request's source and sequence.
        pub(crate) fn device<F>(mac: MacAddress, addr: SocketAddr, handler: F) -> Self
        where
            F: Fn(&Frame) -> Vec<Box<dyn Payload>> + Send + Sync + 'static,
        {
            Self::new(move |request, _, _| {
                handler(request)
                    .iter()
                    .map(|payload| {
                        let reply = Frame::new(
                            payload.as_ref(),
                            request.transport.source,
                            Some(mac),
                            false,
                            false,
                            request.sequence(),
                        );
                        (reply.to_bytes().to_vec(), addr)
                    })
                    .collect()
            })
        }

        pub(crate) fn failing_open() -> Self {
            MockTransport {
                fail_open: true,
                ..Self::silent()
            }
        }

        pub(crate) fn failing_send() -> Self {
            MockTransport {
                fail_send: true,
                ..Self::silent()
            }
        }

        /// A client on this transport with short timeouts.
        pub(crate) fn client(&self) -> Arc<Client> {
            let config = ClientConfig {
                source: 1337,
                timeout_ms: 20,
                max_retries: 2,
                ..Default::default()
            };
            Arc::new(Client::with_transport(config, Arc::new(self.clone())))
        }

        pub(crate) fn sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
            self.state.lock().unwrap().sent.clone()
        }

        pub(crate) fn sent_frames(&self) -> Vec<Frame> {
            self.sent()
                .iter()
                .map(|(raw, _)| Frame::parse(raw).unwrap())
                .collect()
        }

        pub(crate) fn opened(&self) -> usize {
            self.state.lock().unwrap().opened
        }

        pub(crate) fn broadcast_enabled(&self) -> bool {
            self.state.lock().unwrap().broadcast_enabled
        }
    }

    impl Transport for MockTransport {
        fn open(&self) -> BoxFuture<'_, io::Result<Box<dyn DatagramSocket>>> {
            Box::pin(async move {
                self.state.lock().unwrap().opened += 1;
                if self.fail_open {
                    return Err(io::Error::new(io::ErrorKind::AddrInUse, "bind refused"));
                }
                Ok(Box::new(MockSocket {
                    transport: self.clone(),
                }) as Box<dyn DatagramSocket>)
            })
        }
    }

    struct MockSocket {
        transport: MockTransport,
    }

    impl DatagramSocket for MockSocket {
        fn send_to<'a>(
            &'a self,
            buf: &'a [u8],
            addr: SocketAddr,
        ) -> BoxFuture<'a, io::Result<usize>> {
            Box::pin(async move {
                if self.transport.fail_send {
                    return Err(io::Error::new(io::ErrorKind::NetworkUnreachable, "no route"));
                }
                let index = {
                    let mut state = self.transport.state.lock().unwrap();
                    state.sent.push((buf.to_vec(), addr));
                    state.sent.len() - 1
                };
                let replies = match Frame::parse(buf) {
                    Ok(frame) => (self.transport.responder)(&frame, addr, index),
                    Err(_) => Vec::new(),
                };
                self.transport.state.lock().unwrap().inbox.extend(replies);
                Ok(buf.len())
            })
        }

        fn recv_from<'a>(
            &'a self,
            buf: &'a mut [u8],
        ) -> BoxFuture<'a, io::Result<(usize, SocketAddr)>> {
            let next = self.transport.state.lock().unwrap().inbox.pop_front();
            match next {
                Some((datagram, from)) => {
                    let n = datagram.len().min(buf.len());
                    buf[..n].copy_from_slice(&datagram[..n]);
                    Box::pin(future::ready(Ok((n, from))))
                }
                None => Box::pin(future::pending()),
            }
        }

        fn set_broadcast(&self, broadcast: bool) -> io::Result<()> {
            self.transport.state.lock().unwrap().broadcast_enabled = broadcast;
            Ok(())
        }
    }
}
