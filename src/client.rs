//! Request/response correlation over an unreliable datagram transport.
//!
//! [`Client::request`] frames a payload, sends it, and collects replies until
//! enough have arrived or a receive times out, resending the same frame on
//! timeout until the attempt budget runs out. Replies are never matched by
//! sequence number: any parsable frame with a known payload is kept unless it
//! repeats a reply that is already held.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{Either, select};
use futures::pin_mut;
use log::{debug, trace, warn};

use crate::cancel::CancelToken;
use crate::config::{ClientConfig, RequestOptions};
use crate::errors::Error;
use crate::frame::Frame;
use crate::history::{MessageDirection, MessageHistory};
use crate::messages::device::StateUnhandled;
use crate::messages::{Message, Payload};
use crate::registry::PayloadRegistry;
use crate::runtime::{self, Mutex};
use crate::sequence::SequenceAllocator;
use crate::transport::{DatagramSocket, Transport, UdpTransport};
use crate::types::MacAddress;

type Result<T> = std::result::Result<T, Error>;

/// Receive buffer size; larger than any frame in the catalog.
const MAX_DATAGRAM: usize = 4096;

/// Where a unicast request goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    pub mac: MacAddress,
    pub addr: SocketAddr,
}

impl Target {
    pub fn new(mac: MacAddress, addr: SocketAddr) -> Self {
        Target { mac, addr }
    }
}

/// One reply kept by a request.
#[derive(Debug)]
pub struct Response {
    pub frame: Frame,
    pub sender: SocketAddr,
    pub message: Box<dyn Payload>,
}

impl Response {
    pub fn message_type(&self) -> u16 {
        self.frame.message_type()
    }

    /// The decoded message, if it is an `M`.
    pub fn message_as<M: Payload + 'static>(&self) -> Option<&M> {
        self.message.downcast_ref::<M>()
    }

    /// Hardware address of the replying device.
    pub fn mac(&self) -> MacAddress {
        self.frame.target()
    }

    fn repeats(&self, sender: SocketAddr, message_type: u16, sequence: u8, encoded: &[u8]) -> bool {
        self.sender.ip() == sender.ip()
            && self.message_type() == message_type
            && self.frame.sequence() == sequence
            && self.message.to_bytes() == encoded
    }
}

enum Received {
    Datagram(usize, SocketAddr),
    Fault(io::Error),
    TimedOut,
    Cancelled,
}

/// The correlation engine.
///
/// One client is meant to be shared (behind an `Arc`) by every device handle
/// and task in a process: the sequence counter lives here, and each request
/// opens and closes its own socket.
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    registry: PayloadRegistry,
    sequence: SequenceAllocator,
    history: Mutex<MessageHistory>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("transport", &self.transport)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl Client {
    /// A client sending over UDP on the active runtime.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(UdpTransport::default()))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Client {
            config,
            transport,
            registry: PayloadRegistry::with_defaults(),
            sequence: SequenceAllocator::new(),
            history: Mutex::new(MessageHistory::new()),
        }
    }

    /// Replaces the reply decoders.
    pub fn with_registry(mut self, registry: PayloadRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn registry(&self) -> &PayloadRegistry {
        &self.registry
    }

    /// Options built from the client defaults.
    pub fn default_options(&self) -> RequestOptions {
        self.config.request_options()
    }

    pub async fn history(&self) -> MessageHistory {
        self.history.lock().await.clone()
    }

    pub async fn clear_history(&self) {
        self.history.lock().await.clear();
    }

    /// Sends `payload` and collects replies.
    ///
    /// Without a target the frame is tagged and broadcast; only broadcast
    /// messages may omit the target. Running out of attempts is not an error:
    /// the replies gathered so far, possibly none, are returned.
    pub async fn request(
        &self,
        payload: &dyn Payload,
        target: Option<&Target>,
        options: &RequestOptions,
    ) -> Result<Vec<Response>> {
        self.request_with_cancel(payload, target, options, None)
            .await
    }

    /// [`request`](Self::request) that stops early once `cancel` fires,
    /// returning what was collected.
    pub async fn request_with_cancel(
        &self,
        payload: &dyn Payload,
        target: Option<&Target>,
        options: &RequestOptions,
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<Response>> {
        let message_type = payload.message_type();
        if target.is_none() && !payload.is_broadcast() {
            return Err(Error::MissingTarget { message_type });
        }

        let sequence = self.sequence.next();
        let frame = Frame::new(
            payload,
            self.config.source,
            target.map(|t| t.mac),
            options.response_required,
            false,
            sequence,
        );
        let datagram = frame.to_bytes();
        let destination = target.map_or_else(|| self.config.broadcast_target(), |t| t.addr);
        let broadcast = target.is_none();

        if !options.response_required {
            debug!("Sending message type {message_type} seq {sequence} to {destination} without waiting");
            match self.open(broadcast).await {
                Ok(socket) => {
                    self.send(socket.as_ref(), &datagram, destination, message_type, sequence)
                        .await;
                }
                Err(e) => self.transport_fault("bind", e).await,
            }
            return Ok(Vec::new());
        }

        let attempts = options.max_retries.max(1);
        let mut replies: Vec<Response> = Vec::new();
        let mut socket: Option<Box<dyn DatagramSocket>> = None;

        for attempt in 1..=attempts {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                debug!("Message type {message_type} seq {sequence} cancelled");
                break;
            }

            let sock = match socket.take() {
                Some(sock) => sock,
                None => match self.open(broadcast).await {
                    Ok(sock) => sock,
                    Err(e) => {
                        self.transport_fault("bind", e).await;
                        continue;
                    }
                },
            };

            debug!(
                "Sending message type {message_type} seq {sequence} to {destination} (attempt {attempt}/{attempts})"
            );
            if !self
                .send(sock.as_ref(), &datagram, destination, message_type, sequence)
                .await
            {
                socket = Some(sock);
                continue;
            }

            let mut buf = [0u8; MAX_DATAGRAM];
            loop {
                if options.max_replies != 0 && replies.len() >= options.max_replies {
                    break;
                }
                match Self::next_datagram(sock.as_ref(), &mut buf, options.timeout, cancel).await {
                    Received::Datagram(n, from) => {
                        self.collect(&buf[..n], from, sequence, &mut replies).await;
                    }
                    Received::TimedOut => {
                        trace!("Receive timed out for seq {sequence}");
                        break;
                    }
                    Received::Fault(e) => {
                        self.transport_fault("receive", e).await;
                        break;
                    }
                    Received::Cancelled => {
                        debug!("Message type {message_type} seq {sequence} cancelled");
                        return Ok(replies);
                    }
                }
            }

            if options.max_replies != 0 && replies.len() >= options.max_replies {
                break;
            }
            socket = Some(sock);
        }

        debug!(
            "Message type {message_type} seq {sequence} finished with {} replies",
            replies.len()
        );
        Ok(replies)
    }

    /// Sends `payload` once without asking for a reply.
    pub async fn send_only(&self, payload: &dyn Payload, target: Option<&Target>) -> Result<()> {
        let options = self.default_options().fire_and_forget();
        self.request(payload, target, &options).await.map(|_| ())
    }

    /// Sends `payload` and returns its single reply as an `R`.
    ///
    /// An empty reply list becomes [`Error::NoResponse`]; a reply of another
    /// type becomes [`Error::UnexpectedResponse`].
    pub async fn query<R>(&self, payload: &dyn Payload, target: &Target) -> Result<R>
    where
        R: Message + Clone,
    {
        let replies = self
            .request(payload, Some(target), &self.default_options())
            .await?;
        first_of::<R>(&replies, payload.message_type(), Some(target.addr))
    }

    async fn open(&self, broadcast: bool) -> io::Result<Box<dyn DatagramSocket>> {
        let socket = self.transport.open().await?;
        if broadcast {
            socket.set_broadcast(true)?;
        }
        Ok(socket)
    }

    async fn send(
        &self,
        socket: &dyn DatagramSocket,
        datagram: &[u8],
        destination: SocketAddr,
        message_type: u16,
        sequence: u8,
    ) -> bool {
        match socket.send_to(datagram, destination).await {
            Ok(_) => {
                self.history.lock().await.record(
                    MessageDirection::Send,
                    message_type,
                    sequence,
                    destination,
                );
                true
            }
            Err(e) => {
                self.transport_fault("send", e).await;
                false
            }
        }
    }

    async fn next_datagram(
        socket: &dyn DatagramSocket,
        buf: &mut [u8],
        timeout: Duration,
        cancel: Option<&CancelToken>,
    ) -> Received {
        let receive = runtime::timeout(timeout, socket.recv_from(buf));
        let outcome = match cancel {
            None => receive.await,
            Some(token) => {
                let cancelled = token.cancelled();
                pin_mut!(receive);
                pin_mut!(cancelled);
                match select(receive, cancelled).await {
                    Either::Left((outcome, _)) => outcome,
                    Either::Right(_) => return Received::Cancelled,
                }
            }
        };
        match outcome {
            Ok(Ok((n, from))) => Received::Datagram(n, from),
            Ok(Err(e)) => Received::Fault(e),
            Err(_) => Received::TimedOut,
        }
    }

    async fn collect(
        &self,
        datagram: &[u8],
        sender: SocketAddr,
        sequence: u8,
        replies: &mut Vec<Response>,
    ) {
        let frame = match Frame::parse(datagram) {
            Ok(frame) => frame,
            Err(e) => {
                trace!("Discarding malformed datagram from {sender}: {e}");
                return;
            }
        };
        let message_type = frame.message_type();
        let Some(message) = self.registry.decode(message_type, &frame.payload) else {
            return;
        };

        let encoded = message.to_bytes();
        if !encoded.is_empty()
            && replies
                .iter()
                .any(|kept| kept.repeats(sender, message_type, sequence, &encoded))
        {
            trace!("Dropping duplicate message type {message_type} from {sender}");
            return;
        }

        trace!(
            "Received message type {message_type} seq {} from {sender}",
            frame.sequence()
        );
        self.history.lock().await.record(
            MessageDirection::Receive,
            message_type,
            frame.sequence(),
            sender,
        );
        replies.push(Response {
            frame,
            sender,
            message,
        });
    }

    async fn transport_fault(&self, action: &str, err: io::Error) {
        let error = Error::socket(action, err);
        warn!("{error}");
        self.history.lock().await.record_error(&error.to_string());
    }
}

/// Picks the first reply of type `R`.
fn first_of<R: Message + Clone>(
    replies: &[Response],
    message_type: u16,
    peer: Option<SocketAddr>,
) -> Result<R> {
    if let Some(found) = replies.iter().find_map(|r| r.message_as::<R>()) {
        return Ok(found.clone());
    }
    match replies.first() {
        None => Err(Error::no_response(message_type, peer)),
        Some(reply) => {
            if let Some(unhandled) = reply.message_as::<StateUnhandled>() {
                debug!("Device did not handle message type {}", unhandled.unhandled_type);
            }
            Err(Error::UnexpectedResponse {
                expected: R::MESSAGE_TYPE,
                found: reply.message_type(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::device::{Acknowledgement, GetLabel, SetPower, StateLabel, StatePower};
    use crate::messages::discovery::{GetService, StateService};
    use crate::transport::mock::MockTransport;
    use crate::types::Service;

    const DEVICE: &str = "192.168.1.20:56700";

    fn device_mac() -> MacAddress {
        "d0:73:d5:43:47:86".parse().unwrap()
    }

    fn target() -> Target {
        Target::new(device_mac(), DEVICE.parse().unwrap())
    }

    fn config() -> ClientConfig {
        ClientConfig {
            source: 1337,
            timeout_ms: 20,
            max_retries: 3,
            ..Default::default()
        }
    }

    fn client(transport: &MockTransport) -> Client {
        Client::with_transport(config(), Arc::new(transport.clone()))
    }

    fn options() -> RequestOptions {
        RequestOptions::default()
            .timeout(Duration::from_millis(20))
            .max_retries(3)
    }

    /// A reply to `request` carrying `payload`, as a device would send it.
    fn reply(request: &Frame, payload: &dyn Payload, mac: MacAddress) -> Vec<u8> {
        Frame::new(
            payload,
            request.transport.source,
            Some(mac),
            false,
            false,
            request.sequence(),
        )
        .to_bytes()
        .to_vec()
    }

    fn label(text: &str) -> StateLabel {
        StateLabel { label: text.into() }
    }

    #[tokio::test]
    async fn test_missing_target_fails_before_io() {
        let transport = MockTransport::silent();
        let client = client(&transport);
        let err = client
            .request(&GetLabel, None, &options())
            .await
            .unwrap_err();
        assert_eq!(err, Error::MissingTarget { message_type: 23 });
        assert_eq!(transport.opened(), 0);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_retry_exhaustion_resends_same_frame() {
        let transport = MockTransport::silent();
        let client = client(&transport);
        let replies = client
            .request(&GetLabel, Some(&target()), &options())
            .await
            .unwrap();
        assert!(replies.is_empty());

        let sent = transport.sent();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|(raw, _)| raw == &sent[0].0));
        assert_eq!(transport.sent_frames()[0].sequence(), 1);
        assert_eq!(transport.opened(), 1);
    }

    #[tokio::test]
    async fn test_zero_retries_still_sends_once() {
        let transport = MockTransport::silent();
        let client = client(&transport);
        client
            .request(&GetLabel, Some(&target()), &options().max_retries(0))
            .await
            .unwrap();
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_fire_and_forget_sends_once() {
        let transport = MockTransport::new(|req, _, _| {
            vec![(reply(req, &StatePower { level: 0 }, device_mac()), DEVICE.parse().unwrap())]
        });
        let client = client(&transport);
        let replies = client
            .request(
                &SetPower { level: 0 },
                Some(&target()),
                &options().max_retries(5).fire_and_forget(),
            )
            .await
            .unwrap();
        assert!(replies.is_empty());

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0[22], 0);
    }

    #[tokio::test]
    async fn test_single_reply() {
        let transport = MockTransport::new(|req, _, _| {
            vec![(reply(req, &label("Kitchen"), device_mac()), DEVICE.parse().unwrap())]
        });
        let client = client(&transport);
        let replies = client
            .request(&GetLabel, Some(&target()), &options())
            .await
            .unwrap();

        assert_eq!(replies.len(), 1);
        assert_eq!(transport.sent().len(), 1);
        assert_eq!(replies[0].message_type(), 25);
        assert_eq!(replies[0].mac(), device_mac());
        assert_eq!(replies[0].message_as::<StateLabel>().unwrap().label, "Kitchen");

        let history = client.history().await.summary();
        assert_eq!(history.send_count, 1);
        assert_eq!(history.receive_count, 1);
    }

    #[tokio::test]
    async fn test_targeted_frame_bits() {
        let transport = MockTransport::silent();
        let client = client(&transport);
        client
            .request(&GetLabel, Some(&target()), &options().max_retries(1))
            .await
            .unwrap();

        let (raw, to) = &transport.sent()[0];
        assert_eq!(*to, target().addr);
        assert_eq!(raw[3] & 0x20, 0);
        assert_eq!(&raw[8..14], device_mac().as_bytes());
        assert_eq!(raw[22], 1);
        assert_eq!(u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]), 1337);
        assert!(!transport.broadcast_enabled());
    }

    #[tokio::test]
    async fn test_broadcast_collects_every_device() {
        let transport = MockTransport::new(|req, _, _| {
            (1..=3u8)
                .map(|i| {
                    let mac = MacAddress::new([0xd0, 0x73, 0xd5, 0, 0, i]);
                    let state = StateService {
                        service: Service::Udp,
                        port: 56700,
                    };
                    let from = SocketAddr::from(([192, 168, 1, i], 56700));
                    (reply(req, &state, mac), from)
                })
                .collect()
        });
        let client = client(&transport);
        let replies = client
            .request(&GetService, None, &options().unbounded().max_retries(1))
            .await
            .unwrap();
        assert_eq!(replies.len(), 3);

        let (raw, to) = &transport.sent()[0];
        assert_eq!(*to, "255.255.255.255:56700".parse().unwrap());
        assert_eq!(raw[3] & 0x20, 0x20);
        assert_eq!(&raw[8..14], &[0; 6]);
        assert!(transport.broadcast_enabled());
    }

    #[tokio::test]
    async fn test_duplicates_dropped() {
        let transport = MockTransport::new(|req, _, _| {
            let raw = reply(req, &label("Kitchen"), device_mac());
            let from: SocketAddr = DEVICE.parse().unwrap();
            vec![(raw.clone(), from), (raw, from)]
        });
        let client = client(&transport);
        let replies = client
            .request(&GetLabel, Some(&target()), &options().unbounded().max_retries(1))
            .await
            .unwrap();
        assert_eq!(replies.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_replies_kept() {
        let transport = MockTransport::new(|req, _, _| {
            let from: SocketAddr = DEVICE.parse().unwrap();
            let other: SocketAddr = "192.168.1.21:56700".parse().unwrap();
            vec![
                (reply(req, &label("Kitchen"), device_mac()), from),
                (reply(req, &label("Hall"), device_mac()), from),
                (reply(req, &label("Kitchen"), device_mac()), other),
            ]
        });
        let client = client(&transport);
        let replies = client
            .request(&GetLabel, Some(&target()), &options().unbounded().max_retries(1))
            .await
            .unwrap();
        assert_eq!(replies.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_payloads_always_kept() {
        let transport = MockTransport::new(|req, _, _| {
            let raw = reply(req, &Acknowledgement, device_mac());
            let from: SocketAddr = DEVICE.parse().unwrap();
            vec![(raw.clone(), from), (raw, from)]
        });
        let client = client(&transport);
        let replies = client
            .request(&GetLabel, Some(&target()), &options().unbounded().max_retries(1))
            .await
            .unwrap();
        assert_eq!(replies.len(), 2);
    }

    #[tokio::test]
    async fn test_junk_and_unknown_tags_discarded() {
        let transport = MockTransport::new(|req, _, _| {
            let from: SocketAddr = DEVICE.parse().unwrap();
            let mut unknown = reply(req, &label("x"), device_mac());
            unknown[32..34].copy_from_slice(&9999u16.to_le_bytes());
            vec![
                (vec![1, 2, 3], from),
                (unknown, from),
                (reply(req, &label("Kitchen"), device_mac()), from),
            ]
        });
        let client = client(&transport);
        let replies = client
            .request(&GetLabel, Some(&target()), &options())
            .await
            .unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].message_as::<StateLabel>().unwrap().label, "Kitchen");
    }

    #[tokio::test]
    async fn test_replies_accumulate_across_attempts() {
        let transport = MockTransport::new(|req, _, index| {
            vec![(
                reply(req, &label(&format!("reply {index}")), device_mac()),
                DEVICE.parse().unwrap(),
            )]
        });
        let client = client(&transport);
        let replies = client
            .request(&GetLabel, Some(&target()), &options().max_replies(2))
            .await
            .unwrap();
        assert_eq!(replies.len(), 2);
        assert_eq!(transport.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_sequence_advances_per_request() {
        let transport = MockTransport::silent();
        let client = client(&transport);
        let opts = options().max_retries(1);
        client.request(&GetLabel, Some(&target()), &opts).await.unwrap();
        client.send_only(&SetPower { level: 1 }, Some(&target())).await.unwrap();
        let frames = transport.sent_frames();
        assert_eq!(frames[0].sequence(), 1);
        assert_eq!(frames[1].sequence(), 2);
        assert_eq!(frames[1].transport.size, 34);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let transport = MockTransport::silent();
        let client = client(&transport);
        let token = CancelToken::new();
        token.cancel();
        let replies = client
            .request_with_cancel(&GetLabel, Some(&target()), &options(), Some(&token))
            .await
            .unwrap();
        assert!(replies.is_empty());
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_returns_collected() {
        let transport = MockTransport::new(|req, _, _| {
            vec![(reply(req, &label("Kitchen"), device_mac()), DEVICE.parse().unwrap())]
        });
        let client = client(&transport);
        let token = CancelToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.cancel();
        });

        let opts = options().unbounded().timeout(Duration::from_secs(30));
        let replies = tokio::time::timeout(
            Duration::from_secs(5),
            client.request_with_cancel(&GetLabel, Some(&target()), &opts, Some(&token)),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_bind_failure_consumes_attempts() {
        let transport = MockTransport::failing_open();
        let client = client(&transport);
        let replies = client
            .request(&GetLabel, Some(&target()), &options())
            .await
            .unwrap();
        assert!(replies.is_empty());
        assert_eq!(transport.opened(), 3);
        assert!(client.history().await.last_error().unwrap().contains("bind"));
    }

    #[tokio::test]
    async fn test_send_failure_consumes_attempts() {
        let transport = MockTransport::failing_send();
        let client = client(&transport);
        let replies = client
            .request(&GetLabel, Some(&target()), &options())
            .await
            .unwrap();
        assert!(replies.is_empty());
        assert_eq!(transport.opened(), 1);
        assert!(client.history().await.last_error().unwrap().contains("send"));
    }

    #[tokio::test]
    async fn test_query_no_response() {
        let transport = MockTransport::silent();
        let client = client(&transport);
        let err = client
            .query::<StateLabel>(&GetLabel, &target())
            .await
            .unwrap_err();
        assert_eq!(err, Error::no_response(23, Some(target().addr)));
    }

    #[tokio::test]
    async fn test_query_unexpected_type() {
        let transport = MockTransport::new(|req, _, _| {
            vec![(reply(req, &StatePower { level: 1 }, device_mac()), DEVICE.parse().unwrap())]
        });
        let client = client(&transport);
        let err = client
            .query::<StateLabel>(&GetLabel, &target())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::UnexpectedResponse {
                expected: 25,
                found: 22
            }
        );
    }
}
