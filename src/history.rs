//! Frame log kept by a [`Client`](crate::Client) for diagnostics.
//!
//! Every frame put on the wire and every reply the engine keeps is recorded
//! with its type tag, sequence number and peer. Duplicates and undecodable
//! datagrams are not recorded. The log is a ring: once full, the oldest
//! entry is evicted, while the running counters keep growing.

use std::collections::VecDeque;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::runtime::Instant;

/// Which way a frame travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageDirection {
    Send,
    Receive,
}

/// A recorded frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub direction: MessageDirection,
    pub message_type: u16,
    pub sequence: u8,
    pub peer: SocketAddr,
    /// Seconds since the log was created
    pub elapsed: f64,
}

#[derive(Debug, Clone)]
pub struct MessageHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    sent: usize,
    received: usize,
    last_error: Option<String>,
    created: Instant,
}

impl Default for MessageHistory {
    fn default() -> Self {
        Self::with_max_entries(Self::DEFAULT_MAX_ENTRIES)
    }
}

impl MessageHistory {
    pub const DEFAULT_MAX_ENTRIES: usize = 100;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(capacity: usize) -> Self {
        MessageHistory {
            entries: VecDeque::with_capacity(capacity.min(Self::DEFAULT_MAX_ENTRIES)),
            capacity,
            sent: 0,
            received: 0,
            last_error: None,
            created: Instant::now(),
        }
    }

    pub fn record(
        &mut self,
        direction: MessageDirection,
        message_type: u16,
        sequence: u8,
        peer: SocketAddr,
    ) {
        match direction {
            MessageDirection::Send => self.sent += 1,
            MessageDirection::Receive => self.received += 1,
        }
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry {
            direction,
            message_type,
            sequence,
            peer,
            elapsed: self.created.elapsed().as_secs_f64(),
        });
    }

    /// Remember the latest transport fault. Only the most recent one is kept.
    pub fn record_error(&mut self, error: &str) {
        self.last_error = Some(error.to_owned());
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Retained entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Retained entries exchanged with one device.
    pub fn entries_for(&self, peer: SocketAddr) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().filter(move |entry| entry.peer == peer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.sent = 0;
        self.received = 0;
        self.last_error = None;
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            send_count: self.sent,
            receive_count: self.received,
            total_entries: self.entries.len(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Counters of a [`MessageHistory`], serializable for reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySummary {
    pub send_count: usize,
    pub receive_count: usize,
    pub total_entries: usize,
    pub last_error: Option<String>,
}
