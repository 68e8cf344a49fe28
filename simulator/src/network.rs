//! Deterministic, seeded unreliable-network simulator.
//!
//! Grounded in the distilled source's `network.py`: a binary-heap event
//! queue keyed by arrival time, random per-message delay, random
//! duplication, random drop, and a sliding-window rate limiter that
//! temporarily blocks a sender exceeding its message quota. This is an
//! external collaborator to the `chain` core — it only ever calls the
//! core's public `Node` API (see `scenario.rs`), never reaches into its
//! internals.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use chain::{BlockBody, BlockHeader, Transaction, Vote};

/// The three wire message shapes a node can receive, carried end to end
/// through the simulated network.
#[derive(Clone, Debug)]
pub enum Message {
    Transaction(Transaction),
    Block { header: BlockHeader, body: BlockBody },
    Vote(Vote),
}

/// Tunables for the unreliable-network model.
///
/// Field names and defaults mirror `network.py`'s module-level constants
/// (`DROP_RATE`, `DUPLICATE_RATE`, `MIN_DELAY`, `MAX_DELAY`,
/// `RATE_LIMIT_WINDOW`, `MAX_MSG_PER_WINDOW`, `BLOCK_DURATION`).
#[derive(Clone, Debug)]
pub struct NetworkConfig {
    pub drop_rate: f64,
    pub duplicate_rate: f64,
    pub min_delay: f64,
    pub max_delay: f64,
    pub rate_limit_window: f64,
    pub max_msgs_per_window: usize,
    pub block_duration: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            drop_rate: 0.05,
            duplicate_rate: 0.05,
            min_delay: 0.5,
            max_delay: 3.0,
            rate_limit_window: 5.0,
            max_msgs_per_window: 5,
            block_duration: 10.0,
        }
    }
}

/// A scheduled, in-flight message.
#[derive(Clone, Debug)]
struct ScheduledEvent {
    arrival_time: f64,
    sender_id: String,
    receiver_id: String,
    message: Message,
}

// `BinaryHeap` is a max-heap; reversing the comparison on `arrival_time`
// turns it into the min-heap `heapq` gives the Python original.
impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.arrival_time == other.arrival_time
    }
}
impl Eq for ScheduledEvent {}
impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .arrival_time
            .partial_cmp(&self.arrival_time)
            .unwrap_or(Ordering::Equal)
    }
}

/// A delivered event, handed back to the caller from [`NetworkSimulator::tick`].
pub struct DeliveredMessage {
    pub sender_id: String,
    pub receiver_id: String,
    pub message: Message,
}

/// Seeded, deterministic event-driven network simulator.
///
/// Two simulators constructed with the same seed and driven through the
/// same sequence of `send`/`tick` calls schedule byte-identical sequences
/// of deliveries — this is what lets the determinism harness (`main.rs`)
/// compare two runs.
pub struct NetworkSimulator {
    config: NetworkConfig,
    rng: StdRng,
    queue: BinaryHeap<ScheduledEvent>,
    current_time: f64,
    links: HashMap<String, HashSet<String>>,
    traffic_history: HashMap<String, VecDeque<f64>>,
    blocked_until: HashMap<String, f64>,
}

impl NetworkSimulator {
    pub fn new(seed: u64, config: NetworkConfig) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            queue: BinaryHeap::new(),
            current_time: 0.0,
            links: HashMap::new(),
            traffic_history: HashMap::new(),
            blocked_until: HashMap::new(),
        }
    }

    fn add_node(&mut self, node_id: &str) {
        self.links.entry(node_id.to_string()).or_default();
        self.traffic_history.entry(node_id.to_string()).or_default();
    }

    /// Connects two nodes bidirectionally.
    pub fn connect(&mut self, a: &str, b: &str) {
        self.add_node(a);
        self.add_node(b);
        self.links.get_mut(a).unwrap().insert(b.to_string());
        self.links.get_mut(b).unwrap().insert(a.to_string());
    }

    /// Fully connects every pair in `node_ids` — the topology scenarios use.
    pub fn connect_all(&mut self, node_ids: &[String]) {
        for i in 0..node_ids.len() {
            for j in (i + 1)..node_ids.len() {
                self.connect(&node_ids[i], &node_ids[j]);
            }
        }
    }

    /// Sliding-window rate limiter: returns `true` if `sender_id` is
    /// currently blocked (either already under a block, or freshly blocked
    /// by this call for exceeding its quota in the current window).
    fn is_rate_limited(&mut self, sender_id: &str) -> bool {
        if let Some(&until) = self.blocked_until.get(sender_id) {
            if self.current_time < until {
                return true;
            }
            self.blocked_until.remove(sender_id);
        }

        let window_start = self.current_time - self.config.rate_limit_window;
        let history = self.traffic_history.entry(sender_id.to_string()).or_default();
        while matches!(history.front(), Some(&t) if t < window_start) {
            history.pop_front();
        }

        if history.len() >= self.config.max_msgs_per_window {
            self.blocked_until
                .insert(sender_id.to_string(), self.current_time + self.config.block_duration);
            return true;
        }

        history.push_back(self.current_time);
        false
    }

    /// Attempts to send `message` from `sender_id` to `receiver_id`.
    ///
    /// Silently no-ops if the two are not connected or `sender_id` is
    /// currently rate-limited; otherwise randomly drops, schedules with a
    /// random delay, and randomly duplicates with an extra delay offset —
    /// matching `network.py`'s `send`.
    pub fn send(&mut self, sender_id: &str, receiver_id: &str, message: Message) {
        let connected = self
            .links
            .get(sender_id)
            .map(|peers| peers.contains(receiver_id))
            .unwrap_or(false);
        if !connected {
            return;
        }

        if self.is_rate_limited(sender_id) {
            return;
        }

        if self.rng.gen_bool(self.config.drop_rate) {
            return;
        }

        self.schedule(sender_id, receiver_id, message.clone(), 0.0);

        if self.rng.gen_bool(self.config.duplicate_rate) {
            self.schedule(sender_id, receiver_id, message, 0.5);
        }
    }

    fn schedule(&mut self, sender_id: &str, receiver_id: &str, message: Message, delay_offset: f64) {
        let delay = self.rng.gen_range(self.config.min_delay..=self.config.max_delay) + delay_offset;
        self.queue.push(ScheduledEvent {
            arrival_time: self.current_time + delay,
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            message,
        });
    }

    /// Advances the clock by `steps` and drains every event whose arrival
    /// time has now passed, in arrival order.
    pub fn tick(&mut self, steps: f64) -> Vec<DeliveredMessage> {
        self.current_time += steps;
        let mut arrived = Vec::new();
        while matches!(self.queue.peek(), Some(e) if e.arrival_time <= self.current_time) {
            let event = self.queue.pop().expect("peek just confirmed an element");
            arrived.push(DeliveredMessage {
                sender_id: event.sender_id,
                receiver_id: event.receiver_id,
                message: event.message,
            });
        }
        arrived
    }

    /// Runs `tick(steps)` repeatedly until the event queue is empty, up to
    /// `max_ticks` iterations — a convenience for draining a scenario to
    /// completion without picking an exact tick count by hand.
    pub fn drain(&mut self, steps: f64, max_ticks: usize) -> Vec<DeliveredMessage> {
        let mut all = Vec::new();
        for _ in 0..max_ticks {
            if self.queue.is_empty() {
                break;
            }
            all.extend(self.tick(steps));
        }
        all
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }
}
