//! Observable simulation events.
//!
//! Phases push events after their outcome is already decided, so consumers
//! (audio, effects, logs) can never influence resolution. The queue is
//! bounded: if nobody drains it, the oldest events are dropped.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::entity::Kind;

/// Events kept by a default queue before the oldest are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 4096;

/// A resolved entity-entity collision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Magnitude of the impulse exchanged.
    pub impact_strength: f32,
    /// Contact point.
    pub pos: [f32; 2],
    /// Combined mass of both participants.
    pub mass: f32,
}

/// Events emitted by a world step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimulationEvent {
    /// Two entities collided.
    Collision(CollisionEvent),
    /// A predator caught a prey.
    PreyConsumed {
        /// ID of the predator.
        predator_id: usize,
        /// ID of the prey.
        prey_id: usize,
        /// Where the catch happened.
        pos: [f32; 2],
    },
    /// An entity was removed from the world.
    EntityDied {
        /// ID of the removed entity.
        entity_id: usize,
        /// Its kind.
        kind: Kind,
        /// Position where it died.
        pos: [f32; 2],
    },
    /// A replacement entity was spawned.
    EntitySpawned {
        /// ID of the new entity.
        entity_id: usize,
    },
}

/// Bounded queue for collecting simulation events.
#[derive(Debug, Clone)]
pub struct EventQueue {
    events: VecDeque<SimulationEvent>,
    capacity: usize,
    dropped: u64,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventQueue {
    /// Creates an empty queue holding at most `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            dropped: 0,
        }
    }

    /// Adds an event, dropping the oldest one when full.
    pub fn push(&mut self, event: SimulationEvent) {
        if self.capacity == 0 {
            self.dropped += 1;
            return;
        }
        while self.events.len() >= self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    /// Drains all events from the queue, oldest first.
    pub fn drain(&mut self) -> std::collections::vec_deque::Drain<'_, SimulationEvent> {
        self.events.drain(..)
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Checks if no events are queued.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total events lost to the capacity bound.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Removes all queued events and resets the drop counter.
    pub fn clear(&mut self) {
        self.events.clear();
        self.dropped = 0;
    }
}
