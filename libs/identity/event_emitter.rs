use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fan-out of values to any number of listeners, each with its own unbounded queue.
#[derive(Clone)]
pub struct EventEmitter<T: Clone> {
    listener_ids_counter: Arc<AtomicU64>,
    listeners: Arc<DashMap<u64, Sender<T>>>,
}

impl<T: Clone> EventEmitter<T> {
    pub fn new() -> Self {
        Self {
            listener_ids_counter: Arc::new(AtomicU64::default()),
            listeners: Arc::new(DashMap::new()),
        }
    }

    pub fn notify(&self, data: &T) {
        let mut disconnected = Vec::new();
        for listener in self.listeners.iter() {
            if listener.value().send(data.clone()).is_err() {
                disconnected.push(*listener.key());
            }
        }

        // listeners dropped without unsubscribing
        for listener_id in disconnected {
            tracing::debug!(listener_id, "pruning disconnected listener");
            self.listeners.remove(&listener_id);
        }
    }

    fn generate_listener_id(&self) -> u64 {
        self.listener_ids_counter.fetch_add(1, Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> EventListener<T> {
        self.subscribe_with(None)
    }

    /// Subscribe with `initial` already queued, ahead of any later notification
    pub fn subscribe_with(&self, initial: Option<T>) -> EventListener<T> {
        let listener_id = self.generate_listener_id();
        let (sender, receiver) = crossbeam_channel::unbounded();
        if let Some(initial) = initial {
            // the receiver is alive, this can't fail
            let _ = sender.send(initial);
        }
        self.listeners.insert(listener_id, sender);

        EventListener {
            id: listener_id,
            receiver,
        }
    }

    pub fn unsubscribe(&self, listener_id: u64) {
        self.listeners.remove(&listener_id);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<T: Clone> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct EventListener<T> {
    pub id: u64,
    receiver: Receiver<T>,
}

impl<T> EventListener<T> {
    /// Next queued value, without waiting
    pub fn try_next(&self) -> Option<T> {
        match self.receiver.try_recv() {
            Ok(data) => Some(data),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Next value, waiting at most `timeout` for one to arrive
    pub fn next_timeout(&self, timeout: Duration) -> Option<T> {
        match self.receiver.recv_timeout(timeout) {
            Ok(data) => Some(data),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drain the queue and keep the most recent value
    pub fn latest(&self) -> Option<T> {
        self.receiver.try_iter().last()
    }
}
