//! FIFO of messages waiting to be played.

use crate::message::Message;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
}

/// The head of the queue is the message currently playing.
#[derive(Debug, Clone, Default)]
pub struct PlaybackQueue {
    queue: VecDeque<Message>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        if self.queue.is_empty() {
            PlaybackState::Idle
        } else {
            PlaybackState::Playing
        }
    }

    /// Append a reply batch. An empty batch leaves the state unchanged.
    pub fn enqueue(&mut self, batch: impl IntoIterator<Item = Message>) {
        self.queue.extend(batch);
    }

    pub fn current(&self) -> Option<&Message> {
        self.queue.front()
    }

    /// Drop the finished head and return it. Returns `None` while idle.
    pub fn message_finished(&mut self) -> Option<Message> {
        self.queue.pop_front()
    }

    /// Drop everything, including the current message.
    pub fn reset(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
