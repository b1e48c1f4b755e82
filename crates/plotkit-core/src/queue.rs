//! Command queue shared between ingestion and dispatch
//!
//! An unbounded FIFO with an atomic `push` and an awaiting `pop`. The consumer
//! suspends on a [`Notify`] while the queue is empty instead of polling.

use crate::command::Command;
use parking_lot::Mutex;
use std::collections::VecDeque;
use thiserror::Error;
use tokio::sync::Notify;

/// Returned by [`CommandQueue::push`] after the queue was closed
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Command queue is closed, dropped {0}")]
pub struct QueueClosed(pub Command);

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<Command>,
    closed: bool,
}

/// Ordered hand-off buffer between the ingestion listener and the dispatcher
#[derive(Debug, Default)]
pub struct CommandQueue {
    state: Mutex<QueueState>,
    available: Notify,
}

impl CommandQueue {
    /// Create an empty, open queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command at the tail and wake the consumer
    pub fn push(&self, command: Command) -> Result<(), QueueClosed> {
        {
            let mut state = self.state.lock();
            if state.closed {
                return Err(QueueClosed(command));
            }
            state.items.push_back(command);
        }
        self.available.notify_one();
        Ok(())
    }

    /// Remove the head of the queue, waiting while it is empty
    ///
    /// Returns `None` once the queue is closed and every queued command has been
    /// handed out.
    pub async fn pop(&self) -> Option<Command> {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            // Register before checking so a push between the check and the await is not missed.
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if let Some(command) = state.items.pop_front() {
                    return Some(command);
                }
                if state.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Remove the head of the queue without waiting
    pub fn try_pop(&self) -> Option<Command> {
        self.state.lock().items.pop_front()
    }

    /// Stop accepting commands; already queued commands remain poppable
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.available.notify_waiters();
        self.available.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn point(x: f64) -> Command {
        Command::Point { x, y: 0.0 }
    }

    #[test]
    fn test_fifo_order() {
        let queue = CommandQueue::new();
        for i in 0..5 {
            queue.push(point(i as f64)).unwrap();
        }
        assert_eq!(queue.len(), 5);
        for i in 0..5 {
            assert_eq!(queue.try_pop(), Some(point(i as f64)));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_push_after_close_is_rejected() {
        let queue = CommandQueue::new();
        queue.close();
        assert_eq!(queue.push(Command::Nop), Err(QueueClosed(Command::Nop)));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_pop_drains_before_reporting_closed() {
        let queue = CommandQueue::new();
        queue.push(point(1.0)).unwrap();
        queue.push(point(2.0)).unwrap();
        queue.close();

        assert_eq!(queue.pop().await, Some(point(1.0)));
        assert_eq!(queue.pop().await, Some(point(2.0)));
        assert_eq!(queue.pop().await, None);
    }

    #[tokio::test]
    async fn test_blocked_pop_wakes_on_push() {
        let queue = Arc::new(CommandQueue::new());
        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!consumer.is_finished());

        queue.push(point(7.0)).unwrap();
        let received = tokio::time::timeout(Duration::from_millis(500), consumer)
            .await
            .expect("consumer was not woken")
            .unwrap();
        assert_eq!(received, Some(point(7.0)));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_blocked_pop_wakes_on_close() {
        let queue = Arc::new(CommandQueue::new());
        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.close();
        let received = tokio::time::timeout(Duration::from_millis(500), consumer)
            .await
            .expect("consumer was not woken")
            .unwrap();
        assert_eq!(received, None);
    }
}
