use std::{
    collections::VecDeque,
    pin::pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Notify;
use uuid::Uuid;

/// Ticket that identifies a queued write.
#[derive(Debug, Clone)]
pub struct WriteTicket {
    pub ticket_id: Uuid,
    pub enqueued_at: DateTime<Utc>,
}

impl WriteTicket {
    /// Time spent since the ticket was queued.
    pub fn waited(&self) -> TimeDelta {
        Utc::now() - self.enqueued_at
    }
}

/// FIFO queue that lets exactly one writer allocate and insert at a time.
#[derive(Clone, Default)]
pub struct UserWriteQueue {
    inner: Arc<UserWriteQueueInner>,
}

#[derive(Default)]
struct UserWriteQueueInner {
    queue: Mutex<VecDeque<WriteTicket>>,
    notify: Notify,
}

/// Exclusive turn at the front of the queue; dropping it wakes the next writer.
pub struct WriteTurn {
    queue: UserWriteQueue,
    ticket: WriteTicket,
}

impl WriteTurn {
    pub fn ticket(&self) -> &WriteTicket {
        &self.ticket
    }
}

impl Drop for WriteTurn {
    fn drop(&mut self) {
        self.queue.remove(self.ticket.ticket_id);
    }
}

/// Removes the ticket if the waiting future is dropped before its turn.
struct PendingTicket<'a> {
    queue: &'a UserWriteQueue,
    ticket_id: Uuid,
    armed: bool,
}

impl Drop for PendingTicket<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.queue.remove(self.ticket_id);
        }
    }
}

impl UserWriteQueue {
    /// Create an empty write queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a writer and wait until it reaches the front.
    pub async fn wait_for_turn(&self) -> WriteTurn {
        let ticket = WriteTicket {
            ticket_id: Uuid::new_v4(),
            enqueued_at: Utc::now(),
        };
        self.lock().push_back(ticket.clone());
        let mut pending = PendingTicket {
            queue: self,
            ticket_id: ticket.ticket_id,
            armed: true,
        };

        loop {
            let mut notified = pin!(self.inner.notify.notified());
            notified.as_mut().enable();
            if self.is_front(ticket.ticket_id) {
                break;
            }
            notified.await;
        }

        pending.armed = false;
        WriteTurn {
            queue: self.clone(),
            ticket,
        }
    }

    /// Return the number of queued writers (used for telemetry).
    pub fn pending_writes(&self) -> usize {
        self.lock().len()
    }

    fn is_front(&self, ticket_id: Uuid) -> bool {
        matches!(self.lock().front(), Some(front) if front.ticket_id == ticket_id)
    }

    fn remove(&self, ticket_id: Uuid) {
        {
            let mut queue = self.lock();
            queue.retain(|ticket| ticket.ticket_id != ticket_id);
        }
        self.inner.notify.notify_waiters();
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<WriteTicket>> {
        self.inner
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
