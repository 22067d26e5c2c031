//! Idle-reminder timers for negotiation channels.
//!
//! One recurring timer per ACTIVE channel, keyed by channel id. A firing
//! posts a mention to both participants and reschedules itself; any inbound
//! message in the channel resets the timer, so the interval measures idle
//! time since last activity, not wall-clock since creation. Timers are
//! best-effort and not persisted: a restart loses them.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{ChannelId, UserId},
    ports::ChannelHost,
    view::MessageView,
};

#[derive(Clone)]
pub struct ReminderRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    host: Arc<dyn ChannelHost>,
    interval: Duration,
    timers: tokio::sync::Mutex<HashMap<u64, TimerEntry>>,
}

struct TimerEntry {
    participants: (UserId, UserId),
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ReminderRegistry {
    pub fn new(host: Arc<dyn ChannelHost>, interval: Duration) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                host,
                interval,
                timers: tokio::sync::Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Start (or restart) the timer for a channel. Any previous timer for
    /// the same channel is cancelled first, so there is always exactly one
    /// live timer per tracked channel.
    pub async fn start(&self, channel: ChannelId, a: UserId, b: UserId) {
        let mut timers = self.inner.timers.lock().await;
        if let Some(old) = timers.remove(&channel.0) {
            old.cancel.cancel();
            old.handle.abort();
        }
        let entry = self.spawn_entry(channel, (a, b));
        timers.insert(channel.0, entry);
    }

    /// Cancel-then-reschedule from now. No-op for untracked channels (the
    /// message may be in a ticket-named channel we never started a timer
    /// for, e.g. after a restart).
    pub async fn reset(&self, channel: ChannelId) {
        let mut timers = self.inner.timers.lock().await;
        let Some(old) = timers.remove(&channel.0) else {
            return;
        };
        old.cancel.cancel();
        old.handle.abort();
        let entry = self.spawn_entry(channel, old.participants);
        timers.insert(channel.0, entry);
    }

    /// Remove the timer for a channel being closed. Idempotent.
    pub async fn cancel(&self, channel: ChannelId) {
        let mut timers = self.inner.timers.lock().await;
        if let Some(old) = timers.remove(&channel.0) {
            old.cancel.cancel();
            old.handle.abort();
        }
    }

    pub async fn is_tracked(&self, channel: ChannelId) -> bool {
        self.inner.timers.lock().await.contains_key(&channel.0)
    }

    fn spawn_entry(&self, channel: ChannelId, participants: (UserId, UserId)) -> TimerEntry {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let inner = self.inner.clone();
        let parts = participants.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                  _ = token.cancelled() => break,
                  _ = sleep(inner.interval) => {
                    let message = reminder_message(&parts.0, &parts.1);
                    if let Err(e) = inner.host.send_message(channel, message).await {
                        // Delivery failure is fatal for this channel: the
                        // channel may be gone (deleted out-of-band). Drop
                        // our own tracking entry instead of erroring again
                        // on the next interval.
                        eprintln!("[REMIND] Dropping timer for channel {}: {e}", channel.0);
                        inner.timers.lock().await.remove(&channel.0);
                        break;
                    }
                    // Success: loop around and wait out the next interval.
                  }
                }
            }
        });

        TimerEntry {
            participants,
            cancel,
            handle,
        }
    }
}

fn reminder_message(a: &UserId, b: &UserId) -> MessageView {
    MessageView {
        content: Some(format!(
            "📢 Reminder: {} {} - Don't forget to complete your transaction!",
            a.mention(),
            b.mention()
        )),
        ..MessageView::default()
    }
}
