//! # Notification dispatch
//!
//! The [`Dispatcher`] carries out sends and edits against a [`MessagingChannel`], which is assumed to be slow,
//! rate-limited and occasionally unreachable.
//!
//! * At most [`DispatchConfig::max_concurrency`] channel calls are in flight at once, across every product and source.
//! * Timeouts are retried after [`DispatchConfig::retry_delay`], up to [`DispatchConfig::retry_budget`] attempts.
//! * Rate limits are waited out for exactly as long as the channel asks, and do not use up the retry budget.
//! * Any other error aborts the operation immediately.
//! * Every successful delivery is followed by a short random pause, to smooth out bursts of traffic.
//!
//! Before sending, the channel's recent history is checked for a message with an identical body. This is a best-effort
//! guard against duplicates (e.g. after a crash between sending and persisting the handle). It only looks back a few
//! messages, so it cannot rule duplicates out.
mod dispatch_config;
mod outcomes;

use std::{fmt::Debug, future::Future, sync::Arc, time::Duration};

pub use dispatch_config::*;
use log::*;
pub use outcomes::{EditOutcome, SendFailure};
use rand::Rng;
use tokio::{sync::Semaphore, time::sleep};

use crate::{
    stock_types::NotificationHandle,
    traits::{ChannelError, MessagingChannel},
};

enum SendStep {
    Sent(NotificationHandle),
    AlreadySent,
}

enum RetryFailure {
    TimeoutExhausted { attempts: u32 },
    RateLimitCapExceeded { waited: Duration },
    Rejected(ChannelError),
}

pub struct Dispatcher<C> {
    channel: C,
    config: DispatchConfig,
    permits: Arc<Semaphore>,
}

impl<C> Debug for Dispatcher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Dispatcher({:?})", self.config)
    }
}

impl<C> Dispatcher<C> {
    pub fn new(channel: C, config: DispatchConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        Self { channel, config, permits }
    }
}

impl<C> Dispatcher<C>
where C: MessagingChannel
{
    /// Send a fresh notification for `product` and return its handle.
    pub async fn send(&self, product: &str, body: &str) -> Result<NotificationHandle, SendFailure> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| SendFailure::AbortedByChannel(format!("The dispatcher has shut down. {e}")))?;
        match self.with_retries(product, "send", || self.try_send(body)).await {
            Ok(SendStep::Sent(handle)) => {
                info!("📨️ [{product}] Notification {handle} sent");
                self.pace().await;
                Ok(handle)
            },
            Ok(SendStep::AlreadySent) => {
                info!("📨️ [{product}] An identical message was found in the recent history. Not sending it again.");
                Err(SendFailure::DuplicateDetected)
            },
            Err(RetryFailure::TimeoutExhausted { attempts }) => {
                error!("📨️ [{product}] Giving up on sending after {attempts} timed out attempts");
                Err(SendFailure::TimeoutExhausted { attempts })
            },
            Err(RetryFailure::RateLimitCapExceeded { waited }) => {
                error!("📨️ [{product}] Giving up on sending after waiting out rate limits for {waited:?}");
                Err(SendFailure::RateLimitCapExceeded { waited })
            },
            Err(RetryFailure::Rejected(e)) => {
                error!("📨️ [{product}] Sending failed. {e}");
                Err(SendFailure::AbortedByChannel(e.to_string()))
            },
        }
    }

    /// Replace the body of notification `handle` for `product`.
    pub async fn edit(&self, product: &str, handle: NotificationHandle, body: &str) -> EditOutcome {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => return EditOutcome::Failed(format!("The dispatcher has shut down. {e}")),
        };
        match self.with_retries(product, "edit", || self.channel.edit_message(handle, body)).await {
            Ok(()) => {
                info!("📨️ [{product}] Notification {handle} edited");
                self.pace().await;
                EditOutcome::Applied
            },
            Err(RetryFailure::Rejected(ChannelError::NoopSuccess)) => {
                info!("📨️ [{product}] Notification {handle} is already up to date");
                EditOutcome::NoopAlreadyCurrent
            },
            Err(RetryFailure::Rejected(ChannelError::TargetGone)) => {
                warn!("📨️ [{product}] Notification {handle} no longer exists. It was probably deleted.");
                EditOutcome::TargetMissing
            },
            Err(RetryFailure::Rejected(e)) => {
                error!("📨️ [{product}] Editing notification {handle} failed. {e}");
                EditOutcome::Failed(e.to_string())
            },
            Err(RetryFailure::TimeoutExhausted { attempts }) => {
                error!("📨️ [{product}] Giving up on editing {handle} after {attempts} timed out attempts");
                EditOutcome::Failed(format!("Timed out {attempts} times"))
            },
            Err(RetryFailure::RateLimitCapExceeded { waited }) => {
                error!("📨️ [{product}] Giving up on editing {handle} after waiting out rate limits for {waited:?}");
                EditOutcome::Failed(format!("Rate limited for {waited:?}"))
            },
        }
    }

    async fn try_send(&self, body: &str) -> Result<SendStep, ChannelError> {
        if self.already_sent(body).await {
            return Ok(SendStep::AlreadySent);
        }
        self.channel.send_message(body).await.map(SendStep::Sent)
    }

    async fn already_sent(&self, body: &str) -> bool {
        if self.config.lookback == 0 {
            return false;
        }
        match self.channel.recent_messages(self.config.lookback).await {
            Ok(recent) => recent.iter().any(|m| m == body),
            Err(e) => {
                warn!("📨️ Could not read the recent message history, so assuming the message is new. {e}");
                false
            },
        }
    }

    async fn with_retries<T, F, Fut>(&self, product: &str, operation: &str, mut call: F) -> Result<T, RetryFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ChannelError>>,
    {
        let budget = self.config.retry_budget;
        let mut attempts = 0u32;
        let mut waited = Duration::ZERO;
        loop {
            match call().await {
                Ok(v) => return Ok(v),
                Err(ChannelError::RateLimited { retry_after }) => {
                    waited += retry_after;
                    if let Some(cap) = self.config.max_rate_limit_wait {
                        if waited > cap {
                            return Err(RetryFailure::RateLimitCapExceeded { waited });
                        }
                    }
                    warn!("📨️ [{product}] Rate limited during {operation}. Waiting {retry_after:?} before retrying.");
                    sleep(retry_after).await;
                },
                Err(ChannelError::TransientTransport(e)) => {
                    attempts += 1;
                    if attempts >= budget {
                        return Err(RetryFailure::TimeoutExhausted { attempts });
                    }
                    warn!("📨️ [{product}] {operation} timed out ({attempts}/{budget}). Retrying. {e}");
                    sleep(self.config.retry_delay).await;
                },
                Err(e) => return Err(RetryFailure::Rejected(e)),
            }
        }
    }

    async fn pace(&self) {
        let min = duration_millis(self.config.pacing_min);
        let max = duration_millis(self.config.pacing_max);
        let delay = if max > min { rand::thread_rng().gen_range(min..=max) } else { min };
        if delay > 0 {
            trace!("📨️ Pausing for {delay}ms");
            sleep(Duration::from_millis(delay)).await;
        }
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
