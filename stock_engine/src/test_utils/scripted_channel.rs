use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::time::sleep;

use crate::{
    stock_types::NotificationHandle,
    traits::{ChannelError, MessagingChannel},
};

const FIRST_HANDLE: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelCall {
    Send(String),
    Edit(NotificationHandle, String),
    Lookback(usize),
}

#[derive(Default)]
struct ChannelState {
    send_script: VecDeque<Result<NotificationHandle, ChannelError>>,
    edit_script: VecDeque<Result<(), ChannelError>>,
    history: Vec<String>,
    history_error: Option<ChannelError>,
    calls: Vec<ChannelCall>,
    next_handle: i64,
    in_flight: usize,
    max_in_flight: usize,
}

/// A [`MessagingChannel`] that replays scripted responses and records every call made to it.
///
/// Once a script runs dry, sends succeed with fresh handles (starting at 1001) and edits succeed. Clones share their
/// state.
#[derive(Clone, Default)]
pub struct ScriptedChannel {
    state: Arc<Mutex<ChannelState>>,
    latency: Duration,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        let channel = Self::default();
        channel.state().next_handle = FIRST_HANDLE;
        channel
    }

    /// Every send and edit takes `latency` to complete.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn script_send(&self, response: Result<NotificationHandle, ChannelError>) {
        self.state().send_script.push_back(response);
    }

    pub fn script_edit(&self, response: Result<(), ChannelError>) {
        self.state().edit_script.push_back(response);
    }

    pub fn set_history(&self, history: Vec<String>) {
        self.state().history = history;
    }

    pub fn fail_history(&self, error: ChannelError) {
        self.state().history_error = Some(error);
    }

    pub fn calls(&self) -> Vec<ChannelCall> {
        self.state().calls.clone()
    }

    pub fn sends(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ChannelCall::Send(body) => Some(body),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<(NotificationHandle, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ChannelCall::Edit(handle, body) => Some((handle, body)),
                _ => None,
            })
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.state().max_in_flight
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ChannelState> {
        self.state.lock().unwrap()
    }

    async fn in_flight<T, F: FnOnce(&mut ChannelState) -> T>(&self, f: F) -> T {
        {
            let mut state = self.state();
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
        }
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
        let mut state = self.state();
        state.in_flight -= 1;
        f(&mut *state)
    }
}

impl MessagingChannel for ScriptedChannel {
    async fn send_message(&self, body: &str) -> Result<NotificationHandle, ChannelError> {
        self.in_flight(|state| {
            state.calls.push(ChannelCall::Send(body.to_string()));
            match state.send_script.pop_front() {
                Some(response) => response,
                None => {
                    state.next_handle += 1;
                    Ok(NotificationHandle(state.next_handle))
                },
            }
        })
        .await
    }

    async fn edit_message(&self, handle: NotificationHandle, body: &str) -> Result<(), ChannelError> {
        self.in_flight(|state| {
            state.calls.push(ChannelCall::Edit(handle, body.to_string()));
            state.edit_script.pop_front().unwrap_or(Ok(()))
        })
        .await
    }

    async fn recent_messages(&self, limit: usize) -> Result<Vec<String>, ChannelError> {
        let mut state = self.state();
        state.calls.push(ChannelCall::Lookback(limit));
        if let Some(e) = state.history_error.clone() {
            return Err(e);
        }
        let skip = state.history.len().saturating_sub(limit);
        Ok(state.history[skip..].to_vec())
    }
}
