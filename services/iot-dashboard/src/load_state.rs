//! Loading lifecycle shared by every fetch-driven page

use std::future::Future;

/// `Idle -> Loading -> Ready | Failed`
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    /// Drive a fetch to completion, replacing any error with `failure_message`
    pub async fn load<F>(fetch: F, failure_message: &str) -> Self
    where
        F: Future<Output = crate::Result<T>>,
    {
        let mut state = LoadState::Idle;
        state.begin();
        state.settle(fetch.await, failure_message);
        state
    }

    pub fn begin(&mut self) {
        *self = LoadState::Loading;
    }

    pub fn settle(&mut self, result: crate::Result<T>, failure_message: &str) {
        *self = match result {
            Ok(data) => LoadState::Ready(data),
            Err(e) => {
                tracing::warn!("{}: {}", failure_message, e);
                LoadState::Failed(failure_message.to_string())
            }
        };
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            LoadState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U> {
        match self {
            LoadState::Idle => LoadState::Idle,
            LoadState::Loading => LoadState::Loading,
            LoadState::Ready(data) => LoadState::Ready(f(data)),
            LoadState::Failed(message) => LoadState::Failed(message),
        }
    }
}
