//! Request Context
//!
//! Carries the caller-supplied deadline and cancellation signal for a single
//! request. Storage calls are wrapped with [`RequestContext::run`] so that an
//! aborted request stops waiting on its I/O instead of completing partially.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why a request stopped before its future completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestInterrupted {
    /// The cancellation token was triggered
    #[error("request was cancelled")]
    Cancelled,

    /// The deadline elapsed
    #[error("request timed out")]
    TimedOut,
}

/// Per-request cancellation context
///
/// Cloning shares the same cancellation token.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl RequestContext {
    /// Context with no deadline and a fresh token
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that gives up after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            cancel: CancellationToken::new(),
        }
    }

    /// Attach an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Handle that can be used to cancel this request from elsewhere
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `fut` to completion unless the request is cancelled or times out.
    ///
    /// The future is dropped on interruption. An already-cancelled context
    /// never polls the future at all.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, RequestInterrupted>
    where
        F: Future<Output = T>,
    {
        if self.cancel.is_cancelled() {
            return Err(RequestInterrupted::Cancelled);
        }

        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(RequestInterrupted::Cancelled),
                out = fut => Ok(out),
            }
        };

        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, guarded)
                .await
                .unwrap_or(Err(RequestInterrupted::TimedOut)),
            None => guarded.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_completes() {
        let ctx = RequestContext::new();
        assert_eq!(ctx.run(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_run_pre_cancelled_skips_future() {
        let ctx = RequestContext::new();
        ctx.cancellation_token().cancel();

        let polled = std::sync::atomic::AtomicBool::new(false);
        let result = ctx
            .run(async {
                polled.store(true, std::sync::atomic::Ordering::SeqCst);
            })
            .await;

        assert_eq!(result, Err(RequestInterrupted::Cancelled));
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_run_cancelled_midway() {
        let ctx = RequestContext::new();
        let token = ctx.cancellation_token();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let result = ctx.run(std::future::pending::<()>()).await;
        assert_eq!(result, Err(RequestInterrupted::Cancelled));
    }

    #[tokio::test]
    async fn test_run_times_out() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(50));
        let result = ctx
            .run(tokio::time::sleep(Duration::from_secs(10)))
            .await;
        assert_eq!(result, Err(RequestInterrupted::TimedOut));
    }
}
