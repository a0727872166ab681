//! Call context: cancellation and deadline for one top-level operation.
//!
//! Uses `tokio_util::sync::CancellationToken` for caller-driven cancellation
//! and an optional `tokio::time::Instant` deadline. Every network call and
//! every retry wait races against [`CallContext::done`].

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::errors::{Phase, SecretsError};

/// Why a call context finished before the work did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Cancelled,
    DeadlineExceeded,
}

impl Interrupt {
    /// Turn the interrupt into the error reported for `phase`.
    pub fn into_error(self, phase: Phase) -> SecretsError {
        match self {
            Interrupt::Cancelled => SecretsError::Cancelled { phase },
            Interrupt::DeadlineExceeded => SecretsError::DeadlineExceeded { phase },
        }
    }
}

/// Cancellation signal plus optional deadline, threaded through every call.
///
/// Cloning is cheap; clones share the same cancellation token.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline_in(timeout)
    }

    /// Wrap an existing cancellation token.
    pub fn with_token(token: CancellationToken) -> Self {
        Self { token, deadline: None }
    }

    /// Set the deadline to `timeout` from now, keeping an earlier one.
    pub fn deadline_in(self, timeout: Duration) -> Self {
        self.deadline_at(Instant::now() + timeout)
    }

    /// Set an absolute deadline, keeping an earlier one.
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// A child context: cancelled with this one, or on its own.
    pub fn child(&self) -> Self {
        Self { token: self.token.child_token(), deadline: self.deadline }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns the interrupt if the context is already done.
    pub fn check(&self) -> Option<Interrupt> {
        if self.token.is_cancelled() {
            return Some(Interrupt::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Interrupt::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> Interrupt {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => Interrupt::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => Interrupt::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                Interrupt::Cancelled
            }
        }
    }

    /// Run `fut` unless the context finishes first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Interrupt> {
        if let Some(interrupt) = self.check() {
            return Err(interrupt);
        }
        tokio::select! {
            biased;
            interrupt = self.done() => Err(interrupt),
            output = fut => Ok(output),
        }
    }

    /// Cancellable fixed wait.
    pub async fn sleep(&self, delay: Duration) -> Result<(), Interrupt> {
        self.run(tokio::time::sleep(delay)).await
    }
}
