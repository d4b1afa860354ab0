//! Cooperative cancellation for in-flight requests.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll, Waker};

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    next_slot: AtomicU64,
    /// Wakers of pending [`Cancelled`] futures, keyed by slot. A future
    /// removes its own entry when dropped.
    wakers: Mutex<HashMap<u64, Waker>>,
}

impl Inner {
    fn wakers(&self) -> MutexGuard<'_, HashMap<u64, Waker>> {
        match self.wakers.lock() {
            Ok(wakers) => wakers,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Stops a request from waiting for further replies.
///
/// Clones share state: cancelling any clone cancels them all. A cancelled
/// request returns the replies it had already collected.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        let wakers = std::mem::take(&mut *self.inner.wakers());
        wakers.into_values().for_each(Waker::wake);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub fn cancelled(&self) -> Cancelled<'_> {
        Cancelled {
            token: self,
            slot: None,
        }
    }

    #[cfg(test)]
    fn pending_wakers(&self) -> usize {
        self.inner.wakers().len()
    }
}

/// Future returned by [`CancelToken::cancelled`].
#[derive(Debug)]
pub struct Cancelled<'a> {
    token: &'a CancelToken,
    slot: Option<u64>,
}

impl Future for Cancelled<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if this.token.is_cancelled() {
            return Poll::Ready(());
        }
        {
            let inner = &this.token.inner;
            let slot = *this
                .slot
                .get_or_insert_with(|| inner.next_slot.fetch_add(1, Ordering::Relaxed));
            let mut wakers = inner.wakers();
            match wakers.get_mut(&slot) {
                Some(waker) if waker.will_wake(cx.waker()) => {}
                Some(waker) => waker.clone_from(cx.waker()),
                None => {
                    wakers.insert(slot, cx.waker().clone());
                }
            }
        }
        // Re-check so a cancel racing with registration is not missed.
        if this.token.is_cancelled() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

impl Drop for Cancelled<'_> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            self.token.inner.wakers().remove(&slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_future_wakes() {
        let token = CancelToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });
        tokio::time::timeout(Duration::from_secs(1), token.cancelled())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_already_cancelled_is_ready() {
        let token = CancelToken::new();
        token.cancel();
        token.cancelled().await;
    }

    #[tokio::test]
    async fn test_dropped_futures_release_wakers() {
        let token = CancelToken::new();
        for _ in 0..1000 {
            let mut pending = token.cancelled();
            assert!(futures::poll!(&mut pending).is_pending());
            assert_eq!(token.pending_wakers(), 1);
        }
        assert_eq!(token.pending_wakers(), 0);
    }

    #[tokio::test]
    async fn test_timed_out_waits_release_wakers() {
        let token = CancelToken::new();
        let mut tasks = Vec::new();
        for _ in 0..100 {
            let token = token.clone();
            tasks.push(tokio::spawn(async move {
                let _ = tokio::time::timeout(Duration::from_millis(1), token.cancelled()).await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(token.pending_wakers(), 0);
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn test_repolling_keeps_one_registration() {
        let token = CancelToken::new();
        let mut pending = token.cancelled();
        for _ in 0..3 {
            assert!(futures::poll!(&mut pending).is_pending());
        }
        assert_eq!(token.pending_wakers(), 1);
        token.cancel();
        assert_eq!(token.pending_wakers(), 0);
        assert!(futures::poll!(&mut pending).is_ready());
    }
}
