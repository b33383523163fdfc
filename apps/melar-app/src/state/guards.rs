//! # View and Submission Guards
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ViewGuard                          SubmitGuard                         │
//! │  ─────────                          ───────────                         │
//! │  view opens ─► guard active         click ─► try_begin() ─► ticket      │
//! │  request sent                       click ─► try_begin() ─► Busy        │
//! │  view closes ─► deactivate()        response ─► ticket dropped          │
//! │  response arrives ─► apply() skips  click ─► try_begin() ─► ticket      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::{AppError, AppResult};

/// "Is this view still open" flag shared with in-flight requests.
#[derive(Debug, Clone)]
pub struct ViewGuard {
    name: &'static str,
    active: Arc<AtomicBool>,
}

impl ViewGuard {
    pub fn new(name: &'static str) -> Self {
        ViewGuard {
            name,
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Marks the view closed. Results arriving afterwards are dropped.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Runs `apply` with `value` only while the view is open.
    pub fn apply<T, F>(&self, value: T, apply: F) -> bool
    where
        F: FnOnce(T),
    {
        if self.is_active() {
            apply(value);
            true
        } else {
            debug!(view = self.name, "View closed, dropping result");
            false
        }
    }

    /// Awaits `request` and hands back its result only if the view is still
    /// open when it arrives. A closed view yields `Ok(None)`, errors included.
    pub async fn load<T, F>(&self, request: F) -> AppResult<Option<T>>
    where
        F: Future<Output = AppResult<T>>,
    {
        let result = request.await;
        if !self.is_active() {
            debug!(view = self.name, "View closed, dropping response");
            return Ok(None);
        }
        result.map(Some)
    }
}

/// At most one in-flight mutating request per action.
#[derive(Debug, Clone)]
pub struct SubmitGuard {
    action: &'static str,
    in_flight: Arc<AtomicBool>,
}

impl SubmitGuard {
    pub fn new(action: &'static str) -> Self {
        SubmitGuard {
            action,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Claims the action. Fails with `ErrorCode::Busy` while another ticket
    /// is alive.
    pub fn try_begin(&self) -> AppResult<SubmitTicket> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::busy(self.action))?;
        Ok(SubmitTicket {
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Releases the guard when dropped.
#[derive(Debug)]
pub struct SubmitTicket {
    in_flight: Arc<AtomicBool>,
}

impl Drop for SubmitTicket {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_view_guard_drops_results_after_close() {
        let guard = ViewGuard::new("orders");
        let mut applied = Vec::new();

        assert!(guard.apply(1, |v| applied.push(v)));
        guard.clone().deactivate();
        assert!(!guard.apply(2, |v| applied.push(v)));

        assert_eq!(applied, vec![1]);
    }

    #[tokio::test]
    async fn test_view_guard_load_drops_late_responses() {
        let guard = ViewGuard::new("products");

        let open = guard.load(async { Ok::<_, AppError>(3) }).await.unwrap();
        assert_eq!(open, Some(3));

        let failed = guard
            .load(async { Err::<i32, _>(AppError::busy("Checkout")) })
            .await
            .unwrap_err();
        assert_eq!(failed.code, ErrorCode::Busy);

        let closer = guard.clone();
        let late = guard
            .load(async move {
                closer.deactivate();
                Err::<i32, _>(AppError::busy("Checkout"))
            })
            .await
            .unwrap();
        assert_eq!(late, None);
    }

    #[test]
    fn test_submit_guard_refuses_second_trigger() {
        let guard = SubmitGuard::new("Checkout");

        let ticket = guard.try_begin().unwrap();
        let err = guard.try_begin().unwrap_err();
        assert_eq!(err.code, ErrorCode::Busy);

        drop(ticket);
        assert!(!guard.is_in_flight());
        assert!(guard.try_begin().is_ok());
    }
}
