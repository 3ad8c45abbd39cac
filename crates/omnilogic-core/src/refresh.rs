// ── Background token upkeep ──
//
// The cloud invalidates bearer tokens after roughly a week. A client
// that lives longer than that (home automation bridges do) needs its
// token swapped out from under it without interrupting callers, so the
// current pair lives in an `ArcSwap` cell that both the facade and this
// task share.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, TimeDelta, Utc};
use omnilogic_api::auth::{AuthClient, Token};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Assumed token lifetime when the service does not report one.
pub(crate) const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// The current token pair plus what is known about its expiry.
#[derive(Debug, Clone)]
pub(crate) struct TokenState {
    pub token: Token,
    /// `None` for tokens of unknown provenance; the task refreshes
    /// those at its first check to establish a baseline.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Expiry for a token minted right now.
pub(crate) fn expiry_from_login(now: DateTime<Utc>, expires_in: Option<i64>) -> DateTime<Utc> {
    match expires_in {
        Some(secs) => now + TimeDelta::seconds(secs),
        None => now + DEFAULT_TOKEN_TTL,
    }
}

/// Whether the token should be refreshed at this check.
pub(crate) fn needs_refresh(
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    threshold: Duration,
) -> bool {
    let Some(expires_at) = expires_at else {
        return true;
    };
    let threshold = TimeDelta::from_std(threshold).unwrap_or(TimeDelta::MAX);
    expires_at - now < threshold
}

/// Handle to the spawned refresh task.
#[derive(Debug)]
pub(crate) struct RefreshHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RefreshHandle {
    /// Cancel the task and wait for it to wind down.
    pub(crate) async fn stop(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }

    /// Cancel without waiting. For drop paths that cannot await.
    pub(crate) fn abort(self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

pub(crate) fn spawn_refresh_task(
    auth: AuthClient,
    token: Arc<ArcSwap<TokenState>>,
    check_interval: Duration,
    refresh_threshold: Duration,
) -> RefreshHandle {
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(refresh_task(
        auth,
        token,
        check_interval,
        refresh_threshold,
        cancel.clone(),
    ));
    RefreshHandle { cancel, handle }
}

/// Periodically examine the token and refresh it when it nears expiry.
///
/// A failed refresh is logged and retried at the next tick; the task
/// only ever exits through its cancellation token.
async fn refresh_task(
    auth: AuthClient,
    token: Arc<ArcSwap<TokenState>>,
    check_interval: Duration,
    refresh_threshold: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(check_interval);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let state = token.load_full();
                if !needs_refresh(state.expires_at, Utc::now(), refresh_threshold) {
                    continue;
                }
                match auth.refresh(&state.token).await {
                    Ok(fresh) => {
                        let expires_at = Utc::now() + DEFAULT_TOKEN_TTL;
                        token.store(Arc::new(TokenState {
                            token: fresh,
                            expires_at: Some(expires_at),
                        }));
                        info!(expires_at = %expires_at, "token refreshed");
                    }
                    Err(e) => warn!(error = %e, "token refresh failed"),
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeDelta, Utc};

    use super::{DEFAULT_TOKEN_TTL, expiry_from_login, needs_refresh};

    #[test]
    fn unknown_expiry_refreshes_immediately() {
        assert!(needs_refresh(None, Utc::now(), Duration::from_secs(1)));
    }

    #[test]
    fn expiry_inside_threshold_refreshes() {
        let now = Utc::now();
        let expires_at = now + TimeDelta::hours(10);
        assert!(needs_refresh(
            Some(expires_at),
            now,
            Duration::from_secs(24 * 60 * 60)
        ));
    }

    #[test]
    fn distant_expiry_waits() {
        let now = Utc::now();
        let expires_at = now + TimeDelta::days(6);
        assert!(!needs_refresh(
            Some(expires_at),
            now,
            Duration::from_secs(24 * 60 * 60)
        ));
    }

    #[test]
    fn past_expiry_refreshes() {
        let now = Utc::now();
        let expires_at = now - TimeDelta::hours(1);
        assert!(needs_refresh(
            Some(expires_at),
            now,
            Duration::from_secs(24 * 60 * 60)
        ));
    }

    #[test]
    fn login_expiry_prefers_the_reported_lifetime() {
        let now = Utc::now();
        assert_eq!(
            expiry_from_login(now, Some(3600)),
            now + TimeDelta::seconds(3600)
        );
        assert_eq!(expiry_from_login(now, None), now + DEFAULT_TOKEN_TTL);
    }
}
