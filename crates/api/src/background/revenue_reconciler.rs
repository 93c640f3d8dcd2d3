//! Periodic re-driving of revenue shares whose ledger crediting never
//! completed.
//!
//! Approval stamps `credited_at` only after every beneficiary credit is
//! durable. A crash or database error between the approval and the last
//! credit leaves the share row with `credited_at IS NULL`; this job picks
//! those up and replays `apply_split`, which is idempotent, so replaying a
//! half-credited share finishes it without double-paying anyone.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use hrkey_db::repositories::{AccessRequestRepo, RevenueRepo};

/// How often the reconciler scans for uncredited shares.
const RECONCILE_INTERVAL: Duration = Duration::from_secs(300); // 5 minutes

/// Shares younger than this are skipped; the approval path may still be
/// retrying them.
const GRACE_PERIOD_SECS: i64 = 60;

/// Max shares re-driven per pass.
const BATCH_SIZE: i64 = 50;

/// Run the revenue reconciliation loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    let interval_secs: u64 = std::env::var("REVENUE_RECONCILE_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(RECONCILE_INTERVAL.as_secs());

    tracing::info!(interval_secs, "Revenue reconciler started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Revenue reconciler stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = reconcile_once(&pool).await {
                    tracing::error!(error = %e, "Revenue reconciliation pass failed");
                }
            }
        }
    }
}

/// One reconciliation pass: replay crediting for every stale uncredited
/// share. Per-share failures are logged and skipped so one bad row cannot
/// starve the rest of the batch.
pub async fn reconcile_once(pool: &PgPool) -> Result<usize, sqlx::Error> {
    let cutoff = Utc::now() - chrono::Duration::seconds(GRACE_PERIOD_SECS);
    let shares = RevenueRepo::list_uncredited(pool, cutoff, BATCH_SIZE).await?;

    if shares.is_empty() {
        tracing::debug!("Revenue reconciler: nothing to do");
        return Ok(0);
    }

    let mut recovered = 0;
    for share in &shares {
        let request = match AccessRequestRepo::find_by_id(pool, share.data_access_request_id).await
        {
            Ok(Some(request)) => request,
            Ok(None) => {
                tracing::error!(
                    share_id = share.id,
                    request_id = share.data_access_request_id,
                    "Uncredited share references a missing request"
                );
                continue;
            }
            Err(e) => {
                tracing::warn!(share_id = share.id, error = %e, "Request lookup failed");
                continue;
            }
        };

        match RevenueRepo::apply_split(pool, share, request.target_user_id).await {
            Ok(()) => {
                recovered += 1;
                tracing::info!(
                    share_id = share.id,
                    request_id = share.data_access_request_id,
                    "Reconciler completed crediting"
                );
            }
            Err(e) => {
                tracing::warn!(share_id = share.id, error = %e, "Reconciler crediting failed");
            }
        }
    }

    tracing::info!(
        scanned = shares.len(),
        recovered,
        "Revenue reconciliation pass complete"
    );
    Ok(recovered)
}
