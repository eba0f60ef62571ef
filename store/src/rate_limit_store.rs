use chrono::Utc;
use sqlx::Row;

use crate::error::Result;
use crate::ControlPlaneStore;

impl ControlPlaneStore {
    /// Pre-seeds a `(api, caller)` rate-limit bucket. Idempotent: re-seeding
    /// an existing row is a no-op rather than resetting its counters.
    pub async fn seed_rate_limit(
        &self,
        api: &str,
        caller: &str,
        max_calls: u32,
        window_secs: u32,
    ) -> Result<()> {
        sqlx::query(
            r#"
INSERT INTO rate_limits (api, caller, window_start, calls_made, max_calls, window_secs)
VALUES (?, ?, ?, 0, ?, ?)
ON CONFLICT(api, caller) DO NOTHING
            "#,
        )
        .bind(api)
        .bind(caller)
        .bind(Utc::now().timestamp())
        .bind(i64::from(max_calls))
        .bind(i64::from(window_secs))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Atomically grants up to `requested` slots against the `(api, caller)`
    /// window, returning the number actually granted (`0 <= granted <=
    /// requested`).
    ///
    /// Runs as a single `BEGIN IMMEDIATE` transaction: SQLite takes the
    /// write lock at `BEGIN IMMEDIATE` rather than at the first write,
    /// which closes the read-then-write race a plain `SELECT` followed by
    /// `UPDATE` would have between two concurrent workers. A Postgres
    /// backend would use `SELECT ... FOR UPDATE` for the same effect.
    pub async fn acquire_slots(&self, api: &str, caller: &str, requested: u32) -> Result<u32> {
        if requested == 0 {
            return Ok(0);
        }

        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let row = sqlx::query(
            r#"
SELECT window_start, calls_made, max_calls, window_secs
FROM rate_limits
WHERE api = ? AND caller = ?
            "#,
        )
        .bind(api)
        .bind(caller)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.commit().await?;
            return Ok(0);
        };

        let window_start: i64 = row.try_get("window_start")?;
        let calls_made: i64 = row.try_get("calls_made")?;
        let max_calls: i64 = row.try_get("max_calls")?;
        let window_secs: i64 = row.try_get("window_secs")?;
        let now = Utc::now().timestamp();
        let requested = i64::from(requested);

        let (new_window_start, new_calls_made, granted) = if now - window_start > window_secs {
            let granted = requested.min(max_calls);
            (now, granted, granted)
        } else {
            let remaining = (max_calls - calls_made).max(0);
            let granted = requested.min(remaining);
            (window_start, calls_made + granted, granted)
        };

        sqlx::query(
            r#"
UPDATE rate_limits
SET window_start = ?, calls_made = ?
WHERE api = ? AND caller = ?
            "#,
        )
        .bind(new_window_start)
        .bind(new_calls_made)
        .bind(api)
        .bind(caller)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        if (granted as i64) < requested {
            tracing::debug!(api, caller, requested, granted, "rate limit window exhausted");
        }

        Ok(granted as u32)
    }
}
