//! PostgreSQL device log and IP lock repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::{DeviceLogRow, IpTrialLockRow};
use crate::repo::{CreateDeviceLog, CreateIpLock, DeviceRepository};

/// PostgreSQL device repository
#[derive(Clone)]
pub struct PgDeviceRepository {
    pool: PgPool,
}

impl PgDeviceRepository {
    /// Create a new device repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceRepository for PgDeviceRepository {
    async fn log_device(&self, log: CreateDeviceLog) -> DbResult<DeviceLogRow> {
        let row = sqlx::query_as::<_, DeviceLogRow>(
            r#"
            INSERT INTO device_logs (id, user_id, device_id, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, device_id, ip_address, user_agent, created_at
            "#,
        )
        .bind(log.id)
        .bind(log.user_id)
        .bind(&log.device_id)
        .bind(&log.ip_address)
        .bind(&log.user_agent)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_active_ip_lock(
        &self,
        ip_address: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<IpTrialLockRow>> {
        let lock = sqlx::query_as::<_, IpTrialLockRow>(
            r#"
            SELECT ip_address, user_id, expires_at, created_at
            FROM ip_trial_locks
            WHERE ip_address = $1 AND expires_at > $2
            "#,
        )
        .bind(ip_address)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lock)
    }

    async fn create_ip_lock(&self, lock: CreateIpLock) -> DbResult<bool> {
        // Insert-if-absent; losing a concurrent race is not an error.
        let result = sqlx::query(
            r#"
            INSERT INTO ip_trial_locks (ip_address, user_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (ip_address) DO NOTHING
            "#,
        )
        .bind(&lock.ip_address)
        .bind(lock.user_id)
        .bind(lock.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
