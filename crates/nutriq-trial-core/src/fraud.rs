//! Device/IP fraud gate
//!
//! Limits repeat trial grants per IP. The device id itself is a client-side
//! best-effort fingerprint and is only recorded, never trusted as a fraud
//! signal on its own.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use nutriq_db::{CreateDeviceLog, CreateIpLock, DeviceRepository};
use nutriq_types::UserId;

use crate::TrialError;

/// How long an IP stays exclusive to the account it first granted
pub const IP_LOCK_DAYS: i64 = 30;

/// Client-reported device details for one signup attempt
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Client-side fingerprint (advisory only)
    pub device_id: String,
    /// Caller IP as seen by the edge
    pub ip_address: String,
    /// User agent header, if present
    pub user_agent: Option<String>,
}

/// Fraud gate over the device/IP audit store
#[derive(Clone)]
pub struct FraudGate<D: DeviceRepository> {
    devices: Arc<D>,
}

impl<D: DeviceRepository> FraudGate<D> {
    /// Create a new fraud gate
    pub fn new(devices: Arc<D>) -> Self {
        Self { devices }
    }

    /// Record the device and decide whether a trial grant is permitted
    ///
    /// The audit row is written first, regardless of the outcome. A live
    /// lock held by a different account fails the grant path with
    /// `FraudLock`; the caller decides what that means for the rest of
    /// signup.
    pub async fn check_and_log(
        &self,
        user_id: UserId,
        device: &DeviceInfo,
        now: DateTime<Utc>,
    ) -> Result<(), TrialError> {
        self.devices
            .log_device(CreateDeviceLog {
                id: Uuid::new_v4(),
                user_id: user_id.0,
                device_id: device.device_id.clone(),
                ip_address: device.ip_address.clone(),
                user_agent: device.user_agent.clone(),
            })
            .await?;

        let lock = self
            .devices
            .find_active_ip_lock(&device.ip_address, now)
            .await?;

        if let Some(lock) = lock {
            if lock.user_id != user_id.0 {
                warn!(
                    ip = %device.ip_address,
                    holder = %lock.user_id,
                    "Trial grant blocked: IP already holds a trial for another account"
                );
                return Err(TrialError::FraudLock);
            }
        }

        Ok(())
    }

    /// Register a successful trial grant for this IP
    ///
    /// Creates the 30-day lock on first grant only; an existing lock is
    /// left untouched. Returns whether this call created the lock.
    pub async fn register_grant(
        &self,
        user_id: UserId,
        ip_address: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, TrialError> {
        let created = self
            .devices
            .create_ip_lock(CreateIpLock {
                ip_address: ip_address.to_string(),
                user_id: user_id.0,
                expires_at: now + Duration::days(IP_LOCK_DAYS),
            })
            .await?;

        if created {
            debug!(ip = %ip_address, user_id = %user_id, "IP trial lock created");
        }

        Ok(created)
    }
}

impl<D: DeviceRepository> std::fmt::Debug for FraudGate<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FraudGate").finish()
    }
}
