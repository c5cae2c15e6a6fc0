//! PostgreSQL repository implementations

mod device;
mod meal;
mod profile;
mod referral;
mod trial;

pub use device::PgDeviceRepository;
pub use meal::PgMealRepository;
pub use profile::PgProfileRepository;
pub use referral::PgReferralRepository;
pub use trial::PgTrialRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub trials: PgTrialRepository,
    pub referrals: PgReferralRepository,
    pub devices: PgDeviceRepository,
    pub meals: PgMealRepository,
    pub profiles: PgProfileRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            trials: PgTrialRepository::new(pool.clone()),
            referrals: PgReferralRepository::new(pool.clone()),
            devices: PgDeviceRepository::new(pool.clone()),
            meals: PgMealRepository::new(pool.clone()),
            profiles: PgProfileRepository::new(pool),
        }
    }
}
