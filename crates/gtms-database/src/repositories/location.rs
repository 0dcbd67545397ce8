//! Location and geofence reminder repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gtms_core::result::AppResult;
use gtms_entity::location::{LocationReminder, NewLocationReminder, NewUserLocation};

use crate::error::db_error;
use crate::store::LocationStore;

/// Repository for reported positions and location reminders.
#[derive(Debug, Clone)]
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    /// Create a new location repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationStore for LocationRepository {
    async fn record_location(&self, location: &NewUserLocation) -> AppResult<Uuid> {
        let id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO user_locations (id, user_id, latitude, longitude, accuracy, address) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(location.user_id)
        .bind(location.coordinate.latitude)
        .bind(location.coordinate.longitude)
        .bind(location.accuracy)
        .bind(location.address.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to record location", e))?;
        Ok(id)
    }

    async fn insert_reminder(&self, reminder: &NewLocationReminder) -> AppResult<Uuid> {
        let id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO location_reminders \
             (id, user_id, location_name, latitude, longitude, radius_meters, reminder_type, \
              reminder_message, trigger_type, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE)",
        )
        .bind(id)
        .bind(reminder.user_id)
        .bind(&reminder.location_name)
        .bind(reminder.centre.latitude)
        .bind(reminder.centre.longitude)
        .bind(reminder.radius_meters)
        .bind(&reminder.reminder_type)
        .bind(&reminder.reminder_message)
        .bind(reminder.trigger.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create location reminder", e))?;
        Ok(id)
    }

    async fn active_reminders(&self, user_id: Uuid) -> AppResult<Vec<LocationReminder>> {
        sqlx::query_as::<_, LocationReminder>(
            "SELECT id, user_id, location_name, latitude, longitude, radius_meters, \
                    reminder_type, reminder_message, trigger_type, is_active, created_at, \
                    updated_at \
             FROM location_reminders WHERE user_id = $1 AND is_active = TRUE \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list location reminders", e))
    }

    async fn touch_reminder(&self, reminder_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE location_reminders SET updated_at = $2 WHERE id = $1")
            .bind(reminder_id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to touch location reminder", e))?;
        Ok(())
    }
}
