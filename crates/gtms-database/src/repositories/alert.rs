//! Alert repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use gtms_core::result::AppResult;
use gtms_entity::alert::{AlertStatus, NewAlert};

use crate::error::db_error;
use crate::store::AlertStore;

/// Repository for clinical alerts.
#[derive(Debug, Clone)]
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    /// Create a new alert repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertStore for AlertRepository {
    async fn insert(&self, alert: &NewAlert) -> AppResult<Uuid> {
        let id = Uuid::now_v7();
        let (entity_type, entity_id) = match &alert.related_entity {
            Some(e) => (Some(e.entity_type.as_str()), Some(e.entity_id.as_str())),
            None => (None, None),
        };
        sqlx::query(
            "INSERT INTO alerts \
             (id, patient_id, alert_type, severity, message, related_entity_type, \
              related_entity_id, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(id)
        .bind(alert.patient_id)
        .bind(alert.alert_type.as_str())
        .bind(alert.severity.as_str())
        .bind(&alert.message)
        .bind(entity_type)
        .bind(entity_id)
        .bind(AlertStatus::Pending.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert alert", e))?;
        Ok(id)
    }
}
