//! Intraocular pressure measurements.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One IOP reading for both eyes, in mmHg.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IopMeasurement {
    /// Measurement identifier.
    pub id: Uuid,
    /// Patient.
    pub patient_id: Uuid,
    /// Local date of the reading.
    pub measurement_date: NaiveDate,
    /// Local time of the reading.
    pub measurement_time: Option<NaiveTime>,
    /// Left eye pressure.
    pub left_eye_iop: Option<f64>,
    /// Right eye pressure.
    pub right_eye_iop: Option<f64>,
}

impl IopMeasurement {
    /// Whether either eye is strictly above `threshold`.
    pub fn exceeds(&self, threshold: f64) -> bool {
        [self.left_eye_iop, self.right_eye_iop]
            .into_iter()
            .flatten()
            .any(|p| p > threshold)
    }
}
