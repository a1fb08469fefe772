//! Measurement model
//!
//! Body measurements recorded per client per visit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ClientId, MeasurementId};

/// A set of body measurements for a client on a given date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    /// Unique identifier
    pub id: MeasurementId,

    /// The measured client
    pub client_id: ClientId,

    /// Measurement date
    pub date: NaiveDate,

    /// Weight in kilograms
    pub weight_kg: Option<f64>,

    /// Height in centimeters
    pub height_cm: Option<f64>,

    /// Waist circumference in centimeters
    pub waist_cm: Option<f64>,

    /// Hip circumference in centimeters
    pub hip_cm: Option<f64>,

    /// Free-text note
    #[serde(default)]
    pub note: String,

    /// When the row was created
    pub created_at: DateTime<Utc>,
}

impl Measurement {
    /// Create a new empty measurement for a client
    pub fn new(client_id: ClientId, date: NaiveDate) -> Self {
        Self {
            id: MeasurementId::new(),
            client_id,
            date,
            weight_kg: None,
            height_cm: None,
            waist_cm: None,
            hip_cm: None,
            note: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Body mass index, if both weight and height are recorded
    pub fn bmi(&self) -> Option<f64> {
        match (self.weight_kg, self.height_cm) {
            (Some(w), Some(h)) if h > 0.0 => {
                let meters = h / 100.0;
                Some(w / (meters * meters))
            }
            _ => None,
        }
    }

    /// Validate the measurement's fields
    pub fn validate(&self) -> Result<(), String> {
        for (label, value) in [
            ("weight", self.weight_kg),
            ("height", self.height_cm),
            ("waist", self.waist_cm),
            ("hip", self.hip_cm),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(format!("Invalid {} value: {}", label, v));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi() {
        let mut m = Measurement::new(ClientId::new(), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert!(m.bmi().is_none());

        m.weight_kg = Some(70.0);
        m.height_cm = Some(175.0);
        let bmi = m.bmi().unwrap();
        assert!((bmi - 22.857).abs() < 0.01);
    }

    #[test]
    fn test_negative_value_invalid() {
        let mut m = Measurement::new(ClientId::new(), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        m.weight_kg = Some(-5.0);
        assert!(m.validate().is_err());
    }
}
