//! Soil and environment readings
//!
//! The seven inputs of the suitability classifier, in the column order the
//! model was trained on: N, P, K, temperature, humidity, pH, rainfall.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of features fed to the suitability classifier
pub const FEATURE_COUNT: usize = 7;

/// Form metadata for one soil/environment field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SoilField {
    /// Form field name (also the multipart field name)
    pub name: &'static str,
    /// Human readable label
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    /// Whole numbers only (N, P, K)
    pub integer: bool,
}

/// Field table in feature order
pub const FIELDS: [SoilField; FEATURE_COUNT] = [
    SoilField { name: "nitrogen", label: "Nitrogen (N)", min: 0.0, max: 140.0, default: 90.0, integer: true },
    SoilField { name: "phosphorus", label: "Phosphorus (P)", min: 0.0, max: 145.0, default: 42.0, integer: true },
    SoilField { name: "potassium", label: "Potassium (K)", min: 0.0, max: 205.0, default: 43.0, integer: true },
    SoilField { name: "temperature", label: "Temperature (°C)", min: 0.0, max: 50.0, default: 25.0, integer: false },
    SoilField { name: "humidity", label: "Humidity (%)", min: 0.0, max: 100.0, default: 80.0, integer: false },
    SoilField { name: "ph", label: "Soil pH", min: 0.0, max: 14.0, default: 6.5, integer: false },
    SoilField { name: "rainfall", label: "Rainfall (mm)", min: 0.0, max: 300.0, default: 120.0, integer: false },
];

/// Soil and environment reading entered on the form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilReading {
    pub nitrogen: u32,
    pub phosphorus: u32,
    pub potassium: u32,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl Default for SoilReading {
    fn default() -> Self {
        Self {
            nitrogen: 90,
            phosphorus: 42,
            potassium: 43,
            temperature: 25.0,
            humidity: 80.0,
            ph: 6.5,
            rainfall: 120.0,
        }
    }
}

impl SoilReading {
    /// Feature vector in training column order
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.nitrogen as f64,
            self.phosphorus as f64,
            self.potassium as f64,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }

    /// Check every field against its form range
    ///
    /// # Errors
    /// `Error::InvalidInput` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        for (field, value) in FIELDS.iter().zip(self.features()) {
            if !value.is_finite() {
                return Err(Error::InvalidInput(format!(
                    "{} must be a finite number",
                    field.label
                )));
            }
            if value < field.min || value > field.max {
                return Err(Error::InvalidInput(format!(
                    "{} must be between {} and {} (got {})",
                    field.label, field.min, field.max, value
                )));
            }
        }
        Ok(())
    }

    /// Set a field from its textual form value
    ///
    /// # Errors
    /// `Error::InvalidInput` for unknown field names or unparseable numbers
    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<()> {
        let raw = raw.trim();
        let parse_int = |label: &str| {
            raw.parse::<u32>()
                .map_err(|_| Error::InvalidInput(format!("{} must be a whole number: {:?}", label, raw)))
        };
        let parse_float = |label: &str| {
            raw.parse::<f64>()
                .map_err(|_| Error::InvalidInput(format!("{} must be a number: {:?}", label, raw)))
        };

        match name {
            "nitrogen" => self.nitrogen = parse_int("Nitrogen (N)")?,
            "phosphorus" => self.phosphorus = parse_int("Phosphorus (P)")?,
            "potassium" => self.potassium = parse_int("Potassium (K)")?,
            "temperature" => self.temperature = parse_float("Temperature (°C)")?,
            "humidity" => self.humidity = parse_float("Humidity (%)")?,
            "ph" => self.ph = parse_float("Soil pH")?,
            "rainfall" => self.rainfall = parse_float("Rainfall (mm)")?,
            other => {
                return Err(Error::InvalidInput(format!("Unknown soil field: {}", other)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_field_table() {
        let reading = SoilReading::default();
        for (field, value) in FIELDS.iter().zip(reading.features()) {
            assert_eq!(field.default, value, "default for {}", field.name);
        }
        assert!(reading.validate().is_ok());
    }

    #[test]
    fn test_feature_order() {
        let reading = SoilReading {
            nitrogen: 1,
            phosphorus: 2,
            potassium: 3,
            temperature: 4.0,
            humidity: 5.0,
            ph: 6.0,
            rainfall: 7.0,
        };
        assert_eq!(reading.features(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let reading = SoilReading { nitrogen: 141, ..Default::default() };
        let err = reading.validate().unwrap_err();
        assert!(err.to_string().contains("Nitrogen"));

        let reading = SoilReading { ph: 14.5, ..Default::default() };
        assert!(reading.validate().is_err());

        let reading = SoilReading { temperature: -0.1, ..Default::default() };
        assert!(reading.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_range_edges() {
        let low = SoilReading {
            nitrogen: 0,
            phosphorus: 0,
            potassium: 0,
            temperature: 0.0,
            humidity: 0.0,
            ph: 0.0,
            rainfall: 0.0,
        };
        assert!(low.validate().is_ok());

        let high = SoilReading {
            nitrogen: 140,
            phosphorus: 145,
            potassium: 205,
            temperature: 50.0,
            humidity: 100.0,
            ph: 14.0,
            rainfall: 300.0,
        };
        assert!(high.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let reading = SoilReading { humidity: f64::NAN, ..Default::default() };
        let err = reading.validate().unwrap_err();
        assert!(err.to_string().contains("finite"));
    }

    #[test]
    fn test_set_field() {
        let mut reading = SoilReading::default();
        reading.set_field("nitrogen", " 12 ").unwrap();
        reading.set_field("ph", "7.25").unwrap();
        assert_eq!(reading.nitrogen, 12);
        assert_eq!(reading.ph, 7.25);

        assert!(reading.set_field("nitrogen", "12.5").is_err());
        assert!(reading.set_field("rainfall", "lots").is_err());
        assert!(reading.set_field("sunshine", "1").is_err());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let reading: SoilReading = serde_json::from_str(r#"{"nitrogen": 10}"#).unwrap();
        assert_eq!(reading.nitrogen, 10);
        assert_eq!(reading.rainfall, 120.0);
    }
}
