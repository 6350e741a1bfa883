//! Station Sensor Readings
//!
//! The station samples an MQ-3 alcohol sensor through a 10-bit ADC with a
//! 5 V reference and uploads each reading to the server.

use serde::{Deserialize, Serialize};

/// Endpoint the station posts readings to
pub const DEFAULT_READINGS_PATH: &str = "/api/recibir-datos/";

/// Largest value of the 10-bit converter
pub const ADC_MAX: u16 = 1023;

/// ADC reference voltage
pub const REFERENCE_VOLTAGE: f64 = 5.0;

/// Sensor baseline; readings at or below it map to 0 ppm
pub const BASELINE: u16 = 100;

/// ppm per ADC step above the baseline
pub const PPM_PER_STEP: f64 = 0.85;

/// Upper end of the clean-air band (analog 180)
pub const SOBER_MAX_PPM: f64 = 68.0;

/// Upper end of the residue band (analog 300); above it is an alert
pub const RESIDUE_MAX_PPM: f64 = 170.0;

/// One reading as uploaded by the station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(rename = "empleado_id")]
    pub employee_id: String,
    #[serde(rename = "valor_analogico")]
    pub analog_value: u16,
    #[serde(rename = "voltaje")]
    pub voltage: f64,
    pub alcohol_ppm: f64,
}

/// Band a reading falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingLevel {
    /// Sensor noise only
    Sober,
    /// Mouthwash, perfume, food; below the dangerous level
    Residue,
    /// Over the limit
    Alert,
}

impl ReadingLevel {
    pub fn classify(alcohol_ppm: f64) -> Self {
        if alcohol_ppm > RESIDUE_MAX_PPM {
            ReadingLevel::Alert
        } else if alcohol_ppm > SOBER_MAX_PPM {
            ReadingLevel::Residue
        } else {
            ReadingLevel::Sober
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReadingLevel::Sober => "sobrio",
            ReadingLevel::Residue => "residuo",
            ReadingLevel::Alert => "alerta",
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl SensorReading {
    /// Derive voltage and ppm from a raw converter value.
    /// Values above the converter range are clamped.
    pub fn from_analog(employee_id: impl Into<String>, analog_value: u16) -> Self {
        let analog_value = analog_value.min(ADC_MAX);
        let voltage = round2(f64::from(analog_value) * (REFERENCE_VOLTAGE / f64::from(ADC_MAX)));
        let steps = f64::from(analog_value) - f64::from(BASELINE);
        let alcohol_ppm = round2(steps * PPM_PER_STEP).max(0.0);

        Self {
            employee_id: employee_id.into(),
            analog_value,
            voltage,
            alcohol_ppm,
        }
    }

    pub fn level(&self) -> ReadingLevel {
        ReadingLevel::classify(self.alcohol_ppm)
    }
}

/// Server answer to an uploaded reading
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReadingReceipt {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl ReadingReceipt {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion() {
        let reading = SensorReading::from_analog("EMP001", 250);
        assert_eq!(reading.voltage, 1.22);
        assert_eq!(reading.alcohol_ppm, 127.5);
        assert_eq!(reading.level(), ReadingLevel::Residue);
    }

    #[test]
    fn test_below_baseline_clamps_to_zero() {
        let reading = SensorReading::from_analog("EMP002", 40);
        assert_eq!(reading.alcohol_ppm, 0.0);
        assert_eq!(reading.level(), ReadingLevel::Sober);
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(SensorReading::from_analog("E", 180).level(), ReadingLevel::Sober);
        assert_eq!(SensorReading::from_analog("E", 181).level(), ReadingLevel::Residue);
        assert_eq!(SensorReading::from_analog("E", 300).level(), ReadingLevel::Residue);
        assert_eq!(SensorReading::from_analog("E", 301).level(), ReadingLevel::Alert);
    }

    #[test]
    fn test_out_of_range_clamped() {
        let reading = SensorReading::from_analog("E", 5000);
        assert_eq!(reading.analog_value, ADC_MAX);
        assert_eq!(reading.voltage, 5.0);
    }

    #[test]
    fn test_wire_names() {
        let value = serde_json::to_value(SensorReading::from_analog("EMP007", 100)).unwrap();
        assert_eq!(value["empleado_id"], "EMP007");
        assert_eq!(value["valor_analogico"], 100);
        assert_eq!(value["voltaje"], 0.49);
        assert_eq!(value["alcohol_ppm"], 0.0);
    }
}
