//! Alcohol Reading Chart
//!
//! Turns the samples supplied with the dashboard into a single-series line
//! chart description. The serialized form follows the Chart.js
//! configuration layout so it can be handed to a chart library as-is.

use serde::{Deserialize, Serialize};

/// Series label
pub const DATASET_LABEL: &str = "Nivel de Alcohol (ppm)";

/// Series line colour
pub const LINE_COLOR: &str = "rgb(75, 192, 192)";

/// Line smoothing
pub const LINE_TENSION: f64 = 0.1;

/// Default alert threshold in ppm (analog reading of 300 on the station sensor)
pub const DEFAULT_ALERT_THRESHOLD_PPM: f64 = 170.0;

/// One timestamped alcohol reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(alias = "fecha")]
    pub timestamp: String,
    pub alcohol_ppm: f64,
}

impl Sample {
    pub fn new(timestamp: impl Into<String>, alcohol_ppm: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            alcohol_ppm,
        }
    }
}

/// Complete chart description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub border_color: String,
    pub tension: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    pub scales: Scales,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scales {
    pub y: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    pub begin_at_zero: bool,
}

impl ChartConfig {
    /// The only series on the chart
    pub fn series(&self) -> Option<&Dataset> {
        self.data.datasets.first()
    }

    /// Upper bound of the y axis: the largest value, or 1.0 for an all-zero series
    pub fn y_max(&self) -> f64 {
        let max = self
            .data
            .datasets
            .iter()
            .flat_map(|d| d.data.iter().copied())
            .fold(0.0_f64, f64::max);
        if max > 0.0 {
            max
        } else {
            1.0
        }
    }

    /// Lower bound of the y axis
    pub fn y_min(&self) -> f64 {
        if self.options.scales.y.begin_at_zero {
            return 0.0;
        }
        self.data
            .datasets
            .iter()
            .flat_map(|d| d.data.iter().copied())
            .fold(f64::INFINITY, f64::min)
            .min(self.y_max())
    }
}

/// Build the chart for `samples`, or `None` when there is nothing to draw
pub fn build_chart_config(samples: &[Sample]) -> Option<ChartConfig> {
    if samples.is_empty() {
        return None;
    }

    Some(ChartConfig {
        kind: "line".to_string(),
        data: ChartData {
            labels: samples.iter().map(|s| s.timestamp.clone()).collect(),
            datasets: vec![Dataset {
                label: DATASET_LABEL.to_string(),
                data: samples.iter().map(|s| s.alcohol_ppm).collect(),
                border_color: LINE_COLOR.to_string(),
                tension: LINE_TENSION,
            }],
        },
        options: ChartOptions {
            scales: Scales {
                y: Axis { begin_at_zero: true },
            },
        },
    })
}

/// Aggregate view of a sample set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSummary {
    pub count: usize,
    pub max_ppm: f64,
    pub mean_ppm: f64,
    pub alert_threshold_ppm: f64,
    pub above_threshold: usize,
}

impl SampleSummary {
    pub fn from_samples(samples: &[Sample], alert_threshold_ppm: f64) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let count = samples.len();
        let sum: f64 = samples.iter().map(|s| s.alcohol_ppm).sum();
        let max_ppm = samples
            .iter()
            .map(|s| s.alcohol_ppm)
            .fold(f64::NEG_INFINITY, f64::max);
        let above_threshold = samples
            .iter()
            .filter(|s| s.alcohol_ppm > alert_threshold_ppm)
            .count();

        Some(Self {
            count,
            max_ppm,
            mean_ppm: sum / count as f64,
            alert_threshold_ppm,
            above_threshold,
        })
    }
}

impl std::fmt::Display for SampleSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} muestras, máx {:.2} ppm, promedio {:.2} ppm, {} sobre {:.1} ppm",
            self.count, self.max_ppm, self.mean_ppm, self.above_threshold, self.alert_threshold_ppm
        )
    }
}
