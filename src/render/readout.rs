use serde::{Deserialize, Serialize};

/// Screen-relative placement of the readout, as a fraction of the figure
/// rect measured from its top-left corner. It does not scroll with pan/zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadoutAnchor {
    pub x: f32,
    pub y: f32,
}

impl Default for ReadoutAnchor {
    /// Bottom-left corner of the figure.
    fn default() -> Self {
        Self { x: 0.01, y: 0.99 }
    }
}

/// Formats the current-time annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Readout {
    pub precision: usize,
    pub unit: String,
    pub anchor: ReadoutAnchor,
}

impl Default for Readout {
    fn default() -> Self {
        Self {
            precision: 3,
            unit: "s".to_string(),
            anchor: ReadoutAnchor::default(),
        }
    }
}

impl Readout {
    /// Text for a snapped sample, e.g. `t = 12.345 s   (index 42)`.
    pub fn format_time(&self, time: f64, index: usize) -> String {
        format!(
            "t = {time:.prec$} {}   (index {index})",
            self.unit,
            prec = self.precision
        )
    }
}

/// Marker label: integral values print without decimals, others with two.
pub fn format_value_label(name: &str, value: f64) -> String {
    if value.is_finite() && (value - value.round()).abs() < 1e-9 {
        format!("{name}: {}", value.round() as i64)
    } else {
        format!("{name}: {value:.2}")
    }
}
