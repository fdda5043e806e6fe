use crate::error::ViewerError;
use crate::processing::nearest::nearest_index;
use crate::render::time_axis::Range;

/// Line colors for stacked tracks, cycled by track index.
pub const COLOR_PALETTE: [[u8; 4]; 6] = [
    [31, 119, 180, 255],  // Blue
    [255, 127, 14, 255],  // Orange
    [44, 160, 44, 255],   // Green
    [214, 39, 40, 255],   // Red
    [148, 103, 189, 255], // Purple
    [23, 190, 207, 255],  // Cyan
];

pub fn color_for_index(index: usize) -> egui::Color32 {
    let c = COLOR_PALETTE[index % COLOR_PALETTE.len()];
    egui::Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}

/// One snapped sample: its time, its value (`None` when missing) and its
/// position in the series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub value: Option<f64>,
    pub index: usize,
}

/// Time-ordered samples of one channel.
///
/// Times are finite and non-decreasing. Missing values are stored as `NAN`
/// and surface as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSeries {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl SampleSeries {
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Result<Self, ViewerError> {
        if times.len() != values.len() {
            return Err(ViewerError::InvalidSeries(format!(
                "{} times but {} values",
                times.len(),
                values.len()
            )));
        }
        if let Some(i) = times.iter().position(|t| !t.is_finite()) {
            return Err(ViewerError::InvalidSeries(format!(
                "non-finite time at index {i}"
            )));
        }
        if let Some(i) = times.windows(2).position(|w| w[1] < w[0]) {
            return Err(ViewerError::InvalidSeries(format!(
                "time decreases after index {i}"
            )));
        }
        Ok(Self { times, values })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().filter(|v| v.is_finite())
    }

    pub fn sample(&self, index: usize) -> Option<Sample> {
        let time = *self.times.get(index)?;
        Some(Sample {
            time,
            value: self.value_at(index),
            index,
        })
    }

    /// First and last sample time.
    pub fn time_range(&self) -> Option<Range> {
        Some(Range::new(*self.times.first()?, *self.times.last()?))
    }

    /// Sample nearest to `t`, clamped to the first/last sample outside the
    /// series; exact midpoints resolve to the earlier sample.
    pub fn nearest(&self, t: f64) -> Result<Sample, ViewerError> {
        nearest_index(&self.times, t)
            .and_then(|i| self.sample(i))
            .ok_or(ViewerError::EmptySeries)
    }
}
