/// Numeric range with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    /// Create a new range, swapping bounds if needed.
    pub fn new(min: f64, max: f64) -> Self {
        if min > max {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Smallest range covering both.
    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Widen a zero-span range (single-sample log) so it can be drawn.
    fn with_min_span(self, min_span: f64) -> Self {
        if self.span() >= min_span {
            return self;
        }
        let center = (self.min + self.max) * 0.5;
        Self {
            min: center - min_span * 0.5,
            max: center + min_span * 0.5,
        }
    }
}

/// Smallest visible span the user can zoom into, in seconds.
pub const MIN_SPAN: f64 = 1e-3;

/// A pan/zoom request coming from any one track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisInput {
    /// Drag by `dx_px` pixels on a plot area `width_px` wide.
    Pan { dx_px: f32, width_px: f32 },
    /// Scale the visible span by `factor` around the time `center`.
    Zoom { center: f64, factor: f64 },
    /// Back to the full data extent.
    Reset,
}

/// The one time domain shared by every track of a window.
///
/// Pan and zoom on any track mutate this single value, so all tracks observe
/// the same range on the next paint and the crosshair clips against it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    full: Range,
    visible: Range,
}

impl TimeAxis {
    pub fn new(full: Range) -> Self {
        let full = if full.span() > 0.0 {
            full
        } else {
            full.with_min_span(1.0)
        };
        Self { full, visible: full }
    }

    /// Domain covering the union of the given time ranges.
    pub fn from_ranges<I: IntoIterator<Item = Range>>(ranges: I) -> Option<Self> {
        ranges.into_iter().reduce(Range::union).map(Self::new)
    }

    /// Currently visible `[t_min, t_max]`.
    pub fn domain(&self) -> Range {
        self.visible
    }

    pub fn is_zoomed(&self) -> bool {
        self.visible != self.full
    }

    /// Apply one input. Returns true if the domain changed.
    pub fn apply(&mut self, input: AxisInput) -> bool {
        let before = self.visible;
        match input {
            AxisInput::Pan { dx_px, width_px } => self.pan_pixels(dx_px, width_px),
            AxisInput::Zoom { center, factor } => self.zoom_about(center, factor),
            AxisInput::Reset => self.reset(),
        }
        self.visible != before
    }

    pub fn pan_by(&mut self, dt: f64) {
        if !dt.is_finite() {
            return;
        }
        self.visible.min += dt;
        self.visible.max += dt;
    }

    /// Pan by a pointer drag; dragging right moves the view back in time.
    pub fn pan_pixels(&mut self, dx_px: f32, width_px: f32) {
        if width_px <= 0.0 {
            return;
        }
        let dt = -(dx_px as f64) * self.visible.span() / width_px as f64;
        self.pan_by(dt);
    }

    /// Zoom around `center`, keeping it at the same screen position.
    pub fn zoom_about(&mut self, center: f64, factor: f64) {
        if !center.is_finite() || !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let factor = factor.max(MIN_SPAN / self.visible.span());
        self.visible = Range::new(
            center + (self.visible.min - center) * factor,
            center + (self.visible.max - center) * factor,
        );
    }

    pub fn reset(&mut self) {
        self.visible = self.full;
    }

    /// Convert a screen x position inside a plot area to time.
    pub fn screen_to_time(&self, x: f32, left: f32, width: f32) -> f64 {
        let frac = (x - left) as f64 / width as f64;
        self.visible.min + frac * self.visible.span()
    }

    /// Convert a time to a screen x position inside a plot area.
    pub fn time_to_screen(&self, t: f64, left: f32, width: f32) -> f32 {
        let frac = (t - self.visible.min) / self.visible.span();
        left + (frac as f32) * width
    }
}

/// Zoom factor for a scroll wheel delta; scrolling up zooms in.
pub fn zoom_factor_from_scroll(scroll_delta: f32) -> f64 {
    (1.0 - (scroll_delta as f64) * 0.001).clamp(0.5, 2.0)
}

/// Tick spacing for a range: 1, 2 or 5 times a power of ten, giving at most
/// about eight ticks. `None` for an empty or non-finite range.
pub fn tick_step(range: Range) -> Option<f64> {
    let span = range.span();
    if !(span > 0.0 && span.is_finite()) {
        return None;
    }
    let raw = span / 8.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    [1.0, 2.0, 5.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|&step| step >= raw)
        .or(Some(10.0 * magnitude))
}

/// Tick positions inside `range`, on multiples of `tick_step`.
pub fn ticks(range: Range) -> Vec<f64> {
    let Some(step) = tick_step(range) else {
        return Vec::new();
    };
    let first = (range.min / step).ceil() as i64;
    let last = (range.max / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// Tick label with just enough decimals to tell neighbors `step` apart.
pub fn tick_label(value: f64, step: f64) -> String {
    let decimals = (-step.log10().floor()).max(0.0) as usize;
    // Avoid "-0.0" from accumulated rounding.
    let value = if value.abs() < step * 1e-6 { 0.0 } else { value };
    format!("{value:.decimals$}")
}
