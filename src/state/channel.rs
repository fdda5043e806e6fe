use serde::{Deserialize, Serialize};

use crate::data::loader::LogTable;
use crate::data::parser::ColumnSet;
use crate::error::ViewerError;
use crate::render::time_axis::Range;
use crate::state::data_series::{Sample, SampleSeries};

/// What to plot on one track and how to find it in a log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSpec {
    name: String,
    column: String,
    #[serde(default)]
    aliases: Vec<String>,
    axis_label: String,
    range: [f64; 2],
}

impl ChannelSpec {
    pub fn new(name: &str, axis_label: &str, range: [f64; 2]) -> Self {
        Self {
            name: name.to_string(),
            column: name.to_string(),
            aliases: Vec::new(),
            axis_label: axis_label.to_string(),
            range,
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn axis_label(&self) -> &str {
        &self.axis_label
    }

    pub fn value_range(&self) -> Range {
        Range::new(self.range[0], self.range[1])
    }

    /// Canonical column first, then aliases in order.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.column.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// First candidate present in the log.
    pub fn resolve<'a>(&self, available: &'a ColumnSet) -> Result<&'a str, ViewerError> {
        self.candidates()
            .find_map(|candidate| available.get(candidate))
            .ok_or_else(|| ViewerError::ChannelUnavailable {
                channel: self.name.clone(),
                tried: self.candidates().map(str::to_string).collect(),
            })
    }
}

/// One bound track: a non-empty series, its spec and the sample the
/// crosshair currently highlights.
#[derive(Debug, Clone)]
pub struct ChannelViewModel {
    spec: ChannelSpec,
    series: SampleSeries,
    highlighted: Option<usize>,
}

impl ChannelViewModel {
    pub fn bind(spec: ChannelSpec, series: SampleSeries) -> Result<Self, ViewerError> {
        if series.is_empty() {
            return Err(ViewerError::EmptySeries);
        }
        Ok(Self {
            spec,
            series,
            highlighted: None,
        })
    }

    pub fn spec(&self) -> &ChannelSpec {
        &self.spec
    }

    pub fn series(&self) -> &SampleSeries {
        &self.series
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Snap to the sample nearest `t` and remember it.
    pub fn locate(&mut self, t: f64) -> Result<Sample, ViewerError> {
        let sample = self.series.nearest(t)?;
        self.highlighted = Some(sample.index);
        Ok(sample)
    }

    pub fn clear(&mut self) {
        self.highlighted = None;
    }
}

/// A stacked track: live data or a labeled placeholder that keeps the
/// layout stable when a log lacks a channel.
#[derive(Debug, Clone)]
pub enum Track {
    Live(ChannelViewModel),
    Placeholder { spec: ChannelSpec, reason: ViewerError },
}

impl Track {
    /// Resolve `spec` against the log and bind its series.
    pub fn build(spec: ChannelSpec, table: &LogTable, available: &ColumnSet) -> Self {
        let column = match spec.resolve(available) {
            Ok(column) => column,
            Err(reason) => return Track::Placeholder { spec, reason },
        };
        let series = match table.series(column) {
            Some(Ok(series)) => series,
            Some(Err(reason)) => return Track::Placeholder { spec, reason },
            None => SampleSeries::empty(),
        };
        Self::bind(spec, series)
    }

    pub fn bind(spec: ChannelSpec, series: SampleSeries) -> Self {
        let fallback = spec.clone();
        match ChannelViewModel::bind(spec, series) {
            Ok(view) => Track::Live(view),
            Err(reason) => Track::Placeholder {
                spec: fallback,
                reason,
            },
        }
    }

    pub fn spec(&self) -> &ChannelSpec {
        match self {
            Track::Live(view) => view.spec(),
            Track::Placeholder { spec, .. } => spec,
        }
    }

    pub fn series(&self) -> Option<&SampleSeries> {
        match self {
            Track::Live(view) => Some(view.series()),
            Track::Placeholder { .. } => None,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Track::Live(_))
    }

    /// Short note shown in place of the line on a placeholder track.
    pub fn placeholder_note(&self) -> Option<String> {
        match self {
            Track::Live(_) => None,
            Track::Placeholder {
                reason: ViewerError::EmptySeries,
                ..
            } => Some("no samples in this log".to_string()),
            Track::Placeholder { reason, .. } => Some(reason.to_string()),
        }
    }
}
