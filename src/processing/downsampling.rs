use crate::render::time_axis::Range;
use crate::state::data_series::SampleSeries;

/// Largest-Triangle-Three-Buckets (LTTB) downsampling of `[x, y]` points.
pub fn lttb_downsample(points: &[[f64; 2]], target: usize) -> Vec<[f64; 2]> {
    let n = points.len();
    if n <= target || target < 3 {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity(target);
    // Always keep the first point
    out.push(points[0]);

    let bucket_size = (n - 2) as f64 / (target - 2) as f64;
    let mut prev = points[0];

    for i in 0..(target - 2) {
        let bucket_start = ((i as f64 + 1.0) * bucket_size) as usize + 1;
        let bucket_end = (((i as f64 + 2.0) * bucket_size) as usize + 1).min(n - 1);

        // Average of the next bucket closes the triangle.
        let next_start = bucket_end;
        let next_end = (((i as f64 + 3.0) * bucket_size) as usize + 1).min(n);
        let next = &points[next_start..next_end.max(next_start + 1).min(n)];
        let count = next.len().max(1) as f64;
        let avg_x = next.iter().map(|p| p[0]).sum::<f64>() / count;
        let avg_y = next.iter().map(|p| p[1]).sum::<f64>() / count;

        let mut max_area = -1.0f64;
        let mut best = points[bucket_start];
        for &p in &points[bucket_start..bucket_end.max(bucket_start + 1)] {
            // Doubled triangle area; only compared.
            let area = ((prev[0] - avg_x) * (p[1] - prev[1]) - (prev[0] - p[0]) * (avg_y - prev[1])).abs();
            if area > max_area {
                max_area = area;
                best = p;
            }
        }

        out.push(best);
        prev = best;
    }

    // Always keep the last point
    out.push(points[n - 1]);
    out
}

/// Polylines for the visible part of a series.
///
/// Missing values break the line, so each run of present samples becomes its
/// own polyline. Runs are downsampled with LTTB so the total stays near
/// `max_points`. One sample beyond each edge of the domain is kept so lines
/// run to the plot border.
pub fn line_runs_for_view(series: &SampleSeries, domain: Range, max_points: usize) -> Vec<Vec<[f64; 2]>> {
    let times = series.times();
    if times.is_empty() {
        return Vec::new();
    }

    let start = times.partition_point(|&t| t < domain.min).saturating_sub(1);
    let end = (times.partition_point(|&t| t <= domain.max) + 1).min(times.len());
    let visible = end.saturating_sub(start).max(1);

    let mut runs: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();
    for i in start..end {
        match series.value_at(i) {
            Some(v) => current.push([times[i], v]),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    if visible <= max_points {
        return runs;
    }
    runs.into_iter()
        .map(|run| {
            let budget = (run.len() * max_points / visible).max(3);
            lttb_downsample(&run, budget)
        })
        .collect()
}
