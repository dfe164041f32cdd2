//! Timing series: for each benchmarked type, a (low, median, high)
//! triple in nanoseconds per measurement point, one JSON record per
//! line:
//!
//! ```text
//! {"type":"std::set","timings":[[1,2,3],[4,5,6],[7,8,9]]}
//! ```
//!
//! Only the medians are drawn as lines; the low/high band and the
//! derived y ticks are optional.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    ops::Range,
    path::{Path, PathBuf},
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    style::{Style, StyleRegistry},
    theme::{self, Theme},
};

/// Distance on the x axis between two consecutive measurement points.
/// Point `i` sits at `(i + 1) * DEFAULT_X_STEP`.
pub const DEFAULT_X_STEP: f64 = 10.;

const LINE_WIDTH: f64 = 1.1;
const MARKER_SIZE: f64 = 4.;
const BAND_ALPHA: f64 = 0.3;
const BAND_LINE_WIDTH: f64 = 0.1;

/// (low, median, high).
pub type Triple = [f64; 3];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimingRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub timings: Vec<Triple>,
}

/// Half-open range `[from, to)` of measurement points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointRange {
    pub from: i64,
    pub to: i64,
}

impl PointRange {
    pub fn new(from: i64, to: i64) -> Self {
        PointRange { from, to }
    }

    /// Indices of a sequence of length `len` covered by the range, both
    /// ends clipped to `[0, len]`.
    pub fn clip(&self, len: usize) -> Range<usize> {
        let len = len as i64;
        let from = self.from.clamp(0, len);
        let to = self.to.clamp(from, len);
        (from as usize)..(to as usize)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.clip(items.len())]
    }

    /// X coordinates of the points of a sequence of length `len`
    /// covered by the range.  Point `i` sits at `(i + 1) * step`.
    pub fn x_coords(&self, len: usize, step: f64) -> Vec<f64> {
        x_coords(self.clip(len), step)
    }
}

fn x_coords(indices: Range<usize>, step: f64) -> Vec<f64> {
    indices.map(|i| (i + 1) as f64 * step).collect()
}

/// Smallest low and largest high seen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    fn of(timings: &[Triple]) -> Option<Bounds> {
        let min = timings.iter().map(|t| t[0]).reduce(f64::min)?;
        let max = timings.iter().map(|t| t[2]).reduce(f64::max)?;
        Some(Bounds { min, max })
    }

    fn merge(self, other: Bounds) -> Bounds {
        Bounds { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    /// `count + 1` round tick values from 0 to just above `max`.
    pub fn y_ticks(&self, count: usize) -> Vec<f64> {
        if count == 0 {
            return vec![0.];
        }
        let span = (self.max + 0.01 * (self.max - self.min)) / count as f64;
        (0..=count).map(|i| (i as f64 * span).trunc()).collect()
    }
}

/// A stored slice and the index of its first point in the record.
#[derive(Debug, Clone, PartialEq)]
struct Slice {
    start: usize,
    points: Vec<Triple>,
}

/// The requested slices of the requested types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timings {
    series: HashMap<String, Slice>,
    bounds: Option<Bounds>,
}

impl Timings {
    pub fn read<S>(path: &Path, kinds: &[S], range: PointRange)
                   -> Result<Self>
    where S: AsRef<str> {
        let f = File::open(path).map_err(|source| Error::Open {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(BufReader::new(f), kinds, range)
    }

    /// Keep `timings[range]` of every record whose type is in `kinds`.
    /// A later record replaces an earlier one of the same type.
    pub fn parse<S>(reader: impl BufRead, kinds: &[S], range: PointRange)
                    -> Result<Self>
    where S: AsRef<str> {
        let mut t = Timings::default();
        for (i, line) in reader.lines().enumerate() {
            let record: TimingRecord = serde_json::from_str(&line?)
                .map_err(|source| Error::Json { line: i + 1, source })?;
            if !kinds.iter().any(|k| k.as_ref() == record.kind) {
                continue;
            }
            let indices = range.clip(record.timings.len());
            let slice = Slice {
                start: indices.start,
                points: record.timings[indices].to_vec(),
            };
            debug!("{}: {} of {} points", record.kind, slice.points.len(),
                   record.timings.len());
            if let Some(b) = Bounds::of(&slice.points) {
                t.bounds = Some(t.bounds.map_or(b, |a| a.merge(b)));
            }
            t.series.insert(record.kind, slice);
        }
        Ok(t)
    }

    /// Stored slice of `kind`, empty when no record had this type.
    pub fn series(&self, kind: &str) -> &[Triple] {
        self.series.get(kind).map_or(&[][..], |s| s.points.as_slice())
    }

    /// X coordinates of the stored points of `kind`, `step` apart.
    pub fn x_coords(&self, kind: &str, step: f64) -> Vec<f64> {
        match self.series.get(kind) {
            Some(s) => x_coords(s.start..s.start + s.points.len(), step),
            None => Vec::new(),
        }
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.series.contains_key(kind)
    }

    /// `None` until a non-empty slice is stored.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }
}

/// Legend columns for `n` entries.
pub fn legend_columns(n: usize) -> usize {
    if n == 3 || n == 6 { 3 } else { 2 }
}

/// Rendering knobs of [`TimingChart`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingOptions {
    pub x_step: f64,
    /// Shade the low..high range around each line.
    pub band: bool,
    /// Number of explicit y-tick intervals derived from the bounds.
    pub y_ticks: Option<usize>,
}

impl Default for TimingOptions {
    fn default() -> Self {
        TimingOptions { x_step: DEFAULT_X_STEP, band: false, y_ticks: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    style: &'static Style,
    x: Vec<f64>,
    low: Vec<f64>,
    median: Vec<f64>,
    high: Vec<f64>,
}

/// Everything needed to draw the timing chart, computed without
/// Python.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingChart {
    ylabel: String,
    lines: Vec<Line>,
    band: bool,
    y_ticks: Option<Vec<f64>>,
}

impl TimingChart {
    /// One line per entry of `kinds`, in order.  A type without data
    /// gets an empty line so the legend still matches the lines.
    pub fn new<S>(timings: &Timings, kinds: &[S], registry: &StyleRegistry,
                  operation: &str, options: &TimingOptions)
                  -> Result<Self>
    where S: AsRef<str> {
        let mut lines = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let kind = kind.as_ref();
            let style = registry.get(kind)?;
            if !timings.contains(kind) {
                warn!("no timings for `{kind}`");
            }
            let series = timings.series(kind);
            let column = |j: usize| -> Vec<f64> {
                series.iter().map(|t| t[j]).collect()
            };
            lines.push(Line {
                style,
                x: timings.x_coords(kind, options.x_step),
                low: column(0),
                median: column(1),
                high: column(2),
            });
        }
        let y_ticks = match (options.y_ticks, timings.bounds()) {
            (Some(count), Some(b)) => Some(b.y_ticks(count)),
            _ => None,
        };
        Ok(TimingChart {
            ylabel: format!("nanosecs/{operation}"),
            lines,
            band: options.band,
            y_ticks,
        })
    }

    pub fn legend_labels(&self) -> Vec<&'static str> {
        self.lines.iter().map(|l| l.style.name).collect()
    }

    pub fn render(&self, theme: &Theme, path: &Path) -> Result<()> {
        let (fig, mut ax) = theme.figure(theme::TIMING_SIZE)?;
        ax.set_ylabel(&self.ylabel, theme.font_size)?
            .set_xlabel("n", theme.font_size)?;
        for l in &self.lines {
            ax.xy(&l.x, &l.median)
                .color(l.style.color)
                .alpha(l.style.alpha)
                .linestyle(l.style.linestyle)
                .linewidth(LINE_WIDTH)
                .markersize(MARKER_SIZE)
                .zorder(1.)
                .plot()?;
        }
        if self.band {
            for l in &self.lines {
                ax.fill_between(&l.x, &l.low, &l.high)
                    .color(l.style.color)
                    .alpha(BAND_ALPHA)
                    .linewidth(BAND_LINE_WIDTH)
                    .zorder(1.)
                    .draw()?;
            }
        }
        if let Some(ticks) = &self.y_ticks {
            ax.set_yticks(ticks)?;
        }
        let labels = self.legend_labels();
        ax.legend()
            .labels(labels.iter().copied())
            .loc("upper left")
            .numpoints(2)
            .ncol(legend_columns(labels.len()))
            .fontsize(theme.font_size)
            .draw()?;
        fig.save().tight().to_file(path)?;
        Ok(())
    }
}

/// Draw the medians of `kinds` over `range` from `input` into
/// `<output>.pdf`.  Return the path written.
///
/// Every type is looked up before the input is opened.
pub fn plot<S>(input: &Path, output: &str, operation: &str,
               range: PointRange, kinds: &[S], registry: &StyleRegistry,
               theme: &Theme, options: &TimingOptions) -> Result<PathBuf>
where S: AsRef<str> {
    for kind in kinds {
        registry.get(kind.as_ref())?;
    }
    let timings = Timings::read(input, kinds, range)?;
    let chart = TimingChart::new(&timings, kinds, registry, operation,
                                 options)?;
    let path = PathBuf::from(format!("{output}.pdf"));
    chart.render(theme, &path)?;
    info!("wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDS: &str = r#"{"type":"std::set","timings":[[1,2,3],[4,5,6],[7,8,9]]}
{"type":"sorted_vector","timings":[[0.5,1.5,2.5],[3,3,30]]}
{"type":"other","timings":[[100,200,300]]}
"#;

    fn load(kinds: &[&str], from: i64, to: i64) -> Result<Timings> {
        Timings::parse(RECORDS.as_bytes(), kinds, PointRange::new(from, to))
    }

    #[test]
    fn slice_and_x_coords() -> Result<()> {
        let range = PointRange::new(0, 2);
        let t = Timings::parse(RECORDS.as_bytes(), &["std::set"], range)?;
        assert_eq!(t.series("std::set"), &[[1., 2., 3.], [4., 5., 6.]]);
        assert_eq!(range.x_coords(3, DEFAULT_X_STEP), vec![10., 20.]);
        assert_eq!(t.x_coords("std::set", DEFAULT_X_STEP), vec![10., 20.]);
        assert!(!t.contains("sorted_vector"));
        Ok(())
    }

    #[test]
    fn x_coords_follow_the_range() {
        assert_eq!(PointRange::new(3, 6).x_coords(10, DEFAULT_X_STEP),
                   vec![40., 50., 60.]);
        assert_eq!(PointRange::new(1, 3).x_coords(10, 2.), vec![4., 6.]);
        assert!(PointRange::new(5, 2).x_coords(10, DEFAULT_X_STEP).is_empty());
        assert_eq!(PointRange::new(-2, 2).x_coords(3, DEFAULT_X_STEP),
                   vec![10., 20.]);
        assert_eq!(PointRange::new(0, i64::MAX).x_coords(1, DEFAULT_X_STEP),
                   vec![10.]);
    }

    #[test]
    fn clipping() {
        let r = PointRange::new(-2, 10);
        assert_eq!(r.clip(3), 0..3);
        assert_eq!(PointRange::new(4, 10).clip(3), 3..3);
        assert_eq!(PointRange::new(2, 1).clip(3), 2..2);
        assert_eq!(PointRange::new(1, 2).slice(&[7, 8, 9]), &[8]);
    }

    #[test]
    fn bounds_over_lows_and_highs() -> Result<()> {
        let t = load(&["std::set", "sorted_vector"], 0, 3)?;
        assert_eq!(t.bounds(), Some(Bounds { min: 0.5, max: 30. }));
        let t = load(&["std::set"], 1, 2)?;
        assert_eq!(t.bounds(), Some(Bounds { min: 4., max: 6. }));
        assert_eq!(load(&["std::set"], 5, 9)?.bounds(), None);
        Ok(())
    }

    #[test]
    fn y_ticks() {
        let b = Bounds { min: 0., max: 800. };
        assert_eq!(b.y_ticks(8),
                   vec![0., 101., 202., 303., 404., 505., 606., 707., 808.]);
    }

    #[test]
    fn later_record_wins() -> Result<()> {
        let input = "{\"type\":\"std::set\",\"timings\":[[1,2,3]]}\n\
                     {\"type\":\"std::set\",\"timings\":[[4,5,6]]}\n";
        let t = Timings::parse(input.as_bytes(), &["std::set"],
                               PointRange::new(0, 5))?;
        assert_eq!(t.series("std::set"), &[[4., 5., 6.]]);
        Ok(())
    }

    #[test]
    fn malformed_line() {
        let input = "{\"type\":\"std::set\",\"timings\":[[1,2,3]]}\nnot json\n";
        match Timings::parse(input.as_bytes(), &["std::set"],
                             PointRange::new(0, 1)) {
            Err(Error::Json { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn absent_type_is_an_empty_line() -> Result<()> {
        let kinds = ["sorted_vector", "std::set"];
        let range = PointRange::new(0, 2);
        let t = Timings::parse(r#"{"type":"std::set","timings":[[1,2,3]]}"#
                               .as_bytes(), &kinds, range)?;
        let chart = TimingChart::new(&t, &kinds, &StyleRegistry::containers(),
                                     "insert", &TimingOptions::default())?;
        assert!(chart.lines[0].median.is_empty());
        assert!(chart.lines[0].x.is_empty());
        // Clipped to the single stored point.
        assert_eq!(chart.lines[1].x, vec![10.]);
        assert_eq!(chart.lines[1].median, vec![2.]);
        assert_eq!(chart.legend_labels(), vec!["sorted_vector", "std::set"]);
        assert_eq!(chart.ylabel, "nanosecs/insert");
        Ok(())
    }

    #[test]
    fn chart_lines() -> Result<()> {
        let kinds = ["std::set", "sorted_vector"];
        let range = PointRange::new(0, 2);
        let t = Timings::parse(RECORDS.as_bytes(), &kinds, range)?;
        let options = TimingOptions { y_ticks: Some(4), ..Default::default() };
        let chart = TimingChart::new(&t, &kinds, &StyleRegistry::containers(),
                                     "find", &options)?;
        assert_eq!(chart.lines[0].median, vec![2., 5.]);
        assert_eq!(chart.lines[0].low, vec![1., 4.]);
        assert_eq!(chart.lines[1].high, vec![2.5, 30.]);
        assert_eq!(chart.lines[1].x, vec![10., 20.]);
        assert_eq!(chart.y_ticks, Some(vec![0., 7., 15., 22., 30.]));
        Ok(())
    }

    /// Chart lines of `std::set` from `RECORDS` over `from..to`.
    fn set_line(from: i64, to: i64) -> Result<Line> {
        let kinds = ["std::set"];
        let t = load(&kinds, from, to)?;
        let mut chart = TimingChart::new(&t, &kinds,
                                         &StyleRegistry::containers(), "find",
                                         &TimingOptions::default())?;
        Ok(chart.lines.remove(0))
    }

    #[test]
    fn negative_from_keeps_points_in_place() -> Result<()> {
        let l = set_line(-2, 2)?;
        assert_eq!(l.x, vec![10., 20.]);
        assert_eq!(l.median, vec![2., 5.]);
        Ok(())
    }

    #[test]
    fn to_past_the_end_keeps_points_in_place() -> Result<()> {
        let l = set_line(2, 10)?;
        assert_eq!(l.x, vec![30.]);
        assert_eq!(l.median, vec![8.]);
        let l = set_line(1, 3)?;
        assert_eq!(l.x, vec![20., 30.]);
        assert_eq!(l.median, vec![5., 8.]);
        Ok(())
    }

    #[test]
    fn huge_to_point() -> Result<()> {
        let l = set_line(0, i64::MAX)?;
        assert_eq!(l.x, vec![10., 20., 30.]);
        assert_eq!(l.median, vec![2., 5., 8.]);
        let l = set_line(i64::MIN, i64::MAX)?;
        assert_eq!(l.x.len(), 3);
        Ok(())
    }

    #[test]
    fn legend_column_count() {
        assert_eq!(legend_columns(1), 2);
        assert_eq!(legend_columns(2), 2);
        assert_eq!(legend_columns(3), 3);
        assert_eq!(legend_columns(4), 2);
        assert_eq!(legend_columns(6), 3);
    }

    #[test]
    fn unknown_type_is_rejected_before_reading() {
        let r = plot(Path::new("/nonexistent/timings.json"), "out", "find",
                     PointRange::new(0, 1), &["std::set", "bogus"],
                     &StyleRegistry::containers(), &Theme::default(),
                     &TimingOptions::default());
        assert!(matches!(r, Err(Error::UnknownType(k)) if k == "bogus"));
    }

    #[test]
    #[ignore = "needs a Python interpreter with matplotlib"]
    fn render_is_reproducible() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("timings.json");
        std::fs::write(&input, RECORDS)?;
        let output = dir.path().join("chart");
        let output = output.to_str().expect("utf-8 temp path");
        let options = TimingOptions { band: true, y_ticks: Some(8),
                                      ..Default::default() };
        let kinds = ["std::set", "sorted_vector"];
        let run = || plot(&input, output, "find", PointRange::new(0, 3),
                          &kinds, &StyleRegistry::containers(),
                          &Theme::default(), &options);
        let path = run()?;
        assert_eq!(path, dir.path().join("chart.pdf"));
        let first = std::fs::read(&path)?;
        run()?;
        assert_eq!(first, std::fs::read(&path)?);
        Ok(())
    }
}
