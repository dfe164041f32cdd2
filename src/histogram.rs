//! Cache usage histograms: one count of cache lines per set number,
//! drawn as vertical bars.
//!
//! The input holds one series per line, counts separated by single
//! spaces.  Every line is parsed, only the first one is drawn.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    style::{Style, StyleRegistry},
    theme::{self, Theme},
};

/// Distance between two x-axis ticks, in sets.
pub const TICK_STEP: usize = 8;

const BAR_WIDTH: f64 = 6.;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ImageFormat {
    #[default]
    Png,
    Pdf,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Pdf => "pdf",
        }
    }
}

/// The series of a histogram file.  Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    series: Vec<Vec<i64>>,
}

/// Parse one line of space separated integers.  `line` is the 1-based
/// line number used in errors.
pub fn parse_counts(text: &str, line: usize) -> Result<Vec<i64>> {
    text.trim_end_matches(['\n', '\r'])
        .split(' ')
        .map(|token| {
            token.parse::<i64>().map_err(|source| Error::ParseInt {
                line,
                token: token.to_owned(),
                source,
            })
        })
        .collect()
}

impl Histogram {
    pub fn read(path: &Path) -> Result<Self> {
        let f = File::open(path).map_err(|source| Error::Open {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(BufReader::new(f))
    }

    pub fn parse(reader: impl BufRead) -> Result<Self> {
        let mut series = Vec::new();
        for (i, text) in reader.lines().enumerate() {
            let counts = parse_counts(&text?, i + 1)?;
            debug!("series {}: {} sets", i + 1, counts.len());
            series.push(counts);
        }
        if series.is_empty() {
            return Err(Error::EmptyInput);
        }
        Ok(Histogram { series })
    }

    /// The series that gets drawn.
    pub fn first(&self) -> &[i64] {
        &self.series[0]
    }

    /// Number of series read.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Tick positions for a series of `len` sets: every `step` from 0 up
/// to the first multiple of `step` not below `len`.
pub fn ticks(len: usize, step: usize) -> Vec<usize> {
    let last = len.div_ceil(step) * step;
    (0..=last).step_by(step).collect()
}

/// Everything needed to draw a histogram, computed without Python.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramChart {
    style: &'static Style,
    x: Vec<f64>,
    counts: Vec<f64>,
    ticks: Vec<f64>,
    series_read: usize,
}

impl HistogramChart {
    pub fn new(histogram: &Histogram, style: &'static Style) -> Self {
        let first = histogram.first();
        HistogramChart {
            style,
            x: (0..first.len()).map(|i| i as f64).collect(),
            counts: first.iter().map(|&c| c as f64).collect(),
            ticks: ticks(first.len(), TICK_STEP).into_iter()
                .map(|t| t as f64).collect(),
            series_read: histogram.len(),
        }
    }

    pub fn ticks(&self) -> &[f64] {
        &self.ticks
    }

    /// One entry per series read, all carrying the display name.
    pub fn legend_labels(&self) -> Vec<&'static str> {
        vec![self.style.name; self.series_read]
    }

    pub fn render(&self, theme: &Theme, path: &Path) -> Result<()> {
        let (fig, mut ax) = theme.figure(theme::HISTOGRAM_SIZE)?;
        ax.set_ylabel("cache lines", theme.font_size)?
            .set_xlabel("set number", theme.font_size)?
            .set_xticks(&self.ticks)?;
        ax.vlines(&self.x, 0., &self.counts)
            .color(self.style.color)
            .alpha(self.style.alpha)
            .linewidth(BAR_WIDTH)
            .draw()?;
        ax.legend()
            .labels(self.legend_labels())
            .loc("upper right")
            .numpoints(2)
            .ncol(self.series_read)
            .fontsize(theme.font_size)
            .draw()?;
        fig.save().tight().to_file(path)?;
        Ok(())
    }
}

/// Read `input` and draw its first series styled as `kind`, into
/// `<out_dir>/<kind>.<format>`.  Return the path written.
///
/// `kind` is looked up before the input is opened, so an unknown type
/// leaves no file behind.
pub fn plot(input: &Path, kind: &str, registry: &StyleRegistry,
            theme: &Theme, format: ImageFormat, out_dir: &Path)
            -> Result<PathBuf> {
    let style = registry.get(kind)?;
    let histogram = Histogram::read(input)?;
    let chart = HistogramChart::new(&histogram, style);
    let path = out_dir.join(format!("{}.{}", kind, format.extension()));
    chart.render(theme, &path)?;
    info!("wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_single_line() -> Result<()> {
        let h = Histogram::parse("0 5 10 0\n".as_bytes())?;
        assert_eq!(h.first(), &[0, 5, 10, 0]);
        assert_eq!(h.len(), 1);
        Ok(())
    }

    #[test]
    fn parse_crlf_and_negative() -> Result<()> {
        assert_eq!(parse_counts("3 -1 7\r\n", 1)?, vec![3, -1, 7]);
        Ok(())
    }

    #[test]
    fn every_line_is_parsed() {
        match Histogram::parse("1 2 3\n4 x 6\n".as_bytes()) {
            Err(Error::ParseInt { line, token, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(token, "x");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn double_space_is_an_error() {
        assert!(parse_counts("1  2", 1).is_err());
        assert!(parse_counts("1 2 ", 1).is_err());
    }

    #[test]
    fn empty_input() {
        assert!(matches!(Histogram::parse("".as_bytes()),
                         Err(Error::EmptyInput)));
    }

    #[test]
    fn tick_positions() {
        assert_eq!(ticks(4, TICK_STEP), vec![0, 8]);
        assert_eq!(ticks(16, TICK_STEP), vec![0, 8, 16]);
        assert_eq!(ticks(17, TICK_STEP), vec![0, 8, 16, 24]);
        assert_eq!(ticks(0, TICK_STEP), vec![0]);
    }

    #[test]
    fn chart_from_file() -> Result<()> {
        let mut f = tempfile::NamedTempFile::new()?;
        writeln!(f, "0 5 10 0")?;
        writeln!(f, "1 1 1 1")?;
        let h = Histogram::read(f.path())?;
        let style = StyleRegistry::cache_layouts().get("ft")?;
        let chart = HistogramChart::new(&h, style);
        assert_eq!(chart.counts, vec![0., 5., 10., 0.]);
        assert_eq!(chart.x, vec![0., 1., 2., 3.]);
        assert_eq!(chart.ticks(), &[0., 8.]);
        assert_eq!(chart.legend_labels(), vec!["FT", "FT"]);
        Ok(())
    }

    #[test]
    fn missing_file() {
        let r = Histogram::read(Path::new("/nonexistent/histogram.txt"));
        assert!(matches!(r, Err(Error::Open { .. })));
    }

    #[test]
    fn unknown_type_writes_nothing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("in.txt");
        std::fs::write(&input, "1 2 3\n")?;
        let r = plot(&input, "bogus", &StyleRegistry::cache_layouts(),
                     &Theme::default(), ImageFormat::Png, dir.path());
        assert!(matches!(r, Err(Error::UnknownType(_))));
        assert!(!dir.path().join("bogus.png").exists());
        Ok(())
    }

    #[test]
    #[ignore = "needs a Python interpreter with matplotlib"]
    fn render_is_reproducible() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("in.txt");
        std::fs::write(&input, "0 5 10 0 3 3 8 1 0 2\n")?;
        let reg = StyleRegistry::cache_layouts();
        let theme = Theme::default();
        let path = plot(&input, "st_td", &reg, &theme, ImageFormat::Png,
                        dir.path())?;
        assert_eq!(path, dir.path().join("st_td.png"));
        let first = std::fs::read(&path)?;
        plot(&input, "st_td", &reg, &theme, ImageFormat::Png, dir.path())?;
        assert_eq!(first, std::fs::read(&path)?);
        Ok(())
    }
}
