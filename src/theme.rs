use crate::mpl::{self, Axes, Figure};

/// Look shared by every chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Matplotlib style sheet applied first.
    pub style: &'static str,
    pub facecolor: &'static str,
    /// Font size of axis labels, tick labels and legends.
    pub font_size: f64,
    pub margin: f64,
}

pub const BENCHMARK: Theme = Theme {
    style: "ggplot",
    facecolor: "#f7f7f7",
    font_size: 9.,
    margin: 0.02,
};

/// Histogram figure size, in inches.
pub const HISTOGRAM_SIZE: (f64, f64) = (9., 1.5);
/// Timing figure size, in inches.
pub const TIMING_SIZE: (f64, f64) = (9., 3.);

impl Default for Theme {
    fn default() -> Self { BENCHMARK }
}

impl Theme {
    /// Create a figure of `size` inches with a single set of axes
    /// dressed with this theme.
    pub fn figure(&self, size: (f64, f64)) -> Result<(Figure, Axes), mpl::Error> {
        mpl::use_style(self.style)?;
        mpl::set_rc("axes.facecolor", self.facecolor)?;
        let fig = Figure::new(size.0, size.1)?;
        let mut ax = fig.subplots()?;
        ax.margins(self.margin)?
            .tick_params("x", self.font_size)?
            .tick_params("y", self.font_size)?;
        Ok((fig, ax))
    }
}
