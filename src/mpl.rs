//! Bindings to the part of the [Matplotlib][] Python library the
//! renderers draw with.
//!
//! Usage
//! -----
//!
//! The interface stays close to Matplotlib's explicit one while
//! keeping a Rust flavor: drawing calls are builders finished by
//! `plot()` or `draw()`, and Python exceptions come back as [`Error`].
//!
//! ```no_run
//! use benchplot::mpl;
//! let fig = mpl::Figure::new(9., 3.)?;
//! let mut ax = fig.subplots()?;
//! ax.xy(&[10., 20., 30.], &[1., 4., 2.]).color("#de2d26").plot()?;
//! fig.save().tight().to_file("target/basic.pdf")?;
//! # Ok::<(), mpl::Error>(())
//! ```
//!
//! [Matplotlib]: https://matplotlib.org/

use std::path::Path;
use lazy_static::lazy_static;
use numpy::PyArray1;
use pyo3::{
    prelude::*,
    intern,
    exceptions::{PyFileNotFoundError, PyPermissionError},
    types::{IntoPyDict, PyDict},
};

macro_rules! getattr {
    ($py: ident, $lib: expr, $f: literal) => {
        $lib.getattr($py, intern!($py, $f))?
    };
}

/// Call the method `$m` of the Python object `$obj`, discarding the
/// result.  The second form fills the keyword arguments dictionary
/// `$kw` in `$fill` first.
macro_rules! meth {
    ($obj: expr, $m: ident, $py: ident -> $args: expr) => {
        Python::with_gil(|$py| -> Result<(), Error> {
            $obj.call_method1($py, intern!($py, stringify!($m)), $args)?;
            Ok(())
        })
    };
    ($obj: expr, $m: ident, $py: ident -> $args: expr,
     $kw: ident => $fill: block) => {
        Python::with_gil(|$py| -> Result<(), Error> {
            let $kw = PyDict::new($py);
            $fill
            $obj.call_method($py, intern!($py, stringify!($m)), $args,
                             Some($kw))?;
            Ok(())
        })
    };
}

/// Possible errors of matplotlib functions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The Python library "matplotlib" was not found.
    #[error("The matplotlib library has not been found.\n\
             Please install it.  See https://matplotlib.org/")]
    NoMatplotlib,
    /// The path contains an element that is not a directory or does
    /// not exist.
    #[error("A path contains an element that is not a directory or \
             does not exist")]
    FileNotFoundError,
    /// Permission denied to access or create the filesystem path.
    #[error("Permission denied to access or create the filesystem path")]
    PermissionError,
    /// Other Python errors.
    #[error("Python error: {0}")]
    Python(#[from] PyErr),
}

/// Import and return a handle to the module `$m`.
macro_rules! pyimport { ($m: literal) => {
    Python::with_gil(|py|
        PyModule::import(py, intern!(py, $m)).map(|m| m.into()))
}}

lazy_static! {
    // Import matplotlib modules.
    static ref MATPLOTLIB: Result<Py<PyModule>, PyErr> = {
        pyimport!("matplotlib")
    };
    static ref STYLE: Result<Py<PyModule>, PyErr> = {
        pyimport!("matplotlib.style")
    };
    static ref FIGURE: Result<Py<PyModule>, PyErr> = {
        pyimport!("matplotlib.figure")
    };
}

/// Return a handle to the module `$m`.
/// ⚠ This may try to lock Python's GIL.  Make sure it is executed
/// outside a call to `Python::with_gil`.
macro_rules! pymod { ($m: ident) => {
    $m.as_ref().map_err(|_| Error::NoMatplotlib)
}}

/// Apply the Matplotlib style sheet `name` (e.g. "ggplot") to every
/// figure created afterwards.
pub fn use_style(name: &str) -> Result<(), Error> {
    let style = pymod!(STYLE)?;
    Python::with_gil(|py| {
        getattr!(py, style, "use").call1(py, (name,))?;
        Ok(())
    })
}

/// Set the runtime configuration parameter `key` (an entry of
/// `matplotlib.rcParams`) to `value`.
pub fn set_rc(key: &str, value: impl ToPyObject) -> Result<(), Error> {
    let matplotlib = pymod!(MATPLOTLIB)?;
    Python::with_gil(|py| {
        getattr!(py, matplotlib, "rcParams")
            .call_method1(py, intern!(py, "__setitem__"),
                          (key, value.to_object(py)))?;
        Ok(())
    })
}

/// Trait expressing that `Self` can be converted to a numpy.ndarray.
pub trait Data {
    fn to_numpy(&self, py: Python<'_>) -> PyObject;
}

impl<T> Data for T where T: AsRef<[f64]> + ?Sized {
    fn to_numpy(&self, py: Python<'_>) -> PyObject {
        PyArray1::from_slice_bound(py, self.as_ref()).into_any().unbind()
    }
}

#[derive(Debug, Clone)]
pub struct Axes {
    ax: PyObject,
}

/// The top level container for all the plot elements.
#[derive(Debug)]
pub struct Figure {
    fig: PyObject, // instance of matplotlib.figure.Figure
}

impl Figure {
    /// Return a new `Figure` of `width` × `height` inches.
    ///
    /// The figure is not managed by pyplot, so no GUI backend is
    /// involved.  Return an error if Matplotlib is not present on the
    /// system.
    pub fn new(width: f64, height: f64) -> Result<Figure, Error> {
        let figure = pymod!(FIGURE)?;
        Python::with_gil(|py| {
            let kwargs = [("figsize", (width, height))].into_py_dict(py);
            let fig = getattr!(py, figure, "Figure")
                .call(py, (), Some(kwargs))?;
            Ok(Self { fig })
        })
    }

    /// Add a single set of axes covering the figure.
    pub fn subplots(&self) -> Result<Axes, Error> {
        Python::with_gil(|py| {
            let ax = self.fig.call_method0(py, intern!(py, "subplots"))?;
            Ok(Axes { ax })
        })
    }

    pub fn save(&self) -> Savefig {
        Savefig { fig: self.fig.clone(), tight: false }
    }
}

pub struct Savefig {
    fig: PyObject,
    tight: bool,
}

impl Savefig {
    /// Crop the saved image to the drawn content
    /// (`bbox_inches = "tight"`).
    pub fn tight(&mut self) -> &mut Self {
        self.tight = true;
        self
    }

    /// Save the figure.  The format is deduced from the extension of
    /// `path`.  Timestamps are left out of the file metadata so that
    /// saving the same figure twice yields the same bytes.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let date_key = match path.extension().and_then(|e| e.to_str()) {
            Some("pdf") => Some("CreationDate"),
            Some("svg") => Some("Date"),
            _ => None,
        };
        Python::with_gil(|py| {
            let kwargs = PyDict::new(py);
            if self.tight {
                kwargs.set_item("bbox_inches", "tight")?;
            }
            if let Some(key) = date_key {
                let metadata = PyDict::new(py);
                metadata.set_item(key, py.None())?;
                kwargs.set_item("metadata", metadata)?;
            }
            self.fig.call_method(
                py, intern!(py, "savefig"),
                (path,), Some(kwargs)
            ).map_err(|e| {
                    if e.is_instance_of::<PyFileNotFoundError>(py) {
                        Error::FileNotFoundError
                    } else if e.is_instance_of::<PyPermissionError>(py) {
                        Error::PermissionError
                    } else {
                        Error::Python(e)
                    }
                })?;
            Ok(())
        })
    }
}


impl Axes {
    /// Plot `y` versus `x` as lines and/or markers.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use benchplot::mpl;
    /// let fig = mpl::Figure::new(4., 3.)?;
    /// let mut ax = fig.subplots()?;
    /// ax.xy(&[1., 2., 3., 4.], &[1., 4., 2., 3.])
    ///     .linestyle("--").label("data").plot()?;
    /// fig.save().to_file("target/XY_plot.pdf")?;
    /// # Ok::<(), mpl::Error>(())
    /// ```
    // FIXME: Do we want to check that `x` and `y` have the same
    // dimension?  Better error message?
    #[must_use]
    pub fn xy<'a, D>(&'a mut self, x: &'a D, y: &'a D) -> XY<'a, D>
    where D: Data + ?Sized {
        // We mutably borrow `self` to reflect that the final `.plot()`
        // will mutate the underlying Python object.
        XY { axes: self, options: PlotOptions::new(), x, y }
    }

    /// Draw a vertical line at each `x` from `ymin` to the matching
    /// `ymax`.
    #[must_use]
    pub fn vlines<'a, D>(&'a mut self, x: &'a D, ymin: f64, ymax: &'a D)
                         -> VLines<'a, D>
    where D: Data + ?Sized {
        VLines { axes: self, options: PlotOptions::new(), x, ymin, ymax }
    }

    /// Fill the area between the curves (`x`, `y1`) and (`x`, `y2`).
    #[must_use]
    pub fn fill_between<'a, D>(&'a mut self, x: &'a D, y1: &'a D, y2: &'a D)
                               -> FillBetween<'a, D>
    where D: Data + ?Sized {
        FillBetween { axes: self, options: PlotOptions::new(), x, y1, y2 }
    }

    pub fn set_xlabel(&mut self, label: &str, fontsize: f64)
                      -> Result<&mut Self, Error> {
        meth!(self.ax, set_xlabel, py -> (label,),
              kw => { kw.set_item("fontsize", fontsize)?; })?;
        Ok(self)
    }

    pub fn set_ylabel(&mut self, label: &str, fontsize: f64)
                      -> Result<&mut Self, Error> {
        meth!(self.ax, set_ylabel, py -> (label,),
              kw => { kw.set_item("fontsize", fontsize)?; })?;
        Ok(self)
    }

    /// Place the x-axis ticks at exactly `ticks`.
    pub fn set_xticks(&mut self, ticks: &[f64]) -> Result<&mut Self, Error> {
        meth!(self.ax, set_xticks, py -> (ticks.to_numpy(py),))?;
        Ok(self)
    }

    /// Place the y-axis ticks at exactly `ticks`.
    pub fn set_yticks(&mut self, ticks: &[f64]) -> Result<&mut Self, Error> {
        meth!(self.ax, set_yticks, py -> (ticks.to_numpy(py),))?;
        Ok(self)
    }

    /// Set the font size of the tick labels of `axis` ("x", "y" or
    /// "both").
    pub fn tick_params(&mut self, axis: &str, labelsize: f64)
                       -> Result<&mut Self, Error> {
        meth!(self.ax, tick_params, py -> (),
              kw => {
                  kw.set_item("axis", axis)?;
                  kw.set_item("labelsize", labelsize)?;
              })?;
        Ok(self)
    }

    /// Padding added to the data limits, as a fraction of the data
    /// interval.
    pub fn margins(&mut self, m: f64) -> Result<&mut Self, Error> {
        meth!(self.ax, margins, py -> (m,))?;
        Ok(self)
    }

    /// Start a legend.  Without explicit [`Legend::labels`], the
    /// labels of the plotted artists are used.
    #[must_use]
    pub fn legend(&mut self) -> Legend<'_> {
        Legend { axes: self, labels: None, loc: None, ncol: None,
                 numpoints: None, fontsize: None }
    }
}

#[derive(Clone)]
struct PlotOptions<'a> {
    color: Option<&'a str>,
    alpha: Option<f64>,
    label: &'a str,
    linewidth: Option<f64>,
    linestyle: Option<&'a str>,
    markersize: Option<f64>,
    zorder: Option<f64>,
}

impl<'a> PlotOptions<'a> {
    fn new() -> PlotOptions<'static> {
        PlotOptions { color: None, alpha: None, label: "",
                      linewidth: None, linestyle: None,
                      markersize: None, zorder: None }
    }

    fn kwargs<'py>(&self, py: Python<'py>) -> PyResult<&'py PyDict> {
        let kwargs = PyDict::new(py);
        if let Some(c) = self.color {
            kwargs.set_item("color", c)?
        }
        if let Some(a) = self.alpha {
            kwargs.set_item("alpha", a)?
        }
        if !self.label.is_empty() {
            kwargs.set_item("label", self.label)?
        }
        if let Some(w) = self.linewidth {
            kwargs.set_item("linewidth", w)?
        }
        if let Some(s) = self.linestyle {
            kwargs.set_item("linestyle", s)?
        }
        if let Some(s) = self.markersize {
            kwargs.set_item("markersize", s)?
        }
        if let Some(z) = self.zorder {
            kwargs.set_item("zorder", z)?
        }
        Ok(kwargs)
    }
}

/// Declare methods to set the options assuming `self.options` exists.
macro_rules! set_plotoptions { () => {
    #[must_use]
    pub fn color(mut self, color: &'a str) -> Self {
        self.options.color = Some(color);
        self
    }

    #[must_use]
    pub fn alpha(mut self, a: f64) -> Self {
        self.options.alpha = Some(a);
        self
    }

    #[must_use]
    pub fn label(mut self, label: &'a str) -> Self {
        self.options.label = label;
        self
    }

    #[must_use]
    pub fn linewidth(mut self, w: f64) -> Self {
        self.options.linewidth = Some(w);
        self
    }

    #[must_use]
    pub fn zorder(mut self, z: f64) -> Self {
        self.options.zorder = Some(z);
        self
    }
}}

pub struct XY<'a, D>
where D: ?Sized {
    axes: &'a Axes,
    options: PlotOptions<'a>,
    x: &'a D,
    y: &'a D,
}

impl<'a, D> XY<'a, D>
where D: Data + ?Sized {
    set_plotoptions!();

    #[must_use]
    pub fn linestyle(mut self, s: &'a str) -> Self {
        self.options.linestyle = Some(s);
        self
    }

    #[must_use]
    pub fn markersize(mut self, s: f64) -> Self {
        self.options.markersize = Some(s);
        self
    }

    /// Plot the data with the options specified in [`XY`].
    pub fn plot(self) -> Result<(), Error> {
        Python::with_gil(|py| {
            let xn = self.x.to_numpy(py);
            let yn = self.y.to_numpy(py);
            self.axes.ax.call_method(py, intern!(py, "plot"), (xn, yn),
                                     Some(self.options.kwargs(py)?))?;
            Ok(())
        })
    }
}

pub struct VLines<'a, D>
where D: ?Sized {
    axes: &'a Axes,
    options: PlotOptions<'a>,
    x: &'a D,
    ymin: f64,
    ymax: &'a D,
}

impl<'a, D> VLines<'a, D>
where D: Data + ?Sized {
    set_plotoptions!();

    /// Draw the lines with the options specified in [`VLines`].
    pub fn draw(self) -> Result<(), Error> {
        Python::with_gil(|py| {
            let xn = self.x.to_numpy(py);
            let ymax = self.ymax.to_numpy(py);
            self.axes.ax.call_method(py, intern!(py, "vlines"),
                                     (xn, self.ymin, ymax),
                                     Some(self.options.kwargs(py)?))?;
            Ok(())
        })
    }
}

pub struct FillBetween<'a, D>
where D: ?Sized {
    axes: &'a Axes,
    options: PlotOptions<'a>,
    x: &'a D,
    y1: &'a D,
    y2: &'a D,
}

impl<'a, D> FillBetween<'a, D>
where D: Data + ?Sized {
    set_plotoptions!();

    /// Fill the area with the options specified in [`FillBetween`].
    pub fn draw(self) -> Result<(), Error> {
        Python::with_gil(|py| {
            let xn = self.x.to_numpy(py);
            let y1 = self.y1.to_numpy(py);
            let y2 = self.y2.to_numpy(py);
            let kwargs = self.options.kwargs(py)?;
            kwargs.set_item("interpolate", false)?;
            self.axes.ax.call_method(py, intern!(py, "fill_between"),
                                     (xn, y1, y2), Some(kwargs))?;
            Ok(())
        })
    }
}

pub struct Legend<'a> {
    axes: &'a Axes,
    labels: Option<Vec<&'a str>>,
    loc: Option<&'a str>,
    ncol: Option<usize>,
    numpoints: Option<usize>,
    fontsize: Option<f64>,
}

impl<'a> Legend<'a> {
    /// Label the plotted artists, in drawing order, with `labels`.
    #[must_use]
    pub fn labels<I>(mut self, labels: I) -> Self
    where I: IntoIterator<Item = &'a str> {
        self.labels = Some(labels.into_iter().collect());
        self
    }

    /// Location such as "upper left" or "best".
    #[must_use]
    pub fn loc(mut self, loc: &'a str) -> Self {
        self.loc = Some(loc);
        self
    }

    #[must_use]
    pub fn ncol(mut self, n: usize) -> Self {
        self.ncol = Some(n);
        self
    }

    /// Number of marker points in the legend line of each entry.
    #[must_use]
    pub fn numpoints(mut self, n: usize) -> Self {
        self.numpoints = Some(n);
        self
    }

    #[must_use]
    pub fn fontsize(mut self, s: f64) -> Self {
        self.fontsize = Some(s);
        self
    }

    pub fn draw(self) -> Result<(), Error> {
        Python::with_gil(|py| {
            let kwargs = PyDict::new(py);
            if let Some(loc) = self.loc {
                kwargs.set_item("loc", loc)?
            }
            if let Some(n) = self.ncol {
                kwargs.set_item("ncol", n)?
            }
            if let Some(n) = self.numpoints {
                kwargs.set_item("numpoints", n)?
            }
            if let Some(s) = self.fontsize {
                kwargs.set_item("fontsize", s)?
            }
            let legend = intern!(py, "legend");
            match self.labels {
                Some(labels) => self.axes.ax.call_method(
                    py, legend, (labels,), Some(kwargs))?,
                None => self.axes.ax.call_method(
                    py, legend, (), Some(kwargs))?,
            };
            Ok(())
        })
    }
}
