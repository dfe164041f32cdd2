//! Chart renderers for benchmark measurement files, drawn with
//! [Matplotlib][].
//!
//! Two pipelines, each "read → select → draw → save":
//!
//! - [`histogram`]: per-set cache line counts, drawn as vertical bars
//!   into `<type>.png`.
//! - [`timing`]: (low, median, high) nanosecond timings per
//!   measurement point, medians drawn as lines into `<output>.pdf`.
//!
//! Both style their data through an explicit [`StyleRegistry`] and a
//! [`Theme`]; the drawing itself goes through the [`mpl`] bindings.
//!
//! [Matplotlib]: https://matplotlib.org/

pub mod error;
pub mod histogram;
pub mod logging;
pub mod mpl;
pub mod style;
pub mod theme;
pub mod timing;

pub use error::{Error, Result};
pub use style::{Style, StyleRegistry};
pub use theme::Theme;
