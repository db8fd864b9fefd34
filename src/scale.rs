//! Discretization scales (bucket indices for attainment histograms)
//!
//! A [`Scale`] maps the closed domain `[min, max]` onto `size` contiguous
//! buckets `0..size`. Contrary to the usual half-open convention, `max` itself
//! belongs to the last bucket: users naturally give the evaluation budget as
//! the upper bound.
//!
//! Logarithmic scales spend their buckets on the low end of wide dynamic
//! ranges (e.g. objective errors from `1e-8` to `1e8`):
//!
//! ```text
//! index(x)  = floor( log_b(1 + x - min) / log_b(1 + max - min) * size )
//! bounds(i) = ( b^( i    * log_b(1 + max - min) / size) - 1 + min,
//!               b^((i+1) * log_b(1 + max - min) / size) - 1 + min )
//! ```
//!
//! ## Known limitation
//!
//! Log bucket bounds accumulate floating-point error beyond a few ULPs for
//! large domains: `Scale::log10(0.0, 6e7, 10)?.bounds(9)?.1` is `6e7` only up
//! to about `1e-6`.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Discretization flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    /// Equal-width buckets.
    Linear,
    /// Buckets of equal width in `log2(1 + x - min)`.
    Log2,
    /// Buckets of equal width in `log10(1 + x - min)`.
    #[default]
    Log10,
}

impl ScaleKind {
    fn log(self, x: f64) -> f64 {
        match self {
            Self::Linear => x,
            Self::Log2 => x.log2(),
            Self::Log10 => x.log10(),
        }
    }

    fn exp(self, x: f64) -> f64 {
        match self {
            Self::Linear => x,
            Self::Log2 => x.exp2(),
            Self::Log10 => 10f64.powf(x),
        }
    }
}

/// Immutable discretization of `[min, max]` into `size` buckets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scale {
    kind: ScaleKind,
    min: f64,
    max: f64,
    size: usize,
}

impl Scale {
    /// Create a scale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidScale`] if `min >= max`, a bound is not finite,
    /// or `size == 0`.
    pub fn new(kind: ScaleKind, min: f64, max: f64, size: usize) -> Result<Self> {
        if !(min.is_finite() && max.is_finite() && min < max && size > 0) {
            return Err(Error::InvalidScale { min, max, size });
        }
        Ok(Self {
            kind,
            min,
            max,
            size,
        })
    }

    /// Linear scale over `[min, max]`.
    ///
    /// # Errors
    ///
    /// See [`Scale::new`].
    pub fn linear(min: f64, max: f64, size: usize) -> Result<Self> {
        Self::new(ScaleKind::Linear, min, max, size)
    }

    /// Base-2 logarithmic scale over `[min, max]`.
    ///
    /// # Errors
    ///
    /// See [`Scale::new`].
    pub fn log2(min: f64, max: f64, size: usize) -> Result<Self> {
        Self::new(ScaleKind::Log2, min, max, size)
    }

    /// Base-10 logarithmic scale over `[min, max]`.
    ///
    /// # Errors
    ///
    /// See [`Scale::new`].
    pub fn log10(min: f64, max: f64, size: usize) -> Result<Self> {
        Self::new(ScaleKind::Log10, min, max, size)
    }

    /// Scale flavour.
    #[must_use]
    pub const fn kind(&self) -> ScaleKind {
        self.kind
    }

    /// Domain lower bound.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Domain upper bound (inclusive).
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Number of buckets.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Domain length, `max - min`.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// Whether `x` lies in the closed domain (NaN never does).
    #[must_use]
    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    /// Width of the domain once mapped through the scale's logarithm.
    fn span(&self) -> f64 {
        match self.kind {
            ScaleKind::Linear => self.length(),
            kind => kind.log(1.0 + self.length()),
        }
    }

    /// Bucket holding `x`; `max` falls into the last bucket.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfDomain`] if `x` is outside `[min, max]` or NaN.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn index(&self, x: f64) -> Result<usize> {
        if !self.contains(x) {
            return Err(Error::OutOfDomain {
                value: x,
                min: self.min,
                max: self.max,
            });
        }
        if x >= self.max {
            return Ok(self.size - 1);
        }
        let offset = match self.kind {
            ScaleKind::Linear => x - self.min,
            kind => kind.log(1.0 + (x - self.min)),
        };
        let i = (offset / self.span() * self.size as f64).floor() as usize;
        Ok(i.min(self.size - 1))
    }

    /// Lower and upper value of bucket `i`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BucketOutOfRange`] if `i >= size`.
    #[allow(clippy::cast_precision_loss)]
    pub fn bounds(&self, i: usize) -> Result<(f64, f64)> {
        if i >= self.size {
            return Err(Error::BucketOutOfRange {
                index: i,
                size: self.size,
            });
        }
        let s = self.size as f64;
        let i = i as f64;
        Ok(match self.kind {
            ScaleKind::Linear => {
                let step = self.length() / s;
                let lo = i / s * self.length() + self.min;
                (lo, lo + step)
            }
            kind => {
                let k = self.span();
                let lo = kind.exp(i * k / s) - 1.0 + self.min;
                let hi = kind.exp((i + 1.0) * k / s) - 1.0 + self.min;
                (lo, hi)
            }
        })
    }

    /// Width of bucket `i` (`hi - lo`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::BucketOutOfRange`] if `i >= size`.
    pub fn width(&self, i: usize) -> Result<f64> {
        self.bounds(i).map(|(lo, hi)| hi - lo)
    }
}
