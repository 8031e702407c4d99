//! # EDGE Bid-Ask Spread Estimator
//!
//! Efficient estimator of the effective bid-ask spread from open, high, low and
//! close prices (Ardia, Guidotti & Kroencke, JFE 2024,
//! <https://doi.org/10.1016/j.jfineco.2024.103916>).
//!
//! Every adjacent pair of bars contributes two moment conditions built from
//! log-price returns between boundary prices (open, close) and the log-midpoint
//! of the bar range. Both conditions are unbiased for the squared spread; they
//! are combined by inverse-variance weighting and the spread is the square root
//! of the combination.
//!
//! ## Parameters
//! - **sign**: return a negative estimate when the squared spread comes out
//!   negative (default: `false`, which clamps such estimates to 0.0).
//!
//! ## Errors
//! - **InputLengthsMismatch**: edge: open, high, low and close differ in length.
//! - **NotEnoughBars**: edge: fewer than two bars were supplied.
//! - **CandleFieldError**: edge: the `Candles` accessor rejected a price column
//!   name. Only the fixed open/high/low/close names are requested, so this
//!   guards the accessor rather than caller input.
//!
//! ## Returns
//! - **`Ok(EdgeOutput)`** with the spread as a fraction of price (0.01 is 1%)
//!   and the aggregated moments. Non-positive prices and degenerate samples
//!   produce `NaN`, never an error.
//!
//! ## Example
//! ```
//! use edge_spread::indicators::edge::{edge, EdgeInput, EdgeParams};
//! let open = [100.0, 101.0, 99.0];
//! let high = [102.0, 103.0, 100.0];
//! let low = [99.0, 100.0, 98.0];
//! let close = [101.0, 99.0, 100.0];
//! let input = EdgeInput::from_slices(&open, &high, &low, &close, EdgeParams::default());
//! let out = edge(&input).unwrap();
//! assert_eq!(out.value, 0.0);
//! ```
//!
//! ## Developer Notes
//! - Arithmetic runs left to right in the order of the published formulas, so
//!   results match a straightforward reference computation bit for bit on the
//!   same libm.
//! - Degenerate samples (no informative pair, no interior open or close, or
//!   zero total variance) short-circuit to `NaN` instead of dividing by zero.
//!   Two bars always land here: a single pair has zero variance.

use crate::utilities::data_loader::{Bar, Candles};
use crate::utilities::helpers::MomentAccumulator;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub enum EdgeData<'a> {
    Candles {
        candles: &'a Candles,
    },
    Slices {
        open: &'a [f64],
        high: &'a [f64],
        low: &'a [f64],
        close: &'a [f64],
    },
    Bars(&'a [Bar]),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeParams {
    pub sign: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct EdgeInput<'a> {
    pub data: EdgeData<'a>,
    pub params: EdgeParams,
}

impl<'a> EdgeInput<'a> {
    #[inline]
    pub fn from_candles(candles: &'a Candles, params: EdgeParams) -> Self {
        Self {
            data: EdgeData::Candles { candles },
            params,
        }
    }
    #[inline]
    pub fn from_slices(
        open: &'a [f64],
        high: &'a [f64],
        low: &'a [f64],
        close: &'a [f64],
        params: EdgeParams,
    ) -> Self {
        Self {
            data: EdgeData::Slices {
                open,
                high,
                low,
                close,
            },
            params,
        }
    }
    #[inline]
    pub fn from_bars(bars: &'a [Bar], params: EdgeParams) -> Self {
        Self {
            data: EdgeData::Bars(bars),
            params,
        }
    }
    #[inline]
    pub fn with_default_candles(candles: &'a Candles) -> Self {
        Self::from_candles(candles, EdgeParams::default())
    }
    #[inline]
    pub fn get_sign(&self) -> bool {
        self.params.sign.unwrap_or(false)
    }
}

/// Why a sample carries no usable spread information.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Degeneracy {
    /// Every pair has a flat current bar resting on the previous close.
    NoInformativePairs,
    /// No informative pair has an open strictly inside its bar range.
    NoInteriorOpen,
    /// No informative pair has a previous close strictly inside its bar range.
    NoInteriorClose,
    /// Both moment conditions have zero variance.
    ZeroVariance,
}

/// Aggregates behind one estimate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeMoments {
    pub pairs: usize,
    pub pt: f64,
    pub po: f64,
    pub pc: f64,
    pub e1: f64,
    pub e2: f64,
    pub v1: f64,
    pub v2: f64,
    pub s2: f64,
}

impl EdgeMoments {
    pub fn degeneracy(&self) -> Option<Degeneracy> {
        if self.pt == 0.0 {
            Some(Degeneracy::NoInformativePairs)
        } else if self.po == 0.0 {
            Some(Degeneracy::NoInteriorOpen)
        } else if self.pc == 0.0 {
            Some(Degeneracy::NoInteriorClose)
        } else if self.v1 + self.v2 == 0.0 {
            Some(Degeneracy::ZeroVariance)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct EdgeOutput {
    pub value: f64,
    pub moments: EdgeMoments,
}

#[derive(Debug, Error)]
pub enum EdgeError {
    #[error("edge: Input lengths mismatch - open: {open_len}, high: {high_len}, low: {low_len}, close: {close_len}")]
    InputLengthsMismatch {
        open_len: usize,
        high_len: usize,
        low_len: usize,
        close_len: usize,
    },
    #[error("edge: Not enough bars: needed = {needed}, got = {got}")]
    NotEnoughBars { needed: usize, got: usize },
    #[error("edge: Candle field error: {0}")]
    CandleFieldError(String),
}

#[derive(Copy, Clone, Debug, Default)]
pub struct EdgeBuilder {
    sign: Option<bool>,
}

impl EdgeBuilder {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }
    #[inline(always)]
    pub fn sign(mut self, sign: bool) -> Self {
        self.sign = Some(sign);
        self
    }
    #[inline(always)]
    pub fn apply(self, c: &Candles) -> Result<EdgeOutput, EdgeError> {
        let i = EdgeInput::from_candles(c, self.params());
        edge(&i)
    }
    #[inline(always)]
    pub fn apply_slices(
        self,
        open: &[f64],
        high: &[f64],
        low: &[f64],
        close: &[f64],
    ) -> Result<EdgeOutput, EdgeError> {
        let i = EdgeInput::from_slices(open, high, low, close, self.params());
        edge(&i)
    }
    #[inline(always)]
    pub fn apply_bars(self, bars: &[Bar]) -> Result<EdgeOutput, EdgeError> {
        let i = EdgeInput::from_bars(bars, self.params());
        edge(&i)
    }
    #[inline(always)]
    fn params(&self) -> EdgeParams {
        EdgeParams { sign: self.sign }
    }
}

/// Spread estimate for one series of bars.
///
/// Fails only on malformed input (length mismatch, fewer than two bars). The
/// returned value is `NaN` for non-positive prices and degenerate samples.
#[inline]
pub fn estimate_spread(
    open: &[f64],
    high: &[f64],
    low: &[f64],
    close: &[f64],
    signed: bool,
) -> Result<f64, EdgeError> {
    EdgeBuilder::new()
        .sign(signed)
        .apply_slices(open, high, low, close)
        .map(|o| o.value)
}

pub fn edge(input: &EdgeInput) -> Result<EdgeOutput, EdgeError> {
    let sign = input.get_sign();
    let bars = match &input.data {
        EdgeData::Candles { candles } => {
            let open = candles
                .select_candle_field("open")
                .map_err(|e| EdgeError::CandleFieldError(e.to_string()))?;
            let high = candles
                .select_candle_field("high")
                .map_err(|e| EdgeError::CandleFieldError(e.to_string()))?;
            let low = candles
                .select_candle_field("low")
                .map_err(|e| EdgeError::CandleFieldError(e.to_string()))?;
            let close = candles
                .select_candle_field("close")
                .map_err(|e| EdgeError::CandleFieldError(e.to_string()))?;
            validate(open, high, low, close)?;
            log_bars(open, high, low, close)
        }
        EdgeData::Slices {
            open,
            high,
            low,
            close,
        } => {
            validate(open, high, low, close)?;
            log_bars(open, high, low, close)
        }
        EdgeData::Bars(bars) => {
            if bars.len() < 2 {
                return Err(EdgeError::NotEnoughBars {
                    needed: 2,
                    got: bars.len(),
                });
            }
            bars.iter().map(LogBar::from_bar).collect()
        }
    };

    let moments = aggregate(&bars);
    let value = solve(&moments, sign);
    Ok(EdgeOutput { value, moments })
}

#[inline]
fn validate(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Result<(), EdgeError> {
    let n = open.len();
    if high.len() != n || low.len() != n || close.len() != n {
        return Err(EdgeError::InputLengthsMismatch {
            open_len: n,
            high_len: high.len(),
            low_len: low.len(),
            close_len: close.len(),
        });
    }
    if n < 2 {
        return Err(EdgeError::NotEnoughBars { needed: 2, got: n });
    }
    Ok(())
}

/// Log prices of one bar plus the log-midpoint of its range.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LogBar {
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
    pub m: f64,
}

impl LogBar {
    #[inline(always)]
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        let h = high.ln();
        let l = low.ln();
        Self {
            o: open.ln(),
            h,
            l,
            c: close.ln(),
            m: (h + l) / 2.0,
        }
    }
    #[inline(always)]
    pub fn from_bar(b: &Bar) -> Self {
        Self::new(b.open, b.high, b.low, b.close)
    }
}

pub fn log_bars(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<LogBar> {
    open.iter()
        .zip(high)
        .zip(low)
        .zip(close)
        .map(|(((&o, &h), &l), &c)| LogBar::new(o, h, l, c))
        .collect()
}

/// Indicators and returns of one (previous, current) pair of bars.
/// Flags are stored as 0.0 / 1.0.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PairStats {
    pub tau: f64,
    pub phi1: f64,
    pub phi2: f64,
    pub phi3: f64,
    pub phi4: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub r4: f64,
    pub r5: f64,
}

impl PairStats {
    #[inline(always)]
    pub fn new(prev: &LogBar, cur: &LogBar) -> Self {
        let tau = cur.h != cur.l || cur.l != prev.c;
        let flag = |b: bool| if b && tau { 1.0 } else { 0.0 };
        Self {
            tau: if tau { 1.0 } else { 0.0 },
            phi1: flag(cur.o != cur.h),
            phi2: flag(cur.o != cur.l),
            phi3: flag(prev.c != prev.h),
            phi4: flag(prev.c != prev.l),
            r1: cur.m - cur.o,
            r2: cur.o - prev.m,
            r3: cur.m - prev.c,
            r4: prev.c - prev.m,
            r5: cur.o - prev.c,
        }
    }
}

pub fn pair_stats(bars: &[LogBar]) -> Vec<PairStats> {
    bars.windows(2).map(|w| PairStats::new(&w[0], &w[1])).collect()
}

#[inline(always)]
fn column_mean(pairs: &[PairStats], f: impl Fn(&PairStats) -> f64) -> f64 {
    pairs.iter().map(f).collect::<MomentAccumulator>().mean()
}

/// Moment aggregation over every adjacent pair of `bars`.
///
/// `bars.len()` must be at least 2.
pub fn aggregate(bars: &[LogBar]) -> EdgeMoments {
    let pairs = pair_stats(bars);

    let pt = column_mean(&pairs, |p| p.tau);
    let m1 = column_mean(&pairs, |p| p.r1);
    let m3 = column_mean(&pairs, |p| p.r3);
    let m5 = column_mean(&pairs, |p| p.r5);
    let po = column_mean(&pairs, |p| p.phi1) + column_mean(&pairs, |p| p.phi2);
    let pc = column_mean(&pairs, |p| p.phi3) + column_mean(&pairs, |p| p.phi4);

    let mut x1 = MomentAccumulator::new();
    let mut x2 = MomentAccumulator::new();
    for p in &pairs {
        let d1 = p.r1 - p.tau * m1 / pt;
        let d3 = p.r3 - p.tau * m3 / pt;
        let d5 = p.r5 - p.tau * m5 / pt;
        x1.push(-4.0 / po * d1 * p.r2 - 4.0 / pc * d3 * p.r4);
        x2.push(-4.0 / po * d1 * p.r5 - 4.0 / pc * d5 * p.r4);
    }

    let (e1, e2) = (x1.mean(), x2.mean());
    let (v1, v2) = (x1.variance(), x2.variance());
    let mut moments = EdgeMoments {
        pairs: x1.count(),
        pt,
        po,
        pc,
        e1,
        e2,
        v1,
        v2,
        s2: f64::NAN,
    };
    match moments.degeneracy() {
        Some(reason) => debug!(?reason, pairs = pairs.len(), "edge: degenerate sample"),
        None => moments.s2 = (v2 * e1 + v1 * e2) / (v1 + v2),
    }
    trace!(?moments, "edge: aggregated moments");
    moments
}

/// Square root of the combined estimate; negative `s2` is negated in signed
/// mode and clamped to zero otherwise. NaN passes through either way.
#[inline]
pub fn solve(moments: &EdgeMoments, sign: bool) -> f64 {
    let s2 = moments.s2;
    let s = s2.abs().sqrt();
    if s2 < 0.0 {
        if sign {
            -s
        } else {
            0.0
        }
    } else {
        s
    }
}
