/// Common test utilities shared by the integration tests
use edge_spread::utilities::data_loader::{read_candles_from_csv, Candles};
use std::error::Error;

pub const SAMPLE_CSV: &str = "src/data/ohlc_sample.csv";

/// Simulated 4h bars: Gaussian efficient price, 40 trades per bar, each
/// trade half a 1% spread away from the efficient price.
pub const SAMPLE_TRUE_SPREAD: f64 = 0.01;

pub struct TestData {
    pub candles: Candles,
}

impl TestData {
    pub fn load() -> Result<Self, Box<dyn Error>> {
        let candles = read_candles_from_csv(SAMPLE_CSV)?;
        Ok(TestData { candles })
    }

    pub fn open_prices(&self) -> &[f64] {
        &self.candles.open
    }

    pub fn high_prices(&self) -> &[f64] {
        &self.candles.high
    }

    pub fn low_prices(&self) -> &[f64] {
        &self.candles.low
    }

    pub fn close_prices(&self) -> &[f64] {
        &self.candles.close
    }
}

/// Compare two values with a tolerance; two NaNs compare equal
pub fn assert_close(actual: f64, expected: f64, rtol: f64, atol: f64, name: &str) {
    if actual.is_nan() && expected.is_nan() {
        return;
    }
    let diff = (actual - expected).abs();
    let tol = atol + rtol * expected.abs();
    assert!(
        diff <= tol,
        "{}: actual {} vs expected {} (diff: {}, tol: {})",
        name,
        actual,
        expected,
        diff,
        tol
    );
}

/// Earlier formulation of the estimator: pairs with a non-finite log price
/// are skipped, the two moment conditions are weighted by their sample
/// variances and the boundary frequencies enter through a closed-form
/// correction. Kept as an independent reference for the canonical estimator.
pub fn legacy_edge(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> f64 {
    let n = open.len();
    assert!(high.len() == n && low.len() == n && close.len() == n);

    let o: Vec<f64> = open.iter().map(|v| v.ln()).collect();
    let h: Vec<f64> = high.iter().map(|v| v.ln()).collect();
    let l: Vec<f64> = low.iter().map(|v| v.ln()).collect();
    let c: Vec<f64> = close.iter().map(|v| v.ln()).collect();
    let m: Vec<f64> = h.iter().zip(&l).map(|(h, l)| (h + l) / 2.0).collect();

    let mut cnt = 0.0;
    let (mut x1_s, mut x1_ss, mut x2_s, mut x2_ss) = (0.0, 0.0, 0.0, 0.0);
    let mut ns = [0.0f64; 5];
    for i in 1..n {
        if !(m[i].is_finite() && o[i].is_finite() && m[i - 1].is_finite() && c[i - 1].is_finite()) {
            continue;
        }
        let x1 = (m[i] - o[i]) * (o[i] - m[i - 1]) + (m[i] - c[i - 1]) * (c[i - 1] - m[i - 1]);
        let x2 = (m[i] - o[i]) * (o[i] - c[i - 1]) + (o[i] - c[i - 1]) * (c[i - 1] - m[i - 1]);
        x1_s += x1;
        x1_ss += x1 * x1;
        x2_s += x2;
        x2_ss += x2 * x2;
        cnt += 1.0;

        let hits = [
            o[i] == h[i],
            o[i] == l[i],
            c[i - 1] == h[i - 1],
            c[i - 1] == l[i - 1],
            h[i] == l[i] && l[i] == c[i - 1],
        ];
        for (acc, hit) in ns.iter_mut().zip(hits) {
            if hit {
                *acc += 1.0;
            }
        }
    }

    let e1 = x1_s / cnt;
    let e2 = x2_s / cnt;
    let v1 = cnt / (cnt - 1.0) * (x1_ss / cnt - e1 * e1);
    let v2 = cnt / (cnt - 1.0) * (x2_ss / cnt - e2 * e2);
    let w1 = v2 / (v1 + v2);
    let w2 = v1 / (v1 + v2);
    let k = 4.0 * w1 * w2;
    let [n1, n2, n3, n4, n5] = ns.map(|s| s / cnt);

    let s2 = -4.0 * (w1 * e1 + w2 * e2)
        / ((1.0 - k * (n1 + n2) / 2.0) + (1.0 - n5) * (1.0 - k * (n3 + n4) / 2.0));
    if s2 > 0.0 {
        s2.sqrt()
    } else {
        0.0
    }
}
