//! Special functions used by the maximum-likelihood estimators.
//!
//! `digamma` comes from `statrs`; `trigamma` and the inverse digamma are not provided
//! there, so they are implemented here:
//!
//! - `trigamma(x)`: recurrence `ψ'(x) = ψ'(x + 1) + 1/x²` until `x >= 10`, then the
//!   asymptotic series `1/x + 1/(2x²) + 1/(6x³) - 1/(30x⁵) + 1/(42x⁷) - 1/(30x⁹)`
//! - `inv_digamma(y)`: Newton iterations on `ψ(x) - y` from Minka's starting point

pub use statrs::function::gamma::digamma;

/// Newton iterations for the inverse digamma; converges to machine precision in ~5.
const INV_DIGAMMA_ITERS: usize = 10;

/// `ψ(1) = -γ` (Euler–Mascheroni).
const DIGAMMA_ONE: f64 = -0.577_215_664_901_532_9;

/// Trigamma function `ψ'(x)` for `x > 0`.
pub fn trigamma(x: f64) -> f64 {
    if !(x > 0.0) {
        return f64::NAN;
    }

    let mut x = x;
    let mut acc = 0.0;
    while x < 10.0 {
        acc += 1.0 / (x * x);
        x += 1.0;
    }

    let inv = 1.0 / x;
    let inv2 = inv * inv;
    let series = inv
        + inv2 / 2.0
        + inv * inv2 * (1.0 / 6.0 - inv2 * (1.0 / 30.0 - inv2 * (1.0 / 42.0 - inv2 / 30.0)));
    acc + series
}

/// Solve `ψ(x) = y` for `x > 0`.
pub fn inv_digamma(y: f64) -> f64 {
    let mut x = if y >= -2.22 {
        y.exp() + 0.5
    } else {
        -1.0 / (y - DIGAMMA_ONE)
    };

    for _ in 0..INV_DIGAMMA_ITERS {
        let step = (digamma(x) - y) / trigamma(x);
        x -= step;
        if x <= 0.0 {
            x = f64::EPSILON;
        }
        if step.abs() <= 1e-14 * x {
            break;
        }
    }
    x
}
