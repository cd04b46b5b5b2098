//! Manual parameter adjustment on top of a fit.
//!
//! Each fitted parameter `p` gets a slider over `[p * 0.1 - 10, p * 2 + 10]` with step
//! `0.01`, starting at `p`. For `p < -200/19` that formula yields `lower > upper`; such a
//! slider is locked at the fitted value.
//!
//! Slider state lives in [`ManualControls`], owned by the front-end and passed back into the
//! pipeline on every run. Controls are only valid for the exact fit they were seeded from
//! (same family, bitwise-equal initial values).

use std::str::FromStr;

use serde::Serialize;

use crate::domain::{Family, FittedParams};
use crate::error::{FitError, OverrideError};
use crate::models::Density;

/// One slider over a single parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSlider {
    /// 0-based parameter position.
    index: usize,
    lower: f64,
    upper: f64,
    initial: f64,
    value: f64,
}

impl ParamSlider {
    pub const STEP: f64 = 0.01;

    pub fn from_fitted(index: usize, p: f64) -> Self {
        Self {
            index,
            lower: p * 0.1 - 10.0,
            upper: p * 2.0 + 10.0,
            initial: p,
            value: p,
        }
    }

    pub fn label(&self) -> String {
        format!("Parameter {} (initial: {:.3})", self.index + 1, self.initial)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn initial(&self) -> f64 {
        self.initial
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_inverted(&self) -> bool {
        self.lower > self.upper
    }

    /// Move to `v`, which must lie within the bounds.
    pub fn set(&mut self, v: f64) -> Result<(), OverrideError> {
        let index = self.index + 1;
        if self.is_inverted() {
            return Err(OverrideError::Inverted {
                index,
                lower: self.lower,
                upper: self.upper,
            });
        }
        if !v.is_finite() {
            return Err(OverrideError::NotFinite { index });
        }
        if v < self.lower || v > self.upper {
            return Err(OverrideError::OutOfRange {
                index,
                value: v,
                lower: self.lower,
                upper: self.upper,
            });
        }
        self.value = v;
        Ok(())
    }

    /// Move by `steps * STEP`, clamped to the bounds. Locked sliders don't move.
    pub fn nudge(&mut self, steps: i32) {
        if self.is_inverted() {
            return;
        }
        self.value = (self.value + f64::from(steps) * Self::STEP).clamp(self.lower, self.upper);
    }

    pub fn reset(&mut self) {
        self.value = self.initial;
    }
}

/// Slider state for every parameter of one fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManualControls {
    family: Family,
    sliders: Vec<ParamSlider>,
}

impl ManualControls {
    pub fn seeded_from(fitted: &FittedParams) -> Self {
        let sliders = fitted
            .values()
            .iter()
            .enumerate()
            .map(|(i, &p)| ParamSlider::from_fitted(i, p))
            .collect();
        Self {
            family: fitted.family(),
            sliders,
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn sliders(&self) -> &[ParamSlider] {
        &self.sliders
    }

    pub fn slider_mut(&mut self, index: usize) -> Option<&mut ParamSlider> {
        self.sliders.get_mut(index)
    }

    /// Whether these controls were seeded from exactly this fit.
    pub fn matches(&self, fitted: &FittedParams) -> bool {
        self.family == fitted.family()
            && self.sliders.len() == fitted.values().len()
            && self
                .sliders
                .iter()
                .zip(fitted.values())
                .all(|(s, p)| s.initial.to_bits() == p.to_bits())
    }

    /// Apply a 1-based `INDEX=VALUE` override to the matching slider.
    pub fn apply_override(&mut self, o: &ParamOverride) -> Result<(), OverrideError> {
        let (family, arity) = (self.family, self.sliders.len());
        let slider = o
            .index
            .checked_sub(1)
            .and_then(|i| self.sliders.get_mut(i))
            .ok_or(OverrideError::UnknownParameter {
                family,
                index: o.index,
                arity,
            })?;
        slider.set(o.value)
    }

    /// The fit with every slider value substituted in.
    ///
    /// Slider bounds can reach values the family rejects (a negative scale, say); those
    /// are refused here rather than at evaluation.
    pub fn params(&self, fitted: &FittedParams) -> Result<FittedParams, OverrideError> {
        if fitted.family() != self.family {
            return Err(OverrideError::FamilyMismatch {
                controls: self.family,
                active: fitted.family(),
            });
        }
        let params = self
            .sliders
            .iter()
            .try_fold(fitted.clone(), |params, s| apply_override(&params, s.index, s.value))?;

        Density::from_params(&params).map_err(|e| match e {
            FitError::InvalidParameters { family, reason } => {
                OverrideError::InvalidParameters { family, reason }
            }
            other => OverrideError::InvalidParameters {
                family: self.family,
                reason: other.to_string(),
            },
        })?;
        Ok(params)
    }
}

/// Replace parameter `index` (0-based) with `value`, leaving the others untouched.
pub fn apply_override(
    params: &FittedParams,
    index: usize,
    value: f64,
) -> Result<FittedParams, OverrideError> {
    let family = params.family();
    if index >= family.arity() {
        return Err(OverrideError::UnknownParameter {
            family,
            index: index + 1,
            arity: family.arity(),
        });
    }
    if !value.is_finite() {
        return Err(OverrideError::NotFinite { index: index + 1 });
    }

    let mut values = params.values().to_vec();
    values[index] = value;
    // Arity is unchanged, so construction cannot fail.
    FittedParams::new(family, values).map_err(|_| OverrideError::UnknownParameter {
        family,
        index: index + 1,
        arity: family.arity(),
    })
}

/// A `--set INDEX=VALUE` argument (1-based index).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamOverride {
    pub index: usize,
    pub value: f64,
}

impl FromStr for ParamOverride {
    type Err = OverrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = || OverrideError::Syntax(s.to_string());
        let (index, value) = s.split_once('=').ok_or_else(syntax)?;
        let index: usize = index.trim().parse().map_err(|_| syntax())?;
        let value: f64 = value.trim().parse().map_err(|_| syntax())?;
        if index == 0 {
            return Err(syntax());
        }
        Ok(Self { index, value })
    }
}
