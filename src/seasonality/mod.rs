//! Seasonal decomposition.
//!
//! This module provides classical decomposition of a series into trend, seasonal
//! and residual components with a fixed, externally supplied seasonal period.

mod classical;

pub use classical::{
    centered_moving_average, decompose, ClassicalDecomposer, DecompositionModel,
    DecompositionResult,
};
