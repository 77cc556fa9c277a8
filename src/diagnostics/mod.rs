//! Heuristic interpretation of the computed statistics.

pub mod heuristics;

pub use heuristics::{
    has_irregularity, has_mean_reversion, has_seasonality, has_trend, volatility,
    DiagnosticVerdicts, HeuristicAnalyzer, HeuristicConfig,
};
