//! Core domain types and logic.

pub mod trade;
pub mod rate;
pub mod financing;
pub mod slippage;
pub mod execution;
pub mod portfolio;
pub mod strategy;
pub mod backtest;
pub mod selection;
pub mod metrics;
pub mod config_validation;
pub mod error;
