pub mod backtest;
pub mod frequency;
pub mod generator;
pub mod interval;
pub mod position;
pub mod summary;
