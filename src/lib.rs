#![warn(clippy::all, rust_2018_idioms)]

//! 二维均匀网格点索引
//!
//! 见 [`spatial::GridIndex`]。

pub mod spatial;
