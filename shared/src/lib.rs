//! Shared models and utilities for the loyalty platform
//!
//! # 模块结构
//!
//! - [`models`] - 数据模型 (Business / Client / Visit / Coupon)
//! - [`util`] - 时间戳和 ID 生成工具

pub mod models;
pub mod util;
