//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`business`] - 商家信息与配置接口
//! - [`clients`] - 客户管理接口
//! - [`stamps`] - 盖章/撤销接口
//! - [`coupons`] - 优惠券管理接口
//! - [`wallet`] - 钱包卡券接口

pub mod business;
pub mod clients;
pub mod coupons;
pub mod health;
pub mod stamps;
pub mod wallet;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
