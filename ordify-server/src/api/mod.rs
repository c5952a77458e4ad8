//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口 (注册/登录/刷新/激活)
//! - [`users`] - 后台用户列表
//! - [`customers`] - 客户管理接口
//! - [`products`] - 商品和配送方式管理接口
//! - [`orders`] - 订单接口 (含协议/令牌下单)
//! - [`agreements`] - 协议和客户端令牌接口
//! - [`payments`] - 模拟支付接口
//! - [`statistics`] - 统计接口

pub mod auth;
pub mod health;
pub mod users;

// Data models API
pub mod agreements;
pub mod customers;
pub mod orders;
pub mod payments;
pub mod products;
pub mod statistics;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
