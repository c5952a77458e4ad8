//! Ordify Server - 电商后台订单管理服务
//!
//! # 架构概述
//!
//! 本模块是 Ordify 后端的主入口，提供以下核心功能：
//!
//! - **数据库** (`db`): 嵌入式 SQLite 存储和仓储层
//! - **认证** (`auth`): JWT + Argon2 认证体系，刷新令牌走 HTTP-only cookie
//! - **HTTP API** (`api`): RESTful API 接口
//! - **模拟支付** (`services`): 对外契约与 Stripe 测试模式一致
//!
//! # 模块结构
//!
//! ```text
//! ordify-server/src/
//! ├── core/          # 配置、状态、启动
//! ├── auth/          # JWT 认证、密码、cookie
//! ├── services/      # 模拟支付
//! ├── api/           # HTTP 路由和处理器
//! ├── routes/        # 路由组装和中间件
//! ├── utils/         # 错误、日志
//! └── db/            # 连接池、迁移、仓储
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod routes;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 准备运行环境：加载 .env、创建日志目录、初始化日志
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    // .env 是可选的，线上部署直接用进程环境变量
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty());
    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)?;
    }
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
  ____             _  _   __
 / __ \           | |(_) / _|
| |  | | _ __   __| | _ | |_  _   _
| |  | || '__| / _` || ||  _|| | | |
| |__| || |   | (_| || || |  | |_| |
 \____/ |_|    \__,_||_||_|   \__, |
                               __/ |
                              |___/
    "#
    );
}
