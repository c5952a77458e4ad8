use crate::auth::JwtConfig;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 3005 | HTTP 服务端口 |
/// | DATABASE_PATH | data/ordify.db | SQLite 数据库文件 |
/// | FRONTEND_URL | http://localhost:4200 | 前端地址 (CORS / 激活跳转) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (未设置) | 设置后写入按天滚动的日志文件 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// JWT 相关变量见 [`JwtConfig`]。
///
/// # 示例
///
/// ```ignore
/// DATABASE_PATH=/data/ordify.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// SQLite 数据库文件路径
    pub database_path: String,
    /// 前端地址，用于 CORS 白名单和账号激活后的跳转
    pub frontend_url: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 日志级别 (trace | debug | info | warn | error)
    pub log_level: String,
    /// 日志目录，None 表示仅输出到控制台
    pub log_dir: Option<String>,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3005),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/ordify.db".into()),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:4200".into()),
            jwt: JwtConfig::default(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(database_path: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.database_path = database_path.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
