/// 服务器配置 - 忠诚卡服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/loyalty | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | DEFAULT_BUSINESS_ID | 1 | 域名未命中时的默认租户 |
/// | STAMP_COOLDOWN_SECS | 60 | 两次盖章之间的最短间隔 |
/// | WALLET_API_URL | (无) | 钱包卡券服务地址 (未设置则不推送) |
/// | WALLET_API_KEY | (无) | 钱包卡券服务密钥 |
/// | WALLET_RETRY_LIMIT | 3 | 钱包推送重试次数 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/loyalty HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 域名未匹配任何商家时使用的租户 id
    pub default_business_id: i64,
    /// 盖章冷却时间（秒）
    pub stamp_cooldown_secs: i64,
    /// 钱包卡券服务 URL (None = 不推送)
    pub wallet_api_url: Option<String>,
    /// 钱包卡券服务 API key
    pub wallet_api_key: Option<String>,
    /// 钱包推送重试上限
    pub wallet_retry_limit: u32,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/loyalty".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            default_business_id: std::env::var("DEFAULT_BUSINESS_ID")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1),
            stamp_cooldown_secs: std::env::var("STAMP_COOLDOWN_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(60),
            wallet_api_url: std::env::var("WALLET_API_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            wallet_api_key: std::env::var("WALLET_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            wallet_retry_limit: std::env::var("WALLET_RETRY_LIMIT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 数据库文件路径
    pub fn database_path(&self) -> String {
        format!("{}/loyalty.db", self.work_dir)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
