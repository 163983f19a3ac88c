use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::wallet::{WalletClient, WalletService};

/// 服务器状态 - 持有所有服务的共享引用
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | wallet | WalletService | 钱包卡券推送队列 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// 钱包卡券推送服务
    pub wallet: WalletService,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool, wallet: WalletService) -> Self {
        Self {
            config,
            pool,
            wallet,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录
    /// 2. 数据库 (work_dir/loyalty.db，含迁移)
    /// 3. 钱包推送服务 + 后台 worker
    pub async fn initialize(config: &Config) -> Self {
        std::fs::create_dir_all(&config.work_dir).expect("Failed to create work directory");

        let db_service = DbService::new(&config.database_path())
            .await
            .expect("Failed to initialize database");

        let wallet_client = config
            .wallet_api_url
            .clone()
            .map(|url| WalletClient::new(url, config.wallet_api_key.clone()));
        let (wallet, worker) = WalletService::new(wallet_client, config.wallet_retry_limit);
        if let Some(worker) = worker {
            tokio::spawn(worker.run());
        } else {
            tracing::info!("WALLET_API_URL not set, wallet pass updates disabled");
        }

        Self::new(config.clone(), db_service.pool, wallet)
    }

    /// 构造钱包卡券 HTTP 客户端 (同步 wallet 接口用)
    ///
    /// None = 未配置钱包服务
    pub fn wallet_client(&self) -> Option<WalletClient> {
        self.config
            .wallet_api_url
            .clone()
            .map(|url| WalletClient::new(url, self.config.wallet_api_key.clone()))
    }
}
