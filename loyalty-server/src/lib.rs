//! Loyalty Server - 多租户忠诚卡服务
//!
//! # 架构概述
//!
//! 本模块是忠诚卡服务的主入口，提供以下核心功能：
//!
//! - **租户解析** (`tenant`): Host 头 → 商家，未命中降级默认租户
//! - **客户登记** (`loyalty::registry`): 注册、审核、导入、删除
//! - **盖章引擎** (`loyalty::engine`): 计章、里程碑发券、撤销回退
//! - **钱包推送** (`wallet`): 卡券状态异步投影，账本为准
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! loyalty-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── tenant/        # 租户解析中间件
//! ├── loyalty/       # 账本核心 (token、周期数学、登记、引擎)
//! ├── wallet/        # 钱包卡券推送
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod loyalty;
pub mod tenant;
pub mod utils;
pub mod wallet;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    __                        __ __
   / /   ____  __  ______ _  / / /___  __
  / /   / __ \/ / / / __ `/ / / __/ / / /
 / /___/ /_/ / /_/ / /_/ / / / /_/ /_/ /
/_____/\____/\__, /\__,_/_/_/\__/\__, /
            /____/              /____/
    "#
    );
}
