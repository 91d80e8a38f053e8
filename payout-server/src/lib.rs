//! Referra Payout Server: affiliate marketplace commission & payout engine
//!
//! # 架构概述
//!
//! - **引擎** (`engine`): 折扣解析、佣金计算、账本写入、批付执行
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储与仓储层
//! - **支付** (`payments`): Stripe 转账客户端（trait 注入，可替换）
//! - **审计** (`audit`): 哈希链 append-only 审计日志
//! - **HTTP API** (`routes`/`handler`): RESTful 接口 + cron 批付触发
//!
//! # 模块结构
//!
//! ```text
//! payout-server/src/
//! ├── common/        # 错误、日志
//! ├── server/        # 配置、状态、HTTP 入口
//! ├── db/            # 数据库层
//! ├── engine/        # 佣金与批付引擎
//! ├── payments/      # 支付网关
//! ├── audit/         # 审计日志
//! ├── routes/        # 路由定义
//! ├── handler/       # 请求处理
//! └── scheduler.rs   # 每日批付调度
//! ```

pub mod audit;
pub mod common;
pub mod db;
pub mod engine;
pub mod handler;
pub mod payments;
pub mod routes;
pub mod scheduler;
pub mod server;

// Re-export 公共类型
pub use common::{AppError, AppResult};
pub use engine::{BatchReport, PayoutEngine, PurchaseRecorder};
pub use server::{Config, Server, ServerState};

// Re-export logger functions
pub use common::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
    ____        ____
   / __ \___   / __/___  _____ _____ ____ _
  / /_/ / _ \ / /_ / _ \/ ___// ___// __ `/
 / _, _/  __// __//  __/ /   / /   / /_/ /
/_/ |_|\___//_/   \___/_/   /_/    \__,_/
                payout server
    "#
    );
}
