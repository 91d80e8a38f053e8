//! 审计日志类型定义
//!
//! 财务级审计日志的核心数据结构。
//! 所有条目不可变、不可删除，SHA256 哈希链防篡改。

use serde::{Deserialize, Serialize};

/// 审计操作类型（枚举，非自由文本）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // ═══ 账本（财务关键）═══
    /// In-app purchase recorded on the ledger
    PurchaseRecorded,
    /// Externally-reported purchase reconciled via webhook
    ExternalPurchaseRecorded,

    // ═══ 佣金 ═══
    /// Commission approved by the company
    CommissionApproved,
    /// Commission rejected by the company
    CommissionRejected,

    // ═══ 批付 ═══
    /// Transfer confirmed and payout row persisted
    PayoutExecuted,
    /// Transfer or persistence failed for one affiliate
    PayoutFailed,
    /// Paid-flip finalized a payout's commission set
    CommissionsMarkedPaid,
    /// One batch run finished (aggregate counters snapshot)
    BatchRunCompleted,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// 审计日志条目（不可变）
///
/// - `prev_hash`: 前一条记录的哈希
/// - `curr_hash`: 当前记录的哈希（包含 prev_hash + 所有字段）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// 全局递增序列号（唯一标识）
    pub id: u64,
    /// 时间戳（Unix 毫秒）
    pub timestamp: i64,
    pub action: AuditAction,
    /// 资源类型（如 "purchase", "payout"）
    pub resource_type: String,
    /// 资源 ID
    pub resource_id: String,
    /// 结构化金额快照（JSON）
    pub details: serde_json::Value,
    pub prev_hash: String,
    pub curr_hash: String,
}

/// 审计日志查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    /// 起始时间（Unix 毫秒，含）
    pub from: Option<i64>,
    /// 截止时间（Unix 毫秒，含）
    pub to: Option<i64>,
    pub action: Option<AuditAction>,
    pub resource_type: Option<String>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// 审计日志列表响应
#[derive(Debug, Serialize)]
pub struct AuditListResponse {
    pub items: Vec<AuditEntry>,
    pub total: u64,
}

/// 审计链验证结果
#[derive(Debug, Serialize)]
pub struct AuditChainVerification {
    pub total_entries: u64,
    pub chain_intact: bool,
    pub breaks: Vec<AuditChainBreak>,
}

/// 审计链断裂点
#[derive(Debug, Serialize)]
pub struct AuditChainBreak {
    pub entry_id: u64,
    pub expected_prev_hash: String,
    pub actual_prev_hash: String,
}
