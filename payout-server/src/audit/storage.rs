//! 审计日志 SurrealDB 存储层
//!
//! Append-only 设计，没有任何删除/更新接口。
//! SHA256 哈希链确保防篡改。

use std::sync::Arc;

use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use super::types::{
    AuditAction, AuditChainBreak, AuditChainVerification, AuditEntry, AuditQuery,
};

/// 存储错误
#[derive(Debug, Error)]
pub enum AuditStorageError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<surrealdb::Error> for AuditStorageError {
    fn from(err: surrealdb::Error) -> Self {
        AuditStorageError::Database(err.to_string())
    }
}

pub type AuditStorageResult<T> = Result<T, AuditStorageError>;

/// 查询最后一条记录的序列号和哈希
#[derive(Debug, serde::Deserialize)]
struct LastEntry {
    sequence: u64,
    curr_hash: String,
}

/// 插入/读取用结构（sequence 字段即对外的 id）
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct AuditRecord {
    sequence: u64,
    timestamp: i64,
    action: AuditAction,
    resource_type: String,
    resource_id: String,
    details: serde_json::Value,
    prev_hash: String,
    curr_hash: String,
}

impl From<AuditRecord> for AuditEntry {
    fn from(r: AuditRecord) -> Self {
        AuditEntry {
            id: r.sequence,
            timestamp: r.timestamp,
            action: r.action,
            resource_type: r.resource_type,
            resource_id: r.resource_id,
            details: r.details,
            prev_hash: r.prev_hash,
            curr_hash: r.curr_hash,
        }
    }
}

/// 审计日志存储 (SurrealDB)
///
/// - 仅提供 `append` 和查询方法，没有 delete/update 接口
/// - SHA256 哈希链确保完整性
#[derive(Clone)]
pub struct AuditStorage {
    db: Surreal<Db>,
    /// 序列化所有 append 操作，防止 read-modify-write 竞争
    append_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AuditStorage {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            db,
            append_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// 追加一条审计日志
    ///
    /// 1. 查询当前最大序列号和 last_hash
    /// 2. 计算新条目的哈希
    /// 3. 写入条目
    pub async fn append(
        &self,
        action: AuditAction,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        details: serde_json::Value,
    ) -> AuditStorageResult<AuditEntry> {
        let resource_type = resource_type.into();
        let resource_id = resource_id.into();

        // 序列化：防止并发 append 导致 sequence 冲突
        let _guard = self.append_lock.lock().await;

        let mut result = self
            .db
            .query("SELECT sequence, curr_hash FROM audit_log ORDER BY sequence DESC LIMIT 1")
            .await?;
        let last: Vec<LastEntry> = result.take(0)?;

        let (sequence, prev_hash) = match last.into_iter().next() {
            Some(e) => (e.sequence + 1, e.curr_hash),
            None => (1, "genesis".to_string()),
        };

        let timestamp = shared::util::now_millis();
        let curr_hash = compute_hash(
            sequence,
            timestamp,
            action,
            &resource_type,
            &resource_id,
            &details,
            &prev_hash,
        )?;

        let record = AuditRecord {
            sequence,
            timestamp,
            action,
            resource_type,
            resource_id,
            details,
            prev_hash,
            curr_hash,
        };

        let created: Option<AuditRecord> = self.db.create("audit_log").content(record).await?;
        created
            .map(AuditEntry::from)
            .ok_or_else(|| AuditStorageError::Database("Audit insert returned no row".to_string()))
    }

    /// 查询审计日志（按时间/类型过滤，分页）
    pub async fn query(&self, q: &AuditQuery) -> AuditStorageResult<(Vec<AuditEntry>, u64)> {
        let mut conditions = vec!["true".to_string()];
        if q.from.is_some() {
            conditions.push("timestamp >= $from".to_string());
        }
        if q.to.is_some() {
            conditions.push("timestamp <= $to".to_string());
        }
        if q.action.is_some() {
            conditions.push("action = $action".to_string());
        }
        if q.resource_type.is_some() {
            conditions.push("resource_type = $resource_type".to_string());
        }
        let where_clause = conditions.join(" AND ");

        // LIMIT/START 不吃绑定参数，直接内联数值
        let select = format!(
            "SELECT * FROM audit_log WHERE {where_clause} ORDER BY sequence DESC LIMIT {} START {}",
            q.limit, q.offset
        );
        let count = format!(
            "SELECT count() AS total FROM audit_log WHERE {where_clause} GROUP ALL"
        );

        let mut query = self.db.query(select).query(count);
        if let Some(from) = q.from {
            query = query.bind(("from", from));
        }
        if let Some(to) = q.to {
            query = query.bind(("to", to));
        }
        if let Some(action) = q.action {
            query = query.bind(("action", action));
        }
        if let Some(ref rt) = q.resource_type {
            query = query.bind(("resource_type", rt.clone()));
        }

        let mut result = query.await?;
        let records: Vec<AuditRecord> = result.take(0)?;

        #[derive(serde::Deserialize)]
        struct CountRow {
            total: u64,
        }
        let counts: Vec<CountRow> = result.take(1)?;
        let total = counts.first().map(|c| c.total).unwrap_or(0);

        Ok((records.into_iter().map(AuditEntry::from).collect(), total))
    }

    /// 验证审计链完整性
    ///
    /// 重算每条记录的哈希并核对 prev_hash 链接。
    pub async fn verify_chain(
        &self,
        from: Option<i64>,
        to: Option<i64>,
    ) -> AuditStorageResult<AuditChainVerification> {
        let mut result = self
            .db
            .query(
                r#"
                SELECT * FROM audit_log
                WHERE timestamp >= $from AND timestamp <= $to
                ORDER BY sequence ASC
                "#,
            )
            .bind(("from", from.unwrap_or(0)))
            .bind(("to", to.unwrap_or(i64::MAX)))
            .await?;
        let records: Vec<AuditRecord> = result.take(0)?;

        let mut breaks = Vec::new();
        let mut expected_prev: Option<String> = None;

        for r in &records {
            if let Some(expected) = &expected_prev
                && &r.prev_hash != expected
            {
                breaks.push(AuditChainBreak {
                    entry_id: r.sequence,
                    expected_prev_hash: expected.clone(),
                    actual_prev_hash: r.prev_hash.clone(),
                });
            }

            let recomputed = compute_hash(
                r.sequence,
                r.timestamp,
                r.action,
                &r.resource_type,
                &r.resource_id,
                &r.details,
                &r.prev_hash,
            )?;
            if recomputed != r.curr_hash {
                breaks.push(AuditChainBreak {
                    entry_id: r.sequence,
                    expected_prev_hash: recomputed,
                    actual_prev_hash: r.curr_hash.clone(),
                });
            }

            expected_prev = Some(r.curr_hash.clone());
        }

        Ok(AuditChainVerification {
            total_entries: records.len() as u64,
            chain_intact: breaks.is_empty(),
            breaks,
        })
    }
}

/// 规范化字段拼接后取 SHA256
fn compute_hash(
    sequence: u64,
    timestamp: i64,
    action: AuditAction,
    resource_type: &str,
    resource_id: &str,
    details: &serde_json::Value,
    prev_hash: &str,
) -> Result<String, serde_json::Error> {
    let details_canonical = serde_json::to_string(details)?;
    let mut hasher = Sha256::new();
    hasher.update(sequence.to_be_bytes());
    hasher.update(timestamp.to_be_bytes());
    hasher.update(action.to_string().as_bytes());
    hasher.update(resource_type.as_bytes());
    hasher.update(resource_id.as_bytes());
    hasher.update(details_canonical.as_bytes());
    hasher.update(prev_hash.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
