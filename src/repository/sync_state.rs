// ==========================================
// 折扣规则同步系统 - 同步状态仓储
// ==========================================
// 职责: 记录各交换任务最后处理的源文件时间戳
// 存储: sync_state 表 (key-value)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::repository::error::{StoreError, StoreResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// SyncStateRepository Trait
// ==========================================
pub trait SyncStateRepository: Send + Sync {
    /// 读取交换任务最后处理的源时间戳
    ///
    /// # 返回
    /// - Ok(Some(stamp)): 已有记录
    /// - Ok(None): 任务从未运行
    fn last_source_stamp(&self, exchange_key: &str) -> StoreResult<Option<i64>>;

    /// 写入交换任务最后处理的源时间戳（upsert）
    fn set_last_source_stamp(&self, exchange_key: &str, stamp: i64) -> StoreResult<()>;
}

// ==========================================
// SqliteSyncStateRepository - SQLite 实现
// ==========================================
pub struct SqliteSyncStateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSyncStateRepository {
    /// 创建实例并保证表结构存在（幂等）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> StoreResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sync_state (
                key        TEXT PRIMARY KEY,
                stamp      INTEGER NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> StoreResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Internal(format!("锁获取失败: {}", e)))
    }
}

impl SyncStateRepository for SqliteSyncStateRepository {
    fn last_source_stamp(&self, exchange_key: &str) -> StoreResult<Option<i64>> {
        let conn = self.get_conn()?;
        let stamp = conn
            .query_row(
                "SELECT stamp FROM sync_state WHERE key = ?1",
                params![exchange_key],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(stamp)
    }

    fn set_last_source_stamp(&self, exchange_key: &str, stamp: i64) -> StoreResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO sync_state (key, stamp, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET stamp = excluded.stamp, updated_at = excluded.updated_at
            "#,
            params![exchange_key, stamp, Utc::now().to_rfc3339()],
        )
        .map_err(|e| StoreError::StateWrite(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn repo() -> (NamedTempFile, SqliteSyncStateRepository) {
        let file = NamedTempFile::new().unwrap();
        let repo = SqliteSyncStateRepository::new(file.path().to_str().unwrap()).unwrap();
        (file, repo)
    }

    #[test]
    fn test_missing_key_returns_none() {
        let (_file, repo) = repo();
        assert_eq!(repo.last_source_stamp("discounts_excel").unwrap(), None);
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let (_file, repo) = repo();
        repo.set_last_source_stamp("discounts_excel", 1_700_000_000)
            .unwrap();
        assert_eq!(
            repo.last_source_stamp("discounts_excel").unwrap(),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn test_set_overwrites_previous_stamp() {
        let (_file, repo) = repo();
        repo.set_last_source_stamp("discounts_excel", 1).unwrap();
        repo.set_last_source_stamp("discounts_excel", 2).unwrap();
        assert_eq!(repo.last_source_stamp("discounts_excel").unwrap(), Some(2));
    }
}
