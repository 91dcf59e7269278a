// ==========================================
// 折扣规则同步系统 - 规则存储契约
// ==========================================
// 用途: 购物车规则的查询与增/改/删（外部系统）
// 红线: 名称是唯一对账键；仅触达带本系统前缀的规则
// ==========================================

use crate::domain::rule::{RuleHandle, RuleSpec};
use crate::repository::error::StoreResult;
use async_trait::async_trait;

// ==========================================
// RuleStore Trait
// ==========================================
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// 按名称前缀列举站点下的现有规则
    ///
    /// # 返回
    /// - Ok(handles): 规则 ID + 名称
    /// - Err: 查询失败（致命，整次运行中止）
    async fn list_by_name_prefix(
        &self,
        site_id: &str,
        prefix: &str,
    ) -> StoreResult<Vec<RuleHandle>>;

    /// 创建规则
    ///
    /// # 返回
    /// - Ok(id): 新规则 ID
    /// - Err: 写入失败（记录 error 诊断后继续处理下一条）
    async fn create(&self, site_id: &str, spec: &RuleSpec) -> StoreResult<i64>;

    /// 更新规则（保持规则 ID 不变）
    async fn update(&self, rule_id: i64, spec: &RuleSpec) -> StoreResult<()>;

    /// 删除规则
    async fn delete(&self, rule_id: i64) -> StoreResult<()>;
}
