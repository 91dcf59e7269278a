// ==========================================
// 折扣规则同步系统 - 商品目录契约
// ==========================================
// 用途: 货号解析、分组键标记、缓存失效（外部系统）
// 实现者: 接入方适配器 / 测试 Mock
// ==========================================

use crate::repository::error::StoreResult;
use async_trait::async_trait;
use std::collections::HashMap;

// ==========================================
// ProductCatalog Trait
// ==========================================
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// 批量解析货号为商品 ID
    ///
    /// # 参数
    /// - skus: 货号集合
    ///
    /// # 返回
    /// - Ok(map): 仅包含命中的货号；缺失即"商品未找到"
    /// - Err: 目录查询失败、商品分组缺失（致命，整次运行中止）
    async fn resolve_ids(&self, skus: &[String]) -> StoreResult<HashMap<String, i64>>;

    /// 列举商品分组内全部商品 ID
    ///
    /// # 用途
    /// - 分组变体清理失效分组键：全集减去本轮触达集合
    async fn list_product_ids(&self) -> StoreResult<Vec<i64>>;

    /// 写入/清除商品的分组键属性（幂等）
    ///
    /// # 参数
    /// - product_id: 商品 ID
    /// - key: Some(分组键) 写入；None 清除
    async fn set_group_key(&self, product_id: i64, key: Option<&str>) -> StoreResult<()>;

    /// 请求目录缓存失效（规则变更后调用一次）
    async fn invalidate_cache(&self) -> StoreResult<()>;
}
