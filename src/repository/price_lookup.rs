// ==========================================
// 折扣规则同步系统 - 基础价格查询契约
// ==========================================
// 红线: 每次运行只允许一次批量查询（价格一致性）
// ==========================================

use crate::repository::error::StoreResult;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

// ==========================================
// PriceLookup Trait
// ==========================================
#[async_trait]
pub trait PriceLookup: Send + Sync {
    /// 批量查询商品基础价
    ///
    /// # 参数
    /// - product_ids: 商品 ID 集合
    ///
    /// # 返回
    /// - Ok(map): 缺失的 ID 视为价格未知（按 0 处理）
    /// - Err: 查询失败（致命，整次运行中止）
    async fn batch_get_base_prices(
        &self,
        product_ids: &[i64],
    ) -> StoreResult<HashMap<i64, Decimal>>;
}
