// ==========================================
// 折扣规则同步系统 - 导入记录
// ==========================================
// 用途: 价格表一行经解析校验后的产物
// 生命周期: 仅在一次同步运行内，过滤后不再变更
// ==========================================

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// DiscountRecord - 折扣导入记录
// ==========================================
// 不变式: sku 非空、target_price > 0（解析阶段保证）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRecord {
    pub sku: String,                         // 商品货号（已 trim）
    pub target_price: Decimal,               // 目标价（最终售价，非百分比）
    pub active_from: Option<NaiveDateTime>,  // 活动开始时间
    pub active_to: Option<NaiveDateTime>,    // 活动结束时间
    pub category_id: Option<u32>,            // 分类标识（纯数字才接受）
    pub row_index: usize,                    // 源文件行号（用于报告）
}

impl DiscountRecord {
    /// 记录在 now 时刻是否已过期（无结束时间视为长期有效）
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        match self.active_to {
            Some(active_to) => active_to < now,
            None => false,
        }
    }
}
