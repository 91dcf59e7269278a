// ==========================================
// 折扣规则同步系统 - 引擎层
// ==========================================
// 职责: 折扣计算策略 + 规则命名 + 两种对账变体
// ==========================================

pub mod direct_sync;
pub mod grouped_sync;
pub mod pricing;
pub mod rule_naming;

pub use direct_sync::DirectRuleSync;
pub use grouped_sync::GroupedRuleSync;
pub use pricing::{direct_pricing, floor_discount_percent, BasePriceTable, DirectPricing};
pub use rule_naming::{
    direct_rule_name, grouped_rule_name, DIRECT_RULE_PREFIX, GROUPED_RULE_PREFIX,
};

use serde::{Deserialize, Serialize};

// ==========================================
// SyncStats - 单次运行统计
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStats {
    pub input_records: usize,      // 过滤后进入对账的记录数
    pub rules_added: usize,        // 创建成功
    pub rules_updated: usize,      // 更新成功（分组变体为无变更确认）
    pub rules_deleted: usize,      // 删除成功
    pub products_not_found: usize, // 货号无对应商品
    pub inert_discounts: usize,    // 折扣为零或负值
    pub store_failures: usize,     // 规则存储调用失败（未中止运行）
}
