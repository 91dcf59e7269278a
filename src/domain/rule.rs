// ==========================================
// 折扣规则同步系统 - 购物车规则实体
// ==========================================
// 红线: 规则名称是唯一的对账键，名称模板不可变更
// 用途: 本核心只构造规则描述，持久化归规则存储
// ==========================================

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// "所有用户" 用户组标识
pub const ALL_USER_GROUP: i32 = 2;

/// 分组规则的固定排序索引（同一规则服务多个商品，无需逐品排序）
pub const GROUPED_SORT_INDEX: i32 = 100;

// ==========================================
// 折扣单位 (Discount Unit)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountUnit {
    Currency, // 规则值为最终单价（一口价）
    Percent,  // 规则值为整数百分比折扣
}

impl fmt::Display for DiscountUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountUnit::Currency => write!(f, "CURRENCY"),
            DiscountUnit::Percent => write!(f, "PERCENT"),
        }
    }
}

// ==========================================
// 规则绑定条件 (Rule Condition)
// ==========================================
// 单品变体绑定单个商品；分组变体绑定分组键属性值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleCondition {
    Product(i64),     // 绑定单个商品 ID
    GroupKey(String), // 绑定持有该分组键的所有商品
}

// ==========================================
// RuleSpec - 规则写入描述
// ==========================================
// 对齐: 规则存储 create/update 的字段全集
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,                        // 规则名称（对账键）
    pub condition: RuleCondition,            // 绑定条件
    pub value: Decimal,                      // 折扣值（单位见 unit）
    pub unit: DiscountUnit,                  // 折扣单位
    pub priority: i32,                       // 应用优先级
    pub sort_index: i32,                     // 同优先级内排序索引
    pub active_from: Option<NaiveDateTime>,  // 活动开始时间
    pub active_to: Option<NaiveDateTime>,    // 活动结束时间
    pub user_groups: Vec<i32>,               // 适用用户组（固定为所有用户）
    pub last_discount: bool,                 // 是否终止后续规则（固定 false）
    pub last_level_discount: bool,           // 是否终止本级规则（固定 false）
}

impl RuleSpec {
    /// 构造单品规则（一口价）
    pub fn direct(
        name: String,
        product_id: i64,
        target_price: Decimal,
        priority: i32,
        sort_index: i32,
        active_from: Option<NaiveDateTime>,
        active_to: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            name,
            condition: RuleCondition::Product(product_id),
            value: target_price,
            unit: DiscountUnit::Currency,
            priority,
            sort_index,
            active_from,
            active_to,
            user_groups: vec![ALL_USER_GROUP],
            last_discount: false,
            last_level_discount: false,
        }
    }

    /// 构造分组规则（整数百分比；条件值即分组键）
    pub fn grouped(
        name: String,
        group_key: String,
        discount_percent: i64,
        priority: i32,
        active_from: NaiveDateTime,
        active_to: NaiveDateTime,
    ) -> Self {
        Self {
            name,
            condition: RuleCondition::GroupKey(group_key),
            value: Decimal::from(discount_percent),
            unit: DiscountUnit::Percent,
            priority,
            sort_index: GROUPED_SORT_INDEX,
            active_from: Some(active_from),
            active_to: Some(active_to),
            user_groups: vec![ALL_USER_GROUP],
            last_discount: false,
            last_level_discount: false,
        }
    }
}

// ==========================================
// RuleHandle - 已存在规则的轻量句柄
// ==========================================
// 用途: 按前缀列举现有规则时的返回单元
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleHandle {
    pub id: i64,      // 规则存储内部 ID
    pub name: String, // 规则名称（对账键）
}
