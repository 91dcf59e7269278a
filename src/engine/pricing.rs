// ==========================================
// 折扣规则同步系统 - 折扣计算策略
// ==========================================
// 职责: 由目标价与基础价派生折扣百分比/优先级/排序
// 红线: 基础价每次运行只批量查询一次，显式传递；
//       向下取整策略必须使用定点十进制运算
// ==========================================

use crate::repository::error::StoreResult;
use crate::repository::price_lookup::PriceLookup;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

// ==========================================
// BasePriceTable - 本次运行的基础价快照
// ==========================================
// 用途: 一次批量查询，全程复用（同一运行内价格一致）
#[derive(Debug, Default)]
pub struct BasePriceTable {
    prices: HashMap<i64, Decimal>,
}

impl BasePriceTable {
    /// 批量拉取基础价构建快照
    pub async fn fetch<P>(price_lookup: &P, product_ids: &[i64]) -> StoreResult<Self>
    where
        P: PriceLookup + ?Sized,
    {
        let prices = price_lookup.batch_get_base_prices(product_ids).await?;
        Ok(Self { prices })
    }

    /// 商品基础价；缺失或非正值一律按 0 处理
    pub fn base_price(&self, product_id: i64) -> Decimal {
        match self.prices.get(&product_id) {
            Some(price) if *price > Decimal::ZERO => *price,
            _ => Decimal::ZERO,
        }
    }
}

// ==========================================
// 单品策略 (Direct Policy)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectPricing {
    pub discount_percent: Decimal, // 两位小数，四舍五入（远离零）
    pub priority: i32,             // trunc(折扣 × 10)，下限 1
    pub sort_index: i32,           // trunc(目标价)
}

/// 单品策略: 折扣百分比 + 优先级 + 排序索引
///
/// # 规则
/// - discount = round((base - target) / base * 100, 2)
/// - 基础价缺失或非正 → discount = 0（不触发除零）
/// - priority = trunc(discount * 10)，最低为 1：折扣非正时规则仍会写入，
///   由调用方以 notice 标记"未实际生效"
/// - sort_index = trunc(target)
pub fn direct_pricing(base_price: Decimal, target_price: Decimal) -> DirectPricing {
    let discount_percent = if base_price > Decimal::ZERO {
        ((base_price - target_price) / base_price * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    };

    let priority = (discount_percent * Decimal::TEN)
        .trunc()
        .to_i32()
        .unwrap_or(0)
        .max(1);

    DirectPricing {
        discount_percent,
        priority,
        sort_index: target_price.trunc().to_i32().unwrap_or(0),
    }
}

// ==========================================
// 分组/向下取整策略 (Floor Policy)
// ==========================================
/// 整数折扣百分比，定点十进制逐级截断后向下取整
///
/// # 规则
/// - 差值截断 2 位 → 除法截断 4 位 → ×100 截断 2 位 → floor
/// - 向下取整宁可少折不多折（199.99/150 → 24 而非 25）
/// - 基础价缺失或非正 → 0
pub fn floor_discount_percent(base_price: Decimal, target_price: Decimal) -> i64 {
    if base_price <= Decimal::ZERO {
        return 0;
    }

    let diff = (base_price - target_price).trunc_with_scale(2);
    let ratio = (diff / base_price).trunc_with_scale(4);
    let percent = (ratio * Decimal::ONE_HUNDRED).trunc_with_scale(2);
    percent.floor().to_i64().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_direct_pricing_basic() {
        // base 200, target 150 → 25.00%, priority 250, sort 150
        let pricing = direct_pricing(dec("200"), dec("150"));
        assert_eq!(pricing.discount_percent, dec("25.00"));
        assert_eq!(pricing.priority, 250);
        assert_eq!(pricing.sort_index, 150);
    }

    #[test]
    fn test_direct_pricing_rounds_half_away_from_zero() {
        // (300 - 250.15) / 300 * 100 = 16.616666... → 16.62
        let pricing = direct_pricing(dec("300"), dec("250.15"));
        assert_eq!(pricing.discount_percent, dec("16.62"));
        assert_eq!(pricing.priority, 166);
    }

    #[test]
    fn test_direct_pricing_zero_base_price() {
        let pricing = direct_pricing(Decimal::ZERO, dec("150"));
        assert_eq!(pricing.discount_percent, Decimal::ZERO);
        assert_eq!(pricing.priority, 1);
    }

    #[test]
    fn test_direct_pricing_negative_discount_clamped_priority() {
        // 目标价高于基础价 → 折扣为负，优先级仍为 1
        let pricing = direct_pricing(dec("100"), dec("120"));
        assert_eq!(pricing.discount_percent, dec("-20.00"));
        assert_eq!(pricing.priority, 1);
        assert_eq!(pricing.sort_index, 120);
    }

    #[test]
    fn test_direct_pricing_fractional_sort_index_truncates() {
        let pricing = direct_pricing(dec("200"), dec("149.99"));
        assert_eq!(pricing.sort_index, 149);
    }

    #[test]
    fn test_floor_discount_rounds_down_at_boundary() {
        // (199.99 - 150) / 199.99 * 100 ≈ 24.996 → 24，不得进到 25
        assert_eq!(floor_discount_percent(dec("199.99"), dec("150")), 24);
    }

    #[test]
    fn test_floor_discount_exact_quarter() {
        assert_eq!(floor_discount_percent(dec("200"), dec("150")), 25);
    }

    #[test]
    fn test_floor_discount_zero_base_price() {
        assert_eq!(floor_discount_percent(Decimal::ZERO, dec("150")), 0);
    }

    #[test]
    fn test_floor_discount_non_positive() {
        // 目标价等于/高于基础价 → 折扣 ≤ 0
        assert_eq!(floor_discount_percent(dec("100"), dec("100")), 0);
        assert!(floor_discount_percent(dec("100"), dec("130")) < 0);
    }

    #[test]
    fn test_floor_discount_fixed_point_chain() {
        // 差值先截断 2 位: (100.555 - 50) → 50.55; 50.55/100.555 = 0.50271... → 0.5027
        // 0.5027 * 100 = 50.27 → floor 50
        assert_eq!(floor_discount_percent(dec("100.555"), dec("50")), 50);
    }

    #[test]
    fn test_base_price_table_missing_or_non_positive_is_zero() {
        let mut prices = HashMap::new();
        prices.insert(1_i64, dec("100"));
        prices.insert(2_i64, dec("-5"));
        let table = BasePriceTable { prices };

        assert_eq!(table.base_price(1), dec("100"));
        assert_eq!(table.base_price(2), Decimal::ZERO);
        assert_eq!(table.base_price(99), Decimal::ZERO);
    }
}
