// ==========================================
// 折扣规则同步系统 - 规则命名
// ==========================================
// 红线: 名称是唯一对账键，模板一经上线不可变更；
//       外部改名会破坏幂等性
// ==========================================

use chrono::NaiveDateTime;

/// 单品变体规则名前缀（命名空间，隔离非本系统规则）
pub const DIRECT_RULE_PREFIX: &str = "$AUTO_EXCEL";

/// 分组变体规则名前缀
pub const GROUPED_RULE_PREFIX: &str = "$AUTO_EXCEL_FLOOR";

/// 分组规则名中活动窗口的格式（两位年）
const GROUP_WINDOW_FORMAT: &str = "%d.%m.%y %H:%M:%S";

/// 单品规则名: `$AUTO_EXCEL{<货号>}[<商品ID>]`
pub fn direct_rule_name(sku: &str, product_id: i64) -> String {
    format!("{}{{{}}}[{}]", DIRECT_RULE_PREFIX, sku, product_id)
}

/// 分组规则名: `$AUTO_EXCEL_FLOOR <折扣>% <开始> - <结束>`
///
/// 名称同时充当分组键条件值，完整编码了 (折扣, 窗口) 组合
pub fn grouped_rule_name(
    discount_percent: i64,
    active_from: NaiveDateTime,
    active_to: NaiveDateTime,
) -> String {
    format!(
        "{} {}% {} - {}",
        GROUPED_RULE_PREFIX,
        discount_percent,
        active_from.format(GROUP_WINDOW_FORMAT),
        active_to.format(GROUP_WINDOW_FORMAT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_direct_rule_name_format() {
        assert_eq!(direct_rule_name("SKU001", 42), "$AUTO_EXCEL{SKU001}[42]");
        assert!(direct_rule_name("SKU001", 42).starts_with(DIRECT_RULE_PREFIX));
    }

    #[test]
    fn test_grouped_rule_name_format() {
        let from = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let to = NaiveDate::from_ymd_opt(2099, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(
            grouped_rule_name(24, from, to),
            "$AUTO_EXCEL_FLOOR 24% 01.06.25 00:00:00 - 31.12.99 23:59:59"
        );
    }

    #[test]
    fn test_same_bucket_key_same_name() {
        let from = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(grouped_rule_name(15, from, to), grouped_rule_name(15, from, to));
    }
}
