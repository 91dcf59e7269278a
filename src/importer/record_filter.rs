// ==========================================
// 折扣规则同步系统 - 记录过滤器
// ==========================================
// 职责: 剔除已过期记录 + 同货号重复按最低价收敛
// 顺序: 过滤后恢复源文件行序，保证下游处理确定性
// ==========================================

use crate::domain::record::DiscountRecord;
use chrono::NaiveDateTime;
use std::collections::HashSet;

pub struct RecordFilter;

impl RecordFilter {
    /// 过滤解析后的记录
    ///
    /// # 步骤
    /// 1. 剔除 active_to 严格早于 now 的记录（无 active_to 的保留）
    /// 2. 同货号重复仅保留目标价最低的一条，价格相同保留行号最小的；
    ///    重复剔除不产生诊断（最低可得价胜出）
    /// 3. 恢复源文件行序
    pub fn apply(
        &self,
        records: Vec<DiscountRecord>,
        now: NaiveDateTime,
    ) -> Vec<DiscountRecord> {
        let mut kept: Vec<DiscountRecord> = records
            .into_iter()
            .filter(|record| !record.is_expired(now))
            .collect();

        // 价格升序 + 行号升序，首次出现的货号即最低价
        kept.sort_by(|a, b| {
            a.target_price
                .cmp(&b.target_price)
                .then(a.row_index.cmp(&b.row_index))
        });
        let mut seen = HashSet::new();
        kept.retain(|record| seen.insert(record.sku.clone()));

        kept.sort_by_key(|record| record.row_index);
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn record(sku: &str, price: i64, row_index: usize) -> DiscountRecord {
        DiscountRecord {
            sku: sku.to_string(),
            target_price: Decimal::from(price),
            active_from: None,
            active_to: None,
            category_id: None,
            row_index,
        }
    }

    #[test]
    fn test_duplicate_sku_keeps_lowest_price() {
        let records = vec![record("X1", 100, 2), record("X1", 90, 3)];
        let filtered = RecordFilter.apply(records, now());

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].target_price, Decimal::from(90));
        assert_eq!(filtered[0].row_index, 3);
    }

    #[test]
    fn test_duplicate_price_tie_keeps_first_row() {
        let records = vec![record("X1", 90, 4), record("X1", 90, 2)];
        let filtered = RecordFilter.apply(records, now());

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].row_index, 2);
    }

    #[test]
    fn test_expired_records_dropped() {
        let past = now() - chrono::Duration::days(1);
        let future = now() + chrono::Duration::days(1);

        let mut expired = record("OLD", 50, 2);
        expired.active_to = Some(past);
        let mut active = record("NEW", 60, 3);
        active.active_to = Some(future);
        let open_ended = record("OPEN", 70, 4);

        let filtered = RecordFilter.apply(vec![expired, active, open_ended], now());

        let skus: Vec<&str> = filtered.iter().map(|r| r.sku.as_str()).collect();
        assert_eq!(skus, vec!["NEW", "OPEN"]);
    }

    #[test]
    fn test_original_row_order_restored() {
        let records = vec![
            record("C", 300, 5),
            record("A", 100, 2),
            record("B", 200, 3),
        ];
        let filtered = RecordFilter.apply(records, now());

        let rows: Vec<usize> = filtered.iter().map(|r| r.row_index).collect();
        assert_eq!(rows, vec![2, 3, 5]);
    }
}
