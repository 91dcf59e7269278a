// ==========================================
// 折扣规则同步系统 - 分组对账变体
// ==========================================
// 职责: 按 (整数折扣, 活动窗口) 分桶，一桶一规则；
//       商品通过分组键属性挂接到规则
// 流程: 解析货号 → 分桶并打标 → 清理失效标记
//       → 删除失效规则 → 创建缺失规则 → 摘要
// ==========================================

use crate::domain::record::DiscountRecord;
use crate::domain::report::{weight, ReportCollector, ReportKind};
use crate::domain::rule::RuleSpec;
use crate::engine::pricing::{floor_discount_percent, BasePriceTable};
use crate::engine::rule_naming::{grouped_rule_name, GROUPED_RULE_PREFIX};
use crate::engine::SyncStats;
use crate::repository::error::StoreResult;
use crate::repository::price_lookup::PriceLookup;
use crate::repository::product_catalog::ProductCatalog;
use crate::repository::rule_store::RuleStore;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

// ==========================================
// GroupBucket - 折扣分桶（运行内瞬态）
// ==========================================
// 键 = (整数折扣, 开始, 结束)；名称即分组键条件值
#[derive(Debug, Clone)]
pub struct GroupBucket {
    pub name: String,
    pub discount_percent: i64,
    pub active_from: NaiveDateTime,
    pub active_to: NaiveDateTime,
    pub members: Vec<GroupMember>,
}

#[derive(Debug, Clone)]
pub struct GroupMember {
    pub product_id: i64,
    pub sku: String,
}

/// 缺省活动开始时间：当天零点
/// 分组键内嵌活动窗口，因此窗口必须具体化
fn start_of_day(now: NaiveDateTime) -> NaiveDateTime {
    now.date().and_hms_opt(0, 0, 0).unwrap_or(now)
}

/// 缺省活动结束时间：远期哨兵 2099-12-31 23:59:59
fn far_future_end() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2099, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .unwrap_or(NaiveDateTime::MAX)
}

// ==========================================
// GroupedRuleSync - 分组对账器
// ==========================================
pub struct GroupedRuleSync<'a, R, C, P>
where
    R: RuleStore,
    C: ProductCatalog,
    P: PriceLookup,
{
    rule_store: &'a R,
    catalog: &'a C,
    price_lookup: &'a P,
    site_id: &'a str,
}

impl<'a, R, C, P> GroupedRuleSync<'a, R, C, P>
where
    R: RuleStore,
    C: ProductCatalog,
    P: PriceLookup,
{
    pub fn new(rule_store: &'a R, catalog: &'a C, price_lookup: &'a P, site_id: &'a str) -> Self {
        Self {
            rule_store,
            catalog,
            price_lookup,
            site_id,
        }
    }

    /// 对过滤后的记录执行分组对账
    ///
    /// # 返回
    /// - Ok(SyncStats): 运行统计
    /// - Err: 列举/解析/价格批量查询失败（致命）
    #[instrument(skip(self, records, report), fields(records = records.len()))]
    pub async fn synchronize(
        &self,
        records: &[DiscountRecord],
        now: NaiveDateTime,
        report: &mut ReportCollector,
    ) -> StoreResult<SyncStats> {
        let mut stats = SyncStats {
            input_records: records.len(),
            ..SyncStats::default()
        };

        // === 步骤 1: 批量解析货号 + 基础价快照 ===
        let skus: Vec<String> = records
            .iter()
            .map(|record| record.sku.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let id_map = self.catalog.resolve_ids(&skus).await?;
        let product_ids: Vec<i64> = id_map.values().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let prices = BasePriceTable::fetch(self.price_lookup, &product_ids).await?;

        let default_from = start_of_day(now);
        let default_to = far_future_end();

        // === 步骤 2: 分桶并即时写入商品分组键 ===
        // BTreeMap 键 (折扣, 开始, 结束) 保证桶按折扣升序输出
        let mut buckets: BTreeMap<(i64, NaiveDateTime, NaiveDateTime), GroupBucket> =
            BTreeMap::new();
        let mut touched: HashSet<i64> = HashSet::new();

        for record in records {
            let Some(&product_id) = id_map.get(&record.sku) else {
                report.push(
                    ReportKind::NotFound,
                    weight::PRODUCT_NOT_FOUND,
                    "错误：商品未找到",
                    Some(&record.sku),
                    Some(record.row_index),
                );
                stats.products_not_found += 1;
                continue;
            };

            let active_from = record.active_from.unwrap_or(default_from);
            let active_to = record.active_to.unwrap_or(default_to);
            let base_price = prices.base_price(product_id);
            let discount = floor_discount_percent(base_price, record.target_price);

            if discount <= 0 {
                // 折扣无效益的商品不入桶；其分组键由步骤 3 的清理覆盖
                report.push(
                    ReportKind::Notice,
                    weight::INERT_DISCOUNT,
                    format!(
                        "折扣未应用：折扣为零或负值: {}%；原基础价: {}, 新价: {}",
                        discount, base_price, record.target_price
                    ),
                    Some(&record.sku),
                    Some(record.row_index),
                );
                stats.inert_discounts += 1;
                continue;
            }

            let name = grouped_rule_name(discount, active_from, active_to);
            buckets
                .entry((discount, active_from, active_to))
                .or_insert_with(|| GroupBucket {
                    name: name.clone(),
                    discount_percent: discount,
                    active_from,
                    active_to,
                    members: Vec::new(),
                })
                .members
                .push(GroupMember {
                    product_id,
                    sku: record.sku.clone(),
                });

            if let Err(e) = self.catalog.set_group_key(product_id, Some(&name)).await {
                warn!(product_id, error = %e, "分组键写入失败");
            }
            touched.insert(product_id);
        }
        debug!(buckets = buckets.len(), tagged = touched.len(), "分桶完成");

        // === 步骤 3: 清理未触达商品的失效分组键（幂等）===
        let all_product_ids = self.catalog.list_product_ids().await?;
        for product_id in all_product_ids {
            if touched.contains(&product_id) {
                continue;
            }
            if let Err(e) = self.catalog.set_group_key(product_id, None).await {
                warn!(product_id, error = %e, "分组键清理失败");
            }
        }

        // === 步骤 4: 与现有规则按名称求差 ===
        let existing = self
            .rule_store
            .list_by_name_prefix(self.site_id, GROUPED_RULE_PREFIX)
            .await?;
        let existing_by_name: HashMap<&str, i64> = existing
            .iter()
            .map(|handle| (handle.name.as_str(), handle.id))
            .collect();
        let new_names: HashSet<&str> = buckets
            .values()
            .map(|bucket| bucket.name.as_str())
            .collect();

        // 先删除失效规则
        for handle in &existing {
            if new_names.contains(handle.name.as_str()) {
                continue;
            }
            match self.rule_store.delete(handle.id).await {
                Ok(()) => {
                    report.push(
                        ReportKind::Delete,
                        weight::DELETED,
                        format!(
                            "折扣已删除. 规则 ID: {}; 规则名称: \"{}\"",
                            handle.id, handle.name
                        ),
                        None,
                        None,
                    );
                    stats.rules_deleted += 1;
                }
                Err(e) => {
                    warn!(rule_id = handle.id, error = %e, "规则删除失败");
                    report.push(
                        ReportKind::Error,
                        weight::DELETE_FAILED,
                        format!(
                            "错误：规则 ID: {}; 折扣未删除，规则名称: \"{}\"",
                            handle.id, handle.name
                        ),
                        None,
                        None,
                    );
                    stats.store_failures += 1;
                }
            }
        }

        // === 步骤 5: 创建缺失规则（折扣升序）===
        for bucket in buckets.values() {
            let members_text: String = bucket
                .members
                .iter()
                .map(|m| format!("productId_{}=>SKU_{}", m.product_id, m.sku))
                .collect::<Vec<_>>()
                .join(", ");

            match existing_by_name.get(bucket.name.as_str()) {
                None => {
                    let spec = RuleSpec::grouped(
                        bucket.name.clone(),
                        bucket.name.clone(),
                        bucket.discount_percent,
                        (bucket.discount_percent * 10) as i32,
                        bucket.active_from,
                        bucket.active_to,
                    );
                    match self.rule_store.create(self.site_id, &spec).await {
                        Ok(rule_id) => {
                            report.push(
                                ReportKind::Add,
                                weight::ADDED,
                                format!(
                                    "折扣已添加. 规则 ID: {}; 规则名称: \"{}\"; 折扣: {}%; 涉及商品: {}",
                                    rule_id, bucket.name, bucket.discount_percent, members_text
                                ),
                                None,
                                None,
                            );
                            stats.rules_added += 1;
                        }
                        Err(e) => {
                            warn!(rule_name = %bucket.name, error = %e, "规则创建失败");
                            report.push(
                                ReportKind::Error,
                                weight::ADD_FAILED,
                                format!(
                                    "错误：折扣未添加; 规则名称: \"{}\"; 涉及商品: {}",
                                    bucket.name, members_text
                                ),
                                None,
                                None,
                            );
                            stats.store_failures += 1;
                        }
                    }
                }
                // 名称已存在即内容一致：成员关系由商品分组键承载，无需改动字段
                Some(&rule_id) => {
                    report.push(
                        ReportKind::Update,
                        weight::UPDATED,
                        format!(
                            "折扣已存在. 规则 ID: {}; 规则名称: \"{}\"; 涉及商品: {}",
                            rule_id, bucket.name, members_text
                        ),
                        None,
                        None,
                    );
                    stats.rules_updated += 1;
                }
            }
        }

        // === 步骤 6: 运行摘要 ===
        report.push(
            ReportKind::Notice,
            weight::SUMMARY,
            format!("{} 条导入记录生成 {} 条规则", records.len(), buckets.len()),
            None,
            None,
        );

        // === 步骤 7: 目录缓存失效 ===
        self.catalog.invalidate_cache().await?;

        info!(
            buckets = buckets.len(),
            added = stats.rules_added,
            deleted = stats.rules_deleted,
            "分组对账完成"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_of_day() {
        let now = NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(14, 30, 45)
            .unwrap();
        let start = start_of_day(now);
        assert_eq!(start.time(), chrono::NaiveTime::MIN);
        assert_eq!(start.date(), now.date());
    }

    #[test]
    fn test_far_future_end_sentinel() {
        let end = far_future_end();
        assert_eq!(
            end,
            NaiveDate::from_ymd_opt(2099, 12, 31)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap()
        );
    }
}
