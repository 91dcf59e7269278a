// ==========================================
// 折扣规则同步系统 - 单品对账变体
// ==========================================
// 职责: 一品一规则的增/改/删集合计算与执行
// 流程: 列举现有规则 → 批量解析货号 → 逐条建/更 → 删除失效
// 错误策略: 单条记录的存储失败只记录诊断，不中止运行
// ==========================================

use crate::domain::record::DiscountRecord;
use crate::domain::report::{weight, ReportCollector, ReportKind};
use crate::domain::rule::RuleSpec;
use crate::engine::pricing::{direct_pricing, BasePriceTable};
use crate::engine::rule_naming::{direct_rule_name, DIRECT_RULE_PREFIX};
use crate::engine::SyncStats;
use crate::repository::error::StoreResult;
use crate::repository::price_lookup::PriceLookup;
use crate::repository::product_catalog::ProductCatalog;
use crate::repository::rule_store::RuleStore;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

// ==========================================
// DirectRuleSync - 单品对账器
// ==========================================
pub struct DirectRuleSync<'a, R, C, P>
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

impl<'a, R, C, P> DirectRuleSync<'a, R, C, P>
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

    /// 对过滤后的记录执行单品对账
    ///
    /// # 返回
    /// - Ok(SyncStats): 运行统计
    /// - Err: 列举/解析/价格批量查询失败（致命）
    #[instrument(skip(self, records, report), fields(records = records.len()))]
    pub async fn synchronize(
        &self,
        records: &[DiscountRecord],
        report: &mut ReportCollector,
    ) -> StoreResult<SyncStats> {
        let mut stats = SyncStats {
            input_records: records.len(),
            ..SyncStats::default()
        };

        // === 步骤 1: 列举现有规则（名称 → ID）===
        let existing = self
            .rule_store
            .list_by_name_prefix(self.site_id, DIRECT_RULE_PREFIX)
            .await?;
        let existing_by_name: HashMap<&str, i64> = existing
            .iter()
            .map(|handle| (handle.name.as_str(), handle.id))
            .collect();
        debug!(existing = existing.len(), "现有规则列举完成");

        // === 步骤 2: 批量解析货号 + 基础价快照 ===
        let skus: Vec<String> = records
            .iter()
            .map(|record| record.sku.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let id_map = self.catalog.resolve_ids(&skus).await?;
        let product_ids: Vec<i64> = id_map.values().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let prices = BasePriceTable::fetch(self.price_lookup, &product_ids).await?;

        // === 步骤 3: 逐条创建/更新 ===
        let mut wanted: HashSet<String> = HashSet::new();
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

            let pricing = direct_pricing(prices.base_price(product_id), record.target_price);
            let rule_name = direct_rule_name(&record.sku, product_id);
            wanted.insert(rule_name.clone());

            if pricing.discount_percent <= Decimal::ZERO {
                report.push(
                    ReportKind::Notice,
                    weight::INERT_DISCOUNT,
                    format!(
                        "折扣已添加/更新但未生效：折扣为零或负值: {}%",
                        pricing.discount_percent
                    ),
                    Some(&record.sku),
                    Some(record.row_index),
                );
                stats.inert_discounts += 1;
            }

            let spec = RuleSpec::direct(
                rule_name.clone(),
                product_id,
                record.target_price,
                pricing.priority,
                pricing.sort_index,
                record.active_from,
                record.active_to,
            );

            match existing_by_name.get(rule_name.as_str()) {
                // 新规则 → 创建
                None => match self.rule_store.create(self.site_id, &spec).await {
                    Ok(rule_id) => {
                        report.push(
                            ReportKind::Add,
                            weight::ADDED,
                            format!(
                                "折扣已添加. 规则 ID: {}; productId: {}; priority: {}; 折扣: {}%",
                                rule_id, product_id, pricing.priority, pricing.discount_percent
                            ),
                            Some(&record.sku),
                            Some(record.row_index),
                        );
                        stats.rules_added += 1;
                    }
                    Err(e) => {
                        warn!(rule_name = %rule_name, error = %e, "规则创建失败");
                        report.push(
                            ReportKind::Error,
                            weight::ADD_FAILED,
                            "错误：折扣未添加",
                            Some(&record.sku),
                            Some(record.row_index),
                        );
                        stats.store_failures += 1;
                    }
                },
                // 已有规则 → 原地更新（保持规则 ID）
                Some(&rule_id) => match self.rule_store.update(rule_id, &spec).await {
                    Ok(()) => {
                        report.push(
                            ReportKind::Update,
                            weight::UPDATED,
                            format!(
                                "折扣已更新. 规则 ID: {}; priority: {}; 折扣: {}%",
                                rule_id, pricing.priority, pricing.discount_percent
                            ),
                            Some(&record.sku),
                            Some(record.row_index),
                        );
                        stats.rules_updated += 1;
                    }
                    Err(e) => {
                        warn!(rule_id, error = %e, "规则更新失败");
                        report.push(
                            ReportKind::Error,
                            weight::UPDATE_FAILED,
                            format!("错误：规则 ID: {}; 折扣未更新", rule_id),
                            Some(&record.sku),
                            Some(record.row_index),
                        );
                        stats.store_failures += 1;
                    }
                },
            }
        }

        // === 步骤 4: 删除不再需要的规则 ===
        for handle in &existing {
            if wanted.contains(&handle.name) {
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

        // === 步骤 5: 目录缓存失效 ===
        self.catalog.invalidate_cache().await?;

        info!(
            added = stats.rules_added,
            updated = stats.rules_updated,
            deleted = stats.rules_deleted,
            not_found = stats.products_not_found,
            "单品对账完成"
        );
        Ok(stats)
    }
}
