// ==========================================
// 折扣规则同步系统 - 同步任务控制器
// ==========================================
// 流程: 文件守卫 → 读取 → 解析 → 过滤 → 对账 → 记录时间戳
// 守卫: 仅当源文件自上次同步后有变化时才运行
// 报告: 运行中止时尽力输出已累计的诊断
// ==========================================

use crate::domain::report::ReportCollector;
use crate::engine::direct_sync::DirectRuleSync;
use crate::engine::grouped_sync::GroupedRuleSync;
use crate::engine::SyncStats;
use crate::exchange::error::{ExchangeError, ExchangeResult};
use crate::importer::record_filter::RecordFilter;
use crate::importer::record_parser::{ColumnMapping, RecordParser};
use crate::importer::table_reader::{ReadParams, TableReader};
use crate::repository::price_lookup::PriceLookup;
use crate::repository::product_catalog::ProductCatalog;
use crate::repository::rule_store::RuleStore;
use crate::repository::sync_state::SyncStateRepository;
use chrono::{Local, NaiveDateTime};
use std::fmt;
use std::path::Path;
use std::time::UNIX_EPOCH;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// SyncVariant - 对账变体
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncVariant {
    Direct,  // 一品一规则（一口价）
    Grouped, // 一桶一规则（整数百分比 + 分组键）
}

impl fmt::Display for SyncVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncVariant::Direct => write!(f, "DIRECT"),
            SyncVariant::Grouped => write!(f, "GROUPED"),
        }
    }
}

// ==========================================
// ExchangeConfig - 交换任务配置
// ==========================================
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub site_id: String,              // 站点标识
    pub state_key: String,            // 同步状态键（文件时间戳）
    pub read_params: ReadParams,      // 读取窗口（工作表/行列范围）
    pub column_mapping: ColumnMapping, // 列字母 → 字段映射
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            site_id: "s1".to_string(),
            state_key: "discounts_excel".to_string(),
            read_params: ReadParams::default(),
            column_mapping: ColumnMapping::default(),
        }
    }
}

// ==========================================
// SyncOutcome - 单次运行产出
// ==========================================
#[derive(Debug)]
pub struct SyncOutcome {
    pub run_id: String,      // 运行标识（UUID）
    pub stats: SyncStats,    // 运行统计
    pub report_text: String, // 渲染后的同步报告
}

// ==========================================
// DiscountExchange - 同步任务控制器
// ==========================================
pub struct DiscountExchange<R, C, P, S, T>
where
    R: RuleStore,
    C: ProductCatalog,
    P: PriceLookup,
    S: SyncStateRepository,
    T: TableReader,
{
    rule_store: R,
    catalog: C,
    price_lookup: P,
    state_repo: S,
    table_reader: T,
    config: ExchangeConfig,
}

impl<R, C, P, S, T> DiscountExchange<R, C, P, S, T>
where
    R: RuleStore,
    C: ProductCatalog,
    P: PriceLookup,
    S: SyncStateRepository,
    T: TableReader,
{
    pub fn new(
        rule_store: R,
        catalog: C,
        price_lookup: P,
        state_repo: S,
        table_reader: T,
        config: ExchangeConfig,
    ) -> Self {
        Self {
            rule_store,
            catalog,
            price_lookup,
            state_repo,
            table_reader,
            config,
        }
    }

    /// 执行一次同步运行
    ///
    /// # 参数
    /// - file_path: 价格表文件路径
    /// - variant: 对账变体
    ///
    /// # 返回
    /// - Ok(SyncOutcome): 运行统计 + 报告文本
    /// - Err(SourceUnchanged): 文件无变化，本次为空跑
    /// - Err: 文件缺失或协作方致命错误
    #[instrument(skip(self, file_path), fields(variant = %variant))]
    pub async fn execute(
        &self,
        file_path: &Path,
        variant: SyncVariant,
    ) -> ExchangeResult<SyncOutcome> {
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = %run_id, file = %file_path.display(), "开始折扣规则同步");

        // === 文件存在性与变更守卫 ===
        if !file_path.exists() {
            return Err(ExchangeError::ImportFileMissing(
                file_path.display().to_string(),
            ));
        }
        let source_stamp = file_mtime_stamp(file_path)?;
        let last_stamp = self.state_repo.last_source_stamp(&self.config.state_key)?;
        if last_stamp == Some(source_stamp) {
            info!(stamp = source_stamp, "源文件无变化，跳过本次运行");
            return Err(ExchangeError::SourceUnchanged);
        }

        let now = Local::now().naive_local();
        let mut report = ReportCollector::new();
        let result = self.run_pipeline(file_path, variant, now, &mut report).await;

        match result {
            Ok(stats) => {
                // 仅成功完成时记录时间戳；失败的运行下次会重试
                self.state_repo
                    .set_last_source_stamp(&self.config.state_key, source_stamp)?;
                info!(
                    run_id = %run_id,
                    added = stats.rules_added,
                    updated = stats.rules_updated,
                    deleted = stats.rules_deleted,
                    "同步完成"
                );
                Ok(SyncOutcome {
                    run_id,
                    stats,
                    report_text: report.render(now),
                })
            }
            Err(e) => {
                // 尽力输出已累计的部分报告
                if !report.is_empty() {
                    warn!(run_id = %run_id, report = %report.render(now), "同步中止，输出部分报告");
                }
                Err(e)
            }
        }
    }

    async fn run_pipeline(
        &self,
        file_path: &Path,
        variant: SyncVariant,
        now: NaiveDateTime,
        report: &mut ReportCollector,
    ) -> ExchangeResult<SyncStats> {
        // === 步骤 1: 读取价格表 ===
        let rows = self.table_reader.read(file_path, &self.config.read_params)?;
        info!(rows = rows.len(), "价格表读取完成");

        // === 步骤 2: 解析与校验 ===
        let parser = RecordParser::new(self.config.column_mapping.clone());
        let records = parser.parse(&rows, report);
        debug!(records = records.len(), "记录解析完成");

        // === 步骤 3: 过滤（过期剔除 + 重复收敛）===
        let records = RecordFilter.apply(records, now);
        if let Ok(snapshot) = serde_json::to_string(&records) {
            debug!(records = %snapshot, "过滤后记录快照");
        }

        // === 步骤 4: 对账 ===
        let stats = match variant {
            SyncVariant::Direct => {
                DirectRuleSync::new(
                    &self.rule_store,
                    &self.catalog,
                    &self.price_lookup,
                    &self.config.site_id,
                )
                .synchronize(&records, report)
                .await?
            }
            SyncVariant::Grouped => {
                GroupedRuleSync::new(
                    &self.rule_store,
                    &self.catalog,
                    &self.price_lookup,
                    &self.config.site_id,
                )
                .synchronize(&records, now, report)
                .await?
            }
        };

        Ok(stats)
    }
}

/// 源文件修改时间戳（Unix 秒）
fn file_mtime_stamp(file_path: &Path) -> ExchangeResult<i64> {
    let modified = std::fs::metadata(file_path)
        .and_then(|meta| meta.modified())
        .map_err(|e| ExchangeError::FileStat(e.to_string()))?;
    let stamp = modified
        .duration_since(UNIX_EPOCH)
        .map_err(|e| ExchangeError::FileStat(e.to_string()))?;
    Ok(stamp.as_secs() as i64)
}
