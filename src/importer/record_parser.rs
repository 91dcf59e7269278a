// ==========================================
// 折扣规则同步系统 - 记录解析器
// ==========================================
// 职责: 列字母 → 命名字段投影 + 类型转换 + 行级校验
// 产物: DiscountRecord 列表 + validation 诊断
// ==========================================

use crate::domain::record::DiscountRecord;
use crate::domain::report::{weight, ReportCollector, ReportKind};
use crate::importer::table_reader::RawRow;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

/// 活动时间单元格格式（日/月/两位年 时:分）
pub const ACTIVE_DATE_FORMAT: &str = "%d/%m/%y %H:%M";

// ==========================================
// ImportField - 导入字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportField {
    Sku,
    TargetPrice,
    ActiveFrom,
    ActiveTo,
    CategoryId,
}

// ==========================================
// ColumnMapping - 列字母与字段的对应关系
// ==========================================
// 未映射的列被忽略
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    columns: HashMap<String, ImportField>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        let mut columns = HashMap::new();
        columns.insert("A".to_string(), ImportField::Sku);
        columns.insert("B".to_string(), ImportField::TargetPrice);
        columns.insert("C".to_string(), ImportField::ActiveFrom);
        columns.insert("D".to_string(), ImportField::ActiveTo);
        columns.insert("E".to_string(), ImportField::CategoryId);
        Self { columns }
    }
}

impl ColumnMapping {
    pub fn new(columns: HashMap<String, ImportField>) -> Self {
        Self { columns }
    }

    /// 在一行内查找某字段对应的单元格文本（缺失为空串）
    fn cell<'a>(&self, row: &'a RawRow, field: ImportField) -> &'a str {
        self.columns
            .iter()
            .find(|(_, f)| **f == field)
            .map(|(column, _)| row.cell(column))
            .unwrap_or("")
    }
}

// ==========================================
// RecordParser - 记录解析器
// ==========================================
pub struct RecordParser {
    mapping: ColumnMapping,
}

impl RecordParser {
    pub fn new(mapping: ColumnMapping) -> Self {
        Self { mapping }
    }

    /// 解析原始行为折扣记录，校验失败的行写入报告并剔除
    ///
    /// # 校验规则
    /// - 货号为空 或 价格为空/非数字/非正数 → 整行剔除（validation 113）
    /// - 日期格式无效 → 按空值继续（validation 112）
    /// - 分类标识非纯数字 → 按空值继续（validation 114）
    pub fn parse(&self, rows: &[RawRow], report: &mut ReportCollector) -> Vec<DiscountRecord> {
        let mut records = Vec::with_capacity(rows.len());

        for row in rows {
            let sku = self.mapping.cell(row, ImportField::Sku).trim();
            let price_raw = self.mapping.cell(row, ImportField::TargetPrice).trim();

            if sku.is_empty() {
                report.push(
                    ReportKind::Validation,
                    weight::PRICE_INVALID,
                    "货号为空；该行处理已跳过",
                    None,
                    Some(row.index),
                );
                continue;
            }

            let target_price = parse_price(price_raw);
            let Some(target_price) = target_price else {
                report.push(
                    ReportKind::Validation,
                    weight::PRICE_INVALID,
                    format!("价格为空或无效: \"{}\"；该行处理已跳过", price_raw),
                    Some(sku),
                    Some(row.index),
                );
                continue;
            };

            let from_raw = self.mapping.cell(row, ImportField::ActiveFrom).trim();
            let to_raw = self.mapping.cell(row, ImportField::ActiveTo).trim();
            let active_from = parse_active_date(from_raw);
            let active_to = parse_active_date(to_raw);
            let from_failed = !from_raw.is_empty() && active_from.is_none();
            let to_failed = !to_raw.is_empty() && active_to.is_none();
            if from_failed || to_failed {
                report.push(
                    ReportKind::Validation,
                    weight::DATE_FORMAT,
                    format!(
                        "日期格式无效 \"{}\" - \"{}\"；已按空值继续处理",
                        from_raw, to_raw
                    ),
                    Some(sku),
                    Some(row.index),
                );
            }

            let category_raw = self.mapping.cell(row, ImportField::CategoryId).trim();
            let category_id = parse_category_id(category_raw);
            if !category_raw.is_empty() && category_id.is_none() {
                report.push(
                    ReportKind::Validation,
                    weight::CATEGORY_FORMAT,
                    format!(
                        "分类标识格式无效 \"{}\"；已按空值继续处理",
                        category_raw
                    ),
                    Some(sku),
                    Some(row.index),
                );
            }

            records.push(DiscountRecord {
                sku: sku.to_string(),
                target_price,
                active_from,
                active_to,
                category_id,
                row_index: row.index,
            });
        }

        records
    }
}

/// 解析目标价；空/非数字/非正数均视为无效
fn parse_price(raw: &str) -> Option<Decimal> {
    let price = Decimal::from_str(raw).ok()?;
    if price > Decimal::ZERO {
        Some(price)
    } else {
        None
    }
}

/// 解析活动时间；空串与格式错误均返回 None
fn parse_active_date(raw: &str) -> Option<NaiveDateTime> {
    if raw.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, ACTIVE_DATE_FORMAT).ok()
}

/// 解析分类标识；仅接受纯数字
fn parse_category_id(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>().ok()
}
