// ==========================================
// 折扣规则同步系统 - 同步报告
// ==========================================
// 职责: 累积结构化诊断条目，排序后渲染为文本
// 排序: (sort_weight, row_index) 升序
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 报告条目类别 (Report Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportKind {
    Validation, // 输入行格式问题，跳过字段或整行后继续
    NotFound,   // 货号无对应商品，记录被跳过
    Notice,     // 信息性：无效益折扣或运行摘要
    Add,        // 规则创建成功
    Update,     // 规则更新成功（分组变体为无变更确认）
    Delete,     // 规则删除成功
    Error,      // 规则存储调用失败，不中止运行
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Validation => "validation",
            ReportKind::NotFound => "notFound",
            ReportKind::Notice => "notice",
            ReportKind::Add => "add",
            ReportKind::Update => "update",
            ReportKind::Delete => "delete",
            ReportKind::Error => "error",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 条目排序权重
// ==========================================
// 数值越小越靠前；同权重按行号升序
pub mod weight {
    pub const SUMMARY: i32 = 10;          // 运行摘要
    pub const PRODUCT_NOT_FOUND: i32 = 110;
    pub const DATE_FORMAT: i32 = 112;     // 日期格式无效
    pub const PRICE_INVALID: i32 = 113;   // 价格/货号无效，整行跳过
    pub const CATEGORY_FORMAT: i32 = 114; // 分类标识无效
    pub const ADD_FAILED: i32 = 120;
    pub const UPDATE_FAILED: i32 = 130;
    pub const DELETE_FAILED: i32 = 140;
    pub const INERT_DISCOUNT: i32 = 200;  // 折扣为零或负值
    pub const ADDED: i32 = 700;
    pub const UPDATED: i32 = 800;
    pub const DELETED: i32 = 900;
}

// ==========================================
// ReportEntry - 报告条目
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub kind: ReportKind,
    pub text: String,
    pub sku: Option<String>,
    pub row_index: Option<usize>,
    pub sort_weight: i32,
}

impl ReportEntry {
    /// 渲染单行: `[kind] 行 <n>; <text>; SKU "<sku>"`
    /// 行号缺失或为 0 时省略；SKU 缺失时省略
    fn render_line(&self) -> String {
        let mut line = format!("[{}] ", self.kind);
        if let Some(row_index) = self.row_index {
            if row_index > 0 {
                line.push_str(&format!("行 {}; ", row_index));
            }
        }
        line.push_str(&self.text);
        if let Some(sku) = &self.sku {
            line.push_str(&format!("; SKU \"{}\"", sku));
        }
        line
    }
}

// ==========================================
// ReportCollector - 报告收集器
// ==========================================
#[derive(Debug, Default)]
pub struct ReportCollector {
    entries: Vec<ReportEntry>,
}

impl ReportCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条报告条目
    pub fn push(
        &mut self,
        kind: ReportKind,
        sort_weight: i32,
        text: impl Into<String>,
        sku: Option<&str>,
        row_index: Option<usize>,
    ) {
        self.entries.push(ReportEntry {
            kind,
            text: text.into(),
            sku: sku.map(str::to_string),
            row_index,
            sort_weight,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// 指定类别的条目数
    pub fn count_of(&self, kind: ReportKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// 排序后的条目副本（(权重, 行号) 升序）
    pub fn sorted_entries(&self) -> Vec<ReportEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|e| (e.sort_weight, e.row_index.unwrap_or(0)));
        sorted
    }

    /// 渲染完整报告文本
    ///
    /// 结构: 标题行 → 按类别计数摘要 → 空行 → 排序后的条目
    pub fn render(&self, generated_at: NaiveDateTime) -> String {
        let sorted = self.sorted_entries();

        // 类别计数，保持排序后首次出现的顺序
        let mut counts: Vec<(ReportKind, usize)> = Vec::new();
        for entry in &sorted {
            match counts.iter_mut().find(|(kind, _)| *kind == entry.kind) {
                Some((_, count)) => *count += 1,
                None => counts.push((entry.kind, 1)),
            }
        }

        let mut lines = Vec::with_capacity(sorted.len() + counts.len() + 2);
        lines.push(format!("同步报告 {}", generated_at.format("%Y.%m.%d %H:%M:%S")));
        for (kind, count) in &counts {
            lines.push(format!("[{}]: {}", kind, count));
        }
        lines.push(String::new());
        for entry in &sorted {
            lines.push(entry.render_line());
        }
        lines.join("\n")
    }
}
