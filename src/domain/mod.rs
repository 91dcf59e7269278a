// ==========================================
// 折扣规则同步系统 - 领域层
// ==========================================
// 职责: 导入记录、规则实体、同步报告
// ==========================================

pub mod record;
pub mod report;
pub mod rule;

pub use record::DiscountRecord;
pub use report::{weight, ReportCollector, ReportEntry, ReportKind};
pub use rule::{DiscountUnit, RuleCondition, RuleHandle, RuleSpec, ALL_USER_GROUP};
