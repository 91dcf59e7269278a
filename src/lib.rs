// ==========================================
// 折扣规则同步系统 - 核心库
// ==========================================
// 定位: 批量对账任务（价格表 → 购物车规则）
// 输入: 价格表文件（Excel/CSV）
// 输出: 规则存储的增/改/删 + 同步报告
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 表格读取/解析/过滤
pub mod importer;

// 引擎层 - 折扣计算与规则对账
pub mod engine;

// 仓储层 - 外部协作方契约
pub mod repository;

// 交换层 - 同步任务控制器
pub mod exchange;

// SQLite 连接基础设施
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================
pub use domain::record::DiscountRecord;
pub use domain::report::{ReportCollector, ReportEntry, ReportKind};
pub use domain::rule::{DiscountUnit, RuleCondition, RuleHandle, RuleSpec};
pub use engine::{DirectRuleSync, GroupedRuleSync, SyncStats};
pub use exchange::{DiscountExchange, ExchangeConfig, ExchangeError, SyncOutcome, SyncVariant};
pub use importer::{RecordFilter, RecordParser, TableReader};
pub use repository::{PriceLookup, ProductCatalog, RuleStore, StoreError, SyncStateRepository};
