// ==========================================
// 折扣规则同步系统 - 交换层
// ==========================================
// 职责: 同步任务控制器（文件变更守卫 + 管道编排）
// ==========================================

pub mod discount_exchange;
pub mod error;

pub use discount_exchange::{DiscountExchange, ExchangeConfig, SyncOutcome, SyncVariant};
pub use error::{ExchangeError, ExchangeResult};
