// ==========================================
// 折扣规则同步系统 - 仓储层
// ==========================================
// 红线: 仓储不含业务逻辑
// 说明: 商品目录/价格/规则存储均为外部系统，这里只定义契约；
//       同步状态存储为本地 SQLite 实现
// ==========================================

pub mod error;
pub mod price_lookup;
pub mod product_catalog;
pub mod rule_store;
pub mod sync_state;

pub use error::{StoreError, StoreResult};
pub use price_lookup::PriceLookup;
pub use product_catalog::ProductCatalog;
pub use rule_store::RuleStore;
pub use sync_state::{SqliteSyncStateRepository, SyncStateRepository};
