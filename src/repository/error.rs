// ==========================================
// 折扣规则同步系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 外部存储边界错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    // ===== 商品目录错误 =====
    #[error("商品目录查询失败: {0}")]
    CatalogQuery(String),

    #[error("商品分组不存在: {0}")]
    ProductGroupMissing(String),

    #[error("分组键写入失败 (productId: {product_id}): {message}")]
    GroupKeyWrite { product_id: i64, message: String },

    #[error("目录缓存失效请求失败: {0}")]
    CacheInvalidate(String),

    // ===== 价格查询错误 =====
    #[error("基础价格查询失败: {0}")]
    PriceQuery(String),

    // ===== 规则存储错误 =====
    #[error("规则查询失败: {0}")]
    RuleQuery(String),

    #[error("规则写入失败 (rule: {name}): {message}")]
    RuleWrite { name: String, message: String },

    #[error("规则删除失败 (id: {id}): {message}")]
    RuleDelete { id: i64, message: String },

    // ===== 同步状态错误 =====
    #[error("同步状态读取失败: {0}")]
    StateQuery(String),

    #[error("同步状态写入失败: {0}")]
    StateWrite(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::StateQuery(err.to_string())
    }
}

/// Result 类型别名
pub type StoreResult<T> = Result<T, StoreError>;
