// ==========================================
// 折扣规则同步系统 - 交换层错误类型
// ==========================================
// 说明: 此层错误均为致命（中止整次运行）；
//       单条记录级失败以报告条目形式降级处理
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::StoreError;
use thiserror::Error;

/// 交换任务错误类型
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("导入文件不存在: {0}")]
    ImportFileMissing(String),

    // 非真正的故障：守卫判定无需运行
    #[error("导入文件自上次同步后无变化")]
    SourceUnchanged,

    #[error("文件元数据读取失败: {0}")]
    FileStat(String),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result 类型别名
pub type ExchangeResult<T> = Result<T, ExchangeError>;
