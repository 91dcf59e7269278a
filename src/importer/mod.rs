// ==========================================
// 折扣规则同步系统 - 导入层
// ==========================================
// 职责: 价格表读取 → 记录解析 → 记录过滤
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// ==========================================

pub mod error;
pub mod record_filter;
pub mod record_parser;
pub mod table_reader;

pub use error::{ImportError, ImportResult};
pub use record_filter::RecordFilter;
pub use record_parser::{ColumnMapping, ImportField, RecordParser};
pub use table_reader::{CsvTableReader, ExcelTableReader, RawRow, ReadParams, TableReader};
