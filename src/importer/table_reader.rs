// ==========================================
// 折扣规则同步系统 - 价格表读取器
// ==========================================
// 职责: 读取工作表指定行列窗口，产出按列字母索引的原始行
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Data, Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

// ==========================================
// RawRow - 原始行
// ==========================================
// cells: 列字母 → 单元格文本（已 trim，空单元格不出现）
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub index: usize, // 源文件行号（1 起）
    pub cells: HashMap<String, String>,
}

impl RawRow {
    /// 取某列的单元格文本，缺失视为空串
    pub fn cell(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

// ==========================================
// ReadParams - 读取窗口参数
// ==========================================
#[derive(Debug, Clone)]
pub struct ReadParams {
    pub sheet_name: Option<String>, // 工作表名（None = 第一张）
    pub first_column: char,         // 起始列（含）
    pub last_column: char,          // 结束列（含）
    pub start_row: usize,           // 起始行（1 起，含）
    pub end_row: usize,             // 结束行（含）
}

impl Default for ReadParams {
    fn default() -> Self {
        Self {
            sheet_name: None,
            first_column: 'A',
            last_column: 'F',
            start_row: 2, // 第 1 行为表头
            end_row: 999_999,
        }
    }
}

impl ReadParams {
    fn column_in_window(&self, letter: char) -> bool {
        letter >= self.first_column && letter <= self.last_column
    }

    fn row_in_window(&self, row: usize) -> bool {
        row >= self.start_row && row <= self.end_row
    }
}

/// 绝对列下标（0 起）转列字母；仅支持 A-Z 单字母列
fn column_letter(index: usize) -> Option<char> {
    if index < 26 {
        Some((b'A' + index as u8) as char)
    } else {
        None
    }
}

// ==========================================
// TableReader Trait
// ==========================================
// 用途: 表格读取接口（同步阶段 0）
// 实现者: ExcelTableReader, CsvTableReader
pub trait TableReader: Send + Sync {
    /// 读取文件为原始行列表，行号保留源文件位置
    fn read(&self, file_path: &Path, params: &ReadParams) -> ImportResult<Vec<RawRow>>;
}

// ==========================================
// Excel 读取器实现
// ==========================================
pub struct ExcelTableReader;

impl TableReader for ExcelTableReader {
    fn read(&self, file_path: &Path, params: &ReadParams) -> ImportResult<Vec<RawRow>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook: Xlsx<_> = open_workbook(file_path)?;

        let sheet_name = match &params.sheet_name {
            Some(name) => {
                if !workbook.sheet_names().iter().any(|s| s == name) {
                    return Err(ImportError::SheetNotFound(name.clone()));
                }
                name.clone()
            }
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?,
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        // 已用区域相对文件左上角的偏移
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut rows = Vec::new();
        for (i, data_row) in range.rows().enumerate() {
            let row_index = row_offset + i + 1; // 1 起
            if !params.row_in_window(row_index) {
                continue;
            }

            let mut cells = HashMap::new();
            for (j, cell) in data_row.iter().enumerate() {
                if matches!(cell, Data::Empty) {
                    continue;
                }
                let Some(letter) = column_letter(col_offset + j) else {
                    continue;
                };
                if !params.column_in_window(letter) {
                    continue;
                }
                let value = cell.to_string().trim().to_string();
                if !value.is_empty() {
                    cells.insert(letter.to_string(), value);
                }
            }

            // 跳过完全空白的行
            if cells.is_empty() {
                continue;
            }

            rows.push(RawRow {
                index: row_index,
                cells,
            });
        }

        Ok(rows)
    }
}

// ==========================================
// CSV 读取器实现
// ==========================================
// 列按位置映射到字母（第 1 列 = A）
pub struct CsvTableReader;

impl TableReader for CsvTableReader {
    fn read(&self, file_path: &Path, params: &ReadParams) -> ImportResult<Vec<RawRow>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        if let Some(ext) = file_path.extension() {
            if ext != "csv" {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let mut rows = Vec::new();
        for (i, result) in reader.records().enumerate() {
            let record = result?;
            let row_index = i + 1;
            if !params.row_in_window(row_index) {
                continue;
            }

            let mut cells = HashMap::new();
            for (j, value) in record.iter().enumerate() {
                let Some(letter) = column_letter(j) else {
                    continue;
                };
                if !params.column_in_window(letter) {
                    continue;
                }
                let value = value.trim();
                if !value.is_empty() {
                    cells.insert(letter.to_string(), value.to_string());
                }
            }

            if cells.is_empty() {
                continue;
            }

            rows.push(RawRow {
                index: row_index,
                cells,
            });
        }

        Ok(rows)
    }
}
