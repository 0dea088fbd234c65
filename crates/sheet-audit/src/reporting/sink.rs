use crate::error::Result;
use crate::types::CellValue;
use rust_xlsxwriter::{ColNum, Format, FormatBorder, RowNum, Worksheet, XlsxError};
use std::collections::BTreeMap;

/// Longest text a workbook cell can hold.
const MAX_CELL_TEXT_LEN: usize = 32_767;

/// Rows and columns a worksheet can address.
pub const MAX_SHEET_ROWS: usize = 1_048_576;
pub const MAX_SHEET_COLS: usize = 16_384;

/// Destination for report rows.
///
/// Rows are appended at an internal cursor; styling and widths address
/// cells by zero-based row and column.
pub trait ReportSink {
    /// Append a row at the cursor and return its index.
    fn append_row(&mut self, values: Vec<CellValue>) -> RowNum;

    /// Make the cells `first_col..=last_col` of `row` bold.
    fn set_bold(&mut self, row: RowNum, first_col: ColNum, last_col: ColNum);

    /// Draw a thin border around the cells `first_col..=last_col` of `row`.
    fn set_border(&mut self, row: RowNum, first_col: ColNum, last_col: ColNum);

    fn set_column_width(&mut self, col: ColNum, width: f64);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellStyle {
    pub bold: bool,
    pub border: bool,
}

impl CellStyle {
    fn format(&self) -> Format {
        let mut format = Format::new();
        if self.bold {
            format = format.set_bold();
        }
        if self.border {
            format = format.set_border(FormatBorder::Thin);
        }
        format
    }
}

/// In-memory sheet that is rendered into a worksheet when the document is
/// saved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetBuffer {
    rows: Vec<Vec<CellValue>>,
    styles: BTreeMap<(RowNum, ColNum), CellStyle>,
    widths: BTreeMap<ColNum, f64>,
}

impl SheetBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Index the next appended row will get.
    pub fn cursor(&self) -> RowNum {
        self.rows.len() as RowNum
    }

    /// Value at a cell; cells never written read as null.
    pub fn cell(&self, row: RowNum, col: ColNum) -> &CellValue {
        self.rows
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .unwrap_or(&CellValue::Null)
    }

    pub fn style(&self, row: RowNum, col: ColNum) -> CellStyle {
        self.styles.get(&(row, col)).copied().unwrap_or_default()
    }

    pub fn column_width(&self, col: ColNum) -> Option<f64> {
        self.widths.get(&col).copied()
    }

    pub fn column_widths(&self) -> &BTreeMap<ColNum, f64> {
        &self.widths
    }

    /// Fail when any cell, style or width lies outside the worksheet grid.
    pub fn check_bounds(&self) -> Result<()> {
        let widest_row = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let last_styled = self.styles.keys().next_back();
        let styled_rows = last_styled.map_or(0, |&(row, _)| row as usize + 1);
        let styled_cols = self
            .styles
            .keys()
            .map(|&(_, col)| col as usize + 1)
            .max()
            .unwrap_or(0);
        let sized_cols = self
            .widths
            .keys()
            .next_back()
            .map_or(0, |&col| col as usize + 1);

        let rows = self.rows.len().max(styled_rows);
        let cols = widest_row.max(styled_cols).max(sized_cols);
        if rows > MAX_SHEET_ROWS || cols > MAX_SHEET_COLS {
            return Err(XlsxError::RowColumnLimitError.into());
        }
        Ok(())
    }

    fn style_range(
        &mut self,
        row: RowNum,
        first_col: ColNum,
        last_col: ColNum,
        apply: impl Fn(&mut CellStyle),
    ) {
        for col in first_col..=last_col {
            apply(self.styles.entry((row, col)).or_default());
        }
    }

    /// Write every cell, style and width into `worksheet`.
    ///
    /// Styled cells without a value are written as formatted blanks so the
    /// borders of a title spanning empty cells still show.
    pub fn render(&self, worksheet: &mut Worksheet) -> Result<()> {
        self.check_bounds()?;
        let default_format = Format::new();

        for (row_idx, row) in self.rows.iter().enumerate() {
            let row_num = row_idx as RowNum;
            for (col_idx, value) in row.iter().enumerate() {
                let col_num = col_idx as ColNum;
                let style = self.styles.get(&(row_num, col_num));
                let format = style.map(CellStyle::format);
                let format = format.as_ref().unwrap_or(&default_format);

                match value {
                    CellValue::Null => {
                        if style.is_some() {
                            worksheet.write_blank(row_num, col_num, format)?;
                        }
                    }
                    CellValue::Text(s) => {
                        let text = if s.chars().count() > MAX_CELL_TEXT_LEN {
                            s.chars().take(MAX_CELL_TEXT_LEN).collect()
                        } else {
                            s.clone()
                        };
                        worksheet.write_string_with_format(row_num, col_num, text, format)?;
                    }
                    CellValue::Number(n) => {
                        worksheet.write_number_with_format(row_num, col_num, *n, format)?;
                    }
                    CellValue::Bool(b) => {
                        worksheet.write_boolean_with_format(row_num, col_num, *b, format)?;
                    }
                }
            }
        }

        // styled cells past the end of their row
        for (&(row_num, col_num), style) in &self.styles {
            let row_len = self.rows.get(row_num as usize).map_or(0, Vec::len);
            if col_num as usize >= row_len {
                worksheet.write_blank(row_num, col_num, &style.format())?;
            }
        }

        for (&col, &width) in &self.widths {
            worksheet.set_column_width(col, width)?;
        }

        Ok(())
    }
}

impl ReportSink for SheetBuffer {
    fn append_row(&mut self, values: Vec<CellValue>) -> RowNum {
        let row = self.cursor();
        self.rows.push(values);
        row
    }

    fn set_bold(&mut self, row: RowNum, first_col: ColNum, last_col: ColNum) {
        self.style_range(row, first_col, last_col, |style| style.bold = true);
    }

    fn set_border(&mut self, row: RowNum, first_col: ColNum, last_col: ColNum) {
        self.style_range(row, first_col, last_col, |style| style.border = true);
    }

    fn set_column_width(&mut self, col: ColNum, width: f64) {
        self.widths.insert(col, width);
    }
}
