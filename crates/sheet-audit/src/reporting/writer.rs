use super::sink::ReportSink;
use crate::types::{
    CellValue, DuplicateReport, NullReport, NumericConformanceReport, PrefixFindings, ReportRow,
};
use crate::utils::text_width;
use rust_xlsxwriter::{ColNum, RowNum};
use std::collections::BTreeMap;

/// Written in place of a section when the dataset has no rows or no columns.
pub const EMPTY_DATASET_NOTICE: &str = "The dataset is empty.";

/// Padding added to the longest text of the first column.
const FIRST_COLUMN_PADDING: usize = 2;

/// Padding added to the longest text of every other column.
const COLUMN_PADDING: usize = 5;

/// The two prefix-driven sections share one layout and differ in wording.
#[derive(Debug, Clone, Copy)]
enum PrefixSection {
    Duplicate,
    Numeric,
}

impl PrefixSection {
    fn heading(self, prefix: &str) -> String {
        match self {
            Self::Duplicate => format!("Columns with prefix '{}' checked for duplicates", prefix),
            Self::Numeric => {
                format!("Columns with prefix '{}' that must contain numeric data", prefix)
            }
        }
    }

    fn count_title(self, column: &str, count: usize) -> String {
        match self {
            Self::Duplicate => format!("Duplicate rows in column '{}': {}", column, count),
            Self::Numeric => format!("Rows with non-numeric data in column '{}': {}", column, count),
        }
    }

    fn rows_title(self, column: &str) -> String {
        match self {
            Self::Duplicate => format!("Rows duplicated in column '{}':", column),
            Self::Numeric => format!("Rows with non-numeric data in column '{}':", column),
        }
    }
}

/// Lays out check reports on one sheet.
///
/// The writer remembers the longest text it has put in each column so that
/// [`finish`](Self::finish) can size the columns without reading the sink
/// back.
pub struct SectionWriter<'a, S: ReportSink + ?Sized> {
    sink: &'a mut S,
    /// Longest text per column; column A ignores the banner row.
    text_widths: BTreeMap<ColNum, usize>,
    last_col: Option<ColNum>,
    has_content: bool,
}

impl<'a, S: ReportSink + ?Sized> SectionWriter<'a, S> {
    pub fn new(sink: &'a mut S) -> Self {
        Self {
            sink,
            text_widths: BTreeMap::new(),
            last_col: None,
            has_content: false,
        }
    }

    // ==================== Sections ====================

    /// Banner, per-column null counts and the rows holding nulls.
    pub fn write_null_section(&mut self, file_name: &str, report: &NullReport) {
        self.has_content = true;

        self.append(vec![CellValue::text(format!(
            "***** Processing file: {} *****",
            file_name
        ))]);
        self.blank();

        self.title("Null values per column:", 2);
        for count in &report.null_counts {
            let row = self.append(vec![
                CellValue::text(count.column.as_str()),
                count.null_count.into(),
            ]);
            self.border(row, 2);
        }
        self.fit_first_column();

        self.blank();
        self.blank();

        if !report.rows.is_empty() {
            self.title("Rows with null values:", 2);
            self.table(&report.headers, &report.rows);
        }
        self.blank();
    }

    pub fn write_duplicate_section(&mut self, report: &DuplicateReport) {
        self.write_prefix_section(PrefixSection::Duplicate, &report.headers, &report.selections);
    }

    pub fn write_numeric_section(&mut self, report: &NumericConformanceReport) {
        self.write_prefix_section(PrefixSection::Numeric, &report.headers, &report.selections);
    }

    /// Notice written instead of a section for an empty dataset.
    pub fn write_empty_notice(&mut self) {
        self.append(vec![CellValue::text(EMPTY_DATASET_NOTICE)]);
    }

    /// Size every column after the first to its longest text.
    ///
    /// Does nothing when only empty-dataset notices were written.
    pub fn finish(mut self) {
        if !self.has_content {
            return;
        }
        let Some(last_col) = self.last_col else {
            return;
        };
        for col in 1..=last_col {
            let longest = self.text_widths.get(&col).copied().unwrap_or(0);
            self.sink.set_column_width(col, (longest + COLUMN_PADDING) as f64);
        }
    }

    fn write_prefix_section(
        &mut self,
        section: PrefixSection,
        headers: &[String],
        selections: &[PrefixFindings],
    ) {
        self.has_content = true;

        for selection in selections {
            self.title(&section.heading(&selection.prefix), 1);

            if selection.columns.is_empty() {
                self.append(vec![CellValue::text(format!(
                    "No columns match prefix '{}'",
                    selection.prefix
                ))]);
            } else {
                let names: Vec<CellValue> = selection
                    .matched_columns()
                    .into_iter()
                    .map(CellValue::text)
                    .collect();
                let width = names.len();
                let row = self.append(names);
                self.border(row, width);
            }

            for finding in &selection.columns {
                self.blank();
                self.title(&section.count_title(&finding.column, finding.count), 1);

                if finding.count > 0 {
                    self.title(&section.rows_title(&finding.column), 1);
                    self.table(headers, &finding.rows);
                }
            }

            self.blank();
        }
    }

    // ==================== Building blocks ====================

    fn append(&mut self, values: Vec<CellValue>) -> RowNum {
        let widths: Vec<(ColNum, usize)> = values
            .iter()
            .enumerate()
            .filter_map(|(idx, value)| value.as_text().map(|t| (col_num(idx), text_width(t))))
            .collect();
        let len = values.len();

        let row = self.sink.append_row(values);

        for (col, width) in widths {
            if col == 0 && row == 0 {
                continue;
            }
            let longest = self.text_widths.entry(col).or_insert(0);
            *longest = (*longest).max(width);
        }
        if len > 0 {
            self.touch_col(col_num(len - 1));
        }
        row
    }

    fn blank(&mut self) {
        self.append(Vec::new());
    }

    /// Bold, bordered title over the first `span` columns.
    fn title(&mut self, text: &str, span: usize) {
        let row = self.append(vec![CellValue::text(text)]);
        let last = col_num(span.max(1) - 1);
        self.sink.set_bold(row, 0, last);
        self.sink.set_border(row, 0, last);
        self.touch_col(last);
    }

    /// Border over the first `width` cells of `row`.
    fn border(&mut self, row: RowNum, width: usize) {
        if width == 0 {
            return;
        }
        let last = col_num(width - 1);
        self.sink.set_border(row, 0, last);
        self.touch_col(last);
    }

    /// Bold, bordered header followed by bordered rows.
    fn table(&mut self, headers: &[String], rows: &[ReportRow]) {
        let header_row = self.append(headers.iter().map(|h| CellValue::text(h.as_str())).collect());
        if !headers.is_empty() {
            self.sink.set_bold(header_row, 0, col_num(headers.len() - 1));
            self.border(header_row, headers.len());
        }

        for row in rows {
            let idx = self.append(row.values.clone());
            self.border(idx, headers.len());
        }
    }

    fn fit_first_column(&mut self) {
        let longest = self.text_widths.get(&0).copied().unwrap_or(0);
        self.sink.set_column_width(0, (longest + FIRST_COLUMN_PADDING) as f64);
    }

    fn touch_col(&mut self, col: ColNum) {
        self.last_col = Some(self.last_col.map_or(col, |last| last.max(col)));
    }
}

fn col_num(idx: usize) -> ColNum {
    ColNum::try_from(idx).unwrap_or(ColNum::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::fixtures::people;
    use crate::checks::{DuplicateChecker, NullChecker, NumericChecker};
    use crate::reporting::{CellStyle, SheetBuffer};
    use pretty_assertions::assert_eq;

    const BOLD_BORDER: CellStyle = CellStyle {
        bold: true,
        border: true,
    };
    const BORDER: CellStyle = CellStyle {
        bold: false,
        border: true,
    };

    fn text_at(buffer: &SheetBuffer, row: RowNum) -> String {
        buffer.cell(row, 0).to_string()
    }

    fn render_people() -> SheetBuffer {
        let ds = people();
        let nulls = NullChecker::check(&ds).unwrap();
        let duplicates = DuplicateChecker::check(&ds, &["ID".to_string()]).unwrap();
        let numeric = NumericChecker::check(&ds, &["Score".to_string()]).unwrap();

        let mut buffer = SheetBuffer::new();
        let mut writer = SectionWriter::new(&mut buffer);
        writer.write_null_section("people.xlsx", &nulls);
        writer.write_duplicate_section(&duplicates);
        writer.write_numeric_section(&numeric);
        writer.finish();
        buffer
    }

    // ==================== Null section ====================

    #[test]
    fn test_null_section_layout() {
        let buffer = render_people();

        assert_eq!(text_at(&buffer, 0), "***** Processing file: people.xlsx *****");
        assert_eq!(buffer.style(0, 0), CellStyle::default());
        assert!(buffer.rows()[1].is_empty());

        assert_eq!(text_at(&buffer, 2), "Null values per column:");
        assert_eq!(buffer.style(2, 0), BOLD_BORDER);
        assert_eq!(buffer.style(2, 1), BOLD_BORDER);

        assert_eq!(
            buffer.rows()[3..6].to_vec(),
            vec![
                vec![CellValue::text("ID"), CellValue::Number(0.0)],
                vec![CellValue::text("Name"), CellValue::Number(0.0)],
                vec![CellValue::text("Score"), CellValue::Number(1.0)],
            ]
        );
        assert_eq!(buffer.style(5, 1), BORDER);

        assert!(buffer.rows()[6].is_empty());
        assert!(buffer.rows()[7].is_empty());
        assert_eq!(text_at(&buffer, 8), "Rows with null values:");
        assert_eq!(
            buffer.rows()[9],
            vec![CellValue::text("ID"), CellValue::text("Name"), CellValue::text("Score")]
        );
        assert_eq!(buffer.style(9, 2), BOLD_BORDER);
        assert_eq!(
            buffer.rows()[10],
            vec![CellValue::Number(2.0), CellValue::text("bob"), CellValue::Null]
        );
        assert_eq!(buffer.style(10, 2), BORDER);
        assert!(buffer.rows()[11].is_empty());
    }

    #[test]
    fn test_null_section_without_nulls_skips_listing() {
        let ds = crate::dataset::Dataset::from_rows(
            vec!["A".to_string()],
            vec![vec!["x".into()]],
        )
        .unwrap();
        let report = NullChecker::check(&ds).unwrap();

        let mut buffer = SheetBuffer::new();
        SectionWriter::new(&mut buffer).write_null_section("a.xlsx", &report);

        // banner, blank, title, one count row, two blanks, trailing blank
        assert_eq!(buffer.cursor(), 7);
        assert!(
            buffer
                .rows()
                .iter()
                .all(|row| row.first() != Some(&CellValue::text("Rows with null values:")))
        );
    }

    // ==================== Prefix sections ====================

    #[test]
    fn test_duplicate_section_layout() {
        let buffer = render_people();

        assert_eq!(text_at(&buffer, 12), "Columns with prefix 'ID' checked for duplicates");
        assert_eq!(buffer.style(12, 0), BOLD_BORDER);
        assert_eq!(buffer.style(12, 1), CellStyle::default());
        assert_eq!(buffer.rows()[13], vec![CellValue::text("ID")]);
        assert_eq!(buffer.style(13, 0), BORDER);
        assert!(buffer.rows()[14].is_empty());
        assert_eq!(text_at(&buffer, 15), "Duplicate rows in column 'ID': 2");
        assert_eq!(text_at(&buffer, 16), "Rows duplicated in column 'ID':");
        assert_eq!(text_at(&buffer, 17), "ID");
        assert_eq!(buffer.cell(18, 1), &CellValue::text("bob"));
        assert_eq!(buffer.cell(19, 1), &CellValue::text("BOB"));
        assert!(buffer.rows()[20].is_empty());
    }

    #[test]
    fn test_numeric_section_layout() {
        let buffer = render_people();

        assert_eq!(
            text_at(&buffer, 21),
            "Columns with prefix 'Score' that must contain numeric data"
        );
        assert_eq!(buffer.rows()[22], vec![CellValue::text("Score")]);
        assert_eq!(text_at(&buffer, 24), "Rows with non-numeric data in column 'Score': 2");
        assert_eq!(text_at(&buffer, 25), "Rows with non-numeric data in column 'Score':");
        assert_eq!(buffer.cell(27, 2), &CellValue::Null);
        assert_eq!(buffer.cell(28, 2), &CellValue::text("x"));
        assert!(buffer.rows()[29].is_empty());
        assert_eq!(buffer.cursor(), 30);
    }

    #[test]
    fn test_unmatched_prefix_notice() {
        let ds = people();
        let report = DuplicateChecker::check(&ds, &["Zip".to_string()]).unwrap();

        let mut buffer = SheetBuffer::new();
        SectionWriter::new(&mut buffer).write_duplicate_section(&report);

        assert_eq!(text_at(&buffer, 0), "Columns with prefix 'Zip' checked for duplicates");
        assert_eq!(text_at(&buffer, 1), "No columns match prefix 'Zip'");
        assert!(buffer.rows()[2].is_empty());
        assert_eq!(buffer.cursor(), 3);
    }

    #[test]
    fn test_zero_count_has_no_listing() {
        let ds = people();
        let report = NumericChecker::check(&ds, &["ID".to_string()]).unwrap();

        let mut buffer = SheetBuffer::new();
        SectionWriter::new(&mut buffer).write_numeric_section(&report);

        assert_eq!(text_at(&buffer, 3), "Rows with non-numeric data in column 'ID': 0");
        assert!(buffer.rows()[4].is_empty());
        assert_eq!(buffer.cursor(), 5);
    }

    // ==================== Widths ====================

    #[test]
    fn test_column_widths() {
        let buffer = render_people();

        // "Null values per column:" is the longest text below the banner
        // when the count table is done
        assert_eq!(buffer.column_width(0), Some(25.0));
        // "Name" + 5
        assert_eq!(buffer.column_width(1), Some(9.0));
        // "Score" + 5
        assert_eq!(buffer.column_width(2), Some(10.0));
        assert_eq!(buffer.column_widths().len(), 3);
    }

    #[test]
    fn test_column_without_text_gets_padding_only() {
        let ds = crate::dataset::Dataset::from_rows(
            vec!["A".to_string()],
            vec![vec![CellValue::Number(1.0)]],
        )
        .unwrap();
        let report = NullChecker::check(&ds).unwrap();

        let mut buffer = SheetBuffer::new();
        let mut writer = SectionWriter::new(&mut buffer);
        writer.write_null_section("a.xlsx", &report);
        writer.finish();

        // the title spans two columns, the count column holds numbers only
        assert_eq!(buffer.column_width(1), Some(5.0));
    }

    #[test]
    fn test_empty_dataset_notices() {
        let mut buffer = SheetBuffer::new();
        let mut writer = SectionWriter::new(&mut buffer);
        writer.write_empty_notice();
        writer.write_empty_notice();
        writer.finish();

        assert_eq!(text_at(&buffer, 0), EMPTY_DATASET_NOTICE);
        assert_eq!(text_at(&buffer, 1), EMPTY_DATASET_NOTICE);
        assert!(buffer.column_widths().is_empty());
    }
}
