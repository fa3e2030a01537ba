//! Export helpers shared by every report: CSV text and report file names.

/// Renders `rows` under `headers` as CSV text.
///
/// Every field is wrapped in double quotes and fields are joined by commas; rows are
/// joined by `\n` with no trailing newline. Embedded quotes are written as-is, which
/// is the format existing consumers of these files parse.
///
/// # Example
/// Rows `[["A","1"],["B","2"]]` under `["Name","Count"]` give
/// `"Name","Count"\n"A","1"\n"B","2"`.
#[must_use]
pub fn to_csv<R, F>(rows: &[R], headers: &[&str]) -> String
where
    R: AsRef<[F]>,
    F: AsRef<str>,
{
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(quote_line(headers.iter().copied()));
    lines.extend(
        rows.iter()
            .map(|row| quote_line(row.as_ref().iter().map(AsRef::as_ref))),
    );
    lines.join("\n")
}

fn quote_line<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    fields
        .map(|field| format!("\"{field}\""))
        .collect::<Vec<_>>()
        .join(",")
}

/// Output format of a saved report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Comma separated text
    Csv,
    /// Paginated tabular document. Builders return the laid-out
    /// [`DocumentLayout`](crate::core::document::DocumentLayout); encoding it as PDF is
    /// left to the caller.
    Pdf,
    /// Plain text rendering of a tabular document
    Text,
}

impl ReportFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
            Self::Text => "txt",
        }
    }
}

/// File name of a report about `context`, e.g. `Monthly_Attendance_Report.csv`.
///
/// Whitespace inside the context becomes underscores.
#[must_use]
pub fn report_file_name(context: &str, format: ReportFormat) -> String {
    let context = context.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{context}_Report.{}", format.extension())
}

/// File name of a class group's timetable, e.g. `timetable_year_2_section_A.csv`.
#[must_use]
pub fn timetable_file_name(year: u32, section: &str, format: ReportFormat) -> String {
    format!("timetable_year_{year}_section_{section}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_quotes_every_field() {
        let rows = vec![vec!["A", "1"], vec!["B", "2"]];
        assert_eq!(
            to_csv(&rows, &["Name", "Count"]),
            "\"Name\",\"Count\"\n\"A\",\"1\"\n\"B\",\"2\""
        );
    }

    #[test]
    fn test_csv_without_rows_is_header_only() {
        let rows: Vec<Vec<String>> = Vec::new();
        assert_eq!(to_csv(&rows, &["Name"]), "\"Name\"");
    }

    #[test]
    fn test_csv_keeps_embedded_quotes_verbatim() {
        let rows = vec![vec!["Rao, \"Asha\"".to_string()]];
        assert_eq!(to_csv(&rows, &["Name"]), "\"Name\"\n\"Rao, \"Asha\"\"");
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name("Monthly Attendance", ReportFormat::Csv),
            "Monthly_Attendance_Report.csv"
        );
        assert_eq!(
            report_file_name("Students", ReportFormat::Pdf),
            "Students_Report.pdf"
        );
        assert_eq!(report_file_name("CSE", ReportFormat::Text), "CSE_Report.txt");
        assert_eq!(
            timetable_file_name(2, "A", ReportFormat::Csv),
            "timetable_year_2_section_A.csv"
        );
    }
}
