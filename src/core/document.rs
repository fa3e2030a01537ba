//! Tabular report documents.
//!
//! A [`TabularDocument`] is a list of blocks (text lines, rules and tables) stacked
//! top to bottom. [`TabularDocument::layout`] places them on fixed-size pages in
//! millimetres. A vertical cursor runs through the whole document: every block starts
//! relative to where the previous one ended (its `final_y`), never at a fixed offset.
//! Table rows that do not fit on the current page continue on a new page, with the
//! header row repeated. The resulting [`DocumentLayout`] is what gets saved.

use crate::core::aggregate::format_ratio;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::trace;

/// Page geometry, in millimetres. Defaults to A4 portrait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    /// Page width
    pub width: f64,
    /// Page height
    pub height: f64,
    /// Left and right margin
    pub margin_x: f64,
    /// Top margin
    pub margin_top: f64,
    /// Bottom margin
    pub margin_bottom: f64,
    /// Height of one table row
    pub row_height: f64,
    /// Space between a heading and what follows it
    pub title_gap: f64,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin_x: 14.0,
            margin_top: 10.0,
            margin_bottom: 15.0,
            row_height: 8.0,
            title_gap: 8.0,
        }
    }
}

impl PageSetup {
    /// Lowest usable position on a page.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.height - self.margin_bottom
    }

    /// Width between the side margins.
    #[must_use]
    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin_x
    }

    /// The same page turned sideways.
    #[must_use]
    pub fn landscape(&self) -> Self {
        Self {
            width: self.width.max(self.height),
            height: self.width.min(self.height),
            ..self.clone()
        }
    }
}

/// A table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Free text
    Text(String),
    /// A count, printed as an integer
    Count(usize),
    /// A percentage value without its `%` sign, e.g. `"66.67"`
    Percent(String),
}

impl Cell {
    /// Percentage cell for `attended / conducted`, two decimals.
    #[must_use]
    pub fn ratio(attended: usize, conducted: usize) -> Self {
        Self::Percent(format_ratio(attended, conducted, 2))
    }

    /// Printed form of the cell.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Count(n) => n.to_string(),
            Self::Percent(value) => format!("{value}%"),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Self::Count(value)
    }
}

/// A titled table with an optional totals row.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Caption printed above the header row
    pub title: Option<String>,
    /// Column headings
    pub header: Vec<String>,
    /// Body rows
    pub rows: Vec<Vec<Cell>>,
    /// Totals row printed after the body
    pub footer: Option<Vec<Cell>>,
}

impl Table {
    /// An untitled table with the given column headings.
    #[must_use]
    pub fn new(header: &[&str]) -> Self {
        Self {
            title: None,
            header: header.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
            footer: None,
        }
    }

    /// Sets the caption.
    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Appends a body row.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Sets the totals row.
    #[must_use]
    pub fn with_footer(mut self, footer: Vec<Cell>) -> Self {
        self.footer = Some(footer);
        self
    }
}

/// One element of a document, placed `gap` mm below the cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A line of text
    Text {
        /// Text content
        content: String,
        /// Font size in points
        size: f64,
        /// Distance below the cursor
        gap: f64,
    },
    /// A horizontal rule across the content width
    Rule {
        /// Distance below the cursor
        gap: f64,
    },
    /// A table
    Table {
        /// The table
        table: Table,
        /// Distance below the cursor
        gap: f64,
    },
}

/// A report document before layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularDocument {
    blocks: Vec<Block>,
}

impl TabularDocument {
    /// An empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks in document order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// All tables in document order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table { table, .. } => Some(table),
            _ => None,
        })
    }

    /// Appends a text line.
    pub fn text(&mut self, content: impl Into<String>, size: f64, gap: f64) -> &mut Self {
        self.blocks.push(Block::Text {
            content: content.into(),
            size,
            gap,
        });
        self
    }

    /// Appends a rule.
    pub fn rule(&mut self, gap: f64) -> &mut Self {
        self.blocks.push(Block::Rule { gap });
        self
    }

    /// Appends a table.
    pub fn table(&mut self, table: Table, gap: f64) -> &mut Self {
        self.blocks.push(Block::Table { table, gap });
        self
    }

    /// Places every block on pages of `page`'s size.
    #[must_use]
    pub fn layout(&self, page: &PageSetup) -> DocumentLayout {
        let mut cursor = Cursor::new(page);
        for block in &self.blocks {
            match block {
                Block::Text { content, size, gap } => {
                    let y = cursor.advance(*gap);
                    cursor.place(Element::Text {
                        x: page.margin_x,
                        y,
                        content: content.clone(),
                        size: *size,
                    });
                }
                Block::Rule { gap } => {
                    let y = cursor.advance(*gap);
                    cursor.place(Element::Rule {
                        x1: page.margin_x,
                        x2: page.width - page.margin_x,
                        y,
                    });
                }
                Block::Table { table, gap } => cursor.place_table(table, *gap),
            }
        }
        cursor.finish()
    }
}

/// Role of a row inside a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Column headings
    Header,
    /// Body row
    Body,
    /// Totals row
    Footer,
}

/// A cell at its horizontal position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCell {
    /// Left edge of the column
    pub x: f64,
    /// Printed cell text
    pub text: String,
}

/// Something drawn on a page. `y` is the top edge for rows and the baseline for text.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A line of text
    Text {
        /// Left edge
        x: f64,
        /// Baseline
        y: f64,
        /// Text content
        content: String,
        /// Font size in points
        size: f64,
    },
    /// A horizontal rule
    Rule {
        /// Start
        x1: f64,
        /// End
        x2: f64,
        /// Vertical position
        y: f64,
    },
    /// A table row
    Row {
        /// Top edge
        y: f64,
        /// Header, body or footer
        kind: RowKind,
        /// Cells left to right
        cells: Vec<PlacedCell>,
    },
}

/// One laid-out page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Elements top to bottom
    pub elements: Vec<Element>,
}

/// A document placed on pages, ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    /// Pages in order; never empty
    pub pages: Vec<Page>,
    /// Vertical position on the last page where the last block ended
    pub final_y: f64,
    /// Final vertical position of each table, in document order
    pub table_ends: Vec<f64>,
}

impl DocumentLayout {
    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Plain text rendering, one line per element and a marker between pages.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for (index, page) in self.pages.iter().enumerate() {
            if index > 0 {
                let _ = writeln!(out, "\n--- page {} ---\n", index + 1);
            }
            for element in &page.elements {
                match element {
                    Element::Text { content, .. } => {
                        let _ = writeln!(out, "{content}");
                    }
                    Element::Rule { .. } => {
                        let _ = writeln!(out, "{}", "-".repeat(60));
                    }
                    Element::Row { kind, cells, .. } => {
                        let line = cells
                            .iter()
                            .map(|c| c.text.as_str())
                            .collect::<Vec<_>>()
                            .join(" | ");
                        let _ = writeln!(out, "{line}");
                        if *kind == RowKind::Header {
                            let _ = writeln!(out, "{}", "=".repeat(line.chars().count()));
                        }
                    }
                }
            }
        }
        out
    }
}

struct Cursor<'a> {
    page: &'a PageSetup,
    pages: Vec<Page>,
    y: f64,
    table_ends: Vec<f64>,
}

impl<'a> Cursor<'a> {
    fn new(page: &'a PageSetup) -> Self {
        Self {
            page,
            pages: vec![Page::default()],
            y: page.margin_top,
            table_ends: Vec::new(),
        }
    }

    fn new_page(&mut self) {
        trace!("Page break at y={:.1}", self.y);
        self.pages.push(Page::default());
        self.y = self.page.margin_top;
    }

    /// Moves the cursor down by `gap`, breaking the page if the new position does not
    /// fit. Returns the new position.
    fn advance(&mut self, gap: f64) -> f64 {
        if self.y + gap > self.page.bottom() {
            self.new_page();
        }
        self.y += gap;
        self.y
    }

    /// Breaks the page unless `height` more fits below the cursor.
    fn reserve(&mut self, height: f64) {
        if self.y + height > self.page.bottom() {
            self.new_page();
        }
    }

    fn place(&mut self, element: Element) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    fn row(&mut self, kind: RowKind, texts: Vec<String>) {
        #[allow(clippy::cast_precision_loss)]
        let column_width = self.page.content_width() / texts.len().max(1) as f64;
        let margin = self.page.margin_x;
        #[allow(clippy::cast_precision_loss)]
        let cells = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| PlacedCell {
                x: margin + column_width * i as f64,
                text,
            })
            .collect();
        let y = self.y;
        self.place(Element::Row { y, kind, cells });
        self.y += self.page.row_height;
    }

    fn place_table(&mut self, table: &Table, gap: f64) {
        let row_height = self.page.row_height;
        let title_height = if table.title.is_some() {
            self.page.title_gap
        } else {
            0.0
        };
        // A caption and header are never left alone at the bottom of a page.
        self.reserve(gap + title_height + 2.0 * row_height);
        self.y += gap;

        if let Some(title) = &table.title {
            let y = self.y;
            self.place(Element::Text {
                x: self.page.margin_x,
                y,
                content: title.clone(),
                size: 12.0,
            });
            self.y += title_height;
        }

        self.row(RowKind::Header, table.header.clone());
        let body = table.rows.iter().map(|r| (RowKind::Body, r));
        let footer = table.footer.iter().map(|r| (RowKind::Footer, r));
        for (kind, cells) in body.chain(footer) {
            if self.y + row_height > self.page.bottom() {
                self.new_page();
                self.row(RowKind::Header, table.header.clone());
            }
            self.row(kind, cells.iter().map(Cell::render).collect());
        }
        self.table_ends.push(self.y);
    }

    fn finish(self) -> DocumentLayout {
        DocumentLayout {
            pages: self.pages,
            final_y: self.y,
            table_ends: self.table_ends,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    fn small_table(title: &str, rows: usize) -> Table {
        let mut table = Table::new(&["Date", "Subject", "Status"]).titled(title);
        for i in 0..rows {
            table.push_row(vec![
                format!("2024-03-{:02}", i + 1).into(),
                "Math".into(),
                "present".into(),
            ]);
        }
        table.with_footer(vec!["Total".into(), rows.into(), Cell::ratio(rows, rows)])
    }

    fn rows_on(page: &Page) -> Vec<(RowKind, f64)> {
        page.elements
            .iter()
            .filter_map(|e| match e {
                Element::Row { y, kind, .. } => Some((*kind, *y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_cell_rendering() {
        assert_eq!(Cell::Count(12).render(), "12");
        assert_eq!(Cell::ratio(2, 3).render(), "66.67%");
        assert_eq!(Cell::ratio(0, 0).render(), "0.00%");
        assert_eq!(Cell::from("TOTAL").render(), "TOTAL");
    }

    #[test]
    fn test_landscape_swaps_sides() {
        let page = PageSetup::default().landscape();
        assert!((page.width - 297.0).abs() < f64::EPSILON);
        assert!((page.height - 210.0).abs() < f64::EPSILON);
        assert_eq!(page.landscape(), page);
    }

    #[test]
    fn test_second_table_starts_below_first() {
        let page = PageSetup::default();
        let mut doc = TabularDocument::new();
        doc.table(small_table("2024-W1", 2), 10.0)
            .table(small_table("2024-W2", 3), 6.0);
        let layout = doc.layout(&page);

        assert_eq!(layout.page_count(), 1);
        // title gap + header + 2 rows + footer
        let first_end = page.margin_top + 10.0 + page.title_gap + 4.0 * page.row_height;
        assert_eq!(layout.table_ends[0], first_end);
        let second_end = first_end + 6.0 + page.title_gap + 5.0 * page.row_height;
        assert_eq!(layout.table_ends[1], second_end);
        assert_eq!(layout.final_y, second_end);

        let second_title_y = layout.pages[0]
            .elements
            .iter()
            .find_map(|e| match e {
                Element::Text { content, y, .. } if content == "2024-W2" => Some(*y),
                _ => None,
            })
            .unwrap_or_default();
        assert_eq!(second_title_y, first_end + 6.0);
    }

    #[test]
    fn test_text_follows_previous_table() {
        let page = PageSetup::default();
        let mut doc = TabularDocument::new();
        doc.table(Table::new(&["Subject"]), 0.0)
            .text("Overall Percentage: 0.00%", 12.0, 10.0);
        let layout = doc.layout(&page);
        let expected = page.margin_top + page.row_height + 10.0;
        assert_eq!(layout.final_y, expected);
    }

    #[test]
    fn test_long_table_repeats_header_on_next_page() {
        let page = PageSetup::default();
        let mut doc = TabularDocument::new();
        doc.table(small_table("March", 60), 0.0);
        let layout = doc.layout(&page);

        assert!(layout.page_count() >= 2);
        let second = rows_on(&layout.pages[1]);
        assert_eq!(second[0], (RowKind::Header, page.margin_top));
        assert_eq!(second.last().map(|r| r.0), Some(RowKind::Footer));

        let body_rows: usize = layout
            .pages
            .iter()
            .map(|p| {
                rows_on(p)
                    .iter()
                    .filter(|(kind, _)| *kind == RowKind::Body)
                    .count()
            })
            .sum();
        assert_eq!(body_rows, 60);
        for p in &layout.pages {
            for (_, y) in rows_on(p) {
                assert!(y + page.row_height <= page.bottom());
            }
        }
    }

    #[test]
    fn test_render_text() {
        let mut doc = TabularDocument::new();
        let mut table = Table::new(&["Subject", "Conducted", "Attended"]);
        table.push_row(vec!["Math".into(), Cell::Count(3), Cell::Count(2)]);
        doc.text("Month Attendance: March 2024", 14.0, 24.0)
            .rule(4.0)
            .table(table.with_footer(vec!["TOTAL".into(), Cell::Count(3), Cell::Count(2)]), 6.0);
        let text = doc.layout(&PageSetup::default()).render_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Month Attendance: March 2024");
        assert!(lines[1].starts_with("---"));
        assert_eq!(lines[2], "Subject | Conducted | Attended");
        assert_eq!(lines[4], "Math | 3 | 2");
        assert_eq!(lines[5], "TOTAL | 3 | 2");
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let layout = TabularDocument::new().layout(&PageSetup::default());
        assert_eq!(layout.page_count(), 1);
        assert!(layout.table_ends.is_empty());
    }
}
