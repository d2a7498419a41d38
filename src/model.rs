use std::path::PathBuf;

use crate::error::Error;

/// Page dimensions in points, portrait orientation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const A3: PageSize = PageSize {
        width: 841.89,
        height: 1190.55,
    };
    pub const A4: PageSize = PageSize {
        width: 595.276,
        height: 841.89,
    };
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };
}

/// Which font the table text is set in. Resolution to concrete metrics
/// happens once, when the PDF is generated.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FontSpec {
    /// Built-in base-14 Helvetica. No filesystem access, metrics are known.
    #[default]
    Helvetica,
    /// A family name looked up in the system font directories. Falls back
    /// to Helvetica with a warning when the family is not installed.
    Family(String),
    /// An explicit TTF/OTF file. Unreadable or unparseable is an error.
    File(PathBuf),
}

#[derive(Clone, Debug)]
pub struct Column {
    pub(crate) name: String,
    pub(crate) width: f32, // points
}

impl Column {
    pub fn new(name: impl Into<String>, width: f32) -> Self {
        Self {
            name: name.into(),
            width,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> f32 {
        self.width
    }
}

/// Immutable description of the table to render. Built once via
/// [`TableBuilder`], read-only for the rest of the pipeline.
#[derive(Debug)]
pub struct Table {
    pub(crate) columns: Vec<Column>,
    /// Row `i` (1-based) lives at `rows[i - 1]`. A row shorter than the
    /// column count renders its missing trailing cells as empty strings.
    pub(crate) rows: Vec<Vec<String>>,
    pub(crate) number_of_rows: usize,
    pub(crate) row_height: f32,
    pub(crate) cell_margin: f32,
    pub(crate) margin: f32,
    pub(crate) font_size: f32,
    pub(crate) page_width: f32,
    pub(crate) page_height: f32,
    pub(crate) landscape: bool,
    pub(crate) title: Option<String>,
    pub(crate) font: FontSpec,
    /// Usable vertical extent reserved for row bands. Derived from the page
    /// geometry minus margins unless the caller supplied it.
    pub(crate) height: f32,
}

impl Table {
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    pub(crate) fn table_width(&self) -> f32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// Y coordinate of the table's top edge, in the page-local (possibly
    /// landscape-transformed) coordinate space.
    pub(crate) fn top_y(&self) -> f32 {
        if self.landscape {
            self.page_width - self.margin
        } else {
            self.page_height - self.margin
        }
    }

    /// Cell text for a 1-based row index and 0-based column index.
    /// Missing trailing cells read as the empty string.
    pub(crate) fn cell(&self, row: usize, col: usize) -> &str {
        self.rows[row - 1].get(col).map(String::as_str).unwrap_or("")
    }
}

pub struct TableBuilder {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
    row_height: f32,
    cell_margin: f32,
    margin: f32,
    font_size: f32,
    page_size: PageSize,
    landscape: bool,
    title: Option<String>,
    font: FontSpec,
    height: Option<f32>,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            row_height: 15.0,
            cell_margin: 2.0,
            margin: 20.0,
            font_size: 10.0,
            page_size: PageSize::A4,
            landscape: false,
            title: None,
            font: FontSpec::default(),
            height: None,
        }
    }
}

impl TableBuilder {
    pub fn columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn rows(mut self, rows: Vec<Vec<String>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn add_row(mut self, row: Vec<String>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn row_height(mut self, points: f32) -> Self {
        self.row_height = points;
        self
    }

    pub fn cell_margin(mut self, points: f32) -> Self {
        self.cell_margin = points;
        self
    }

    pub fn margin(mut self, points: f32) -> Self {
        self.margin = points;
        self
    }

    pub fn font_size(mut self, points: f32) -> Self {
        self.font_size = points;
        self
    }

    pub fn page_size(mut self, size: PageSize) -> Self {
        self.page_size = size;
        self
    }

    pub fn landscape(mut self, landscape: bool) -> Self {
        self.landscape = landscape;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn font(mut self, font: FontSpec) -> Self {
        self.font = font;
        self
    }

    /// Override the usable vertical extent reserved for row bands. When not
    /// set it is derived as the page's vertical extent minus both margins.
    pub fn height(mut self, points: f32) -> Self {
        self.height = Some(points);
        self
    }

    pub fn build(self) -> Result<Table, Error> {
        if self.columns.is_empty() {
            return Err(Error::Config("table has no columns".into()));
        }
        for col in &self.columns {
            if col.name.is_empty() {
                return Err(Error::Config("column with empty name".into()));
            }
            if col.width <= 0.0 {
                return Err(Error::Config(format!(
                    "column {:?} has non-positive width {}",
                    col.name, col.width
                )));
            }
        }
        if self.row_height <= 0.0 {
            return Err(Error::Config(format!(
                "row height must be positive, got {}",
                self.row_height
            )));
        }
        if self.font_size <= 0.0 {
            return Err(Error::Config(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if self.cell_margin < 0.0 || self.margin < 0.0 {
            return Err(Error::Config("margins must not be negative".into()));
        }
        if self.page_size.width <= 0.0 || self.page_size.height <= 0.0 {
            return Err(Error::Config("page size must be positive".into()));
        }
        // An empty title would still reserve the title band; treat it as absent.
        let title = self.title.filter(|t| !t.is_empty());

        let vertical_extent = if self.landscape {
            self.page_size.width
        } else {
            self.page_size.height
        };
        let height = self.height.unwrap_or(vertical_extent - 2.0 * self.margin);
        if height <= 0.0 {
            return Err(Error::Config(format!(
                "usable table height must be positive, got {height}"
            )));
        }

        let ncols = self.columns.len();
        let short = self.rows.iter().filter(|r| r.len() < ncols).count();
        if short > 0 {
            log::warn!(
                "{short} row(s) have fewer cells than the {ncols} columns; missing trailing cells render empty"
            );
        }
        let long = self.rows.iter().filter(|r| r.len() > ncols).count();
        if long > 0 {
            log::warn!(
                "{long} row(s) have more cells than the {ncols} columns; extra cells are ignored"
            );
        }

        let number_of_rows = self.rows.len();
        Ok(Table {
            columns: self.columns,
            rows: self.rows,
            number_of_rows,
            row_height: self.row_height,
            cell_margin: self.cell_margin,
            margin: self.margin,
            font_size: self.font_size,
            page_width: self.page_size.width,
            page_height: self.page_size.height,
            landscape: self.landscape,
            title,
            font: self.font,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_columns() -> Vec<Column> {
        vec![Column::new("Name", 120.0), Column::new("Email", 200.0)]
    }

    #[test]
    fn builder_requires_columns() {
        let err = Table::builder().build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn builder_rejects_non_positive_row_height() {
        let err = Table::builder()
            .columns(two_columns())
            .row_height(0.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn builder_rejects_zero_width_column() {
        let err = Table::builder()
            .columns(vec![Column::new("Name", 0.0)])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn height_is_derived_from_orientation() {
        let portrait = Table::builder()
            .columns(two_columns())
            .page_size(PageSize::A3)
            .margin(20.0)
            .build()
            .unwrap();
        assert!((portrait.height - (1190.55 - 40.0)).abs() < 1e-3);

        let landscape = Table::builder()
            .columns(two_columns())
            .page_size(PageSize::A3)
            .margin(20.0)
            .landscape(true)
            .build()
            .unwrap();
        assert!((landscape.height - (841.89 - 40.0)).abs() < 1e-3);
    }

    #[test]
    fn empty_title_is_dropped() {
        let table = Table::builder()
            .columns(two_columns())
            .title("")
            .build()
            .unwrap();
        assert!(table.title.is_none());
    }

    #[test]
    fn short_rows_read_as_empty_cells() {
        let table = Table::builder()
            .columns(two_columns())
            .add_row(vec!["Ada".into()])
            .build()
            .unwrap();
        assert_eq!(table.cell(1, 0), "Ada");
        assert_eq!(table.cell(1, 1), "");
    }
}
