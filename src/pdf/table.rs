use pdf_writer::{Content, Str};

use crate::fonts::FontEntry;
use crate::model::Table;

use super::layout::{self, TITLE_BANDS};

/// Draw the grid for one page: `rows_in_page + 2` horizontal separators
/// (above the header, between bands, below the last row) and one vertical
/// separator per column boundary. On a titled first page the whole grid
/// shifts down by the title bands so it begins under the title text; the two
/// lines that would bound the title band are suppressed.
pub(super) fn draw_grid(content: &mut Content, table: &Table, rows_in_page: usize, first_page: bool) {
    let grid_top = grid_top_y(table, first_page);
    let x_left = table.margin;
    let x_right = table.margin + table.table_width();

    let mut next_y = grid_top;
    for _ in 0..=rows_in_page + 1 {
        content.move_to(x_left, next_y);
        content.line_to(x_right, next_y);
        content.stroke();
        next_y -= table.row_height;
    }

    let grid_bottom = grid_top - table.row_height * (rows_in_page as f32 + 1.0);
    let mut next_x = table.margin;
    for column in &table.columns {
        content.move_to(next_x, grid_top);
        content.line_to(next_x, grid_bottom);
        content.stroke();
        next_x += column.width;
    }
    // closing line after the last column
    content.move_to(next_x, grid_top);
    content.line_to(next_x, grid_bottom);
    content.stroke();
}

/// Write the title (titled first page only), the header row, and every data
/// row in the page's range. One positioned text run per cell; the cursor
/// advances by the column width and resets at each row, the baseline drops
/// by one row height per band.
pub(super) fn draw_rows(
    content: &mut Content,
    table: &Table,
    font: &FontEntry,
    range: (usize, usize),
    first_page: bool,
) {
    let offset = layout::baseline_offset(table, font.bbox_height_1000);
    let text_x = table.margin + table.cell_margin;

    if first_page && let Some(title) = &table.title {
        // single full-width run, not subject to the column cursor
        show_text(content, font, text_x, table.top_y() - offset, title);
    }

    let mut baseline_y = grid_top_y(table, first_page) - offset;

    let mut next_x = text_x;
    for column in &table.columns {
        show_text(content, font, next_x, baseline_y, &column.name);
        next_x += column.width;
    }
    baseline_y -= table.row_height;

    let (start, end) = range;
    for row in start..=end {
        let mut next_x = text_x;
        for (col, column) in table.columns.iter().enumerate() {
            show_text(content, font, next_x, baseline_y, table.cell(row, col));
            next_x += column.width;
        }
        baseline_y -= table.row_height;
    }
}

fn grid_top_y(table: &Table, first_page: bool) -> f32 {
    let top_y = table.top_y();
    if first_page && table.title.is_some() {
        top_y - TITLE_BANDS as f32 * table.row_height
    } else {
        top_y
    }
}

fn show_text(content: &mut Content, font: &FontEntry, x: f32, y: f32, text: &str) {
    content.begin_text();
    content.next_line(x, y);
    content.show(Str(&font.encode(text)));
    content.end_text();
}
