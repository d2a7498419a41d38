use crate::error::Error;
use crate::model::Table;

/// Row bands reserved above the header on a titled first page: one for the
/// title line, one blank spacer.
pub(super) const TITLE_BANDS: usize = 2;

/// Data rows that fit on an ordinary page. One band is always traded for the
/// header, which repeats on every page.
pub(super) fn rows_per_page(table: &Table) -> Result<usize, Error> {
    let bands = (table.height / table.row_height).floor() as i64;
    let rows = bands - 1;
    if rows <= 0 {
        return Err(Error::Config(format!(
            "row height {} leaves no room for data rows within table height {}",
            table.row_height, table.height
        )));
    }
    if table.title.is_some() && rows as usize <= TITLE_BANDS {
        return Err(Error::Config(format!(
            "row height {} leaves no room for data rows below the title band",
            table.row_height
        )));
    }
    Ok(rows as usize)
}

/// Effective data capacity of the first page. The title and its spacer each
/// consume a band.
fn first_page_capacity(table: &Table, rows_per_page: usize) -> usize {
    if table.title.is_some() {
        rows_per_page - TITLE_BANDS
    } else {
        rows_per_page
    }
}

/// Minimum number of pages covering every row. A zero-row table still
/// produces one page (title, header and grid only); a row count that is an
/// exact multiple of the capacity never produces a trailing empty page.
pub(super) fn page_count(table: &Table, rows_per_page: usize) -> usize {
    let n = table.number_of_rows;
    let first = first_page_capacity(table, rows_per_page);
    if n <= first {
        1
    } else {
        1 + (n - first).div_ceil(rows_per_page)
    }
}

/// 1-based inclusive row range assigned to a page, clamped to the row count.
/// `start > end` only for the single page of a zero-row table.
pub(super) fn row_range(table: &Table, rows_per_page: usize, page_index: usize) -> (usize, usize) {
    let n = table.number_of_rows;
    let first = first_page_capacity(table, rows_per_page);
    if page_index == 0 {
        (1, first.min(n))
    } else {
        let start = first + (page_index - 1) * rows_per_page + 1;
        let end = (first + page_index * rows_per_page).min(n);
        (start, end)
    }
}

/// Distance from a band's top edge down to the text baseline: half the band,
/// plus a quarter of the scaled font bounding-box height. An approximation
/// of cap-height centering.
pub(super) fn baseline_offset(table: &Table, bbox_height_1000: f32) -> f32 {
    table.row_height / 2.0 + (bbox_height_1000 / 1000.0 * table.font_size) / 4.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, PageSize, Table};

    fn sample_table(rows: usize, titled: bool) -> Table {
        let mut b = Table::builder()
            .columns(vec![
                Column::new("FirstName", 90.0),
                Column::new("LastName", 90.0),
                Column::new("Email", 230.0),
            ])
            .rows(
                (1..=rows)
                    .map(|i| vec![format!("First-{i}"), format!("Last-{i}"), format!("m-{i}")])
                    .collect(),
            )
            .page_size(PageSize::A3)
            .landscape(true)
            .row_height(15.0)
            .height(400.0);
        if titled {
            b = b.title("Subscriptions");
        }
        b.build().unwrap()
    }

    #[test]
    fn twenty_five_rows_fit_per_page() {
        let table = sample_table(149, false);
        assert_eq!(rows_per_page(&table).unwrap(), 25);
    }

    #[test]
    fn hundred_forty_nine_rows_take_six_pages() {
        let table = sample_table(149, false);
        let rpp = rows_per_page(&table).unwrap();
        assert_eq!(page_count(&table, rpp), 6);
        let ranges: Vec<(usize, usize)> = (0..6).map(|p| row_range(&table, rpp, p)).collect();
        assert_eq!(
            ranges,
            vec![
                (1, 25),
                (26, 50),
                (51, 75),
                (76, 100),
                (101, 125),
                (126, 149)
            ]
        );
    }

    #[test]
    fn title_reserves_two_bands_on_the_first_page() {
        let table = sample_table(149, true);
        let rpp = rows_per_page(&table).unwrap();
        assert_eq!(rpp, 25);
        assert_eq!(page_count(&table, rpp), 7);
        assert_eq!(row_range(&table, rpp, 0), (1, 23));
        assert_eq!(row_range(&table, rpp, 1), (24, 48));
        assert_eq!(row_range(&table, rpp, 6), (149, 149));
    }

    #[test]
    fn ranges_partition_all_rows_without_gaps_or_overlaps() {
        for titled in [false, true] {
            for rows in [0, 1, 22, 23, 24, 25, 26, 48, 50, 73, 149, 150] {
                let table = sample_table(rows, titled);
                let rpp = rows_per_page(&table).unwrap();
                let pages = page_count(&table, rpp);
                let mut next = 1;
                for p in 0..pages {
                    let (start, end) = row_range(&table, rpp, p);
                    if start > end {
                        // only legal on the single page of an empty table
                        assert_eq!(rows, 0, "empty range on non-empty table");
                        assert_eq!(pages, 1);
                        continue;
                    }
                    assert_eq!(start, next, "gap or overlap at page {p} (rows={rows})");
                    next = end + 1;
                }
                assert_eq!(next, rows + 1, "rows not fully covered (rows={rows})");
            }
        }
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_page() {
        let table = sample_table(50, false);
        let rpp = rows_per_page(&table).unwrap();
        assert_eq!(page_count(&table, rpp), 2);
        assert_eq!(row_range(&table, rpp, 1), (26, 50));

        // titled: 23 + 25 rows exactly fill two pages
        let table = sample_table(48, true);
        let rpp = rows_per_page(&table).unwrap();
        assert_eq!(page_count(&table, rpp), 2);
        assert_eq!(row_range(&table, rpp, 1), (24, 48));
    }

    #[test]
    fn zero_rows_still_render_one_page() {
        let table = sample_table(0, false);
        let rpp = rows_per_page(&table).unwrap();
        assert_eq!(page_count(&table, rpp), 1);
        assert_eq!(row_range(&table, rpp, 0), (1, 0));
    }

    #[test]
    fn oversized_rows_are_a_configuration_error() {
        let table = Table::builder()
            .columns(vec![Column::new("Name", 90.0)])
            .row_height(15.0)
            .height(20.0)
            .build()
            .unwrap();
        assert!(matches!(rows_per_page(&table), Err(Error::Config(_))));
    }

    #[test]
    fn title_with_no_remaining_capacity_is_a_configuration_error() {
        // three bands fit; header takes one, title takes two, no data rows left
        let table = Table::builder()
            .columns(vec![Column::new("Name", 90.0)])
            .title("Too tall")
            .row_height(15.0)
            .height(50.0)
            .build()
            .unwrap();
        assert!(matches!(rows_per_page(&table), Err(Error::Config(_))));
    }

    #[test]
    fn baseline_offset_uses_quarter_bbox_height() {
        let table = sample_table(1, false);
        // row_height 15, font_size 10, bbox 1156/1000 → 7.5 + 2.89
        let off = baseline_offset(&table, 1156.0);
        assert!((off - (7.5 + 1.156 * 10.0 / 4.0)).abs() < 1e-4);
    }
}
