mod layout;
mod table;

use std::collections::HashSet;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref};

use crate::error::Error;
use crate::fonts::register_font;
use crate::model::Table;

/// Render the table into a complete PDF byte stream.
///
/// Pagination is validated up front: a geometry that fits no data rows fails
/// here before any page is produced. Pages are then rendered strictly in
/// ascending order, each as its own content stream — grid lines first, then
/// title/header/cell text — and assembled into the page tree at the end.
pub(crate) fn render(table: &Table) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();

    let rows_per_page = layout::rows_per_page(table)?;
    let page_count = layout::page_count(table, rows_per_page);
    log::debug!(
        "pagination: {} rows, {rows_per_page} rows/page, {page_count} page(s)",
        table.number_of_rows
    );

    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();

    // Every character the document will set, for glyph subsetting
    let mut used_chars: HashSet<char> = HashSet::new();
    used_chars.insert(' ');
    if let Some(title) = &table.title {
        used_chars.extend(title.chars());
    }
    for column in &table.columns {
        used_chars.extend(column.name.chars());
    }
    for row in &table.rows {
        for cell in row {
            used_chars.extend(cell.chars());
        }
    }

    let font = register_font(&mut pdf, &table.font, "F1".to_string(), &mut alloc, &used_chars)?;
    let t_font = t0.elapsed();

    let mut contents: Vec<Content> = Vec::with_capacity(page_count);
    for page_index in 0..page_count {
        let mut content = Content::new();
        if table.landscape {
            // swap axes so the table draws along the page's long edge:
            // x' = y, y' = page_width − x
            content.transform([0.0, 1.0, -1.0, 0.0, table.page_width, 0.0]);
        }
        content.set_font(Name(font.pdf_name.as_bytes()), table.font_size);

        let first_page = page_index == 0;
        let (start, end) = layout::row_range(table, rows_per_page, page_index);
        let rows_in_page = (end + 1).saturating_sub(start);
        log::debug!("page {page_index}: rows {start}..={end} ({rows_in_page} row(s))");

        table::draw_grid(&mut content, table, rows_in_page, first_page);
        table::draw_rows(&mut content, table, &font, (start, end), first_page);

        contents.push(content);
    }
    let t_layout = t0.elapsed();

    let page_ids: Vec<Ref> = (0..page_count).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..page_count).map(|_| alloc()).collect();

    for (i, content) in contents.into_iter().enumerate() {
        let raw = content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
        pdf.stream(content_ids[i], &compressed)
            .filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(page_count as i32);

    for i in 0..page_count {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, table.page_width, table.page_height))
            .parent(pages_id)
            .contents(content_ids[i]);
        if table.landscape {
            page.rotate(90);
        }
        let mut resources = page.resources();
        resources
            .fonts()
            .pair(Name(font.pdf_name.as_bytes()), font.font_ref);
    }
    let t_assembly = t0.elapsed();

    log::info!(
        "Render phases: font={:.1}ms, layout={:.1}ms, assembly={:.1}ms ({page_count} page(s))",
        t_font.as_secs_f64() * 1000.0,
        (t_layout - t_font).as_secs_f64() * 1000.0,
        (t_assembly - t_layout).as_secs_f64() * 1000.0,
    );

    Ok(pdf.finish())
}
