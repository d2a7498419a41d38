use tablegen_pdf::{Column, PageSize, Table};

/// Three-column table: 400pt of usable height and 15pt bands give 26 bands,
/// one of which the header consumes, so 25 data rows fit per page.
pub fn sample_table(rows: usize, title: Option<&str>) -> Table {
    let mut builder = Table::builder()
        .columns(vec![
            Column::new("FirstName", 90.0),
            Column::new("LastName", 90.0),
            Column::new("Email", 230.0),
        ])
        .rows(
            (1..=rows)
                .map(|i| {
                    vec![
                        format!("FirstName-{i}"),
                        format!("LastName-{i}"),
                        format!("fakemail@mock.com-{i}"),
                    ]
                })
                .collect(),
        )
        .page_size(PageSize::A3)
        .row_height(15.0)
        .cell_margin(2.0)
        .margin(20.0)
        .font_size(10.0)
        .height(400.0);
    if let Some(title) = title {
        builder = builder.title(title);
    }
    builder.build().expect("valid table")
}

/// TTF files found in the platform font directories, for tests that need a
/// real embeddable font. May be empty on a machine without installed fonts.
pub fn system_ttf_candidates() -> Vec<std::path::PathBuf> {
    let mut dirs: Vec<std::path::PathBuf> =
        vec!["/usr/share/fonts".into(), "/usr/local/share/fonts".into()];
    if let Ok(home) = std::env::var("HOME") {
        dirs.push(std::path::PathBuf::from(home).join(".local/share/fonts"));
    }

    let mut found = Vec::new();
    while let Some(dir) = dirs.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                dirs.push(path);
            } else if path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("ttf"))
            {
                found.push(path);
            }
            if found.len() >= 8 {
                return found;
            }
        }
    }
    found
}

/// Number of pages in the document, by counting page objects in the tree.
pub fn page_count(pdf: &[u8]) -> usize {
    count_occurrences(pdf, b"/Parent ")
}

pub fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .filter(|w| *w == needle)
        .count()
}

/// Inflate every Flate-compressed stream in the document. With the built-in
/// Helvetica font the only streams are the per-page content streams, in page
/// order.
pub fn content_streams(pdf: &[u8]) -> Vec<Vec<u8>> {
    let mut streams = Vec::new();
    let mut pos = 0;
    while let Some(start) = find(&pdf[pos..], b"stream\n") {
        let data_start = pos + start + b"stream\n".len();
        let Some(end) = find(&pdf[data_start..], b"endstream") else {
            break;
        };
        let mut data = &pdf[data_start..data_start + end];
        if let Some(stripped) = data.strip_suffix(b"\n") {
            data = stripped;
        }
        if let Ok(raw) = miniz_oxide::inflate::decompress_to_vec_zlib(data) {
            streams.push(raw);
        }
        pos = data_start + end + b"endstream".len();
    }
    streams
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Count occurrences of a content-stream operator token.
pub fn op_count(ops: &[u8], op: &str) -> usize {
    String::from_utf8_lossy(ops)
        .split_whitespace()
        .filter(|tok| *tok == op)
        .count()
}
