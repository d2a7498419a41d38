use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;

use crate::error::Error;
use crate::model::FontSpec;

/// FontBBox height of base-14 Helvetica: [-166 -225 1000 931] → 931 − (−225).
const HELVETICA_BBOX_HEIGHT: f32 = 1156.0;

/// A font registered in the output PDF, carrying the one metric the layout
/// consumes: the face's global bounding-box height in 1000-unit font space.
pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    pub(crate) bbox_height_1000: f32,
    /// Present for embedded CID fonts; absent for the Helvetica fallback,
    /// which encodes as WinAnsi bytes instead.
    char_to_gid: Option<HashMap<char, u16>>,
}

impl FontEntry {
    /// Encode a string for a `Tj` operator with this font.
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => encode_as_gids(text, map),
            None => to_winansi_bytes(text),
        }
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Unmappable characters are dropped.
fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .filter_map(|c| match c as u32 {
            0x0000..=0x007F => Some(c as u8),
            0x00A0..=0x00FF => Some(c as u8), // Latin-1 supplement maps directly
            0x20AC => Some(0x80),
            0x201A => Some(0x82),
            0x0192 => Some(0x83),
            0x201E => Some(0x84),
            0x2026 => Some(0x85),
            0x2020 => Some(0x86),
            0x2021 => Some(0x87),
            0x02C6 => Some(0x88),
            0x2030 => Some(0x89),
            0x0160 => Some(0x8A),
            0x2039 => Some(0x8B),
            0x0152 => Some(0x8C),
            0x017D => Some(0x8E),
            0x2018 => Some(0x91),
            0x2019 => Some(0x92),
            0x201C => Some(0x93),
            0x201D => Some(0x94),
            0x2022 => Some(0x95),
            0x2013 => Some(0x96),
            0x2014 => Some(0x97),
            0x02DC => Some(0x98),
            0x2122 => Some(0x99),
            0x0161 => Some(0x9A),
            0x203A => Some(0x9B),
            0x0153 => Some(0x9C),
            0x017E => Some(0x9E),
            0x0178 => Some(0x9F),
            _ => None,
        })
        .collect()
}

/// Encode UTF-8 text as big-endian 2-byte glyph IDs for CIDFont content streams.
fn encode_as_gids(text: &str, char_to_gid: &HashMap<char, u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = char_to_gid.get(&ch).copied().unwrap_or(0);
        out.push((gid >> 8) as u8);
        out.push((gid & 0xFF) as u8);
    }
    out
}

fn font_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    // User-configured directories take precedence
    if let Ok(val) = std::env::var("TABLEGEN_FONTS") {
        let sep = if cfg!(windows) { ';' } else { ':' };
        for part in val.split(sep) {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                dirs.push(PathBuf::from(trimmed));
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        dirs.extend([
            "/Library/Fonts".into(),
            "/System/Library/Fonts".into(),
            "/System/Library/Fonts/Supplemental".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend(["/usr/share/fonts".into(), "/usr/local/share/fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        } else {
            dirs.push("C:\\Windows\\Fonts".into());
        }
    }

    dirs
}

fn is_font_file(path: &std::path::Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("ttf" | "otf" | "ttc")
    )
}

fn is_font_collection(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ttc"))
}

fn font_family_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

/// Walk the system font directories looking for a face whose family name
/// matches (case-insensitively). Returns the file path and face index.
fn find_font_file(family: &str) -> Option<(PathBuf, u32)> {
    let t0 = std::time::Instant::now();
    let wanted = family.to_lowercase();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut stack: Vec<PathBuf> = font_directories();
    let mut files_scanned = 0u32;

    while let Some(dir) = stack.pop() {
        if !visited.insert(dir.clone()) {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if !is_font_file(&path) {
                continue;
            }
            files_scanned += 1;
            let Ok(file) = std::fs::File::open(&path) else {
                continue;
            };
            let Ok(data) = (unsafe { Mmap::map(&file) }) else {
                continue;
            };
            let face_count = if is_font_collection(&path) {
                ttf_parser::fonts_in_collection(&data).unwrap_or(1)
            } else {
                1
            };
            for face_idx in 0..face_count {
                let Ok(face) = Face::parse(&data, face_idx) else {
                    continue;
                };
                if font_family_name(&face).is_some_and(|f| f.to_lowercase() == wanted) {
                    log::info!(
                        "Font lookup: {family:?} → {} (face {face_idx}), {} files in {:.1}ms",
                        path.display(),
                        files_scanned,
                        t0.elapsed().as_secs_f64() * 1000.0,
                    );
                    return Some((path, face_idx));
                }
            }
        }
    }

    log::warn!(
        "Font lookup: {family:?} not found ({} files in {:.1}ms)",
        files_scanned,
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    None
}

/// Embed a TrueType/OpenType font as a CIDFont (Type0 composite) with
/// Identity-H encoding, subsetted to the glyphs actually used. Returns the
/// global bounding-box height in 1000-unit space and the char→gid map.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    descriptor_ref: Ref,
    data_ref: Ref,
    font_name: &str,
    font_data: &[u8],
    face_index: u32,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Option<(f32, HashMap<char, u16>)> {
    let face = Face::parse(font_data, face_index).ok()?;

    let units = face.units_per_em() as f32;
    let ascent = face.ascender() as f32 / units * 1000.0;
    let descent = face.descender() as f32 / units * 1000.0;
    let cap_height = face
        .capital_height()
        .map(|h| h as f32 / units * 1000.0)
        .unwrap_or(700.0);

    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        bb.x_min as f32 / units * 1000.0,
        bb.y_min as f32 / units * 1000.0,
        bb.x_max as f32 / units * 1000.0,
        bb.y_max as f32 / units * 1000.0,
    );
    let bbox_height_1000 = (bb.y_max as f32 - bb.y_min as f32) / units * 1000.0;

    // Remap in sorted character order: glyph ids and CMap pairs must not
    // depend on set iteration order, or identical inputs produce different
    // bytes.
    let mut chars: Vec<char> = used_chars.iter().copied().collect();
    chars.sort_unstable();

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut char_to_gid = HashMap::new();
    let mut cmap_pairs: Vec<(char, u16)> = Vec::new();
    let mut gid_widths: Vec<(u16, f32)> = Vec::new();
    for ch in chars {
        if let Some(gid) = face.glyph_index(ch) {
            let new_gid = remapper.remap(gid.0);
            char_to_gid.insert(ch, new_gid);
            cmap_pairs.push((ch, new_gid));
            let w = face
                .glyph_hor_advance(gid)
                .map(|adv| adv as f32 / units * 1000.0)
                .unwrap_or(0.0);
            gid_widths.push((new_gid, w));
        }
    }

    let subset_data = subsetter::subset(font_data, face_index, &remapper).unwrap_or_else(|e| {
        log::warn!("Font subsetting failed for {font_name}: {e} — embedding full font");
        font_data.to_vec()
    });

    let data_len = i32::try_from(subset_data.len()).ok()?;
    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    let ps_name = font_name.replace(' ', "");

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(ascent)
        .descent(descent)
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let cid_font_ref = alloc();
    let system_info = pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info);
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        gid_widths.sort_by_key(|&(gid, _)| gid);
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let tounicode_ref = alloc();
    let cmap_name = format!("{}-UTF16", ps_name);
    let mut cmap = pdf_writer::types::UnicodeCmap::new(
        Name(cmap_name.as_bytes()),
        pdf_writer::types::SystemInfo {
            registry: pdf_writer::Str(b"Adobe"),
            ordering: pdf_writer::Str(b"Identity"),
            supplement: 0,
        },
    );
    for &(ch, new_gid) in &cmap_pairs {
        cmap.pair(new_gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Some((bbox_height_1000, char_to_gid))
}

fn fallback_helvetica(pdf: &mut Pdf, font_ref: Ref, pdf_name: String) -> FontEntry {
    pdf.type1_font(font_ref)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    FontEntry {
        pdf_name,
        font_ref,
        bbox_height_1000: HELVETICA_BBOX_HEIGHT,
        char_to_gid: None,
    }
}

/// Resolve a [`FontSpec`] and register the font in the PDF. `used_chars`
/// drives glyph subsetting for embedded fonts.
pub(crate) fn register_font(
    pdf: &mut Pdf,
    spec: &FontSpec,
    pdf_name: String,
    alloc: &mut impl FnMut() -> Ref,
    used_chars: &HashSet<char>,
) -> Result<FontEntry, Error> {
    let t0 = std::time::Instant::now();
    let font_ref = alloc();

    let entry = match spec {
        FontSpec::Helvetica => fallback_helvetica(pdf, font_ref, pdf_name),
        FontSpec::Family(family) => {
            let descriptor_ref = alloc();
            let data_ref = alloc();
            let embedded = find_font_file(family).and_then(|(path, face_index)| {
                let data = std::fs::read(&path).ok()?;
                embed_truetype(
                    pdf,
                    font_ref,
                    descriptor_ref,
                    data_ref,
                    family,
                    &data,
                    face_index,
                    used_chars,
                    alloc,
                )
            });
            match embedded {
                Some((bbox_height_1000, char_to_gid)) => FontEntry {
                    pdf_name,
                    font_ref,
                    bbox_height_1000,
                    char_to_gid: Some(char_to_gid),
                },
                None => {
                    log::warn!("Font not found: {family} — using Helvetica");
                    fallback_helvetica(pdf, font_ref, pdf_name)
                }
            }
        }
        FontSpec::File(path) => {
            let descriptor_ref = alloc();
            let data_ref = alloc();
            let data = std::fs::read(path)
                .map_err(|e| Error::Font(format!("cannot read {}: {e}", path.display())))?;
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Embedded");
            let (bbox_height_1000, char_to_gid) = embed_truetype(
                pdf,
                font_ref,
                descriptor_ref,
                data_ref,
                name,
                &data,
                0,
                used_chars,
                alloc,
            )
            .ok_or_else(|| Error::Font(format!("cannot parse font file {}", path.display())))?;
            FontEntry {
                pdf_name,
                font_ref,
                bbox_height_1000,
                char_to_gid: Some(char_to_gid),
            }
        }
    };

    log::debug!(
        "register_font: {spec:?} → bbox height {:.0}/1000, {:.1}ms",
        entry.bbox_height_1000,
        t0.elapsed().as_secs_f64() * 1000.0,
    );

    Ok(entry)
}
