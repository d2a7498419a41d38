mod error;
mod fonts;
mod model;
mod pdf;

pub use error::Error;
pub use model::{Column, FontSpec, PageSize, Table, TableBuilder};

use std::path::Path;
use std::time::Instant;

/// Render the table into a paginated PDF and return the serialized bytes.
pub fn generate(table: &Table) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();

    let bytes = pdf::render(table)?;

    log::info!(
        "Timing: render={:.1}ms (output {} bytes)",
        t0.elapsed().as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(bytes)
}

/// Render the table and write the PDF to `output`.
pub fn generate_to_file(table: &Table, output: &Path) -> Result<(), Error> {
    let t0 = Instant::now();

    let bytes = pdf::render(table)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_render.as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}
