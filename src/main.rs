use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use tablegen_pdf::{Column, Error, FontSpec, PageSize, Table};

#[derive(Parser)]
#[command(name = "tablegen-pdf")]
#[command(version)]
#[command(about = "Render delimited tabular data as a paginated PDF table", long_about = None)]
struct Cli {
    /// Input file; the first record is the header row
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output PDF file
    #[arg(value_name = "PDF")]
    output: PathBuf,

    /// Field delimiter (no quoting support)
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Table title rendered above the header on the first page
    #[arg(short, long)]
    title: Option<String>,

    /// Page size
    #[arg(long, value_enum, default_value = "a4")]
    page_size: PageSizeArg,

    /// Rotate pages 90 degrees and lay the table along the long edge
    #[arg(short, long)]
    landscape: bool,

    /// Font family looked up in the system font directories
    #[arg(long)]
    font: Option<String>,

    /// Explicit TTF/OTF font file (takes precedence over --font)
    #[arg(long, value_name = "FILE")]
    font_file: Option<PathBuf>,

    /// Font size in points
    #[arg(long, default_value_t = 10.0)]
    font_size: f32,

    /// Row band height in points
    #[arg(long, default_value_t = 15.0)]
    row_height: f32,

    /// Page margin in points
    #[arg(long, default_value_t = 20.0)]
    margin: f32,

    /// Horizontal text inset within a cell, in points
    #[arg(long, default_value_t = 2.0)]
    cell_margin: f32,
}

#[derive(Clone, Copy, ValueEnum)]
enum PageSizeArg {
    A3,
    A4,
    Letter,
}

impl PageSizeArg {
    fn size(self) -> PageSize {
        match self {
            PageSizeArg::A3 => PageSize::A3,
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::LETTER,
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let input = std::fs::read_to_string(&cli.input)?;
    let mut records = input
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.split(cli.delimiter)
                .map(|field| field.trim().to_string())
                .collect::<Vec<String>>()
        });

    let header = records
        .next()
        .ok_or_else(|| Error::Config(format!("{} is empty", cli.input.display())))?;

    let size = cli.page_size.size();
    let usable_width = if cli.landscape {
        size.height - 2.0 * cli.margin
    } else {
        size.width - 2.0 * cli.margin
    };
    // equal column widths; width computation is a CLI convenience only
    let width = usable_width / header.len() as f32;
    let columns: Vec<Column> = header.into_iter().map(|name| Column::new(name, width)).collect();

    let font = if let Some(path) = cli.font_file {
        FontSpec::File(path)
    } else if let Some(family) = cli.font {
        FontSpec::Family(family)
    } else {
        FontSpec::Helvetica
    };

    let mut builder = Table::builder()
        .columns(columns)
        .rows(records.collect())
        .page_size(size)
        .landscape(cli.landscape)
        .font(font)
        .font_size(cli.font_size)
        .row_height(cli.row_height)
        .margin(cli.margin)
        .cell_margin(cli.cell_margin);
    if let Some(title) = cli.title {
        builder = builder.title(title);
    }
    let table = builder.build()?;

    tablegen_pdf::generate_to_file(&table, &cli.output)?;
    println!("{}", cli.output.display());
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
