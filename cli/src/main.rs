//! pdf2csv CLI - reconstruct CSV tables from PDF text

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdf2csv::{
    ConvertObserver, ConvertOptions, ConvertReport, EncodingMode, ExtractMode, PageProgress,
    PageSelection, RecordTerminator, RunState, TableConverter, DEFAULT_BOUNDARY_PATTERN,
};

#[derive(Parser, Debug)]
#[command(name = "pdf2csv")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert tabular text in PDF files to CSV", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output CSV file
    #[arg(short, long, value_name = "FILE", default_value = "output.csv")]
    output: PathBuf,

    /// Output encoding
    #[arg(
        short = 'e',
        long = "enc",
        value_enum,
        default_value_t = Encoding::Utf8,
        env = "PDF2CSV_ENCODING"
    )]
    encoding: Encoding,

    /// Column boundary regular expression
    #[arg(
        short,
        long,
        value_name = "REGEX",
        default_value = DEFAULT_BOUNDARY_PATTERN,
        env = "PDF2CSV_SEP"
    )]
    sep: String,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long, value_parser = parse_pages)]
    pages: Option<PageSelection>,

    /// Text extraction mode
    #[arg(long, value_enum, default_value_t = Mode::Plain)]
    mode: Mode,

    /// Field delimiter (single ASCII character, or "tab")
    #[arg(long, value_parser = parse_delimiter, default_value = ",")]
    delimiter: u8,

    /// Terminate records with CRLF instead of LF
    #[arg(long)]
    crlf: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Encoding {
    /// UTF-8 with byte-order marker
    Utf8,
    /// Shift_JIS
    Sjis,
}

impl From<Encoding> for EncodingMode {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Utf8 => EncodingMode::Utf8WithMarker,
            Encoding::Sjis => EncodingMode::ShiftJis,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Whole-page text from the PDF library
    Plain,
    /// One line per text-showing operator
    Items,
}

impl From<Mode> for ExtractMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Plain => ExtractMode::PlainText,
            Mode::Items => ExtractMode::TextItems,
        }
    }
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        let terminator = if self.crlf {
            RecordTerminator::Crlf
        } else {
            RecordTerminator::Lf
        };

        ConvertOptions::new()
            .with_pattern(self.sep.clone())
            .with_encoding(self.encoding.into())
            .with_extract_mode(self.mode.into())
            .with_delimiter(self.delimiter)
            .with_terminator(terminator)
            .with_pages(self.pages.clone().unwrap_or_default())
    }
}

fn parse_pages(s: &str) -> Result<PageSelection, String> {
    PageSelection::parse(s).map_err(|e| e.to_string())
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(format!("expected a single ASCII character, got {s:?}")),
        },
    }
}

/// Renders run progress as a page progress bar.
struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    fn new(hidden: bool) -> Result<Self, Box<dyn std::error::Error>> {
        if hidden {
            return Ok(Self {
                bar: ProgressBar::hidden(),
            });
        }

        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        Ok(Self { bar })
    }
}

impl ConvertObserver for ProgressObserver {
    fn on_state(&mut self, state: RunState) {
        match state {
            RunState::Idle | RunState::Processing { .. } => {}
            RunState::Opened => self.bar.set_message("Reading pages..."),
            RunState::Flushing => self.bar.set_message("Flushing..."),
            RunState::Closed => self.bar.finish_and_clear(),
            RunState::Failed => self.bar.abandon(),
        }
    }

    fn on_page(&mut self, progress: &PageProgress) {
        self.bar.set_length(u64::from(progress.total));
        self.bar.set_position(u64::from(progress.number));
        if progress.null {
            self.bar
                .set_message(format!("page {} is empty", progress.number));
        } else {
            self.bar
                .set_message(format!("{} rows on page {}", progress.rows, progress.number));
        }
    }
}

fn run(cli: &Cli) -> pdf2csv::Result<ConvertReport> {
    log::debug!("{:?}", cli);
    let converter = TableConverter::new(cli.options())?;
    let mut observer = ProgressObserver::new(cli.quiet || cli.json).map_err(|e| {
        pdf2csv::Error::Io(std::io::Error::other(e.to_string()))
    })?;
    converter.convert_file_with_observer(&cli.input, &cli.output, &mut observer)
}

fn print_summary(cli: &Cli, report: &ConvertReport) {
    println!(
        "{} {} (encoding={})",
        "Done ->".green().bold(),
        cli.output.display(),
        report.encoding.short_name()
    );

    if cli.quiet {
        return;
    }

    println!(
        "  {} {} rows from {} pages",
        "├─".dimmed(),
        report.row_count,
        report.pages_converted
    );
    if report.null_pages > 0 {
        println!(
            "  {} {} empty pages skipped",
            "├─".dimmed(),
            report.null_pages
        );
    }
    if report.is_ragged() {
        println!(
            "  {} {}",
            "└─".dimmed(),
            format!(
                "rows have between {} and {} fields",
                report.min_fields, report.max_fields
            )
            .yellow()
        );
    } else {
        println!("  {} {} fields per row", "└─".dimmed(), report.max_fields);
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(report) if cli.json => match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{}: {}", "Error".red().bold(), e);
                process::exit(1);
            }
        },
        Ok(report) => print_summary(&cli, &report),
        Err(e) => {
            eprintln!("{} [{}]: {}", "Error".red().bold(), e.stage(), e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsString;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["pdf2csv", "in.pdf"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("output.csv"));
        assert_eq!(cli.delimiter, b',');
        assert_eq!(cli.mode, Mode::Plain);

        let options = cli.options();
        assert_eq!(options.terminator, RecordTerminator::Lf);
        assert_eq!(options.pages, PageSelection::All);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "pdf2csv",
            "in.pdf",
            "-o",
            "out.csv",
            "-e",
            "sjis",
            "-s",
            r"\t+",
            "--pages",
            "2-3",
            "--mode",
            "items",
            "--delimiter",
            "tab",
            "--crlf",
        ])
        .unwrap();

        let options = cli.options();
        assert_eq!(options.encoding, EncodingMode::ShiftJis);
        assert_eq!(options.extract_mode, ExtractMode::TextItems);
        assert_eq!(options.delimiter, b'\t');
        assert_eq!(options.terminator, RecordTerminator::Crlf);
        assert_eq!(options.pages, PageSelection::Range(2..=3));
        assert!(TableConverter::new(options).is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["pdf2csv", "in.pdf", "-e", "latin1"]).is_err());
        assert!(Cli::try_parse_from(["pdf2csv", "in.pdf", "--pages", "0"]).is_err());
        assert!(Cli::try_parse_from(["pdf2csv", "in.pdf", "--delimiter", ";;"]).is_err());
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert_eq!(parse_delimiter("\\t"), Ok(b'\t'));
        assert!(parse_delimiter("é").is_err());
        assert!(parse_delimiter("").is_err());
    }

    #[test]
    fn test_missing_input_fails_in_open_stage() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.pdf");
        let output = dir.path().join("out.csv");
        let args: Vec<OsString> = vec![
            "pdf2csv".into(),
            missing.into_os_string(),
            "-o".into(),
            output.clone().into_os_string(),
            "-q".into(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        let err = run(&cli).unwrap_err();
        assert_eq!(err.stage(), "open");
        assert!(!output.exists());
    }
}
