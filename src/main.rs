//! bookforge – command-line book → PDF exporter.
//!
//! Usage:
//!   bookforge <book.json> [output_dir] [--size pocket|letter|a4] [--bleed]
//!
//! The PDF is written to `output_dir` (default: current directory) as
//! `{slug(title)}_{size}.pdf`.

use std::{env, fs, path::PathBuf, process, time::Duration};

use book_forge::book::{Book, ExportConfig, PageSize};
use book_forge::images::{HttpImageLoader, ImageLoader, NoImages};
use book_forge::manuscript::parse_book_json;
use book_forge::painter::PainterPolicy;
use book_forge::pipeline::{export_book, write_export};
use book_forge::templates;

/// Parsed command line.
#[derive(Debug, Default)]
struct CliArgs {
    input_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    layout_path: Option<PathBuf>,
    page_size: PageSize,
    bleed: bool,
    author: String,
    sample: bool,
    offline: bool,
    help: bool,
    timeout_secs: Option<u64>,
    policy: PainterPolicy,
}

/// Parse everything after the program name. With `--sample` there is no
/// input file, so the only positional is the output directory wherever the
/// flag appears.
fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs {
        sample: args.iter().any(|a| a == "--sample"),
        ..CliArgs::default()
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--size" | "-s" => match iter.next() {
                Some(v) => cli.page_size = PageSize::parse(v),
                None => return Err("--size needs a value".to_string()),
            },
            "--bleed" | "-b" => cli.bleed = true,
            "--author" | "-a" => match iter.next() {
                Some(v) => cli.author = v.clone(),
                None => return Err("--author needs a value".to_string()),
            },
            "--layout-json" => match iter.next() {
                Some(v) => cli.layout_path = Some(PathBuf::from(v)),
                None => return Err("--layout-json needs a path".to_string()),
            },
            "--timeout" => match iter.next().and_then(|v| v.parse().ok()) {
                Some(secs) => cli.timeout_secs = Some(secs),
                None => return Err("--timeout needs a number of seconds".to_string()),
            },
            "--no-back-cover" => cli.policy.include_back_cover = false,
            "--no-author-band" => cli.policy.draw_author_band = false,
            "--no-page-numbers" => cli.policy.page_numbers = false,
            "--offline" => cli.offline = true,
            "--sample" => {}
            "--help" | "-h" => cli.help = true,
            other if other.starts_with('-') => {
                return Err(format!("Unknown flag: {other}"));
            }
            path => {
                if !cli.sample && cli.input_path.is_none() {
                    cli.input_path = Some(PathBuf::from(path));
                } else if cli.output_dir.is_none() {
                    cli.output_dir = Some(PathBuf::from(path));
                } else {
                    return Err(format!("Unexpected argument: {path}"));
                }
            }
        }
    }
    Ok(cli)
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("bookforge");

    let cli = match parse_args(args.get(1..).unwrap_or_default()) {
        Ok(cli) => cli,
        Err(msg) => fail_usage(prog, &msg),
    };
    if cli.help {
        print_usage(prog);
        process::exit(0);
    }
    let CliArgs {
        input_path,
        output_dir,
        layout_path,
        page_size,
        bleed,
        author,
        sample,
        offline,
        timeout_secs,
        policy,
        ..
    } = cli;

    let book = if sample {
        load_sample()
    } else {
        let input = match input_path {
            Some(p) => p,
            None => fail_usage(prog, "Error: no input file specified."),
        };
        let json = match fs::read_to_string(&input) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error reading '{}': {e}", input.display());
                process::exit(1);
            }
        };
        match parse_book_json(&json, &author) {
            Ok(book) => book,
            Err(e) => {
                eprintln!("Error parsing '{}': {e}", input.display());
                process::exit(1);
            }
        }
    };

    let config = ExportConfig::new(page_size, bleed);
    let http = HttpImageLoader::with_timeout(
        timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(book_forge::images::DEFAULT_TIMEOUT),
    );
    let loader: &dyn ImageLoader = if offline { &NoImages } else { &http };

    let export = match export_book(&book, &config, &policy, loader) {
        Ok(export) => export,
        Err(e) => {
            eprintln!("Error generating PDF: {e}");
            process::exit(1);
        }
    };

    let dir = output_dir.unwrap_or_default();
    let path = match write_export(&export, &dir) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if let Some(layout_path) = layout_path {
        if let Err(e) = fs::write(&layout_path, export.layout.to_json()) {
            eprintln!("Error writing '{}': {e}", layout_path.display());
            process::exit(1);
        }
    }

    let pages = export.page_count();
    eprintln!(
        "Wrote '{}' ({} bytes, {} page{})",
        path.display(),
        export.bytes.len(),
        pages,
        if pages == 1 { "" } else { "s" }
    );
}

fn load_sample() -> Book {
    match templates::novella() {
        Ok(book) => book,
        Err(e) => {
            eprintln!("Error loading sample book: {e}");
            process::exit(1);
        }
    }
}

fn fail_usage(prog: &str, msg: &str) -> ! {
    eprintln!("{msg}");
    print_usage(prog);
    process::exit(1);
}

fn print_usage(prog: &str) {
    eprintln!("bookforge – book to PDF exporter (book-forge)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <book.json> [output_dir] [--size pocket|letter|a4] [--bleed]");
    eprintln!("  {prog} --sample [output_dir]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <book.json>    Editor book JSON, or a structuring-service response (has \"coverPrompt\")");
    eprintln!("  [output_dir]   Directory for {{slug}}_{{size}}.pdf (default: current directory)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --size, -s          Trim size: pocket, letter or a4 (unknown values use a4)");
    eprintln!("  --bleed, -b         Add 5 mm to every margin");
    eprintln!("  --author, -a        Author name when the input has none");
    eprintln!("  --layout-json PATH  Also write the page layout as JSON");
    eprintln!("  --timeout SECS      Per-image fetch timeout (default 15)");
    eprintln!("  --offline           Do not load any images");
    eprintln!("  --no-back-cover     Omit the back cover");
    eprintln!("  --no-author-band    No dark band behind the author on the cover");
    eprintln!("  --no-page-numbers   No page numbers on chapter pages");
    eprintln!("  --sample            Export the built-in sample novella");
    eprintln!("  --help              Print this message");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn input_then_output_dir() {
        let cli = parse_args(&args(&["book.json", "out", "--size", "pocket", "-b"])).unwrap();
        assert_eq!(cli.input_path, Some(PathBuf::from("book.json")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.page_size, PageSize::Pocket);
        assert!(cli.bleed);
    }

    #[test]
    fn sample_positional_is_output_dir_in_any_order() {
        for list in [["out", "--sample"], ["--sample", "out"]] {
            let cli = parse_args(&args(&list)).unwrap();
            assert!(cli.sample);
            assert_eq!(cli.input_path, None);
            assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        }
    }

    #[test]
    fn policy_flags_and_errors() {
        let cli = parse_args(&args(&["--no-back-cover", "--no-page-numbers", "b.json"])).unwrap();
        assert!(!cli.policy.include_back_cover);
        assert!(!cli.policy.page_numbers);
        assert!(cli.policy.draw_author_band);

        assert!(parse_args(&args(&["--size"])).is_err());
        assert!(parse_args(&args(&["--timeout", "soon"])).is_err());
        assert!(parse_args(&args(&["--frobnicate"])).is_err());
        assert!(parse_args(&args(&["a.json", "out", "extra"])).is_err());
    }
}
