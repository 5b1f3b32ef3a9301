//! `folio`: export saved pages from the command line.
//!
//! ```text
//! folio export [--format html|txt] [--lang <code>] [-o <file>] <input>...
//! folio check <input>...
//! ```
//!
//! An input is either a JSON array of pages (as the editor saves them) or
//! an HTML fragment, which becomes one page. `-` reads a fragment from stdin.

use folio_core::{BorderSettings, Language, Page, PageIdAllocator, parse_fragment};
use folio_export::{ExportFormat, export_text_format};
use std::io::Read;
use std::path::Path;

const USAGE: &str = "usage:
  folio export [--format html|txt] [--lang <code>] [-o <file>] <input>...
  folio check <input>...";

#[derive(Debug, PartialEq)]
enum Command {
    Export {
        format: ExportFormat,
        language: Language,
        output: Option<String>,
        inputs: Vec<String>,
    },
    Check {
        inputs: Vec<String>,
    },
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let Some((command, rest)) = args.split_first() else {
        return Err(USAGE.to_string());
    };
    match command.as_str() {
        "export" => {
            let mut format = ExportFormat::Text;
            let mut language = Language::default();
            let mut output = None;
            let mut inputs = Vec::new();
            let mut it = rest.iter();
            while let Some(arg) = it.next() {
                match arg.as_str() {
                    "--format" | "-f" => {
                        let value = it.next().ok_or("--format needs a value")?;
                        format = value.parse().map_err(|e| format!("{e}"))?;
                        if format == ExportFormat::Pdf {
                            return Err("PDF export needs a browser; use html or txt".into());
                        }
                    }
                    "--lang" | "-l" => {
                        language = it.next().ok_or("--lang needs a value")?.parse()?;
                    }
                    "-o" | "--output" => {
                        output = Some(it.next().ok_or("-o needs a file name")?.clone());
                    }
                    _ => inputs.push(arg.clone()),
                }
            }
            if inputs.is_empty() {
                return Err(format!("no input given\n{USAGE}"));
            }
            Ok(Command::Export {
                format,
                language,
                output,
                inputs,
            })
        }
        "check" if !rest.is_empty() => Ok(Command::Check {
            inputs: rest.to_vec(),
        }),
        _ => Err(USAGE.to_string()),
    }
}

fn read_input(input: &str) -> Result<String, String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("stdin: {e}"))?;
        return Ok(text);
    }
    std::fs::read_to_string(input).map_err(|e| format!("{input}: {e}"))
}

/// Pages from one input: a saved page array, or a single fragment.
fn pages_from(input: &str, text: &str, ids: &mut PageIdAllocator) -> Result<Vec<Page>, String> {
    let is_json = Path::new(input)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return serde_json::from_str(text).map_err(|e| format!("{input}: {e}"));
    }
    Ok(vec![Page {
        id: ids.next(0),
        content: text.to_string(),
        border: BorderSettings::default(),
    }])
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Export {
            format,
            language,
            output,
            inputs,
        } => {
            let mut ids = PageIdAllocator::default();
            let mut pages = Vec::new();
            for input in &inputs {
                let text = read_input(input)?;
                pages.extend(pages_from(input, &text, &mut ids)?);
            }
            log::info!("exporting {} pages as {format:?}", pages.len());
            let data = export_text_format(format, &pages, language).map_err(|e| e.to_string())?;
            match output {
                Some(path) => {
                    std::fs::write(&path, data).map_err(|e| format!("{path}: {e}"))?;
                    log::info!("wrote {path}");
                }
                None => print!("{data}"),
            }
            Ok(())
        }
        Command::Check { inputs } => {
            let mut failed = 0;
            for input in &inputs {
                let text = read_input(input)?;
                let mut ids = PageIdAllocator::default();
                for (i, page) in pages_from(input, &text, &mut ids)?.iter().enumerate() {
                    if let Err(e) = parse_fragment(&page.content) {
                        eprintln!("{input}: page {i}: {e}");
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                return Err(format!("{failed} page(s) failed to parse"));
            }
            Ok(())
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = parse_args(&args).and_then(run);
    if let Err(e) = result {
        eprintln!("folio: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::PageId;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn export_defaults_to_text() {
        assert_eq!(
            parse_args(&args(&["export", "form.html"])),
            Ok(Command::Export {
                format: ExportFormat::Text,
                language: Language::English,
                output: None,
                inputs: vec!["form.html".into()],
            })
        );
    }

    #[test]
    fn export_options() {
        let parsed = parse_args(&args(&[
            "export", "--format", "html", "--lang", "telugu", "-o", "out.html", "a.json", "b.html",
        ]));
        assert_eq!(
            parsed,
            Ok(Command::Export {
                format: ExportFormat::Html,
                language: Language::Telugu,
                output: Some("out.html".into()),
                inputs: vec!["a.json".into(), "b.html".into()],
            })
        );
    }

    #[test]
    fn pdf_is_refused() {
        assert!(parse_args(&args(&["export", "-f", "pdf", "a.html"])).is_err());
    }

    #[test]
    fn unknown_command_prints_usage() {
        assert_eq!(parse_args(&args(&["render"])), Err(USAGE.to_string()));
        assert_eq!(parse_args(&args(&[])), Err(USAGE.to_string()));
    }

    #[test]
    fn fragment_input_is_one_page() {
        let mut ids = PageIdAllocator::default();
        let a = pages_from("a.html", "<p>A</p>", &mut ids).unwrap();
        let b = pages_from("b.html", "<p>B</p>", &mut ids).unwrap();
        assert_eq!(a[0].content, "<p>A</p>");
        assert!(b[0].id > a[0].id);
    }

    #[test]
    fn json_input_is_a_page_array() {
        let json = r#"[{"id":1,"content":"<p>One</p>"},{"id":2,"content":"<p>Two</p>"}]"#;
        let mut ids = PageIdAllocator::default();
        let pages = pages_from("doc.json", json, &mut ids).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].id, PageId::from_millis(2));
        assert_eq!(pages[1].border, BorderSettings::default());
    }
}
