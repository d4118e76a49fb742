//! Parsing of the line commands typed on stdin.

use std::path::{Path, PathBuf};

use translate_core::{Msg, SelectedFile};

pub const HELP_LINES: &[&str] = &[
    "Commands:",
    "  add <path>...            upload local files (no paths clears the selection)",
    "  delete <id>              delete an uploaded file",
    "  lang <code>              choose the target language",
    "  start                    start translating the uploaded files",
    "  download <id|filename>   save a translated file into the download directory",
    "  languages                list the target languages",
    "  help                     show this help",
    "  quit                     exit",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Msg),
    Languages,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`; the error is the text to show.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match keyword.to_ascii_lowercase().as_str() {
        "add" => Command::Dispatch(Msg::FilesSelected(
            rest.iter().map(|raw| selected_file(Path::new(raw))).collect(),
        )),
        "delete" => Command::Dispatch(Msg::DeleteClicked {
            file_id: single_argument("delete", "<id>", &rest)?,
        }),
        "lang" => Command::Dispatch(Msg::TargetLanguageChanged(single_argument(
            "lang", "<code>", &rest,
        )?)),
        "start" => Command::Dispatch(Msg::StartClicked),
        "download" => Command::Dispatch(Msg::DownloadClicked {
            target: single_argument("download", "<id|filename>", &rest)?,
        }),
        "languages" => Command::Languages,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("Unknown command {other:?}. Type `help` for a list.")),
    };
    Ok(Some(command))
}

fn single_argument(keyword: &str, placeholder: &str, rest: &[&str]) -> Result<String, String> {
    match rest {
        [value] => Ok((*value).to_string()),
        _ => Err(format!("Usage: {keyword} {placeholder}")),
    }
}

/// The core only sees the base name; the path travels along for the upload.
fn selected_file(path: &Path) -> SelectedFile {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    SelectedFile::new(name, PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_keeps_paths_and_names() {
        let command = parse("add docs/report.txt subs.SRT").unwrap();
        assert_eq!(
            command,
            Some(Command::Dispatch(Msg::FilesSelected(vec![
                SelectedFile::new("report.txt", "docs/report.txt"),
                SelectedFile::new("subs.SRT", "subs.SRT"),
            ])))
        );
    }

    #[test]
    fn bare_add_is_an_empty_selection() {
        assert_eq!(
            parse("add").unwrap(),
            Some(Command::Dispatch(Msg::FilesSelected(Vec::new())))
        );
    }

    #[test]
    fn single_argument_commands() {
        assert_eq!(
            parse("delete 3").unwrap(),
            Some(Command::Dispatch(Msg::DeleteClicked {
                file_id: "3".to_string()
            }))
        );
        assert_eq!(
            parse("  LANG ja ").unwrap(),
            Some(Command::Dispatch(Msg::TargetLanguageChanged("ja".to_string())))
        );
        assert_eq!(
            parse("download a_ko.txt").unwrap(),
            Some(Command::Dispatch(Msg::DownloadClicked {
                target: "a_ko.txt".to_string()
            }))
        );
        assert_eq!(parse("delete").unwrap_err(), "Usage: delete <id>");
        assert_eq!(parse("lang ko en").unwrap_err(), "Usage: lang <code>");
    }

    #[test]
    fn local_commands_and_blank_lines() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
        assert_eq!(parse("start").unwrap(), Some(Command::Dispatch(Msg::StartClicked)));
        assert_eq!(parse("languages").unwrap(), Some(Command::Languages));
        assert_eq!(parse("help").unwrap(), Some(Command::Help));
        assert_eq!(parse("quit").unwrap(), Some(Command::Quit));
        assert!(parse("translate now").is_err());
    }
}
