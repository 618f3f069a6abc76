//! The privileged side of the bridge: answers requests against the real
//! file system and a dialog prompt.

use crate::bridge::{DialogOptions, DialogSelection};
use crate::ipc::{IpcHandle, Request, Response};
use crate::pane::FileStats;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Presents save/open dialogs to the user
pub trait DialogPrompt {
    fn save(&mut self, options: &DialogOptions) -> io::Result<DialogSelection>;

    fn open(&mut self, options: &DialogOptions) -> io::Result<DialogSelection>;
}

/// Asks for paths on a line-oriented terminal.
///
/// An empty line or end of input cancels. Several whitespace-separated
/// paths yield a multiple selection; wrap a path in double quotes to keep
/// its spaces. Relative paths resolve against the dialog's default path.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, options: &DialogOptions) -> io::Result<DialogSelection> {
        write!(self.output, "{}", options.title)?;
        if let Some(default) = &options.default_path {
            write!(self.output, " [{}]", default.display())?;
        }
        write!(self.output, ": ")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;

        let paths: Vec<PathBuf> = split_paths(&line)
            .iter()
            .map(|p| resolve(options.default_path.as_deref(), p))
            .collect();

        Ok(match <[PathBuf; 1]>::try_from(paths) {
            Ok([path]) => DialogSelection::Single(path),
            Err(paths) => DialogSelection::Multiple(paths),
        })
    }
}

impl<R: BufRead, W: Write> DialogPrompt for TerminalPrompt<R, W> {
    fn save(&mut self, options: &DialogOptions) -> io::Result<DialogSelection> {
        self.ask(options)
    }

    fn open(&mut self, options: &DialogOptions) -> io::Result<DialogSelection> {
        self.ask(options)
    }
}

/// Split on whitespace outside double quotes. Quotes are dropped.
fn split_paths(line: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut started = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                started = true;
            }
            c if c.is_whitespace() && !quoted => {
                if started {
                    paths.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }
    if started {
        paths.push(current);
    }
    paths.retain(|p| !p.is_empty());
    paths
}

fn resolve(base: Option<&Path>, path: &str) -> PathBuf {
    let path = Path::new(path);
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

/// Answers bridge requests
pub struct Host<P> {
    prompt: P,
}

impl<P: DialogPrompt> Host<P> {
    pub fn new(prompt: P) -> Self {
        Self { prompt }
    }

    pub fn handle(&mut self, request: &Request) -> Response {
        match request {
            Request::Ping => Response::ok(),
            Request::SaveFile { filename, content } => match std::fs::write(filename, content) {
                Ok(()) => {
                    log::info!("Saved {} ({} bytes)", filename.display(), content.len());
                    Response::ok()
                }
                Err(e) => Response::error(format!("Failed to save {}: {}", filename.display(), e)),
            },
            Request::SaveDialog { options } => match self.prompt.save(options) {
                Ok(selection) => Response::with_result(selection),
                Err(e) => Response::error(format!("Save dialog failed: {}", e)),
            },
            Request::OpenDialog { options } => match self.prompt.open(options) {
                Ok(selection) => Response::with_result(selection),
                Err(e) => Response::error(format!("Open dialog failed: {}", e)),
            },
            Request::FileStats { filename } => match std::fs::metadata(filename) {
                Ok(meta) => Response::with_result(FileStats::from(&meta)),
                Err(e) => Response::error(format!("Failed to stat {}: {}", filename.display(), e)),
            },
            Request::ReadFile { filename } => match std::fs::read_to_string(filename) {
                Ok(content) => Response::with_result(content),
                Err(e) => Response::error(format!("Failed to read {}: {}", filename.display(), e)),
            },
        }
    }

    /// Answer requests until the listener goes away
    pub fn serve(&mut self, handle: &IpcHandle) {
        while let Some(pending) = handle.wait() {
            log::debug!("IPC request: {:?}", pending.request);
            let response = self.handle(&pending.request);
            if let Some(error) = &response.error {
                log::error!("{}", error);
            }
            pending.respond(response);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::DialogProperty;
    use std::io::Cursor;

    struct FixedPrompt(DialogSelection);

    impl DialogPrompt for FixedPrompt {
        fn save(&mut self, _: &DialogOptions) -> io::Result<DialogSelection> {
            Ok(self.0.clone())
        }

        fn open(&mut self, _: &DialogOptions) -> io::Result<DialogSelection> {
            Ok(self.0.clone())
        }
    }

    fn prompt_answer(line: &str, options: &DialogOptions) -> (DialogSelection, String) {
        let mut output = Vec::new();
        let selection = TerminalPrompt::new(Cursor::new(line.to_string()), &mut output)
            .save(options)
            .unwrap();
        (selection, String::from_utf8(output).unwrap())
    }

    #[test]
    fn terminal_prompt_single_path() {
        let options = DialogOptions::new("Save File").default_path(Some("/work".into()));
        let (selection, shown) = prompt_answer("notes.txt\n", &options);
        assert_eq!(selection, DialogSelection::Single("/work/notes.txt".into()));
        assert_eq!(shown, "Save File [/work]: ");
    }

    #[test]
    fn terminal_prompt_multiple_and_absolute_paths() {
        let options = DialogOptions::new("Open").default_path(Some("/work".into()));
        let (selection, _) = prompt_answer("a.js /etc/b.js\n", &options);
        assert_eq!(
            selection,
            DialogSelection::Multiple(vec!["/work/a.js".into(), "/etc/b.js".into()])
        );
    }

    #[test]
    fn terminal_prompt_keeps_spaces_in_quoted_paths() {
        let options = DialogOptions::new("Save File").default_path(Some("/work".into()));
        let (selection, _) = prompt_answer("\"my notes.txt\"\n", &options);
        assert_eq!(selection, DialogSelection::Single("/work/my notes.txt".into()));

        let (selection, _) = prompt_answer("a.js \"/tmp/b c.js\"\n", &options);
        assert_eq!(
            selection,
            DialogSelection::Multiple(vec!["/work/a.js".into(), "/tmp/b c.js".into()])
        );
    }

    #[test]
    fn terminal_prompt_empty_line_cancels() {
        let options = DialogOptions::new("Open");
        let (selection, _) = prompt_answer("\n", &options);
        assert_eq!(selection.into_first(), None);

        let (selection, _) = prompt_answer("", &options);
        assert_eq!(selection, DialogSelection::Multiple(Vec::new()));
    }

    #[test]
    fn host_saves_and_stats_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut host = Host::new(FixedPrompt(DialogSelection::Multiple(Vec::new())));

        let response = host.handle(&Request::SaveFile {
            filename: path.clone(),
            content: "hello".into(),
        });
        assert!(response.ok);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");

        let response = host.handle(&Request::ReadFile {
            filename: path.clone(),
        });
        assert_eq!(response.result, Some(serde_json::json!("hello")));

        let response = host.handle(&Request::FileStats { filename: path });
        let stats: FileStats = serde_json::from_value(response.result.unwrap()).unwrap();
        assert_eq!(stats.size, 5);
        assert!(stats.is_file);
    }

    #[test]
    fn host_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = Host::new(FixedPrompt(DialogSelection::Multiple(Vec::new())));

        let response = host.handle(&Request::FileStats {
            filename: dir.path().join("missing"),
        });
        assert!(!response.ok);
        assert!(response.error.unwrap().contains("Failed to stat"));
    }

    #[test]
    fn host_forwards_dialogs_to_prompt() {
        let mut host = Host::new(FixedPrompt(DialogSelection::Single("a.js".into())));
        let options = DialogOptions::new("Open").property(DialogProperty::OpenFile);

        let response = host.handle(&Request::OpenDialog { options });
        let selection: DialogSelection = serde_json::from_value(response.result.unwrap()).unwrap();
        assert_eq!(selection, DialogSelection::Single("a.js".into()));
    }
}
