use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use tracing::warn;

/// Line-oriented operator I/O.
pub trait Console {
    /// `Ok(None)` means input is exhausted.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn write_line(&mut self, text: &str) -> io::Result<()>;
}

impl<C: Console + ?Sized> Console for Box<C> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        (**self).read_line(prompt)
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        (**self).write_line(text)
    }
}

/// Interactive terminal console.
pub struct LineEditor {
    editor: DefaultEditor,
    history: bool,
}

impl LineEditor {
    pub fn new(history: bool) -> io::Result<Self> {
        let editor = DefaultEditor::new()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("line editor: {}", e)))?;
        Ok(Self { editor, history })
    }

    /// A failed history write is logged; the line is still returned.
    fn remember(&mut self, line: &str) {
        if !records_history(self.history, line) {
            return;
        }
        if let Err(e) = self.editor.add_history_entry(line) {
            warn!(error = %e, "could not add line to history");
        }
    }
}

fn records_history(enabled: bool, line: &str) -> bool {
    enabled && !line.trim().is_empty()
}

impl Console for LineEditor {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    self.remember(&line);
                    return Ok(Some(line));
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Type 'continue' to resume or 'exit' to quit");
                }
                Err(ReadlineError::Eof) => return Ok(None),
                Err(ReadlineError::Io(e)) => return Err(e),
                Err(e) => return Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
            }
        }
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        println!("{}", text);
        Ok(())
    }
}

/// Console over any reader/writer pair, e.g. piped stdin or a script file.
pub struct StdioConsole<R, W> {
    input: R,
    output: W,
    echo: bool,
}

impl<R: BufRead, W: Write> StdioConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            echo: false,
        }
    }

    /// Echo each line read after its prompt, so the transcript reads like a
    /// terminal session.
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Console for StdioConsole<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            if self.echo {
                writeln!(self.output)?;
            }
            return Ok(None);
        }

        let line = line.trim_end_matches(&['\r', '\n'][..]).to_string();
        if self.echo {
            writeln!(self.output, "{}", line)?;
        }
        Ok(Some(line))
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }
}

/// Shared view of everything a [`ScriptedConsole`] printed.
#[derive(Clone, Default)]
pub struct Transcript {
    lines: Rc<RefCell<Vec<String>>>,
}

impl Transcript {
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|l| l.contains(needle))
    }

    fn push(&self, line: String) {
        self.lines.borrow_mut().push(line);
    }
}

/// Console fed from a fixed queue of input lines.
pub struct ScriptedConsole {
    input: VecDeque<String>,
    transcript: Transcript,
}

impl ScriptedConsole {
    pub fn new<I, S>(lines: I) -> (Self, Transcript)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let transcript = Transcript::default();
        let console = Self {
            input: lines.into_iter().map(Into::into).collect(),
            transcript: transcript.clone(),
        };
        (console, transcript)
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(self.input.pop_front())
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.transcript.push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdio_console_reads_until_eof() {
        let input = io::Cursor::new("backtrace\r\nframe 1\n");
        let mut console = StdioConsole::new(input, Vec::new());

        assert_eq!(console.read_line("> ").unwrap().as_deref(), Some("backtrace"));
        assert_eq!(console.read_line("> ").unwrap().as_deref(), Some("frame 1"));
        assert_eq!(console.read_line("> ").unwrap(), None);

        let out = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(out, "> > > ");
    }

    #[test]
    fn test_stdio_console_echo() {
        let input = io::Cursor::new("a\n");
        let mut console = StdioConsole::new(input, Vec::new()).echo(true);
        console.read_line("> ").unwrap();
        console.write_line("1").unwrap();

        let out = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(out, "> a\n1\n");
    }

    #[test]
    fn test_scripted_console_records_output() {
        let (mut console, transcript) = ScriptedConsole::new(["x"]);
        assert_eq!(console.read_line("> ").unwrap().as_deref(), Some("x"));
        assert_eq!(console.read_line("> ").unwrap(), None);

        console.write_line("42").unwrap();
        assert_eq!(transcript.lines(), vec!["42".to_string()]);
        assert!(transcript.contains("4"));
    }

    #[test]
    fn test_history_skips_blank_and_disabled() {
        assert!(records_history(true, "frame 1"));
        assert!(!records_history(true, "   "));
        assert!(!records_history(true, ""));
        assert!(!records_history(false, "frame 1"));
    }
}
