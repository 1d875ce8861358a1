//! Console implementations
//!
//! - [`StdConsole`]: stdin/stdout, styled with crossterm when stdout is a terminal
//! - [`ScriptedConsole`]: replays scripted input and records a transcript,
//!   for tests

use crate::explore::Console;
use crossterm::style::Stylize;
use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead, IsTerminal, Write};
use tracing::warn;

/// Interactive console on the process's standard streams
pub struct StdConsole {
    styled: bool,
}

impl StdConsole {
    pub fn new() -> Self {
        StdConsole {
            styled: io::stdout().is_terminal(),
        }
    }

    /// Print an error message, in red on a terminal
    pub fn error(&mut self, text: &str) {
        if self.styled {
            self.writeln(&format!("{}", text.red()));
        } else {
            self.writeln(text);
        }
    }

    /// Read a REPL command line; `None` at end of input
    pub fn read_command(&mut self, prompt: &str) -> Option<String> {
        if self.styled {
            self.write(&format!("{}", prompt.bold()));
        } else {
            self.write(prompt);
        }
        read_stdin_line()
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

fn read_stdin_line() -> Option<String> {
    let _ = io::stdout().flush();
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
        Err(err) => {
            warn!(%err, "failed to read from stdin");
            None
        }
    }
}

impl Console for StdConsole {
    fn read_line(&mut self, prompt: &str) -> String {
        self.write(prompt);
        read_stdin_line().unwrap_or_default()
    }

    fn write(&mut self, text: &str) {
        let mut stdout = io::stdout().lock();
        if let Err(err) = stdout.write_all(text.as_bytes()) {
            warn!(%err, "failed to write to stdout");
        }
    }
}

/// One step of a script
enum ScriptStep {
    Line(String),
    Action(Box<dyn FnMut()>),
}

/// Console that answers prompts from a script and records everything shown
///
/// Prompts and the answers given are echoed into the transcript the way a
/// terminal would show them. Once the script runs out every prompt reads an
/// empty line.
#[derive(Default)]
pub struct ScriptedConsole {
    steps: VecDeque<ScriptStep>,
    transcript: String,
    prompts: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedConsole {
            steps: lines
                .into_iter()
                .map(|line| ScriptStep::Line(line.into()))
                .collect(),
            ..Default::default()
        }
    }

    /// Queue another input line
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.steps.push_back(ScriptStep::Line(line.into()));
        self
    }

    /// Queue an action, run just before the next line is read
    pub fn then(mut self, action: impl FnMut() + 'static) -> Self {
        self.steps.push_back(ScriptStep::Action(Box::new(action)));
        self
    }

    /// Everything written, with prompts and echoed answers
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Every prompt shown, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Input lines not yet consumed
    pub fn remaining(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step, ScriptStep::Line(_)))
            .count()
    }

    /// Number of lines of the transcript containing `needle`
    pub fn count_lines_containing(&self, needle: &str) -> usize {
        self.transcript
            .lines()
            .filter(|line| line.contains(needle))
            .count()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> String {
        let line = loop {
            match self.steps.pop_front() {
                Some(ScriptStep::Action(mut action)) => action(),
                Some(ScriptStep::Line(line)) => break line,
                None => break String::new(),
            }
        };

        self.prompts.push(prompt.to_string());
        self.transcript.push_str(prompt);
        self.transcript.push_str(&line);
        self.transcript.push('\n');
        line
    }

    fn write(&mut self, text: &str) {
        self.transcript.push_str(text);
    }
}

impl fmt::Debug for ScriptedConsole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedConsole")
            .field("remaining", &self.remaining())
            .field("prompts", &self.prompts.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_scripted_lines_and_eof() {
        let mut console = ScriptedConsole::new(["y", "3"]);
        assert_eq!(console.read_line("a? "), "y");
        assert_eq!(console.read_line("b? "), "3");
        assert_eq!(console.read_line("c? "), "");
        assert_eq!(console.prompts(), ["a? ", "b? ", "c? "]);
        assert_eq!(console.transcript(), "a? y\nb? 3\nc? \n");
    }

    #[test]
    fn test_actions_run_before_next_line() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let mut console = ScriptedConsole::new(["first"])
            .then(move || counter.set(counter.get() + 1))
            .line("second");

        assert_eq!(console.read_line(""), "first");
        assert_eq!(hits.get(), 0);
        assert_eq!(console.read_line(""), "second");
        assert_eq!(hits.get(), 1);
        assert_eq!(console.remaining(), 0);
    }
}
