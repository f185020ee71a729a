use quickgrade_core::prompt::Prompter;
use std::io::{self, BufRead, Write};

/// Reads answers from stdin, one line each
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }

    /// Block until the operator presses Enter
    pub fn pause(&mut self, prompt: &str) -> io::Result<()> {
        self.ask(prompt).map(|_| ())
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }

        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, message: &str) {
        println!("{}", message);
    }
}
