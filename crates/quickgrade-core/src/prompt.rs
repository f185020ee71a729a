use std::collections::VecDeque;
use std::io;

/// Line-oriented operator interaction.
///
/// Menus and confirmations only decide through pure functions; reading and
/// printing goes through this trait so the decisions can run without a terminal.
pub trait Prompter {
    /// Show `prompt` and return the operator's answer without the line ending.
    ///
    /// End of input is an `UnexpectedEof` error, never an empty answer.
    fn ask(&mut self, prompt: &str) -> io::Result<String>;

    /// Show a message that needs no answer
    fn say(&mut self, message: &str);
}

/// Replays canned answers; useful wherever a terminal is unavailable
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    /// Every prompt and message shown, in order
    pub transcript: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        self.transcript.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more answers"))
    }

    fn say(&mut self, message: &str) {
        self.transcript.push(message.to_string());
    }
}
