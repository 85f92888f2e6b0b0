//! Classification of submitted input lines.

/// Prefix that turns an input line into a destination switch.
pub const DESTINATION_PREFIX: char = '/';

/// What a submitted line asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Nothing but whitespace.
    Empty,
    /// Switch destination to the hex identifier after the prefix.
    SetDestination(&'a str),
    /// Chat text for the current destination.
    Message(&'a str),
}

impl<'a> Command<'a> {
    /// Classify one line of input.
    ///
    /// A trailing line terminator is dropped. Otherwise the line is taken as
    /// typed: the prefix must be its first character and message text keeps
    /// its whitespace.
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Self::Empty;
        }
        match line.strip_prefix(DESTINATION_PREFIX) {
            Some(target) => Self::SetDestination(target),
            None => Self::Message(line),
        }
    }
}
