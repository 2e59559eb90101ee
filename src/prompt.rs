//! Yes/no confirmation prompts.

use std::io::{BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tracing::warn;

use crate::error::{Error, Result};

/// Invalid answers tolerated before a prompt gives up.
pub const MAX_PROMPT_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    /// Ctrl+C.
    Interrupt,
    Other,
}

/// A source of single key presses. `None` means the input is closed.
pub trait KeySource {
    fn next_key(&mut self) -> std::io::Result<Option<Key>>;

    /// Whether every key is a whole line the user already submitted.
    fn line_based(&self) -> bool {
        false
    }
}

/// Ctrl+C interrupts; any other chord with Ctrl is ignored.
pub fn key_from_event(event: KeyEvent) -> Key {
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c' | 'C') => Key::Interrupt,
            _ => Key::Other,
        };
    }
    match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        _ => Key::Other,
    }
}

/// Reads raw key presses from the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalKeys;

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            warn!(%err, "failed to leave raw mode");
        }
    }
}

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> std::io::Result<Option<Key>> {
        let _raw = RawModeGuard::enable()?;
        loop {
            if let Event::Key(key) = event::read()? {
                // Windows reports releases too.
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                return Ok(Some(key_from_event(key)));
            }
        }
    }
}

/// Treats each line of a reader as one key press: its first non-blank
/// character, or Enter for an empty line.
#[derive(Debug)]
pub struct LineKeys<R> {
    reader: R,
}

impl<R: BufRead> LineKeys<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> KeySource for LineKeys<R> {
    fn next_key(&mut self) -> std::io::Result<Option<Key>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(match line.trim().chars().next() {
            Some(c) => Key::Char(c),
            None => Key::Enter,
        }))
    }

    fn line_based(&self) -> bool {
        true
    }
}

/// Key presses from the terminal when stdin is one, otherwise lines of stdin.
pub fn stdin_keys() -> Box<dyn KeySource> {
    if std::io::stdin().is_terminal() {
        Box::new(TerminalKeys)
    } else {
        Box::new(LineKeys::new(std::io::stdin().lock()))
    }
}

impl<K: KeySource + ?Sized> KeySource for Box<K> {
    fn next_key(&mut self) -> std::io::Result<Option<Key>> {
        (**self).next_key()
    }

    fn line_based(&self) -> bool {
        (**self).line_based()
    }
}

/// Asks `question` until the user presses Y or N.
pub fn prompt_user<K, W>(keys: &mut K, out: &mut W, question: &str) -> Result<bool>
where
    K: KeySource + ?Sized,
    W: Write + ?Sized,
{
    for _ in 0..MAX_PROMPT_ATTEMPTS {
        write!(out, "{question} (Y/N): ")?;
        out.flush()?;
        let key = keys.next_key()?;
        match key {
            Some(Key::Char(c)) => writeln!(out, "{c}")?,
            _ => writeln!(out)?,
        }
        match key {
            Some(Key::Char('y' | 'Y')) => return Ok(true),
            Some(Key::Char('n' | 'N')) => return Ok(false),
            Some(Key::Interrupt) => return Err(Error::Interrupted),
            Some(_) => continue,
            None => return Err(Error::PromptClosed),
        }
    }
    Err(Error::PromptExhausted(MAX_PROMPT_ATTEMPTS))
}

/// Blocks until Enter is pressed or the input closes. Line-based input
/// returns after any line.
pub fn wait_for_enter<K>(keys: &mut K) -> Result<()>
where
    K: KeySource + ?Sized,
{
    let line_based = keys.line_based();
    while let Some(key) = keys.next_key()? {
        match key {
            Key::Interrupt => return Err(Error::Interrupted),
            Key::Enter => break,
            _ if line_based => break,
            _ => {}
        }
    }
    Ok(())
}
