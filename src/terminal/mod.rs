//! Terminal backend: raw mode, event translation, prompts
//!
//! Crossterm owns the byte-level protocol (bracketed paste, xterm
//! key sequences); this module translates its events into the
//! editor's [`InputEvent`] form and manages the raw-mode guard.

use crate::bind::{Key, KeyCode};
use crate::mode::InputEvent;
use crate::search::ConfirmAnswer;
use crossterm::event::{
    Event, KeyCode as CtKeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::{event, execute, terminal};
use std::io::stdout;
use std::time::Duration;

/// Enables raw mode and the alternate screen for its lifetime.
pub struct RawTerminal;

impl RawTerminal {
    pub fn new() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            event::EnableBracketedPaste,
        )?;
        Ok(RawTerminal)
    }

    pub fn size(&self) -> (u16, u16) {
        terminal::size().unwrap_or((80, 24))
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            event::DisableBracketedPaste,
            terminal::LeaveAlternateScreen,
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Map a crossterm key event to the editor's key code.
pub fn translate_key(event: &KeyEvent) -> Option<KeyCode> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let key = match event.code {
        CtKeyCode::Char(c) => Key::Char(c),
        CtKeyCode::Enter => Key::Enter,
        CtKeyCode::Tab | CtKeyCode::BackTab => Key::Tab,
        CtKeyCode::Backspace => Key::Backspace,
        CtKeyCode::Esc => Key::Escape,
        CtKeyCode::Insert => Key::Insert,
        CtKeyCode::Delete => Key::Delete,
        CtKeyCode::Home => Key::Home,
        CtKeyCode::End => Key::End,
        CtKeyCode::PageUp => Key::PageUp,
        CtKeyCode::PageDown => Key::PageDown,
        CtKeyCode::Up => Key::Up,
        CtKeyCode::Down => Key::Down,
        CtKeyCode::Left => Key::Left,
        CtKeyCode::Right => Key::Right,
        CtKeyCode::F(n) if (1..=12).contains(&n) => Key::F(n),
        _ => return None,
    };

    let mods = event.modifiers;
    let shift = mods.contains(KeyModifiers::SHIFT) || event.code == CtKeyCode::BackTab;
    // Shifted plain characters already arrive uppercased
    let shift = shift && !matches!(key, Key::Char(_));
    Some(KeyCode {
        ctrl: mods.contains(KeyModifiers::CONTROL),
        meta: mods.contains(KeyModifiers::ALT),
        shift,
        key,
    })
}

/// Block for the next input event.
pub fn read_event() -> std::io::Result<Option<InputEvent>> {
    loop {
        match event::read()? {
            Event::Key(k) => {
                if let Some(key) = translate_key(&k) {
                    return Ok(Some(InputEvent::Key(key)));
                }
            }
            Event::Paste(text) => return Ok(Some(InputEvent::Paste(text))),
            Event::Resize(..) => return Ok(None),
            _ => {}
        }
    }
}

/// The y/n/a/q prompt used by `replace -c`. Escape cancels.
pub fn prompt_replace() -> ConfirmAnswer {
    loop {
        let Ok(has_event) = event::poll(Duration::from_secs(60)) else {
            return ConfirmAnswer::Quit;
        };
        if !has_event {
            continue;
        }
        match event::read() {
            Ok(Event::Key(KeyEvent { code, kind, .. })) if kind != KeyEventKind::Release => {
                match code {
                    CtKeyCode::Char('y') | CtKeyCode::Char('Y') => return ConfirmAnswer::Yes,
                    CtKeyCode::Char('n') | CtKeyCode::Char('N') => return ConfirmAnswer::No,
                    CtKeyCode::Char('a') | CtKeyCode::Char('A') => return ConfirmAnswer::All,
                    CtKeyCode::Char('q') | CtKeyCode::Char('Q') | CtKeyCode::Esc => {
                        return ConfirmAnswer::Quit
                    }
                    _ => {}
                }
            }
            Ok(_) => {}
            Err(_) => return ConfirmAnswer::Quit,
        }
    }
}
