//! Key events and the fixed key-to-action mapping.
//!
//! | Key | Press | Action |
//! |-----|-------|--------|
//! | Back | short | exit |
//! | Ok | long | toggle output |
//! | Right | short / repeat | next parameter slot |
//! | Left | short / repeat | previous parameter slot |
//! | Up | short / repeat | increment selected parameter |
//! | Down | short / repeat | decrement selected parameter |
//!
//! Everything else is ignored.

mod queue;

pub use queue::{EventQueue, QueueInput};

/// Physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Ok,
    Back,
}

/// How the key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressKind {
    Short,
    Long,
    /// Auto-repeat while held.
    Repeat,
}

/// One key event from the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputEvent {
    pub key: Key,
    pub kind: PressKind,
}

impl InputEvent {
    pub const fn new(key: Key, kind: PressKind) -> Self {
        InputEvent { key, kind }
    }

    pub const fn short(key: Key) -> Self {
        Self::new(key, PressKind::Short)
    }

    pub const fn long(key: Key) -> Self {
        Self::new(key, PressKind::Long)
    }

    pub const fn repeat(key: Key) -> Self {
        Self::new(key, PressKind::Repeat)
    }

    /// Map this event to a control action, if it has one.
    pub fn action(self) -> Option<Action> {
        let stepping = matches!(self.kind, PressKind::Short | PressKind::Repeat);
        match (self.key, self.kind) {
            (Key::Back, PressKind::Short) => Some(Action::Exit),
            (Key::Ok, PressKind::Long) => Some(Action::ToggleOutput),
            (Key::Right, _) if stepping => Some(Action::SelectNext),
            (Key::Left, _) if stepping => Some(Action::SelectPrevious),
            (Key::Up, _) if stepping => Some(Action::Increment),
            (Key::Down, _) if stepping => Some(Action::Decrement),
            _ => None,
        }
    }
}

/// What the control loop does in response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    Exit,
    ToggleOutput,
    SelectNext,
    SelectPrevious,
    Increment,
    Decrement,
}

/// Source of input events with a bounded wait.
pub trait InputSource {
    /// Wait up to `timeout_ms` for the next event.
    fn poll(&mut self, timeout_ms: u32) -> Option<InputEvent>;
}
