//! Undo/redo for collection edits.
//!
//! Every mutation is a [`Command`] that knows how to apply itself and how to
//! produce its inverse. [`History`] keeps a bounded undo stack; executing a new
//! command clears the redo stack.

use crate::color::ColorValue;
use crate::common::errors::{ThemeError, ThemeResult};
use crate::model::terminal::{TerminalSlot, ThemeCollection, ThemeRecord};
use std::collections::VecDeque;

/// Undo depth used when none is configured.
pub const DEFAULT_CAPACITY: usize = 50;

/// A reversible edit of a [`ThemeCollection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetColor {
        theme: String,
        slot: TerminalSlot,
        old: ColorValue,
        new: ColorValue,
    },
    Rename {
        from: String,
        to: String,
    },
    /// Insert `record` at `index`.
    Create { index: usize, record: ThemeRecord },
    /// Remove the theme that sits at `index`.
    Delete { index: usize, record: ThemeRecord },
}

impl Command {
    /// Capture the current color so the edit can be undone.
    pub fn set_color(
        collection: &ThemeCollection,
        theme: &str,
        slot: TerminalSlot,
        new: ColorValue,
    ) -> ThemeResult<Self> {
        let record = collection.get(theme).ok_or_else(|| not_found(theme))?;
        Ok(Command::SetColor {
            theme: theme.to_string(),
            slot,
            old: record.get(slot),
            new,
        })
    }

    pub fn rename(from: impl Into<String>, to: impl Into<String>) -> Self {
        Command::Rename {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Append `record` at the end of the collection.
    pub fn create(collection: &ThemeCollection, record: ThemeRecord) -> Self {
        Command::Create {
            index: collection.len(),
            record,
        }
    }

    pub fn delete(collection: &ThemeCollection, name: &str) -> ThemeResult<Self> {
        let index = collection.index_of(name).ok_or_else(|| not_found(name))?;
        let record = collection.get(name).cloned().ok_or_else(|| not_found(name))?;
        Ok(Command::Delete { index, record })
    }

    pub fn apply(&self, collection: &mut ThemeCollection) -> ThemeResult<()> {
        match self {
            Command::SetColor {
                theme, slot, new, ..
            } => {
                let record = collection.get_mut(theme).ok_or_else(|| not_found(theme))?;
                record.set(*slot, *new);
                Ok(())
            }
            Command::Rename { from, to } => collection.rename(from, to),
            Command::Create { index, record } => collection.insert_at(*index, record.clone()),
            Command::Delete { record, .. } => collection.delete(&record.name).map(|_| ()),
        }
    }

    pub fn invert(&self) -> Command {
        match self.clone() {
            Command::SetColor {
                theme,
                slot,
                old,
                new,
            } => Command::SetColor {
                theme,
                slot,
                old: new,
                new: old,
            },
            Command::Rename { from, to } => Command::Rename { from: to, to: from },
            Command::Create { index, record } => Command::Delete { index, record },
            Command::Delete { index, record } => Command::Create { index, record },
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Command::SetColor {
                theme, slot, new, ..
            } => format!("set {theme}.{} to {}", slot.key(), new.to_hex(false)),
            Command::Rename { from, to } => format!("rename '{from}' to '{to}'"),
            Command::Create { record, .. } => format!("create '{}'", record.name),
            Command::Delete { record, .. } => format!("delete '{}'", record.name),
        }
    }
}

fn not_found(name: &str) -> ThemeError {
    ThemeError::NotFound {
        name: name.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<Command>,
    redo_stack: Vec<Command>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Apply `command` and record it. A failed command is not recorded and
    /// leaves the redo stack intact.
    pub fn execute(
        &mut self,
        collection: &mut ThemeCollection,
        command: Command,
    ) -> ThemeResult<()> {
        command.apply(collection)?;
        log::debug!("Executed: {}", command.describe());
        self.push_undo(command);
        self.redo_stack.clear();
        Ok(())
    }

    fn push_undo(&mut self, command: Command) {
        if self.capacity == 0 {
            return;
        }
        if self.undo_stack.len() == self.capacity {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(command);
    }

    /// Revert the most recent command. Returns `None` when there is nothing
    /// to undo.
    pub fn undo(&mut self, collection: &mut ThemeCollection) -> ThemeResult<Option<Command>> {
        let Some(command) = self.undo_stack.pop_back() else {
            return Ok(None);
        };
        if let Err(error) = command.invert().apply(collection) {
            self.undo_stack.push_back(command);
            return Err(error);
        }
        log::debug!("Undid: {}", command.describe());
        self.redo_stack.push(command.clone());
        Ok(Some(command))
    }

    pub fn redo(&mut self, collection: &mut ThemeCollection) -> ThemeResult<Option<Command>> {
        let Some(command) = self.redo_stack.pop() else {
            return Ok(None);
        };
        if let Err(error) = command.apply(collection) {
            self.redo_stack.push(command);
            return Err(error);
        }
        log::debug!("Redid: {}", command.describe());
        self.push_undo(command.clone());
        Ok(Some(command))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
