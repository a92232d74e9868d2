use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const HISTORY_LIMIT: usize = 50;

/// What a key press meant for the input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Same as pressing the submit control.
    Submit,
    /// The buffer changed.
    Edited,
    /// The key does nothing here.
    Ignored,
}

/// Editable question text plus the history of submitted questions.
#[derive(Debug, Default)]
pub struct InputBuffer {
    text: String,
    history: VecDeque<String>,
    // 0 = not browsing; n = showing history[n - 1]
    history_index: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.history_index = 0;
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.history_index = 0;
    }

    pub fn insert(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    /// Clear the field and hand back its trimmed content, recording it in the
    /// history.
    pub fn take_trimmed(&mut self) -> String {
        let question = self.text.trim().to_string();
        self.clear();

        if !question.is_empty() {
            self.history.push_front(question.clone());
            if self.history.len() > HISTORY_LIMIT {
                self.history.pop_back();
            }
        }

        question
    }

    /// Recall an older submission.
    pub fn previous_input(&mut self) {
        if self.history_index < self.history.len() {
            self.text = self.history[self.history_index].clone();
            self.history_index += 1;
        }
    }

    /// Move back towards the newest submission, ending on an empty field.
    pub fn next_input(&mut self) {
        match self.history_index {
            0 => {}
            1 => {
                self.history_index = 0;
                self.text.clear();
            }
            n => {
                self.history_index = n - 1;
                self.text = self.history[n - 2].clone();
            }
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    /// Apply a key press. Enter submits unless Shift is held, in which case a
    /// newline goes into the question instead.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        match key.code {
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.insert('\n');
                InputAction::Edited
            }
            KeyCode::Enter => InputAction::Submit,
            KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                InputAction::Ignored
            }
            KeyCode::Char(c) => {
                self.insert(c);
                InputAction::Edited
            }
            KeyCode::Backspace => {
                self.backspace();
                InputAction::Edited
            }
            KeyCode::Up => {
                self.previous_input();
                InputAction::Edited
            }
            KeyCode::Down => {
                self.next_input();
                InputAction::Edited
            }
            _ => InputAction::Ignored,
        }
    }
}
