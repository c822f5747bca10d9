use std::path::{MAIN_SEPARATOR, Path};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::session::profile::is_supported_image;

const COMPLETION_SCAN_LIMIT: usize = 1000;
const COMPLETION_CANDIDATE_LIMIT: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
}

/// Single-line text field with emacs-style editing keys. Picture-path fields
/// also tab-complete directories and image files.
#[derive(Clone, Debug)]
pub struct LineInput {
    text: String,
    /// Cursor position as a char index (0 = before first char).
    cursor: usize,
    max_chars: Option<usize>,
    complete_paths: bool,
    completions: Vec<String>,
    completion_index: Option<usize>,
    /// True if the last directory scan failed.
    pub completion_error: bool,
}

impl LineInput {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
            max_chars: None,
            complete_paths: false,
            completions: Vec::new(),
            completion_index: None,
            completion_error: false,
        }
    }

    pub fn path(text: &str) -> Self {
        Self {
            complete_paths: true,
            ..Self::new(text)
        }
    }

    pub fn with_limit(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn set_value(&mut self, text: &str) {
        self.reset_completion();
        self.text = text.to_string();
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.set_value("");
    }

    /// Returns (before_cursor, cursor_char, after_cursor) for styled rendering.
    /// When cursor is at end of text, cursor_char is None.
    pub fn render_parts(&self) -> (&str, Option<char>, &str) {
        let byte_offset = self.char_to_byte(self.cursor);
        match self.text[byte_offset..].chars().next() {
            Some(ch) => {
                let next_byte = byte_offset + ch.len_utf8();
                (&self.text[..byte_offset], Some(ch), &self.text[next_byte..])
            }
            None => (&self.text, None, ""),
        }
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if !matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
            self.reset_completion();
        }

        match key.code {
            KeyCode::Esc => return InputResult::Cancel,
            KeyCode::Enter => return InputResult::Submit,
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.remove_at(self.cursor);
            }
            KeyCode::Delete if self.cursor < self.len() => self.remove_at(self.cursor),
            KeyCode::Tab if self.complete_paths => self.tab_complete(true),
            KeyCode::BackTab if self.complete_paths => self.tab_complete(false),
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.len(),
            KeyCode::Char('u') if ctrl => self.clear(),
            KeyCode::Char('w') if ctrl => self.delete_word_back(),
            KeyCode::Char(ch) if !ctrl => self.insert(ch),
            _ => {}
        }
        InputResult::Continue
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn insert(&mut self, ch: char) {
        if self.max_chars.is_some_and(|max| self.len() >= max) {
            return;
        }
        let byte_offset = self.char_to_byte(self.cursor);
        self.text.insert(byte_offset, ch);
        self.cursor += 1;
    }

    fn remove_at(&mut self, char_idx: usize) {
        let start = self.char_to_byte(char_idx);
        let end = self.char_to_byte(char_idx + 1);
        self.text.replace_range(start..end, "");
    }

    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    /// unix-word-rubout: skip whitespace, then non-whitespace.
    fn delete_word_back(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        let start = self.char_to_byte(pos);
        let end = self.char_to_byte(self.cursor);
        self.text.replace_range(start..end, "");
        self.cursor = pos;
    }

    fn reset_completion(&mut self) {
        self.completions.clear();
        self.completion_index = None;
        self.completion_error = false;
    }

    fn tab_complete(&mut self, forward: bool) {
        if self.cursor < self.len() {
            return;
        }

        let next = match self.completion_index {
            None => {
                self.completions = self.build_completions();
                if self.completions.is_empty() {
                    return;
                }
                0
            }
            Some(idx) => {
                let count = self.completions.len();
                if forward {
                    (idx + 1) % count
                } else {
                    (idx + count - 1) % count
                }
            }
        };
        self.completion_index = Some(next);
        self.text = self.completions[next].clone();
        self.cursor = self.len();
    }

    fn build_completions(&mut self) -> Vec<String> {
        let seed = self.text.clone();
        let split = seed.rfind(['/', '\\']).map(|pos| pos + 1).unwrap_or(0);
        let (dir_str, partial) = seed.split_at(split);

        // ~ is expanded for the scan but kept in the completed text
        let scan_dir = match dir_str.strip_prefix('~') {
            Some(rest) => match dirs::home_dir() {
                Some(home) => format!("{}{rest}", home.display()),
                None => dir_str.to_string(),
            },
            None if dir_str.is_empty() => ".".to_string(),
            None => dir_str.to_string(),
        };

        let entries = match std::fs::read_dir(&scan_dir) {
            Ok(rd) => rd.map(|entry| {
                entry.map(|e| {
                    let is_dir = e.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
                    (e.file_name().to_string_lossy().to_string(), is_dir)
                })
            }),
            Err(_) => {
                self.completion_error = true;
                return Vec::new();
            }
        };
        self.collect_completions(entries, dir_str, partial)
    }

    /// Directories first, then image files, alphabetical within each group.
    fn collect_completions(
        &mut self,
        entries: impl Iterator<Item = std::io::Result<(String, bool)>>,
        dir_str: &str,
        partial: &str,
    ) -> Vec<String> {
        let include_hidden = partial.starts_with('.');
        let mut candidates: Vec<(bool, String)> = Vec::new();

        for entry in entries.take(COMPLETION_SCAN_LIMIT) {
            let Ok((name, is_dir)) = entry else {
                self.completion_error = true;
                return Vec::new();
            };
            if (!include_hidden && name.starts_with('.')) || !name.starts_with(partial) {
                continue;
            }
            if is_dir {
                candidates.push((true, format!("{dir_str}{name}{MAIN_SEPARATOR}")));
            } else if is_supported_image(Path::new(&name)) {
                candidates.push((false, format!("{dir_str}{name}")));
            }
        }

        candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        candidates.truncate(COMPLETION_CANDIDATE_LIMIT);
        candidates.into_iter().map(|(_, path)| path).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_str(input: &mut LineInput, text: &str) {
        for ch in text.chars() {
            input.handle(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn insert_moves_cursor() {
        let mut input = LineInput::new("ac");
        input.handle(key(KeyCode::Left));
        input.handle(key(KeyCode::Char('b')));
        assert_eq!(input.value(), "abc");
        assert_eq!(input.cursor, 2);
    }

    #[test]
    fn backspace_and_delete_at_boundaries() {
        let mut input = LineInput::new("ab");
        input.handle(key(KeyCode::Delete));
        assert_eq!(input.value(), "ab");
        input.handle(key(KeyCode::Backspace));
        input.handle(key(KeyCode::Backspace));
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor, 0);

        let mut input = LineInput::new("xy");
        input.handle(key(KeyCode::Home));
        input.handle(key(KeyCode::Delete));
        assert_eq!(input.value(), "y");
    }

    #[test]
    fn multibyte_editing() {
        let mut input = LineInput::new("Sawubona ");
        type_str(&mut input, "é😀");
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "Sawubona é");
        input.handle(key(KeyCode::Left));
        let (before, ch, after) = input.render_parts();
        assert_eq!((before, ch, after), ("Sawubona ", Some('é'), ""));
    }

    #[test]
    fn ctrl_keys() {
        let mut input = LineInput::new("three point  ");
        input.handle(ctrl('w'));
        assert_eq!(input.value(), "three ");
        input.handle(ctrl('a'));
        assert_eq!(input.cursor, 0);
        input.handle(ctrl('e'));
        assert_eq!(input.cursor, 6);
        input.handle(ctrl('u'));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn submit_and_cancel() {
        let mut input = LineInput::new("x");
        assert_eq!(input.handle(key(KeyCode::Enter)), InputResult::Submit);
        assert_eq!(input.handle(key(KeyCode::Esc)), InputResult::Cancel);
        assert_eq!(input.value(), "x");
    }

    #[test]
    fn limit_stops_insertion() {
        let mut input = LineInput::new("").with_limit(3);
        type_str(&mut input, "abcdef");
        assert_eq!(input.value(), "abc");
    }

    #[test]
    fn tab_ignored_on_plain_input() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("me.png"), "").unwrap();
        let mut input = LineInput::new(&format!("{}/", dir.path().display()));
        input.handle(key(KeyCode::Tab));
        assert!(input.completions.is_empty());
    }

    #[test]
    fn path_completion_offers_dirs_and_images_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("avatar.png"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::write(dir.path().join("beach.JPG"), "").unwrap();
        std::fs::create_dir(dir.path().join("photos")).unwrap();

        let mut input = LineInput::path(&format!("{}/", dir.path().display()));
        input.handle(key(KeyCode::Tab));
        assert_eq!(input.completions.len(), 3);
        assert!(input.completions[0].ends_with(&format!("photos{MAIN_SEPARATOR}")));
        assert!(input.completions[1].ends_with("avatar.png"));
        assert!(input.completions[2].ends_with("beach.JPG"));
        assert!(input.value().ends_with("photos/"));

        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with("avatar.png"));
        input.handle(key(KeyCode::BackTab));
        assert!(input.value().ends_with("photos/"));
    }

    #[test]
    fn completion_error_clears_on_next_key() {
        let mut input = LineInput::path("/nonexistent_k53_dir/");
        input.handle(key(KeyCode::Tab));
        assert!(input.completion_error);
        assert!(input.completion_index.is_none());
        input.handle(key(KeyCode::Left));
        assert!(!input.completion_error);
    }

    #[test]
    fn collect_completions_stops_on_entry_error() {
        let mut input = LineInput::path("");
        let entries: Vec<std::io::Result<(String, bool)>> = vec![
            Ok(("a.png".to_string(), false)),
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied")),
        ];
        assert!(input.collect_completions(entries.into_iter(), "", "").is_empty());
        assert!(input.completion_error);
    }

    #[test]
    fn collect_completions_caps_candidates() {
        let mut input = LineInput::path("");
        let entries = (0..300).map(|i| Ok::<_, std::io::Error>((format!("img_{i:03}.png"), false)));
        let result = input.collect_completions(entries, "pics/", "img_");
        assert_eq!(result.len(), COMPLETION_CANDIDATE_LIMIT);
        assert_eq!(result[0], "pics/img_000.png");
    }
}
