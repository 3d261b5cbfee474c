//! Outbound message model and chunking.

/// Telegram rejects `sendMessage` bodies longer than this many UTF-16 code
/// units.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// `parse_mode` for a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn callback(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self { label: label.into(), callback_data: callback_data.into() }
    }
}

/// Ordered rows of ordered buttons.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: i64,
    pub text: String,
    pub format: Option<FormatMode>,
    pub keyboard: Option<InlineKeyboard>,
}

impl OutboundMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self { chat_id, text: text.into(), format: None, keyboard: None }
    }

    pub fn format(mut self, format: FormatMode) -> Self {
        self.format = Some(format);
        self
    }

    pub fn keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// Split into messages no longer than `limit` UTF-16 units each.
    ///
    /// Every part keeps the format mode; only the last one keeps the keyboard.
    /// An empty body still yields one (empty) message.
    pub fn into_chunks(self, limit: usize) -> Vec<OutboundMessage> {
        let chunks = chunk_text(&self.text, limit);
        let last = chunks.len() - 1;
        let mut keyboard = self.keyboard;

        chunks
            .into_iter()
            .enumerate()
            .map(|(i, text)| OutboundMessage {
                chat_id: self.chat_id,
                text,
                format: self.format,
                keyboard: if i == last { keyboard.take() } else { None },
            })
            .collect()
    }
}

/// Cut `text` into consecutive pieces of at most `limit` UTF-16 units, the
/// unit Telegram measures message length in.
///
/// Splits on char boundaries, so a surrogate pair is never torn apart. Always
/// returns at least one element.
pub fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::with_capacity(text.len() / limit + 1);
    let mut rest = text;

    loop {
        let mut units = 0;
        let mut cut = rest.len();
        for (idx, c) in rest.char_indices() {
            units += c.len_utf16();
            if units > limit {
                // A lone astral char under a 1-unit limit still has to go out.
                cut = if idx == 0 { c.len_utf8() } else { idx };
                break;
            }
        }

        let (head, tail) = rest.split_at(cut);
        chunks.push(head.to_string());
        rest = tail;
        if rest.is_empty() {
            break;
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard() -> InlineKeyboard {
        InlineKeyboard::new(vec![vec![InlineButton::callback("Again", "ask_again")]])
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(chunk_text("hello", 10), vec!["hello"]);
    }

    #[test]
    fn test_exact_multiple_splits_evenly() {
        let text = "a".repeat(30);
        let chunks = chunk_text(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() == 10));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_remainder_goes_to_last_chunk() {
        let chunks = chunk_text("abcdefghijk", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ijk"]);
    }

    #[test]
    fn test_counts_utf16_units_not_bytes() {
        // 2 bytes in UTF-8, 1 unit in UTF-16
        let text = "é".repeat(5);
        let chunks = chunk_text(&text, 2);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn test_astral_chars_count_double() {
        let text = "😀".repeat(MAX_MESSAGE_LEN);
        let chunks = chunk_text(&text, MAX_MESSAGE_LEN);

        assert_eq!(chunks.len(), 2);
        for chunk in &chunks {
            assert_eq!(chunk.encode_utf16().count(), MAX_MESSAGE_LEN);
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_astral_char_is_never_split_at_odd_limit() {
        let chunks = chunk_text("a😀😀", 2);
        assert_eq!(chunks, vec!["a", "😀", "😀"]);
        assert!(chunks.iter().all(|c| c.encode_utf16().count() <= 2));
    }

    #[test]
    fn test_empty_text_yields_one_empty_chunk() {
        assert_eq!(chunk_text("", 4096), vec![String::new()]);
    }

    #[test]
    fn test_into_chunks_keyboard_only_on_last() {
        let msg = OutboundMessage::new(1, "x".repeat(25))
            .format(FormatMode::Markdown)
            .keyboard(keyboard());

        let parts = msg.into_chunks(10);
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.format == Some(FormatMode::Markdown)));
        assert!(parts[0].keyboard.is_none());
        assert!(parts[1].keyboard.is_none());
        assert_eq!(parts[2].keyboard, Some(keyboard()));
        assert_eq!(parts[2].text.len(), 5);
    }

    #[test]
    fn test_into_chunks_empty_body_keeps_options() {
        let parts = OutboundMessage::new(1, "").keyboard(keyboard()).into_chunks(MAX_MESSAGE_LEN);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].text, "");
        assert!(parts[0].keyboard.is_some());
    }
}
