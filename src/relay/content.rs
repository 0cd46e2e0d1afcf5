//! Relayable message content.

/// Longest text message Telegram accepts, in UTF-16 code units.
pub const MAX_TEXT_LEN: usize = 4096;
/// Longest media caption Telegram accepts, in UTF-16 code units.
pub const MAX_CAPTION_LEN: usize = 1024;

const ELLIPSIS: char = '…';

/// A message payload, one variant per content kind the relay understands.
///
/// Media variants carry the platform's file reference so recipients get the
/// original upload, never a re-encoded copy.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text {
        text: String,
    },
    Photo {
        file_id: String,
        caption: Option<String>,
    },
    Video {
        file_id: String,
        caption: Option<String>,
    },
    Audio {
        file_id: String,
        caption: Option<String>,
    },
    Voice {
        file_id: String,
        caption: Option<String>,
    },
    Document {
        file_id: String,
        caption: Option<String>,
    },
    Animation {
        file_id: String,
        caption: Option<String>,
    },
    Sticker {
        file_id: String,
    },
    VideoNote {
        file_id: String,
    },
    Location {
        latitude: f64,
        longitude: f64,
    },
    Contact {
        phone_number: String,
        first_name: String,
        last_name: Option<String>,
    },
    Venue {
        latitude: f64,
        longitude: f64,
        title: String,
        address: String,
    },
    /// Anything else; relayed by forwarding the original message.
    Other {
        kind: String,
        chat_id: i64,
        message_id: i32,
    },
}

impl Content {
    /// Shorthand for a text message.
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text { text: text.into() }
    }

    /// Lowercase kind name, used in logs and history tags.
    pub fn kind(&self) -> &str {
        match self {
            Content::Text { .. } => "text",
            Content::Photo { .. } => "photo",
            Content::Video { .. } => "video",
            Content::Audio { .. } => "audio",
            Content::Voice { .. } => "voice",
            Content::Document { .. } => "document",
            Content::Animation { .. } => "animation",
            Content::Sticker { .. } => "sticker",
            Content::VideoNote { .. } => "video_note",
            Content::Location { .. } => "location",
            Content::Contact { .. } => "contact",
            Content::Venue { .. } => "venue",
            Content::Other { kind, .. } => kind,
        }
    }

    /// Whether this kind carries a caption (or, for text, a body).
    pub fn is_captioned(&self) -> bool {
        matches!(
            self,
            Content::Text { .. }
                | Content::Photo { .. }
                | Content::Video { .. }
                | Content::Audio { .. }
                | Content::Voice { .. }
                | Content::Document { .. }
                | Content::Animation { .. }
        )
    }

    /// The text body or media caption.
    pub fn caption(&self) -> Option<&str> {
        match self {
            Content::Text { text } => Some(text),
            Content::Photo { caption, .. }
            | Content::Video { caption, .. }
            | Content::Audio { caption, .. }
            | Content::Voice { caption, .. }
            | Content::Document { caption, .. }
            | Content::Animation { caption, .. } => caption.as_deref(),
            _ => None,
        }
    }

    /// Text stored in the room history.
    ///
    /// Text is stored verbatim. Captioned media becomes `[KIND] caption`,
    /// everything else a bare `[KIND]` tag.
    pub fn history_text(&self) -> String {
        if let Content::Text { text } = self {
            return text.clone();
        }
        let tag = format!("[{}]", self.kind().to_uppercase());
        match self.caption() {
            Some(caption) if !caption.is_empty() => format!("{tag} {caption}"),
            _ => tag,
        }
    }

    /// Caption sent to recipients: `"<title>:\n<caption>"`.
    ///
    /// None for kinds that are relayed without a label. The label always
    /// survives; a body that would push the result past the platform limit
    /// is cut and ends in `…`.
    pub fn relay_caption(&self, title: &str) -> Option<String> {
        if !self.is_captioned() {
            return None;
        }
        let limit = match self {
            Content::Text { .. } => MAX_TEXT_LEN,
            _ => MAX_CAPTION_LEN,
        };
        let label = format!("{title}:\n");
        let room = limit.saturating_sub(utf16_len(&label));
        let body = truncate_utf16(self.caption().unwrap_or_default(), room);
        Some(label + &body)
    }
}

fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Cut `s` to at most `max` UTF-16 units, marking a cut with `…`.
fn truncate_utf16(s: &str, max: usize) -> String {
    if utf16_len(s) <= max {
        return s.to_string();
    }
    let budget = max.saturating_sub(ELLIPSIS.len_utf16());
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        used += c.len_utf16();
        if used > budget {
            break;
        }
        out.push(c);
    }
    if max > 0 {
        out.push(ELLIPSIS);
    }
    out
}
