//! Outgoing message model
//!
//! A message is a closed set of kinds (text plus the media uploads) with the
//! cross-kind options: title, icon, level, parse mode, silent delivery. The
//! dispatcher switches over the kind exactly once.

use std::path::{Path, PathBuf};

/// Formatting directive understood by the Bot API.
///
/// `None` sends text literally; markup characters are neither interpreted
/// nor stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    #[default]
    None,
    Markdown,
    MarkdownV2,
    Html,
}

impl ParseMode {
    /// Wire value for the `parse_mode` field, or `None` for literal text.
    pub fn as_api_value(&self) -> Option<&'static str> {
        match self {
            ParseMode::None => None,
            ParseMode::Markdown => Some("markdown"),
            ParseMode::MarkdownV2 => Some("markdownV2"),
            ParseMode::Html => Some("html"),
        }
    }

    /// Parse a CLI/config spelling. Case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "none" | "" => Some(ParseMode::None),
            "markdown" => Some(ParseMode::Markdown),
            "markdownv2" => Some(ParseMode::MarkdownV2),
            "html" => Some(ParseMode::Html),
            _ => None,
        }
    }

    /// Render `text` bold under this mode; literal text is returned as-is.
    pub fn bold(&self, text: &str) -> String {
        match self {
            ParseMode::Html => format!("<b>{}</b>", text),
            ParseMode::Markdown | ParseMode::MarkdownV2 => format!("*{}*", text),
            ParseMode::None => text.to_string(),
        }
    }

    /// Render `text` italic under this mode.
    pub fn italic(&self, text: &str) -> String {
        match self {
            ParseMode::Html => format!("<i>{}</i>", text),
            ParseMode::Markdown | ParseMode::MarkdownV2 => format!("_{}_", text),
            ParseMode::None => text.to_string(),
        }
    }

    /// Render `text` as fixed-width under this mode.
    pub fn fixed(&self, text: &str) -> String {
        match self {
            ParseMode::Html => format!("<code>{}</code>", text),
            ParseMode::Markdown | ParseMode::MarkdownV2 => format!("`{}`", text),
            ParseMode::None => text.to_string(),
        }
    }
}

/// Log level of a message, mapped to an icon beside the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    No,
    Success,
    Info,
    Warn,
    Error,
    Alert,
}

impl Level {
    pub fn icon(&self) -> &'static str {
        match self {
            Level::No => "",
            Level::Success => "\u{2705}",
            Level::Info => "\u{1F4CB}",
            Level::Warn => "\u{26A0}",
            Level::Error => "\u{274C}",
            Level::Alert => "\u{1F198}",
        }
    }

    /// Parse a CLI spelling. Case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "no" | "" => Some(Level::No),
            "success" => Some(Level::Success),
            "info" => Some(Level::Info),
            "warn" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "alert" => Some(Level::Alert),
            _ => None,
        }
    }
}

/// The kind of message being sent, with kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Text {
        /// Wrap the whole composed text in fixed-width formatting.
        fixed: bool,
        disable_preview: bool,
    },
    Photo {
        path: PathBuf,
    },
    Document {
        path: PathBuf,
        thumb: Option<PathBuf>,
    },
    Audio {
        path: PathBuf,
        thumb: Option<PathBuf>,
    },
    Video {
        path: PathBuf,
        thumb: Option<PathBuf>,
    },
    Animation {
        path: PathBuf,
        thumb: Option<PathBuf>,
    },
    Voice {
        path: PathBuf,
    },
    Sticker {
        path: PathBuf,
    },
}

impl MessageKind {
    /// Bot API method this kind maps to.
    pub fn api_method(&self) -> &'static str {
        match self {
            MessageKind::Text { .. } => "sendMessage",
            MessageKind::Photo { .. } => "sendPhoto",
            MessageKind::Document { .. } => "sendDocument",
            MessageKind::Audio { .. } => "sendAudio",
            MessageKind::Video { .. } => "sendVideo",
            MessageKind::Animation { .. } => "sendAnimation",
            MessageKind::Voice { .. } => "sendVoice",
            MessageKind::Sticker { .. } => "sendSticker",
        }
    }

    /// Local file backing this message, if it is a media kind.
    pub fn source(&self) -> Option<&Path> {
        match self {
            MessageKind::Text { .. } => None,
            MessageKind::Photo { path }
            | MessageKind::Document { path, .. }
            | MessageKind::Audio { path, .. }
            | MessageKind::Video { path, .. }
            | MessageKind::Animation { path, .. }
            | MessageKind::Voice { path }
            | MessageKind::Sticker { path } => Some(path),
        }
    }

    /// Whether the remote API accepts a caption for this kind.
    /// Stickers do not; callers get a warning instead of a silent drop.
    pub fn supports_caption(&self) -> bool {
        !matches!(self, MessageKind::Text { .. } | MessageKind::Sticker { .. })
    }
}

/// One outgoing message. Constructed per invocation and consumed by a single
/// dispatch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRequest {
    pub kind: MessageKind,
    /// Message text, or the caption for media kinds. May be empty for media.
    pub body: String,
    /// Optional title, rendered bold on the first line.
    pub title: String,
    /// Explicit icon; overrides the level icon when non-empty.
    pub icon: String,
    pub level: Level,
    pub parse_mode: ParseMode,
    /// Deliver without a notification sound.
    pub silent: bool,
}

impl MessageRequest {
    pub fn new<S: Into<String>>(kind: MessageKind, body: S) -> Self {
        Self {
            kind,
            body: body.into(),
            title: String::new(),
            icon: String::new(),
            level: Level::No,
            parse_mode: ParseMode::None,
            silent: false,
        }
    }

    pub fn text<S: Into<String>>(body: S) -> Self {
        Self::new(
            MessageKind::Text {
                fixed: false,
                disable_preview: false,
            },
            body,
        )
    }

    pub fn photo<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(MessageKind::Photo { path: path.into() }, "")
    }

    pub fn document<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(
            MessageKind::Document {
                path: path.into(),
                thumb: None,
            },
            "",
        )
    }

    pub fn audio<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(
            MessageKind::Audio {
                path: path.into(),
                thumb: None,
            },
            "",
        )
    }

    pub fn video<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(
            MessageKind::Video {
                path: path.into(),
                thumb: None,
            },
            "",
        )
    }

    pub fn animation<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(
            MessageKind::Animation {
                path: path.into(),
                thumb: None,
            },
            "",
        )
    }

    pub fn voice<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(MessageKind::Voice { path: path.into() }, "")
    }

    pub fn sticker<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(MessageKind::Sticker { path: path.into() }, "")
    }

    /// Icon actually used: the explicit one, or the level's.
    pub fn effective_icon(&self) -> &str {
        if self.icon.is_empty() {
            self.level.icon()
        } else {
            &self.icon
        }
    }

    /// Compose the outgoing text/caption: icon, bold title line, body.
    pub fn composed_text(&self) -> String {
        let composed = compose(
            &self.body,
            &self.title,
            self.effective_icon(),
            self.parse_mode,
        );
        match self.kind {
            MessageKind::Text { fixed: true, .. } => self.parse_mode.fixed(&composed),
            _ => composed,
        }
    }
}

/// Icon and title are prefixed to the body: `<icon> <bold title>\n\n<body>`.
/// Absent parts drop out together with their separators.
fn compose(body: &str, title: &str, icon: &str, parse_mode: ParseMode) -> String {
    let mut s = String::new();
    if !icon.is_empty() {
        s.push_str(icon);
        s.push(' ');
    }
    if !title.is_empty() {
        s.push_str(&parse_mode.bold(title));
        s.push_str("\n\n");
    }
    s.push_str(body);
    s
}
