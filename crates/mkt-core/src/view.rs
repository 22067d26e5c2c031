//! Plain-data view descriptors.
//!
//! Core flows return these instead of touching the platform SDK; the adapter
//! crate renders them into embeds/buttons/modals. Same descriptor in, same
//! platform output out.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    pub id: String,
    pub label: String,
    pub style: ButtonStyle,
    pub emoji: Option<String>,
}

impl Button {
    pub fn new(id: impl Into<String>, label: impl Into<String>, style: ButtonStyle) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            style,
            emoji: None,
        }
    }

    pub fn emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<Field>,
    pub footer: Option<String>,
    pub color: Option<u32>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
}

/// A message to post or reply with: optional plain content, optional embed,
/// zero or more button rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageView {
    pub content: Option<String>,
    pub embed: Option<Embed>,
    pub rows: Vec<Vec<Button>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputStyle {
    Short,
    Paragraph,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModalInput {
    pub id: String,
    pub label: String,
    pub placeholder: String,
    pub style: InputStyle,
    pub required: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModalView {
    pub id: String,
    pub title: String,
    pub inputs: Vec<ModalInput>,
}

/// What the adapter should do with the inbound interaction/message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// Ephemeral reply to the acting user.
    Ephemeral(String),
    /// Replace the ephemeral panel the interaction came from with a plain
    /// confirmation (embed and buttons removed).
    EphemeralClear(String),
    /// Ephemeral reply carrying an embed (and possibly buttons).
    EphemeralView(MessageView),
    /// Plain reply in the current channel (text-command responses).
    Say(String),
    /// Post a full message view into the current channel.
    Post(MessageView),
    /// Render a listing page: fresh ephemeral reply or in-place update of
    /// the page message, depending on how the user got here.
    Page { view: MessageView, update: bool },
    /// Open a modal for the acting user.
    Modal(ModalView),
    /// Rewrite the interaction's source message (text replaced, buttons
    /// removed) — accept/decline on a pending trade.
    Rewrite(String),
}
