//! View descriptors → serenity builders.
//!
//! The core describes messages, embeds and modals in plain data; this module
//! is the only place that knows the serenity builder API.

use serenity::all::{
    CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter, CreateInputText,
    CreateInteractionResponseMessage, CreateMessage, CreateModal, InputTextStyle, ReactionType,
};

use mkt_core::view::{Button, ButtonStyle, Embed, InputStyle, MessageView, ModalView};

pub fn message(view: &MessageView) -> CreateMessage {
    let mut builder = CreateMessage::new();
    if let Some(content) = &view.content {
        builder = builder.content(content);
    }
    if let Some(e) = &view.embed {
        builder = builder.embed(embed(e));
    }
    if !view.rows.is_empty() {
        builder = builder.components(action_rows(&view.rows));
    }
    builder
}

/// Interaction-reply variant of [`message`]. Ephemerality is the caller's
/// call; this only shapes the payload.
pub fn response_message(view: &MessageView) -> CreateInteractionResponseMessage {
    let mut builder = CreateInteractionResponseMessage::new();
    if let Some(content) = &view.content {
        builder = builder.content(content);
    }
    if let Some(e) = &view.embed {
        builder = builder.embed(embed(e));
    }
    if !view.rows.is_empty() {
        builder = builder.components(action_rows(&view.rows));
    }
    builder
}

pub fn modal(view: &ModalView) -> CreateModal {
    let rows = view
        .inputs
        .iter()
        .map(|input| {
            let style = match input.style {
                InputStyle::Short => InputTextStyle::Short,
                InputStyle::Paragraph => InputTextStyle::Paragraph,
            };
            CreateActionRow::InputText(
                CreateInputText::new(style, &input.label, &input.id)
                    .placeholder(&input.placeholder)
                    .required(input.required),
            )
        })
        .collect();
    CreateModal::new(&view.id, &view.title).components(rows)
}

fn embed(e: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new();
    if let Some(title) = &e.title {
        builder = builder.title(title);
    }
    if let Some(description) = &e.description {
        builder = builder.description(description);
    }
    if let Some(color) = e.color {
        builder = builder.color(color);
    }
    for field in &e.fields {
        builder = builder.field(&field.name, &field.value, field.inline);
    }
    if let Some(footer) = &e.footer {
        builder = builder.footer(CreateEmbedFooter::new(footer));
    }
    if let Some(image) = &e.image {
        builder = builder.image(image);
    }
    if let Some(thumbnail) = &e.thumbnail {
        builder = builder.thumbnail(thumbnail);
    }
    builder
}

fn action_rows(rows: &[Vec<Button>]) -> Vec<CreateActionRow> {
    rows.iter()
        .map(|row| CreateActionRow::Buttons(row.iter().map(button).collect()))
        .collect()
}

fn button(b: &Button) -> CreateButton {
    let style = match b.style {
        ButtonStyle::Primary => serenity::all::ButtonStyle::Primary,
        ButtonStyle::Secondary => serenity::all::ButtonStyle::Secondary,
        ButtonStyle::Success => serenity::all::ButtonStyle::Success,
        ButtonStyle::Danger => serenity::all::ButtonStyle::Danger,
    };
    let mut builder = CreateButton::new(&b.id).label(&b.label).style(style);
    if let Some(emoji) = &b.emoji {
        builder = builder.emoji(ReactionType::Unicode(emoji.clone()));
    }
    builder
}
