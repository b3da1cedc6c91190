//! Message handlers module
//!
//! One handler per content kind. Every handler follows the same contract:
//! silently no-op when the sender or the expected content field is absent,
//! otherwise compose one HTML summary of the content's metadata and reply.
//! Long text replies are split into ordered chunks under Telegram's limit.

use teloxide::{
    prelude::*,
    types::{Message, ParseMode, User as TelegramUser},
    Bot,
};

use crate::models::ActivityKind;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;
use crate::utils::helpers::{escape_html, format_bytes, split_message, MAX_MESSAGE_LENGTH};
use crate::utils::logging::log_user_action;

/// Upsert the sender's record and count this update as message activity
async fn track_sender(services: &ServiceFactory, user: &TelegramUser) {
    if services.users.get_or_create(user).await.is_some() {
        let _ = services
            .users
            .update_activity(user.id.0 as i64, ActivityKind::Message)
            .await;
    }
}

/// Send a reply, splitting it into ordered chunks when it exceeds the
/// message limit
async fn reply_chunked(bot: &Bot, msg: &Message, text: String) -> Result<()> {
    for chunk in split_message(&text, MAX_MESSAGE_LENGTH) {
        bot.send_message(msg.chat.id, chunk)
            .parse_mode(ParseMode::Html)
            .await?;
    }
    Ok(())
}

fn caption_block(caption: Option<&str>) -> String {
    match caption {
        Some(caption) => format!(
            "\n\n<b>Caption:</b>\n<blockquote>{}</blockquote>",
            escape_html(caption)
        ),
        None => String::new(),
    }
}

/// Handle text messages
pub async fn handle_text(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    log_user_action(
        user.id.0 as i64,
        "text_message",
        Some(&format!("length={}", text.len())),
    );
    track_sender(&services, user).await;

    let response = render_text_reply(&user.first_name, text.trim());
    reply_chunked(&bot, &msg, response).await
}

/// Handle photo messages
pub async fn handle_photo(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(photos) = msg.photo() else {
        return Ok(());
    };
    // Telegram sends several resolutions; describe the largest
    let Some(photo) = photos.iter().max_by_key(|p| p.width * p.height) else {
        return Ok(());
    };

    log_user_action(user.id.0 as i64, "photo_message", None);
    track_sender(&services, user).await;

    let response = render_photo_reply(
        &user.first_name,
        &photo.file.id.0,
        photo.width,
        photo.height,
        photo.file.size as u64,
        msg.caption(),
    );
    reply_chunked(&bot, &msg, response).await
}

/// Handle document messages
pub async fn handle_document(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(document) = msg.document() else {
        return Ok(());
    };

    log_user_action(user.id.0 as i64, "document_message", None);
    track_sender(&services, user).await;

    let response = render_document_reply(
        &user.first_name,
        document.file_name.as_deref(),
        document.mime_type.as_ref().map(|m| m.to_string()).as_deref(),
        document.file.size as u64,
        &document.file.id.0,
        msg.caption(),
    );
    reply_chunked(&bot, &msg, response).await
}

/// Handle voice messages
pub async fn handle_voice(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(voice) = msg.voice() else {
        return Ok(());
    };

    log_user_action(user.id.0 as i64, "voice_message", None);
    track_sender(&services, user).await;

    let response = render_voice_reply(
        &user.first_name,
        voice.duration.seconds(),
        voice.file.size as u64,
        &voice.file.id.0,
    );
    reply_chunked(&bot, &msg, response).await
}

/// Handle video messages
pub async fn handle_video(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(video) = msg.video() else {
        return Ok(());
    };

    log_user_action(user.id.0 as i64, "video_message", None);
    track_sender(&services, user).await;

    let response = render_video_reply(
        &user.first_name,
        video.duration.seconds(),
        video.width,
        video.height,
        video.file.size as u64,
        &video.file.id.0,
        msg.caption(),
    );
    reply_chunked(&bot, &msg, response).await
}

/// Handle audio messages
pub async fn handle_audio(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(audio) = msg.audio() else {
        return Ok(());
    };

    log_user_action(user.id.0 as i64, "audio_message", None);
    track_sender(&services, user).await;

    let response = render_audio_reply(
        &user.first_name,
        audio.title.as_deref(),
        audio.performer.as_deref(),
        audio.duration.seconds(),
        audio.file.size as u64,
        &audio.file.id.0,
        msg.caption(),
    );
    reply_chunked(&bot, &msg, response).await
}

/// Handle sticker messages
pub async fn handle_sticker(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(sticker) = msg.sticker() else {
        return Ok(());
    };

    log_user_action(user.id.0 as i64, "sticker_message", None);
    track_sender(&services, user).await;

    let response = render_sticker_reply(
        &user.first_name,
        sticker.emoji.as_deref(),
        sticker.set_name.as_deref(),
        u32::from(sticker.width),
        u32::from(sticker.height),
        &sticker.file.id.0,
    );
    reply_chunked(&bot, &msg, response).await
}

/// Render the echo reply for a text message
pub fn render_text_reply(first_name: &str, text: &str) -> String {
    format!(
        "📝 <b>Message Received!</b>\n\n\
         👤 <b>From:</b> {}\n\
         📊 <b>Length:</b> {} characters\n\
         🔤 <b>Words:</b> {}\n\n\
         <b>Your message:</b>\n<blockquote>{}</blockquote>",
        escape_html(first_name),
        text.chars().count(),
        text.split_whitespace().count(),
        escape_html(text)
    )
}

/// Render the reply for a photo
pub fn render_photo_reply(
    first_name: &str,
    file_id: &str,
    width: u32,
    height: u32,
    file_size: u64,
    caption: Option<&str>,
) -> String {
    format!(
        "📷 <b>Photo Received!</b>\n\n\
         👤 <b>From:</b> {}\n\
         🆔 <b>File ID:</b> <code>{}</code>\n\
         📏 <b>Size:</b> {}x{} pixels\n\
         💾 <b>File Size:</b> {}{}",
        escape_html(first_name),
        file_id,
        width,
        height,
        format_bytes(file_size),
        caption_block(caption)
    )
}

/// Render the reply for a document, with a hint line for known MIME types
pub fn render_document_reply(
    first_name: &str,
    file_name: Option<&str>,
    mime_type: Option<&str>,
    file_size: u64,
    file_id: &str,
    caption: Option<&str>,
) -> String {
    let mut response = format!(
        "📄 <b>Document Received!</b>\n\n\
         👤 <b>From:</b> {}\n\
         📝 <b>Name:</b> {}\n\
         🗂️ <b>MIME Type:</b> {}\n\
         💾 <b>Size:</b> {}\n\
         🆔 <b>File ID:</b> <code>{}</code>{}",
        escape_html(first_name),
        escape_html(file_name.unwrap_or("Unknown")),
        mime_type.unwrap_or("Unknown"),
        format_bytes(file_size),
        file_id,
        caption_block(caption)
    );

    if let Some(mime) = mime_type {
        let hint = if mime.starts_with("image/") {
            Some("🖼️ <i>This appears to be an image file.</i>")
        } else if mime.starts_with("video/") {
            Some("🎥 <i>This appears to be a video file.</i>")
        } else if mime.starts_with("audio/") {
            Some("🎵 <i>This appears to be an audio file.</i>")
        } else if mime == "application/pdf" {
            Some("📋 <i>This appears to be a PDF document.</i>")
        } else if mime == "text/plain" || mime == "text/csv" {
            Some("📄 <i>This appears to be a text file.</i>")
        } else {
            None
        };

        if let Some(hint) = hint {
            response.push_str("\n\n");
            response.push_str(hint);
        }
    }

    response
}

/// Render the reply for a voice message
pub fn render_voice_reply(
    first_name: &str,
    duration_secs: u32,
    file_size: u64,
    file_id: &str,
) -> String {
    format!(
        "🎤 <b>Voice Message Received!</b>\n\n\
         👤 <b>From:</b> {}\n\
         ⏱️ <b>Duration:</b> {} seconds\n\
         💾 <b>Size:</b> {}\n\
         🆔 <b>File ID:</b> <code>{}</code>",
        escape_html(first_name),
        duration_secs,
        format_bytes(file_size),
        file_id
    )
}

/// Render the reply for a video
pub fn render_video_reply(
    first_name: &str,
    duration_secs: u32,
    width: u32,
    height: u32,
    file_size: u64,
    file_id: &str,
    caption: Option<&str>,
) -> String {
    format!(
        "🎥 <b>Video Received!</b>\n\n\
         👤 <b>From:</b> {}\n\
         ⏱️ <b>Duration:</b> {} seconds\n\
         📏 <b>Size:</b> {}x{} pixels\n\
         💾 <b>File Size:</b> {}\n\
         🆔 <b>File ID:</b> <code>{}</code>{}",
        escape_html(first_name),
        duration_secs,
        width,
        height,
        format_bytes(file_size),
        file_id,
        caption_block(caption)
    )
}

/// Render the reply for an audio file
pub fn render_audio_reply(
    first_name: &str,
    title: Option<&str>,
    performer: Option<&str>,
    duration_secs: u32,
    file_size: u64,
    file_id: &str,
    caption: Option<&str>,
) -> String {
    format!(
        "🎵 <b>Audio Received!</b>\n\n\
         👤 <b>From:</b> {}\n\
         🎼 <b>Title:</b> {}\n\
         🎤 <b>Artist:</b> {}\n\
         ⏱️ <b>Duration:</b> {} seconds\n\
         💾 <b>Size:</b> {}\n\
         🆔 <b>File ID:</b> <code>{}</code>{}",
        escape_html(first_name),
        escape_html(title.unwrap_or("Unknown")),
        escape_html(performer.unwrap_or("Unknown")),
        duration_secs,
        format_bytes(file_size),
        file_id,
        caption_block(caption)
    )
}

/// Render the reply for a sticker
pub fn render_sticker_reply(
    first_name: &str,
    emoji: Option<&str>,
    set_name: Option<&str>,
    width: u32,
    height: u32,
    file_id: &str,
) -> String {
    format!(
        "🎭 <b>Sticker Received!</b>\n\n\
         👤 <b>From:</b> {}\n\
         😀 <b>Emoji:</b> {}\n\
         📦 <b>Set Name:</b> {}\n\
         📏 <b>Size:</b> {}x{} pixels\n\
         🆔 <b>File ID:</b> <code>{}</code>\n\n\
         <i>Nice sticker! 👍</i>",
        escape_html(first_name),
        emoji.unwrap_or("None"),
        set_name.unwrap_or("Unknown"),
        width,
        height,
        file_id
    )
}
