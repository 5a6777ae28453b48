//! Telegram adapter.
//!
//! Maps teloxide updates onto the intake orchestrator and implements the
//! [`ChatTransport`] boundary, so nothing outside this module touches a
//! teloxide type.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId};
use teloxide::utils::command::BotCommands;

use crate::error::TransportError;
use crate::intake::{ChatTransport, InboundDocument, IntakeHandler, NoticeId};
use crate::session::ConversationId;

/// Fallback declared name when Telegram omits one; it has no extension, so
/// the validator rejects it with the normal format notice.
const UNNAMED_DOCUMENT: &str = "document";

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "start quiz extraction")]
    Start,
    #[command(description = "show this help")]
    Help,
}

/// [`ChatTransport`] backed by the Telegram Bot API.
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_notice(
        &self,
        conversation: ConversationId,
        text: &str,
    ) -> Result<NoticeId, TransportError> {
        let message = self
            .bot
            .send_message(ChatId(conversation), text)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;
        Ok(message.id.0)
    }

    async fn send_artifact(
        &self,
        conversation: ConversationId,
        path: &Path,
        caption: &str,
    ) -> Result<(), TransportError> {
        self.bot
            .send_document(ChatId(conversation), InputFile::file(path.to_path_buf()))
            .caption(caption.to_string())
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;
        Ok(())
    }

    async fn delete_notice(
        &self,
        conversation: ConversationId,
        notice: NoticeId,
    ) -> Result<(), TransportError> {
        self.bot
            .delete_message(ChatId(conversation), MessageId(notice))
            .await
            .map_err(|e| TransportError::Delete(e.to_string()))?;
        Ok(())
    }

    async fn download(&self, file_ref: &str) -> Result<Vec<u8>, TransportError> {
        let file = self
            .bot
            .get_file(file_ref.to_string())
            .await
            .map_err(|e| TransportError::Download(e.to_string()))?;

        let mut bytes = Vec::new();
        self.bot
            .download_file(&file.path, &mut bytes)
            .await
            .map_err(|e| TransportError::Download(e.to_string()))?;
        Ok(bytes)
    }
}

/// Run the dispatcher until shutdown.
pub async fn run(bot: Bot, intake: Arc<IntakeHandler>) {
    let handler = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(
            dptree::filter(|msg: Message| msg.document().is_some()).endpoint(handle_document),
        )
        .branch(dptree::endpoint(handle_other));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![intake])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_command(
    msg: Message,
    cmd: Command,
    intake: Arc<IntakeHandler>,
) -> ResponseResult<()> {
    let conversation = msg.chat.id.0;
    match cmd {
        Command::Start => intake.handle_start(conversation).await,
        Command::Help => {
            intake
                .announce(conversation, &Command::descriptions().to_string())
                .await;
        }
    }
    Ok(())
}

async fn handle_document(msg: Message, intake: Arc<IntakeHandler>) -> ResponseResult<()> {
    if let Some(document) = msg.document() {
        let inbound = InboundDocument {
            file_ref: document.file.id.clone(),
            file_name: document
                .file_name
                .clone()
                .unwrap_or_else(|| UNNAMED_DOCUMENT.to_string()),
        };
        intake.handle_document(msg.chat.id.0, inbound).await;
    }
    Ok(())
}

async fn handle_other(msg: Message, intake: Arc<IntakeHandler>) -> ResponseResult<()> {
    intake.handle_other(msg.chat.id.0).await;
    Ok(())
}
