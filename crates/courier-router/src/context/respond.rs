//! Replies addressed from the update being handled.

use courier_core::{
    AnswerCallbackQueryParams, ChatId, DeleteMessageParams, Message, ReactionType,
    SendMessageParams, SetMessageReactionParams,
};

use super::Context;
use crate::error::{DispatchError, DispatchResult};

impl Context {
    /// Sends `params` to the user who caused the update, in a private chat.
    ///
    /// The `chat_id` of `params` is overwritten.
    pub fn respond_private_message(
        &mut self,
        mut params: SendMessageParams,
    ) -> DispatchResult<Message> {
        let update = self.update();
        let user_id = if let Some(message) = &update.message {
            message
                .from
                .as_ref()
                .map(|user| user.id)
                .ok_or(DispatchError::MissingField("message.from"))?
        } else if let Some(callback) = &update.callback_query {
            callback.from.id
        } else if let Some(inline) = &update.inline_query {
            inline.from.id
        } else {
            return Err(DispatchError::Unsupported("update has no sender"));
        };

        params.chat_id = ChatId::Id(user_id);
        self.send_message(&params)
    }

    /// Sends a plain text message to the user who caused the update.
    pub fn respond_private_message_text(
        &mut self,
        text: impl Into<String>,
    ) -> DispatchResult<Message> {
        self.respond_private_message(SendMessageParams {
            text: text.into(),
            ..Default::default()
        })
    }

    /// Reacts to the message being handled with an emoji.
    pub fn respond_reaction_emoji(&mut self, emoji: impl Into<String>) -> DispatchResult<bool> {
        let message = self
            .message()
            .ok_or(DispatchError::Unsupported("only messages can be reacted to"))?;

        let params = SetMessageReactionParams {
            chat_id: ChatId::Id(message.chat.id),
            message_id: message.id,
            reaction: vec![ReactionType::Emoji {
                emoji: emoji.into(),
            }],
            is_big: false,
        };

        self.set_message_reaction(&params)
    }

    /// Answers the callback query being handled with a notification text.
    pub fn respond_callback_text(&mut self, text: impl Into<String>) -> DispatchResult<bool> {
        let callback = self
            .callback_query()
            .ok_or(DispatchError::Unsupported("only callback queries can be answered"))?;

        let params = AnswerCallbackQueryParams {
            callback_query_id: callback.id.clone(),
            text: Some(text.into()),
            ..Default::default()
        };

        self.answer_callback_query(&params)
    }

    /// Deletes the message whose button produced the callback query.
    ///
    /// Works for inaccessible messages too: their chat and id are still known.
    pub fn delete_message_from_callback(&mut self) -> DispatchResult<bool> {
        let callback = self
            .callback_query()
            .ok_or(DispatchError::Unsupported("only callback queries carry a source message"))?;

        let message = callback
            .message
            .as_ref()
            .ok_or(DispatchError::MissingField("callback_query.message"))?;

        let params = DeleteMessageParams {
            chat_id: ChatId::Id(message.chat.id),
            message_id: message.id,
        };

        self.delete_message(&params)
    }
}
