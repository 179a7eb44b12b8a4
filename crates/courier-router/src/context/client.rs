//! Platform calls made from inside a handler chain.
//!
//! Sending, answering, reacting and deleting accept the update on success.
//! Edits do not: re-editing a message must not hide a later accept decision.

use courier_core::api::{
    ANSWER_CALLBACK_QUERY, DELETE_MESSAGE, EDIT_MESSAGE_MEDIA, EDIT_MESSAGE_TEXT, SEND_MESSAGE,
    SET_MESSAGE_REACTION,
};
use courier_core::{
    AnswerCallbackQueryParams, BotApi, BotApiExt, DeleteMessageParams, EditMessageMediaParams,
    EditMessageTextParams, Message, SendMessageParams, SetMessageReactionParams,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Context;
use crate::error::{DispatchError, DispatchResult};

impl Context {
    /// The platform client configured on the router.
    pub fn client(&self) -> DispatchResult<&dyn BotApi> {
        self.client.as_deref().ok_or(DispatchError::ClientNotSet)
    }

    fn invoke<P, R>(&self, method: &'static str, params: &P) -> DispatchResult<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.client()?
            .invoke(method, params)
            .map_err(|source| DispatchError::Api { method, source })
    }

    /// Calls an arbitrary platform method. Does not accept the update.
    pub fn call(&self, method: &'static str, params: Value) -> DispatchResult<Value> {
        self.client()?
            .call(method, params)
            .map_err(|source| DispatchError::Api { method, source })
    }

    /// <https://core.telegram.org/bots/api#answercallbackquery>
    pub fn answer_callback_query(
        &mut self,
        params: &AnswerCallbackQueryParams,
    ) -> DispatchResult<bool> {
        let res = self.invoke(ANSWER_CALLBACK_QUERY, params)?;
        self.accept();
        Ok(res)
    }

    /// <https://core.telegram.org/bots/api#sendmessage>
    pub fn send_message(&mut self, params: &SendMessageParams) -> DispatchResult<Message> {
        let res = self.invoke(SEND_MESSAGE, params)?;
        self.accept();
        Ok(res)
    }

    /// <https://core.telegram.org/bots/api#editmessagetext>
    pub fn edit_message_text(&self, params: &EditMessageTextParams) -> DispatchResult<Message> {
        self.invoke(EDIT_MESSAGE_TEXT, params)
    }

    /// <https://core.telegram.org/bots/api#editmessagemedia>
    pub fn edit_message_media(&self, params: &EditMessageMediaParams) -> DispatchResult<Message> {
        self.invoke(EDIT_MESSAGE_MEDIA, params)
    }

    /// <https://core.telegram.org/bots/api#setmessagereaction>
    pub fn set_message_reaction(
        &mut self,
        params: &SetMessageReactionParams,
    ) -> DispatchResult<bool> {
        let res = self.invoke(SET_MESSAGE_REACTION, params)?;
        self.accept();
        Ok(res)
    }

    /// <https://core.telegram.org/bots/api#deletemessage>
    pub fn delete_message(&mut self, params: &DeleteMessageParams) -> DispatchResult<bool> {
        let res = self.invoke(DELETE_MESSAGE, params)?;
        self.accept();
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use courier_core::Update;
    use serde_json::json;

    use super::*;
    use crate::test_support::RecordingApi;

    fn context(api: &Arc<RecordingApi>) -> Context {
        let mut ctx = Context::new();
        ctx.prepare(Some(api.clone() as Arc<dyn BotApi>), Arc::new(Update::default()), "test");
        ctx
    }

    #[test]
    fn test_missing_client() {
        let mut ctx = Context::new();
        let err = ctx.send_message(&SendMessageParams::new(1, "hi")).unwrap_err();
        assert!(matches!(err, DispatchError::ClientNotSet));
        assert!(!ctx.is_accepted());
    }

    #[test]
    fn test_send_accepts() {
        let api = Arc::new(RecordingApi::new());
        let mut ctx = context(&api);

        let message = ctx.send_message(&SendMessageParams::new(5, "hi")).unwrap();
        assert_eq!(message.text, "hi");
        assert!(ctx.is_accepted());
        assert_eq!(api.calls(), vec![(SEND_MESSAGE.to_string(), json!({"chat_id": 5, "text": "hi"}))]);
    }

    #[test]
    fn test_edit_does_not_accept() {
        let api = Arc::new(RecordingApi::new());
        let ctx = context(&api);

        ctx.edit_message_text(&EditMessageTextParams {
            chat_id: Some(5.into()),
            message_id: Some(1),
            text: "edited".into(),
            ..Default::default()
        })
        .unwrap();

        assert!(!ctx.is_accepted());
        assert_eq!(api.methods(), [EDIT_MESSAGE_TEXT]);
    }

    #[test]
    fn test_failed_call_does_not_accept() {
        let api = Arc::new(RecordingApi::new());
        api.fail(DELETE_MESSAGE);
        let mut ctx = context(&api);

        let err = ctx.delete_message(&DeleteMessageParams::default()).unwrap_err();
        assert!(matches!(err, DispatchError::Api { method: DELETE_MESSAGE, .. }));
        assert!(!ctx.is_accepted());
    }

    #[test]
    fn test_accepting_calls() {
        let api = Arc::new(RecordingApi::new());
        let mut ctx = context(&api);
        ctx.answer_callback_query(&AnswerCallbackQueryParams::default())
            .unwrap();
        assert!(ctx.is_accepted());

        let mut ctx = context(&api);
        ctx.set_message_reaction(&SetMessageReactionParams::default())
            .unwrap();
        assert!(ctx.is_accepted());

        let ctx = context(&api);
        ctx.call("getMe", json!({})).unwrap();
        assert!(!ctx.is_accepted());
    }
}
