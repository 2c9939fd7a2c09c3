// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use super::client::Client;
use serde_json::Value;
use tgbotapi_sender::{InvocationError, Params};

macro_rules! remote_methods {
    (
        without_params { $(fn $bare:ident => $bare_name:literal;)+ }
        with_params { $(fn $func:ident => $name:literal;)+ }
    ) => {
        /// The name of every Bot API method with a dedicated function on [`Client`].
        pub const METHODS: &[&str] = &[$($bare_name,)+ $($name,)+];

        impl Client {
            $(
                #[doc = concat!("Invokes [`", $bare_name, "`](https://core.telegram.org/bots/api#", $bare_name, ").")]
                pub async fn $bare(&self) -> Result<Value, InvocationError> {
                    self.invoke($bare_name, Params::new()).await
                }
            )+

            $(
                #[doc = concat!("Invokes [`", $name, "`](https://core.telegram.org/bots/api#", $name, ").")]
                pub async fn $func(&self, params: Params) -> Result<Value, InvocationError> {
                    self.invoke($name, params).await
                }
            )+
        }
    };
}

remote_methods! {
    without_params {
        fn get_me => "getMe";
        fn get_webhook_info => "getWebhookInfo";
        fn get_my_commands => "getMyCommands";
        fn log_out => "logOut";
        fn close => "close";
    }
    with_params {
        fn get_updates => "getUpdates";
        fn set_webhook => "setWebhook";
        fn delete_webhook => "deleteWebhook";

        fn send_message => "sendMessage";
        fn forward_message => "forwardMessage";
        fn send_photo => "sendPhoto";
        fn send_audio => "sendAudio";
        fn send_document => "sendDocument";
        fn send_video => "sendVideo";
        fn send_animation => "sendAnimation";
        fn send_voice => "sendVoice";
        fn send_video_note => "sendVideoNote";
        fn send_media_group => "sendMediaGroup";
        fn send_location => "sendLocation";
        fn edit_message_live_location => "editMessageLiveLocation";
        fn stop_message_live_location => "stopMessageLiveLocation";
        fn send_venue => "sendVenue";
        fn send_contact => "sendContact";
        fn send_poll => "sendPoll";
        fn send_dice => "sendDice";
        fn send_chat_action => "sendChatAction";
        fn get_user_profile_photos => "getUserProfilePhotos";
        fn get_file => "getFile";

        fn kick_chat_member => "kickChatMember";
        fn unban_chat_member => "unbanChatMember";
        fn restrict_chat_member => "restrictChatMember";
        fn promote_chat_member => "promoteChatMember";
        fn set_chat_administrator_custom_title => "setChatAdministratorCustomTitle";
        fn set_chat_permissions => "setChatPermissions";
        fn export_chat_invite_link => "exportChatInviteLink";
        fn set_chat_photo => "setChatPhoto";
        fn delete_chat_photo => "deleteChatPhoto";
        fn set_chat_title => "setChatTitle";
        fn set_chat_description => "setChatDescription";
        fn pin_chat_message => "pinChatMessage";
        fn unpin_chat_message => "unpinChatMessage";
        fn leave_chat => "leaveChat";
        fn get_chat => "getChat";
        fn get_chat_administrators => "getChatAdministrators";
        fn get_chat_members_count => "getChatMembersCount";
        fn get_chat_member => "getChatMember";
        fn set_chat_sticker_set => "setChatStickerSet";
        fn delete_chat_sticker_set => "deleteChatStickerSet";
        fn answer_callback_query => "answerCallbackQuery";
        fn set_my_commands => "setMyCommands";

        fn edit_message_text => "editMessageText";
        fn edit_message_caption => "editMessageCaption";
        fn edit_message_media => "editMessageMedia";
        fn edit_message_reply_markup => "editMessageReplyMarkup";
        fn stop_poll => "stopPoll";
        fn delete_message => "deleteMessage";

        fn send_sticker => "sendSticker";
        fn get_sticker_set => "getStickerSet";
        fn upload_sticker_file => "uploadStickerFile";
        fn create_new_sticker_set => "createNewStickerSet";
        fn add_sticker_to_set => "addStickerToSet";
        fn set_sticker_position_in_set => "setStickerPositionInSet";
        fn delete_sticker_from_set => "deleteStickerFromSet";
        fn set_sticker_set_thumb => "setStickerSetThumb";

        fn answer_inline_query => "answerInlineQuery";

        fn send_invoice => "sendInvoice";
        fn answer_shipping_query => "answerShippingQuery";
        fn answer_pre_checkout_query => "answerPreCheckoutQuery";

        fn set_passport_data_errors => "setPassportDataErrors";

        fn send_game => "sendGame";
        fn set_game_score => "setGameScore";
        fn get_game_high_scores => "getGameHighScores";
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTransport, client_with};
    use std::collections::HashSet;
    use tgbotapi_sender::ParamValue;

    #[test]
    fn method_names_are_unique() {
        let unique = METHODS.iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), METHODS.len());
        assert!(METHODS.contains(&"getUpdates"));
        assert!(METHODS.contains(&"setWebhook"));
        assert!(METHODS.contains(&"deleteWebhook"));
    }

    #[tokio::test]
    async fn methods_forward_to_invoke() {
        let transport = MockTransport::ok(Value::Bool(true));
        let client = client_with(transport.clone());

        client.get_me().await.unwrap();
        client
            .send_message(Params::new().with("chat_id", 1).with("text", "hi"))
            .await
            .unwrap();
        client.answer_callback_query(Params::new()).await.unwrap();

        let calls = transport.calls();
        let methods = calls.iter().map(|c| c.method.as_str()).collect::<Vec<_>>();
        assert_eq!(methods, ["getMe", "sendMessage", "answerCallbackQuery"]);
        assert!(calls[0].params.is_empty());
        assert_eq!(
            calls[1].params.get("text"),
            Some(&ParamValue::Text("hi".into()))
        );
    }
}
