//! Human-readable command lists registered with the platform.
//!
//! A [`CommandDescriber`] is a nested lookup table
//! `scope → language → command → description`. Each (scope, language) pair
//! becomes one `setMyCommands` call.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::ChatId;

/// ISO 639-1 language code. The empty code applies to every language.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(Cow<'static, str>);

impl LanguageCode {
    /// All languages.
    pub const ALL: Self = Self(Cow::Borrowed(""));
    /// English.
    pub const EN: Self = Self(Cow::Borrowed("en"));
    /// Ukrainian.
    pub const UK: Self = Self(Cow::Borrowed("uk"));

    /// Creates a language code from an arbitrary tag.
    pub fn new(code: impl Into<String>) -> Self {
        Self(Cow::Owned(code.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for [`LanguageCode::ALL`].
    pub fn is_all(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for LanguageCode {
    fn from(code: &'static str) -> Self {
        Self(Cow::Borrowed(code))
    }
}

/// The audience a command list applies to.
///
/// <https://core.telegram.org/bots/api#botcommandscope>
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandScope {
    #[default]
    Default,
    AllPrivateChats,
    AllGroupChats,
    AllChatAdministrators,
    Chat {
        chat_id: ChatId,
    },
    ChatAdministrators {
        chat_id: ChatId,
    },
    ChatMember {
        chat_id: ChatId,
        user_id: i64,
    },
}

/// A command shown in the platform's command menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotCommand {
    pub command: String,
    pub description: String,
}

/// Parameters of `setMyCommands`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetMyCommandsParams {
    pub commands: Vec<BotCommand>,
    pub scope: CommandScope,
    #[serde(default, skip_serializing_if = "LanguageCode::is_all")]
    pub language_code: LanguageCode,
}

/// One description of a command for a scope and language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandDescription {
    pub scope: CommandScope,
    pub language_code: LanguageCode,
    /// Text shown next to the command. Empty means "use the command itself".
    pub description: String,
}

impl CommandDescription {
    /// A description for the default scope in every language.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_scope(mut self, scope: CommandScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_language(mut self, language_code: LanguageCode) -> Self {
        self.language_code = language_code;
        self
    }
}

/// Collects command descriptions per scope and language.
#[derive(Debug, Clone, Default)]
pub struct CommandDescriber {
    data: BTreeMap<CommandScope, BTreeMap<LanguageCode, BTreeMap<String, String>>>,
}

impl CommandDescriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds descriptions of `command`. A later description for the same
    /// (scope, language, command) replaces the earlier one.
    pub fn add_command_description(
        &mut self,
        command: &str,
        descriptions: impl IntoIterator<Item = CommandDescription>,
    ) {
        for CommandDescription {
            scope,
            language_code,
            description,
        } in descriptions
        {
            let description = if description.is_empty() {
                command.to_string()
            } else {
                description
            };

            let commands = self
                .data
                .entry(scope)
                .or_default()
                .entry(language_code)
                .or_default();

            if let Some(previous) = commands.insert(command.to_string(), description) {
                debug!(command, previous = %previous, "Replaced command description");
            }
        }
    }

    /// Returns `true` if no description has been added.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Builds one `setMyCommands` parameter set per (scope, language) pair.
    ///
    /// The order is deterministic: scopes, languages and commands are sorted.
    pub fn list_commands_params(&self) -> Vec<SetMyCommandsParams> {
        self.data
            .iter()
            .flat_map(|(scope, languages)| {
                languages.iter().map(move |(language_code, commands)| SetMyCommandsParams {
                    commands: commands
                        .iter()
                        .map(|(command, description)| BotCommand {
                            command: command.clone(),
                            description: description.clone(),
                        })
                        .collect(),
                    scope: scope.clone(),
                    language_code: language_code.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_empty_description_falls_back_to_command() {
        let mut describer = CommandDescriber::new();
        describer.add_command_description("start", [CommandDescription::default()]);

        let params = describer.list_commands_params();
        assert_eq!(params.len(), 1);
        assert_eq!(
            params[0].commands,
            vec![BotCommand {
                command: "start".into(),
                description: "start".into(),
            }]
        );
    }

    #[test]
    fn test_groups_by_scope_and_language() {
        let mut describer = CommandDescriber::new();
        describer.add_command_description(
            "help",
            [
                CommandDescription::new("Show help"),
                CommandDescription::new("Допомога").with_language(LanguageCode::UK),
                CommandDescription::new("Admin help").with_scope(CommandScope::AllChatAdministrators),
            ],
        );
        describer.add_command_description("start", [CommandDescription::new("Start")]);

        let params = describer.list_commands_params();
        assert_eq!(params.len(), 3);

        assert_eq!(params[0].scope, CommandScope::Default);
        assert_eq!(params[0].language_code, LanguageCode::ALL);
        let commands: Vec<_> = params[0].commands.iter().map(|c| c.command.as_str()).collect();
        assert_eq!(commands, ["help", "start"]);

        assert_eq!(params[1].scope, CommandScope::Default);
        assert_eq!(params[1].language_code, LanguageCode::UK);
        assert_eq!(params[1].commands[0].description, "Допомога");

        assert_eq!(params[2].scope, CommandScope::AllChatAdministrators);
    }

    #[test]
    fn test_later_description_replaces_earlier() {
        let mut describer = CommandDescriber::new();
        describer.add_command_description("start", [CommandDescription::new("old")]);
        describer.add_command_description("start", [CommandDescription::new("new")]);

        let params = describer.list_commands_params();
        assert_eq!(params[0].commands.len(), 1);
        assert_eq!(params[0].commands[0].description, "new");
    }

    #[test]
    fn test_params_serialization() {
        let params = SetMyCommandsParams {
            commands: vec![BotCommand {
                command: "start".into(),
                description: "Start".into(),
            }],
            scope: CommandScope::ChatMember {
                chat_id: ChatId::Id(-1),
                user_id: 7,
            },
            language_code: LanguageCode::EN,
        };

        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "commands": [{"command": "start", "description": "Start"}],
                "scope": {"type": "chat_member", "chat_id": -1, "user_id": 7},
                "language_code": "en"
            })
        );

        let default = serde_json::to_value(SetMyCommandsParams::default()).unwrap();
        assert_eq!(default, json!({"commands": [], "scope": {"type": "default"}}));
    }
}
