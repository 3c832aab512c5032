use serde::{Deserialize, Serialize};

use crate::config::NotifierConfig;
use crate::error::{NotifierError, Result};

// ---------------------------------------------------------------------------
// Embed — Discord rich message body
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

impl Embed {
    pub fn new(title: impl Into<String>, description: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            color,
            fields: Vec::new(),
            footer: None,
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn footer(mut self, text: impl Into<String>, icon_url: Option<String>) -> Self {
        self.footer = Some(EmbedFooter {
            text: text.into(),
            icon_url,
        });
        self
    }

    /// Look up a field by its exact name.
    pub fn get_field(&self, name: &str) -> Option<&EmbedField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

// ---------------------------------------------------------------------------
// WebhookMessage — JSON body POSTed to the webhook
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    pub username: String,
    pub avatar_url: String,
}

impl WebhookMessage {
    /// Build a message posted under the config's display name and avatar.
    ///
    /// At least one of `content` or `embed` must be given.
    pub fn new(config: &NotifierConfig, content: Option<String>, embed: Option<Embed>) -> Result<Self> {
        let content = content.filter(|c| !c.trim().is_empty());
        if content.is_none() && embed.is_none() {
            return Err(NotifierError::InvalidArgument(
                "Either message or embed must be provided".into(),
            ));
        }
        Ok(Self {
            content,
            embeds: embed.into_iter().collect(),
            username: config.display_name.clone(),
            avatar_url: config.avatar_url.clone(),
        })
    }
}
