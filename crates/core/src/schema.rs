//! Adapter between the internal [`Card`] model and the externally shared
//! wire contract ([`ExternalCard`]).
//!
//! Both directions are a structural re-encoding through a [`Codec`]: the
//! source is encoded into the exchange format and decoded into the target
//! shape. Fields are matched by name, fields unknown to the target are
//! dropped, and missing non-enum fields take their zero value. Enum literals
//! unknown to the target are rejected rather than defaulted.

use serde::{Deserialize, Serialize};

use crate::card::{Card, CardRepr};
use crate::codec::{Codec, JsonCodec};
use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// Wire contract
// ---------------------------------------------------------------------------

/// `cardType` as published in the shared contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExternalCardType {
    #[serde(rename = "task")]
    Task,
    #[serde(rename = "long-notice")]
    LongNotice,
    #[serde(rename = "short-notice")]
    ShortNotice,
}

/// `renderType` as published in the shared contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExternalRenderType {
    #[serde(rename = "task")]
    Task,
    #[serde(rename = "list-notice")]
    ListNotice,
    #[serde(rename = "icon-text-notice")]
    IconTextNotice,
    #[serde(rename = "markdown-notice")]
    MarkdownNotice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExternalActionSide {
    #[serde(rename = "left")]
    Left,
    #[serde(rename = "right")]
    Right,
}

/// A card in the shared wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCard {
    #[serde(default)]
    pub id: String,
    pub card_type: ExternalCardType,
    pub render_type: ExternalRenderType,
    #[serde(default)]
    pub content: ExternalCardContent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCardContent {
    #[serde(default)]
    pub title_icon: String,
    #[serde(default)]
    pub title_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_progress: Option<ExternalProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_icon_with_text: Option<ExternalIconWithText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_list: Option<Vec<ExternalListItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_actions: Option<Vec<ExternalFooterAction>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalProgress {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub progress: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIconWithText {
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalListItem {
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub right_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalFooterAction {
    pub side: ExternalActionSide,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub message_bus: ExternalMessageBusAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalMessageBusAction {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub payload: String,
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// Converts cards across the service boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaAdapter<C = JsonCodec> {
    codec: C,
}

impl<C: Codec> SchemaAdapter<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    /// Re-encode an internal card into the wire contract.
    pub fn to_external(&self, card: &Card) -> Result<ExternalCard, SchemaError> {
        self.codec.transcode(card)
    }

    /// Re-encode a wire card into the internal model.
    ///
    /// Fails with [`SchemaError::Validation`] when the payload populates a
    /// body that does not match its render type.
    pub fn from_external(&self, card: &ExternalCard) -> Result<Card, SchemaError> {
        let repr: CardRepr = self.codec.transcode(card)?;
        Ok(Card::try_from(repr)?)
    }

    /// Decode a raw exchange payload (e.g. an event body) into a card.
    pub fn card_from_payload(&self, payload: serde_json::Value) -> Result<Card, SchemaError> {
        let external: ExternalCard = self.codec.decode(payload)?;
        self.from_external(&external)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
