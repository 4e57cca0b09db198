//! Card data model.
//!
//! A [`Card`] is a unit of notification content with a [`CardType`], a
//! polymorphic [`CardBody`] and optional footer actions. The body is a tagged
//! variant, so the [`RenderType`] is derived from it and a card can never
//! carry a body that does not match how it renders.
//!
//! On the wire (and in storage) cards use a flat shape in which every body
//! kind is an optional field of `content`. Deserializing that shape checks
//! that only the body matching `renderType` is populated; the value checks
//! in [`Card::validate`] are applied before a card is stored, not on decode.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Upper bound for [`Progress::progress`].
pub const MAX_PROGRESS: i64 = 100;

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

/// What kind of notification a card represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardType {
    Task,
    LongNotice,
    /// Transient notice; observed live on the bus and never stored.
    ShortNotice,
}

impl CardType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::LongNotice => "long-notice",
            Self::ShortNotice => "short-notice",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which visual template displays a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderType {
    Task,
    ListNotice,
    IconTextNotice,
    MarkdownNotice,
}

impl RenderType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::ListNotice => "list-notice",
            Self::IconTextNotice => "icon-text-notice",
            Self::MarkdownNotice => "markdown-notice",
        }
    }
}

impl fmt::Display for RenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placement of a footer action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionSide {
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// Content shapes
// ---------------------------------------------------------------------------

/// Body of a task card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub progress: i64,
}

/// Body of an icon-text notice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconWithText {
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

/// One row of a list notice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub right_text: String,
}

impl ListItem {
    pub fn new(
        icon: impl Into<String>,
        description: impl Into<String>,
        right_text: impl Into<String>,
    ) -> Self {
        Self {
            icon: icon.into(),
            description: description.into(),
            right_text: right_text.into(),
        }
    }
}

/// Reference to a message-bus operation triggered by a footer action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBusAction {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub payload: String,
}

impl MessageBusAction {
    pub fn new(key: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
        }
    }
}

/// A user-triggerable control rendered in a card's footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterAction {
    pub side: ActionSide,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "messageBus", default)]
    pub action: MessageBusAction,
}

impl FooterAction {
    pub fn new(
        side: ActionSide,
        style: impl Into<String>,
        text: impl Into<String>,
        action: MessageBusAction,
    ) -> Self {
        Self {
            side,
            style: style.into(),
            text: text.into(),
            action,
        }
    }
}

/// The render-specific body of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardBody {
    /// A task, optionally reporting progress.
    Task(Option<Progress>),
    ListNotice(Vec<ListItem>),
    IconTextNotice(IconWithText),
    /// Markdown notices keep their body in the title fields.
    MarkdownNotice,
}

impl CardBody {
    /// A task body with no progress reported yet.
    pub fn task() -> Self {
        Self::Task(None)
    }

    pub fn list(items: impl IntoIterator<Item = ListItem>) -> Self {
        Self::ListNotice(items.into_iter().collect())
    }

    pub fn icon_text(icon: impl Into<String>, description: impl Into<String>) -> Self {
        Self::IconTextNotice(IconWithText {
            icon: icon.into(),
            description: description.into(),
        })
    }

    pub fn markdown() -> Self {
        Self::MarkdownNotice
    }

    pub fn render_type(&self) -> RenderType {
        match self {
            Self::Task(_) => RenderType::Task,
            Self::ListNotice(_) => RenderType::ListNotice,
            Self::IconTextNotice(_) => RenderType::IconTextNotice,
            Self::MarkdownNotice => RenderType::MarkdownNotice,
        }
    }
}

/// Title, body and footer of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardContent {
    pub title_icon: String,
    pub title_text: String,
    pub body: CardBody,
    pub footer_actions: Vec<FooterAction>,
}

impl CardContent {
    pub fn new(body: CardBody) -> Self {
        Self {
            title_icon: String::new(),
            title_text: String::new(),
            body,
            footer_actions: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// A renderable notification card.
///
/// Built by producers with [`Card::new`] and the `with_*` helpers, all of
/// which take the card by value and return the updated card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CardRepr", into = "CardRepr")]
pub struct Card {
    pub id: String,
    pub card_type: CardType,
    pub content: CardContent,
}

impl Card {
    pub fn new(id: impl Into<String>, card_type: CardType, body: CardBody) -> Self {
        Self {
            id: id.into(),
            card_type,
            content: CardContent::new(body),
        }
    }

    pub fn render_type(&self) -> RenderType {
        self.content.body.render_type()
    }

    /// Short notices are never durably persisted.
    pub fn is_ephemeral(&self) -> bool {
        self.card_type == CardType::ShortNotice
    }

    /// Set the title icon and text, overwriting any previous values.
    pub fn with_task_content(mut self, icon: impl Into<String>, text: impl Into<String>) -> Self {
        self.content.title_icon = icon.into();
        self.content.title_text = text.into();
        self
    }

    /// Attach or replace the progress of a task card.
    ///
    /// Cards that do not render as [`RenderType::Task`] are returned
    /// unchanged, since progress is not a valid body for them.
    pub fn with_progress(mut self, label: impl Into<String>, progress: i64) -> Self {
        if let CardBody::Task(current) = &mut self.content.body {
            *current = Some(Progress {
                label: label.into(),
                progress,
            });
        }
        self
    }

    /// Replace the body, which also changes the render type.
    pub fn with_body(mut self, body: CardBody) -> Self {
        self.content.body = body;
        self
    }

    pub fn with_footer_action(mut self, action: FooterAction) -> Self {
        self.content.footer_actions.push(action);
        self
    }

    /// Check the invariants that the type system does not enforce.
    ///
    /// Decoding never calls this, so any card that was encoded can be read
    /// back.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if let CardBody::Task(Some(progress)) = &self.content.body {
            if !(0..=MAX_PROGRESS).contains(&progress.progress) {
                return Err(ValidationError::ProgressOutOfRange(progress.progress));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Flat representation
// ---------------------------------------------------------------------------

/// The flat, wire-shaped form of a [`Card`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CardRepr {
    #[serde(default)]
    pub(crate) id: String,
    pub(crate) card_type: CardType,
    pub(crate) render_type: RenderType,
    #[serde(default)]
    pub(crate) content: ContentRepr,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContentRepr {
    #[serde(default)]
    pub(crate) title_icon: String,
    #[serde(default)]
    pub(crate) title_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) body_progress: Option<Progress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) body_icon_with_text: Option<IconWithText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) body_list: Option<Vec<ListItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) footer_actions: Option<Vec<FooterAction>>,
}

impl From<Card> for CardRepr {
    fn from(card: Card) -> Self {
        let render_type = card.render_type();
        let CardContent {
            title_icon,
            title_text,
            body,
            footer_actions,
        } = card.content;

        let mut content = ContentRepr {
            title_icon,
            title_text,
            footer_actions: non_empty(footer_actions),
            ..Default::default()
        };
        match body {
            CardBody::Task(progress) => content.body_progress = progress,
            CardBody::ListNotice(items) => content.body_list = non_empty(items),
            CardBody::IconTextNotice(body) => content.body_icon_with_text = Some(body),
            CardBody::MarkdownNotice => {}
        }

        Self {
            id: card.id,
            card_type: card.card_type,
            render_type,
            content,
        }
    }
}

impl TryFrom<CardRepr> for Card {
    type Error = ValidationError;

    fn try_from(repr: CardRepr) -> Result<Self, Self::Error> {
        let render_type = repr.render_type;
        let ContentRepr {
            title_icon,
            title_text,
            body_progress,
            body_icon_with_text,
            body_list,
            footer_actions,
        } = repr.content;

        let has_progress = body_progress.is_some();
        let has_icon_text = body_icon_with_text.is_some();
        let has_list = body_list.as_ref().is_some_and(|items| !items.is_empty());

        let body = match render_type {
            RenderType::Task => {
                reject_body(render_type, "bodyIconWithText", has_icon_text)?;
                reject_body(render_type, "bodyList", has_list)?;
                CardBody::Task(body_progress)
            }
            RenderType::ListNotice => {
                reject_body(render_type, "bodyProgress", has_progress)?;
                reject_body(render_type, "bodyIconWithText", has_icon_text)?;
                CardBody::ListNotice(body_list.unwrap_or_default())
            }
            RenderType::IconTextNotice => {
                reject_body(render_type, "bodyProgress", has_progress)?;
                reject_body(render_type, "bodyList", has_list)?;
                CardBody::IconTextNotice(body_icon_with_text.unwrap_or_default())
            }
            RenderType::MarkdownNotice => {
                reject_body(render_type, "bodyProgress", has_progress)?;
                reject_body(render_type, "bodyIconWithText", has_icon_text)?;
                reject_body(render_type, "bodyList", has_list)?;
                CardBody::MarkdownNotice
            }
        };

        let card = Card {
            id: repr.id,
            card_type: repr.card_type,
            content: CardContent {
                title_icon,
                title_text,
                body,
                footer_actions: footer_actions.unwrap_or_default(),
            },
        };
        Ok(card)
    }
}

fn reject_body(
    render_type: RenderType,
    field: &'static str,
    present: bool,
) -> Result<(), ValidationError> {
    if present {
        return Err(ValidationError::UnexpectedBody { render_type, field });
    }
    Ok(())
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
