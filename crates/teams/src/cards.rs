use hrbot_core::CandidateView;
use serde::Serialize;

pub const CARD_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";
pub const CARD_VERSION: &str = "1.4";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TextWeight {
    Lighter,
    Default,
    Bolder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TextSize {
    Small,
    Default,
    Medium,
    Large,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub id: String,
    pub text: String,
    pub wrap: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<TextWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<TextSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_subtle: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CardElement {
    TextBlock(TextBlock),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveCard {
    #[serde(rename = "type")]
    pub card_type: &'static str,
    #[serde(rename = "$schema")]
    pub schema: &'static str,
    pub version: &'static str,
    pub fallback_text: String,
    pub body: Vec<CardElement>,
}

pub struct CardBuilder {
    fallback_text: String,
    body: Vec<CardElement>,
}

impl CardBuilder {
    pub fn new(fallback_text: impl Into<String>) -> Self {
        Self { fallback_text: fallback_text.into(), body: Vec::new() }
    }

    pub fn text<F>(mut self, id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut TextBlockBuilder),
    {
        let mut builder = TextBlockBuilder::default();
        build(&mut builder);
        self.body.push(CardElement::TextBlock(builder.build(id.into())));
        self
    }

    pub fn build(self) -> AdaptiveCard {
        AdaptiveCard {
            card_type: "AdaptiveCard",
            schema: CARD_SCHEMA,
            version: CARD_VERSION,
            fallback_text: self.fallback_text,
            body: self.body,
        }
    }
}

#[derive(Default)]
pub struct TextBlockBuilder {
    text: String,
    weight: Option<TextWeight>,
    size: Option<TextSize>,
    is_subtle: Option<bool>,
}

impl TextBlockBuilder {
    pub fn content(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = text.into();
        self
    }

    pub fn weight(&mut self, weight: TextWeight) -> &mut Self {
        self.weight = Some(weight);
        self
    }

    pub fn size(&mut self, size: TextSize) -> &mut Self {
        self.size = Some(size);
        self
    }

    pub fn subtle(&mut self) -> &mut Self {
        self.is_subtle = Some(true);
        self
    }

    fn build(self, id: String) -> TextBlock {
        TextBlock {
            id,
            text: self.text,
            wrap: true,
            weight: self.weight,
            size: self.size,
            is_subtle: self.is_subtle,
        }
    }
}

/// One card per candidate: a bold name title followed by identifier, score
/// and summary blocks.
pub fn candidate_card(view: &CandidateView) -> AdaptiveCard {
    CardBuilder::new(format!("Candidate {}", view.name))
        .text("candidate.name.v1", |block| {
            block.content(&view.name).weight(TextWeight::Bolder).size(TextSize::Medium);
        })
        .text("candidate.employee_id.v1", |block| {
            block.content(format!("**Employee ID:** {}", view.card_identifier()));
        })
        .text("candidate.score.v1", |block| {
            block.content(format!("**Score:** {}", view.card_score())).subtle();
        })
        .text("candidate.summary.v1", |block| {
            block.content(format!("**Summary:** {}", view.summary));
        })
        .build()
}
