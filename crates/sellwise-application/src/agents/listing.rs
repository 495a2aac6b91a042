//! Listing agents: keyword research, listing optimization, audits and A+ content.

use sellwise_core::shape::{FieldShape, Shape};
use sellwise_core::task::{InputField, InputKind};
use serde::{Deserialize, Serialize};

use super::{Level, MARKETPLACE_CONSULTANT, level_shape, marketplace_field};
use crate::adapter::TaskDefinition;

pub const KEYWORD_DIFFICULTIES: [&str; 4] = ["Easy", "Medium", "Hard", "Very Hard"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeywordDifficulty {
    Easy,
    Medium,
    Hard,
    #[serde(rename = "Very Hard")]
    VeryHard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSuggestion {
    pub term: String,
    /// Estimated monthly searches as the model phrases it (e.g. `10K`).
    pub volume: String,
    pub difficulty: KeywordDifficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordFinderResult {
    pub keywords: Vec<KeywordSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingOptimizerResult {
    pub title: String,
    pub bullet_points: Vec<String>,
    pub description: String,
    pub search_terms: Vec<String>,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditIssue {
    pub area: String,
    pub severity: Level,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingAuditResult {
    pub score: u8,
    pub issues: Vec<AuditIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

pub(crate) fn keyword_finder() -> TaskDefinition {
    TaskDefinition::new(
        "keyword-finder",
        "Find high-intent search keywords for a product",
        vec![
            InputField::required("productName", InputKind::Text),
            InputField::required("category", InputKind::Text),
            marketplace_field(),
            InputField::optional("targetAudience", InputKind::Text),
        ],
        r#"Find the best search keywords for this product on {{ marketplace }}.

Product: {{ productName }}
Category: {{ category }}
{% if targetAudience %}
Target audience: {{ targetAudience }}
{% endif %}

Suggest 10 to 15 keywords shoppers actually type on {{ marketplace }}, mixing short
head terms and long-tail phrases. For each keyword give an estimated monthly search
volume (for example "10K" or "2.5K") and a ranking difficulty of Easy, Medium, Hard
or Very Hard."#,
        Shape::object(vec![FieldShape::required(
            "keywords",
            Shape::array_of(Shape::object(vec![
                FieldShape::required("term", Shape::Text),
                FieldShape::required("volume", Shape::Text),
                FieldShape::required("difficulty", Shape::one_of(KEYWORD_DIFFICULTIES)),
                FieldShape::optional("rationale", Shape::Text),
            ])),
        )]),
    )
    .with_system_instruction(MARKETPLACE_CONSULTANT)
}

pub(crate) fn listing_optimizer() -> TaskDefinition {
    TaskDefinition::new(
        "listing-optimizer",
        "Rewrite a product listing for search ranking and conversion",
        vec![
            InputField::required("productName", InputKind::Text),
            InputField::required("category", InputKind::Text),
            marketplace_field(),
            InputField::optional("currentTitle", InputKind::Text),
            InputField::optional("features", InputKind::TextList),
            InputField::optional("keywords", InputKind::TextList),
        ],
        r#"Optimize the {{ marketplace }} listing for "{{ productName }}" ({{ category }}).
{% if currentTitle %}

Current title: {{ currentTitle }}
{% endif %}
{% if features %}

Key features:
{{ features | bullets }}
{% endif %}
{% if keywords %}

Work these keywords in naturally: {{ keywords | join(", ") }}
{% endif %}

Follow {{ marketplace }} title length and style rules. Write five benefit-led bullet
points, a persuasive description, backend search terms, and score the optimized
listing from 0 to 100."#,
        Shape::object(vec![
            FieldShape::required("title", Shape::Text),
            FieldShape::required("bulletPoints", Shape::non_empty_array_of(Shape::Text)),
            FieldShape::required("description", Shape::Text),
            FieldShape::required("searchTerms", Shape::text_list()),
            FieldShape::required("score", Shape::score()),
        ]),
    )
    .with_system_instruction(MARKETPLACE_CONSULTANT)
}

pub(crate) fn listing_audit() -> TaskDefinition {
    TaskDefinition::new(
        "listing-audit",
        "Score an existing listing and list what to fix",
        vec![
            InputField::required("productName", InputKind::Text),
            marketplace_field(),
            InputField::required("title", InputKind::Text),
            InputField::required("description", InputKind::Text),
            InputField::optional("bulletPoints", InputKind::TextList),
            InputField::optional("imageCount", InputKind::Number),
        ],
        r#"Audit this {{ marketplace }} listing for "{{ productName }}".

Title: {{ title }}

Description:
{{ description }}
{% if bulletPoints %}

Bullet points:
{{ bulletPoints | bullets }}
{% endif %}
{% if imageCount is defined %}

Number of images: {{ imageCount }}
{% endif %}

Score the listing from 0 to 100 against {{ marketplace }} best practices. List every
issue with the area it affects (title, bullets, description, images, keywords,
compliance), a severity of High, Medium or Low, and a concrete recommendation."#,
        Shape::object(vec![
            FieldShape::required("score", Shape::score()),
            FieldShape::required(
                "issues",
                Shape::array_of(Shape::object(vec![
                    FieldShape::required("area", Shape::Text),
                    FieldShape::required("severity", level_shape()),
                    FieldShape::required("recommendation", Shape::Text),
                ])),
            ),
            FieldShape::optional("summary", Shape::Text),
        ]),
    )
    .with_system_instruction(MARKETPLACE_CONSULTANT)
}

pub(crate) fn a_plus_content() -> TaskDefinition {
    TaskDefinition::new(
        "a-plus-content",
        "Draft A+ / enhanced brand content modules",
        vec![
            InputField::required("productName", InputKind::Text),
            InputField::required("brand", InputKind::Text),
            InputField::required("features", InputKind::TextList),
            InputField::optional("brandStory", InputKind::Text),
        ],
        r#"Write A+ content for {{ brand }}'s "{{ productName }}".

Features to showcase:
{{ features | bullets }}
{% if brandStory %}

Brand story: {{ brandStory }}
{% endif %}

Produce a headline and three to five content modules, each with a short heading and
a body of two or three sentences. Suggest an image for each module."#,
        Shape::object(vec![
            FieldShape::required("headline", Shape::Text),
            FieldShape::required(
                "modules",
                Shape::non_empty_array_of(Shape::object(vec![
                    FieldShape::required("heading", Shape::Text),
                    FieldShape::required("body", Shape::Text),
                    FieldShape::optional("imageSuggestion", Shape::Text),
                ])),
            ),
        ]),
    )
    .with_system_instruction(MARKETPLACE_CONSULTANT)
}
