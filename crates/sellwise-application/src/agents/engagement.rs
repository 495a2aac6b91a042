//! Customer-facing copy: review replies, query replies, ads and social captions.

use sellwise_core::shape::{FieldShape, Shape};
use sellwise_core::task::{InputField, InputKind};
use serde::{Deserialize, Serialize};

use super::{MARKETPLACE_CONSULTANT, marketplace_field, to_strings};
use crate::adapter::TaskDefinition;

pub const REPLY_TONES: [&str; 4] = ["Professional", "Friendly", "Apologetic", "Grateful"];
pub const SOCIAL_PLATFORMS: [&str; 4] = ["Instagram", "Facebook", "X", "LinkedIn"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReplyResult {
    pub reply: String,
    pub sentiment: Sentiment,
}

pub(crate) fn review_reply() -> TaskDefinition {
    TaskDefinition::new(
        "review-reply",
        "Draft a public reply to a customer review",
        vec![
            InputField::required("reviewText", InputKind::Text),
            InputField::required("rating", InputKind::Number),
            InputField::required("brandName", InputKind::Text),
            InputField::optional("tone", InputKind::Enum(to_strings(&REPLY_TONES))),
        ],
        r#"A customer left this {{ rating }}-star review for {{ brandName }}:

"{{ reviewText }}"

Write a short public reply from {{ brandName }}.
{% if tone %}
Tone of voice: {{ tone }}.
{% endif %}
Thank the customer, address any concrete complaint without admitting legal fault, and
invite them to contact support when something went wrong. Classify the review
sentiment as Positive, Neutral or Negative."#,
        Shape::object(vec![
            FieldShape::required("reply", Shape::Text),
            FieldShape::required(
                "sentiment",
                Shape::one_of(["Positive", "Neutral", "Negative"]),
            ),
        ]),
    )
    .with_system_instruction(MARKETPLACE_CONSULTANT)
}

pub(crate) fn customer_query_reply() -> TaskDefinition {
    TaskDefinition::new(
        "customer-query-reply",
        "Answer a buyer's pre- or post-sale question",
        vec![
            InputField::required("question", InputKind::Text),
            InputField::required("productName", InputKind::Text),
            InputField::optional("policyNotes", InputKind::Text),
            InputField::optional("includeUpsell", InputKind::Boolean),
        ],
        r#"A buyer asked about "{{ productName }}":

"{{ question }}"
{% if policyNotes %}

Store policies to respect:
{{ policyNotes }}
{% endif %}

Write a helpful, accurate reply. Never promise anything the policies do not allow.
{% if includeUpsell %}
Where it fits naturally, mention one related product or bundle.
{% endif %}
Set needsEscalation to true when a human should take over (refunds, damage claims,
legal or safety concerns)."#,
        Shape::object(vec![
            FieldShape::required("reply", Shape::Text),
            FieldShape::required("needsEscalation", Shape::Boolean),
        ]),
    )
    .with_system_instruction(MARKETPLACE_CONSULTANT)
}

pub(crate) fn ad_copy() -> TaskDefinition {
    TaskDefinition::new(
        "ad-copy",
        "Write sponsored-ad headlines and descriptions",
        vec![
            InputField::required("productName", InputKind::Text),
            marketplace_field(),
            InputField::required("audience", InputKind::Text),
            InputField::optional("usp", InputKind::TextList),
        ],
        r#"Write sponsored ad copy for "{{ productName }}" on {{ marketplace }}.

Audience: {{ audience }}
{% if usp %}
Unique selling points:
{{ usp | bullets }}
{% endif %}

Give five headlines under 60 characters, three descriptions under 150 characters and
one call to action."#,
        Shape::object(vec![
            FieldShape::required("headlines", Shape::non_empty_array_of(Shape::Text)),
            FieldShape::required("descriptions", Shape::non_empty_array_of(Shape::Text)),
            FieldShape::required("callToAction", Shape::Text),
        ]),
    )
    .with_system_instruction(MARKETPLACE_CONSULTANT)
}

pub(crate) fn social_caption() -> TaskDefinition {
    TaskDefinition::new(
        "social-caption",
        "Write a social media caption with hashtags",
        vec![
            InputField::required("productName", InputKind::Text),
            InputField::required("platform", InputKind::Enum(to_strings(&SOCIAL_PLATFORMS))),
            InputField::optional("occasion", InputKind::Text),
        ],
        r#"Write a {{ platform }} post caption promoting "{{ productName }}"{% if occasion %} for {{ occasion }}{% endif %}.

Match {{ platform }}'s length and tone conventions and add 5 to 10 relevant hashtags
(without the caption repeating them)."#,
        Shape::object(vec![
            FieldShape::required("caption", Shape::Text),
            FieldShape::required("hashtags", Shape::text_list()),
        ]),
    )
    .with_system_instruction(MARKETPLACE_CONSULTANT)
}
