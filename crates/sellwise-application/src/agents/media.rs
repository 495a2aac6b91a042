//! Two-stage media agents.
//!
//! Stage A asks the text model for a refined scene prompt; stage B feeds that
//! prompt (and the reference photo, when given) to the image or video model.

use sellwise_core::media::DataUri;
use sellwise_core::shape::{FieldShape, Shape};
use sellwise_core::task::{InputField, InputKind};
use serde::{Deserialize, Serialize};

use super::{MARKETPLACE_CONSULTANT, to_strings};
use crate::adapter::{MediaStage, TaskDefinition, TaskResult};

pub const REFINED_PROMPT_FIELD: &str = "refinedPrompt";
pub const IMAGE_STYLES: [&str; 4] = ["Studio", "Lifestyle", "Flat Lay", "Festive"];

/// Result of a media task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMedia {
    pub refined_prompt: String,
    pub media: DataUri,
}

impl GeneratedMedia {
    /// `None` when `result` carries no media.
    pub fn from_result(result: &TaskResult) -> Option<Self> {
        let refined_prompt = result.data.get(REFINED_PROMPT_FIELD)?.as_str()?.to_string();
        Some(Self {
            refined_prompt,
            media: result.media.clone()?,
        })
    }
}

fn refined_prompt_shape() -> Shape {
    Shape::object(vec![
        FieldShape::required(REFINED_PROMPT_FIELD, Shape::Text),
        FieldShape::optional("notes", Shape::Text),
    ])
}

pub(crate) fn product_image() -> TaskDefinition {
    TaskDefinition::new(
        "product-image",
        "Generate a marketplace-ready product photo",
        vec![
            InputField::required("productName", InputKind::Text),
            InputField::required("sceneDescription", InputKind::Text),
            InputField::optional("style", InputKind::Enum(to_strings(&IMAGE_STYLES))),
        ],
        r#"Write an image-generation prompt for a product photo of "{{ productName }}".

Scene: {{ sceneDescription }}
{% if style %}
Photography style: {{ style }}
{% endif %}

Describe lighting, camera angle, background and props in one paragraph. Keep the
product itself exactly as it appears in any reference photo. Return the paragraph
as refinedPrompt."#,
        refined_prompt_shape(),
    )
    .with_system_instruction(MARKETPLACE_CONSULTANT)
    .with_media(MediaStage::Image {
        prompt_field: REFINED_PROMPT_FIELD,
    })
}

pub(crate) fn product_video() -> TaskDefinition {
    TaskDefinition::new(
        "product-video",
        "Generate a short product showcase video",
        vec![
            InputField::required("productName", InputKind::Text),
            InputField::required("sceneDescription", InputKind::Text),
            InputField::optional("durationSeconds", InputKind::Number),
        ],
        r#"Write a video-generation prompt for a short showcase clip of "{{ productName }}".

Scene: {{ sceneDescription }}
{% if durationSeconds is defined %}
Target length: {{ durationSeconds }} seconds
{% endif %}

Describe the camera movement, lighting, setting and pacing shot by shot in one
paragraph. Return the paragraph as refinedPrompt."#,
        refined_prompt_shape(),
    )
    .with_system_instruction(MARKETPLACE_CONSULTANT)
    .with_media(MediaStage::Video {
        prompt_field: REFINED_PROMPT_FIELD,
    })
}
