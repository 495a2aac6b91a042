//! The task catalog.
//!
//! Each marketplace agent is a [`TaskDefinition`]: an input spec, a prompt
//! template, an output shape and, for media tasks, a second generation
//! stage. Definitions are built once and shared.

pub mod engagement;
pub mod insights;
pub mod listing;
pub mod media;

use once_cell::sync::Lazy;
use sellwise_core::shape::Shape;
use sellwise_core::task::{InputField, InputKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::adapter::TaskDefinition;

pub use engagement::ReviewReplyResult;
pub use insights::PerformanceNarrativeResult;
pub use listing::{KeywordFinderResult, ListingAuditResult, ListingOptimizerResult};
pub use media::GeneratedMedia;

/// Shared by every agent prompt.
pub(crate) const MARKETPLACE_CONSULTANT: &str = "You are a senior e-commerce consultant at a \
marketplace-management agency. You help sellers grow on Amazon, Flipkart, Meesho, Myntra, Etsy \
and Shopify. Answer with practical, specific advice and reply only with JSON that matches the \
requested schema.";

pub(crate) const MARKETPLACES: [&str; 6] =
    ["Amazon", "Flipkart", "Meesho", "Myntra", "Etsy", "Shopify"];

pub(crate) const LEVELS: [&str; 3] = ["High", "Medium", "Low"];

pub(crate) fn marketplace_field() -> InputField {
    InputField::required("marketplace", InputKind::Enum(to_strings(&MARKETPLACES)))
}

pub(crate) fn level_shape() -> Shape {
    Shape::one_of(LEVELS)
}

pub(crate) fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Every task the agency's agents can run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TaskKind {
    KeywordFinder,
    ListingOptimizer,
    ListingAudit,
    #[serde(rename = "a-plus-content")]
    #[strum(serialize = "a-plus-content")]
    APlusContent,
    ReviewReply,
    CustomerQueryReply,
    AdCopy,
    SocialCaption,
    PerformanceNarrative,
    CompetitorAnalysis,
    PricingAdvisor,
    InventoryForecast,
    GrowthPlan,
    ProductImage,
    ProductVideo,
}

static CATALOG: Lazy<HashMap<TaskKind, Arc<TaskDefinition>>> = Lazy::new(|| {
    TaskKind::iter()
        .map(|kind| (kind, Arc::new(build_definition(kind))))
        .collect()
});

impl TaskKind {
    /// Shared definition for this kind.
    pub fn definition(self) -> Arc<TaskDefinition> {
        match CATALOG.get(&self) {
            Some(definition) => Arc::clone(definition),
            None => Arc::new(build_definition(self)),
        }
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn all() -> impl Iterator<Item = TaskKind> {
        TaskKind::iter()
    }
}

fn build_definition(kind: TaskKind) -> TaskDefinition {
    match kind {
        TaskKind::KeywordFinder => listing::keyword_finder(),
        TaskKind::ListingOptimizer => listing::listing_optimizer(),
        TaskKind::ListingAudit => listing::listing_audit(),
        TaskKind::APlusContent => listing::a_plus_content(),
        TaskKind::ReviewReply => engagement::review_reply(),
        TaskKind::CustomerQueryReply => engagement::customer_query_reply(),
        TaskKind::AdCopy => engagement::ad_copy(),
        TaskKind::SocialCaption => engagement::social_caption(),
        TaskKind::PerformanceNarrative => insights::performance_narrative(),
        TaskKind::CompetitorAnalysis => insights::competitor_analysis(),
        TaskKind::PricingAdvisor => insights::pricing_advisor(),
        TaskKind::InventoryForecast => insights::inventory_forecast(),
        TaskKind::GrowthPlan => insights::growth_plan(),
        TaskKind::ProductImage => media::product_image(),
        TaskKind::ProductVideo => media::product_video(),
    }
}

/// High / Medium / Low, used for severities, priorities and risks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Level {
    High,
    Medium,
    Low,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_catalog_has_fifteen_tasks() {
        assert_eq!(TaskKind::all().count(), 15);
    }

    #[test]
    fn test_task_names_round_trip() {
        for kind in TaskKind::all() {
            let definition = kind.definition();
            assert_eq!(definition.name, kind.to_string());
            assert_eq!(TaskKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert_eq!(TaskKind::APlusContent.as_str(), "a-plus-content");
        assert_eq!(TaskKind::KeywordFinder.as_str(), "keyword-finder");
    }

    #[test]
    fn test_every_template_parses() {
        for kind in TaskKind::all() {
            let definition = kind.definition();
            definition
                .template
                .check()
                .unwrap_or_else(|err| panic!("{kind}: {err}"));
            assert!(!definition.description.is_empty());
            assert!(definition.system_instruction.is_some());
        }
    }

    #[test]
    fn test_only_media_tasks_have_a_media_stage() {
        for kind in TaskKind::all() {
            let has_media = kind.definition().media.is_some();
            let is_media_task = matches!(kind, TaskKind::ProductImage | TaskKind::ProductVideo);
            assert_eq!(has_media, is_media_task, "{kind}");
        }
    }

    #[test]
    fn test_definitions_are_shared() {
        let first = TaskKind::ReviewReply.definition();
        let second = TaskKind::ReviewReply.definition();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
