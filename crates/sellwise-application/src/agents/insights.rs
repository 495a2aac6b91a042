//! Business insight agents: performance narratives, competition, pricing,
//! inventory and growth planning.

use sellwise_core::shape::{FieldShape, Shape};
use sellwise_core::task::{InputField, InputKind};
use serde::{Deserialize, Serialize};

use super::{MARKETPLACE_CONSULTANT, level_shape, marketplace_field};
use crate::adapter::TaskDefinition;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceNarrativeResult {
    pub headline: String,
    pub narrative: String,
    pub highlights: Vec<String>,
    pub risks: Vec<String>,
}

pub(crate) fn performance_narrative() -> TaskDefinition {
    TaskDefinition::new(
        "performance-narrative",
        "Turn sales metrics into a short performance story",
        vec![
            InputField::required("periodLabel", InputKind::Text),
            InputField::required(
                "metrics",
                InputKind::Object(vec![
                    InputField::required("revenue", InputKind::Number),
                    InputField::required("orders", InputKind::Number),
                    InputField::required("adSpend", InputKind::Number),
                    InputField::optional("returnRate", InputKind::Number),
                ]),
            ),
            InputField::optional("currency", InputKind::Text),
            InputField::optional("previousPeriod", InputKind::Text),
        ],
        r#"Summarize seller performance for {{ periodLabel }}.

Revenue: {{ metrics.revenue }}{% if currency %} {{ currency }}{% endif %}

Orders: {{ metrics.orders }}
Ad spend: {{ metrics.adSpend }}{% if currency %} {{ currency }}{% endif %}

{% if metrics.returnRate is defined %}
Return rate: {{ metrics.returnRate }}%
{% endif %}
{% if previousPeriod %}
Previous period for comparison: {{ previousPeriod }}
{% endif %}

Write a one-line headline, a narrative of three or four sentences a busy seller can
read in thirty seconds, the main highlights, and the risks to watch. Derive ratios
such as average order value and advertising cost of sale where they help."#,
        Shape::object(vec![
            FieldShape::required("headline", Shape::Text),
            FieldShape::required("narrative", Shape::Text),
            FieldShape::required("highlights", Shape::text_list()),
            FieldShape::required("risks", Shape::text_list()),
        ]),
    )
    .with_system_instruction(MARKETPLACE_CONSULTANT)
}

pub(crate) fn competitor_analysis() -> TaskDefinition {
    TaskDefinition::new(
        "competitor-analysis",
        "Compare a product against named competitors",
        vec![
            InputField::required("productName", InputKind::Text),
            InputField::required("competitors", InputKind::TextList),
            marketplace_field(),
        ],
        r#"Compare "{{ productName }}" with these competitors on {{ marketplace }}:
{{ competitors | bullets }}

List our strengths, weaknesses and opportunities against them and place our price
position as Premium, Competitive or Budget."#,
        Shape::object(vec![
            FieldShape::required("strengths", Shape::text_list()),
            FieldShape::required("weaknesses", Shape::text_list()),
            FieldShape::required("opportunities", Shape::text_list()),
            FieldShape::required(
                "pricePosition",
                Shape::one_of(["Premium", "Competitive", "Budget"]),
            ),
        ]),
    )
    .with_system_instruction(MARKETPLACE_CONSULTANT)
}

pub(crate) fn pricing_advisor() -> TaskDefinition {
    TaskDefinition::new(
        "pricing-advisor",
        "Recommend a selling price and pricing strategy",
        vec![
            InputField::required("productName", InputKind::Text),
            InputField::required("cost", InputKind::Number),
            InputField::required("currentPrice", InputKind::Number),
            InputField::optional("competitorPrices", InputKind::TextList),
        ],
        r#"Recommend a price for "{{ productName }}".

Unit cost including fees: {{ cost }}
Current price: {{ currentPrice }}
{% if competitorPrices %}
Competitor prices:
{{ competitorPrices | bullets }}
{% endif %}

Protect a healthy margin over cost. Pick one strategy: Penetration, Competitive,
Premium or Bundle, and explain the rationale in two or three sentences."#,
        Shape::object(vec![
            FieldShape::required("recommendedPrice", Shape::non_negative()),
            FieldShape::required(
                "strategy",
                Shape::one_of(["Penetration", "Competitive", "Premium", "Bundle"]),
            ),
            FieldShape::required("rationale", Shape::Text),
        ]),
    )
    .with_system_instruction(MARKETPLACE_CONSULTANT)
}

pub(crate) fn inventory_forecast() -> TaskDefinition {
    TaskDefinition::new(
        "inventory-forecast",
        "Forecast reorder quantity and stockout risk",
        vec![
            InputField::required("productName", InputKind::Text),
            InputField::required("averageDailySales", InputKind::Number),
            InputField::required("leadTimeDays", InputKind::Number),
            InputField::required("currentStock", InputKind::Number),
            InputField::optional("salesHistory", InputKind::TextList),
        ],
        r#"Plan inventory for "{{ productName }}".

Average daily sales: {{ averageDailySales }} units
Supplier lead time: {{ leadTimeDays }} days
Current stock: {{ currentStock }} units
{% if salesHistory %}
Recent sales history:
{{ salesHistory | bullets }}
{% endif %}

Recommend a whole-number reorder quantity that covers lead time plus safety stock,
rate the stockout risk as High, Medium or Low, give your confidence from 0 to 100,
and add short notes on seasonality or trends you see."#,
        Shape::object(vec![
            FieldShape::required(
                "reorderQuantity",
                Shape::Integer {
                    min: Some(0),
                    max: None,
                },
            ),
            FieldShape::required("stockoutRisk", level_shape()),
            FieldShape::required("confidence", Shape::score()),
            FieldShape::optional("notes", Shape::Text),
        ]),
    )
    .with_system_instruction(MARKETPLACE_CONSULTANT)
}

pub(crate) fn growth_plan() -> TaskDefinition {
    TaskDefinition::new(
        "growth-plan",
        "Prioritized growth actions for a seller's business",
        vec![
            InputField::required("businessSummary", InputKind::Text),
            InputField::required("goals", InputKind::TextList),
            InputField::optional("monthlyBudget", InputKind::Number),
        ],
        r#"Build a 90-day growth plan for this seller.

Business: {{ businessSummary }}

Goals:
{{ goals | bullets }}
{% if monthlyBudget is defined %}

Monthly budget: {{ monthlyBudget }}
{% endif %}

List five to eight concrete actions. Give each a short title, a priority of High,
Medium or Low, and the impact you expect."#,
        Shape::object(vec![FieldShape::required(
            "actions",
            Shape::non_empty_array_of(Shape::object(vec![
                FieldShape::required("title", Shape::Text),
                FieldShape::required("priority", level_shape()),
                FieldShape::required("expectedImpact", Shape::Text),
            ])),
        )]),
    )
    .with_system_instruction(MARKETPLACE_CONSULTANT)
}
