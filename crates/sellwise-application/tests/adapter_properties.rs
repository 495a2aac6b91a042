mod common;

use common::{MockModel, RecordingObserver, RecordingSleeper, key, mp4, png};
use sellwise_application::agents::listing::{KEYWORD_DIFFICULTIES, KeywordFinderResult};
use sellwise_application::{
    AdapterState, PollPolicy, StaticCredential, TaskAdapter, TaskKind,
};
use sellwise_core::error::{FailureKind, TaskError};
use sellwise_core::model::{Credential, ModelError, OperationStatus};
use sellwise_core::task::TaskInput;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn kurta_input() -> TaskInput {
    TaskInput::new()
        .with("productName", "Premium Silk Kurta")
        .with("category", "Fashion")
        .with("marketplace", "Amazon")
}

fn keyword_reply() -> serde_json::Value {
    json!({ "keywords": [{ "term": "silk kurta", "volume": "10K", "difficulty": "Medium" }] })
}

fn adapter(kind: TaskKind, model: &Arc<MockModel>) -> TaskAdapter {
    TaskAdapter::new(kind.definition(), model.clone())
}

fn video_adapter(model: &Arc<MockModel>, sleeper: &Arc<RecordingSleeper>) -> TaskAdapter {
    adapter(TaskKind::ProductVideo, model)
        .with_sleeper(sleeper.clone())
        .with_poll_policy(PollPolicy::new(Duration::from_secs(10), 5))
}

fn video_input() -> TaskInput {
    TaskInput::new()
        .with("productName", "Premium Silk Kurta")
        .with("sceneDescription", "Model walking through a Jaipur haveli at dusk")
}

fn video_stage_reply() -> serde_json::Value {
    json!({ "refinedPrompt": "Slow dolly shot following a model in a silk kurta" })
}

// ============================================================================
// Preconditions never reach the network
// ============================================================================

#[tokio::test]
async fn test_missing_required_field_is_precondition_without_network_call() {
    for missing in ["productName", "category", "marketplace"] {
        let model = Arc::new(MockModel::replying(keyword_reply()));
        let mut values = kurta_input().as_map().clone();
        values.remove(missing);

        let err = adapter(TaskKind::KeywordFinder, &model)
            .run(&TaskInput::from(values), key())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Precondition, "missing {missing}");
        assert!(err.to_string().contains(missing));
        assert_eq!(model.total_calls(), 0);
    }
}

#[tokio::test]
async fn test_blank_required_text_is_precondition() {
    let model = Arc::new(MockModel::replying(keyword_reply()));
    let input = kurta_input().with("productName", "   ");

    let err = adapter(TaskKind::KeywordFinder, &model)
        .run(&input, key())
        .await
        .unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(model.total_calls(), 0);
}

#[tokio::test]
async fn test_missing_or_blank_credential_is_precondition() {
    let model = Arc::new(MockModel::replying(keyword_reply()));
    let adapter = adapter(TaskKind::KeywordFinder, &model);

    let err = adapter.run(&kurta_input(), None).await.unwrap_err();
    assert!(err.is_precondition());
    assert!(err.to_string().contains("API key"));

    let err = adapter
        .run(&kurta_input(), Some(Credential::new(" ")))
        .await
        .unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(model.total_calls(), 0);
}

#[tokio::test]
async fn test_resolver_supplies_credential_and_explicit_key_wins() {
    let model = Arc::new(MockModel::replying(keyword_reply()));
    let adapter = adapter(TaskKind::KeywordFinder, &model)
        .with_resolver(Arc::new(StaticCredential::new(Credential::new("from-config"))));

    adapter.run(&kurta_input(), None).await.unwrap();
    adapter
        .run(&kurta_input(), Some(Credential::new("explicit")))
        .await
        .unwrap();

    assert_eq!(
        *model.credentials_seen.lock().unwrap(),
        vec!["from-config".to_string(), "explicit".to_string()]
    );
}

#[tokio::test]
async fn test_unsupported_media_capability_is_precondition() {
    let model = Arc::new(MockModel::replying(video_stage_reply()).text_only());
    let sleeper = Arc::new(RecordingSleeper::default());

    let err = video_adapter(&model, &sleeper)
        .run(&video_input(), key())
        .await
        .unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(model.total_calls(), 0);
}

// ============================================================================
// Output validation
// ============================================================================

#[tokio::test]
async fn test_out_of_range_score_is_shape_failure() {
    let model = Arc::new(MockModel::replying(json!({
        "title": "Premium Silk Kurta for Women",
        "bulletPoints": ["Pure silk"],
        "description": "Soft and breathable",
        "searchTerms": ["silk kurta"],
        "score": 140
    })));
    let input = kurta_input();

    let err = adapter(TaskKind::ListingOptimizer, &model)
        .run(&input, key())
        .await
        .unwrap_err();

    match err {
        TaskError::Shape { path, .. } => assert_eq!(path, "$.score"),
        other => panic!("expected shape failure, got {other:?}"),
    }
    assert_eq!(model.structured(), 1);
}

#[tokio::test]
async fn test_missing_output_field_is_shape_failure() {
    let model = Arc::new(MockModel::replying(json!({ "reply": "Thank you!" })));
    let input = TaskInput::new()
        .with("reviewText", "Lovely fabric")
        .with("rating", 5)
        .with("brandName", "Rangrez");

    let err = adapter(TaskKind::ReviewReply, &model)
        .run(&input, key())
        .await
        .unwrap_err();
    assert!(err.is_shape());
    assert!(err.to_string().contains("$.sentiment"));
}

#[tokio::test]
async fn test_non_json_reply_is_shape_failure() {
    let model = Arc::new(MockModel::replying_text("Here are some great keywords: silk kurta"));
    let err = adapter(TaskKind::KeywordFinder, &model)
        .run(&kurta_input(), key())
        .await
        .unwrap_err();
    assert!(err.is_shape());
}

#[tokio::test]
async fn test_conforming_reply_is_returned_deep_equal() {
    let reply = json!({
        "score": 74,
        "issues": [
            { "area": "title", "severity": "High", "recommendation": "Lead with the fabric" },
            { "area": "images", "severity": "Low", "recommendation": "Add a size chart" }
        ],
        "summary": "Solid listing with a weak title"
    });
    let model = Arc::new(MockModel::replying(reply.clone()));
    let input = TaskInput::new()
        .with("productName", "Premium Silk Kurta")
        .with("marketplace", "Myntra")
        .with("title", "Kurta")
        .with("description", "Silk kurta for festive wear");

    let result = adapter(TaskKind::ListingAudit, &model)
        .run(&input, key())
        .await
        .unwrap();

    assert_eq!(result.task, "listing-audit");
    assert_eq!(result.data, reply);
    assert_eq!(result.media, None);
}

#[tokio::test]
async fn test_fenced_reply_is_accepted() {
    let fenced = format!("```json\n{}\n```", keyword_reply());
    let model = Arc::new(MockModel::replying_text(&fenced));
    let result = adapter(TaskKind::KeywordFinder, &model)
        .run(&kurta_input(), key())
        .await
        .unwrap();
    assert_eq!(result.data, keyword_reply());
}

#[tokio::test]
async fn test_structured_request_carries_prompt_and_schema() {
    let model = Arc::new(MockModel::replying(keyword_reply()));
    adapter(TaskKind::KeywordFinder, &model)
        .run(&kurta_input(), key())
        .await
        .unwrap();

    let requests = model.structured_requests.lock().unwrap();
    let request = &requests[0];
    assert!(request.prompt.contains("Premium Silk Kurta"));
    assert!(request.system_instruction.is_some());
    assert_eq!(request.schema_name, "keyword_finder");
    assert_eq!(request.response_shape, TaskKind::KeywordFinder.definition().output);
    assert!(request.reference_image.is_none());
}

// ============================================================================
// Upstream and empty results
// ============================================================================

#[tokio::test]
async fn test_upstream_error_carries_status_and_message() {
    let model = Arc::new(MockModel::failing(ModelError::with_status(
        429,
        "Gemini API returned 429 Too Many Requests: RESOURCE_EXHAUSTED: Quota exceeded",
        true,
    )));

    let err = adapter(TaskKind::KeywordFinder, &model)
        .run(&kurta_input(), key())
        .await
        .unwrap_err();

    match err {
        TaskError::Upstream {
            message,
            status_code,
        } => {
            assert_eq!(status_code, Some(429));
            assert!(message.contains("RESOURCE_EXHAUSTED"));
        }
        other => panic!("expected upstream failure, got {other:?}"),
    }
    assert_eq!(model.structured(), 1);
}

#[tokio::test]
async fn test_reply_without_text_is_empty_result() {
    let model = Arc::new(MockModel::without_text());
    let err = adapter(TaskKind::KeywordFinder, &model)
        .run(&kurta_input(), key())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::EmptyResult);
}

#[tokio::test]
async fn test_image_task_without_image_is_empty_result() {
    let model = Arc::new(
        MockModel::replying(json!({ "refinedPrompt": "Kurta on a teak hanger, soft light" }))
            .with_image(None),
    );
    let input = TaskInput::new()
        .with("productName", "Premium Silk Kurta")
        .with("sceneDescription", "Hanging in a boutique");

    let err = adapter(TaskKind::ProductImage, &model)
        .run(&input, key())
        .await
        .unwrap_err();

    assert!(err.is_empty_result());
    assert_eq!(model.image_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_image_task_uses_refined_prompt_and_reference() {
    let model = Arc::new(MockModel::replying(json!({
        "refinedPrompt": "Kurta on a teak hanger, soft light"
    })));
    let reference = common::png();
    let input = TaskInput::new()
        .with("productName", "Premium Silk Kurta")
        .with("sceneDescription", "Hanging in a boutique")
        .with("style", "Studio");

    let result = adapter(TaskKind::ProductImage, &model)
        .run_with_reference(&input, Some(&reference), key())
        .await
        .unwrap();

    assert_eq!(result.media, Some(png()));
    let media_requests = model.media_requests.lock().unwrap();
    assert_eq!(media_requests[0].prompt, "Kurta on a teak hanger, soft light");
    assert_eq!(media_requests[0].reference_image, Some(reference.clone()));
    assert_eq!(
        model.structured_requests.lock().unwrap()[0].reference_image,
        Some(reference)
    );
}

// ============================================================================
// Idempotence
// ============================================================================

#[tokio::test]
async fn test_two_invocations_make_two_calls_and_equal_results() {
    let model = Arc::new(MockModel::replying(keyword_reply()));
    let adapter = adapter(TaskKind::KeywordFinder, &model);

    let first = adapter.run(&kurta_input(), key()).await.unwrap();
    let second = adapter.run(&kurta_input(), key()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(model.structured(), 2);
}

// ============================================================================
// Polling
// ============================================================================

#[tokio::test]
async fn test_polls_exactly_n_plus_one_times() {
    for pending in [0usize, 1, 3] {
        let mut script: Vec<Result<OperationStatus, ModelError>> =
            (0..pending).map(|_| Ok(OperationStatus::Pending)).collect();
        script.push(Ok(OperationStatus::Done(Some(mp4()))));

        let model = Arc::new(MockModel::replying(video_stage_reply()).with_polls(script));
        let sleeper = Arc::new(RecordingSleeper::default());

        let result = video_adapter(&model, &sleeper)
            .run(&video_input(), key())
            .await
            .unwrap();

        assert_eq!(result.media, Some(mp4()));
        assert_eq!(model.polls(), pending + 1);
        assert_eq!(sleeper.count(), pending + 1);
        assert!(
            sleeper
                .sleeps
                .lock()
                .unwrap()
                .iter()
                .all(|d| *d == Duration::from_secs(10))
        );
    }
}

#[tokio::test]
async fn test_operation_error_stops_polling() {
    let model = Arc::new(MockModel::replying(video_stage_reply()).with_polls(vec![
        Ok(OperationStatus::Pending),
        Ok(OperationStatus::Failed("prompt blocked by safety filters".to_string())),
        Ok(OperationStatus::Done(Some(mp4()))),
    ]));
    let sleeper = Arc::new(RecordingSleeper::default());

    let err = video_adapter(&model, &sleeper)
        .run(&video_input(), key())
        .await
        .unwrap_err();

    assert!(err.is_upstream());
    assert!(err.to_string().contains("safety filters"));
    assert_eq!(model.polls(), 2);
}

#[tokio::test]
async fn test_status_check_transport_error_stops_polling() {
    let model = Arc::new(MockModel::replying(video_stage_reply()).with_polls(vec![
        Err(ModelError::with_status(503, "Service Unavailable", true)),
        Ok(OperationStatus::Done(Some(mp4()))),
    ]));
    let sleeper = Arc::new(RecordingSleeper::default());

    let err = video_adapter(&model, &sleeper)
        .run(&video_input(), key())
        .await
        .unwrap_err();

    assert!(err.is_upstream());
    assert_eq!(model.polls(), 1);
}

#[tokio::test]
async fn test_polling_gives_up_after_max_polls() {
    let model = Arc::new(MockModel::replying(video_stage_reply()));
    let sleeper = Arc::new(RecordingSleeper::default());

    let err = video_adapter(&model, &sleeper)
        .run(&video_input(), key())
        .await
        .unwrap_err();

    assert!(err.is_upstream());
    assert!(err.to_string().contains("after 5 polls"));
    assert_eq!(model.polls(), 5);
}

#[tokio::test]
async fn test_finished_operation_without_video_is_empty_result() {
    let model = Arc::new(
        MockModel::replying(video_stage_reply())
            .with_polls(vec![Ok(OperationStatus::Done(None))]),
    );
    let sleeper = Arc::new(RecordingSleeper::default());

    let err = video_adapter(&model, &sleeper)
        .run(&video_input(), key())
        .await
        .unwrap_err();
    assert!(err.is_empty_result());
    assert_eq!(model.polls(), 1);
}

// ============================================================================
// State reporting
// ============================================================================

#[tokio::test]
async fn test_observer_sees_each_state_in_order() {
    let model = Arc::new(
        MockModel::replying(video_stage_reply()).with_polls(vec![
            Ok(OperationStatus::Pending),
            Ok(OperationStatus::Done(Some(mp4()))),
        ]),
    );
    let sleeper = Arc::new(RecordingSleeper::default());
    let observer = Arc::new(RecordingObserver::default());

    video_adapter(&model, &sleeper)
        .with_observer(observer.clone())
        .run(&video_input(), key())
        .await
        .unwrap();

    assert_eq!(
        *observer.states.lock().unwrap(),
        vec![
            AdapterState::Validating,
            AdapterState::Prompting,
            AdapterState::AwaitingModel,
            AdapterState::Polling,
            AdapterState::Validated,
        ]
    );
}

#[tokio::test]
async fn test_failed_is_terminal() {
    let model = Arc::new(MockModel::replying(keyword_reply()));
    let observer = Arc::new(RecordingObserver::default());

    adapter(TaskKind::KeywordFinder, &model)
        .with_observer(observer.clone())
        .run(&kurta_input(), None)
        .await
        .unwrap_err();

    let states = observer.states.lock().unwrap();
    assert_eq!(*states, vec![AdapterState::Validating, AdapterState::Failed]);
    assert!(states.last().unwrap().is_terminal());
}

// ============================================================================
// Keyword finder scenario
// ============================================================================

#[tokio::test]
async fn test_premium_silk_kurta_keywords() {
    let model = Arc::new(MockModel::replying(keyword_reply()));

    let result = adapter(TaskKind::KeywordFinder, &model)
        .run(&kurta_input(), key())
        .await
        .unwrap();

    let keywords = result.data["keywords"].as_array().unwrap();
    assert_eq!(keywords.len(), 1);
    let difficulty = keywords[0]["difficulty"].as_str().unwrap();
    assert!(KEYWORD_DIFFICULTIES.contains(&difficulty));

    let typed: KeywordFinderResult = result.parse().unwrap();
    assert_eq!(typed.keywords.len(), 1);
    assert_eq!(typed.keywords[0].term, "silk kurta");
    assert_eq!(typed.keywords[0].volume, "10K");
}
