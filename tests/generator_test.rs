//! 生成オーケストレーターの統合テスト
//!
//! スクリプト化したクライアントでリトライ回数と分岐を検証する
//! （待ち時間は RetryPolicy::immediate で0にする）

mod support;

use inked::error::InkedError;
use inked::generator::{AttemptError, Endpoint, Generator, RetryPolicy};
use inked_common::{get_template, Action, FormState, GenerationOutput, Session, Tier};
use serde_json::json;
use support::{image_response, server_error, text_response, ScriptedClient};

fn generator(responses: Vec<Result<serde_json::Value, AttemptError>>) -> Generator<ScriptedClient> {
    Generator::new(ScriptedClient::new(responses), RetryPolicy::immediate(5))
}

fn set(session: &mut Session, field: &str, value: &str) {
    session
        .apply(Action::SetField {
            field: field.to_string(),
            value: value.to_string(),
        })
        .unwrap();
}

fn letter_session() -> Session {
    let mut session = Session::new();
    session.apply(Action::SelectTemplate("letter".to_string())).unwrap();
    set(&mut session, "letterType", "Apology");
    set(&mut session, "recipient", "Jordan");
    set(&mut session, "coreMessage", "I missed the wedding");
    set(&mut session, "tone", "Deeply regretful");
    session
}

// =============================================
// 正常系
// =============================================

#[tokio::test]
async fn test_letter_scenario_displays_text() {
    let generator = generator(vec![text_response("Dear Jordan,...")]);
    let mut session = letter_session();

    let output = generator.generate_in(&mut session, Tier::Pro).await.unwrap();
    assert_eq!(output, GenerationOutput::Text { text: "Dear Jordan,...".to_string() });
    assert_eq!(session.result().output, Some(output));
    assert!(!session.is_pending());

    let calls = generator.client().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Endpoint::Text);
    let request = calls[0].1["contents"][0]["parts"][0]["text"].as_str().unwrap();
    for value in ["Apology", "Jordan", "I missed the wedding", "Deeply regretful"] {
        assert!(request.contains(value), "missing {}", value);
    }
}

#[tokio::test]
async fn test_image_template_routes_to_image_endpoint() {
    let generator = generator(vec![image_response("iVBORw0KGgo=")]);
    let mut session = Session::new();
    session.apply(Action::SelectTemplate("image".to_string())).unwrap();
    set(&mut session, "subject", "A paper boat in a storm");

    let output = generator.generate_in(&mut session, Tier::Executive).await.unwrap();
    assert_eq!(output.data_uri().as_deref(), Some("data:image/png;base64,iVBORw0KGgo="));

    let calls = generator.client().calls();
    assert_eq!(calls[0].0, Endpoint::Image);
    assert_eq!(calls[0].1["parameters"]["sampleCount"], 1);
    assert!(calls[0].1["instances"][0]["prompt"]
        .as_str()
        .unwrap()
        .starts_with("A paper boat in a storm"));
}

// =============================================
// 通信前のチェック
// =============================================

#[tokio::test]
async fn test_free_tier_never_calls_endpoint() {
    let generator = generator(vec![text_response("unused")]);
    let mut session = letter_session();

    let err = generator.generate_in(&mut session, Tier::Free).await.unwrap_err();
    assert!(matches!(err, InkedError::Common(inked_common::Error::NotEntitled)));
    assert!(err.to_string().contains("Upgrade"));
    assert!(err.needs_user_action());
    assert_eq!(generator.client().call_count(), 0);
    assert!(!session.is_pending());
    assert_eq!(session.result().output, None);
}

#[tokio::test]
async fn test_blank_required_field_never_calls_endpoint() {
    let generator = generator(vec![]);
    for template in inked_common::TEMPLATES {
        let mut form = FormState::defaults_for(template);
        for spec in template.fields {
            form.set(spec.name, "filled");
        }
        for spec in template.fields.iter().filter(|f| f.required) {
            let mut blanked = form.clone();
            blanked.set(spec.name, "   ");
            match generator.generate(template, &blanked, Tier::Executive).await {
                Err(InkedError::Common(inked_common::Error::Validation(labels))) => {
                    assert_eq!(labels, vec![spec.label.to_string()]);
                }
                other => panic!("{}.{}: {:?}", template.id, spec.name, other),
            }
        }
    }
    assert_eq!(generator.client().call_count(), 0);
}

// =============================================
// リトライ
// =============================================

#[tokio::test]
async fn test_succeeds_on_fifth_attempt() {
    let generator = generator(vec![
        server_error(),
        server_error(),
        Err(AttemptError::Transport("connection reset".to_string())),
        Err(AttemptError::Malformed("expected value".to_string())),
        text_response("Finally."),
    ]);
    let template = get_template("letter").unwrap();
    let mut session = letter_session();
    let form = session.active_form().unwrap().clone();

    let output = generator.generate(template, &form, Tier::Pro).await.unwrap();
    assert_eq!(output.text(), Some("Finally."));
    assert_eq!(generator.client().call_count(), 5);
}

#[tokio::test]
async fn test_exhausted_retries_keep_previous_output() {
    let generator = generator(vec![
        text_response("First draft"),
        server_error(),
        server_error(),
        server_error(),
        server_error(),
        server_error(),
    ]);
    let mut session = letter_session();
    generator.generate_in(&mut session, Tier::Pro).await.unwrap();

    let err = generator.generate_in(&mut session, Tier::Pro).await.unwrap_err();
    match &err {
        InkedError::GenerationFailed { attempts, message } => {
            assert_eq!(*attempts, 5);
            assert!(message.contains("503"));
        }
        other => panic!("unexpected: {:?}", other),
    }
    assert!(!err.needs_user_action());
    assert_eq!(generator.client().call_count(), 6);
    assert_eq!(
        session.result().output,
        Some(GenerationOutput::Text { text: "First draft".to_string() })
    );
    assert!(session.result().is_failed());
    assert!(!session.is_pending());
}

#[tokio::test]
async fn test_wrongly_shaped_response_is_retried() {
    let generator = generator(vec![Ok(json!({"candidates": "oops"})), text_response("ok")]);
    let mut session = letter_session();

    let output = generator.generate_in(&mut session, Tier::Pro).await.unwrap();
    assert_eq!(output.text(), Some("ok"));
    assert_eq!(generator.client().call_count(), 2);
}

#[tokio::test]
async fn test_invalid_image_base64_is_retried() {
    let generator = generator(vec![image_response("***"), image_response("iVBORw0KGgo=")]);
    let template = get_template("image").unwrap();
    let mut form = FormState::defaults_for(template);
    form.set("subject", "A lighthouse");

    let output = generator.generate(template, &form, Tier::Pro).await.unwrap();
    assert!(output.is_image());
    assert_eq!(generator.client().call_count(), 2);
}

#[tokio::test]
async fn test_empty_candidates_is_not_retried() {
    let generator = generator(vec![Ok(json!({"candidates": []})), text_response("never")]);
    let mut session = letter_session();

    let err = generator.generate_in(&mut session, Tier::Pro).await.unwrap_err();
    assert!(matches!(err, InkedError::Common(inked_common::Error::EmptyResponse)));
    assert_eq!(generator.client().call_count(), 1);
    assert!(session.result().is_failed());
}

#[tokio::test]
async fn test_custom_attempt_limit() {
    let generator = Generator::new(
        ScriptedClient::new(vec![server_error(), server_error(), text_response("late")]),
        RetryPolicy::immediate(2),
    );
    let mut session = letter_session();

    let err = generator.generate_in(&mut session, Tier::Pro).await.unwrap_err();
    assert!(matches!(err, InkedError::GenerationFailed { attempts: 2, .. }));
    assert_eq!(generator.client().call_count(), 2);
}

// =============================================
// セッション
// =============================================

#[tokio::test]
async fn test_result_discarded_after_switching_template() {
    let generator = generator(vec![text_response("Dear Jordan,...")]);
    let mut session = letter_session();

    let ticket = session.begin_generation().unwrap();
    session.apply(Action::SelectTemplate("story".to_string())).unwrap();
    let template = get_template("letter").unwrap();
    let form = session.form_for("letter").unwrap().clone();
    let outcome = generator.generate(template, &form, Tier::Pro).await;

    let applied = session.finish_generation(ticket, outcome.map_err(|e| e.to_string()));
    assert!(!applied);
    assert_eq!(session.result().output, None);
    assert!(!session.is_pending());
}
