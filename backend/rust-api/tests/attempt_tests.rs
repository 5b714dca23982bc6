use axum::http::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{option_id, SeededQuiz, TestApp};

async fn submit(app: &TestApp, token: &str, quiz_id: &str, body: Value) -> (StatusCode, Value) {
    app.request(
        "POST",
        &format!("/api/v1/attempts/{}", quiz_id),
        Some(token),
        Some(body),
    )
    .await
}

async fn setup() -> (TestApp, String, SeededQuiz) {
    let app = common::create_test_app();
    let (admin, _) = app.create_admin("admin@quiz.io").await;
    let seeded = common::seed_capitals_quiz(&app, &admin).await;
    (app, admin, seeded)
}

#[tokio::test]
async fn test_all_correct_submission() {
    let (app, _, seeded) = setup().await;
    let (user, _) = app.register_user("user@quiz.io").await;

    let (status, body) = submit(&app, &user, &seeded.quiz_id, seeded.all_correct()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "score": 3, "total": 3 }));
}

#[tokio::test]
async fn test_partial_credit_is_all_or_nothing_per_question() {
    let (app, _, seeded) = setup().await;
    let (user, _) = app.register_user("user@quiz.io").await;

    let answers = json!({
        "answers": [
            {
                "question_id": seeded.single["id"],
                "selected_option_ids": [option_id(&seeded.single, "Lyon")],
            },
            {
                // subset of the correct set
                "question_id": seeded.multiple["id"],
                "selected_option_ids": [option_id(&seeded.multiple, "Berlin")],
            },
            {
                "question_id": seeded.text["id"],
                "answer_text": "  ROME ",
            },
        ]
    });

    let (status, body) = submit(&app, &user, &seeded.quiz_id, answers).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["score"], 0);
}

#[tokio::test]
async fn test_answer_count_must_match_question_count() {
    let (app, _, seeded) = setup().await;
    let (user, _) = app.register_user("user@quiz.io").await;

    let mut answers = seeded.all_correct();
    answers["answers"].as_array_mut().unwrap().pop();

    let (status, body) = submit(&app, &user, &seeded.quiz_id, answers).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ANSWER");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Must answer all questions"));

    // rejected before any write
    let (_, attempts) = app
        .request("GET", "/api/v1/attempts/my", Some(&user), None)
        .await;
    assert!(attempts.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_single_choice_with_two_selections_is_rejected() {
    let (app, _, seeded) = setup().await;
    let (user, _) = app.register_user("user@quiz.io").await;

    let mut answers = seeded.all_correct();
    answers["answers"][0]["selected_option_ids"] = json!([
        option_id(&seeded.single, "Paris"),
        option_id(&seeded.single, "Lyon"),
    ]);

    let (status, body) = submit(&app, &user, &seeded.quiz_id, answers).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ANSWER");
}

#[tokio::test]
async fn test_duplicate_option_ids_are_collapsed() {
    let (app, _, seeded) = setup().await;
    let (user, _) = app.register_user("user@quiz.io").await;

    let paris = option_id(&seeded.single, "Paris");
    let mut answers = seeded.all_correct();
    answers["answers"][0]["selected_option_ids"] = json!([paris, paris]);

    let (status, body) = submit(&app, &user, &seeded.quiz_id, answers).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 3);
}

#[tokio::test]
async fn test_text_answer_over_300_chars_leaves_pending_attempt() {
    let (app, _, seeded) = setup().await;
    let (user, _) = app.register_user("user@quiz.io").await;

    let mut answers = seeded.all_correct();
    answers["answers"][2]["answer_text"] = json!("x".repeat(301));

    let (status, body) = submit(&app, &user, &seeded.quiz_id, answers).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ANSWER");

    let (_, attempts) = app
        .request("GET", "/api/v1/attempts/my", Some(&user), None)
        .await;
    let attempts = attempts.as_array().unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0]["status"], "pending");
    assert_eq!(attempts[0]["score"], 0);
    assert_eq!(attempts[0]["answers"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_question_id_is_rejected() {
    let (app, _, seeded) = setup().await;
    let (user, _) = app.register_user("user@quiz.io").await;

    let mut answers = seeded.all_correct();
    answers["answers"][1]["question_id"] = json!("no-such-question");

    let (status, body) = submit(&app, &user, &seeded.quiz_id, answers).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Invalid question id: no-such-question"));
}

#[tokio::test]
async fn test_unknown_or_deleted_quiz() {
    let (app, admin, seeded) = setup().await;
    let (user, _) = app.register_user("user@quiz.io").await;

    let (status, body) = submit(&app, &user, "missing", json!({ "answers": [] })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "QUIZ_NOT_FOUND");

    app.request(
        "DELETE",
        &format!("/api/v1/admin/quizzes/{}", seeded.quiz_id),
        Some(&admin),
        None,
    )
    .await;

    let (status, _) = submit(&app, &user, &seeded.quiz_id, seeded.all_correct()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_question_no_longer_counts() {
    let (app, admin, seeded) = setup().await;
    let (user, _) = app.register_user("user@quiz.io").await;

    app.request(
        "DELETE",
        &format!("/api/v1/admin/questions/{}", seeded.text["id"].as_str().unwrap()),
        Some(&admin),
        None,
    )
    .await;

    let mut answers = seeded.all_correct();
    answers["answers"].as_array_mut().unwrap().pop();

    let (status, body) = submit(&app, &user, &seeded.quiz_id, answers).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "score": 2, "total": 2 }));
}

#[tokio::test]
async fn test_repeated_submissions_create_independent_attempts() {
    let (app, _, seeded) = setup().await;
    let (user, _) = app.register_user("user@quiz.io").await;

    let (_, first) = submit(&app, &user, &seeded.quiz_id, seeded.all_correct()).await;
    let (_, second) = submit(&app, &user, &seeded.quiz_id, seeded.all_correct()).await;
    assert_eq!(first, second);

    let (_, attempts) = app
        .request("GET", "/api/v1/attempts/my", Some(&user), None)
        .await;
    let attempts = attempts.as_array().unwrap();
    assert_eq!(attempts.len(), 2);
    assert_ne!(attempts[0]["id"], attempts[1]["id"]);
    assert!(attempts.iter().all(|a| a["status"] == "completed"));
}

#[tokio::test]
async fn test_attempt_details_access() {
    let (app, admin, seeded) = setup().await;
    let (owner, owner_id) = app.register_user("owner@quiz.io").await;
    let (stranger, _) = app.register_user("stranger@quiz.io").await;

    submit(&app, &owner, &seeded.quiz_id, seeded.all_correct()).await;
    let (_, attempts) = app
        .request("GET", "/api/v1/attempts/my", Some(&owner), None)
        .await;
    let attempt_id = attempts[0]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/attempts/{}", attempt_id);

    let (status, body) = app.request("GET", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], owner_id.as_str());
    assert_eq!(body["score"], 3);
    let answers = body["answers"].as_array().unwrap();
    assert_eq!(answers.len(), 3);
    assert!(answers.iter().all(|a| a["is_correct"] == true));
    // multi-select stored as a comma-joined string
    assert!(answers[1]["selected_option_ids"]
        .as_str()
        .unwrap()
        .contains(','));

    let (status, _) = app.request("GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.request("GET", &uri, Some(&stranger), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "ACCESS_DENIED");

    let (status, body) = app
        .request("GET", "/api/v1/attempts/unknown", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "ATTEMPT_NOT_FOUND");
}

#[tokio::test]
async fn test_all_attempts_is_admin_only() {
    let (app, admin, seeded) = setup().await;
    let (alice, _) = app.register_user("alice@quiz.io").await;
    let (bob, _) = app.register_user("bob@quiz.io").await;

    submit(&app, &alice, &seeded.quiz_id, seeded.all_correct()).await;
    submit(&app, &bob, &seeded.quiz_id, seeded.all_correct()).await;

    let (status, body) = app
        .request("GET", "/api/v1/attempts", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = app
        .request("GET", "/api/v1/attempts", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, mine) = app
        .request("GET", "/api/v1/attempts/my", Some(&bob), None)
        .await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_submission_metrics_are_exported() {
    let (app, _, seeded) = setup().await;
    let (user, _) = app.register_user("user@quiz.io").await;
    submit(&app, &user, &seeded.quiz_id, seeded.all_correct()).await;

    let (status, body) = app.request("GET", "/metrics", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().unwrap();
    assert!(text.contains("quiz_attempts_submitted_total"));
    assert!(text.contains("quiz_answers_graded_total"));
    assert!(text.contains(r#"path="/api/v1/attempts/{id}""#));
    assert!(!text.contains(&seeded.quiz_id));
}
