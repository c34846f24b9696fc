    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::brain::{Brain, DecisionError, FixedBrain, Pilot};
    use crate::config::Config;
    use crate::game::protocol::Action;

    fn create_test_state(brain: Arc<dyn Brain>) -> AppState {
        AppState::with_brain(Config::default(), brain)
    }

    fn create_test_router() -> Router {
        build_router(create_test_state(Arc::new(FixedBrain::spinner())))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    fn brain_body(game_id: &str) -> Value {
        json!({
            "game_id": game_id,
            "pos": [0.0, 0.0],
            "turret_rot": 0.0,
            "turret_vision": [null, null, null, null, null],
            "hull_vision": [null, null, null, null, null, null, null, null]
        })
    }

    #[tokio::test]
    async fn test_full_game_lifecycle() {
        let app = create_test_router();

        let (status, body) = post(&app, "/start_game", json!({"gameId": "g1"})).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());

        let (status, body) = post(
            &app,
            "/brain",
            json!({
                "gameId": "g1",
                "pos": {"x": 1.0, "y": 2.0},
                "rot": 0.0,
                "turretRot": 0.0,
                "turretVision": [{"wall": 0.5}],
                "hullVision": []
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"action": "spin_left"}));

        let (status, body) = post(&app, "/win", json!({"gameId": "g1"})).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());

        let (status, body) = post(&app, "/brain", brain_body("g1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_engine_payload_shape() {
        let app = create_test_router();

        // the engine also sends its own address on start
        let (status, _) = post(
            &app,
            "/start_game",
            json!({"game_id": "e1", "server": "127.0.0.1", "port": "8080"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = post(&app, "/brain", brain_body("e1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "spin_left");
    }

    #[tokio::test]
    async fn test_duplicate_start_conflicts() {
        let app = create_test_router();

        post(&app, "/start_game", json!({"game_id": "g1"})).await;
        let (status, body) = post(&app, "/start_game", json!({"game_id": "g1"})).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "conflict");
    }

    #[tokio::test]
    async fn test_restart_after_finish() {
        let app = create_test_router();

        post(&app, "/start_game", json!({"game_id": "g1"})).await;
        post(&app, "/loss", json!({"game_id": "g1"})).await;
        let (status, _) = post(&app, "/start_game", json!({"game_id": "g1"})).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_or_empty_game_id_is_invalid() {
        let app = create_test_router();

        for uri in ["/start_game", "/win", "/loss"] {
            for body in [json!({}), json!({"game_id": ""}), json!({"game_id": "  "})] {
                let (status, reply) = post(&app, uri, body).await;
                assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
                assert_eq!(reply["error"], "validation_error");
            }
        }

        let (status, reply) = post(&app, "/brain", brain_body("")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_brain_for_unknown_game() {
        let app = create_test_router();

        let (status, body) = post(&app, "/brain", brain_body("nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_second_finish_reports_not_found() {
        let app = create_test_router();
        post(&app, "/start_game", json!({"game_id": "g1"})).await;

        let (status, body) = post(&app, "/loss", json!({"game_id": "g1"})).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());

        for uri in ["/loss", "/win"] {
            let (status, body) = post(&app, uri, json!({"game_id": "g1"})).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert!(body["message"].is_string());
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_decode_error() {
        let app = create_test_router();

        let request = Request::builder()
            .method("POST")
            .uri("/start_game")
            .header("content-type", "application/json")
            .body(Body::from("{\"game_id\": "))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "decode_error");

        let request = Request::builder()
            .method("POST")
            .uri("/start_game")
            .body(Body::from("{\"game_id\": \"g1\"}"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "decode_error");
    }

    #[tokio::test]
    async fn test_brain_missing_required_field_is_decode_error() {
        let app = create_test_router();
        post(&app, "/start_game", json!({"game_id": "g1"})).await;

        let (status, body) = post(&app, "/brain", json!({"game_id": "g1", "turret_rot": 0.0})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "decode_error");
    }

    struct BrokenBrain;

    struct BrokenPilot;

    impl Brain for BrokenBrain {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn new_pilot(&self, _game_id: &str) -> Box<dyn Pilot> {
            Box::new(BrokenPilot)
        }
    }

    #[async_trait]
    impl Pilot for BrokenPilot {
        async fn decide(&mut self, _obs: &Observation) -> Result<Action, DecisionError> {
            Err(DecisionError::Internal("model unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_collaborator_failure_is_decision_error() {
        let app = build_router(create_test_state(Arc::new(BrokenBrain)));
        post(&app, "/start_game", json!({"game_id": "g1"})).await;

        let (status, body) = post(&app, "/brain", brain_body("g1")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "decision_error");
        assert!(body["message"].as_str().unwrap().contains("model unavailable"));

        // the game survives a failed decision
        let (status, _) = post(&app, "/win", json!({"game_id": "g1"})).await;
        assert_eq!(status, StatusCode::OK);
    }

    struct StallingBrain;

    struct StallingPilot;

    impl Brain for StallingBrain {
        fn name(&self) -> &'static str {
            "stalling"
        }

        fn new_pilot(&self, _game_id: &str) -> Box<dyn Pilot> {
            Box::new(StallingPilot)
        }
    }

    #[async_trait]
    impl Pilot for StallingPilot {
        async fn decide(&mut self, _obs: &Observation) -> Result<Action, DecisionError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Action::Wait)
        }
    }

    #[tokio::test]
    async fn test_slow_collaborator_times_out() {
        let config = Config {
            decision_timeout: Duration::from_millis(20),
            ..Config::default()
        };
        let app = build_router(AppState::with_brain(config, Arc::new(StallingBrain)));
        post(&app, "/start_game", json!({"game_id": "g1"})).await;

        let (status, body) = post(&app, "/brain", brain_body("g1")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "decision_error");
    }

    #[tokio::test]
    async fn test_concurrent_games_do_not_interfere() {
        let state = create_test_state(Arc::new(FixedBrain::spinner()));
        let app = build_router(state.clone());

        for id in ["a", "b"] {
            post(&app, "/start_game", json!({"game_id": id})).await;
        }

        let mut calls = Vec::new();
        for i in 0..40 {
            let app = app.clone();
            let id = if i % 2 == 0 { "a" } else { "b" };
            calls.push(tokio::spawn(async move { post(&app, "/brain", brain_body(id)).await }));
        }
        for call in calls {
            let (status, _) = call.await.unwrap();
            assert_eq!(status, StatusCode::OK);
        }

        for id in ["a", "b"] {
            let session = state.registry.get_active(id).unwrap();
            assert_eq!(session.decisions(), 20);
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_router();
        post(&app, "/start_game", json!({"game_id": "g1"})).await;
        post(&app, "/start_game", json!({"game_id": "g2"})).await;
        post(&app, "/win", json!({"game_id": "g1"})).await;

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["brain"], "spinner");
        assert_eq!(body["active_games"], 1);
        assert_eq!(body["games_started"], 2);
        assert_eq!(body["games_won"], 1);
        assert_eq!(body["games_lost"], 0);
    }

    #[tokio::test]
    async fn test_request_deadline_answers_with_json_error() {
        let config = Config {
            decision_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_millis(50),
            ..Config::default()
        };
        let app = build_router(AppState::with_brain(config, Arc::new(StallingBrain)));
        post(&app, "/start_game", json!({"game_id": "g1"})).await;

        let (status, body) = post(&app, "/brain", brain_body("g1")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "decision_error");
        assert!(body["message"].as_str().unwrap().contains("timed out"));
    }
