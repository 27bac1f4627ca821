pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::jobs::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Job API
        .route("/api/jobs", get(handlers::handle_list_jobs))
        .route("/api/jobs/create", post(handlers::handle_create_job))
        .route(
            "/api/jobs/:job_id/upload-resumes",
            post(handlers::handle_upload_resumes).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/jobs/:job_id/start-shortlisting",
            post(handlers::handle_start_shortlisting),
        )
        .route("/api/jobs/:job_id/status", get(handlers::handle_job_status))
        .route("/api/jobs/:job_id/resumes", get(handlers::handle_list_resumes))
        .route(
            "/api/jobs/:job_id/shortlisted",
            get(handlers::handle_shortlisted),
        )
        // Tool catalog
        .route("/api/mcp/tools", get(handlers::handle_list_tools))
        .route(
            "/api/jobs/:job_id/tools/:tool_name",
            post(handlers::handle_execute_tool),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::Config;
    use crate::extraction::ResumeExtractor;
    use crate::jobs::registry::JobRegistry;
    use crate::shortlisting::phase2::tests::{make_resume, ScriptedClient};
    use crate::shortlisting::phase2::Phase2Reviewer;

    fn test_state(upload_dir: PathBuf, replies: &[&str]) -> AppState {
        let config = Config {
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_model: "scripted".to_string(),
            llm_timeout_secs: 1,
            upload_dir: upload_dir.clone(),
            max_upload_bytes: 1024 * 1024,
            cors_origins: vec![],
            port: 0,
            rust_log: "debug".to_string(),
        };
        AppState {
            jobs: JobRegistry::new(),
            extractor: ResumeExtractor::new(upload_dir),
            reviewer: Arc::new(Phase2Reviewer::new(Arc::new(ScriptedClient::ok(replies)))),
            config,
        }
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn posting_json() -> Value {
        json!({
            "job_title": "Platform Engineer",
            "description": "Own the deploy pipeline",
            "required_tech_stack": ["Rust", "Docker"],
            "minimum_experience": 2,
            "hiring_slots": 1,
            "phase1_shortlist_count": 5,
            "phase2_shortlist_count": 2
        })
    }

    async fn create_job(state: &AppState) -> Uuid {
        let (status, body) = send(
            build_router(state.clone()),
            post_json("/api/jobs/create", posting_json()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["job_id"].as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(build_router(test_state(dir.path().into(), &[])), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_then_status_is_pending() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path().into(), &[]);
        let job_id = create_job(&state).await;

        let (status, body) = send(
            build_router(state),
            get(&format!("/api/jobs/{job_id}/status")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "pending");
        assert_eq!(body["job_title"], "Platform Engineer");
        assert_eq!(body["total_resumes"], 0);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_posting() {
        let dir = tempfile::tempdir().unwrap();
        let mut posting = posting_json();
        posting["job_title"] = json!("");
        let (status, body) = send(
            build_router(test_state(dir.path().into(), &[])),
            post_json("/api/jobs/create", posting),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_job_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path().into(), &[]));
        let (status, body) = send(app, get(&format!("/api/jobs/{}/status", Uuid::new_v4()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_start_without_resumes_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path().into(), &[]);
        let job_id = create_job(&state).await;

        let (status, _) = send(
            build_router(state.clone()),
            post_json(&format!("/api/jobs/{job_id}/start-shortlisting"), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            state.jobs.get(job_id).await.unwrap().status.as_str(),
            "pending"
        );
    }

    #[tokio::test]
    async fn test_non_pdf_upload_leaves_job_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path().join("uploads"), &[]);
        let job_id = create_job(&state).await;

        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             just some text\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::post(format!("/api/jobs/{job_id}/upload-resumes"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, body) = send(build_router(state.clone()), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");

        let record = state.jobs.get(job_id).await.unwrap();
        assert_eq!(record.status.as_str(), "pending");
        assert_eq!(record.total_resumes, 0);
    }

    #[tokio::test]
    async fn test_full_flow_through_api() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path().into(),
            &[r#"{"is_suitable": true, "confidence": 0.9, "reasoning": "strong", "cover_letter": "Hello"}"#],
        );
        let job_id = create_job(&state).await;
        state
            .jobs
            .add_resumes(job_id, vec![make_resume("ana", &["Rust", "Docker"])])
            .await
            .unwrap();

        let (status, body) = send(
            build_router(state.clone()),
            post_json(&format!("/api/jobs/{job_id}/start-shortlisting"), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "processing");

        state.jobs.take_task(job_id).await.unwrap().await.unwrap();

        let (_, body) = send(
            build_router(state.clone()),
            get(&format!("/api/jobs/{job_id}/shortlisted")),
        )
        .await;
        assert_eq!(body["status"], "completed");
        assert_eq!(body["shortlisted"][0]["name"], "ana");
        assert_eq!(body["shortlisted"][0]["confidence"], 0.9);
        assert!(body["shortlisted"][0]["resume_id"].is_string());

        let (_, body) = send(build_router(state.clone()), get("/api/jobs")).await;
        assert_eq!(body["jobs"][0]["shortlisted_count"], 1);

        // a second start on a finished job is a conflict
        let (status, _) = send(
            build_router(state),
            post_json(&format!("/api/jobs/{job_id}/start-shortlisting"), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_tool_catalog_and_execution() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path().into(), &[]);

        let (status, body) = send(build_router(state.clone()), get("/api/mcp/tools")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tools"].as_array().unwrap().len(), 4);

        let job_id = create_job(&state).await;
        state
            .jobs
            .add_resumes(job_id, vec![make_resume("ben", &["Rust"])])
            .await
            .unwrap();

        // tools are addressed by the ids the resume listing hands out
        let (status, body) = send(
            build_router(state.clone()),
            get(&format!("/api/jobs/{job_id}/resumes")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resumes"][0]["name"], "ben");
        assert!(body["resumes"][0].get("text_content").is_none());
        let resume_id = body["resumes"][0]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            build_router(state.clone()),
            post_json(
                &format!("/api/jobs/{job_id}/tools/check_experience"),
                json!({ "resume_id": resume_id }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_experience"], true);

        let (status, _) = send(
            build_router(state),
            post_json(
                &format!("/api/jobs/{job_id}/tools/drop_tables"),
                json!({ "resume_id": resume_id }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
