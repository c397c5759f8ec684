//! Integration tests for the SDK backed queue service
//!
//! A stub SQS endpoint answers the JSON protocol, so the SDK's error
//! classification is exercised without AWS.

use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use tokio::net::TcpListener;

use tenantq_sqs::{QueueError, QueueLookup, QueueOperation, QueueService, SdkQueueService};

const PRESENT_URL: &str = "https://sqs.us-east-1.amazonaws.com/000000000000/present";

fn json(status: StatusCode, body: &str) -> Response {
    (
        status,
        [("content-type", "application/x-amz-json-1.0")],
        body.to_string(),
    )
        .into_response()
}

/// Answers by target operation and by which queue name appears in the body
async fn sqs_stub(headers: HeaderMap, body: String) -> Response {
    let target = headers
        .get("x-amz-target")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match target {
        "AmazonSQS.GetQueueUrl" if body.contains("\"missing\"") => json(
            StatusCode::BAD_REQUEST,
            r#"{"__type":"com.amazonaws.sqs#QueueDoesNotExist","message":"The specified queue does not exist."}"#,
        ),
        "AmazonSQS.GetQueueUrl" if body.contains("\"present\"") => {
            json(StatusCode::OK, &format!(r#"{{"QueueUrl":"{}"}}"#, PRESENT_URL))
        }
        "AmazonSQS.GetQueueUrl" | "AmazonSQS.CreateQueue" | "AmazonSQS.DeleteQueue"
            if body.contains("broken") =>
        {
            json(
                StatusCode::FORBIDDEN,
                r#"{"__type":"com.amazon.coral.service#AccessDeniedException","message":"User is not authorized"}"#,
            )
        }
        "AmazonSQS.CreateQueue" => json(StatusCode::OK, &format!(r#"{{"QueueUrl":"{}"}}"#, PRESENT_URL)),
        "AmazonSQS.DeleteQueue" => json(StatusCode::OK, "{}"),
        _ => json(
            StatusCode::BAD_REQUEST,
            r#"{"__type":"com.amazonaws.sqs#InvalidAction","message":"unexpected request"}"#,
        ),
    }
}

/// Start the stub and return a service pointed at it
async fn start_test_service() -> SdkQueueService {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, Router::new().route("/", post(sqs_stub)))
            .await
            .unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let config = aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(format!("http://127.0.0.1:{}", port))
        .credentials_provider(aws_sdk_sqs::config::Credentials::new(
            "test", "test", None, None, "test",
        ))
        .region(Region::new("us-east-1"))
        .load()
        .await;

    SdkQueueService::from_conf(&config)
}

#[tokio::test]
async fn test_lookup_missing_queue_is_absent() {
    let service = start_test_service().await;

    assert_eq!(service.lookup("missing").await.unwrap(), QueueLookup::Absent);
}

#[tokio::test]
async fn test_lookup_existing_queue_is_found() {
    let service = start_test_service().await;

    assert_eq!(
        service.lookup("present").await.unwrap(),
        QueueLookup::Found(PRESENT_URL.to_string())
    );
}

#[tokio::test]
async fn test_lookup_access_denied_is_an_error() {
    let service = start_test_service().await;

    let err = service.lookup("broken").await.unwrap_err();
    assert_eq!(err.operation(), QueueOperation::GetQueueUrl);

    let QueueError::Service { queue, message, .. } = &err else {
        panic!("expected a service error, got {:?}", err);
    };
    assert_eq!(queue, "broken");
    assert_eq!(message, "AccessDeniedException: User is not authorized");
}

#[tokio::test]
async fn test_error_message_leaves_out_raw_response() {
    let service = start_test_service().await;

    let err = service.create("broken").await.unwrap_err();
    assert_eq!(err.operation(), QueueOperation::CreateQueue);

    let rendered = err.to_string();
    assert!(rendered.contains("AccessDeniedException"));
    assert!(!rendered.contains("__type"));
    assert!(!rendered.contains("content-type"));
}

#[tokio::test]
async fn test_create_and_delete() {
    let service = start_test_service().await;

    assert_eq!(service.create("present").await.unwrap(), PRESENT_URL);
    service.delete(PRESENT_URL).await.unwrap();
}
