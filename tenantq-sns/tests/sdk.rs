//! Integration tests for the SDK backed notification service

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Form, Router};
use serde_json::json;
use tokio::net::TcpListener;

use tenantq_sns::{NotificationPublisher, NotifyError, SdkNotificationService};

const TOPIC_ARN: &str = "arn:aws:sns:us-east-1:000000000000:Onboard";

type Captured = Arc<Mutex<Vec<HashMap<String, String>>>>;

async fn sns_stub(
    State(captured): State<Captured>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    let known = form.get("TopicArn").map(String::as_str) == Some(TOPIC_ARN);
    captured.lock().unwrap().push(form);

    if known {
        (
            StatusCode::OK,
            [("content-type", "text/xml")],
            "<PublishResponse xmlns=\"http://sns.amazonaws.com/doc/2010-03-31/\">\
             <PublishResult><MessageId>msg-1</MessageId></PublishResult>\
             <ResponseMetadata><RequestId>req-1</RequestId></ResponseMetadata>\
             </PublishResponse>",
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            [("content-type", "text/xml")],
            "<ErrorResponse xmlns=\"http://sns.amazonaws.com/doc/2010-03-31/\">\
             <Error><Type>Sender</Type><Code>NotFound</Code><Message>Topic does not exist</Message></Error>\
             <RequestId>req-2</RequestId></ErrorResponse>",
        )
    }
}

/// Start the stub and return a publisher pointed at it plus the captured forms
async fn start_test_publisher() -> (NotificationPublisher, Captured) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let captured: Captured = Arc::default();
    let router = Router::new()
        .route("/", post(sns_stub))
        .with_state(captured.clone());

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let config = aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(format!("http://127.0.0.1:{}", port))
        .credentials_provider(aws_sdk_sns::config::Credentials::new(
            "test", "test", None, None, "test",
        ))
        .region(Region::new("us-east-1"))
        .load()
        .await;

    let service = SdkNotificationService::from_conf(&config);
    (NotificationPublisher::new(Arc::new(service)), captured)
}

#[tokio::test]
async fn test_publish_sends_json_structure_and_string_attribute() {
    let (publisher, captured) = start_test_publisher().await;

    let ack = publisher
        .publish(TOPIC_ARN, &json!({"default": "hello"}), "action", "OnboardCluster")
        .await
        .unwrap();
    assert_eq!(ack.message_id.as_deref(), Some("msg-1"));

    let forms = captured.lock().unwrap().clone();
    assert_eq!(forms.len(), 1);
    let form = &forms[0];
    assert_eq!(form["Action"], "Publish");
    assert_eq!(form["TopicArn"], TOPIC_ARN);
    assert_eq!(form["Message"], r#"{"default":"hello"}"#);
    assert_eq!(form["MessageStructure"], "json");
    assert_eq!(form["MessageAttributes.entry.1.Name"], "action");
    assert_eq!(form["MessageAttributes.entry.1.Value.DataType"], "String");
    assert_eq!(form["MessageAttributes.entry.1.Value.StringValue"], "OnboardCluster");
    assert!(!form.contains_key("MessageAttributes.entry.2.Name"));
}

#[tokio::test]
async fn test_publish_to_unknown_topic_fails() {
    let (publisher, _captured) = start_test_publisher().await;
    let unknown = "arn:aws:sns:us-east-1:000000000000:Missing";

    let err = publisher
        .publish(unknown, &json!({"default": "hello"}), "action", "OnboardCluster")
        .await
        .unwrap_err();

    let NotifyError::Service { topic_arn, message, .. } = &err else {
        panic!("expected a service error, got {:?}", err);
    };
    assert_eq!(topic_arn, unknown);
    assert_eq!(message, "NotFound: Topic does not exist");
}
