//! Integration tests for the TensorFlow Serving disease classifier
//!
//! Runs a stand-in serving endpoint on an ephemeral local port.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json, Router,
};
use serde_json::{json, Value};
use tmt_common::classes::CLASS_COUNT;
use tmt_common::Error;
use tmt_ha::models::{classify_disease, DiseaseClassifier, RemoteDiseaseClassifier};
use tmt_ha::preprocess::{LeafTensor, CHANNELS, INPUT_SIZE};

/// Stand-in for `POST /v1/models/{model}:predict`
async fn fake_predict(uri: Uri, Json(body): Json<Value>) -> impl IntoResponse {
    match uri.path() {
        "/v1/models/leaf:predict" => {}
        "/v1/models/broken:predict" => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "model crashed"})),
            );
        }
        "/v1/models/wrong:predict" => {
            return (StatusCode::OK, Json(json!({"predictions": [[0.5, 0.5]]})));
        }
        _ => return (StatusCode::NOT_FOUND, Json(json!({"error": "no such model"}))),
    }

    let instance = &body["instances"][0];
    let rows = instance.as_array().map(|r| r.len()).unwrap_or(0);
    let cols = instance[0].as_array().map(|c| c.len()).unwrap_or(0);
    let channels = instance[0][0].as_array().map(|c| c.len()).unwrap_or(0);
    if rows != INPUT_SIZE as usize || cols != INPUT_SIZE as usize || channels != CHANNELS {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("bad shape {}x{}x{}", rows, cols, channels)})),
        );
    }

    let mut probs = vec![0.01; CLASS_COUNT];
    probs[6] = 0.86;
    (StatusCode::OK, Json(json!({ "predictions": [probs] })))
}

async fn start_fake_server() -> SocketAddr {
    let app = Router::new().fallback(fake_predict);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn leaf_tensor() -> LeafTensor {
    LeafTensor {
        data: vec![0.5; (INPUT_SIZE * INPUT_SIZE) as usize * CHANNELS],
        width: INPUT_SIZE,
        height: INPUT_SIZE,
    }
}

fn client(addr: SocketAddr, model: &str) -> RemoteDiseaseClassifier {
    RemoteDiseaseClassifier::new(&format!("http://{}/", addr), model, Duration::from_secs(10))
        .expect("Should build client")
}

#[tokio::test]
async fn test_remote_prediction() {
    let addr = start_fake_server().await;
    let classifier = client(addr, "leaf");

    let probs = classifier.predict(&leaf_tensor()).await.unwrap();
    assert_eq!(probs.len(), CLASS_COUNT);

    let prediction = classify_disease(&classifier, &leaf_tensor()).await.unwrap();
    assert_eq!(prediction.class_index, 6);
    assert_eq!(prediction.label, "Tomato_Early_blight");
    assert!((prediction.confidence - 0.86).abs() < 1e-6);
}

#[tokio::test]
async fn test_remote_server_error() {
    let addr = start_fake_server().await;
    let classifier = client(addr, "broken");

    let err = classifier.predict(&leaf_tensor()).await.unwrap_err();
    assert!(matches!(err, Error::Model(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_remote_wrong_class_count() {
    let addr = start_fake_server().await;
    let classifier = client(addr, "wrong");

    let err = classify_disease(&classifier, &leaf_tensor()).await.unwrap_err();
    assert!(err.to_string().contains("expected 15"));
}

#[tokio::test]
async fn test_remote_unreachable() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let classifier = client(addr, "leaf");
    let err = classifier.predict(&leaf_tensor()).await.unwrap_err();
    assert!(matches!(err, Error::Model(_)));
}
