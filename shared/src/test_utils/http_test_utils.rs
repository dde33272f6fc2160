use axum::{body::Body, response::Response};
use http_body_util::BodyExt;

pub async fn response_to_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("failed to read response body")
        .to_bytes()
        .to_vec()
}

pub async fn response_to_text(response: Response<Body>) -> String {
    String::from_utf8(response_to_bytes(response).await).expect("response body is not UTF-8")
}

pub async fn response_to_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&response_to_bytes(response).await).expect("response body is not JSON")
}
