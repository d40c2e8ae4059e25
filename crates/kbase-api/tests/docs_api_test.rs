//! Doc routes over HTTP, in both owner models.

mod common;

use std::sync::Arc;

use common::{bearer, doc_form, docx_part, error_message, DownConverter, TestServer};
use kbase_api::DocScope;
use kbase_core::defaults;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

async fn upload(server: &TestServer, sub: &str, name: &str, bytes: &[u8]) -> reqwest::Response {
    server
        .client
        .post(server.url("/api/v1/docs"))
        .header("Authorization", bearer(sub))
        .multipart(doc_form(name, bytes))
        .send()
        .await
        .unwrap()
}

async fn list(server: &TestServer, sub: &str) -> Vec<Value> {
    let resp = server
        .client
        .get(server.url("/api/v1/docs"))
        .header("Authorization", bearer(sub))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn test_upload_and_download() {
    let server = TestServer::start(DocScope::User).await;

    let resp = upload(&server, "alice", "Lecture 1", b"docx-bytes").await;
    assert_eq!(resp.status(), 201);
    let doc: Value = resp.json().await.unwrap();
    assert_eq!(doc["name"], "Lecture 1");
    assert_eq!(doc["ownerKey"], "alice");
    let id = doc["id"].as_str().unwrap();

    let resp = server
        .client
        .get(server.url(&format!("/api/v1/docs/{}/pdf", id)))
        .header("Authorization", bearer("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], defaults::PDF_MIME);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"PDF:docx-bytes");

    let resp = server
        .client
        .get(server.url(&format!("/api/v1/docs/{}/docx", id)))
        .header("Authorization", bearer("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], defaults::DOCX_MIME);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"docx-bytes");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let server = TestServer::start(DocScope::User).await;

    let resp = server
        .client
        .get(server.url("/api/v1/docs"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_docs_are_isolated_per_user() {
    let server = TestServer::start(DocScope::User).await;

    let resp = upload(&server, "alice", "Lecture 1", b"a").await;
    let doc: Value = resp.json().await.unwrap();
    let id = doc["id"].as_str().unwrap();

    // Same name is free for another user
    assert_eq!(upload(&server, "bob", "Lecture 1", b"b").await.status(), 201);
    assert_eq!(list(&server, "alice").await.len(), 1);
    assert_eq!(list(&server, "bob").await.len(), 1);

    let resp = server
        .client
        .get(server.url(&format!("/api/v1/docs/{}/pdf", id)))
        .header("Authorization", bearer("bob"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_duplicate_name_is_conflict() {
    let server = TestServer::start(DocScope::User).await;
    upload(&server, "alice", "Lecture 1", b"a").await;

    let resp = upload(&server, "alice", "Lecture 1", b"b").await;
    assert_eq!(resp.status(), 409);
    assert_eq!(error_message(resp).await, "Doc name 'Lecture 1' is already taken");
}

#[tokio::test]
async fn test_non_docx_upload_is_rejected() {
    let server = TestServer::start(DocScope::User).await;

    let part = Part::bytes(b"%PDF".to_vec())
        .file_name("lecture.pdf")
        .mime_str(defaults::PDF_MIME)
        .unwrap();
    let form = Form::new().text("name", "Lecture 1").part("docxFile", part);
    let resp = server
        .client
        .post(server.url("/api/v1/docs"))
        .header("Authorization", bearer("alice"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(
        error_message(resp).await,
        "Invalid argument: File has to be a DOCX-file"
    );
}

#[tokio::test]
async fn test_failed_conversion_stores_nothing() {
    let server = TestServer::start_with(DocScope::User, Arc::new(DownConverter)).await;

    let resp = upload(&server, "alice", "Lecture 1", b"a").await;
    assert_eq!(resp.status(), 409);
    assert!(error_message(resp).await.starts_with("Conversion failed"));
    assert!(list(&server, "alice").await.is_empty());
}

#[tokio::test]
async fn test_rename_replace_and_delete() {
    let server = TestServer::start(DocScope::User).await;
    let doc: Value = upload(&server, "alice", "Lecture 1", b"v1")
        .await
        .json()
        .await
        .unwrap();
    let id = doc["id"].as_str().unwrap();

    let resp = server
        .client
        .patch(server.url(&format!("/api/v1/docs/{}/rename", id)))
        .header("Authorization", bearer("alice"))
        .query(&[("name", "Lecture 2")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 202);
    let renamed: Value = resp.json().await.unwrap();
    assert_eq!(renamed["name"], "Lecture 2");

    let resp = server
        .client
        .patch(server.url(&format!("/api/v1/docs/{}/replace-file", id)))
        .header("Authorization", bearer("alice"))
        .multipart(Form::new().part("docxFile", docx_part(b"v2")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 202);

    let resp = server
        .client
        .get(server.url(&format!("/api/v1/docs/{}/pdf", id)))
        .header("Authorization", bearer("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"PDF:v2");

    let resp = server
        .client
        .delete(server.url(&format!("/api/v1/docs/{}", id)))
        .header("Authorization", bearer("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = server
        .client
        .delete(server.url(&format!("/api/v1/docs/{}", id)))
        .header("Authorization", bearer("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_topic_scope_requires_existing_topic() {
    let server = TestServer::start(DocScope::Topic).await;

    let resp = server
        .client
        .get(server.url("/api/v1/docs"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(error_message(resp).await, "topicId cannot be null");

    let unknown = uuid::Uuid::nil().to_string();
    let resp = server
        .client
        .post(server.url("/api/v1/docs"))
        .query(&[("topicId", unknown.as_str())])
        .multipart(doc_form("Lecture 1", b"a"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_topic_scope_bulk_delete() {
    let server = TestServer::start(DocScope::Topic).await;
    let topic_id = server.create_topic("Java").await;

    for name in ["Lecture 1", "Lecture 2"] {
        let resp = server
            .client
            .post(server.url("/api/v1/docs"))
            .query(&[("topicId", topic_id.as_str())])
            .multipart(doc_form(name, b"a"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let resp = server
        .client
        .delete(server.url("/api/v1/docs/by-topicId"))
        .query(&[("topicId", topic_id.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = server
        .client
        .get(server.url("/api/v1/docs"))
        .query(&[("topicId", topic_id.as_str())])
        .send()
        .await
        .unwrap();
    let docs: Vec<Value> = resp.json().await.unwrap();
    assert!(docs.is_empty());

    // Topic is deletable once its docs are gone
    let resp = server
        .client
        .delete(server.url("/topic-api/v1/topic"))
        .query(&[("id", topic_id.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);
}
