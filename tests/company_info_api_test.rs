mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{id_of, MultipartBody, TestApp, STORAGE_BASE};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nlogo";

fn company_json() -> Value {
    json!({
        "name": "Atelier Bois & Co",
        "phone": "023 45 67 89",
        "email": "contact@atelier.example",
        "address": "12 rue des Artisans, Alger",
        "website": "https://atelier.example",
        "taxId": "NIF-0012345",
        "bankName": "BNA",
        "bankAccount": "0010 0000 1234 5678",
    })
}

fn urls(value: &Value) -> Vec<String> {
    serde_json::from_value(value.clone()).unwrap()
}

#[tokio::test]
async fn test_current_is_null_until_saved() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/company-info/current").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_create_with_logo_and_partner_images() {
    let app = TestApp::new();
    let form = MultipartBody::json(&company_json())
        .file("logo", "logo.png", "image/png", PNG)
        .file("partners", "p1.png", "image/png", PNG)
        .file("partners", "p2.jpg", "image/jpeg", b"jpeg")
        .file("certifications", "iso.png", "image/png", PNG);
    let (status, body) = app.multipart(Method::POST, "/api/company-info", form).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let info = &body["data"];
    let id = id_of(info);
    let logo = info["logoUrl"].as_str().unwrap();
    assert!(logo.starts_with(&format!("{}/company/{}/logo/", STORAGE_BASE, id)));
    let partners = urls(&info["partnerImages"]);
    assert_eq!(partners.len(), 2);
    assert!(partners[0].contains(&format!("/company/{}/partners/", id)));
    assert_eq!(urls(&info["certificationImages"]).len(), 1);
    assert_eq!(app.storage.keys().len(), 4);

    let (_, body) = app.get("/api/company-info/current").await;
    assert_eq!(id_of(&body["data"]), id);
}

#[tokio::test]
async fn test_update_drops_unlisted_images() {
    let app = TestApp::new();
    let form = MultipartBody::json(&company_json())
        .file("logo", "logo.png", "image/png", PNG)
        .file("partners", "p1.png", "image/png", PNG)
        .file("partners", "p2.png", "image/png", PNG);
    let (_, body) = app.multipart(Method::POST, "/api/company-info", form).await;
    let id = id_of(&body["data"]);
    let partners = urls(&body["data"]["partnerImages"]);

    let mut update = company_json();
    update["name"] = json!("Atelier Bois");
    update["keepLogo"] = json!(false);
    update["partnerImages"] = json!([partners[1]]);
    let (status, body) = app
        .multipart(Method::PUT, &format!("/api/company-info/{}", id), MultipartBody::json(&update))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["name"], "Atelier Bois");
    assert!(body["data"]["logoUrl"].is_null());
    assert_eq!(urls(&body["data"]["partnerImages"]), vec![partners[1].clone()]);
    assert_eq!(app.storage.keys().len(), 1);

    let (status, _) = app.delete(&format!("/api/company-info/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.storage.keys().is_empty());
}

#[tokio::test]
async fn test_invalid_company_info() {
    let app = TestApp::new();
    let mut bad = company_json();
    bad["website"] = json!("not a url");
    let (status, _) = app.multipart(Method::POST, "/api/company-info", MultipartBody::json(&bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let form = MultipartBody::json(&company_json()).file("logo", "logo.pdf", "application/pdf", b"%PDF");
    let (status, _) = app.multipart(Method::POST, "/api/company-info", form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.company_info.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_issued_documents_snapshot_the_company() {
    let app = TestApp::new();
    let form = MultipartBody::json(&company_json()).file("logo", "logo.png", "image/png", PNG);
    let (_, body) = app.multipart(Method::POST, "/api/company-info", form).await;
    let company_id = id_of(&body["data"]);
    let logo = body["data"]["logoUrl"].clone();

    let (_, body) = app
        .post(
            "/api/quotes",
            json!({
                "customerName": "Nadia Cherif",
                "customerPhone": "0551987654",
                "items": [{ "name": "Oak desk", "quantity": 1, "unitPrice": 320.0 }],
            }),
        )
        .await;
    let quote = id_of(&body["data"]);

    let (status, body) = app
        .post(&format!("/api/quotes/{}/documents/invoice", quote), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let snapshot = &body["data"]["documents"]["company"];
    assert_eq!(snapshot["name"], "Atelier Bois & Co");
    assert_eq!(snapshot["taxId"], "NIF-0012345");
    assert_eq!(snapshot["logoUrl"], logo);

    // Later edits do not rewrite the issued document.
    let mut update = company_json();
    update["name"] = json!("Renamed SARL");
    app.multipart(Method::PUT, &format!("/api/company-info/{}", company_id), MultipartBody::json(&update))
        .await;
    let (_, body) = app.get(&format!("/api/quotes/{}", quote)).await;
    assert_eq!(body["data"]["documents"]["company"]["name"], "Atelier Bois & Co");
}
