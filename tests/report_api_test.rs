mod common;

use axum::http::StatusCode;
use serde_json::json;
use storefront_admin::model::product::Product;
use storefront_admin::model::quote::{LineItemStatus, Quote, QuoteLineItem, QuoteStage};
use storefront_admin::model::special_order::{SpecialOrder, SpecialOrderStatus};
use storefront_admin::repository::product_repo::ProductRepository;

use common::TestApp;

fn line(quantity: i64, unit_price: f64, status: Option<LineItemStatus>) -> QuoteLineItem {
    QuoteLineItem {
        product_id: None,
        product_code: None,
        name: "Line".to_string(),
        color: None,
        size: None,
        quantity,
        unit_price,
        status,
    }
}

fn quote(created_at: &str, stage: QuoteStage, items: Vec<QuoteLineItem>) -> Quote {
    let mut quote = Quote {
        id: None,
        customer_name: "Report customer".to_string(),
        customer_phone: "0550000000".to_string(),
        customer_email: None,
        customer_address: None,
        note: None,
        items,
        status: LineItemStatus::Pending,
        quote_status: stage,
        documents: Default::default(),
        schema_version: 2,
        created_at: Some(created_at.to_string()),
        updated_at: Some(created_at.to_string()),
    };
    quote.recompute_status();
    quote
}

fn order(created_at: &str, status: SpecialOrderStatus) -> SpecialOrder {
    SpecialOrder {
        id: None,
        customer_name: "Report customer".to_string(),
        customer_phone: "0550000000".to_string(),
        customer_email: None,
        product_name: "Custom".to_string(),
        description: None,
        quantity: 1,
        budget: None,
        status,
        admin_note: None,
        created_at: Some(created_at.to_string()),
        updated_at: Some(created_at.to_string()),
    }
}

async fn product(app: &TestApp, name: &str, stock: i64) {
    app.products
        .create(Product {
            id: None,
            name: name.to_string(),
            code: None,
            description: None,
            price: 10.0,
            compare_at_price: None,
            stock,
            colors: vec![],
            sizes: vec![],
            images: vec![],
            category_id: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        })
        .await
        .unwrap();
}

async fn seed(app: &TestApp) {
    app.quotes.seed(quote(
        "2026-10-10T09:00:00.000Z",
        QuoteStage::InProgress,
        vec![
            line(2, 100.0, Some(LineItemStatus::Spent)),
            line(1, 50.5, Some(LineItemStatus::SentOffer)),
        ],
    ));
    app.quotes.seed(quote(
        "2026-10-12T09:00:00.000Z",
        QuoteStage::Completed,
        vec![line(3, 10.0, Some(LineItemStatus::Spent))],
    ));
    app.quotes.seed(quote(
        "2026-09-01T09:00:00.000Z",
        QuoteStage::New,
        vec![line(1, 999.0, None)],
    ));
    app.special_orders.seed(order("2026-10-11T09:00:00.000Z", SpecialOrderStatus::New));
    app.special_orders.seed(order("2026-10-11T10:00:00.000Z", SpecialOrderStatus::New));
    app.special_orders.seed(order("2026-08-11T10:00:00.000Z", SpecialOrderStatus::Completed));
    product(app, "Pine stool", 2).await;
    product(app, "Oak table", 5).await;
    product(app, "Ash chair", 40).await;
}

#[tokio::test]
async fn test_summary_over_a_range() {
    let app = TestApp::new();
    seed(&app).await;

    let (status, body) = app
        .get("/api/reports/summary?startDate=2026-10-01&endDate=2026-10-31")
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let summary = &body["data"];
    assert_eq!(summary["startDate"], "2026-10-01");
    assert_eq!(summary["endDate"], "2026-10-31");
    assert_eq!(summary["quoteCount"], 2);
    assert_eq!(summary["quotesByStatus"], json!({ "sent_offer": 1, "spent": 1 }));
    assert_eq!(summary["quotesByStage"], json!({ "completed": 1, "in_progress": 1 }));
    assert_eq!(summary["quotedTotal"], 280.5);
    assert_eq!(summary["spentTotal"], 230.0);
    assert_eq!(summary["specialOrderCount"], 2);
    assert_eq!(summary["specialOrdersByStatus"], json!({ "new": 2 }));

    assert_eq!(summary["lowStockThreshold"], 5);
    let low: Vec<&str> = summary["lowStockProducts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(low, vec!["Pine stool", "Oak table"]);
}

#[tokio::test]
async fn test_summary_threshold_override_and_errors() {
    let app = TestApp::new();
    seed(&app).await;

    let (_, body) = app.get("/api/reports/summary?lowStockThreshold=2").await;
    assert_eq!(body["data"]["quoteCount"], 3);
    assert_eq!(body["data"]["lowStockThreshold"], 2);
    assert_eq!(body["data"]["lowStockProducts"].as_array().unwrap().len(), 1);

    let (status, _) = app.get("/api/reports/summary?lowStockThreshold=few").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/reports/summary?startDate=2026-13-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
