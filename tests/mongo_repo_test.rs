//! Runs against a live MongoDB configured through `.env` / `MONGO_URI`.
//! `cargo test -- --ignored` to include it.

use bson::oid::ObjectId;
use storefront_admin::config::MongoConfig;
use storefront_admin::model::product::Product;
use storefront_admin::model::quote::{DocumentKind, LineItemStatus, Quote, QuoteLineItem, QuoteStage};
use storefront_admin::repository::mongo_client::connect;
use storefront_admin::repository::product_repo::{MongoProductRepository, ProductFilter, ProductRepository};
use storefront_admin::repository::quote_repo::{MongoQuoteRepository, QuoteRepository};
use storefront_admin::util::time::{format_date, today, DateRange};
use tracing::info;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

async fn setup() -> (MongoQuoteRepository, MongoProductRepository) {
    let _ = dotenv::dotenv();
    let config = MongoConfig::from_env().expect("Failed to load MongoConfig");
    let database = connect(&config).await.expect("Failed to connect to MongoDB");
    let products = MongoProductRepository::new(&database, &config);
    products.ensure_indexes().await.expect("Failed to create product indexes");
    (MongoQuoteRepository::new(&database, &config), products)
}

#[tokio::test]
#[ignore = "needs a running MongoDB"]
async fn test_quote_repository_workflow() {
    init_tracing();
    let (quotes, _) = setup().await;

    let mut quote = Quote {
        id: None,
        customer_name: "Sofiane Bouzid".to_string(),
        customer_phone: "+213770000000".to_string(),
        customer_email: Some("sofiane@example.com".to_string()),
        customer_address: Some("5 rue Didouche Mourad, Alger".to_string()),
        note: Some("Deliver after 17h".to_string()),
        items: vec![QuoteLineItem {
            product_id: None,
            product_code: Some("ARM-1".to_string()),
            name: "Armchair".to_string(),
            color: Some("Green".to_string()),
            size: None,
            quantity: 2,
            unit_price: 180.0,
            status: Some(LineItemStatus::SentOffer),
        }],
        status: LineItemStatus::Pending,
        quote_status: QuoteStage::New,
        documents: Default::default(),
        schema_version: 2,
        created_at: None,
        updated_at: None,
    };
    quote.recompute_status();

    let inserted = quotes.create(quote.clone()).await.expect("Failed to insert quote");
    let id = inserted.id.expect("inserted quote has an id");
    assert!(inserted.created_at.is_some());
    info!("Inserted quote {}", id);

    let mut fetched = quotes.get_by_id(id).await.expect("Failed to get quote");
    assert_eq!(fetched.customer_name, quote.customer_name);
    assert_eq!(fetched.status, LineItemStatus::SentOffer);

    let day = today();
    let number = format!("QT-{}-001", day.format("%Y%m%d"));
    fetched.documents.set_issued(DocumentKind::Quote, number.clone(), format_date(day));
    quotes.replace(fetched).await.expect("Failed to replace quote");

    let prefix = format!("QT-{}", day.format("%Y%m%d"));
    let issued = quotes
        .issued_numbers(DocumentKind::Quote, &prefix, day)
        .await
        .expect("Failed to read issued numbers");
    assert!(!issued.is_empty());

    let todays = DateRange { start: Some(day), end: Some(day) };
    let listed = quotes.list(&todays).await.expect("Failed to list quotes");
    assert!(listed.iter().any(|q| q.id == Some(id)));

    quotes.delete(id).await.expect("Failed to delete quote");
    assert!(quotes.get_by_id(id).await.is_err());
}

#[tokio::test]
#[ignore = "needs a running MongoDB"]
async fn test_product_stock_and_category_detach() {
    init_tracing();
    let (_, products) = setup().await;
    let category = ObjectId::new();
    let code = format!("IT-{}", ObjectId::new().to_hex());

    let created = products
        .create(Product {
            id: None,
            name: "Integration stool".to_string(),
            code: Some(code.clone()),
            description: None,
            price: 35.0,
            compare_at_price: None,
            stock: 4,
            colors: vec!["Black".to_string()],
            sizes: vec![],
            images: vec![],
            category_id: Some(category),
            is_active: true,
            created_at: None,
            updated_at: None,
        })
        .await
        .expect("Failed to insert product");
    let id = created.id.expect("inserted product has an id");

    products.adjust_stock(id, -3).await.expect("Failed to adjust stock");
    let found = products
        .find_by_code(&code)
        .await
        .expect("Failed to find by code")
        .expect("product exists");
    assert_eq!(found.stock, 1);

    let filter = ProductFilter {
        category_ids: Some(vec![category]),
        search: None,
    };
    assert_eq!(products.list(&filter).await.expect("Failed to list").len(), 1);
    assert_eq!(products.clear_category(&[category]).await.expect("Failed to detach"), 1);
    assert!(products.list(&filter).await.expect("Failed to list").is_empty());

    products.delete(id).await.expect("Failed to delete product");
}
