//! Shared fixtures for repository tests.

use storefront_core::forms::{
    CollectionDraft, CustomerDraft, OrderDraft, OrderItemDraft, ProductDraft,
};
use storefront_core::validation::slugify;
use storefront_core::{
    Collection, Customer, Membership, Money, OrderWithItems, PaymentStatus, Product,
};

use crate::{Database, DbConfig};

pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub async fn collection(db: &Database, title: &str) -> Collection {
    db.collections()
        .insert(&CollectionDraft {
            title: title.to_string(),
            featured_product_id: None,
        })
        .await
        .unwrap()
}

pub fn product_draft(collection_id: &str, title: &str, inventory: i64) -> ProductDraft {
    ProductDraft {
        title: title.to_string(),
        slug: slugify(title),
        description: None,
        unit_price: Money::from_cents(1000),
        inventory,
        collection_id: collection_id.to_string(),
    }
}

pub async fn product(db: &Database, collection_id: &str, title: &str, inventory: i64) -> Product {
    db.products()
        .insert(&product_draft(collection_id, title, inventory))
        .await
        .unwrap()
}

pub fn customer_draft(first_name: &str, last_name: &str) -> CustomerDraft {
    CustomerDraft {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!(
            "{}.{}@example.com",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        ),
        phone: "555-0100".to_string(),
        birth_date: None,
        membership: Membership::Bronze,
    }
}

pub async fn customer(db: &Database, first_name: &str, last_name: &str) -> Customer {
    db.customers()
        .insert(&customer_draft(first_name, last_name))
        .await
        .unwrap()
}

pub fn order_draft(customer_id: &str, product_ids: &[&str]) -> OrderDraft {
    OrderDraft {
        customer_id: customer_id.to_string(),
        payment_status: PaymentStatus::Pending,
        items: product_ids
            .iter()
            .map(|id| OrderItemDraft {
                product_id: id.to_string(),
                quantity: 1,
            })
            .collect(),
    }
}

pub async fn order(db: &Database, customer_id: &str, product_ids: &[&str]) -> OrderWithItems {
    db.orders()
        .create(&order_draft(customer_id, product_ids))
        .await
        .unwrap()
}
