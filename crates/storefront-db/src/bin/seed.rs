//! # Seed Data Generator
//!
//! Populates the database with store data for development.
//!
//! ## Usage
//! ```bash
//! # Generate the default data set (5 collections, 150 products, 50 customers, 200 orders)
//! cargo run -p storefront-db --bin seed
//!
//! # Generate more customers and orders
//! cargo run -p storefront-db --bin seed -- --customers 500 --orders 2000
//!
//! # Specify database path
//! cargo run -p storefront-db --bin seed -- --db ./data/storefront.db
//! ```
//!
//! ## Generated Data
//! - One collection per category (Beverages, Snacks, Dairy, Frozen, Grocery)
//! - Products: name × size variants, price 1.99 - 12.99, inventory 0 - 40
//!   (so the "Low" inventory filter always has hits)
//! - Customers with rotating memberships
//! - Orders of 1 - 5 items each, with mixed payment statuses

use std::env;

use storefront_core::forms::{
    CollectionDraft, CustomerDraft, OrderDraft, OrderItemDraft, ProductDraft,
};
use storefront_core::validation::slugify;
use storefront_core::{Membership, Money, PaymentStatus, MAX_ORDER_ITEMS};
use storefront_db::{Database, DbConfig};

/// Collections with their product names
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Beverages",
        &["Cola", "Lemonade", "Iced Tea", "Orange Juice", "Sparkling Water", "Cold Brew"],
    ),
    (
        "Snacks",
        &["Potato Chips", "Pretzels", "Trail Mix", "Popcorn", "Granola Bar", "Rice Crackers"],
    ),
    (
        "Dairy",
        &["Whole Milk", "Greek Yogurt", "Cheddar", "Butter", "Cream Cheese", "Kefir"],
    ),
    (
        "Frozen",
        &["Vanilla Ice Cream", "Frozen Peas", "Pizza", "Fish Sticks", "Waffles", "Berries"],
    ),
    (
        "Grocery",
        &["Spaghetti", "Basmati Rice", "Olive Oil", "Tomato Sauce", "Oats", "Honey"],
    ),
];

/// Size variants with their price add-on in cents
const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 100),
    ("Large", 200),
    ("Family", 350),
    ("Bulk", 500),
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Grace", "Linus", "Margaret", "Dennis", "Barbara", "Ken", "Frances", "Edsger",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Turing", "Hopper", "Torvalds", "Hamilton", "Ritchie", "Liskov", "Thompson",
    "Allen", "Dijkstra",
];

const PAYMENT_STATUSES: &[PaymentStatus] = &[
    PaymentStatus::Complete,
    PaymentStatus::Complete,
    PaymentStatus::Pending,
    PaymentStatus::Failed,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut customer_count: usize = 50;
    let mut order_count: usize = 200;
    let mut db_path = String::from("./storefront_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--customers" => {
                if i + 1 < args.len() {
                    customer_count = args[i + 1].parse().unwrap_or(customer_count);
                    i += 1;
                }
            }
            "--orders" | "-o" => {
                if i + 1 < args.len() {
                    order_count = args[i + 1].parse().unwrap_or(order_count);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storefront Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("      --customers <N>  Number of customers to generate (default: 50)");
                println!("  -o, --orders <N>     Number of orders to generate (default: 200)");
                println!("  -d, --db <PATH>      Database file path (default: ./storefront_dev.db)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Storefront Seed Data Generator");
    println!("=================================");
    println!("Database:  {}", db_path);
    println!("Customers: {}", customer_count);
    println!("Orders:    {}", order_count);
    println!();

    // Connect to database
    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing data
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Collections and products
    println!();
    println!("Generating catalog...");

    let mut product_ids = Vec::new();
    for (category_idx, (title, names)) in CATEGORIES.iter().enumerate() {
        let collection = db
            .collections()
            .insert(&CollectionDraft {
                title: title.to_string(),
                featured_product_id: None,
            })
            .await?;

        for (product_idx, name) in names.iter().enumerate() {
            for (size_idx, (size, price_addon)) in SIZES.iter().enumerate() {
                let seed = category_idx * 1000 + product_idx * 20 + size_idx;
                let draft = product_draft(&collection.id, name, size, *price_addon, seed);

                match db.products().insert(&draft).await {
                    Ok(product) => product_ids.push(product.id),
                    Err(e) => eprintln!("Failed to insert {}: {}", draft.title, e),
                }
            }
        }
    }

    println!("  {} products", product_ids.len());

    // Customers
    println!("Generating customers...");

    let mut customer_ids = Vec::with_capacity(customer_count);
    for seed in 0..customer_count {
        match db.customers().insert(&customer_draft(seed)).await {
            Ok(customer) => customer_ids.push(customer.id),
            Err(e) => eprintln!("Failed to insert customer #{}: {}", seed, e),
        }
    }

    println!("  {} customers", customer_ids.len());

    // Orders
    println!("Generating orders...");

    let mut generated = 0;
    if !customer_ids.is_empty() && !product_ids.is_empty() {
        for seed in 0..order_count {
            let draft = order_draft(&customer_ids, &product_ids, seed);
            if let Err(e) = db.orders().create(&draft).await {
                eprintln!("Failed to insert order #{}: {}", seed, e);
                continue;
            }

            generated += 1;
            if generated % 100 == 0 {
                println!("  Generated {} orders...", generated);
            }
        }
    }

    println!("  {} orders", generated);

    let elapsed = start.elapsed();
    println!();
    println!("✓ Seed complete in {:?}", elapsed);

    db.close().await;
    Ok(())
}

/// Generates a single product with realistic data.
fn product_draft(
    collection_id: &str,
    name: &str,
    size: &str,
    price_addon: i64,
    seed: usize,
) -> ProductDraft {
    let title = format!("{} {}", name, size);

    // Base price 1.99 - 9.99 plus the size add-on
    let base_price = 199 + ((seed * 17) % 800) as i64;

    ProductDraft {
        slug: slugify(&title),
        title,
        description: None,
        unit_price: Money::from_cents(base_price + price_addon),
        // 0 - 40: roughly a quarter of the catalog shows as Low
        inventory: ((seed * 7) % 41) as i64,
        collection_id: collection_id.to_string(),
    }
}

fn customer_draft(seed: usize) -> CustomerDraft {
    let first_name = FIRST_NAMES[seed % FIRST_NAMES.len()];
    let last_name = LAST_NAMES[(seed / FIRST_NAMES.len()) % LAST_NAMES.len()];

    CustomerDraft {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!(
            "{}.{}.{}@example.com",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            seed
        ),
        phone: format!("555-{:04}", seed % 10_000),
        birth_date: None,
        membership: Membership::ALL[seed % Membership::ALL.len()],
    }
}

fn order_draft(customer_ids: &[String], product_ids: &[String], seed: usize) -> OrderDraft {
    let item_count = (1 + seed % 5).min(MAX_ORDER_ITEMS);

    OrderDraft {
        customer_id: customer_ids[(seed * 13) % customer_ids.len()].clone(),
        payment_status: PAYMENT_STATUSES[seed % PAYMENT_STATUSES.len()],
        items: (0..item_count)
            .map(|n| OrderItemDraft {
                product_id: product_ids[(seed * 31 + n * 7) % product_ids.len()].clone(),
                quantity: 1 + ((seed + n) % 4) as i64,
            })
            .collect(),
    }
}
