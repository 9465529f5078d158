//! # Product Importer
//!
//! Bulk-loads catalog exports (JSON arrays) into the database.
//!
//! ## Usage
//! ```bash
//! cargo run -p moto-db --bin import-products -- honda_final.json yamaha_final.json
//! cargo run -p moto-db --bin import-products -- --db ./data/motopos.db parts.json
//! ```
//!
//! ## File Format
//! ```json
//! [
//!   {"name": "Kampas Rem Depan Beat", "brand": "honda", "category": "Rem",
//!    "sku_manual": "06455-KVB-N01", "buy_price": 38000, "sell_price": 45000,
//!    "stock": 12, "master_category": "Pengereman"}
//! ]
//! ```
//!
//! Rows with an unknown brand or a SKU that is already in the catalog are
//! skipped. Rows that fail validation or insertion count as errors.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use moto_core::catalog::CreateProductRequest;
use moto_core::validation::Numeric;
use moto_core::ValidationError;
use moto_db::{Database, DbConfig, ProductRepository};

/// Default file when none is given on the command line.
const DEFAULT_FILE: &str = "honda_final.json";

/// One row of an export file.
#[derive(Debug, Deserialize)]
struct ImportRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    sku_manual: Option<String>,
    #[serde(default)]
    buy_price: Option<Numeric>,
    #[serde(default)]
    sell_price: Option<Numeric>,
    #[serde(default)]
    stock: Option<Numeric>,
    #[serde(default)]
    master_category: Option<String>,
}

impl From<ImportRow> for CreateProductRequest {
    fn from(row: ImportRow) -> Self {
        CreateProductRequest {
            name: row.name,
            brand: row.brand,
            category: row.category,
            master_category: row.master_category,
            sku_manual: row.sku_manual,
            buy_price: row.buy_price,
            sell_price: row.sell_price,
            stock: row.stock,
            image_product: None,
        }
    }
}

#[derive(Debug, Default)]
struct ImportStats {
    imported: usize,
    skipped: usize,
    errors: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut db_path = String::from("./motopos.db");
    let mut files: Vec<PathBuf> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Moto POS Product Importer");
                println!();
                println!("Usage: import-products [OPTIONS] <FILE>...");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./motopos.db)");
                println!("  -h, --help         Show this help message");
                println!();
                println!("Without FILE, imports ./{} when present.", DEFAULT_FILE);
                return Ok(());
            }
            file => files.push(PathBuf::from(file)),
        }
        i += 1;
    }

    if files.is_empty() {
        let default = PathBuf::from(DEFAULT_FILE);
        if !default.exists() {
            println!("Usage: import-products <json-file>...");
            println!("Example: import-products {}", DEFAULT_FILE);
            return Ok(());
        }
        files.push(default);
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to {}", db_path);

    for file in &files {
        if !file.exists() {
            eprintln!("❌ File not found: {}", file.display());
            continue;
        }

        let stats = import_file(&db, file).await?;

        println!();
        println!("✅ Import of {} completed!", file.display());
        println!("   📥 Imported: {}", stats.imported);
        println!("   ⏭️ Skipped: {}", stats.skipped);
        println!("   ❌ Errors: {}", stats.errors);
    }

    db.close().await;
    Ok(())
}

async fn import_file(db: &Database, path: &Path) -> Result<ImportStats, Box<dyn std::error::Error>> {
    println!("📂 Reading file: {}", path.display());

    let raw = std::fs::read_to_string(path)?;
    let rows: Vec<ImportRow> = serde_json::from_str(&raw)?;
    let total = rows.len();

    println!("📦 Found {} products to import", total);

    let mut stats = ImportStats::default();
    let repo = db.products();

    for (index, row) in rows.into_iter().enumerate() {
        match import_row(&repo, index, row).await {
            Outcome::Imported => stats.imported += 1,
            Outcome::Skipped => stats.skipped += 1,
            Outcome::Failed => stats.errors += 1,
        }

        let done = index + 1;
        if done % 100 == 0 || done == total {
            println!("📊 Progress: {}/{} ({}%)", done, total, done * 100 / total);
        }
    }

    Ok(stats)
}

enum Outcome {
    Imported,
    Skipped,
    Failed,
}

async fn import_row(repo: &ProductRepository, index: usize, row: ImportRow) -> Outcome {
    let label = row
        .sku_manual
        .clone()
        .unwrap_or_else(|| format!("row {}", index + 1));

    let product = match CreateProductRequest::from(row).validate() {
        Ok(product) => product,
        Err(ValidationError::NotAllowed { ref field, ref allowed }) if field == "brand" => {
            eprintln!("⚠️ Invalid brand for {} (allowed: {})", label, allowed.join(", "));
            return Outcome::Skipped;
        }
        Err(e) => {
            eprintln!("❌ Error importing {}: {}", label, e);
            return Outcome::Failed;
        }
    };

    match repo.get_by_sku(&product.sku).await {
        Ok(Some(_)) => return Outcome::Skipped,
        Ok(None) => {}
        Err(e) => {
            eprintln!("❌ Error importing {}: {}", label, e);
            return Outcome::Failed;
        }
    }

    match repo.insert(&product).await {
        Ok(_) => Outcome::Imported,
        Err(e) => {
            eprintln!("❌ Error importing {}: {}", label, e);
            Outcome::Failed
        }
    }
}
