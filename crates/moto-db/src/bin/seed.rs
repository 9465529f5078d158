//! # Seed Data Generator
//!
//! Populates the database with motorcycle parts for development.
//!
//! ```bash
//! cargo run -p moto-db --bin seed
//! cargo run -p moto-db --bin seed -- --count 2000 --db ./data/motopos.db
//! ```
//!
//! Parts are spread over every brand and these master categories:
//! - Pengereman (brake pads, brake fluid, discs)
//! - Kelistrikan (spark plugs, batteries, bulbs)
//! - Mesin (oil, filters, gaskets)
//! - Transmisi (chains, sprockets, clutch plates)
//! - Kaki-kaki (shocks, bearings, tyres)
//!
//! Per product:
//! - SKU: `{BRAND PREFIX}-{CATEGORY CODE}-{INDEX}`
//! - Sell price: Rp10.000 - Rp250.000, rounded to Rp500
//! - Buy price: 60-85% of sell price, zero for every 7th product
//! - Stock: 0 - 60

use std::env;

use moto_core::catalog::NewProduct;
use moto_core::ids::generate_product_id;
use moto_core::Brand;
use moto_db::{Database, DbConfig};

/// (master category, category code, category, part names)
type CatalogEntry = (&'static str, &'static str, &'static str, &'static [&'static str]);

const CATALOG: &[CatalogEntry] = &[
    (
        "Pengereman",
        "REM",
        "Rem",
        &[
            "Kampas Rem Depan",
            "Kampas Rem Belakang",
            "Minyak Rem DOT 3",
            "Piringan Cakram",
            "Master Rem Atas",
            "Kabel Rem Belakang",
        ],
    ),
    (
        "Kelistrikan",
        "LST",
        "Kelistrikan",
        &[
            "Busi Standar",
            "Busi Iridium",
            "Aki Kering 12V",
            "Bohlam Lampu Depan",
            "Sekring 10A",
            "Relay Starter",
        ],
    ),
    (
        "Mesin",
        "MSN",
        "Mesin",
        &[
            "Oli Mesin 0.8L",
            "Oli Mesin 1L",
            "Filter Oli",
            "Filter Udara",
            "Paking Blok",
            "Piston Kit",
        ],
    ),
    (
        "Transmisi",
        "TRM",
        "Transmisi",
        &[
            "Rantai 428",
            "Gear Set",
            "Kampas Kopling",
            "Per Kopling",
            "V-Belt",
            "Roller CVT",
        ],
    ),
    (
        "Kaki-kaki",
        "KKI",
        "Kaki-kaki",
        &[
            "Shock Belakang",
            "Bearing Roda",
            "Ban Luar 80/90-17",
            "Ban Dalam 17",
            "Seal Shock Depan",
            "Jari-jari Roda",
        ],
    ),
];

/// Model families appended to names so each brand gets distinct parts.
const MODELS: &[(Brand, &[&str])] = &[
    (Brand::Honda, &["Beat", "Vario 125", "Supra X", "CB150R"]),
    (Brand::Yamaha, &["Mio", "NMAX", "Jupiter Z", "Vixion"]),
    (Brand::Kawasaki, &["Ninja 250", "KLX 150", "W175", "Athlete"]),
    (Brand::Suzuki, &["Satria F150", "Nex II", "Smash", "GSX-R150"]),
];

const USAGE: &str = "\
Usage: seed [--count N] [--db PATH]

  -c, --count <N>    products to generate (default: 400)
  -d, --db <PATH>    database file (default: ./motopos.db)";

struct SeedArgs {
    count: usize,
    db_path: String,
}

/// `None` when help was requested.
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<SeedArgs>, String> {
    let mut parsed = SeedArgs {
        count: 400,
        db_path: "./motopos.db".to_string(),
    };

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "-c" | "--count" => {
                let raw = args.next().ok_or("--count needs a value")?;
                parsed.count = raw
                    .parse()
                    .map_err(|_| format!("--count: '{}' is not a number", raw))?;
            }
            "-d" | "--db" => parsed.db_path = args.next().ok_or("--db needs a path")?,
            "-h" | "--help" => return Ok(None),
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(Some(parsed))
}

/// Every (category, brand, model, part) combination, category-major, so a
/// small `--count` still covers all brands.
fn combinations() -> impl Iterator<Item = (&'static CatalogEntry, Brand, &'static str, &'static str)> {
    CATALOG.iter().flat_map(|category| {
        MODELS.iter().flat_map(move |(brand, models)| {
            models.iter().flat_map(move |model| {
                category.3.iter().map(move |part| (category, *brand, *model, *part))
            })
        })
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = match parse_args(env::args().skip(1))? {
        Some(args) => args,
        None => {
            println!("{}", USAGE);
            return Ok(());
        }
    };

    let db = Database::new(DbConfig::new(&args.db_path)).await?;
    let repo = db.products();

    let existing = repo.count().await?;
    if existing > 0 {
        println!(
            "{} already holds {} products, nothing seeded (delete the file to start over)",
            args.db_path, existing
        );
        return Ok(());
    }

    println!("Seeding {} parts into {}", args.count, args.db_path);
    let started = std::time::Instant::now();

    let mut inserted = 0usize;
    let mut failed = 0usize;
    for (seed, (category, brand, model, part)) in combinations().take(args.count).enumerate() {
        let product = generate_product(category, brand, model, part, seed);
        match repo.insert(&product).await {
            Ok(_) => inserted += 1,
            Err(e) => {
                failed += 1;
                eprintln!("  {} skipped: {}", product.sku, e);
            }
        }
    }

    println!(
        "Inserted {} parts ({} failed) in {:.1?}",
        inserted,
        failed,
        started.elapsed()
    );
    for brand in Brand::ALL {
        println!("  {:<9} {} categories", brand.to_string(), repo.categories(brand).await?.len());
    }

    db.close().await;
    Ok(())
}

/// Generates a single part with plausible prices and stock.
fn generate_product(
    category: &CatalogEntry,
    brand: Brand,
    model: &str,
    part: &str,
    seed: usize,
) -> NewProduct {
    let (master_category, code, category_name, _) = *category;

    // Rp10.000 - Rp250.000 in Rp500 steps
    let sell_price = 10_000 + ((seed * 7_919) % 481) as i64 * 500;

    // Buy price unknown for every 7th part, otherwise 60-84% of sell price
    let buy_price = if seed % 7 == 0 {
        0
    } else {
        sell_price * (60 + (seed % 25) as i64) / 100 / 100 * 100
    };

    NewProduct {
        id: generate_product_id(),
        name: format!("{} {}", part, model),
        brand,
        category: category_name.to_string(),
        master_category: master_category.to_string(),
        sku: format!("{}-{}-{:04}", brand.sku_prefix(), code, seed),
        buy_price,
        sell_price,
        stock: (seed % 61) as i64,
        image_url: None,
    }
}
