//! Demo catalog inserted on start-up when `CRAFTSHOP_SEED` is enabled.

use tracing::info;

use crate::model::{Filters, Product, Repositories, Seller, StoreError, SELLER_SORT_SAFELIST};

fn demo_sellers() -> Vec<Seller> {
    [
        ("Green Threads", "shop@greenthreads.example", "Almaty"),
        ("Clay & Co", "hello@clay.example", "Astana"),
    ]
    .into_iter()
    .map(|(name, email, location)| Seller {
        name: name.to_string(),
        email: email.to_string(),
        password: "changeme".to_string(),
        location: location.to_string(),
        ..Default::default()
    })
    .collect()
}

fn demo_products(seller_ids: &[i32]) -> Vec<Product> {
    vec![
        Product {
            seller_id: seller_ids[0],
            name: "Organic Cotton T-Shirt".to_string(),
            description: "Sustainably sourced cotton t-shirt".to_string(),
            price: 25.99,
            category: "Clothing".to_string(),
            materials_used: "Organic Cotton".to_string(),
            shipping_details: "Standard Shipping".to_string(),
            ..Default::default()
        },
        Product {
            seller_id: seller_ids[1],
            name: "Handmade Ceramic Plant Pot".to_string(),
            description: "Artisan crafted ceramic plant pot".to_string(),
            price: 19.99,
            category: "Home Decor".to_string(),
            materials_used: "Ceramic".to_string(),
            shipping_details: "Free Shipping".to_string(),
            ..Default::default()
        },
    ]
}

/// Inserts the demo catalog unless a seller is already stored.
/// Returns whether anything was written.
pub async fn populate_database(repos: &Repositories) -> Result<bool, StoreError> {
    let probe = Filters::builder()
        .page_size(1)
        .sort("id")
        .sort_safelist(SELLER_SORT_SAFELIST)
        .build();
    let (_, metadata) = repos.sellers.get_all(None, &probe).await?;
    if metadata.total_records > 0 {
        info!("Database already holds sellers, skipping demo data");
        return Ok(false);
    }

    let mut seller_ids = Vec::new();
    for mut seller in demo_sellers() {
        repos.sellers.insert(&mut seller).await?;
        seller_ids.push(seller.id);
    }
    for mut product in demo_products(&seller_ids) {
        repos.products.insert(&mut product).await?;
    }
    info!("Inserted demo data for {} sellers", seller_ids.len());
    Ok(true)
}
