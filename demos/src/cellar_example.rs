use std::env;
use std::sync::Arc;

use dotenv::dotenv;
use sommelier_client::api::WineDescriptionRequest;
use sommelier_client::prelude::*;
use sommelier_client::storage::{keys, set_json};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    pretty_env_logger::init();

    let token = env::var("SOMMELIER_TOKEN").expect("SOMMELIER_TOKEN must be set");

    let store = Arc::new(MemoryStore::new());
    set_json(store.as_ref(), keys::AUTH_TOKEN, &token).await?;
    let client = SommelierClient::new_with_options(store, ClientOptions::from_env()?);

    let mut cellar = Cellar::new();
    cellar.refresh(&client).await?;
    println!("Cellar has {} wines", cellar.len());

    let mut wine = NewWine::new("Demo Chablis", "William Fèvre", 2020);
    wine.wine_type = Some(WineType::White);
    let id = cellar.add(&client, wine).await?.id.clone();
    println!("Added wine {}", id);

    let update = WineUpdate {
        notes: Some(format!("Tasted during demo run {}", uuid::Uuid::new_v4())),
        rating: Some(4.0),
        ..Default::default()
    };
    cellar.update(&client, &id, update).await?;

    let t = Localizer::new(client.language().await);
    for sort in SortBy::ALL {
        println!("\n{}:", t.t(sort.label_key()));
        for wine in cellar.view("", sort) {
            println!("  {} {} ({})", wine.year, wine.name, wine.producer);
        }
    }
    if let Some((oldest, newest)) = cellar.vintage_range() {
        println!("\nVintages from {} to {}", oldest, newest);
    }

    // Descriptions are paced through the request queue
    let requests: Vec<WineDescriptionRequest> = cellar.wines().iter().take(3).map(Into::into).collect();
    for request in &requests {
        match client.generate_wine_description(request, None).await {
            Ok(reply) => println!("\n{}: {}", request.name, reply.text().unwrap_or("-")),
            Err(e) => println!("\n{}: {}", request.name, e.user_message()),
        }
    }

    cellar.delete(&client, &id).await?;
    println!("\nRemoved wine {}", id);

    Ok(())
}
