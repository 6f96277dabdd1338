use std::env;
use std::sync::Arc;

use dotenv::dotenv;
use sommelier_client::prelude::*;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    pretty_env_logger::init();

    let language = env::var("SOMMELIER_LANGUAGE")
        .ok()
        .and_then(|code| Language::from_code(&code))
        .unwrap_or_default();

    let options = ClientOptions::from_env()?.with_default_language(language);
    let client = SommelierClient::new_with_options(Arc::new(MemoryStore::new()), options);
    let mut session = ChatSession::new(Localizer::new(language));

    for question in ["What should I pair with duck confit?", "And something cheaper?"] {
        println!("> {}", question);
        match session.send(&client, question).await {
            Ok(Some(reply)) => println!("{}\n", reply.text),
            Ok(None) => {}
            Err(e) => println!("[{}]\n", e.user_message()),
        }
    }

    let reply = client.wine_pairing("grilled salmon", None, &[]).await?;
    println!("Pairing: {}", reply.text().unwrap_or("-"));
    for wine in reply.recommendations() {
        println!("  - {}", wine.name);
    }

    println!("\n{} messages in this session", session.messages().len());
    Ok(())
}
