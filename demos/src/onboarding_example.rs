use std::env;
use std::sync::Arc;

use dotenv::dotenv;
use sommelier_client::api::LoginRequest;
use sommelier_client::prelude::*;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    pretty_env_logger::init();

    let email = env::var("SOMMELIER_EMAIL").expect("SOMMELIER_EMAIL must be set");
    let password = env::var("SOMMELIER_PASSWORD").expect("SOMMELIER_PASSWORD must be set");
    let state_file = env::temp_dir().join("sommelier-demo-state.json");

    let store = Arc::new(FileStore::new(&state_file));
    let sommelier = Sommelier::new_with_options(store, ClientOptions::from_env()?);

    let mut screen = sommelier.start().await;
    println!("Resuming on screen: {}", screen);

    let mut screens = sommelier.app().subscribe();
    tokio::spawn(async move {
        while screens.changed().await.is_ok() {
            println!("  -> now showing {}", *screens.borrow_and_update());
        }
    });

    while screen != Screen::MainApp {
        screen = match screen {
            Screen::LanguageSelection => sommelier.select_language(Language::Fr).await,
            Screen::Intro => sommelier.app().dispatch(Event::IntroCompleted).await,
            Screen::Auth => {
                let request = LoginRequest {
                    email: email.clone(),
                    password: password.clone(),
                };
                match sommelier.sign_in(&request).await {
                    Ok(screen) => screen,
                    Err(e) => {
                        println!("Sign in failed: {}", e.user_message());
                        return Ok(());
                    }
                }
            }
            Screen::ProfileSetup => {
                sommelier
                    .save_profile("Ana", "Lopez", vec!["red".into(), "sparkling".into()])
                    .await?
            }
            Screen::WelcomeComplete => sommelier.app().dispatch(Event::WelcomeSeen).await,
            Screen::MainApp => screen,
        };
    }

    let t = sommelier.app().localizer();
    println!("{}: {}", t.t("language.title"), sommelier.app().language());
    println!("State saved to {}", state_file.display());

    // Run again with RESET=1 to start over
    if env::var("RESET").is_ok() {
        sommelier.app().dispatch(Event::Reset).await;
        println!("Session cleared");
    }

    Ok(())
}
