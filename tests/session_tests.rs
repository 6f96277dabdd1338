#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use sommelier_client::api::LoginRequest;
    use sommelier_client::prelude::*;
    use sommelier_client::storage::keys;
    use tempfile::tempdir;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options(server: &MockServer) -> ClientOptions {
        ClientOptions::default().with_base_url(&server.uri()).unwrap()
    }

    fn login() -> LoginRequest {
        LoginRequest {
            email: "ana@example.com".into(),
            password: "secret".into(),
        }
    }

    async fn mount_auth(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "jwt-123",
                "user": { "id": "u1", "email": "ana@example.com" }
            })))
            .mount(server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/auth/profile"))
            .and(body_partial_json(json!({
                "firstName": "Ana",
                "lastName": "Lopez",
                "winePreferences": ["red", "sparkling"],
                "profileCompleted": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Profile updated" })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_full_onboarding_survives_restart() {
        let server = MockServer::start().await;
        mount_auth(&server).await;
        let dir = tempdir().unwrap();
        let file = dir.path().join("state.json");

        {
            let sommelier = Sommelier::new_with_options(Arc::new(FileStore::new(&file)), options(&server));
            assert_eq!(sommelier.start().await, Screen::LanguageSelection);
            assert_eq!(sommelier.select_language(Language::Fr).await, Screen::Intro);
            assert_eq!(sommelier.app().dispatch(Event::IntroCompleted).await, Screen::Auth);
            assert_eq!(sommelier.sign_in(&login()).await.unwrap(), Screen::ProfileSetup);
            assert_eq!(
                sommelier
                    .save_profile(" Ana ", "Lopez", vec!["red".into(), "sparkling".into()])
                    .await
                    .unwrap(),
                Screen::WelcomeComplete
            );
            assert_eq!(sommelier.app().dispatch(Event::WelcomeSeen).await, Screen::MainApp);
        }

        let restarted = Sommelier::new_with_options(Arc::new(FileStore::new(&file)), options(&server));
        assert_eq!(restarted.start().await, Screen::MainApp);
        assert_eq!(restarted.app().language(), Language::Fr);
        assert_eq!(restarted.client().token().await.as_deref(), Some("jwt-123"));
        assert_eq!(restarted.app().user().unwrap().first_name.as_deref(), Some("Ana"));
        assert!(restarted.app().user().unwrap().has_complete_profile());
    }

    #[tokio::test]
    async fn test_sign_out_returns_to_auth() {
        let server = MockServer::start().await;
        mount_auth(&server).await;
        let store = Arc::new(MemoryStore::new());
        let sommelier = Sommelier::new_with_options(store.clone(), options(&server));

        sommelier.start().await;
        sommelier.select_language(Language::En).await;
        sommelier.sign_in(&login()).await.unwrap();

        assert_eq!(sommelier.sign_out().await, Screen::Auth);
        assert_eq!(store.get_item(keys::AUTH_TOKEN).await.unwrap(), None);
        assert_eq!(sommelier.client().token().await, None);
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_auth_screen() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid credentials" })))
            .mount(&server)
            .await;
        let sommelier = Sommelier::new_with_options(Arc::new(MemoryStore::new()), options(&server));

        sommelier.start().await;
        sommelier.select_language(Language::En).await;
        sommelier.app().dispatch(Event::IntroCompleted).await;

        let err = sommelier.sign_in(&login()).await.unwrap_err();
        assert_eq!(err.user_message(), "Invalid credentials");
        assert_eq!(sommelier.app().screen(), Screen::Auth);
    }

    #[tokio::test]
    async fn test_save_profile_requires_user() {
        let server = MockServer::start().await;
        let sommelier = Sommelier::new_with_options(Arc::new(MemoryStore::new()), options(&server));
        sommelier.start().await;

        assert!(sommelier.save_profile("Ana", "Lopez", vec!["red".into()]).await.is_err());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_session_appends_reply_and_fallbacks() {
        let server = MockServer::start().await;
        let client = SommelierClient::new_with_options(Arc::new(MemoryStore::new()), options(&server));

        Mock::given(method("POST"))
            .and(path("/ai/chat"))
            .and(body_partial_json(json!({ "message": "What goes with salmon?" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "Try a Pinot Noir." })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/ai/chat"))
            .and(body_partial_json(json!({ "message": "And dessert?" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "  " })))
            .mount(&server)
            .await;

        let mut session = ChatSession::new(Localizer::new(Language::En));
        let reply = session.send(&client, "What goes with salmon?").await.unwrap().unwrap().clone();
        assert_eq!(reply.text, "Try a Pinot Noir.");
        assert!(!reply.is_user);

        let reply = session.send(&client, "And dessert?").await.unwrap().unwrap().clone();
        assert_eq!(reply.text, session.localizer().t("chat.fallback"));
        assert_eq!(session.messages().len(), 5);

        let requests = server.received_requests().await.unwrap();
        let second: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
        let history = second["conversationHistory"].as_array().unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0]["role"], "assistant");
        assert_eq!(history[1]["role"], "user");
        assert_eq!(history[2]["content"], "Try a Pinot Noir.");
    }

    #[tokio::test]
    async fn test_chat_session_connection_error() {
        let server = MockServer::start().await;
        let client = SommelierClient::new_with_options(Arc::new(MemoryStore::new()), options(&server));

        Mock::given(method("POST"))
            .and(path("/ai/chat"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut session = ChatSession::new(Localizer::new(Language::Fr));
        assert!(session.send(&client, "Un conseil ?").await.is_err());

        let last = session.messages().last().unwrap();
        assert!(!last.is_user);
        assert_eq!(last.text, Localizer::new(Language::Fr).t("chat.connectionError"));
        assert_eq!(session.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_cellar_tracks_server_changes() {
        let server = MockServer::start().await;
        let client = SommelierClient::new_with_options(Arc::new(MemoryStore::new()), options(&server));

        Mock::given(method("GET"))
            .and(path("/wines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "wines": [
                { "id": "w1", "name": "Margaux", "producer": "Château Margaux", "year": 2015, "type": "red" }
            ] })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/wines"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/wines/w1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "w1" })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/wines/w1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "deleted" })))
            .mount(&server)
            .await;

        let mut cellar = Cellar::new();
        cellar.refresh(&client).await.unwrap();
        assert_eq!(cellar.len(), 1);

        let added = cellar
            .add(&client, NewWine::new(" Chablis ", "William Fèvre", 2020))
            .await
            .unwrap();
        assert_eq!(added.name, "Chablis");
        assert!(!added.id.is_empty());
        assert!(added.added_date.is_some());
        assert_eq!(cellar.wines()[0].name, "Chablis");

        let update = WineUpdate {
            notes: Some("Cassis and cedar".into()),
            ..Default::default()
        };
        cellar.update(&client, "w1", update).await.unwrap();
        assert_eq!(cellar.get("w1").unwrap().notes.as_deref(), Some("Cassis and cedar"));

        cellar.delete(&client, "w1").await.unwrap();
        assert!(cellar.get("w1").is_none());
        assert_eq!(cellar.vintage_range(), Some((2020, 2020)));

        assert!(cellar.add(&client, NewWine::new("", "Nobody", 2020)).await.is_err());
        let posts = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.method.to_string() == "POST")
            .count();
        assert_eq!(posts, 1);
    }
}
