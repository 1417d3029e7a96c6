mod common;

use std::sync::Arc;

use common::{TestEnvironment, TOKEN, USER_ID};
use pretty_assertions::assert_eq;
use recipe_vault_mcp::client::{LoginCredentials, RegisterData};
use recipe_vault_mcp::guards::Redirect;
use recipe_vault_mcp::guards::GuardRejection;
use recipe_vault_mcp::session::storage::{TOKEN_KEY, USER_KEY};
use recipe_vault_mcp::session::{
    FileSessionStorage, MemorySessionStorage, SessionState, SessionStorage,
};
use recipe_vault_mcp::{RecipeVault, VaultConfig};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> LoginCredentials {
    LoginCredentials {
        username_or_email: "ada".to_string(),
        password: "secret".to_string(),
    }
}

#[tokio::test]
async fn test_login_persists_session_and_authorizes_requests() {
    let env = TestEnvironment::new().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "usernameOrEmail": "ada", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::auth_response()))
        .expect(1)
        .mount(&env.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/recipes/my-recipes"))
        .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&env.server)
        .await;

    let user = env.vault.login(credentials()).await.expect("Login should succeed");
    assert_eq!(user.id, USER_ID);
    assert_eq!(env.vault.session().state(), SessionState::Authenticated);
    assert_eq!(env.vault.session().display_name(), "Ada Lovelace");
    assert_eq!(env.vault.session().initials(), "AL");

    assert_eq!(env.stored_token().as_deref(), Some(TOKEN));
    let stored_user: serde_json::Value = serde_json::from_str(&env.stored_user().unwrap()).unwrap();
    assert_eq!(stored_user["id"], USER_ID);

    let mine = env.vault.my_recipes().await.expect("Authorized request should succeed");
    assert!(mine.is_empty());
}

#[tokio::test]
async fn test_login_failure_leaves_session_anonymous() {
    let env = TestEnvironment::new().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&env.server)
        .await;

    let error = env.vault.login(credentials()).await.unwrap_err();
    assert!(error.to_string().contains("Invalid credentials"));

    assert_eq!(env.vault.session().state(), SessionState::Anonymous);
    assert!(env.vault.session().current_user().is_none());
    assert!(env.stored_token().is_none());
    assert!(env.stored_user().is_none());
}

#[tokio::test]
async fn test_logout_clears_memory_and_storage() {
    let env = TestEnvironment::logged_in().await;
    assert!(env.stored_token().is_some());

    env.vault.logout().expect("Logout should succeed while logged in");

    assert_eq!(env.vault.session().state(), SessionState::Anonymous);
    assert!(env.stored_token().is_none());
    assert!(env.stored_user().is_none());

    // Logging out twice is rejected by the guard.
    let error = env.vault.logout().unwrap_err();
    let rejection = error.downcast_ref::<GuardRejection>().unwrap();
    assert_eq!(rejection.message, "Please log in to access this page");
}

#[tokio::test]
async fn test_guest_only_operations_reject_logged_in_users() {
    let env = TestEnvironment::logged_in().await;

    let error = env.vault.login(credentials()).await.unwrap_err();
    let rejection = error.downcast_ref::<GuardRejection>().unwrap();
    assert_eq!(rejection.message, "You are already logged in");
    assert_eq!(rejection.redirect, Redirect::Home);

    // The rejected call must not have touched the session.
    assert_eq!(env.vault.session().state(), SessionState::Authenticated);
}

#[tokio::test]
async fn test_restore_adopts_valid_session() {
    let storage = Arc::new(MemorySessionStorage::new());
    storage.set(TOKEN_KEY, TOKEN).unwrap();
    storage.set(USER_KEY, &common::user_json().to_string()).unwrap();

    let env = TestEnvironment::with_storage(storage).await;
    assert!(env.vault.session().restore());
    assert_eq!(env.vault.session().state(), SessionState::Authenticated);
    assert_eq!(env.vault.session().current_user().unwrap().username, "ada");
}

#[tokio::test]
async fn test_restore_discards_malformed_user() {
    let storage = Arc::new(MemorySessionStorage::new());
    storage.set(TOKEN_KEY, TOKEN).unwrap();
    storage.set(USER_KEY, "{not json").unwrap();

    let env = TestEnvironment::with_storage(storage).await;
    assert!(!env.vault.session().restore());
    assert_eq!(env.vault.session().state(), SessionState::Anonymous);
    assert!(env.stored_token().is_none());
    assert!(env.stored_user().is_none());
}

#[tokio::test]
async fn test_restore_discards_token_without_user() {
    let storage = Arc::new(MemorySessionStorage::new());
    storage.set(TOKEN_KEY, TOKEN).unwrap();

    let env = TestEnvironment::with_storage(storage).await;
    assert!(!env.vault.session().restore());
    assert!(env.stored_token().is_none());
}

#[test_log::test(tokio::test)]
async fn test_unauthorized_response_forces_logout() {
    let env = TestEnvironment::logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/recipes/my-recipes"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&env.server)
        .await;

    let error = env.vault.my_recipes().await.unwrap_err();
    assert!(error.to_string().contains("Unauthorized"));

    assert_eq!(env.vault.session().state(), SessionState::Anonymous);
    assert!(env.stored_token().is_none());
    assert!(env.stored_user().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_file_session_written_and_cleared_from_async_paths() {
    common::init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::auth_response()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/recipes"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = VaultConfig::with_base_url(format!("{}/api", server.uri()));
    let vault = RecipeVault::new(config, Arc::new(FileSessionStorage::new(&file))).unwrap();
    let on_disk = FileSessionStorage::new(&file);

    vault.login(credentials()).await.expect("Login should succeed");
    assert_eq!(on_disk.get(TOKEN_KEY).unwrap().as_deref(), Some(TOKEN));
    assert!(on_disk.get(USER_KEY).unwrap().is_some());

    let error = vault.store().fetch_recipes().await.unwrap_err();
    assert_eq!(error.status, Some(401));
    assert_eq!(vault.session().state(), SessionState::Anonymous);
    assert!(on_disk.get(TOKEN_KEY).unwrap().is_none());
    assert!(on_disk.get(USER_KEY).unwrap().is_none());
}

#[tokio::test]
async fn test_register_does_not_log_in() {
    let env = TestEnvironment::new().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(common::user_json()))
        .expect(1)
        .mount(&env.server)
        .await;

    let user = env
        .vault
        .register(RegisterData {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        })
        .await
        .expect("Registration should succeed");

    assert_eq!(user.username, "ada");
    assert_eq!(env.vault.session().state(), SessionState::Anonymous);
    assert!(env.stored_token().is_none());
}

#[tokio::test]
async fn test_register_reports_field_errors() {
    let env = TestEnvironment::new().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Validation failed",
            "errors": { "email": "Email is already in use" }
        })))
        .mount(&env.server)
        .await;

    let error = env
        .vault
        .register(RegisterData {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        })
        .await
        .unwrap_err();

    let api = error.downcast_ref::<recipe_vault_mcp::client::ApiError>().unwrap();
    assert_eq!(api.status, Some(400));
    assert_eq!(api.message, "Validation failed");
    assert_eq!(
        api.field_errors().get("email").map(String::as_str),
        Some("Email is already in use")
    );
}

#[tokio::test]
async fn test_availability_checks() {
    let env = TestEnvironment::new().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/check-username"))
        .and(query_param("username", "ada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .mount(&env.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/check-username"))
        .and(query_param("username", "newcomer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(false)))
        .mount(&env.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/check-email"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&env.server)
        .await;

    assert!(!env.vault.session().username_available("ada").await);
    assert!(env.vault.session().username_available("newcomer").await);
    // A failing check reads as unavailable.
    assert!(!env.vault.session().email_available("ada@example.com").await);
}
