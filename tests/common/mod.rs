#![allow(dead_code)]

use std::sync::Arc;

use recipe_vault_mcp::session::storage::{TOKEN_KEY, USER_KEY};
use recipe_vault_mcp::session::{MemorySessionStorage, SessionStorage};
use recipe_vault_mcp::{RecipeVault, VaultConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token-0123456789";
pub const USER_ID: &str = "3f2c1e5a-0000-4000-8000-000000000001";

pub struct TestEnvironment {
    pub server: MockServer,
    pub storage: Arc<MemorySessionStorage>,
    pub vault: RecipeVault,
}

impl TestEnvironment {
    /// A vault pointed at a fresh mock API, with nothing stored.
    pub async fn new() -> Self {
        Self::with_storage(Arc::new(MemorySessionStorage::new())).await
    }

    pub async fn with_storage(storage: Arc<MemorySessionStorage>) -> Self {
        Self::build(storage, |_| {}).await
    }

    /// A vault whose configuration is adjusted by `configure` before it is built.
    pub async fn with_config(configure: impl FnOnce(&mut VaultConfig)) -> Self {
        Self::build(Arc::new(MemorySessionStorage::new()), configure).await
    }

    async fn build(
        storage: Arc<MemorySessionStorage>,
        configure: impl FnOnce(&mut VaultConfig),
    ) -> Self {
        init_test_logging();
        let server = MockServer::start().await;
        let mut config = VaultConfig::with_base_url(format!("{}/api", server.uri()));
        configure(&mut config);
        let vault = RecipeVault::new(config, storage.clone() as Arc<dyn SessionStorage>)
            .expect("Failed to build vault");

        Self {
            server,
            storage,
            vault,
        }
    }

    /// Mount a successful login for the default user and log in through the vault.
    pub async fn logged_in() -> Self {
        let env = Self::new().await;
        env.mount_login().await;
        env.vault
            .login(recipe_vault_mcp::client::LoginCredentials {
                username_or_email: "ada".to_string(),
                password: "secret".to_string(),
            })
            .await
            .expect("Login should succeed");
        env
    }

    pub async fn mount_login(&self) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_response()))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_recipes(&self, recipes: Value) {
        Mock::given(method("GET"))
            .and(path("/api/recipes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(recipes))
            .mount(&self.server)
            .await;
    }

    pub fn stored_token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).expect("memory storage never fails")
    }

    pub fn stored_user(&self) -> Option<String> {
        self.storage.get(USER_KEY).expect("memory storage never fails")
    }
}

pub fn user_json() -> Value {
    json!({
        "id": USER_ID,
        "username": "ada",
        "email": "ada@example.com",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "role": "USER",
        "createdDate": "2025-05-01T09:00:00"
    })
}

pub fn auth_response() -> Value {
    json!({
        "token": TOKEN,
        "type": "Bearer",
        "user": user_json()
    })
}

pub fn summary_json(
    id: i64,
    title: &str,
    difficulty: &str,
    ingredient_count: usize,
    user_id: Option<&str>,
) -> Value {
    json!({
        "id": id,
        "title": title,
        "difficulty": difficulty,
        "imageUrl": format!("https://picsum.photos/400/250?random={}", 1011),
        "creatorName": if user_id == Some(USER_ID) { "Ada Lovelace" } else { "Grace Hopper" },
        "createdDate": "2025-05-23T00:06:06.22185",
        "userId": user_id,
        "ingredientCount": ingredient_count
    })
}

pub fn detail_json(id: i64, title: &str, user_id: Option<&str>, ingredients: &[&str]) -> Value {
    json!({
        "id": id,
        "title": title,
        "difficulty": "MEDIUM",
        "instructions": "Mix everything.",
        "imageUrl": "https://cdn.example.com/dish.png",
        "creatorName": if user_id == Some(USER_ID) { "Ada Lovelace" } else { "Grace Hopper" },
        "createdDate": "2025-05-23T00:06:06.22185",
        "userId": user_id,
        "ingredients": ingredients
            .iter()
            .enumerate()
            .map(|(i, name)| json!({ "id": i + 1, "ingredientName": name }))
            .collect::<Vec<_>>()
    })
}

/// Twelve summaries: difficulties cycle EASY/MEDIUM/HARD and ingredient counts 2/7/13.
pub fn twelve_summaries() -> Value {
    let difficulties = ["EASY", "MEDIUM", "HARD"];
    let counts = [2, 7, 13];
    Value::Array(
        (0..12)
            .map(|i| {
                summary_json(
                    i as i64 + 1,
                    &format!("Recipe {}", i + 1),
                    difficulties[i % 3],
                    counts[i % 3],
                    None,
                )
            })
            .collect(),
    )
}

pub fn init_test_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}
