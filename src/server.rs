use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::*,
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde_json::{json, Value};

use crate::app::{BrowseQuery, RecipeVault};
use crate::client::{
    error::ApiError,
    types::{Difficulty, Ingredient, LoginCredentials, NewRecipe, RecipeUpdate, RegisterData},
};
use crate::guards::GuardRejection;

// Parameter structs for tools
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct BrowseRecipesParams {
    /// Case-insensitive title search; empty clears it
    #[serde(default)]
    pub search: Option<String>,
    /// EASY, MEDIUM or HARD; empty clears it
    #[serde(default)]
    pub difficulty: Option<String>,
    /// 1-5, 6-10 or 11+; empty clears it
    #[serde(default)]
    pub ingredient_count: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub refresh: Option<bool>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct RecipeIdParams {
    pub id: i64,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct IngredientParams {
    /// Quantity with optional unit, e.g. "1/2 cup"
    #[serde(default)]
    pub amount: Option<String>,
    pub name: String,
}

impl From<IngredientParams> for Ingredient {
    fn from(params: IngredientParams) -> Self {
        Ingredient::new(params.amount.unwrap_or_default(), params.name)
    }
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct CreateRecipeParams {
    pub title: String,
    pub difficulty: String,
    pub instructions: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<IngredientParams>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct UpdateRecipeParams {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Replaces the whole ingredient list when present
    #[serde(default)]
    pub ingredients: Option<Vec<IngredientParams>>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct LoginParams {
    pub username_or_email: String,
    pub password: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct RegisterParams {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct CheckUsernameParams {
    pub username: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct CheckEmailParams {
    pub email: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct UploadImageParams {
    /// Local path of the image file
    pub path: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct DeleteImageParams {
    pub image_url: String,
}

fn success(result: Value) -> CallToolResult {
    let text = serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string());
    CallToolResult::success(vec![Content::text(text)])
}

/// Error result carrying the redirect of a guard rejection or the status and field
/// errors of an API failure.
fn failure(what: &str, error: &anyhow::Error) -> CallToolResult {
    let mut body = json!({
        "error": what,
        "details": format!("{:#}", error),
        "success": false
    });

    if let Some(rejection) = error.downcast_ref::<GuardRejection>() {
        body["redirect"] = json!(rejection.redirect.to_string());
    }
    if let Some(api) = error.downcast_ref::<ApiError>() {
        body["status"] = json!(api.status);
        let fields = api.field_errors();
        if !fields.is_empty() {
            body["field_errors"] = json!(fields);
        }
    }

    CallToolResult::error(vec![Content::text(body.to_string())])
}

fn parse_difficulty(raw: &str) -> anyhow::Result<Difficulty> {
    raw.parse()
}

#[derive(Clone)]
pub struct RecipeVaultMcpServer {
    vault: Arc<RecipeVault>,
    tool_router: ToolRouter<RecipeVaultMcpServer>,
}

#[tool_router]
impl RecipeVaultMcpServer {
    pub fn new(vault: Arc<RecipeVault>) -> Self {
        Self {
            vault,
            tool_router: Self::tool_router(),
        }
    }

    pub fn vault(&self) -> &Arc<RecipeVault> {
        &self.vault
    }

    // Recipe tools
    #[tool(
        description = "Browse recipes with title search, difficulty and ingredient-count \
                       filters, one page at a time"
    )]
    async fn browse_recipes(
        &self,
        Parameters(params): Parameters<BrowseRecipesParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = BrowseQuery {
            search: params.search,
            difficulty: params.difficulty,
            ingredient_count: params.ingredient_count,
            page: params.page,
            page_size: params.page_size,
            refresh: params.refresh.unwrap_or(false),
        };

        match self.vault.browse(query).await {
            Ok(page) => {
                let filter = self.vault.filter();
                Ok(success(json!({
                    "recipes": page.recipes,
                    "page": page.page,
                    "page_size": page.page_size,
                    "total_pages": page.total_pages,
                    "total_filtered": page.total_filtered,
                    "total_recipes": page.total_recipes,
                    "filters": {
                        "search": filter.search_query,
                        "difficulty": filter.difficulty.map(|d| d.as_wire()),
                        "ingredient_count": filter.ingredient_bucket.map(|b| b.label())
                    }
                })))
            }
            Err(e) => Ok(failure("Failed to browse recipes", &e)),
        }
    }

    #[tool(
        description = "Clear the search, difficulty and ingredient-count filters and return \
                       to page 1"
    )]
    async fn reset_filters(&self) -> Result<CallToolResult, McpError> {
        let filter = self.vault.reset_filters();
        Ok(success(json!({
            "page": filter.current_page,
            "page_size": filter.page_size,
            "success": true,
            "message": "Filters reset"
        })))
    }

    #[tool(description = "Get a recipe with its instructions and ingredients")]
    async fn get_recipe(
        &self,
        Parameters(params): Parameters<RecipeIdParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.vault.recipe(params.id).await {
            Ok(Some(card)) => Ok(success(json!(card))),
            Ok(None) => Ok(CallToolResult::error(vec![Content::text(
                json!({
                    "error": "Recipe not found",
                    "id": params.id
                })
                .to_string(),
            )])),
            Err(e) => Ok(failure("Failed to get recipe", &e)),
        }
    }

    #[tool(description = "List the recipes created by the logged-in user")]
    async fn my_recipes(&self) -> Result<CallToolResult, McpError> {
        match self.vault.my_recipes().await {
            Ok(recipes) => Ok(success(json!({
                "total_count": recipes.len(),
                "recipes": recipes
            }))),
            Err(e) => Ok(failure("Failed to load your recipes", &e)),
        }
    }

    #[tool(description = "Create a new recipe; ingredients are given as amount and name")]
    async fn create_recipe(
        &self,
        Parameters(params): Parameters<CreateRecipeParams>,
    ) -> Result<CallToolResult, McpError> {
        let difficulty = match parse_difficulty(&params.difficulty) {
            Ok(difficulty) => difficulty,
            Err(e) => return Ok(failure("Failed to create recipe", &e)),
        };
        let data = NewRecipe {
            title: params.title,
            difficulty,
            instructions: params.instructions,
            image_url: params.image_url,
            creator_name: String::new(),
            ingredients: params.ingredients.into_iter().map(Ingredient::from).collect(),
        };

        match self.vault.create_recipe(data).await {
            Ok(recipe) => Ok(success(json!({
                "recipe": recipe,
                "success": true,
                "message": "Recipe created successfully"
            }))),
            Err(e) => Ok(failure("Failed to create recipe", &e)),
        }
    }

    #[tool(description = "Update fields of one of your recipes; omitted fields are left unchanged")]
    async fn update_recipe(
        &self,
        Parameters(params): Parameters<UpdateRecipeParams>,
    ) -> Result<CallToolResult, McpError> {
        let difficulty = match params.difficulty.as_deref().map(parse_difficulty).transpose() {
            Ok(difficulty) => difficulty,
            Err(e) => return Ok(failure("Failed to update recipe", &e)),
        };
        let update = RecipeUpdate {
            title: params.title,
            difficulty,
            instructions: params.instructions,
            image_url: params.image_url,
            creator_name: None,
            ingredients: params
                .ingredients
                .map(|list| list.into_iter().map(Ingredient::from).collect()),
        };

        match self.vault.update_recipe(params.id, update).await {
            Ok(recipe) => Ok(success(json!({
                "recipe": recipe,
                "success": true,
                "message": "Recipe updated successfully"
            }))),
            Err(e) => Ok(failure("Failed to update recipe", &e)),
        }
    }

    #[tool(description = "Delete one of your recipes")]
    async fn delete_recipe(
        &self,
        Parameters(params): Parameters<RecipeIdParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.vault.delete_recipe(params.id).await {
            Ok(true) => Ok(success(json!({
                "id": params.id,
                "success": true,
                "message": "Recipe deleted successfully"
            }))),
            Ok(false) => Ok(CallToolResult::error(vec![Content::text(
                json!({
                    "error": "Failed to delete recipe",
                    "id": params.id,
                    "success": false
                })
                .to_string(),
            )])),
            Err(e) => Ok(failure("Failed to delete recipe", &e)),
        }
    }

    // Session tools
    #[tool(description = "Log in with a username or email and password")]
    async fn login(
        &self,
        Parameters(params): Parameters<LoginParams>,
    ) -> Result<CallToolResult, McpError> {
        let credentials = LoginCredentials {
            username_or_email: params.username_or_email,
            password: params.password,
        };

        match self.vault.login(credentials).await {
            Ok(user) => Ok(success(json!({
                "user": user,
                "success": true,
                "message": format!("Welcome back, {}!", user.display_name())
            }))),
            Err(e) => Ok(failure("Login failed", &e)),
        }
    }

    #[tool(description = "Create a new account; log in afterwards to use it")]
    async fn register(
        &self,
        Parameters(params): Parameters<RegisterParams>,
    ) -> Result<CallToolResult, McpError> {
        let data = RegisterData {
            username: params.username,
            email: params.email,
            password: params.password,
            first_name: params.first_name,
            last_name: params.last_name,
        };

        match self.vault.register(data).await {
            Ok(user) => Ok(success(json!({
                "user": user,
                "success": true,
                "message": "Registration successful! Please log in."
            }))),
            Err(e) => Ok(failure("Registration failed", &e)),
        }
    }

    #[tool(description = "Log out and forget the stored session")]
    async fn logout(&self) -> Result<CallToolResult, McpError> {
        match self.vault.logout() {
            Ok(()) => Ok(success(json!({
                "success": true,
                "message": "Logged out successfully"
            }))),
            Err(e) => Ok(failure("Logout failed", &e)),
        }
    }

    #[tool(description = "Show whether a user is logged in and who it is")]
    async fn session_status(&self) -> Result<CallToolResult, McpError> {
        let session = self.vault.session();
        Ok(success(json!({
            "state": format!("{:?}", session.state()),
            "authenticated": session.is_authenticated(),
            "user": session.current_user(),
            "display_name": session.display_name(),
            "initials": session.initials()
        })))
    }

    #[tool(description = "Check whether a username is still available")]
    async fn check_username(
        &self,
        Parameters(params): Parameters<CheckUsernameParams>,
    ) -> Result<CallToolResult, McpError> {
        let available = self.vault.session().username_available(&params.username).await;
        Ok(success(json!({
            "username": params.username,
            "available": available
        })))
    }

    #[tool(description = "Check whether an email address is still available")]
    async fn check_email(
        &self,
        Parameters(params): Parameters<CheckEmailParams>,
    ) -> Result<CallToolResult, McpError> {
        let available = self.vault.session().email_available(&params.email).await;
        Ok(success(json!({
            "email": params.email,
            "available": available
        })))
    }

    // Image tools
    #[tool(description = "Upload a local image file and return its URL for use in a recipe")]
    async fn upload_image(
        &self,
        Parameters(params): Parameters<UploadImageParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = PathBuf::from(&params.path);
        match self.vault.upload_image(&path).await {
            Ok(image_url) => Ok(success(json!({
                "image_url": image_url,
                "success": true,
                "message": "Image uploaded successfully"
            }))),
            Err(e) => Ok(failure("Failed to upload image", &e)),
        }
    }

    #[tool(description = "Delete a previously uploaded image")]
    async fn delete_image(
        &self,
        Parameters(params): Parameters<DeleteImageParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.vault.delete_image(&params.image_url).await {
            Ok(()) => Ok(success(json!({
                "image_url": params.image_url,
                "success": true,
                "message": "Image deleted successfully"
            }))),
            Err(e) => Ok(failure("Failed to delete image", &e)),
        }
    }
}

#[tool_handler]
impl ServerHandler for RecipeVaultMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "This server provides tools for the Recipe Vault recipe collection. \
                 Browse and filter recipes without an account; log in to create, edit \
                 and delete your own recipes and to upload recipe images."
                    .to_string(),
            ),
        }
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        Ok(self.get_info())
    }
}
