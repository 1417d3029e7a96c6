//! The application context.
//!
//! [`RecipeVault`] owns everything one client instance needs: the session, the recipe
//! store, the browse filters and the image transport. The MCP server holds it behind an
//! `Arc`; tests drive it directly.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::client::{
    types::{LoginCredentials, NewRecipe, Recipe, RecipeUpdate, RegisterData, User},
    AuthService, ImageService, RecipeService, RecipeVaultClient,
};
use crate::config::VaultConfig;
use crate::filter::{
    paginate, parse_bucket_filter, parse_difficulty_filter, total_pages, RecipeFilter,
};
use crate::guards::{self, Access, GuardRejection};
use crate::session::{SessionHandle, SessionManager, SessionStorage};
use crate::store::RecipeStore;

const MAX_TITLE_LENGTH: usize = 255;

#[derive(Debug)]
struct UiState {
    filter: RecipeFilter,
    /// Whether the store currently holds the full recipe list
    loaded: bool,
}

/// Changes to apply before listing a page. `None` leaves a setting as it is; an empty
/// string clears a filter.
#[derive(Debug, Clone, Default)]
pub struct BrowseQuery {
    pub search: Option<String>,
    pub difficulty: Option<String>,
    pub ingredient_count: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    /// Refetch the list even if it was loaded before
    pub refresh: bool,
}

/// A recipe as presented to the caller, with its owner label.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeCard {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub owner: String,
    pub can_modify: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipePage {
    pub recipes: Vec<RecipeCard>,
    pub page: usize,
    pub page_size: usize,
    pub total_filtered: usize,
    pub total_pages: usize,
    pub total_recipes: usize,
}

pub struct RecipeVault {
    config: VaultConfig,
    session: SessionManager,
    store: RecipeStore,
    images: ImageService,
    ui: Mutex<UiState>,
}

impl RecipeVault {
    pub fn new(config: VaultConfig, storage: Arc<dyn SessionStorage>) -> Result<Self> {
        let handle = SessionHandle::new(storage);
        let client = RecipeVaultClient::new(&config, handle.clone())
            .context("Failed to build the Recipe Vault HTTP client")?;

        Ok(Self {
            session: SessionManager::new(handle, AuthService::new(client.clone())),
            store: RecipeStore::new(RecipeService::new(client.clone())),
            images: ImageService::new(client),
            ui: Mutex::new(UiState {
                filter: RecipeFilter::with_page_size(config.page_size),
                loaded: false,
            }),
            config,
        })
    }

    fn ui(&self) -> MutexGuard<'_, UiState> {
        self.ui.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn store(&self) -> &RecipeStore {
        &self.store
    }

    pub fn images(&self) -> &ImageService {
        &self.images
    }

    pub fn guard(&self, access: Access, destination: &str) -> Result<(), GuardRejection> {
        guards::check_access(access, self.session.is_authenticated(), destination)
    }

    pub async fn login(&self, credentials: LoginCredentials) -> Result<User> {
        self.guard(Access::RequiresGuest, "/login")?;
        Ok(self.session.login(credentials).await?)
    }

    /// Create an account. The caller still has to log in afterwards.
    pub async fn register(&self, data: RegisterData) -> Result<User> {
        self.guard(Access::RequiresGuest, "/register")?;
        Ok(self.session.register(data).await?)
    }

    pub fn logout(&self) -> Result<()> {
        self.guard(Access::RequiresAuth, "/")?;
        self.session.logout();
        Ok(())
    }

    pub fn filter(&self) -> RecipeFilter {
        self.ui().filter.clone()
    }

    pub fn reset_filters(&self) -> RecipeFilter {
        let mut ui = self.ui();
        ui.filter.reset();
        ui.filter.clone()
    }

    /// Apply `query` to the filters, load the list if needed and return the current page.
    ///
    /// Changing a filter or the page size moves back to page 1 unless `query.page` is
    /// also set.
    pub async fn browse(&self, query: BrowseQuery) -> Result<RecipePage> {
        let difficulty = query.difficulty.as_deref().map(parse_difficulty_filter).transpose()?;
        let bucket = query.ingredient_count.as_deref().map(parse_bucket_filter).transpose()?;
        if query.page_size == Some(0) {
            anyhow::bail!("Page size must be greater than zero");
        }

        let needs_fetch = {
            let mut ui = self.ui();
            let before = ui.filter.clone();
            let filter = &mut ui.filter;

            if let Some(search) = query.search {
                filter.search_query = search;
            }
            if let Some(difficulty) = difficulty {
                filter.difficulty = difficulty;
            }
            if let Some(bucket) = bucket {
                filter.ingredient_bucket = bucket;
            }
            if let Some(page_size) = query.page_size {
                filter.page_size = page_size;
            }
            match query.page {
                Some(page) => filter.current_page = page,
                None if *filter != before => filter.current_page = 1,
                None => {}
            }

            query.refresh || !ui.loaded
        };

        if needs_fetch {
            let count = self.store.fetch_recipes().await?;
            tracing::debug!("Loaded {} recipes for browsing", count);
            self.ui().loaded = true;
        }

        let filter = self.filter();
        let user = self.session.current_user();
        Ok(self.store.with_recipes(|recipes| {
            let filtered = filter.filtered(recipes);
            let page_items = paginate(&filtered, filter.current_page, filter.page_size);
            RecipePage {
                recipes: page_items
                    .iter()
                    .map(|r| card((*r).clone(), user.as_ref()))
                    .collect(),
                page: filter.current_page,
                page_size: filter.page_size,
                total_filtered: filtered.len(),
                total_pages: total_pages(filtered.len(), filter.page_size),
                total_recipes: recipes.len(),
            }
        }))
    }

    /// Fetch one recipe with its ingredients. `Ok(None)` when it does not exist.
    pub async fn recipe(&self, id: i64) -> Result<Option<RecipeCard>> {
        let user = self.session.current_user();
        let recipe = self.store.fetch_recipe(id).await?;
        Ok(recipe.map(|r| card(r, user.as_ref())))
    }

    pub async fn my_recipes(&self) -> Result<Vec<RecipeCard>> {
        self.guard(Access::RequiresAuth, "/my-recipes")?;

        self.store.fetch_my_recipes().await?;
        // The store no longer holds the full list.
        self.ui().loaded = false;

        let user = self.session.current_user();
        Ok(self
            .store
            .recipes()
            .into_iter()
            .map(|r| card(r, user.as_ref()))
            .collect())
    }

    /// Create a recipe as the logged-in user. A blank creator name is filled with the
    /// user's display name.
    pub async fn create_recipe(&self, mut data: NewRecipe) -> Result<Recipe> {
        self.guard(Access::RequiresAuth, "/create")?;
        let user = self.require_user()?;

        data.title = data.title.trim().to_string();
        if data.title.is_empty() {
            anyhow::bail!("Title is required");
        }
        if data.title.chars().count() > MAX_TITLE_LENGTH {
            anyhow::bail!("Title must be less than {} characters", MAX_TITLE_LENGTH);
        }
        if data.instructions.trim().is_empty() {
            anyhow::bail!("Instructions are required");
        }
        if data.creator_name.trim().is_empty() {
            data.creator_name = user.display_name();
        }

        Ok(self.store.create_recipe(data).await?)
    }

    pub async fn update_recipe(&self, id: i64, update: RecipeUpdate) -> Result<Recipe> {
        self.guard(Access::RequiresAuth, &format!("/recipes/{}/edit", id))?;
        if update.is_empty() {
            anyhow::bail!("Nothing to update");
        }
        self.ensure_owner(id).await?;

        Ok(self.store.update_recipe(id, update).await?)
    }

    /// Delete an owned recipe. `Ok(false)` when the backend refused; guard and lookup
    /// failures are errors.
    pub async fn delete_recipe(&self, id: i64) -> Result<bool> {
        self.guard(Access::RequiresAuth, &format!("/recipes/{}", id))?;
        self.ensure_owner(id).await?;

        Ok(self.store.delete_recipe(id).await)
    }

    pub async fn upload_image(&self, path: &Path) -> Result<String> {
        self.guard(Access::RequiresAuth, "/create")?;
        Ok(self.images.upload_path(path).await?)
    }

    pub async fn delete_image(&self, image_url: &str) -> Result<()> {
        self.guard(Access::RequiresAuth, "/create")?;
        Ok(self.images.delete(image_url).await?)
    }

    fn require_user(&self) -> Result<User> {
        self.session
            .current_user()
            .context("No user is logged in")
    }

    async fn ensure_owner(&self, id: i64) -> Result<()> {
        let user = self.require_user()?;

        let recipe = match self.store.find(id) {
            Some(recipe) => recipe,
            None => self
                .store
                .service()
                .get_by_id(id)
                .await?
                .with_context(|| format!("Recipe {} not found", id))?,
        };

        if !guards::can_user_modify_recipe(&recipe, Some(&user)) {
            anyhow::bail!("You can only modify your own recipes");
        }
        Ok(())
    }
}

fn card(recipe: Recipe, user: Option<&User>) -> RecipeCard {
    RecipeCard {
        owner: guards::recipe_owner_text(&recipe, user),
        can_modify: guards::can_user_modify_recipe(&recipe, user),
        recipe,
    }
}
