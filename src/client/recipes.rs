//! Recipe CRUD against `/recipes`.
//!
//! Translates between the wire schema and the display schema. List endpoints return
//! summaries (ingredient count only); the single-recipe endpoints return details whose
//! ingredient strings are decoded into structured [`Ingredient`]s.
//!
//! [`Ingredient`]: crate::client::types::Ingredient

use rand::seq::SliceRandom;

use crate::client::{
    client::RecipeVaultClient,
    error::ApiResult,
    types::{
        NewRecipe, Recipe, RecipeCreateRequest, RecipeDetailResponse, RecipeSummaryResponse,
        RecipeUpdate, RecipeUpdateRequest,
    },
};
use crate::ingredients;

/// Picsum image ids used when a recipe is created without an image.
pub const PLACEHOLDER_IMAGE_IDS: [u32; 10] = [
    1011, 1012, 1013, 1015, 1016, 1018, 1019, 1020, 1021, 1022,
];

pub fn placeholder_image_url() -> String {
    let id = PLACEHOLDER_IMAGE_IDS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(PLACEHOLDER_IMAGE_IDS[0]);
    format!("https://picsum.photos/400/250?random={}", id)
}

/// Summary → display. The ingredient list stays unknown until a detail fetch.
pub fn summary_to_recipe(summary: RecipeSummaryResponse) -> Recipe {
    Recipe {
        id: Some(summary.id),
        title: summary.title,
        difficulty: summary.difficulty,
        instructions: None,
        image_url: summary.image_url,
        creator_name: summary.creator_name,
        created_date: summary.created_date,
        user_id: summary.user_id,
        ingredients: None,
        ingredient_count: Some(summary.ingredient_count),
    }
}

/// Detail → display, decoding each ingredient string.
pub fn detail_to_recipe(detail: RecipeDetailResponse) -> Recipe {
    let ingredients = ingredients::decode_all(&detail.ingredients);
    Recipe {
        id: Some(detail.id),
        title: detail.title,
        difficulty: detail.difficulty,
        instructions: detail.instructions,
        image_url: detail.image_url,
        creator_name: detail.creator_name,
        created_date: detail.created_date,
        user_id: detail.user_id,
        ingredient_count: Some(ingredients.len()),
        ingredients: Some(ingredients),
    }
}

pub fn create_request(data: NewRecipe) -> RecipeCreateRequest {
    let image_url = data
        .image_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(placeholder_image_url);

    RecipeCreateRequest {
        title: data.title,
        difficulty: data.difficulty,
        instructions: data.instructions,
        image_url,
        creator_name: data.creator_name,
        ingredient_names: ingredients::encode_all(&data.ingredients),
    }
}

pub fn update_request(update: RecipeUpdate) -> RecipeUpdateRequest {
    RecipeUpdateRequest {
        title: update.title,
        difficulty: update.difficulty,
        instructions: update.instructions,
        image_url: update.image_url,
        creator_name: update.creator_name,
        ingredient_names: update.ingredients.as_deref().map(ingredients::encode_all),
    }
}

#[derive(Clone)]
pub struct RecipeService {
    client: RecipeVaultClient,
}

impl RecipeService {
    pub fn new(client: RecipeVaultClient) -> Self {
        Self { client }
    }

    pub async fn list_all(&self) -> ApiResult<Vec<Recipe>> {
        let summaries: Vec<RecipeSummaryResponse> = self.client.get("/recipes").await?;
        tracing::debug!("Fetched {} recipe summaries", summaries.len());
        Ok(summaries.into_iter().map(summary_to_recipe).collect())
    }

    /// Recipes owned by the logged-in user.
    pub async fn list_mine(&self) -> ApiResult<Vec<Recipe>> {
        let summaries: Vec<RecipeSummaryResponse> = self.client.get("/recipes/my-recipes").await?;
        Ok(summaries.into_iter().map(summary_to_recipe).collect())
    }

    /// Full recipe with ingredients. `Ok(None)` when the backend reports 404.
    pub async fn get_by_id(&self, id: i64) -> ApiResult<Option<Recipe>> {
        match self.client.get::<RecipeDetailResponse>(&format!("/recipes/{}", id)).await {
            Ok(detail) => Ok(Some(detail_to_recipe(detail))),
            Err(e) if e.is_not_found() => {
                tracing::debug!("Recipe {} not found", id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn create(&self, data: NewRecipe) -> ApiResult<Recipe> {
        let request = create_request(data);
        let detail: RecipeDetailResponse = self.client.post("/recipes", &request).await?;
        tracing::info!("Created recipe {} ({})", detail.id, detail.title);
        Ok(detail_to_recipe(detail))
    }

    /// Partial update: only the fields set in `update` are sent.
    pub async fn update(&self, id: i64, update: RecipeUpdate) -> ApiResult<Recipe> {
        let request = update_request(update);
        let detail: RecipeDetailResponse =
            self.client.put(&format!("/recipes/{}", id), &request).await?;
        tracing::info!("Updated recipe {}", id);
        Ok(detail_to_recipe(detail))
    }

    /// `true` when the recipe was deleted. Failures are logged, not returned.
    pub async fn delete(&self, id: i64) -> bool {
        match self.client.delete(&format!("/recipes/{}", id)).await {
            Ok(()) => {
                tracing::info!("Deleted recipe {}", id);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to delete recipe {}: {}", id, e);
                false
            }
        }
    }
}
