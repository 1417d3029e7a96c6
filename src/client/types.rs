//! Type definitions for the Recipe Vault API.
//!
//! Two families of types live here:
//!
//! - **Wire types** (`*Response`, `*Request`) mirror the JSON exchanged with the
//!   backend exactly. Field names are camelCase and ingredients travel as plain strings.
//! - **Display types** ([`Recipe`], [`Ingredient`], [`NewRecipe`], [`RecipeUpdate`]) are
//!   what the stores, filters and MCP tools work with. Optional fields stay optional and
//!   ingredients are structured `{amount, name}` pairs.
//!
//! ## Summary vs. detail
//!
//! List endpoints return [`RecipeSummaryResponse`] with only an ingredient count; the
//! single-recipe endpoint returns [`RecipeDetailResponse`] with the full ingredient list.
//! Both map onto the same [`Recipe`], with `ingredients` left as `None` for summaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recipe difficulty, ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Wire representation (`EASY`, `MEDIUM`, `HARD`).
    pub fn as_wire(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }

    /// Human-facing label (`Easy`, `Medium`, `Hard`).
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EASY" => Ok(Difficulty::Easy),
            "MEDIUM" => Ok(Difficulty::Medium),
            "HARD" => Ok(Difficulty::Hard),
            other => anyhow::bail!("Difficulty must be EASY, MEDIUM, or HARD (got '{}')", other),
        }
    }
}

/// Account role assigned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

/// Authenticated user profile as returned by `/auth/login` and `/auth/register`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend UUID
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default)]
    pub created_date: Option<String>,
}

fn default_role() -> Role {
    Role::User
}

impl User {
    /// "First Last", falling back to the username when both names are blank.
    pub fn display_name(&self) -> String {
        let full = self.full_name();
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }

    /// "First Last" trimmed, the same string the backend stores as `creatorName`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Uppercased initials of first and last name, or of the username.
    pub fn initials(&self) -> String {
        let first = self.first_name.chars().next();
        let last = self.last_name.chars().next();
        let initials: String = first.into_iter().chain(last).collect::<String>().to_uppercase();
        if initials.is_empty() {
            self.username
                .chars()
                .next()
                .map(|c| c.to_uppercase().to_string())
                .unwrap_or_default()
        } else {
            initials
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCredentials {
    pub username_or_email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Response from `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    /// Token scheme reported by the backend (normally `Bearer`)
    #[serde(rename = "type", default)]
    pub token_type: Option<String>,
    pub user: User,
}

/// Ingredient as returned inside a recipe detail: one combined string like "2 eggs".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientResponse {
    pub id: i64,
    pub ingredient_name: String,
}

/// Recipe as returned by `GET /recipes` and `GET /recipes/my-recipes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummaryResponse {
    pub id: i64,
    pub title: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub image_url: Option<String>,
    pub creator_name: String,
    pub created_date: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub ingredient_count: usize,
}

/// Recipe as returned by `GET /recipes/{id}`, `POST /recipes` and `PUT /recipes/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetailResponse {
    pub id: i64,
    pub title: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub creator_name: String,
    pub created_date: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<IngredientResponse>,
}

/// Body of `POST /recipes`. Every field is required by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCreateRequest {
    pub title: String,
    pub difficulty: Difficulty,
    pub instructions: String,
    pub image_url: String,
    pub creator_name: String,
    pub ingredient_names: Vec<String>,
}

/// Body of `PUT /recipes/{id}`. Absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredient_names: Option<Vec<String>>,
}

/// Response from `POST /images/upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResponse {
    pub image_url: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Structured ingredient used on the display side.
///
/// An empty `amount` means the ingredient has no quantity ("salt to taste").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Present only once the ingredient has been persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub amount: String,
}

impl Ingredient {
    pub fn new(amount: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            amount: amount.into(),
        }
    }
}

/// A recipe in display shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Server-assigned identity
    pub id: Option<i64>,
    pub title: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub creator_name: String,
    /// ISO-8601 creation timestamp, server-assigned
    pub created_date: String,
    /// Owner's user id when the backend reports it
    #[serde(default)]
    pub user_id: Option<String>,
    /// Full ingredient list; `None` until a detail fetch
    #[serde(default)]
    pub ingredients: Option<Vec<Ingredient>>,
    /// Cached ingredient count, equal to `ingredients.len()` when both are present
    #[serde(default)]
    pub ingredient_count: Option<usize>,
}

/// Input for creating a recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecipe {
    pub title: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub creator_name: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

/// Partial update of a recipe. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<Ingredient>>,
}

impl RecipeUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.difficulty.is_none()
            && self.instructions.is_none()
            && self.image_url.is_none()
            && self.creator_name.is_none()
            && self.ingredients.is_none()
    }
}
