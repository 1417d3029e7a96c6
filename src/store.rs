//! Recipe state shared by the tools: the fetched list and the "current recipe" slot.
//!
//! State sits behind a mutex that is never held across an `.await`. Two overlapping
//! calls to the same action are not serialized against each other; each applies its
//! result when it resolves.

use std::sync::{Mutex, MutexGuard};

use crate::client::{
    error::ApiResult,
    recipes::RecipeService,
    types::{NewRecipe, Recipe, RecipeUpdate},
};

#[derive(Debug, Default)]
struct StoreState {
    recipes: Vec<Recipe>,
    current: Option<Recipe>,
    pending: usize,
}

pub struct RecipeStore {
    service: RecipeService,
    state: Mutex<StoreState>,
}

/// Keeps `is_loading()` true while an action is running.
struct Loading<'a> {
    store: &'a RecipeStore,
}

impl<'a> Loading<'a> {
    fn start(store: &'a RecipeStore) -> Self {
        store.state().pending += 1;
        Self { store }
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        let mut state = self.store.state();
        state.pending = state.pending.saturating_sub(1);
    }
}

impl RecipeStore {
    pub fn new(service: RecipeService) -> Self {
        Self {
            service,
            state: Mutex::new(StoreState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn service(&self) -> &RecipeService {
        &self.service
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.state().recipes.clone()
    }

    /// Run `f` over the held list without cloning it.
    pub fn with_recipes<R>(&self, f: impl FnOnce(&[Recipe]) -> R) -> R {
        f(&self.state().recipes)
    }

    pub fn find(&self, id: i64) -> Option<Recipe> {
        let state = self.state();
        state
            .current
            .iter()
            .chain(state.recipes.iter())
            .find(|r| r.id == Some(id))
            .cloned()
    }

    pub fn current(&self) -> Option<Recipe> {
        self.state().current.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().pending > 0
    }

    /// Replace the list with every recipe. Returns how many were fetched.
    pub async fn fetch_recipes(&self) -> ApiResult<usize> {
        let _loading = Loading::start(self);
        let recipes = self.service.list_all().await?;
        let count = recipes.len();
        self.state().recipes = recipes;
        Ok(count)
    }

    /// Replace the list with the logged-in user's recipes.
    pub async fn fetch_my_recipes(&self) -> ApiResult<usize> {
        let _loading = Loading::start(self);
        let recipes = self.service.list_mine().await?;
        let count = recipes.len();
        self.state().recipes = recipes;
        Ok(count)
    }

    /// Fetch one recipe in detail and make it the current recipe.
    pub async fn fetch_recipe(&self, id: i64) -> ApiResult<Option<Recipe>> {
        let _loading = Loading::start(self);
        let recipe = self.service.get_by_id(id).await?;
        if let Some(recipe) = &recipe {
            self.state().current = Some(recipe.clone());
        }
        Ok(recipe)
    }

    pub async fn create_recipe(&self, data: NewRecipe) -> ApiResult<Recipe> {
        let _loading = Loading::start(self);
        let recipe = self.service.create(data).await?;
        self.state().recipes.push(recipe.clone());
        Ok(recipe)
    }

    pub async fn update_recipe(&self, id: i64, update: RecipeUpdate) -> ApiResult<Recipe> {
        let _loading = Loading::start(self);
        let updated = self.service.update(id, update).await?;

        let mut state = self.state();
        if let Some(slot) = state.recipes.iter_mut().find(|r| r.id == updated.id) {
            *slot = updated.clone();
        }
        if state.current.as_ref().is_some_and(|c| c.id == updated.id) {
            state.current = Some(updated.clone());
        }
        Ok(updated)
    }

    /// Delete a recipe. The local list is only touched when the backend confirms.
    pub async fn delete_recipe(&self, id: i64) -> bool {
        let _loading = Loading::start(self);
        let deleted = self.service.delete(id).await;

        if deleted {
            let mut state = self.state();
            state.recipes.retain(|r| r.id != Some(id));
            if state.current.as_ref().is_some_and(|c| c.id == Some(id)) {
                state.current = None;
            }
        }
        deleted
    }
}
