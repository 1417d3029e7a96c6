//! Client-side recipe filtering and pagination.
//!
//! The pipeline runs in a fixed order over whatever recipe list the caller holds:
//! title search, difficulty, ingredient-count bucket, then the page slice. Nothing is
//! cached; callers re-run [`RecipeFilter::paginated`] after every change to the filter
//! or to the underlying list.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;

use crate::client::types::{Difficulty, Recipe};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Coarse ingredient-count ranges, all bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngredientBucket {
    /// 1 to 5 ingredients
    OneToFive,
    /// 6 to 10 ingredients
    SixToTen,
    /// 11 or more ingredients
    ElevenPlus,
}

impl IngredientBucket {
    pub fn label(&self) -> &'static str {
        match self {
            IngredientBucket::OneToFive => "1-5",
            IngredientBucket::SixToTen => "6-10",
            IngredientBucket::ElevenPlus => "11+",
        }
    }

    pub fn contains(&self, count: usize) -> bool {
        match self {
            IngredientBucket::OneToFive => (1..=5).contains(&count),
            IngredientBucket::SixToTen => (6..=10).contains(&count),
            IngredientBucket::ElevenPlus => count >= 11,
        }
    }
}

impl fmt::Display for IngredientBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IngredientBucket {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1-5" => Ok(IngredientBucket::OneToFive),
            "6-10" => Ok(IngredientBucket::SixToTen),
            "11+" => Ok(IngredientBucket::ElevenPlus),
            other => anyhow::bail!(
                "Unknown ingredient count range '{}' (expected 1-5, 6-10 or 11+)",
                other
            ),
        }
    }
}

/// Parse a difficulty filter where an empty string means "any difficulty".
pub fn parse_difficulty_filter(raw: &str) -> Result<Option<Difficulty>> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        raw.parse().map(Some)
    }
}

/// Parse a bucket filter where an empty string means "any count".
pub fn parse_bucket_filter(raw: &str) -> Result<Option<IngredientBucket>> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        raw.parse().map(Some)
    }
}

/// UI filter and pagination state for the recipe list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFilter {
    pub search_query: String,
    pub difficulty: Option<Difficulty>,
    pub ingredient_bucket: Option<IngredientBucket>,
    /// 1-based
    pub current_page: usize,
    pub page_size: usize,
}

impl Default for RecipeFilter {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            difficulty: None,
            ingredient_bucket: None,
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl RecipeFilter {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// Clear every filter and return to page 1. The page size is kept.
    pub fn reset(&mut self) {
        self.search_query.clear();
        self.difficulty = None;
        self.ingredient_bucket = None;
        self.current_page = 1;
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        if !self.search_query.is_empty()
            && !recipe
                .title
                .to_lowercase()
                .contains(&self.search_query.to_lowercase())
        {
            return false;
        }

        if let Some(difficulty) = self.difficulty {
            if recipe.difficulty != difficulty {
                return false;
            }
        }

        if let Some(bucket) = self.ingredient_bucket {
            if !bucket.contains(recipe.ingredient_count.unwrap_or(0)) {
                return false;
            }
        }

        true
    }

    /// Every recipe that passes the filters, before pagination.
    pub fn filtered<'a>(&self, recipes: &'a [Recipe]) -> Vec<&'a Recipe> {
        recipes.iter().filter(|r| self.matches(r)).collect()
    }

    /// The current page of filtered recipes.
    pub fn paginated<'a>(&self, recipes: &'a [Recipe]) -> Vec<&'a Recipe> {
        let filtered = self.filtered(recipes);
        paginate(&filtered, self.current_page, self.page_size).to_vec()
    }

    pub fn total_pages(&self, filtered_len: usize) -> usize {
        total_pages(filtered_len, self.page_size)
    }
}

/// Slice `[(page-1)*size, (page-1)*size + size)` of `items`.
///
/// Out-of-range pages, page 0 and a zero page size all yield an empty slice.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }

    let start = match (page - 1).checked_mul(page_size) {
        Some(start) if start < items.len() => start,
        _ => return &[],
    };
    let end = start.saturating_add(page_size).min(items.len());

    &items[start..end]
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        len.div_ceil(page_size)
    }
}
