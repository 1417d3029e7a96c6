//! Access rules for operations.
//!
//! Every tool declares whether it needs a logged-in user, a guest, or nothing. The
//! ownership helpers decide whether the current user may edit or delete a recipe.

use std::fmt;

use thiserror::Error;

use crate::client::types::{Recipe, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Logged-in users only
    RequiresAuth,
    /// Anonymous users only (login, registration)
    RequiresGuest,
}

/// Where a rejected caller should go instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Log in, then continue to `return_to`
    Login { return_to: String },
    Home,
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Redirect::Login { return_to } => write!(f, "login?redirect={}", return_to),
            Redirect::Home => f.write_str("home"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GuardRejection {
    pub message: &'static str,
    pub redirect: Redirect,
}

/// Check `access` against the session; `destination` is what the caller tried to reach.
pub fn check_access(
    access: Access,
    authenticated: bool,
    destination: &str,
) -> Result<(), GuardRejection> {
    match access {
        Access::RequiresAuth if !authenticated => Err(GuardRejection {
            message: "Please log in to access this page",
            redirect: Redirect::Login {
                return_to: destination.to_string(),
            },
        }),
        Access::RequiresGuest if authenticated => Err(GuardRejection {
            message: "You are already logged in",
            redirect: Redirect::Home,
        }),
        _ => Ok(()),
    }
}

/// Whether `user` owns `recipe`.
///
/// Compares user ids when both sides have one; older recipes without an owner id fall
/// back to comparing the creator name with the user's full name.
pub fn can_user_modify_recipe(recipe: &Recipe, user: Option<&User>) -> bool {
    let Some(user) = user else {
        return false;
    };

    match recipe.user_id.as_deref() {
        Some(owner) if !owner.is_empty() && !user.id.is_empty() => owner == user.id,
        _ => recipe.creator_name == user.full_name(),
    }
}

/// "by You" for the user's own recipes, "by <creator>" otherwise.
pub fn recipe_owner_text(recipe: &Recipe, user: Option<&User>) -> String {
    if can_user_modify_recipe(recipe, user) {
        "by You".to_string()
    } else {
        format!("by {}", recipe.creator_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::types::{Difficulty, Role};
    use pretty_assertions::assert_eq;

    fn user() -> User {
        User {
            id: "u-1".to_string(),
            username: "ada".to_string(),
            email: "a@b.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: Role::User,
            created_date: None,
        }
    }

    fn recipe(user_id: Option<&str>, creator: &str) -> Recipe {
        Recipe {
            id: Some(1),
            title: "Bread".to_string(),
            difficulty: Difficulty::Medium,
            instructions: None,
            image_url: None,
            creator_name: creator.to_string(),
            created_date: "2025-05-23T00:06:06".to_string(),
            user_id: user_id.map(str::to_string),
            ingredients: None,
            ingredient_count: Some(4),
        }
    }

    #[test]
    fn auth_routes_redirect_anonymous_users_to_login() {
        let rejection = check_access(Access::RequiresAuth, false, "/create").unwrap_err();
        assert_eq!(rejection.message, "Please log in to access this page");
        assert_eq!(rejection.redirect, Redirect::Login { return_to: "/create".to_string() });
        assert!(check_access(Access::RequiresAuth, true, "/create").is_ok());
    }

    #[test]
    fn guest_routes_redirect_logged_in_users_home() {
        let rejection = check_access(Access::RequiresGuest, true, "/login").unwrap_err();
        assert_eq!(rejection.redirect, Redirect::Home);
        assert!(check_access(Access::RequiresGuest, false, "/login").is_ok());
    }

    #[test]
    fn public_routes_always_pass() {
        assert!(check_access(Access::Public, false, "/").is_ok());
        assert!(check_access(Access::Public, true, "/").is_ok());
    }

    #[test]
    fn ownership_prefers_user_id() {
        let me = user();
        assert!(can_user_modify_recipe(&recipe(Some("u-1"), "Someone Else"), Some(&me)));
        assert!(!can_user_modify_recipe(&recipe(Some("u-2"), "Ada Lovelace"), Some(&me)));
    }

    #[test]
    fn ownership_falls_back_to_creator_name() {
        let me = user();
        assert!(can_user_modify_recipe(&recipe(None, "Ada Lovelace"), Some(&me)));
        assert!(!can_user_modify_recipe(&recipe(None, "Grace Hopper"), Some(&me)));
        assert!(!can_user_modify_recipe(&recipe(None, "Ada Lovelace"), None));
    }

    #[test]
    fn owner_text() {
        let me = user();
        let mine = recipe(Some("u-1"), "Ada Lovelace");
        let theirs = recipe(Some("u-2"), "Grace Hopper");
        assert_eq!(recipe_owner_text(&mine, Some(&me)), "by You");
        assert_eq!(recipe_owner_text(&theirs, Some(&me)), "by Grace Hopper");
    }
}
