//! Global Application State
//!
//! Reactive state management using Leptos signals.

use leptos::*;

use crate::api::{self, User};

/// Global application state provided to all components
#[derive(Clone, Copy)]
pub struct GlobalState {
    /// Stored access token, mirrored from localStorage
    pub token: RwSignal<Option<String>>,
    /// Account behind the token, once `/auth/me` answered
    pub user: RwSignal<Option<User>>,
    /// Error message to display
    pub error: RwSignal<Option<String>>,
    /// Success message (for toasts)
    pub success: RwSignal<Option<String>>,
}

/// Provide global state to the component tree
pub fn provide_global_state() {
    let state = GlobalState {
        token: create_rw_signal(api::get_token()),
        user: create_rw_signal(None),
        error: create_rw_signal(None),
        success: create_rw_signal(None),
    };

    provide_context(state);
}

impl GlobalState {
    pub fn is_logged_in(&self) -> bool {
        self.token.with(Option::is_some)
    }

    pub fn is_admin(&self) -> bool {
        self.user.with(|user| user.as_ref().is_some_and(|u| u.is_admin))
    }

    /// Store a fresh token and load its account
    pub fn login(&self, token: String) {
        api::set_token(Some(&token));
        self.token.set(Some(token));
        self.refresh_user();
    }

    /// Forget the token and the current account
    pub fn logout(&self) {
        api::set_token(None);
        self.token.set(None);
        self.user.set(None);
    }

    /// Reload the current account; a rejected token logs out
    pub fn refresh_user(&self) {
        if !self.is_logged_in() {
            self.user.set(None);
            return;
        }

        let state = *self;
        spawn_local(async move {
            match api::fetch_me().await {
                Ok(user) => state.user.set(Some(user)),
                Err(e) if e.is_unauthorized() => state.logout(),
                Err(e) => logging::warn!("Failed to load account: {}", e),
            }
        });
    }

    /// Show a success message (auto-clears after timeout)
    pub fn show_success(&self, message: &str) {
        self.success.set(Some(message.to_string()));

        let success_signal = self.success;
        gloo_timers::callback::Timeout::new(3000, move || {
            success_signal.set(None);
        })
        .forget();
    }

    /// Show an error message (auto-clears after timeout)
    pub fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));

        let error_signal = self.error;
        gloo_timers::callback::Timeout::new(5000, move || {
            error_signal.set(None);
        })
        .forget();
    }
}
