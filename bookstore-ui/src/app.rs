//! App Root Component
//!
//! Main application component with routing and global providers.

use leptos::*;
use leptos_router::*;

use crate::components::{Nav, Toast};
use crate::pages::{Admin, BookDetail, CartPage, Catalog, Login, Orders, ProfilePage, Register};
use crate::state::global::{provide_global_state, GlobalState};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    // Provide global state to all components
    provide_global_state();

    // Load the account behind a stored token
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    state.refresh_user();

    view! {
        <Router>
            <div class="app">
                // Navigation header
                <Nav />

                // Main content area
                <main class="container main">
                    <Routes>
                        <Route path="/" view=Catalog />
                        <Route path="/books/:id" view=BookDetail />
                        <Route path="/cart" view=CartPage />
                        <Route path="/login" view=Login />
                        <Route path="/register" view=Register />
                        <Route path="/orders" view=Orders />
                        <Route path="/profile" view=ProfilePage />
                        <Route path="/admin" view=Admin />
                        <Route path="/*any" view=NotFound />
                    </Routes>
                </main>

                <footer class="footer">
                    <div class="container">"© Bookstore"</div>
                </footer>

                // Toast notifications
                <Toast />
            </div>
        </Router>
    }
}

/// 404 Not Found page
#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="empty-state">
            <h1>"Page Not Found"</h1>
            <p>"The page you're looking for doesn't exist."</p>
            <A href="/" class="btn btn_primary">"Back to the catalog"</A>
        </div>
    }
}
