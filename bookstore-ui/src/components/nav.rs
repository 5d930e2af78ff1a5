//! Navigation Component
//!
//! Header with brand, search box, account links and a mobile drawer.

use leptos::*;
use leptos_router::*;

use crate::state::global::GlobalState;

/// Navigation header component
#[component]
pub fn Nav() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let navigate = use_navigate();

    let (menu_open, set_menu_open) = create_signal(false);
    let (search, set_search) = create_signal(String::new());

    // Escape closes the drawer
    let handle = window_event_listener(ev::keydown, move |event| {
        if event.key() == "Escape" {
            set_menu_open.set(false);
        }
    });
    on_cleanup(move || handle.remove());

    let on_search = {
        let navigate = navigate.clone();
        move |ev: ev::SubmitEvent| {
            ev.prevent_default();
            let query = search.get_untracked();
            let query = query.trim();
            let target = if query.is_empty() {
                "/".to_string()
            } else {
                format!("/?q={}", urlencoding::encode(query))
            };
            set_menu_open.set(false);
            navigate(&target, NavigateOptions::default());
        }
    };

    let on_logout = move |_| {
        state.logout();
        set_menu_open.set(false);
        navigate("/", NavigateOptions::default());
        state.show_success("You have signed out");
    };

    view! {
        <header class="header">
            <div class="container header__inner">
                <A href="/" class="header__brand">"Bookstore"</A>

                <form class="header__search" role="search" on:submit=on_search>
                    <input
                        type="search"
                        class="input"
                        placeholder="Search by title"
                        aria-label="Search books"
                        prop:value=search
                        on:input=move |ev| set_search.set(event_target_value(&ev))
                    />
                    <button type="submit" class="btn">"Search"</button>
                </form>

                <button
                    type="button"
                    class="header__toggle"
                    aria-label="Menu"
                    aria-expanded=move || menu_open.get().to_string()
                    on:click=move |_| set_menu_open.update(|open| *open = !*open)
                >
                    "☰"
                </button>

                <nav class="header__nav" class:header__nav_open=menu_open>
                    <NavLink href="/" label="Catalog" />
                    {move || state.is_logged_in().then(|| view! {
                        <NavLink href="/cart" label="Cart" />
                        <NavLink href="/orders" label="Orders" />
                        <NavLink href="/profile" label="Profile" />
                    })}
                    {move || state.is_admin().then(|| view! {
                        <NavLink href="/admin" label="Admin" />
                    })}
                    {move || {
                        if state.is_logged_in() {
                            view! {
                                <button type="button" class="nav-link" on:click=on_logout.clone()>
                                    "Logout"
                                </button>
                            }.into_view()
                        } else {
                            view! {
                                <NavLink href="/login" label="Login" />
                                <NavLink href="/register" label="Register" />
                            }.into_view()
                        }
                    }}
                </nav>
            </div>
        </header>
    }
}

/// Individual navigation link
#[component]
fn NavLink(
    href: &'static str,
    label: &'static str,
) -> impl IntoView {
    view! {
        <A href=href class="nav-link" active_class="nav-link_active">
            {label}
        </A>
    }
}
