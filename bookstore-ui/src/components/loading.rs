//! Loading Component
//!
//! Loading spinners and skeleton states.

use leptos::*;

/// Full-page loading spinner
#[component]
pub fn Loading() -> impl IntoView {
    view! {
        <div class="loading" aria-busy="true">
            <div class="loading-spinner" />
        </div>
    }
}

/// Skeleton loader for a grid of book cards
#[component]
pub fn BookCardSkeletons(
    #[prop(default = 6)]
    count: usize,
) -> impl IntoView {
    view! {
        <div class="book-grid" aria-hidden="true">
            {(0..count).map(|_| view! {
                <div class="book-card book-card_skeleton">
                    <div class="skeleton skeleton_cover" />
                    <div class="skeleton skeleton_line" />
                    <div class="skeleton skeleton_line skeleton_short" />
                </div>
            }).collect_view()}
        </div>
    }
}

/// Skeleton loader for list items
#[component]
pub fn ListSkeleton(
    #[prop(default = 3)]
    count: usize,
) -> impl IntoView {
    view! {
        <div class="list-skeleton" aria-hidden="true">
            {(0..count).map(|_| view! {
                <div class="skeleton skeleton_row" />
            }).collect_view()}
        </div>
    }
}
