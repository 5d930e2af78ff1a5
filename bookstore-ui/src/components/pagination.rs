//! Prev/next pager for listings without totals.

use leptos::*;

use crate::catalog::Pagination;

#[component]
pub fn Pager(
    #[prop(into)]
    pagination: Signal<Pagination>,
    #[prop(into)]
    on_prev: Callback<()>,
    #[prop(into)]
    on_next: Callback<()>,
) -> impl IntoView {
    view! {
        <nav class="pager" aria-label="Pagination">
            <button
                type="button"
                class="btn"
                disabled=move || !pagination.get().can_prev()
                on:click=move |_| on_prev.call(())
            >
                "← Previous"
            </button>
            <span class="pager__status">{move || pagination.get().status()}</span>
            <button
                type="button"
                class="btn"
                disabled=move || !pagination.get().can_next()
                on:click=move |_| on_next.call(())
            >
                "Next →"
            </button>
        </nav>
    }
}
