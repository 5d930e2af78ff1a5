//! Order history page.

use leptos::*;
use leptos_router::*;

use crate::api::{self, format_price, Order};
use crate::components::ListSkeleton;
use crate::state::global::GlobalState;

#[component]
pub fn Orders() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let orders = create_rw_signal(Vec::<Order>::new());
    let loading = create_rw_signal(state.is_logged_in());

    if state.is_logged_in() {
        spawn_local(async move {
            match api::fetch_orders().await {
                Ok(list) => orders.set(list),
                Err(e) => state.show_error(&e.message),
            }
            loading.set(false);
        });
    }

    view! {
        <section class="orders">
            <h1>"My orders"</h1>
            {move || {
                if !state.is_logged_in() {
                    return view! {
                        <div class="empty-state">
                            <p>"Sign in to see your orders."</p>
                            <A href="/login" class="btn btn_primary">"Login"</A>
                        </div>
                    }.into_view();
                }
                if loading.get() {
                    return view! { <ListSkeleton count=4 /> }.into_view();
                }
                let list = orders.get();
                if list.is_empty() {
                    return view! {
                        <div class="empty-state">
                            <p>"You have no orders yet."</p>
                            <A href="/" class="btn btn_primary">"Go to the catalog"</A>
                        </div>
                    }.into_view();
                }
                view! {
                    <table class="table">
                        <thead>
                            <tr>
                                <th>"Order"</th>
                                <th>"Date"</th>
                                <th>"Total"</th>
                                <th>"Status"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {list.into_iter().map(|order| view! {
                                <tr>
                                    <td>{format!("#{}", order.order_id)}</td>
                                    <td>{order.created_at.format("%Y-%m-%d %H:%M").to_string()}</td>
                                    <td>{format_price(order.total_amount)}</td>
                                    <td>{order.status}</td>
                                </tr>
                            }).collect_view()}
                        </tbody>
                    </table>
                }.into_view()
            }}
        </section>
    }
}
