//! Cart Page
//!
//! Cart lines with per-line quantity updates and checkout.

use leptos::*;
use leptos_router::*;

use crate::api::{self, format_price, Cart, CartItem};
use crate::components::ListSkeleton;
use crate::state::global::GlobalState;

#[component]
pub fn CartPage() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let cart = create_rw_signal(None::<Cart>);
    let loading = create_rw_signal(true);
    let placing = create_rw_signal(false);

    let load = move || {
        loading.set(true);
        spawn_local(async move {
            match api::fetch_cart().await {
                Ok(loaded) => cart.set(Some(loaded)),
                Err(e) => {
                    cart.set(None);
                    state.show_error(&e.message);
                }
            }
            loading.set(false);
        });
    };

    if state.is_logged_in() {
        load();
    } else {
        loading.set(false);
    }

    let place_order = move |_| {
        placing.set(true);
        spawn_local(async move {
            match api::place_order().await {
                Ok(order) => {
                    state.show_success(&format!(
                        "Order #{} placed for {}",
                        order.order_id,
                        format_price(order.total_amount)
                    ));
                    load();
                }
                Err(e) => state.show_error(&e.message),
            }
            placing.set(false);
        });
    };

    view! {
        <section class="cart">
            <h1>"Cart"</h1>
            {move || {
                if !state.is_logged_in() {
                    return view! {
                        <div class="empty-state">
                            <p>"Sign in to see your cart."</p>
                            <A href="/login" class="btn btn_primary">"Login"</A>
                        </div>
                    }.into_view();
                }
                if loading.get() {
                    return view! { <ListSkeleton count=3 /> }.into_view();
                }
                let current = cart.get().unwrap_or_default();
                if current.items.is_empty() {
                    return view! {
                        <div class="empty-state">
                            <p>"Your cart is empty."</p>
                            <A href="/">"Browse the catalog"</A>
                        </div>
                    }.into_view();
                }
                let total = format_price(current.total());
                view! {
                    <table class="table">
                        <thead>
                            <tr>
                                <th>"Book"</th>
                                <th>"Price"</th>
                                <th>"Quantity"</th>
                                <th>"Total"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            {current.items.into_iter().map(|item| view! {
                                <CartLine item=item cart=cart />
                            }).collect_view()}
                        </tbody>
                        <tfoot>
                            <tr>
                                <td colspan="3">"Grand total"</td>
                                <td>{total}</td>
                                <td></td>
                            </tr>
                        </tfoot>
                    </table>
                }.into_view()
            }}

            <button
                type="button"
                class="btn btn_primary"
                disabled=move || {
                    placing.get()
                        || cart.with(|c| c.as_ref().map_or(true, |c| c.items.is_empty()))
                }
                on:click=place_order
            >
                "Place order"
            </button>
        </section>
    }
}

/// One cart row with its own quantity input
#[component]
fn CartLine(item: CartItem, cart: RwSignal<Option<Cart>>) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let cart_item_id = item.cart_item_id;
    let (quantity, set_quantity) = create_signal(item.quantity.to_string());

    let update = move |_| {
        let Ok(quantity) = quantity.get_untracked().trim().parse::<i64>() else {
            state.show_error("Quantity must be a whole number");
            return;
        };
        if quantity < 1 {
            state.show_error("Quantity must be at least 1");
            return;
        }
        spawn_local(async move {
            match api::update_cart_item(cart_item_id, quantity).await {
                Ok(updated) => {
                    cart.set(Some(updated));
                    state.show_success("Cart updated");
                }
                Err(e) => state.show_error(&e.message),
            }
        });
    };

    let remove = move |_| {
        spawn_local(async move {
            match api::remove_cart_item(cart_item_id).await {
                Ok(()) => {
                    cart.update(|c| {
                        if let Some(c) = c {
                            c.items.retain(|i| i.cart_item_id != cart_item_id);
                        }
                    });
                    state.show_success("Removed from cart");
                }
                Err(e) => state.show_error(&e.message),
            }
        });
    };

    view! {
        <tr>
            <td>{item.title()}</td>
            <td>{format_price(item.unit_price())}</td>
            <td>
                <input
                    type="number"
                    min="1"
                    class="input input_narrow"
                    aria-label="Quantity"
                    prop:value=quantity
                    on:input=move |ev| set_quantity.set(event_target_value(&ev))
                />
            </td>
            <td>{format_price(item.line_total())}</td>
            <td class="table__actions">
                <button type="button" class="btn" on:click=update>"Update"</button>
                <button type="button" class="btn btn_danger" on:click=remove>"Delete"</button>
            </td>
        </tr>
    }
}
