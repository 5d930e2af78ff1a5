//! Book detail page.

use leptos::*;
use leptos_router::*;

use crate::api::{self, format_price, Book};
use crate::components::{Cover, Loading};
use crate::state::global::GlobalState;

#[derive(Params, PartialEq, Clone)]
struct BookParams {
    id: Option<i64>,
}

#[component]
pub fn BookDetail() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let params = use_params::<BookParams>();

    let book = create_rw_signal(None::<Book>);
    let loading = create_rw_signal(true);
    let load_error = create_rw_signal(None::<String>);
    let adding = create_rw_signal(false);

    create_effect(move |_| {
        let id = params.with(|p| p.as_ref().ok().and_then(|p| p.id));
        loading.set(true);
        load_error.set(None);
        book.set(None);

        let Some(id) = id else {
            load_error.set(Some("Book not found".to_string()));
            loading.set(false);
            return;
        };

        spawn_local(async move {
            match api::fetch_book(id).await {
                Ok(loaded) => book.set(Some(loaded)),
                Err(e) => load_error.set(Some(e.message)),
            }
            loading.set(false);
        });
    });

    let add_to_cart = move |_| {
        let Some(book_id) = book.with_untracked(|b| b.as_ref().map(|b| b.book_id)) else {
            return;
        };
        if !state.is_logged_in() {
            state.show_error("Sign in to add books to the cart");
            return;
        }
        adding.set(true);
        spawn_local(async move {
            match api::add_to_cart(book_id, 1).await {
                Ok(_) => state.show_success("Added to cart"),
                Err(e) => state.show_error(&e.message),
            }
            adding.set(false);
        });
    };

    view! {
        <section class="book-detail">
            {move || {
                if loading.get() {
                    return view! { <Loading /> }.into_view();
                }
                match book.get() {
                    Some(book) => view! { <BookInfo book=book /> }.into_view(),
                    None => view! {
                        <div class="empty-state" role="alert">
                            <p>{load_error.get().unwrap_or_else(|| "Book not found".to_string())}</p>
                            <A href="/">"Back to the catalog"</A>
                        </div>
                    }.into_view(),
                }
            }}

            <button
                type="button"
                class="btn btn_primary"
                disabled=move || loading.get() || adding.get() || book.with(Option::is_none)
                on:click=add_to_cart
            >
                "Add to cart"
            </button>
        </section>
    }
}

#[component]
fn BookInfo(book: Book) -> impl IntoView {
    let authors = book.authors_label();
    let not_specified = || "Not specified".to_string();

    view! {
        <div class="book-detail__layout">
            <Cover url=book.cover_image.clone() title=book.title.clone() />
            <div class="book-detail__info">
                <h1>{book.title.clone()}</h1>
                <dl class="book-detail__facts">
                    <dt>"Authors"</dt>
                    <dd>{authors}</dd>
                    <dt>"Genre"</dt>
                    <dd>{book.genre_name.clone().unwrap_or_else(not_specified)}</dd>
                    <dt>"Publisher"</dt>
                    <dd>{book.publisher_name.clone().unwrap_or_else(not_specified)}</dd>
                    <dt>"Year"</dt>
                    <dd>{book.publication_year.map(|y| y.to_string()).unwrap_or_else(not_specified)}</dd>
                    <dt>"Pages"</dt>
                    <dd>{book.pages.map(|p| p.to_string()).unwrap_or_else(not_specified)}</dd>
                    {book.isbn.clone().map(|isbn| view! {
                        <dt>"ISBN"</dt>
                        <dd>{isbn}</dd>
                    })}
                </dl>
                <p class="book-detail__price">{format_price(book.price)}</p>
                <p class="book-detail__description">
                    {book.description.clone().unwrap_or_default()}
                </p>
            </div>
        </div>
    }
}
