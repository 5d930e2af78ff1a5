//! Book card shown in the catalog grid.

use leptos::*;
use leptos_router::*;

use crate::api::{format_price, Book};

#[component]
pub fn BookCard(book: Book) -> impl IntoView {
    let href = format!("/books/{}", book.book_id);
    let authors = book.authors_label();

    view! {
        <article class="book-card">
            <A href=href.clone() class="book-card__cover">
                <Cover url=book.cover_image.clone() title=book.title.clone() />
            </A>
            <div class="book-card__body">
                <h3 class="book-card__title">
                    <A href=href>{book.title.clone()}</A>
                </h3>
                <p class="book-card__authors">{authors}</p>
                <p class="book-card__meta">
                    {book.genre_name.clone()}
                    {book.publication_year.map(|year| format!(" · {}", year))}
                </p>
                <p class="book-card__price">{format_price(book.price)}</p>
            </div>
        </article>
    }
}

/// Cover image, or a placeholder when the book has none
#[component]
pub fn Cover(
    url: Option<String>,
    #[prop(into)]
    title: String,
) -> impl IntoView {
    match url {
        Some(url) => view! {
            <img class="cover" src=url alt=format!("Cover of {}", title) loading="lazy" />
        }
        .into_view(),
        None => view! {
            <div class="cover cover_placeholder" aria-hidden="true">"No cover"</div>
        }
        .into_view(),
    }
}
