//! Admin Page
//!
//! Console for books, dictionaries, orders and users. Only rendered for
//! accounts with the admin flag.

use leptos::html::Input;
use leptos::*;
use leptos_router::*;

use crate::api::{
    self, format_price, AdminUser, ApiError, Book, BookForm, DictEntry, DictKind, Order,
    ORDER_STATUSES,
};
use crate::components::{ListSkeleton, Loading};
use crate::state::global::GlobalState;

/// Console sections, in nav order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Books,
    Dict(DictKind),
    Orders,
    Users,
}

const SECTIONS: [(Section, &str); 6] = [
    (Section::Books, "Books"),
    (Section::Dict(DictKind::Genres), "Genres"),
    (Section::Dict(DictKind::Authors), "Authors"),
    (Section::Dict(DictKind::Publishers), "Publishers"),
    (Section::Orders, "Orders"),
    (Section::Users, "Users"),
];

#[component]
pub fn Admin() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let (section, set_section) = create_signal(Section::Books);

    view! {
        <section class="admin">
            <h1>"Administration"</h1>
            {move || {
                if !state.is_logged_in() {
                    return view! {
                        <div class="empty-state" role="alert">
                            <p>"Sign in as an administrator"</p>
                            <A href="/login" class="btn btn_primary">"Login"</A>
                        </div>
                    }.into_view();
                }
                match state.user.get() {
                    None => view! { <Loading /> }.into_view(),
                    Some(user) if !user.is_admin => view! {
                        <div class="empty-state" role="alert">
                            <p>"You do not have administrator rights"</p>
                        </div>
                    }.into_view(),
                    Some(_) => view! {
                        <nav class="admin__nav">
                            {SECTIONS.iter().map(|&(target, label)| view! {
                                <button
                                    type="button"
                                    class="tab"
                                    class:tab_active=move || section.get() == target
                                    on:click=move |_| set_section.set(target)
                                >
                                    {label}
                                </button>
                            }).collect_view()}
                        </nav>
                        {move || match section.get() {
                            Section::Books => view! { <BooksSection /> }.into_view(),
                            Section::Dict(kind) => view! { <DictSection kind=kind /> }.into_view(),
                            Section::Orders => view! { <OrdersSection /> }.into_view(),
                            Section::Users => view! { <UsersSection /> }.into_view(),
                        }}
                    }.into_view(),
                }
            }}
        </section>
    }
}

fn confirm(message: &str) -> bool {
    window().confirm_with_message(message).unwrap_or(false)
}

/// First file picked in a file input
fn picked_file(input: &NodeRef<Input>) -> Option<web_sys::File> {
    input.get_untracked()?.files()?.get(0)
}

// ============ Books ============

/// Raw book form inputs
#[derive(Clone, Debug, Default, PartialEq)]
struct BookInputs {
    title: String,
    price: String,
    publication_year: String,
    pages: String,
    isbn: String,
    genre_name: String,
    publisher_name: String,
    author_names: String,
    description: String,
}

fn optional_text(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

fn optional_number(value: &str, label: &str, min: i32, max: i32) -> Result<Option<i32>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<i32>() {
        Ok(n) if (min..=max).contains(&n) => Ok(Some(n)),
        _ => Err(format!("{} must be a whole number from {} to {}", label, min, max)),
    }
}

impl BookInputs {
    fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            price: format_price(book.price),
            publication_year: book.publication_year.map(|y| y.to_string()).unwrap_or_default(),
            pages: book.pages.map(|p| p.to_string()).unwrap_or_default(),
            isbn: book.isbn.clone().unwrap_or_default(),
            genre_name: book.genre_name.clone().unwrap_or_default(),
            publisher_name: book.publisher_name.clone().unwrap_or_default(),
            author_names: book.author_names.join(", "),
            description: book.description.clone().unwrap_or_default(),
        }
    }

    /// Validate and convert to the API payload
    fn to_form(&self) -> Result<BookForm, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Enter the title".to_string());
        }
        let price = self
            .price
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .ok_or_else(|| "Price must be a non-negative number".to_string())?;

        Ok(BookForm {
            title: title.to_string(),
            price,
            description: optional_text(&self.description),
            publication_year: optional_number(&self.publication_year, "Year", 0, 2100)?,
            pages: optional_number(&self.pages, "Pages", 1, 100_000)?,
            isbn: optional_text(&self.isbn),
            genre_name: optional_text(&self.genre_name),
            publisher_name: optional_text(&self.publisher_name),
            author_names: self
                .author_names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }
}

/// Names offered in the genre/publisher/author datalists
#[derive(Clone, Debug, Default)]
struct Suggestions {
    genres: Vec<String>,
    publishers: Vec<String>,
    authors: Vec<String>,
}

async fn load_suggestions() -> Suggestions {
    let names = |entries: Result<Vec<DictEntry>, api::ApiError>| -> Vec<String> {
        entries
            .map(|list| list.into_iter().map(|e| e.name).collect())
            .unwrap_or_default()
    };
    Suggestions {
        genres: names(api::fetch_dict(DictKind::Genres).await),
        publishers: names(api::fetch_dict(DictKind::Publishers).await),
        authors: names(api::fetch_dict(DictKind::Authors).await),
    }
}

#[component]
fn BooksSection() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let books = create_rw_signal(Vec::<Book>::new());
    let loading = create_rw_signal(true);
    let suggestions = create_rw_signal(Suggestions::default());

    let reload = move || {
        spawn_local(async move {
            match api::fetch_books("skip=0&limit=100").await {
                Ok(list) => books.set(list),
                Err(e) => state.show_error(&e.message),
            }
            loading.set(false);
            suggestions.set(load_suggestions().await);
        });
    };
    reload();

    let on_delete = move |book: Book| {
        if !confirm(&format!("Delete \"{}\"?", book.title)) {
            return;
        }
        spawn_local(async move {
            match api::delete_book(book.book_id).await {
                Ok(()) => {
                    books.update(|list| list.retain(|b| b.book_id != book.book_id));
                    state.show_success("Book deleted");
                }
                Err(e) => state.show_error(&e.message),
            }
        });
    };

    view! {
        <datalist id="genre-names">
            {move || suggestions.get().genres.into_iter().map(|name| view! { <option value=name /> }).collect_view()}
        </datalist>
        <datalist id="publisher-names">
            {move || suggestions.get().publishers.into_iter().map(|name| view! { <option value=name /> }).collect_view()}
        </datalist>
        <datalist id="author-names">
            {move || suggestions.get().authors.into_iter().map(|name| view! { <option value=name /> }).collect_view()}
        </datalist>

        <h2>"New book"</h2>
        <BookEditor
            initial=BookInputs::default()
            submit_label="Create"
            on_saved=Callback::new(move |_: Book| reload())
            book_id=None
        />

        <h2>"Books"</h2>
        {move || {
            if loading.get() {
                return view! { <ListSkeleton count=5 /> }.into_view();
            }
            view! {
                <ul class="admin-list">
                    <For
                        each=move || books.get()
                        key=|book| (book.book_id, book.title.clone(), book.cover_image.clone())
                        children=move |book| view! {
                            <AdminBookRow book=book on_delete=on_delete on_saved=Callback::new(move |_: Book| reload()) />
                        }
                    />
                </ul>
            }.into_view()
        }}
    }
}

#[component]
fn AdminBookRow(
    book: Book,
    on_delete: impl Fn(Book) + Copy + 'static,
    on_saved: Callback<Book>,
) -> impl IntoView {
    let (editing, set_editing) = create_signal(false);
    let inputs = BookInputs::from_book(&book);
    let book_id = book.book_id;
    let label = format!(
        "{} · {} · {}",
        book.title,
        book.authors_label(),
        format_price(book.price)
    );
    let row_book = book.clone();

    view! {
        <li class="admin-list__item">
            <div class="admin-list__row">
                <span>{label}</span>
                <button type="button" class="btn" on:click=move |_| set_editing.update(|e| *e = !*e)>
                    {move || if editing.get() { "Close" } else { "Edit" }}
                </button>
                <button type="button" class="btn btn_danger" on:click=move |_| on_delete(row_book.clone())>
                    "Delete"
                </button>
            </div>
            <Show when=move || editing.get()>
                <BookEditor
                    initial=inputs.clone()
                    submit_label="Save"
                    on_saved=on_saved
                    book_id=Some(book_id)
                />
            </Show>
        </li>
    }
}

/// What the editor does once the book itself has been saved
#[derive(Debug, PartialEq)]
struct Settled {
    /// Latest copy of the book for the list
    book: Book,
    /// Clear the inputs so a resubmit cannot create the book twice
    reset_inputs: bool,
    error: Option<String>,
}

/// Fold the optional cover upload into a successful save
fn settle(editing: bool, saved: Book, cover: Option<Result<Book, ApiError>>) -> Settled {
    let reset_inputs = !editing;
    match cover {
        None => Settled { book: saved, reset_inputs, error: None },
        Some(Ok(with_cover)) => Settled { book: with_cover, reset_inputs, error: None },
        Some(Err(e)) => Settled {
            error: Some(format!(
                "Book \"{}\" was saved, but the cover upload failed: {}",
                saved.title, e.message
            )),
            book: saved,
            reset_inputs,
        },
    }
}

/// Create form (`book_id` is `None`) or inline edit form
#[component]
fn BookEditor(
    initial: BookInputs,
    submit_label: &'static str,
    on_saved: Callback<Book>,
    book_id: Option<i64>,
) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let inputs = create_rw_signal(initial);
    let error = create_rw_signal(None::<String>);
    let saving = create_rw_signal(false);
    let cover_input = create_node_ref::<Input>();

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let form = match inputs.with_untracked(BookInputs::to_form) {
            Ok(form) => form,
            Err(message) => {
                error.set(Some(message));
                return;
            }
        };
        error.set(None);
        saving.set(true);
        let cover = picked_file(&cover_input);

        spawn_local(async move {
            let saved = match book_id {
                Some(id) => api::update_book(id, &form).await,
                None => api::create_book(&form).await,
            };
            let saved = match saved {
                Ok(book) => book,
                Err(e) => {
                    error.set(Some(e.message));
                    saving.set(false);
                    return;
                }
            };
            let uploaded = match cover {
                Some(file) => Some(api::upload_cover(saved.book_id, &file).await),
                None => None,
            };

            let settled = settle(book_id.is_some(), saved, uploaded);
            if settled.reset_inputs {
                inputs.set(BookInputs::default());
            }
            if let Some(input) = cover_input.get_untracked() {
                input.set_value("");
            }
            match settled.error {
                Some(message) => error.set(Some(message)),
                None => state.show_success(if book_id.is_some() { "Book saved" } else { "Book created" }),
            }
            on_saved.call(settled.book);
            saving.set(false);
        });
    };

    let text = move |label: &'static str,
                     list: Option<&'static str>,
                     get: fn(&BookInputs) -> String,
                     set: fn(&mut BookInputs, String)| {
        view! {
            <label class="field">
                <span class="field__label">{label}</span>
                <input
                    class="input"
                    list=list
                    prop:value=move || inputs.with(get)
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        inputs.update(|i| set(i, value));
                    }
                />
            </label>
        }
    };

    view! {
        <form class="form form_grid" on:submit=on_submit>
            {move || error.get().map(|message| view! { <div class="form-summary" role="alert">{message}</div> })}
            {text("Title", None, |i| i.title.clone(), |i, v| i.title = v)}
            {text("Price", None, |i| i.price.clone(), |i, v| i.price = v)}
            {text("Year", None, |i| i.publication_year.clone(), |i, v| i.publication_year = v)}
            {text("Pages", None, |i| i.pages.clone(), |i, v| i.pages = v)}
            {text("ISBN", None, |i| i.isbn.clone(), |i, v| i.isbn = v)}
            {text("Genre", Some("genre-names"), |i| i.genre_name.clone(), |i, v| i.genre_name = v)}
            {text("Publisher", Some("publisher-names"), |i| i.publisher_name.clone(), |i, v| i.publisher_name = v)}
            {text("Authors (comma-separated)", Some("author-names"), |i| i.author_names.clone(), |i, v| i.author_names = v)}
            <label class="field field_wide">
                <span class="field__label">"Description"</span>
                <textarea
                    class="input"
                    prop:value=move || inputs.with(|i| i.description.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        inputs.update(|i| i.description = value);
                    }
                />
            </label>
            <label class="field">
                <span class="field__label">"Cover"</span>
                <input type="file" accept="image/*" node_ref=cover_input />
            </label>
            <button type="submit" class="btn btn_primary" disabled=saving>{submit_label}</button>
        </form>
    }
}

// ============ Dictionaries ============

#[component]
fn DictSection(kind: DictKind) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let entries = create_rw_signal(Vec::<DictEntry>::new());
    let loading = create_rw_signal(true);
    let (new_name, set_new_name) = create_signal(String::new());

    let reload = move || {
        spawn_local(async move {
            match api::fetch_dict(kind).await {
                Ok(list) => entries.set(list),
                Err(e) => state.show_error(&e.message),
            }
            loading.set(false);
        });
    };
    reload();

    let on_create = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let name = new_name.get_untracked().trim().to_string();
        if name.is_empty() {
            state.show_error("Enter a name");
            return;
        }
        spawn_local(async move {
            match api::create_dict(kind, &name).await {
                Ok(()) => {
                    set_new_name.set(String::new());
                    state.show_success("Entry added");
                    reload();
                }
                Err(e) => state.show_error(&e.message),
            }
        });
    };

    let on_rename = move |id: i64, name: String| {
        let name = name.trim().to_string();
        if name.is_empty() {
            state.show_error("Enter a name");
            return;
        }
        spawn_local(async move {
            match api::rename_dict(kind, id, &name).await {
                Ok(()) => {
                    state.show_success("Entry renamed");
                    reload();
                }
                Err(e) => state.show_error(&e.message),
            }
        });
    };

    let on_delete = move |entry: DictEntry| {
        if !confirm(&format!("Delete \"{}\"?", entry.name)) {
            return;
        }
        spawn_local(async move {
            match api::delete_dict(kind, entry.id).await {
                Ok(()) => {
                    entries.update(|list| list.retain(|e| e.id != entry.id));
                    state.show_success("Entry deleted");
                }
                Err(e) => state.show_error(&e.message),
            }
        });
    };

    view! {
        <h2>{kind.title()}</h2>
        <form class="form form_inline" on:submit=on_create>
            <input
                class="input"
                placeholder="New entry"
                aria-label="New entry name"
                prop:value=new_name
                on:input=move |ev| set_new_name.set(event_target_value(&ev))
            />
            <button type="submit" class="btn btn_primary">"Add"</button>
        </form>
        {move || {
            if loading.get() {
                return view! { <ListSkeleton count=4 /> }.into_view();
            }
            view! {
                <ul class="admin-list">
                    <For
                        each=move || entries.get()
                        key=|entry| (entry.id, entry.name.clone())
                        children=move |entry| {
                            let (name, set_name) = create_signal(entry.name.clone());
                            let id = entry.id;
                            view! {
                                <li class="admin-list__row">
                                    <input
                                        class="input"
                                        aria-label="Name"
                                        prop:value=name
                                        on:input=move |ev| set_name.set(event_target_value(&ev))
                                    />
                                    <button type="button" class="btn" on:click=move |_| on_rename(id, name.get_untracked())>
                                        "Rename"
                                    </button>
                                    <button type="button" class="btn btn_danger" on:click=move |_| on_delete(entry.clone())>
                                        "Delete"
                                    </button>
                                </li>
                            }
                        }
                    />
                </ul>
            }.into_view()
        }}
    }
}

// ============ Orders ============

#[component]
fn OrdersSection() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let orders = create_rw_signal(Vec::<Order>::new());
    let loading = create_rw_signal(true);

    spawn_local(async move {
        match api::fetch_all_orders().await {
            Ok(list) => orders.set(list),
            Err(e) => state.show_error(&e.message),
        }
        loading.set(false);
    });

    let save_status = move |order_id: i64, status: String| {
        spawn_local(async move {
            match api::update_order_status(order_id, &status).await {
                Ok(updated) => {
                    orders.update(|list| {
                        if let Some(order) = list.iter_mut().find(|o| o.order_id == order_id) {
                            *order = updated;
                        }
                    });
                    state.show_success(&format!("Order #{} is now {}", order_id, status));
                }
                Err(e) => state.show_error(&e.message),
            }
        });
    };

    view! {
        <h2>"Orders"</h2>
        {move || {
            if loading.get() {
                return view! { <ListSkeleton count=4 /> }.into_view();
            }
            let list = orders.get();
            if list.is_empty() {
                return view! { <p class="muted">"No orders yet."</p> }.into_view();
            }
            view! {
                <table class="table">
                    <thead>
                        <tr>
                            <th>"Order"</th>
                            <th>"Customer"</th>
                            <th>"Date"</th>
                            <th>"Total"</th>
                            <th>"Status"</th>
                        </tr>
                    </thead>
                    <tbody>
                        {list.into_iter().map(|order| {
                            let order_id = order.order_id;
                            let (status, set_status) = create_signal(order.status.clone());
                            view! {
                                <tr>
                                    <td>{format!("#{}", order_id)}</td>
                                    <td>{format!("User #{}", order.user_id)}</td>
                                    <td>{order.created_at.format("%Y-%m-%d %H:%M").to_string()}</td>
                                    <td>{format_price(order.total_amount)}</td>
                                    <td class="table__actions">
                                        <select
                                            class="input"
                                            aria-label="Status"
                                            on:change=move |ev| set_status.set(event_target_value(&ev))
                                        >
                                            {ORDER_STATUSES.iter().map(|&value| {
                                                let selected = order.status == value;
                                                view! { <option value=value selected=selected>{value}</option> }
                                            }).collect_view()}
                                        </select>
                                        <button type="button" class="btn" on:click=move |_| save_status(order_id, status.get_untracked())>
                                            "Save"
                                        </button>
                                    </td>
                                </tr>
                            }
                        }).collect_view()}
                    </tbody>
                </table>
            }.into_view()
        }}
    }
}

// ============ Users ============

#[component]
fn UsersSection() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let users = create_rw_signal(Vec::<AdminUser>::new());
    let loading = create_rw_signal(true);

    spawn_local(async move {
        match api::fetch_users().await {
            Ok(list) => users.set(list),
            Err(e) => state.show_error(&e.message),
        }
        loading.set(false);
    });

    let toggle_admin = move |user_id: i64, is_admin: bool| {
        spawn_local(async move {
            match api::set_user_admin(user_id, is_admin).await {
                Ok(updated) => {
                    users.update(|list| {
                        if let Some(user) = list.iter_mut().find(|u| u.user.user_id == user_id) {
                            *user = updated;
                        }
                    });
                    state.show_success("Permissions updated");
                }
                Err(e) => state.show_error(&e.message),
            }
        });
    };

    let current_id = move || state.user.with(|u| u.as_ref().map(|u| u.user_id));

    view! {
        <h2>"Users"</h2>
        {move || {
            if loading.get() {
                return view! { <ListSkeleton count=4 /> }.into_view();
            }
            view! {
                <table class="table">
                    <thead>
                        <tr>
                            <th>"Email"</th>
                            <th>"Name"</th>
                            <th>"Registered"</th>
                            <th>"Role"</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        {users.get().into_iter().map(|entry| {
                            let user_id = entry.user.user_id;
                            let is_admin = entry.user.is_admin;
                            let is_self = current_id() == Some(user_id);
                            view! {
                                <tr>
                                    <td>{entry.user.email}</td>
                                    <td>{entry.user.full_name}</td>
                                    <td>{entry.created_at.format("%Y-%m-%d").to_string()}</td>
                                    <td>{if is_admin { "Administrator" } else { "Customer" }}</td>
                                    <td>
                                        <button
                                            type="button"
                                            class="btn"
                                            disabled=is_self
                                            on:click=move |_| toggle_admin(user_id, !is_admin)
                                        >
                                            {if is_admin { "Revoke admin" } else { "Make admin" }}
                                        </button>
                                    </td>
                                </tr>
                            }
                        }).collect_view()}
                    </tbody>
                </table>
            }.into_view()
        }}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> BookInputs {
        BookInputs {
            title: "  Dune ".to_string(),
            price: "450,5".to_string(),
            publication_year: "1965".to_string(),
            author_names: "Frank Herbert, , Brian Herbert ".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_book_inputs_to_form() {
        let form = inputs().to_form().unwrap();
        assert_eq!(form.title, "Dune");
        assert_eq!(form.price, 450.5);
        assert_eq!(form.publication_year, Some(1965));
        assert_eq!(form.pages, None);
        assert_eq!(form.genre_name, None);
        assert_eq!(form.author_names, vec!["Frank Herbert", "Brian Herbert"]);
    }

    #[test]
    fn test_book_inputs_rejects_bad_values() {
        let mut bad = inputs();
        bad.title = " ".to_string();
        assert_eq!(bad.to_form().unwrap_err(), "Enter the title");

        let mut bad = inputs();
        bad.price = "-3".to_string();
        assert!(bad.to_form().is_err());

        let mut bad = inputs();
        bad.pages = "many".to_string();
        assert!(bad.to_form().unwrap_err().starts_with("Pages"));
    }

    #[test]
    fn test_emptied_inputs_serialize_as_null() {
        let mut edited = BookInputs::from_book(&book(None));
        edited.publication_year.clear();
        edited.pages = " ".to_string();
        edited.description.clear();
        edited.genre_name.clear();

        let body = serde_json::to_value(edited.to_form().unwrap()).unwrap();
        assert_eq!(body["publication_year"], serde_json::Value::Null);
        assert_eq!(body["pages"], serde_json::Value::Null);
        assert_eq!(body["description"], serde_json::Value::Null);
        assert_eq!(body["genre_name"], serde_json::Value::Null);
        assert_eq!(body["isbn"], "978-0441013593");
        assert!(body.as_object().unwrap().contains_key("publisher_name"));
    }

    fn book(cover_image: Option<&str>) -> Book {
        serde_json::from_value(serde_json::json!({
            "book_id": 7,
            "title": "Dune",
            "price": 450.0,
            "publication_year": 1965,
            "pages": 412,
            "isbn": "978-0441013593",
            "description": "Desert planet",
            "genre_name": "Science Fiction",
            "cover_image": cover_image,
            "author_names": ["Frank Herbert"]
        }))
        .unwrap()
    }

    #[test]
    fn test_settle_created_book_with_failed_cover() {
        let failure = ApiError {
            status: Some(400),
            message: "Cover is too large".to_string(),
        };
        let settled = settle(false, book(None), Some(Err(failure)));

        // the book exists now, so the create form must not keep its inputs
        assert!(settled.reset_inputs);
        assert_eq!(settled.book.book_id, 7);
        assert_eq!(
            settled.error.as_deref(),
            Some("Book \"Dune\" was saved, but the cover upload failed: Cover is too large")
        );
    }

    #[test]
    fn test_settle_success_paths() {
        let with_cover = book(Some("/static/covers/book_7_x.jpg"));
        let settled = settle(false, book(None), Some(Ok(with_cover.clone())));
        assert_eq!(settled.book, with_cover);
        assert!(settled.reset_inputs);
        assert!(settled.error.is_none());

        let settled = settle(true, book(None), None);
        assert!(!settled.reset_inputs);
        assert!(settled.error.is_none());
    }
}
