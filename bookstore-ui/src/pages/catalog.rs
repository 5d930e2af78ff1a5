//! Catalog Page
//!
//! Book grid with debounced filters, quick presets and pagination.

use leptos::*;
use leptos_router::*;

use crate::api::{self, Author, Book, Genre};
use crate::catalog::{
    FilterLabels, Filters, Pagination, QuickFilter, QuickFilters, FILTER_DEBOUNCE_MS,
    ORDER_OPTIONS, PAGE_SIZE, SEARCH_DEBOUNCE_MS,
};
use crate::components::{BookCard, BookCardSkeletons, Pager};
use crate::debounce::Debouncer;

/// Catalog page component
#[component]
pub fn Catalog() -> impl IntoView {
    let filters = create_rw_signal(Filters::default());
    let quick = create_rw_signal(QuickFilters::default());
    let pagination = create_rw_signal(Pagination::default());
    let books = create_rw_signal(Vec::<Book>::new());
    let loading = create_rw_signal(true);
    let load_error = create_rw_signal(None::<String>);
    let genres = create_rw_signal(Vec::<Genre>::new());
    let authors = create_rw_signal(Vec::<Author>::new());
    let (filters_open, set_filters_open) = create_signal(false);
    // only the latest request may update the grid
    let request_seq = create_rw_signal(0u32);

    let debouncer = Debouncer::new();

    let load = move || {
        let page = pagination.with_untracked(|p| p.page);
        let query = filters.with_untracked(|f| f.to_query(page));
        request_seq.update(|seq| *seq += 1);
        let ticket = request_seq.get_untracked();

        loading.set(true);
        load_error.set(None);

        spawn_local(async move {
            let result = api::fetch_books(&query).await;
            if request_seq.get_untracked() != ticket {
                return;
            }
            match result {
                Ok(list) => {
                    pagination.update(|p| p.after_load(list.len()));
                    books.set(list);
                }
                Err(e) => {
                    pagination.update(|p| p.after_load(0));
                    books.set(Vec::new());
                    load_error.set(Some(e.message));
                }
            }
            loading.set(false);
        });
    };

    // Dictionaries for the filter selects
    spawn_local(async move {
        if let Ok(list) = api::fetch_genres().await {
            genres.set(list);
        }
        if let Ok(list) = api::fetch_authors().await {
            authors.set(list);
        }
    });

    // `q` from the URL: initial load and header searches
    let query = use_query_map();
    create_effect({
        let debouncer = debouncer.clone();
        move |_| {
            let q = query.with(|map| map.get("q").cloned().unwrap_or_default());
            debouncer.cancel();
            filters.update(|f| f.q = q);
            pagination.update(Pagination::reset);
            load();
        }
    });

    let on_search_input = {
        let debouncer = debouncer.clone();
        move |ev: ev::Event| {
            let value = event_target_value(&ev);
            filters.update(|f| f.q = value);
            pagination.update(Pagination::reset);
            debouncer.schedule(SEARCH_DEBOUNCE_MS, load);
        }
    };

    // Enter or the search button load right away
    let on_submit = {
        let debouncer = debouncer.clone();
        move |ev: ev::SubmitEvent| {
            ev.prevent_default();
            debouncer.cancel();
            pagination.update(Pagination::reset);
            load();
        }
    };

    let change_filter = {
        let debouncer = debouncer.clone();
        move |apply: fn(&mut Filters, String), value: String| {
            filters.update(|f| apply(f, value));
            quick.set(filters.with_untracked(Filters::sync_quick_from_inputs));
            pagination.update(Pagination::reset);
            debouncer.schedule(FILTER_DEBOUNCE_MS, load);
        }
    };

    let toggle_quick = {
        let debouncer = debouncer.clone();
        move |kind: QuickFilter, checked: bool| {
            let mut presets = quick.get_untracked();
            filters.update(|f| f.apply_quick(&mut presets, kind, checked));
            quick.set(presets);
            pagination.update(Pagination::reset);
            debouncer.schedule(FILTER_DEBOUNCE_MS, load);
        }
    };

    let reset_filters = {
        let debouncer = debouncer.clone();
        move || {
            debouncer.cancel();
            filters.set(Filters::default());
            quick.set(QuickFilters::default());
            pagination.update(Pagination::reset);
            load();
        }
    };

    let on_prev = Callback::new(move |_: ()| {
        let mut moved = false;
        pagination.update(|p| moved = p.prev());
        if moved {
            load();
        }
    });

    let on_next = Callback::new(move |_: ()| {
        let mut moved = false;
        pagination.update(|p| moved = p.next());
        if moved {
            load();
        }
    });

    // Human-readable active filters, with dictionary names resolved
    let active_filters = move || {
        genres.with(|genres| {
            authors.with(|authors| {
                filters.with(|f| {
                    let genre = genres
                        .iter()
                        .find(|g| g.genre_id.to_string() == f.genre_id)
                        .map(|g| g.name.as_str());
                    let author = authors
                        .iter()
                        .find(|a| a.author_id.to_string() == f.author_id)
                        .map(|a| a.full_name.as_str());
                    (
                        f.describe_active(FilterLabels { genre, author }),
                        f.announcement(FilterLabels { genre, author }),
                    )
                })
            })
        })
    };

    let quick_box = move |kind: QuickFilter, label: &'static str| {
        let toggle = toggle_quick.clone();
        let checked = move || {
            let presets = quick.get();
            match kind {
                QuickFilter::New => presets.new,
                QuickFilter::Classic => presets.classic,
                QuickFilter::Budget => presets.budget,
                QuickFilter::Premium => presets.premium,
            }
        };
        view! {
            <label class="quick-filter">
                <input
                    type="checkbox"
                    prop:checked=checked
                    on:change=move |ev| toggle(kind, event_target_checked(&ev))
                />
                {label}
            </label>
        }
    };

    let number_input = {
        let change = change_filter.clone();
        move |label: &'static str,
              get: fn(&Filters) -> String,
              apply: fn(&mut Filters, String)| {
            let change = change.clone();
            view! {
                <label class="field">
                    <span class="field__label">{label}</span>
                    <input
                        type="number"
                        min="0"
                        class="input"
                        prop:value=move || filters.with(get)
                        on:input=move |ev| change(apply, event_target_value(&ev))
                    />
                </label>
            }
        }
    };

    let on_genre = {
        let change = change_filter.clone();
        move |ev: ev::Event| change(|f, v| f.genre_id = v, event_target_value(&ev))
    };
    let on_author = {
        let change = change_filter.clone();
        move |ev: ev::Event| change(|f, v| f.author_id = v, event_target_value(&ev))
    };
    let on_order = {
        let change = change_filter.clone();
        move |ev: ev::Event| change(|f, v| f.order_by = v, event_target_value(&ev))
    };

    let reset_panel = reset_filters.clone();
    let skeletons = PAGE_SIZE as usize;

    view! {
        <section class="catalog">
            <h1>"Catalog"</h1>

            <form class="filters" on:submit=on_submit>
                <div class="filters__search">
                    <input
                        type="search"
                        class="input"
                        placeholder="Title"
                        aria-label="Search by title"
                        prop:value=move || filters.with(|f| f.q.clone())
                        on:input=on_search_input
                    />
                    <button type="submit" class="btn btn_primary">"Search"</button>
                </div>

                <button
                    type="button"
                    class="filters__toggle"
                    aria-controls="filters-panel"
                    aria-expanded=move || filters_open.get().to_string()
                    on:click=move |_| set_filters_open.update(|open| *open = !*open)
                >
                    "Filters"
                </button>

                <div id="filters-panel" class="filters__panel" class:filters__panel_open=filters_open>
                    <label class="field">
                        <span class="field__label">"Genre"</span>
                        <select
                            class="input"
                            prop:value=move || filters.with(|f| f.genre_id.clone())
                            on:change=on_genre
                        >
                            <option value="">"All genres"</option>
                            <For
                                each=move || genres.get()
                                key=|g| g.genre_id
                                children=|g| view! {
                                    <option value=g.genre_id.to_string()>{g.name}</option>
                                }
                            />
                        </select>
                    </label>

                    <label class="field">
                        <span class="field__label">"Author"</span>
                        <select
                            class="input"
                            prop:value=move || filters.with(|f| f.author_id.clone())
                            on:change=on_author
                        >
                            <option value="">"All authors"</option>
                            <For
                                each=move || authors.get()
                                key=|a| a.author_id
                                children=|a| view! {
                                    <option value=a.author_id.to_string()>{a.full_name}</option>
                                }
                            />
                        </select>
                    </label>

                    {number_input("Price from", |f| f.min_price.clone(), |f, v| f.min_price = v)}
                    {number_input("Price to", |f| f.max_price.clone(), |f, v| f.max_price = v)}
                    {number_input("Year from", |f| f.min_year.clone(), |f, v| f.min_year = v)}
                    {number_input("Year to", |f| f.max_year.clone(), |f, v| f.max_year = v)}

                    <label class="field">
                        <span class="field__label">"Sort"</span>
                        <select
                            class="input"
                            prop:value=move || filters.with(|f| f.order_by.clone())
                            on:change=on_order
                        >
                            {ORDER_OPTIONS.iter().map(|&(value, label)| view! {
                                <option value=value>{label}</option>
                            }).collect_view()}
                        </select>
                    </label>

                    <fieldset class="quick-filters">
                        <legend>"Quick filters"</legend>
                        {quick_box(QuickFilter::New, "New (2015+)")}
                        {quick_box(QuickFilter::Classic, "Classics (up to 1990)")}
                        {quick_box(QuickFilter::Budget, "Up to 500")}
                        {quick_box(QuickFilter::Premium, "From 1500")}
                    </fieldset>

                    <button type="button" class="btn" on:click=move |_| reset_panel()>
                        "Reset filters"
                    </button>
                </div>
            </form>

            <p class="filters__status" aria-live="polite">{move || active_filters().1}</p>

            {move || {
                if loading.get() {
                    return view! { <BookCardSkeletons count=skeletons /> }.into_view();
                }
                if let Some(message) = load_error.get() {
                    return view! {
                        <div class="empty-state" role="alert">
                            <p>"Failed to load books: " {message}</p>
                        </div>
                    }.into_view();
                }
                let list = books.get();
                if list.is_empty() {
                    let active = active_filters().0;
                    let reset = reset_filters.clone();
                    return view! {
                        <div class="empty-state">
                            <h2>"No books found"</h2>
                            {(!active.is_empty()).then(|| view! {
                                <p>"Active filters:"</p>
                                <ul class="empty-state__filters">
                                    {active.into_iter().map(|item| view! { <li>{item}</li> }).collect_view()}
                                </ul>
                            })}
                            <button type="button" class="btn btn_primary" on:click=move |_| reset()>
                                "Reset filters"
                            </button>
                        </div>
                    }.into_view();
                }
                view! {
                    <div class="book-grid">
                        {list.into_iter().map(|book| view! { <BookCard book=book /> }).collect_view()}
                    </div>
                }.into_view()
            }}

            <Pager pagination=pagination on_prev=on_prev on_next=on_next />
        </section>
    }
}
