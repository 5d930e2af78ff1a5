//! Profile Page
//!
//! Account details, profile and password forms, delivery addresses.

use leptos::*;
use leptos_router::*;

use crate::api::{self, Address, NewAddress, Profile};
use crate::components::{FormField, FormState, FormSummary, Loading};
use crate::state::global::GlobalState;
use crate::validation::{self, min_length, required, FormRules};

fn password_rules() -> FormRules {
    FormRules::new()
        .field("current_password", vec![required("current password")])
        .field(
            "new_password",
            vec![required("new password"), min_length("New password", 8)],
        )
}

fn address_rules() -> FormRules {
    FormRules::new()
        .field("city", vec![required("city"), min_length("City", 2)])
        .field("street", vec![required("street"), min_length("Street", 2)])
        .field("house", vec![required("house")])
        .field(
            "postal_code",
            vec![required("postal code"), min_length("Postal code", 3)],
        )
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let profile = create_rw_signal(None::<Profile>);
    let loading = create_rw_signal(state.is_logged_in());

    let profile_form = FormState::new(validation::profile_rules());

    let fill_form = move |loaded: &Profile| {
        profile_form.set("email", loaded.user.email.clone());
        profile_form.set("full_name", loaded.user.full_name.clone());
        profile_form.set("phone", loaded.user.phone.clone().unwrap_or_default());
    };

    if state.is_logged_in() {
        spawn_local(async move {
            match api::fetch_profile().await {
                Ok(loaded) => {
                    fill_form(&loaded);
                    profile.set(Some(loaded));
                }
                Err(e) => state.show_error(&e.message),
            }
            loading.set(false);
        });
    }

    let on_profile_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if !profile_form.validate_all() {
            return;
        }
        let email = profile_form.value("email");
        let full_name = profile_form.value("full_name");
        let phone = profile_form.optional("phone");

        spawn_local(async move {
            match api::update_profile(&email, &full_name, phone.as_deref()).await {
                Ok(updated) => {
                    fill_form(&updated);
                    profile.set(Some(updated));
                    state.refresh_user();
                    state.show_success("Profile updated");
                }
                Err(e) => profile_form.show_error(e.message),
            }
        });
    };

    view! {
        <section class="profile">
            <h1>"Profile"</h1>
            {move || {
                if !state.is_logged_in() {
                    return view! {
                        <div class="empty-state">
                            <p>"Sign in to see your profile."</p>
                            <A href="/login" class="btn btn_primary">"Login"</A>
                        </div>
                    }.into_view();
                }
                if loading.get() {
                    return view! { <Loading /> }.into_view();
                }
                let Some(current) = profile.get() else {
                    return view! { <p class="empty-state">"Profile is unavailable."</p> }.into_view();
                };
                let role = if current.user.is_admin { "Administrator" } else { "Customer" };
                view! {
                    <dl class="profile__facts">
                        <dt>"Email"</dt>
                        <dd>{current.user.email.clone()}</dd>
                        <dt>"Name"</dt>
                        <dd>{current.user.full_name.clone()}</dd>
                        <dt>"Phone"</dt>
                        <dd>{current.user.phone.clone().unwrap_or_else(|| "Not specified".to_string())}</dd>
                        <dt>"Role"</dt>
                        <dd>{role}</dd>
                    </dl>
                }.into_view()
            }}

            <Show when=move || profile.with(Option::is_some)>
                <h2>"Edit profile"</h2>
                <form class="form" novalidate=true on:submit=on_profile_submit>
                    <FormSummary form=profile_form />
                    <FormField form=profile_form name="email" label="Email" input_type="email" />
                    <FormField form=profile_form name="full_name" label="Full name" />
                    <FormField form=profile_form name="phone" label="Phone" input_type="tel" />
                    <button type="submit" class="btn btn_primary">"Save"</button>
                </form>

                <PasswordForm />
                <Addresses profile=profile />
            </Show>
        </section>
    }
}

#[component]
fn PasswordForm() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let form = FormState::new(password_rules());

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if !form.validate_all() {
            return;
        }
        let current = form.signal("current_password").get_untracked();
        let new = form.signal("new_password").get_untracked();

        spawn_local(async move {
            match api::change_password(&current, &new).await {
                Ok(detail) => {
                    form.reset();
                    state.show_success(&detail);
                }
                Err(e) => form.show_error(e.message),
            }
        });
    };

    view! {
        <h2>"Change password"</h2>
        <form class="form" novalidate=true on:submit=on_submit>
            <FormSummary form=form />
            <FormField
                form=form
                name="current_password"
                label="Current password"
                input_type="password"
                autocomplete="current-password"
            />
            <FormField
                form=form
                name="new_password"
                label="New password"
                input_type="password"
                autocomplete="new-password"
            />
            <button type="submit" class="btn btn_primary">"Change password"</button>
        </form>
    }
}

#[component]
fn Addresses(profile: RwSignal<Option<Profile>>) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let form = FormState::new(address_rules());
    let (make_default, set_make_default) = create_signal(false);

    let addresses = move || {
        profile.with(|p| p.as_ref().map(|p| p.addresses.clone()).unwrap_or_default())
    };

    let set_addresses = move |update: &dyn Fn(&mut Vec<Address>)| {
        profile.update(|p| {
            if let Some(p) = p {
                update(&mut p.addresses);
                // default first, then by id
                p.addresses
                    .sort_by_key(|a| (!a.is_default, a.address_id));
            }
        });
    };

    let on_add = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if !form.validate_all() {
            return;
        }
        let address = NewAddress {
            city: form.value("city"),
            street: form.value("street"),
            house: form.value("house"),
            postal_code: form.value("postal_code"),
            is_default: make_default.get_untracked(),
        };

        spawn_local(async move {
            match api::add_address(&address).await {
                Ok(created) => {
                    set_addresses(&|list| {
                        if created.is_default {
                            list.iter_mut().for_each(|a| a.is_default = false);
                        }
                        list.push(created.clone());
                    });
                    form.reset();
                    set_make_default.set(false);
                    state.show_success("Address added");
                }
                Err(e) => form.show_error(e.message),
            }
        });
    };

    let make_default_address = move |address_id: i64| {
        spawn_local(async move {
            match api::make_default_address(address_id).await {
                Ok(_) => {
                    set_addresses(&|list| {
                        list.iter_mut()
                            .for_each(|a| a.is_default = a.address_id == address_id);
                    });
                    state.show_success("Default address updated");
                }
                Err(e) => state.show_error(&e.message),
            }
        });
    };

    let delete = move |address_id: i64| {
        spawn_local(async move {
            match api::delete_address(address_id).await {
                Ok(()) => {
                    set_addresses(&|list| list.retain(|a| a.address_id != address_id));
                    state.show_success("Address deleted");
                }
                Err(e) => state.show_error(&e.message),
            }
        });
    };

    view! {
        <h2>"Addresses"</h2>
        {move || {
            let list = addresses();
            if list.is_empty() {
                return view! { <p class="muted">"No saved addresses."</p> }.into_view();
            }
            view! {
                <ul class="addresses">
                    {list.into_iter().map(|address| {
                        let id = address.address_id;
                        view! {
                            <li class="addresses__item">
                                <span>{address.one_line()}</span>
                                {if address.is_default {
                                    view! { <span class="badge">"Default"</span> }.into_view()
                                } else {
                                    view! {
                                        <button type="button" class="btn" on:click=move |_| make_default_address(id)>
                                            "Make default"
                                        </button>
                                    }.into_view()
                                }}
                                <button type="button" class="btn btn_danger" on:click=move |_| delete(id)>
                                    "Delete"
                                </button>
                            </li>
                        }
                    }).collect_view()}
                </ul>
            }.into_view()
        }}

        <form class="form" novalidate=true on:submit=on_add>
            <FormSummary form=form />
            <FormField form=form name="city" label="City" />
            <FormField form=form name="street" label="Street" />
            <FormField form=form name="house" label="House" />
            <FormField form=form name="postal_code" label="Postal code" />
            <label class="checkbox">
                <input
                    type="checkbox"
                    prop:checked=make_default
                    on:change=move |ev| set_make_default.set(event_target_checked(&ev))
                />
                "Use as default"
            </label>
            <button type="submit" class="btn btn_primary">"Add address"</button>
        </form>
    }
}
