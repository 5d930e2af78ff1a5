//! Registration Page

use leptos::*;
use leptos_router::*;

use crate::api;
use crate::components::{FormField, FormState, FormSummary};
use crate::state::global::GlobalState;
use crate::validation;

#[component]
pub fn Register() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let navigate = use_navigate();

    let form = FormState::new(validation::register_rules());
    let submitting = create_rw_signal(false);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if !form.validate_all() {
            return;
        }

        let email = form.value("email");
        let full_name = form.value("full_name");
        let phone = form.optional("phone");
        let password = form.signal("password").get_untracked();
        let navigate = navigate.clone();
        submitting.set(true);

        spawn_local(async move {
            match api::register(&email, &full_name, phone.as_deref(), &password).await {
                Ok(_) => {
                    state.show_success("Registration complete, please sign in");
                    navigate("/login", NavigateOptions::default());
                }
                Err(e) => form.show_error(e.message),
            }
            submitting.set(false);
        });
    };

    view! {
        <section class="auth">
            <h1>"Register"</h1>
            <form class="form" novalidate=true on:submit=on_submit>
                <FormSummary form=form />
                <FormField form=form name="email" label="Email" input_type="email" autocomplete="email" />
                <FormField form=form name="full_name" label="Full name" autocomplete="name" />
                <FormField form=form name="phone" label="Phone (optional)" input_type="tel" autocomplete="tel" />
                <FormField
                    form=form
                    name="password"
                    label="Password"
                    input_type="password"
                    autocomplete="new-password"
                />
                <button type="submit" class="btn btn_primary" disabled=submitting>
                    "Create account"
                </button>
            </form>
            <p>"Already registered? " <A href="/login">"Login"</A></p>
        </section>
    }
}
