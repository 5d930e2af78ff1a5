//! Login Page

use leptos::*;
use leptos_router::*;

use crate::api;
use crate::components::{FormField, FormState, FormSummary};
use crate::state::global::GlobalState;
use crate::validation;

#[component]
pub fn Login() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let navigate = use_navigate();

    let form = FormState::new(validation::login_rules());
    let submitting = create_rw_signal(false);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if !form.validate_all() {
            return;
        }

        let email = form.value("email");
        let password = form.signal("password").get_untracked();
        let navigate = navigate.clone();
        submitting.set(true);

        spawn_local(async move {
            match api::login(&email, &password).await {
                Ok(token) => {
                    state.login(token);
                    state.show_success("Signed in");
                    navigate("/", NavigateOptions::default());
                }
                Err(e) => form.show_error(e.message),
            }
            submitting.set(false);
        });
    };

    view! {
        <section class="auth">
            <h1>"Login"</h1>
            <form class="form" novalidate=true on:submit=on_submit>
                <FormSummary form=form />
                <FormField form=form name="email" label="Email" input_type="email" autocomplete="email" />
                <FormField
                    form=form
                    name="password"
                    label="Password"
                    input_type="password"
                    autocomplete="current-password"
                />
                <button type="submit" class="btn btn_primary" disabled=submitting>
                    "Sign in"
                </button>
            </form>
            <p>"No account yet? " <A href="/register">"Register"</A></p>
        </section>
    }
}
