use leptos::*;

#[component]
pub fn Login(logout_url: String) -> impl IntoView {
    view! {
        <div class="d-flex align-items-center justify-content-center vh-100">
            <div class="text-center">
                <p class="text-muted">"Sign in to start chatting."</p>
                <a class="btn btn-primary" id="loginBtn" href=logout_url>
                    "Login"
                </a>
            </div>
        </div>
    }
}
