// Activity Board (Rust + Yew + WASM)
// Browser client for the activity sign-up API:
// - GET    /activities                          -> catalog keyed by activity name
// - POST   /activities/{name}/signup?email=...  -> {message} | {detail}
// - DELETE /activities/{name}/participants?email=... -> {message} | {detail}

use std::collections::BTreeMap;

use gloo_net::http::Request;
use gloo_timers::callback::Timeout;
use serde::Deserialize;
use urlencoding::encode;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

// Same-origin by default; point this at another host for local dev,
// e.g. "http://127.0.0.1:8000"
const API_BASE: &str = "";

const SELECT_PLACEHOLDER: &str = "-- Select an activity --";

// How long the status banner stays visible, per operation
const SIGNUP_STATUS_MS: u32 = 5_000;
const UNREGISTER_STATUS_MS: u32 = 4_000;

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct Activity {
    description: String,
    schedule: String,
    max_participants: u32,
    #[serde(default)]
    participants: Vec<String>,
}

#[derive(Clone, PartialEq)]
enum Catalog {
    Loading,
    Ready(BTreeMap<String, Activity>),
    Failed,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Success,
    Error,
}

#[derive(Clone, PartialEq)]
struct Status {
    text: String,
    kind: StatusKind,
}

// Server acceptance vs. rejection; transport failures are the caller's Err arm.
enum MutationOutcome {
    Accepted(String),
    Rejected(String),
}

#[derive(Deserialize)]
struct MutationBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/* ---------- pure helpers ---------- */

fn spots_left(activity: &Activity) -> i64 {
    activity.max_participants as i64 - activity.participants.len() as i64
}

/// Avatar glyph: first character of the trimmed email, uppercased.
/// Empty string when there is nothing to show.
fn avatar_initial(email: &str) -> String {
    email
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

fn activities_url() -> String {
    format!("{API_BASE}/activities")
}

fn signup_url(activity: &str, email: &str) -> String {
    format!(
        "{API_BASE}/activities/{}/signup?email={}",
        encode(activity),
        encode(email)
    )
}

fn unregister_url(activity: &str, email: &str) -> String {
    format!(
        "{API_BASE}/activities/{}/participants?email={}",
        encode(activity),
        encode(email)
    )
}

fn parse_catalog(body: &str) -> Result<BTreeMap<String, Activity>, String> {
    serde_json::from_str(body).map_err(|e| format!("catalog was not valid JSON: {e}"))
}

/// Optimistic enrollment, keyed by the catalog map key rather than any
/// rendered text. No-op if the activity is unknown or the email is already
/// on the roster.
fn add_participant(catalog: &mut BTreeMap<String, Activity>, activity: &str, email: &str) -> bool {
    let Some(details) = catalog.get_mut(activity) else {
        return false;
    };
    if details.participants.iter().any(|p| p == email) {
        return false;
    }
    details.participants.push(email.to_string());
    true
}

fn remove_participant(
    catalog: &mut BTreeMap<String, Activity>,
    activity: &str,
    email: &str,
) -> bool {
    let Some(details) = catalog.get_mut(activity) else {
        return false;
    };
    let before = details.participants.len();
    details.participants.retain(|p| p != email);
    details.participants.len() != before
}

fn status_class(status: &Option<Status>) -> &'static str {
    match status {
        None => "hidden",
        Some(s) if s.kind == StatusKind::Success => "success",
        Some(_) => "error",
    }
}

/* ---------- API calls ---------- */

async fn fetch_catalog() -> Result<BTreeMap<String, Activity>, String> {
    let resp = Request::get(&activities_url())
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let body = resp
        .text()
        .await
        .map_err(|e| format!("body read failed: {e}"))?;
    parse_catalog(&body)
}

async fn sign_up_request(activity: &str, email: &str) -> Result<MutationOutcome, String> {
    let resp = Request::post(&signup_url(activity, email))
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;
    let ok = resp.ok();
    let body: MutationBody = resp
        .json()
        .await
        .map_err(|e| format!("response was not JSON: {e}"))?;
    if ok {
        Ok(MutationOutcome::Accepted(
            body.message
                .unwrap_or_else(|| "Signed up successfully.".to_string()),
        ))
    } else {
        Ok(MutationOutcome::Rejected(
            body.detail.unwrap_or_else(|| "An error occurred".to_string()),
        ))
    }
}

async fn unregister_request(activity: &str, email: &str) -> Result<MutationOutcome, String> {
    let resp = Request::delete(&unregister_url(activity, email))
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;
    let ok = resp.ok();
    let body: MutationBody = resp
        .json()
        .await
        .map_err(|e| format!("response was not JSON: {e}"))?;
    if ok {
        Ok(MutationOutcome::Accepted(
            body.message
                .unwrap_or_else(|| "Unregistered successfully.".to_string()),
        ))
    } else {
        Ok(MutationOutcome::Rejected(
            body.detail
                .unwrap_or_else(|| "Failed to unregister.".to_string()),
        ))
    }
}

fn confirm(text: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(text).ok())
        .unwrap_or(false)
}

/* ---------- views ---------- */

fn view_activity(name: &str, activity: &Activity, on_delete: Callback<(String, String)>) -> Html {
    let spots = spots_left(activity);

    let participants = if activity.participants.is_empty() {
        html! { <p class="no-participants">{ "No participants yet" }</p> }
    } else {
        html! {
            <ul class="participants-list">
                { for activity.participants.iter().map(|p| {
                    let onclick = {
                        let on_delete = on_delete.clone();
                        let name = name.to_string();
                        let p = p.clone();
                        Callback::from(move |_: MouseEvent| on_delete.emit((name.clone(), p.clone())))
                    };
                    html! {
                        <li class="participant-item" data-activity={name.to_string()} data-email={p.clone()}>
                            <span class="avatar">{ avatar_initial(p) }</span>
                            <span class="participant-email">{ p.clone() }</span>
                            <button class="participant-delete" title={format!("Unregister {p}")} onclick={onclick}>
                                { "\u{00d7}" }
                            </button>
                        </li>
                    }
                }) }
            </ul>
        }
    };

    html! {
        <div class="activity-card">
            <h4>{ name.to_string() }</h4>
            <p>{ activity.description.clone() }</p>
            <p><strong>{ "Schedule:" }</strong>{ format!(" {}", activity.schedule) }</p>
            <p><strong>{ "Availability:" }</strong>{ format!(" {spots} spots left") }</p>
            <div class="participants">
                <h5>{ "Participants" }</h5>
                { participants }
            </div>
        </div>
    }
}

/* ---------- app ---------- */

#[function_component(App)]
fn app() -> Html {
    let catalog = use_state(|| Catalog::Loading);
    let status = use_state(|| Option::<Status>::None);
    let email = use_state(String::new);
    let selected = use_state(String::new);

    let show_status = {
        let status = status.clone();
        Callback::from(move |(s, ms): (Status, u32)| {
            status.set(Some(s));
            let status2 = status.clone();
            Timeout::new(ms, move || status2.set(None)).forget();
        })
    };

    let load_activities = {
        let catalog = catalog.clone();
        Callback::from(move |_: ()| {
            let catalog = catalog.clone();
            spawn_local(async move {
                match fetch_catalog().await {
                    Ok(map) => catalog.set(Catalog::Ready(map)),
                    Err(e) => {
                        web_sys::console::error_1(
                            &format!("Error fetching activities: {e}").into(),
                        );
                        catalog.set(Catalog::Failed);
                    }
                }
            });
        })
    };

    // Initial load
    {
        let load_activities = load_activities.clone();
        use_effect_with((), move |_| {
            load_activities.emit(());
            || ()
        });
    }

    let on_email_input = {
        let email = email.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            email.set(input.value());
        })
    };

    let on_activity_change = {
        let selected = selected.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            selected.set(select.value());
        })
    };

    let on_submit = {
        let catalog = catalog.clone();
        let email = email.clone();
        let selected = selected.clone();
        let show_status = show_status.clone();
        let load_activities = load_activities.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();

            let activity = (*selected).trim().to_string();
            let addr = (*email).trim().to_string();
            if activity.is_empty() || addr.is_empty() {
                return;
            }

            let catalog = catalog.clone();
            let email = email.clone();
            let selected = selected.clone();
            let show_status = show_status.clone();
            let load_activities = load_activities.clone();
            spawn_local(async move {
                match sign_up_request(&activity, &addr).await {
                    Ok(MutationOutcome::Accepted(msg)) => {
                        show_status.emit((
                            Status {
                                text: msg,
                                kind: StatusKind::Success,
                            },
                            SIGNUP_STATUS_MS,
                        ));
                        email.set(String::new());
                        selected.set(String::new());
                        // Show the new participant right away, then re-fetch
                        // so the counts stay authoritative
                        if let Catalog::Ready(map) = &*catalog {
                            let mut map = map.clone();
                            if add_participant(&mut map, &activity, &addr) {
                                catalog.set(Catalog::Ready(map));
                            }
                        }
                        load_activities.emit(());
                    }
                    Ok(MutationOutcome::Rejected(detail)) => {
                        show_status.emit((
                            Status {
                                text: detail,
                                kind: StatusKind::Error,
                            },
                            SIGNUP_STATUS_MS,
                        ));
                    }
                    Err(e) => {
                        web_sys::console::error_1(&format!("Error signing up: {e}").into());
                        show_status.emit((
                            Status {
                                text: "Failed to sign up. Please try again.".to_string(),
                                kind: StatusKind::Error,
                            },
                            SIGNUP_STATUS_MS,
                        ));
                    }
                }
            });
        })
    };

    let on_delete = {
        let catalog = catalog.clone();
        let show_status = show_status.clone();
        let load_activities = load_activities.clone();
        Callback::from(move |(activity, addr): (String, String)| {
            if !confirm(&format!("Unregister {addr} from {activity}?")) {
                return;
            }

            let catalog = catalog.clone();
            let show_status = show_status.clone();
            let load_activities = load_activities.clone();
            spawn_local(async move {
                match unregister_request(&activity, &addr).await {
                    Ok(MutationOutcome::Accepted(msg)) => {
                        if let Catalog::Ready(map) = &*catalog {
                            let mut map = map.clone();
                            if remove_participant(&mut map, &activity, &addr) {
                                catalog.set(Catalog::Ready(map));
                            }
                        }
                        show_status.emit((
                            Status {
                                text: msg,
                                kind: StatusKind::Success,
                            },
                            UNREGISTER_STATUS_MS,
                        ));
                        // refresh list to keep counts correct
                        load_activities.emit(());
                    }
                    Ok(MutationOutcome::Rejected(detail)) => {
                        show_status.emit((
                            Status {
                                text: detail,
                                kind: StatusKind::Error,
                            },
                            UNREGISTER_STATUS_MS,
                        ));
                        load_activities.emit(());
                    }
                    Err(e) => {
                        web_sys::console::error_1(&format!("Error unregistering: {e}").into());
                        show_status.emit((
                            Status {
                                text: "Failed to unregister. Please try again.".to_string(),
                                kind: StatusKind::Error,
                            },
                            UNREGISTER_STATUS_MS,
                        ));
                    }
                }
            });
        })
    };

    let cards = match &*catalog {
        Catalog::Loading => html! { <p>{ "Loading activities..." }</p> },
        Catalog::Failed => {
            html! { <p>{ "Failed to load activities. Please try again later." }</p> }
        }
        Catalog::Ready(map) => html! {
            { for map.iter().map(|(name, details)| view_activity(name, details, on_delete.clone())) }
        },
    };

    let names: Vec<String> = match &*catalog {
        Catalog::Ready(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    };

    html! {
        <main class="wrap">
            <header>
                <h1>{ "Activity Board" }</h1>
                <p class="tagline">{ "Browse activities and sign up with your email." }</p>
            </header>

            <section id="activities-container">
                <h2>{ "Activities" }</h2>
                <div id="activities-list">
                    { cards }
                </div>
            </section>

            <section id="signup-container">
                <h2>{ "Sign Up" }</h2>
                <form id="signup-form" onsubmit={on_submit}>
                    <label for="email">{ "Email" }</label>
                    <input
                        id="email"
                        type="email"
                        required=true
                        placeholder="your-email@example.com"
                        value={(*email).clone()}
                        oninput={on_email_input}
                    />

                    <label for="activity">{ "Activity" }</label>
                    <select id="activity" required=true onchange={on_activity_change}>
                        <option value="" selected={selected.is_empty()}>{ SELECT_PLACEHOLDER }</option>
                        { for names.iter().map(|n| html! {
                            <option value={n.clone()} selected={*n == *selected}>{ n.clone() }</option>
                        }) }
                    </select>

                    <button type="submit">{ "Sign Up" }</button>
                </form>

                <div id="message" class={status_class(&status)}>
                    { status.as_ref().map(|s| s.text.clone()).unwrap_or_default() }
                </div>
            </section>
        </main>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}

/* ---------- tests ---------- */

#[cfg(test)]
mod tests {
    use super::*;

    const CHESS_CLUB: &str = r#"{
        "Chess Club": {
            "description": "d",
            "schedule": "Mon",
            "max_participants": 2,
            "participants": ["a@x.com"]
        }
    }"#;

    fn chess_catalog() -> BTreeMap<String, Activity> {
        parse_catalog(CHESS_CLUB).unwrap()
    }

    #[test]
    fn parse_catalog_reads_every_activity() {
        let body = r#"{
            "Art Studio": {"description": "paint", "schedule": "Tue", "max_participants": 10, "participants": []},
            "Chess Club": {"description": "d", "schedule": "Mon", "max_participants": 2, "participants": ["a@x.com"]},
            "Debate Team": {"description": "argue", "schedule": "Fri", "max_participants": 8, "participants": ["b@x.com", "c@x.com"]}
        }"#;
        let catalog = parse_catalog(body).unwrap();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains_key("Chess Club"));
        assert_eq!(catalog["Debate Team"].participants.len(), 2);
    }

    #[test]
    fn parse_catalog_defaults_missing_participants() {
        let body = r#"{"Solo": {"description": "d", "schedule": "Wed", "max_participants": 5}}"#;
        let catalog = parse_catalog(body).unwrap();
        assert!(catalog["Solo"].participants.is_empty());
    }

    #[test]
    fn parse_catalog_rejects_non_json_body() {
        assert!(parse_catalog("<html>502 Bad Gateway</html>").is_err());
        assert!(parse_catalog("").is_err());
    }

    #[test]
    fn spots_left_subtracts_roster_from_capacity() {
        let catalog = chess_catalog();
        assert_eq!(spots_left(&catalog["Chess Club"]), 1);
    }

    #[test]
    fn spots_left_goes_negative_when_overbooked() {
        let mut catalog = chess_catalog();
        let chess = catalog.get_mut("Chess Club").unwrap();
        chess.participants.push("b@x.com".to_string());
        chess.participants.push("c@x.com".to_string());
        assert_eq!(spots_left(chess), -1);
    }

    #[test]
    fn avatar_initial_uppercases_first_letter() {
        assert_eq!(avatar_initial("a@x.com"), "A");
        assert_eq!(avatar_initial("  zoe@x.com"), "Z");
    }

    #[test]
    fn avatar_initial_empty_when_unavailable() {
        assert_eq!(avatar_initial(""), "");
        assert_eq!(avatar_initial("   "), "");
    }

    #[test]
    fn signup_url_percent_encodes_name_and_email() {
        assert_eq!(
            signup_url("Chess Club", "a+b@x.com"),
            "/activities/Chess%20Club/signup?email=a%2Bb%40x.com"
        );
    }

    #[test]
    fn unregister_url_targets_participants() {
        assert_eq!(
            unregister_url("Chess Club", "a@x.com"),
            "/activities/Chess%20Club/participants?email=a%40x.com"
        );
    }

    #[test]
    fn add_participant_appends_to_the_roster() {
        let mut catalog = chess_catalog();
        assert!(add_participant(&mut catalog, "Chess Club", "b@x.com"));
        assert_eq!(
            catalog["Chess Club"].participants,
            vec!["a@x.com".to_string(), "b@x.com".to_string()]
        );
        assert_eq!(spots_left(&catalog["Chess Club"]), 0);
    }

    #[test]
    fn add_participant_skips_duplicates() {
        let mut catalog = chess_catalog();
        assert!(!add_participant(&mut catalog, "Chess Club", "a@x.com"));
        assert_eq!(catalog["Chess Club"].participants.len(), 1);
    }

    #[test]
    fn add_participant_ignores_unknown_activity() {
        let mut catalog = chess_catalog();
        assert!(!add_participant(&mut catalog, "Knitting", "a@x.com"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn remove_participant_drops_exactly_that_email() {
        let mut catalog = chess_catalog();
        add_participant(&mut catalog, "Chess Club", "b@x.com");
        assert!(remove_participant(&mut catalog, "Chess Club", "a@x.com"));
        assert_eq!(
            catalog["Chess Club"].participants,
            vec!["b@x.com".to_string()]
        );
    }

    #[test]
    fn remove_participant_no_ops_when_absent() {
        let mut catalog = chess_catalog();
        assert!(!remove_participant(&mut catalog, "Chess Club", "nobody@x.com"));
        assert!(!remove_participant(&mut catalog, "Knitting", "a@x.com"));
        assert_eq!(catalog["Chess Club"].participants.len(), 1);
    }

    #[test]
    fn status_class_tracks_kind_and_visibility() {
        assert_eq!(status_class(&None), "hidden");
        let ok = Status {
            text: "Signed up".to_string(),
            kind: StatusKind::Success,
        };
        assert_eq!(status_class(&Some(ok)), "success");
        let bad = Status {
            text: "Already signed up".to_string(),
            kind: StatusKind::Error,
        };
        assert_eq!(status_class(&Some(bad)), "error");
    }

    #[test]
    fn chess_club_scenario_renders_one_spot_and_avatar_a() {
        let catalog = chess_catalog();
        let chess = &catalog["Chess Club"];
        assert_eq!(spots_left(chess), 1);
        assert_eq!(chess.participants.len(), 1);
        assert_eq!(avatar_initial(&chess.participants[0]), "A");
    }
}
