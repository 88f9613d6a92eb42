//! Destination pages reached from search. Record screens live in the wider
//! CRM; these render the heading and the record id the palette linked to.

use dioxus::prelude::*;

use crate::routes::Route;

#[component]
fn Page(#[props(into)] title: String, detail: Option<String>) -> Element {
    rsx! {
        div { class: "page",
            h2 { class: "page-title", "{title}" }
            if let Some(detail) = detail {
                p { class: "page-detail", code { "{detail}" } }
            }
        }
    }
}

#[component]
pub fn Dashboard() -> Element {
    rsx! {
        div { class: "page",
            h2 { class: "page-title", "Dashboard" }
            p { class: "page-hint",
                "Press "
                kbd { "Ctrl" }
                " + "
                kbd { "K" }
                " or "
                kbd { "/" }
                " to search leads, calls, agents and settings."
            }
        }
    }
}

#[component]
pub fn LeadList() -> Element {
    rsx! { Page { title: "Leads" } }
}

#[component]
pub fn LeadDetail(id: String) -> Element {
    rsx! { Page { title: "Lead", detail: id } }
}

#[component]
pub fn CallList() -> Element {
    rsx! { Page { title: "Calls" } }
}

#[component]
pub fn CallDetail(id: String) -> Element {
    rsx! { Page { title: "Call", detail: id } }
}

#[component]
pub fn AgentList() -> Element {
    rsx! { Page { title: "Voice Agents" } }
}

#[component]
pub fn AgentDetail(id: String) -> Element {
    rsx! { Page { title: "Voice Agent", detail: id } }
}

#[component]
pub fn Analytics() -> Element {
    rsx! { Page { title: "Analytics" } }
}

#[component]
pub fn Team() -> Element {
    rsx! { Page { title: "Team" } }
}

#[component]
pub fn TeamMember(id: String) -> Element {
    rsx! { Page { title: "Team Member", detail: id } }
}

#[component]
pub fn Settings() -> Element {
    rsx! { Page { title: "Settings" } }
}

#[component]
pub fn SettingsSection(section: String) -> Element {
    rsx! { Page { title: "Settings", detail: section } }
}

/// 404 page for unknown paths.
#[component]
pub fn NotFound(route: Vec<String>) -> Element {
    let path = format!("/{}", route.join("/"));

    rsx! {
        div { class: "page not-found",
            h2 { class: "page-title", "Nothing here" }
            p { "No page lives at " code { "{path}" } "." }
            Link { to: Route::Dashboard {}, "Back to the dashboard" }
        }
    }
}
