pub mod command_palette;
pub mod pages;

use dioxus::prelude::*;
use dioxus_free_icons::icons::ld_icons::{
    LdActivity, LdBot, LdLayoutDashboard, LdPhone, LdSearch, LdSettings, LdUserCheck, LdUsers,
};
use dioxus_free_icons::Icon;
use serde::Deserialize;

use crate::search::{PaletteController, PaletteKey};
use command_palette::CommandPalette;
use pages::{
    AgentDetail, AgentList, Analytics, CallDetail, CallList, Dashboard, LeadDetail, LeadList,
    NotFound, Settings, SettingsSection, Team, TeamMember,
};

/// Application routes. Every path a search result can carry resolves here.
#[derive(Clone, Routable, Debug, PartialEq)]
pub enum Route {
    #[layout(AppLayout)]
    #[redirect("/", || Route::Dashboard {})]
    #[route("/dashboard")]
    Dashboard {},
    #[route("/leads")]
    LeadList {},
    #[route("/leads/:id")]
    LeadDetail { id: String },
    #[route("/calls")]
    CallList {},
    #[route("/calls/:id")]
    CallDetail { id: String },
    #[route("/agents")]
    AgentList {},
    #[route("/agents/:id")]
    AgentDetail { id: String },
    #[route("/analytics")]
    Analytics {},
    #[route("/team")]
    Team {},
    #[route("/team/:id")]
    TeamMember { id: String },
    #[route("/settings")]
    Settings {},
    #[route("/settings/:section")]
    SettingsSection { section: String },
    #[end_layout]
    #[route("/:..route")]
    NotFound { route: Vec<String> },
}

/// Navigate to an in-app path produced by search.
pub fn push_path(path: &str) {
    match path.parse::<Route>() {
        Ok(route) => {
            navigator().push(route);
        }
        Err(_) => tracing::warn!(path, "Search result path does not match a route"),
    }
}

/// Shortcut forwarded from the document-level key listener.
#[derive(Debug, Deserialize)]
struct ShortcutMessage {
    key: String,
    command: bool,
    typing: bool,
}

/// Catches Ctrl/Cmd+K anywhere and `/` outside text fields. Both must be
/// suppressed in the browser before Rust sees them.
const SHORTCUT_LISTENER: &str = r#"
document.addEventListener('keydown', function (e) {
    var t = e.target;
    var typing = !!t && (t.isContentEditable || /^(INPUT|TEXTAREA|SELECT)$/.test(t.tagName));
    var command = e.ctrlKey || e.metaKey;
    var toggle = command && (e.key === 'k' || e.key === 'K');
    var slash = e.key === '/' && !command && !typing;
    if (!toggle && !slash) return;
    e.preventDefault();
    dioxus.send({ key: e.key, command: command, typing: typing });
});
"#;

fn use_palette_shortcuts(mut palette: Signal<PaletteController>) {
    use_future(move || async move {
        let mut listener = document::eval(SHORTCUT_LISTENER);
        while let Ok(message) = listener.recv::<ShortcutMessage>().await {
            if let Some(key) = PaletteKey::classify(&message.key, message.command, message.typing) {
                palette.write().handle_key(key, &[], "", 0);
            }
        }
    });
}

/// Top bar with section links and the search trigger; owns the palette.
#[component]
fn AppLayout() -> Element {
    let route: Route = use_route();
    let mut palette = use_signal(PaletteController::new);
    use_palette_shortcuts(palette);

    let nav_items = [
        (Route::Dashboard {}, "Dashboard"),
        (Route::LeadList {}, "Leads"),
        (Route::CallList {}, "Calls"),
        (Route::AgentList {}, "Agents"),
        (Route::Analytics {}, "Analytics"),
        (Route::Team {}, "Team"),
        (Route::Settings {}, "Settings"),
    ];

    rsx! {
        document::Link { rel: "stylesheet", href: asset!("./layout.css") }

        div { class: "app-shell",
            header { class: "app-navbar",
                span { class: "app-brand", "Lead CRM" }
                nav { class: "app-nav",
                    for (target, label) in nav_items {
                        {
                            let section = section_of(&target);
                            let active = section_of(&route) == section;
                            rsx! {
                                Link {
                                    key: "{label}",
                                    to: target,
                                    class: if active { "app-nav-link app-nav-link-active" } else { "app-nav-link" },
                                    NavIcon { section }
                                    "{label}"
                                }
                            }
                        }
                    }
                }
                div { class: "app-navbar-spacer" }
                button {
                    class: "app-search-trigger",
                    onclick: move |_| palette.write().open(),
                    Icon::<LdSearch> { icon: LdSearch, width: 16, height: 16 }
                    span { "Search..." }
                    kbd { class: "app-search-kbd", "Ctrl K" }
                }
            }

            main { class: "app-content",
                Outlet::<Route> {}
            }

            CommandPalette { palette }
        }
    }
}

/// Top-level section a route belongs to, for highlighting the nav link.
fn section_of(route: &Route) -> &'static str {
    match route {
        Route::Dashboard {} => "dashboard",
        Route::LeadList {} | Route::LeadDetail { .. } => "leads",
        Route::CallList {} | Route::CallDetail { .. } => "calls",
        Route::AgentList {} | Route::AgentDetail { .. } => "agents",
        Route::Analytics {} => "analytics",
        Route::Team {} | Route::TeamMember { .. } => "team",
        Route::Settings {} | Route::SettingsSection { .. } => "settings",
        Route::NotFound { .. } => "",
    }
}

#[component]
fn NavIcon(section: &'static str) -> Element {
    match section {
        "dashboard" => rsx! { Icon::<LdLayoutDashboard> { icon: LdLayoutDashboard, width: 16, height: 16 } },
        "leads" => rsx! { Icon::<LdUserCheck> { icon: LdUserCheck, width: 16, height: 16 } },
        "calls" => rsx! { Icon::<LdPhone> { icon: LdPhone, width: 16, height: 16 } },
        "agents" => rsx! { Icon::<LdBot> { icon: LdBot, width: 16, height: 16 } },
        "analytics" => rsx! { Icon::<LdActivity> { icon: LdActivity, width: 16, height: 16 } },
        "team" => rsx! { Icon::<LdUsers> { icon: LdUsers, width: 16, height: 16 } },
        _ => rsx! { Icon::<LdSettings> { icon: LdSettings, width: 16, height: 16 } },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_result_paths_resolve_to_routes() {
        let cases = [
            ("/leads/3f2a", Route::LeadDetail { id: "3f2a".into() }),
            ("/team/u1", Route::TeamMember { id: "u1".into() }),
            ("/agents/a1", Route::AgentDetail { id: "a1".into() }),
            ("/calls/c1", Route::CallDetail { id: "c1".into() }),
            ("/settings/api-keys", Route::SettingsSection { section: "api-keys".into() }),
            ("/analytics", Route::Analytics {}),
        ];
        for (path, expected) in cases {
            assert_eq!(path.parse::<Route>().ok(), Some(expected), "{path}");
        }
    }

    #[test]
    fn detail_routes_share_their_list_section() {
        assert_eq!(
            section_of(&Route::LeadDetail { id: "x".into() }),
            section_of(&Route::LeadList {})
        );
        assert_eq!(
            section_of(&Route::SettingsSection { section: "billing".into() }),
            "settings"
        );
    }
}
