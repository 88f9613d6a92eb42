use dioxus::prelude::*;
use dioxus_free_icons::icons::ld_icons::{LdClock, LdSearch};
use dioxus_free_icons::Icon;
use shared_types::{CategoryMap, ResultType, SearchResult, SearchSettings};

use crate::routes::push_path;
use crate::search::{
    use_global_search, GlobalSearch, PaletteAction, PaletteController, PaletteKey, SearchPhase,
};

/// One rendered section: its type, heading and rows tagged with their position in
/// the flattened list that keyboard selection walks.
type IndexedGroup = (ResultType, &'static str, Vec<(usize, SearchResult)>);

/// Number rows across groups in category order.
fn index_groups(categories: &CategoryMap) -> Vec<IndexedGroup> {
    let mut next = 0;
    categories
        .iter()
        .map(|(result_type, items)| {
            let rows = items
                .iter()
                .cloned()
                .map(|item| {
                    let row = (next, item);
                    next += 1;
                    row
                })
                .collect();
            (result_type, result_type.label(), rows)
        })
        .collect()
}

/// List page for a record result: `/leads/{id}` -> `/leads`.
fn section_path(result: &SearchResult) -> Option<String> {
    match result.result_type {
        ResultType::Setting | ResultType::Navigation => None,
        _ => result
            .path
            .rsplit_once('/')
            .map(|(section, _)| section.to_string())
            .filter(|section| !section.is_empty()),
    }
}

/// Flattened results, trimmed query and total count as shown right now.
fn snapshot(search: GlobalSearch) -> (Vec<SearchResult>, String, usize) {
    let state = search.state.read();
    (
        state.categories().flatten().into_iter().cloned().collect(),
        state.query().to_string(),
        state.total_count(),
    )
}

/// Global command palette overlay, toggled with Cmd+K / Ctrl+K, `/` or the
/// navbar search button.
///
/// Searches leads, team members, agents, calls, settings and pages. Results
/// render grouped by type; keyboard selection walks the groups in order.
#[component]
pub fn CommandPalette(palette: Signal<PaletteController>) -> Element {
    let mut palette = palette;
    let settings: SearchSettings = use_context();
    let min_query_length = settings.min_query_length;
    let search = use_global_search(settings);

    let is_open = use_memo(move || palette.read().is_open());
    let result_count = use_memo(move || search.state.read().categories().total());

    // Opening refreshes recent searches; closing forgets the session.
    use_effect(move || {
        if is_open() {
            search.load_recent();
        } else {
            search.reset();
        }
    });

    use_effect(move || {
        let len = result_count();
        palette.write().clamp_selection(len);
    });

    let mut close = move || palette.write().close();

    let mut activate = move |index: usize| {
        let (flat, query, total) = snapshot(search);
        let activation = palette.write().activate_at(index, &flat, &query, total);
        if let Some(activation) = activation {
            search.record_click(activation.click);
            push_path(&activation.path);
        }
    };

    if !palette.read().is_open() {
        return rsx! {};
    }

    let (query, phase, error, recent, groups) = {
        let state = search.state.read();
        (
            state.query().to_string(),
            state.phase(),
            state.error().map(str::to_string),
            state.recent().to_vec(),
            index_groups(state.categories()),
        )
    };
    let selected = palette.read().selected();
    let open_menu = palette.read().open_menu().map(str::to_string);

    rsx! {
        document::Link { rel: "stylesheet", href: asset!("./command_palette.css") }

        // Backdrop
        div {
            class: "cmd-palette-backdrop",
            onclick: move |_| close(),
        }

        div {
            class: "cmd-palette-modal",
            onkeydown: move |e: KeyboardEvent| {
                // Toggle and `/` arrive through the document-level shortcut listener.
                let key = match PaletteKey::from_event(&e.key(), e.modifiers(), false) {
                    Some(PaletteKey::Toggle | PaletteKey::Slash) | None => return,
                    Some(key) => key,
                };
                e.stop_propagation();
                let (flat, query, total) = snapshot(search);
                let action = palette.write().handle_key(key, &flat, &query, total);
                match action {
                    PaletteAction::Nothing => {}
                    PaletteAction::Moved | PaletteAction::Closed | PaletteAction::Opened => {
                        e.prevent_default();
                    }
                    PaletteAction::Activate(activation) => {
                        e.prevent_default();
                        search.record_click(activation.click);
                        push_path(&activation.path);
                    }
                }
            },

            div {
                class: "cmd-palette-input-wrap",
                span {
                    class: "cmd-palette-search-icon",
                    Icon::<LdSearch> { icon: LdSearch, width: 18, height: 18 }
                }
                input {
                    class: "cmd-palette-input",
                    placeholder: "Search leads, calls, agents, settings...",
                    value: "{query}",
                    autofocus: true,
                    oninput: move |e: FormEvent| {
                        palette.write().results_changed();
                        search.input(e.value());
                    },
                }
                span { class: "cmd-palette-kbd", "ESC" }
            }

            div {
                class: "cmd-palette-results",

                if query.trim().is_empty() {
                    if recent.is_empty() {
                        div {
                            class: "cmd-palette-empty",
                            "Search leads, team members, agents, calls and settings"
                        }
                    } else {
                        div { class: "cmd-palette-group-header", "Recent searches" }
                        for past in recent {
                            button {
                                key: "{past}",
                                class: "cmd-palette-result cmd-palette-recent",
                                onclick: {
                                    let past = past.clone();
                                    move |_| {
                                        palette.write().results_changed();
                                        search.input(past.clone());
                                    }
                                },
                                Icon::<LdClock> { icon: LdClock, width: 14, height: 14 }
                                span { class: "cmd-palette-result-title", "{past}" }
                            }
                        }
                    }
                } else if let Some(message) = error {
                    div { class: "cmd-palette-error", "{message}" }
                } else if groups.is_empty() {
                    match phase {
                        SearchPhase::Debouncing | SearchPhase::Inflight => rsx! {
                            div { class: "cmd-palette-loading", "Searching..." }
                        },
                        SearchPhase::Resolved => rsx! {
                            div { class: "cmd-palette-empty", "No results found for '{query}'" }
                        },
                        _ => rsx! {
                            div {
                                class: "cmd-palette-empty",
                                "Type at least {min_query_length} characters to search"
                            }
                        },
                    }
                } else {
                    for (result_type, label, rows) in groups {
                        div {
                            key: "{result_type}",
                            class: "cmd-palette-group",
                            div { class: "cmd-palette-group-header", "{label}" }
                            for (idx, result) in rows {
                                {
                                    let is_active = idx == selected;
                                    let menu_open = open_menu.as_deref() == Some(result.id.as_str());
                                    let section = section_path(&result);
                                    let menu_id = result.id.clone();
                                    rsx! {
                                        div {
                                            key: "{result.id}",
                                            class: if is_active { "cmd-palette-row cmd-palette-row-active" } else { "cmd-palette-row" },
                                            onmouseenter: move |_| palette.write().hover(idx),
                                            button {
                                                class: "cmd-palette-result",
                                                onclick: move |_| activate(idx),
                                                span { class: "cmd-palette-result-title", "{result.title}" }
                                                if !result.subtitle.is_empty() {
                                                    span { class: "cmd-palette-result-subtitle", "{result.subtitle}" }
                                                }
                                            }
                                            if let Some(section) = section {
                                                button {
                                                    class: "cmd-palette-row-menu-trigger",
                                                    aria_label: "More actions",
                                                    onclick: move |e: MouseEvent| {
                                                        e.stop_propagation();
                                                        palette.write().toggle_menu(&menu_id);
                                                    },
                                                    "\u{22EF}"
                                                }
                                                if menu_open {
                                                    div {
                                                        class: "cmd-palette-row-menu",
                                                        button { onclick: move |_| activate(idx), "Open" }
                                                        button {
                                                            onclick: move |_| {
                                                                palette.write().close();
                                                                push_path(&section);
                                                            },
                                                            "View all {label}"
                                                        }
                                                    }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
