//! Static, in-memory catalogues: settings pages and app navigation.

use super::sources::SourceHit;

/// A fixed catalogue entry.
#[derive(Debug, Clone, Copy)]
pub struct CatalogueEntry {
    pub id: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub path: &'static str,
    pub keywords: &'static [&'static str],
}

impl CatalogueEntry {
    fn matches(&self, needle: &str, with_keywords: bool) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.subtitle.to_lowercase().contains(needle)
            || (with_keywords && self.keywords.iter().any(|k| k.contains(needle)))
    }

    fn to_hit(self) -> SourceHit {
        SourceHit::new(self.id, self.title, self.subtitle, self.path)
    }
}

pub const SETTINGS: &[CatalogueEntry] = &[
    CatalogueEntry {
        id: "settings-profile",
        title: "Profile",
        subtitle: "Profile settings: name, email and avatar",
        path: "/settings/profile",
        keywords: &[],
    },
    CatalogueEntry {
        id: "settings-company",
        title: "Company",
        subtitle: "Company settings and branding",
        path: "/settings/company",
        keywords: &[],
    },
    CatalogueEntry {
        id: "settings-team",
        title: "Team Members",
        subtitle: "Invite and manage team members",
        path: "/settings/team",
        keywords: &[],
    },
    CatalogueEntry {
        id: "settings-api-keys",
        title: "API Keys",
        subtitle: "Manage API keys and webhooks",
        path: "/settings/api-keys",
        keywords: &[],
    },
    CatalogueEntry {
        id: "settings-notifications",
        title: "Notifications",
        subtitle: "Email and in-app notification preferences",
        path: "/settings/notifications",
        keywords: &[],
    },
    CatalogueEntry {
        id: "settings-billing",
        title: "Billing",
        subtitle: "Plan, invoices and payment methods",
        path: "/settings/billing",
        keywords: &[],
    },
    CatalogueEntry {
        id: "settings-integrations",
        title: "Integrations",
        subtitle: "Connect CRMs, calendars and telephony",
        path: "/settings/integrations",
        keywords: &[],
    },
    CatalogueEntry {
        id: "settings-security",
        title: "Security",
        subtitle: "Password, two-factor and sessions",
        path: "/settings/security",
        keywords: &[],
    },
];

pub const NAVIGATION: &[CatalogueEntry] = &[
    CatalogueEntry {
        id: "nav-dashboard",
        title: "Dashboard",
        subtitle: "Overview and key metrics",
        path: "/dashboard",
        keywords: &["home", "overview", "stats"],
    },
    CatalogueEntry {
        id: "nav-leads",
        title: "Leads",
        subtitle: "All leads and pipeline",
        path: "/leads",
        keywords: &["contacts", "prospects", "pipeline"],
    },
    CatalogueEntry {
        id: "nav-calls",
        title: "Calls",
        subtitle: "Call history and recordings",
        path: "/calls",
        keywords: &["phone", "recordings", "transcripts"],
    },
    CatalogueEntry {
        id: "nav-agents",
        title: "Agents",
        subtitle: "Voice agents",
        path: "/agents",
        keywords: &["ai", "voice", "bots"],
    },
    CatalogueEntry {
        id: "nav-analytics",
        title: "Analytics",
        subtitle: "Reports and conversion trends",
        path: "/analytics",
        keywords: &["reports", "metrics", "charts"],
    },
    CatalogueEntry {
        id: "nav-settings",
        title: "Settings",
        subtitle: "Account and company configuration",
        path: "/settings",
        keywords: &["preferences", "configuration", "account"],
    },
    CatalogueEntry {
        id: "nav-team",
        title: "Team",
        subtitle: "Team members and roles",
        path: "/team",
        keywords: &["users", "staff", "members"],
    },
];

/// Settings pages whose title or subtitle contains `query`, case-insensitively.
pub fn match_settings(query: &str) -> Vec<SourceHit> {
    search(SETTINGS, query, false)
}

/// Navigation destinations matching on title, subtitle or keywords.
pub fn match_navigation(query: &str) -> Vec<SourceHit> {
    search(NAVIGATION, query, true)
}

fn search(entries: &[CatalogueEntry], query: &str, with_keywords: bool) -> Vec<SourceHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    entries
        .iter()
        .filter(|e| e.matches(&needle, with_keywords))
        .map(|e| e.to_hit())
        .collect()
}
