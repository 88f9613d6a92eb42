use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// Result types and request filters
// ---------------------------------------------------------------------------

/// The record type a search result was produced from.
///
/// `User` is a staff account (a member of the tenant's team), not a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Lead,
    User,
    Agent,
    Call,
    Setting,
    Navigation,
}

impl ResultType {
    pub const ALL: [ResultType; 6] = [
        ResultType::Lead,
        ResultType::User,
        ResultType::Agent,
        ResultType::Call,
        ResultType::Setting,
        ResultType::Navigation,
    ];

    /// Lowercase tag used on the wire and as the category key.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Lead => "lead",
            ResultType::User => "user",
            ResultType::Agent => "agent",
            ResultType::Call => "call",
            ResultType::Setting => "setting",
            ResultType::Navigation => "navigation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        ResultType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// The request filter that selects this result type.
    pub fn filter(&self) -> SearchFilter {
        match self {
            ResultType::Lead => SearchFilter::Leads,
            ResultType::User => SearchFilter::Users,
            ResultType::Agent => SearchFilter::Agents,
            ResultType::Call => SearchFilter::Calls,
            ResultType::Setting => SearchFilter::Settings,
            ResultType::Navigation => SearchFilter::Navigation,
        }
    }

    /// Starting priority for the first row of this type. Each subsequent row
    /// of the same source is one lower.
    pub fn base_priority(&self) -> i32 {
        match self {
            ResultType::Lead => 100,
            ResultType::Navigation => 90,
            ResultType::User => 80,
            ResultType::Agent => 70,
            ResultType::Call => 60,
            ResultType::Setting => 50,
        }
    }

    /// Group heading shown in the command palette.
    pub fn label(&self) -> &'static str {
        match self {
            ResultType::Lead => "Leads",
            ResultType::User => "Team Members",
            ResultType::Agent => "Voice Agents",
            ResultType::Call => "Calls",
            ResultType::Setting => "Settings",
            ResultType::Navigation => "Go to",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter names accepted in a search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SearchFilter {
    Leads,
    Users,
    Agents,
    Calls,
    Settings,
    Navigation,
}

impl SearchFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchFilter::Leads => "leads",
            SearchFilter::Users => "users",
            SearchFilter::Agents => "agents",
            SearchFilter::Calls => "calls",
            SearchFilter::Settings => "settings",
            SearchFilter::Navigation => "navigation",
        }
    }

    /// Case-insensitive parse. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        ResultType::ALL
            .into_iter()
            .map(|t| t.filter())
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// A normalized set of request filters. An empty set means "all types".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet(Vec<SearchFilter>);

impl FilterSet {
    /// Build from raw strings, silently dropping unknown names and duplicates.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filters = Vec::new();
        for name in names {
            if let Some(filter) = SearchFilter::parse(name.as_ref()) {
                if !filters.contains(&filter) {
                    filters.push(filter);
                }
            }
        }
        FilterSet(filters)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when results of `result_type` may be returned.
    pub fn allows(&self, result_type: ResultType) -> bool {
        self.0.is_empty() || self.0.contains(&result_type.filter())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchFilter> {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Intents
// ---------------------------------------------------------------------------

/// Heuristic classification of the shape of a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Email,
    Phone,
    Id,
    Url,
    Text,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Email => "email",
            Intent::Phone => "phone",
            Intent::Id => "id",
            Intent::Url => "url",
            Intent::Text => "text",
        }
    }
}

/// Non-empty, de-duplicated set of intents. Falls back to `{text}` when
/// nothing more specific matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IntentSet(Vec<Intent>);

impl IntentSet {
    pub fn text() -> Self {
        IntentSet(vec![Intent::Text])
    }

    pub fn from_matches<I: IntoIterator<Item = Intent>>(matches: I) -> Self {
        let mut intents: Vec<Intent> = Vec::new();
        for intent in matches {
            if !intents.contains(&intent) {
                intents.push(intent);
            }
        }
        if intents.is_empty() {
            return IntentSet::text();
        }
        IntentSet(intents)
    }

    pub fn contains(&self, intent: Intent) -> bool {
        self.0.contains(&intent)
    }

    pub fn is_text_only(&self) -> bool {
        self.0 == [Intent::Text]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Intent> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Intent] {
        &self.0
    }
}

impl Default for IntentSet {
    fn default() -> Self {
        IntentSet::text()
    }
}

impl<'de> Deserialize<'de> for IntentSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let intents = Vec::<Intent>::deserialize(deserializer)?;
        Ok(IntentSet::from_matches(intents))
    }
}

// ---------------------------------------------------------------------------
// Results and categories
// ---------------------------------------------------------------------------

/// One ranked hit from any search source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub result_type: ResultType,
    pub title: String,
    pub subtitle: String,
    /// Client route to navigate to when the result is selected.
    pub path: String,
    /// Ordering key within a single response. Has no meaning across responses.
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub metadata: Option<Value>,
}

/// Results grouped by type. Category order is the order in which each type
/// first appears; within a category, results keep the order they were pushed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMap(IndexMap<ResultType, Vec<SearchResult>>);

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: SearchResult) {
        self.0.entry(result.result_type).or_default().push(result);
    }

    pub fn get(&self, result_type: ResultType) -> Option<&[SearchResult]> {
        self.0.get(&result_type).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResultType, &[SearchResult])> {
        self.0.iter().map(|(t, bucket)| (*t, bucket.as_slice()))
    }

    pub fn types(&self) -> Vec<ResultType> {
        self.0.keys().copied().collect()
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of results across all categories.
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// All results, category by category. This is the order the palette
    /// renders and navigates.
    pub fn flatten(&self) -> Vec<&SearchResult> {
        self.0.values().flatten().collect()
    }
}

impl FromIterator<SearchResult> for CategoryMap {
    fn from_iter<I: IntoIterator<Item = SearchResult>>(iter: I) -> Self {
        let mut map = CategoryMap::new();
        for result in iter {
            map.push(result);
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// Body of `POST /api/search`.
///
/// Decoding is lenient: a non-string `query` becomes empty (no results), a
/// missing or non-positive `limit` falls back to the default, and unknown
/// filter names are dropped. Only a missing `query` field fails to decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GlobalSearchRequest {
    #[serde(deserialize_with = "lenient_query")]
    pub query: String,
    #[serde(
        default,
        deserialize_with = "lenient_filters",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub filters: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient_limit",
        skip_serializing_if = "Option::is_none"
    )]
    pub limit: Option<i64>,
}

impl GlobalSearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters = filters.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter_set(&self) -> FilterSet {
        FilterSet::from_names(&self.filters)
    }
}

fn lenient_query<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn lenient_limit<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_filters<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    })
}

/// Body returned by `POST /api/search`.
///
/// `results` is capped at the request limit. `categories` and `total_count`
/// cover every match, so a category may hold more entries than `results`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GlobalSearchResponse {
    pub results: Vec<SearchResult>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub categories: CategoryMap,
    pub total_count: usize,
    pub query: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<Intent>))]
    pub intents: IntentSet,
}

impl GlobalSearchResponse {
    /// A successful response with no matches.
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            categories: CategoryMap::new(),
            total_count: 0,
            query: query.into(),
            intents: IntentSet::text(),
        }
    }
}

/// One entry of the caller's recent-search list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct RecentSearch {
    pub query: String,
    pub searched_at: DateTime<Utc>,
}

/// Recorded when the user selects a search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(validator::Validate))]
pub struct SearchClickEvent {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, max = 500, message = "Query is required"))
    )]
    pub query: String,
    pub result_type: ResultType,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, max = 128, message = "Result id is required"))
    )]
    pub result_id: String,
    #[cfg_attr(
        feature = "validation",
        validate(range(min = 0, message = "Result count must be non-negative"))
    )]
    pub total_results: i64,
}
