use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role within a company.
///
/// - `Member`: sales rep working their own leads.
/// - `Manager`: team lead; same search visibility as a member.
/// - `Admin`: company administrator; can also search staff accounts.
/// - `SuperAdmin`: platform operator; sees every company.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Member,
    Manager,
    Admin,
    SuperAdmin,
}

impl UserRole {
    /// Parse from the JWT `role` claim. Unknown values default to `Member`.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "manager" => UserRole::Manager,
            "admin" => UserRole::Admin,
            "super_admin" | "superadmin" => UserRole::SuperAdmin,
            _ => UserRole::Member,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::Manager => "manager",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super_admin",
        }
    }

    /// Admins and super admins may search administrative data such as staff accounts.
    pub fn is_privileged(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }

    /// Only super admins see across company boundaries.
    pub fn spans_all_tenants(&self) -> bool {
        matches!(self, UserRole::SuperAdmin)
    }
}

/// Which companies' records a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    Tenant(Uuid),
    AllTenants,
    /// Authenticated but not attached to a company: no tenant data is visible.
    Unassigned,
}

impl TenantScope {
    /// Tenant id to bind in a scoped query. `None` means "no tenant filter"
    /// for `AllTenants`, and callers must check `is_unassigned` first.
    pub fn tenant_id(&self) -> Option<Uuid> {
        match self {
            TenantScope::Tenant(id) => Some(*id),
            TenantScope::AllTenants | TenantScope::Unassigned => None,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        matches!(self, TenantScope::Unassigned)
    }
}

/// Identity and visibility of the caller issuing a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    pub user_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub role: UserRole,
}

impl CallerContext {
    pub fn new(user_id: Uuid, tenant_id: Option<Uuid>, role: UserRole) -> Self {
        Self {
            user_id,
            tenant_id,
            role,
        }
    }

    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }

    pub fn scope(&self) -> TenantScope {
        if self.role.spans_all_tenants() {
            return TenantScope::AllTenants;
        }
        match self.tenant_id {
            Some(id) => TenantScope::Tenant(id),
            None => TenantScope::Unassigned,
        }
    }
}
