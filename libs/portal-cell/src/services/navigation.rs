use serde::Serialize;

use shared_models::auth::Role;

/// Every page the portal can render, resolved once per navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Route {
    Home,
    About,
    Login,
    Signup,
    Survey,
    ApplyDoctor,
    DoctorDetails { slug: String },
    Dashboard,
    DoctorDashboard,
    Admin,
    AdminApplication { id: String },
    AdminUser { id: String },
    AdminFinancialReports,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Allowed,
    RequiresLogin,
    Forbidden,
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

impl Route {
    /// Resolves a pathname. Query strings and fragments are ignored, as are
    /// empty segments, so trailing slashes do not matter.
    pub fn resolve(pathname: &str) -> Route {
        let path = pathname.split(['?', '#']).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] | ["home"] => Route::Home,
            ["about"] => Route::About,
            ["login"] => Route::Login,
            ["signup"] => Route::Signup,
            ["survey"] | ["match"] => Route::Survey,
            ["apply"] | ["doctor", "apply"] => Route::ApplyDoctor,
            ["doctors", slug] => Route::DoctorDetails { slug: decode_segment(slug) },
            ["dashboard"] => Route::Dashboard,
            ["doctor"] | ["doctor", "dashboard"] => Route::DoctorDashboard,
            ["admin"] => Route::Admin,
            ["admin", "applications", id] => Route::AdminApplication { id: decode_segment(id) },
            ["admin", "users", id] => Route::AdminUser { id: decode_segment(id) },
            ["admin", "financial-reports"] => Route::AdminFinancialReports,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::About => "/about".to_string(),
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::Survey => "/survey".to_string(),
            Route::ApplyDoctor => "/apply".to_string(),
            Route::DoctorDetails { slug } => format!("/doctors/{}", urlencoding::encode(slug)),
            Route::Dashboard => "/dashboard".to_string(),
            Route::DoctorDashboard => "/doctor/dashboard".to_string(),
            Route::Admin => "/admin".to_string(),
            Route::AdminApplication { id } => format!("/admin/applications/{}", urlencoding::encode(id)),
            Route::AdminUser { id } => format!("/admin/users/{}", urlencoding::encode(id)),
            Route::AdminFinancialReports => "/admin/financial-reports".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }

    /// Role needed beyond a plain session, if any.
    fn required_role(&self) -> Option<Role> {
        match self {
            Route::DoctorDashboard => Some(Role::Doctor),
            Route::Admin
            | Route::AdminApplication { .. }
            | Route::AdminUser { .. }
            | Route::AdminFinancialReports => Some(Role::Admin),
            _ => None,
        }
    }

    fn needs_session(&self) -> bool {
        matches!(self, Route::Dashboard) || self.required_role().is_some()
    }
}

/// Admins may open every page; doctors only their own dashboard.
pub fn access_for(role: Option<Role>, route: &Route) -> Access {
    if !route.needs_session() {
        return Access::Allowed;
    }

    let Some(role) = role else {
        return Access::RequiresLogin;
    };

    match (route.required_role(), role) {
        (None, _) => Access::Allowed,
        (Some(_), Role::Admin) => Access::Allowed,
        (Some(required), actual) if required == actual => Access::Allowed,
        _ => Access::Forbidden,
    }
}
