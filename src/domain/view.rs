// Navigation views of the dashboard
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
    Profile,
    Reports,
    Settings,
    Alerts,
}

impl View {
    /// Sidebar order.
    pub const NAVIGATION: [View; 5] = [
        View::Dashboard,
        View::Profile,
        View::Reports,
        View::Alerts,
        View::Settings,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            View::Login => "login",
            View::Dashboard => "dashboard",
            View::Profile => "profile",
            View::Reports => "reports",
            View::Settings => "settings",
            View::Alerts => "alerts",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Login => "Login",
            View::Dashboard => "Dashboard",
            View::Profile => "Profile",
            View::Reports => "Reports",
            View::Settings => "Settings",
            View::Alerts => "Alerts",
        }
    }

    pub fn path(&self) -> String {
        format!("/{}", self.id())
    }

    /// Where a path lands. The root and unknown paths go to the login view.
    pub fn resolve(path: &str) -> View {
        path.parse().unwrap_or(View::Login)
    }
}

impl FromStr for View {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_matches('/') {
            "login" => Ok(View::Login),
            "dashboard" => Ok(View::Dashboard),
            "profile" => Ok(View::Profile),
            "reports" => Ok(View::Reports),
            "settings" => Ok(View::Settings),
            "alerts" => Ok(View::Alerts),
            _ => Err(()),
        }
    }
}
