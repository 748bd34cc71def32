// Application state for HTTP handlers
use crate::application::auth_service::AuthService;
use crate::application::monitor_service::MonitorService;
use crate::application::settings_service::SettingsService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<MonitorService>,
    pub settings_service: SettingsService,
    pub auth_service: AuthService,
    pub alert_limit: usize,
}
