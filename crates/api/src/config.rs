/// Server configuration loaded from environment variables.
///
/// All fields except the database URLs have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`). Every external call
    /// made while serving a request is bounded by this deadline.
    pub request_timeout_secs: u64,
    /// Shared secret expected in `Authorization: Bearer <token>`.
    ///
    /// `None` means authentication is unconfigured: requests are rejected
    /// (and the condition logged) unless `dev_mode` is set.
    pub service_token: Option<String>,
    /// `true` when `APP_ENV=development`. Permits requests while the
    /// service token is unconfigured.
    pub dev_mode: bool,
    /// Workspace username of the account that owns the template catalog.
    pub template_admin_username: String,
    /// Name of the root folder created in each user's workspace.
    pub user_folder_name: String,
    /// Upgrade-path URL attached to denied access verdicts.
    pub upgrade_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                               |
    /// |---------------------------|---------------------------------------|
    /// | `HOST`                    | `0.0.0.0`                             |
    /// | `PORT`                    | `3000`                                |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`               |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                                  |
    /// | `SERVICE_TOKEN`           | unset (auth disabled, see above)      |
    /// | `APP_ENV`                 | `production`                          |
    /// | `TEMPLATE_ADMIN_USERNAME` | `template-admin`                      |
    /// | `USER_TEMPLATE_FOLDER`    | `Templates`                           |
    /// | `UPGRADE_URL`             | `https://app.flowsync.example/pricing`|
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let service_token = std::env::var("SERVICE_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        let dev_mode = std::env::var("APP_ENV")
            .map(|env| env.eq_ignore_ascii_case("development"))
            .unwrap_or(false);

        let template_admin_username = std::env::var("TEMPLATE_ADMIN_USERNAME")
            .unwrap_or_else(|_| "template-admin".into());

        let user_folder_name =
            std::env::var("USER_TEMPLATE_FOLDER").unwrap_or_else(|_| "Templates".into());

        let upgrade_url = std::env::var("UPGRADE_URL")
            .unwrap_or_else(|_| "https://app.flowsync.example/pricing".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            service_token,
            dev_mode,
            template_admin_username,
            user_folder_name,
            upgrade_url,
        }
    }
}
