use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::config;

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let app_config = config();

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "config": app_config }))?);
        }
        OutputFormat::Text => {
            println!("Environment: {:?}", app_config.environment);
            println!("Listen: {}:{}", app_config.server.host, app_config.server.port);
            println!("Backend: {} (timeout {}s)", app_config.backend.api_url, app_config.backend.timeout_secs);
            println!(
                "Cookies: access {}s, refresh {}s, secure {}",
                app_config.session.access_token_max_age_secs,
                app_config.session.refresh_token_max_age_secs,
                app_config.session.secure_cookies
            );
            println!("Protected: {}", app_config.routes.protected_prefixes.join(", "));
            println!("Login: {}  Landing: {}", app_config.routes.login, app_config.routes.landing);
        }
    }
    Ok(())
}
