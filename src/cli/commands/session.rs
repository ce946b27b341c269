use serde_json::json;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::client::{ClientError, ConsoleClient};

/// Round trip through a running gateway: login, whoami, logout
pub async fn handle(url: &str, email: &str, password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut client = ConsoleClient::new(url)?;

    let user = match client.login(email, password).await {
        Ok(user) => user.clone(),
        Err(e @ ClientError::InvalidCredentials) | Err(e @ ClientError::ServiceUnavailable) => {
            output_error(&output_format, &e.to_string(), Some(error_code(&e)))?;
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    output_success(
        &output_format,
        &format!("Signed in as {}", user.display_name()),
        Some(json!({ "user": user })),
    )?;

    client.logout().await?;
    output_success(&output_format, "Signed out", None)?;
    Ok(())
}

fn error_code(e: &ClientError) -> &'static str {
    match e {
        ClientError::InvalidCredentials => "INVALID_CREDENTIALS",
        ClientError::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        _ => "CLIENT_ERROR",
    }
}
