use anyhow::Context;
use folio_config::EmailConfig;
use folio_email_impl::EmailServiceImpl;

/// Builds the SMTP transport, or `None` when credentials are not configured.
pub fn connect(config: &EmailConfig) -> anyhow::Result<Option<EmailServiceImpl>> {
    let Some((user, password)) = config.credentials() else {
        return Ok(None);
    };

    EmailServiceImpl::new(
        &config.host,
        config.port,
        config.force_tls,
        user.to_owned(),
        password.to_owned(),
        config.from.clone(),
    )
    .map(Some)
    .context("Failed to configure smtp transport")
}
