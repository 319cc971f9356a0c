use std::sync::Arc;

use folio_api_rest::{RateLimiter, RealIpConfig, RestServer, RestServerConfig};
use folio_config::Config;
use folio_core_contact_impl::{ContactServiceConfig, ContactServiceImpl};
use folio_core_health_impl::{HealthServiceConfig, HealthServiceImpl};
use folio_email_contracts::EmailService;
use folio_templates_impl::TemplateServiceImpl;
use tracing::{info, warn};

use crate::email;

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let email = email::connect(&config.email)?;

    match &email {
        Some(email) => {
            info!("Connecting to smtp server");
            if let Err(err) = email.ping().await {
                warn!("Smtp server is currently unreachable: {err:#}");
            }
        }
        None => {
            warn!("Smtp credentials are not configured, contact submissions will be rejected")
        }
    }

    let template = TemplateServiceImpl::new();

    let contact = ContactServiceImpl::new(
        email.clone(),
        template,
        ContactServiceConfig {
            owner: Arc::new(config.contact.email.clone()),
            smtp_host: config.email.host.as_str().into(),
        },
    );

    let health = HealthServiceImpl::new(
        email,
        HealthServiceConfig {
            cache_ttl: *config.health.cache_ttl,
        },
    );

    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit.max_requests,
        *config.rate_limit.window,
    ));

    let server = RestServer::new(
        health,
        contact,
        RestServerConfig {
            addr: (config.http.host, config.http.port).into(),
            frontend_origin: config.http.frontend_origin.clone(),
            real_ip_config: config.http.real_ip.as_ref().map(|real_ip| {
                Arc::new(RealIpConfig {
                    header: real_ip.header.clone(),
                    set_from: real_ip.set_from,
                })
            }),
            rate_limiter,
            expose_diagnostics: config.http.expose_diagnostics,
        },
    );

    info!(
        "Starting http server on {}:{}",
        config.http.host, config.http.port
    );
    server.serve().await
}
