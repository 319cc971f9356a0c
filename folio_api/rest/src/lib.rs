use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use folio_core_contact_contracts::ContactService;
use folio_core_health_contracts::HealthService;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

mod middlewares;
mod models;
mod routes;

pub use crate::middlewares::rate_limit::RateLimiter;

#[derive(Debug, Clone)]
pub struct RestServer<Health, Contact> {
    health: Health,
    contact: Contact,
    config: RestServerConfig,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub addr: SocketAddr,
    /// Browser origin allowed by CORS. `None` allows any origin.
    pub frontend_origin: Option<String>,
    pub real_ip_config: Option<Arc<RealIpConfig>>,
    pub rate_limiter: Arc<RateLimiter>,
    /// Registers `GET /api/contact/test`.
    pub expose_diagnostics: bool,
}

#[derive(Debug)]
pub struct RealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

impl<Health, Contact> RestServer<Health, Contact>
where
    Health: HealthService,
    Contact: ContactService,
{
    pub fn new(health: Health, contact: Contact, config: RestServerConfig) -> Self {
        Self {
            health,
            contact,
            config,
        }
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.config.addr;
        let router = self.router()?;
        let listener = TcpListener::bind(addr).await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(Into::into)
    }

    fn router(self) -> anyhow::Result<Router<()>> {
        let cors = cors(self.config.frontend_origin.as_deref())?;

        let router = Router::new()
            .merge(routes::health::router(self.health.into()))
            .nest(
                "/api",
                routes::contact::router(
                    self.contact.into(),
                    Arc::clone(&self.config.rate_limiter),
                    self.config.expose_diagnostics,
                ),
            )
            .layer(cors);

        let router = middlewares::trace::add(router);
        let router = middlewares::request_id::add(router);
        let router = middlewares::client_ip::add(self.config.real_ip_config)(router);
        let router = middlewares::panic_handler::add(router);

        Ok(router)
    }
}

fn cors(frontend_origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(match frontend_origin {
        Some(origin) => cors.allow_origin(
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid frontend origin {origin:?}"))?,
        ),
        None => cors.allow_origin(Any),
    })
}
