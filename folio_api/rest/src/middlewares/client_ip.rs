use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{
    extract::{ConnectInfo, Request},
    middleware::{from_fn, Next},
    Router,
};
use tracing::{debug, warn};

use crate::RealIpConfig;

/// Resolves the client address for every request and stores it as a
/// [`ClientIp`] extension. The rate limiter and the trace span read it from
/// there.
pub fn add<S: Clone + Send + Sync + 'static>(
    real_ip_config: Option<Arc<RealIpConfig>>,
) -> impl FnOnce(Router<S>) -> Router<S> {
    |router| {
        router.layer(from_fn(move |mut request: Request, next: Next| {
            let client_ip = resolve(&request, real_ip_config.as_deref());
            request.extensions_mut().insert(ClientIp(client_ip));
            next.run(request)
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientIp(pub IpAddr);

fn resolve(request: &Request, real_ip_config: Option<&RealIpConfig>) -> IpAddr {
    let peer_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .unwrap()
        .ip();

    let Some(RealIpConfig { header, set_from }) = real_ip_config else {
        return peer_ip;
    };

    // The header is only trusted when the request arrived from the
    // configured reverse proxy.
    if *set_from != peer_ip {
        if request.headers().contains_key(header) {
            debug!(%peer_ip, "ignoring real ip header from untrusted source");
        }
        return peer_ip;
    }

    match request
        .headers()
        .get(header)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<IpAddr>().ok())
    {
        Some(real_ip) => real_ip,
        None => {
            warn!(%peer_ip, "missing or unparsable real ip header");
            peer_ip
        }
    }
}
