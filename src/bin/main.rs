#[cfg(feature = "multi-thread")]
use geoip_api::config::ConfigThreads;
use geoip_api::config::{parse_config, Config};
use geoip_api::service::{GeoIpService, InvalidConfigError};

use hyper::server::conn::AddrStream;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Server};
use std::convert::Infallible;
use std::sync::Arc;

async fn async_main(config: Config) -> anyhow::Result<()> {
    let host = config.host;

    simple_logger::init_with_level(config.log_level)?;

    let geoip_service = tokio::task::spawn_blocking(move || -> Result<_, InvalidConfigError> {
        Ok(Arc::new(GeoIpService::from_config(config)?))
    })
    .await??;

    let make_service = make_service_fn(move |connection: &AddrStream| {
        let socket_remote_ip = connection.remote_addr().ip();
        let geoip_service = geoip_service.clone();
        let service = service_fn(move |request: Request<Body>| {
            let geoip_service = geoip_service.clone();
            async move {
                Ok::<_, Infallible>(geoip_service.handle(socket_remote_ip, request).await)
            }
        });
        async move { Ok::<_, Infallible>(service) }
    });

    let server = Server::bind(&host).serve(make_service);
    log::info!("listening on http://{host}");

    Ok(server.await?)
}

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "geoip-api.toml".to_owned());

    let config = parse_config(&config_path)?;

    #[cfg(feature = "multi-thread")]
    let mut runtime_builder = match config.threads {
        ConfigThreads::Custom(threads) => match threads.into() {
            1 => tokio::runtime::Builder::new_current_thread(),
            threads => {
                let mut builder = tokio::runtime::Builder::new_multi_thread();
                builder.worker_threads(threads);
                builder
            }
        },
        ConfigThreads::Cores => tokio::runtime::Builder::new_multi_thread(),
    };
    #[cfg(not(feature = "multi-thread"))]
    let mut runtime_builder = tokio::runtime::Builder::new_current_thread();
    let runtime = runtime_builder.enable_all().build()?;

    runtime.block_on(async_main(config))
}
