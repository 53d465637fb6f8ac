use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

mod config;
mod handler;
mod http;
mod logger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(serve(cfg))
}

async fn serve(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = bind_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let cfg = Arc::new(cfg);
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                if cfg.logging.access_log {
                    logger::log_connection_accepted(&peer_addr);
                }
                handle_connection(stream, Arc::clone(&cfg));
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}

/// Serve a single connection in a spawned task.
///
/// Wraps the TCP stream in `TokioIo`, serves it over HTTP/1.1 with
/// keep-alive, and bounds the whole connection with the configured timeout.
fn handle_connection(stream: TcpStream, cfg: Arc<config::Config>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let timeout = Duration::from_secs(cfg.http.request_timeout);

        let service_cfg = Arc::clone(&cfg);
        let conn = http1::Builder::new().keep_alive(true).serve_connection(
            io,
            service_fn(move |req| {
                let cfg = Arc::clone(&service_cfg);
                async move { handler::handle_request(req, cfg).await }
            }),
        );

        match tokio::time::timeout(timeout, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => logger::log_warning(&format!(
                "Connection timeout after {} seconds",
                timeout.as_secs()
            )),
        }
    });
}

/// Create a `TcpListener` bound to `addr`.
///
/// SO_REUSEADDR is set so the port can be rebound while a previous socket
/// sits in TIME_WAIT.
fn bind_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(128)?;

    TcpListener::from_std(socket.into())
}
