use crate::config::Config;
use chrono::Local;
use hyper::{Method, Uri, Version};
use std::net::SocketAddr;

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    println!("======================================");
    println!("EcoVoyage trip planner is running");
    println!("Listening on: http://{addr}");
    println!("Web root: {}", config.resources.web_root);
    if let Some(workers) = config.server.workers {
        println!("Worker threads: {workers}");
    }
    println!("Using Tokio runtime for concurrency");
    println!("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    println!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[ERROR] Failed to serve connection: {err:?}");
}

pub fn log_request(method: &Method, uri: &Uri, version: Version) {
    println!(
        "[{}] {method} {uri} {version:?}",
        Local::now().format("%d/%b/%Y:%H:%M:%S")
    );
}

pub fn log_response(status: u16, size: usize) {
    println!("[Response] Sent {status} ({size} bytes)");
}

pub fn log_error(message: &str) {
    eprintln!("[ERROR] {message}");
}

pub fn log_warning(message: &str) {
    eprintln!("[WARN] {message}");
}
