#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use warp::Filter;
use warp::http::StatusCode;

pub fn feed_body(load: &str, rate: &str) -> serde_json::Value {
    serde_json::json!({
        "records": [
            {
                "curr_load": load,
                "curr_util_rate": rate,
                "fore_peak_dema_load": "36500",
                "publish_time": "2026-10-17 12:00"
            }
        ]
    })
}

/// Serves `body` on every GET and counts the requests.
pub fn serve_json(body: serde_json::Value) -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let route = warp::get().map(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        warp::reply::json(&body)
    });
    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    (addr, hits)
}

pub fn serve_status(status: StatusCode) -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let route = warp::any().map(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        warp::reply::with_status("upstream unavailable", status)
    });
    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    (addr, hits)
}

pub fn feed_url(addr: SocketAddr) -> String {
    format!("http://{addr}/")
}

pub fn hits(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
