//! Minimal HTTP/1.1 server for integration tests.
//!
//! Routes requests by path prefix to a canned reply: a real image, a
//! placeholder pixel, an error status, an HTML page, or a stalled response.

use std::io::{Cursor, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use image::{ImageFormat, RgbaImage};

#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with the given body as `image/png`.
    Image(Vec<u8>),
    /// Bare status line with an empty body.
    Status(u16),
    /// 200 with an HTML error page.
    Html,
    /// Wait this long before answering with a real image.
    Stall(Duration),
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    RgbaImage::new(width, height)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

/// A real 32x32 image.
pub fn real_image() -> Reply {
    Reply::Image(png(32, 32))
}

/// The 1x1 placeholder CDNs serve instead of an error.
pub fn pixel() -> Reply {
    Reply::Image(png(1, 1))
}

/// Starts a server in a background thread. Returns the base URL without a
/// trailing slash (e.g. "http://127.0.0.1:12345"). Unrouted paths get 404.
/// The server runs until the process exits.
pub fn start(routes: Vec<(&str, Reply)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<Vec<(String, Reply)>> = Arc::new(
        routes
            .into_iter()
            .map(|(prefix, reply)| (prefix.to_string(), reply))
            .collect(),
    );
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            thread::spawn(move || handle(stream, &routes));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: TcpStream, routes: &[(String, Reply)]) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");

    let reply = routes
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix.as_str()))
        .map(|(_, reply)| reply.clone())
        .unwrap_or(Reply::Status(404));

    match reply {
        Reply::Image(body) => respond(&mut stream, "200 OK", "image/png", &body),
        Reply::Status(code) => {
            let status = format!("{} Error", code);
            respond(&mut stream, &status, "text/plain", b"");
        }
        Reply::Html => respond(
            &mut stream,
            "200 OK",
            "text/html",
            b"<html><body>upstream unavailable</body></html>",
        ),
        Reply::Stall(wait) => {
            thread::sleep(wait);
            respond(&mut stream, "200 OK", "image/png", &png(32, 32));
        }
    }
}

fn respond(stream: &mut TcpStream, status: &str, content_type: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}
