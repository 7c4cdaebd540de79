#![allow(dead_code)]

use bindserve::{Config, Response, Router, Server};

pub fn build(router: Router) -> Server {
    router.build(Config::new("/api")).unwrap()
}

pub fn call(server: &Server, path: &str, body: &str) -> Response {
    server.handle(&format!("/api/{path}"), body.as_bytes())
}

pub fn body(response: &Response) -> &str {
    std::str::from_utf8(&response.body).unwrap()
}
