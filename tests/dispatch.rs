use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
};

use bindserve::{Blob, CallError, Config, Router};
use http::StatusCode;
use pretty_assertions::assert_eq;

mod utils;
use utils::*;

#[derive(Debug)]
struct OutOfStock(&'static str);

impl fmt::Display for OutOfStock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is out of stock", self.0)
    }
}

#[test]
fn zero_args() {
    let server = build(Router::new().func("version", || "1.0.0"));

    let response = call(&server, "version", "");
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type, "application/json");
    assert_eq!(body(&response), r#""1.0.0""#);

    for args in [r#"{"Args":[]}"#, "{}", "{\"Args\":null}"] {
        let response = call(&server, "version", args);
        assert_eq!(response.status, StatusCode::OK, "{args}");
        assert_eq!(body(&response), r#""1.0.0""#);
    }
}

#[test]
fn positional_args() {
    let server = build(
        Router::new()
            .func("Widget/Compute", |a: f64, b: f64| a * b)
            .func("greet", |name: String, times: usize| name.repeat(times)),
    );

    assert_eq!(
        body(&call(&server, "Widget/Compute", r#"{"Args": [2, 21]}"#)),
        "42.0"
    );
    assert_eq!(
        body(&call(&server, "greet", r#"{"Args": ["ab", 3]}"#)),
        r#""ababab""#
    );
}

#[test]
fn no_return_value_is_null() {
    let server = build(Router::new().func("noop", |_: bool| ()));

    let response = call(&server, "noop", r#"{"Args": [true]}"#);
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(body(&response), "null");
}

#[test]
fn only_first_return_value_is_sent() {
    let server = build(Router::new().func("pair", || (7u32, String::from("hidden"))));

    assert_eq!(body(&call(&server, "pair", "")), "7");
}

#[test]
fn tuple_and_unit_args() {
    let server = build(
        Router::new()
            .func("add", |point: (i32, i32)| point.0 + point.1)
            .func("label", |pair: (String, bool), _: ()| {
                format!("{}:{}", pair.0, pair.1)
            }),
    );

    assert_eq!(body(&call(&server, "add", r#"{"Args":[[1,2]]}"#)), "3");
    assert_eq!(
        body(&call(&server, "label", r#"{"Args":[["on",true],null]}"#)),
        r#""on:true""#
    );

    let response = call(&server, "add", r#"{"Args":[[1,"2"]]}"#);
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body(&response).starts_with("unable to decode arg 0"));
}

#[test]
fn unknown_path() {
    let server = build(Router::new().func("version", || "1.0.0"));

    let response = call(&server, "Widget/Missing", "{}");
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(body(&response).contains("Widget/Missing"));

    let response = server.handle("/other/version", b"");
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(body(&response), "'/other/version' not found");
}

#[test]
fn wrong_arg_count_never_invokes() {
    let calls = Arc::new(AtomicUsize::new(0));
    let server = build(Router::new().func("count", {
        let calls = calls.clone();
        move |a: i32, b: i32| {
            calls.fetch_add(1, Ordering::SeqCst);
            a + b
        }
    }));

    for body in [r#"{"Args": [1]}"#, r#"{"Args": [1, 2, 3]}"#, r#"{"Args": []}"#] {
        let response = call(&server, "count", body);
        assert_ne!(response.status, StatusCode::OK, "{body}");
    }
    assert!(matches!(
        server.dispatch("count", br#"{"Args": [1]}"#),
        Err(CallError::ArgCount {
            expected: 2,
            actual: 1
        })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert_eq!(body(&call(&server, "count", r#"{"Args": [1, 2]}"#)), "3");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn decode_errors() {
    let server = build(Router::new().func("double", |n: i64| n * 2));

    assert!(matches!(
        server.dispatch("double", b"not json"),
        Err(CallError::MalformedBody(_))
    ));
    assert!(matches!(
        server.dispatch("double", br#"{"Args": 1}"#),
        Err(CallError::MissingArgs)
    ));
    assert!(matches!(
        server.dispatch("double", br#"[1]"#),
        Err(CallError::MissingArgs)
    ));
    assert!(matches!(
        server.dispatch("double", br#"{"Args": ["one"]}"#),
        Err(CallError::Decode { index: 0, .. })
    ));

    let response = call(&server, "double", r#"{"Args": [1.5]}"#);
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body(&response).starts_with("unable to decode arg 0"));
}

#[test]
fn invocation_error() {
    let server = build(Router::new().func("buy", |item: String| {
        if item == "apple" {
            Ok(1u32)
        } else {
            Err(OutOfStock("pear"))
        }
    }));

    assert_eq!(body(&call(&server, "buy", r#"{"Args": ["apple"]}"#)), "1");

    let response = call(&server, "buy", r#"{"Args": ["pear"]}"#);
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.content_type, "text/plain; charset=utf-8");
    assert_eq!(body(&response), "pear is out of stock");
}

#[test]
fn panic_is_isolated() {
    let server = build(
        Router::new()
            .func("explode", |reason: String| -> u8 { panic!("{reason}") })
            .func("version", || "1.0.0"),
    );

    let handles = (0..8)
        .map(|i| {
            let server = server.clone();
            thread::spawn(move || {
                if i % 2 == 0 {
                    call(&server, "explode", r#"{"Args": ["boom"]}"#)
                } else {
                    call(&server, "version", "")
                }
            })
        })
        .collect::<Vec<_>>();

    for (i, handle) in handles.into_iter().enumerate() {
        let response = handle.join().unwrap();
        if i % 2 == 0 {
            assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body(&response), "boom");
        } else {
            assert_eq!(response.status, StatusCode::OK);
        }
    }
}

#[test]
fn object_methods() {
    struct Counter {
        start: i64,
    }

    impl Counter {
        fn add(&self, n: i64) -> i64 {
            self.start + n
        }
    }

    let server = build(
        Router::new().object("Counter", Arc::new(Counter { start: 40 }), |methods| {
            methods
                .method("Add", Counter::add)
                .method("Start", |this: &Counter| this.start)
        }),
    );

    assert_eq!(body(&call(&server, "Counter/Add", r#"{"Args": [2]}"#)), "42");
    assert_eq!(body(&call(&server, "Counter/Start", "")), "40");
}

#[test]
fn merged_routers() {
    let server = build(
        Router::new()
            .func("version", || "1.0.0")
            .merge("users", Router::new().func("count", || 3u8))
            .merge("", Router::new().func("ping", || "pong")),
    );

    assert_eq!(
        server.endpoints().paths().collect::<Vec<_>>(),
        ["ping", "users.count", "version"]
    );
    assert_eq!(body(&call(&server, "users.count", "")), "3");
}

#[test]
fn last_registration_wins() {
    let server = build(
        Router::new()
            .func("version", || "1.0.0")
            .func("version", || "2.0.0"),
    );

    assert_eq!(server.endpoints().len(), 1);
    assert_eq!(body(&call(&server, "version", "")), r#""2.0.0""#);
}

#[test]
fn blobs_are_base64() {
    let server = build(Router::new().func("reverse", |blob: Blob| {
        let mut bytes = blob.into_inner();
        bytes.reverse();
        Blob(bytes)
    }));

    assert_eq!(
        body(&call(&server, "reverse", r#"{"Args": ["AQID"]}"#)),
        r#""AwIB""#
    );
}

#[test]
fn invalid_config() {
    assert!(Router::new().build(Config::new("api")).is_err());
    assert!(Router::new()
        .build(Config::new("/api").transport_fn("not valid"))
        .is_err());
}
