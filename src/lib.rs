//! bindserve: Expose plain Rust functions as a JSON API and generate typed JavaScript clients for them.
//!
//! Every function registered with a [`Router`] is served at `POST {base}/{path}` and takes its
//! arguments positionally as `{"Args": [...]}`. The server also serves `{base}.js`, a module with
//! one async stub per function, and `{base}.d.ts`, the matching TypeScript declarations. Both are
//! derived from the function signatures so no schema is ever written by hand.
//!
//! ```rust
//! use bindserve::{Config, Describe, Router};
//! use serde::Serialize;
//!
//! #[derive(Serialize, Describe)]
//! pub struct Area {
//!     pub value: f64,
//! }
//!
//! let server = Router::new()
//!     .func("Widget/Compute", |a: f64, b: f64| Area { value: a * b })
//!     .build(Config::new("/api"))
//!     .unwrap();
//!
//! let response = server.handle("/api/Widget/Compute", br#"{"Args": [2, 3]}"#);
//! assert_eq!(response.body, br#"{"value":6.0}"#);
//! assert!(server.typescript().unwrap().contains("interface Area {\n  value?: number\n}"));
//! ```
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::panic,
    clippy::todo,
    clippy::panic_in_result_fn,
    // missing_docs
)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Lets the derive macro refer to `::bindserve` from within this crate.
extern crate self as bindserve;

mod blob;
mod config;
mod datatype;
mod error;
mod handler;
mod router;
mod server;

pub mod javascript;
pub mod mapper;
pub mod namespace;
pub mod typescript;

pub use blob::Blob;
pub use config::Config;
pub use datatype::{DataType, Describe, Field, PrimitiveType, RecordType};
pub use error::{BuildError, CallError, ExportError, GenerateError};
pub use handler::{Handler, IntoReturns, MethodHandler};
pub use router::{Endpoint, Endpoints, Methods, Router};
pub use server::{Response, Server};

#[cfg(feature = "derive")]
#[cfg_attr(docsrs, doc(cfg(feature = "derive")))]
pub use bindserve_macros::Describe;
