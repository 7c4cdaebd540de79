use std::{
    any::Any,
    fs,
    panic::{catch_unwind, AssertUnwindSafe},
    path::Path,
    sync::Arc,
};

use http::StatusCode;
use serde_json::Value;

use crate::{javascript, typescript, CallError, Config, Endpoints, ExportError, GenerateError};

/// A response produced by [`Server::handle`], ready to be written by any HTTP library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    fn ok(content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type,
            body: body.into(),
        }
    }

    fn error(status: StatusCode, message: impl std::fmt::Display) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: message.to_string().into_bytes(),
        }
    }
}

/// The frozen endpoint table together with the [`Config`] it is served with.
///
/// Cloning is cheap and every clone shares the same table, so a server can be handed to as many
/// concurrent request handlers as needed.
#[derive(Debug, Clone)]
pub struct Server {
    config: Arc<Config>,
    endpoints: Arc<Endpoints>,
}

impl Server {
    pub(crate) fn new(config: Config, endpoints: Endpoints) -> Self {
        Self {
            config: Arc::new(config),
            endpoints: Arc::new(endpoints),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Routes a request for `path`, which must include the base path.
    ///
    /// `{base}.js` and `{base}.d.ts` return the generated bindings, `{base}/{endpoint}` calls the
    /// endpoint with `body`. HTTP methods are left to the transport.
    pub fn handle(&self, path: &str, body: &[u8]) -> Response {
        let Some(rest) = path.strip_prefix(self.config.base_path()) else {
            return self.not_found(path);
        };

        match rest {
            ".js" => self.generated("application/javascript", || self.javascript()),
            ".d.ts" => self.generated("text/plain", || self.typescript()),
            _ => match rest.strip_prefix('/') {
                Some(endpoint) => match self.dispatch(endpoint, body) {
                    Ok(body) => Response::ok("application/json", body),
                    Err(err) => Response::error(err.status(), err),
                },
                None => self.not_found(path),
            },
        }
    }

    fn not_found(&self, path: &str) -> Response {
        tracing::warn!(%path, "no route");
        Response::error(StatusCode::NOT_FOUND, CallError::NotFound(path.into()))
    }

    fn generated(
        &self,
        content_type: &'static str,
        generate: impl FnOnce() -> Result<String, GenerateError>,
    ) -> Response {
        match catch_unwind(AssertUnwindSafe(generate)) {
            Ok(Ok(source)) => Response::ok(content_type, source),
            Ok(Err(err)) => {
                tracing::error!(%err, "failed to generate bindings");
                Response::error(StatusCode::INTERNAL_SERVER_ERROR, err)
            }
            Err(payload) => {
                let message = panic_message(payload);
                tracing::error!(%message, "panicked while generating bindings");
                Response::error(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }

    /// Calls the endpoint registered at `path` (without the base path) with a `{"Args": [...]}`
    /// request body and returns the JSON encoded first return value.
    ///
    /// A panic inside the endpoint is caught and reported as [`CallError::Panic`].
    pub fn dispatch(&self, path: &str, body: &[u8]) -> Result<Vec<u8>, CallError> {
        let result = self.call(path, body);
        match &result {
            Ok(_) => tracing::debug!(%path, "called endpoint"),
            Err(err @ (CallError::Invocation(_) | CallError::Panic(_) | CallError::Encode(_))) => {
                tracing::error!(%path, %err, "endpoint failed")
            }
            Err(err) => tracing::warn!(%path, %err, "rejected call"),
        }
        result
    }

    fn call(&self, path: &str, body: &[u8]) -> Result<Vec<u8>, CallError> {
        let endpoint = self
            .endpoints
            .lookup(path)
            .ok_or_else(|| CallError::NotFound(path.into()))?;

        let args = if endpoint.args().is_empty() {
            Vec::new()
        } else {
            let body: Value = serde_json::from_slice(body).map_err(CallError::MalformedBody)?;
            match body {
                Value::Object(mut body) => match body.remove("Args") {
                    Some(Value::Array(args)) => args,
                    _ => return Err(CallError::MissingArgs),
                },
                _ => return Err(CallError::MissingArgs),
            }
        };

        let value = catch_unwind(AssertUnwindSafe(|| endpoint.invoke(args)))
            .map_err(|payload| CallError::Panic(panic_message(payload)))??;

        serde_json::to_vec(&value).map_err(CallError::Encode)
    }

    /// The JavaScript module served at `{base}.js`.
    pub fn javascript(&self) -> Result<String, GenerateError> {
        javascript::generate(&self.config, &self.endpoints)
    }

    /// The declarations served at `{base}.d.ts`.
    pub fn typescript(&self) -> Result<String, GenerateError> {
        typescript::generate(&self.config, &self.endpoints)
    }

    /// Write the JavaScript module to `path`, eg. as part of a build script.
    pub fn export_javascript(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        export(path.as_ref(), self.javascript()?)
    }

    pub fn export_typescript(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        export(path.as_ref(), self.typescript()?)
    }
}

fn export(path: &Path, source: String) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, source)?;
    tracing::debug!(path = %path.display(), "exported bindings");
    Ok(())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<&'static str>() {
        Ok(message) => (*message).into(),
        Err(payload) => match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(_) => "panic with a non string payload".into(),
        },
    }
}
