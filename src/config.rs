use std::borrow::Cow;

use crate::{namespace::is_identifier, BuildError};

/// Config is used to configure where a [`Server`](crate::Server) is mounted and how its bindings
/// are generated.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) base_path: Cow<'static, str>,
    pub(crate) transport_fn: Cow<'static, str>,
    pub(crate) header: Cow<'static, str>,
}

impl Config {
    /// `base_path` is the prefix every route lives under, eg. `/api` serves `/api.js`,
    /// `/api.d.ts` and `/api/{endpoint}`. A trailing `/` is ignored.
    pub fn new(base_path: impl Into<Cow<'static, str>>) -> Config {
        let base_path = match base_path.into() {
            Cow::Borrowed(path) => Cow::Borrowed(path.trim_end_matches('/')),
            Cow::Owned(path) => Cow::Owned(path.trim_end_matches('/').to_owned()),
        };

        Config {
            base_path,
            transport_fn: Cow::Borrowed("bindservePost"),
            header: Cow::Borrowed(""),
        }
    }

    /// Name of the function the generated script uses to call the server.
    pub fn transport_fn(self, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            transport_fn: name.into(),
            ..self
        }
    }

    /// Text placed at the top of both generated files, usually a comment.
    pub fn header(self, header: impl Into<Cow<'static, str>>) -> Self {
        Self {
            header: header.into(),
            ..self
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub(crate) fn validate(&self) -> Result<(), BuildError> {
        if !self.base_path.starts_with('/') {
            return Err(BuildError::InvalidBasePath(self.base_path.to_string()));
        }
        if !is_identifier(&self.transport_fn) {
            return Err(BuildError::InvalidTransportFn(self.transport_fn.to_string()));
        }
        Ok(())
    }
}
