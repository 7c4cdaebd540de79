use std::{borrow::Cow, collections::BTreeMap, fmt, sync::Arc};

use serde_json::Value;

use crate::{
    handler::{Handler, MethodHandler},
    BuildError, CallError, Config, DataType, Server,
};

type Invoke = Arc<dyn Fn(Vec<Value>) -> Result<Value, CallError> + Send + Sync>;

/// One registered callable and its signature.
#[derive(Clone)]
pub struct Endpoint {
    path: Cow<'static, str>,
    args: Vec<DataType>,
    returns: Vec<DataType>,
    invoke: Invoke,
}

impl Endpoint {
    /// Construct an endpoint from an already type-erased callable.
    ///
    /// `invoke` receives the raw positional arguments and returns the JSON value to send back.
    /// Prefer [`Endpoint::from_handler`] which derives the types from the function signature.
    pub fn new(
        args: Vec<DataType>,
        returns: Vec<DataType>,
        invoke: impl Fn(Vec<Value>) -> Result<Value, CallError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            path: Cow::Borrowed(""),
            args,
            returns,
            invoke: Arc::new(invoke),
        }
    }

    pub fn from_handler<M: 'static, H: Handler<M>>(handler: H) -> Self {
        Self::new(H::args(), H::returns(), move |args| {
            <H as Handler<M>>::invoke(&handler, args)
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Argument types in positional order.
    pub fn args(&self) -> &[DataType] {
        &self.args
    }

    /// Return types, excluding the error return.
    pub fn returns(&self) -> &[DataType] {
        &self.returns
    }

    pub fn invoke(&self, args: Vec<Value>) -> Result<Value, CallError> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("path", &self.path)
            .field("args", &self.args)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// The endpoint table, keyed and ordered by path.
#[derive(Debug, Clone, Default)]
pub struct Endpoints(BTreeMap<Cow<'static, str>, Endpoint>);

impl Endpoints {
    /// Insert `endpoint` at `path`, returning the endpoint it replaced.
    pub fn register(
        &mut self,
        path: impl Into<Cow<'static, str>>,
        mut endpoint: Endpoint,
    ) -> Option<Endpoint> {
        let path = path.into();
        endpoint.path = path.clone();
        let replaced = self.0.insert(path, endpoint);
        if let Some(replaced) = &replaced {
            tracing::debug!(path = %replaced.path, "endpoint registration overwritten");
        }
        replaced
    }

    pub fn lookup(&self, path: &str) -> Option<&Endpoint> {
        self.0.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|key| &**key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Endpoints {
    type Item = &'a Endpoint;
    type IntoIter = std::collections::btree_map::Values<'a, Cow<'static, str>, Endpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.values()
    }
}

/// Collects the callables exposed by a [`Server`].
///
/// ```rust
/// use bindserve::{Config, Router};
///
/// let server = Router::new()
///     .func("Widget/Compute", |a: f64, b: f64| a * b)
///     .func("version", || "1.0.0")
///     .build(Config::new("/api"))
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct Router {
    endpoints: Endpoints,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function at `path`. Path segments are separated by `.` or `/`.
    ///
    /// Registering the same path twice keeps the last registration.
    pub fn func<M: 'static, H: Handler<M>>(
        self,
        path: impl Into<Cow<'static, str>>,
        handler: H,
    ) -> Self {
        self.register(path, Endpoint::from_handler(handler))
    }

    /// Register the methods of `instance` under `{name}/{method}`.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use bindserve::Router;
    ///
    /// struct Counter(i64);
    ///
    /// let router = Router::new().object("Counter", Arc::new(Counter(2)), |methods| {
    ///     methods.method("Add", |this: &Counter, n: i64| this.0 + n)
    /// });
    /// assert!(router.endpoints().lookup("Counter/Add").is_some());
    /// ```
    pub fn object<T: Send + Sync + 'static>(
        mut self,
        name: impl Into<Cow<'static, str>>,
        instance: Arc<T>,
        methods: impl FnOnce(Methods<T>) -> Methods<T>,
    ) -> Self {
        let name = name.into();
        let methods = methods(Methods {
            instance,
            endpoints: Vec::new(),
        });
        for (method, endpoint) in methods.endpoints {
            self.endpoints.register(format!("{name}/{method}"), endpoint);
        }
        self
    }

    pub fn register(mut self, path: impl Into<Cow<'static, str>>, endpoint: Endpoint) -> Self {
        self.endpoints.register(path, endpoint);
        self
    }

    /// Add every endpoint of `other`, prefixing its paths with `{prefix}.`.
    pub fn merge(mut self, prefix: impl Into<Cow<'static, str>>, other: Self) -> Self {
        let prefix = prefix.into();
        for (path, endpoint) in other.endpoints.0 {
            let path: Cow<'static, str> = if prefix.is_empty() {
                path
            } else {
                format!("{prefix}.{path}").into()
            };
            self.endpoints.register(path, endpoint);
        }
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Freeze the registered endpoints into a [`Server`].
    pub fn build(self, config: Config) -> Result<Server, BuildError> {
        config.validate()?;
        tracing::debug!(
            base_path = %config.base_path(),
            endpoints = self.endpoints.len(),
            "built server"
        );
        Ok(Server::new(config, self.endpoints))
    }
}

/// The methods of an object registered with [`Router::object`].
pub struct Methods<T> {
    instance: Arc<T>,
    endpoints: Vec<(Cow<'static, str>, Endpoint)>,
}

impl<T: Send + Sync + 'static> Methods<T> {
    pub fn method<M: 'static, H: MethodHandler<T, M>>(
        mut self,
        name: impl Into<Cow<'static, str>>,
        handler: H,
    ) -> Self {
        let instance = self.instance.clone();
        let endpoint = Endpoint::new(H::args(), H::returns(), move |args| {
            <H as MethodHandler<T, M>>::invoke(&handler, &instance, args)
        });
        self.endpoints.push((name.into(), endpoint));
        self
    }
}
