//! Folds the flat set of endpoint paths into a tree of namespaces.

use std::collections::BTreeMap;

use crate::{Endpoint, GenerateError};

/// A node of the namespace tree.
///
/// Leaves carry exactly one endpoint, every other node groups its children. The tree borrows from
/// the endpoint table it was built from and is rebuilt for every generated file.
#[derive(Debug)]
pub struct Namespace<'a> {
    key: &'a str,
    depth: usize,
    endpoint: Option<&'a Endpoint>,
    children: BTreeMap<&'a str, Namespace<'a>>,
}

impl<'a> Namespace<'a> {
    fn new(key: &'a str, depth: usize) -> Self {
        Self {
            key,
            depth,
            endpoint: None,
            children: BTreeMap::new(),
        }
    }

    /// Build the tree by splitting every endpoint's path on `.` and `/`.
    ///
    /// The result only depends on the set of paths, never on the order they are visited in. A
    /// path which is both an endpoint and the prefix of another endpoint is rejected.
    pub fn build(endpoints: impl IntoIterator<Item = &'a Endpoint>) -> Result<Self, GenerateError> {
        let mut root = Self::new("", 0);

        for endpoint in endpoints {
            let path = endpoint.path();
            let mut node = &mut root;

            for segment in path.split(['.', '/']) {
                if let Some(leaf) = node.endpoint {
                    return Err(conflict(leaf.path(), path));
                }
                let depth = node.depth + 1;
                node = node
                    .children
                    .entry(segment)
                    .or_insert_with(|| Self::new(segment, depth));
            }

            if let Some(existing) = node.endpoint {
                return Err(conflict(existing.path(), path));
            }
            if !node.children.is_empty() {
                return Err(GenerateError::Conflict { path: path.into() });
            }
            node.endpoint = Some(endpoint);
        }

        Ok(root)
    }

    /// The path segment this node represents, empty for the root.
    pub fn key(&self) -> &'a str {
        self.key
    }

    /// Zero for the root, one for top level namespaces and endpoints.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    pub fn endpoint(&self) -> Option<&'a Endpoint> {
        self.endpoint
    }

    /// Children sorted by key.
    pub fn children(&self) -> impl Iterator<Item = &Namespace<'a>> {
        self.children.values()
    }

    /// Every endpoint below this node in depth first, key sorted order.
    pub fn endpoints(&self) -> Vec<&'a Endpoint> {
        let mut out = Vec::new();
        self.collect_endpoints(&mut out);
        out
    }

    fn collect_endpoints(&self, out: &mut Vec<&'a Endpoint>) {
        out.extend(self.endpoint);
        for child in self.children() {
            child.collect_endpoints(out);
        }
    }
}

fn conflict(existing: &str, path: &str) -> GenerateError {
    if existing.split(['.', '/']).eq(path.split(['.', '/'])) {
        GenerateError::Duplicate {
            path: path.into(),
            other: existing.into(),
        }
    } else {
        GenerateError::Conflict {
            path: existing.into(),
        }
    }
}

/// Whether `value` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn validate_identifier(value: &str) -> Result<&str, GenerateError> {
    if is_identifier(value) {
        Ok(value)
    } else {
        Err(GenerateError::InvalidIdentifier(value.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Endpoints;

    fn endpoints(paths: &[&'static str]) -> Endpoints {
        let mut endpoints = Endpoints::default();
        for path in paths {
            endpoints.register(*path, Endpoint::new(vec![], vec![], |_| Ok(().into())));
        }
        endpoints
    }

    fn shape(node: &Namespace<'_>) -> String {
        let children = node.children().map(shape).collect::<Vec<_>>().join(",");
        match node.endpoint() {
            Some(endpoint) => format!("{}={}", node.key(), endpoint.path()),
            None => format!("{}({children})", node.key()),
        }
    }

    #[test]
    fn order_independent() {
        let endpoints = endpoints(&["a.b", "a.c", "x"]);
        let list = endpoints.iter().collect::<Vec<_>>();

        let forward = Namespace::build(list.iter().copied()).unwrap();
        let backward = Namespace::build(list.iter().rev().copied()).unwrap();
        let shuffled = Namespace::build([list[1], list[2], list[0]]).unwrap();

        assert_eq!(shape(&forward), "(a(b=a.b,c=a.c),x=x)");
        assert_eq!(shape(&forward), shape(&backward));
        assert_eq!(shape(&forward), shape(&shuffled));
    }

    #[test]
    fn separators_are_interchangeable() {
        let endpoints = endpoints(&["Widget/Compute", "Widget.Reset", "Widget/Sub.Deep"]);
        let root = Namespace::build(&endpoints).unwrap();

        assert_eq!(
            shape(&root),
            "(Widget(Compute=Widget/Compute,Reset=Widget.Reset,Sub(Deep=Widget/Sub.Deep)))"
        );
        let widget = root.children().next().unwrap();
        assert_eq!(widget.depth(), 1);
        assert_eq!(widget.children().last().unwrap().depth(), 2);
        assert_eq!(
            root.endpoints()
                .into_iter()
                .map(Endpoint::path)
                .collect::<Vec<_>>(),
            ["Widget/Compute", "Widget.Reset", "Widget/Sub.Deep"]
        );
    }

    #[test]
    fn leaf_and_group_conflict() {
        let endpoints = endpoints(&["a", "a.b"]);
        assert_eq!(
            Namespace::build(&endpoints).unwrap_err(),
            GenerateError::Conflict { path: "a".into() }
        );

        let list = endpoints.iter().collect::<Vec<_>>();
        assert_eq!(
            Namespace::build(list.into_iter().rev()).unwrap_err(),
            GenerateError::Conflict { path: "a".into() }
        );
    }

    #[test]
    fn same_segments_twice() {
        let endpoints = endpoints(&["a.b", "a/b"]);
        assert_eq!(
            Namespace::build(&endpoints).unwrap_err(),
            GenerateError::Duplicate {
                path: "a/b".into(),
                other: "a.b".into()
            }
        );
    }

    #[test]
    fn identifiers() {
        for valid in ["a", "_", "Widget", "snake_case_1", "_9"] {
            assert!(is_identifier(valid), "{valid}");
        }
        for invalid in ["", "9a", "my-widget", "a b", "é"] {
            assert!(!is_identifier(invalid), "{invalid}");
        }
    }
}
