//! Generates the JavaScript module served at `{base}.js`.
//!
//! The module starts with the transport function every stub forwards to, followed by one
//! `var` per top level namespace. Nested namespaces become object literals:
//!
//! ```js
//! var Widget = {
//!   Compute: async function(v0_number, v1_number) {return await bindservePost("/api/Widget/Compute", [v0_number, v1_number])}
//! };
//! ```

use serde_json::Value;

use crate::{
    mapper::param_name,
    namespace::{validate_identifier, Namespace},
    Config, Endpoint, Endpoints, GenerateError,
};

// Appended to `async function {transport_fn}`.
const TRANSPORT: &str = r#"(path, args) {
  const response = await fetch(path, {
    method: "POST",
    headers: {
      "Accept": "application/json",
      "Content-Type": "application/json",
    },
    body: JSON.stringify({Args: args}),
  });
  if (!response.ok) {
    const message = await response.text();
    console.error("request for " + path + " failed due to: " + message);
    throw new Error(message);
  }
  const contentType = response.headers.get("Content-Type") || "";
  if (!contentType.startsWith("application/json")) {
    throw new Error("request for " + path + " returned " + contentType + " instead of JSON");
  }
  return await response.json();
}
"#;

pub fn generate(config: &Config, endpoints: &Endpoints) -> Result<String, GenerateError> {
    let root = Namespace::build(endpoints)?;

    let mut out = String::new();
    push_header(&mut out, &config.header);
    out.push_str("async function ");
    out.push_str(&config.transport_fn);
    out.push_str(TRANSPORT);

    for child in root.children() {
        out.push('\n');
        write_node(&mut out, config, child, "")?;
        out.push_str(";\n");
    }

    Ok(out)
}

pub(crate) fn push_header(out: &mut String, header: &str) {
    if header.is_empty() {
        return;
    }
    out.push_str(header);
    if !header.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
}

fn write_node(
    out: &mut String,
    config: &Config,
    node: &Namespace<'_>,
    indent: &str,
) -> Result<(), GenerateError> {
    let key = validate_identifier(node.key())?;
    if node.depth() == 1 {
        out.push_str(&format!("var {key} = "));
    } else {
        out.push_str(&format!("{indent}{key}: "));
    }

    if let Some(endpoint) = node.endpoint() {
        write_stub(out, config, endpoint);
        return Ok(());
    }

    out.push('{');
    let inner = format!("{indent}  ");
    for (i, child) in node.children().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('\n');
        write_node(out, config, child, &inner)?;
    }
    out.push('\n');
    out.push_str(indent);
    out.push('}');

    Ok(())
}

fn write_stub(out: &mut String, config: &Config, endpoint: &Endpoint) {
    let params = endpoint
        .args()
        .iter()
        .enumerate()
        .map(|(i, ty)| param_name(i, ty))
        .collect::<Vec<_>>()
        .join(", ");
    let url = Value::String(format!("{}/{}", config.base_path(), endpoint.path()));

    out.push_str(&format!(
        "async function({params}) {{return await {}({url}, [{params}])}}",
        config.transport_fn
    ));
}
