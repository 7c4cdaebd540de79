//! Generates the ambient declarations served at `{base}.d.ts`.
//!
//! Every record reachable from an endpoint's returns or arguments is declared first, once per
//! Rust type. The namespaces follow as a `declare var` and `interface` pair, which lets a single
//! identifier act both as the value the script defines and as its type:
//!
//! ```ts
//! declare var Widget: Widget
//! interface Widget {
//!   Compute: (v0_number: number, v1_number: number) => Promise<number>
//! }
//! ```

use std::{any::TypeId, collections::HashSet};

use serde_json::Value;

use crate::{
    javascript::push_header,
    mapper::{map_type, param_name},
    namespace::{is_identifier, validate_identifier, Namespace},
    Config, DataType, Endpoint, Endpoints, GenerateError,
};

const PREAMBLE: &str = "type base64 = string\n";

pub fn generate(config: &Config, endpoints: &Endpoints) -> Result<String, GenerateError> {
    let root = Namespace::build(endpoints)?;

    let mut out = String::new();
    push_header(&mut out, &config.header);
    out.push_str(PREAMBLE);

    // Interfaces merge by name, so a record may not share its name with the alias, a top level
    // namespace or another record.
    let mut declared = Declared {
        completed: HashSet::new(),
        names: root
            .children()
            .map(|child| child.key().to_owned())
            .chain(["base64".to_owned()])
            .collect(),
    };
    for endpoint in root.endpoints() {
        for ty in endpoint.returns().iter().chain(endpoint.args()) {
            write_records(&mut out, &mut declared, ty)?;
        }
    }

    for child in root.children() {
        let key = validate_identifier(child.key())?;
        out.push_str(&format!("\ndeclare var {key}: {key}\ninterface {key} {{\n"));
        match child.endpoint() {
            Some(endpoint) => {
                out.push_str(&format!("  {}\n", call_signature(endpoint)));
            }
            None => {
                for member in child.children() {
                    write_member(&mut out, member, "  ")?;
                }
            }
        }
        out.push_str("}\n");
    }

    Ok(out)
}

struct Declared {
    completed: HashSet<TypeId>,
    names: HashSet<String>,
}

/// Emits the interface of the record at the bottom of `ty` and of every record reachable from
/// its fields, skipping records already declared.
fn write_records(
    out: &mut String,
    declared: &mut Declared,
    ty: &DataType,
) -> Result<(), GenerateError> {
    let DataType::Record(record) = ty.element() else {
        return Ok(());
    };
    // Marked before the fields are walked so self references stop here.
    if !declared.completed.insert(record.id()) {
        return Ok(());
    }

    let name = validate_identifier(record.name())?;
    if !declared.names.insert(name.to_owned()) {
        return Err(GenerateError::RecordConflict { name: name.into() });
    }
    let fields = record
        .fields()
        .into_iter()
        .filter(|field| field.is_exported())
        .collect::<Vec<_>>();

    out.push_str(&format!("\ninterface {name} {{\n"));
    for field in &fields {
        out.push_str(&format!(
            "  {}?: {}\n",
            member_name(&field.name),
            map_type(&field.ty)
        ));
    }
    out.push_str("}\n");

    for field in &fields {
        write_records(out, declared, &field.ty)?;
    }

    Ok(())
}

fn write_member(out: &mut String, node: &Namespace<'_>, indent: &str) -> Result<(), GenerateError> {
    let key = validate_identifier(node.key())?;

    if let Some(endpoint) = node.endpoint() {
        out.push_str(&format!("{indent}{key}: {}\n", arrow_signature(endpoint)));
        return Ok(());
    }

    out.push_str(&format!("{indent}{key}: {{\n"));
    let inner = format!("{indent}  ");
    for child in node.children() {
        write_member(out, child, &inner)?;
    }
    out.push_str(&format!("{indent}}}\n"));

    Ok(())
}

fn params(types: &[DataType]) -> String {
    types
        .iter()
        .enumerate()
        .map(|(i, ty)| format!("{}: {}", param_name(i, ty), map_type(ty)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn promise(endpoint: &Endpoint) -> String {
    match endpoint.returns() {
        [] => "Promise<void>".into(),
        [ty] => format!("Promise<{}>", map_type(ty)),
        returns => format!("Promise<[{}]>", params(returns)),
    }
}

fn arrow_signature(endpoint: &Endpoint) -> String {
    format!("({}) => {}", params(endpoint.args()), promise(endpoint))
}

fn call_signature(endpoint: &Endpoint) -> String {
    format!("({}): {}", params(endpoint.args()), promise(endpoint))
}

fn member_name(name: &str) -> String {
    if is_identifier(name) {
        name.into()
    } else {
        Value::String(name.into()).to_string()
    }
}
