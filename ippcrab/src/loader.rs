//! Loads the XML representation of a program into an instruction list.
//!
//! ```xml
//! <program language="IPPcode23">
//!   <instruction order="1" opcode="WRITE">
//!     <arg1 type="string">hello</arg1>
//!   </instruction>
//! </program>
//! ```
//!
//! Instructions are returned sorted by their `order` attribute. Text and
//! comment nodes between elements are ignored.

use crate::error::LoadError;
use crate::instruction::{Instruction, Literal, Opcode, Operand};
use crate::ty::Type;
use roxmltree::{Document, Node};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::debug;

const LANGUAGE: &str = "IPPcode23";

fn structure(message: impl Into<String>) -> LoadError {
    LoadError::Structure(message.into())
}

/// Parses `xml` and returns the program's instructions in execution order.
pub fn load(xml: &str) -> Result<Vec<Instruction>, LoadError> {
    let document = Document::parse(xml)?;
    let root = document.root_element();
    check_program(root)?;

    let mut ordered = BTreeMap::new();
    for node in root.children().filter(Node::is_element) {
        let (order, instruction) = load_instruction(node)?;
        match ordered.entry(order) {
            Entry::Occupied(_) => {
                return Err(structure(format!("duplicate instruction order {order}")));
            }
            Entry::Vacant(slot) => {
                slot.insert(instruction);
            }
        }
    }

    debug!("Loaded {} instruction(s)", ordered.len());
    Ok(ordered.into_values().collect())
}

fn check_program(root: Node<'_, '_>) -> Result<(), LoadError> {
    if root.tag_name().name() != "program" {
        return Err(structure(format!(
            "root element must be `program`, found `{}`",
            root.tag_name().name()
        )));
    }
    for attr in root.attributes() {
        if !matches!(attr.name(), "language" | "name" | "description") {
            return Err(structure(format!(
                "unexpected attribute `{}` of `program`",
                attr.name()
            )));
        }
    }
    match root.attribute("language") {
        Some(language) if language.trim().eq_ignore_ascii_case(LANGUAGE) => Ok(()),
        Some(language) => Err(structure(format!("unsupported language `{language}`"))),
        None => Err(structure("missing `language` attribute")),
    }
}

fn load_instruction(node: Node<'_, '_>) -> Result<(u64, Instruction), LoadError> {
    if node.tag_name().name() != "instruction" {
        return Err(structure(format!(
            "unexpected element `{}` in `program`",
            node.tag_name().name()
        )));
    }
    if node.attributes().count() != 2 {
        return Err(structure(
            "`instruction` must have exactly the attributes `order` and `opcode`",
        ));
    }

    let order = node
        .attribute("order")
        .map(str::trim)
        .filter(|order| !order.is_empty() && order.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|order| order.parse::<u64>().ok())
        .filter(|order| *order > 0)
        .ok_or_else(|| structure("`order` must be a positive integer"))?;
    let opcode: Opcode = node
        .attribute("opcode")
        .ok_or_else(|| structure(format!("instruction {order} has no `opcode`")))?
        .trim()
        .parse()
        .map_err(LoadError::Structure)?;

    let mut args: [Option<Operand>; 3] = Default::default();
    for arg in node.children().filter(Node::is_element) {
        let name = arg.tag_name().name();
        let idx = match name {
            "arg1" => 0,
            "arg2" => 1,
            "arg3" => 2,
            _ => {
                return Err(structure(format!(
                    "unexpected element `{name}` in instruction {order}"
                )));
            }
        };
        if args[idx].is_some() {
            return Err(structure(format!("duplicate `{name}` in instruction {order}")));
        }
        args[idx] = Some(load_operand(arg)?);
    }

    let count = args.iter().take_while(|arg| arg.is_some()).count();
    if args[count..].iter().any(Option::is_some) {
        return Err(structure(format!(
            "arguments of instruction {order} are not contiguous"
        )));
    }
    Ok((order, Instruction::new(opcode, args.into_iter().flatten())))
}

fn load_operand(arg: Node<'_, '_>) -> Result<Operand, LoadError> {
    let name = arg.tag_name().name();
    if arg.children().any(|child| child.is_element()) {
        return Err(structure(format!("`{name}` cannot contain elements")));
    }
    let kind = match (arg.attributes().count(), arg.attribute("type")) {
        (1, Some(kind)) => kind.trim().to_ascii_lowercase(),
        _ => {
            return Err(structure(format!(
                "`{name}` must have exactly the attribute `type`"
            )));
        }
    };
    let text = arg.text().unwrap_or_default().trim();

    match kind.as_str() {
        "var" => text.parse().map(Operand::Variable).map_err(LoadError::Structure),
        "label" if text.is_empty() => Err(structure("label name cannot be empty")),
        "label" => Ok(Operand::Label(text.to_string())),
        "type" => text
            .parse()
            .map(Operand::Type)
            .map_err(|err| structure(err.to_string())),
        _ => match kind.parse::<Type>() {
            Ok(ty) => Ok(Operand::Constant(Literal::new(ty, text))),
            Err(_) => Err(structure(format!("unknown argument type `{kind}`"))),
        },
    }
}
