use crate::core::{qualified_name, ClassDef, FunctionDef, LineRange, Parameter};
use tree_sitter::Node;

use super::complexity::calculate_cyclomatic_complexity;

/// Functions, classes and module-level call references of one file
#[derive(Debug, Default)]
pub struct Definitions {
    pub functions: Vec<FunctionDef>,
    pub classes: Vec<ClassDef>,
    pub module_calls: Vec<String>,
}

impl Definitions {
    /// Later definitions of the same name replace earlier ones, as Python
    /// rebinding does
    fn insert_function(&mut self, function: FunctionDef) {
        self.functions.retain(|f| f.name != function.name);
        self.functions.push(function);
    }

    fn insert_class(&mut self, class: ClassDef, methods: Vec<FunctionDef>) {
        self.classes.retain(|c| c.name != class.name);
        self.functions
            .retain(|f| f.class_name.as_deref() != Some(class.name.as_str()));
        self.classes.push(class);
        for method in methods {
            self.insert_function(method);
        }
    }

    fn record_module_call(&mut self, call: String) {
        if !self.module_calls.contains(&call) {
            self.module_calls.push(call);
        }
    }
}

pub fn extract_definitions(root: Node, source: &str, file_id: &str) -> Definitions {
    let mut definitions = Definitions::default();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        visit_top_level(child, source, file_id, &mut definitions);
    }
    definitions
}

fn visit_top_level(node: Node, source: &str, file_id: &str, defs: &mut Definitions) {
    match node.kind() {
        "function_definition" => {
            if let Some(function) = function_def(node, source, file_id, None) {
                defs.insert_function(function);
            }
        }
        "class_definition" => class_def(node, source, file_id, defs),
        "decorated_definition" => {
            record_decorators(node, source, defs);
            if let Some(definition) = node.child_by_field_name("definition") {
                visit_top_level(definition, source, file_id, defs);
            }
        }
        "if_statement" | "try_statement" | "with_statement" | "for_statement"
        | "while_statement" => visit_compound(node, source, file_id, defs),
        _ => {
            for call in collect_calls(node, source) {
                defs.record_module_call(call);
            }
        }
    }
}

/// Module-level compound statement: definitions in any branch are module
/// definitions (`try: ... except ImportError: def f(): ...`); conditions and
/// headers run at import.
fn visit_compound(node: Node, source: &str, file_id: &str, defs: &mut Definitions) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "block" => {
                let mut block_cursor = child.walk();
                for statement in child.named_children(&mut block_cursor) {
                    visit_top_level(statement, source, file_id, defs);
                }
            }
            "elif_clause" | "else_clause" | "except_clause" | "except_group_clause"
            | "finally_clause" => visit_compound(child, source, file_id, defs),
            _ => {
                for call in collect_calls(child, source) {
                    defs.record_module_call(call);
                }
            }
        }
    }
}

fn class_def(node: Node, source: &str, file_id: &str, defs: &mut Definitions) {
    let Some(name) = node
        .child_by_field_name("name")
        .and_then(|n| text(n, source))
    else {
        return;
    };

    if let Some(bases) = node.child_by_field_name("superclasses") {
        for call in collect_calls(bases, source) {
            defs.record_module_call(call);
        }
    }

    let mut methods = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            let definition = if member.kind() == "decorated_definition" {
                record_decorators(member, source, defs);
                member.child_by_field_name("definition")
            } else {
                Some(member)
            };
            let Some(definition) = definition else {
                continue;
            };

            if definition.kind() == "function_definition" {
                if let Some(method) = function_def(definition, source, file_id, Some(name)) {
                    methods.retain(|m: &FunctionDef| m.name != method.name);
                    methods.push(method);
                }
            } else {
                // Class attributes and nested classes run at import time
                for call in collect_calls(definition, source) {
                    defs.record_module_call(call);
                }
            }
        }
    }

    let class = ClassDef {
        name: name.to_string(),
        lines: line_range(node),
        methods: methods
            .iter()
            .map(|m| m.simple_name().to_string())
            .collect(),
    };
    defs.insert_class(class, methods);
}

fn function_def(
    node: Node,
    source: &str,
    file_id: &str,
    class_name: Option<&str>,
) -> Option<FunctionDef> {
    let name = text(node.child_by_field_name("name")?, source)?;
    let local = match class_name {
        Some(class) => format!("{class}.{name}"),
        None => name.to_string(),
    };

    let mut parameters = node
        .child_by_field_name("parameters")
        .map(|p| extract_parameters(p, source))
        .unwrap_or_default();

    let receiver = match (class_name, parameters.first()) {
        (Some(_), Some(first))
            if first.annotation.is_none() && matches!(first.name.as_str(), "self" | "cls") =>
        {
            Some(parameters.remove(0).name)
        }
        _ => None,
    };

    let return_annotation = node
        .child_by_field_name("return_type")
        .and_then(|t| text(t, source))
        .map(str::to_string);

    let mut cursor = node.walk();
    let is_async = node.children(&mut cursor).any(|c| c.kind() == "async");

    let mut calls = Vec::new();
    for call in collect_calls(node, source) {
        if !calls.contains(&call) {
            calls.push(call);
        }
    }

    Some(FunctionDef {
        qualified_name: qualified_name(file_id, &local),
        name: local,
        class_name: class_name.map(str::to_string),
        file: file_id.to_string(),
        lines: line_range(node),
        receiver,
        parameters,
        return_annotation,
        complexity: calculate_cyclomatic_complexity(node),
        calls,
        is_async,
    })
}

fn extract_parameters(node: Node, source: &str) -> Vec<Parameter> {
    let mut parameters = Vec::new();
    let mut cursor = node.walk();
    for param in node.named_children(&mut cursor) {
        let (name, annotation) = match param.kind() {
            "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                (binding_name(param, source), None)
            }
            "typed_parameter" => (
                param
                    .named_child(0)
                    .and_then(|inner| binding_name(inner, source)),
                param.child_by_field_name("type"),
            ),
            "default_parameter" => (
                param
                    .child_by_field_name("name")
                    .and_then(|n| binding_name(n, source)),
                None,
            ),
            "typed_default_parameter" => (
                param
                    .child_by_field_name("name")
                    .and_then(|n| binding_name(n, source)),
                param.child_by_field_name("type"),
            ),
            // `*`, `/`, comments
            _ => continue,
        };

        if let Some(name) = name {
            parameters.push(Parameter {
                name,
                annotation: annotation.and_then(|a| text(a, source)).map(str::to_string),
            });
        }
    }
    parameters
}

/// `x` for `x`, `*x` and `**x`
fn binding_name(node: Node, source: &str) -> Option<String> {
    if node.kind() == "identifier" {
        return text(node, source).map(str::to_string);
    }
    let mut cursor = node.walk();
    let identifier = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "identifier");
    identifier.and_then(|i| text(i, source)).map(str::to_string)
}

/// A decorator runs when its definition is evaluated, so the decorator
/// itself counts as a module-level call
fn record_decorators(node: Node, source: &str, defs: &mut Definitions) {
    let mut cursor = node.walk();
    for decorator in node.named_children(&mut cursor) {
        if decorator.kind() != "decorator" {
            continue;
        }
        if let Some(path) = decorator.named_child(0).and_then(|e| callee_path(e, source)) {
            defs.record_module_call(path);
        }
        for call in collect_calls(decorator, source) {
            defs.record_module_call(call);
        }
    }
}

/// Callee references of every call under `node`, in source order
pub fn collect_calls(node: Node, source: &str) -> Vec<String> {
    let mut calls = Vec::new();
    visit_node_for_calls(node, source, &mut calls);
    calls
}

fn visit_node_for_calls(node: Node, source: &str, calls: &mut Vec<String>) {
    if node.kind() == "call" {
        if let Some(path) = node
            .child_by_field_name("function")
            .and_then(|f| callee_path(f, source))
        {
            calls.push(path);
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_node_for_calls(child, source, calls);
    }
}

/// `f`, `self.m`, `a.b.c`; `None` for subscripts, calls and other shapes
fn callee_path(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => text(node, source).map(str::to_string),
        "attribute" => {
            let object = callee_path(node.child_by_field_name("object")?, source)?;
            let attribute = text(node.child_by_field_name("attribute")?, source)?;
            Some(format!("{object}.{attribute}"))
        }
        _ => None,
    }
}

fn line_range(node: Node) -> LineRange {
    LineRange::new(node.start_position().row + 1, node.end_position().row + 1)
}

fn text<'a>(node: Node, source: &'a str) -> Option<&'a str> {
    node.utf8_text(source.as_bytes()).ok()
}
