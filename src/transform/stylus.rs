// src/transform/stylus.rs

//! Stylus resolution for the indentation-based dialect, emitting
//! compressed CSS.
//!
//! Like LESS, Stylus has no compiler crate in the ecosystem, so this is a
//! purpose-built resolver for the commonly used subset:
//!
//! - indentation-significant nesting with `&` parent references
//! - `name = value` variables, substituted by whole token in values
//! - properties written as `color red` or `color: red`
//! - braced blocks are tolerated (braces are treated as noise)
//!
//! Output is compressed: `sel{prop:val;prop:val}` per rule.

use std::collections::HashMap;

use crate::errors::Result;

/// Resolve Stylus source to compressed CSS.
///
/// The dialect is forgiving by design: lines that parse as neither a
/// selector, a variable, nor a declaration are dropped rather than
/// rejected, so this never fails on plain-CSS-ish input.
pub fn compile_stylus(source: &str) -> Result<String> {
    let lines = parse_lines(source);
    let tree = build_tree(&lines);

    let mut vars = HashMap::new();
    let mut rules = Vec::new();
    eval_nodes(&tree, &[], &mut vars, &mut rules);

    let mut out = String::new();
    for rule in rules {
        if rule.decls.is_empty() {
            continue;
        }
        out.push_str(&rule.selector);
        out.push('{');
        let decls: Vec<String> = rule
            .decls
            .iter()
            .map(|(name, value)| format!("{name}:{value}"))
            .collect();
        out.push_str(&decls.join(";"));
        out.push('}');
    }
    Ok(out)
}

#[derive(Debug)]
struct Line {
    indent: usize,
    text: String,
}

#[derive(Debug)]
struct Node {
    text: String,
    children: Vec<Node>,
}

#[derive(Debug)]
struct CssRule {
    selector: String,
    decls: Vec<(String, String)>,
}

/// Split source into significant lines with their indentation width.
/// Comments and braces are stripped; tabs count as two columns.
fn parse_lines(source: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut in_block_comment = false;

    for raw in source.lines() {
        let mut text = raw.to_string();

        if in_block_comment {
            match text.find("*/") {
                Some(end) => {
                    text = text[end + 2..].to_string();
                    in_block_comment = false;
                }
                None => continue,
            }
        }
        while let Some(start) = text.find("/*") {
            match text[start..].find("*/") {
                Some(end) => text.replace_range(start..start + end + 2, ""),
                None => {
                    text.truncate(start);
                    in_block_comment = true;
                }
            }
        }
        if let Some(slash) = text.find("//") {
            text.truncate(slash);
        }

        let indent = indent_width(&text);
        let trimmed = text
            .trim()
            .trim_end_matches(['{', '}'])
            .trim()
            .to_string();
        if trimmed.is_empty() {
            continue;
        }
        lines.push(Line {
            indent,
            text: trimmed,
        });
    }
    lines
}

fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += 2,
            _ => break,
        }
    }
    width
}

/// Fold the flat line list into a tree keyed on indentation. A line is a
/// child of the nearest preceding line with smaller indent.
fn build_tree(lines: &[Line]) -> Vec<Node> {
    fn build(lines: &[Line], pos: &mut usize, indent: usize) -> Vec<Node> {
        let mut nodes = Vec::new();
        while *pos < lines.len() {
            let line = &lines[*pos];
            if line.indent < indent {
                break;
            }
            let own = line.indent;
            let text = line.text.clone();
            *pos += 1;
            let children = match lines.get(*pos) {
                Some(next) if next.indent > own => build(lines, pos, next.indent),
                _ => Vec::new(),
            };
            nodes.push(Node { text, children });
        }
        nodes
    }

    let mut pos = 0;
    build(lines, &mut pos, 0)
}

fn eval_nodes(
    nodes: &[Node],
    selectors: &[String],
    vars: &mut HashMap<String, String>,
    out: &mut Vec<CssRule>,
) {
    let mut decls = Vec::new();
    let mut nested = Vec::new();

    for node in nodes {
        if node.children.is_empty() {
            if let Some((name, value)) = split_assignment(&node.text) {
                let value = substitute(&value, vars);
                vars.insert(name, value);
            } else if let Some((name, value)) = split_property(&node.text) {
                decls.push((name, substitute(&value, vars)));
            }
            // A childless non-property line (stray selector) is dropped.
        } else {
            let subsels = combine_selectors(selectors, &node.text);
            eval_nodes(&node.children, &subsels, vars, &mut nested);
        }
    }

    if !decls.is_empty() && !selectors.is_empty() {
        out.push(CssRule {
            selector: selectors.join(","),
            decls,
        });
    }
    out.append(&mut nested);
}

/// `name = value` variable assignment.
fn split_assignment(line: &str) -> Option<(String, String)> {
    let eq = line.find('=')?;
    // Exclude comparison-ish text and `==`.
    if line.as_bytes().get(eq + 1) == Some(&b'=') {
        return None;
    }
    let name = line[..eq].trim();
    let value = line[eq + 1..].trim();
    if name.is_empty()
        || value.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '$')
    {
        return None;
    }
    Some((name.to_string(), value.to_string()))
}

/// Split a `prop: value` or `prop value` line. Returns `None` for lines
/// that do not look like a declaration.
fn split_property(line: &str) -> Option<(String, String)> {
    if let Some((name, value)) = line.split_once(':') {
        let name = name.trim();
        let value = value.trim();
        if is_property_name(name) && !value.is_empty() {
            return Some((name.to_string(), value.to_string()));
        }
        return None;
    }

    let (name, value) = line.split_once(char::is_whitespace)?;
    let name = name.trim();
    let value = value.trim();
    if is_property_name(name) && !value.is_empty() {
        return Some((name.to_string(), value.to_string()));
    }
    None
}

fn is_property_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Replace variable references by whole token.
fn substitute(value: &str, vars: &HashMap<String, String>) -> String {
    let substituted: Vec<String> = value
        .split_whitespace()
        .map(|token| match vars.get(token) {
            Some(replacement) => replacement.clone(),
            None => token.to_string(),
        })
        .collect();
    substituted.join(" ")
}

fn combine_selectors(parents: &[String], child: &str) -> Vec<String> {
    let children: Vec<&str> = child.split(',').map(str::trim).collect();
    if parents.is_empty() {
        return children.iter().map(|c| c.to_string()).collect();
    }

    let mut combined = Vec::new();
    for parent in parents {
        for c in &children {
            if c.contains('&') {
                combined.push(c.replace('&', parent));
            } else {
                combined.push(format!("{parent} {c}"));
            }
        }
    }
    combined
}
