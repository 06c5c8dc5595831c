// src/transform/less.rs

//! LESS resolution: `@import` inlining, variables, nesting, and simple
//! mixins, emitting plain expanded CSS.
//!
//! There is no maintained LESS compiler crate, so this module carries its
//! own resolver for the language subset the pipeline contract needs:
//!
//! - `@import "file";` relative to the source file (`.less` implied)
//! - `@name: value;` variables with lazy lookup, `@{name}` interpolation
//! - nested rules with `&` parent references and comma selector lists
//! - parameterless mixins (any simple `.class`/`#id` rule) and
//!   parameterized mixins with default arguments
//!
//! Anything outside the subset passes through untouched as a declaration.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::errors::{MinifydError, Result};

const FAMILY: &str = "LESS";
const MAX_IMPORT_DEPTH: usize = 8;
const MAX_SUBST_DEPTH: usize = 16;

fn less_err(message: impl Into<String>) -> MinifydError {
    MinifydError::transform(FAMILY, message)
}

/// Resolve LESS source to plain CSS. `source_path` anchors relative
/// imports.
pub fn compile_less(source: &str, source_path: &Path) -> Result<String> {
    let dir = source_path.parent().unwrap_or_else(|| Path::new("."));
    let inlined = inline_imports(source, dir, 0)?;
    let cleaned = strip_comments(&inlined);

    let block = Parser::new(&cleaned).parse_block(true)?;

    let mut scope: Vec<HashMap<String, String>> = Vec::new();
    let mut mixins: Vec<HashMap<String, MixinDef>> = Vec::new();
    let mut rules = Vec::new();
    eval_block(&block, &[], &mut scope, &mut mixins, &mut rules)?;

    let mut out = String::new();
    for rule in rules {
        out.push_str(&rule.selector);
        out.push_str(" {\n");
        for (name, value) in rule.decls {
            out.push_str("  ");
            out.push_str(&name);
            out.push_str(": ");
            out.push_str(&value);
            out.push_str(";\n");
        }
        out.push_str("}\n");
    }
    Ok(out)
}

#[derive(Debug, Clone)]
enum Item {
    Variable(String, String),
    Declaration(String, String),
    Rule(String, Block),
    MixinDef(String, MixinDef),
    MixinCall(String, Vec<String>),
}

#[derive(Debug, Clone, Default)]
struct Block {
    items: Vec<Item>,
}

#[derive(Debug, Clone)]
struct MixinDef {
    params: Vec<(String, Option<String>)>,
    body: Block,
}

#[derive(Debug)]
struct CssRule {
    selector: String,
    decls: Vec<(String, String)>,
}

/// Inline `@import` statements recursively.
fn inline_imports(source: &str, dir: &Path, depth: usize) -> Result<String> {
    if depth > MAX_IMPORT_DEPTH {
        return Err(less_err("@import nesting too deep (possible import cycle)"));
    }

    let mut out = String::with_capacity(source.len());
    for line in source.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("@import") {
            let name = rest
                .trim()
                .trim_end_matches(';')
                .trim()
                .trim_matches(|c| c == '"' || c == '\'');
            let mut file = dir.join(name);
            if file.extension().is_none() {
                file.set_extension("less");
            }
            let imported = fs::read_to_string(&file)
                .map_err(|err| less_err(format!("cannot import {}: {err}", file.display())))?;
            let nested_dir = file.parent().unwrap_or(dir).to_path_buf();
            out.push_str(&inline_imports(&imported, &nested_dir, depth + 1)?);
            out.push('\n');
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }
    Ok(out)
}

/// Remove `//` and `/* */` comments, preserving quoted strings.
fn strip_comments(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut keep_from = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                i = (i + 1).min(bytes.len());
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                out.push_str(&source[keep_from..i]);
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                keep_from = i;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                out.push_str(&source[keep_from..i]);
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
                keep_from = i;
            }
            _ => i += 1,
        }
    }
    out.push_str(&source[keep_from..]);
    out
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
        }
    }

    /// Parse items until `}` (or end of input when `top_level`).
    fn parse_block(&mut self, top_level: bool) -> Result<Block> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.pos >= self.src.len() {
                if top_level {
                    return Ok(Block { items });
                }
                return Err(less_err("unexpected end of input (missing '}')"));
            }
            if self.src[self.pos] == b'}' {
                if top_level {
                    return Err(less_err("unexpected '}'"));
                }
                self.pos += 1;
                return Ok(Block { items });
            }

            let (chunk, delim) = self.read_chunk()?;
            match delim {
                b'{' => {
                    let body = self.parse_block(false)?;
                    items.push(classify_rule(chunk.trim(), body));
                }
                b';' => {
                    if let Some(item) = classify_statement(chunk.trim()) {
                        items.push(item);
                    }
                }
                0 => {
                    // Trailing statement without semicolon.
                    if let Some(item) = classify_statement(chunk.trim()) {
                        items.push(item);
                    }
                }
                other => {
                    return Err(less_err(format!("unexpected delimiter '{}'", other as char)));
                }
            }
        }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    /// Read raw text until a top-level `{`, `;`, or `}` (not consumed for
    /// `}`). Parens, brackets, and quotes nest.
    fn read_chunk(&mut self) -> Result<(String, u8)> {
        let start = self.pos;
        let mut depth = 0usize;
        while self.pos < self.src.len() {
            let b = self.src[self.pos];
            match b {
                b'(' | b'[' => {
                    depth += 1;
                    self.pos += 1;
                }
                b')' | b']' => {
                    depth = depth.saturating_sub(1);
                    self.pos += 1;
                }
                b'"' | b'\'' => {
                    self.pos += 1;
                    while self.pos < self.src.len() && self.src[self.pos] != b {
                        self.pos += 1;
                    }
                    self.pos += 1;
                }
                b'{' | b';' if depth == 0 => {
                    let text = text_of(&self.src[start..self.pos]);
                    self.pos += 1;
                    return Ok((text, b));
                }
                b'}' if depth == 0 => {
                    return Ok((text_of(&self.src[start..self.pos]), 0));
                }
                _ => self.pos += 1,
            }
        }
        Ok((text_of(&self.src[start..]), 0))
    }
}

fn text_of(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// A braced construct: a parameterized mixin definition or a nested rule.
fn classify_rule(header: &str, body: Block) -> Item {
    if (header.starts_with('.') || header.starts_with('#')) && header.contains('(') {
        if let Some(open) = header.find('(') {
            let name = header[..open].trim().to_string();
            let args = header[open + 1..].trim_end_matches(')');
            if is_simple_mixin_name(&name) {
                let params = args
                    .split([',', ';'])
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(|p| match p.split_once(':') {
                        Some((n, d)) => (n.trim().to_string(), Some(d.trim().to_string())),
                        None => (p.to_string(), None),
                    })
                    .collect();
                return Item::MixinDef(name, MixinDef { params, body });
            }
        }
    }
    Item::Rule(header.to_string(), body)
}

/// A semicolon-terminated statement: variable, mixin call, or declaration.
fn classify_statement(stmt: &str) -> Option<Item> {
    if stmt.is_empty() {
        return None;
    }

    if let Some(rest) = stmt.strip_prefix('@') {
        if let Some((name, value)) = rest.split_once(':') {
            return Some(Item::Variable(
                name.trim().to_string(),
                value.trim().to_string(),
            ));
        }
    }

    if stmt.starts_with('.') || stmt.starts_with('#') {
        let (name, args) = match stmt.find('(') {
            Some(open) => {
                let args = stmt[open + 1..]
                    .trim_end()
                    .trim_end_matches("!important")
                    .trim_end()
                    .trim_end_matches(')');
                (stmt[..open].trim(), args)
            }
            None => (stmt.trim_end_matches("!important").trim(), ""),
        };
        if is_simple_mixin_name(name) {
            let args = args
                .split([',', ';'])
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect();
            return Some(Item::MixinCall(name.to_string(), args));
        }
    }

    if let Some((name, value)) = stmt.split_once(':') {
        return Some(Item::Declaration(
            name.trim().to_string(),
            value.trim().to_string(),
        ));
    }
    None
}

fn is_simple_mixin_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some('.') | Some('#'))
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        && name.len() > 1
}

fn eval_block(
    block: &Block,
    selectors: &[String],
    scope: &mut Vec<HashMap<String, String>>,
    mixins: &mut Vec<HashMap<String, MixinDef>>,
    out: &mut Vec<CssRule>,
) -> Result<()> {
    scope.push(collect_vars(block));
    mixins.push(collect_mixins(block));

    let mut decls = Vec::new();
    let mut nested = Vec::new();
    eval_items(&block.items, selectors, scope, mixins, &mut decls, &mut nested)?;

    if !decls.is_empty() && !selectors.is_empty() {
        out.push(CssRule {
            selector: selectors.join(", "),
            decls,
        });
    }
    out.extend(nested);

    scope.pop();
    mixins.pop();
    Ok(())
}

fn collect_vars(block: &Block) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for item in &block.items {
        if let Item::Variable(name, value) = item {
            vars.insert(name.clone(), value.clone());
        }
    }
    vars
}

fn collect_mixins(block: &Block) -> HashMap<String, MixinDef> {
    let mut defs = HashMap::new();
    for item in &block.items {
        match item {
            Item::MixinDef(name, def) => {
                defs.insert(name.clone(), def.clone());
            }
            // Any plain `.class` / `#id` rule doubles as a parameterless
            // mixin.
            Item::Rule(selector, body) if is_simple_mixin_name(selector) => {
                defs.insert(
                    selector.clone(),
                    MixinDef {
                        params: Vec::new(),
                        body: body.clone(),
                    },
                );
            }
            _ => {}
        }
    }
    defs
}

fn eval_items(
    items: &[Item],
    selectors: &[String],
    scope: &mut Vec<HashMap<String, String>>,
    mixins: &mut Vec<HashMap<String, MixinDef>>,
    decls: &mut Vec<(String, String)>,
    nested: &mut Vec<CssRule>,
) -> Result<()> {
    for item in items {
        match item {
            Item::Variable(..) | Item::MixinDef(..) => {}
            Item::Declaration(name, value) => {
                decls.push((name.clone(), substitute(value, scope, 0)?));
            }
            Item::MixinCall(name, args) => {
                expand_mixin(name, args, selectors, scope, mixins, decls, nested)?;
            }
            Item::Rule(selector, body) => {
                let selector = substitute(selector, scope, 0)?;
                let subsels = combine_selectors(selectors, &selector);
                eval_block(body, &subsels, scope, mixins, nested)?;
            }
        }
    }
    Ok(())
}

fn expand_mixin(
    name: &str,
    args: &[String],
    selectors: &[String],
    scope: &mut Vec<HashMap<String, String>>,
    mixins: &mut Vec<HashMap<String, MixinDef>>,
    decls: &mut Vec<(String, String)>,
    nested: &mut Vec<CssRule>,
) -> Result<()> {
    let def = mixins
        .iter()
        .rev()
        .find_map(|frame| frame.get(name))
        .cloned()
        .ok_or_else(|| less_err(format!("undefined mixin {name}")))?;

    let mut frame = HashMap::new();
    for (idx, (param, default)) in def.params.iter().enumerate() {
        let param = param.trim_start_matches('@').to_string();
        let value = match args.get(idx) {
            Some(arg) => substitute(arg, scope, 0)?,
            None => default.clone().ok_or_else(|| {
                less_err(format!("mixin {name} is missing argument @{param}"))
            })?,
        };
        frame.insert(param, value);
    }
    // Variables declared inside the mixin body land in the same frame.
    for (name, value) in collect_vars(&def.body) {
        frame.entry(name).or_insert(value);
    }

    scope.push(frame);
    mixins.push(collect_mixins(&def.body));
    eval_items(&def.body.items, selectors, scope, mixins, decls, nested)?;
    mixins.pop();
    scope.pop();
    Ok(())
}

/// Replace `@{name}` interpolations and `@name` references. Lookup walks
/// the scope chain inner to outer; values may reference further variables.
fn substitute(input: &str, scope: &[HashMap<String, String>], depth: usize) -> Result<String> {
    if depth > MAX_SUBST_DEPTH {
        return Err(less_err("variable reference cycle"));
    }

    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] != b'@' {
            let next = input[i..].find('@').map_or(input.len(), |o| i + o);
            out.push_str(&input[i..next]);
            i = next;
            continue;
        }
        let (name, end) = if bytes.get(i + 1) == Some(&b'{') {
            let close = input[i + 2..].find('}').map(|c| i + 2 + c);
            match close {
                Some(close) => (&input[i + 2..close], close + 1),
                None => (&input[i + 1..i + 1], i + 1),
            }
        } else {
            let mut j = i + 1;
            while j < bytes.len()
                && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'-' || bytes[j] == b'_')
            {
                j += 1;
            }
            (&input[i + 1..j], j)
        };

        if !name.is_empty() {
            if let Some(value) = lookup(scope, name) {
                out.push_str(&substitute(&value, scope, depth + 1)?);
                i = end;
                continue;
            }
        }
        // Unknown reference (or at-rule keyword): keep literal text.
        out.push('@');
        i += 1;
    }
    Ok(out)
}

fn lookup(scope: &[HashMap<String, String>], name: &str) -> Option<String> {
    scope.iter().rev().find_map(|frame| frame.get(name).cloned())
}

/// Cartesian selector combination with `&` parent references.
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
