// src/transform/script.rs

//! Script transforms: JavaScript minification and TypeScript stripping.
//!
//! JavaScript goes straight through the `minifier` crate, which removes
//! comments and collapses whitespace without touching program semantics.
//!
//! TypeScript is lowered by erasing type syntax and then minifying the
//! result as JavaScript. The eraser is token-based, not a full parser: it
//! handles the erasable surface (annotations, interfaces, type aliases,
//! generics on declarations, access modifiers, `as` casts, non-null `!`).
//! Constructs that require real code generation (enums, namespaces) are
//! rejected as per-file transform errors rather than silently broken.

use crate::errors::{MinifydError, Result};

/// Minify JavaScript source: comments stripped, whitespace collapsed.
pub fn minify_javascript(source: &str) -> Result<String> {
    Ok(minifier::js::minify(source).to_string())
}

/// Transpile TypeScript to minified JavaScript.
pub fn transpile_typescript(source: &str) -> Result<String> {
    let stripped = strip_types(source)?;
    minify_javascript(&stripped)
}

const FAMILY: &str = "TypeScript";

fn ts_err(message: impl Into<String>) -> MinifydError {
    MinifydError::transform(FAMILY, message)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokKind {
    Ident,
    Num,
    Str,
    Template,
    Regex,
    Punct,
}

#[derive(Debug, Clone, Copy)]
struct Tok {
    kind: TokKind,
    start: usize,
    end: usize,
}

/// Keywords after which a `/` starts a regex literal and after which a `!`
/// is a unary operator rather than a non-null assertion.
const EXPR_KEYWORDS: [&str; 14] = [
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "case", "do", "else",
    "yield", "await", "throw",
];

const PARAM_MODIFIERS: [&str; 5] = ["public", "private", "protected", "readonly", "override"];

const MEMBER_MODIFIERS: [&str; 6] = [
    "public", "private", "protected", "readonly", "abstract", "override",
];

const TYPE_PREFIX_KEYWORDS: [&str; 4] = ["keyof", "typeof", "readonly", "infer"];

/// Keywords that take a parenthesized head followed by a block; a `(` after
/// one of these is never a parameter list.
const STATEMENT_KEYWORDS: [&str; 6] = ["if", "for", "while", "switch", "catch", "with"];

/// Erase TypeScript-only syntax from `source`, returning plain JavaScript.
pub fn strip_types(source: &str) -> Result<String> {
    let mut removals: Vec<(usize, usize)> = Vec::new();
    let toks = lex(source, &mut removals)?;
    let s = Stripper::new(source, &toks)?;
    s.collect_removals(&mut removals)?;
    Ok(apply_removals(source, removals))
}

struct Stripper<'a> {
    src: &'a str,
    toks: &'a [Tok],
    /// Matching bracket index for every `(`, `[`, `{` and their closers.
    pairs: Vec<Option<usize>>,
    /// Whether the innermost enclosing brace of each token is a class body.
    class_ctx: Vec<bool>,
}

impl<'a> Stripper<'a> {
    fn new(src: &'a str, toks: &'a [Tok]) -> Result<Self> {
        let pairs = match_pairs(src, toks)?;
        let class_ctx = class_contexts(src, toks);
        Ok(Self {
            src,
            toks,
            pairs,
            class_ctx,
        })
    }

    fn text(&self, i: usize) -> &'a str {
        let t = &self.toks[i];
        &self.src[t.start..t.end]
    }

    fn is_punct(&self, i: usize, p: &str) -> bool {
        i < self.toks.len() && self.toks[i].kind == TokKind::Punct && self.text(i) == p
    }

    fn is_ident(&self, i: usize) -> bool {
        i < self.toks.len() && self.toks[i].kind == TokKind::Ident
    }

    fn ident_is(&self, i: usize, word: &str) -> bool {
        self.is_ident(i) && self.text(i) == word
    }

    /// Statement/declaration position: start of file or right after `;`,
    /// `{`, `}`, or an `export`/`declare` modifier.
    fn at_decl_pos(&self, i: usize) -> bool {
        if i == 0 {
            return true;
        }
        let p = i - 1;
        match self.toks[p].kind {
            TokKind::Punct => matches!(self.text(p), ";" | "{" | "}"),
            TokKind::Ident => matches!(self.text(p), "export" | "declare"),
            _ => false,
        }
    }

    /// Member-declaration position inside a class body: right after the
    /// opening brace, a previous member, or a member modifier. Identifiers
    /// reached mid-expression (initializers, method bodies are excluded by
    /// `class_ctx` already) never qualify.
    fn at_member_pos(&self, i: usize) -> bool {
        if i == 0 {
            return false;
        }
        let p = i - 1;
        match self.toks[p].kind {
            TokKind::Punct => matches!(self.text(p), "{" | "}" | ";"),
            TokKind::Ident => {
                MEMBER_MODIFIERS.contains(&self.text(p)) || self.text(p) == "static"
            }
            _ => false,
        }
    }

    /// Skip one type expression starting at `i`, returning the index just
    /// past it. `None` means the shape was not recognised; callers must
    /// then leave the source untouched rather than guess.
    fn skip_type(&self, mut i: usize) -> Option<usize> {
        while self.is_ident(i)
            && TYPE_PREFIX_KEYWORDS.contains(&self.text(i))
            && i + 1 < self.toks.len()
            && !self.is_punct(i + 1, ",")
            && !self.is_punct(i + 1, ")")
        {
            i += 1;
        }

        match self.toks.get(i)?.kind {
            TokKind::Ident => {
                i += 1;
                while self.is_punct(i, ".") && self.is_ident(i + 1) {
                    i += 2;
                }
            }
            TokKind::Num | TokKind::Str | TokKind::Template => i += 1,
            TokKind::Punct => match self.text(i) {
                "{" | "[" => i = self.pairs[i]? + 1,
                "(" => {
                    i = self.pairs[i]? + 1;
                    if self.is_punct(i, "=>") {
                        return self.skip_type(i + 1);
                    }
                }
                "-" if i + 1 < self.toks.len() && self.toks[i + 1].kind == TokKind::Num => i += 2,
                _ => return None,
            },
            TokKind::Regex => return None,
        }

        loop {
            if self.is_punct(i, "<") {
                i = self.skip_angles(i)?;
            } else if self.is_punct(i, "[") {
                if self.is_punct(i + 1, "]") {
                    i += 2;
                } else {
                    i = self.pairs[i]? + 1;
                }
            } else {
                break;
            }
        }

        if self.is_punct(i, "|") || self.is_punct(i, "&") || self.ident_is(i, "extends") {
            return self.skip_type(i + 1);
        }
        Some(i)
    }

    /// Skip a balanced `<...>` group starting at the `<` token.
    fn skip_angles(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut i = open;
        while i < self.toks.len() {
            if self.toks[i].kind == TokKind::Punct {
                match self.text(i) {
                    "<" => depth += 1,
                    ">" => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(i + 1);
                        }
                    }
                    "(" | "[" | "{" => {
                        i = self.pairs[i]?;
                    }
                    ";" => return None,
                    _ => {}
                }
            }
            i += 1;
        }
        None
    }

    /// Decide whether the `(` at `open` opens a parameter list (of a
    /// function, method, or arrow) rather than a grouping/call expression.
    fn is_param_list(&self, open: usize) -> bool {
        let close = match self.pairs[open] {
            Some(c) => c,
            None => return false,
        };

        if open > 0 {
            // Walk back over a generic parameter group if present.
            let mut p = open - 1;
            if self.is_punct(p, ">") {
                let mut depth = 0usize;
                let mut q = p;
                loop {
                    if self.is_punct(q, ">") {
                        depth += 1;
                    } else if self.is_punct(q, "<") {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    if q == 0 {
                        return false;
                    }
                    q -= 1;
                }
                if q == 0 {
                    return false;
                }
                p = q - 1;
            }

            if self.is_ident(p) {
                if self.text(p) == "function" || self.text(p) == "constructor" {
                    return true;
                }
                if p > 0 && self.ident_is(p - 1, "function") {
                    return true;
                }
                // Method heads directly inside a class body.
                if self.class_ctx[p] {
                    if p == 0 {
                        return true;
                    }
                    let q = p - 1;
                    let before = self.text(q);
                    let method_lead = match self.toks[q].kind {
                        TokKind::Punct => matches!(before, "{" | "}" | ";" | "*"),
                        TokKind::Ident => matches!(
                            before,
                            "static"
                                | "get"
                                | "set"
                                | "async"
                                | "public"
                                | "private"
                                | "protected"
                                | "abstract"
                                | "override"
                        ),
                        _ => false,
                    };
                    if method_lead {
                        return true;
                    }
                }
                // Method shorthand (class bodies and object literals):
                // `name(...) {` or `name(...): T {`. A call expression is
                // never directly followed by a block, so a head keyword is
                // the only other reading.
                if !STATEMENT_KEYWORDS.contains(&self.text(p)) {
                    if self.is_punct(close + 1, "{") {
                        return true;
                    }
                    if self.is_punct(close + 1, ":") {
                        if let Some(e) = self.skip_type(close + 2) {
                            if self.is_punct(e, "{") {
                                return true;
                            }
                        }
                    }
                }
            }
        }

        // Arrow parameter lists: `(...) =>` or `(...): T =>`.
        if self.is_punct(close + 1, "=>") {
            return true;
        }
        if self.is_punct(close + 1, ":") {
            if let Some(e) = self.skip_type(close + 2) {
                if self.is_punct(e, "=>") {
                    return true;
                }
            }
        }
        false
    }

    fn collect_removals(&self, out: &mut Vec<(usize, usize)>) -> Result<()> {
        let n = self.toks.len();
        let mut cut = |a: usize, b: usize, out: &mut Vec<(usize, usize)>| {
            out.push((self.toks[a].start, self.toks[b].end));
        };

        let mut stmt_is_import = false;
        let mut i = 0usize;
        while i < n {
            if self.at_decl_pos(i) {
                stmt_is_import = self.ident_is(i, "import") || self.ident_is(i, "export");
            }
            if self.is_punct(i, ";") {
                stmt_is_import = false;
            }

            if self.is_ident(i) {
                match self.text(i) {
                    "interface" if self.at_decl_pos(i) && self.is_ident(i + 1) => {
                        if let Some(end) = self.interface_end(i) {
                            let from = if i > 0 && self.ident_is(i - 1, "export") {
                                i - 1
                            } else {
                                i
                            };
                            cut(from, end, out);
                            i = end + 1;
                            continue;
                        }
                    }
                    "type"
                        if self.at_decl_pos(i)
                            && self.is_ident(i + 1)
                            && (self.is_punct(i + 2, "=") || self.is_punct(i + 2, "<")) =>
                    {
                        if let Some(end) = self.type_alias_end(i) {
                            let from = if i > 0 && self.ident_is(i - 1, "export") {
                                i - 1
                            } else {
                                i
                            };
                            cut(from, end, out);
                            i = end + 1;
                            continue;
                        }
                    }
                    "declare" if self.at_decl_pos(i) && self.is_ident(i + 1) => {
                        if let Some(end) = self.statement_end(i + 1) {
                            cut(i, end, out);
                            i = end + 1;
                            continue;
                        }
                    }
                    "enum" if self.is_ident(i + 1) && self.is_punct(i + 2, "{") => {
                        return Err(ts_err("enum declarations are not supported"));
                    }
                    "namespace" | "module"
                        if self.at_decl_pos(i)
                            && self.is_ident(i + 1)
                            && self.is_punct(i + 2, "{") =>
                    {
                        return Err(ts_err("namespace declarations are not supported"));
                    }
                    "abstract" if self.ident_is(i + 1, "class") => {
                        cut(i, i, out);
                        i += 1;
                        continue;
                    }
                    "implements" => {
                        if let Some(end) = self.until_brace(i + 1) {
                            cut(i, end, out);
                            i = end + 1;
                            continue;
                        }
                    }
                    "class" if self.is_ident(i + 1) && self.is_punct(i + 2, "<") => {
                        if let Some(end) = self.skip_angles(i + 2) {
                            cut(i + 2, end - 1, out);
                            i = end;
                            continue;
                        }
                    }
                    "function" => {
                        let g = if self.is_ident(i + 1) { i + 2 } else { i + 1 };
                        if self.is_punct(g, "<") {
                            if let Some(end) = self.skip_angles(g) {
                                cut(g, end - 1, out);
                                i = end;
                                continue;
                            }
                        }
                    }
                    "import" if self.at_decl_pos(i) && self.ident_is(i + 1, "type") => {
                        if let Some(end) = self.import_statement_end(i) {
                            cut(i, end, out);
                            i = end + 1;
                            continue;
                        }
                    }
                    "export"
                        if self.at_decl_pos(i)
                            && self.ident_is(i + 1, "type")
                            && self.is_punct(i + 2, "{") =>
                    {
                        if let Some(end) = self.import_statement_end(i) {
                            cut(i, end, out);
                            i = end + 1;
                            continue;
                        }
                    }
                    "as" | "satisfies" if !stmt_is_import && i > 0 => {
                        let castable = match self.toks[i - 1].kind {
                            TokKind::Ident => !EXPR_KEYWORDS.contains(&self.text(i - 1)),
                            TokKind::Num | TokKind::Str | TokKind::Template => true,
                            TokKind::Punct => matches!(self.text(i - 1), ")" | "]"),
                            TokKind::Regex => false,
                        };
                        if castable {
                            if let Some(e) = self.skip_type(i + 1) {
                                cut(i, e - 1, out);
                                i = e;
                                continue;
                            }
                        }
                    }
                    "let" | "const" | "var" if !(i > 0 && self.is_punct(i - 1, ".")) => {
                        self.strip_declarators(i + 1, out);
                    }
                    _ => {}
                }

                // Class member modifiers and typed fields, only in member
                // declaration position so initializer expressions (ternary
                // `?`, optional chaining, labels) pass through untouched.
                if self.class_ctx[i] && self.at_member_pos(i) {
                    if MEMBER_MODIFIERS.contains(&self.text(i))
                        && (self.is_ident(i + 1) || self.is_punct(i + 1, "["))
                    {
                        cut(i, i, out);
                        i += 1;
                        continue;
                    }
                    if !self.is_punct(i + 1, "(") && !self.is_punct(i + 1, "<") {
                        let mut j = i + 1;
                        if self.is_punct(j, "?") || self.is_punct(j, "!") {
                            cut(j, j, out);
                            j += 1;
                        }
                        if self.is_punct(j, ":") {
                            if let Some(e) = self.skip_type(j + 1) {
                                cut(j, e - 1, out);
                                i = e;
                                continue;
                            }
                        }
                        if j > i + 1 {
                            i = j;
                            continue;
                        }
                    }
                }
            }

            if self.is_punct(i, "(") && self.is_param_list(i) {
                self.strip_param_list(i, out);
            }

            // Non-null assertions: `expr!` where `!` is clearly postfix.
            if self.is_punct(i, "!") && i > 0 && !self.is_punct(i + 1, "=") {
                let postfix = match self.toks[i - 1].kind {
                    TokKind::Ident => !EXPR_KEYWORDS.contains(&self.text(i - 1)),
                    TokKind::Punct => matches!(self.text(i - 1), ")" | "]"),
                    _ => false,
                };
                if postfix {
                    cut(i, i, out);
                }
            }

            i += 1;
        }

        Ok(())
    }

    /// Strip `!` markers and `: T` annotations from a declarator list
    /// beginning right after `let`/`const`/`var`.
    fn strip_declarators(&self, start: usize, out: &mut Vec<(usize, usize)>) {
        let mut j = start;
        loop {
            if self.is_punct(j, "{") || self.is_punct(j, "[") {
                match self.pairs[j] {
                    Some(close) => j = close + 1,
                    None => return,
                }
            } else if self.is_ident(j) {
                j += 1;
                if self.is_punct(j, "!") {
                    out.push((self.toks[j].start, self.toks[j].end));
                    j += 1;
                }
            } else {
                return;
            }

            if self.is_punct(j, ":") {
                match self.skip_type(j + 1) {
                    Some(e) => {
                        out.push((self.toks[j].start, self.toks[e - 1].end));
                        j = e;
                    }
                    None => return,
                }
            }

            // Only chase further declarators when the next declarator
            // follows immediately; initializers end the sweep.
            if self.is_punct(j, ",") {
                j += 1;
            } else {
                return;
            }
        }
    }

    /// Strip modifiers, `?` markers, annotations, and the return type of a
    /// parameter list whose `(` sits at `open`.
    fn strip_param_list(&self, open: usize, out: &mut Vec<(usize, usize)>) {
        let Some(close) = self.pairs[open] else {
            return;
        };

        let mut k = open + 1;
        while k < close {
            if self.is_punct(k, "(") || self.is_punct(k, "[") || self.is_punct(k, "{") {
                match self.pairs[k] {
                    Some(c) => {
                        k = c + 1;
                        continue;
                    }
                    None => return,
                }
            }
            if self.is_ident(k)
                && PARAM_MODIFIERS.contains(&self.text(k))
                && (self.is_ident(k + 1) || self.is_punct(k + 1, "."))
            {
                out.push((self.toks[k].start, self.toks[k].end));
                k += 1;
                continue;
            }
            if self.is_punct(k, "?")
                && k > open
                && self.is_ident(k - 1)
                && (self.is_punct(k + 1, ":") || self.is_punct(k + 1, ",") || k + 1 == close)
            {
                out.push((self.toks[k].start, self.toks[k].end));
                k += 1;
                continue;
            }
            if self.is_punct(k, ":") {
                match self.skip_type(k + 1) {
                    Some(e) => {
                        out.push((self.toks[k].start, self.toks[e - 1].end));
                        k = e;
                        continue;
                    }
                    None => return,
                }
            }
            k += 1;
        }

        // Return type annotation after the closing paren.
        let r = close + 1;
        if self.is_punct(r, ":") {
            if let Some(e) = self.skip_type(r + 1) {
                let terminated = self.is_punct(e, "{")
                    || self.is_punct(e, "=>")
                    || self.is_punct(e, ";")
                    || self.is_punct(e, ",")
                    || e == self.toks.len();
                if terminated {
                    out.push((self.toks[r].start, self.toks[e - 1].end));
                }
            }
        }
    }

    /// End token (inclusive) of an `interface` declaration starting at `i`.
    fn interface_end(&self, i: usize) -> Option<usize> {
        let mut j = i + 2;
        if self.is_punct(j, "<") {
            j = self.skip_angles(j)?;
        }
        while j < self.toks.len() && !self.is_punct(j, "{") {
            if self.is_punct(j, ";") {
                return None;
            }
            j += 1;
        }
        self.pairs.get(j).copied().flatten()
    }

    /// End token (inclusive) of a `type X = ...` alias starting at `i`.
    fn type_alias_end(&self, i: usize) -> Option<usize> {
        let mut j = i + 2;
        if self.is_punct(j, "<") {
            j = self.skip_angles(j)?;
        }
        if !self.is_punct(j, "=") {
            return None;
        }
        let e = self.skip_type(j + 1)?;
        if self.is_punct(e, ";") {
            Some(e)
        } else {
            Some(e - 1)
        }
    }

    /// End token (inclusive) of the statement starting at `i`: the first
    /// top-level `;`, or the close of the first top-level `{...}` block.
    fn statement_end(&self, i: usize) -> Option<usize> {
        let mut j = i;
        while j < self.toks.len() {
            if self.is_punct(j, ";") {
                return Some(j);
            }
            if self.is_punct(j, "{") {
                return self.pairs[j];
            }
            if self.is_punct(j, "(") || self.is_punct(j, "[") {
                j = self.pairs[j]? + 1;
                continue;
            }
            j += 1;
        }
        None
    }

    /// End token (inclusive) of an import/export statement starting at
    /// `i`: the first `;`, or the module string after `from` when the
    /// semicolon was omitted.
    fn import_statement_end(&self, i: usize) -> Option<usize> {
        let mut j = i;
        while j < self.toks.len() {
            if self.is_punct(j, ";") {
                return Some(j);
            }
            if j > i && self.ident_is(j - 1, "from") && self.toks[j].kind == TokKind::Str {
                // No semicolon: the module string ends the statement,
                // unless one follows immediately.
                return if self.is_punct(j + 1, ";") {
                    Some(j + 1)
                } else {
                    Some(j)
                };
            }
            j += 1;
        }
        None
    }

    /// Last token (inclusive) before the next top-level `{`.
    fn until_brace(&self, from: usize) -> Option<usize> {
        let mut j = from;
        while j < self.toks.len() {
            if self.is_punct(j, "{") {
                return if j > from { Some(j - 1) } else { None };
            }
            if self.is_punct(j, ";") || self.is_punct(j, "}") {
                return None;
            }
            j += 1;
        }
        None
    }
}

/// Compute matching-bracket indices for `(`, `[`, `{` tokens (both ways).
fn match_pairs(src: &str, toks: &[Tok]) -> Result<Vec<Option<usize>>> {
    let mut pairs = vec![None; toks.len()];
    let mut stack: Vec<(usize, &str)> = Vec::new();
    for (i, t) in toks.iter().enumerate() {
        if t.kind != TokKind::Punct {
            continue;
        }
        match &src[t.start..t.end] {
            open @ ("(" | "[" | "{") => stack.push((i, open)),
            ")" | "]" | "}" => {
                if let Some((j, _)) = stack.pop() {
                    pairs[i] = Some(j);
                    pairs[j] = Some(i);
                }
            }
            _ => {}
        }
    }
    Ok(pairs)
}

/// For each token, whether its innermost enclosing brace is a class body.
fn class_contexts(src: &str, toks: &[Tok]) -> Vec<bool> {
    let mut ctx = vec![false; toks.len()];
    let mut stack: Vec<bool> = Vec::new();
    let mut pending_class = false;

    for (i, t) in toks.iter().enumerate() {
        ctx[i] = *stack.last().unwrap_or(&false);
        let text = &src[t.start..t.end];
        match t.kind {
            TokKind::Ident if text == "class" => {
                let after_dot = i > 0
                    && toks[i - 1].kind == TokKind::Punct
                    && &src[toks[i - 1].start..toks[i - 1].end] == ".";
                if !after_dot {
                    pending_class = true;
                }
            }
            TokKind::Punct => match text {
                "{" => {
                    stack.push(pending_class);
                    pending_class = false;
                }
                "}" => {
                    stack.pop();
                }
                ";" => pending_class = false,
                _ => {}
            },
            _ => {}
        }
    }
    ctx
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

/// Tokenize `src`. Comment byte ranges are appended to `removals` so the
/// rebuild drops them.
fn lex(src: &str, removals: &mut Vec<(usize, usize)>) -> Result<Vec<Tok>> {
    let bytes = src.as_bytes();
    let len = bytes.len();
    let mut toks: Vec<Tok> = Vec::new();
    let mut i = 0usize;

    while i < len {
        let b = bytes[i];
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'/' if i + 1 < len && bytes[i + 1] == b'/' => {
                let start = i;
                while i < len && bytes[i] != b'\n' {
                    i += 1;
                }
                removals.push((start, i));
            }
            b'/' if i + 1 < len && bytes[i + 1] == b'*' => {
                let start = i;
                i += 2;
                while i + 1 < len && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                if i + 1 >= len {
                    return Err(ts_err("unterminated block comment"));
                }
                i += 2;
                removals.push((start, i));
            }
            b'/' if regex_allowed(src, &toks) => {
                let start = i;
                i += 1;
                let mut in_class = false;
                loop {
                    if i >= len || bytes[i] == b'\n' {
                        return Err(ts_err("unterminated regular expression literal"));
                    }
                    match bytes[i] {
                        b'\\' => i += 2,
                        b'[' => {
                            in_class = true;
                            i += 1;
                        }
                        b']' => {
                            in_class = false;
                            i += 1;
                        }
                        b'/' if !in_class => {
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
                while i < len && is_ident_continue(bytes[i]) {
                    i += 1;
                }
                toks.push(Tok {
                    kind: TokKind::Regex,
                    start,
                    end: i,
                });
            }
            b'"' | b'\'' => {
                let start = i;
                i = scan_string(src, i)?;
                toks.push(Tok {
                    kind: TokKind::Str,
                    start,
                    end: i,
                });
            }
            b'`' => {
                let start = i;
                i = scan_template(src, i)?;
                toks.push(Tok {
                    kind: TokKind::Template,
                    start,
                    end: i,
                });
            }
            b'0'..=b'9' => {
                let start = i;
                i += 1;
                while i < len {
                    let c = bytes[i];
                    let exp_sign = (c == b'+' || c == b'-')
                        && matches!(bytes[i - 1], b'e' | b'E');
                    if c.is_ascii_alphanumeric() || c == b'.' || c == b'_' || exp_sign {
                        i += 1;
                    } else {
                        break;
                    }
                }
                toks.push(Tok {
                    kind: TokKind::Num,
                    start,
                    end: i,
                });
            }
            b if is_ident_start(b) => {
                let start = i;
                while i < len && is_ident_continue(bytes[i]) {
                    i += 1;
                }
                toks.push(Tok {
                    kind: TokKind::Ident,
                    start,
                    end: i,
                });
            }
            b'=' if i + 1 < len && bytes[i + 1] == b'>' => {
                toks.push(Tok {
                    kind: TokKind::Punct,
                    start: i,
                    end: i + 2,
                });
                i += 2;
            }
            _ => {
                toks.push(Tok {
                    kind: TokKind::Punct,
                    start: i,
                    end: i + 1,
                });
                i += 1;
            }
        }
    }

    Ok(toks)
}

/// Whether a `/` at the current position starts a regex literal.
fn regex_allowed(src: &str, toks: &[Tok]) -> bool {
    let Some(last) = toks.last() else {
        return true;
    };
    let text = &src[last.start..last.end];
    match last.kind {
        TokKind::Ident => EXPR_KEYWORDS.contains(&text),
        TokKind::Num | TokKind::Str | TokKind::Template | TokKind::Regex => false,
        TokKind::Punct => !matches!(text, ")" | "]"),
    }
}

/// Scan a quoted string starting at `from`; returns the index past the
/// closing quote.
fn scan_string(src: &str, from: usize) -> Result<usize> {
    let bytes = src.as_bytes();
    let quote = bytes[from];
    let mut i = from + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => break,
            b if b == quote => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(ts_err("unterminated string literal"))
}

/// Scan a template literal starting at the backtick at `from`; handles
/// `${...}` interpolation including nested strings and templates.
fn scan_template(src: &str, from: usize) -> Result<usize> {
    let bytes = src.as_bytes();
    let mut i = from + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => return Ok(i + 1),
            b'$' if i + 1 < bytes.len() && bytes[i + 1] == b'{' => {
                i += 2;
                let mut depth = 1usize;
                while i < bytes.len() && depth > 0 {
                    match bytes[i] {
                        b'{' => {
                            depth += 1;
                            i += 1;
                        }
                        b'}' => {
                            depth -= 1;
                            i += 1;
                        }
                        b'"' | b'\'' => i = scan_string(src, i)?,
                        b'`' => i = scan_template(src, i)?,
                        b'\\' => i += 2,
                        _ => i += 1,
                    }
                }
            }
            _ => i += 1,
        }
    }
    Err(ts_err("unterminated template literal"))
}

/// Rebuild the source with all byte ranges in `removals` dropped.
fn apply_removals(src: &str, mut removals: Vec<(usize, usize)>) -> String {
    removals.sort_unstable();
    let mut out = String::with_capacity(src.len());
    let mut cursor = 0usize;
    for (start, end) in removals {
        if start >= cursor {
            out.push_str(&src[cursor..start]);
            cursor = end;
        } else if end > cursor {
            cursor = end;
        }
    }
    out.push_str(&src[cursor..]);
    out
}
