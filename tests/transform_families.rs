mod common;

use std::fs;
use std::path::Path;

use minifyd::transform::{self, SourceFamily, script};

#[test]
fn javascript_is_minified_and_deterministic() {
    common::init_tracing();
    let source = r#"
// top-of-file comment
function add(first, second) {
    /* block comment */
    return first + second;
}
const answer = add(40, 2);
"#;

    let first = transform::transform(SourceFamily::JavaScript, source, Path::new("calc.js"))
        .unwrap();
    let text = String::from_utf8(first.bytes.clone()).unwrap();

    assert!(text.len() < source.len());
    assert!(!text.contains("top-of-file"));
    assert!(!text.contains("block comment"));
    assert!(text.contains("add"));

    let second = transform::transform(SourceFamily::JavaScript, source, Path::new("calc.js"))
        .unwrap();
    assert_eq!(first.bytes, second.bytes);
}

#[test]
fn typescript_annotations_are_stripped() {
    common::init_tracing();
    let source = r#"
interface User {
    name: string;
    age?: number;
}

function greet(user: User, loud?: boolean): string {
    return "Hello, " + user.name;
}

const count: number = greet.length;
const anything = count as unknown;
"#;

    let result =
        transform::transform(SourceFamily::TypeScript, source, Path::new("greet.ts")).unwrap();
    let text = String::from_utf8(result.bytes).unwrap();

    assert!(!text.contains("interface"));
    assert!(!text.contains(": string"));
    assert!(!text.contains(": number"));
    assert!(!text.contains("as unknown"));
    assert!(text.contains("greet"));
    assert!(text.contains("Hello"));

    // Script families always emit a .min.js sibling.
    assert_eq!(result.output_path, Path::new("greet.min.js"));
}

#[test]
fn class_field_initializers_pass_through_untouched() {
    common::init_tracing();
    // Ternaries and optional chaining in initializer expressions must not
    // be mistaken for member `?`/`:` type syntax.
    let source = "class Toggle {\n\
                  \x20   state = flag ? 1 : 2;\n\
                  \x20   label = window?.name;\n\
                  }\n";
    let stripped = script::strip_types(source).unwrap();
    assert!(stripped.contains("flag ? 1 : 2"), "got {stripped}");
    assert!(stripped.contains("window?.name"), "got {stripped}");
}

#[test]
fn object_literal_methods_lose_their_annotations() {
    common::init_tracing();
    let source = "const calc = {\n\
                  \x20   add(a: number, b: number): number {\n\
                  \x20       return a + b;\n\
                  \x20   },\n\
                  };\n";
    let stripped = script::strip_types(source).unwrap();
    assert!(!stripped.contains("number"), "got {stripped}");
    assert!(stripped.contains("add(a, b)"), "got {stripped}");
}

#[test]
fn class_member_declarations_are_still_stripped() {
    common::init_tracing();
    let source = "class Person {\n\
                  \x20   private name: string;\n\
                  \x20   age?: number;\n\
                  \x20   greet(loud?: boolean): string {\n\
                  \x20       return this.name;\n\
                  \x20   }\n\
                  }\n";
    let stripped = script::strip_types(source).unwrap();
    assert!(!stripped.contains("private"), "got {stripped}");
    assert!(!stripped.contains(": string"), "got {stripped}");
    assert!(!stripped.contains(": number"), "got {stripped}");
    assert!(!stripped.contains('?'), "got {stripped}");
    assert!(stripped.contains("this.name"));
}

#[test]
fn typescript_enums_are_rejected() {
    let source = "enum Color { Red, Green }\n";
    let err = transform::transform(SourceFamily::TypeScript, source, Path::new("color.ts"))
        .unwrap_err();
    assert!(err.to_string().starts_with("Error processing TypeScript"));
}

#[test]
fn scss_nesting_compiles_compressed() {
    common::init_tracing();
    let source = ".a { .b { color: red; } }";
    let result =
        transform::transform(SourceFamily::Sass, source, Path::new("style.scss")).unwrap();
    let text = String::from_utf8(result.bytes).unwrap();
    assert!(text.contains(".a .b{color:red}"), "got {text:?}");
    assert_eq!(result.output_path, Path::new("style.css"));
}

#[test]
fn indented_sass_uses_the_indented_syntax() {
    common::init_tracing();
    let source = "$c: red\n.a\n  color: $c\n";
    let result =
        transform::transform(SourceFamily::Sass, source, Path::new("style.sass")).unwrap();
    let text = String::from_utf8(result.bytes).unwrap();
    assert!(text.contains(".a{color:red}"), "got {text:?}");
}

#[test]
fn less_variables_and_nesting_resolve() {
    common::init_tracing();
    let source = r#"
@color: #112233;
.card {
  color: @color;
  .title {
    font-weight: bold;
  }
  &:hover {
    color: white;
  }
}
"#;

    let result =
        transform::transform(SourceFamily::Less, source, Path::new("card.less")).unwrap();
    let text = String::from_utf8(result.bytes).unwrap();

    assert!(text.contains(".card {\n  color: #112233;\n}"), "got {text}");
    assert!(text.contains(".card .title {\n  font-weight: bold;\n}"));
    assert!(text.contains(".card:hover {\n  color: white;\n}"));
}

#[test]
fn less_mixins_expand_in_place() {
    common::init_tracing();
    let source = r#"
.bordered(@width: 1px) {
  border: @width solid black;
}
.box {
  .bordered();
}
.thick {
  .bordered(3px);
}
"#;

    let result =
        transform::transform(SourceFamily::Less, source, Path::new("box.less")).unwrap();
    let text = String::from_utf8(result.bytes).unwrap();

    assert!(text.contains(".box {\n  border: 1px solid black;\n}"), "got {text}");
    assert!(text.contains(".thick {\n  border: 3px solid black;\n}"));
}

#[test]
fn less_imports_resolve_relative_to_the_source() {
    common::init_tracing();
    let dir = common::visible_tempdir();
    fs::write(dir.path().join("vars.less"), "@brand: #00ff00;\n").unwrap();
    let main = dir.path().join("main.less");
    let source = "@import \"vars\";\n.logo { color: @brand; }\n";

    let result = transform::transform(SourceFamily::Less, source, &main).unwrap();
    let text = String::from_utf8(result.bytes).unwrap();
    assert!(text.contains(".logo {\n  color: #00ff00;\n}"), "got {text}");
}

#[test]
fn less_missing_import_is_a_transform_error() {
    let dir = common::visible_tempdir();
    let main = dir.path().join("main.less");
    let err = transform::transform(SourceFamily::Less, "@import \"nope\";\n", &main)
        .unwrap_err();
    assert!(err.to_string().starts_with("Error processing LESS"));
}

#[test]
fn stylus_indentation_compiles_compressed() {
    common::init_tracing();
    let source = "accent = #222\nbody\n  color accent\n  a\n    color: red\n";
    let result =
        transform::transform(SourceFamily::Stylus, source, Path::new("site.styl")).unwrap();
    let text = String::from_utf8(result.bytes).unwrap();
    assert_eq!(text, "body{color:#222}body a{color:red}");
}

#[test]
fn stylus_parent_references_and_comments() {
    common::init_tracing();
    let source = "// line comment\n.btn\n  color blue\n  &:hover\n    color navy\n";
    let result =
        transform::transform(SourceFamily::Stylus, source, Path::new("btn.styl")).unwrap();
    let text = String::from_utf8(result.bytes).unwrap();
    assert_eq!(text, ".btn{color:blue}.btn:hover{color:navy}");
}
