//! Renderer contracts over parsed documents: HTML tag mapping, escaping,
//! reference resolution, extension dispatch, and the JSON tree dump.

use penmark::{parse_document, AstRenderer, Context, HtmlRenderer};

fn html(input: &str) -> String {
    let mut context = Context::with_defaults();
    let root = parse_document(input, &mut context).unwrap();
    HtmlRenderer::new(&context).render(&root).unwrap()
}

#[test]
fn header_tags_by_level() {
    assert_eq!(html("# a\n"), "<h1>a</h1>\n");
    assert_eq!(html("### a\n"), "<h3>a</h3>\n");
}

#[test]
fn paragraph_with_inline_markup() {
    assert_eq!(
        html("para *b* `c`\n"),
        "<p>para <strong>b</strong> <code>c</code></p>\n"
    );
}

#[test]
fn subscript_and_superscript() {
    assert_eq!(html("~a~^b^\n"), "<p><sub>a</sub><sup>b</sup></p>\n");
}

#[test]
fn blockquote_wraps_blocks() {
    assert_eq!(html("> a\n"), "<blockquote>\n<p>a</p>\n</blockquote>\n");
}

#[test]
fn unordered_list() {
    assert_eq!(
        html("- a\n- b\n"),
        "<ul>\n<li><p>a</p>\n</li>\n<li><p>b</p>\n</li>\n</ul>\n"
    );
}

#[test]
fn ordered_list_start_attribute() {
    assert_eq!(html("3. x\n"), "<ol start=\"3\">\n<li><p>x</p>\n</li>\n</ol>\n");
    assert_eq!(html("1. x\n"), "<ol>\n<li><p>x</p>\n</li>\n</ol>\n");
}

#[test]
fn soft_break_is_a_newline() {
    assert_eq!(html("a\nb\n"), "<p>a\nb</p>\n");
}

#[test]
fn hard_break_is_br() {
    assert_eq!(html("a\\\nb\n"), "<p>a<br />\nb</p>\n");
}

#[test]
fn text_is_escaped() {
    assert_eq!(html("<script>&\n"), "<p>&lt;script&gt;&amp;</p>\n");
}

#[test]
fn verbatim_content_is_escaped() {
    assert_eq!(html("`<b>`\n"), "<p><code>&lt;b&gt;</code></p>\n");
}

#[test]
fn link_with_destination() {
    assert_eq!(html("[x](y)\n"), "<p><a href=\"y\">x</a></p>\n");
}

#[test]
fn reference_link_resolves_via_definition() {
    assert_eq!(
        html("[r]: https://e.com\nsee [x][r]\n"),
        "<p>see <a href=\"https://e.com\">x</a></p>\n"
    );
}

#[test]
fn unresolved_reference_drops_the_anchor() {
    assert_eq!(html("[x][nope]\n"), "<p>x</p>\n");
}

#[test]
fn span_with_attributes() {
    assert_eq!(html("[x]{.c}\n"), "<p><span class=\"c\">x</span></p>\n");
}

#[test]
fn paragraph_attributes_from_block_list() {
    assert_eq!(html("{.note #n}\ntext\n"), "<p class=\"note\" id=\"n\">text</p>\n");
}

#[test]
fn attribute_values_are_escaped() {
    assert_eq!(
        html("{key=\"a<b\"}\nx\n"),
        "<p key=\"a&lt;b\">x</p>\n"
    );
}

#[test]
fn default_extension_renders_a_classed_div() {
    assert_eq!(
        html("::box:\n  x\n"),
        "<div class=\"box\">\n<p>x</p>\n</div>\n"
    );
}

#[test]
fn raw_extension_replays_lines_verbatim() {
    assert_eq!(html("::raw:\n  <b>hi</b>\n"), "<b>hi</b>\n");
}

#[test]
fn comment_extension_renders_nothing() {
    assert_eq!(html("::comment:\n  secret\nvisible\n"), "<p>visible</p>\n");
}

#[test]
fn inline_extension_renders_a_classed_span() {
    assert_eq!(
        html(":mark:[x]\n"),
        "<p><span class=\"mark\">x</span></p>\n"
    );
}

#[test]
fn ast_dump_includes_types_and_properties() {
    let mut context = Context::with_defaults();
    let root = parse_document("# h\n", &mut context).unwrap();
    let json = AstRenderer::new().render(&root).unwrap();
    assert!(json.contains("\"type\": \"root\""));
    assert!(json.contains("\"type\": \"header\""));
    assert!(json.contains("\"level\": 1"));
    assert!(json.contains("\"content\": \"h\""));
}

#[test]
fn ast_dump_round_trips_through_serde_json_value() {
    let mut context = Context::with_defaults();
    let root = parse_document("- a\n", &mut context).unwrap();
    let json = AstRenderer::new().render(&root).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["type"], "root");
    assert_eq!(value["children"][0]["type"], "list");
}
