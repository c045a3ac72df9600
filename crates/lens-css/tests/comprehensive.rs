//! Style resolution over parsed documents

use lens_css::{Display, StyleResolver, Visibility};
use lens_html::parse;

#[test]
fn test_style_elements_apply() {
    let doc = parse(
        r#"<html><head><style>.gone { display: none } #faded { opacity: 0 }</style></head>
        <body><div class="gone">a</div><div id="faded">b</div><div id="shown">c</div></body></html>"#,
    )
    .unwrap();
    let tree = doc.tree();
    let resolver = StyleResolver::for_tree(tree);

    let gone = tree
        .node_ids()
        .find(|&id| tree.attr(id, "class") == Some("gone"))
        .unwrap();
    let faded = doc.get_element_by_id("faded").unwrap();
    let shown = doc.get_element_by_id("shown").unwrap();

    assert!(!resolver.is_rendered(tree, gone));
    assert!(!resolver.is_rendered(tree, faded));
    assert!(resolver.is_rendered(tree, shown));
}

#[test]
fn test_head_not_rendered() {
    let doc = parse("<html><head><title>t</title></head><body></body></html>").unwrap();
    let resolver = StyleResolver::for_tree(doc.tree());
    assert!(!resolver.is_rendered(doc.tree(), doc.head().unwrap()));
    assert!(resolver.is_rendered(doc.tree(), doc.body().unwrap()));
}

#[test]
fn test_inline_visibility_inherited() {
    let doc = parse(
        r#"<body><section style="visibility:hidden"><p id="inner">x</p></section></body>"#,
    )
    .unwrap();
    let tree = doc.tree();
    let inner = doc.get_element_by_id("inner").unwrap();
    let style = StyleResolver::for_tree(tree).compute_style(tree, inner).unwrap();

    assert_eq!(style.visibility, Visibility::Hidden);
    assert_eq!(style.display, Display::Block);
    assert!(!style.is_rendered());
}

#[test]
fn test_frame_styles_stay_in_frame() {
    let doc = parse(
        r#"<body><style>p { display: none }</style><p id="outer">o</p>
        <iframe srcdoc="<p id='inner'>i</p>"></iframe></body>"#,
    )
    .unwrap();
    let tree = doc.tree();
    let resolver = StyleResolver::for_tree(tree);

    let outer = doc.get_element_by_id("outer").unwrap();
    let inner = tree
        .node_ids()
        .find(|&id| tree.attr(id, "id") == Some("inner"))
        .unwrap();

    assert!(!resolver.is_rendered(tree, outer));
    assert!(resolver.is_rendered(tree, inner));
}

#[test]
fn test_invalid_css_is_tolerated() {
    let doc = parse(
        r#"<body><style>div { display: none; } }}} @@@ </style><div id="d">x</div></body>"#,
    )
    .unwrap();
    let tree = doc.tree();
    let div = doc.get_element_by_id("d").unwrap();
    let style = StyleResolver::for_tree(tree).compute_style(tree, div);
    assert!(style.is_ok());
}
