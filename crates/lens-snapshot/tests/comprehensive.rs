//! End-to-end snapshots of parsed documents
//!
//! Marker assignment, the ref-id tree and the path tree over one forest
//! with shadow roots and frames.

use lens_css::StyleResolver;
use lens_dom::{Document, NodeId, ShadowRootMode};
use lens_html::{HtmlParser, StaticFrames};
use lens_snapshot::{
    assign_ref_ids, element_path, path_structure, ref_id_structure, resolve_path, SnapshotConfig,
    Snapshotter, Variant,
};
use serde_json::Value;

const PAGE: &str = r#"<html><head><title>Shop</title><style>.ghost { opacity: 0 }</style></head>
<body>
  <div id="app">
    <h1>Catalog</h1>
    <button></button>
    <div></div>
    <div style="display:none"><a href="/secret">hidden link</a></div>
    <p class="ghost">faded</p>
    <script>var tracker = 1;</script>
    <iframe srcdoc="<p>inside</p>"></iframe>
    <iframe src="https://other.test/frame"></iframe>
  </div>
</body></html>"#;

fn load(html: &str) -> Document {
    let mut frames = StaticFrames::new();
    frames.insert("https://other.test/frame", "<button id='pay'>Pay</button>");
    HtmlParser::new()
        .with_loader(frames)
        .parse_with_url(html, "https://shop.test/")
        .unwrap()
}

fn ref_snapshot(doc: &mut Document) -> Value {
    let styles = StyleResolver::for_tree(doc.tree());
    let json = ref_id_structure(doc.tree_mut(), &styles).unwrap();
    serde_json::from_str(&json).unwrap()
}

/// Every `ref_id` in output order
fn ref_ids(node: &Value, out: &mut Vec<u32>) {
    if let Some(id) = node["ref_id"].as_str() {
        out.push(id.parse().unwrap());
    }
    for child in node["children"].as_array().into_iter().flatten() {
        ref_ids(child, out);
    }
}

fn connected_markers(doc: &Document) -> Vec<u32> {
    let tree = doc.tree();
    let mut markers: Vec<u32> = tree
        .node_ids()
        .filter(|&id| tree.is_connected(id))
        .filter_map(|id| tree.marker(id))
        .collect();
    markers.sort_unstable();
    markers
}

#[test]
fn test_markers_unique_and_contiguous() {
    let mut doc = load(PAGE);
    let body = doc.body().unwrap();
    let next = assign_ref_ids(doc.tree_mut(), body, 1);

    let markers = connected_markers(&doc);
    assert_eq!(markers, (1..next).collect::<Vec<_>>());
    assert_eq!(doc.tree().marker(body), Some(1));
    // head content is outside the pass
    assert_eq!(doc.tree().marker(doc.head().unwrap()), None);
}

#[test]
fn test_markers_follow_output_order() {
    let mut doc = load(PAGE);
    let snapshot = ref_snapshot(&mut doc);

    let mut ids = Vec::new();
    ref_ids(&snapshot, &mut ids);
    assert!(ids.len() > 3);
    assert!(ids.windows(2).all(|w| w[0] < w[1]), "not monotonic: {:?}", ids);
    assert_eq!(ids[0], 1);
}

#[test]
fn test_rerun_is_idempotent() {
    let mut doc = load(PAGE);
    let styles = StyleResolver::for_tree(doc.tree());
    let first = ref_id_structure(doc.tree_mut(), &styles).unwrap();
    let second = ref_id_structure(doc.tree_mut(), &styles).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_rerun_after_mutation_reassigns() {
    let mut doc = load(PAGE);
    let body = doc.body().unwrap();
    let app = doc.get_element_by_id("app").unwrap();
    let end = assign_ref_ids(doc.tree_mut(), body, 1);
    let h1_before = doc.tree().child_ids(app)[0];
    assert_eq!(doc.tree().marker(h1_before), Some(3));

    let tree = doc.tree_mut();
    let banner = tree.create_element("nav");
    tree.append_child(body, banner).unwrap();
    let removed = tree.child_ids(app)[1];
    tree.remove_child(app, removed).unwrap();

    let next = assign_ref_ids(doc.tree_mut(), body, 1);
    assert_eq!(next, end);
    assert_eq!(connected_markers(&doc), (1..next).collect::<Vec<_>>());
    assert_eq!(doc.tree().marker(banner), Some(next - 1));
    assert_eq!(doc.tree().find_by_marker(next - 1), Some(banner));
}

#[test]
fn test_hidden_elements_excluded() {
    let mut doc = load(PAGE);
    let json = ref_snapshot(&mut doc).to_string();

    assert!(!json.contains("hidden link"));
    assert!(!json.contains("/secret"));
    assert!(!json.contains("faded"));
}

#[test]
fn test_interactive_retention() {
    let mut doc = load(PAGE);
    let snapshot = ref_snapshot(&mut doc);
    let app = &snapshot["children"][0];
    assert_eq!(app["attributes"]["id"], "app");

    let tags: Vec<&str> = app["children"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["tag"].as_str())
        .collect();
    assert_eq!(tags, vec!["h1", "button", "iframe", "iframe"]);

    let button = &app["children"][1];
    assert_eq!(button["attributes"], serde_json::json!({}));
    assert!(button.get("text").is_none());
    assert!(button.get("children").is_none());
}

#[test]
fn test_script_ignored_in_both_outputs() {
    let mut doc = load(PAGE);
    let refs = ref_snapshot(&mut doc).to_string();
    assert!(!refs.contains("tracker"));
    assert!(!refs.contains("\"script\""));

    let paths = path_structure(doc.tree()).unwrap();
    assert!(!paths.contains("script0"));
    assert!(paths.contains("\"div0\""));
}

#[test]
fn test_same_origin_frame_nested() {
    let mut doc = load(PAGE);
    let snapshot = ref_snapshot(&mut doc);
    let frame = &snapshot["children"][0]["children"][2];

    assert_eq!(frame["tag"], "iframe");
    assert!(frame["attributes"].get("cross-origin").is_none());
    let inner_body = &frame["children"][0];
    assert_eq!(inner_body["tag"], "body");
    assert_eq!(inner_body["children"][0]["text"], "inside");
    assert!(inner_body["ref_id"].is_string());
}

#[test]
fn test_cross_origin_frame_degrades() {
    let mut doc = load(PAGE);
    let snapshot = ref_snapshot(&mut doc);
    let frame = &snapshot["children"][0]["children"][3];

    assert_eq!(frame["attributes"]["src"], "https://other.test/frame");
    assert_eq!(frame["attributes"]["cross-origin"], true);
    assert!(frame.get("children").is_none());
    assert!(!snapshot.to_string().contains("Pay"));

    // Nothing inside the foreign document was marked
    let tree = doc.tree();
    let pay = tree
        .node_ids()
        .find(|&id| tree.attr(id, "id") == Some("pay"))
        .unwrap();
    assert_eq!(tree.marker(pay), None);
}

#[test]
fn test_path_shapes() {
    let doc = HtmlParser::new()
        .parse(r#"<body><div><span id="x"></span><span></span></div></body>"#)
        .unwrap();
    let tree = doc.tree();
    let body = doc.body().unwrap();
    let div = tree.child_ids(body)[0];
    let spans = tree.child_ids(div);

    assert_eq!(element_path(tree, spans[0]), r#"//*[@id="x"]"#);
    assert_eq!(element_path(tree, spans[1]), "/html/body/div[1]/span[2]");
    assert_eq!(resolve_path(tree, "/html/body/div[1]/span[2]"), Some(spans[1]));
    assert_eq!(resolve_path(tree, r#"//*[@id="x"]"#), Some(spans[0]));
}

#[test]
fn test_path_structure_shape() {
    let doc = HtmlParser::new()
        .parse("<body><ul><li>a</li><li>b</li></ul><p>c</p></body>")
        .unwrap();
    let value: Value = serde_json::from_str(&path_structure(doc.tree()).unwrap()).unwrap();
    let body = &value["body"]["body0"];

    assert_eq!(body["xpath"], "/html/body");
    assert_eq!(body["ul0"]["xpath"], "/html/body/ul[1]");
    assert_eq!(body["ul0"]["li1"]["xpath"], "/html/body/ul[1]/li[2]");
    assert_eq!(body["p0"]["xpath"], "/html/body/p[1]");
}

#[test]
fn test_shadow_content_replaces_light_children() {
    let mut doc = Document::new("https://shop.test/").unwrap();
    let body = doc.body().unwrap();
    let tree = doc.tree_mut();

    let host = tree.create_element("div");
    tree.set_attr(host, "id", "card").unwrap();
    tree.append_child(body, host).unwrap();
    let light = tree.create_element("button");
    tree.append_child(host, light).unwrap();
    let shadow = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
    let inner = tree.create_element("input");
    tree.set_attr(inner, "type", "email").unwrap();
    tree.append_child(shadow, inner).unwrap();

    let snapshot = ref_snapshot(&mut doc);
    let card = &snapshot["children"][0];
    assert_eq!(card["children"].as_array().unwrap().len(), 1);
    assert_eq!(card["children"][0]["tag"], "input");
    assert_eq!(card["children"][0]["ref_id"], "3");

    // The light child is still marked, after the shadow tree
    assert_eq!(doc.tree().marker(light), Some(4));

    let paths = path_structure(doc.tree()).unwrap();
    let value: Value = serde_json::from_str(&paths).unwrap();
    assert_eq!(value["body"]["body0"]["div0"]["input0"]["xpath"], "/input[1]");
    assert!(value["body"]["body0"]["div0"].get("button0").is_none());
}

#[test]
fn test_snapshotter_variants() {
    let mut doc = load(PAGE);
    let path = Snapshotter::new(SnapshotConfig {
        variant: Variant::Path,
        ..SnapshotConfig::default()
    })
    .snapshot(&mut doc)
    .unwrap();
    assert!(path.starts_with("{\n  \"body\": {"));
    assert!(doc.tree().marker(doc.body().unwrap()).is_none());

    let refs = Snapshotter::new(SnapshotConfig {
        start_marker: 100,
        ..SnapshotConfig::default()
    })
    .snapshot(&mut doc)
    .unwrap();
    let value: Value = serde_json::from_str(&refs).unwrap();
    assert_eq!(value["ref_id"], "100");
    assert_eq!(value["tag"], "body");
}

#[test]
fn test_detached_root_marks_nothing_outside() {
    let mut doc = load(PAGE);
    let loose = doc.tree_mut().create_element("section");
    let next = assign_ref_ids(doc.tree_mut(), loose, 1);
    assert_eq!(next, 2);
    assert_eq!(doc.tree().marker(NodeId::ROOT), None);
}

#[test]
fn test_visibility_hidden_excluded() {
    let mut doc = load(
        r#"<body>
  <div style="visibility: hidden"><button id="buy">Buy</button></div>
  <p id="note" style="visibility: hidden">secret note</p>
  <section style="visibility: collapse"><a href="/kept">kept</a></section>
  <button id="cancel">Cancel</button>
</body>"#,
    );
    let json = ref_snapshot(&mut doc).to_string();

    assert!(!json.contains("buy"));
    assert!(!json.contains("secret note"));
    assert!(json.contains("/kept"));
    assert!(json.contains("cancel"));

    // Hidden elements are still marked
    let buy = doc.get_element_by_id("buy").unwrap();
    assert!(doc.tree().marker(buy).is_some());
}

#[test]
fn test_self_referencing_frame_terminates() {
    let mut doc = Document::new("https://shop.test/").unwrap();
    let body = doc.body().unwrap();
    let tree = doc.tree_mut();
    let frame = tree.create_element("iframe");
    tree.set_attr(frame, "id", "loop").unwrap();
    tree.append_child(body, frame).unwrap();
    tree.set_content_document(frame, NodeId::ROOT).unwrap();

    let next = assign_ref_ids(doc.tree_mut(), body, 1);
    assert_eq!(next, 3);
    assert_eq!(connected_markers(&doc), vec![1, 2]);

    let snapshot = ref_snapshot(&mut doc);
    let loop_frame = &snapshot["children"][0];
    assert_eq!(loop_frame["attributes"]["id"], "loop");
    assert!(loop_frame.get("children").is_none());

    let paths = path_structure(doc.tree()).unwrap();
    assert!(paths.contains("iframe0"));

    assert_eq!(resolve_path(doc.tree(), r#"//*[@id="loop"]"#), Some(frame));
    assert_eq!(resolve_path(doc.tree(), r#"//*[@id="missing"]"#), None);
}
