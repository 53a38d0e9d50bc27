use anyhow::Result;
use weft_ir::{
    ElementNode, ParseOptions, css::RuleStore, parse, parse_css_text, parse_with, reconcile, seed,
    serialize, tree,
};

type Shape = (usize, String, Vec<String>, Option<String>, Option<String>);

/// Tag, classes, id attribute and text of every node, ignoring ids.
fn shape(nodes: &[ElementNode]) -> Vec<Shape> {
    let mut out = Vec::new();
    tree::walk(nodes, &mut |node, depth| {
        out.push((
            depth,
            node.tag.clone(),
            node.classes.clone(),
            node.id_attr.clone(),
            node.text_content.clone(),
        ));
    });
    out
}

#[test]
fn seed_survives_serialize_then_parse() {
    let seed = seed::sample_tree();
    let markup = serialize(&seed);
    assert_eq!(
        markup,
        r#"<html><body><div class="container"><h1 class="title"></h1><p></p></div></body></html>"#
    );
    let parsed = parse(&markup);
    assert_eq!(shape(&parsed), shape(&seed));
}

#[test]
fn reconcile_against_seed_keeps_every_id() {
    let seed = seed::sample_tree();
    let reconciled = reconcile(&seed, &serialize(&seed));
    assert_eq!(reconciled, seed);
}

#[test]
fn reconcile_keeps_identity_of_unchanged_regions() {
    let seed = seed::sample_tree();
    let edited = concat!(
        r#"<html><body><div class="container wide">"#,
        r#"<h1 class="title">Hi</h1><p>Body</p><footer></footer>"#,
        "</div></body></html>",
    );
    let next = reconcile(&seed, edited);

    let div = tree::find_node(&next, "3").expect("container keeps id");
    assert_eq!(div.classes, vec!["container", "wide"]);
    assert_eq!(
        tree::find_node(&next, "4").and_then(|n| n.text_content.clone()),
        Some("Hi".to_string())
    );
    assert_eq!(div.children[2].tag, "footer");
    assert!(!["1", "2", "3", "4", "5"].contains(&div.children[2].id.as_str()));
}

#[test]
fn add_child_end_to_end() {
    let tree = vec![
        ElementNode::new("1", "div")
            .with_classes(["container"])
            .with_children(vec![ElementNode::new("2", "p")]),
    ];
    let next = tree::add_child(&tree, "1", ElementNode::new("3", "span").with_classes(["x"]));
    assert_eq!(
        serialize(&next),
        r#"<div class="container"><p></p><span class="x"></span></div>"#
    );
}

#[test]
fn explicit_id_attributes_round_trip() {
    let tree = vec![
        ElementNode::new("n1", "section")
            .with_id_attr("hero")
            .with_text("a < b")
            .with_children(vec![ElementNode::new("n2", "p").with_text("Tom & Jerry")]),
    ];
    let parsed = parse(&serialize(&tree));
    assert_eq!(shape(&parsed), shape(&tree));
    assert_eq!(parsed[0].id, "hero");
}

#[test]
fn oversize_markup_does_not_replace_anything() -> Result<()> {
    let options = ParseOptions {
        max_markup_bytes: 16,
        ..ParseOptions::default()
    };
    assert!(parse_with("<div></div>", &options)?.len() == 1);
    assert!(parse_with("<div><p>too long for the limit</p></div>", &options).is_err());
    Ok(())
}

#[test]
fn css_text_round_trip_preserves_rules() {
    let store = RuleStore::new(seed::initial_rules());
    let reparsed = parse_css_text(&store.to_css_text());
    assert_eq!(reparsed.len(), 3);
    for (before, after) in store.rules().iter().zip(&reparsed) {
        assert_eq!(before.selector, after.selector);
        assert_eq!(before.properties, after.properties);
    }
}
