use metaworkspace::config::TreeConfig;
use metaworkspace::tree::{FileTree, TreeModel, TreeNode};
use metaworkspace::WorkspaceError;

fn nested() -> FileTree {
    FileTree::new(vec![
        TreeNode::folder(
            "src/",
            vec![
                TreeNode::folder(
                    "scene/",
                    vec![TreeNode::folder("parts/", vec![TreeNode::file("desk.rs").dirty(), TreeNode::file("chair.rs")])],
                ),
                TreeNode::file("lib.rs"),
            ],
        ),
        TreeNode::file("Cargo.toml"),
    ])
    .expect("valid tree")
}

fn rows(model: &TreeModel) -> Vec<(&str, usize)> {
    model.visible_nodes().map(|(node, depth)| (node.name.as_str(), depth)).collect()
}

#[test]
fn collapsed_ancestor_hides_expanded_descendants() {
    let mut model = TreeModel::new(nested(), ["scene/", "parts/"]);
    assert_eq!(rows(&model), vec![("src/", 0), ("Cargo.toml", 0)]);

    model.expand("src/");
    assert_eq!(
        rows(&model),
        vec![
            ("src/", 0),
            ("scene/", 1),
            ("parts/", 2),
            ("desk.rs", 3),
            ("chair.rs", 3),
            ("lib.rs", 1),
            ("Cargo.toml", 0),
        ]
    );

    model.collapse("scene/");
    assert_eq!(rows(&model), vec![("src/", 0), ("scene/", 1), ("lib.rs", 1), ("Cargo.toml", 0)]);
    assert!(model.is_expanded("parts/"));
}

#[test]
fn double_toggle_restores_visible_rows() {
    let mut model = TreeModel::from_config(FileTree::sample_project(), &TreeConfig::default());
    let before: Vec<_> = rows(&model).into_iter().map(|(name, depth)| (name.to_string(), depth)).collect();
    model.toggle("hooks/");
    model.toggle("hooks/");
    let after: Vec<_> = rows(&model).into_iter().map(|(name, depth)| (name.to_string(), depth)).collect();
    assert_eq!(before, after);
}

#[test]
fn toggling_a_file_name_changes_nothing_visible() {
    let mut model = TreeModel::new(nested(), ["src/"]);
    let before = model.visible_nodes().count();
    model.toggle("lib.rs");
    assert_eq!(model.visible_nodes().count(), before);
}

#[test]
fn duplicate_names_deep_in_the_tree_are_reported() {
    let err = FileTree::new(vec![TreeNode::folder(
        "src/",
        vec![TreeNode::folder("scene/", vec![TreeNode::file("mod.rs"), TreeNode::file("mod.rs")])],
    )])
    .unwrap_err();
    assert_eq!(err, WorkspaceError::DuplicateName { parent: "src/scene/".to_string(), name: "mod.rs".to_string() });
}

#[test]
fn dirty_files_are_found_while_collapsed() {
    let model = TreeModel::new(nested(), Vec::<String>::new());
    let dirty = model.dirty_files();
    assert_eq!(dirty.len(), 1);
    assert_eq!(dirty[0].path, "src/scene/parts/desk.rs");
    assert_eq!(dirty[0].depth, 3);
}
