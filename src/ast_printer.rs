use ziv_ir::{NodeId, Tree};

/// Pretty-prints a parsed tree for `--dump-tree`.
///
/// Walks the arena generically by `NodeKind`/spelling/children rather than
/// matching on a typed AST enum, since the tree has no such enum, only
/// tagged nodes.
pub fn print_tree(tree: &Tree) {
    println!("AST Root");
    if let Some(root) = tree.root() {
        print_node(tree, root, 1);
    }
}

fn print_node(tree: &Tree, node: NodeId, depth: usize) {
    let spelling = tree.spelling(node);
    let marker = if tree.has_error(node) { " (error)" } else { "" };
    if spelling.is_empty() {
        println!("{}{:?}{}", indent(depth), tree.kind(node), marker);
    } else {
        println!("{}{:?}: {}{}", indent(depth), tree.kind(node), spelling, marker);
    }
    for &child in tree.children(node) {
        print_node(tree, child, depth + 1);
    }
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}
