use gatewire_sim::{Graph, NodeId, NodeKind};

fn check(graph: &Graph) {
    if let Err(e) = graph.validate() {
        panic!("{e}");
    }
}

fn row(graph: &mut Graph, kinds: &[NodeKind]) -> Vec<NodeId> {
    kinds
        .iter()
        .enumerate()
        .map(|(i, &kind)| graph.place_node(kind, (i as i32 * 100, 0)))
        .collect()
}

#[test]
fn buffer_is_or_of_sources() {
    let mut graph = Graph::default();
    let ids = row(
        &mut graph,
        &[NodeKind::Switch, NodeKind::Switch, NodeKind::Buffer],
    );
    let (s1, s2, n) = (ids[0], ids[1], ids[2]);

    assert!(!graph.powered(n));
    graph.add_child(s1, n);
    graph.add_child(s2, n);
    assert!(!graph.powered(n));

    graph.toggle_switch(s2);
    assert!(graph.powered(n));
    graph.toggle_switch(s1);
    assert!(graph.powered(n));
    graph.toggle_switch(s2);
    assert!(graph.powered(n));
    graph.toggle_switch(s1);
    assert!(!graph.powered(n));
}

#[test]
fn inverter_is_nor_of_sources() {
    let mut graph = Graph::default();
    let ids = row(
        &mut graph,
        &[NodeKind::Switch, NodeKind::Switch, NodeKind::Inverter],
    );
    let (s1, s2, inv) = (ids[0], ids[1], ids[2]);

    assert!(graph.powered(inv));
    graph.add_child(s1, inv);
    graph.add_child(s2, inv);
    assert!(graph.powered(inv));

    graph.toggle_switch(s1);
    assert!(!graph.powered(inv));
    graph.toggle_switch(s2);
    assert!(!graph.powered(inv));
    graph.toggle_switch(s1);
    graph.toggle_switch(s2);
    assert!(graph.powered(inv));
}

#[test]
fn connecting_a_powered_source_updates_child() {
    let mut graph = Graph::default();
    let ids = row(&mut graph, &[NodeKind::Switch, NodeKind::Buffer]);
    graph.toggle_switch(ids[0]);
    assert!(!graph.powered(ids[1]));
    graph.add_child(ids[0], ids[1]);
    assert!(graph.powered(ids[1]));
}

#[test]
fn switch_ignores_its_sources() {
    let mut graph = Graph::default();
    let ids = row(&mut graph, &[NodeKind::Switch, NodeKind::Switch]);
    let (upstream, s) = (ids[0], ids[1]);
    graph.add_child(upstream, s);

    graph.toggle_switch(upstream);
    assert!(!graph.powered(s));
    assert!(!graph.recompute_power(s));

    graph.toggle_switch(s);
    graph.toggle_switch(upstream);
    assert!(graph.powered(s));
}

#[test]
fn chain_settles_in_one_toggle() {
    let mut graph = Graph::default();
    let ids = row(
        &mut graph,
        &[
            NodeKind::Switch,
            NodeKind::Buffer,
            NodeKind::Inverter,
            NodeKind::Buffer,
        ],
    );
    for pair in ids.windows(2) {
        graph.add_child(pair[0], pair[1]);
    }
    let states = |graph: &Graph| ids.iter().map(|&id| graph.powered(id)).collect::<Vec<_>>();

    assert_eq!(states(&graph), vec![false, false, true, true]);
    graph.toggle_switch(ids[0]);
    assert_eq!(states(&graph), vec![true, true, false, false]);
    graph.toggle_switch(ids[0]);
    assert_eq!(states(&graph), vec![false, false, true, true]);
    check(&graph);
}

#[test]
fn switch_buffer_inverter_scenario() {
    let mut graph = Graph::default();
    let s = graph.place_node(NodeKind::Switch, (0, 0));
    let n1 = graph.place_node(NodeKind::Buffer, (100, 0));
    let i1 = graph.place_node(NodeKind::Inverter, (200, 0));
    graph.add_child(s, n1);
    graph.add_child(n1, i1);

    assert!(!graph.powered(s));
    assert!(!graph.powered(n1));
    assert!(graph.powered(i1));

    assert!(graph.toggle_switch(s));
    assert!(graph.powered(s));
    assert!(graph.powered(n1));
    assert!(!graph.powered(i1));
}

#[test]
fn diamond_settles() {
    // s -> a -> c, s -> b(inv) -> c
    let mut graph = Graph::default();
    let ids = row(
        &mut graph,
        &[
            NodeKind::Switch,
            NodeKind::Buffer,
            NodeKind::Inverter,
            NodeKind::Buffer,
        ],
    );
    let (s, a, b, c) = (ids[0], ids[1], ids[2], ids[3]);
    graph.add_child(s, a);
    graph.add_child(s, b);
    graph.add_child(a, c);
    graph.add_child(b, c);

    assert!(graph.powered(c));
    graph.toggle_switch(s);
    assert!(graph.powered(a));
    assert!(!graph.powered(b));
    assert!(graph.powered(c));
    check(&graph);
}

#[test]
fn deleting_a_node_detaches_all_neighbours() {
    let mut graph = Graph::default();
    let s1 = graph.place_node(NodeKind::Switch, (0, 0));
    let s2 = graph.place_node(NodeKind::Switch, (0, 100));
    let mid = graph.place_node(NodeKind::Buffer, (100, 50));
    let buf = graph.place_node(NodeKind::Buffer, (200, 0));
    let inv = graph.place_node(NodeKind::Inverter, (200, 50));
    let other = graph.place_node(NodeKind::Buffer, (200, 100));

    graph.add_child(s1, mid);
    graph.add_child(s2, mid);
    for child in [buf, inv, other] {
        graph.add_child(mid, child);
    }
    graph.toggle_switch(s1);
    assert!(graph.powered(buf));
    assert!(!graph.powered(inv));

    graph.select(mid);
    assert_eq!(graph.delete_selected(), 1);

    assert!(graph.node(mid).is_none());
    assert!(!graph.nodes().contains(&mid));
    for source in [s1, s2] {
        assert!(graph.children(source).is_empty());
    }
    for child in [buf, inv, other] {
        assert!(graph.sources(child).is_empty());
    }
    assert!(!graph.powered(buf));
    assert!(graph.powered(inv));
    assert!(!graph.powered(other));
    check(&graph);
}

#[test]
fn duplicate_preserves_internal_edges_only() {
    let mut graph = Graph::default();
    let outside = graph.place_node(NodeKind::Switch, (-100, 0));
    let a = graph.place_node(NodeKind::Buffer, (0, 0));
    let b = graph.place_node(NodeKind::Inverter, (100, 0));
    let c = graph.place_node(NodeKind::Buffer, (200, 0));
    graph.add_child(outside, a);
    graph.add_child(a, b);
    graph.add_child(b, c);
    for id in [a, b, c] {
        graph.select(id);
    }

    assert!(graph.duplicate());
    let copies = graph.held_copy().unwrap().to_vec();
    let (a2, b2, c2) = (copies[0], copies[1], copies[2]);

    assert_eq!(graph.len(), 7);
    assert_eq!(graph.selected(), copies.as_slice());
    for (orig, copy) in [(a, a2), (b, b2), (c, c2)] {
        let (orig, copy) = (graph.node(orig).unwrap(), graph.node(copy).unwrap());
        assert_eq!(orig.kind, copy.kind);
        assert_eq!(orig.pos, copy.pos);
    }

    assert_eq!(graph.children(a2), vec![(b2, false)]);
    assert_eq!(graph.children(b2), vec![(c2, false)]);
    assert!(graph.children(c2).is_empty());
    assert!(graph.sources(a2).is_empty());
    assert_eq!(graph.children(outside).len(), 1);
    for orig in [a, b, c] {
        for copy in &copies {
            assert!(!graph.sources(*copy).contains(&orig));
            assert!(!graph.sources(orig).contains(copy));
        }
    }

    // Copies settle on their own sources
    assert!(!graph.powered(a2));
    assert!(graph.powered(b2));
    assert!(graph.powered(c2));
    check(&graph);
}

#[test]
fn duplicate_follows_selection_order() {
    let mut graph = Graph::default();
    let a = graph.place_node(NodeKind::Buffer, (0, 0));
    let b = graph.place_node(NodeKind::Inverter, (100, 0));
    graph.add_child(b, a);
    graph.select(b);
    graph.select(a);

    assert!(graph.duplicate());
    let copies = graph.held_copy().unwrap().to_vec();
    assert_eq!(graph.node(copies[0]).map(|n| n.kind), Some(NodeKind::Inverter));
    assert_eq!(graph.children(copies[0]), vec![(copies[1], false)]);
    assert!(graph.powered(copies[1]));
}

#[test]
fn children_keep_creation_order() {
    let mut graph = Graph::default();
    let ids = row(
        &mut graph,
        &[
            NodeKind::Buffer,
            NodeKind::Buffer,
            NodeKind::Buffer,
            NodeKind::Buffer,
        ],
    );
    graph.add_child(ids[0], ids[3]);
    graph.add_child(ids[0], ids[1]);
    graph.add_child(ids[0], ids[2]);
    let order: Vec<NodeId> = graph.children(ids[0]).into_iter().map(|(c, _)| c).collect();
    assert_eq!(order, vec![ids[3], ids[1], ids[2]]);

    graph.remove_child(ids[0], ids[1]);
    let order: Vec<NodeId> = graph.children(ids[0]).into_iter().map(|(c, _)| c).collect();
    assert_eq!(order, vec![ids[3], ids[2]]);
}

#[test]
fn edges_in_both_directions_are_distinct() {
    let mut graph = Graph::default();
    let ids = row(&mut graph, &[NodeKind::Buffer, NodeKind::Buffer]);
    assert!(graph.add_child(ids[0], ids[1]).is_some());
    assert!(graph.add_child(ids[1], ids[0]).is_some());
    assert_eq!(graph.sources(ids[0]), &[ids[1]]);
    assert_eq!(graph.sources(ids[1]), &[ids[0]]);

    assert!(graph.delete_node(ids[0]));
    assert!(graph.sources(ids[1]).is_empty());
    assert!(graph.children(ids[1]).is_empty());
    check(&graph);
}
