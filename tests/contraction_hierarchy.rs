use transit_router::algo::contraction_hierarchy::{contract_graph, contract_to_core, query::Server, BucketChInitialTransfers};
use transit_router::algo::dijkstra::{run_one_to_all, DijkstraData};
use transit_router::datastr::graph::*;
use transit_router::datastr::timetable::StopId;

fn graph() -> FirstOutGraph {
    // This is the directed graph we're going to use.
    // The node numbers correspond to the different states,
    // and the edge weights symbolize the cost of moving
    // from one node to another.
    // Note that the edges are one-way.
    //
    //                  7
    //          +-----------------+
    //          |                 |
    //          v   1        2    |  2
    //          0 -----> 1 -----> 3 ---> 4
    //          |        ^        ^      ^
    //          |        | 1      |      |
    //          |        |        | 3    | 1
    //          +------> 2 -------+      |
    //           10      |               |
    //                   +---------------+
    //
    FirstOutGraph::new(
        vec![0, 2, 3, 6, 8, 8, 8],
        vec![2, 1, 3, 1, 3, 4, 0, 4].into_iter().map(Vertex).collect(),
        vec![10, 1, 2, 1, 3, 1, 7, 2],
    )
}

fn dijkstra_distances(graph: &FirstOutGraph, from: Vertex) -> Vec<Weight> {
    let mut distances = vec![INFINITY; graph.num_vertices()];
    let mut data = DijkstraData::new(graph.num_vertices());
    run_one_to_all(graph, &mut data, from, |_, _| true, |vertex, distance| {
        distances[vertex.id()] = distance;
    });
    distances
}

#[test]
fn ch_query_matches_dijkstra_on_all_pairs() {
    let graph = graph();
    let ch = contract_graph(&graph);
    let mut server = Server::new(&ch);

    for from in 0..graph.num_vertices() {
        let expected = dijkstra_distances(&graph, Vertex::new(from));
        for to in 0..graph.num_vertices() {
            let expected = match expected[to] {
                INFINITY => None,
                distance => Some(distance),
            };
            assert_eq!(server.distance(Vertex::new(from), Vertex::new(to)), expected, "{} -> {}", from, to);
        }
    }
}

#[test]
fn ch_query_known_distances() {
    let ch = contract_graph(&graph());
    let mut server = Server::new(&ch);

    assert_eq!(server.distance(Vertex(0), Vertex(1)), Some(1));
    assert_eq!(server.distance(Vertex(0), Vertex(3)), Some(3));
    assert_eq!(server.distance(Vertex(3), Vertex(0)), Some(7));
    assert_eq!(server.distance(Vertex(0), Vertex(4)), Some(5));
    assert_eq!(server.distance(Vertex(4), Vertex(0)), None);
}

#[test]
fn contracting_a_chain_preserves_the_end_to_end_distance() {
    // chain 0 - 2 - 3 - 4 - 1 with unit weights, both directions
    let mut adjacency: Vec<Vec<Link>> = vec![Vec::new(); 5];
    for (a, b) in [(0u32, 2u32), (2, 3), (3, 4), (4, 1)] {
        adjacency[a as usize].push(Link { head: Vertex(b), weight: 1 });
        adjacency[b as usize].push(Link { head: Vertex(a), weight: 1 });
    }
    let graph = FirstOutGraph::from_adjacency_lists(adjacency);

    let ch = contract_graph(&graph);
    let mut server = Server::new(&ch);
    assert_eq!(server.distance(Vertex(0), Vertex(1)), Some(4));
    assert_eq!(server.distance(Vertex(1), Vertex(0)), Some(4));
}

#[test]
fn core_contains_kept_vertices_and_preserves_their_distances() {
    // keep the chain endpoints 0 and 1 as the core
    let mut adjacency: Vec<Vec<Link>> = vec![Vec::new(); 5];
    for (a, b) in [(0u32, 2u32), (2, 3), (3, 4), (4, 1)] {
        adjacency[a as usize].push(Link { head: Vertex(b), weight: 1 });
        adjacency[b as usize].push(Link { head: Vertex(a), weight: 1 });
    }
    let graph = FirstOutGraph::from_adjacency_lists(adjacency);

    let (ch, core) = contract_to_core(&graph, 2, 1000.0);

    // contracted vertices are isolated in the core
    for vertex in 2..5 {
        assert_eq!(core.degree(Vertex::new(vertex)), 0);
    }
    // the core preserves the shortest-path distance between the kept vertices
    assert_eq!(dijkstra_distances(&core, Vertex(0))[1], 4);
    assert_eq!(dijkstra_distances(&core, Vertex(1))[0], 4);
    // and so does the hierarchy
    let mut server = Server::new(&ch);
    assert_eq!(server.distance(Vertex(0), Vertex(1)), Some(4));
}

#[test]
fn contraction_order_is_a_permutation_of_the_contracted_vertices() {
    let graph = graph();
    let ch = contract_graph(&graph);
    let mut order = ch.order.clone();
    order.sort_unstable();
    let expected: Vec<Vertex> = (0..graph.num_vertices()).map(Vertex::new).collect();
    assert_eq!(order, expected);
}

#[test]
fn bucket_query_yields_all_walking_distances_at_once() {
    let graph = graph();
    let ch = contract_graph(&graph);
    // stops are the vertices 0, 1, 2
    let mut bucket_query = BucketChInitialTransfers::new(&ch, 3);

    bucket_query.run(Vertex(0), Vertex(4));

    let from_source = dijkstra_distances(&graph, Vertex(0));
    for stop in 0..3 {
        assert_eq!(bucket_query.get_forward_distance(StopId::new(stop)), from_source[stop]);
    }
    for stop in 0..3 {
        let to_target = dijkstra_distances(&graph, Vertex::new(stop))[4];
        assert_eq!(bucket_query.get_backward_distance(StopId::new(stop)), to_target);
    }
    assert_eq!(bucket_query.get_distance(), 5);

    let mut pois: Vec<StopId> = bucket_query.get_forward_pois().to_vec();
    pois.sort_unstable();
    assert_eq!(pois, vec![StopId(0), StopId(1), StopId(2)]);
}

#[test]
fn bucket_query_on_disconnected_target() {
    let graph = graph();
    let ch = contract_graph(&graph);
    let mut bucket_query = BucketChInitialTransfers::new(&ch, 3);

    // vertex 5 is isolated
    bucket_query.run(Vertex(5), Vertex(0));
    assert_eq!(bucket_query.get_distance(), INFINITY);
    assert!(bucket_query.get_forward_pois().is_empty());
}
