use std::io::Write;

use glam::Vec3;
use node_weaver::cluster::ClusterCenters;
use node_weaver::dataset::{self, NodeSpec};
use node_weaver::export;
use node_weaver::interaction::Phase;
use node_weaver::model::{Attributes, NodeId};
use node_weaver::{ClusterLayout, Session, Settings, SettingsPatch};

fn person(name: &str, city: &str, language: &str, team: &str) -> NodeSpec {
    let mut properties = Attributes::new();
    properties.insert("city".to_owned(), city.to_owned());
    properties.insert("language".to_owned(), language.to_owned());
    properties.insert("team".to_owned(), team.to_owned());
    NodeSpec {
        name: name.to_owned(),
        properties,
    }
}

fn five_people() -> Vec<NodeSpec> {
    vec![
        person("Ana", "Oslo", "Norwegian", "Core"),
        person("Ben", "Oslo", "English", "Core"),
        person("Caro", "Rome", "Italian", "Web"),
        person("Dev", "Rome", "English", "Web"),
        person("Eli", "Kyiv", "Ukrainian", "Ops"),
    ]
}

#[test]
fn five_nodes_land_between_min_and_max_degree() {
    let settings = Settings {
        min_connections: 2,
        max_connections: 4,
        city_affinity: 0.0,
        language_affinity: 0.0,
        ..Settings::default()
    };

    for seed in 0..32 {
        let mut session = Session::seeded(settings.clone(), Some(seed));
        let report = session.populate(five_people());

        assert_eq!(report.under_connected, 0, "seed {seed}");
        for node in session.graph().nodes() {
            let degree = session.graph().degree(node.id);
            assert!((2..=4).contains(&degree), "seed {seed}: {} has degree {degree}", node.name);
        }
    }
}

#[test]
fn damping_update_is_visible_before_any_tick() {
    let mut session = Session::seeded(Settings::default(), Some(7));
    session.populate(five_people());
    assert!(session.graph().nodes().iter().all(|node| node.damping == 0.9));

    session.update_settings(&SettingsPatch {
        damping: Some(0.5),
        ..SettingsPatch::default()
    });

    assert_eq!(session.ticks(), 0);
    assert!(session.graph().nodes().iter().all(|node| node.damping == 0.5));
}

#[test]
fn alice_to_bob_exports_one_edge_and_one_connection() {
    let mut session = Session::seeded(Settings::default(), Some(1));
    let alice = session.add_node("Alice", Attributes::new());
    let bob = session.add_node("Bob", Attributes::new());

    session.toggle_connection_mode();
    session.handle_node_click(Some(alice));
    session.handle_node_click(Some(bob));
    assert_eq!(session.graph().edge_count(), 1);

    let json: serde_json::Value =
        serde_json::from_str(&export::to_json(session.graph()).expect("json")).expect("parse");
    let edges = json["edges"].as_array().expect("edges");
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["source"], alice.to_string());
    assert_eq!(edges[0]["target"], bob.to_string());

    let csv = export::to_csv(session.graph());
    let rows = csv.lines().skip(1).collect::<Vec<_>>();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with(r#""n0","Alice","#));
    assert!(rows[0].ends_with(r#","Bob""#));
    assert!(rows[1].ends_with(r#","""#));
}

#[test]
fn connect_mode_ignores_repeat_click_then_links_second_node() {
    let mut session = Session::seeded(Settings::default(), Some(3));
    let a = session.add_node("A", Attributes::new());
    let b = session.add_node("B", Attributes::new());

    session.toggle_connection_mode();
    session.handle_node_click(Some(a));
    let pending = *session.interaction();
    session.handle_node_click(Some(a));

    assert_eq!(*session.interaction(), pending);
    assert_eq!(session.graph().edge_count(), 0);

    session.handle_node_click(Some(b));
    assert_eq!(session.graph().edge_count(), 1);
    assert_eq!(session.interaction().phase(), Phase::Idle);
}

#[test]
fn removal_drops_exactly_the_incident_edges() {
    let mut session = Session::seeded(
        Settings {
            min_connections: 2,
            max_connections: 6,
            ..Settings::default()
        },
        Some(11),
    );
    session.populate(dataset::sample_people());

    let victim = session.graph().nodes()[3].id;
    let incident = session
        .graph()
        .edges()
        .iter()
        .filter(|edge| edge.touches(victim))
        .count();
    let before = session.graph().edge_count();

    session.select_node(Some(victim));
    assert_eq!(session.remove_selected_node(), Some(incident));

    assert_eq!(session.graph().edge_count(), before - incident);
    assert!(!session.graph().edges().iter().any(|edge| edge.touches(victim)));
    assert_eq!(session.interaction().selected(), None);
}

#[test]
fn drag_release_after_removal_is_harmless() {
    let mut session = Session::seeded(Settings::default(), Some(5));
    let a = session.add_node("A", Attributes::new());
    session.add_node("B", Attributes::new());

    session.begin_drag(a);
    session.remove_node(a);
    session.drag_to(a, Vec3::ONE);
    session.end_drag(a);
    session.tick();

    assert_eq!(session.graph().node_count(), 1);
    assert!(session.interaction().dragging().is_none());
}

#[test]
fn simulation_stays_finite_at_range_extremes() {
    let settings = Settings {
        repulsion_strength: 50.0,
        connection_stiffness: 100.0,
        connection_length: 1.0,
        cluster_attraction: 3.0,
        cluster_radius: 5.0,
        damping: 0.5,
        max_connections: 10,
        min_connections: 10,
        cluster_layout: ClusterLayout::Sphere,
        ..Settings::default()
    };
    let mut session = Session::seeded(settings, Some(99));
    session.populate(dataset::sample_people());

    for _ in 0..600 {
        session.tick();
    }

    for node in session.graph().nodes() {
        assert!(node.position.is_finite(), "{} drifted to {:?}", node.name, node.position);
        assert!(node.velocity.is_finite());
    }
}

#[test]
fn default_layout_settles_eventually() {
    let mut session = Session::seeded(Settings::default(), Some(2));
    session.populate(five_people());

    let settled = (0..20_000).any(|_| !session.tick());
    assert!(settled);
}

#[test]
fn cluster_centers_are_stable_across_calls() {
    let mut session = Session::seeded(Settings::default(), Some(4));
    session.populate(five_people());

    let first = session.cluster_centers().clone();
    let second = session.cluster_centers().clone();
    assert_eq!(first, second);

    let recomputed =
        ClusterCenters::for_graph(session.graph(), "team", ClusterLayout::Circle, 25.0);
    assert_eq!(first, recomputed);
    assert_eq!(first.len(), 3);
}

#[test]
fn dataset_file_feeds_a_session_and_exports() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"[
            {{ "name": "Ada", "properties": {{ "city": "London", "team": "Math" }} }},
            {{ "name": "Grace", "properties": {{ "city": "New York", "team": "Navy" }} }},
            {{ "name": "Alan", "properties": {{ "city": "London", "team": "Math" }} }}
        ]"#
    )
    .expect("write dataset");

    let people = dataset::load_nodes(file.path()).expect("load dataset");
    let mut session = Session::seeded(Settings::default(), Some(8));
    session.populate(people);
    for _ in 0..120 {
        session.tick();
    }

    let dir = tempfile::tempdir().expect("temp dir");
    let json_path = dir.path().join("graph.json");
    let csv_path = dir.path().join("graph.csv");
    export::write_json(session.graph(), &json_path).expect("json export");
    export::write_csv(session.graph(), &csv_path).expect("csv export");

    let csv = std::fs::read_to_string(&csv_path).expect("read csv");
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.contains(r#""Grace","New York","","Navy""#));
    let json = std::fs::read_to_string(&json_path).expect("read json");
    assert!(json.contains("\"Alan\""));
}

#[test]
fn unknown_node_ids_never_fail() {
    let mut session = Session::seeded(Settings::default(), Some(6));
    session.populate(five_people());
    let edges = session.graph().edge_count();
    let ghost = NodeId(u64::MAX);

    session.update_node_property(ghost, "city", "Nowhere");
    session.handle_node_click(Some(ghost));
    session.begin_drag(ghost);
    session.drag_to(ghost, Vec3::ZERO);
    session.end_drag(ghost);
    assert_eq!(session.remove_node(ghost), None);

    assert_eq!(session.graph().node_count(), 5);
    assert_eq!(session.graph().edge_count(), edges);
}
