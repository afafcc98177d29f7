use poi_registry::{AttrValue, AttrValues, Registry, RegistryError, SeedDocument, load_seed};
use std::io::Write;
use tempfile::NamedTempFile;

fn values(pairs: &[(&str, AttrValue)]) -> AttrValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn park_registry() -> Registry {
    let mut reg = Registry::new();
    reg.add_type("park", ["benches"]).unwrap();
    reg.add_poi(501, "Oak Park", "park", 10, 10, AttrValues::new())
        .unwrap();
    reg.add_poi(502, "Pine Park", "park", 20, 20, AttrValues::new())
        .unwrap();
    reg.add_poi(503, "Maple Park", "park", 30, 30, AttrValues::new())
        .unwrap();
    reg.add_visitor(11, "Ana", "BG").unwrap();
    reg.add_visitor(12, "Ben", "RO").unwrap();
    reg.add_visitor(13, "Cia", "GR").unwrap();
    reg
}

#[test]
fn test_spatial_example_from_three_pois() {
    let mut reg = Registry::new();
    reg.add_type("forest", ["area", "protected"]).unwrap();
    reg.add_poi(300, "A", "forest", 0, 0, AttrValues::new()).unwrap();
    reg.add_poi(301, "B", "forest", 3, 4, AttrValues::new()).unwrap();
    reg.add_poi(302, "C", "forest", 10, 0, AttrValues::new()).unwrap();

    let nearest = reg.nearest_k(0, 0, 2).unwrap();
    let rows: Vec<_> = nearest.iter().map(|(p, d)| (p.name(), *d)).collect();
    assert_eq!(rows, vec![("A", 0.0), ("B", 5.0)]);

    let within = reg.within_radius(0, 0, 5.0).unwrap();
    let rows: Vec<_> = within.iter().map(|(p, d)| (p.name(), *d)).collect();
    assert_eq!(rows, vec![("A", 0.0), ("B", 5.0)]);

    let boundary = reg.exactly_on_boundary(0, 0, 5.0).unwrap();
    let rows: Vec<_> = boundary.iter().map(|(p, d)| (p.name(), *d)).collect();
    assert_eq!(rows, vec![("B", 5.0)]);
}

#[test]
fn test_nearest_k_is_prefix_of_unbounded_radius() {
    let mut reg = Registry::new();
    reg.add_type("site", Vec::<String>::new()).unwrap();
    let coords = [
        (7, 1),
        (1, 7),
        (5, 5),
        (0, 0),
        (900, 900),
        (5, 5),
        (3, 4),
        (4, 3),
    ];
    for (i, (x, y)) in coords.iter().enumerate() {
        reg.add_poi(100 - i as i64, &format!("P{i}"), "site", *x, *y, AttrValues::new())
            .unwrap();
    }

    let all = reg.within_radius(2, 2, f64::INFINITY).unwrap();
    assert_eq!(all.len(), coords.len());
    for k in 0..=coords.len() + 2 {
        let nearest = reg.nearest_k(2, 2, k).unwrap();
        let expected = &all[..k.min(all.len())];
        let got: Vec<i64> = nearest.iter().map(|(p, _)| p.id()).collect();
        let want: Vec<i64> = expected.iter().map(|(p, _)| p.id()).collect();
        assert_eq!(got, want, "k = {k}");
    }
}

#[test]
fn test_closest_pair_example() {
    let mut reg = Registry::new();
    reg.add_type("t2", Vec::<String>::new()).unwrap();
    reg.add_poi(101, "A2", "t2", 0, 0, AttrValues::new()).unwrap();
    reg.add_poi(102, "B2", "t2", 3, 4, AttrValues::new()).unwrap();
    reg.add_poi(103, "C2", "t2", 10, 0, AttrValues::new()).unwrap();
    reg.add_poi(104, "D2", "t2", 11, 0, AttrValues::new()).unwrap();

    let pair = reg.closest_pair_pois().unwrap();
    assert_eq!(pair.first.name(), "C2");
    assert_eq!(pair.second.name(), "D2");
    assert_eq!(pair.distance, 1.0);
}

#[test]
fn test_type_lifecycle_with_poi_deletion() {
    let mut reg = Registry::new();
    reg.add_type("forest", ["area", "protected"]).unwrap();
    let mut v = AttrValues::new();
    v.insert("area".into(), AttrValue::from(200_i64));
    v.insert("protected".into(), AttrValue::from(false));
    reg.add_poi(2, "Cedar Grove", "forest", 120, 220, v).unwrap();

    assert!(matches!(
        reg.delete_type("forest"),
        Err(RegistryError::TypeInUse(_))
    ));
    assert!(reg.delete_poi(2));
    assert!(reg.delete_type("forest").unwrap());

    // The id stays retired even though its type is gone.
    reg.add_type("forest", Vec::<String>::new()).unwrap();
    assert!(matches!(
        reg.add_poi(2, "Again", "forest", 1, 1, AttrValues::new()),
        Err(RegistryError::DuplicateId { id: 2, .. })
    ));
}

#[test]
fn test_revisits_do_not_inflate_distinct_counts() {
    let mut reg = park_registry();
    reg.record_visit(11, 501, "01/10/2025", None).unwrap();
    reg.record_visit(12, 501, "01/10/2025", None).unwrap();
    reg.record_visit(13, 502, "01/10/2025", None).unwrap();

    let before_poi: Vec<_> = reg
        .counts_distinct_visitors_per_poi()
        .iter()
        .map(|(p, c)| (p.id(), *c))
        .collect();
    let before_top: Vec<_> = reg
        .top_k_visitors_by_distinct_pois(3)
        .iter()
        .map(|(v, c)| (v.id(), *c))
        .collect();

    reg.record_visit(12, 501, "02/10/2025", None).unwrap();

    let after_poi: Vec<_> = reg
        .counts_distinct_visitors_per_poi()
        .iter()
        .map(|(p, c)| (p.id(), *c))
        .collect();
    let after_top: Vec<_> = reg
        .top_k_visitors_by_distinct_pois(3)
        .iter()
        .map(|(v, c)| (v.id(), *c))
        .collect();

    assert_eq!(before_poi, after_poi);
    assert_eq!(before_top, after_top);
    assert_eq!(reg.list_visited_pois_for_visitor(12).unwrap().len(), 2);
    assert_eq!(reg.poi_visit_count(501), 3);
}

#[test]
fn test_top_k_pois_by_distinct_visitors() {
    let mut reg = park_registry();
    reg.record_visit(11, 501, "01/10/2025", None).unwrap();
    reg.record_visit(12, 501, "01/10/2025", None).unwrap();
    reg.record_visit(12, 501, "02/10/2025", None).unwrap();
    reg.record_visit(13, 502, "01/10/2025", None).unwrap();

    let top: Vec<_> = reg
        .top_k_pois_by_distinct_visitors(2)
        .iter()
        .map(|(p, c)| (p.name(), *c))
        .collect();
    assert_eq!(top, vec![("Oak Park", 2), ("Pine Park", 1)]);

    // Unvisited POIs never appear, however large k is.
    assert_eq!(reg.top_k_pois_by_distinct_visitors(10).len(), 2);
    assert!(reg.top_k_pois_by_distinct_visitors(0).is_empty());

    let counts: Vec<_> = reg
        .counts_distinct_visitors_per_poi()
        .iter()
        .map(|(p, c)| (p.id(), *c))
        .collect();
    assert_eq!(counts, vec![(501, 2), (502, 1), (503, 0)]);
}

#[test]
fn test_top_k_visitors_by_distinct_pois() {
    let mut reg = park_registry();
    reg.record_visit(11, 501, "01/10/2025", None).unwrap();
    reg.record_visit(11, 501, "02/10/2025", None).unwrap();
    reg.record_visit(11, 502, "02/10/2025", None).unwrap();
    reg.record_visit(12, 503, "01/10/2025", None).unwrap();

    let top: Vec<_> = reg
        .top_k_visitors_by_distinct_pois(2)
        .iter()
        .map(|(v, c)| (v.name(), *c))
        .collect();
    assert_eq!(top, vec![("Ana", 2), ("Ben", 1)]);

    let counts: Vec<_> = reg
        .counts_distinct_pois_per_visitor()
        .iter()
        .map(|(v, c)| (v.name(), *c))
        .collect();
    assert_eq!(counts, vec![("Ana", 2), ("Ben", 1), ("Cia", 0)]);
}

#[test]
fn test_rating_coercion_example() {
    let mut reg = Registry::new();
    reg.add_type("museum", ["tickets"]).unwrap();
    reg.add_poi(
        400,
        "Natl Museum",
        "museum",
        50,
        50,
        values(&[("tickets", AttrValue::from(10_i64))]),
    )
    .unwrap();
    reg.add_visitor(1, "Bob", "BG").unwrap();

    assert!(matches!(
        reg.record_visit(1, 400, "30/09/2025", Some(4.5)),
        Err(RegistryError::InvalidRating(r)) if r == 4.5
    ));
    let visit = reg.record_visit(1, 400, "30/09/2025", Some(4.0)).unwrap();
    assert_eq!(visit.rating(), Some(4));
    assert!(matches!(
        reg.record_visit(1, 400, "01-10-2025", None),
        Err(RegistryError::InvalidDate(_))
    ));
    assert_eq!(reg.poi_visit_count(400), 1);
}

#[test]
fn test_attribute_management_flow() {
    let mut reg = Registry::new();
    reg.add_type("museum", ["tickets"]).unwrap();
    reg.add_poi(
        900,
        "City Museum",
        "museum",
        10,
        10,
        values(&[("tickets", AttrValue::from(12_i64))]),
    )
    .unwrap();
    reg.add_poi(
        901,
        "Art Hall",
        "museum",
        20,
        20,
        values(&[("tickets", AttrValue::from(8_i64))]),
    )
    .unwrap();

    reg.add_attribute_to_type("museum", "open").unwrap();
    reg.set_poi_value(901, "open", "10:00-18:00").unwrap();
    assert!(reg.delete_attribute_from_type("museum", "tickets"));

    let rows = reg.list_pois_of_type_with_values("museum");
    let summary: Vec<_> = rows
        .iter()
        .map(|(p, vals)| (p.name(), vals.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("City Museum", vec![("open", &AttrValue::Absent)]),
            (
                "Art Hall",
                vec![("open", &AttrValue::Text("10:00-18:00".into()))]
            ),
        ]
    );
}

#[test]
fn test_seed_file_then_queries() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "types": [
                {{"name": "museum", "attributes": ["tickets"]}},
                {{"name": "park", "attributes": []}}
            ],
            "pois": [
                {{"id": 1, "name": "City", "type": "museum", "x": 10, "y": 10, "values": {{"tickets": 12}}}},
                {{"id": 2, "name": "Green", "type": "park", "x": 13, "y": 14}}
            ],
            "visitors": [{{"id": 7, "name": "Sam", "nationality": "GE"}}],
            "visits": [
                {{"visitor_id": 7, "poi_id": 1, "date": "01/10/2025", "rating": 7}},
                {{"visitor_id": 7, "poi_id": 2, "date": "02/10/2025"}}
            ]
        }}"#
    )
    .unwrap();

    let doc = SeedDocument::from_json_file(file.path()).unwrap();
    let mut reg = Registry::new();
    load_seed(&mut reg, &doc).unwrap();

    let pair = reg.closest_pair_pois().unwrap();
    assert_eq!(pair.distance, 5.0);

    let coverage = reg.visitors_meeting_coverage(2, 2).unwrap();
    assert_eq!(coverage.len(), 1);
    assert_eq!(coverage[0].visitor.name(), "Sam");
}
