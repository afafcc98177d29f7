use poi_registry::{AttrValue, AttrValues, Registry, SeedDocument, load_seed};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Seed a registry the way a config loader would
    let seed = SeedDocument::from_json(
        r#"{
            "types": [
                {"name": "Museum", "attributes": ["tickets"]},
                {"name": "park", "attributes": ["benches"]}
            ],
            "pois": [
                {"id": 1, "name": "City Museum", "type": "museum", "x": 10, "y": 10, "values": {"tickets": 12}},
                {"id": 2, "name": "Art Hall", "type": "museum", "x": 13, "y": 14},
                {"id": 3, "name": "Oak Park", "type": "park", "x": 400, "y": 250, "values": {"benches": 5}}
            ],
            "visitors": [
                {"id": 1, "name": "Ana", "nationality": "BG"},
                {"id": 2, "name": "Ben", "nationality": "RO"}
            ],
            "visits": [
                {"visitor_id": 1, "poi_id": 1, "date": "01/10/2025", "rating": 8},
                {"visitor_id": 1, "poi_id": 3, "date": "02/10/2025"},
                {"visitor_id": 2, "poi_id": 1, "date": "03/10/2025"},
                {"visitor_id": 2, "poi_id": 1, "date": "04/10/2025", "rating": 6}
            ]
        }"#,
    )?;

    let mut reg = Registry::new();
    load_seed(&mut reg, &seed)?;
    println!("Loaded: {:?}", reg.stats());

    // Add a POI directly
    let mut values = AttrValues::new();
    values.insert("benches".to_string(), AttrValue::from(3_i64));
    reg.add_poi(4, "Pine Park", "park", 12, 10, values)?;

    println!("\nNearest 3 to (10, 10):");
    for (poi, dist) in reg.nearest_k(10, 10, 3)? {
        println!("  {} ({}) dist={:.3}", poi.name(), poi.id(), dist);
    }

    println!("\nWithin radius 5 of (10, 10):");
    for (poi, dist) in reg.within_radius(10, 10, 5.0)? {
        println!("  {} dist={:.3}", poi.name(), dist);
    }

    if let Some(pair) = reg.closest_pair_pois() {
        println!(
            "\nClosest pair: {} - {} ({:.3})",
            pair.first.name(),
            pair.second.name(),
            pair.distance
        );
    }

    println!("\nCounts per type:");
    for (name, count) in reg.counts_per_type() {
        println!("  {}: {}", name, count);
    }

    println!("\nTop POIs by distinct visitors:");
    for (poi, count) in reg.top_k_pois_by_distinct_visitors(3) {
        println!("  {} {} distinct visitors", poi.name(), count);
    }

    println!("\nVisitors of City Museum (distinct):");
    for row in reg.list_visitors_for_poi(1, true)? {
        println!("  {} {} first visit {}", row.visitor.id(), row.visitor.name(), row.date);
    }

    reg.rename_attribute_on_type("park", "benches", "seats")?;
    println!("\nParks after attribute rename:");
    for (poi, values) in reg.list_pois_of_type_with_values("park") {
        println!("  {} {:?}", poi.name(), values);
    }

    Ok(())
}
