// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A company asset tree: load, scroll, collapse and search.
//!
//! This example shows how to combine:
//! - `canopy_forest` to load a company's assets and locations through a
//!   `CompanyDataSource` and cache the built forest,
//! - `canopy_tree_view` to realize only the rows a small viewport needs,
//!   toggle subtrees and run a debounced search.
//!
//! Run:
//! - `cargo run -p canopy_demos --example asset_tree`
//! - `RUST_LOG=debug cargo run -p canopy_demos --example asset_tree` to see the
//!   cache, walker and search events.

use canopy_forest::{Asset, CompanyDataSource, CompanyId, ForestCache, Location};
use canopy_tree_view::{TreeView, TreeViewConfig};
use tracing_subscriber::EnvFilter;

const LOCATIONS: &str = r#"[
    { "id": "plant", "name": "Production plant" },
    { "id": "line-1", "name": "Line 1", "parentId": "plant" },
    { "id": "line-2", "name": "Line 2", "parentId": "plant" },
    { "id": "yard", "name": "Storage yard" }
]"#;

const ASSETS: &str = r#"[
    { "id": "motor-1", "name": "Motor H12D", "locationId": "line-1" },
    { "id": "motor-1-rt", "name": "Motor RT coupling", "parentId": "motor-1",
      "sensorType": "vibration", "status": "operating", "sensorId": "S-1", "gatewayId": "G-1" },
    { "id": "pump-1", "name": "Pump P-100", "locationId": "line-2" },
    { "id": "pump-1-seal", "name": "Pump seal sensor", "parentId": "pump-1",
      "sensorType": "energy", "status": "alert", "sensorId": "S-2", "gatewayId": "G-1" },
    { "id": "fan-1", "name": "Fan exhaust", "locationId": "yard" },
    { "id": "loose", "name": "Unassigned motor" }
]"#;

#[derive(Debug, thiserror::Error)]
#[error("fixture is not valid JSON: {0}")]
struct FixtureError(#[from] serde_json::Error);

/// Serves the same embedded JSON for every company.
struct Fixtures;

impl CompanyDataSource for Fixtures {
    type Error = FixtureError;

    fn assets(&self, _company: &CompanyId) -> Result<Vec<Asset>, FixtureError> {
        Ok(serde_json::from_str(ASSETS)?)
    }

    fn locations(&self, _company: &CompanyId) -> Result<Vec<Location>, FixtureError> {
        Ok(serde_json::from_str(LOCATIONS)?)
    }
}

fn print_rows(title: &str, view: &mut TreeView) {
    println!("== {title}");
    let rows = view.render().to_vec();
    for row in &rows {
        let marker = match (row.has_children(), row.is_closed()) {
            (true, true) => "+",
            (true, false) => "-",
            (false, _) => " ",
        };
        let hit = if row.is_match() { " *" } else { "" };
        println!(
            "{:>3} {:indent$}{marker} {}{hit}",
            row.row,
            "",
            view.label(row),
            indent = row.depth as usize * 2,
        );
    }
    println!("   ({} rows, spacer {}px)", rows.len(), view.spacer_extent());
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut cache = ForestCache::new();
    let company = CompanyId::new("acme");
    let forest = cache.load(&company, &Fixtures);

    // Four rows tall: four visible plus two overscan.
    let config = TreeViewConfig::default().with_viewport_height(96.0);
    let Ok(mut view) = TreeView::new(forest, config) else {
        eprintln!("invalid view configuration");
        return;
    };
    print_rows("top", &mut view);

    view.on_scroll(6.0 * config.row_height);
    print_rows("scrolled to row 6", &mut view);

    view.on_scroll(0.0);
    view.toggle_id("plant");
    print_rows("plant collapsed", &mut view);
    view.toggle_id("plant");

    // Typing "m", "mo", "motor" quickly is applied once.
    view.on_search_input("m", 0);
    view.on_search_input("mo", 60);
    view.on_search_input("motor", 120);
    let applied = view.tick(200);
    println!("search applied at 200ms: {applied}, pending: {}", view.search_pending());
    if view.tick(120 + config.search_debounce_ms) {
        print_rows("search: motor", &mut view);
    }

    // Reloading unchanged data reuses the cached forest.
    let again = cache.load(&company, &Fixtures);
    view.set_forest(again);
    view.set_query("");
    print_rows("reloaded", &mut view);
}
