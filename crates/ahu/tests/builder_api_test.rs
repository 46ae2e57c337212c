//! Integration tests for the FamilyBuilder API
//!
//! These tests build small catalogues end to end and check the document the
//! builder leaves behind.

use float_cmp::assert_approx_eq;

use ahu::{
    AhuError, FamilyBuilder,
    config::{AnnotationConfig, AppConfig, ExportConfig, LayoutConfig},
    host::Host,
};

const TWO_BLOCKS: &str = r#"{
    "intake": [
        {"id": "a", "category": "block", "displayIndex": 1,
         "lengthTotal": 300, "heightTotal": 100, "widthTotal": 600},
        {"id": "b", "category": "block", "displayIndex": -1,
         "lengthTotal": 400, "heightTotal": 150, "widthTotal": 600}
    ],
    "isIntakeBelow": true
}"#;

const STACKED_UNIT: &str = include_str!("../../../demos/stacked_unit.json");

const BLOCK_AND_DAMPER: &str = r#"{
    "intake": [
        {"id": "x", "category": "block", "lengthTotal": 500, "heightTotal": 150, "widthTotal": 600},
        {"id": "d", "category": "block", "lengthTotal": 200, "heightTotal": 80, "widthTotal": 600,
         "children": [
            {"id": "d1", "type": "flexibleDamper", "lengthTotal": 200, "heightTotal": 80, "widthTotal": 600}
         ]}
    ]
}"#;

/// Trimmed contents of every `<text>` node.
fn text_nodes(svg: &str) -> Vec<String> {
    svg.split("<text")
        .skip(1)
        .filter_map(|chunk| {
            let body = &chunk[chunk.find('>')? + 1..];
            let end = body.find("</text>")?;
            Some(body[..end].trim().to_string())
        })
        .collect()
}

#[test]
fn test_builder_api_exists() {
    let _builder = FamilyBuilder::default();
}

#[test]
fn test_overall_span_of_lone_chain() {
    let builder = FamilyBuilder::default();
    let catalogue = builder.parse(TWO_BLOCKS).expect("Failed to parse catalogue");
    let family = builder.build(&catalogue).expect("Failed to build family");
    let document = family.document();

    for view_name in ["Front", "Top"] {
        let view = document.view(view_name).unwrap();
        let dimensions = document.dimensions(view.id()).unwrap();
        let overall: Vec<f64> = dimensions.iter().filter_map(|d| d.value()).collect();
        assert!(
            overall.iter().any(|value| (value - 700.0).abs() < 1e-6),
            "{view_name} should carry the 700 overall span, got {overall:?}"
        );

        // The lone chain's string runs through every segment end.
        let string = dimensions
            .iter()
            .find(|d| d.references().len() == 3)
            .expect("string dimension");
        let values = string.segment_values();
        assert_approx_eq!(f64, values[0], 300.0);
        assert_approx_eq!(f64, values[1], 400.0);
    }
}

#[test]
fn test_lone_chain_is_bottom_aligned() {
    let builder = FamilyBuilder::default();
    let catalogue = builder.parse(TWO_BLOCKS).unwrap();
    let family = builder.build(&catalogue).unwrap();
    let document = family.document();
    let intake = family.layout().intake();

    let a = document.bounds(intake[0].element()).unwrap();
    let b = document.bounds(intake[1].element()).unwrap();
    assert_approx_eq!(f64, a.min().z(), b.min().z());
    assert_approx_eq!(f64, b.max().z() - a.max().z(), 50.0);
    assert_approx_eq!(f64, a.min().x(), -350.0);
    assert_approx_eq!(f64, b.max().x(), 350.0);
}

#[test]
fn test_stacked_unit_dimensions() {
    let builder = FamilyBuilder::default();
    let catalogue = builder.parse(STACKED_UNIT).expect("Failed to parse catalogue");
    let family = builder.build(&catalogue).expect("Failed to build family");
    let document = family.document();
    let front = document.view("Front").unwrap();
    let dimensions = document.dimensions(front.id()).unwrap();

    // The shared recovery segment belongs to the intake only.
    let exhaust = family.layout().exhaust();
    let exhaust_ids: Vec<String> = exhaust
        .iter()
        .map(|p| p.descriptor().id().to_string())
        .collect();
    assert_eq!(exhaust_ids, ["ex-fan", "ex-filter", "ex-valve"]);
    assert!(
        family
            .layout()
            .intake()
            .iter()
            .any(|p| p.descriptor().id() == "in-recovery")
    );

    let between = |first: usize, second: usize| {
        dimensions
            .iter()
            .filter(|d| d.line().direction().is_almost_equal(ahu::geometry::Vector3::X))
            .filter(|d| {
                let references = d.references();
                references.len() == 2
                    && references[0].element() == exhaust[first].element()
                    && references[1].element() == exhaust[second].element()
            })
            .filter_map(|d| d.value())
            .collect::<Vec<f64>>()
    };

    let overall = between(0, 2);
    assert_eq!(overall.len(), 1);
    assert_approx_eq!(f64, overall[0], 2300.0, epsilon = 1e-6);

    // The gap left where the recovery segment was skipped.
    let gap = between(0, 1);
    assert_eq!(gap.len(), 1);
    assert_approx_eq!(f64, gap[0], 1000.0, epsilon = 1e-6);

    // Touching segments get no gap dimension.
    assert!(between(1, 2).is_empty());

    for (index, length) in [(0, 700.0), (1, 450.0), (2, 150.0)] {
        let own = between(index, index);
        assert_eq!(own.len(), 1, "segment {index}");
        assert_approx_eq!(f64, own[0], length, epsilon = 1e-6);
    }

    // From the bottom of the intake recovery segment to the exhaust top.
    let vertical: Vec<f64> = dimensions
        .iter()
        .filter(|d| d.line().direction().is_almost_equal(ahu::geometry::Vector3::Z))
        .filter_map(|d| d.value())
        .collect();
    assert!(
        vertical.iter().any(|value| (value - 2050.0).abs() < 1e-6),
        "expected the 2050 cross-chain dimension, got {vertical:?}"
    );

    assert_eq!(family.summary().callouts(), 8);
}

#[test]
fn test_single_measured_segment_gets_both_heights() {
    let builder = FamilyBuilder::default();
    let catalogue = builder.parse(TWO_BLOCKS).unwrap();
    let family = builder.build(&catalogue).unwrap();
    let document = family.document();
    let front = document.view("Front").unwrap();

    // The tallest intake segment is left out, so `a` is both the largest and
    // the smallest measured height.
    let vertical: Vec<f64> = document
        .dimensions(front.id())
        .unwrap()
        .iter()
        .filter(|d| d.line().direction().is_almost_equal(ahu::geometry::Vector3::Z))
        .filter_map(|d| d.value())
        .collect();
    assert_eq!(vertical.len(), 2);
    for value in vertical {
        assert_approx_eq!(f64, value, 100.0, epsilon = 1e-6);
    }
}

#[test]
fn test_flexible_damper_is_centred() {
    let builder = FamilyBuilder::default();
    let catalogue = builder.parse(BLOCK_AND_DAMPER).unwrap();
    let family = builder.build(&catalogue).unwrap();
    let document = family.document();
    let intake = family.layout().intake();

    let block = document.bounds(intake[0].element()).unwrap();
    let damper = document.bounds(intake[1].element()).unwrap();
    assert_approx_eq!(f64, block.max().z() - damper.max().z(), 35.0);
    assert_approx_eq!(f64, damper.min().z() - block.min().z(), 35.0);

    assert_eq!(document.duct_connectors().count(), 1);
}

#[test]
fn test_damper_height_is_dimensioned_by_edges() {
    let builder = FamilyBuilder::default();
    let catalogue = builder.parse(BLOCK_AND_DAMPER).unwrap();
    let family = builder.build(&catalogue).unwrap();
    let document = family.document();
    let front = document.view("Front").unwrap();

    let edge_dimensions: Vec<f64> = document
        .dimensions(front.id())
        .unwrap()
        .iter()
        .filter(|d| {
            d.references()
                .iter()
                .all(|r| matches!(r, ahu::host::GeomRef::Edge { .. }))
        })
        .filter_map(|d| d.value())
        .collect();
    assert_eq!(edge_dimensions.len(), 1);
    assert_approx_eq!(f64, edge_dimensions[0], 80.0);
}

#[test]
fn test_sentinel_index_has_no_callout() {
    let builder = FamilyBuilder::default();
    let catalogue = builder.parse(TWO_BLOCKS).unwrap();
    let family = builder.build(&catalogue).unwrap();
    let document = family.document();
    let front = document.view("Front").unwrap();

    let notes: Vec<&str> = document.text_notes(front.id()).map(|n| n.text()).collect();
    assert_eq!(notes, ["1"]);
    assert_eq!(document.filled_regions(front.id()).count(), 1);
    assert_eq!(family.summary().callouts(), 1);
}

#[test]
fn test_build_is_idempotent() {
    let builder = FamilyBuilder::default();
    let catalogue = builder.parse(BLOCK_AND_DAMPER).unwrap();
    let first = builder.build(&catalogue).unwrap();
    let second = builder.build(&catalogue).unwrap();

    let placements = |family: &ahu::Family| {
        family
            .layout()
            .elements()
            .map(|p| {
                let bounds = family.document().bounds(p.element()).unwrap();
                (p.start_x(), bounds.min().z(), bounds.max().z())
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(placements(&first), placements(&second));
    assert_eq!(first.summary(), second.summary());
}

#[test]
fn test_missing_view_aborts_annotation() {
    let config = AppConfig::new(
        LayoutConfig::default(),
        AnnotationConfig::default().with_view_names("Elevation 1", "Top"),
        ExportConfig::default(),
    );
    let builder = FamilyBuilder::new(config);
    let catalogue = builder.parse(TWO_BLOCKS).unwrap();

    let result = builder.build(&catalogue);
    assert!(matches!(result, Err(AhuError::Config(_))));
}

#[test]
fn test_parse_invalid_catalogue_returns_error() {
    let builder = FamilyBuilder::default();
    let result = builder.parse(r#"{"intake": [{"id": "a", "heightTotal": 0, "widthTotal": 10}]}"#);
    assert!(matches!(result, Err(AhuError::Catalogue { .. })));
}

#[test]
fn test_render_views() {
    let builder = FamilyBuilder::default();
    let catalogue = builder.parse(TWO_BLOCKS).unwrap();
    let family = builder.build(&catalogue).unwrap();

    for view_name in ["Front", "Top"] {
        let svg = builder
            .render_svg(&family, view_name)
            .expect("Failed to render view");
        assert!(svg.contains("<svg"), "Output should contain SVG tag");
        assert!(svg.contains("</svg>"), "Output should be complete SVG");
        assert!(
            text_nodes(&svg).iter().any(|label| label == "700"),
            "Overall span should be labelled"
        );
    }

    let result = builder.render_svg(&family, "Side");
    assert!(matches!(result, Err(AhuError::Config(_))));
}
