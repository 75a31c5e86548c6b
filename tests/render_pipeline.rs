use std::fs;

use linegraph::render::svg::{render_svg, write_svg};
use linegraph::config::AxisBounds;
use linegraph::render::{Layer, Primitive};
use linegraph::source::Threshold;
use linegraph::storage::{Scene, load_scene, save_rendered_json, save_scene};
use linegraph::{
    DrawKind, GraphConfig, GraphError, GraphType, MemorySource, NoThresholds, Rgba, SeriesSpec, render,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const FROM: i64 = 1_704_067_200; // 2024-01-01 00:00 UTC, a Monday

fn cpu_source() -> MemorySource {
    let mut source = MemorySource::new();
    for i in 0..60 {
        source.push_sample("cpu", FROM + i * 60, Decimal::from(i));
    }
    source
}

fn cpu_config() -> GraphConfig {
    GraphConfig {
        from: Some(FROM),
        period: 3600,
        title: Some("CPU load".to_string()),
        series: vec![SeriesSpec::new("cpu", Rgba::rgb(0, 160, 0)).with_units("%")],
        ..GraphConfig::default()
    }
}

#[test]
fn layers_come_out_back_to_front() {
    let graph = render(&cpu_config(), &cpu_source(), &NoThresholds).unwrap();
    let order: Vec<Layer> = graph.layers.iter().map(|l| l.layer).collect();
    assert_eq!(
        order,
        vec![
            Layer::Background,
            Layer::WorkPeriod,
            Layer::TimeGrid,
            Layer::AxisScale,
            Layer::Series,
            Layer::AxisLabels,
            Layer::Overlays,
            Layer::Legend,
            Layer::Watermark,
        ]
    );
    assert_eq!((graph.width, graph.height), (900, 300));
    assert_eq!(graph.window.pixel_width, 784);

    let series = graph.layer(Layer::Series);
    assert!(series.len() >= 59);
    assert!(series.iter().all(|p| matches!(p, Primitive::Line { .. })));

    let title_drawn = graph
        .layer(Layer::Background)
        .iter()
        .any(|p| matches!(p, Primitive::Text { text, .. } if text == "CPU load"));
    assert!(title_drawn);
    assert!(!graph.layer(Layer::AxisLabels).is_empty());
    assert!(graph.layer(Layer::Watermark).is_empty());
    assert_eq!(graph.primitives().count(), graph.layers.iter().map(|l| l.primitives.len()).sum::<usize>());
}

#[test]
fn every_primitive_stays_inside_the_image() {
    let graph = render(&cpu_config(), &cpu_source(), &NoThresholds).unwrap();
    let (w, h) = (graph.width as i32, graph.height as i32);
    for p in graph.layer(Layer::Series) {
        if let Primitive::Line { from, to, .. } = p {
            for pt in [from, to] {
                assert!((0..w).contains(&pt.x) && (0..h).contains(&pt.y), "{p:?}");
            }
        }
    }
}

#[test]
fn trigger_rows_and_lines_are_drawn() {
    let mut source = cpu_source();
    source.push_threshold(
        "cpu",
        Threshold { expression: "{1}>50".to_string(), priority: 4, description: "High CPU".to_string() },
    );
    let graph = render(&cpu_config(), &source, &source).unwrap();

    assert_eq!(graph.triggers.len(), 1);
    assert!(!graph.triggers[0].skipdraw);
    // Two rows, each a solid line under a dashed one.
    assert_eq!(graph.layer(Layer::Overlays).len(), 4);
    let legend_mentions = graph
        .layer(Layer::Legend)
        .iter()
        .any(|p| matches!(p, Primitive::Text { text, .. } if text == "Trigger: High CPU"));
    assert!(legend_mentions);
}

#[test]
fn hidden_legend_draws_no_legend_rows() {
    let config = GraphConfig { show_legend: false, ..cpu_config() };
    let graph = render(&config, &cpu_source(), &NoThresholds).unwrap();
    assert!(graph.layer(Layer::Legend).is_empty());
}

#[test]
fn non_positive_period_is_rejected() {
    let config = GraphConfig { period: 0, ..cpu_config() };
    let err = render(&config, &cpu_source(), &NoThresholds).unwrap_err();
    assert!(matches!(err, GraphError::Config(_)));
}

#[test]
fn svg_and_dump_files_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let svg = dir.path().join("cpu.svg");
    let dump = dir.path().join("cpu.json");

    let graph = render_svg(&cpu_config(), &cpu_source(), &NoThresholds, &svg).unwrap();
    save_rendered_json(&graph, &dump).unwrap();

    let text = fs::read_to_string(&svg).unwrap();
    assert!(text.contains("<svg"));
    assert!(text.contains("CPU load"));
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&dump).unwrap()).unwrap();
    assert_eq!(json["layers"][0]["layer"], "background");
    assert_eq!(json["layers"][0]["primitives"][0]["kind"], "rect");

    // Replaying the same graph again produces the same file.
    let again = dir.path().join("again.svg");
    write_svg(&graph, &again).unwrap();
    assert_eq!(fs::read_to_string(&again).unwrap(), text);
}

#[test]
fn scenes_render_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    let mut scene = Scene { graph: cpu_config(), ..Scene::default() };
    scene.items.insert(
        "cpu".into(),
        linegraph::source::ItemHistory {
            samples: (0..60).map(|i| (FROM + i * 60, Decimal::from(i))).collect(),
            thresholds: Vec::new(),
        },
    );
    save_scene(&scene, &path).unwrap();

    let (config, source) = load_scene(&path).unwrap().into_parts();
    let from_disk = render(&config, &source, &source).unwrap();
    let in_memory = render(&cpu_config(), &cpu_source(), &NoThresholds).unwrap();
    assert_eq!(from_disk.layers, in_memory.layers);
}

/// 20 minutes at 10, then 40 minutes at 100, against a fixed 0..50 axis.
fn spiking_render(kind: DrawKind) -> (linegraph::RenderedGraph, i32, i32) {
    let mut source = MemorySource::new();
    for i in 0..60 {
        let v = if i < 20 { dec!(10) } else { dec!(100) };
        source.push_sample("cpu", FROM + i * 60, v);
    }
    let mut config = GraphConfig {
        series: vec![SeriesSpec::new("cpu", Rgba::rgb(0, 160, 0)).with_draw_kind(kind)],
        ..cpu_config()
    };
    config.y_axis.left = AxisBounds::fixed(Some(dec!(0)), Some(dec!(50)));
    let graph = render(&config, &source, &NoThresholds).unwrap();
    let left = graph.axes.left.clone().unwrap();
    assert_eq!((left.min, left.max), (dec!(0), dec!(50)));
    let (top, bottom) = (left.value_to_y(left.max), left.value_to_y(left.min));
    (graph, top, bottom)
}

#[test]
fn lines_above_a_fixed_max_are_dropped() {
    let (graph, top, bottom) = spiking_render(DrawKind::Line);
    let series = graph.layer(Layer::Series);

    // 19 segments at 10 plus the one rising out of the plot.
    assert_eq!(series.len(), 20);
    for p in series {
        let Primitive::Line { from, to, .. } = p else { panic!("unexpected {p:?}") };
        assert!((top..=bottom).contains(&from.y) && (top..=bottom).contains(&to.y), "{p:?}");
    }
    assert!(series.iter().any(|p| matches!(p, Primitive::Line { from, to, .. } if from.y == top || to.y == top)));
}

#[test]
fn regions_above_a_fixed_max_are_clamped() {
    let (graph, top, bottom) = spiking_render(DrawKind::FilledRegion);
    let series = graph.layer(Layer::Series);

    assert!(series.len() >= 59);
    let mut at_top = 0;
    for p in series {
        let Primitive::Polygon { points, .. } = p else { panic!("unexpected {p:?}") };
        assert!(points.iter().all(|pt| (top..=bottom).contains(&pt.y)), "{p:?}");
        if points.iter().all(|pt| pt.y == top || pt.y == bottom) && points.iter().any(|pt| pt.y == top) {
            at_top += 1;
        }
    }
    // Every segment after the spike is a full-height band.
    assert!(at_top >= 39);
}

#[test]
fn stacked_series_draw_on_top_of_each_other() {
    let mut source = MemorySource::new();
    for i in 0..60 {
        source.push_sample("a", FROM + i * 60, dec!(10));
        source.push_sample("b", FROM + i * 60, dec!(5));
    }
    let config = GraphConfig {
        graph_type: GraphType::Stacked,
        series: vec![
            SeriesSpec::new("a", Rgba::rgb(200, 0, 0)),
            SeriesSpec::new("b", Rgba::rgb(0, 0, 200)),
        ],
        ..cpu_config()
    };
    let graph = render(&config, &source, &NoThresholds).unwrap();
    let left = graph.axes.left.clone().unwrap();
    assert_eq!(left.min, dec!(0));
    assert!(left.max >= dec!(15));

    let (row_a, row_b) = (left.value_to_y(dec!(10)), left.value_to_y(dec!(15)));
    assert!(row_b < row_a);

    let rows = |red: u8| -> Vec<(i32, i32)> {
        graph
            .layer(Layer::Series)
            .iter()
            .filter_map(|p| match p {
                Primitive::Line { from, to, stroke } if stroke.color.r == red => Some((from.y, to.y)),
                _ => None,
            })
            .collect()
    };
    let (a, b) = (rows(200), rows(0));
    assert!(a.len() >= 59 && b.len() >= 59);
    assert!(a.iter().all(|r| *r == (row_a, row_a)));
    assert!(b.iter().all(|r| *r == (row_b, row_b)));
}
