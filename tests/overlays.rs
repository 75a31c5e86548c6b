use linegraph::axis::AxisScaler;
use linegraph::config::GraphConfig;
use linegraph::context::RenderContext;
use linegraph::models::{AxisSide, ColumnAggregate, GraphType, SeriesSpec};
use linegraph::overlay::{PercentileCalculator, TRIGGER_LIMIT, TriggerOverlayCalculator, nearest_rank};
use linegraph::resample::SeriesResampler;
use linegraph::source::Threshold;
use linegraph::theme::{GraphTheme, Rgba};
use linegraph::MemorySource;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn threshold(expression: &str, priority: u8) -> Threshold {
    Threshold {
        expression: expression.to_string(),
        priority,
        description: format!("p{priority}"),
    }
}

fn one_to_ten(ctx: &RenderContext) -> linegraph::resample::SeriesData {
    let cols = (0..10)
        .map(|i| {
            let v = Decimal::from(i + 1);
            ColumnAggregate { column: i, count: 1, min: v, max: v, avg: v, clock: Decimal::from(i as i64) }
        })
        .collect();
    SeriesResampler::new(ctx).resample(cols)
}

#[test]
fn ninetieth_percentile_of_one_to_ten() {
    let values: Vec<Decimal> = (1..=10).map(Decimal::from).collect();
    assert_eq!(nearest_rank(&values, dec!(90)), Some(dec!(9)));
    assert_eq!(nearest_rank(&values, dec!(0)), None);

    let ctx = RenderContext::for_plot(GraphType::Normal, 0, 10, 10, 100);
    let mut config = GraphConfig {
        series: vec![SeriesSpec::new("a", Rgba::rgb(0, 0, 0))],
        ..GraphConfig::default()
    };
    config.percentile.left = dec!(90);
    let data = vec![one_to_ten(&ctx)];
    let p = PercentileCalculator::new(&config).compute(&data);
    assert_eq!(p.len(), 1);
    assert_eq!((p[0].side, p[0].value), (AxisSide::Left, dec!(9)));

    config.graph_type = GraphType::Stacked;
    assert!(PercentileCalculator::new(&config).compute(&data).is_empty());
}

#[test]
fn trigger_selection_is_capped_and_ordered_by_severity() {
    let mut source = MemorySource::new();
    for (expr, prio) in [("{1}>50", 4), ("{1}>5", 1), ("{1}>garbage", 2), ("{1}<2", 3), ("{1}>7", 5)] {
        source.push_threshold("cpu", threshold(expr, prio));
    }
    let config = GraphConfig {
        series: vec![SeriesSpec::new("cpu", Rgba::rgb(0, 0, 0))],
        ..GraphConfig::default()
    };
    let picked = TriggerOverlayCalculator::new(&config).select(&source).unwrap();

    assert_eq!(picked.len(), TRIGGER_LIMIT);
    let severities: Vec<u8> = picked.iter().map(|c| c.severity).collect();
    assert_eq!(severities, vec![1, 3, 4]);
    assert_eq!(picked[0].description, "Trigger: p1");
    assert_eq!(picked[0].constant, "[> 5]");

    let hidden = GraphConfig { show_triggers: false, ..config };
    assert!(TriggerOverlayCalculator::new(&hidden).select(&source).unwrap().is_empty());
}

#[test]
fn triggers_outside_the_axis_are_not_drawn() {
    let ctx = RenderContext::for_plot(GraphType::Normal, 0, 10, 10, 100);
    let mut source = MemorySource::new();
    source.push_threshold("a", threshold("{1}>5", 2));
    source.push_threshold("a", threshold("{1}>1K", 3));
    let config = GraphConfig {
        series: vec![SeriesSpec::new("a", Rgba::rgb(0, 0, 0))],
        ..GraphConfig::default()
    };
    let data = vec![one_to_ten(&ctx)];
    let axes = AxisScaler::new(&ctx, &config).scale(&data, &source).unwrap();
    let candidates = TriggerOverlayCalculator::new(&config).select(&source).unwrap();
    let placed = TriggerOverlayCalculator::place(&candidates, &axes, &GraphTheme::default());

    assert_eq!(placed.len(), 2);
    assert!(!placed[0].skipdraw);
    assert_eq!(placed[0].y_px, axes.left.as_ref().unwrap().value_to_y(dec!(5)));
    assert_eq!(placed[1].value, dec!(1024));
    assert!(placed[1].skipdraw);
}
