use linegraph::context::RenderContext;
use linegraph::models::{ColumnAggregate, GraphType, SeriesSpec};
use linegraph::resample::SeriesResampler;
use linegraph::theme::Rgba;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn col(column: usize, value: Decimal, clock: i64) -> ColumnAggregate {
    ColumnAggregate {
        column,
        count: 1,
        min: value,
        max: value,
        avg: value,
        clock: Decimal::from(clock),
    }
}

#[test]
fn interior_gap_is_interpolated_and_edges_are_flat() {
    // 5 columns of 100 s each.
    let ctx = RenderContext::for_plot(GraphType::Normal, 0, 500, 5, 100);
    let data = SeriesResampler::new(&ctx).resample(vec![col(1, dec!(10), 150), col(4, dec!(20), 450)]);

    assert!(data.has_data);
    assert_eq!(data.width(), 5);
    assert_eq!(data.avg[0], dec!(10));
    assert_eq!(data.clock[0], dec!(50));
    assert_eq!(data.avg[2].round_dp(2), dec!(13.33));
    assert_eq!(data.avg[3].round_dp(2), dec!(16.67));
    assert_eq!(data.clock[2], dec!(250));
    // Filled columns stay unknown for drawing purposes.
    assert_eq!(data.count, vec![0, 1, 0, 0, 1]);
    assert_eq!(data.avg_orig, Some(dec!(15)));
}

#[test]
fn series_without_samples_is_zero_filled() {
    let ctx = RenderContext::for_plot(GraphType::Normal, 0, 500, 5, 100);
    let data = SeriesResampler::new(&ctx).resample(Vec::new());
    assert!(!data.has_data);
    assert!(data.avg.iter().all(|v| v.is_zero()));
    assert_eq!(data.avg_orig, None);
}

#[test]
fn stacked_series_are_shifted_by_their_predecessor() {
    let ctx = RenderContext::for_plot(GraphType::Stacked, 0, 500, 5, 100);
    let specs = vec![
        SeriesSpec::new("a", Rgba::rgb(200, 0, 0)),
        SeriesSpec::new("b", Rgba::rgb(0, 200, 0)),
        SeriesSpec::new("c", Rgba::rgb(0, 0, 200)),
    ];
    let series = |v: i64| (0..5).map(|i| col(i, Decimal::from(v), i as i64 * 100 + 50)).collect();
    let data = SeriesResampler::new(&ctx).run(&specs, vec![series(1), series(2), series(4)]);

    assert!(data[0].shift_avg.iter().all(|s| s.is_zero()));
    assert!(data[1].shift_avg.iter().all(|s| *s == dec!(1)));
    assert!(data[2].shift_avg.iter().all(|s| *s == dec!(3)));
}
