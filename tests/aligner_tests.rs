// Period overlay and difference alignment tests

mod common;

use perfwatch::analysis::{AlignmentStrategy, difference, difference_with, overlay};

#[test]
fn test_overlay_shifts_both_periods_to_zero() {
    let p1 = common::period("Yesterday", 1_000, &[1.0, 2.0]);
    let p2 = common::period("Today", 90_000, &[3.0, 4.0, 5.0]);
    let o = overlay(&p1, &p2);

    let offsets1: Vec<i64> = o.period1.iter().map(|p| p.offset_ms).collect();
    let offsets2: Vec<i64> = o.period2.iter().map(|p| p.offset_ms).collect();
    assert_eq!(offsets1, vec![0, 1_000]);
    assert_eq!(offsets2, vec![0, 1_000, 2_000]);
    assert_eq!(o.axis_end_ms, 3_000);
}

#[test]
fn test_difference_pads_shorter_period_with_zero() {
    let p1 = common::period("a", 0, &[10.0, 20.0]);
    let p2 = common::period("b", 50_000, &[11.0, 22.0, 33.0, 44.0]);
    let d = difference(&p1, &p2);

    assert_eq!(d.len(), 4);
    let values: Vec<f64> = d.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![1.0, 2.0, 33.0, 44.0]);
    // offsets past period1's samples fall back to 0
    assert_eq!(d[1].offset_ms, 1_000);
    assert_eq!(d[2].offset_ms, 0);
    assert_eq!(d[3].offset_ms, 0);
}

#[test]
fn test_difference_longer_first_period() {
    let p1 = common::period("a", 0, &[5.0, 5.0, 5.0]);
    let p2 = common::period("b", 0, &[6.0]);
    let values: Vec<f64> = difference(&p1, &p2).iter().map(|p| p.value).collect();
    assert_eq!(values, vec![1.0, -5.0, -5.0]);
}

#[test]
fn test_difference_of_empty_periods() {
    let p1 = common::period("a", 0, &[]);
    let p2 = common::period("b", 0, &[]);
    assert!(difference(&p1, &p2).is_empty());
    assert!(difference_with(&p1, &p2, AlignmentStrategy::TimeInterpolated).is_empty());
}

#[test]
fn test_time_interpolated_difference() {
    let p1 = common::period_at("a", 0, 3_000, &[(0, 10.0), (1_000, 10.0), (2_000, 10.0)]);
    let p2 = common::period_at("b", 100_000, 103_000, &[(100_000, 10.0), (102_000, 30.0)]);
    let d = difference_with(&p1, &p2, AlignmentStrategy::TimeInterpolated);

    assert_eq!(d.len(), 3);
    let values: Vec<f64> = d.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![0.0, 10.0, 20.0]);
}

#[test]
fn test_time_interpolated_with_empty_first_period() {
    let p1 = common::period("a", 0, &[]);
    let p2 = common::period("b", 5_000, &[1.0, 2.0]);
    let d = difference_with(&p1, &p2, AlignmentStrategy::TimeInterpolated);
    let values: Vec<f64> = d.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![1.0, 2.0]);
}

#[test]
fn test_positional_is_default_strategy() {
    assert_eq!(AlignmentStrategy::default(), AlignmentStrategy::Positional);
    let p1 = common::period("a", 0, &[1.0]);
    let p2 = common::period("b", 0, &[1.0, 2.0]);
    assert_eq!(
        difference_with(&p1, &p2, AlignmentStrategy::default()),
        difference(&p1, &p2)
    );
}
