// Summary statistics tests

mod common;

use perfwatch::analysis::{summarize, summarize_values};
use perfwatch::models::Sample;

#[test]
fn test_summarize_empty_has_zero_count() {
    let s = summarize(&[]);
    assert_eq!(s.count(), 0);
    assert!(s.is_empty());
    assert_eq!(s.min(), None);
    assert_eq!(s.max(), None);
    assert_eq!(s.avg(), None);
}

#[test]
fn test_summarize_three_values() {
    let samples = [
        Sample::new(0, 10.0),
        Sample::new(1000, 20.0),
        Sample::new(2000, 30.0),
    ];
    let s = summarize(&samples);
    assert_eq!(s.count(), 3);
    assert_eq!(s.min(), Some(10.0));
    assert_eq!(s.max(), Some(30.0));
    assert_eq!(s.avg(), Some(20.0));
}

#[test]
fn test_summarize_single_sample() {
    let s = summarize(&[Sample::new(5, -4.5)]);
    assert_eq!(s.count(), 1);
    assert_eq!(s.min(), Some(-4.5));
    assert_eq!(s.max(), Some(-4.5));
    assert_eq!(s.avg(), Some(-4.5));
}

#[test]
fn test_summarize_unordered_values() {
    let s = summarize_values(&[7.0, 1.0, 9.0, 3.0]);
    assert_eq!(s.min(), Some(1.0));
    assert_eq!(s.max(), Some(9.0));
    assert_eq!(s.avg(), Some(5.0));
    assert_eq!(s.count(), 4);
}

#[test]
fn test_summarize_values_empty() {
    assert!(summarize_values(&[]).is_empty());
}

#[test]
fn test_period_carries_its_summary() {
    let p = common::period("Today", 1_000, &[2.0, 4.0, 6.0]);
    assert_eq!(p.summary().count(), 3);
    assert_eq!(p.summary().avg(), Some(4.0));
    assert_eq!(p.duration_ms(), 3_000);
    assert_eq!(p.name(), "Today");
    assert_eq!(p.tag(), None);
    assert_eq!(p.with_tag("blue").tag(), Some("blue"));
}

#[test]
fn test_summarize_is_idempotent() {
    let samples: Vec<Sample> = [0.1, 0.7, 3.3, -2.25, 1e-3]
        .iter()
        .enumerate()
        .map(|(i, &v)| Sample::new(i as i64 * 1000, v))
        .collect();
    let a = summarize(&samples);
    let b = summarize(&samples);
    assert_eq!(a.count(), b.count());
    for (x, y) in [(a.min(), b.min()), (a.max(), b.max()), (a.avg(), b.avg())] {
        assert_eq!(x.map(f64::to_bits), y.map(f64::to_bits));
    }
}
