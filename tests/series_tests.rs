mod common;

use common::sample;
use opsdeck::models::SeriesWindow;

#[test]
fn push_appends_in_order_below_capacity() {
    let mut window = SeriesWindow::new(5);
    for t in 0..3 {
        window.push(sample(t, &[t as f64]));
    }
    let snap = window.snapshot();
    assert_eq!(snap.len(), 3);
    assert_eq!(
        snap.iter().map(|s| s.timestamp).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn push_evicts_oldest_at_capacity() {
    let mut window = SeriesWindow::new(5);
    for t in 0..8 {
        window.push(sample(t, &[t as f64]));
    }
    assert_eq!(window.len(), 5);
    let snap = window.snapshot();
    assert_eq!(
        snap.iter().map(|s| s.timestamp).collect::<Vec<_>>(),
        vec![3, 4, 5, 6, 7]
    );
}

#[test]
fn snapshot_is_an_owned_copy() {
    let mut window = SeriesWindow::new(3);
    window.push(sample(1, &[1.0]));
    let snap = window.snapshot();
    window.push(sample(2, &[2.0]));
    window.push(sample(3, &[3.0]));
    window.push(sample(4, &[4.0]));
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].timestamp, 1);
}

#[test]
fn derive_matches_window_length() {
    let mut window = SeriesWindow::new(4);
    window.push(sample(1, &[1.0, 2.0]));
    window.push(sample(2, &[3.0, 4.0]));
    let sums = window.derive(|v| v.iter().sum());
    assert_eq!(sums, vec![3.0, 7.0]);
}

#[test]
fn derive_on_empty_window_is_empty() {
    let window = SeriesWindow::new(4);
    assert!(window.is_empty());
    assert!(window.derive(|v| v.iter().sum()).is_empty());
}

#[test]
fn set_labels_ignores_empty_schema() {
    let mut window = SeriesWindow::new(2);
    window.set_labels(vec!["user".into(), "system".into()]);
    window.set_labels(Vec::new());
    assert_eq!(window.labels(), ["user".to_string(), "system".to_string()]);
}

#[test]
#[should_panic(expected = "capacity must be positive")]
fn zero_capacity_panics() {
    let _ = SeriesWindow::new(0);
}
