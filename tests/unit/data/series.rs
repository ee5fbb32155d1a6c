use super::*;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn new_rejects_length_mismatch() {
    let err = Series::new(vec![d(2020, 1, 1), d(2020, 1, 2)], vec![1.0]).unwrap_err();
    assert!(err.to_string().contains("length mismatch"));
}

#[test]
fn new_rejects_non_increasing_timestamps() {
    assert!(Series::new(vec![d(2020, 1, 2), d(2020, 1, 1)], vec![1.0, 2.0]).is_err());
    assert!(Series::new(vec![d(2020, 1, 2), d(2020, 1, 2)], vec![1.0, 2.0]).is_err());
}

#[test]
fn new_rejects_multi_year_series() {
    assert!(Series::new(vec![d(2020, 12, 31), d(2021, 1, 1)], vec![1.0, 2.0]).is_err());
}

#[test]
fn prefix_clamps_to_length() {
    let s = Series::new(vec![d(2021, 1, 1), d(2021, 1, 2)], vec![1.0, 2.0]).unwrap();
    assert_eq!(s.year(), 2021);
    assert_eq!(s.prefix(1).1, &[1.0]);
    assert_eq!(s.prefix(10).0.len(), 2);
    assert!(s.prefix(0).0.is_empty());
}

#[test]
fn day_of_year_bounds_non_leap() {
    let mut date = d(2021, 1, 1);
    let mut max = 0;
    while date.year() == 2021 {
        let doy = day_of_year(date);
        assert!((1..=365).contains(&doy));
        max = max.max(doy);
        date = date.succ_opt().unwrap();
    }
    assert_eq!(max, 365);
    assert_eq!(days_in_year(2021), 365);
}

#[test]
fn day_of_year_bounds_leap() {
    assert_eq!(day_of_year(d(2020, 1, 1)), 1);
    assert_eq!(day_of_year(d(2020, 12, 31)), 366);
    assert_eq!(days_in_year(2020), 366);
    assert_eq!(days_in_year(1900), 365);
    assert_eq!(days_in_year(2000), 366);
}
