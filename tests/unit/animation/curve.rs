use super::*;

fn series(n: usize) -> Series {
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    let x: Vec<NaiveDate> = start.iter_days().take(n).collect();
    let y: Vec<f64> = (0..n).map(|i| i as f64 * 0.1).collect();
    Series::new(x, y).unwrap()
}

fn curve(n: usize, segments: u32) -> Curve {
    Curve::new(series(n), CurveParams::new(segments)).unwrap()
}

#[test]
fn fully_revealed_flips_once_and_stays() {
    let mut c = curve(100, 5);
    let mut flags = Vec::new();
    for _ in 0..12 {
        let before = c.state().reveal_step;
        c.advance();
        flags.push((before, c.is_fully_revealed()));
    }
    for (step, revealed) in flags {
        assert_eq!(revealed, step >= 5, "step {step}");
    }
}

#[test]
fn reveal_prefix_grows_and_completes_at_settle() {
    let mut c = curve(365, 7);
    let mut last = 0;
    loop {
        let phase = c.phase();
        let t = c.advance();
        assert!(t.len() >= last);
        last = t.len();
        match phase {
            CurvePhase::Revealing => assert!(t.len() < 365),
            CurvePhase::Settled => {
                assert_eq!(t.len(), 365);
                break;
            }
        }
    }
}

#[test]
fn reveal_prefix_lengths_match_rounding() {
    // 10 points over 4 segments: 2.5 -> 2, 5.0 -> 5, 7.5 -> 8, then full.
    let mut c = curve(10, 4);
    let lens: Vec<usize> = (0..4).map(|_| c.advance().len()).collect();
    assert_eq!(lens, vec![2, 5, 8, 10]);
}

#[test]
fn first_step_can_be_empty() {
    let mut c = curve(3, 10);
    let t = c.advance();
    assert!(t.is_empty());
    assert_eq!(t.last_date(), None);
    assert_eq!(t.points().count(), 0);
}

#[test]
fn alpha_is_base_while_revealing_and_at_first_settle() {
    let params = CurveParams {
        base_alpha: 0.8,
        ..CurveParams::new(3)
    };
    let mut c = Curve::new(series(30), params).unwrap();
    assert_eq!(c.advance().alpha, 0.8);
    assert_eq!(c.advance().alpha, 0.8);
    let settled = c.advance();
    assert!(c.is_fully_revealed());
    assert_eq!(settled.alpha, 0.8);
}

#[test]
fn settled_alpha_decays_exponentially_and_never_increases() {
    let mut c = curve(30, 2);
    c.advance();
    let mut prev = c.advance().alpha;
    assert_eq!(prev, 1.0);

    let second = c.advance().alpha;
    assert!((second - (-1.0f64 / 11.0).exp()).abs() < 1e-12);
    prev = prev.min(second);

    for _ in 0..100 {
        let a = c.advance().alpha;
        assert!(a <= prev);
        prev = a;
    }
}

#[test]
fn alpha_stops_just_below_the_floor_without_clamping() {
    let mut c = curve(30, 1);
    let mut alphas = Vec::new();
    for _ in 0..60 {
        alphas.push(c.advance().alpha);
    }
    let last = *alphas.last().unwrap();
    assert!(last < DEFAULT_ALPHA_FLOOR);
    assert!(last > 0.0);
    // Once below the floor the value is frozen.
    assert_eq!(alphas[40], alphas[59]);
    // The first value under the floor is the only one under it that was recomputed.
    let first_under = alphas.iter().position(|a| *a < DEFAULT_ALPHA_FLOOR).unwrap();
    assert!(alphas[first_under - 1] > DEFAULT_ALPHA_FLOOR);
}

#[test]
fn settled_trace_returns_full_series_every_time() {
    let mut c = curve(50, 2);
    for _ in 0..2 {
        c.advance();
    }
    for _ in 0..5 {
        let t = c.advance();
        assert_eq!(t.len(), 50);
        assert_eq!(t.values().len(), 50);
    }
}

#[test]
fn points_use_day_of_year() {
    let mut c = curve(5, 1);
    let pts: Vec<(f64, f64)> = c.advance().points().collect();
    assert_eq!(pts[0], (1.0, 0.0));
    assert_eq!(pts[4].0, 5.0);
}

#[test]
fn active_frames_counts_reveal_steps_plus_settle() {
    assert_eq!(curve(10, 3).active_frames(), 3);
    assert_eq!(curve(10, 1).active_frames(), 1);

    let mut c = curve(10, 3);
    let mut frames = 0;
    while !c.is_fully_revealed() {
        c.advance();
        frames += 1;
    }
    assert_eq!(frames, 3);
    assert_eq!(c.active_frames(), 0);
}

#[test]
fn params_validation() {
    assert!(CurveParams::new(0).validate().is_err());
    assert!(
        CurveParams {
            base_alpha: 0.0,
            ..CurveParams::new(3)
        }
        .validate()
        .is_err()
    );
    assert!(
        CurveParams {
            decay_rate: 0.0,
            ..CurveParams::new(3)
        }
        .validate()
        .is_err()
    );
    assert!(CurveParams::new(3).validate().is_ok());
}

#[test]
fn step_is_pure() {
    let params = CurveParams::new(4);
    let s0 = CurveState::initial(&params);
    let (s1, len) = s0.step(&params, 8);
    assert_eq!(len, 2);
    assert_eq!(s0.reveal_step, 1);
    assert_eq!(s1.reveal_step, 2);
    assert_eq!(s0.step(&params, 8), (s1, 2));
}
