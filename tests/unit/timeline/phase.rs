use super::*;

#[test]
fn table_partitions_unit_interval() {
    assert_eq!(PHASE_TABLE[0].start, 0.0);
    assert_eq!(PHASE_TABLE[PHASE_TABLE.len() - 1].end, 1.0);
    for pair in PHASE_TABLE.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
        assert!(pair[0].width() > 0.0);
    }
}

#[test]
fn every_progress_maps_to_exactly_one_span() {
    for i in 0..=10_000 {
        let p = f64::from(i) / 10_000.0;
        let hits = PHASE_TABLE
            .iter()
            .enumerate()
            .filter(|(idx, s)| {
                let last = *idx == PHASE_TABLE.len() - 1;
                p >= s.start && (p < s.end || (last && p <= s.end))
            })
            .count();
        assert_eq!(hits, 1, "progress {p} hit {hits} spans");

        let pos = phase_at(p);
        assert!((0.0..=1.0).contains(&pos.local));
    }
}

#[test]
fn boundaries_belong_to_the_next_phase() {
    assert_eq!(phase_at(0.0).phase, Phase::Intro);
    assert_eq!(phase_at(0.0999).phase, Phase::Intro);
    assert_eq!(phase_at(0.10).phase, Phase::Months);
    assert_eq!(phase_at(0.50).phase, Phase::Stats);
    assert_eq!(phase_at(0.70).phase, Phase::Verdict);
    let end = phase_at(1.0);
    assert_eq!(end.phase, Phase::Verdict);
    assert_eq!(end.local, 1.0);
}

#[test]
fn phase_local_progress_is_normalized() {
    let pos = phase_at(0.30);
    assert_eq!(pos.phase, Phase::Months);
    assert!((pos.local - 0.5).abs() < 1e-12);

    assert_eq!(phase_at(-3.0).phase, Phase::Intro);
    assert_eq!(phase_at(7.0).phase, Phase::Verdict);
}

#[test]
fn month_index_is_always_in_range() {
    assert!(month_slot(0.5, 0).is_none());
    for count in [1usize, 5, 6] {
        let mut last = 0;
        for i in 0..=1000 {
            let local = f64::from(i) / 1000.0;
            let slot = month_slot(local, count).unwrap();
            assert!(slot.index < count.max(1));
            assert!(slot.index >= last);
            assert!((0.0..1.0).contains(&slot.local));
            last = slot.index;
        }
        assert_eq!(last, count - 1);
    }
}
