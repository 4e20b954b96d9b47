use reporank_core::{
    calibrate_confidence, ChangeType, ClassificationBatch, ClassificationRecord,
    ComparisonRunBuilder, ImpactLevel, Mode, ScoreCalculator, WeightTable,
};

const REPO: &str = "https://github.com/org/repo";

fn rec(change: ChangeType, impact: ImpactLevel, confidence: f64) -> ClassificationRecord {
    ClassificationRecord::new(REPO, change, impact, confidence).expect("valid record")
}

/// A spread of record sets covering every change type and impact level.
fn sample_sets() -> Vec<Vec<ClassificationRecord>> {
    let changes = [
        ChangeType::Feature,
        ChangeType::Fix,
        ChangeType::Security,
        ChangeType::Docs,
        ChangeType::Maintenance,
        ChangeType::Other,
    ];
    let impacts = [ImpactLevel::Low, ImpactLevel::Medium, ImpactLevel::High];
    let confidences = [0.0, 0.25, 0.5, 0.99, 1.0];

    let mut sets = Vec::new();
    for size in 1..=7 {
        let set: Vec<ClassificationRecord> = (0..size)
            .map(|i| {
                rec(
                    changes[i % changes.len()],
                    impacts[(i * 2) % impacts.len()],
                    confidences[(i * 3) % confidences.len()],
                )
            })
            .collect();
        sets.push(set);
    }
    sets.push(vec![rec(ChangeType::Security, ImpactLevel::High, 1.0); 6]);
    sets.push(vec![rec(ChangeType::Feature, ImpactLevel::High, 1.0); 6]);
    sets
}

// ── ScoreCalculator ───────────────────────────────────────────────────────

#[test]
fn empty_set_scores_zero_for_every_mode() {
    let calc = ScoreCalculator::default();
    for mode in Mode::ALL {
        let s = calc.score(mode, &Vec::<ClassificationRecord>::new());
        assert_eq!(s.score, 0.0);
        assert_eq!(s.confidence, 0.0);
        assert_eq!(s.sample_size, 0);
        assert!(s.security_ratio.is_none());
        assert!(s.feature_ratio.is_none());
    }
}

#[test]
fn score_is_non_negative_and_confidence_bounded() {
    let calc = ScoreCalculator::default();
    for mode in Mode::ALL {
        for set in sample_sets() {
            let s = calc.score(mode, &set);
            assert!(s.score >= 0.0, "{mode}: score {}", s.score);
            assert!(
                (0.0..=1.0).contains(&s.confidence),
                "{mode}: confidence {}",
                s.confidence
            );
            assert_eq!(s.sample_size, set.len());
        }
    }
}

#[test]
fn raising_impact_never_lowers_score() {
    let calc = ScoreCalculator::default();
    for mode in Mode::ALL {
        for set in sample_sets() {
            for i in 0..set.len() {
                if set[i].impact_level() != ImpactLevel::Low {
                    continue;
                }
                let mut raised = set.clone();
                raised[i] = rec(set[i].change_type(), ImpactLevel::High, set[i].confidence());
                let before = calc.score(mode, &set).score;
                let after = calc.score(mode, &raised).score;
                assert!(after >= before, "{mode}: {after} < {before}");
            }
        }
    }
}

#[test]
fn calibration_non_decreasing_then_flat() {
    for avg in [0.1, 0.5, 0.73, 1.0] {
        let mut last = 0.0;
        for n in 1..=5 {
            let c = calibrate_confidence(avg, n);
            assert!(c >= last, "avg {avg}: n={n} gives {c} < {last}");
            last = c;
        }
        for n in 5..=40 {
            assert_eq!(calibrate_confidence(avg, n), calibrate_confidence(avg, 5));
        }
    }
}

#[test]
fn executive_end_to_end_example() {
    let calc = ScoreCalculator::default();
    let records = vec![
        rec(ChangeType::Feature, ImpactLevel::High, 0.8),
        rec(ChangeType::Fix, ImpactLevel::Medium, 0.6),
    ];
    let s = calc.score(Mode::Executive, &records);
    assert!((s.score - 7.128).abs() < 1e-9, "score {}", s.score);
    assert!((s.confidence - 0.532).abs() < 1e-9);
    // Ratios are always reported, even for modes with no bias on them.
    assert_eq!(s.feature_ratio, Some(0.5));
    assert_eq!(s.security_ratio, Some(0.0));
}

#[test]
fn unknown_mode_label_scores_like_executive() {
    let table = WeightTable::default();
    let calc = ScoreCalculator::new(table.clone());
    let sets = sample_sets();
    let set = &sets[4];
    let fallback = Mode::parse_lenient("board-of-directors");
    assert_eq!(
        calc.score(fallback, set),
        calc.score(Mode::Executive, set)
    );
    assert_eq!(
        table.weights_for_label("board-of-directors"),
        table.weights_for(Mode::Executive)
    );
}

// ── ComparisonRunBuilder ──────────────────────────────────────────────────

fn mixed_batch() -> ClassificationBatch {
    let mk = |repo: &str, c: ChangeType, i: ImpactLevel, conf: f64| {
        ClassificationRecord::new(repo, c, i, conf).unwrap()
    };
    ClassificationBatch::new(vec![
        mk("https://github.com/o/a", ChangeType::Fix, ImpactLevel::Medium, 0.5),
        mk("https://github.com/o/b", ChangeType::Security, ImpactLevel::High, 0.9),
        mk("https://github.com/o/c", ChangeType::Feature, ImpactLevel::Medium, 0.5),
        mk("https://github.com/o/a", ChangeType::Docs, ImpactLevel::Low, 0.2),
        mk("https://github.com/o/d", ChangeType::Fix, ImpactLevel::Medium, 0.5),
        mk("https://github.com/o/b", ChangeType::Fix, ImpactLevel::High, 0.7),
    ])
}

#[test]
fn build_is_deterministic() {
    let builder = ComparisonRunBuilder::default();
    for mode in Mode::ALL {
        let a = builder.build(mode, &mixed_batch());
        let b = builder.build(mode, &mixed_batch());
        assert_eq!(a, b);
    }
}

#[test]
fn ranks_are_contiguous_and_scores_descending() {
    let builder = ComparisonRunBuilder::default();
    for mode in Mode::ALL {
        let run = builder.build(mode, &mixed_batch());
        assert_eq!(run.results.len(), run.repositories.len());
        assert_eq!(run.results.len(), 4);
        for (i, entry) in run.results.iter().enumerate() {
            assert_eq!(entry.rank as usize, i + 1);
        }
        for pair in run.results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}

#[test]
fn equal_scores_follow_first_appearance() {
    // c and d have identical records in executive mode (change type carries no weight).
    let run = ComparisonRunBuilder::default().build(Mode::Executive, &mixed_batch());
    let c = run.rank_of("https://github.com/o/c").unwrap();
    let d = run.rank_of("https://github.com/o/d").unwrap();
    assert_eq!(c + 1, d);
}

#[test]
fn repositories_keep_first_appearance_order() {
    let run = ComparisonRunBuilder::default().build(Mode::Security, &mixed_batch());
    assert_eq!(
        run.repositories,
        vec![
            "https://github.com/o/a",
            "https://github.com/o/b",
            "https://github.com/o/c",
            "https://github.com/o/d",
        ]
    );
    assert_eq!(run.leader().unwrap().repo_url, "https://github.com/o/b");
}
