mod common;

use common::*;
use phase_engines::{
    build_engine, initial_input, BitonicEngine, CommitMode, EngineKind, EngineOptions, PassEngine,
};
use phase_runtime::kernel::merge_runs_by_key;
use phase_runtime::{CpuBackend, Key};

#[test]
fn test_engines_agree_on_generated_keys() {
    let n = 1 << 14;
    let input = initial_input(EngineKind::Bitonic, n);
    let mut backend = CpuBackend::new().unwrap();
    let (bitonic, _) = run_engine(EngineKind::Bitonic, &mut backend, &input, EngineOptions::default());
    let (merge, _) = run_engine(EngineKind::Merge, &mut backend, &input, EngineOptions::default());
    assert_eq!(bitonic, merge);

    let mut reference = input;
    reference.sort();
    assert_eq!(merge, reference);
}

#[test]
fn test_pass_counts_match_formulas() {
    let mut backend = CpuBackend::new().unwrap();
    for log_n in 1..=12 {
        let n = 1usize << log_n;
        let expected_bitonic = log_n * (log_n + 1) / 2;
        for kind in EngineKind::ALL {
            let input = initial_input(kind, n);
            let (_, passes) = run_engine(kind, &mut backend, &input, EngineOptions::default());
            let expected = match kind {
                EngineKind::Bitonic => expected_bitonic,
                EngineKind::Scan | EngineKind::Merge => log_n,
            };
            assert_eq!(passes, expected, "{kind} at n={n}");
        }
    }
}

#[test]
fn test_single_element_terminates_immediately() {
    let mut backend = CpuBackend::new().unwrap();
    for kind in EngineKind::ALL {
        let mut engine = build_engine(kind, &mut backend, &[42], EngineOptions::default()).unwrap();
        assert!(engine.is_done());
        assert_eq!(engine.run().unwrap(), 0);
        assert_eq!(engine.result().unwrap(), vec![42]);
        assert_eq!(engine.checksum().unwrap(), Some(42));
        assert_eq!(engine.stats().launches, 0);
    }
}

#[test]
fn test_empty_input() {
    let mut backend = CpuBackend::new().unwrap();
    for kind in EngineKind::ALL {
        let mut engine = build_engine(kind, &mut backend, &[], EngineOptions::default()).unwrap();
        assert!(engine.is_empty());
        assert_eq!(engine.run().unwrap(), 0);
        assert!(engine.result().unwrap().is_empty());
        assert_eq!(engine.checksum().unwrap(), None);
    }
}

#[test]
fn test_commit_modes_agree() {
    let mut rng = seeded_rng(99);
    let input = random_keys(&mut rng, 1 << 12, 1 << 20);
    let mut backend = CpuBackend::new().unwrap();
    for kind in EngineKind::ALL {
        let (copied, copy_passes) = run_engine(
            kind,
            &mut backend,
            &input,
            EngineOptions {
                commit: CommitMode::Copy,
            },
        );
        let (swapped, swap_passes) = run_engine(
            kind,
            &mut backend,
            &input,
            EngineOptions {
                commit: CommitMode::Swap,
            },
        );
        assert_eq!(copied, swapped, "{kind} differs between commit modes");
        assert_eq!(copy_passes, swap_passes);
    }
}

#[test]
fn test_every_pass_is_awaited() {
    let mut backend = CpuBackend::new().unwrap();
    let input = initial_input(EngineKind::Bitonic, 256);
    let mut engine = BitonicEngine::new(&mut backend, &input, CommitMode::Copy).unwrap();
    let passes = engine.run().unwrap() as u64;
    let stats = engine.stats();
    assert_eq!(stats.launches, passes);
    assert_eq!(stats.copies, passes);
    assert_eq!(stats.waits, 2 * passes);
}

#[test]
fn test_thread_count_does_not_change_results() {
    let input = initial_input(EngineKind::Merge, 5000);
    let mut results = Vec::new();
    for threads in [1, 2, 7] {
        let mut backend = CpuBackend::with_threads(Some(threads)).unwrap();
        let (out, _) = run_engine(EngineKind::Merge, &mut backend, &input, EngineOptions::default());
        results.push(out);
    }
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_merge_passes_are_stable() {
    // (key, original index); stability means equal keys keep index order
    let mut rng = seeded_rng(5);
    let n = 1000;
    let mut current: Vec<(Key, usize)> = (0..n)
        .map(|i| (rand::Rng::gen_range(&mut rng, 0..16), i))
        .collect();
    let mut next = current.clone();

    let mut run_length = 1;
    while run_length < n {
        for (pair, out) in next.chunks_mut(2 * run_length).enumerate() {
            merge_runs_by_key(&current, run_length, pair, out, |&(k, _)| k);
        }
        std::mem::swap(&mut current, &mut next);
        run_length *= 2;
    }

    for w in current.windows(2) {
        assert!(w[0].0 <= w[1].0);
        if w[0].0 == w[1].0 {
            assert!(w[0].1 < w[1].1, "equal keys reordered: {:?} before {:?}", w[0], w[1]);
        }
    }
}

#[test]
fn test_checksum_is_last_element() {
    let n = 1 << 10;
    let mut backend = CpuBackend::new().unwrap();

    let mut scan = build_engine(EngineKind::Scan, &mut backend, &initial_input(EngineKind::Scan, n), EngineOptions::default()).unwrap();
    scan.run().unwrap();
    assert_eq!(scan.checksum().unwrap(), Some(n as Key));
    drop(scan);

    let input = initial_input(EngineKind::Merge, n);
    let max = *input.iter().max().unwrap();
    let mut merge = build_engine(EngineKind::Merge, &mut backend, &input, EngineOptions::default()).unwrap();
    merge.run().unwrap();
    assert_eq!(merge.checksum().unwrap(), Some(max));
}

#[cfg(target_os = "macos")]
mod metal {
    use super::*;
    use phase_runtime::MetalBackend;

    fn agree_with_cpu(kind: EngineKind, input: &[Key]) {
        let mut cpu = CpuBackend::new().unwrap();
        let mut gpu = MetalBackend::new().unwrap();
        let (expected, cpu_passes) = run_engine(kind, &mut cpu, input, EngineOptions::default());
        for commit in [CommitMode::Copy, CommitMode::Swap] {
            let (actual, gpu_passes) = run_engine(kind, &mut gpu, input, EngineOptions { commit });
            assert_eq!(
                actual, expected,
                "{kind} Metal/CPU mismatch at n={}. First diff at index {}",
                input.len(),
                first_diff(&actual, &expected)
            );
            assert_eq!(gpu_passes, cpu_passes);
        }
    }

    #[test]
    fn test_metal_scan_agrees() {
        agree_with_cpu(EngineKind::Scan, &initial_input(EngineKind::Scan, 1 << 16));
        let mut rng = seeded_rng(31);
        agree_with_cpu(EngineKind::Scan, &random_keys(&mut rng, 1000, 1000));
    }

    #[test]
    fn test_metal_bitonic_agrees() {
        agree_with_cpu(EngineKind::Bitonic, &initial_input(EngineKind::Bitonic, 1 << 16));
    }

    #[test]
    fn test_metal_merge_agrees() {
        agree_with_cpu(EngineKind::Merge, &initial_input(EngineKind::Merge, 1 << 16));
        let mut rng = seeded_rng(32);
        agree_with_cpu(EngineKind::Merge, &random_keys(&mut rng, 12_345, Key::MAX));
    }

    #[test]
    fn test_metal_trivial_lengths() {
        for kind in EngineKind::ALL {
            agree_with_cpu(kind, &[]);
            agree_with_cpu(kind, &[42]);
        }
    }
}
