mod common;

use common::*;
use phase_engines::{CommitMode, DoubleBuffer, EngineKind, EngineOptions, PassEngine, ScanEngine};
use phase_runtime::{CpuBackend, Kernel, Key};

fn scan_and_verify(input: Vec<Key>) {
    let n = input.len();
    let expected = sequential_scan(&input);
    let mut backend = CpuBackend::new().unwrap();
    let (actual, passes) = run_engine(EngineKind::Scan, &mut backend, &input, EngineOptions::default());
    assert_eq!(
        actual, expected,
        "Scan mismatch at n={}. First diff at index {}",
        n,
        first_diff(&actual, &expected)
    );
    assert_eq!(passes, EngineKind::Scan.expected_passes(n));
}

fn scan_random(n: usize, seed: u64) {
    let mut rng = seeded_rng(seed);
    scan_and_verify(random_keys(&mut rng, n, 1000));
}

#[test]
fn test_scan_eight_ones() {
    let mut backend = CpuBackend::new().unwrap();
    let (actual, passes) =
        run_engine(EngineKind::Scan, &mut backend, &[1; 8], EngineOptions::default());
    assert_eq!(actual, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(passes, 3);
}

#[test] fn test_scan_ones_1m()    { scan_and_verify(vec![1; 1 << 20]); }
#[test] fn test_scan_random_1k()  { scan_random(1 << 10, 1); }
#[test] fn test_scan_random_64k() { scan_random(1 << 16, 2); }
#[test] fn test_scan_random_1000() { scan_random(1000, 3); }
#[test] fn test_scan_random_prime() { scan_random(65_521, 4); }

#[test]
fn test_scan_wrapping_overflow() {
    scan_and_verify(vec![Key::MAX; 1024]);
}

#[test]
fn test_scan_extra_pass_is_passthrough() {
    let n = 256;
    let mut rng = seeded_rng(7);
    let input = random_keys(&mut rng, n, 50);
    let expected = sequential_scan(&input);

    let mut backend = CpuBackend::new().unwrap();
    let mut engine = ScanEngine::new(&mut backend, &input, CommitMode::Copy).unwrap();
    engine.run().unwrap();
    assert_eq!(engine.result().unwrap(), expected);
    drop(engine);

    // A pass whose chunk covers the whole array changes nothing
    let mut buffers = DoubleBuffer::new(&mut backend, &expected, CommitMode::Copy).unwrap();
    buffers.step(Kernel::ScanCombine { chunk_size: n }).unwrap();
    buffers.step(Kernel::ScanCombine { chunk_size: 2 * n }).unwrap();
    assert_eq!(buffers.read().unwrap(), expected);
}
