//! Solver benchmarks.
//!
//! Run with: cargo bench -p lodestar-cdcl

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use lodestar_base::utils::XorShift64;
use lodestar_cdcl::Solver;

/// Generate a random 3-SAT instance at the given clause/variable ratio.
fn random_3sat(num_vars: usize, num_clauses: usize, seed: u64) -> Vec<Vec<i32>> {
    let mut rng = XorShift64::new(seed);
    let mut clauses = Vec::with_capacity(num_clauses);
    for _ in 0..num_clauses {
        let mut clause: Vec<i32> = Vec::with_capacity(3);
        while clause.len() < 3 {
            let var = rng.next_below(num_vars as u64) as i32 + 1;
            if clause.iter().any(|&lit| lit.abs() == var) {
                continue;
            }
            clause.push(if rng.next() & 1 == 0 { var } else { -var });
        }
        clauses.push(clause);
    }
    clauses
}

/// Generate a long implication chain with a unit at its head, so solving is
/// a single propagation pass over the whole trail.
fn implication_chain(length: usize) -> Vec<Vec<i32>> {
    let mut clauses = vec![vec![1]];
    for var in 1..length as i32 {
        clauses.push(vec![-var, var + 1]);
    }
    clauses
}

fn solve(num_vars: usize, clauses: &[Vec<i32>]) -> i32 {
    let mut solver = Solver::new();
    solver.reserve(num_vars).unwrap();
    for clause in clauses {
        solver.add_original_clause(clause).unwrap();
    }
    solver.solve().unwrap().code()
}

fn bench_random_3sat(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_3sat");
    for num_vars in [20, 40, 60] {
        let num_clauses = (num_vars as f64 * 4.25) as usize;
        let clauses = random_3sat(num_vars, num_clauses, 42);
        group.throughput(Throughput::Elements(num_clauses as u64));
        group.bench_with_input(
            BenchmarkId::new("vars", num_vars),
            &clauses,
            |b, clauses| b.iter(|| solve(black_box(num_vars), black_box(clauses))),
        );
    }
    group.finish();
}

fn bench_propagation_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagation");
    for length in [1_000, 10_000] {
        let clauses = implication_chain(length);
        group.throughput(Throughput::Elements(length as u64));
        group.bench_with_input(
            BenchmarkId::new("chain", length),
            &clauses,
            |b, clauses| b.iter(|| solve(black_box(length), black_box(clauses))),
        );
    }
    group.finish();
}

fn bench_pigeonhole(c: &mut Criterion) {
    let mut group = c.benchmark_group("pigeonhole");
    for pigeons in [4, 5] {
        let holes = pigeons - 1;
        let var = |pigeon: usize, hole: usize| (pigeon * holes + hole + 1) as i32;
        let mut clauses: Vec<Vec<i32>> = Vec::new();
        for pigeon in 0..pigeons {
            clauses.push((0..holes).map(|hole| var(pigeon, hole)).collect());
        }
        for hole in 0..holes {
            for first in 0..pigeons {
                for second in first + 1..pigeons {
                    clauses.push(vec![-var(first, hole), -var(second, hole)]);
                }
            }
        }
        let num_vars = pigeons * holes;
        group.bench_with_input(
            BenchmarkId::new("pigeons", pigeons),
            &clauses,
            |b, clauses| b.iter(|| solve(black_box(num_vars), black_box(clauses))),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_random_3sat,
    bench_propagation_chain,
    bench_pigeonhole
);
criterion_main!(benches);
