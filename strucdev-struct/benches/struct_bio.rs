use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strucdev_struct::ensemble::{analyze_ensemble, diversity, RmsdMode};
use strucdev_struct::models::model_point_sets;
use strucdev_struct::pdb::extract_points;
use strucdev_struct::selection::Selection;
use strucdev_struct::superposition::superposed_rmsd;
use strucdev_struct::types::PointSet;

/// Backbone plus CB offsets of one residue, relative to its CA.
const RESIDUE_ATOMS: [(&str, [f64; 3]); 5] = [
    ("N", [-1.46, 0.0, 0.0]),
    ("CA", [0.0, 0.0, 0.0]),
    ("C", [0.55, 1.42, 0.0]),
    ("O", [-0.21, 2.39, 0.0]),
    ("CB", [0.53, -0.76, -1.20]),
];

/// ATOM records of an ideal-ish helix: 3.6 residues per turn, 1.5 Å rise.
/// `wobble` perturbs each member deterministically.
fn helix_records(n_residues: usize, wobble: f64) -> Vec<String> {
    let mut records = Vec::with_capacity(n_residues * RESIDUE_ATOMS.len());
    for res in 0..n_residues {
        let turn = res as f64 * 100f64.to_radians();
        let ca = [2.3 * turn.cos(), 2.3 * turn.sin(), res as f64 * 1.5];
        for (name, offset) in RESIDUE_ATOMS {
            let jitter = wobble * ((res * 13 + records.len()) % 7) as f64 / 7.0;
            records.push(format!(
                "ATOM  {:>5}  {:<3} ALA A{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00 50.00           {}",
                records.len() + 1,
                name,
                res + 1,
                ca[0] + offset[0] + jitter,
                ca[1] + offset[1],
                ca[2] + offset[2],
                &name[..1],
            ));
        }
    }
    records
}

fn helix_pdb(n_residues: usize, wobble: f64) -> String {
    let mut text = helix_records(n_residues, wobble).join("\n");
    text.push_str("\nEND\n");
    text
}

fn helix_ensemble(n_models: usize, n_residues: usize) -> String {
    let mut text = String::new();
    for m in 0..n_models {
        text.push_str(&format!("MODEL     {:>4}\n", m + 1));
        for line in helix_records(n_residues, 0.1 * m as f64) {
            text.push_str(&line);
            text.push('\n');
        }
        text.push_str("ENDMDL\n");
    }
    text.push_str("END\n");
    text
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");

    // 2000 residues x 5 atoms
    let text = helix_pdb(2000, 0.0);
    group.bench_function("backbone_10k_atoms", |b| {
        b.iter(|| extract_points(black_box(&text), &Selection::backbone(), "bench"))
    });
    group.bench_function("all_atoms_10k_atoms", |b| {
        b.iter(|| extract_points(black_box(&text), &Selection::all_atoms(), "bench"))
    });

    group.finish();
}

fn bench_rmsd(c: &mut Criterion) {
    let mut group = c.benchmark_group("rmsd");

    let backbone = Selection::backbone();
    let target = extract_points(&helix_pdb(250, 0.0), &backbone, "target").unwrap();
    let mobile = extract_points(&helix_pdb(250, 0.4), &backbone, "mobile").unwrap();
    group.bench_function("superposed_1k_backbone_atoms", |b| {
        b.iter(|| superposed_rmsd(black_box(&mobile), black_box(&target)))
    });

    group.finish();
}

fn bench_ensemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("ensemble");

    let text = helix_ensemble(20, 150);
    group.bench_function("split_20_models", |b| {
        b.iter(|| model_point_sets(black_box(&text), &Selection::backbone(), "bench"))
    });

    let members: Vec<PointSet> =
        model_point_sets(&text, &Selection::alpha_carbons(), "bench").unwrap();
    group.bench_function("diversity_190_pairs", |b| {
        b.iter(|| diversity(black_box(&members), RmsdMode::Superposed))
    });

    let reference = members[0].clone();
    group.bench_function("analyze_20_members", |b| {
        b.iter(|| analyze_ensemble(Some(&reference), members.clone(), RmsdMode::Superposed))
    });

    group.finish();
}

criterion_group!(benches, bench_extract, bench_rmsd, bench_ensemble);
criterion_main!(benches);
