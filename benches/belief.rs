use credence::bp::BeliefPropagation;
use credence::constraint::CollectionModel;

criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        propagating_a_fresh_collection,
        propagating_a_partially_narrowed_collection,
        converging_belief_propagation,
}

/// a 32-piece, 8-value collection with 4 of each value: roughly a deck of
/// cards fanned across 32 positions, the shape the shuffle move restricts
/// most often.
fn deck_model() -> CollectionModel {
    CollectionModel::new(vec![4; 8])
}

fn propagating_a_fresh_collection(c: &mut criterion::Criterion) {
    c.bench_function("constraint status on a fresh 32-piece collection", |b| {
        b.iter(|| deck_model().status())
    });
}

fn propagating_a_partially_narrowed_collection(c: &mut criterion::Criterion) {
    c.bench_function("constraint status after narrowing half the pieces", |b| {
        b.iter(|| {
            let mut model = deck_model();
            for piece in 0..16 {
                model.remove(piece, piece % 8);
            }
            model.status()
        })
    });
}

fn converging_belief_propagation(c: &mut criterion::Criterion) {
    c.bench_function("loopy BP convergence on a 32-piece, 8-value collection", |b| {
        b.iter(|| {
            let model = deck_model();
            let mut bp = BeliefPropagation::new(model.n_pieces(), model.n_values());
            bp.update(&model);
            bp.probability(0, 0)
        })
    });
}
