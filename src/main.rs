extern crate rand;
extern crate rand_chacha;
extern crate rrcflib;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rrcflib::TreeBuilder;

fn main() {
    let dimensions = 3;
    let data_size = 100;
    let random_seed = 0;

    let mut rng = ChaCha20Rng::seed_from_u64(random_seed);
    let points: Vec<Vec<f64>> = (0..data_size)
        .map(|_| (0..dimensions).map(|_| rng.gen::<f64>()).collect())
        .collect();

    // the same generator keeps supplying the cuts
    let tree = match TreeBuilder::new().build_with_source(&points, &mut rng) {
        Ok(tree) => tree,
        Err(error) => {
            println!("could not build tree: {}", error);
            std::process::exit(1);
        }
    };

    println!("points {} dimensions {}", data_size, dimensions);
    println!(
        "mass {} leaves {} branches {} max depth {}",
        tree.mass(),
        tree.leaves().count(),
        tree.branches().count(),
        tree.max_depth()
    );
    println!("root box {}", tree.root().bounding_box());

    let mut depth_sum = 0;
    for label in 0..tree.num_labels() {
        if let Ok(leaf) = tree.lookup_leaf(label) {
            depth_sum += leaf.depth();
        }
    }
    println!("mean leaf depth {:.3}", depth_sum as f64 / data_size as f64);
}
