use skycorr_core::Source;
use skycorr_index::{SkyBounds, SkyQuadTree, TreeConfig};
use skycorr_pairs::{count_pairs, LogBins};

fn main() -> anyhow::Result<()> {
    // A synthetic catalog: a uniform grid with two tight clumps on top
    let mut sources = Vec::new();
    for i in 0..20 {
        for j in 0..20 {
            sources.push(Source::new(0.25 + 0.5 * i as f64, 0.25 + 0.5 * j as f64));
        }
    }
    for k in 0..15 {
        let step = 0.01 * k as f64;
        sources.push(Source::new(2.0 + step, 2.0));
        sources.push(Source::new(7.0, 7.0 + step));
    }

    let bounds = SkyBounds::new(0.0, 10.0, 0.0, 10.0)?;
    let mut tree = SkyQuadTree::new(TreeConfig::new(3, bounds))?;
    tree.extend(sources.iter().copied());
    tree.aggregate();

    let bins = LogBins::new(2.0 / 3600.0, 1.0, 12)?;
    let counts = count_pairs(&tree, &sources, &bins)?;

    println!(
        "{} sources, {} leaves, {} ordered pairs within {:.2}°:\n",
        sources.len(),
        tree.leaf_count(),
        counts.total(),
        bins.max(),
    );

    let edges = bins.edges();
    for (i, count) in counts.counts().iter().enumerate() {
        println!("  {:9.5}° – {:9.5}°  {:8}", edges[i], edges[i + 1], count);
    }

    Ok(())
}
