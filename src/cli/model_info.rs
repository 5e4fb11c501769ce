//! Model-info command - describe a trained artifact

use anyhow::Result;
use console::style;
use std::path::Path;

use heartcheck::classifier::{ModelArtifact, TrainedModel};

/// Run the model-info command
pub fn run(path: &Path) -> Result<()> {
    let (artifact, digest) = ModelArtifact::load_with_digest(path)?;

    println!("\n{}", style("Heart risk model").bold());
    println!("  File:           {}", style(path.display()).cyan());
    println!("  SHA-256:        {}", digest);
    println!("  Format version: {}", artifact.format_version);
    println!("  Algorithm:      {}", artifact.model.algorithm());
    println!("  Trees:          {}", artifact.n_trees);
    println!("  Seed:           {}", artifact.seed);

    if let TrainedModel::RandomForest(forest) = &artifact.model {
        let nodes: usize = forest.trees().iter().map(|t| t.node_count()).sum();
        let depth = forest.trees().iter().map(|t| t.depth()).max().unwrap_or(0);
        println!("  Total nodes:    {}", nodes);
        println!("  Deepest tree:   {}", depth);
    }

    println!("  Features:       {}", artifact.feature_names.join(", "));
    Ok(())
}
