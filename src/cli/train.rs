//! Train command - fit the ensemble and write the model artifact

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use heartcheck::classifier::{self, TrainConfig};

/// Create bar progress style
fn bar_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
        .progress_chars("█▓▒░  "))
}

/// Run the train command
pub fn run(config: &TrainConfig) -> Result<()> {
    println!(
        "\n{} Training heart risk classifier ({}, {} trees, seed {})\n",
        style("💓").bold(),
        config.algorithm,
        config.n_trees,
        config.seed
    );

    let bar = ProgressBar::new(config.n_trees as u64);
    bar.set_style(bar_style()?);
    bar.set_message("fitting trees");

    let result = classifier::train(config, Some(&bar));
    match &result {
        Ok(_) => bar.finish_with_message("done"),
        Err(_) => bar.abandon(),
    }
    let result = result?;

    println!("{} Model trained and saved successfully!", style("✅").green());
    println!(
        "   Training samples: {}",
        style(result.train_samples).cyan()
    );
    println!(
        "   Held-out samples: {}",
        style(result.test_samples).cyan()
    );
    println!("   Trees:            {}", result.n_trees);
    println!(
        "   Model:            {}",
        style(result.model_path.display()).cyan()
    );
    println!("   SHA-256:          {}", style(&result.digest).dim());
    Ok(())
}
