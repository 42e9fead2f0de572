use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pedigree_relmat_core::relationship::LabeledMatrix;
use pedigree_relmat_core::{
    complete, extract_subset, inbreeding, prune, relationship_inverse, relationship_matrix,
    PedigreeRows,
};

#[derive(Parser)]
#[command(name = "openped")]
#[command(version)]
#[command(about = "Pedigree relationship-matrix toolkit: completion, inbreeding, A and A-inverse")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert missing ancestors and order a pedigree by generation
    Complete {
        /// Path to pedigree CSV (columns: id, sire, dam)
        #[arg(short, long)]
        pedigree: String,

        /// Write the completed pedigree to this CSV instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Compute inbreeding coefficients
    Inbreeding {
        /// Path to pedigree CSV (columns: id, sire, dam)
        #[arg(short, long)]
        pedigree: String,

        /// Output format: "text" (default) or "json"
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Compute the inverse of the additive relationship matrix
    Ainverse {
        /// Path to pedigree CSV (columns: id, sire, dam)
        #[arg(short, long)]
        pedigree: String,
    },

    /// Extract the additive relationship matrix for selected individuals
    Amatrix {
        /// Path to pedigree CSV (columns: id, sire, dam)
        #[arg(short, long)]
        pedigree: String,

        /// Individuals to restrict to (comma-separated labels)
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,
    },

    /// Restrict a pedigree to selected individuals and their ancestors
    Prune {
        /// Path to pedigree CSV (columns: id, sire, dam)
        #[arg(short, long)]
        pedigree: String,

        /// Individuals to keep (comma-separated labels)
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<String>,

        /// Number of ancestor generations to retain
        #[arg(long, default_value = "0")]
        generations: u32,

        /// Write the reduced pedigree to this CSV instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Complete { pedigree, output } => cmd_complete(&pedigree, output.as_deref()),
        Commands::Inbreeding { pedigree, format } => cmd_inbreeding(&pedigree, &format),
        Commands::Ainverse { pedigree } => cmd_ainverse(&pedigree),
        Commands::Amatrix { pedigree, ids } => cmd_amatrix(&pedigree, &ids),
        Commands::Prune {
            pedigree,
            ids,
            generations,
            output,
        } => cmd_prune(&pedigree, &ids, generations, output.as_deref()),
    }
}

fn load_rows(path: &str) -> Result<PedigreeRows> {
    let rows = PedigreeRows::from_csv(path)
        .with_context(|| format!("Failed to load pedigree from '{}'", path))?;
    eprintln!("Loaded {} pedigree rows from '{}'", rows.len(), path);
    Ok(rows)
}

fn write_rows(rows: &PedigreeRows, output: Option<&str>) -> Result<()> {
    let mut writer: csv::Writer<Box<dyn std::io::Write>> = match output {
        Some(path) => csv::Writer::from_writer(Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create '{}'", path))?,
        )),
        None => csv::Writer::from_writer(Box::new(std::io::stdout())),
    };

    writer.write_record(["id", "sire", "dam"])?;
    let parent = |p: &Option<String>| p.clone().unwrap_or_else(|| "0".to_string());
    for i in 0..rows.len() {
        let sire = parent(&rows.sires[i]);
        let dam = parent(&rows.dams[i]);
        writer.write_record([rows.labels[i].as_str(), sire.as_str(), dam.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

fn cmd_complete(pedigree_path: &str, output: Option<&str>) -> Result<()> {
    let rows = load_rows(pedigree_path)?;
    let n_input = rows.len();

    let done = complete(&rows).context("Failed to complete pedigree")?;
    let added = done.rows.len() - n_input;
    let depth = done.generations.last().copied().unwrap_or(0);
    eprintln!(
        "Completed pedigree: {} individuals ({} ancestors added), max generation {}",
        done.rows.len(),
        added,
        depth
    );

    write_rows(&done.rows, output)
}

fn cmd_inbreeding(pedigree_path: &str, output_format: &str) -> Result<()> {
    let rows = load_rows(pedigree_path)?;
    let store = rows.into_store().context("Invalid pedigree")?;
    let f = inbreeding(&store);

    match output_format.to_lowercase().as_str() {
        "json" => {
            let entries: Vec<serde_json::Value> = store
                .labels()
                .iter()
                .zip(f.iter())
                .map(|(label, fi)| serde_json::json!({ "id": label, "inbreeding": fi }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        _ => {
            println!("{:<16} {:>10}", "id", "F");
            for (label, fi) in store.labels().iter().zip(f.iter()) {
                println!("{:<16} {:>10.6}", label, fi);
            }
            let inbred = f.iter().filter(|&&fi| fi > 0.0).count();
            let mean = if f.is_empty() {
                0.0
            } else {
                f.iter().sum::<f64>() / f.len() as f64
            };
            eprintln!("{} of {} individuals inbred, mean F = {:.6}", inbred, f.len(), mean);
        }
    }
    Ok(())
}

fn cmd_ainverse(pedigree_path: &str) -> Result<()> {
    let rows = load_rows(pedigree_path)?;
    let store = rows.into_store().context("Invalid pedigree")?;
    let n = store.len();

    let ainv = relationship_inverse(&store, None).context("Failed to compute A-inverse")?;

    println!("A-inverse dimensions: {} x {}", ainv.dim(), ainv.dim());
    println!("A-inverse non-zeros:  {}", ainv.matrix().nnz());
    if n > 0 {
        println!(
            "Density: {:.2}%",
            100.0 * ainv.matrix().nnz() as f64 / (n * n) as f64
        );
        println!("\nFirst diagonal entries of A-inverse:");
        for i in 0..n.min(5) {
            println!("  {}: {:.4}", ainv.labels()[i], ainv.get(i, i));
        }
    }
    Ok(())
}

fn print_matrix_entries(mat: &LabeledMatrix) {
    println!("{:<16} {:<16} {:>12}", "row", "col", "value");
    for (val, (i, j)) in mat.matrix().iter() {
        if i <= j {
            println!(
                "{:<16} {:<16} {:>12.6}",
                mat.labels()[i],
                mat.labels()[j],
                val
            );
        }
    }
}

fn cmd_amatrix(pedigree_path: &str, ids: &[String]) -> Result<()> {
    let rows = load_rows(pedigree_path)?;
    let store = rows.into_store().context("Invalid pedigree")?;

    let mat = if ids.is_empty() {
        relationship_matrix(&store, None).context("Failed to assemble A")?
    } else {
        let labs: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
        extract_subset(&store, &labs)
            .with_context(|| format!("Failed to extract A for {} individuals", labs.len()))?
    };

    eprintln!(
        "Relationship matrix for {} of {} individuals",
        mat.dim(),
        store.len()
    );
    print_matrix_entries(&mat);
    Ok(())
}

fn cmd_prune(
    pedigree_path: &str,
    ids: &[String],
    generations: u32,
    output: Option<&str>,
) -> Result<()> {
    let rows = load_rows(pedigree_path)?;
    let store = rows.into_store().context("Invalid pedigree")?;

    let labs: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
    let reduced = prune(&store, &labs, generations).context("Failed to prune pedigree")?;

    eprintln!(
        "Pruned pedigree: {} of {} individuals kept ({} selected, {} ancestor generations)",
        reduced.len(),
        store.len(),
        labs.len(),
        generations
    );
    write_rows(&reduced, output)
}
