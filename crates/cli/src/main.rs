//! API Hierarchy CLI
//!
//! Prepares an OpenAPI spec for nested SDK generation (`process`) and wires
//! the generated per-tag API classes into a hierarchy afterwards (`patch`).

use anyhow::{Context, Result};
use api_hierarchy_common::{HierarchyFile, HierarchyTree};
use api_hierarchy_patcher::{HierarchyPatcher, PatchConfig, PatchOutcome, PatchSummary};
use api_hierarchy_processor::{ProcessedSpec, SpecProcessor};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "api-hierarchy")]
#[command(version, about = "Build nested API hierarchies from OpenAPI tags", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the tag hierarchy and normalize schemas for code generation
    #[command(after_help = "EXAMPLES:\n  \
        # Process the default generator spec\n  \
        api-hierarchy process\n\n  \
        # Process a spec and write outputs elsewhere\n  \
        api-hierarchy process \\\n    \
        --source openapi.yml \\\n    \
        --output openapi-processed.yml \\\n    \
        --hierarchy api-hierarchy.yml")]
    Process {
        /// Source OpenAPI spec file
        #[arg(short, long, default_value = "client-sdks/openapi/openapi.generator.yml")]
        source: PathBuf,

        /// Output processed spec file
        #[arg(short, long, default_value = "client-sdks/openapi/openapi-processed.yml")]
        output: PathBuf,

        /// Output API hierarchy file
        #[arg(short = 'H', long, default_value = "api-hierarchy.yml")]
        hierarchy: PathBuf,
    },

    /// Patch generated API classes with hierarchical properties
    #[command(after_help = "EXAMPLES:\n  \
        # Patch the default Python SDK\n  \
        api-hierarchy patch\n\n  \
        # Patch a custom SDK layout\n  \
        api-hierarchy patch \\\n    \
        --sdk-dir ./sdk \\\n    \
        --package my_client \\\n    \
        --config patch-config.yml")]
    Patch {
        /// API hierarchy file written by `process`
        #[arg(short = 'H', long, default_value = "api-hierarchy.yml")]
        hierarchy: PathBuf,

        /// Generated SDK directory
        #[arg(short, long, default_value = "sdks/python")]
        sdk_dir: PathBuf,

        /// Package name
        #[arg(short, long, default_value = "llama_stack_client")]
        package: String,

        /// Patch configuration file (layout, anchors, and templates)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            source,
            output,
            hierarchy,
        } => {
            process_command(&source, &output, &hierarchy, cli.verbose)?;
        }
        Commands::Patch {
            hierarchy,
            sdk_dir,
            package,
            config,
        } => {
            patch_command(&hierarchy, &sdk_dir, &package, config.as_deref(), cli.verbose)?;
        }
    }

    Ok(())
}

fn process_command(source: &Path, output: &Path, hierarchy: &Path, verbose: bool) -> Result<()> {
    if !source.exists() {
        anyhow::bail!("Source spec '{}' not found", source.display());
    }

    println!("{} Loading OpenAPI spec from: {}", "→".cyan(), source.display());
    let processed = SpecProcessor::from_file(source)
        .context("Failed to load OpenAPI spec")?
        .process()
        .context("Failed to process OpenAPI spec")?;

    if verbose {
        print_endpoints(&processed);
    }
    print_placeholders(&processed);
    print_normalization(&processed, verbose);

    processed
        .write_spec(output)
        .with_context(|| format!("Failed to write processed spec to {}", output.display()))?;
    println!("{} Processed spec written to: {}", "✓".green(), output.display());

    processed
        .write_hierarchy(hierarchy)
        .with_context(|| format!("Failed to write hierarchy to {}", hierarchy.display()))?;
    println!("{} API hierarchy written to: {}", "✓".green(), hierarchy.display());

    let extraction = &processed.extraction;
    println!("\n{}", "✓ Processing complete!".green().bold());
    println!("\n{}", "Summary:".bold());
    println!("  Endpoints processed: {}", extraction.endpoint_count);
    println!("  Total tags: {}", extraction.all_tags.len());
    println!("  Tags with endpoints: {}", extraction.tags_with_endpoints.len());
    println!(
        "  Tags with placeholder endpoints: {}",
        extraction.tags_without_endpoints.len()
    );

    println!("\n{}", "API Hierarchy:".bold());
    print_outline(&extraction.tree);

    Ok(())
}

fn print_endpoints(processed: &ProcessedSpec) {
    for endpoint in &processed.extraction.endpoints {
        println!(
            "  {} {} tags: [{}] -> [{}]",
            endpoint.method.to_uppercase(),
            endpoint.path,
            endpoint.tags.join(", "),
            endpoint.leaf
        );
    }
}

fn print_placeholders(processed: &ProcessedSpec) {
    let extraction = &processed.extraction;
    if extraction.placeholder_paths.is_empty() {
        return;
    }
    println!(
        "{} Creating placeholder endpoints for {} tags without endpoints",
        "→".cyan(),
        extraction.placeholder_paths.len()
    );
    for (tag, path) in extraction
        .tags_without_endpoints
        .iter()
        .zip(&extraction.placeholder_paths)
    {
        println!("  {} {} ({})", "•".cyan(), tag.yellow(), path);
    }
    for collision in &extraction.placeholder_collisions {
        eprintln!(
            "{} {} is already in use; placeholder for {} placed at {}",
            "⚠".yellow(),
            collision.preferred,
            collision.tag,
            collision.used
        );
    }
}

fn print_normalization(processed: &ProcessedSpec, verbose: bool) {
    let report = &processed.normalization;

    println!(
        "{} Converted {} oneOf/const schemas to enums",
        "✓".green(),
        report.oneof_conversions
    );

    println!(
        "{} Made {} schemas' defaulted fields optional",
        "✓".green(),
        report.optional_fields.len()
    );
    if verbose {
        for (schema, fields) in &report.optional_fields {
            println!("  {}: {}", schema.cyan(), fields.join(", "));
        }
    }

    if report.error_relaxed {
        println!("{} Relaxed Error schema required fields", "✓".green());
    } else {
        println!("{} No Error schema found to relax", "ℹ".blue());
    }

    println!(
        "{} Marked {} list endpoints for unwrapping",
        "✓".green(),
        report.unwrapped.len()
    );
    if verbose {
        for unwrapped in &report.unwrapped {
            println!("  {} ({})", unwrapped.operation, unwrapped.schema.cyan());
        }
    }
}

fn print_outline(tree: &HierarchyTree) {
    if tree.is_empty() {
        println!("  (empty)");
        return;
    }
    for (depth, tag) in tree.outline() {
        println!("{}{}", "  ".repeat(depth + 1), tag);
    }
}

fn patch_command(
    hierarchy_path: &Path,
    sdk_dir: &Path,
    package: &str,
    config_path: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    if !hierarchy_path.exists() {
        anyhow::bail!("Hierarchy file '{}' not found", hierarchy_path.display());
    }
    if !sdk_dir.exists() {
        anyhow::bail!("SDK directory '{}' not found", sdk_dir.display());
    }

    let config = match config_path {
        Some(path) => {
            println!("{} Loading patch config from: {}", "→".cyan(), path.display());
            PatchConfig::from_file(path).context("Failed to load patch config")?
        }
        None => PatchConfig::default(),
    };

    println!("{} Loading hierarchy from: {}", "→".cyan(), hierarchy_path.display());
    let hierarchy =
        HierarchyFile::from_file(hierarchy_path).context("Failed to load hierarchy file")?;

    if hierarchy.api_hierarchy.is_empty() {
        println!("{} No hierarchy found in file", "ℹ".blue());
        return Ok(());
    }

    if verbose {
        println!("  SDK directory: {}", sdk_dir.display());
        println!("  Package: {}", package);
    }

    let patcher =
        HierarchyPatcher::new(sdk_dir, package, config).context("Failed to set up patcher")?;
    let summary = patcher
        .patch_all(&hierarchy)
        .context("Failed to patch API files")?;

    print_patch_summary(&summary);
    Ok(())
}

fn print_patch_summary(summary: &PatchSummary) {
    println!(
        "{} Found {} parent-child relationships",
        "✓".green(),
        summary.pairs.len()
    );

    println!("\n{}", "Patching API files:".bold());
    for report in &summary.api_files {
        let label = format!("{} -> {}", report.pair.parent, report.pair.child);
        match &report.outcome {
            Ok(PatchOutcome::Patched) => {
                println!("  {} {} ({})", "✓".green(), label, report.file.display());
            }
            Ok(_) => {
                println!("  {} {} already patched", "ℹ".blue(), label);
            }
            Err(e) => {
                eprintln!("  {} Skipping {}: {}", "⚠".yellow(), label, e);
            }
        }
    }

    if let Some((client_file, outcome)) = &summary.client {
        println!("\n{}", "Patching aggregate client:".bold());
        match outcome {
            Ok(PatchOutcome::Patched) => println!(
                "  {} Wired {} parent-child assignments into {}",
                "✓".green(),
                summary.pairs.len(),
                client_file.display()
            ),
            Ok(PatchOutcome::AlreadyPatched) => {
                println!("  {} Client already patched", "ℹ".blue());
            }
            Ok(PatchOutcome::NoChanges) => {
                println!("  {} Nothing to wire", "ℹ".blue());
            }
            Err(e) => eprintln!("  {} Skipping client: {}", "⚠".yellow(), e),
        }
    }

    println!("\n{}", "✓ Patching complete!".green().bold());
    println!("\n{}", "Summary:".bold());
    println!("  Patched: {}", summary.patched_count());
    println!("  Already patched: {}", summary.already_patched_count());
    println!("  Skipped: {}", summary.skipped_count());
}
