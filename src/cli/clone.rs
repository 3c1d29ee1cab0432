//! Clone CLI command
//!
//! `lbclone clone <source_namespace> <load_balancer> <dest_namespace> [domain]`

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;
use std::sync::Arc;

use super::config::{self, CliConfig};
use super::output::{self, OutputFormat};
use crate::domain::{CloneRequest, DomainStrategy};
use crate::services::{CloneOptions, CloneReport, Cloner, CopyOutcome, CopyRecord};
use crate::store::ObjectStore;

#[derive(Args, Debug, Clone)]
#[command(
    long_about = "Copy an HTTP load balancer and the app firewall, origin pools and health checks it uses into another namespace.\n\nDependencies already present in the destination are skipped, so a failed run can be repeated. Objects in the 'shared' namespace are referenced, never copied.",
    after_help = "EXAMPLES:\n    # Fixed domain, automatic certificate\n    lbclone clone ns-a lb1 ns-b example.com\n\n    # Keep the original domains with a random numeric suffix\n    lbclone clone ns-a lb1 ns-b\n\n    # Manual certificate present in the destination namespace\n    lbclone clone ns-a lb1 ns-b shop.example.com --certificate wildcard --tenant acme\n\n    # Show the sanitized bodies without creating anything\n    lbclone clone ns-a lb1 ns-b example.com --dry-run --output json"
)]
pub struct CloneArgs {
    /// Namespace holding the load balancer
    #[arg(value_name = "SOURCE_NAMESPACE")]
    pub source_namespace: String,

    /// Load balancer name
    #[arg(value_name = "LOAD_BALANCER")]
    pub load_balancer: String,

    /// Namespace to copy into
    #[arg(value_name = "DEST_NAMESPACE")]
    pub destination_namespace: String,

    /// Domain served by the copy; omit to suffix the original domains
    #[arg(value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// Tenant identifier (required with --certificate)
    #[arg(long, value_name = "TENANT")]
    pub tenant: Option<String>,

    /// Certificate in the destination namespace to serve HTTPS with
    #[arg(long, value_name = "NAME")]
    pub certificate: Option<String>,

    /// Sanitize everything and print the bodies, but create nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Objects created concurrently per dependency level
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..=64))]
    pub concurrency: u16,

    /// Print the run report (and dry-run bodies) as json or yaml
    #[arg(short, long, value_parser = ["json", "yaml"])]
    pub output: Option<String>,
}

impl CloneArgs {
    /// Build the clone request, resolving the tenant only when a certificate is given
    pub fn to_request(&self, config: &CliConfig) -> Result<CloneRequest> {
        let domain = match &self.domain {
            Some(domain) => DomainStrategy::Fixed(domain.clone()),
            None => DomainStrategy::RandomSuffix,
        };

        let mut request =
            CloneRequest::new(self.source_namespace.clone(), self.destination_namespace.clone(), domain);

        if let Some(certificate) = &self.certificate {
            let tenant = config::resolve_tenant(self.tenant.clone(), config)?;
            request = request.with_certificate(tenant, certificate.clone());
        }

        request.validate()?;
        Ok(request)
    }

    pub fn options(&self) -> CloneOptions {
        CloneOptions { concurrency: usize::from(self.concurrency), dry_run: self.dry_run }
    }
}

/// Handle the clone command
pub async fn handle_clone_command(
    args: CloneArgs,
    store: Arc<dyn ObjectStore>,
    config: &CliConfig,
) -> Result<()> {
    let request = args.to_request(config)?;
    let cloner = Cloner::new(store, request).with_options(args.options());

    let report = cloner
        .clone_load_balancer(&args.load_balancer)
        .await
        .with_context(|| format!("Failed to clone load balancer '{}'", args.load_balancer))?;

    match args.output.as_deref() {
        Some(format) => output::print_output(&report, format)?,
        None => {
            if report.dry_run {
                print_planned_bodies(&report)?;
            }
            print_summary(&report);
        }
    }

    Ok(())
}

/// Dry runs print every sanitized body as YAML documents
fn print_planned_bodies(report: &CloneReport) -> Result<()> {
    for record in report.with_outcome(CopyOutcome::Planned) {
        if let Some(body) = &record.body {
            println!("# {}", record.key);
            output::print_output_format(body, OutputFormat::Yaml)?;
            println!("---");
        }
    }
    Ok(())
}

fn outcome_label(outcome: CopyOutcome) -> String {
    match outcome {
        CopyOutcome::Created => "created".green().to_string(),
        CopyOutcome::Planned => "planned".cyan().to_string(),
        CopyOutcome::SkippedExisting => "exists".yellow().to_string(),
        CopyOutcome::SkippedShared => "shared".dimmed().to_string(),
    }
}

fn print_record(record: &CopyRecord) {
    println!(
        "{:<20} {:<40} {:<20} {}",
        record.key.kind.as_str(),
        output::truncate(&record.key.name, 38),
        output::truncate(&record.key.namespace, 18),
        outcome_label(record.outcome)
    );
}

fn print_summary(report: &CloneReport) {
    output::print_table_header(&[("Kind", 20), ("Name", 40), ("Source", 20), ("Outcome", 10)]);
    for record in &report.records {
        print_record(record);
    }
    println!();

    if let Some(suffix) = report.domain_suffix {
        println!("Domain suffix: {}", suffix);
    }

    let copied = report.copied_names().len();
    if report.dry_run {
        println!(
            "{} {} object(s) would be copied into '{}'",
            "Dry run:".cyan(),
            copied,
            report.destination_namespace
        );
    } else {
        println!(
            "{} {} object(s) copied into '{}'",
            "Clone complete:".green(),
            copied,
            report.destination_namespace
        );
    }
}
