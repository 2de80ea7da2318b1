//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands. Each
//! function loads what it needs through the [`App`] context, performs the
//! operation, saves when it mutated something, and hands the result to the
//! output layer.

use anyhow::Result;

use super::args::{
    DepsAction, DepsArgs, DiscoverArgs, InfoArgs, InitArgs, LintArgs, OrphansArgs, OwnerAction,
    OwnerArgs, SearchArgs, ServiceAction, ServiceArgs, SystemAction, SystemArgs,
};
use crate::app::App;
use crate::domain::{
    CatalogSnapshot, Dependency, NewOwner, NewService, NewSystem, Owner, OwnerId, Service,
    ServiceFilter, ServiceId, ServiceUpdate, System, SystemId,
};
use crate::error::Error;
use crate::output::{self, OutputMode};
use crate::relations::{self, Resolved};
use crate::{discover, graph, lint, search};

/// Execute the init command
pub async fn execute_init(_args: &InitArgs, quiet: bool) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;
    let result = init::init(&current_dir).await?;

    if !quiet {
        println!("Initialized berth in {}", result.berth_dir.display());
        println!("  Config: {}", result.config_file.display());
        for data_file in &result.data_files {
            println!("  Data:   {}", data_file.display());
        }
    }

    Ok(())
}

/// Execute the info command
pub async fn execute_info(app: &App, _args: &InfoArgs, mode: OutputMode) -> Result<()> {
    let snapshot = app.snapshot().await?;
    let berth_dir = app.berth_dir();

    match mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "berth_dir": berth_dir.display().to_string(),
                "records": {
                    "services": snapshot.services.len(),
                    "systems": snapshot.systems.len(),
                    "owners": snapshot.owners.len(),
                }
            }))?;
        }
        OutputMode::Text => {
            println!("Berth Repository Information");
            println!("============================");
            println!();
            println!("Data directory: {}", berth_dir.display());
            println!();
            println!(
                "Records: {} services, {} systems, {} owners",
                snapshot.services.len(),
                snapshot.systems.len(),
                snapshot.owners.len()
            );
        }
        OutputMode::Quiet => {
            println!(
                "{} {} {}",
                snapshot.services.len(),
                snapshot.systems.len(),
                snapshot.owners.len()
            );
        }
    }

    Ok(())
}

// ============================================================================
// Key resolution
// ============================================================================

fn resolve_service_strict(snapshot: &CatalogSnapshot, key: &str) -> Result<Service, Error> {
    match relations::resolve_service(&snapshot.services, key) {
        Resolved::Found(service) => Ok(service.clone()),
        Resolved::Ambiguous(count) => Err(Error::AmbiguousName {
            name: key.to_string(),
            count,
        }),
        Resolved::Unknown => Err(Error::ServiceNotFound(ServiceId::new(key))),
    }
}

fn resolve_system_strict(snapshot: &CatalogSnapshot, key: &str) -> Result<System, Error> {
    match relations::resolve_system(&snapshot.systems, key) {
        Resolved::Found(system) => Ok(system.clone()),
        Resolved::Ambiguous(count) => Err(Error::AmbiguousName {
            name: key.to_string(),
            count,
        }),
        Resolved::Unknown => Err(Error::SystemNotFound(SystemId::new(key))),
    }
}

fn resolve_owner_strict(snapshot: &CatalogSnapshot, key: &str) -> Result<Owner, Error> {
    match relations::resolve_owner(&snapshot.owners, key) {
        Resolved::Found(owner) => Ok(owner.clone()),
        Resolved::Ambiguous(count) => Err(Error::AmbiguousName {
            name: key.to_string(),
            count,
        }),
        Resolved::Unknown => Err(Error::OwnerNotFound(OwnerId::new(key))),
    }
}

/// Resolve a dependency target leniently: a known id or name resolves to
/// the record's id, anything else is stored verbatim for lint to flag.
fn resolve_dependency_target(snapshot: &CatalogSnapshot, key: &str) -> ServiceId {
    relations::resolve_service(&snapshot.services, key)
        .found()
        .map_or_else(|| ServiceId::new(key), |service| service.id.clone())
}

/// Ask for confirmation on the terminal unless `--force` was given.
fn confirm_removal(what: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    eprint!("Remove {what}? [y/N] ");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim(), "y" | "Y" | "yes"))
}

// ============================================================================
// Service commands
// ============================================================================

/// Execute a `service` subcommand
pub async fn execute_service(app: &mut App, args: &ServiceArgs, mode: OutputMode) -> Result<()> {
    match &args.action {
        ServiceAction::Add {
            name,
            description,
            system,
            owner,
            lifecycle,
            deps,
            tags,
        } => {
            let snapshot = app.snapshot().await?;

            let system = system
                .as_deref()
                .map(|key| resolve_system_strict(&snapshot, key))
                .transpose()?
                .map(|s| s.id);
            let owner = owner
                .as_deref()
                .map(|key| resolve_owner_strict(&snapshot, key))
                .transpose()?
                .map(|o| o.id);
            let depends_on = deps
                .iter()
                .map(|key| Dependency {
                    service: resolve_dependency_target(&snapshot, key),
                    api: None,
                    description: None,
                })
                .collect();

            let service = app
                .storage_mut()
                .create_service(NewService {
                    name: name.clone(),
                    description: description.clone(),
                    system,
                    owner,
                    lifecycle: lifecycle.map(Into::into),
                    depends_on,
                    apis: vec![],
                    tags: tags.clone(),
                })
                .await?;
            app.save().await?;

            match mode {
                OutputMode::Json => output::print_json(&service)?,
                OutputMode::Text => println!("Created service: {}", service.id),
                OutputMode::Quiet => println!("{}", service.id),
            }
        }

        ServiceAction::List {
            system,
            owner,
            lifecycle,
            tag,
            limit,
        } => {
            let snapshot = app.snapshot().await?;

            let filter = ServiceFilter {
                system: system
                    .as_deref()
                    .map(|key| resolve_system_strict(&snapshot, key))
                    .transpose()?
                    .map(|s| s.id),
                owner: owner
                    .as_deref()
                    .map(|key| resolve_owner_strict(&snapshot, key))
                    .transpose()?
                    .map(|o| o.id),
                lifecycle: lifecycle.map(Into::into),
                tag: tag.clone(),
                limit: Some(*limit),
            };

            let services = app.storage().list_services(&filter).await?;
            output::print_service_list(&snapshot, &services, mode)?;
        }

        ServiceAction::Show { service } => {
            let snapshot = app.snapshot().await?;
            let service = resolve_service_strict(&snapshot, service)?;
            output::print_service_details(&snapshot, &service, mode)?;
        }

        ServiceAction::Update {
            service,
            name,
            description,
            system,
            owner,
            lifecycle,
            tags,
        } => {
            let snapshot = app.snapshot().await?;
            let target = resolve_service_strict(&snapshot, service)?;

            let update = ServiceUpdate {
                name: name.clone(),
                description: description.clone(),
                system: system
                    .as_deref()
                    .map(|key| resolve_system_strict(&snapshot, key))
                    .transpose()?
                    .map(|s| Some(s.id)),
                owner: owner
                    .as_deref()
                    .map(|key| resolve_owner_strict(&snapshot, key))
                    .transpose()?
                    .map(|o| Some(o.id)),
                lifecycle: lifecycle.map(|l| Some(l.into())),
                tags: tags.clone(),
            };

            let updated = app.storage_mut().update_service(&target.id, update).await?;
            app.save().await?;

            match mode {
                OutputMode::Json => output::print_json(&updated)?,
                OutputMode::Text => println!("Updated service: {}", updated.id),
                OutputMode::Quiet => println!("{}", updated.id),
            }
        }

        ServiceAction::Rm { service, force } => {
            let snapshot = app.snapshot().await?;
            let target = resolve_service_strict(&snapshot, service)?;

            if !confirm_removal(&format!("service '{}'", target.name), *force)? {
                println!("Aborted.");
                return Ok(());
            }

            app.storage_mut().delete_service(&target.id).await?;
            app.save().await?;

            match mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "deleted": target.id.as_str(),
                }))?,
                OutputMode::Text => println!("Removed service: {}", target.id),
                OutputMode::Quiet => {}
            }
        }
    }

    Ok(())
}

// ============================================================================
// System commands
// ============================================================================

/// Execute a `system` subcommand
pub async fn execute_system(app: &mut App, args: &SystemArgs, mode: OutputMode) -> Result<()> {
    match &args.action {
        SystemAction::Add {
            name,
            description,
            owner,
        } => {
            let snapshot = app.snapshot().await?;
            let owner = owner
                .as_deref()
                .map(|key| resolve_owner_strict(&snapshot, key))
                .transpose()?
                .map(|o| o.id);

            let system = app
                .storage_mut()
                .create_system(NewSystem {
                    name: name.clone(),
                    description: description.clone(),
                    owner,
                })
                .await?;
            app.save().await?;

            match mode {
                OutputMode::Json => output::print_json(&system)?,
                OutputMode::Text => println!("Created system: {}", system.id),
                OutputMode::Quiet => println!("{}", system.id),
            }
        }

        SystemAction::List {} => {
            let snapshot = app.snapshot().await?;
            let systems = app.storage().list_systems().await?;
            output::print_system_list(&snapshot, &systems, mode)?;
        }

        SystemAction::Rm { system, force } => {
            let snapshot = app.snapshot().await?;
            let target = resolve_system_strict(&snapshot, system)?;

            if !confirm_removal(&format!("system '{}'", target.name), *force)? {
                println!("Aborted.");
                return Ok(());
            }

            app.storage_mut().delete_system(&target.id).await?;
            app.save().await?;

            match mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "deleted": target.id.as_str(),
                }))?,
                OutputMode::Text => println!("Removed system: {}", target.id),
                OutputMode::Quiet => {}
            }
        }
    }

    Ok(())
}

// ============================================================================
// Owner commands
// ============================================================================

/// Execute an `owner` subcommand
pub async fn execute_owner(app: &mut App, args: &OwnerArgs, mode: OutputMode) -> Result<()> {
    match &args.action {
        OwnerAction::Add { name, description } => {
            let owner = app
                .storage_mut()
                .create_owner(NewOwner {
                    name: name.clone(),
                    description: description.clone(),
                })
                .await?;
            app.save().await?;

            match mode {
                OutputMode::Json => output::print_json(&owner)?,
                OutputMode::Text => println!("Created owner: {}", owner.id),
                OutputMode::Quiet => println!("{}", owner.id),
            }
        }

        OwnerAction::List {} => {
            let snapshot = app.snapshot().await?;
            let owners = app.storage().list_owners().await?;
            output::print_owner_list(&snapshot, &owners, mode)?;
        }

        OwnerAction::Rm { owner, force } => {
            let snapshot = app.snapshot().await?;
            let target = resolve_owner_strict(&snapshot, owner)?;

            if !confirm_removal(&format!("owner '{}'", target.name), *force)? {
                println!("Aborted.");
                return Ok(());
            }

            app.storage_mut().delete_owner(&target.id).await?;
            app.save().await?;

            match mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "deleted": target.id.as_str(),
                }))?,
                OutputMode::Text => println!("Removed owner: {}", target.id),
                OutputMode::Quiet => {}
            }
        }
    }

    Ok(())
}

// ============================================================================
// Dependency commands
// ============================================================================

/// Execute a `deps` subcommand
pub async fn execute_deps(app: &mut App, args: &DepsArgs, mode: OutputMode) -> Result<()> {
    match &args.action {
        DepsAction::Tree {
            service,
            direction,
            depth,
        } => {
            let snapshot = app.snapshot().await?;
            // The not-found diagnostic lives here; the graph engine itself
            // answers tolerantly for any id it is given.
            let target = resolve_service_strict(&snapshot, service)?;

            let report = graph::resolve_deps(
                target.id.as_str(),
                &snapshot.services,
                *depth,
                direction.map(Into::into),
            );
            output::print_deps_report(&report, mode)?;
        }

        DepsAction::Add {
            from,
            to,
            api,
            description,
        } => {
            let snapshot = app.snapshot().await?;
            let from = resolve_service_strict(&snapshot, from)?;
            let to = resolve_dependency_target(&snapshot, to);

            app.storage_mut()
                .add_dependency(
                    &from.id,
                    Dependency {
                        service: to.clone(),
                        api: api.clone(),
                        description: description.clone(),
                    },
                )
                .await?;
            app.save().await?;

            match mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "from": from.id.as_str(),
                    "to": to.as_str(),
                }))?,
                OutputMode::Text => println!("Added dependency: {} -> {}", from.id, to),
                OutputMode::Quiet => {}
            }
        }

        DepsAction::Rm { from, to } => {
            let snapshot = app.snapshot().await?;
            let from = resolve_service_strict(&snapshot, from)?;
            let to = resolve_dependency_target(&snapshot, to);

            app.storage_mut().remove_dependency(&from.id, &to).await?;
            app.save().await?;

            match mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "from": from.id.as_str(),
                    "removed": to.as_str(),
                }))?,
                OutputMode::Text => println!("Removed dependency: {} -> {}", from.id, to),
                OutputMode::Quiet => {}
            }
        }
    }

    Ok(())
}

/// Execute the orphans command
pub async fn execute_orphans(app: &App, _args: &OrphansArgs, mode: OutputMode) -> Result<()> {
    let snapshot = app.snapshot().await?;
    let orphans = graph::find_orphans(&snapshot.services);
    output::print_orphans(&orphans, mode)?;
    Ok(())
}

/// Execute the lint command.
///
/// The checker itself only returns data; the exit-code policy lives here:
/// any error-severity finding fails the command, warnings never do.
pub async fn execute_lint(app: &App, args: &LintArgs, mode: OutputMode) -> Result<()> {
    let snapshot = app.snapshot().await?;
    let mut report = lint::check_catalog(&snapshot);

    if args.errors_only {
        report
            .findings
            .retain(|finding| finding.severity == lint::Severity::Error);
    }

    output::print_lint_report(&report, mode)?;

    if !report.passed() {
        anyhow::bail!("catalog check failed: {} error(s)", report.error_count());
    }

    Ok(())
}

/// Execute the search command
pub async fn execute_search(app: &App, args: &SearchArgs, mode: OutputMode) -> Result<()> {
    let snapshot = app.snapshot().await?;
    let mut hits = search::search(&snapshot, &args.query);
    hits.truncate(args.limit);
    output::print_search_hits(&hits, mode)?;
    Ok(())
}

/// Execute the discover command
pub async fn execute_discover(app: &mut App, args: &DiscoverArgs, mode: OutputMode) -> Result<()> {
    let (manifests, warnings) = discover::scan_manifests(&args.dir)?;

    for warning in &warnings {
        tracing::warn!(warning = %warning, "discovery warning");
        if mode == OutputMode::Text {
            eprintln!("warning: {warning}");
        }
    }

    if args.dry_run {
        match mode {
            OutputMode::Json => output::print_json(&serde_json::json!({
                "found": manifests.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
                "warnings": warnings.len(),
            }))?,
            OutputMode::Text => {
                println!("Found {} manifest(s):", manifests.len());
                for manifest in &manifests {
                    println!("  {}", manifest.name);
                }
            }
            OutputMode::Quiet => {
                for manifest in &manifests {
                    println!("{}", manifest.name);
                }
            }
        }
        return Ok(());
    }

    let report = discover::import_manifests(app.storage_mut(), manifests).await?;
    app.save().await?;

    match mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "imported": report.created.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
            "skipped": report
                .skipped
                .iter()
                .map(|(name, reason)| serde_json::json!({"name": name, "reason": reason}))
                .collect::<Vec<_>>(),
            "warnings": warnings.len(),
        }))?,
        OutputMode::Text => {
            println!(
                "Imported {} service(s), skipped {}",
                report.created.len(),
                report.skipped.len()
            );
            for service in &report.created {
                println!("  + {} ({})", service.name, service.id);
            }
            for (name, reason) in &report.skipped {
                println!("  - {name}: {reason}");
            }
        }
        OutputMode::Quiet => {
            for service in &report.created {
                println!("{}", service.id);
            }
        }
    }

    Ok(())
}
