//! Subcommand handlers

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tagdesk_core::{
    AttendeeField, ContextBinder, Error, PrintStatus, Result, Session, StepRegistry,
    TemplateEngine, TextTemplate, TicketingApi,
};
use tagdesk_net::TicketingClient;

use crate::state::AppState;
use crate::{BindArgs, Command};

/// Run one command against the resumed session
pub fn run(command: Command, state: &mut AppState) -> Result<()> {
    let changed = match command {
        Command::Connect { api_key } => {
            let (_, user) = TicketingClient::connect(&state.config.api_base_url, api_key.clone())?;
            println!("Logged in as {} ({})", user.name, user.id);
            state.session.api_key = api_key;
            true
        }
        Command::Orgs => {
            for org in state.client()?.fetch_organizations()? {
                println!("{}\t{}", org.id, org.name);
            }
            false
        }
        Command::Events { org_id } => {
            for event in state.client()?.fetch_events(&org_id)? {
                println!("{}\t{}\t{}", event.id, event.start_local, event.name);
            }
            false
        }
        Command::Load {
            event_id,
            overwrite,
        } => {
            let client = state.client()?;
            let report = state.session.load_event(&client, &event_id, overwrite)?;
            if report.cleared {
                println!("Switched event, previous attendees cleared");
            }
            println!(
                "{} new, {} refreshed, {} kept, {} rejected",
                report.merge.inserted,
                report.merge.replaced,
                report.merge.kept,
                report.rejected.len()
            );
            for err in &report.rejected {
                println!("  rejected: {}", err);
            }
            true
        }
        Command::List { status } => {
            list(&state.session, status.map(PrintStatus::from));
            false
        }
        Command::Status {
            attendee_id,
            status,
        } => {
            state
                .session
                .registry
                .set_printing_status(&attendee_id, status.into())?;
            true
        }
        Command::Edit {
            attendee_id,
            field,
            value,
        } => {
            let field = AttendeeField::parse(&field)?;
            state
                .session
                .registry
                .update_field(&attendee_id, field, value)?;
            true
        }
        Command::Values { field } => {
            let field = AttendeeField::parse(&field)?;
            for (value, count) in state.session.registry.value_counts(field) {
                println!("{:>5}  {}", count, value);
            }
            false
        }
        Command::Replace { field, from, to } => {
            let field = AttendeeField::parse(&field)?;
            let replacements = BTreeMap::from([(from, to)]);
            let changed = state
                .session
                .registry
                .replace_values(field, &replacements)?;
            println!("{} attendees updated", changed);
            changed > 0
        }
        Command::Template { path } => {
            let engine = TextTemplate::load(&path)?;
            select_template(&mut state.session, &path, &engine)?;
            true
        }
        Command::Bind(args) => {
            bind(&mut state.session.nametag.binder, args)?;
            true
        }
        Command::Unbind { variable } => {
            state
                .session
                .nametag
                .binder
                .unbind(&variable)
                .ok_or_else(|| Error::NotFound(format!("no binding for {}", variable)))?;
            true
        }
        Command::Step { name } => match name {
            None => {
                list_steps(&state.session, &StepRegistry::builtin());
                false
            }
            Some(name) => {
                select_step(&mut state.session, &StepRegistry::builtin(), &name)?;
                true
            }
        },
        Command::Generate {
            output_dir,
            no_mark,
        } => {
            generate(state, &output_dir, !no_mark)?;
            true
        }
        Command::History => {
            for path in state.store.history()? {
                println!("{}", path.display());
            }
            false
        }
        Command::Restore { path } => {
            let record = state.store.load(&path)?;
            state.session.restore_in_place(record)?;
            println!(
                "Restored {} attendees from {}",
                state.session.registry.len(),
                path.display()
            );
            true
        }
    };

    if changed {
        state.save()?;
    }
    Ok(())
}

fn list(session: &Session, filter: Option<PrintStatus>) {
    let registry = &session.registry;
    if let Some(event) = registry.active_event() {
        println!("{} ({}, {})", event.name, event.id, event.start_local);
    }

    for attendee in registry
        .iter()
        .filter(|a| filter.map_or(true, |s| a.printing_status == s))
    {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            attendee.id(),
            attendee.printing_status,
            attendee.full_name(),
            attendee.company,
            attendee.email
        );
    }

    let counts = registry.status_counts();
    let summary: Vec<String> = PrintStatus::all()
        .iter()
        .map(|s| format!("{} {}", counts.get(s).copied().unwrap_or(0), s))
        .collect();
    println!("{} attendees: {}", registry.len(), summary.join(", "));
}

fn select_template(session: &mut Session, path: &Path, engine: &TextTemplate) -> Result<()> {
    let pruned = session.set_template(path, engine)?;
    let discovered = engine.discover_variables()?;
    let unbound = session.nametag.binder.unbound(&discovered);

    println!("Template {} declares {} variables", path.display(), discovered.len());
    if pruned > 0 {
        println!("Removed {} bindings the template no longer uses", pruned);
    }
    if !unbound.is_empty() {
        println!("Unbound: {}", unbound.join(", "));
    }
    let slots: BTreeSet<String> = engine.image_slots();
    if !slots.is_empty() {
        println!("Image slots: {}", slots.into_iter().collect::<Vec<_>>().join(", "));
    }
    Ok(())
}

fn bind(binder: &mut ContextBinder, args: BindArgs) -> Result<()> {
    match (args.field, args.literal) {
        (Some(field), _) => {
            AttendeeField::parse(&field)?;
            binder.bind(args.variable, true, field)?;
        }
        (None, Some(text)) => {
            binder.bind(args.variable, false, text)?;
        }
        (None, None) => {
            return Err(Error::InvalidOperation(
                "bind needs --field or --literal".into(),
            ))
        }
    }
    Ok(())
}

fn list_steps(session: &Session, steps: &StepRegistry) {
    for (index, name) in steps.names().enumerate() {
        let marker = if session.nametag.custom_step == Some(index) {
            "*"
        } else {
            " "
        };
        let label = steps.get(name).map(|s| s.label).unwrap_or_default();
        println!("{} {}\t{}", marker, name, label);
    }
}

fn select_step(session: &mut Session, steps: &StepRegistry, name: &str) -> Result<()> {
    session.nametag.custom_step = if name == "none" {
        None
    } else {
        Some(
            steps
                .index_of(name)
                .ok_or_else(|| Error::UnknownRenderStep(name.to_string()))?,
        )
    };
    Ok(())
}

fn generate(state: &mut AppState, output_dir: &Path, mark_printed: bool) -> Result<()> {
    let mut engine = state.template()?;
    let report = state.session.generate(
        &mut engine,
        &StepRegistry::builtin(),
        output_dir,
        mark_printed,
    )?;

    println!(
        "Generated {} nametags in {} ({} skipped)",
        report.success_count(),
        output_dir.display(),
        report.skipped
    );
    for failure in &report.failures {
        println!("  failed {}: {}", failure.attendee_id, failure.error);
    }
    Ok(())
}
