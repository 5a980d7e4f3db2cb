mod cli;
mod prompts;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use log::LevelFilter;
use std::path::Path;

use parts_core::db::{self, export_backend_to_json, import_json_to_backend, migrate};
use parts_core::{
    format_price, resolve_database_config, to_display_line, DeleteOutcome, Field, InventoryError,
    PartController, PartForm, SparePart, UpdateOutcome,
};

use crate::cli::{Cli, Command, DbCommand, PartFields};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    // RUST_LOG, when set, overrides the verbosity flag
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = resolve_database_config(cli.db.as_deref(), cli.backend.map(Into::into))?;
    log::debug!("Using {} inventory at {:?}", config.backend_type, config.path);
    let controller = PartController::new(db::open(&config)?);

    match &cli.command {
        Command::Add { fields, interactive } => add_part(&controller, fields, *interactive),
        Command::List => list_parts(&controller),
        Command::Show { part_id } => show_part(&controller, part_id),
        Command::Edit {
            part_id,
            name,
            car_model,
            price,
            stock,
        } => {
            let overrides = PartFields {
                part_id: None,
                name: name.clone(),
                car_model: car_model.clone(),
                price: price.clone(),
                stock: stock.clone(),
            };
            edit_part(&controller, part_id, &overrides)
        }
        Command::Select => select_part(&controller),
        Command::Del { part_id, yes } => delete_part(&controller, part_id, *yes),
        Command::Db(db_cmd) => handle_db_command(&controller, db_cmd),
    }
}

fn form_from_fields(fields: &PartFields) -> PartForm {
    let given = [
        (Field::PartId, &fields.part_id),
        (Field::Name, &fields.name),
        (Field::CarModel, &fields.car_model),
        (Field::Price, &fields.price),
        (Field::Stock, &fields.stock),
    ];
    PartForm::from_pairs(
        given
            .into_iter()
            .filter_map(|(field, value)| value.clone().map(|v| (field.key(), v))),
    )
}

fn add_part(controller: &PartController, fields: &PartFields, interactive: bool) -> Result<()> {
    let mut form = form_from_fields(fields);
    let interactive = interactive || form.is_blank();
    if interactive {
        form = prompts::prompt_new_part(&form)?;
    }

    loop {
        match controller.create(&form) {
            Ok(part) => {
                println!("{}", "Spare part added successfully!".green());
                println!("{}", to_display_line(&part));
                return Ok(());
            }
            // Interactive sessions get another go at the offending fields
            Err(InventoryError::Validation(err)) if interactive => {
                eprintln!("{} {}", "Error:".red(), err);
                form = prompts::prompt_fields(&form, &err.fields())?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn list_parts(controller: &PartController) -> Result<()> {
    let rows = controller.display_rows()?;

    if rows.is_empty() {
        println!("{}", "No spare parts found.".yellow());
        return Ok(());
    }

    println!("{}", "Available Parts".bold());
    println!("{}", "-".repeat(60));
    for row in rows {
        println!("{}", row.line);
    }

    Ok(())
}

fn print_part(part: &SparePart) {
    println!("{}: {}", "Part ID".blue(), part.part_id);
    println!("{}: {}", "Part Name".blue(), part.name);
    println!("{}: {}", "Compatible Car Model".blue(), part.car_model);
    println!("{}: Rs.{}", "Price".blue(), format_price(part.price));
    println!("{}: {}", "Stock Quantity".blue(), part.stock);
}

fn show_part(controller: &PartController, part_id: &str) -> Result<()> {
    match controller.get(part_id)? {
        Some(part) => print_part(&part),
        None => println!("{}", "Part not found.".yellow()),
    }
    Ok(())
}

fn edit_part(controller: &PartController, part_id: &str, overrides: &PartFields) -> Result<()> {
    let Some(current) = controller.edit_form(part_id)? else {
        println!("{}", "Part not found.".yellow());
        return Ok(());
    };

    let form = if overrides.is_empty() {
        prompts::prompt_edit_part(&current)?
    } else {
        let mut form = current.clone();
        if let Some(name) = &overrides.name {
            form.name = name.clone();
        }
        if let Some(car_model) = &overrides.car_model {
            form.car_model = car_model.clone();
        }
        if let Some(price) = &overrides.price {
            form.price = price.clone();
        }
        if let Some(stock) = &overrides.stock {
            form.stock = stock.clone();
        }
        form
    };

    apply_update(controller, part_id, &form)
}

fn apply_update(controller: &PartController, part_id: &str, form: &PartForm) -> Result<()> {
    match controller.update(part_id, form)? {
        UpdateOutcome::Updated(part) => {
            println!("{}", "Spare part updated successfully!".green());
            println!("{}", to_display_line(&part));
        }
        UpdateOutcome::NoChanges => {
            println!("{}", "No changes made or Part not found.".yellow());
        }
    }
    Ok(())
}

fn select_part(controller: &PartController) -> Result<()> {
    let rows = controller.display_rows()?;

    if rows.is_empty() {
        println!("{}", "No spare parts found.".yellow());
        return Ok(());
    }

    let part_id = prompts::prompt_select_part(&rows)?;
    edit_part(controller, &part_id, &PartFields::default())
}

fn delete_part(controller: &PartController, part_id: &str, skip_confirm: bool) -> Result<()> {
    if !skip_confirm {
        let Some(part) = controller.get(part_id)? else {
            println!("{}", "Part not found.".yellow());
            return Ok(());
        };
        println!("{}", "Part to delete:".yellow());
        println!("  {}", to_display_line(&part));

        let confirm = inquire::Confirm::new("Are you sure you want to delete this part?")
            .with_default(false)
            .prompt()?;

        if !confirm {
            println!("{}", "Deletion cancelled.".yellow());
            return Ok(());
        }
    }

    match controller.delete(part_id)? {
        DeleteOutcome::Deleted => println!("{}", "Spare part deleted successfully!".green()),
        DeleteOutcome::NotFound => println!("{}", "Part not found.".yellow()),
    }
    Ok(())
}

fn handle_db_command(controller: &PartController, cmd: &DbCommand) -> Result<()> {
    let store = controller.store();

    match cmd {
        DbCommand::Stats => {
            let stats = store.stats()?;
            println!("{}: {:?}", "Path".blue(), store.path());
            println!("{}: {}", "Backend".blue(), stats.backend_type);
            println!("{}: {}", "Parts".blue(), stats.part_count);
            println!("{}: {}", "Units in stock".blue(), stats.total_units);
            println!("{}: Rs.{:.2}", "Stock value".blue(), stats.stock_value);
        }
        DbCommand::Migrate { dest } => {
            ensure_distinct(store.path(), dest)?;
            let destination = db::create_backend(dest, None)?;
            let count = migrate(store, destination.as_ref())?;
            println!(
                "{}",
                format!("Migrated {} part(s) to {:?} ({})", count, dest, destination.backend_type())
                    .green()
            );
        }
        DbCommand::Export { output } => {
            let count = export_backend_to_json(store, output)
                .with_context(|| format!("Failed to export to {:?}", output))?;
            println!("{}", format!("Exported {} part(s) to {:?}", count, output).green());
        }
        DbCommand::Import { input, yes } => {
            if !*yes {
                let confirm = inquire::Confirm::new(
                    "Importing replaces every part in the current inventory. Continue?",
                )
                .with_default(false)
                .prompt()?;
                if !confirm {
                    println!("{}", "Import cancelled.".yellow());
                    return Ok(());
                }
            }
            let count = import_json_to_backend(input, store)
                .with_context(|| format!("Failed to import from {:?}", input))?;
            println!("{}", format!("Imported {} part(s) from {:?}", count, input).green());
        }
    }

    Ok(())
}

fn ensure_distinct(source: &Path, dest: &Path) -> Result<()> {
    if source == dest {
        anyhow::bail!("Destination is the current database: {:?}", dest);
    }
    Ok(())
}
