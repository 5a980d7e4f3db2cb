use anyhow::Result;
use inquire::{Select, Text};

use parts_core::{DisplayRow, Field, PartForm};

/// Prompts the user for every field of a new part
pub fn prompt_new_part(initial: &PartForm) -> Result<PartForm> {
    prompt_fields(initial, &Field::ALL)
}

/// Prompts again for the given fields, starting from their current text
pub fn prompt_fields(initial: &PartForm, fields: &[Field]) -> Result<PartForm> {
    let mut form = initial.clone();
    for &field in fields {
        let current = form.get(field).to_string();
        let value = Text::new(&format!("{}:", field.label()))
            .with_initial_value(&current)
            .prompt()?;
        form.set(field, value);
    }
    Ok(form)
}

/// Prompts for new values of an existing part.
/// The part ID is not editable; empty input keeps the current value.
pub fn prompt_edit_part(current: &PartForm) -> Result<PartForm> {
    let mut form = current.clone();

    println!("Editing part: {}", current.part_id);
    println!("Leave field empty to keep current value");

    for field in Field::ALL.into_iter().filter(|f| *f != Field::PartId) {
        let prompt = format!("{} [{}]:", field.label(), current.get(field));
        let value = Text::new(&prompt).prompt()?;
        if !value.trim().is_empty() {
            form.set(field, value);
        }
    }

    Ok(form)
}

/// Prompts the user to pick a part from listing lines.
/// Returns the part ID kept alongside the chosen line.
pub fn prompt_select_part(rows: &[DisplayRow]) -> Result<String> {
    let options: Vec<String> = rows.iter().map(|r| r.line.clone()).collect();

    let selection = Select::new("Select a part:", options).raw_prompt()?;

    let row = rows
        .get(selection.index)
        .ok_or_else(|| anyhow::anyhow!("Selected row {} is out of range", selection.index))?;
    Ok(row.part_id.clone())
}
