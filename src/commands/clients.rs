//! Record command handlers.

use super::{apply_fields, parse_fields, print_page};
use gasledger::io::Column;
use gasledger::models::{ClientId, ClientRecord};
use gasledger::{ClientRegistry, Error, Result};

/// Creates a record and prints its id.
pub fn cmd_add(
    registry: &ClientRegistry,
    account_number: String,
    full_name: String,
    fields: &[String],
) -> Result<()> {
    let fields = parse_fields(fields)?;
    let mut record = ClientRecord::new(account_number, full_name);
    apply_fields(&mut record, &fields);

    let id = registry.create(&record)?;
    println!("Created client {}", id.get());
    Ok(())
}

/// Changes fields of an existing record.
pub fn cmd_update(registry: &ClientRegistry, id: i64, fields: &[String]) -> Result<()> {
    let fields = parse_fields(fields)?;
    if fields.is_empty() {
        return Err(Error::InvalidInput(
            "Nothing to update: pass at least one --field LABEL=VALUE".to_string(),
        ));
    }

    let mut record = registry
        .get(ClientId::new(id))?
        .ok_or_else(|| Error::InvalidInput(format!("Client {id} not found")))?;
    apply_fields(&mut record, &fields);

    registry.update(&record)?;
    println!("Updated client {id}");
    Ok(())
}

/// Deletes a record.
pub fn cmd_delete(registry: &ClientRegistry, id: i64) -> Result<()> {
    if registry.delete(ClientId::new(id))? {
        println!("Deleted client {id}");
    } else {
        println!("Client {id} not found");
    }
    Ok(())
}

/// Prints one record, as labelled lines or JSON.
pub fn cmd_get(registry: &ClientRegistry, id: i64, json: bool) -> Result<()> {
    let Some(record) = registry.get(ClientId::new(id))? else {
        return Err(Error::InvalidInput(format!("Client {id} not found")));
    };

    if json {
        let text = serde_json::to_string_pretty(&record).map_err(|e| Error::OperationFailed {
            operation: "serialize_client".to_string(),
            cause: e.to_string(),
        })?;
        println!("{text}");
        return Ok(());
    }

    println!("ID: {id}");
    for column in Column::ALL {
        let value = column.value(&record);
        if !value.is_empty() {
            println!("{}: {value}", column.header());
        }
    }
    Ok(())
}

/// Prints one page of all records in id order.
pub fn cmd_list(registry: &ClientRegistry, page: usize, page_size: usize) -> Result<()> {
    let page = registry.page(page, page_size)?;
    if page.total == 0 {
        println!("No clients stored.");
        return Ok(());
    }
    print_page(&page);
    Ok(())
}

/// Prints the record count.
pub fn cmd_count(registry: &ClientRegistry) -> Result<()> {
    println!("{}", registry.count()?);
    Ok(())
}
