use serde_json::json;

use crate::cli::{Context, SettingCommands};
use crate::db::{dealership_repo, setting_repo};
use crate::error::ShiftopsError;
use crate::models::{ArchiveSettings, SettingKey};
use crate::output;

pub fn run(cmd: SettingCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        SettingCommands::Set { key, value, dealership } => {
            run_set(&key, &value, dealership.as_deref(), ctx)
        }
        SettingCommands::Get { key, dealership } => run_get(&key, dealership.as_deref(), ctx),
        SettingCommands::List { dealership } => run_list(dealership.as_deref(), ctx),
    };
    ctx.finish(result)
}

fn parse_key(key: &str) -> Result<SettingKey, ShiftopsError> {
    SettingKey::from_str(key).ok_or_else(|| {
        let known: Vec<_> = SettingKey::ALL.iter().map(|k| k.as_str()).collect();
        ShiftopsError::validation(format!("Unknown setting '{key}'. Known: {}", known.join(", ")))
    })
}

fn run_set(key: &str, value: &str, dealership_ref: Option<&str>, ctx: &Context) -> Result<i32, ShiftopsError> {
    let key = parse_key(key)?;
    let value = value.trim();
    // Same parser the sweeps use.
    ArchiveSettings::from_lookup(|k| Ok((k == key).then(|| value.to_string())))?;

    let conn = ctx.open()?;
    let dealership = dealership_ref
        .map(|reference| dealership_repo::resolve_dealership(&conn, reference))
        .transpose()?;
    let scope = dealership.as_ref().map(|d| d.id.as_str());
    setting_repo::set_setting(&conn, scope, key.as_str(), value)?;

    if ctx.json {
        output::json::print_success(json!({
            "setting": { "dealership_id": scope, "key": key.as_str(), "value": value }
        }));
    } else {
        let scope_name = dealership.as_ref().map(|d| d.name.as_str()).unwrap_or("global");
        println!("Set {} = {} [{}]", key.as_str(), value, scope_name);
    }
    Ok(0)
}

fn run_get(key: &str, dealership_ref: Option<&str>, ctx: &Context) -> Result<i32, ShiftopsError> {
    let key = parse_key(key)?;
    let conn = ctx.open()?;
    let dealership = dealership_ref
        .map(|reference| dealership_repo::resolve_dealership(&conn, reference))
        .transpose()?;

    let scoped = match &dealership {
        Some(d) => setting_repo::get_scoped(&conn, Some(&d.id), key.as_str())?,
        None => None,
    };
    let (value, source) = match scoped {
        Some(value) => (value, "dealership"),
        None => match setting_repo::get_scoped(&conn, None, key.as_str())? {
            Some(value) => (value, "global"),
            None => (ArchiveSettings::default().value_of(key), "default"),
        },
    };

    if ctx.json {
        output::json::print_success(json!({
            "key": key.as_str(),
            "value": value,
            "source": source
        }));
    } else {
        println!("{} = {} ({source})", key.as_str(), value);
    }
    Ok(0)
}

fn run_list(dealership_ref: Option<&str>, ctx: &Context) -> Result<i32, ShiftopsError> {
    let conn = ctx.open()?;
    let dealership_id = match dealership_ref {
        Some(reference) => Some(dealership_repo::resolve_dealership(&conn, reference)?.id),
        None => None,
    };
    let settings = setting_repo::list_settings(&conn, dealership_id.as_deref())?;

    if ctx.json {
        output::json::print_success(json!({ "settings": settings }));
    } else {
        output::text::print_settings(&settings);
    }
    Ok(0)
}
