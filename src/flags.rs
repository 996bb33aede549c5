use std::collections::BTreeMap;

use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;

use crate::schema::{OptionKind, OptionSchema};

/// Flags owned by the command itself. A schema property with one of these
/// names never shadows the built-in; colliding short aliases are dropped
/// while the long flag is kept.
pub const RESERVED_FLAGS: [&str; 8] = [
    "name",
    "collection",
    "dry-run",
    "force",
    "interactive",
    "defaults",
    "help",
    "version",
];

const RESERVED_SHORTS: [char; 4] = ['c', 'n', 'h', 'V'];

/// Project an option schema onto a command's flag set: one flag per
/// property, carrying the declared kind, alias, and description. Pure;
/// registration order only affects help-text display order.
pub fn build_flag_set(mut cmd: Command, schema: &OptionSchema) -> Command {
    let mut used_shorts: Vec<char> = RESERVED_SHORTS.to_vec();
    for (name, spec) in schema.iter() {
        if RESERVED_FLAGS.contains(&name.as_str()) {
            continue;
        }
        let mut arg = Arg::new(name.clone()).long(name.clone());
        if let Some(description) = &spec.description {
            arg = arg.help(description.clone());
        }
        if let Some(alias) = &spec.alias {
            arg = apply_alias(arg, alias, &mut used_shorts);
        }
        arg = match spec.kind {
            OptionKind::String => arg.action(ArgAction::Set),
            // Optional-value bool, so a declared `default: true` can still be
            // switched off with `--<flag> false`.
            OptionKind::Boolean => arg
                .action(ArgAction::Set)
                .num_args(0..=1)
                .default_missing_value("true")
                .value_parser(clap::value_parser!(bool)),
            OptionKind::Number => arg
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(f64)),
            OptionKind::Array => arg.action(ArgAction::Append),
        };
        cmd = cmd.arg(arg);
    }
    cmd
}

fn apply_alias(arg: Arg, alias: &str, used_shorts: &mut Vec<char>) -> Arg {
    let mut chars = alias.chars();
    match (chars.next(), chars.next()) {
        (Some(short), None) => {
            if used_shorts.contains(&short) {
                arg
            } else {
                used_shorts.push(short);
                arg.short(short)
            }
        }
        _ => arg.visible_alias(alias.to_string()),
    }
}

/// Project parsed matches back into a JSON-valued option map for the schema
/// properties. Absent flags fall back to the schema default when one is
/// declared, otherwise they are omitted.
pub fn collect_options(matches: &ArgMatches, schema: &OptionSchema) -> BTreeMap<String, Value> {
    let mut options = BTreeMap::new();
    for (name, spec) in schema.iter() {
        if RESERVED_FLAGS.contains(&name.as_str()) {
            continue;
        }
        let value = match spec.kind {
            OptionKind::String => matches
                .get_one::<String>(name)
                .map(|text| Value::String(text.clone()))
                .or_else(|| spec.default.clone()),
            OptionKind::Boolean => matches
                .get_one::<bool>(name)
                .map(|flag| Value::Bool(*flag))
                .or_else(|| spec.default.clone()),
            OptionKind::Number => matches
                .get_one::<f64>(name)
                .map(|number| Value::from(*number))
                .or_else(|| spec.default.clone()),
            OptionKind::Array => matches
                .get_many::<String>(name)
                .map(|values| {
                    Value::Array(values.map(|text| Value::String(text.clone())).collect())
                })
                .or_else(|| spec.default.clone()),
        };
        if let Some(value) = value {
            options.insert(name.clone(), value);
        }
    }
    options
}
