use std::collections::BTreeMap;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;

use crate::compat::CommandProbe;
use crate::dispatch;
use crate::engine::{ExitSignal, GENERATOR_NEW, WorkflowEngine};
use crate::flags;
use crate::schema::OptionSchema;
use crate::settings::Settings;
use crate::version::VERSION;
use crate::workflow::ProcessEngine;
use crate::{collection, collection::DEFAULT_COLLECTION};

pub struct Cli {
    root: Command,
    new_command: Option<NewCommand>,
    settings: Settings,
}

/// The `new` command with the schema its flag set was registered from. The
/// schema is needed again at run time to read the dynamic flags back out of
/// the parsed matches.
pub struct NewCommand {
    schema: OptionSchema,
}

/// Assemble the CLI. Registration of `new` asks the engine for the
/// generator's option schema and can fail; that suppresses `new` only, with
/// a warning, while the rest of the CLI stays usable.
pub fn build(settings: Settings) -> Cli {
    build_from(settings, std::env::args().skip(1))
}

/// [`build`] with an explicit argument line for the registration-time
/// collection prescan.
pub fn build_from<I, S>(settings: Settings, argv: I) -> Cli
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut root = Command::new("fabrica")
        .about("Fabrica workspace scaffolding")
        .version(VERSION)
        .arg_required_else_help(true);

    let new_command = match NewCommand::register(&settings, argv) {
        Ok((cmd, new_command)) => {
            root = root.subcommand(cmd);
            Some(new_command)
        }
        Err(err) => {
            tracing::warn!("skipping registration of `new`: {err:#}");
            None
        }
    };

    Cli {
        root,
        new_command,
        settings,
    }
}

impl Cli {
    /// The assembled root command, including whichever subcommands survived
    /// registration.
    pub fn command(&self) -> &Command {
        &self.root
    }

    pub fn run(self) -> anyhow::Result<ExitSignal> {
        let matches = self.root.get_matches();
        if let Some(("new", sub)) = matches.subcommand() {
            if let Some(new_command) = &self.new_command {
                return new_command.run(sub, &self.settings);
            }
        }
        Ok(0)
    }
}

impl NewCommand {
    /// Registration-time assembly: resolve the collection from the raw
    /// argument line (the parsed form does not exist yet), introspect the
    /// generator's schema through a build-phase engine handle, and project
    /// it onto the base flag set.
    pub fn register<I, S>(settings: &Settings, argv: I) -> anyhow::Result<(Command, NewCommand)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let collection_name = collection::resolve(collection::from_argv(argv).as_deref(), settings);
        let root = std::env::current_dir().context("cannot determine working directory")?;
        let engine = ProcessEngine::for_build(settings, root)?;
        let schema = engine.describe_options(&collection_name, GENERATOR_NEW)?;
        let cmd = flags::build_flag_set(base_new_command(), &schema);
        Ok((cmd, NewCommand { schema }))
    }

    pub fn run(&self, matches: &ArgMatches, settings: &Settings) -> anyhow::Result<ExitSignal> {
        let options = resolved_options(matches, &self.schema);
        let root = std::env::current_dir().context("cannot determine working directory")?;
        let engine = ProcessEngine::for_execution(
            settings,
            root.clone(),
            dispatch::execution_view(&options),
        )?;
        dispatch::run(&engine, &CommandProbe, settings, &root, options)
    }
}

/// Statically declared surface of `new`; the schema-derived flags are layered
/// on top and never shadow these.
pub fn base_new_command() -> Command {
    Command::new("new")
        .visible_alias("n")
        .about("Create a new workspace from a generator collection")
        .arg(Arg::new("name").help("Name of the new workspace."))
        .arg(
            Arg::new("collection")
                .long("collection")
                .short('c')
                .value_name("COLLECTION")
                .help(format!(
                    "Generator collection to scaffold from (default: {DEFAULT_COLLECTION})."
                )),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Report the actions that would be taken without writing anything."),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Overwrite existing files."),
        )
        .arg(
            Arg::new("interactive")
                .long("interactive")
                .num_args(0..=1)
                .default_value("true")
                .default_missing_value("true")
                .value_parser(clap::value_parser!(bool))
                .help("Enable interactive prompts."),
        )
        .arg(
            Arg::new("defaults")
                .long("defaults")
                .action(ArgAction::SetTrue)
                .help("Accept default values without prompting."),
        )
}

/// Full resolved option map for one invocation: schema-derived flags plus the
/// positional name, the collection override, and the execution-mode flags.
pub fn resolved_options(matches: &ArgMatches, schema: &OptionSchema) -> BTreeMap<String, Value> {
    let mut options = flags::collect_options(matches, schema);
    if let Some(name) = matches.get_one::<String>("name") {
        options.insert("name".to_string(), Value::String(name.clone()));
    }
    if let Some(collection) = matches.get_one::<String>("collection") {
        options.insert("collection".to_string(), Value::String(collection.clone()));
    }
    options.insert("dry-run".to_string(), Value::Bool(matches.get_flag("dry-run")));
    options.insert("force".to_string(), Value::Bool(matches.get_flag("force")));
    options.insert(
        "interactive".to_string(),
        Value::Bool(*matches.get_one::<bool>("interactive").unwrap_or(&true)),
    );
    options.insert(
        "defaults".to_string(),
        Value::Bool(matches.get_flag("defaults")),
    );
    options
}
