//! `bots` namespace: list, inspect, generate, register, push and run bots.

use std::fs;

use serde_json::Value;
use tracing::debug;

use super::format::{format_bytes, format_date, plain_value};
use super::templates;
use crate::archive::create_zip_archive;
use crate::cli::command::{CommandDescriptor, NamespaceDescriptor, Registry, RegistryError};
use crate::cli::dispatch::CommandContext;
use crate::error::{Result, TurbotError};
use crate::manifest::MANIFEST_FILE;
use crate::runner::{DumpHandler, PreviewHandler, RunOutcome, ScraperRunner, ValidationHandler};

const NAMESPACE: &str = "manage bots (generate skeleton, validate data, submit code)";

const INDEX: &str = "\
bots

list your bots

Example:

 $ turbot bots
 === Bots
 example
 example2";

const INFO: &str = "\
bots:info

show detailed bot information

 -s, --shell  # output more shell friendly key/value pairs

Examples:

 $ turbot bots:info
 === example
 Last run status: OK
 Last run ended: 2001-01-01 00:00 UTC
 ...

 $ turbot bots:info --shell
 last_run_status=OK
 last_run_ended=2001-01-01T00:00:00Z
 ...";

const GENERATE: &str = "\
bots:generate --bot name_of_bot

Generate stub code for a bot in specified language

  -l, --language LANGUAGE # language to generate (currently `ruby` (default) or `python`)

 $ turbot bots:generate --language=ruby --bot my_amazing_bot
 Created new bot template at my_amazing_bot!";

const REGISTER: &str = "\
bots:register

Register a bot with turbot. Must be run from a folder containing scraper and manifest.json

 $ turbot bots:register
 Registered my_amazing_bot!";

const PUSH: &str = "\
bots:push

Push bot code to the turbot server. Must be run from a local bot checkout.

 $ turbot bots:push
 Your bot has been pushed to Turbot and will be reviewed for inclusion as soon as we can. THANK YOU!";

const VALIDATE: &str = "\
bots:validate [SCRAPER]

Validate bot output against its manifest

 $ turbot bots:validate
 ....................
 Validated 20 records!";

const DUMP: &str = "\
bots:dump

Execute bot locally (writes to STDOUT)

 $ turbot bots:dump
 {\"foo\":\"bar\"}
 {\"foo2\":\"bar2\"}";

const PREVIEW: &str = "\
bots:preview

Send bot data to Turbot for remote previewing / sharing

 $ turbot bots:preview
 Sending to turbot...
 ....................
 Submitted 20 records to turbot";

pub const ALREADY_REGISTERED: &str = "registered with Turbot. Bot names must be unique.";

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_namespace(NamespaceDescriptor::new("bots", NAMESPACE));
    registry.register_command(CommandDescriptor::new("bots", INDEX, index)?);
    registry.register_command(CommandDescriptor::new("bots:info", INFO, info)?);
    registry.register_command(CommandDescriptor::new("bots:generate", GENERATE, generate)?);
    registry.register_command(CommandDescriptor::new("bots:register", REGISTER, register_bot)?);
    registry.register_command(CommandDescriptor::new("bots:push", PUSH, push)?);
    registry.register_command(CommandDescriptor::new("bots:validate", VALIDATE, validate)?);
    registry.register_command(CommandDescriptor::new("bots:dump", DUMP, dump)?);
    registry.register_command(CommandDescriptor::new("bots:preview", PREVIEW, preview)?);
    registry.register_alias("list", "bots")?;
    registry.register_alias("info", "bots:info")?;
    registry.register_alias("push", "bots:push")?;
    Ok(())
}

fn ensure_unregistered(ctx: &mut CommandContext<'_>, bot: &str) -> Result<()> {
    if ctx.api()?.bot_exists(bot)? {
        return Err(TurbotError::failed(format!(
            "There's already a bot called {} {}",
            bot, ALREADY_REGISTERED
        )));
    }
    Ok(())
}

// === Remote ===

fn index(ctx: &mut CommandContext<'_>) -> Result<()> {
    ctx.validate_arguments()?;
    let bots = ctx.api()?.list_bots()?;
    let console = ctx.console();
    if bots.is_empty() {
        console.display("You have no bots.");
    } else {
        console.styled_header("Bots");
        let ids: Vec<String> = bots.into_iter().map(|b| b.bot_id).collect();
        console.styled_array(&ids);
    }
    Ok(())
}

fn info(ctx: &mut CommandContext<'_>) -> Result<()> {
    ctx.validate_arguments()?;
    let bot = ctx.bot()?;
    let data = ctx.api()?.show_bot(&bot)?;
    let shell = ctx.flag("shell");
    let console = ctx.console();

    if shell {
        // serde_json maps keep keys sorted.
        for (key, value) in &data {
            console.display(&format!("{}={}", key, plain_value(value)));
        }
        return Ok(());
    }

    let name = data
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(bot.as_str())
        .to_string();
    console.styled_header(&name);

    let field = |key: &str| data.get(key).map(plain_value).unwrap_or_default();
    let mut entries = vec![
        ("Last run status".to_string(), field("last_run_status")),
        ("Git URL".to_string(), field("git_url")),
    ];
    if let Some(ended) = data.get("last_run_ended").and_then(Value::as_str) {
        entries.push(("Last run ended".to_string(), format_date(ended)));
    }
    if let Some(size) = data.get("repo_size").and_then(Value::as_u64) {
        entries.push(("Repo Size".to_string(), format_bytes(size)));
    }
    console.styled_hash(&entries);
    Ok(())
}

fn generate(ctx: &mut CommandContext<'_>) -> Result<()> {
    ctx.validate_arguments()?;
    let bot = ctx.bot()?;
    ensure_unregistered(ctx, &bot)?;

    let language = ctx.option("language").unwrap_or("ruby").to_string();
    let (scraper_name, scraper) = templates::scraper(&language)
        .ok_or_else(|| TurbotError::failed(format!("unsupported language {}", language)))?;
    let manifest = templates::manifest(&bot, scraper_name, &language);

    let dir = ctx.working_dir().join(&bot);
    if dir.exists() {
        return Err(TurbotError::failed(format!(
            "There's already a folder called {}; move it out the way or try a different name",
            bot
        )));
    }
    fs::create_dir(&dir)?;
    fs::write(dir.join(scraper_name), scraper)?;
    fs::write(dir.join("LICENSE.txt"), templates::LICENSE)?;
    fs::write(dir.join(MANIFEST_FILE), serde_json::to_string_pretty(&manifest)?)?;
    debug!(dir = %dir.display(), %language, "bot template written");

    ctx.api()?.create_bot(&bot, &manifest)?;
    ctx.console()
        .display(&format!("Created new bot template at {}!", bot));
    Ok(())
}

fn register_bot(ctx: &mut CommandContext<'_>) -> Result<()> {
    ctx.validate_arguments()?;
    let bot = ctx.bot()?;
    ensure_unregistered(ctx, &bot)?;
    let manifest = ctx.manifest()?;
    ctx.api()?.create_bot(&bot, &manifest.as_value())?;
    ctx.console().display(&format!("Registered {}!", bot));
    Ok(())
}

fn push(ctx: &mut CommandContext<'_>) -> Result<()> {
    ctx.validate_arguments()?;
    let console = ctx.console();
    console.display("This will submit your bot and its data for review.");
    console.display(
        "Are you happy your bot produces valid data (e.g. with `turbot bots:validate`)? [Y/n]",
    );
    let confirmed = console.ask()?.to_lowercase();
    if !confirmed.is_empty() && confirmed != "y" {
        return Err(TurbotError::failed("Aborting push"));
    }

    let bot = ctx.bot()?;
    let manifest = ctx.manifest()?;
    let mut files = manifest.files();
    files.push(MANIFEST_FILE.to_string());

    let staging = tempfile::Builder::new().prefix(&bot).tempdir()?;
    let archive = staging.path().join(format!("{}.zip", bot));
    let added = create_zip_archive(&archive, ctx.working_dir(), &files)?;
    debug!(entries = added.len(), archive = %archive.display(), "archive built");

    ctx.api()?.update_code(&bot, &archive)?;
    ctx.console().display(
        "Your bot has been pushed to Turbot and will be reviewed for inclusion as soon as we can. THANK YOU!",
    );
    Ok(())
}

// === Local runs ===

fn validate(ctx: &mut CommandContext<'_>) -> Result<()> {
    let script = ctx.shift_argument();
    ctx.validate_arguments()?;
    let manifest = ctx.manifest()?;
    if let Some(key) = manifest.missing_keys().first() {
        return Err(TurbotError::failed(format!("Manifest is missing {}", key)));
    }

    let mut runner = ScraperRunner::with_manifest(ctx.working_dir(), manifest);
    if let Some(script) = script {
        runner = runner.script(script);
    }
    let mut handler = ValidationHandler::default();
    let outcome = runner.run(&mut handler, ctx.console())?;

    let console = ctx.console();
    console.blank_line();
    match outcome {
        RunOutcome::Ok => console.display(&format!("Validated {} records!", handler.count())),
        RunOutcome::Failed => console.display(&format!(
            "Validated {} records before bot failed!",
            handler.count()
        )),
    }
    Ok(())
}

fn dump(ctx: &mut CommandContext<'_>) -> Result<()> {
    ctx.validate_arguments()?;
    let runner = ScraperRunner::new(ctx.working_dir())?;
    let outcome = runner.run(&mut DumpHandler, ctx.console())?;

    let console = ctx.console();
    console.blank_line();
    match outcome {
        RunOutcome::Ok => console.display("Bot ran successfully!"),
        RunOutcome::Failed => console.display("Bot failed!"),
    }
    Ok(())
}

fn preview(ctx: &mut CommandContext<'_>) -> Result<()> {
    ctx.validate_arguments()?;
    let bot = ctx.bot()?;
    let manifest = ctx.manifest()?;
    let api = ctx.api()?.clone();

    api.update_bot(&bot, &manifest.as_value())?;
    api.destroy_draft_data(&bot)?;
    ctx.console().display("Sending to turbot... ");

    let runner = ScraperRunner::with_manifest(ctx.working_dir(), manifest);
    let mut handler = PreviewHandler::new(&api, bot.as_str());
    let outcome = runner.run(&mut handler, ctx.console())?;
    ctx.console().blank_line();

    match outcome {
        RunOutcome::Ok => {
            let receipt = handler.submit_batch()?;
            let console = ctx.console();
            if handler.count() > 0 {
                console.display(&format!("Submitted {} records to turbot", handler.count()));
                console.display(&format!(
                    "View your records at {}",
                    receipt.url.unwrap_or_default()
                ));
            } else {
                console.display("No records sent");
            }
        }
        RunOutcome::Failed => {
            let console = ctx.console();
            console.blank_line();
            console.display("Bot failed!");
        }
    }
    Ok(())
}
