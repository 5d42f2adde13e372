//! Commandes fichier : `save`, `load`, `log`.

use super::{Command, CommandOutcome, ShellContext};
use anyhow::{Context, Result, bail};
use peekcontrol::detail::render_host_detail;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct SaveCommand;

impl Command for SaveCommand {
    fn name(&self) -> &'static str {
        "save"
    }

    fn quick_view(&self) -> &'static str {
        "write the host directory or one host's detail to disk"
    }

    fn long_help(&self) -> &'static str {
        "save data [prefix]\n\
         \twrite the whole directory as a re-loadable JSON snapshot\n\
         \t(struct.json, or struct_<prefix>.json)\n\
         save info <index> [prefix]\n\
         \twrite one host's full detail as plain text\n\
         \t(info_<index>.txt, or info_<prefix>.txt); not re-loadable\n\
         \texisting files are never overwritten"
    }

    fn run(&self, ctx: &mut ShellContext, args: &[String]) -> Result<CommandOutcome> {
        match args {
            [sub] if sub == "data" => save_data(ctx, None),
            [sub, prefix] if sub == "data" => save_data(ctx, Some(prefix)),
            [sub, index] if sub == "info" => save_info(ctx, index, None),
            [sub, index, prefix] if sub == "info" => save_info(ctx, index, Some(prefix)),
            _ => bail!("usage: save data [prefix] | save info <index> [prefix]"),
        }?;
        Ok(CommandOutcome::Continue)
    }
}

fn save_data(ctx: &ShellContext, prefix: Option<&str>) -> Result<()> {
    let path = match prefix {
        Some(p) => PathBuf::from(format!("struct_{p}.json")),
        None => PathBuf::from("struct.json"),
    };
    refuse_overwrite(&path)?;
    ctx.directory.save_to(&path)?;
    println!("directory saved to '{}'", path.display());
    Ok(())
}

fn save_info(ctx: &ShellContext, index: &str, prefix: Option<&str>) -> Result<()> {
    let index: usize = index
        .parse()
        .with_context(|| format!("'{index}' is not a host index"))?;
    let entry = ctx.directory.get(index)?;

    let path = match prefix {
        Some(p) => PathBuf::from(format!("info_{p}.txt")),
        None => PathBuf::from(format!("info_{index}.txt")),
    };
    refuse_overwrite(&path)?;
    std::fs::write(&path, render_host_detail(entry))
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    println!("host detail saved to '{}'", path.display());
    Ok(())
}

fn refuse_overwrite(path: &Path) -> Result<()> {
    if path.exists() {
        bail!(
            "'{}' already exists, refusing to overwrite it",
            path.display()
        );
    }
    Ok(())
}

pub struct LoadCommand;

impl Command for LoadCommand {
    fn name(&self) -> &'static str {
        "load"
    }

    fn quick_view(&self) -> &'static str {
        "replace the host directory from a saved snapshot"
    }

    fn long_help(&self) -> &'static str {
        "load <file>\n\
         \treplace the whole host directory with a snapshot written by\n\
         \t'save data'; the current directory is discarded"
    }

    fn run(&self, ctx: &mut ShellContext, args: &[String]) -> Result<CommandOutcome> {
        let [file] = args else {
            bail!("usage: load <file>");
        };
        let count = ctx.directory.load_from(Path::new(file))?;
        println!("{count} host(s) restored:");
        for (index, name) in ctx.directory.list() {
            println!("\t[{index}] {name}");
        }
        Ok(CommandOutcome::Continue)
    }
}

pub struct LogCommand;

impl Command for LogCommand {
    fn name(&self) -> &'static str {
        "log"
    }

    fn quick_view(&self) -> &'static str {
        "append every typed command to a file"
    }

    fn long_help(&self) -> &'static str {
        "log <file>\n\
         \tappend every subsequent command line to <file>; a session can\n\
         \tbe replayed later with the -b batch flag"
    }

    fn run(&self, ctx: &mut ShellContext, args: &[String]) -> Result<CommandOutcome> {
        let [file] = args else {
            bail!("usage: log <file>");
        };
        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .with_context(|| format!("failed to open command log '{file}'"))?;
        writeln!(handle, "# command log started")
            .with_context(|| format!("failed to write to command log '{file}'"))?;
        ctx.log = Some(handle);
        println!("logging commands to '{file}'");
        Ok(CommandOutcome::Continue)
    }
}
