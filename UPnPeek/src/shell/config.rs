//! Commandes de configuration : `set` (réglages) et `head` (en-têtes
//! M-SEARCH).

use super::{Command, CommandOutcome, ShellContext};
use anyhow::{Context, Result, bail};
use std::time::Duration;

pub struct SetCommand;

impl Command for SetCommand {
    fn name(&self) -> &'static str {
        "set"
    }

    fn quick_view(&self) -> &'static str {
        "show or change session settings"
    }

    fn long_help(&self) -> &'static str {
        "set show\n\
         \tdisplay every setting\n\
         set uniq\n\
         \ttoggle deduplication of discovery responses\n\
         set verbose\n\
         \ttoggle debug-level logging\n\
         set version <ver>\n\
         \tUPnP version used in search targets (e.g. 1.0)\n\
         set timeout <seconds>\n\
         \tdiscovery session length, 0 = unbounded\n\
         set max <count>\n\
         \tmax hosts per discovery session, 0 = unbounded\n\
         set iface <name>\n\
         \tbind the passive listener to one interface ('any' to clear)"
    }

    fn run(&self, ctx: &mut ShellContext, args: &[String]) -> Result<CommandOutcome> {
        match args {
            [sub] if sub == "show" => {
                println!("{}", ctx.settings);
            }
            [sub] if sub == "uniq" => {
                ctx.settings.unique_only = !ctx.settings.unique_only;
                println!("uniq = {}", ctx.settings.unique_only);
            }
            [sub] if sub == "verbose" => {
                ctx.settings.verbose = !ctx.settings.verbose;
                (ctx.set_verbosity)(ctx.settings.verbose);
                println!("verbose = {}", ctx.settings.verbose);
            }
            [sub, value] if sub == "version" => {
                ctx.settings.upnp_version = value.clone();
                println!("version = {}", ctx.settings.upnp_version);
            }
            [sub, value] if sub == "timeout" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("'{value}' is not a number of seconds"))?;
                ctx.settings.timeout = Duration::from_secs(secs);
                println!("timeout = {secs}s");
            }
            [sub, value] if sub == "max" => {
                ctx.settings.max_hosts = value
                    .parse()
                    .with_context(|| format!("'{value}' is not a host count"))?;
                println!("max = {}", ctx.settings.max_hosts);
            }
            [sub, value] if sub == "iface" => {
                ctx.settings.iface = if value == "any" {
                    None
                } else {
                    Some(value.clone())
                };
                println!(
                    "iface = {}",
                    ctx.settings.iface.as_deref().unwrap_or("(all non-loopback)")
                );
            }
            _ => bail!("usage: set show|uniq|verbose|version|timeout|max|iface (see 'help set')"),
        }
        Ok(CommandOutcome::Continue)
    }
}

pub struct HeadCommand;

impl Command for HeadCommand {
    fn name(&self) -> &'static str {
        "head"
    }

    fn quick_view(&self) -> &'static str {
        "manage extra M-SEARCH headers"
    }

    fn long_help(&self) -> &'static str {
        "head show\n\
         \tlist the extra headers sent with every M-SEARCH\n\
         head set <name> <value>\n\
         \tadd or replace a header (e.g. head set MX 2)\n\
         head del <name>\n\
         \tremove a header"
    }

    fn run(&self, ctx: &mut ShellContext, args: &[String]) -> Result<CommandOutcome> {
        match args {
            [sub] if sub == "show" => {
                for (name, value) in &ctx.headers {
                    println!("\t{name}: {value}");
                }
            }
            [sub, name, value] if sub == "set" => {
                let name = name.to_ascii_uppercase();
                ctx.headers.insert(name.clone(), value.clone());
                println!("{name}: {value}");
            }
            [sub, name] if sub == "del" => {
                let name = name.to_ascii_uppercase();
                // shift_remove : l'ordre des en-têtes restants est conservé.
                if ctx.headers.shift_remove(&name).is_some() {
                    println!("{name} removed");
                } else {
                    println!("no header named '{name}'");
                }
            }
            _ => bail!("usage: head show | head set <name> <value> | head del <name>"),
        }
        Ok(CommandOutcome::Continue)
    }
}
